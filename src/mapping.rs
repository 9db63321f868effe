use errors::{MappingError, Result};
use pipeline::{CommandStage, Pipeline};
use pipeline_runner::run_pipeline;
use run_configuration::{Mapper, Platform, RunConfiguration};

/// Read group header line given to the aligner. The \t escapes are left for
/// the aligner to expand.
pub fn read_group(config: &RunConfiguration) -> String {
    format!(
        "@RG\\tID:{}\\tSM:{}\\tPL:{}",
        config.prefix, config.prefix, config.platform
    )
}

enum Reads<'a> {
    Paired(&'a str, &'a str),
    Single(&'a str),
}

fn reads(config: &RunConfiguration) -> Result<Reads> {
    let missing = || MappingError::MissingReads {
        platform: config.platform.to_string(),
        mapper: config.mapper.to_string(),
    };
    match (&config.read1, &config.read2) {
        (Some(r1), Some(r2)) => Ok(Reads::Paired(r1, r2)),
        (Some(r1), None) => Ok(Reads::Single(r1)),
        (None, Some(_)) => {
            warn!("A second read file was given without a first");
            Err(missing())
        }
        (None, None) => Err(missing()),
    }
}

fn build_aligner_stage(config: &RunConfiguration) -> Result<CommandStage> {
    let threads = config.threads;
    let rg = read_group(config);
    let programs = &config.programs;

    let stage = match config.platform {
        Platform::Illumina => match config.mapper {
            Mapper::Bwa => {
                let stage = CommandStage::new(&programs.bwa)
                    .arg("mem")
                    .arg("-R")
                    .arg(&rg)
                    .arg("-t")
                    .arg(threads)
                    .arg(&config.reference);
                match reads(config)? {
                    Reads::Paired(r1, r2) => stage.arg(r1).arg(r2),
                    Reads::Single(r1) => stage.arg(r1),
                }
            }
            Mapper::Bowtie2 => {
                let stage = CommandStage::new(&programs.bowtie2)
                    .arg("-p")
                    .arg(threads)
                    .arg("-x")
                    .arg(&config.reference)
                    .arg("--rg-id")
                    .arg(&config.prefix)
                    .arg("--rg")
                    .arg(&rg);
                match reads(config)? {
                    Reads::Paired(r1, r2) => stage.arg("-1").arg(r1).arg("-2").arg(r2),
                    Reads::Single(r1) => stage.arg("-U").arg(r1),
                }
            }
            Mapper::Minimap2 => {
                let stage = CommandStage::new(&programs.minimap2)
                    .arg("-R")
                    .arg(&rg)
                    .arg("-ax")
                    .arg("sr")
                    .arg("-t")
                    .arg(threads)
                    .arg(&config.reference);
                match reads(config)? {
                    Reads::Paired(r1, r2) => stage.arg(r1).arg(r2),
                    Reads::Single(r1) => stage.arg(r1),
                }
            }
        },
        // Nanopore reads are always single-ended, so only the first file is
        // used and the mapper choice does not apply.
        Platform::MinION => {
            let read1 = match reads(config)? {
                Reads::Paired(r1, r2) => {
                    warn!("Ignoring second read file {} for minION run", r2);
                    r1
                }
                Reads::Single(r1) => r1,
            };
            CommandStage::new(&programs.minimap2)
                .arg("-R")
                .arg(&rg)
                .arg("-ax")
                .arg("map-ont")
                .arg("-t")
                .arg(threads)
                .arg(&config.reference)
                .arg(read1)
        }
    };
    Ok(stage)
}

/// Build aligner | samtools view | samtools sort for a run. Nothing is
/// executed. The same configuration always gives the same pipeline.
pub fn build_mapping_pipeline(config: &RunConfiguration) -> Result<Pipeline> {
    let aligner = build_aligner_stage(config)?;
    let threads = config.threads;
    let samtools = &config.programs.samtools;

    Ok(Pipeline::new()
        .pipe(aligner)
        .pipe(
            CommandStage::new(samtools)
                .arg("view")
                .arg("-b")
                .arg("-@")
                .arg(threads)
                .arg("-"),
        )
        .pipe(
            CommandStage::new(samtools)
                .arg("sort")
                .arg("-@")
                .arg(threads)
                .arg("-o")
                .arg(&config.bam_output)
                .arg("-"),
        ))
}

/// Map the configured reads, writing a sorted BAM to the configured output
/// path. No command is run if the configuration does not yield one.
pub fn map_reads(config: &RunConfiguration) -> Result<()> {
    let pipeline = build_mapping_pipeline(config)?;
    info!(
        "Mapping {} reads of {} to {} with {} ..",
        match config.is_paired() {
            true => "paired",
            false => "single",
        },
        config.prefix,
        config.reference,
        pipeline.stages[0].program
    );
    run_pipeline(&pipeline, config.verbose)?;
    info!("Finished writing {}", config.bam_output);
    Ok(())
}

extern crate tbmap;
use tbmap::bam_summary::summarise_bam;
use tbmap::cli::*;
use tbmap::external_command_checker;
use tbmap::mapping::{build_mapping_pipeline, map_reads};
use tbmap::run_configuration::RunConfiguration;
use tbmap::MappingError;

use std::env;
use std::process;

#[macro_use]
extern crate clap;
use clap::ArgMatches;

extern crate clap_complete;
use clap_complete::{generate, Shell};

#[macro_use]
extern crate log;
extern crate env_logger;
use env_logger::Builder;
use log::LevelFilter;

fn main() {
    let mut app = build_cli();
    let matches = app.clone().get_matches();

    match matches.subcommand() {
        Some(("map", m)) => {
            set_log_level(m);
            if let Err(e) = run_map(m) {
                error!("{}", e);
                process::exit(1);
            }
        }
        Some(("shell-completion", m)) => {
            set_log_level(m);
            let output_file = m
                .get_one::<String>("output-file")
                .expect("output-file is a required argument");
            let mut file = match std::fs::File::create(output_file) {
                Ok(f) => f,
                Err(e) => {
                    error!("Failed to open {} for writing: {}", output_file, e);
                    process::exit(1);
                }
            };
            let shell = *m
                .get_one::<Shell>("shell")
                .expect("shell is a required argument");
            info!("Generating completion script for shell {}", shell);
            generate(shell, &mut app, "tbmap", &mut file);
        }
        _ => {
            app.print_help().expect("Failed to print help");
            println!();
        }
    }
}

fn run_map(m: &ArgMatches) -> Result<(), MappingError> {
    let config = RunConfiguration::generate_from_clap(m)?;

    if m.get_flag("dry-run") {
        let pipeline = build_mapping_pipeline(&config)?;
        println!("{}", pipeline.shell_command());
        return Ok(());
    }

    if m.get_flag("skip-checks") {
        debug!("Skipping checks for external programs");
    } else {
        external_command_checker::check_for_mapping_programs(&config)?;
    }

    map_reads(&config)?;

    // The BAM is already written, so a failed summary is not a failed run.
    match summarise_bam(&config.bam_output, config.threads) {
        Ok(summary) => {
            info!(
                "Wrote {} primary alignments ({} mapped) to {}",
                summary.num_primary_alignments,
                summary.num_mapped_primary_alignments,
                config.bam_output
            );
            if !summary.read_groups.iter().any(|rg| rg.id == config.prefix) {
                warn!(
                    "Read group {} was not found in the header of {}",
                    config.prefix, config.bam_output
                );
            }
        }
        Err(e) => warn!("Unable to summarise {}: {}", config.bam_output, e),
    }
    Ok(())
}

fn set_log_level(matches: &ArgMatches) {
    let mut log_level = LevelFilter::Info;
    if matches.get_flag("verbose") {
        log_level = LevelFilter::Debug;
    }
    if matches.get_flag("quiet") {
        log_level = LevelFilter::Error;
    }
    let mut builder = Builder::new();
    builder.filter_level(log_level);
    if let Ok(filters) = env::var("RUST_LOG") {
        builder.parse_filters(&filters);
    }
    if builder.try_init().is_err() {
        panic!("Failed to set log level - has it been specified multiple times?")
    }
    info!("tbmap version {}", crate_version!());
}

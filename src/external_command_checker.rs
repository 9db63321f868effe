use std::process::{Command, Output};

use version_compare::Version;

use errors::{MappingError, Result};
use run_configuration::{Mapper, Platform, RunConfiguration};

pub const MINIMAP2_MIN_VERSION: &str = "2.17-r941";
pub const SAMTOOLS_MIN_VERSION: &str = "1.9";

/// Check that the aligner which will be used for this run, and samtools,
/// can be found and are recent enough.
pub fn check_for_mapping_programs(config: &RunConfiguration) -> Result<()> {
    let programs = &config.programs;
    let mapper = match config.platform {
        Platform::MinION => Mapper::Minimap2,
        Platform::Illumina => config.mapper,
    };
    match mapper {
        Mapper::Bwa => check_for_bwa(&programs.bwa)?,
        Mapper::Bowtie2 => check_for_bowtie2(&programs.bowtie2)?,
        Mapper::Minimap2 => check_for_minimap2(&programs.minimap2)?,
    };
    check_for_samtools(&programs.samtools)
}

pub fn check_for_bwa(path: &str) -> Result<()> {
    check_for_external_command_presence("BWA", path)
}

pub fn check_for_bowtie2(path: &str) -> Result<()> {
    check_for_external_command_presence("bowtie2", path)
}

pub fn check_for_minimap2(path: &str) -> Result<()> {
    check_for_external_command_presence("minimap2", path)?;
    default_version_check("minimap2", path, MINIMAP2_MIN_VERSION)
}

pub fn check_for_samtools(path: &str) -> Result<()> {
    check_for_external_command_presence("samtools", path)?;
    default_version_check("samtools", path, SAMTOOLS_MIN_VERSION)
}

fn run_capturing(program: &str, args: &[&str]) -> Result<Output> {
    Command::new(program)
        .args(args)
        .output()
        .map_err(|e| MappingError::Spawn {
            program: program.to_string(),
            source: e,
        })
}

pub fn check_for_external_command_presence(executable_name: &str, path: &str) -> Result<()> {
    debug!("Checking for {} at {} ..", executable_name, path);
    let output = run_capturing("which", &[path])?;
    if !output.status.success() {
        let err = String::from_utf8_lossy(&output.stderr).to_string();
        error!(
            "Could not find an available {} executable. Testing for presence with `which {}` failed",
            executable_name, path
        );
        return Err(MappingError::MissingExecutable {
            name: executable_name.to_string(),
            path: path.to_string(),
            stderr: err,
        });
    }
    Ok(())
}

/// Pull the version out of e.g. "samtools 1.10\nUsing htslib 1.10" or
/// "2.17-r941". The last word of the first line is taken.
pub fn parse_version_output(output: &str) -> Option<&str> {
    output.trim().lines().next()?.trim().rsplit(' ').next()
}

/// Whether `found` is at least `required`. None if either cannot be parsed.
pub fn version_at_least(found: &str, required: &str) -> Option<bool> {
    let found = Version::from(found)?;
    let required = Version::from(required)?;
    Some(found >= required)
}

pub fn default_version_check(executable_name: &str, path: &str, min_version: &str) -> Result<()> {
    let version_command = format!("{} --version", path);
    let output = run_capturing(path, &["--version"])?;
    if !output.status.success() {
        error!(
            "Cannot continue without {}. Finding version of `{}` failed",
            executable_name, &version_command
        );
        return Err(MappingError::MissingExecutable {
            name: executable_name.to_string(),
            path: path.to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
        });
    }
    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let found_version = match parse_version_output(&stdout) {
        Some(v) => v,
        None => {
            return Err(MappingError::InvalidParameter {
                name: version_command,
                value: stdout.clone(),
            })
        }
    };

    match version_at_least(found_version, min_version) {
        Some(true) => {
            info!("Found {} version {} ", executable_name, found_version);
            Ok(())
        }
        Some(false) => Err(MappingError::VersionTooOld {
            name: executable_name.to_string(),
            found: found_version.to_string(),
            required: min_version.to_string(),
        }),
        None => {
            warn!(
                "Unable to parse version number '{}' from executable {}, continuing anyway",
                found_version, executable_name
            );
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn init() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    #[test]
    fn test_parse_version_output() {
        assert_eq!(
            Some("1.10"),
            parse_version_output("samtools 1.10\nUsing htslib 1.10\nCopyright (C) 2019\n")
        );
        assert_eq!(Some("2.17-r941"), parse_version_output("2.17-r941\n"));
        assert_eq!(
            Some("2.4.1"),
            parse_version_output("/usr/bin/bowtie2-align-s version 2.4.1\n64-bit\n")
        );
    }

    #[test]
    fn test_version_at_least() {
        assert_eq!(Some(true), version_at_least("1.10", SAMTOOLS_MIN_VERSION));
        assert_eq!(Some(true), version_at_least("1.9", SAMTOOLS_MIN_VERSION));
        assert_eq!(Some(false), version_at_least("1.3.1", SAMTOOLS_MIN_VERSION));
        assert_eq!(Some(true), version_at_least("2.24-r1122", MINIMAP2_MIN_VERSION));
        assert_eq!(Some(false), version_at_least("2.10-r761", MINIMAP2_MIN_VERSION));
    }

    #[test]
    fn test_presence() {
        init();
        assert!(check_for_external_command_presence("sh", "sh").is_ok());
        match check_for_external_command_presence("nothing", "/nonexistent/tbmap-nothing") {
            Err(MappingError::MissingExecutable { name, path, .. }) => {
                assert_eq!("nothing", name);
                assert_eq!("/nonexistent/tbmap-nothing", path);
            }
            other => panic!("Unexpected {:?}", other),
        }
    }

    #[test]
    fn test_missing_aligner_is_checked() {
        init();
        let mut config = RunConfiguration {
            platform: Platform::Illumina,
            mapper: Mapper::Bowtie2,
            read1: Some("a.fq".to_string()),
            read2: None,
            reference: "ref.fa".to_string(),
            bam_output: "out.bam".to_string(),
            prefix: "S1".to_string(),
            threads: 1,
            programs: Default::default(),
            verbose: false,
        };
        config.programs.bowtie2 = "/nonexistent/bowtie2".to_string();
        assert!(matches!(
            check_for_mapping_programs(&config),
            Err(MappingError::MissingExecutable { .. })
        ));
    }
}

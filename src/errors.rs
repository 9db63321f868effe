use std;
use std::error::Error;
use std::fmt;
use std::io;
use std::process::ExitStatus;

use rust_htslib;

/// Everything that can go wrong between reading a run configuration and
/// finishing the samtools sort. Nothing in the library exits the process;
/// the caller decides what to do with these.
#[derive(Debug)]
pub enum MappingError {
    UnrecognisedPlatform(String),
    UnrecognisedMapper(String),
    /// No usable read file was given for this platform/mapper combination.
    MissingReads {
        platform: String,
        mapper: String,
    },
    MissingParameter(String),
    InvalidParameter {
        name: String,
        value: String,
    },
    MissingExecutable {
        name: String,
        path: String,
        stderr: String,
    },
    VersionTooOld {
        name: String,
        found: String,
        required: String,
    },
    Spawn {
        program: String,
        source: io::Error,
    },
    StageFailed {
        program: String,
        status: ExitStatus,
    },
    Io(io::Error),
    Bam(rust_htslib::errors::Error),
}

impl fmt::Display for MappingError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            MappingError::UnrecognisedPlatform(p) => write!(
                f,
                "Unrecognised platform '{}', expected one of Illumina or minION",
                p
            ),
            MappingError::UnrecognisedMapper(m) => write!(
                f,
                "Unrecognised mapper '{}', expected one of bwa, bowtie2 or minimap2",
                m
            ),
            MappingError::MissingReads { platform, mapper } => write!(
                f,
                "No read files were specified, so there is nothing to map with {} for platform {}",
                mapper, platform
            ),
            MappingError::MissingParameter(name) => {
                write!(f, "Required parameter '{}' was not specified", name)
            }
            MappingError::InvalidParameter { name, value } => {
                write!(f, "Unable to parse '{}' as the value of '{}'", value, name)
            }
            MappingError::MissingExecutable { name, path, stderr } => write!(
                f,
                "Could not find an available {} executable at '{}'. The STDERR was: {:?}",
                name, path, stderr
            ),
            MappingError::VersionTooOld {
                name,
                found,
                required,
            } => write!(
                f,
                "It appears the available version of {} is too old (found version {}, required is {})",
                name, found, required
            ),
            MappingError::Spawn { program, source } => {
                write!(f, "Failed to start {}: {}", program, source)
            }
            MappingError::StageFailed { program, status } => {
                write!(f, "{} failed. Exitstatus was {}", program, status)
            }
            MappingError::Io(e) => write!(f, "I/O error: {}", e),
            MappingError::Bam(e) => write!(f, "Failed to read BAM file: {}", e),
        }
    }
}

impl Error for MappingError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            MappingError::Spawn { source, .. } => Some(source),
            MappingError::Io(e) => Some(e),
            MappingError::Bam(e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for MappingError {
    fn from(e: io::Error) -> MappingError {
        MappingError::Io(e)
    }
}

impl From<rust_htslib::errors::Error> for MappingError {
    fn from(e: rust_htslib::errors::Error) -> MappingError {
        MappingError::Bam(e)
    }
}

pub type Result<T> = std::result::Result<T, MappingError>;

use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;
use std::str::FromStr;

use clap;

use errors::{MappingError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    Illumina,
    MinION,
}

impl FromStr for Platform {
    type Err = MappingError;

    fn from_str(s: &str) -> Result<Platform> {
        match s {
            "Illumina" => Ok(Platform::Illumina),
            "minION" => Ok(Platform::MinION),
            _ => Err(MappingError::UnrecognisedPlatform(s.to_string())),
        }
    }
}

// Also the PL field of the read group, so must match what was parsed.
impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Platform::Illumina => write!(f, "Illumina"),
            Platform::MinION => write!(f, "minION"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mapper {
    Bwa,
    Bowtie2,
    Minimap2,
}

impl FromStr for Mapper {
    type Err = MappingError;

    fn from_str(s: &str) -> Result<Mapper> {
        match s {
            "bwa" => Ok(Mapper::Bwa),
            "bowtie2" => Ok(Mapper::Bowtie2),
            "minimap2" => Ok(Mapper::Minimap2),
            _ => Err(MappingError::UnrecognisedMapper(s.to_string())),
        }
    }
}

impl fmt::Display for Mapper {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Mapper::Bwa => write!(f, "bwa"),
            Mapper::Bowtie2 => write!(f, "bowtie2"),
            Mapper::Minimap2 => write!(f, "minimap2"),
        }
    }
}

/// Paths to the executables invoked. Bare names are resolved on $PATH.
#[derive(Debug, Clone, PartialEq)]
pub struct ExternalPrograms {
    pub bwa: String,
    pub bowtie2: String,
    pub minimap2: String,
    pub samtools: String,
}

impl Default for ExternalPrograms {
    fn default() -> ExternalPrograms {
        ExternalPrograms {
            bwa: "bwa".to_string(),
            bowtie2: "bowtie2".to_string(),
            minimap2: "minimap2".to_string(),
            samtools: "samtools".to_string(),
        }
    }
}

/// Everything needed to map one sample against one reference.
#[derive(Debug, Clone, PartialEq)]
pub struct RunConfiguration {
    pub platform: Platform,
    /// Ignored for minION runs, which always use minimap2.
    pub mapper: Mapper,
    pub read1: Option<String>,
    pub read2: Option<String>,
    pub reference: String,
    pub bam_output: String,
    /// Used as both the ID and SM of the read group.
    pub prefix: String,
    pub threads: u16,
    pub programs: ExternalPrograms,
    pub verbose: bool,
}

fn non_empty<'a>(params: &'a BTreeMap<String, String>, key: &str) -> Option<&'a str> {
    match params.get(key) {
        Some(v) if !v.is_empty() => Some(v.as_str()),
        _ => None,
    }
}

fn required<'a>(params: &'a BTreeMap<String, String>, key: &str) -> Result<&'a str> {
    non_empty(params, key).ok_or_else(|| MappingError::MissingParameter(key.to_string()))
}

fn parse_flag(name: &str, value: &str) -> Result<bool> {
    match value {
        "true" | "True" | "1" => Ok(true),
        "false" | "False" | "0" => Ok(false),
        _ => Err(MappingError::InvalidParameter {
            name: name.to_string(),
            value: value.to_string(),
        }),
    }
}

impl RunConfiguration {
    /// Build from a flat parameter mapping. Recognised keys are platform,
    /// mapper, fq1, fq2, reffile, bamfile, prefix, threads, bwa, bowtie2,
    /// minimap2, samtools and verbose. Empty values count as absent.
    pub fn from_params(params: &BTreeMap<String, String>) -> Result<RunConfiguration> {
        let platform: Platform = required(params, "platform")?.parse()?;
        let mapper = match platform {
            Platform::MinION => {
                if let Some(m) = non_empty(params, "mapper") {
                    debug!("Ignoring mapper '{}' since platform is minION", m);
                }
                Mapper::Minimap2
            }
            Platform::Illumina => non_empty(params, "mapper").unwrap_or("bwa").parse()?,
        };

        let threads = match non_empty(params, "threads") {
            None => 1,
            Some(t) => match t.parse::<u16>() {
                Ok(n) if n > 0 => n,
                _ => {
                    return Err(MappingError::InvalidParameter {
                        name: "threads".to_string(),
                        value: t.to_string(),
                    })
                }
            },
        };

        let defaults = ExternalPrograms::default();
        let program = |key: &str, default: String| -> String {
            non_empty(params, key).map(|s| s.to_string()).unwrap_or(default)
        };
        let programs = ExternalPrograms {
            bwa: program("bwa", defaults.bwa),
            bowtie2: program("bowtie2", defaults.bowtie2),
            minimap2: program("minimap2", defaults.minimap2),
            samtools: program("samtools", defaults.samtools),
        };

        let verbose = match non_empty(params, "verbose") {
            Some(v) => parse_flag("verbose", v)?,
            None => false,
        };

        let config = RunConfiguration {
            platform,
            mapper,
            read1: non_empty(params, "fq1").map(|s| s.to_string()),
            read2: non_empty(params, "fq2").map(|s| s.to_string()),
            reference: required(params, "reffile")?.to_string(),
            bam_output: required(params, "bamfile")?.to_string(),
            prefix: required(params, "prefix")?.to_string(),
            threads,
            programs,
            verbose,
        };
        debug!("Parsed run configuration {:?}", config);
        Ok(config)
    }

    /// Build from the arguments of the map subcommand, going through the
    /// same parameter mapping as other callers.
    pub fn generate_from_clap(m: &clap::ArgMatches) -> Result<RunConfiguration> {
        let mut params: BTreeMap<String, String> = BTreeMap::new();
        for (arg, key) in &[
            ("platform", "platform"),
            ("mapper", "mapper"),
            ("read1", "fq1"),
            ("read2", "fq2"),
            ("reference", "reffile"),
            ("output", "bamfile"),
            ("prefix", "prefix"),
            ("bwa", "bwa"),
            ("bowtie2", "bowtie2"),
            ("minimap2", "minimap2"),
            ("samtools", "samtools"),
        ] {
            if let Some(v) = m.get_one::<String>(arg) {
                params.insert(key.to_string(), v.clone());
            }
        }
        if !params.contains_key("prefix") {
            if let Some(output) = params.get("bamfile").cloned() {
                params.insert("prefix".to_string(), default_prefix(&output));
            }
        }
        if let Some(t) = m.get_one::<u16>("threads") {
            params.insert("threads".to_string(), t.to_string());
        }
        params.insert("verbose".to_string(), m.get_flag("verbose").to_string());
        RunConfiguration::from_params(&params)
    }

    pub fn is_paired(&self) -> bool {
        self.read1.is_some() && self.read2.is_some()
    }
}

/// Sample name to fall back on when none is given, e.g. "out" for
/// "/tmp/out.bam".
pub fn default_prefix(bam_output: &str) -> String {
    Path::new(bam_output)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or(bam_output)
        .to_string()
}

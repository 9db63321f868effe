pub mod bam_summary;
pub mod cli;
pub mod errors;
pub mod external_command_checker;
pub mod mapping;
pub mod pipeline;
pub mod pipeline_runner;
pub mod run_configuration;

#[macro_use]
extern crate log;

extern crate clap;
extern crate clap_complete;
extern crate env_logger;
extern crate rust_htslib;
extern crate tempfile;
extern crate version_compare;

pub use errors::MappingError;
pub use mapping::{build_mapping_pipeline, map_reads};
pub use run_configuration::{Mapper, Platform, RunConfiguration};

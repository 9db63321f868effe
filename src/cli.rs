use clap::*;
use clap_complete::Shell;

const PLATFORM_LIST: &[&str] = &["Illumina", "minION"];
const MAPPING_SOFTWARE_LIST: &[&str] = &["bwa", "bowtie2", "minimap2"];
const DEFAULT_MAPPING_SOFTWARE: &str = "bwa";

fn map_help() -> String {
    format!(
        "tbmap map: Map reads to a reference, writing a sorted BAM file

Input:
   -1, --read1 <PATH>             Forward (or only) FASTQ file
   -2, --read2 <PATH>             Reverse FASTQ file for paired-end reads
   -r, --reference <PATH>         FASTA file of reference, or prefix of a
                                  bowtie2 index when --mapper bowtie2
   --platform <NAME>              Sequencing platform. One of: {}

Output:
   -o, --output <PATH>            Sorted BAM file to write
   --prefix <NAME>                Sample name, used as the read group ID
                                  and SM. [default: stem of --output]

Mapping:
   --mapper <NAME>                Mapper to use for Illumina reads. One of:
                                  {}. minION reads are always mapped with
                                  'minimap2 -ax map-ont'. [default: {}]
   -t, --threads <INT>            Threads for mapping and samtools [default: 1]
   --bwa <PATH>                   bwa executable [default: bwa]
   --bowtie2 <PATH>               bowtie2 executable [default: bowtie2]
   --minimap2 <PATH>              minimap2 executable [default: minimap2]
   --samtools <PATH>              samtools executable [default: samtools]

Other:
   --dry-run                      Print the mapping command and exit
   --skip-checks                  Do not check for external programs before
                                  mapping
   -v, --verbose                  Print the mapping command and extra
                                  debug logging information
   -q, --quiet                    Unless there is an error, do not print
                                  log messages
",
        PLATFORM_LIST.join(", "),
        MAPPING_SOFTWARE_LIST.join(", "),
        DEFAULT_MAPPING_SOFTWARE,
    )
}

fn path_arg(name: &'static str) -> Arg {
    Arg::new(name).long(name).value_name("PATH")
}

fn add_logging_args(cmd: Command) -> Command {
    cmd.arg(
        Arg::new("verbose")
            .short('v')
            .long("verbose")
            .action(ArgAction::SetTrue),
    )
    .arg(
        Arg::new("quiet")
            .short('q')
            .long("quiet")
            .action(ArgAction::SetTrue)
            .conflicts_with("verbose"),
    )
}

pub fn build_cli() -> Command {
    let map_subcommand = add_logging_args(
        Command::new("map")
            .about("Map reads to a reference, writing a sorted BAM file")
            .override_help(map_help())
            .arg(
                Arg::new("platform")
                    .long("platform")
                    .required(true)
                    .value_name("NAME"),
            )
            .arg(
                Arg::new("mapper")
                    .long("mapper")
                    .value_name("NAME")
                    .default_value(DEFAULT_MAPPING_SOFTWARE),
            )
            .arg(path_arg("read1").short('1'))
            .arg(path_arg("read2").short('2').requires("read1"))
            .arg(path_arg("reference").short('r').required(true))
            .arg(path_arg("output").short('o').required(true))
            .arg(Arg::new("prefix").long("prefix").value_name("NAME"))
            .arg(
                Arg::new("threads")
                    .short('t')
                    .long("threads")
                    .value_parser(value_parser!(u16).range(1..))
                    .default_value("1"),
            )
            .arg(path_arg("bwa").default_value("bwa"))
            .arg(path_arg("bowtie2").default_value("bowtie2"))
            .arg(path_arg("minimap2").default_value("minimap2"))
            .arg(path_arg("samtools").default_value("samtools"))
            .arg(
                Arg::new("dry-run")
                    .long("dry-run")
                    .action(ArgAction::SetTrue),
            )
            .arg(
                Arg::new("skip-checks")
                    .long("skip-checks")
                    .action(ArgAction::SetTrue),
            ),
    );

    let completion_subcommand = add_logging_args(
        Command::new("shell-completion")
            .about("Generate a shell completion script for tbmap")
            .arg(
                Arg::new("output-file")
                    .short('o')
                    .long("output-file")
                    .required(true),
            )
            .arg(
                Arg::new("shell")
                    .long("shell")
                    .required(true)
                    .value_parser(value_parser!(Shell)),
            ),
    );

    Command::new("tbmap")
        .version(crate_version!())
        .about("Map sequencing reads into a sorted BAM file")
        .arg_required_else_help(true)
        .subcommand(map_subcommand)
        .subcommand(completion_subcommand)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_definition() {
        build_cli().debug_assert();
    }

    #[test]
    fn test_map_defaults() {
        let m = build_cli()
            .try_get_matches_from(vec![
                "tbmap", "map", "--platform", "Illumina", "-1", "a.fq", "-r", "ref.fa", "-o",
                "out.bam",
            ])
            .unwrap();
        let m = m.subcommand_matches("map").unwrap();
        assert_eq!("bwa", m.get_one::<String>("mapper").unwrap());
        assert_eq!(1, *m.get_one::<u16>("threads").unwrap());
        assert_eq!(None, m.get_one::<String>("read2"));
        assert!(!m.get_flag("dry-run"));
    }

    #[test]
    fn test_zero_threads_rejected() {
        assert!(build_cli()
            .try_get_matches_from(vec![
                "tbmap", "map", "--platform", "Illumina", "-1", "a.fq", "-r", "ref.fa", "-o",
                "out.bam", "-t", "0",
            ])
            .is_err());
    }
}

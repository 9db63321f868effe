use std::io::Read;
use std::process::{Child, ChildStdout, Command, Stdio};

use log;
use tempfile;
use tempfile::NamedTempFile;

use errors::{MappingError, Result};
use pipeline::Pipeline;

/// Run each stage of the pipeline with its stdout connected to the next
/// stage's stdin, and wait for all of them to finish. The STDERR of each
/// stage is collected in a temporary file and reported if that stage fails.
/// As with `set -o pipefail`, the last failing stage is the one returned, so
/// upstream stages killed by a broken pipe do not mask the real failure.
///
/// When `verbose` is set the equivalent shell command is logged at info
/// level, otherwise at debug level.
pub fn run_pipeline(pipeline: &Pipeline, verbose: bool) -> Result<()> {
    let cmd_string = pipeline.shell_command();
    if verbose {
        info!("Running command: {}", cmd_string);
    } else {
        debug!("Running command: {}", cmd_string);
    }
    if pipeline.stages.is_empty() {
        warn!("Empty pipeline given, nothing to run");
        return Ok(());
    }

    let last_index = pipeline.stages.len() - 1;
    let mut processes: Vec<Child> = vec![];
    let mut log_files: Vec<NamedTempFile> = vec![];
    let mut previous_stdout: Option<ChildStdout> = None;

    for (i, stage) in pipeline.stages.iter().enumerate() {
        let log_file = tempfile::Builder::new()
            .prefix(&format!("tbmap-{}-log", i))
            .tempfile()?;

        let mut cmd = Command::new(&stage.program);
        cmd.args(&stage.args)
            .stdin(match previous_stdout.take() {
                Some(out) => Stdio::from(out),
                None => Stdio::null(),
            })
            .stdout(if i == last_index {
                Stdio::null()
            } else {
                Stdio::piped()
            })
            .stderr(Stdio::from(log_file.reopen()?));
        debug!("Spawning stage {}: {:?}", i, cmd);

        match cmd.spawn() {
            Ok(mut child) => {
                previous_stdout = child.stdout.take();
                processes.push(child);
                log_files.push(log_file);
            }
            Err(e) => {
                error!("Failed to start {}: {}", stage.program, e);
                // Already running stages would otherwise be left waiting on
                // a pipe that never closes.
                for mut p in processes {
                    let _ = p.kill();
                    let _ = p.wait();
                }
                return Err(MappingError::Spawn {
                    program: stage.program.clone(),
                    source: e,
                });
            }
        }
    }

    complete_processes(pipeline, processes, log_files)
}

fn complete_processes(
    pipeline: &Pipeline,
    processes: Vec<Child>,
    log_files: Vec<NamedTempFile>,
) -> Result<()> {
    let mut last_failure: Option<MappingError> = None;
    for ((stage, mut process), log_file) in pipeline
        .stages
        .iter()
        .zip(processes.into_iter())
        .zip(log_files.iter())
    {
        let es = process.wait()?;
        let failed = !es.success();
        if failed || log_enabled!(log::Level::Debug) {
            let mut err = String::new();
            log_file.reopen()?.read_to_string(&mut err)?;
            if failed {
                error!(
                    "Error when running {}. Exitstatus was {}",
                    stage.program, es
                );
                error!("The STDERR for the {} part was: {}", stage.program, err);
                last_failure = Some(MappingError::StageFailed {
                    program: stage.program.clone(),
                    status: es,
                });
            } else {
                debug!("The STDERR for the {} part was: {}", stage.program, err);
            }
        }
    }

    match last_failure {
        Some(e) => {
            error!("Command run was: {}", pipeline.shell_command());
            Err(e)
        }
        None => {
            debug!("All {} pipeline stages finished", pipeline.stages.len());
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pipeline::CommandStage;
    use std::fs;

    fn init() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    #[test]
    fn test_three_stage_pipe() {
        init();
        let td = tempfile::TempDir::new().unwrap();
        let out = td.path().join("out.txt");
        let p = Pipeline::new()
            .pipe(CommandStage::new("printf").arg("b\\na\\nc\\n"))
            .pipe(CommandStage::new("sort"))
            .pipe(CommandStage::new("tee").arg(out.to_str().unwrap()));
        run_pipeline(&p, true).unwrap();
        assert_eq!("a\nb\nc\n", fs::read_to_string(&out).unwrap());
    }

    #[test]
    fn test_arguments_are_not_interpreted_by_a_shell() {
        init();
        let td = tempfile::TempDir::new().unwrap();
        let out = td.path().join("a file; with $(odd) chars");
        let p = Pipeline::new()
            .pipe(CommandStage::new("echo").arg("$HOME `x` ;"))
            .pipe(CommandStage::new("tee").arg(out.to_str().unwrap()));
        run_pipeline(&p, false).unwrap();
        assert_eq!("$HOME `x` ;\n", fs::read_to_string(&out).unwrap());
    }

    #[test]
    fn test_failing_stage_is_reported() {
        init();
        let p = Pipeline::new()
            .pipe(CommandStage::new("echo").arg("hello"))
            .pipe(CommandStage::new("sh").arg("-c").arg("cat >/dev/null; echo oops >&2; exit 3"));
        match run_pipeline(&p, false) {
            Err(MappingError::StageFailed { program, status }) => {
                assert_eq!("sh", program);
                assert_eq!(Some(3), status.code());
            }
            other => panic!("Unexpected result {:?}", other),
        }
    }

    #[test]
    fn test_downstream_failure_is_reported_over_broken_pipe() {
        init();
        // yes dies of SIGPIPE once sh exits, but sh is what went wrong.
        let p = Pipeline::new().pipe(CommandStage::new("yes")).pipe(
            CommandStage::new("sh")
                .arg("-c")
                .arg("echo 'cannot open output' >&2; exit 4"),
        );
        match run_pipeline(&p, false) {
            Err(MappingError::StageFailed { program, status }) => {
                assert_eq!("sh", program);
                assert_eq!(Some(4), status.code());
            }
            other => panic!("Unexpected result {:?}", other),
        }
    }

    #[test]
    fn test_missing_program() {
        init();
        let p = Pipeline::new()
            .pipe(CommandStage::new("echo").arg("hello"))
            .pipe(CommandStage::new("/nonexistent/tbmap-test-program"));
        match run_pipeline(&p, false) {
            Err(MappingError::Spawn { program, .. }) => {
                assert_eq!("/nonexistent/tbmap-test-program", program)
            }
            other => panic!("Unexpected result {:?}", other),
        }
    }
}

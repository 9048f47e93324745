use crate::error::{Error, Result};
use std::path::PathBuf;
use std::process::{Child, ChildStdout, Command, ExitStatus, Stdio};

/// Where the first stage reads from
#[derive(Debug, Clone)]
pub enum PipelineInput {
    /// Our own stdin
    Inherit,
    /// A file opened and redirected onto the first stage's stdin
    File(PathBuf),
    /// Closed stdin (source stages read from their address argument)
    Null,
}

/// One process in a pipeline
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineStage {
    pub program: PathBuf,
    pub args: Vec<String>,
    pub env: Vec<(String, String)>,
}

impl PipelineStage {
    pub fn new(program: impl Into<PathBuf>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
            env: Vec::new(),
        }
    }
}

/// A resolved chain of stages plus its input connection. The last stage
/// always writes to our inherited stdout.
#[derive(Debug, Clone)]
pub struct PipelineSpec {
    pub input: PipelineInput,
    pub stages: Vec<PipelineStage>,
}

impl PipelineSpec {
    /// No stages at all: the input streams straight through to stdout
    pub fn passthrough(input: PipelineInput) -> Self {
        Self {
            input,
            stages: Vec::new(),
        }
    }
}

/// Spawn every stage with pipes between them, wait for all of them, and
/// return the final stage's exit code (signal deaths map to 128+signal).
pub fn run(spec: &PipelineSpec) -> Result<i32> {
    if spec.stages.is_empty() {
        return copy_through(&spec.input);
    }

    let last = spec.stages.len() - 1;
    let mut children: Vec<Child> = Vec::with_capacity(spec.stages.len());
    let mut prev_stdout: Option<ChildStdout> = None;

    for (i, stage) in spec.stages.iter().enumerate() {
        let stdin = match prev_stdout.take() {
            // handing the previous stdout over leaves no copy in the
            // parent, so EOF propagates as soon as the producer exits
            Some(out) => Stdio::from(out),
            None => match &spec.input {
                PipelineInput::Inherit => Stdio::inherit(),
                PipelineInput::File(path) => {
                    let file = std::fs::File::open(path).map_err(|source| Error::SpawnFailed {
                        program: stage.program.clone(),
                        source,
                    })?;
                    Stdio::from(file)
                }
                PipelineInput::Null => Stdio::null(),
            },
        };

        let mut command = Command::new(&stage.program);
        command.args(&stage.args).stdin(stdin).stdout(if i == last {
            Stdio::inherit()
        } else {
            Stdio::piped()
        });
        for (key, value) in &stage.env {
            command.env(key, value);
        }

        match command.spawn() {
            Ok(mut child) => {
                if i != last {
                    prev_stdout = child.stdout.take();
                }
                children.push(child);
            }
            Err(source) => {
                for mut started in children {
                    let _ = started.kill();
                    let _ = started.wait();
                }
                return Err(Error::SpawnFailed {
                    program: stage.program.clone(),
                    source,
                });
            }
        }
    }

    let mut final_code = 0;
    for (i, child) in children.iter_mut().enumerate() {
        let status = child.wait()?;
        if i == last {
            final_code = exit_code(status);
        }
    }
    Ok(final_code)
}

/// Run several pipelines back to back (one per expanded glob file),
/// stopping at the first failure
pub fn run_all(specs: &[PipelineSpec]) -> Result<i32> {
    for spec in specs {
        let code = run(spec)?;
        if code != 0 {
            return Ok(code);
        }
    }
    Ok(0)
}

/// Empty pipeline: stream the input to stdout ourselves. A broken pipe
/// means the consumer stopped reading, which is a clean exit.
fn copy_through(input: &PipelineInput) -> Result<i32> {
    use std::io::Write;

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    let copied = match input {
        PipelineInput::Inherit => {
            let stdin = std::io::stdin();
            let mut lock = stdin.lock();
            std::io::copy(&mut lock, &mut out)
        }
        PipelineInput::File(path) => {
            let mut file = std::fs::File::open(path)?;
            std::io::copy(&mut file, &mut out)
        }
        PipelineInput::Null => Ok(0),
    };

    match copied.and_then(|_| out.flush().map(|_| 0)) {
        Ok(_) => Ok(0),
        Err(err) if err.kind() == std::io::ErrorKind::BrokenPipe => Ok(0),
        Err(err) => Err(err.into()),
    }
}

fn exit_code(status: ExitStatus) -> i32 {
    if let Some(code) = status.code() {
        return code;
    }
    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        if let Some(signal) = status.signal() {
            return 128 + signal;
        }
    }
    1
}

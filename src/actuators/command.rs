//! External program sinks (LCD script, speech synthesizer)

use std::io::Write;
use std::path::PathBuf;
use std::process::{Command, Stdio};

use super::{Sink, SinkError, SinkKind};

/// Sink that runs a program once per message, passing the text as the last argument
///
/// An optional stdin payload is written to the child before waiting on it,
/// e.g. the password for `sudo -S` when the display helper needs root.
pub struct CommandSink {
    kind: SinkKind,
    program: PathBuf,
    args: Vec<String>,
    stdin: Option<String>,
}

impl CommandSink {
    /// Create a sink, resolving `program` through `PATH` when possible
    ///
    /// An unresolved program is kept as given; each send will then fail and
    /// be logged by the dispatcher.
    pub fn new(kind: SinkKind, program: &str, args: Vec<String>, stdin: Option<String>) -> Self {
        let program = match which::which(program) {
            Ok(path) => path,
            Err(e) => {
                tracing::warn!(sink = %kind, "Could not locate {:?}: {}", program, e);
                PathBuf::from(program)
            }
        };
        Self {
            kind,
            program,
            args,
            stdin,
        }
    }

    pub fn program(&self) -> &PathBuf {
        &self.program
    }

    fn program_name(&self) -> String {
        self.program.display().to_string()
    }
}

impl Sink for CommandSink {
    fn kind(&self) -> SinkKind {
        self.kind
    }

    fn send(&mut self, text: &str) -> Result<(), SinkError> {
        let mut command = Command::new(&self.program);
        command
            .args(&self.args)
            .arg(text)
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .stdin(if self.stdin.is_some() { Stdio::piped() } else { Stdio::null() });

        let mut child = command.spawn().map_err(|source| SinkError::Spawn {
            program: self.program_name(),
            source,
        })?;

        if let (Some(payload), Some(mut pipe)) = (self.stdin.as_deref(), child.stdin.take()) {
            // The child may exit without reading; a broken pipe here is not a failure of its own.
            if let Err(e) = pipe.write_all(payload.as_bytes()) {
                tracing::debug!(sink = %self.kind, "stdin write to {} failed: {}", self.program_name(), e);
            }
        }

        let status = child.wait()?;
        if !status.success() {
            return Err(SinkError::ExitStatus {
                program: self.program_name(),
                status,
            });
        }
        Ok(())
    }
}

//! Recording command runner

use std::collections::HashMap;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use crate::command::{CommandOutput, CommandRunner};

/// One recorded invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedCommand {
    pub program: String,
    pub args: Vec<String>,
    pub cwd: PathBuf,
}

impl RecordedCommand {
    /// `program arg1 arg2 ...`
    pub fn command_line(&self) -> String {
        std::iter::once(self.program.as_str())
            .chain(self.args.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Records every command and answers with scripted output.
///
/// Responses are keyed by the command line prefix (`"git diff"`, `"zip"`);
/// the longest matching prefix wins. Unmatched commands succeed with empty
/// output.
#[derive(Clone, Default)]
pub struct RecordingRunner {
    calls: Arc<Mutex<Vec<RecordedCommand>>>,
    responses: Arc<Mutex<HashMap<String, CommandOutput>>>,
    unavailable: Arc<Mutex<Vec<String>>>,
}

impl RecordingRunner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond(&self, prefix: &str, output: CommandOutput) {
        self.responses
            .lock()
            .unwrap()
            .insert(prefix.to_string(), output);
    }

    /// Make spawning this program fail as if it were not installed.
    pub fn make_unavailable(&self, program: &str) {
        self.unavailable.lock().unwrap().push(program.to_string());
    }

    pub fn calls(&self) -> Vec<RecordedCommand> {
        self.calls.lock().unwrap().clone()
    }

    pub fn command_lines(&self) -> Vec<String> {
        self.calls().iter().map(RecordedCommand::command_line).collect()
    }
}

impl CommandRunner for RecordingRunner {
    fn run(&self, program: &str, args: &[&str], cwd: &Path) -> io::Result<CommandOutput> {
        let call = RecordedCommand {
            program: program.to_string(),
            args: args.iter().map(|a| a.to_string()).collect(),
            cwd: cwd.to_path_buf(),
        };
        let line = call.command_line();
        self.calls.lock().unwrap().push(call);

        if self.unavailable.lock().unwrap().iter().any(|p| p == program) {
            return Err(io::Error::new(
                io::ErrorKind::NotFound,
                format!("{}: command not found", program),
            ));
        }

        let responses = self.responses.lock().unwrap();
        let output = responses
            .iter()
            .filter(|(prefix, _)| line.starts_with(prefix.as_str()))
            .max_by_key(|(prefix, _)| prefix.len())
            .map(|(_, output)| output.clone())
            .unwrap_or_else(|| CommandOutput::ok(""));
        Ok(output)
    }
}

//! Sources of sar logs: files, standard input and the output of a local
//! command.

mod error;

use std::fmt;
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::{Path, PathBuf};
use std::process::{Child, Command, Stdio};

pub use error::{Error, FileOpenError, Result};

/// Opens a file at the given path and wraps it in a [`BufReader`].
///
/// # Errors
///
/// Returns a [`FileOpenError`] if the file cannot be opened.
///
/// # Example
/// ```no_run
/// # use sargraph::input;
/// let reader = input::open_file_reader("/var/log/sa/sar28")?;
/// # Ok::<(), input::FileOpenError>(())
/// ```
pub fn open_file_reader(
    path: impl AsRef<Path>,
) -> std::result::Result<BufReader<File>, FileOpenError> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|source| FileOpenError {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(BufReader::new(file))
}

/// Where a log is read from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Source {
    File(PathBuf),
    Stdin,
    /// A shell command whose standard output is the log, e.g.
    /// `sar -A -f /var/log/sa/sa28`.
    Command(String),
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Source::File(path) => write!(f, "file `{}`", path.display()),
            Source::Stdin => f.write_str("standard input"),
            Source::Command(command) => write!(f, "command `{command}`"),
        }
    }
}

impl Source {
    /// Opens the source for reading.
    ///
    /// # Errors
    ///
    /// Returns [`Error::FileOpen`] if a file cannot be opened and
    /// [`Error::Spawn`] if a command cannot be started.
    pub fn open(&self) -> Result<Input> {
        match self {
            Source::File(path) => Ok(Input {
                reader: Box::new(open_file_reader(path)?),
                child: None,
            }),
            Source::Stdin => Ok(Input {
                reader: Box::new(BufReader::new(io::stdin())),
                child: None,
            }),
            Source::Command(command) => spawn(command),
        }
    }
}

fn spawn(command: &str) -> Result<Input> {
    let mut child = Command::new("sh")
        .arg("-c")
        .arg(command)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .spawn()
        .map_err(|source| Error::Spawn {
            command: command.to_owned(),
            source,
        })?;
    let stdout = child.stdout.take().ok_or_else(|| Error::MissingStdout {
        command: command.to_owned(),
    })?;
    log::debug!("started `{command}` as pid {}", child.id());
    Ok(Input {
        reader: Box::new(BufReader::new(stdout)),
        child: Some(RunningCommand {
            command: command.to_owned(),
            child,
        }),
    })
}

#[derive(Debug)]
struct RunningCommand {
    command: String,
    child: Child,
}

/// An open source. Commands must be reaped with [`Input::finish`].
pub struct Input {
    reader: Box<dyn BufRead + Send>,
    child: Option<RunningCommand>,
}

impl fmt::Debug for Input {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Input")
            .field("child", &self.child)
            .finish_non_exhaustive()
    }
}

impl Input {
    pub fn reader(&mut self) -> &mut (dyn BufRead + Send) {
        &mut *self.reader
    }

    /// Closes the source, waiting for a command to exit.
    ///
    /// With `stopped_early` the command is killed first and its exit status
    /// is not checked.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Wait`] if the command cannot be reaped and
    /// [`Error::CommandFailed`] if it ran to completion unsuccessfully.
    pub fn finish(self, stopped_early: bool) -> Result<()> {
        let Input { reader, child } = self;
        drop(reader);
        let Some(RunningCommand { command, mut child }) = child else {
            return Ok(());
        };
        if stopped_early {
            if let Err(err) = child.kill() {
                log::debug!("failed to kill `{command}`: {err}");
            }
        }
        let status = child.wait().map_err(|source| Error::Wait {
            command: command.clone(),
            source,
        })?;
        log::debug!("`{command}` exited with {status}");
        if !stopped_early && !status.success() {
            return Err(Error::CommandFailed { command, status });
        }
        Ok(())
    }
}

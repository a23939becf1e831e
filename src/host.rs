//! Host-side collaborators: open documents, opening a file, and asking the user to pick.

use std::io::{BufRead as _, Write as _};
use std::path::{Path, PathBuf};
use std::process::Command;
use std::sync::{Arc, PoisonError, RwLock};

use crate::error::Error;

/// Lets the user pick one of several equally good candidates.
pub trait Chooser: Send + Sync {
    /// Present `options` in order. `None` means the user cancelled.
    ///
    /// # Errors
    ///
    /// Returns `Error::Io` if the prompt cannot be shown or read.
    fn present_choice(&self, options: &[PathBuf]) -> Result<Option<PathBuf>, Error>;
}

/// Documents the host already has open. Checked before the index.
pub trait OpenDocuments: Send + Sync {
    /// Paths of the open documents, oldest first.
    fn list_open(&self) -> Vec<PathBuf>;
}

/// Shows a resolved file to the user.
pub trait Opener: Send + Sync {
    /// Open `path`.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened.
    fn open(&self, path: &Path) -> Result<(), Error>;
}

/// Runs a configured program with the path appended, e.g. `code -g`.
#[derive(Debug)]
pub struct CommandOpener {
    /// Leading arguments passed before the path.
    args: Vec<String>,
    /// Program to execute.
    program: String,
}

impl CommandOpener {
    /// Split a command line on whitespace. Returns `None` for a blank command.
    pub fn parse(command: &str) -> Option<Self> {
        let mut words = command.split_whitespace().map(String::from);
        let program = words.next()?;
        return Some(Self {
            args: words.collect(),
            program,
        });
    }
}

impl Opener for CommandOpener {
    fn open(&self, path: &Path) -> Result<(), Error> {
        let status = Command::new(&self.program).args(&self.args).arg(path).status()?;
        if !status.success() {
            return Err(Error::Io(std::io::Error::other(format!(
                "`{}` exited with {status}",
                self.program
            ))));
        }
        return Ok(());
    }
}

/// Prints the options and picks nothing. For scripts and `--no-prompt`.
#[derive(Debug, Default)]
pub struct ListChooser;

impl Chooser for ListChooser {
    fn present_choice(&self, options: &[PathBuf]) -> Result<Option<PathBuf>, Error> {
        for option in options {
            println!("{}", option.display());
        }
        return Ok(None);
    }
}

/// Forwards to another opener and remembers what was opened.
pub struct RecordingOpener {
    /// Document list that learns about every opened file.
    documents: Arc<SessionDocuments>,
    /// Opener doing the actual work.
    inner: Box<dyn Opener>,
}

impl RecordingOpener {
    /// Wrap `inner`, recording into `documents`.
    pub fn new(inner: Box<dyn Opener>, documents: Arc<SessionDocuments>) -> Self {
        return Self { documents, inner };
    }
}

impl Opener for RecordingOpener {
    fn open(&self, path: &Path) -> Result<(), Error> {
        self.inner.open(path)?;
        self.documents.record(path);
        return Ok(());
    }
}

/// Documents known to be open in this process: the `--open` arguments plus
/// everything a session has toggled to.
#[derive(Debug, Default)]
pub struct SessionDocuments {
    /// Open paths, oldest first, without duplicates.
    open: RwLock<Vec<PathBuf>>,
}

impl SessionDocuments {
    /// Start with `initial` already open.
    pub fn new(initial: Vec<PathBuf>) -> Self {
        let documents = Self::default();
        for path in initial {
            documents.record(&path);
        }
        return documents;
    }

    /// Mark `path` as open.
    pub fn record(&self, path: &Path) {
        let mut open = self.open.write().unwrap_or_else(PoisonError::into_inner);
        if !open.iter().any(|p| return p == path) {
            open.push(path.to_path_buf());
        }
    }
}

impl OpenDocuments for SessionDocuments {
    fn list_open(&self) -> Vec<PathBuf> {
        return self.open.read().unwrap_or_else(PoisonError::into_inner).clone();
    }
}

/// Prints the path on stdout so a caller can pipe it into an editor.
#[derive(Debug, Default)]
pub struct StdoutOpener;

impl Opener for StdoutOpener {
    fn open(&self, path: &Path) -> Result<(), Error> {
        println!("{}", path.display());
        return Ok(());
    }
}

/// Numbered prompt on stderr, answered on stdin.
#[derive(Debug, Default)]
pub struct TerminalChooser;

impl Chooser for TerminalChooser {
    fn present_choice(&self, options: &[PathBuf]) -> Result<Option<PathBuf>, Error> {
        let mut stderr = std::io::stderr().lock();
        writeln!(stderr, "Select a file to open:")?;
        for (n, option) in options.iter().enumerate() {
            writeln!(stderr, "  {}) {}", n.saturating_add(1), option.display())?;
        }
        write!(stderr, "> ")?;
        stderr.flush()?;
        drop(stderr);

        let mut answer = String::new();
        std::io::stdin().lock().read_line(&mut answer)?;
        return Ok(parse_selection(&answer, options.len())
            .and_then(|i| return options.get(i))
            .cloned());
    }
}

/// Turn a one-based answer into an index. Blank or out-of-range input cancels.
fn parse_selection(answer: &str, count: usize) -> Option<usize> {
    let n: usize = answer.trim().parse().ok()?;
    if n == 0 || n > count {
        return None;
    }
    return Some(n.saturating_sub(1));
}

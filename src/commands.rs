//! CLI commands for toggler: toggle, index, session.

use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

use crate::config::Config;
use crate::diagnostics;
use crate::error::Error;
use crate::host::{
    Chooser, CommandOpener, ListChooser, OpenDocuments, Opener, RecordingOpener, SessionDocuments,
    StdoutOpener, TerminalChooser,
};
use crate::index::FileIndex;
use crate::toggle::Toggler;
use crate::types::{ResolutionResult, ToggleOutcome};
use crate::watch::{self, FileWatcher};
use crate::workspace::{FsWorkspace, Workspace};

/// Exit code when no companion was opened.
const EXIT_NOT_OPENED: u8 = 1;

/// Exit code when a companion was opened.
const EXIT_OPENED: u8 = 0;

/// One line of session input.
#[derive(Debug, PartialEq, Eq)]
enum SessionCommand {
    /// `:root DIR`: add a workspace folder.
    AddRoot(PathBuf),
    /// Blank line.
    Empty,
    /// `:quit`.
    Quit,
    /// `:rescan`: rebuild the index from disk.
    Rescan,
    /// Any other line: a file to toggle from.
    Toggle(PathBuf),
    /// A `:` command that does not exist.
    Unknown(String),
}

/// Config, workspace, and index shared by every command.
struct Workbench {
    /// Loaded configuration with CLI overrides applied.
    config: Config,
    /// Index built at startup.
    index: Arc<FileIndex>,
    /// Filesystem workspace over the usable roots.
    workspace: Arc<FsWorkspace>,
}

impl Workbench {
    /// Wire a toggler that records opened files into `documents`.
    fn toggler(&self, documents: Arc<SessionDocuments>, no_prompt: bool) -> Toggler {
        let inner: Box<dyn Opener> = match self.config.open_command.as_deref().and_then(CommandOpener::parse) {
            Some(command) => Box::new(command),
            None => Box::new(StdoutOpener),
        };
        let chooser: Box<dyn Chooser> = if no_prompt {
            Box::new(ListChooser)
        } else {
            Box::new(TerminalChooser)
        };
        return Toggler::new(
            Arc::clone(&self.index),
            Arc::clone(&self.workspace) as Arc<dyn Workspace>,
            Arc::clone(&documents) as Arc<dyn OpenDocuments>,
            Box::new(RecordingOpener::new(inner, documents)),
            chooser,
            self.config.search_limit,
        );
    }
}

/// Make `path` absolute, canonical when it exists so it shares the roots' prefix.
///
/// # Errors
///
/// Returns `Error::Io` if the current directory cannot be read.
fn absolute(path: &Path) -> Result<PathBuf, Error> {
    return match std::fs::canonicalize(path) {
        Ok(canonical) => Ok(canonical),
        Err(_) => Ok(std::path::absolute(path)?),
    };
}

/// Add a workspace folder during a session, watch it, and rebuild.
fn add_root(bench: &Workbench, watcher: &mut FileWatcher, dir: &Path) {
    let Ok(root) = std::fs::canonicalize(dir) else {
        eprintln!("session: no such directory: {}", dir.display());
        return;
    };
    if !root.is_dir() {
        eprintln!("session: not a directory: {}", root.display());
        return;
    }
    if !bench.workspace.add_root(root.clone()) {
        eprintln!("session: already watching {}", root.display());
        return;
    }
    if let Err(e) = watcher.watch(&root) {
        diagnostics::print_error(&e);
    }
    rebuild_index(&bench.index, &bench.workspace);
}

/// Exit status for a finished toggle: success only if a file was actually opened.
/// Not found, a cancelled selection, and an unprompted tie all exit non-zero.
const fn exit_status_for(outcome: &ToggleOutcome) -> u8 {
    return if outcome.opened.is_some() {
        EXIT_OPENED
    } else {
        EXIT_NOT_OPENED
    };
}

/// Build the index and print every file name with its locations.
///
/// # Errors
///
/// Returns errors from config loading or glob compilation.
pub fn index(roots: &[PathBuf]) -> Result<ExitCode, Error> {
    let bench = prepare(roots)?;
    if bench.index.is_empty() {
        eprintln!("no .c, .cpp, or .h files found");
        return Ok(ExitCode::from(EXIT_NOT_OPENED));
    }
    let entries = bench.index.entries();
    for entry in &entries {
        println!("{}", entry.base_name);
        for location in &entry.locations {
            println!("  {}", location.display());
        }
    }
    let count = entries.len();
    eprintln!("{count} unique files indexed");
    return Ok(ExitCode::SUCCESS);
}

/// Parse one line of session input.
fn parse_session_command(line: &str) -> SessionCommand {
    let line = line.trim();
    if line.is_empty() {
        return SessionCommand::Empty;
    }
    if let Some(dir) = line.strip_prefix(":root ") {
        return SessionCommand::AddRoot(PathBuf::from(dir.trim()));
    }
    return match line {
        ":q" | ":quit" => SessionCommand::Quit,
        ":rescan" => SessionCommand::Rescan,
        other if other.starts_with(':') => SessionCommand::Unknown(other.to_string()),
        other => SessionCommand::Toggle(PathBuf::from(other)),
    };
}

/// Load config, build the workspace, and index it.
/// Index failures are reported but not fatal: toggling degrades to live search.
///
/// # Errors
///
/// Returns errors from config loading or glob compilation.
fn prepare(roots: &[PathBuf]) -> Result<Workbench, Error> {
    let cwd = std::env::current_dir()?;
    let mut config = Config::load(&cwd)?;
    config.override_roots(&cwd, roots);

    let workspace = Arc::new(FsWorkspace::new(config.usable_roots(), config.filter()?));
    let index = Arc::new(FileIndex::default());
    rebuild_index(&index, &workspace);

    return Ok(Workbench {
        config,
        index,
        workspace,
    });
}

/// Rebuild the index, printing a diagnostic instead of failing.
fn rebuild_index(index: &FileIndex, workspace: &FsWorkspace) {
    match index.rebuild(workspace) {
        Ok(unique) => log::info!("index: ready with {unique} unique files"),
        Err(e) => diagnostics::print_error(&e),
    }
}

/// Tell the user when nothing could be opened.
fn report(result: &ResolutionResult, active: &Path) {
    if *result == ResolutionResult::NotFound {
        eprintln!("not found: no companion for {}", active.display());
    }
}

/// Long-running mode: keep the index live and toggle each path read from stdin.
///
/// # Errors
///
/// Returns errors from config loading, watcher setup, or reading stdin.
pub fn session(roots: &[PathBuf], no_prompt: bool) -> Result<ExitCode, Error> {
    let bench = prepare(roots)?;
    let mut watcher = FileWatcher::start(&bench.workspace.roots())?;
    let updater = watch::spawn_updater(Arc::clone(&bench.index), Arc::clone(&bench.workspace), watcher.events());

    let documents = Arc::new(SessionDocuments::default());
    let toggler = bench.toggler(Arc::clone(&documents), no_prompt);

    let unique = bench.index.len();
    eprintln!("session: {unique} unique files indexed; enter a path, :rescan, :root DIR, or :quit");

    let stdin = std::io::stdin();
    let mut line = String::new();
    loop {
        line.clear();
        if stdin.read_line(&mut line)? == 0 {
            break;
        }
        match parse_session_command(&line) {
            SessionCommand::AddRoot(dir) => add_root(&bench, &mut watcher, &dir),
            SessionCommand::Empty => {},
            SessionCommand::Quit => break,
            SessionCommand::Rescan => rebuild_index(&bench.index, &bench.workspace),
            SessionCommand::Toggle(path) => session_toggle(&toggler, &documents, &path)?,
            SessionCommand::Unknown(command) => eprintln!("session: unknown command {command}"),
        }
    }

    drop(watcher);
    match updater.join() {
        Ok(applied) => log::debug!("session: {applied} index updates applied"),
        Err(_) => log::warn!("session: index updater panicked"),
    }
    return Ok(ExitCode::SUCCESS);
}

/// Toggle one path inside a session. Toggle errors are printed, not fatal.
///
/// # Errors
///
/// Returns `Error::Io` if the current directory cannot be read.
fn session_toggle(toggler: &Toggler, documents: &SessionDocuments, path: &Path) -> Result<(), Error> {
    let active = absolute(path)?;
    documents.record(&active);
    match toggler.toggle(&active) {
        Ok(outcome) => report(&outcome.result, &active),
        Err(e) => diagnostics::print_error(&e),
    }
    return Ok(());
}

/// Toggle once from `file` and exit.
///
/// # Errors
///
/// Returns errors from config loading, an unsupported active file, or the opener.
pub fn toggle(roots: &[PathBuf], file: &Path, open: &[PathBuf], no_prompt: bool) -> Result<ExitCode, Error> {
    let bench = prepare(roots)?;
    let open_documents = open.iter().map(|p| return absolute(p)).collect::<Result<Vec<_>, _>>()?;
    let documents = Arc::new(SessionDocuments::new(open_documents));
    let toggler = bench.toggler(documents, no_prompt);

    let active = absolute(file)?;
    let outcome = toggler.toggle(&active)?;
    report(&outcome.result, &active);
    return Ok(ExitCode::from(exit_status_for(&outcome)));
}

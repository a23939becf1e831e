use std::path::{Path, PathBuf};

use crate::error::Error;
use crate::resolver::DEFAULT_SEARCH_LIMIT;
use crate::scanner::FileFilter;

/// Name of the optional config file in the workspace directory.
pub const CONFIG_FILE: &str = ".toggler.toml";

/// Glob every indexed file must match.
const DEFAULT_INCLUDE: &str = "**/*.{c,cpp,h}";

/// Globs excluded from indexing and live search.
const DEFAULT_EXCLUDE: &[&str] = &["**/node_modules/**"];

/// Workspace configuration loaded from `.toggler.toml`.
/// Roots are absolute once loaded; include/exclude are globs relative to each root.
#[derive(Debug, Clone)]
pub struct Config {
    /// Globs removed from the workspace.
    pub exclude: Vec<String>,
    /// Glob a file must match to be indexed.
    pub include: String,
    /// Program used to open a resolved file, with the path appended.
    pub open_command: Option<String>,
    /// Workspace folders.
    pub roots: Vec<PathBuf>,
    /// Live-search cap per companion name.
    pub search_limit: usize,
}

/// Raw TOML structure for `.toggler.toml`.
#[derive(serde::Deserialize)]
#[serde(deny_unknown_fields)]
struct TogglerTomlConfig {
    #[serde(default)]
    exclude: Option<Vec<String>>,
    #[serde(default)]
    include: Option<String>,
    #[serde(default)]
    open_command: Option<String>,
    #[serde(default)]
    roots: Option<Vec<PathBuf>>,
    #[serde(default)]
    search_limit: Option<usize>,
}

impl Config {
    /// Compile the include/exclude globs.
    ///
    /// # Errors
    ///
    /// Returns `Error::Glob` if a pattern is malformed.
    pub fn filter(&self) -> Result<FileFilter, Error> {
        return FileFilter::new(&self.include, &self.exclude);
    }

    /// Load config from `.toggler.toml` in `dir`.
    /// Returns defaults rooted at `dir` if the file doesn't exist. Returns an error if
    /// the file exists but is malformed; never silently falls back to defaults when the
    /// user wrote a config file.
    ///
    /// # Errors
    ///
    /// Returns `Error::Io` if reading fails (other than not-found), `Error::TomlDe` if
    /// the TOML is malformed, or `Error::ConfigInvalid` for unusable values.
    pub fn load(dir: &Path) -> Result<Self, Error> {
        let path = dir.join(CONFIG_FILE);
        let content = match std::fs::read_to_string(&path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Self::rooted_at(dir)),
            Err(e) => return Err(Error::Io(e)),
        };
        return Self::parse(&content, dir, &path);
    }

    /// Replace the configured roots, e.g. from `--root` flags. Relative roots are
    /// taken relative to `dir`. An empty list keeps the configured roots.
    pub fn override_roots(&mut self, dir: &Path, roots: &[PathBuf]) {
        if roots.is_empty() {
            return;
        }
        self.roots = roots.iter().map(|r| return dir.join(r)).collect();
    }

    /// Canonical roots that exist on disk. Missing roots are logged and skipped.
    pub fn usable_roots(&self) -> Vec<PathBuf> {
        let mut usable = Vec::new();
        for root in &self.roots {
            match std::fs::canonicalize(root) {
                Ok(canonical) if canonical.is_dir() => {
                    if !usable.contains(&canonical) {
                        usable.push(canonical);
                    }
                },
                Ok(_) => log::warn!("config: root is not a directory: {}", root.display()),
                Err(e) => log::warn!("config: skipping root {}: {e}", root.display()),
            }
        }
        return usable;
    }

    /// Parse config text, resolving relative roots against `dir`.
    ///
    /// # Errors
    ///
    /// Returns `Error::TomlDe` for malformed TOML or `Error::ConfigInvalid` for
    /// unusable values.
    fn parse(content: &str, dir: &Path, path: &Path) -> Result<Self, Error> {
        let raw: TogglerTomlConfig = toml::from_str(content)?;
        let invalid = |reason: &str| {
            return Error::ConfigInvalid {
                path: path.to_path_buf(),
                reason: reason.to_string(),
            };
        };

        let search_limit = raw.search_limit.unwrap_or(DEFAULT_SEARCH_LIMIT);
        if search_limit == 0 {
            return Err(invalid("search_limit must be at least 1"));
        }
        if raw.open_command.as_deref().is_some_and(|c| return c.trim().is_empty()) {
            return Err(invalid("open_command must not be blank"));
        }

        let defaults = Self::rooted_at(dir);
        let config = Self {
            exclude: raw.exclude.unwrap_or(defaults.exclude),
            include: raw.include.unwrap_or(defaults.include),
            open_command: raw.open_command,
            roots: raw
                .roots
                .map_or(defaults.roots, |roots| return roots.iter().map(|r| return dir.join(r)).collect()),
            search_limit,
        };
        // Surface bad globs at load time rather than on first scan.
        config.filter()?;
        return Ok(config);
    }

    /// Default config with `dir` as the only root.
    fn rooted_at(dir: &Path) -> Self {
        return Self {
            exclude: DEFAULT_EXCLUDE.iter().map(|s| return (*s).to_string()).collect(),
            include: DEFAULT_INCLUDE.to_string(),
            open_command: None,
            roots: vec![dir.to_path_buf()],
            search_limit: DEFAULT_SEARCH_LIMIT,
        };
    }
}

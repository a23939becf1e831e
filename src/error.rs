/// Crate-level error types for toggler diagnostics.
use std::path::PathBuf;

/// Every error names the file, root, or reason for failure so the CLI can print a
/// useful diagnostic. Ambiguous and missing companions are results, not errors.
#[allow(clippy::error_impl_error, reason = "crate-internal error type in binary")]
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The config file exists but a value in it cannot be used.
    #[error("invalid config {}: {reason}", path.display())]
    ConfigInvalid {
        /// Path to the offending config file.
        path: PathBuf,
        /// Description of the problem.
        reason: String,
    },

    /// An include or exclude pattern failed to compile.
    #[error("glob: {0}")]
    Glob(
        /// The wrapped globset error.
        #[from]
        globset::Error,
    ),

    /// Enumerating the workspace failed. The previous index is kept.
    #[error("index build failed: {reason}")]
    IndexBuildFailed {
        /// Description of the enumeration failure.
        reason: String,
    },

    /// Underlying I/O error from the filesystem.
    #[error("io: {0}")]
    Io(
        /// The wrapped I/O error.
        #[from]
        std::io::Error,
    ),

    /// TOML deserialization failed.
    #[error("toml deserialize: {0}")]
    TomlDe(
        /// The wrapped TOML deserialization error.
        #[from]
        toml::de::Error,
    ),

    /// The active file is not a `.c`, `.cpp`, or `.h` file.
    #[error("unsupported extension: {}", path.display())]
    UnsupportedExtension {
        /// The active file that cannot be toggled.
        path: PathBuf,
    },

    /// The filesystem watcher could not be created or attached.
    #[error("watch: {0}")]
    Watch(
        /// The wrapped notify error.
        #[from]
        notify::Error,
    ),

    /// No usable workspace root is configured.
    #[error("no workspace root available")]
    WorkspaceUnavailable,
}

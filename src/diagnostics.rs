use crate::config::CONFIG_FILE;
use crate::error::Error;

const BOLD: &str = "\x1b[1m";
const RESET: &str = "\x1b[0m";

/// Render an error as markdown with bold headings and print to stderr.
pub fn print_error(e: &Error) {
    let md = render_error(e);
    for line in md.lines() {
        if line.starts_with('#') {
            eprintln!("{BOLD}{line}{RESET}");
        } else {
            eprintln!("{line}");
        }
    }
}

/// Render an error as a structured markdown diagnostic: what happened and how to fix it.
pub fn render_error(e: &Error) -> String {
    match e {
        Error::UnsupportedExtension { path } => render_unsupported_extension(&path.display().to_string()),
        Error::WorkspaceUnavailable => render_workspace_unavailable(),
        Error::IndexBuildFailed { reason } => render_index_build_failed(reason),
        Error::ConfigInvalid { path, reason } => format!("\
# Error: Invalid Config

`{}`: {reason}
", path.display()),
        Error::Glob(err) => format!("\
# Error: Bad Glob Pattern

{err}

## Fix

Check the `include` and `exclude` patterns in `{CONFIG_FILE}`.
"),
        _ => format!("\
# Error

{e}
"),
    }
}

fn render_index_build_failed(reason: &str) -> String {
    format!("\
# Error: Index Build Failed

{reason}

The previous index was kept. Toggling still works through live search.
")
}

fn render_unsupported_extension(file: &str) -> String {
    format!("\
# Error: Unsupported File

`{file}` is not a `.c`, `.cpp`, or `.h` file.

## Fix

Run `toggler toggle` on a C or C++ source or header file.
")
}

fn render_workspace_unavailable() -> String {
    format!("\
# Error: No Workspace

None of the configured roots exist.

## Fix

Pass `--root <DIR>` or set `roots` in `{CONFIG_FILE}`.
")
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;

    #[test]
    fn unsupported_extension_names_the_file() {
        let md = render_error(&Error::UnsupportedExtension {
            path: PathBuf::from("/w/main.rs"),
        });
        assert!(md.starts_with("# Error: Unsupported File"));
        assert!(md.contains("`/w/main.rs`"));
    }

    #[test]
    fn workspace_unavailable_suggests_root_flag() {
        let md = render_error(&Error::WorkspaceUnavailable);
        assert!(md.contains("--root"));
        assert!(md.contains(CONFIG_FILE));
    }

    #[test]
    fn generic_errors_fall_back_to_display() {
        let md = render_error(&Error::Io(std::io::Error::other("boom")));
        assert!(md.contains("io: boom"));
    }
}

use aspid::Error;

pub const RED: &str = "\x1b[0;31m";
pub const GREEN: &str = "\x1b[0;32m";
pub const RESET: &str = "\x1b[0m";

/// Diagnostics go to stderr in red; syntax errors carry a source snippet.
pub fn error(src: &str, error: &Error) {
  match error {
    Error::Syntax(e) => eprintln!("{RED}{}{RESET}", e.report(src, false)),
    Error::Bind(diagnostics) => {
      for d in diagnostics {
        eprintln!("{RED}{d}{RESET}");
      }
    }
    e @ Error::Runtime(_) => eprintln!("{RED}{e}{RESET}"),
  }
}

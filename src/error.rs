use std::error::Error as StdError;
use std::fmt::Display;

use span::Span;
use syntax::SyntaxError;

pub type Result<T, E = Error> = core::result::Result<T, E>;

/// A binder diagnostic: a human readable message anchored to source.
#[derive(Clone, Debug)]
pub struct Diagnostic {
  pub message: String,
  pub span: Span,
}

impl Diagnostic {
  pub fn new(message: impl Into<String>, span: Span) -> Self {
    Diagnostic {
      message: message.into(),
      span,
    }
  }
}

impl Display for Diagnostic {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    write!(f, "{}", self.message)
  }
}

/// An error raised while evaluating a statement. Reported by the CLI as
/// `Runtime Error: <message>`.
#[derive(Clone, Debug)]
pub struct RuntimeError {
  pub message: String,
}

impl RuntimeError {
  pub fn new(message: impl Into<String>) -> Self {
    RuntimeError {
      message: message.into(),
    }
  }
}

impl Display for RuntimeError {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    write!(f, "{}", self.message)
  }
}

impl StdError for RuntimeError {}

#[derive(Debug)]
pub enum Error {
  Syntax(SyntaxError),
  Bind(Vec<Diagnostic>),
  Runtime(RuntimeError),
}

impl From<SyntaxError> for Error {
  fn from(value: SyntaxError) -> Self {
    Error::Syntax(value)
  }
}

impl From<RuntimeError> for Error {
  fn from(value: RuntimeError) -> Self {
    Error::Runtime(value)
  }
}

impl Display for Error {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    match self {
      Error::Syntax(e) => {
        write!(f, "{e}")
      }
      Error::Bind(diagnostics) => {
        let mut first = true;
        for d in diagnostics {
          if !first {
            writeln!(f)?;
          }
          write!(f, "{d}")?;
          first = false;
        }
        Ok(())
      }
      Error::Runtime(e) => {
        write!(f, "Runtime Error: {e}")
      }
    }
  }
}

impl StdError for Error {}

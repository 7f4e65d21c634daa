use beef::lean::Cow;
use span::Span;

pub mod ast;
pub mod lexer;
pub mod parser;

pub use parser::parse;

pub type Result<T, E = SyntaxError> = std::result::Result<T, E>;

/// A fatal lex or parse error. The front end stops at the first one.
#[derive(Clone, Debug)]
pub struct SyntaxError {
  pub message: Cow<'static, str>,
  pub span: Span,
}

impl SyntaxError {
  pub fn new(message: impl Into<Cow<'static, str>>, span: impl Into<Span>) -> Self {
    let message = message.into();
    let span = span.into();
    SyntaxError { message, span }
  }

  /// Render the error together with the offending line of `src`.
  pub fn report(&self, src: &str, use_color: bool) -> String {
    let mut span = self.span;
    span.end = span.end.min(src.len());
    if span.is_empty() || span.start >= src.len() {
      return self.message.to_string();
    }

    let line_start = src[..span.start].rfind('\n').map(|i| i + 1).unwrap_or(0);
    let line_end = src[span.end..]
      .find('\n')
      .map(|i| i + span.end)
      .unwrap_or(src.len());

    let (c, r) = if use_color {
      ("\x1b[4;31m", "\x1b[0m")
    } else {
      ("", "")
    };

    let pre = &src[line_start..span.start];
    let content = &src[span.start..span.end];
    let post = &src[span.end..line_end];

    format!("{}\n| {pre}{c}{content}{r}{post}", self.message)
  }
}

impl std::error::Error for SyntaxError {}

impl std::fmt::Display for SyntaxError {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    write!(f, "{}", self.message)
  }
}

//! Aspid: a small gradually typed, indentation sensitive scripting language.
//!
//! Source text runs through four stages: the lexer folds lines into
//! INDENT/DEDENT/NEWLINE markers and desugars f-strings, the parser builds a
//! syntax tree, the binder resolves names and types into a bound tree while
//! collecting diagnostics, and the evaluator walks the bound tree against a
//! runtime scope stack.
//!
//! ```
//! let mut vm = aspid::Aspid::new();
//! let value = vm.eval("1 + 2 * 3").unwrap();
//! assert_eq!(value.unwrap().to_string(), "7");
//! ```

pub mod binder;
pub mod bound;
pub mod builtins;
pub mod error;
pub mod eval;
pub mod ops;
pub mod scope;
pub mod symbol;
pub mod value;

use std::io::{self, BufRead, BufReader};

pub use crate::error::{Diagnostic, Error, Result, RuntimeError};
pub use crate::value::Value;
pub use syntax::SyntaxError;

use crate::binder::Binder;
use crate::eval::{Evaluator, Stdout};

/// The engine: a persistent binder and evaluator pair, so a REPL session
/// keeps its globals between inputs.
pub struct Aspid {
  binder: Binder,
  eval: Evaluator,
}

impl Aspid {
  pub fn new() -> Self {
    Self::with_io(
      Box::new(io::stdout()),
      Box::new(BufReader::new(io::stdin())),
    )
  }

  /// An engine with its I/O swapped out, e.g. a buffer capturing `print`.
  pub fn with_io(stdout: Box<dyn Stdout>, stdin: Box<dyn BufRead>) -> Self {
    let builtins = builtins::all();
    let binder = Binder::new(&builtins);
    let eval = Evaluator::with_io(&builtins, stdout, stdin);
    Aspid { binder, eval }
  }

  /// Execute `src`. Statements bind one at a time: a statement whose binding
  /// produced diagnostics is skipped, the rest still run, and the collected
  /// diagnostics surface at the end. Lex/parse and runtime errors abort
  /// immediately.
  ///
  /// Returns the value of the final statement when it was a non-void
  /// expression, for the REPL echo.
  pub fn eval(&mut self, src: &str) -> Result<Option<Value>> {
    let module = syntax::parse(src)?;

    let mut last = None;
    let mut diagnostics = vec![];
    for stmt in &module.body {
      let bound = self.binder.bind(stmt);
      let errors = self.binder.take_diagnostics();
      if errors.is_empty() {
        last = self.eval.run(&bound)?;
      } else {
        diagnostics.extend(errors);
      }
    }

    if diagnostics.is_empty() {
      Ok(last)
    } else {
      Err(Error::Bind(diagnostics))
    }
  }

  /// The output sink, for tests that capture what `print` wrote.
  pub fn io(&self) -> &dyn Stdout {
    self.eval.io()
  }

  /// Fix the PRNG behind `random`, for deterministic tests.
  pub fn seed_rng(&mut self, seed: u64) {
    self.eval.seed_rng(seed);
  }
}

impl Default for Aspid {
  fn default() -> Self {
    Self::new()
  }
}

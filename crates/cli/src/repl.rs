use aspid::Aspid;
use rustyline::error::ReadlineError;
use rustyline::Editor;

use crate::report;
use crate::report::{GREEN, RESET};

const VERSION: &str = env!("CARGO_PKG_VERSION");

struct Repl {
  vm: Aspid,
  editor: Editor<()>,
}

impl Repl {
  fn new() -> rustyline::Result<Self> {
    Ok(Self {
      vm: Aspid::new(),
      editor: Editor::new()?,
    })
  }

  fn read_multi_line_input(&mut self, buffer: &mut String) -> rustyline::Result<()> {
    loop {
      let prompt = if buffer.is_empty() { "> " } else { ". " };
      let line = self.editor.readline(prompt)?;
      self.editor.add_history_entry(&line);

      if !buffer.is_empty() {
        buffer.push('\n');
      }
      buffer.push_str(&line);

      if incomplete(buffer) {
        continue;
      }
      return Ok(());
    }
  }

  fn eval(&mut self, input: &str) {
    match self.vm.eval(input) {
      Ok(Some(value)) => println!("{GREEN}{value}{RESET}"),
      Ok(None) => {}
      Err(error) => report::error(input, &error),
    }
  }
}

/// A line ending in `:` opens a block, and an indented last line continues
/// one; either way the input is not complete yet. A blank line closes the
/// open block.
fn incomplete(input: &str) -> bool {
  fn is_empty(line: &str) -> bool {
    line.trim().is_empty()
  }

  fn is_indented(line: &str) -> bool {
    line.starts_with(|c: char| c.is_ascii_whitespace())
  }

  fn begins_block(line: &str) -> bool {
    line.trim_end().ends_with(':')
  }

  match input.rsplit_once('\n') {
    Some((_, last_line)) => {
      !is_empty(last_line) && (is_indented(last_line) || begins_block(last_line))
    }
    None => begins_block(input),
  }
}

pub fn run() -> rustyline::Result<()> {
  let mut repl = Repl::new()?;
  let mut buffer = String::new();

  println!("Aspid REPL v{VERSION}\nPress CTRL-D to exit");

  loop {
    buffer.clear();

    match repl.read_multi_line_input(&mut buffer) {
      Ok(()) => {}
      Err(ReadlineError::Eof) => return Ok(()),
      Err(ReadlineError::Interrupted) => return Ok(()),
      Err(ReadlineError::WindowResized) => continue,
      Err(e) => return Err(e),
    }

    if buffer.trim().is_empty() {
      continue;
    }
    repl.eval(&buffer);
  }
}

mod repl;
mod report;

use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;

#[derive(Parser)]
#[command(name = "aspid", author, version, about, long_about = None)]
struct Cli {
  /// Script to execute; omit it to get a REPL.
  file: Option<PathBuf>,
}

fn main() -> anyhow::Result<ExitCode> {
  let args = Cli::parse();

  let Some(file) = args.file else {
    repl::run()?;
    return Ok(ExitCode::SUCCESS);
  };

  let src = fs::read_to_string(&file)
    .map_err(|e| anyhow::anyhow!("failed to open {}: {e}", file.display()))?;

  let mut vm = aspid::Aspid::new();
  match vm.eval(&src) {
    Ok(_) => Ok(ExitCode::SUCCESS),
    Err(error) => {
      report::error(&src, &error);
      Ok(ExitCode::FAILURE)
    }
  }
}

//! perfilar binary entry point.

use std::process::ExitCode;

fn main() -> ExitCode {
    perfilar::cli::run()
}

//! Pipe mode: one request per stdin line.

use std::io::{self, BufRead, Write};

use haystack_executor::Executor;
use tracing::warn;

use crate::format::{format_error, format_output, OutputMode};
use crate::parse::parse_line;

/// Execute every request line from stdin.
///
/// Failed requests are reported and do not stop later lines. Returns the
/// process exit code: 1 if any line failed.
pub fn run_pipe(executor: &Executor, mode: OutputMode) -> i32 {
    let stdin = io::stdin();
    let stdout = io::stdout();
    run_lines(executor, mode, stdin.lock(), &mut stdout.lock())
}

fn run_lines<R: BufRead, W: Write>(
    executor: &Executor,
    mode: OutputMode,
    input: R,
    out: &mut W,
) -> i32 {
    let mut exit_code = 0;
    for (n, line) in input.lines().enumerate() {
        let line = match line {
            Ok(l) => l,
            Err(e) => {
                warn!(line = n + 1, error = %e, "Failed to read stdin");
                return 1;
            }
        };
        let req = match parse_line(&line) {
            None => continue,
            Some(Ok(req)) => req,
            Some(Err(e)) => {
                eprintln!("(error) line {}: {}", n + 1, e);
                exit_code = 1;
                continue;
            }
        };
        let text = match executor.execute_path(&req.path, &req.body) {
            Ok(table) => format_output(&table, mode),
            Err(e) => {
                exit_code = 1;
                format_error(&e, mode)
            }
        };
        if writeln!(out, "{}", text).is_err() {
            return 1;
        }
    }
    exit_code
}

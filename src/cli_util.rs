use std::io::{self, Write};

use crate::BrainfuckReaderError;

/// Show this many source bytes on each side of the faulting offset.
const WINDOW_BYTES: usize = 32;

/// Headline for `err`, prefixed with the program name when given.
pub fn describe_reader_error(program: Option<&str>, err: &BrainfuckReaderError) -> String {
    let msg = match err {
        BrainfuckReaderError::SourceUnreadable { path, source } => {
            format!("cannot read program {path}: {source}")
        }
        BrainfuckReaderError::AllocationFailure { requested } => {
            format!("cannot allocate a tape of {requested} cells")
        }
        BrainfuckReaderError::LoopStackUnderflow { .. } => {
            "Runtime error: stack underflow, ']' has no open loop".to_string()
        }
        BrainfuckReaderError::LoopStackOverflow { limit, .. } => {
            format!("Runtime error: stack overflow, loops nested deeper than {limit}")
        }
        BrainfuckReaderError::UnterminatedLoopScan { .. } => {
            "Runtime error: unterminated loop, no matching ']' before end of source".to_string()
        }
        BrainfuckReaderError::UnclosedLoop { depth, .. } => {
            format!("Runtime error: source ended inside {depth} open loop(s)")
        }
        BrainfuckReaderError::Io { source, .. } => format!("I/O error: {source}"),
        BrainfuckReaderError::StepLimitExceeded { .. } | BrainfuckReaderError::Canceled => {
            err.to_string()
        }
    };

    match program {
        Some(p) => format!("{p}: {msg}"),
        None => msg,
    }
}

/// Pretty-print structured BrainfuckReaderError, with a caret under the
/// offending byte of `code` when the error points at one.
pub fn print_reader_error(program: Option<&str>, code: &[u8], err: &BrainfuckReaderError) {
    let msg = describe_reader_error(program, err);
    match err.offset() {
        Some(at) if !matches!(err, BrainfuckReaderError::Io { .. }) => {
            print_error_with_context(&msg, code, at as usize);
        }
        _ => {
            eprintln!("{msg}");
            let _ = io::stderr().flush();
        }
    }
}

/// Print a concise error with the source offset and a caret context window.
pub fn print_error_with_context(prefix: &str, code: &[u8], pos: usize) {
    eprintln!("{prefix} at offset {pos}");
    let (window, caret) = context_window(code, pos);
    eprintln!("  {window}");
    eprintln!("  {caret}");
    let _ = io::stderr().flush();
}

/// One line of source around `pos` and a matching caret line. Every byte
/// takes exactly one column: whitespace becomes a space, non-ASCII a `?`.
fn context_window(code: &[u8], pos: usize) -> (String, String) {
    let start = pos.saturating_sub(WINDOW_BYTES);
    let end = (pos + WINDOW_BYTES + 1).min(code.len());
    let window: String = code
        .get(start..end)
        .unwrap_or_default()
        .iter()
        .map(|&b| match b {
            b if b.is_ascii_graphic() => b as char,
            b if b.is_ascii() => ' ',
            _ => '?',
        })
        .collect();

    let mut caret = " ".repeat(pos.saturating_sub(start));
    caret.push('^');
    (window, caret)
}

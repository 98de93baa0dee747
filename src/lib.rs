//! A tiny Brainfuck interpreter library.
//!
//! The interpreter runs programs straight from a seekable source over a
//! fixed-size memory tape (512 cells by default) with a single data pointer.
//!
//! Features and behaviors:
//! - Memory tape initialized to 0; its length never changes during a run.
//! - The pointer wraps: left of cell 0 is the last cell, right of the last
//!   cell is cell 0. Cell values wrap modulo 256.
//! - Output `.` writes the current cell as one raw byte.
//! - Loops are resolved while running by re-reading `[`; no parse step.
//! - Unbalanced brackets are reported as errors when execution reaches them.
//! - Any character outside `<>+-.[]` is a comment.
//!
//! Quick start:
//!
//! ```no_run
//! use bfi::BrainfuckReader;
//!
//! // Classic "Hello World!" in Brainfuck
//! let code = "++++++++++[>+++++++>++++++++++>+++>+<<<<-]>++.>+.+++++++..+++.>++.<<+++++++++++++++.>.+++.------.--------.>+.>.";
//! let mut bf = BrainfuckReader::from_code(code).expect("tape should allocate");
//! bf.run(&mut std::io::stdout()).expect("program should run");
//! ```

pub mod cli_util;
pub mod config;
pub mod dump;
pub mod log;
pub mod loop_stack;
pub mod reader;
pub mod tape;
pub mod theme;

pub mod commands {
    pub mod run;
}

pub use dump::DumpFormat;
pub use reader::{BrainfuckReader, BrainfuckReaderError, StepControl};
pub use tape::{Direction, Tape, TapeSnapshot};

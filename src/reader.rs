//! The execution engine.
//!
//! [`BrainfuckReader`] pulls one byte at a time from a seekable source and
//! dispatches it against its [`Tape`]. There is no parse step: loop bodies
//! are found by scanning the source as the program runs.
//!
//! - `[` on a non-zero cell records the offset just past itself on the
//!   [`LoopStack`] and keeps going. On a zero cell it consumes bytes up to
//!   its matching `]`, counting nested brackets, without executing them.
//! - `]` pops the innermost offset and seeks back one byte before it, so the
//!   next read is the `[` again and the loop test runs once more.
//!
//! Only `<>+-.[]` mean anything; every other byte is a comment.
//!
//! ```
//! use bfi::BrainfuckReader;
//!
//! let mut bf = BrainfuckReader::from_code("+++[>+<-]>.").unwrap();
//! let mut out = Vec::new();
//! bf.run(&mut out).unwrap();
//! assert_eq!(out, vec![3]);
//! ```

use std::fmt;
use std::fs;
use std::io::{self, Cursor, Read, Seek, SeekFrom, Write};
use std::path::Path;
use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

use crate::loop_stack::LoopStack;
use crate::tape::{Direction, Tape, TapeSnapshot, DEFAULT_TAPE_SIZE};

/// Errors that can stop a Brainfuck program, before or during execution.
#[derive(Debug, thiserror::Error)]
pub enum BrainfuckReaderError {
    /// The program source could not be opened or read.
    #[error("cannot read {path}: {source}")]
    SourceUnreadable {
        path: String,
        #[source]
        source: io::Error,
    },

    /// The tape could not be sized as requested.
    #[error("cannot allocate a tape of {requested} cells")]
    AllocationFailure { requested: usize },

    /// A `]` was reached with no open loop.
    #[error("loop stack underflow: ']' at offset {at} has no open loop")]
    LoopStackUnderflow { at: u64 },

    /// Loops nested deeper than the configured limit.
    #[error("loop stack overflow: '[' at offset {at} exceeds the nesting limit of {limit}")]
    LoopStackOverflow { at: u64, limit: usize },

    /// The source ended while skipping the body of a loop.
    #[error("unterminated loop: '[' at offset {open_at} has no matching ']'")]
    UnterminatedLoopScan { open_at: u64 },

    /// The source ended while loops were still open.
    #[error("unclosed loop: source ended with {depth} open loop(s), innermost '[' at offset {open_at}")]
    UnclosedLoop { open_at: u64, depth: usize },

    /// Reading the source or writing program output failed.
    #[error("I/O error at offset {at}: {source}")]
    Io {
        at: u64,
        #[source]
        source: io::Error,
    },

    /// Execution aborted due to step limit.
    #[error("Execution aborted: step limit exceeded ({limit})")]
    StepLimitExceeded { limit: usize },

    /// Execution aborted due to cooperative cancellation (e.g., Ctrl-C)
    #[error("Execution aborted: cancelled")]
    Canceled,
}

impl BrainfuckReaderError {
    /// Source offset the error points at, when there is one.
    pub fn offset(&self) -> Option<u64> {
        match self {
            Self::LoopStackUnderflow { at }
            | Self::LoopStackOverflow { at, .. }
            | Self::Io { at, .. } => Some(*at),
            Self::UnterminatedLoopScan { open_at } | Self::UnclosedLoop { open_at, .. } => {
                Some(*open_at)
            }
            _ => None,
        }
    }
}

/// Controls for cooperative cancellation and step limiting.
#[derive(Clone)]
pub struct StepControl {
    pub max_steps: Option<usize>,
    pub cancel_flag: Arc<AtomicBool>,
}

impl StepControl {
    pub fn new(max_steps: Option<usize>, cancel_flag: Arc<AtomicBool>) -> Self {
        Self { max_steps, cancel_flag }
    }
}

/// What a single dispatched instruction did, for trace rows.
enum Effect {
    Moved(usize),
    Changed { cell: usize, from: u8, to: u8 },
    Output(u8),
    EnterLoop,
    SkipLoop { resume_at: u64 },
    Repeat { to: u64 },
}

impl fmt::Display for Effect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Effect::Moved(ptr) => write!(f, "Moved pointer head to index {ptr}"),
            Effect::Changed { cell, from, to } => write!(f, "Set cell[{cell}] from {from} to {to}"),
            Effect::Output(byte) => write!(f, "Output byte {byte:#04x}"),
            Effect::EnterLoop => write!(f, "Enter loop (cell != 0)"),
            Effect::SkipLoop { resume_at } => {
                write!(f, "Cell is 0; skipped loop body, resume at offset {resume_at}")
            }
            Effect::Repeat { to } => write!(f, "Rewind to '[' at offset {to}"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Instruction {
    Left,
    Right,
    Increment,
    Decrement,
    Output,
    Open,
    Close,
}

impl Instruction {
    /// `None` for comment bytes.
    fn decode(byte: u8) -> Option<Self> {
        Some(match byte {
            b'<' => Instruction::Left,
            b'>' => Instruction::Right,
            b'+' => Instruction::Increment,
            b'-' => Instruction::Decrement,
            b'.' => Instruction::Output,
            b'[' => Instruction::Open,
            b']' => Instruction::Close,
            _ => return None,
        })
    }

    fn symbol(self) -> char {
        match self {
            Instruction::Left => '<',
            Instruction::Right => '>',
            Instruction::Increment => '+',
            Instruction::Decrement => '-',
            Instruction::Output => '.',
            Instruction::Open => '[',
            Instruction::Close => ']',
        }
    }
}

/// Read a whole program into memory. A `path` of `-` reads stdin.
pub fn read_source(path: &Path) -> Result<Vec<u8>, BrainfuckReaderError> {
    let unreadable = |source| BrainfuckReaderError::SourceUnreadable {
        path: path.display().to_string(),
        source,
    };

    if path == Path::new("-") {
        let mut buf = Vec::new();
        io::stdin().lock().read_to_end(&mut buf).map_err(unreadable)?;
        Ok(buf)
    } else {
        fs::read(path).map_err(unreadable)
    }
}

/// A Brainfuck interpreter over a seekable source.
///
/// The interpreter owns:
/// - the source and the offset of the next byte to read,
/// - the memory tape,
/// - the stack of loops currently being executed.
pub struct BrainfuckReader<R> {
    source: R,
    position: u64,
    tape: Tape,
    loops: LoopStack,
    steps: usize,
}

impl BrainfuckReader<Cursor<Vec<u8>>> {
    /// Create an interpreter for in-memory `code` with a default-sized tape.
    pub fn from_code(code: impl Into<Vec<u8>>) -> Result<Self, BrainfuckReaderError> {
        Self::new(Cursor::new(code.into()))
    }

    pub fn from_code_with_memory(
        code: impl Into<Vec<u8>>,
        memory_size: usize,
    ) -> Result<Self, BrainfuckReaderError> {
        Self::new_with_memory(Cursor::new(code.into()), memory_size)
    }

    /// Load the program at `path` (or stdin for `-`) into memory.
    pub fn open(path: impl AsRef<Path>, memory_size: usize) -> Result<Self, BrainfuckReaderError> {
        let code = read_source(path.as_ref())?;
        Self::from_code_with_memory(code, memory_size)
    }
}

impl<R: Read + Seek> BrainfuckReader<R> {
    /// Create an interpreter over `source` with a default-sized tape.
    pub fn new(source: R) -> Result<Self, BrainfuckReaderError> {
        Self::new_with_memory(source, DEFAULT_TAPE_SIZE)
    }

    /// Create an interpreter over `source` with a tape of `memory_size` cells.
    /// Execution starts from the beginning of the source.
    pub fn new_with_memory(mut source: R, memory_size: usize) -> Result<Self, BrainfuckReaderError> {
        let tape = Tape::new(memory_size)?;
        source
            .rewind()
            .map_err(|source| BrainfuckReaderError::Io { at: 0, source })?;
        Ok(Self {
            source,
            position: 0,
            tape,
            loops: LoopStack::new(),
            steps: 0,
        })
    }

    /// Fail with [`BrainfuckReaderError::LoopStackOverflow`] once more than
    /// `limit` loops are open at the same time.
    pub fn with_loop_limit(mut self, limit: usize) -> Self {
        self.loops = LoopStack::with_limit(limit);
        self
    }

    pub fn tape(&self) -> &Tape {
        &self.tape
    }

    pub fn snapshot(&self) -> TapeSnapshot {
        self.tape.snapshot()
    }

    /// Offset of the next source byte to be read.
    pub fn position(&self) -> u64 {
        self.position
    }

    pub fn loop_depth(&self) -> usize {
        self.loops.depth()
    }

    /// Number of instructions dispatched so far.
    pub fn steps(&self) -> usize {
        self.steps
    }

    pub fn source(&self) -> &R {
        &self.source
    }

    fn next_byte(&mut self) -> Result<Option<u8>, BrainfuckReaderError> {
        let mut buf = [0u8; 1];
        loop {
            match self.source.read(&mut buf) {
                Ok(0) => return Ok(None),
                Ok(_) => {
                    self.position += 1;
                    return Ok(Some(buf[0]));
                }
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(source) => {
                    return Err(BrainfuckReaderError::Io { at: self.position, source });
                }
            }
        }
    }

    fn seek_to(&mut self, offset: u64) -> Result<(), BrainfuckReaderError> {
        self.source
            .seek(SeekFrom::Start(offset))
            .map_err(|source| BrainfuckReaderError::Io { at: offset, source })?;
        self.position = offset;
        Ok(())
    }

    /// `[` at offset `at`, already consumed.
    fn enter_loop(&mut self, at: u64) -> Result<Effect, BrainfuckReaderError> {
        if self.tape.current() != 0 {
            self.loops
                .push(self.position)
                .map_err(|full| BrainfuckReaderError::LoopStackOverflow { at, limit: full.limit })?;
            return Ok(Effect::EnterLoop);
        }

        let mut nesting = 1usize;
        while nesting > 0 {
            match self.next_byte()? {
                Some(b'[') => nesting += 1,
                Some(b']') => nesting -= 1,
                Some(_) => {}
                None => return Err(BrainfuckReaderError::UnterminatedLoopScan { open_at: at }),
            }
        }
        Ok(Effect::SkipLoop { resume_at: self.position })
    }

    /// `]` at offset `at`, already consumed.
    fn exit_loop(&mut self, at: u64) -> Result<Effect, BrainfuckReaderError> {
        let resume_at = self
            .loops
            .pop()
            .ok_or(BrainfuckReaderError::LoopStackUnderflow { at })?;
        // resume_at sits just past its '[', so one byte back re-reads it.
        let open_at = resume_at - 1;
        self.seek_to(open_at)?;
        Ok(Effect::Repeat { to: open_at })
    }

    fn dispatch<W: Write>(
        &mut self,
        instr: Instruction,
        at: u64,
        out: &mut W,
    ) -> Result<Effect, BrainfuckReaderError> {
        let effect = match instr {
            Instruction::Left => {
                self.tape.shift(Direction::Left);
                Effect::Moved(self.tape.pointer())
            }
            Instruction::Right => {
                self.tape.shift(Direction::Right);
                Effect::Moved(self.tape.pointer())
            }
            Instruction::Increment | Instruction::Decrement => {
                let from = self.tape.current();
                if instr == Instruction::Increment {
                    self.tape.increment();
                } else {
                    self.tape.decrement();
                }
                Effect::Changed { cell: self.tape.pointer(), from, to: self.tape.current() }
            }
            Instruction::Output => {
                let byte = self.tape.current();
                out.write_all(&[byte])
                    .map_err(|source| BrainfuckReaderError::Io { at, source })?;
                Effect::Output(byte)
            }
            Instruction::Open => self.enter_loop(at)?,
            Instruction::Close => self.exit_loop(at)?,
        };
        Ok(effect)
    }

    /// Internal executor shared by all run variants.
    fn execute<W: Write>(
        &mut self,
        out: &mut W,
        mut trace: Option<&mut dyn Write>,
        step_control: Option<&StepControl>,
    ) -> Result<(), BrainfuckReaderError> {
        let trace_error = |at: u64| move |source: io::Error| BrainfuckReaderError::Io { at, source };

        if let Some(t) = trace.as_mut() {
            writeln!(t, "STEP | POS  | PTR | CELL | INSTR | ACTION").map_err(trace_error(0))?;
            writeln!(t, "-----+------+-----+------+-------+------------------------------------------------")
                .map_err(trace_error(0))?;
        }

        while let Some(byte) = self.next_byte()? {
            let Some(instr) = Instruction::decode(byte) else {
                continue;
            };
            let at = self.position - 1;

            if let Some(ctrl) = step_control {
                if ctrl.cancel_flag.load(Ordering::Relaxed) {
                    return Err(BrainfuckReaderError::Canceled);
                }
                if let Some(max) = ctrl.max_steps {
                    if self.steps >= max {
                        return Err(BrainfuckReaderError::StepLimitExceeded { limit: max });
                    }
                }
            }

            let (ptr_before, cell_before) = (self.tape.pointer(), self.tape.current());
            let effect = self.dispatch(instr, at, out)?;

            if let Some(t) = trace.as_mut() {
                writeln!(
                    t,
                    "{:<4} | {:<4} | {:<3} | {:<4} |  {}    | {}",
                    self.steps, at, ptr_before, cell_before, instr.symbol(), effect
                )
                .map_err(trace_error(at))?;
            }

            self.steps += 1;
        }

        if let Some(resume_at) = self.loops.peek() {
            return Err(BrainfuckReaderError::UnclosedLoop {
                open_at: resume_at - 1,
                depth: self.loops.depth(),
            });
        }

        out.flush()
            .map_err(|source| BrainfuckReaderError::Io { at: self.position, source })
    }

    /// Execute the program until the source is exhausted, writing one byte
    /// to `out` per `.`.
    pub fn run<W: Write>(&mut self, out: &mut W) -> Result<(), BrainfuckReaderError> {
        self.execute(out, None, None)
    }

    /// Like [`run`](Self::run), also writing a step-by-step table of the
    /// dispatched instructions to `trace`.
    pub fn run_debug<W: Write, T: Write>(&mut self, out: &mut W, trace: &mut T) -> Result<(), BrainfuckReaderError> {
        self.execute(out, Some(trace as &mut dyn Write), None)
    }

    /// Execute with cooperative cancellation and optional step limit.
    pub fn run_with_control<W: Write>(
        &mut self,
        out: &mut W,
        step_control: StepControl,
    ) -> Result<(), BrainfuckReaderError> {
        self.execute(out, None, Some(&step_control))
    }

    /// Debug-run with cooperative cancellation and optional step limit.
    pub fn run_debug_with_control<W: Write, T: Write>(
        &mut self,
        out: &mut W,
        trace: &mut T,
        step_control: StepControl,
    ) -> Result<(), BrainfuckReaderError> {
        self.execute(out, Some(trace as &mut dyn Write), Some(&step_control))
    }
}

use clap::Args;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::cli_util::print_reader_error;
use crate::config::{self, Overrides, Settings};
use crate::dump::{write_dump, DumpFormat};
use crate::log::Logger;
use crate::reader::{read_source, StepControl};
use crate::{BrainfuckReader, BrainfuckReaderError};

/// Exit status after Ctrl-C.
const EXIT_INTERRUPTED: i32 = 130;

#[derive(Args, Debug)]
#[command(disable_help_flag = true)]
pub struct RunArgs {
    /// Brainfuck source file ("-" reads the program from stdin)
    #[arg(value_name = "FILE")]
    pub file: Option<PathBuf>,

    /// Tape size in cells (fallback BF_MEMORY; default 512)
    #[arg(short = 'm', long = "memory", value_name = "N")]
    pub memory: Option<usize>,

    /// Memory dump format printed after the run (fallback BF_DUMP; default none)
    #[arg(
        short = 'd',
        long = "dump",
        value_name = "FORMAT",
        value_enum,
        num_args = 0..=1,
        default_missing_value = "hex"
    )]
    pub dump: Option<DumpFormat>,

    /// Increase verbosity (repeat for debug output)
    #[arg(short = 'v', long = "verbose", action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Print a step-by-step table of executed instructions to stderr
    #[arg(long = "trace")]
    pub trace: bool,

    /// Maximum loop nesting depth (fallback BF_MAX_DEPTH; default unbounded)
    #[arg(long = "max-depth", value_name = "N")]
    pub max_depth: Option<usize>,

    /// Maximum instructions before abort (fallback BF_MAX_STEPS; default unlimited)
    #[arg(long = "max-steps", value_name = "N")]
    pub max_steps: Option<usize>,

    /// Show this help
    #[arg(short = 'h', long = "help", action = clap::ArgAction::SetTrue)]
    pub help: bool,
}

impl RunArgs {
    fn overrides(&self) -> Overrides {
        Overrides {
            memory_size: self.memory,
            dump: self.dump,
            verbosity: (self.verbose > 0).then_some(self.verbose),
            max_loop_depth: self.max_depth,
            max_steps: self.max_steps,
        }
    }
}

fn log_settings(log: &Logger, settings: &Settings) {
    let limit = |v: Option<usize>| v.map_or_else(|| "unbounded".to_string(), |n| n.to_string());
    log.info(format_args!(
        "parsed config: memory size: {} cells, dump: {}, verbosity: {}, max loop depth: {}, max steps: {}",
        settings.memory_size,
        settings.dump,
        settings.verbosity,
        limit(settings.max_loop_depth),
        limit(settings.max_steps),
    ));
}

pub fn run(program: &str, args: RunArgs) -> i32 {
    if args.help {
        usage_and_exit(program, 0);
    }

    let Some(path) = args.file.clone() else {
        eprintln!("{program}: no file specified");
        usage_and_exit(program, 2);
    };

    let (settings, warnings) = config::resolve(args.overrides());
    let log = Logger::new(settings.verbosity);
    for warning in &warnings {
        log.warn(warning);
    }
    log_settings(&log, &settings);

    let code = match read_source(&path) {
        Ok(code) => code,
        Err(err) => {
            print_reader_error(Some(program), &[], &err);
            return 1;
        }
    };

    log.info(format_args!("interpreting file {} ({} bytes)", path.display(), code.len()));
    let bf = match BrainfuckReader::from_code_with_memory(code, settings.memory_size) {
        Ok(bf) => bf,
        Err(err) => {
            print_reader_error(Some(program), &[], &err);
            return 1;
        }
    };
    let mut bf = match settings.max_loop_depth {
        Some(limit) => bf.with_loop_limit(limit),
        None => bf,
    };

    // Ctrl-C asks the interpreter to stop at the next instruction
    let cancel = Arc::new(AtomicBool::new(false));
    let cancel_clone = cancel.clone();
    if let Err(e) = ctrlc::set_handler(move || cancel_clone.store(true, Ordering::Relaxed)) {
        log.warn(format_args!("failed to set ctrl+c handler: {e}"));
    }
    let ctrl = StepControl::new(settings.max_steps, cancel);

    let mut out = BufWriter::new(io::stdout().lock());
    let result = if args.trace {
        let mut trace = io::stderr().lock();
        bf.run_debug_with_control(&mut out, &mut trace, ctrl)
    } else {
        bf.run_with_control(&mut out, ctrl)
    };
    // Keep whatever the program printed before a fault.
    let _ = out.flush();
    drop(out);

    log.debug(format_args!(
        "executed {} instructions, pointer at {}, high-water mark {}",
        bf.steps(),
        bf.tape().pointer(),
        bf.tape().high_water()
    ));

    let exit_code = match result {
        Ok(()) => 0,
        Err(BrainfuckReaderError::Canceled) => {
            eprintln!("Execution aborted: interrupted");
            let _ = io::stderr().flush();
            EXIT_INTERRUPTED
        }
        Err(err) => {
            print_reader_error(Some(program), bf.source().get_ref(), &err);
            1
        }
    };

    if settings.dump != DumpFormat::None {
        log.info("printing memory dump");
        let mut stderr = io::stderr().lock();
        if let Err(e) = write_dump(&mut stderr, &bf.snapshot(), settings.dump) {
            log.error(format_args!("failed to write memory dump: {e}"));
        }
    }

    exit_code
}

fn usage_and_exit(program: &str, code: i32) -> ! {
    eprintln!(
        r#"Usage:
  {0} <FILE> [OPTIONS]...

A small Brainfuck interpreter. Program output goes to stdout; logs, traces,
memory dumps and errors go to stderr.

Options:
  -m, --memory <N>         Tape size in cells (default: 512)
  -d, --dump [FORMAT]      Memory dump after the run [none, hex, ascii] (default: none; bare -d means hex)
  -v, --verbose            Increase verbosity (-vv adds debug output)
      --trace              Print a step-by-step table of executed instructions
      --max-depth <N>      Fail when loops nest deeper than N (default: unbounded)
      --max-steps <N>      Abort after N instructions (default: unlimited)
  -h, --help               Show this help

Notes:
- FILE may be "-" to read the program from stdin.
- Only <>+-.[] are instructions; every other character is a comment.
- The pointer wraps around both ends of the tape; cells wrap modulo 256.
- Settings may also come from BF_MEMORY, BF_DUMP, BF_MAX_DEPTH, BF_MAX_STEPS
  and the [interpreter] section of bf.toml in your config directory
  (or the file named by BF_CONFIG).

Examples:
    {0} ./hello.bf
    {0} ./program.bf --dump ascii -v
"#,
        program
    );
    let _ = io::stderr().flush();
    std::process::exit(code);
}

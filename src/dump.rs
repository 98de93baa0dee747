//! Post-run memory dumps.
//!
//! A dump covers the tape from cell 0 up to the highest cell the pointer
//! reached, sixteen cells per row.

use std::fmt;
use std::io::{self, Write};

use clap::ValueEnum;

use crate::tape::TapeSnapshot;

const ROW_WIDTH: usize = 16;

/// How to render the tape after a run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum DumpFormat {
    /// No dump.
    #[default]
    None,
    /// Hex cells followed by an ASCII gutter.
    Hex,
    /// ASCII rendering only.
    Ascii,
}

impl fmt::Display for DumpFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DumpFormat::None => write!(f, "none"),
            DumpFormat::Hex => write!(f, "hex"),
            DumpFormat::Ascii => write!(f, "ascii"),
        }
    }
}

/// Printable bytes as themselves, newline as `\n`, anything else as `.`.
fn ascii_cell(byte: u8) -> String {
    match byte {
        b'\n' => "\\n".to_string(),
        b if b.is_ascii_graphic() || b == b' ' => (b as char).to_string(),
        _ => ".".to_string(),
    }
}

fn ascii_row(row: &[u8]) -> String {
    row.iter().map(|&b| format!("{:>2} ", ascii_cell(b))).collect()
}

pub fn write_dump<W: Write>(out: &mut W, snapshot: &TapeSnapshot, format: DumpFormat) -> io::Result<()> {
    if format == DumpFormat::None || snapshot.cells.is_empty() {
        return Ok(());
    }

    let end = (snapshot.high_water + 1).min(snapshot.cells.len());
    let rows = end.div_ceil(ROW_WIDTH);
    for r in 0..rows {
        let start = r * ROW_WIDTH;
        let row = &snapshot.cells[start..(start + ROW_WIDTH).min(snapshot.cells.len())];
        match format {
            DumpFormat::Hex => {
                let hex: String = row.iter().map(|b| format!("{b:02X} ")).collect();
                writeln!(
                    out,
                    "{start:04X}: {hex:<width$}\t{}",
                    ascii_row(row).trim_end(),
                    width = ROW_WIDTH * 3
                )?;
            }
            DumpFormat::Ascii => writeln!(out, "{start:04X}: {}", ascii_row(row).trim_end())?,
            DumpFormat::None => {}
        }
    }
    Ok(())
}

/// [`write_dump`] into a `String`.
pub fn render_dump(snapshot: &TapeSnapshot, format: DumpFormat) -> String {
    let mut buf = Vec::new();
    // Writing to a Vec cannot fail.
    let _ = write_dump(&mut buf, snapshot, format);
    String::from_utf8_lossy(&buf).into_owned()
}

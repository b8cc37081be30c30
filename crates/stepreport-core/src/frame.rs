//! Array framing for JSON report files: a report is opened with `[`, its
//! elements are separated by `,` lines, and a trailing `]` is appended only
//! when the step is declared finished.

use crate::error::Result;
use crate::io;
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;
use tempfile::NamedTempFile;

/// Line written before the next array element: `[` for the first element of
/// an empty file, `,` otherwise.
pub fn array_lead_in(file_is_empty: bool) -> &'static str {
    if file_is_empty {
        "["
    } else {
        ","
    }
}

/// Append the closing bracket that completes the report array.
pub fn seal(path: &Path) -> Result<()> {
    let mut writer = io::append_writer(path)?;
    writeln!(writer, "]")?;
    writer.flush()?;
    Ok(())
}

/// Drop a sealed report's trailing `]` line so further appends keep the file
/// a valid array prefix. A later [`seal`] restores the bracket.
///
/// Only a `]` that turns out to be the last line is dropped; a `]` line
/// followed by more content is kept. Rewrites through a temp file and swaps
/// it in atomically.
pub fn reopen(path: &Path) -> Result<()> {
    let reader = BufReader::new(File::open(path)?);
    let dir = path.parent().unwrap_or_else(|| Path::new("."));
    let tmp = NamedTempFile::new_in(dir)?;
    let mut writer = BufWriter::new(tmp);

    let mut held_bracket = false;
    for line in reader.lines() {
        let line = line?;
        if held_bracket {
            writeln!(writer, "]")?;
            held_bracket = false;
        }
        if line == "]" {
            held_bracket = true;
        } else {
            writeln!(writer, "{line}")?;
        }
    }

    let tmp = writer.into_inner().map_err(|e| e.into_error())?;
    io::replace_file(tmp, path)?;
    Ok(())
}

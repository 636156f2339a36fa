use serde::Serialize;
use std::collections::HashMap;
use std::io::{self, BufRead, Write};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum WriterError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

const B_FACTOR_COLUMNS: std::ops::Range<usize> = 60..66;

fn csv_writer<W: Write>(writer: W, delimiter: u8) -> csv::Writer<W> {
    csv::WriterBuilder::new()
        .has_headers(false)
        .delimiter(delimiter)
        .from_writer(writer)
}

/// One `serial<delimiter>value` line per atom.
pub fn write_atom_values<W: Write>(
    writer: W,
    values: &[(usize, f64)],
    delimiter: u8,
) -> Result<(), WriterError> {
    let mut csv = csv_writer(writer, delimiter);
    for row in values {
        csv.serialize(row)?;
    }
    csv.flush()?;
    Ok(())
}

/// One line per residue row, e.g. `(residue, value)` or `(chain, residue, value)`;
/// missing values are left empty.
pub fn write_residue_values<W, R, I>(writer: W, rows: I, delimiter: u8) -> Result<(), WriterError>
where
    W: Write,
    R: Serialize,
    I: IntoIterator<Item = R>,
{
    let mut csv = csv_writer(writer, delimiter);
    for row in rows {
        csv.serialize(row)?;
    }
    csv.flush()?;
    Ok(())
}

/// Copies PDB text from `source`, replacing the B-factor field (columns 61-66) of every
/// ATOM/HETATM record with the value for its serial number, or `default`.
///
/// Returns the number of records rewritten.
pub fn write_b_factors<R: BufRead, W: Write>(
    source: R,
    values: &HashMap<usize, f64>,
    default: f64,
    mut writer: W,
) -> Result<usize, WriterError> {
    let mut rewritten = 0;
    for line in source.lines() {
        let line = line?;
        match rewrite_b_factor(&line, values, default) {
            Some(updated) => {
                writeln!(writer, "{}", updated)?;
                rewritten += 1;
            }
            None => writeln!(writer, "{}", line)?,
        }
    }
    writer.flush()?;
    Ok(rewritten)
}

fn rewrite_b_factor(line: &str, values: &HashMap<usize, f64>, default: f64) -> Option<String> {
    if !(line.starts_with("ATOM") || line.starts_with("HETATM")) || !line.is_ascii() {
        return None;
    }
    let serial: usize = line.get(6..11)?.trim().parse().ok()?;
    let value = values.get(&serial).copied().unwrap_or(default);

    let mut record = format!("{:<width$}", line, width = B_FACTOR_COLUMNS.end);
    let field = format!("{:>6.2}", value.clamp(-99.99, 999.99));
    record.replace_range(B_FACTOR_COLUMNS, &field);
    Some(record)
}

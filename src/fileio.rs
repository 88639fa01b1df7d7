use std::fs::File;
use std::io::{self, BufReader, BufWriter, Read, Write};
use std::path::PathBuf;

use crate::calculation::Calculation;
use crate::util::CalcError;

/// Column order of the persisted history
pub const HEADER: [&str; 5] = ["timestamp", "operation", "a", "b", "result"];

fn persistence(context: &str, err: impl std::fmt::Display) -> CalcError {
    CalcError::Persistence(format!("{}: {}", context, err))
}

/// Serialize the whole log as CSV. The header is always written, so an
/// empty history round-trips to an empty history.
pub fn write_history<W: Write>(writer: W, history: &[Calculation]) -> Result<(), CalcError> {
    let mut csv_writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(writer);

    csv_writer
        .write_record(HEADER)
        .map_err(|e| persistence("Failed to write header", e))?;

    for calc in history {
        csv_writer
            .serialize(calc)
            .map_err(|e| persistence("Failed to write record", e))?;
    }

    csv_writer
        .flush()
        .map_err(|e| persistence("Failed to flush history", e))
}

/// Parse a CSV log. Columns may appear in any order and extra columns are
/// ignored, but all of `HEADER` must be present.
pub fn read_history<R: Read>(reader: R) -> Result<Vec<Calculation>, CalcError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::Fields)
        .from_reader(reader);

    let headers = csv_reader
        .headers()
        .map_err(|e| persistence("Failed to read header", e))?
        .clone();

    let missing: Vec<&str> = HEADER
        .iter()
        .copied()
        .filter(|col| !headers.iter().any(|h| h == *col))
        .collect();
    if !missing.is_empty() {
        return Err(CalcError::Persistence(format!(
            "Malformed history CSV: missing columns {}",
            missing.join(", ")
        )));
    }

    let mut history = Vec::new();
    for (row_no, result) in csv_reader.deserialize::<Calculation>().enumerate() {
        let calc = result.map_err(|e| persistence(&format!("Malformed row {}", row_no + 1), e))?;
        history.push(calc);
    }
    Ok(history)
}

/// The history file on disk
pub struct HistoryFile {
    path: PathBuf,
}

impl HistoryFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Rewrite the file with the full history
    pub fn write(&self, history: &[Calculation]) -> Result<(), CalcError> {
        let file = File::create(&self.path).map_err(|e| {
            persistence(&format!("Failed to save history to {}", self.path.display()), e)
        })?;
        write_history(BufWriter::new(file), history)
    }

    pub fn read(&self) -> Result<Vec<Calculation>, CalcError> {
        let file = File::open(&self.path).map_err(|e| match e.kind() {
            io::ErrorKind::NotFound => CalcError::Persistence(format!(
                "No history file found to load: {}",
                self.path.display()
            )),
            _ => persistence(&format!("Failed to open {}", self.path.display()), e),
        })?;
        read_history(BufReader::new(file))
    }
}

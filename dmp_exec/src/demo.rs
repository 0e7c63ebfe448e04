//! # Demonstration loading
//!
//! Demonstrations are stored as CSV files with a header row. The first
//! column is the time in seconds and each further column is one dimension:
//!
//! ```text
//! time,x,y,z
//! 0.0,0.10,0.20,0.30
//! 0.1,0.12,0.21,0.30
//! ```

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use std::io::Read;
use std::path::Path;

use comms_if::dmp::DmpTraj;

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum DemoError {
    #[error("Could not read the demonstration: {0}")]
    Csv(#[from] csv::Error),

    #[error("The demonstration needs a time column and at least one position column")]
    NoPositionColumns,

    #[error("Invalid value \"{value}\" on row {row}")]
    InvalidValue { row: usize, value: String },
}

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Load a demonstration from a CSV file.
pub fn load_csv<P: AsRef<Path>>(path: P) -> Result<DmpTraj, DemoError> {
    read_csv(csv::Reader::from_path(path)?)
}

/// Read a demonstration from any CSV source.
pub fn read_csv<R: Read>(mut reader: csv::Reader<R>) -> Result<DmpTraj, DemoError> {
    if reader.headers()?.len() < 2 {
        return Err(DemoError::NoPositionColumns);
    }

    let mut times = Vec::new();
    let mut positions = Vec::new();

    for (row, record) in reader.records().enumerate() {
        let record = record?;

        let values = record
            .iter()
            .map(|field| {
                field.trim().parse::<f64>().map_err(|_| DemoError::InvalidValue {
                    row,
                    value: field.to_string(),
                })
            })
            .collect::<Result<Vec<f64>, _>>()?;

        times.push(values[0]);
        positions.push(values[1..].to_vec());
    }

    Ok(DmpTraj::from_positions(times, positions))
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_read_csv() {
        let data = "time,x,y\n0.0,1.0,2.0\n0.5,1.5,2.5\n1.0, 2.0 ,3.0\n";
        let demo = read_csv(csv::Reader::from_reader(data.as_bytes())).unwrap();

        assert_eq!(demo.times, vec![0.0, 0.5, 1.0]);
        assert_eq!(demo.dims(), Some(2));
        assert_eq!(demo.points[2].positions, vec![2.0, 3.0]);
    }

    #[test]
    fn test_read_csv_errors() {
        assert!(matches!(
            read_csv(csv::Reader::from_reader("time\n0.0\n".as_bytes())),
            Err(DemoError::NoPositionColumns)
        ));

        assert!(matches!(
            read_csv(csv::Reader::from_reader("time,x\n0.0,abc\n".as_bytes())),
            Err(DemoError::InvalidValue { row: 0, .. })
        ));

        // Ragged rows are rejected by the reader
        assert!(matches!(
            read_csv(csv::Reader::from_reader("time,x\n0.0,1.0,2.0\n".as_bytes())),
            Err(DemoError::Csv(_))
        ));
    }
}

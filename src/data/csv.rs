//! CSV loading for labeled datasets
//!
//! Expected layout: one sample per line, features first, integer class
//! label in the last column. A header row is auto-detected and lines
//! starting with `#` are skipped.

use crate::core::{ModelError, Result};
use crate::data::{LabeledDataset, LabeledSample};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

/// Load a labeled dataset from a CSV file.
pub fn load_csv<P: AsRef<Path>>(path: P) -> Result<LabeledDataset> {
    let file = File::open(path).map_err(ModelError::Io)?;
    load_csv_reader(BufReader::new(file))
}

/// Load a labeled dataset from any buffered reader.
pub fn load_csv_reader<R: BufRead>(reader: R) -> Result<LabeledDataset> {
    let mut dataset = LabeledDataset::new();
    let mut first_data_line = true;

    for line in reader.lines() {
        let line = line.map_err(ModelError::Io)?;
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        if first_data_line {
            first_data_line = false;
            if is_header_line(line) {
                continue;
            }
        }
        dataset.push(parse_line(line)?)?;
    }

    if dataset.is_empty() {
        return Err(ModelError::EmptyDataset);
    }
    Ok(dataset)
}

/// A line where the feature columns fail to parse as numbers is a header
fn is_header_line(line: &str) -> bool {
    let fields: Vec<&str> = line.split(',').collect();
    if fields.len() < 2 {
        return false;
    }
    fields
        .iter()
        .take(fields.len() - 1)
        .any(|field| field.trim().parse::<f64>().is_err())
}

fn parse_line(line: &str) -> Result<LabeledSample> {
    let fields: Vec<&str> = line.split(',').collect();
    if fields.len() < 2 {
        return Err(ModelError::ParseError(format!(
            "expected at least one feature and a label, got: {line}"
        )));
    }

    let (label_field, feature_fields) = match fields.split_last() {
        Some(split) => split,
        None => return Err(ModelError::ParseError(format!("empty line: {line}"))),
    };

    let mut features = Vec::with_capacity(feature_fields.len());
    for field in feature_fields {
        let value = field.trim().parse::<f64>().map_err(|_| {
            ModelError::ParseError(format!("invalid feature value: {field}"))
        })?;
        features.push(value);
    }

    let label = label_field.trim().parse::<u32>().map_err(|_| {
        ModelError::ParseError(format!(
            "invalid class label (expected non-negative integer): {label_field}"
        ))
    })?;

    Ok(LabeledSample::new(features, label))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_load_basic() {
        let data = "1.0,2.0,0\n3.0,4.0,1\n";
        let dataset = load_csv_reader(Cursor::new(data)).unwrap();
        assert_eq!(dataset.len(), 2);
        assert_eq!(dataset.dim(), 2);
        assert_eq!(dataset.get(0).label, 0);
        assert_eq!(dataset.get(1).features, vec![3.0, 4.0]);
    }

    #[test]
    fn test_header_and_comments_skipped() {
        let data = "# synthetic data\nf1,f2,label\n1.0,2.0,0\n\n3.0,4.0,1\n";
        let dataset = load_csv_reader(Cursor::new(data)).unwrap();
        assert_eq!(dataset.len(), 2);
    }

    #[test]
    fn test_invalid_feature_rejected() {
        let data = "1.0,abc,0\n";
        assert!(matches!(
            load_csv_reader(Cursor::new(data)).unwrap_err(),
            ModelError::ParseError(_)
        ));
    }

    #[test]
    fn test_non_integer_label_rejected() {
        let data = "1.0,2.0,0.5\n";
        assert!(matches!(
            load_csv_reader(Cursor::new(data)).unwrap_err(),
            ModelError::ParseError(_)
        ));
    }

    #[test]
    fn test_empty_input() {
        let data = "# nothing here\n";
        assert!(matches!(
            load_csv_reader(Cursor::new(data)).unwrap_err(),
            ModelError::EmptyDataset
        ));
    }

    #[test]
    fn test_ragged_rows_rejected() {
        let data = "1.0,2.0,0\n1.0,1\n";
        assert!(matches!(
            load_csv_reader(Cursor::new(data)).unwrap_err(),
            ModelError::DimensionMismatch { .. }
        ));
    }
}

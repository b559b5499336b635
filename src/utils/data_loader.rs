//! CSV frame I/O and column extraction

use crate::error::{AutoSenseError, Result};
use polars::prelude::*;
use std::fs::{self, File};
use std::io;
use std::path::Path;

/// Keep the io error kind, prefix the path
fn io_error(action: &str, path: &Path, err: &io::Error) -> AutoSenseError {
    AutoSenseError::IoError(io::Error::new(
        err.kind(),
        format!("cannot {} {}: {}", action, path.display(), err),
    ))
}

/// CSV loader for stage snapshots
#[derive(Debug, Clone)]
pub struct DataLoader {
    /// Rows scanned to infer column types
    infer_schema_length: usize,
}

impl Default for DataLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl DataLoader {
    pub fn new() -> Self {
        Self {
            infer_schema_length: 10_000,
        }
    }

    pub fn with_infer_schema_length(mut self, rows: usize) -> Self {
        self.infer_schema_length = rows.max(1);
        self
    }

    /// Load a CSV file with a header row
    pub fn load_csv(&self, path: impl AsRef<Path>) -> Result<DataFrame> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| io_error("open", path, &e))?;

        CsvReadOptions::default()
            .with_has_header(true)
            .with_infer_schema_length(Some(self.infer_schema_length))
            .into_reader_with_file_handle(file)
            .finish()
            .map_err(|e| AutoSenseError::DataError(format!("cannot parse {}: {}", path.display(), e)))
    }
}

/// CSV writer for stage snapshots
pub struct DataSaver;

impl DataSaver {
    /// Write a frame with a header row, creating parent directories
    pub fn save_csv(df: &mut DataFrame, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| io_error("create", parent, &e))?;
        }
        let mut file = File::create(path).map_err(|e| io_error("create", path, &e))?;

        CsvWriter::new(&mut file)
            .include_header(true)
            .finish(df)
            .map_err(|e| match e {
                PolarsError::IO { error, .. } => io_error("write", path, &error),
                other => AutoSenseError::DataError(format!("cannot write {}: {}", path.display(), other)),
            })
    }
}

/// Column names in frame order
pub fn column_names(df: &DataFrame) -> Vec<String> {
    df.get_column_names().iter().map(|c| c.to_string()).collect()
}

fn series<'a>(df: &'a DataFrame, name: &str) -> Result<&'a Series> {
    df.column(name)
        .map(|c| c.as_materialized_series())
        .map_err(|_| AutoSenseError::FeatureNotFound(name.to_string()))
}

/// Values of a column as floats.
///
/// Numeric and boolean columns are cast; string columns are parsed, with
/// unparseable entries read as missing.
pub fn column_f64(df: &DataFrame, name: &str) -> Result<Vec<Option<f64>>> {
    let s = series(df, name)?;
    match s.dtype() {
        DataType::Int8
        | DataType::Int16
        | DataType::Int32
        | DataType::Int64
        | DataType::UInt8
        | DataType::UInt16
        | DataType::UInt32
        | DataType::UInt64
        | DataType::Float32
        | DataType::Float64
        | DataType::Boolean => {
            let cast = s.cast(&DataType::Float64)?;
            Ok(cast.f64()?.into_iter().collect())
        }
        DataType::String => Ok(s
            .str()?
            .into_iter()
            .map(|v| v.and_then(|x| x.trim().parse::<f64>().ok()))
            .collect()),
        DataType::Null => Ok(vec![None; s.len()]),
        other => Err(AutoSenseError::DataError(format!(
            "column '{}' has unsupported type {} for numeric use",
            name, other
        ))),
    }
}

/// Values of a column as strings; non-string columns are cast
pub fn column_str(df: &DataFrame, name: &str) -> Result<Vec<Option<String>>> {
    let s = series(df, name)?;
    match s.dtype() {
        DataType::String => Ok(s.str()?.into_iter().map(|v| v.map(str::to_string)).collect()),
        DataType::Null => Ok(vec![None; s.len()]),
        _ => {
            let cast = s.cast(&DataType::String)?;
            Ok(cast.str()?.into_iter().map(|v| v.map(str::to_string)).collect())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn test_save_and_load_csv() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("data.csv");
        let mut df = df! {
            "make" => &["ford", "kia", "audi"],
            "mileage" => &[1000.0, 2500.5, 30.0],
        }
        .unwrap();

        DataSaver::save_csv(&mut df, &path).unwrap();
        let loaded = DataLoader::new().load_csv(&path).unwrap();

        assert_eq!(loaded.height(), 3);
        assert_eq!(column_names(&loaded), vec!["make", "mileage"]);
        assert_eq!(column_f64(&loaded, "mileage").unwrap()[1], Some(2500.5));
    }

    #[test]
    fn test_column_extraction_casts() {
        let df = df! {
            "year" => &[Some(2019i64), None, Some(2021)],
            "mileage" => &["12", "x", "7.5"],
        }
        .unwrap();

        assert_eq!(column_f64(&df, "year").unwrap(), vec![Some(2019.0), None, Some(2021.0)]);
        assert_eq!(column_f64(&df, "mileage").unwrap(), vec![Some(12.0), None, Some(7.5)]);
        assert_eq!(
            column_str(&df, "year").unwrap(),
            vec![Some("2019".to_string()), None, Some("2021".to_string())]
        );
    }

    #[test]
    fn test_missing_column() {
        let df = df! { "a" => &[1.0] }.unwrap();
        let err = column_f64(&df, "b").unwrap_err();
        assert!(matches!(err, AutoSenseError::FeatureNotFound(_)));
    }

    #[test]
    fn test_load_missing_file_is_io() {
        let dir = tempfile::tempdir().unwrap();
        let err = DataLoader::new().load_csv(dir.path().join("missing").join("train.csv")).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Io);
        assert!(err.to_string().contains("train.csv"));
    }

    #[test]
    fn test_save_into_file_path_is_io() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("blocker");
        fs::write(&blocker, "not a directory").unwrap();
        let mut df = df! { "a" => &[1.0] }.unwrap();
        let err = DataSaver::save_csv(&mut df, blocker.join("train.csv")).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Io);
    }
}

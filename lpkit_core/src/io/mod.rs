//! Module for reading and writing Models, and for exporting solution values
use std::path::Path;

use thiserror::Error;

use crate::inspect::InspectError;
use crate::model::{Model, ModelError};

pub mod export;
pub mod json;
pub mod lp;

pub use export::{variables_to_csv, variables_to_csv_by_index, variables_to_json_by_index};
use json::JsonError;

/// Model file formats recognised by extension
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ModelFormat {
    /// `.json`, readable and writable
    Json,
    /// `.lp`, write only
    Lp,
}

impl ModelFormat {
    /// Determine the format of a model file from its extension, ignoring case
    pub fn from_path(path: &Path) -> Result<Self, IoError> {
        let ext = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.to_ascii_lowercase());
        match ext.as_deref() {
            Some("json") => Ok(ModelFormat::Json),
            Some("lp") => Ok(ModelFormat::Lp),
            _ => Err(IoError::UnsupportedFormat(path.display().to_string())),
        }
    }
}

/// Read a model, the format is chosen by file extension
pub fn read_model<P: AsRef<Path>>(path: P) -> Result<Model, IoError> {
    let path = path.as_ref();
    match ModelFormat::from_path(path)? {
        ModelFormat::Json => {
            let model = Model::read_json(path)?;
            log::info!(
                "Read model {} with {} variables and {} constraints from {}",
                model.name(),
                model.num_vars(),
                model.num_constrs(),
                path.display()
            );
            Ok(model)
        }
        ModelFormat::Lp => Err(IoError::UnsupportedFormat(format!(
            "{} (lp files can only be written)",
            path.display()
        ))),
    }
}

/// Write the committed part of a model, the format is chosen by file extension
pub fn write_model<P: AsRef<Path>>(model: &Model, path: P) -> Result<(), IoError> {
    let path = path.as_ref();
    match ModelFormat::from_path(path)? {
        ModelFormat::Json => model.write_json(path)?,
        ModelFormat::Lp => lp::write_lp(model, path)?,
    }
    log::info!("Wrote model {} to {}", model.name(), path.display());
    Ok(())
}

#[derive(Error, Debug)]
pub enum IoError {
    #[error("Expected a .{expected} file, got {path}")]
    WrongExtension { path: String, expected: &'static str },
    #[error("Unsupported model file {0}")]
    UnsupportedFormat(String),
    #[error("Json error: {0}")]
    Json(#[from] JsonError),
    #[error("Csv error: {0}")]
    Csv(#[from] csv::Error),
    #[error("Unable to serialize: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error("Unable to write file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Unable to format model text")]
    Format(#[from] std::fmt::Error),
    #[error(transparent)]
    Inspect(#[from] InspectError),
    #[error(transparent)]
    Model(#[from] ModelError),
}

#[cfg(test)]
mod io_tests {
    use super::*;
    use crate::inspect::test_model::indexed_model;

    #[test]
    fn formats_by_extension() {
        assert_eq!(
            ModelFormat::from_path(Path::new("model.JSON")).unwrap(),
            ModelFormat::Json
        );
        assert_eq!(
            ModelFormat::from_path(Path::new("dir/model.lp")).unwrap(),
            ModelFormat::Lp
        );
        assert!(matches!(
            ModelFormat::from_path(Path::new("model.mps")),
            Err(IoError::UnsupportedFormat(_))
        ));
        assert!(ModelFormat::from_path(Path::new("model")).is_err());
    }

    #[test]
    fn write_then_read() {
        let model = indexed_model();
        let dir = tempfile::tempdir().unwrap();
        let json = dir.path().join("indexed.json");
        write_model(&model, &json).unwrap();
        let read = read_model(&json).unwrap();
        assert_eq!(read.num_vars(), model.num_vars());
        assert_eq!(read.num_constrs(), model.num_constrs());
        assert_eq!(read.sense(), model.sense());

        let lp = dir.path().join("indexed.lp");
        write_model(&model, &lp).unwrap();
        let text = std::fs::read_to_string(&lp).unwrap();
        assert!(text.starts_with("\\ Model"));
        assert!(text.contains(" cap(2): x[2,a] + x[2,b] <= 2"));
        assert!(matches!(read_model(&lp), Err(IoError::UnsupportedFormat(_))));
    }
}

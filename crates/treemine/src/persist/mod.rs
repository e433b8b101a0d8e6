//! Model persistence.
//!
//! Trained [`SotaModel`]s are stored as JSON through versioned schema types
//! ([`schema`]) kept separate from the runtime types. Reading validates the
//! configuration and the tree structure before a model is handed out.
//!
//! ```
//! use treemine::data::Table;
//! use treemine::model::sota::{SotaConfig, SotaModel};
//! use treemine::training::NoopMonitor;
//! use ndarray::array;
//!
//! let table = Table::from_array(array![[0.0], [1.0], [10.0], [11.0]].view());
//! let config = SotaConfig::builder().min_resource(5.0).build().unwrap();
//! let model = SotaModel::train(&table, None, config, &NoopMonitor).unwrap();
//!
//! let json = model.to_json_string().unwrap();
//! let loaded = SotaModel::from_json_str(&json).unwrap();
//! assert_eq!(loaded.n_leaves(), model.n_leaves());
//! assert_eq!(loaded.feature_columns(), model.feature_columns());
//! ```

mod convert;
mod error;
pub mod schema;

use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

pub use error::{ReadError, WriteError};
pub use schema::{SotaModelSchema, SCHEMA_VERSION};

use crate::model::sota::SotaModel;

impl SotaModel {
    /// Serialize to a pretty-printed JSON string.
    pub fn to_json_string(&self) -> Result<String, WriteError> {
        Ok(serde_json::to_string_pretty(&SotaModelSchema::from(self))?)
    }

    /// Parse and validate a model from JSON.
    pub fn from_json_str(json: &str) -> Result<Self, ReadError> {
        let schema: SotaModelSchema = serde_json::from_str(json)?;
        Self::try_from(schema)
    }

    /// Write the model as JSON to `writer`.
    pub fn write_json<W: Write>(&self, writer: W) -> Result<(), WriteError> {
        serde_json::to_writer_pretty(writer, &SotaModelSchema::from(self))?;
        Ok(())
    }

    /// Read and validate a model from `reader`.
    pub fn read_json<R: Read>(reader: R) -> Result<Self, ReadError> {
        let schema: SotaModelSchema = serde_json::from_reader(reader)?;
        Self::try_from(schema)
    }

    /// Save the model to a file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), WriteError> {
        let mut writer = BufWriter::new(File::create(path)?);
        self.write_json(&mut writer)?;
        writer.flush()?;
        Ok(())
    }

    /// Load a model from a file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ReadError> {
        Self::read_json(BufReader::new(File::open(path)?))
    }
}

use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;

/// A pretty-printed JSON array on disk holding every entity of one kind.
#[derive(Debug, Clone)]
pub(crate) struct JsonFile {
    path: PathBuf,
}

impl JsonFile {
    /// Opens `dir/file_name`, creating the directory and an empty array if
    /// needed.
    pub(crate) fn open(dir: &Path, file_name: &str) -> Result<Self> {
        fs::create_dir_all(dir)
            .with_context(|| format!("Could not create data directory {}", dir.display()))?;
        let path = dir.join(file_name);

        let file = Self { path };
        if !file.path.exists() {
            file.write::<serde_json::Value>(&[])?;
        }
        Ok(file)
    }

    pub(crate) fn read<T: DeserializeOwned>(&self) -> Result<Vec<T>> {
        let file = File::open(&self.path)
            .with_context(|| format!("Could not open {}", self.path.display()))?;
        let reader = BufReader::new(file);
        let items = serde_json::from_reader(reader)
            .with_context(|| format!("Could not parse {}", self.path.display()))?;
        Ok(items)
    }

    pub(crate) fn write<T: Serialize>(&self, items: &[T]) -> Result<()> {
        let file = File::create(&self.path)?;
        let mut writer = BufWriter::new(file);
        serde_json::to_writer_pretty(&mut writer, items)?;
        writer.flush()?;
        Ok(())
    }
}

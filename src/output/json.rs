// Thu Jan 22 2026 - Alex

use crate::output::OutputDocument;
use serde::Serialize;
use serde_json::ser::{PrettyFormatter, Serializer};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum OutputError {
    #[error("Serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error("Failed to write {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

pub struct JsonWriter {
    pretty_print: bool,
    indent_size: usize,
}

impl JsonWriter {
    pub fn new() -> Self {
        Self {
            pretty_print: true,
            indent_size: 1,
        }
    }

    pub fn with_pretty_print(mut self, pretty: bool) -> Self {
        self.pretty_print = pretty;
        self
    }

    pub fn with_indent_size(mut self, size: usize) -> Self {
        self.indent_size = size;
        self
    }

    pub fn serialize(&self, document: &OutputDocument) -> Result<Vec<u8>, OutputError> {
        let mut buffer = Vec::new();

        if self.pretty_print {
            let indent = vec![b' '; self.indent_size];
            let formatter = PrettyFormatter::with_indent(&indent);
            let mut serializer = Serializer::with_formatter(&mut buffer, formatter);
            document.serialize(&mut serializer)?;
        } else {
            serde_json::to_writer(&mut buffer, document)?;
        }

        Ok(buffer)
    }

    /// Serializes fully before touching `path`, so a failed run leaves no
    /// partial artifact behind. Returns the number of bytes written.
    pub fn write_to_file<P: AsRef<Path>>(&self, document: &OutputDocument, path: P) -> Result<usize, OutputError> {
        let path = path.as_ref();
        let bytes = self.serialize(document)?;
        let io_error = |source| OutputError::Io {
            path: path.display().to_string(),
            source,
        };

        let file = File::create(path).map_err(io_error)?;
        let mut writer = BufWriter::new(file);
        writer.write_all(&bytes).map_err(io_error)?;
        writer.flush().map_err(io_error)?;

        Ok(bytes.len())
    }
}

impl Default for JsonWriter {
    fn default() -> Self {
        Self::new()
    }
}

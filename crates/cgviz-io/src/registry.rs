//! Reader trait and registry.

use cgviz_core::{DecodeError, VizError};
use indexmap::IndexMap;

use crate::formats::{KpiReader, MtlReader, ObjReader, PovReader, TraceReader};
use crate::source::{base_name, SourceFile};

/// Decodes one kind of source file.
///
/// Readers are selected by file name, since simulation output encodes both
/// the kind of file and the keys of its content in the name.
pub trait SourceReader: Send + Sync {
    /// Reader name, e.g. `"pov"`.
    fn name(&self) -> &'static str;

    /// Whether this reader handles files with this name.
    fn can_read(&self, file_name: &str) -> bool;

    /// Decode the text content of a file.
    fn read(&self, file_name: &str, content: &str) -> Result<SourceFile, VizError>;
}

/// Registry of source readers, tried in registration order.
pub struct ReaderRegistry {
    readers: IndexMap<&'static str, Box<dyn SourceReader>>,
}

impl Default for ReaderRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}

impl ReaderRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            readers: IndexMap::new(),
        }
    }

    /// Create a registry with every built-in reader.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register(PovReader::new());
        registry.register(TraceReader::new());
        registry.register(KpiReader::new());
        registry.register(ObjReader::new());
        registry.register(MtlReader::new());
        registry
    }

    /// Register a reader, replacing any reader of the same name.
    pub fn register<R: SourceReader + 'static>(&mut self, reader: R) {
        self.readers.insert(reader.name(), Box::new(reader));
    }

    pub fn get(&self, name: &str) -> Option<&dyn SourceReader> {
        self.readers.get(name).map(|r| r.as_ref())
    }

    /// The first reader that accepts the file name.
    pub fn reader_for(&self, file_name: &str) -> Option<&dyn SourceReader> {
        self.readers
            .values()
            .find(|r| r.can_read(file_name))
            .map(|r| r.as_ref())
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.readers.keys().copied()
    }

    /// Decode a file with the reader its name selects.
    pub fn decode(&self, file_name: &str, content: &str) -> Result<SourceFile, VizError> {
        let reader = self.reader_for(file_name).ok_or_else(|| DecodeError::UnknownFile {
            file: base_name(file_name).to_string(),
        })?;
        reader.read(file_name, content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cgviz_core::ErrorKind;

    struct EchoReader;

    impl SourceReader for EchoReader {
        fn name(&self) -> &'static str {
            "echo"
        }

        fn can_read(&self, file_name: &str) -> bool {
            file_name.ends_with(".echo")
        }

        fn read(&self, _file_name: &str, _content: &str) -> Result<SourceFile, VizError> {
            Ok(SourceFile::Povs(Vec::new()))
        }
    }

    #[test]
    fn test_default_readers() {
        let registry = ReaderRegistry::with_defaults();
        let names: Vec<_> = registry.names().collect();
        assert_eq!(names, ["pov", "trace", "kpis", "obj", "mtl"]);

        assert_eq!(registry.reader_for("qcmPov.Tx1.json").unwrap().name(), "pov");
        assert_eq!(registry.reader_for("dir/qcmTrace.Tx1-Rx1.json").unwrap().name(), "trace");
        assert_eq!(registry.reader_for("qcmKpis.Tx.json").unwrap().name(), "kpis");
        assert_eq!(registry.reader_for("City.OBJ").unwrap().name(), "obj");
        assert_eq!(registry.reader_for("city.mtl").unwrap().name(), "mtl");
        assert!(registry.reader_for("notes.txt").is_none());
    }

    #[test]
    fn test_unknown_file() {
        let registry = ReaderRegistry::with_defaults();
        let err = registry.decode("run/notes.txt", "").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::DecodeError);
        assert_eq!(err.to_string(), "Unrecognized source file: notes.txt");
    }

    #[test]
    fn test_custom_reader() {
        let mut registry = ReaderRegistry::new();
        assert!(registry.reader_for("a.echo").is_none());

        registry.register(EchoReader);
        assert!(registry.get("echo").is_some());
        assert!(matches!(
            registry.decode("a.echo", "").unwrap(),
            SourceFile::Povs(entries) if entries.is_empty()
        ));
    }
}

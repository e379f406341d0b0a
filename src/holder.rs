//! Sources and destinations of SKD documents

use std::{
    fmt,
    fs::File,
    io::{self, BufReader, BufWriter, Read, Write},
    path::{Path, PathBuf},
    sync::Arc,
};

use parking_lot::Mutex;

use crate::{
    error::{IOError, Result, SkdError},
    parser::config::DEFAULT_ACCEPTED_EXTENSION,
};

pub trait DatabaseHolder: fmt::Debug {
    fn is_writable(&self) -> bool;

    fn display_name(&self) -> Option<String>;

    /// Whether a parser may read this source without forcing
    fn default_acceptable(&self) -> bool;

    fn reader(&self) -> Result<Box<dyn Read + '_>>;

    /// A sink for the serialized document, `None` when the holder cannot provide one
    fn writer(&self) -> Result<Option<Box<dyn Write + '_>>>;
}

/// A document stored on disk
#[derive(Debug, Clone)]
pub struct DatabaseFile {
    path: PathBuf,
    accepted_extension: String,
}

impl DatabaseFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            accepted_extension: DEFAULT_ACCEPTED_EXTENSION.to_string(),
        }
    }

    pub fn accepting(mut self, extension: impl Into<String>) -> Self {
        self.accepted_extension = extension.into();
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl DatabaseHolder for DatabaseFile {
    fn is_writable(&self) -> bool {
        true
    }

    fn display_name(&self) -> Option<String> {
        self.path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
    }

    fn default_acceptable(&self) -> bool {
        self.path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case(&self.accepted_extension))
    }

    fn reader(&self) -> Result<Box<dyn Read + '_>> {
        let file = File::open(&self.path).map_err(|e| {
            let path = self.path.display().to_string();
            if e.kind() == io::ErrorKind::NotFound {
                SkdError::io(IOError::FileNotFound(path))
            } else {
                SkdError::io(IOError::ReadError(format!("{}: {}", path, e)))
            }
        })?;
        Ok(Box::new(BufReader::new(file)))
    }

    fn writer(&self) -> Result<Option<Box<dyn Write + '_>>> {
        let file = File::create(&self.path).map_err(|e| {
            SkdError::io(IOError::WriteError(format!(
                "{}: {}",
                self.path.display(),
                e
            )))
        })?;
        Ok(Some(Box::new(BufWriter::new(file))))
    }
}

/// An in-memory document; whatever is written to it can be read back with [`MemoryHolder::written`]
#[derive(Debug, Clone)]
pub struct MemoryHolder {
    name: String,
    source: String,
    output: Arc<Mutex<Vec<u8>>>,
    writable: bool,
    acceptable: bool,
}

impl MemoryHolder {
    pub fn new(name: impl Into<String>, source: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            source: source.into(),
            output: Arc::new(Mutex::new(Vec::new())),
            writable: true,
            acceptable: true,
        }
    }

    pub fn read_only(mut self) -> Self {
        self.writable = false;
        self
    }

    pub fn unacceptable(mut self) -> Self {
        self.acceptable = false;
        self
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    /// Everything written so far, lossily decoded
    pub fn written(&self) -> String {
        String::from_utf8_lossy(&self.output.lock()).into_owned()
    }
}

impl DatabaseHolder for MemoryHolder {
    fn is_writable(&self) -> bool {
        self.writable
    }

    fn display_name(&self) -> Option<String> {
        Some(self.name.clone())
    }

    fn default_acceptable(&self) -> bool {
        self.acceptable
    }

    fn reader(&self) -> Result<Box<dyn Read + '_>> {
        Ok(Box::new(self.source.as_bytes()))
    }

    fn writer(&self) -> Result<Option<Box<dyn Write + '_>>> {
        if !self.writable {
            return Ok(None);
        }
        self.output.lock().clear();
        Ok(Some(Box::new(SharedBuffer(Arc::clone(&self.output)))))
    }
}

struct SharedBuffer(Arc<Mutex<Vec<u8>>>);

impl Write for SharedBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

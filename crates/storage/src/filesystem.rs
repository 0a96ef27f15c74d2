//! Local filesystem storage backend
//!
//! Each backend instance owns one uniquely named temp file, allocated on
//! [`StorageBackend::create`] and deleted on [`StorageBackend::remove`].

use std::fs::{self, File, OpenOptions};
use std::io::{self, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use buffer_core::{Error, FileSystemConfig, Result};
use tracing::{debug, instrument};
use uuid::Uuid;

use crate::backend::{
    BackendFactory, BoxReader, BoxWriter, SharedFactory, StorageBackend, Writer,
};

/// Attempts at finding an unused temp file name before giving up
const MAX_CREATE_ATTEMPTS: u32 = 16;

/// Spool files are private to the owning user
#[cfg(unix)]
const TEMP_FILE_MODE: u32 = 0o600;

const READ_BUF_SIZE: usize = 64 * 1024;
const WRITE_BUF_SIZE: usize = 64 * 1024;

/// A single configuration override, applied in order onto a [`FileSystemConfig`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackendOption {
    /// Directory temp files are created in
    TempDir(PathBuf),
    /// String prepended to generated file names
    Prefix(String),
}

impl BackendOption {
    fn apply(self, config: &mut FileSystemConfig) {
        match self {
            BackendOption::TempDir(dir) => config.temp_dir = Some(dir),
            BackendOption::Prefix(prefix) => config.prefix = prefix,
        }
    }
}

/// Set the directory temp files are created in
pub fn with_temp_dir(dir: impl Into<PathBuf>) -> BackendOption {
    BackendOption::TempDir(dir.into())
}

/// Set the prefix of generated temp file names
pub fn with_prefix(prefix: impl Into<String>) -> BackendOption {
    BackendOption::Prefix(prefix.into())
}

fn build_config(options: impl IntoIterator<Item = BackendOption>) -> Result<FileSystemConfig> {
    let mut config = FileSystemConfig::default();
    for option in options {
        option.apply(&mut config);
    }
    config.validate()?;
    Ok(config)
}

/// Create a factory producing file system backends configured by `options`
///
/// Options are validated once here; every backend the factory produces
/// shares the resulting configuration.
pub fn new(options: impl IntoIterator<Item = BackendOption>) -> Result<FileSystemFactory> {
    FileSystemFactory::from_config(build_config(options)?)
}

/// Local filesystem storage backend
///
/// `filename` is bound by a successful `create` and is never cleared, so a
/// second `remove` targets the already deleted path and fails.
#[derive(Debug)]
pub struct FileSystemBackend {
    config: FileSystemConfig,
    filename: Option<PathBuf>,
}

impl FileSystemBackend {
    /// Create a backend from options applied over the defaults
    pub fn new(options: impl IntoIterator<Item = BackendOption>) -> Result<Self> {
        Ok(Self::unbound(build_config(options)?))
    }

    /// Create a backend from an explicit configuration
    pub fn from_config(config: FileSystemConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self::unbound(config))
    }

    fn unbound(config: FileSystemConfig) -> Self {
        Self {
            config,
            filename: None,
        }
    }

    /// Get the configuration
    pub fn config(&self) -> &FileSystemConfig {
        &self.config
    }

    /// Path of the bound temp file, if `create` has succeeded
    pub fn filename(&self) -> Option<&Path> {
        self.filename.as_deref()
    }

    /// Generate a candidate temp file path
    fn temp_path(&self) -> PathBuf {
        let name = format!("{}-{}.tmp", self.config.prefix, Uuid::new_v4().simple());
        self.config.resolved_temp_dir().join(name)
    }

    /// Exclusively create a fresh temp file, retrying on name collisions
    fn create_exclusive(&self) -> Result<(File, PathBuf)> {
        let mut options = OpenOptions::new();
        options.write(true).create_new(true);
        #[cfg(unix)]
        {
            use std::os::unix::fs::OpenOptionsExt;
            options.mode(TEMP_FILE_MODE);
        }

        let mut attempt = 1;
        loop {
            let path = self.temp_path();
            match options.open(&path) {
                Ok(file) => return Ok((file, path)),
                Err(e)
                    if e.kind() == io::ErrorKind::AlreadyExists && attempt < MAX_CREATE_ATTEMPTS =>
                {
                    debug!(?path, attempt, "Temp file name taken, retrying");
                    attempt += 1;
                }
                Err(e) => return Err(Error::storage("create", path, e)),
            }
        }
    }

    /// Delete the file bound by an earlier `create`, keeping the binding if that fails
    fn release_previous(&mut self) -> Result<()> {
        let Some(previous) = self.filename.take() else {
            return Ok(());
        };

        match fs::remove_file(&previous) {
            Ok(()) => {
                debug!(?previous, "Removed superseded temp file");
                Ok(())
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => {
                let err = Error::storage("remove", &previous, e);
                self.filename = Some(previous);
                Err(err)
            }
        }
    }
}

impl StorageBackend for FileSystemBackend {
    #[instrument(skip(self), fields(backend = "filesystem"))]
    fn create(&mut self) -> Result<BoxWriter> {
        self.release_previous()?;

        let (file, path) = self.create_exclusive()?;
        debug!(?path, "Created temp file");

        self.filename = Some(path.clone());
        Ok(Box::new(FileWriter::new(file, path)))
    }

    #[instrument(skip(self), fields(backend = "filesystem"))]
    fn open(&self) -> Result<BoxReader> {
        let path = self.filename.as_ref().ok_or(Error::NotCreated)?;
        debug!(?path, "Opening temp file");

        let file = File::open(path).map_err(|e| Error::storage("open", path, e))?;
        Ok(Box::new(BufReader::with_capacity(READ_BUF_SIZE, file)))
    }

    #[instrument(skip(self), fields(backend = "filesystem"))]
    fn remove(&mut self) -> Result<()> {
        let Some(path) = self.filename.as_ref() else {
            return Ok(());
        };
        debug!(?path, "Removing temp file");

        fs::remove_file(path).map_err(|e| Error::storage("remove", path, e))
    }
}

/// Factory capturing a validated configuration
#[derive(Debug, Clone)]
pub struct FileSystemFactory {
    config: FileSystemConfig,
}

impl FileSystemFactory {
    /// Create a factory from an explicit configuration
    pub fn from_config(config: FileSystemConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    /// Get the configuration
    pub fn config(&self) -> &FileSystemConfig {
        &self.config
    }

    /// Produce one fresh, unbound backend
    pub fn backend(&self) -> FileSystemBackend {
        FileSystemBackend::unbound(self.config.clone())
    }

    /// Wrap this factory for sharing between consumers
    pub fn shared(self) -> SharedFactory {
        std::sync::Arc::new(self)
    }
}

impl BackendFactory for FileSystemFactory {
    fn new_backend(&self) -> Box<dyn StorageBackend> {
        Box::new(self.backend())
    }
}

/// Buffered write handle to a temp file
#[derive(Debug)]
pub struct FileWriter {
    file: Option<BufWriter<File>>,
    path: PathBuf,
}

impl FileWriter {
    fn new(file: File, path: PathBuf) -> Self {
        Self {
            file: Some(BufWriter::with_capacity(WRITE_BUF_SIZE, file)),
            path,
        }
    }

    fn file_mut(&mut self) -> io::Result<&mut BufWriter<File>> {
        let path = &self.path;
        self.file
            .as_mut()
            .ok_or_else(|| io::Error::other(format!("writer for {} is closed", path.display())))
    }
}

impl Write for FileWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.file_mut()?.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.file_mut()?.flush()
    }
}

impl Writer for FileWriter {
    fn close(&mut self) -> io::Result<()> {
        let Some(f) = self.file.take() else {
            // Already closed
            return Ok(());
        };

        let f = f.into_inner().map_err(|e| e.into_error())?;
        f.sync_all()
    }
}

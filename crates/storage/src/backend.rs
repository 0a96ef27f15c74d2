//! Storage backend trait definitions
//!
//! Defines the synchronous contract every spool storage medium implements,
//! together with the handle types it hands out and the factory contract
//! consumers use to obtain fresh backend instances.

use std::fmt::Debug;
use std::io;
use std::sync::Arc;

use buffer_core::Result;

pub type BoxReader = Box<dyn Reader>;
pub type BoxWriter = Box<dyn Writer>;

/// A readable handle over previously written spool data.
///
/// Closing is dropping: the descriptor is released when the box goes away.
pub trait Reader
where Self: io::Read + Debug + Send + 'static
{
}

impl<T: io::Read + Debug + Send + 'static> Reader for T {}

/// A writable sink for spool data.
pub trait Writer
where Self: io::Write + Debug + Send + 'static
{
    /// Flushes buffered bytes and persists them to the storage medium.
    ///
    /// Calling it again after a successful close is a no-op. Dropping a writer
    /// without closing it still releases the descriptor, but any error from the
    /// final flush is lost.
    ///
    /// This cannot take `self` by value, because `Box<dyn Writer>` is unsized.
    fn close(&mut self) -> io::Result<()>;
}

/// Trait for spool storage backends
///
/// One instance backs exactly one spool slot. Operations on a single instance
/// must be serialized by the caller; distinct instances share no state.
pub trait StorageBackend: Debug + Send {
    /// Allocate new storage and return a write handle positioned at offset zero
    ///
    /// # Errors
    /// Returns error if the storage cannot be allocated. The instance stays
    /// usable and a later call may succeed.
    fn create(&mut self) -> Result<BoxWriter>;

    /// Return a read handle over the data written through [`StorageBackend::create`]
    ///
    /// # Errors
    /// Returns [`buffer_core::Error::NotCreated`] if nothing was created yet,
    /// or a storage error if the data is gone or unreadable.
    fn open(&self) -> Result<BoxReader>;

    /// Release the underlying storage
    ///
    /// Succeeds without doing anything if nothing was created.
    ///
    /// # Errors
    /// Returns error if deletion fails, including when the storage was
    /// already removed.
    fn remove(&mut self) -> Result<()>;
}

/// Produces fresh, independent backend instances from one captured configuration.
pub trait BackendFactory: Send + Sync {
    fn new_backend(&self) -> Box<dyn StorageBackend>;
}

impl<F> BackendFactory for F
where F: Fn() -> Box<dyn StorageBackend> + Send + Sync
{
    fn new_backend(&self) -> Box<dyn StorageBackend> {
        self()
    }
}

/// A factory shared between consumers.
pub type SharedFactory = Arc<dyn BackendFactory>;

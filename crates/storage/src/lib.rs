//! Storage - Pluggable spool storage backends for hybrid buffers
//!
//! A buffering layer obtains one backend instance per spool slot from a
//! [`BackendFactory`], then drives it through `create` (write), `open` (read
//! back) and `remove` (release). The medium behind the contract is opaque to
//! the consumer.
//!
//! Currently provided:
//! - Local filesystem temp files ([`FileSystemBackend`])
//!
//! # Example
//!
//! ```no_run
//! use std::io::{Read, Write};
//! use storage::filesystem::{self, with_prefix};
//! use storage::BackendFactory;
//!
//! # fn example() -> buffer_core::Result<()> {
//! let factory = filesystem::new([with_prefix("spool")])?;
//!
//! let mut backend = factory.new_backend();
//! let mut writer = backend.create()?;
//! writer.write_all(b"buffered bytes")?;
//! writer.close()?;
//!
//! let mut data = Vec::new();
//! backend.open()?.read_to_end(&mut data)?;
//! backend.remove()?;
//! # Ok(())
//! # }
//! ```

mod backend;
pub mod filesystem;

pub use backend::{
    BackendFactory, BoxReader, BoxWriter, Reader, SharedFactory, StorageBackend, Writer,
};
pub use filesystem::{BackendOption, FileSystemBackend, FileSystemFactory, FileWriter};

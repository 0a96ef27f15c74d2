//! Shared fixtures for the storage benchmarks

use std::io::{Read, Write};

use storage::StorageBackend;

/// Push `data` through one spool slot: create, write, close, read back, remove.
///
/// Returns the number of bytes read back.
pub fn spool_round_trip(
    backend: &mut dyn StorageBackend,
    data: &[u8],
) -> buffer_core::Result<usize> {
    let mut writer = backend.create()?;
    writer.write_all(data)?;
    writer.close()?;

    let mut buf = Vec::with_capacity(data.len());
    backend.open()?.read_to_end(&mut buf)?;

    backend.remove()?;
    Ok(buf.len())
}

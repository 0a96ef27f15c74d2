use anyhow::Result;
use buffer_core::{init_tracing, Error, FileSystemConfig};
use std::collections::HashSet;
use std::io::{Read, Write};
use std::path::PathBuf;
use std::sync::Arc;
use storage::filesystem::{self, with_prefix, with_temp_dir};
use storage::{BackendFactory, FileSystemFactory, SharedFactory, StorageBackend};

fn init() {
    init_tracing("storage=debug,integration_tests=debug");
}

#[test]
fn test_spool_slot_lifecycle() -> Result<()> {
    init();

    // 1. Configure a factory against the system temp dir
    let factory = filesystem::new([with_temp_dir(std::env::temp_dir()), with_prefix("test")])?;
    let mut backend = factory.new_backend();

    // 2. Write
    let data = b"Hello, Storage!";
    let mut writer = backend.create()?;
    writer.write_all(data)?;
    writer.close()?;

    // 3. Read back exactly what was written
    let mut reader = backend.open()?;
    let mut read_back = [0u8; 15];
    reader.read_exact(&mut read_back)?;
    assert_eq!(&read_back, data);
    let mut rest = Vec::new();
    reader.read_to_end(&mut rest)?;
    assert!(rest.is_empty());
    drop(reader);

    // 4. Release the slot
    backend.remove()?;

    // 5. The data is gone
    let err = backend.open().unwrap_err();
    assert!(err.is_not_found(), "unexpected error: {err}");

    Ok(())
}

#[test]
fn test_closure_factory() -> Result<()> {
    init();
    let temp_dir = tempfile::tempdir()?;
    let dir = temp_dir.path().to_path_buf();

    // Any closure yielding a backend satisfies the factory contract
    let factory: SharedFactory = Arc::new(move || -> Box<dyn StorageBackend> {
        Box::new(
            storage::FileSystemBackend::new([with_temp_dir(dir.clone()), with_prefix("closure")])
                .expect("valid options"),
        )
    });

    let mut backend = factory.new_backend();
    let mut writer = backend.create()?;
    writer.write_all(b"from a closure")?;
    writer.close()?;

    let mut text = String::new();
    backend.open()?.read_to_string(&mut text)?;
    assert_eq!(text, "from a closure");

    backend.remove()?;
    assert_eq!(std::fs::read_dir(temp_dir.path())?.count(), 0);
    Ok(())
}

#[test]
fn test_factory_from_json_config() -> Result<()> {
    init();
    let temp_dir = tempfile::tempdir()?;
    let json = serde_json::json!({
        "temp_dir": temp_dir.path(),
        "prefix": "json",
    })
    .to_string();

    let config = FileSystemConfig::from_json(&json)?;
    let factory = FileSystemFactory::from_config(config)?;
    let mut backend = factory.backend();

    backend.create()?.close()?;
    let path = backend.filename().expect("bound after create").to_path_buf();
    assert_eq!(path.parent(), Some(temp_dir.path()));
    assert!(path
        .file_name()
        .and_then(|n| n.to_str())
        .is_some_and(|n| n.starts_with("json-") && n.ends_with(".tmp")));

    backend.remove()?;
    Ok(())
}

#[test]
fn test_concurrent_creates_never_collide() -> Result<()> {
    init();
    let temp_dir = tempfile::tempdir()?;
    let factory = filesystem::new([with_temp_dir(temp_dir.path()), with_prefix("race")])?;

    let threads = 8;
    let per_thread = 25;

    let paths: Vec<PathBuf> = std::thread::scope(|s| {
        let handles: Vec<_> = (0..threads)
            .map(|t| {
                let factory = &factory;
                s.spawn(move || {
                    let mut created = Vec::new();
                    for i in 0..per_thread {
                        let mut backend = factory.backend();
                        let mut writer = backend.create().expect("create");
                        writeln!(writer, "thread {t} slot {i}").expect("write");
                        writer.close().expect("close");

                        let mut text = String::new();
                        backend
                            .open()
                            .expect("open")
                            .read_to_string(&mut text)
                            .expect("read");
                        assert_eq!(text, format!("thread {t} slot {i}\n"));

                        created.push(backend.filename().expect("bound").to_path_buf());
                    }
                    created
                })
            })
            .collect();

        handles
            .into_iter()
            .flat_map(|h| h.join().expect("thread panicked"))
            .collect()
    });
    assert_eq!(paths.len(), threads * per_thread);

    let unique: HashSet<_> = paths.iter().collect();
    assert_eq!(unique.len(), threads * per_thread);
    assert_eq!(std::fs::read_dir(temp_dir.path())?.count(), threads * per_thread);

    Ok(())
}

#[test]
fn test_errors_surface_to_caller() -> Result<()> {
    init();
    let temp_dir = tempfile::tempdir()?;
    let missing = temp_dir.path().join("nonexistent");
    let mut backend = filesystem::new([with_temp_dir(&missing)])?.backend();

    let err = backend.create().unwrap_err();
    assert!(err.io_kind().is_some(), "expected an I/O failure, got {err}");
    assert!(backend.filename().is_none());

    // Nothing bound: open is a precondition failure, remove is a no-op
    assert!(matches!(backend.open(), Err(Error::NotCreated)));
    backend.remove()?;

    Ok(())
}

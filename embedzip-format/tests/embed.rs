//! Writing embeddable output and reading it back from disk.

use std::collections::BTreeMap;
use std::fs;
use std::num::NonZeroUsize;
use std::path::Path;

use embedzip_format::{
    chunk_file_name, extract_all, write_embedded, Archive, ChunkStore, Compression, OpenError,
    PackOptions, MODULE_FILE_NAME,
};

fn snapshot(dir: &Path) -> BTreeMap<String, Vec<u8>> {
    fs::read_dir(dir)
        .unwrap()
        .map(|e| {
            let e = e.unwrap();
            (
                e.file_name().to_string_lossy().into_owned(),
                fs::read(e.path()).unwrap(),
            )
        })
        .collect()
}

fn make_source(root: &Path) {
    fs::create_dir_all(root.join("terraform/plugins")).unwrap();
    fs::write(root.join("terraform/main.tf"), "resource \"null\" \"x\" {}\n".repeat(40)).unwrap();
    fs::write(root.join("terraform/plugins/p.bin"), vec![7u8; 3000]).unwrap();
}

fn small_chunks() -> PackOptions {
    PackOptions {
        chunk_size: NonZeroUsize::new(256).unwrap(),
        compression: Compression::Deflate,
    }
}

#[test]
fn test_write_embedded_is_idempotent() {
    let temp = tempfile::tempdir().unwrap();
    let source = temp.path().join("source");
    let output = temp.path().join("gen/assets");
    make_source(&source);

    let first = write_embedded(&source, &output, &small_chunks()).unwrap();
    let before = snapshot(&output);

    let second = write_embedded(&source, &output, &small_chunks()).unwrap();
    let after = snapshot(&output);

    assert_eq!(first, second);
    assert_eq!(before, after);
    assert_eq!(before.len(), first.chunks + 1);
    assert!(before.contains_key(MODULE_FILE_NAME));
    assert!(before.contains_key(&chunk_file_name(first.chunks - 1)));
    assert!(!before.contains_key(&chunk_file_name(first.chunks)));

    // No staging directories are left behind.
    let siblings: Vec<_> = fs::read_dir(temp.path().join("gen"))
        .unwrap()
        .map(|e| e.unwrap().file_name())
        .collect();
    assert_eq!(siblings, vec![std::ffi::OsString::from("assets")]);
}

#[test]
fn test_rewrite_drops_stale_chunks() {
    let temp = tempfile::tempdir().unwrap();
    let source = temp.path().join("source");
    let output = temp.path().join("assets");
    make_source(&source);

    let big = write_embedded(&source, &output, &small_chunks()).unwrap();
    fs::remove_file(source.join("terraform/plugins/p.bin")).unwrap();
    let small = write_embedded(&source, &output, &small_chunks()).unwrap();

    assert!(small.chunks < big.chunks);
    assert_eq!(snapshot(&output).len(), small.chunks + 1);
}

#[test]
fn test_open_dir_roundtrip() {
    let temp = tempfile::tempdir().unwrap();
    let source = temp.path().join("source");
    let output = temp.path().join("assets");
    let dest = temp.path().join("dest");
    make_source(&source);

    let summary = write_embedded(&source, &output, &small_chunks()).unwrap();
    let store = ChunkStore::open_dir(&output).unwrap();
    assert_eq!(store.chunks().len(), summary.chunks);
    assert_eq!(store.len(), summary.bytes);

    let archive = Archive::open(store).unwrap();
    extract_all(&archive, &dest).unwrap();

    assert_eq!(
        fs::read(source.join("terraform/main.tf")).unwrap(),
        fs::read(dest.join("terraform/main.tf")).unwrap()
    );
    assert_eq!(
        fs::read(dest.join("terraform/plugins/p.bin")).unwrap(),
        vec![7u8; 3000]
    );
}

#[test]
fn test_open_dir_with_gap() {
    let temp = tempfile::tempdir().unwrap();
    let source = temp.path().join("source");
    let output = temp.path().join("assets");
    make_source(&source);

    let summary = write_embedded(&source, &output, &small_chunks()).unwrap();
    assert!(summary.chunks >= 3);
    fs::remove_file(output.join(chunk_file_name(1))).unwrap();

    match ChunkStore::open_dir(&output) {
        Err(OpenError::MissingChunk(path)) => assert!(path.ends_with(chunk_file_name(1))),
        other => panic!("unexpected result: {:?}", other),
    }
}

#[test]
fn test_empty_source_writes_empty_module() {
    let temp = tempfile::tempdir().unwrap();
    let source = temp.path().join("source");
    let output = temp.path().join("assets");
    fs::create_dir_all(&source).unwrap();

    let summary = write_embedded(&source, &output, &PackOptions::default()).unwrap();
    assert_eq!(summary.chunks, 0);
    assert_eq!(summary.bytes, 0);

    let files = snapshot(&output);
    assert_eq!(files.len(), 1);
    assert!(files.contains_key(MODULE_FILE_NAME));

    let archive = Archive::open(ChunkStore::open_dir(&output).unwrap()).unwrap();
    assert!(archive.entries().is_empty());
}

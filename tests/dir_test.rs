//! Directory batch tests: recursive discovery, skip-if-exists, and per-file
//! error isolation.

use std::fs;
use std::io::{Cursor, Write};
use std::path::Path;

use tempfile::TempDir;
use zip::ZipWriter;
use zip::write::SimpleFileOptions;

use metaguide::{Mode, metaguide_dir};

fn write_epub(path: &Path, entries: &[(&str, &[u8])]) {
    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default();
    for (name, content) in entries {
        zip.start_file(*name, options).expect("start entry");
        zip.write_all(content).expect("write entry");
    }
    let data = zip.finish().expect("finish zip").into_inner();
    fs::write(path, data).expect("write epub");
}

#[test]
fn test_dir_processes_epub_and_xhtml_recursively() {
    let input = TempDir::new().expect("input dir");
    let output = TempDir::new().expect("output dir");

    write_epub(
        &input.path().join("book.epub"),
        &[("ch1.xhtml", b"<p>Hello world</p>")],
    );
    fs::write(input.path().join("page.xhtml"), "<p>Hi</p>").expect("write xhtml");
    fs::create_dir(input.path().join("nested")).expect("mkdir");
    fs::write(input.path().join("nested/deep.html"), "<p>deep</p>").expect("write html");
    // Not on the allow-list; must be ignored.
    fs::write(input.path().join("notes.txt"), "plain").expect("write txt");

    let summary = metaguide_dir(input.path(), output.path(), Mode::Apply).expect("batch");

    assert_eq!(summary.processed, 3);
    assert_eq!(summary.skipped, 0);
    assert_eq!(summary.errors, 0);

    assert!(output.path().join("book.epub").is_file());
    assert_eq!(
        fs::read_to_string(output.path().join("page.xhtml")).expect("read output"),
        "<p><b>H</b>i</p>"
    );
    // Nested files land flat in the output directory.
    assert_eq!(
        fs::read_to_string(output.path().join("deep.html")).expect("read output"),
        "<p><b>de</b>ep</p>"
    );
    assert!(!output.path().join("notes.txt").exists());
}

#[test]
fn test_dir_skips_existing_outputs() {
    let input = TempDir::new().expect("input dir");
    let output = TempDir::new().expect("output dir");

    fs::write(input.path().join("page.xhtml"), "<p>Hi</p>").expect("write xhtml");
    fs::write(output.path().join("page.xhtml"), "already here").expect("write existing");

    let summary = metaguide_dir(input.path(), output.path(), Mode::Apply).expect("batch");

    assert_eq!(summary.processed, 0);
    assert_eq!(summary.skipped, 1);
    assert_eq!(summary.errors, 0);
    // The existing file was left alone.
    assert_eq!(
        fs::read_to_string(output.path().join("page.xhtml")).expect("read output"),
        "already here"
    );
}

#[test]
fn test_dir_counts_bad_inputs_without_aborting() {
    let input = TempDir::new().expect("input dir");
    let output = TempDir::new().expect("output dir");

    // A corrupt container and a valid document in the same run.
    fs::write(input.path().join("broken.epub"), "not a zip").expect("write bad epub");
    fs::write(input.path().join("good.xhtml"), "<p>ok</p>").expect("write xhtml");

    let summary = metaguide_dir(input.path(), output.path(), Mode::Apply).expect("batch");

    assert_eq!(summary.processed, 1);
    assert_eq!(summary.errors, 1);
    assert!(output.path().join("good.xhtml").is_file());
    assert!(!output.path().join("broken.epub").exists());
}

#[test]
fn test_dir_creates_missing_output_directory() {
    let input = TempDir::new().expect("input dir");
    let root = TempDir::new().expect("output root");
    let output = root.path().join("does/not/exist/yet");

    fs::write(input.path().join("page.xhtml"), "<p>Hi</p>").expect("write xhtml");

    let summary = metaguide_dir(input.path(), &output, Mode::Apply).expect("batch");
    assert_eq!(summary.processed, 1);
    assert!(output.join("page.xhtml").is_file());
}

#[test]
fn test_dir_remove_roundtrip() {
    let input = TempDir::new().expect("input dir");
    let guided = TempDir::new().expect("guided dir");
    let restored = TempDir::new().expect("restored dir");

    write_epub(
        &input.path().join("book.epub"),
        &[("ch1.xhtml", b"<p>Hello world</p>"), ("style.css", b"p{}")],
    );

    metaguide_dir(input.path(), guided.path(), Mode::Apply).expect("apply batch");
    metaguide_dir(guided.path(), restored.path(), Mode::Remove).expect("remove batch");

    // Compare at the entry level; zip container bytes may differ by
    // compression settings.
    let roundtripped = fs::read(restored.path().join("book.epub")).expect("read restored");
    let mut archive =
        zip::ZipArchive::new(Cursor::new(roundtripped.as_slice())).expect("open restored");
    let mut names = Vec::new();
    for i in 0..archive.len() {
        let mut file = archive.by_index(i).expect("entry");
        let mut content = Vec::new();
        std::io::Read::read_to_end(&mut file, &mut content).expect("read entry");
        names.push((file.name().to_string(), content));
    }
    assert_eq!(
        names,
        vec![
            ("ch1.xhtml".to_string(), b"<p>Hello world</p>".to_vec()),
            ("style.css".to_string(), b"p{}".to_vec()),
        ]
    );
}

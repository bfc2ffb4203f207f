//! Directory batch processing.
//!
//! Walks a directory tree, metaguides every EPUB and XHTML file found, and
//! writes the results into a flat output directory. One bad input never
//! aborts the run: per-file failures are logged and counted.

use std::fs;
use std::path::{Path, PathBuf};

use crate::engine::{Mode, metaguide_document};
use crate::epub::{is_container_name, is_markup_name, metaguide_epub};
use crate::error::Result;

/// Per-item outcome counts for one batch run.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct BatchSummary {
    /// Files transformed and written.
    pub processed: usize,
    /// Files skipped because the output path already exists.
    pub skipped: usize,
    /// Files that failed; details are in the log.
    pub errors: usize,
}

/// Metaguide every EPUB and XHTML/HTML file under `input_dir` (recursively),
/// writing each result to `output_dir` under the same file name.
///
/// Existing output files are skipped, so an interrupted run can be resumed.
/// Only failures to enumerate the input tree or create the output directory
/// are fatal; per-file errors are counted in the summary.
pub fn metaguide_dir(input_dir: &Path, output_dir: &Path, mode: Mode) -> Result<BatchSummary> {
    log::info!(
        "processing files in {} to {}",
        input_dir.display(),
        output_dir.display()
    );
    if !output_dir.is_dir() {
        fs::create_dir_all(output_dir)?;
    }

    let mut files = Vec::new();
    collect_files(input_dir, &mut files)?;

    let mut summary = BatchSummary::default();
    for input_path in files {
        let Some(file_name) = input_path.file_name() else {
            continue;
        };
        let output_path = output_dir.join(file_name);

        if output_path.is_file() {
            log::warn!(
                "skipping {} because {} already exists",
                input_path.display(),
                output_path.display()
            );
            summary.skipped += 1;
            continue;
        }

        match process_file(&input_path, &output_path, mode) {
            Ok(()) => summary.processed += 1,
            Err(e) => {
                log::error!("error processing {}: {e}", input_path.display());
                summary.errors += 1;
            }
        }
    }
    Ok(summary)
}

fn collect_files(dir: &Path, files: &mut Vec<PathBuf>) -> Result<()> {
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_dir() {
            collect_files(&path, files)?;
        } else if let Some(name) = path.file_name().and_then(|n| n.to_str())
            && (is_container_name(name) || is_markup_name(name))
        {
            files.push(path);
        }
    }
    Ok(())
}

fn process_file(input: &Path, output: &Path, mode: Mode) -> Result<()> {
    let data = fs::read(input)?;
    let is_container = input
        .file_name()
        .and_then(|n| n.to_str())
        .is_some_and(is_container_name);
    let transformed = if is_container {
        metaguide_epub(&data, mode)?
    } else {
        metaguide_document(&data, mode)
    };
    fs::write(output, transformed)?;
    Ok(())
}

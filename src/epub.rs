//! EPUB container processing.
//!
//! An EPUB is a zip archive of XHTML documents plus assets. This module
//! unpacks the archive, runs the transform over every markup entry, and
//! repacks everything else byte-identical. A zero-byte marker entry records
//! that a file has already been metaguided so a second pass can short-circuit
//! without rescanning content.
//!
//! The marker is a plain filename convention carried over from the original
//! container format. Any archive containing an entry with that exact name is
//! trusted to be processed already; it is a compatibility contract, not an
//! integrity guarantee.

use std::io::{Cursor, Read, Write};

use rayon::prelude::*;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

use crate::engine::{self, Mode};
use crate::error::{Error, Result};
use crate::util::decode_text;

/// Name of the zero-byte entry marking an already-metaguided file.
pub const MARKER_FILENAME: &str = "intellireading.metaguide";

/// Container extensions handled by [`metaguide_epub`] (case-insensitive).
pub const CONTAINER_EXTENSIONS: &[&str] = &["epub", "kepub"];

/// Markup extensions fed to the transform; everything else passes through.
/// Some EPUBs ship XML content under an `.html` extension, so both families
/// are listed.
pub const MARKUP_EXTENSIONS: &[&str] = &["xhtml", "html", "htm"];

/// Classification of a container entry, decided once at ingestion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    /// An XHTML/HTML document, subject to the transform.
    Markup,
    /// Styles, images, fonts, metadata: opaque passthrough.
    Other,
}

/// One file inside a container. Never mutated in place; the transform
/// replaces the whole entry.
#[derive(Debug, Clone)]
pub struct EpubEntry {
    pub name: String,
    pub content: Vec<u8>,
    pub kind: EntryKind,
}

impl EpubEntry {
    pub fn new(name: impl Into<String>, content: Vec<u8>) -> Self {
        let name = name.into();
        let kind = if is_markup_name(&name) {
            EntryKind::Markup
        } else {
            EntryKind::Other
        };
        EpubEntry {
            name,
            content,
            kind,
        }
    }
}

fn has_extension(name: &str, extensions: &[&str]) -> bool {
    name.rsplit_once('.')
        .is_some_and(|(_, ext)| extensions.iter().any(|e| ext.eq_ignore_ascii_case(e)))
}

/// Whether a filename names a markup document.
pub fn is_markup_name(name: &str) -> bool {
    has_extension(name, MARKUP_EXTENSIONS)
}

/// Whether a filename names an EPUB container.
pub fn is_container_name(name: &str) -> bool {
    has_extension(name, CONTAINER_EXTENSIONS)
}

/// Apply or remove metaguiding across a whole EPUB.
///
/// Entry order is preserved. With [`Mode::Apply`], an archive that already
/// carries the marker entry is returned byte-identical to the input. With
/// [`Mode::Remove`], a missing marker is not an error; markup entries are
/// still stripped of any marker tags they contain.
pub fn metaguide_epub(input: &[u8], mode: Mode) -> Result<Vec<u8>> {
    let entries = read_entries(input)?;
    log::debug!("read {} entries from input archive", entries.len());

    // Evaluated on the complete entry list, before any entry is touched.
    if mode == Mode::Apply && entries.iter().any(|e| e.name == MARKER_FILENAME) {
        log::debug!("archive already metaguided, copying through");
        return Ok(input.to_vec());
    }

    let mut entries: Vec<EpubEntry> = entries
        .into_par_iter()
        .map(|entry| transform_entry(entry, mode))
        .collect();

    match mode {
        Mode::Apply => entries.push(EpubEntry::new(MARKER_FILENAME, Vec::new())),
        Mode::Remove => entries.retain(|e| e.name != MARKER_FILENAME),
    }

    write_entries(&entries)
}

fn read_entries(input: &[u8]) -> Result<Vec<EpubEntry>> {
    let mut archive = ZipArchive::new(Cursor::new(input))?;
    let mut entries = Vec::with_capacity(archive.len());
    for index in 0..archive.len() {
        let mut file = archive.by_index(index)?;
        let mut content = Vec::with_capacity(file.size() as usize);
        file.read_to_end(&mut content)?;
        entries.push(EpubEntry::new(file.name().to_string(), content));
    }
    Ok(entries)
}

fn transform_entry(entry: EpubEntry, mode: Mode) -> EpubEntry {
    if entry.kind != EntryKind::Markup {
        log::debug!("passing through {}", entry.name);
        return entry;
    }
    log::debug!("transforming {}", entry.name);
    let content = {
        let text = decode_text(&entry.content);
        engine::transform(&text, mode).into_owned().into_bytes()
    };
    EpubEntry { content, ..entry }
}

fn write_entries(entries: &[EpubEntry]) -> Result<Vec<u8>> {
    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    let stored = SimpleFileOptions::default().compression_method(CompressionMethod::Stored);
    let deflated = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

    for entry in entries {
        if entry.name.is_empty() {
            return Err(Error::InvalidEntryName(entry.name.clone()));
        }
        // The EPUB spec requires the mimetype entry to be uncompressed.
        let options = if entry.name == "mimetype" {
            stored
        } else {
            deflated
        };
        zip.start_file(entry.name.as_str(), options)?;
        zip.write_all(&entry.content)?;
    }

    Ok(zip.finish()?.into_inner())
}

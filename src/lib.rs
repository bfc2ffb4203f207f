//! # metaguide
//!
//! Metaguiding (bionic-reading style) for XHTML documents and EPUB files:
//! the leading half of every word is bolded to give the eye an anchor point,
//! and the transform can be removed again to restore the original text.
//!
//! ## Features
//!
//! - Markup-aware: tags, attributes, comments, and entities are never touched
//! - Exact inverse: remove-after-apply restores the original bytes
//! - EPUB containers: all XHTML entries are transformed in parallel, assets
//!   pass through byte-identical, and a marker entry makes a second apply a
//!   no-op
//! - Directory batches with per-file error isolation
//!
//! ## Quick Start
//!
//! ```
//! use metaguide::{transform, Mode};
//!
//! let applied = transform("<p>Hello world</p>", Mode::Apply);
//! assert_eq!(applied, "<p><b>Hel</b>lo <b>wor</b>ld</p>");
//!
//! let restored = transform(&applied, Mode::Remove);
//! assert_eq!(restored, "<p>Hello world</p>");
//! ```
//!
//! ## Working with EPUBs
//!
//! ```no_run
//! use metaguide::{metaguide_epub, Mode};
//!
//! let input = std::fs::read("book.epub")?;
//! let output = metaguide_epub(&input, Mode::Apply)?;
//! std::fs::write("book.metaguided.epub", output)?;
//! # Ok::<(), metaguide::Error>(())
//! ```

pub mod batch;
pub mod engine;
pub mod epub;
pub mod error;
pub mod tokenizer;
pub(crate) mod util;

pub use batch::{BatchSummary, metaguide_dir};
pub use engine::{Mode, metaguide_document, split_index, transform};
pub use epub::{EntryKind, EpubEntry, MARKER_FILENAME, metaguide_epub};
pub use error::{Error, Result};

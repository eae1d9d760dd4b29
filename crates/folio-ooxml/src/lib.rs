//! # folio-ooxml
//!
//! DOCX output for folio.
//!
//! [`DocxRenderer`] turns an assembled document into a complete package:
//! one section per region with its own page-number footer, styles built
//! from the guideline's formatting rules, bookmarks on headings and
//! captions, and `PAGEREF` fields in the table of contents and the lists of
//! figures and tables.
//!
//! [`OoxmlArchive`] reads finished packages back, which the tests use to
//! check what was written.

pub mod archive;
pub mod error;
pub mod image;
pub mod package;
pub mod relationships;
pub mod sections;
pub mod styles;
pub mod writer;
pub mod xml;

pub use archive::OoxmlArchive;
pub use error::{OoxmlError, Result};
pub use package::DocumentProperties;
pub use relationships::Relationships;
pub use sections::PageGeometry;
pub use writer::{DocxRenderer, RenderedDocx};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

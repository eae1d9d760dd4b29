//! folio-core - numbering, regions and deferred lists for academic documents
//!
//! The engine behind folio. A [`DocumentSession`] receives content in
//! document order, numbers headings and captions as they arrive, tracks the
//! physical regions of the document and reserves anchors for the table of
//! contents and the lists of figures and tables. Finalizing the session
//! splices those lists in and assigns page numbering per region.
//!
//! # Example
//!
//! ```
//! use folio_core::{DocType, DocumentSession, ListKind, PageNumberingRules, RegionKind};
//!
//! let mut session = DocumentSession::new(DocType::Report);
//! session.start_region(RegionKind::TitlePage);
//! session.add_paragraph("A Study of Things", "title_main");
//! session.start_region(RegionKind::FrontMatter);
//! session.reserve_list(ListKind::Contents);
//! session.start_region(RegionKind::Body);
//! session.add_heading(1, "Introduction");
//! session.add_heading(2, "Background");
//!
//! let doc = session.finalize(&PageNumberingRules::default());
//! let toc: Vec<_> = doc.list_entries(ListKind::Contents).map(|e| e.text.as_str()).collect();
//! assert_eq!(toc, ["CHAPTER 1: INTRODUCTION", "1.1 Background"]);
//! assert_eq!(doc.regions[2].restart_at, Some(1));
//! ```
//!
//! No I/O happens here; text generation, configuration and DOCX output live
//! in the sibling crates.

pub mod anchors;
pub mod diagnostics;
pub mod model;
pub mod numbering;
pub mod regions;
pub mod session;

pub use anchors::{Anchor, AnchorResolver, AnchorToken, ListKind, Reservation};
pub use diagnostics::{codes, Diagnostic, Diagnostics, Severity};
pub use model::{
    Block, BlockKind, CaptionKind, CaptionRecord, DocType, FigureImage, HeadingRecord, ListEntry,
    NumberPath, PageRef, Position,
};
pub use numbering::{style_keys, NumberingEngine, Registration, StructureViolation};
pub use regions::{
    FooterPosition, NumberFormat, PageNumberingRules, Region, RegionKind, RegionManager,
};
pub use session::{AssembledDocument, DocumentSession};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

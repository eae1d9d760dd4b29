//! Anchors and deferred lists
//!
//! The table of contents and the lists of figures and tables sit in the front
//! matter but describe the whole document, so they cannot be written when
//! their position is reached. Instead an [`Anchor`] is reserved there and the
//! lists are spliced in once every heading and caption has been registered.
//!
//! Resolution runs in two phases:
//!
//! 1. Collect entries per list from the registered records and stable-sort
//!    them by source position.
//! 2. Walk the block stream once, forward, and splice each list immediately
//!    before its anchor block.
//!
//! The anchor block itself stays in the stream, marked consumed, and renders
//! as an empty seam.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::diagnostics::{codes, Diagnostic};
use crate::model::{
    Block, BlockKind, CaptionKind, CaptionRecord, DocType, HeadingRecord, ListEntry, PageRef,
    Position,
};

/// The generated lists
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ListKind {
    Contents,
    Figures,
    Tables,
}

impl ListKind {
    /// Every list, in the order the front matter presents them
    pub const ALL: [ListKind; 3] = [ListKind::Contents, ListKind::Figures, ListKind::Tables];

    /// Lists a document type carries in its front matter
    ///
    /// A synopsis has no front matter and carries none.
    pub fn carried_by(doc_type: DocType) -> &'static [ListKind] {
        match doc_type {
            DocType::Report => &Self::ALL,
            DocType::Synopsis => &[],
        }
    }

    /// Heading printed above the list
    pub fn heading(&self) -> &'static str {
        match self {
            ListKind::Contents => "Table of Contents",
            ListKind::Figures => "List of Figures",
            ListKind::Tables => "List of Tables",
        }
    }

    /// Caption kind a list of figures or tables collects
    fn caption_kind(&self) -> Option<CaptionKind> {
        match self {
            ListKind::Contents => None,
            ListKind::Figures => Some(CaptionKind::Figure),
            ListKind::Tables => Some(CaptionKind::Table),
        }
    }
}

/// Handle to a reserved anchor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct AnchorToken(u32);

/// A reserved insertion point for one list
#[derive(Debug, Clone, PartialEq)]
pub struct Anchor {
    pub token: AnchorToken,
    pub list: ListKind,
    pub position: Position,
    /// Set once the list has been spliced in
    pub consumed: bool,
}

/// Outcome of [`AnchorResolver::reserve_anchor`]
#[derive(Debug, Clone, PartialEq)]
pub enum Reservation {
    /// A new anchor was reserved at the requested position
    New(AnchorToken),
    /// The list already had an anchor; it is reused and nothing is reserved
    Existing(AnchorToken, Diagnostic),
}

impl Reservation {
    pub fn token(&self) -> AnchorToken {
        match self {
            Reservation::New(token) | Reservation::Existing(token, _) => *token,
        }
    }
}

/// Reserves anchors and splices the deferred lists in
#[derive(Debug, Clone, Default)]
pub struct AnchorResolver {
    anchors: Vec<Anchor>,
}

impl AnchorResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reserved anchors, in reservation order
    pub fn anchors(&self) -> &[Anchor] {
        &self.anchors
    }

    /// Token of the anchor reserved for `list`, if any
    pub fn token_for(&self, list: ListKind) -> Option<AnchorToken> {
        self.find(list).map(|anchor| anchor.token)
    }

    /// Reserve the insertion point for `list` at `position`
    pub fn reserve_anchor(&mut self, list: ListKind, position: Position) -> Reservation {
        if let Some(existing) = self.find(list) {
            let diagnostic = Diagnostic::warning(format!(
                "{} was already reserved; the existing anchor is reused",
                list.heading()
            ))
            .with_code(codes::DUPLICATE_ANCHOR)
            .with_help("Reserve each list once, in the front matter");
            return Reservation::Existing(existing.token, diagnostic);
        }

        let token = AnchorToken(self.anchors.len() as u32);
        self.anchors.push(Anchor {
            token,
            list,
            position,
            consumed: false,
        });
        tracing::debug!(?list, "reserved list anchor");
        Reservation::New(token)
    }

    /// Splice every pending list into `blocks` before its anchor
    ///
    /// Consumed anchors are skipped, so a second call adds nothing. A list
    /// without an anchor is skipped with a diagnostic: a warning when the list
    /// is in `expected`, an info message when the document never carries it.
    pub fn resolve_all(
        &mut self,
        expected: &[ListKind],
        headings: &[HeadingRecord],
        captions: &[CaptionRecord],
        blocks: &mut Vec<Block>,
    ) -> Vec<Diagnostic> {
        let mut diagnostics = Vec::new();
        let mut pending: HashMap<AnchorToken, Vec<ListEntry>> = HashMap::new();

        // Phase 1: collect and order
        for list in ListKind::ALL {
            let anchor = self.anchors.iter_mut().find(|a| a.list == list);
            if matches!(anchor, Some(Anchor { consumed: true, .. })) {
                continue;
            }

            let mut entries = collect_entries(list, headings, captions);
            entries.sort_by_key(|entry| entry.source_position);

            match anchor {
                Some(anchor) => {
                    tracing::debug!(?list, entries = entries.len(), "resolved list");
                    anchor.consumed = true;
                    pending.insert(anchor.token, entries);
                }
                None if !expected.contains(&list) => diagnostics.push(
                    Diagnostic::info(format!(
                        "{} is not carried by this document; {} skipped",
                        list.heading(),
                        entry_count(entries.len())
                    ))
                    .with_code(codes::MISSING_ANCHOR),
                ),
                None => diagnostics.push(
                    Diagnostic::warning(format!(
                        "{} has no reserved anchor; {} dropped",
                        list.heading(),
                        entry_count(entries.len())
                    ))
                    .with_code(codes::MISSING_ANCHOR)
                    .with_help("Reserve the list in the front matter before adding content"),
                ),
            }
        }

        if pending.is_empty() {
            return diagnostics;
        }

        // Phase 2: single forward splice
        let added: usize = pending.values().map(Vec::len).sum();
        let mut spliced = Vec::with_capacity(blocks.len() + added);
        for block in blocks.drain(..) {
            if let BlockKind::ListAnchor(token) = &block.kind {
                if let Some(entries) = pending.remove(token) {
                    spliced.extend(entries.into_iter().map(|entry| Block {
                        position: block.position,
                        kind: BlockKind::ListEntry(entry),
                    }));
                }
            }
            spliced.push(block);
        }
        *blocks = spliced;

        diagnostics
    }

    fn find(&self, list: ListKind) -> Option<&Anchor> {
        self.anchors.iter().find(|anchor| anchor.list == list)
    }
}

fn entry_count(n: usize) -> String {
    match n {
        1 => "1 entry".to_string(),
        n => format!("{} entries", n),
    }
}

fn collect_entries(
    list: ListKind,
    headings: &[HeadingRecord],
    captions: &[CaptionRecord],
) -> Vec<ListEntry> {
    match list.caption_kind() {
        None => headings
            .iter()
            .filter(|heading| !heading.number_path.is_empty())
            .map(|heading| ListEntry {
                list,
                text: heading.display_text.clone(),
                indent_level: heading.number_path.depth() - 1,
                number_path: heading.number_path.clone(),
                source_position: heading.position,
                page: PageRef::Unresolved {
                    bookmark: heading.position.bookmark_name(),
                },
            })
            .collect(),
        Some(kind) => captions
            .iter()
            .filter(|caption| caption.kind == kind)
            .map(|caption| ListEntry {
                list,
                text: caption.full_caption_text.clone(),
                indent_level: 0,
                number_path: caption.number_path(),
                source_position: caption.position,
                page: PageRef::Unresolved {
                    bookmark: caption.position.bookmark_name(),
                },
            })
            .collect(),
    }
}

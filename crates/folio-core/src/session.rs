//! Build session
//!
//! [`DocumentSession`] owns every engine and record of one document build.
//! Content is appended in document order; [`DocumentSession::finalize`]
//! consumes the session, resolves the deferred lists, assigns page numbering
//! and hands back an [`AssembledDocument`] for rendering.

use crate::anchors::{AnchorResolver, AnchorToken, ListKind, Reservation};
use crate::diagnostics::{Diagnostic, Diagnostics};
use crate::model::{
    Block, BlockKind, CaptionKind, CaptionRecord, DocType, FigureImage, HeadingRecord, ListEntry,
    Position,
};
use crate::numbering::{NumberingEngine, Registration};
use crate::regions::{PageNumberingRules, Region, RegionKind, RegionManager};

const DEFAULT_FIGURE_PREFIX: &str = "Fig";
const DEFAULT_TABLE_PREFIX: &str = "Table";

/// State of one document build
#[derive(Debug)]
pub struct DocumentSession {
    doc_type: DocType,
    numbering: NumberingEngine,
    regions: RegionManager,
    anchors: AnchorResolver,
    headings: Vec<HeadingRecord>,
    captions: Vec<CaptionRecord>,
    blocks: Vec<Block>,
    diagnostics: Diagnostics,
    next_position: u64,
    figure_prefix: String,
    table_prefix: String,
    expected_lists: Vec<ListKind>,
}

impl DocumentSession {
    /// Start an empty build with all counters at zero
    pub fn new(doc_type: DocType) -> Self {
        tracing::info!(%doc_type, "starting document session");
        Self {
            doc_type,
            numbering: NumberingEngine::new(),
            regions: RegionManager::new(),
            anchors: AnchorResolver::new(),
            headings: Vec::new(),
            captions: Vec::new(),
            blocks: Vec::new(),
            diagnostics: Diagnostics::new(),
            next_position: 0,
            figure_prefix: DEFAULT_FIGURE_PREFIX.to_string(),
            table_prefix: DEFAULT_TABLE_PREFIX.to_string(),
            expected_lists: ListKind::carried_by(doc_type).to_vec(),
        }
    }

    /// Use custom caption prefixes (`Fig`, `Table` by default)
    pub fn with_caption_prefixes(
        mut self,
        figure_prefix: impl Into<String>,
        table_prefix: impl Into<String>,
    ) -> Self {
        self.figure_prefix = figure_prefix.into();
        self.table_prefix = table_prefix.into();
        self
    }

    /// Override the lists this document is expected to reserve
    ///
    /// Defaults to [`ListKind::carried_by`] for the document type. An expected
    /// list left without an anchor is reported as a warning at finalize time.
    pub fn with_expected_lists(mut self, lists: &[ListKind]) -> Self {
        self.expected_lists = lists.to_vec();
        self
    }

    pub fn doc_type(&self) -> DocType {
        self.doc_type
    }

    /// Begin a new region and return its ordinal
    pub fn start_region(&mut self, kind: RegionKind) -> u32 {
        let registration = self.regions.start_region(kind);
        let ordinal = *registration.record();
        if let Some(violation) = registration.violation() {
            self.diagnostics.push(violation.to_diagnostic());
        }
        self.push_block(BlockKind::RegionStart { ordinal });
        ordinal
    }

    /// Register and append a heading
    ///
    /// A heading out of structural order is still appended, un-numbered, and
    /// the violation is recorded as a diagnostic.
    pub fn add_heading(&mut self, level: u8, text: &str) -> Registration<HeadingRecord> {
        let position = self.next_position();
        let registration = self
            .numbering
            .register_heading(level, text, self.doc_type, position);
        if let Some(violation) = registration.violation() {
            self.diagnostics.push(violation.to_diagnostic());
        }

        let record = registration.record().clone();
        self.headings.push(record.clone());
        self.blocks.push(Block {
            position,
            kind: BlockKind::Heading(record),
        });
        registration
    }

    /// Append a paragraph rendered with the given style key
    pub fn add_paragraph(&mut self, text: impl Into<String>, style_key: impl Into<String>) {
        self.push_block(BlockKind::Paragraph {
            text: text.into(),
            style_key: style_key.into(),
        });
    }

    /// Append an uncaptioned picture
    pub fn add_image(&mut self, image: FigureImage) {
        self.push_block(BlockKind::Image(image));
    }

    /// Append a figure and return its caption record
    ///
    /// `image` is `None` when the picture could not be loaded; the caption is
    /// numbered either way.
    pub fn add_figure(&mut self, caption: &str, image: Option<FigureImage>) -> CaptionRecord {
        let record = self.register_caption(CaptionKind::Figure, caption);
        self.push_block(BlockKind::Figure {
            image,
            caption: record.clone(),
        });
        record
    }

    /// Append a table and return its caption record
    pub fn add_table(
        &mut self,
        caption: &str,
        rows: Vec<Vec<String>>,
        header: bool,
    ) -> CaptionRecord {
        let record = self.register_caption(CaptionKind::Table, caption);
        self.push_block(BlockKind::Table {
            rows,
            header,
            caption: record.clone(),
        });
        record
    }

    pub fn add_page_break(&mut self) {
        self.push_block(BlockKind::PageBreak);
    }

    /// Reserve the insertion point for a deferred list at the current position
    pub fn reserve_list(&mut self, list: ListKind) -> AnchorToken {
        let position = self.next_position();
        match self.anchors.reserve_anchor(list, position) {
            Reservation::New(token) => {
                self.blocks.push(Block {
                    position,
                    kind: BlockKind::ListAnchor(token),
                });
                token
            }
            Reservation::Existing(token, diagnostic) => {
                self.diagnostics.push(diagnostic);
                token
            }
        }
    }

    /// Record a diagnostic raised by a collaborator
    pub fn push_diagnostic(&mut self, diagnostic: Diagnostic) {
        self.diagnostics.push(diagnostic);
    }

    pub fn headings(&self) -> &[HeadingRecord] {
        &self.headings
    }

    pub fn captions(&self) -> &[CaptionRecord] {
        &self.captions
    }

    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    pub fn regions(&self) -> &[Region] {
        self.regions.regions()
    }

    pub fn diagnostics(&self) -> &Diagnostics {
        &self.diagnostics
    }

    /// Resolve deferred lists, assign page numbering and close the session
    pub fn finalize(mut self, rules: &PageNumberingRules) -> AssembledDocument {
        tracing::info!(
            headings = self.headings.len(),
            captions = self.captions.len(),
            "finalizing document"
        );

        let list_diagnostics = self.anchors.resolve_all(
            &self.expected_lists,
            &self.headings,
            &self.captions,
            &mut self.blocks,
        );
        self.diagnostics.extend(list_diagnostics);

        let region_diagnostics = self.regions.finalize_numbering(rules);
        self.diagnostics.extend(region_diagnostics);

        AssembledDocument {
            doc_type: self.doc_type,
            rules: *rules,
            regions: self.regions.regions().to_vec(),
            blocks: self.blocks,
            headings: self.headings,
            captions: self.captions,
            diagnostics: self.diagnostics,
        }
    }

    fn register_caption(&mut self, kind: CaptionKind, caption: &str) -> CaptionRecord {
        let position = self.next_position();
        let path = self.numbering.register_caption(kind);
        let prefix = match kind {
            CaptionKind::Figure => &self.figure_prefix,
            CaptionKind::Table => &self.table_prefix,
        };
        let index_in_chapter = path.segments().last().copied().unwrap_or_default();
        let record = CaptionRecord {
            kind,
            chapter_number: self.numbering.current_chapter(),
            index_in_chapter,
            caption: caption.to_string(),
            full_caption_text: format!("{} {}: {}", prefix, path, caption),
            position,
        };
        tracing::debug!(?kind, number = %path, "registered caption");
        self.captions.push(record.clone());
        record
    }

    fn push_block(&mut self, kind: BlockKind) {
        let position = self.next_position();
        self.blocks.push(Block { position, kind });
    }

    fn next_position(&mut self) -> Position {
        let position = Position::new(self.next_position);
        self.next_position += 1;
        position
    }
}

/// A finalized document, ready for rendering
#[derive(Debug, Clone)]
pub struct AssembledDocument {
    pub doc_type: DocType,
    /// Rules the region numbering was computed with
    pub rules: PageNumberingRules,
    pub regions: Vec<Region>,
    /// Ordered block stream with list entries spliced in
    pub blocks: Vec<Block>,
    pub headings: Vec<HeadingRecord>,
    pub captions: Vec<CaptionRecord>,
    pub diagnostics: Diagnostics,
}

impl AssembledDocument {
    /// Entries of one resolved list, in the order they appear
    pub fn list_entries(&self, list: ListKind) -> impl Iterator<Item = &ListEntry> {
        self.blocks.iter().filter_map(move |block| match &block.kind {
            BlockKind::ListEntry(entry) if entry.list == list => Some(entry),
            _ => None,
        })
    }

    /// The region a block belongs to, by walking region starts
    pub fn region_of(&self, index: usize) -> Option<&Region> {
        let ordinal = self
            .blocks
            .get(..=index)?
            .iter()
            .rev()
            .find_map(|block| match block.kind {
                BlockKind::RegionStart { ordinal } => Some(ordinal),
                _ => None,
            })?;
        self.regions.get(ordinal as usize)
    }
}

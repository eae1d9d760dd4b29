//! DOCX renderer
//!
//! Serializes an [`AssembledDocument`] into a fresh DOCX package. Regions
//! become sections, headings and captions carry bookmarks, and list entries
//! point at those bookmarks through `PAGEREF` fields that Word fills in when
//! the document is opened.
//!
//! # Example
//!
//! ```
//! use folio_config::Guidelines;
//! use folio_core::{DocType, DocumentSession, RegionKind};
//! use folio_ooxml::{DocxRenderer, OoxmlArchive};
//!
//! let mut session = DocumentSession::new(DocType::Synopsis);
//! session.start_region(RegionKind::TitlePage);
//! session.add_paragraph("Smart Irrigation", "title_main");
//! session.start_region(RegionKind::Body);
//! session.add_heading(1, "Introduction");
//!
//! let guidelines = Guidelines::builtin();
//! let doc = session.finalize(&guidelines.page_numbering(DocType::Synopsis));
//! let rendered = DocxRenderer::new(&guidelines).render(&doc)?;
//!
//! let archive = OoxmlArchive::from_bytes(&rendered.bytes)?;
//! assert!(archive.document_xml()?.contains("1. Introduction"));
//! # Ok::<(), folio_ooxml::OoxmlError>(())
//! ```

use std::collections::{BTreeSet, HashMap};
use std::path::Path;

use folio_config::{Guidelines, CAPTION_STYLE, LIST_ENTRY_STYLE, PAGE_NUMBER_STYLE};
use folio_core::{
    AssembledDocument, Block, BlockKind, CaptionRecord, Diagnostic, DocType, FigureImage,
    HeadingRecord, ListEntry, NumberFormat, PageRef, Region,
};

use crate::archive::{OoxmlArchive, DOCUMENT_PART};
use crate::error::{OoxmlError, Result};
use crate::image::{extension_of, extent_for_width};
use crate::package::{
    content_types_xml, core_properties_xml, package_relationships, settings_xml,
    DocumentProperties, CONTENT_TYPES_PART, CORE_PROPERTIES_PART, DOCUMENT_RELS_PART,
    PACKAGE_RELS_PART, SETTINGS_PART, STYLES_PART,
};
use crate::relationships::Relationships;
use crate::sections::{footer_xml, section_properties, PageGeometry};
use crate::styles::{style_id, styles_xml, NORMAL_STYLE_ID};
use crate::xml::{escape_xml, field, inches_to_twips, text_runs, R_NS, W_NS, XML_DECLARATION};

/// Widest a figure may be, in inches
const MAX_FIGURE_WIDTH_IN: f64 = 6.0;
/// Width of uncaptioned images such as the title page logo
const LOGO_WIDTH_IN: f64 = 1.5;
/// Indent per list-entry level
const ENTRY_INDENT_IN: f32 = 0.4;
/// Gap between the dot-leader tab and the right margin
const TAB_INSET_TWIPS: i64 = 144;
/// Cached result of page references until Word updates the fields
const PAGEREF_PLACEHOLDER: &str = "...";

/// Output of [`DocxRenderer::render`]
#[derive(Debug)]
pub struct RenderedDocx {
    /// The DOCX package
    pub bytes: Vec<u8>,
    /// Style fallbacks met while rendering
    pub diagnostics: Vec<Diagnostic>,
}

/// Renders assembled documents with the formatting of a guideline set
#[derive(Debug)]
pub struct DocxRenderer<'g> {
    guidelines: &'g Guidelines,
    properties: DocumentProperties,
}

impl<'g> DocxRenderer<'g> {
    pub fn new(guidelines: &'g Guidelines) -> Self {
        Self {
            guidelines,
            properties: DocumentProperties::default(),
        }
    }

    /// Set the metadata written to docProps/core.xml
    pub fn with_properties(mut self, properties: DocumentProperties) -> Self {
        self.properties = properties;
        self
    }

    /// Render into a DOCX package in memory
    pub fn render(&self, doc: &AssembledDocument) -> Result<RenderedDocx> {
        let bytes = self.render_archive(doc)?.to_bytes()?;
        Ok(RenderedDocx {
            bytes,
            diagnostics: self.style_diagnostics(doc),
        })
    }

    /// Render and write the package to `path`
    pub fn render_to_file(&self, doc: &AssembledDocument, path: &Path) -> Result<Vec<Diagnostic>> {
        let archive = self.render_archive(doc)?;
        archive.write_to_file(path)?;
        tracing::info!(path = %path.display(), "document written");
        Ok(self.style_diagnostics(doc))
    }

    /// Render into an unpacked package
    pub fn render_archive(&self, doc: &AssembledDocument) -> Result<OoxmlArchive> {
        if doc.regions.is_empty() {
            return Err(OoxmlError::InvalidStructure(
                "document has no regions".to_string(),
            ));
        }

        let mut writer = DocumentWriter::new(self.guidelines, doc.doc_type);
        let document_xml = writer.document_xml(doc)?;

        let mut archive = OoxmlArchive::new();
        archive.set_string(DOCUMENT_PART, document_xml);
        archive.set_string(STYLES_PART, styles_xml(self.guidelines, doc.doc_type));
        archive.set_string(SETTINGS_PART, settings_xml());
        archive.set_string(CORE_PROPERTIES_PART, core_properties_xml(&self.properties));
        archive.set_string(PACKAGE_RELS_PART, package_relationships().to_xml());

        let mut media_extensions = BTreeSet::new();
        for (path, data) in writer.media_files.drain(..) {
            media_extensions.insert(extension_of(&path));
            archive.set(format!("word/{}", path), data);
        }
        let footer_parts: Vec<String> = writer
            .footers
            .iter()
            .map(|(name, _)| format!("word/{}", name))
            .collect();
        for ((_, xml), part) in writer.footers.drain(..).zip(&footer_parts) {
            archive.set_string(part.clone(), xml);
        }
        archive.set_string(DOCUMENT_RELS_PART, writer.relationships.to_xml());
        archive.set_string(
            CONTENT_TYPES_PART,
            content_types_xml(footer_parts.iter().map(String::as_str), &media_extensions),
        );

        tracing::debug!(
            regions = doc.regions.len(),
            blocks = doc.blocks.len(),
            "document rendered"
        );
        Ok(archive)
    }

    /// A style fallback diagnostic for every key the guideline lacks, once per key
    fn style_diagnostics(&self, doc: &AssembledDocument) -> Vec<Diagnostic> {
        let mut keys: Vec<&str> = Vec::new();
        if doc
            .regions
            .iter()
            .any(|r| r.number_format != NumberFormat::None)
        {
            keys.push(PAGE_NUMBER_STYLE);
        }
        for block in &doc.blocks {
            match &block.kind {
                BlockKind::Heading(heading) => keys.push(&heading.style_key),
                BlockKind::Paragraph { style_key, .. } => keys.push(style_key),
                BlockKind::Figure { .. } | BlockKind::Table { .. } => keys.push(CAPTION_STYLE),
                BlockKind::ListEntry(_) => keys.push(LIST_ENTRY_STYLE),
                _ => {}
            }
        }

        let mut seen = BTreeSet::new();
        let mut diagnostics = Vec::new();
        for key in keys {
            if !seen.insert(key) {
                continue;
            }
            if let (_, Some(diagnostic)) = self.guidelines.style_or_default(doc.doc_type, key) {
                diagnostic.log();
                diagnostics.push(diagnostic);
            }
        }
        diagnostics
    }
}

/// Writes word/document.xml and collects the parts it references
struct DocumentWriter<'g> {
    guidelines: &'g Guidelines,
    doc_type: DocType,
    /// XML output buffer
    output: String,
    /// Document relationships (word/_rels/document.xml.rels)
    relationships: Relationships,
    /// Media to embed (path under word/, bytes)
    media_files: Vec<(String, Vec<u8>)>,
    /// Footer parts (file name, XML)
    footers: Vec<(String, String)>,
    /// Media already embedded, by file name, with its relationship ID
    embedded: HashMap<String, String>,
    next_drawing_id: usize,
    next_bookmark_id: usize,
    geometry: PageGeometry,
}

impl<'g> DocumentWriter<'g> {
    fn new(guidelines: &'g Guidelines, doc_type: DocType) -> Self {
        let mut relationships = Relationships::new();
        relationships.add("styles.xml", Relationships::TYPE_STYLES);
        relationships.add("settings.xml", Relationships::TYPE_SETTINGS);

        Self {
            guidelines,
            doc_type,
            output: String::new(),
            relationships,
            media_files: Vec::new(),
            footers: Vec::new(),
            embedded: HashMap::new(),
            next_drawing_id: 1,
            next_bookmark_id: 0,
            geometry: PageGeometry::a4(&guidelines.margins(doc_type)),
        }
    }

    /// Style ID for a key, `Normal` when the guideline lacks it
    fn resolve_style(&self, key: &str) -> String {
        match self.guidelines.formatting_rule(self.doc_type, key) {
            Some(_) => style_id(key),
            None => NORMAL_STYLE_ID.to_string(),
        }
    }

    fn next_bookmark_id(&mut self) -> usize {
        let id = self.next_bookmark_id;
        self.next_bookmark_id += 1;
        id
    }

    fn document_xml(&mut self, doc: &AssembledDocument) -> Result<String> {
        self.output.clear();
        self.output.push_str(XML_DECLARATION);
        self.output.push('\n');
        self.output.push_str(&format!(
            "<w:document xmlns:w=\"{}\" xmlns:r=\"{}\" \
             xmlns:wp=\"http://schemas.openxmlformats.org/drawingml/2006/wordprocessingDrawing\" \
             xmlns:a=\"http://schemas.openxmlformats.org/drawingml/2006/main\" \
             xmlns:pic=\"http://schemas.openxmlformats.org/drawingml/2006/picture\">\n",
            W_NS, R_NS
        ));
        self.output.push_str("<w:body>\n");

        let mut open_region: Option<&Region> = None;
        for (index, block) in doc.blocks.iter().enumerate() {
            match &block.kind {
                BlockKind::RegionStart { ordinal } => {
                    let region = doc.regions.get(*ordinal as usize).ok_or_else(|| {
                        OoxmlError::InvalidStructure(format!("no region with ordinal {}", ordinal))
                    })?;
                    // The closing section's properties ride on its last paragraph
                    if let Some(previous) = open_region {
                        let sect_pr = self.section_for(previous, doc);
                        self.output
                            .push_str(&format!("<w:p><w:pPr>{}</w:pPr></w:p>\n", sect_pr));
                    }
                    open_region = Some(region);
                }
                BlockKind::PageBreak => {
                    let before_region = matches!(
                        doc.blocks.get(index + 1).map(|b| &b.kind),
                        Some(BlockKind::RegionStart { .. })
                    );
                    if !before_region {
                        self.output
                            .push_str("<w:p><w:r><w:br w:type=\"page\"/></w:r></w:p>\n");
                    }
                }
                _ => self.write_block(block),
            }
        }

        // The last section's properties close the body
        let last = match open_region {
            Some(region) => region,
            None => doc.regions.first().ok_or_else(|| {
                OoxmlError::InvalidStructure("document has no regions".to_string())
            })?,
        };
        let sect_pr = self.section_for(last, doc);
        self.output.push_str(&sect_pr);
        self.output.push('\n');

        self.output.push_str("</w:body>\n");
        self.output.push_str("</w:document>");
        Ok(std::mem::take(&mut self.output))
    }

    /// Section properties for a region, adding its footer part when unlinked
    fn section_for(&mut self, region: &Region, doc: &AssembledDocument) -> String {
        let footer_rel = if region.footer_linked_to_previous {
            None
        } else {
            let name = format!("footer{}.xml", self.footers.len() + 1);
            let xml = footer_xml(
                region.number_format,
                doc.rules.position,
                &self.resolve_style(PAGE_NUMBER_STYLE),
            );
            self.footers.push((name.clone(), xml));
            Some(self.relationships.add(name, Relationships::TYPE_FOOTER))
        };
        section_properties(region, &self.geometry, footer_rel.as_deref())
    }

    fn write_block(&mut self, block: &Block) {
        match &block.kind {
            BlockKind::Heading(heading) => self.write_heading(heading),
            BlockKind::Paragraph { text, style_key } => {
                let style = self.resolve_style(style_key);
                self.write_paragraph(text, &style, "");
            }
            BlockKind::Image(image) => self.write_picture(image, LOGO_WIDTH_IN),
            BlockKind::Figure { image, caption } => {
                if let Some(image) = image {
                    let width = MAX_FIGURE_WIDTH_IN
                        .min(self.geometry.text_width() as f64 / 1440.0);
                    self.write_picture(image, width);
                }
                self.write_caption(caption);
            }
            BlockKind::Table {
                rows,
                header,
                caption,
            } => {
                self.write_caption(caption);
                self.write_table(rows, *header);
            }
            BlockKind::ListAnchor(_) => self.output.push_str("<w:p/>\n"),
            BlockKind::ListEntry(entry) => self.write_list_entry(entry),
            BlockKind::RegionStart { .. } | BlockKind::PageBreak => {}
        }
    }

    fn write_paragraph(&mut self, text: &str, style: &str, extra_properties: &str) {
        self.output.push_str("<w:p>");
        self.output.push_str(&format!(
            "<w:pPr><w:pStyle w:val=\"{}\"/>{}</w:pPr>",
            escape_xml(style),
            extra_properties
        ));
        text_runs(&mut self.output, text, "");
        self.output.push_str("</w:p>\n");
    }

    /// Paragraph wrapped in a bookmark that list entries point at
    fn write_bookmarked(&mut self, text: &str, style: &str, bookmark: &str) {
        let id = self.next_bookmark_id();
        self.output.push_str("<w:p>");
        self.output.push_str(&format!(
            "<w:pPr><w:pStyle w:val=\"{}\"/></w:pPr>",
            escape_xml(style)
        ));
        self.output.push_str(&format!(
            "<w:bookmarkStart w:id=\"{}\" w:name=\"{}\"/>",
            id,
            escape_xml(bookmark)
        ));
        text_runs(&mut self.output, text, "");
        self.output
            .push_str(&format!("<w:bookmarkEnd w:id=\"{}\"/>", id));
        self.output.push_str("</w:p>\n");
    }

    fn write_heading(&mut self, heading: &HeadingRecord) {
        let style = self.resolve_style(&heading.style_key);
        self.write_bookmarked(
            &heading.display_text,
            &style,
            &heading.position.bookmark_name(),
        );
    }

    fn write_caption(&mut self, caption: &CaptionRecord) {
        let style = self.resolve_style(CAPTION_STYLE);
        self.write_bookmarked(
            &caption.full_caption_text,
            &style,
            &caption.position.bookmark_name(),
        );
    }

    /// Entry text, dot leader to the right margin, page reference
    fn write_list_entry(&mut self, entry: &ListEntry) {
        let style = self.resolve_style(LIST_ENTRY_STYLE);
        let indent = inches_to_twips(ENTRY_INDENT_IN * entry.indent_level as f32);
        let tab = (self.geometry.text_width() - TAB_INSET_TWIPS).max(indent + 1);

        self.output.push_str("<w:p>");
        self.output.push_str(&format!(
            "<w:pPr><w:pStyle w:val=\"{}\"/><w:tabs><w:tab w:val=\"right\" w:leader=\"dot\" w:pos=\"{}\"/></w:tabs><w:ind w:left=\"{}\" w:firstLine=\"0\"/></w:pPr>",
            escape_xml(&style),
            tab,
            indent
        ));
        text_runs(&mut self.output, &entry.text, "");
        self.output.push_str("<w:r><w:tab/></w:r>");
        match &entry.page {
            PageRef::Unresolved { bookmark } => field(
                &mut self.output,
                &format!("PAGEREF {} \\h", bookmark),
                PAGEREF_PLACEHOLDER,
                "",
            ),
        }
        self.output.push_str("</w:p>\n");
    }

    fn write_table(&mut self, rows: &[Vec<String>], header: bool) {
        let columns = rows.iter().map(Vec::len).max().unwrap_or(0);
        if columns == 0 {
            return;
        }
        let column_width = self.geometry.text_width() / columns as i64;
        let border = "w:val=\"single\" w:sz=\"4\" w:space=\"0\" w:color=\"auto\"";

        self.output.push_str("<w:tbl>\n");
        self.output.push_str(&format!(
            "<w:tblPr><w:tblW w:w=\"5000\" w:type=\"pct\"/><w:jc w:val=\"center\"/><w:tblBorders>\
             <w:top {b}/><w:left {b}/><w:bottom {b}/><w:right {b}/><w:insideH {b}/><w:insideV {b}/>\
             </w:tblBorders></w:tblPr>\n",
            b = border
        ));
        self.output.push_str("<w:tblGrid>");
        for _ in 0..columns {
            self.output
                .push_str(&format!("<w:gridCol w:w=\"{}\"/>", column_width));
        }
        self.output.push_str("</w:tblGrid>\n");

        for (row_index, row) in rows.iter().enumerate() {
            let is_header = header && row_index == 0;
            self.output.push_str("<w:tr>");
            if is_header {
                self.output.push_str("<w:trPr><w:tblHeader/></w:trPr>");
            }
            for column in 0..columns {
                let text = row.get(column).map(String::as_str).unwrap_or("");
                self.output.push_str(&format!(
                    "<w:tc><w:tcPr><w:tcW w:w=\"{}\" w:type=\"dxa\"/></w:tcPr><w:p><w:pPr><w:pStyle w:val=\"{}\"/></w:pPr>",
                    column_width, NORMAL_STYLE_ID
                ));
                let run_properties = if is_header { "<w:rPr><w:b/></w:rPr>" } else { "" };
                text_runs(&mut self.output, text, run_properties);
                self.output.push_str("</w:p></w:tc>");
            }
            self.output.push_str("</w:tr>\n");
        }
        self.output.push_str("</w:tbl>\n");
    }

    /// Embed the image once and reference it from a centered paragraph
    fn write_picture(&mut self, image: &FigureImage, width_in: f64) {
        let rel_id = match self.embedded.get(&image.file_name) {
            Some(rel_id) => rel_id.clone(),
            None => {
                let target = format!(
                    "media/image{}.{}",
                    self.media_files.len() + 1,
                    extension_of(&image.file_name)
                );
                let rel_id = self
                    .relationships
                    .add(target.clone(), Relationships::TYPE_IMAGE);
                self.media_files.push((target, image.data.clone()));
                self.embedded
                    .insert(image.file_name.clone(), rel_id.clone());
                rel_id
            }
        };

        let drawing_id = self.next_drawing_id;
        self.next_drawing_id += 1;
        let (cx, cy) = extent_for_width(&image.data, width_in);
        let name = escape_xml(&image.file_name);

        self.output.push_str(
            "<w:p><w:pPr><w:keepNext/><w:jc w:val=\"center\"/></w:pPr><w:r><w:drawing>",
        );
        self.output.push_str(&format!(
            "<wp:inline distT=\"0\" distB=\"0\" distL=\"0\" distR=\"0\">\
             <wp:extent cx=\"{cx}\" cy=\"{cy}\"/>\
             <wp:effectExtent l=\"0\" t=\"0\" r=\"0\" b=\"0\"/>\
             <wp:docPr id=\"{id}\" name=\"Picture {id}\" descr=\"{name}\"/>\
             <wp:cNvGraphicFramePr><a:graphicFrameLocks noChangeAspect=\"1\"/></wp:cNvGraphicFramePr>\
             <a:graphic><a:graphicData uri=\"http://schemas.openxmlformats.org/drawingml/2006/picture\">\
             <pic:pic><pic:nvPicPr><pic:cNvPr id=\"{id}\" name=\"{name}\"/><pic:cNvPicPr/></pic:nvPicPr>\
             <pic:blipFill><a:blip r:embed=\"{rel}\"/><a:stretch><a:fillRect/></a:stretch></pic:blipFill>\
             <pic:spPr><a:xfrm><a:off x=\"0\" y=\"0\"/><a:ext cx=\"{cx}\" cy=\"{cy}\"/></a:xfrm>\
             <a:prstGeom prst=\"rect\"><a:avLst/></a:prstGeom></pic:spPr></pic:pic>\
             </a:graphicData></a:graphic></wp:inline>",
            cx = cx,
            cy = cy,
            id = drawing_id,
            name = name,
            rel = rel_id
        ));
        self.output.push_str("</w:drawing></w:r></w:p>\n");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use folio_core::{DocumentSession, ListKind, RegionKind};

    fn render(session: DocumentSession) -> (OoxmlArchive, Vec<Diagnostic>) {
        let guidelines = Guidelines::builtin();
        let doc = session.finalize(&guidelines.page_numbering(DocType::Report));
        let rendered = DocxRenderer::new(&guidelines).render(&doc).unwrap();
        (
            OoxmlArchive::from_bytes(&rendered.bytes).unwrap(),
            rendered.diagnostics,
        )
    }

    #[test]
    fn test_package_parts() {
        let mut session = DocumentSession::new(DocType::Report);
        session.start_region(RegionKind::TitlePage);
        session.add_paragraph("Title", "title_main");
        let (archive, diagnostics) = render(session);

        for part in [
            CONTENT_TYPES_PART,
            PACKAGE_RELS_PART,
            DOCUMENT_PART,
            DOCUMENT_RELS_PART,
            STYLES_PART,
            SETTINGS_PART,
            CORE_PROPERTIES_PART,
            "word/footer1.xml",
        ] {
            assert!(archive.contains(part), "missing {}", part);
        }
        assert!(diagnostics.is_empty());
    }

    #[test]
    fn test_heading_is_bookmarked() {
        let mut session = DocumentSession::new(DocType::Report);
        session.start_region(RegionKind::TitlePage);
        session.start_region(RegionKind::Body);
        let heading = session.add_heading(1, "Introduction").into_record();
        let (archive, _) = render(session);

        let xml = archive.document_xml().unwrap();
        assert!(xml.contains(&format!(
            "<w:bookmarkStart w:id=\"0\" w:name=\"{}\"/>",
            heading.position.bookmark_name()
        )));
        assert!(xml.contains("<w:pStyle w:val=\"HeadingChapter\"/>"));
        assert!(xml.contains("CHAPTER 1: INTRODUCTION"));
    }

    #[test]
    fn test_list_entry_has_pageref() {
        let mut session = DocumentSession::new(DocType::Report);
        session.start_region(RegionKind::TitlePage);
        session.start_region(RegionKind::FrontMatter);
        session.reserve_list(ListKind::Contents);
        session.start_region(RegionKind::Body);
        let heading = session.add_heading(1, "Design").into_record();
        let (archive, _) = render(session);

        let xml = archive.document_xml().unwrap();
        assert!(xml.contains(&format!(
            " PAGEREF {} \\h ",
            heading.position.bookmark_name()
        )));
        assert!(xml.contains("w:leader=\"dot\""));
        assert!(xml.contains("<w:t>...</w:t>"));
    }

    #[test]
    fn test_unknown_style_falls_back_to_normal() {
        let mut session = DocumentSession::new(DocType::Report);
        session.start_region(RegionKind::TitlePage);
        session.add_paragraph("Odd", "no_such_style");
        let (archive, diagnostics) = render(session);

        let xml = archive.document_xml().unwrap();
        assert!(xml.contains("<w:pStyle w:val=\"Normal\"/>"));
        assert_eq!(diagnostics.len(), 1);
        assert!(diagnostics[0].has_code(folio_core::codes::STYLE_FALLBACK));
    }

    #[test]
    fn test_same_image_is_embedded_once() {
        let logo = FigureImage {
            file_name: "logo.png".to_string(),
            data: vec![1, 2, 3],
        };
        let mut session = DocumentSession::new(DocType::Report);
        session.start_region(RegionKind::TitlePage);
        session.add_image(logo.clone());
        session.add_image(logo);
        let (archive, _) = render(session);

        assert!(archive.contains("word/media/image1.png"));
        assert!(!archive.contains("word/media/image2.png"));
        let xml = archive.document_xml().unwrap();
        assert_eq!(xml.matches("<w:drawing>").count(), 2);
    }

    #[test]
    fn test_table_header_row() {
        let mut session = DocumentSession::new(DocType::Report);
        session.start_region(RegionKind::TitlePage);
        session.start_region(RegionKind::Body);
        session.add_heading(1, "Results");
        session.add_table(
            "Accuracy",
            vec![
                vec!["Model".to_string(), "Score".to_string()],
                vec!["A".to_string()],
            ],
            true,
        );
        let (archive, _) = render(session);

        let xml = archive.document_xml().unwrap();
        assert_eq!(xml.matches("<w:tblHeader/>").count(), 1);
        assert_eq!(xml.matches("<w:tc>").count(), 4);
        assert!(xml.contains("Table 1.1: Accuracy"));
    }
}

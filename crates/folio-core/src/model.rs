//! Document model shared by the engine and the renderer
//!
//! The session turns every appended content unit into a [`Block`] stamped with
//! a [`Position`]. The ordered block stream is what a renderer consumes.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::anchors::{AnchorToken, ListKind};

/// The kind of academic document being assembled
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocType {
    /// Full project report: front matter, numbered chapters, lists
    #[default]
    Report,
    /// Short synopsis: flat numbered sections, no front matter
    Synopsis,
}

impl DocType {
    /// Lowercase identifier used in configuration
    pub fn as_str(&self) -> &'static str {
        match self {
            DocType::Report => "report",
            DocType::Synopsis => "synopsis",
        }
    }

    /// Capitalized name used in file names
    pub fn display_name(&self) -> &'static str {
        match self {
            DocType::Report => "Report",
            DocType::Synopsis => "Synopsis",
        }
    }
}

impl fmt::Display for DocType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DocType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "report" => Ok(DocType::Report),
            "synopsis" => Ok(DocType::Synopsis),
            other => Err(format!("unknown document type '{}'", other)),
        }
    }
}

/// Hierarchical number of a heading or caption (`[2, 3]` is "2.3")
///
/// Ordering is lexicographic over the segments. An empty path means the item
/// is un-numbered.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NumberPath(Vec<u32>);

impl NumberPath {
    /// Create a path from its segments
    pub fn new(segments: Vec<u32>) -> Self {
        Self(segments)
    }

    /// The un-numbered path
    pub fn unnumbered() -> Self {
        Self(Vec::new())
    }

    /// Path segments, outermost first
    pub fn segments(&self) -> &[u32] {
        &self.0
    }

    /// Number of segments
    pub fn depth(&self) -> usize {
        self.0.len()
    }

    /// Check whether the path is empty (un-numbered)
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<Vec<u32>> for NumberPath {
    fn from(segments: Vec<u32>) -> Self {
        Self(segments)
    }
}

impl fmt::Display for NumberPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, segment) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(".")?;
            }
            write!(f, "{}", segment)?;
        }
        Ok(())
    }
}

/// Opaque document position
///
/// Positions are handed out by the session in strictly increasing order as
/// blocks are appended, so comparing positions compares document order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Position(u64);

impl Position {
    pub(crate) fn new(value: u64) -> Self {
        Self(value)
    }

    /// Bookmark name a renderer can place at this position
    pub fn bookmark_name(&self) -> String {
        format!("_folio{:06}", self.0)
    }
}

/// A heading registered with the numbering engine
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HeadingRecord {
    /// Requested level (1 = chapter, 2 = section, 3 = subsection)
    pub level: u8,
    /// Text as it appears in the document and in the table of contents
    pub display_text: String,
    /// Hierarchical number, empty when the heading is un-numbered
    pub number_path: NumberPath,
    /// Guideline style key used to render the heading
    pub style_key: String,
    /// Where the heading sits in the document
    pub position: Position,
}

/// Figure or table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CaptionKind {
    Figure,
    Table,
}

/// A figure or table caption registered with the numbering engine
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CaptionRecord {
    pub kind: CaptionKind,
    /// Chapter the caption belongs to, 0 before any chapter
    pub chapter_number: u32,
    /// Running number inside the chapter, starting at 1
    pub index_in_chapter: u32,
    /// Caption text as supplied
    pub caption: String,
    /// Prefixed caption, e.g. `Fig 2.1: Architecture`
    pub full_caption_text: String,
    pub position: Position,
}

impl CaptionRecord {
    /// `[chapter, index]`, or `[index]` when no chapter was open
    pub fn number_path(&self) -> NumberPath {
        if self.chapter_number > 0 {
            NumberPath::new(vec![self.chapter_number, self.index_in_chapter])
        } else {
            NumberPath::new(vec![self.index_in_chapter])
        }
    }
}

/// Page number of a list entry, left for the renderer to fill in
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum PageRef {
    /// Not computed by the engine; `bookmark` names the target location
    Unresolved { bookmark: String },
}

/// One line of a generated table of contents or list of figures/tables
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ListEntry {
    pub list: ListKind,
    pub text: String,
    /// Indentation depth, 0 for top-level entries
    pub indent_level: usize,
    pub number_path: NumberPath,
    /// Position of the heading or caption the entry points at
    pub source_position: Position,
    pub page: PageRef,
}

/// Raw image bytes attached to a figure
#[derive(Debug, Clone, PartialEq)]
pub struct FigureImage {
    /// File name, used to derive the media part name
    pub file_name: String,
    pub data: Vec<u8>,
}

/// A block of the assembled document
#[derive(Debug, Clone, PartialEq)]
pub struct Block {
    pub position: Position,
    pub kind: BlockKind,
}

/// Content carried by a [`Block`]
#[derive(Debug, Clone, PartialEq)]
pub enum BlockKind {
    /// A new region begins here
    RegionStart { ordinal: u32 },
    Heading(HeadingRecord),
    Paragraph { text: String, style_key: String },
    /// Uncaptioned picture, centered (title page logo)
    Image(FigureImage),
    /// Image (or a placeholder when it is missing) followed by its caption
    Figure {
        image: Option<FigureImage>,
        caption: CaptionRecord,
    },
    /// Caption followed by the table rows
    Table {
        rows: Vec<Vec<String>>,
        header: bool,
        caption: CaptionRecord,
    },
    PageBreak,
    /// Reserved list position; renders as an empty seam once consumed
    ListAnchor(AnchorToken),
    ListEntry(ListEntry),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_number_path_display() {
        assert_eq!(NumberPath::new(vec![2, 3, 1]).to_string(), "2.3.1");
        assert_eq!(NumberPath::new(vec![4]).to_string(), "4");
        assert_eq!(NumberPath::unnumbered().to_string(), "");
    }

    #[test]
    fn test_number_path_ordering_is_lexicographic() {
        let a = NumberPath::new(vec![1]);
        let b = NumberPath::new(vec![1, 1]);
        let c = NumberPath::new(vec![1, 2]);
        let d = NumberPath::new(vec![2]);
        assert!(a < b);
        assert!(b < c);
        assert!(c < d);
        assert!(NumberPath::new(vec![1, 10]) > NumberPath::new(vec![1, 9]));
    }

    #[test]
    fn test_doc_type_parse() {
        assert_eq!("Report".parse::<DocType>().unwrap(), DocType::Report);
        assert_eq!(" synopsis ".parse::<DocType>().unwrap(), DocType::Synopsis);
        assert!("thesis".parse::<DocType>().is_err());
        assert_eq!(DocType::Synopsis.display_name(), "Synopsis");
    }

    #[test]
    fn test_caption_number_path() {
        let mut caption = CaptionRecord {
            kind: CaptionKind::Figure,
            chapter_number: 0,
            index_in_chapter: 2,
            caption: "Flow".to_string(),
            full_caption_text: "Fig 2: Flow".to_string(),
            position: Position::new(7),
        };
        assert_eq!(caption.number_path(), NumberPath::new(vec![2]));

        caption.chapter_number = 3;
        assert_eq!(caption.number_path(), NumberPath::new(vec![3, 2]));
    }

    #[test]
    fn test_bookmark_name_is_stable() {
        assert_eq!(Position::new(42).bookmark_name(), "_folio000042");
    }
}

//! Region manager
//!
//! A document is an ordered run of physical regions: one title page, zero or
//! more front-matter regions, then one or more body regions. Each region gets
//! a page-number format, an optional restart and a footer-linkage flag.
//!
//! Renderers inherit footer content and restart directives across linked
//! regions, so linkage is computed from two watermarks only (the title page at
//! ordinal 0 and the pivot, the first body region) and never toggled by hand.

use serde::{Deserialize, Serialize};

use crate::diagnostics::{codes, Diagnostic};
use crate::numbering::{Registration, StructureViolation};

/// What a region holds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RegionKind {
    TitlePage,
    FrontMatter,
    Body,
}

/// Page-number format of a region
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NumberFormat {
    /// No page number is shown
    #[default]
    None,
    /// i, ii, iii
    RomanLower,
    /// I, II, III
    RomanUpper,
    /// 1, 2, 3
    Arabic,
}

/// Where the page number sits in the footer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FooterPosition {
    BottomLeft,
    #[default]
    BottomCenter,
    BottomRight,
}

/// Page-numbering rules for one document type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PageNumberingRules {
    /// Format for front-matter regions
    pub front_format: NumberFormat,
    /// Format for body regions
    pub body_format: NumberFormat,
    pub position: FooterPosition,
    /// First page number of the pivot region
    pub start_page: u32,
}

impl Default for PageNumberingRules {
    fn default() -> Self {
        Self {
            front_format: NumberFormat::RomanLower,
            body_format: NumberFormat::Arabic,
            position: FooterPosition::BottomCenter,
            start_page: 1,
        }
    }
}

/// A physical subdivision of the document
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Region {
    pub ordinal: u32,
    pub kind: RegionKind,
    pub number_format: NumberFormat,
    /// Page number the region restarts at, if any
    pub restart_at: Option<u32>,
    /// Whether the region reuses the previous region's footer
    pub footer_linked_to_previous: bool,
}

/// Tracks regions in document order and assigns their numbering
#[derive(Debug, Clone, Default)]
pub struct RegionManager {
    regions: Vec<Region>,
    /// Ordinal of the first explicitly requested body region
    pivot: Option<u32>,
}

impl RegionManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// All regions, in document order
    pub fn regions(&self) -> &[Region] {
        &self.regions
    }

    /// Ordinal of the explicitly started pivot region
    pub fn pivot(&self) -> Option<u32> {
        self.pivot
    }

    /// Append a region and return its ordinal
    ///
    /// The kind actually assigned follows the ordering rules: ordinal 0 is the
    /// title page, everything before the first body request is front matter,
    /// everything from it on is body. A request that contradicts this is
    /// coerced and returned as a warning.
    pub fn start_region(&mut self, requested: RegionKind) -> Registration<u32> {
        let ordinal = self.regions.len() as u32;

        let assigned = if ordinal == 0 {
            RegionKind::TitlePage
        } else if let Some(pivot) = self.pivot {
            debug_assert!(ordinal > pivot);
            RegionKind::Body
        } else if requested == RegionKind::Body {
            self.pivot = Some(ordinal);
            RegionKind::Body
        } else {
            RegionKind::FrontMatter
        };

        self.regions.push(Region {
            ordinal,
            kind: assigned,
            number_format: NumberFormat::None,
            restart_at: None,
            footer_linked_to_previous: false,
        });
        tracing::debug!(ordinal, kind = ?assigned, "started region");

        if assigned == requested {
            Registration::Ok(ordinal)
        } else {
            Registration::Warning(
                ordinal,
                StructureViolation::RegionKindCoerced {
                    ordinal,
                    requested,
                    assigned,
                },
            )
        }
    }

    /// Assign page-number format, restart and footer linkage to every region
    ///
    /// Idempotent: the assignment is a pure function of each ordinal and the
    /// effective pivot. When no body region was ever started, ordinal 1 stands
    /// in as the pivot and a warning is returned.
    pub fn finalize_numbering(&mut self, rules: &PageNumberingRules) -> Vec<Diagnostic> {
        let mut diagnostics = Vec::new();

        let pivot = match self.pivot {
            Some(pivot) => pivot,
            None => {
                diagnostics.push(
                    Diagnostic::warning(
                        "No body region was started; treating region 1 as the start of the body",
                    )
                    .with_code(codes::PIVOT_FALLBACK)
                    .with_help("Start a body region before the first chapter")
                    .with_note(format!("{} region(s) in document", self.regions.len())),
                );
                1
            }
        };

        for region in &mut self.regions {
            let ordinal = region.ordinal;
            if ordinal == 0 {
                region.kind = RegionKind::TitlePage;
                region.number_format = NumberFormat::None;
                region.restart_at = None;
                region.footer_linked_to_previous = false;
            } else if ordinal < pivot {
                region.kind = RegionKind::FrontMatter;
                region.number_format = rules.front_format;
                region.restart_at = None;
                // Only the first front-matter region starts a fresh footer
                region.footer_linked_to_previous = ordinal > 1;
            } else {
                region.kind = RegionKind::Body;
                region.number_format = rules.body_format;
                region.restart_at = (ordinal == pivot).then_some(rules.start_page);
                region.footer_linked_to_previous = ordinal > pivot;
            }
        }

        diagnostics
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn build(kinds: &[RegionKind]) -> RegionManager {
        let mut manager = RegionManager::new();
        for kind in kinds {
            manager.start_region(*kind);
        }
        manager
    }

    fn formats(manager: &RegionManager) -> Vec<NumberFormat> {
        manager.regions().iter().map(|r| r.number_format).collect()
    }

    fn links(manager: &RegionManager) -> Vec<bool> {
        manager
            .regions()
            .iter()
            .map(|r| r.footer_linked_to_previous)
            .collect()
    }

    fn restarts(manager: &RegionManager) -> Vec<Option<u32>> {
        manager.regions().iter().map(|r| r.restart_at).collect()
    }

    #[test]
    fn test_standard_report_layout() {
        use RegionKind::*;
        let mut manager = build(&[TitlePage, FrontMatter, FrontMatter, Body, Body]);
        let diagnostics = manager.finalize_numbering(&PageNumberingRules::default());

        assert!(diagnostics.is_empty());
        assert_eq!(
            formats(&manager),
            vec![
                NumberFormat::None,
                NumberFormat::RomanLower,
                NumberFormat::RomanLower,
                NumberFormat::Arabic,
                NumberFormat::Arabic,
            ]
        );
        assert_eq!(links(&manager), vec![false, false, true, false, true]);
        assert_eq!(restarts(&manager), vec![None, None, None, Some(1), None]);
        assert_eq!(manager.pivot(), Some(3));
    }

    #[test]
    fn test_finalize_is_idempotent() {
        use RegionKind::*;
        let mut manager = build(&[TitlePage, FrontMatter, Body, Body]);
        let rules = PageNumberingRules::default();
        manager.finalize_numbering(&rules);
        let first = manager.regions().to_vec();
        manager.finalize_numbering(&rules);
        assert_eq!(manager.regions(), first.as_slice());
    }

    #[test]
    fn test_missing_body_falls_back_to_region_one() {
        use RegionKind::*;
        let mut manager = build(&[TitlePage, FrontMatter, FrontMatter]);
        let diagnostics = manager.finalize_numbering(&PageNumberingRules::default());

        assert_eq!(diagnostics.len(), 1);
        assert!(diagnostics[0].has_code(codes::PIVOT_FALLBACK));
        assert_eq!(
            formats(&manager),
            vec![NumberFormat::None, NumberFormat::Arabic, NumberFormat::Arabic]
        );
        assert_eq!(links(&manager), vec![false, false, true]);
        assert_eq!(restarts(&manager), vec![None, Some(1), None]);
        assert_eq!(manager.regions()[2].kind, RegionKind::Body);

        // Fallback is recomputed, not stored
        let again = manager.finalize_numbering(&PageNumberingRules::default());
        assert_eq!(again.len(), 1);
        assert_eq!(restarts(&manager), vec![None, Some(1), None]);
    }

    #[test]
    fn test_title_only_document_does_not_panic() {
        let mut manager = build(&[RegionKind::TitlePage]);
        let diagnostics = manager.finalize_numbering(&PageNumberingRules::default());
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(formats(&manager), vec![NumberFormat::None]);
    }

    #[test]
    fn test_body_directly_after_title() {
        use RegionKind::*;
        let mut manager = build(&[TitlePage, Body]);
        manager.finalize_numbering(&PageNumberingRules::default());
        assert_eq!(formats(&manager), vec![NumberFormat::None, NumberFormat::Arabic]);
        assert_eq!(links(&manager), vec![false, false]);
        assert_eq!(restarts(&manager), vec![None, Some(1)]);
    }

    #[test]
    fn test_first_region_is_always_title_page() {
        let mut manager = RegionManager::new();
        let first = manager.start_region(RegionKind::FrontMatter);
        assert!(first.is_warning());
        assert_eq!(*first.record(), 0);
        assert_eq!(manager.regions()[0].kind, RegionKind::TitlePage);
    }

    #[test]
    fn test_front_matter_after_pivot_is_coerced_to_body() {
        use RegionKind::*;
        let mut manager = build(&[TitlePage, Body]);
        let late = manager.start_region(FrontMatter);
        assert!(matches!(
            late.violation(),
            Some(StructureViolation::RegionKindCoerced {
                ordinal: 2,
                requested: FrontMatter,
                assigned: Body,
            })
        ));
        assert_eq!(late.violation().unwrap().code(), codes::REGION_COERCED);
    }

    #[test]
    fn test_configured_formats_are_used() {
        use RegionKind::*;
        let mut manager = build(&[TitlePage, FrontMatter, Body]);
        let rules = PageNumberingRules {
            front_format: NumberFormat::RomanUpper,
            body_format: NumberFormat::Arabic,
            position: FooterPosition::BottomRight,
            start_page: 1,
        };
        manager.finalize_numbering(&rules);
        assert_eq!(manager.regions()[1].number_format, NumberFormat::RomanUpper);
    }

    #[test]
    fn test_rules_deserialize_from_snake_case() {
        let rules: PageNumberingRules = serde_json::from_str(
            r#"{"front_format":"roman_lower","body_format":"arabic","position":"bottom_center"}"#,
        )
        .unwrap();
        assert_eq!(rules.front_format, NumberFormat::RomanLower);
        assert_eq!(rules.start_page, 1);
    }
}

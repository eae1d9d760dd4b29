//! Section properties and page-number footers
//!
//! Each region of the assembled document becomes one DOCX section. The
//! section carries the page geometry, the page-number format and restart,
//! and a footer reference unless the region continues the previous footer.

use folio_config::Margins;
use folio_core::{FooterPosition, NumberFormat, Region};

use crate::xml::{field, inches_to_twips, W_NS, XML_DECLARATION};

/// A4 width in twips
pub const A4_WIDTH_TWIPS: i64 = 11906;
/// A4 height in twips
pub const A4_HEIGHT_TWIPS: i64 = 16838;
/// Header and footer distance from the page edge (0.5 in)
const HEADER_FOOTER_DISTANCE: i64 = 720;

/// Page geometry shared by all sections
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageGeometry {
    pub width: i64,
    pub height: i64,
    pub top: i64,
    pub bottom: i64,
    pub left: i64,
    pub right: i64,
    /// Extra binding margin on the left
    pub gutter: i64,
}

impl PageGeometry {
    /// A4 with the given margins
    pub fn a4(margins: &Margins) -> Self {
        Self {
            width: A4_WIDTH_TWIPS,
            height: A4_HEIGHT_TWIPS,
            top: inches_to_twips(margins.top_in),
            bottom: inches_to_twips(margins.bottom_in),
            left: inches_to_twips(margins.left_in),
            right: inches_to_twips(margins.right_in),
            gutter: inches_to_twips(margins.binding_in),
        }
    }

    /// Width of the text column
    pub fn text_width(&self) -> i64 {
        (self.width - self.left - self.right - self.gutter).max(0)
    }
}

/// Value of `w:pgNumType/@w:fmt`
fn page_number_fmt(format: NumberFormat) -> Option<&'static str> {
    match format {
        NumberFormat::None => None,
        NumberFormat::RomanLower => Some("lowerRoman"),
        NumberFormat::RomanUpper => Some("upperRoman"),
        NumberFormat::Arabic => Some("decimal"),
    }
}

/// PAGE field instruction with the region's format switch
pub fn page_field_instruction(format: NumberFormat) -> &'static str {
    match format {
        NumberFormat::RomanLower => "PAGE \\* roman",
        NumberFormat::RomanUpper => "PAGE \\* ROMAN",
        NumberFormat::Arabic | NumberFormat::None => "PAGE",
    }
}

fn cached_page_number(format: NumberFormat) -> &'static str {
    match format {
        NumberFormat::RomanLower => "i",
        NumberFormat::RomanUpper => "I",
        NumberFormat::Arabic | NumberFormat::None => "1",
    }
}

fn footer_alignment(position: FooterPosition) -> &'static str {
    match position {
        FooterPosition::BottomLeft => "left",
        FooterPosition::BottomCenter => "center",
        FooterPosition::BottomRight => "right",
    }
}

/// `<w:sectPr>` for a region
///
/// `footer_rel` is the relationship ID of the region's own footer; linked
/// regions pass `None` and inherit the previous section's footer.
pub fn section_properties(
    region: &Region,
    geometry: &PageGeometry,
    footer_rel: Option<&str>,
) -> String {
    let mut xml = String::from("<w:sectPr>");
    if let Some(rel_id) = footer_rel {
        xml.push_str(&format!(
            "<w:footerReference w:type=\"default\" r:id=\"{}\"/>",
            rel_id
        ));
    }
    xml.push_str("<w:type w:val=\"nextPage\"/>");
    xml.push_str(&format!(
        "<w:pgSz w:w=\"{}\" w:h=\"{}\"/>",
        geometry.width, geometry.height
    ));
    xml.push_str(&format!(
        "<w:pgMar w:top=\"{}\" w:right=\"{}\" w:bottom=\"{}\" w:left=\"{}\" w:header=\"{}\" w:footer=\"{}\" w:gutter=\"{}\"/>",
        geometry.top,
        geometry.right,
        geometry.bottom,
        geometry.left,
        HEADER_FOOTER_DISTANCE,
        HEADER_FOOTER_DISTANCE,
        geometry.gutter
    ));

    let fmt = page_number_fmt(region.number_format);
    if fmt.is_some() || region.restart_at.is_some() {
        xml.push_str("<w:pgNumType");
        if let Some(fmt) = fmt {
            xml.push_str(&format!(" w:fmt=\"{}\"", fmt));
        }
        if let Some(start) = region.restart_at {
            xml.push_str(&format!(" w:start=\"{}\"", start));
        }
        xml.push_str("/>");
    }
    xml.push_str("</w:sectPr>");
    xml
}

/// Footer part for a region; empty when the region shows no page number
pub fn footer_xml(format: NumberFormat, position: FooterPosition, style_id: &str) -> String {
    let mut xml = String::new();
    xml.push_str(XML_DECLARATION);
    xml.push('\n');
    xml.push_str(&format!("<w:ftr xmlns:w=\"{}\">", W_NS));
    xml.push_str(&format!(
        "<w:p><w:pPr><w:pStyle w:val=\"{}\"/><w:jc w:val=\"{}\"/></w:pPr>",
        style_id,
        footer_alignment(position)
    ));
    if format != NumberFormat::None {
        field(
            &mut xml,
            page_field_instruction(format),
            cached_page_number(format),
            "",
        );
    }
    xml.push_str("</w:p></w:ftr>");
    xml
}

#[cfg(test)]
mod tests {
    use super::*;
    use folio_core::RegionKind;

    fn region(format: NumberFormat, restart_at: Option<u32>) -> Region {
        Region {
            ordinal: 2,
            kind: RegionKind::Body,
            number_format: format,
            restart_at,
            footer_linked_to_previous: false,
        }
    }

    fn report_margins() -> Margins {
        Margins {
            top_in: 1.0,
            bottom_in: 1.0,
            left_in: 1.5,
            right_in: 1.0,
            binding_in: 0.5,
        }
    }

    #[test]
    fn test_geometry_from_margins() {
        let geometry = PageGeometry::a4(&report_margins());
        assert_eq!(geometry.left, 2160);
        assert_eq!(geometry.gutter, 720);
        assert_eq!(geometry.text_width(), 11906 - 2160 - 1440 - 720);
    }

    #[test]
    fn test_pivot_section_restarts_arabic() {
        let geometry = PageGeometry::a4(&report_margins());
        let xml = section_properties(&region(NumberFormat::Arabic, Some(1)), &geometry, Some("rId7"));

        assert!(xml.starts_with("<w:sectPr><w:footerReference w:type=\"default\" r:id=\"rId7\"/>"));
        assert!(xml.contains("<w:pgSz w:w=\"11906\" w:h=\"16838\"/>"));
        assert!(xml.contains("w:gutter=\"720\""));
        assert!(xml.contains("<w:pgNumType w:fmt=\"decimal\" w:start=\"1\"/>"));
    }

    #[test]
    fn test_linked_section_has_no_footer_reference() {
        let geometry = PageGeometry::a4(&report_margins());
        let xml = section_properties(&region(NumberFormat::RomanLower, None), &geometry, None);
        assert!(!xml.contains("footerReference"));
        assert!(xml.contains("<w:pgNumType w:fmt=\"lowerRoman\"/>"));
    }

    #[test]
    fn test_unnumbered_section_has_no_page_number_type() {
        let geometry = PageGeometry::a4(&report_margins());
        let xml = section_properties(&region(NumberFormat::None, None), &geometry, None);
        assert!(!xml.contains("pgNumType"));
    }

    #[test]
    fn test_footer_field_switches() {
        let roman = footer_xml(NumberFormat::RomanLower, FooterPosition::BottomCenter, "PageNumber");
        assert!(roman.contains(" PAGE \\* roman "));
        assert!(roman.contains("<w:jc w:val=\"center\"/>"));

        let upper = footer_xml(NumberFormat::RomanUpper, FooterPosition::BottomRight, "PageNumber");
        assert!(upper.contains(" PAGE \\* ROMAN "));
        assert!(upper.contains("<w:jc w:val=\"right\"/>"));

        let arabic = footer_xml(NumberFormat::Arabic, FooterPosition::BottomLeft, "PageNumber");
        assert!(arabic.contains("<w:instrText xml:space=\"preserve\"> PAGE </w:instrText>"));

        let blank = footer_xml(NumberFormat::None, FooterPosition::BottomCenter, "PageNumber");
        assert!(!blank.contains("fldChar"));
    }
}

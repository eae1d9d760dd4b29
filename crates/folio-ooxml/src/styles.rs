//! styles.xml generation
//!
//! Every formatting rule of the guideline becomes a custom paragraph style.
//! Style IDs are derived from the rule keys (`heading_chapter` ->
//! `HeadingChapter`); the fallback rule becomes the `Normal` style, which
//! also serves unknown keys.

use folio_config::{Alignment, Guidelines, StyleRule};
use folio_core::{style_keys, DocType};

use crate::xml::{
    escape_xml, inches_to_twips, points_to_half_points, points_to_twips, W_NS, XML_DECLARATION,
};

/// ID of the default paragraph style
pub const NORMAL_STYLE_ID: &str = "Normal";

/// Style ID for a guideline style key
pub fn style_id(key: &str) -> String {
    let id: String = key
        .split(|c: char| !c.is_ascii_alphanumeric())
        .filter(|part| !part.is_empty())
        .map(|part| {
            let mut chars = part.chars();
            match chars.next() {
                Some(first) => first.to_ascii_uppercase().to_string() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect();
    // Never shadow the default style
    if id.is_empty() || id == NORMAL_STYLE_ID {
        format!("Folio{}", id)
    } else {
        id
    }
}

/// Outline level of heading styles, so Word's navigation pane sees them
fn outline_level(key: &str) -> Option<u8> {
    match key {
        style_keys::CHAPTER | style_keys::SYNOPSIS_SECTION => Some(0),
        style_keys::SECTION => Some(1),
        style_keys::SUBSECTION => Some(2),
        _ => None,
    }
}

fn jc_value(align: Alignment) -> &'static str {
    match align {
        Alignment::Left => "left",
        Alignment::Center => "center",
        Alignment::Right => "right",
        Alignment::Justify => "both",
    }
}

/// `<w:pPr>` content for a rule, in schema order
pub fn paragraph_properties(rule: &StyleRule, outline: Option<u8>) -> String {
    let mut p = String::new();
    if rule.keep_with_next {
        p.push_str("<w:keepNext/>");
    }
    if rule.page_break_before {
        p.push_str("<w:pageBreakBefore/>");
    }

    let mut spacing = format!(
        "<w:spacing w:before=\"{}\" w:after=\"{}\"",
        points_to_twips(rule.space_before_pt),
        points_to_twips(rule.space_after_pt)
    );
    if let Some(multiple) = rule.line_spacing {
        spacing.push_str(&format!(
            " w:line=\"{}\" w:lineRule=\"auto\"",
            (multiple * 240.0).round() as i64
        ));
    }
    spacing.push_str("/>");
    p.push_str(&spacing);

    if let Some(hanging) = rule.hanging_indent_in {
        let twips = inches_to_twips(hanging);
        p.push_str(&format!(
            "<w:ind w:left=\"{}\" w:hanging=\"{}\"/>",
            twips, twips
        ));
    } else if let Some(first_line) = rule.first_line_indent_in {
        p.push_str(&format!(
            "<w:ind w:firstLine=\"{}\"/>",
            inches_to_twips(first_line)
        ));
    }

    p.push_str(&format!("<w:jc w:val=\"{}\"/>", jc_value(rule.align)));
    if let Some(level) = outline {
        p.push_str(&format!("<w:outlineLvl w:val=\"{}\"/>", level));
    }
    p
}

/// `<w:rPr>` content for a rule, in schema order
pub fn run_properties(rule: &StyleRule) -> String {
    let font = escape_xml(&rule.font);
    let mut r = format!(
        "<w:rFonts w:ascii=\"{f}\" w:hAnsi=\"{f}\" w:cs=\"{f}\"/>",
        f = font
    );
    if rule.bold {
        r.push_str("<w:b/><w:bCs/>");
    }
    if rule.italic {
        r.push_str("<w:i/><w:iCs/>");
    }
    if rule.all_caps {
        r.push_str("<w:caps/>");
    }
    let size = points_to_half_points(rule.size_pt);
    r.push_str(&format!("<w:sz w:val=\"{}\"/><w:szCs w:val=\"{}\"/>", size, size));
    if rule.underline {
        r.push_str("<w:u w:val=\"single\"/>");
    }
    r
}

/// Build word/styles.xml for one document type
pub fn styles_xml(guidelines: &Guidelines, doc_type: DocType) -> String {
    let fallback = &guidelines.fallback_style;
    let mut xml = String::new();
    xml.push_str(XML_DECLARATION);
    xml.push('\n');
    xml.push_str(&format!("<w:styles xmlns:w=\"{}\">\n", W_NS));

    xml.push_str("<w:docDefaults><w:rPrDefault><w:rPr>");
    xml.push_str(&run_properties(fallback));
    xml.push_str("</w:rPr></w:rPrDefault><w:pPrDefault/></w:docDefaults>\n");

    xml.push_str(&format!(
        "<w:style w:type=\"paragraph\" w:default=\"1\" w:styleId=\"{}\"><w:name w:val=\"Normal\"/><w:qFormat/><w:pPr>{}</w:pPr><w:rPr>{}</w:rPr></w:style>\n",
        NORMAL_STYLE_ID,
        paragraph_properties(fallback, None),
        run_properties(fallback)
    ));

    for (key, rule) in &guidelines.rules(doc_type).formatting_styles {
        xml.push_str(&format!(
            "<w:style w:type=\"paragraph\" w:customStyle=\"1\" w:styleId=\"{}\"><w:name w:val=\"{}\"/><w:basedOn w:val=\"{}\"/><w:qFormat/><w:pPr>{}</w:pPr><w:rPr>{}</w:rPr></w:style>\n",
            escape_xml(&style_id(key)),
            escape_xml(key),
            NORMAL_STYLE_ID,
            paragraph_properties(rule, outline_level(key)),
            run_properties(rule)
        ));
    }

    xml.push_str("</w:styles>");
    xml
}

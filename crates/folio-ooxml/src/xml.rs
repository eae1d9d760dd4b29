//! Small helpers for writing WordprocessingML by hand

/// WordprocessingML main namespace
pub const W_NS: &str = "http://schemas.openxmlformats.org/wordprocessingml/2006/main";

/// Office document relationships namespace
pub const R_NS: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships";

pub const XML_DECLARATION: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#;

/// Twips per inch
pub const TWIPS_PER_INCH: f32 = 1440.0;

/// Escape special XML characters
///
/// Characters XML 1.0 does not allow (C0 controls other than tab, line feed
/// and carriage return, U+FFFE, U+FFFF) are dropped.
pub fn escape_xml(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            c if is_xml_char(c) => out.push(c),
            _ => {}
        }
    }
    out
}

fn is_xml_char(c: char) -> bool {
    matches!(
        c,
        '\t' | '\n' | '\r' | '\u{20}'..='\u{D7FF}' | '\u{E000}'..='\u{FFFD}' | '\u{10000}'..
    )
}

pub fn inches_to_twips(inches: f32) -> i64 {
    (inches * TWIPS_PER_INCH).round() as i64
}

/// Points to twentieths of a point
pub fn points_to_twips(points: f32) -> i64 {
    (points * 20.0).round() as i64
}

/// Points to half-points, the unit of `w:sz`
pub fn points_to_half_points(points: f32) -> i64 {
    (points * 2.0).round() as i64
}

/// Text runs for `text`; line breaks become `<w:br/>`
pub fn text_runs(out: &mut String, text: &str, run_properties: &str) {
    for (i, line) in text.split('\n').enumerate() {
        out.push_str("<w:r>");
        out.push_str(run_properties);
        if i > 0 {
            out.push_str("<w:br/>");
        }
        if !line.is_empty() {
            out.push_str(&format!(
                "<w:t xml:space=\"preserve\">{}</w:t>",
                escape_xml(line.trim_end_matches('\r'))
            ));
        }
        out.push_str("</w:r>");
    }
}

/// A complex field: begin, instruction, separator, cached result, end
pub fn field(out: &mut String, instruction: &str, cached: &str, run_properties: &str) {
    out.push_str(&format!(
        "<w:r>{rp}<w:fldChar w:fldCharType=\"begin\"/></w:r>\
         <w:r>{rp}<w:instrText xml:space=\"preserve\"> {instr} </w:instrText></w:r>\
         <w:r>{rp}<w:fldChar w:fldCharType=\"separate\"/></w:r>\
         <w:r>{rp}<w:t>{cached}</w:t></w:r>\
         <w:r>{rp}<w:fldChar w:fldCharType=\"end\"/></w:r>",
        rp = run_properties,
        instr = escape_xml(instruction),
        cached = escape_xml(cached),
    ));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_xml() {
        assert_eq!(escape_xml("a < b & c"), "a &lt; b &amp; c");
        assert_eq!(escape_xml("\"quoted\""), "&quot;quoted&quot;");
    }

    #[test]
    fn test_escape_xml_drops_forbidden_characters() {
        assert_eq!(escape_xml("bell\u{7}\u{0}ed"), "belled");
        assert_eq!(escape_xml("tab\there\u{1b}[0m"), "tab\there[0m");
        assert_eq!(escape_xml("\u{FFFE}ok\u{FFFF}"), "ok");
        assert_eq!(escape_xml("déjà vu \u{1F4C4}"), "déjà vu \u{1F4C4}");
    }

    #[test]
    fn test_unit_conversion() {
        assert_eq!(inches_to_twips(1.5), 2160);
        assert_eq!(points_to_twips(18.0), 360);
        assert_eq!(points_to_half_points(12.0), 24);
        assert_eq!(points_to_half_points(10.5), 21);
    }

    #[test]
    fn test_text_runs_break_lines() {
        let mut out = String::new();
        text_runs(&mut out, "Place: Hisar\nDate: May", "");
        assert_eq!(
            out,
            "<w:r><w:t xml:space=\"preserve\">Place: Hisar</w:t></w:r>\
             <w:r><w:br/><w:t xml:space=\"preserve\">Date: May</w:t></w:r>"
        );
    }

    #[test]
    fn test_text_runs_strip_control_characters() {
        let mut out = String::new();
        text_runs(&mut out, "Result\u{8}s\u{c}", "");
        assert_eq!(out, "<w:r><w:t xml:space=\"preserve\">Results</w:t></w:r>");
    }

    #[test]
    fn test_field_markup() {
        let mut out = String::new();
        field(&mut out, "PAGE \\* roman", "i", "");
        assert!(out.contains("<w:instrText xml:space=\"preserve\"> PAGE \\* roman </w:instrText>"));
        assert!(out.contains("w:fldCharType=\"separate\""));
        assert!(out.ends_with("<w:r><w:fldChar w:fldCharType=\"end\"/></w:r>"));
    }
}

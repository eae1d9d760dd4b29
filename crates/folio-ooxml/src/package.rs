//! Fixed package parts: content types, package relationships, settings and
//! core properties

use std::collections::BTreeSet;

use crate::image::content_type_for_extension;
use crate::relationships::Relationships;
use crate::xml::{escape_xml, W_NS, XML_DECLARATION};

pub const CONTENT_TYPES_PART: &str = "[Content_Types].xml";
pub const PACKAGE_RELS_PART: &str = "_rels/.rels";
pub const DOCUMENT_RELS_PART: &str = "word/_rels/document.xml.rels";
pub const STYLES_PART: &str = "word/styles.xml";
pub const SETTINGS_PART: &str = "word/settings.xml";
pub const CORE_PROPERTIES_PART: &str = "docProps/core.xml";

const MAIN_CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml";
const STYLES_CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.wordprocessingml.styles+xml";
const SETTINGS_CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.wordprocessingml.settings+xml";
const FOOTER_CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.wordprocessingml.footer+xml";
const CORE_CONTENT_TYPE: &str = "application/vnd.openxmlformats-package.core-properties+xml";

/// Metadata written to docProps/core.xml
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DocumentProperties {
    pub title: Option<String>,
    pub author: Option<String>,
    pub subject: Option<String>,
}

/// [Content_Types].xml for the given footers and media extensions
pub fn content_types_xml<'a>(
    footer_parts: impl IntoIterator<Item = &'a str>,
    media_extensions: &BTreeSet<String>,
) -> String {
    let mut xml = String::new();
    xml.push_str(XML_DECLARATION);
    xml.push('\n');
    xml.push_str(
        "<Types xmlns=\"http://schemas.openxmlformats.org/package/2006/content-types\">\n",
    );
    xml.push_str("  <Default Extension=\"rels\" ContentType=\"application/vnd.openxmlformats-package.relationships+xml\"/>\n");
    xml.push_str("  <Default Extension=\"xml\" ContentType=\"application/xml\"/>\n");
    for ext in media_extensions {
        xml.push_str(&format!(
            "  <Default Extension=\"{}\" ContentType=\"{}\"/>\n",
            escape_xml(ext),
            content_type_for_extension(ext)
        ));
    }

    let mut overrides = vec![
        ("/word/document.xml".to_string(), MAIN_CONTENT_TYPE),
        (format!("/{}", STYLES_PART), STYLES_CONTENT_TYPE),
        (format!("/{}", SETTINGS_PART), SETTINGS_CONTENT_TYPE),
        (format!("/{}", CORE_PROPERTIES_PART), CORE_CONTENT_TYPE),
    ];
    overrides.extend(
        footer_parts
            .into_iter()
            .map(|part| (format!("/{}", part), FOOTER_CONTENT_TYPE)),
    );
    for (part, content_type) in overrides {
        xml.push_str(&format!(
            "  <Override PartName=\"{}\" ContentType=\"{}\"/>\n",
            part, content_type
        ));
    }

    xml.push_str("</Types>");
    xml
}

/// _rels/.rels
pub fn package_relationships() -> Relationships {
    let mut rels = Relationships::new();
    rels.add("word/document.xml", Relationships::TYPE_OFFICE_DOCUMENT);
    rels.add(CORE_PROPERTIES_PART, Relationships::TYPE_CORE_PROPERTIES);
    rels
}

/// word/settings.xml; `updateFields` makes Word refresh PAGEREF fields on open
pub fn settings_xml() -> String {
    format!(
        "{}\n<w:settings xmlns:w=\"{}\">\
         <w:updateFields w:val=\"true\"/>\
         <w:defaultTabStop w:val=\"720\"/>\
         <w:characterSpacingControl w:val=\"doNotCompress\"/>\
         <w:compat><w:compatSetting w:name=\"compatibilityMode\" w:uri=\"http://schemas.microsoft.com/office/word\" w:val=\"15\"/></w:compat>\
         </w:settings>",
        XML_DECLARATION, W_NS
    )
}

/// docProps/core.xml
pub fn core_properties_xml(properties: &DocumentProperties) -> String {
    let mut xml = String::new();
    xml.push_str(XML_DECLARATION);
    xml.push('\n');
    xml.push_str(
        "<cp:coreProperties xmlns:cp=\"http://schemas.openxmlformats.org/package/2006/metadata/core-properties\" \
         xmlns:dc=\"http://purl.org/dc/elements/1.1/\" \
         xmlns:dcterms=\"http://purl.org/dc/terms/\" \
         xmlns:xsi=\"http://www.w3.org/2001/XMLSchema-instance\">",
    );
    if let Some(title) = &properties.title {
        xml.push_str(&format!("<dc:title>{}</dc:title>", escape_xml(title)));
    }
    if let Some(subject) = &properties.subject {
        xml.push_str(&format!("<dc:subject>{}</dc:subject>", escape_xml(subject)));
    }
    if let Some(author) = &properties.author {
        xml.push_str(&format!(
            "<dc:creator>{a}</dc:creator><cp:lastModifiedBy>{a}</cp:lastModifiedBy>",
            a = escape_xml(author)
        ));
    }
    xml.push_str("</cp:coreProperties>");
    xml
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_content_types_lists_footers_and_media() {
        let media: BTreeSet<String> = ["png".to_string(), "jpg".to_string()].into();
        let xml = content_types_xml(["word/footer1.xml", "word/footer2.xml"], &media);

        assert!(xml.contains("<Default Extension=\"png\" ContentType=\"image/png\"/>"));
        assert!(xml.contains("<Default Extension=\"jpg\" ContentType=\"image/jpeg\"/>"));
        assert!(xml.contains("PartName=\"/word/footer2.xml\""));
        assert!(xml.contains("PartName=\"/word/settings.xml\""));
        assert_eq!(xml.matches("<Override ").count(), 6);
    }

    #[test]
    fn test_settings_request_field_update() {
        assert!(settings_xml().contains("<w:updateFields w:val=\"true\"/>"));
    }

    #[test]
    fn test_core_properties_escape() {
        let xml = core_properties_xml(&DocumentProperties {
            title: Some("Sensors & Pumps".to_string()),
            author: Some("Asha Verma".to_string()),
            subject: None,
        });
        assert!(xml.contains("<dc:title>Sensors &amp; Pumps</dc:title>"));
        assert!(xml.contains("<dc:creator>Asha Verma</dc:creator>"));
        assert!(!xml.contains("dc:subject"));
    }

    #[test]
    fn test_package_relationships() {
        let rels = package_relationships();
        assert_eq!(rels.get("rId1"), Some("word/document.xml"));
        assert_eq!(rels.get("rId2"), Some(CORE_PROPERTIES_PART));
    }
}

//! Word template renderer.
//!
//! A `.docx` file is a zip package of XML parts. Rendering copies every entry
//! of the template into a fresh package and rewrites the body, header and
//! footer parts, replacing each `{field}` placeholder with its value.
//!
//! Word often splits what the author typed as `{name}` over several runs
//! (`<w:t>{na</w:t>` ... `<w:t>me}</w:t>`), so placeholders are matched
//! against the concatenated text of consecutive `<w:t>` nodes. The value
//! lands in the node holding the opening brace and the rest of the
//! placeholder is cut from the following nodes, keeping their formatting.

use std::io::{Cursor, Read, Write};
use std::ops::Range;
use std::path::{Path, PathBuf};

use cap_std::{ambient_authority, fs::Dir};
use tracing::debug;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

use crate::domain::ports::{DocumentTemplate, DocumentTemplateError, Placeholders};

const TEXT_OPEN: &str = "<w:t";
const TEXT_CLOSE: &str = "</w:t>";

/// [`DocumentTemplate`] reading a `.docx` file from disk on every render.
#[derive(Debug, Clone)]
pub struct DocxTemplate {
    path: PathBuf,
}

impl DocxTemplate {
    /// Use the template at `path`. The file is not read until rendering.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn read_template(&self) -> Result<Vec<u8>, DocumentTemplateError> {
        let open_error =
            |err: std::io::Error| DocumentTemplateError::open(format!("{}: {err}", self.path.display()));

        let file_name = self.path.file_name().ok_or_else(|| {
            DocumentTemplateError::open(format!("{}: not a file path", self.path.display()))
        })?;
        let parent = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        let dir = Dir::open_ambient_dir(parent, ambient_authority()).map_err(open_error)?;
        dir.read(file_name).map_err(open_error)
    }
}

/// Parts that may carry user-visible placeholders.
fn is_text_part(name: &str) -> bool {
    if name == "word/document.xml" {
        return true;
    }
    name.strip_prefix("word/")
        .filter(|rest| !rest.contains('/'))
        .is_some_and(|rest| {
            (rest.starts_with("header") || rest.starts_with("footer")) && rest.ends_with(".xml")
        })
}

fn escape_xml(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

/// Byte ranges of the content of every `<w:t>` element, in document order.
fn text_nodes(xml: &str) -> Vec<Range<usize>> {
    let mut nodes = Vec::new();
    let mut cursor = 0;
    while let Some(found) = xml.get(cursor..).and_then(|rest| rest.find(TEXT_OPEN)) {
        let after_name = cursor + found + TEXT_OPEN.len();
        let Some((attributes, _)) = xml
            .get(after_name..)
            .and_then(|rest| rest.split_once('>'))
        else {
            break;
        };
        cursor = after_name + attributes.len() + 1;

        // Skip `<w:tab/>`, `<w:tbl>`, `<w:tc>` and empty `<w:t/>`.
        let is_text_element =
            attributes.is_empty() || attributes.starts_with(char::is_whitespace);
        if !is_text_element || attributes.ends_with('/') {
            continue;
        }

        let Some(length) = xml.get(cursor..).and_then(|rest| rest.find(TEXT_CLOSE)) else {
            break;
        };
        nodes.push(cursor..cursor + length);
        cursor += length + TEXT_CLOSE.len();
    }
    nodes
}

/// Known placeholders in `text`, left to right and never overlapping, with
/// their escaped values.
fn placeholder_matches(text: &str, placeholders: &Placeholders) -> Vec<(Range<usize>, String)> {
    let mut matches = Vec::new();
    let mut taken_until = 0;
    for (open, _) in text.match_indices('{') {
        if open < taken_until {
            continue;
        }
        let Some((field, _)) = text.get(open + 1..).and_then(|rest| rest.split_once('}')) else {
            break;
        };
        if let Some(value) = placeholders.get(field) {
            taken_until = open + field.len() + 2;
            matches.push((open..taken_until, escape_xml(value)));
        }
    }
    matches
}

/// Replace `range` of `texts`, viewed as one string, with `replacement`,
/// which goes into the first affected node.
fn splice(texts: &mut [String], range: &Range<usize>, replacement: &str) {
    let mut offset = 0;
    let mut inserted = false;
    for text in texts.iter_mut() {
        let node_start = offset;
        let node_end = offset + text.len();
        offset = node_end;
        if node_end <= range.start || node_start >= range.end {
            continue;
        }
        let from = range.start.saturating_sub(node_start);
        let to = range.end.min(node_end) - node_start;
        let value = if inserted { "" } else { replacement };
        inserted = true;
        text.replace_range(from..to, value);
    }
}

/// Fill every placeholder in one XML part.
///
/// Placeholders are located once in the original text and replaced from the
/// last to the first, so a value is never scanned for further placeholders.
fn substitute(xml: &str, placeholders: &Placeholders) -> String {
    let nodes = text_nodes(xml);
    if nodes.is_empty() {
        return xml.to_owned();
    }
    let mut texts: Vec<String> = nodes
        .iter()
        .map(|node| xml.get(node.clone()).unwrap_or_default().to_owned())
        .collect();

    let joined = texts.concat();
    for (range, replacement) in placeholder_matches(&joined, placeholders).iter().rev() {
        splice(&mut texts, range, replacement);
    }

    let mut out = String::with_capacity(xml.len());
    let mut last = 0;
    for (node, text) in nodes.iter().zip(&texts) {
        out.push_str(xml.get(last..node.start).unwrap_or_default());
        out.push_str(text);
        last = node.end;
    }
    out.push_str(xml.get(last..).unwrap_or_default());
    out
}

fn package_error(err: &impl std::fmt::Display) -> DocumentTemplateError {
    DocumentTemplateError::substitute(format!("write package: {err}"))
}

fn render_package(
    template: &[u8],
    placeholders: &Placeholders,
) -> Result<Vec<u8>, DocumentTemplateError> {
    let mut archive = ZipArchive::new(Cursor::new(template))
        .map_err(|err| DocumentTemplateError::open(format!("not a docx package: {err}")))?;
    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

    for index in 0..archive.len() {
        let mut entry = archive
            .by_index(index)
            .map_err(|err| DocumentTemplateError::open(format!("entry {index}: {err}")))?;
        let name = entry.name().to_owned();

        if !is_text_part(&name) {
            writer.raw_copy_file(entry).map_err(|err| package_error(&err))?;
            continue;
        }

        let mut bytes = Vec::new();
        entry
            .read_to_end(&mut bytes)
            .map_err(|err| DocumentTemplateError::substitute(format!("{name}: {err}")))?;
        let xml = String::from_utf8(bytes).map_err(|err| {
            DocumentTemplateError::substitute(format!("{name} is not UTF-8: {err}"))
        })?;
        let rendered = substitute(&xml, placeholders);
        debug!(part = %name, "template part rendered");

        writer.start_file(name, options).map_err(|err| package_error(&err))?;
        writer
            .write_all(rendered.as_bytes())
            .map_err(|err| package_error(&err))?;
    }

    let cursor = writer.finish().map_err(|err| package_error(&err))?;
    Ok(cursor.into_inner())
}

impl DocumentTemplate for DocxTemplate {
    fn render(&self, placeholders: &Placeholders) -> Result<Vec<u8>, DocumentTemplateError> {
        let template = self.read_template()?;
        render_package(&template, placeholders)
    }
}

#[cfg(test)]
mod tests {
    use rstest::{fixture, rstest};
    use tempfile::TempDir;

    use super::*;

    const DOCUMENT: &str = concat!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#,
        r#"<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:body>"#,
        r#"<w:p><w:r><w:t xml:space="preserve">Dear {name}, </w:t></w:r><w:r><w:tab/></w:r>"#,
        r#"<w:r><w:rPr><w:b/></w:rPr><w:t>{na</w:t></w:r><w:r><w:t>me</w:t></w:r><w:r><w:t>}</w:t></w:r></w:p>"#,
        r#"<w:tbl><w:tr><w:tc><w:p><w:r><w:t>{email}</w:t></w:r></w:p></w:tc></w:tr></w:tbl>"#,
        r#"<w:p><w:r><w:t/></w:r><w:r><w:t>{unknown}</w:t></w:r></w:p>"#,
        r#"</w:body></w:document>"#
    );
    const HEADER: &str = r#"<w:hdr><w:p><w:r><w:t>Contact: {email}</w:t></w:r></w:p></w:hdr>"#;
    const IMAGE: &[u8] = &[0x89, b'P', b'N', b'G', 0xff, 0x00, b'{', b'n'];

    fn placeholders(name: &str, email: &str) -> Placeholders {
        Placeholders::from([
            ("name".to_owned(), name.to_owned()),
            ("email".to_owned(), email.to_owned()),
        ])
    }

    fn package(entries: &[(&str, &[u8])]) -> Vec<u8> {
        let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
        let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
        for (name, bytes) in entries {
            writer.start_file(*name, options).expect("start entry");
            writer.write_all(bytes).expect("write entry");
        }
        writer.finish().expect("finish package").into_inner()
    }

    fn read_entry(bytes: &[u8], name: &str) -> Vec<u8> {
        let mut archive = ZipArchive::new(Cursor::new(bytes)).expect("rendered zip");
        let mut entry = archive.by_name(name).expect("entry present");
        let mut out = Vec::new();
        entry.read_to_end(&mut out).expect("read entry");
        out
    }

    fn read_text(bytes: &[u8], name: &str) -> String {
        String::from_utf8(read_entry(bytes, name)).expect("utf8 entry")
    }

    #[fixture]
    fn template_dir() -> TempDir {
        let temp = TempDir::new().expect("temp dir");
        let dir = Dir::open_ambient_dir(temp.path(), ambient_authority()).expect("open temp");
        dir.write(
            "template.docx",
            package(&[
                ("[Content_Types].xml", &b"<Types/>"[..]),
                ("word/document.xml", DOCUMENT.as_bytes()),
                ("word/header1.xml", HEADER.as_bytes()),
                ("word/media/image1.png", IMAGE),
            ]),
        )
        .expect("write template");
        temp
    }

    #[rstest]
    fn fills_placeholders_including_split_runs(template_dir: TempDir) {
        let template = DocxTemplate::new(template_dir.path().join("template.docx"));

        let bytes = template
            .render(&placeholders("Ana", "a@x.com"))
            .expect("render succeeds");

        let document = read_text(&bytes, "word/document.xml");
        assert!(document.contains(r#"<w:t xml:space="preserve">Dear Ana, </w:t>"#));
        assert!(document.contains("<w:b/></w:rPr><w:t>Ana</w:t>"));
        assert!(document.contains("<w:t></w:t></w:r><w:r><w:t></w:t>"));
        assert!(document.contains("<w:t>a@x.com</w:t>"));
        assert!(document.contains("<w:tab/>"));
        assert!(document.contains("{unknown}"));
        assert!(!document.contains("{name}"));
        assert!(!document.contains("{email}"));

        let header = read_text(&bytes, "word/header1.xml");
        assert!(header.contains("Contact: a@x.com"));
    }

    #[rstest]
    fn copies_other_entries_unchanged(template_dir: TempDir) {
        let template = DocxTemplate::new(template_dir.path().join("template.docx"));

        let bytes = template
            .render(&placeholders("Ana", "a@x.com"))
            .expect("render succeeds");

        assert_eq!(read_entry(&bytes, "word/media/image1.png"), IMAGE);
        assert_eq!(read_entry(&bytes, "[Content_Types].xml"), b"<Types/>");
    }

    #[rstest]
    fn values_are_xml_escaped(template_dir: TempDir) {
        let template = DocxTemplate::new(template_dir.path().join("template.docx"));

        let bytes = template
            .render(&placeholders("<Ana & \"Bo\">", "a@x.com"))
            .expect("render succeeds");

        let document = read_text(&bytes, "word/document.xml");
        assert!(document.contains("&lt;Ana &amp; &quot;Bo&quot;&gt;"));
        assert!(!document.contains("<Ana"));
    }

    #[rstest]
    #[case("{name}", "a@x.com", "{name}", 2)]
    #[case("Ana", "{name}@x.com", "{name}@x.com", 1)]
    #[case("{email}", "a@x.com", "{email}", 2)]
    fn a_value_containing_its_own_placeholder_is_not_expanded_again(
        template_dir: TempDir,
        #[case] name: &str,
        #[case] email: &str,
        #[case] literal: &str,
        #[case] occurrences: usize,
    ) {
        let template = DocxTemplate::new(template_dir.path().join("template.docx"));

        let bytes = template
            .render(&placeholders(name, email))
            .expect("render terminates");

        let document = read_text(&bytes, "word/document.xml");
        assert_eq!(document.matches(literal).count(), occurrences);
    }

    #[rstest]
    fn placeholders_are_matched_once_against_the_original_text() {
        let found = placeholder_matches("{{name}} {email}{x}", &placeholders("{email}", "e"));
        let ranges: Vec<_> = found.iter().map(|(range, _)| range.clone()).collect();
        assert_eq!(ranges, vec![1..7, 9..16]);
        assert_eq!(found[0].1, "{email}");
    }

    #[rstest]
    fn the_template_file_is_left_untouched(template_dir: TempDir) {
        let path = template_dir.path().join("template.docx");
        let dir = Dir::open_ambient_dir(template_dir.path(), ambient_authority()).expect("open");
        let before = dir.read("template.docx").expect("read template");

        DocxTemplate::new(&path)
            .render(&placeholders("Ana", "a@x.com"))
            .expect("render succeeds");

        assert_eq!(dir.read("template.docx").expect("read template"), before);
    }

    #[rstest]
    fn missing_template_is_an_open_error() {
        let temp = TempDir::new().expect("temp dir");
        let err = DocxTemplate::new(temp.path().join("absent.docx"))
            .render(&Placeholders::new())
            .expect_err("no template");
        assert!(matches!(err, DocumentTemplateError::Open { .. }));
    }

    #[rstest]
    fn non_zip_template_is_an_open_error() {
        let err = render_package(b"plain text", &Placeholders::new()).expect_err("not a zip");
        assert!(matches!(err, DocumentTemplateError::Open { .. }));
    }

    #[rstest]
    fn non_utf8_body_is_a_substitution_error() {
        let template = package(&[("word/document.xml", &[0xff, 0xfe, 0x00][..])]);
        let err = render_package(&template, &Placeholders::new()).expect_err("bad part");
        assert!(matches!(err, DocumentTemplateError::Substitute { .. }));
    }

    #[rstest]
    #[case("word/document.xml", true)]
    #[case("word/header1.xml", true)]
    #[case("word/footer2.xml", true)]
    #[case("word/styles.xml", false)]
    #[case("word/_rels/header1.xml.rels", false)]
    #[case("word/media/header.png", false)]
    fn only_body_header_and_footer_parts_are_rewritten(#[case] part: &str, #[case] rewritten: bool) {
        assert_eq!(is_text_part(part), rewritten);
    }
}

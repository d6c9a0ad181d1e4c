//! Directory scan and text extraction for preset files.
//!
//! Supported suffixes: .txt and .md (read as-is), .docx (unzip
//! word/document.xml and collect the text runs), .pdf (pdf-extract).
//! Unsupported or unreadable files are skipped with a warning — a bad file
//! never blocks startup.

use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufReader, Read, Seek};
use std::path::Path;

use anyhow::{Context, Result};
use quick_xml::events::Event;
use quick_xml::Reader;
use tracing::{debug, warn};

/// Scans `dir` for preset files and returns display-key → body text.
/// A missing directory yields an empty map.
pub fn scan_presets(dir: &Path) -> BTreeMap<String, String> {
    let mut presets = BTreeMap::new();

    let entries = match std::fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) => {
            warn!("Preset directory {} not readable: {e}", dir.display());
            return presets;
        }
    };

    for entry in entries.flatten() {
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else {
            continue;
        };

        match extract_text(&path) {
            Ok(Some(body)) if !body.trim().is_empty() => {
                presets.insert(display_key(stem), body.trim().to_string());
            }
            Ok(Some(_)) => {
                warn!("Preset file {} is empty, skipping", path.display());
            }
            Ok(None) => {
                debug!("Ignoring unsupported preset file {}", path.display());
            }
            Err(e) => {
                warn!("Failed to read preset file {}: {e}", path.display());
            }
        }
    }

    presets
}

/// Normalizes a file stem into a display key: separators become spaces,
/// words are title-cased.
pub fn display_key(stem: &str) -> String {
    stem.replace(['_', '-'], " ")
        .split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => {
                    first.to_uppercase().collect::<String>() + &chars.as_str().to_lowercase()
                }
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Extracts plain text from a preset file. `Ok(None)` means the suffix is
/// not supported.
fn extract_text(path: &Path) -> Result<Option<String>> {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase());

    match extension.as_deref() {
        Some("txt") | Some("md") => {
            let body = std::fs::read_to_string(path)
                .with_context(|| format!("reading {}", path.display()))?;
            Ok(Some(body))
        }
        Some("docx") => {
            let file = File::open(path).with_context(|| format!("opening {}", path.display()))?;
            Ok(Some(extract_docx_text(file)?))
        }
        Some("pdf") => {
            let body = pdf_extract::extract_text(path)
                .map_err(|e| anyhow::anyhow!("extracting text from {}: {e}", path.display()))?;
            Ok(Some(body))
        }
        _ => Ok(None),
    }
}

/// Pulls the paragraph text out of a .docx archive (word/document.xml):
/// `w:t` runs are concatenated, each closed `w:p` becomes a line break.
pub fn extract_docx_text<R: Read + Seek>(reader: R) -> Result<String> {
    let mut archive = zip::ZipArchive::new(reader).context("not a valid .docx (zip) archive")?;
    let document = archive
        .by_name("word/document.xml")
        .context(".docx has no word/document.xml")?;

    let mut xml = Reader::from_reader(BufReader::new(document));
    let mut buf = Vec::new();
    let mut text = String::new();
    let mut in_run = false;

    loop {
        match xml.read_event_into(&mut buf).context("malformed document.xml")? {
            Event::Start(e) if e.name().as_ref() == b"w:t" => in_run = true,
            Event::End(e) if e.name().as_ref() == b"w:t" => in_run = false,
            Event::End(e) if e.name().as_ref() == b"w:p" => text.push('\n'),
            Event::Text(t) if in_run => {
                text.push_str(&t.unescape().context("bad text run")?);
            }
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    Ok(text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;
    use std::io::Write;

    #[test]
    fn test_display_key_normalization() {
        assert_eq!(display_key("senior_rust_engineer"), "Senior Rust Engineer");
        assert_eq!(display_key("Marketing-Manager"), "Marketing Manager");
        assert_eq!(display_key("plain"), "Plain");
        assert_eq!(display_key("already Spaced  out"), "Already Spaced Out");
    }

    #[test]
    fn test_scan_reads_txt_and_md() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("backend_role.txt"), "backend body").unwrap();
        std::fs::write(dir.path().join("frontend-role.md"), "# frontend body").unwrap();

        let presets = scan_presets(dir.path());
        assert_eq!(presets.len(), 2);
        assert_eq!(presets["Backend Role"], "backend body");
        assert_eq!(presets["Frontend Role"], "# frontend body");
    }

    #[test]
    fn test_scan_skips_unsupported_and_empty_files() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("logo.png"), [0u8, 1, 2]).unwrap();
        std::fs::write(dir.path().join("blank.txt"), "   \n").unwrap();
        std::fs::write(dir.path().join("good.txt"), "kept").unwrap();

        let presets = scan_presets(dir.path());
        assert_eq!(presets.len(), 1);
        assert!(presets.contains_key("Good"));
    }

    #[test]
    fn test_scan_missing_directory_is_empty_not_fatal() {
        let presets = scan_presets(Path::new("/definitely/not/here"));
        assert!(presets.is_empty());
    }

    fn docx_fixture(document_xml: &str) -> Cursor<Vec<u8>> {
        let mut cursor = Cursor::new(Vec::new());
        {
            let mut writer = zip::ZipWriter::new(&mut cursor);
            writer
                .start_file("word/document.xml", zip::write::FileOptions::default())
                .unwrap();
            writer.write_all(document_xml.as_bytes()).unwrap();
            writer.finish().unwrap();
        }
        cursor.set_position(0);
        cursor
    }

    #[test]
    fn test_docx_text_runs_and_paragraphs() {
        let xml = r#"<?xml version="1.0"?>
<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main">
  <w:body>
    <w:p><w:r><w:t>First paragraph</w:t></w:r></w:p>
    <w:p><w:r><w:t>Second </w:t></w:r><w:r><w:t>paragraph</w:t></w:r></w:p>
  </w:body>
</w:document>"#;
        let text = extract_docx_text(docx_fixture(xml)).unwrap();
        assert_eq!(text.trim(), "First paragraph\nSecond paragraph");
    }

    #[test]
    fn test_docx_without_document_xml_is_error() {
        let mut cursor = Cursor::new(Vec::new());
        {
            let mut writer = zip::ZipWriter::new(&mut cursor);
            writer
                .start_file("unrelated.txt", zip::write::FileOptions::default())
                .unwrap();
            writer.write_all(b"nope").unwrap();
            writer.finish().unwrap();
        }
        cursor.set_position(0);
        assert!(extract_docx_text(cursor).is_err());
    }

    #[test]
    fn test_corrupt_docx_skipped_by_scan() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("broken.docx"), b"not a zip").unwrap();
        let presets = scan_presets(dir.path());
        assert!(presets.is_empty());
    }
}

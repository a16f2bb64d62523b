/*!
 * ZIP container of an OOXML workbook.
 *
 * Every entry is held in memory in archive order. Saving writes the entries
 * back in the same order with their original compression, so parts that were
 * not replaced come out unchanged.
 */

use std::fs;
use std::io::{Cursor, Read, Write};
use std::path::Path;

use zip::write::FileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

use crate::errors::WorkbookError;
use super::xml_tree::XmlDocument;

#[derive(Debug, Clone)]
struct PackageEntry {
    name: String,
    data: Vec<u8>,
    is_dir: bool,
    compression: CompressionMethod,
}

#[derive(Debug, Clone, Default)]
pub struct Package {
    entries: Vec<PackageEntry>,
}

impl Package {
    pub fn open(path: &Path) -> Result<Self, WorkbookError> {
        let bytes = fs::read(path)?;
        Self::from_bytes(bytes)
    }

    pub fn from_bytes(bytes: Vec<u8>) -> Result<Self, WorkbookError> {
        let mut archive = ZipArchive::new(Cursor::new(bytes))?;
        let mut entries = Vec::with_capacity(archive.len());
        for i in 0..archive.len() {
            let mut file = archive.by_index(i)?;
            let mut data = Vec::with_capacity(file.size() as usize);
            file.read_to_end(&mut data)?;
            entries.push(PackageEntry {
                name: file.name().to_string(),
                is_dir: file.is_dir(),
                compression: file.compression(),
                data,
            });
        }
        Ok(Self { entries })
    }

    pub fn part(&self, name: &str) -> Option<&[u8]> {
        self.entries.iter()
            .find(|e| !e.is_dir && e.name == name)
            .map(|e| e.data.as_slice())
    }

    /// Parse a part as XML; `Ok(None)` when the part does not exist
    pub fn xml_part(&self, name: &str) -> Result<Option<XmlDocument>, WorkbookError> {
        self.part(name).map(XmlDocument::parse).transpose()
    }

    /// Replace a part, or append it when new
    pub fn set_part(&mut self, name: &str, data: Vec<u8>) {
        match self.entries.iter_mut().find(|e| !e.is_dir && e.name == name) {
            Some(entry) => entry.data = data,
            None => self.entries.push(PackageEntry {
                name: name.to_string(),
                data,
                is_dir: false,
                compression: CompressionMethod::Deflated,
            }),
        }
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>, WorkbookError> {
        let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
        for entry in &self.entries {
            let method = match entry.compression {
                CompressionMethod::Stored => CompressionMethod::Stored,
                _ => CompressionMethod::Deflated,
            };
            let options = FileOptions::default().compression_method(method);
            if entry.is_dir {
                zip.add_directory(entry.name.as_str(), options)?;
            } else {
                zip.start_file(entry.name.as_str(), options)?;
                zip.write_all(&entry.data)?;
            }
        }
        Ok(zip.finish()?.into_inner())
    }

    pub fn save(&self, path: &Path) -> Result<(), WorkbookError> {
        let bytes = self.to_bytes()?;
        fs::write(path, bytes)?;
        Ok(())
    }
}

/// Path of the relationships part that belongs to `part`
pub fn rels_path(part: &str) -> String {
    match part.rfind('/') {
        Some(pos) => format!("{}/_rels/{}.rels", &part[..pos], &part[pos + 1..]),
        None => format!("_rels/{}.rels", part),
    }
}

/// Resolve a relationship target against the part that owns the relationship
pub fn resolve_target(source_part: &str, target: &str) -> String {
    if let Some(absolute) = target.strip_prefix('/') {
        return absolute.to_string();
    }
    let base = match source_part.rfind('/') {
        Some(pos) => &source_part[..pos],
        None => "",
    };
    let mut segments: Vec<&str> = base.split('/').filter(|s| !s.is_empty()).collect();
    for segment in target.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            other => segments.push(other),
        }
    }
    segments.join("/")
}

/// One `<Relationship>` entry
#[derive(Debug, Clone, PartialEq)]
pub struct Relationship {
    pub id: String,
    pub rel_type: String,
    /// Target resolved to a part name
    pub target: String,
    pub external: bool,
}

/// Relationships declared for `part`; empty when it has none
pub fn relationships(package: &Package, part: &str) -> Result<Vec<Relationship>, WorkbookError> {
    let Some(doc) = package.xml_part(&rels_path(part))? else {
        return Ok(Vec::new());
    };
    let source = if part.is_empty() { "" } else { part };
    Ok(doc.root.elements()
        .filter(|e| e.local_name() == "Relationship")
        .filter_map(|e| {
            let id = e.attr("Id")?.to_string();
            let rel_type = e.attr("Type").unwrap_or_default().to_string();
            let raw_target = e.attr("Target")?;
            let external = e.attr("TargetMode") == Some("External");
            let target = if external { raw_target.to_string() } else { resolve_target(source, raw_target) };
            Some(Relationship { id, rel_type, target, external })
        })
        .collect())
}

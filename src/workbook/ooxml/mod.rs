/*!
 * Office Open XML (`.xlsx`, `.xlsm`) backend.
 *
 * A workbook is loaded into memory as its ZIP entries. Worksheet and drawing
 * parts are parsed into XML trees; on save only the parts that were edited are
 * serialized again and every other entry is written back unchanged, which keeps
 * styles, charts, images and everything else the pipeline never touches.
 */

use std::path::{Path, PathBuf};
use std::sync::Arc;

use log::{debug, warn};

use crate::errors::WorkbookError;
use super::{HostFactory, SpreadsheetHost, Workbook, Worksheet};

pub mod drawing;
pub mod package;
pub mod sheet;
pub mod xml_tree;

use package::{relationships, Package};
use sheet::{string_item_text, OoxmlSheet};

/// Host that edits workbook packages directly instead of driving an application
#[derive(Debug)]
pub struct OoxmlHost {
    visible: bool,
}

impl OoxmlHost {
    pub fn new() -> Self {
        Self { visible: true }
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }
}

impl Default for OoxmlHost {
    fn default() -> Self {
        Self::new()
    }
}

impl SpreadsheetHost for OoxmlHost {
    fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
    }

    fn open(&mut self, path: &Path) -> Result<Box<dyn Workbook>, WorkbookError> {
        let extension = path.extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
            .unwrap_or_default();
        if extension == "xls" {
            return Err(WorkbookError::Open {
                path: path.to_path_buf(),
                message: "legacy binary .xls workbooks are not supported, save the file as .xlsx".to_string(),
            });
        }

        let workbook = OoxmlWorkbook::load(path).map_err(|e| WorkbookError::Open {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        debug!("Opened {:?} with {} sheet(s)", path, workbook.sheets.len());
        Ok(Box::new(workbook))
    }

    fn quit(&mut self) {
        debug!("OOXML host released");
    }
}

/// Launches an `OoxmlHost` per file
#[derive(Debug, Clone, Copy, Default)]
pub struct OoxmlHostFactory;

impl HostFactory for OoxmlHostFactory {
    fn launch(&self) -> Result<Box<dyn SpreadsheetHost>, WorkbookError> {
        Ok(Box::new(OoxmlHost::new()))
    }
}

/// An open workbook package
#[derive(Debug)]
pub struct OoxmlWorkbook {
    path: PathBuf,
    package: Package,
    sheets: Vec<OoxmlSheet>,
    closed: bool,
}

impl OoxmlWorkbook {
    pub fn load(path: &Path) -> Result<Self, WorkbookError> {
        let package = Package::open(path)?;
        Self::from_package(path.to_path_buf(), package)
    }

    pub fn from_package(path: PathBuf, package: Package) -> Result<Self, WorkbookError> {
        let workbook_part = relationships(&package, "")?
            .into_iter()
            .find(|r| r.rel_type.ends_with("/officeDocument"))
            .map(|r| r.target)
            .unwrap_or_else(|| "xl/workbook.xml".to_string());

        let workbook_doc = package.xml_part(&workbook_part)?
            .ok_or_else(|| WorkbookError::Package(format!("missing workbook part {}", workbook_part)))?;
        let rels = relationships(&package, &workbook_part)?;

        let shared_strings = match rels.iter().find(|r| r.rel_type.ends_with("/sharedStrings")) {
            Some(rel) => load_shared_strings(&package, &rel.target)?,
            None => Vec::new(),
        };
        let shared_strings = Arc::new(shared_strings);

        let mut sheets = Vec::new();
        if let Some(list) = workbook_doc.root.child("sheets") {
            for entry in list.elements().filter(|e| e.local_name() == "sheet") {
                let name = entry.attr("name").unwrap_or_default().to_string();
                let Some(rel) = entry.prefixed_attr("id").and_then(|id| rels.iter().find(|r| r.id == id)) else {
                    warn!("Sheet '{}' has no relationship, skipping", name);
                    continue;
                };
                if !rel.rel_type.ends_with("/worksheet") {
                    debug!("Sheet '{}' is not a worksheet, skipping", name);
                    continue;
                }
                sheets.push(OoxmlSheet::load(&package, name, &rel.target, Arc::clone(&shared_strings))?);
            }
        }

        Ok(Self {
            path,
            package,
            sheets,
            closed: false,
        })
    }

    /// Serialize edited parts into the package
    fn flush_parts(&mut self) -> Result<(), WorkbookError> {
        for sheet in &self.sheets {
            if sheet.dirty {
                self.package.set_part(&sheet.part, sheet.doc.to_bytes()?);
            }
            if let Some(drawing) = sheet.drawing.as_ref().filter(|d| d.dirty) {
                self.package.set_part(&drawing.part, drawing.doc.to_bytes()?);
            }
        }
        Ok(())
    }
}

fn load_shared_strings(package: &Package, part: &str) -> Result<Vec<String>, WorkbookError> {
    let Some(doc) = package.xml_part(part)? else {
        return Ok(Vec::new());
    };
    Ok(doc.root.elements()
        .filter(|e| e.local_name() == "si")
        .map(string_item_text)
        .collect())
}

impl Workbook for OoxmlWorkbook {
    fn sheet_count(&self) -> usize {
        self.sheets.len()
    }

    fn sheet(&mut self, index: usize) -> Result<&mut dyn Worksheet, WorkbookError> {
        self.sheets.get_mut(index)
            .map(|s| s as &mut dyn Worksheet)
            .ok_or(WorkbookError::SheetNotFound(index))
    }

    fn save_as(&mut self, path: &Path) -> Result<(), WorkbookError> {
        if self.closed {
            return Err(WorkbookError::Save {
                path: path.to_path_buf(),
                message: "workbook is closed".to_string(),
            });
        }
        self.flush_parts()
            .and_then(|_| self.package.save(path))
            .map_err(|e| WorkbookError::Save {
                path: path.to_path_buf(),
                message: e.to_string(),
            })?;
        debug!("Saved {:?} as {:?}", self.path, path);
        Ok(())
    }

    fn close(&mut self) {
        self.closed = true;
    }
}

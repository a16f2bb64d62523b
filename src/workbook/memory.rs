/*!
 * In-memory spreadsheet host.
 *
 * Workbooks are registered by file name on a shared `MemoryStore`. Hosts
 * created from the store open copies of them, and saved workbooks are written
 * back to the store keyed by output path, so a whole run can be inspected
 * without touching the filesystem.
 */

use std::collections::{BTreeMap, HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use parking_lot::Mutex;

use crate::errors::{ShapeTextError, WorkbookError};
use super::{
    CellAddress, CellValue, HostFactory, Shape, SpreadsheetHost, TextRepresentation, Workbook,
    Worksheet,
};

/// A shape whose representations are plain optional strings.
/// A representation missing from `texts` behaves as absent.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MemoryShape {
    pub name: String,
    pub texts: HashMap<TextRepresentation, String>,
    /// Representations that exist but reject writes
    pub read_only: HashSet<TextRepresentation>,
    /// Representations the host cannot access at all
    pub unsupported: HashSet<TextRepresentation>,
}

impl MemoryShape {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn with_text(mut self, repr: TextRepresentation, text: impl Into<String>) -> Self {
        self.texts.insert(repr, text.into());
        self
    }

    pub fn read_only(mut self, repr: TextRepresentation) -> Self {
        self.read_only.insert(repr);
        self
    }

    pub fn unsupported(mut self, repr: TextRepresentation) -> Self {
        self.unsupported.insert(repr);
        self
    }

    pub fn text(&self, repr: TextRepresentation) -> Option<&str> {
        self.texts.get(&repr).map(String::as_str)
    }
}

impl Shape for MemoryShape {
    fn name(&self) -> String {
        self.name.clone()
    }

    fn read_text(&self, repr: TextRepresentation) -> Result<String, ShapeTextError> {
        if self.unsupported.contains(&repr) {
            return Err(ShapeTextError::Unsupported(repr.to_string()));
        }
        self.texts.get(&repr).cloned().ok_or(ShapeTextError::Absent)
    }

    fn write_text(&mut self, repr: TextRepresentation, text: &str) -> Result<(), ShapeTextError> {
        if self.unsupported.contains(&repr) {
            return Err(ShapeTextError::Unsupported(repr.to_string()));
        }
        let current = self.texts.get(&repr).ok_or(ShapeTextError::Absent)?;
        // A classic text frame only accepts writes when it already has text
        if repr == TextRepresentation::RichTextFrame && current.is_empty() {
            return Err(ShapeTextError::NoText);
        }
        if self.read_only.contains(&repr) {
            return Err(ShapeTextError::Rejected(format!("{} is read-only", repr)));
        }
        self.texts.insert(repr, text.to_string());
        Ok(())
    }
}

/// A sheet with sparse cells and an ordered shape collection
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MemorySheet {
    pub name: String,
    pub cells: BTreeMap<CellAddress, CellValue>,
    pub shapes: Vec<MemoryShape>,
    /// Cells that reject writes
    pub locked: HashSet<CellAddress>,
    /// 1-based shape indexes that fail to resolve
    pub broken_shapes: HashSet<usize>,
}

impl MemorySheet {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Set a cell from A1 notation
    pub fn with_cell(mut self, address: &str, value: CellValue) -> Self {
        if let Ok(addr) = address.parse() {
            self.cells.insert(addr, value);
        }
        self
    }

    pub fn with_text(self, address: &str, text: &str) -> Self {
        self.with_cell(address, CellValue::Text(text.to_string()))
    }

    pub fn with_shape(mut self, shape: MemoryShape) -> Self {
        self.shapes.push(shape);
        self
    }

    pub fn lock(mut self, address: &str) -> Self {
        if let Ok(addr) = address.parse() {
            self.locked.insert(addr);
        }
        self
    }

    /// Make shape `index` fail to resolve while still being counted
    pub fn fail_shape(mut self, index: usize) -> Self {
        self.broken_shapes.insert(index);
        self
    }

    pub fn cell(&self, address: &str) -> Option<&CellValue> {
        address.parse::<CellAddress>().ok().and_then(|addr| self.cells.get(&addr))
    }
}

impl Worksheet for MemorySheet {
    fn name(&self) -> &str {
        &self.name
    }

    fn used_cells(&self) -> Vec<(CellAddress, CellValue)> {
        self.cells.iter()
            .filter(|(_, value)| !value.is_empty())
            .map(|(addr, value)| (*addr, value.clone()))
            .collect()
    }

    fn set_cell_text(&mut self, address: &CellAddress, text: &str) -> Result<(), WorkbookError> {
        if self.locked.contains(address) {
            return Err(WorkbookError::CellWrite {
                sheet: self.name.clone(),
                address: address.to_string(),
                message: "cell is locked".to_string(),
            });
        }
        self.cells.insert(*address, CellValue::Text(text.to_string()));
        Ok(())
    }

    fn shape_count(&self) -> Result<usize, WorkbookError> {
        Ok(self.shapes.len())
    }

    fn shape(&mut self, index: usize) -> Result<Box<dyn Shape + '_>, WorkbookError> {
        let sheet = self.name.clone();
        if self.broken_shapes.contains(&index) {
            return Err(WorkbookError::Package(format!("shape {} on sheet '{}' is unreadable", index, sheet)));
        }
        match index.checked_sub(1).and_then(|i| self.shapes.get_mut(i)) {
            Some(shape) => Ok(Box::new(shape)),
            None => Err(WorkbookError::ShapeNotFound { sheet, index }),
        }
    }
}

#[derive(Debug, Default)]
struct StoreState {
    workbooks: HashMap<String, Vec<MemorySheet>>,
    failing_opens: HashSet<String>,
    failing_saves: HashSet<String>,
    launch_failure: Option<String>,
    saved: HashMap<PathBuf, Vec<MemorySheet>>,
    opened: Vec<String>,
    launches: usize,
    quits: usize,
}

/// Shared registry behind every `MemoryHost`
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    state: Arc<Mutex<StoreState>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a workbook under a file name such as `report.xlsx`
    pub fn insert(&self, file_name: impl Into<String>, sheets: Vec<MemorySheet>) {
        self.state.lock().workbooks.insert(file_name.into(), sheets);
    }

    pub fn fail_open(&self, file_name: impl Into<String>) {
        self.state.lock().failing_opens.insert(file_name.into());
    }

    pub fn fail_save(&self, file_name: impl Into<String>) {
        self.state.lock().failing_saves.insert(file_name.into());
    }

    /// Make every later launch fail with `message`
    pub fn fail_launch(&self, message: impl Into<String>) {
        self.state.lock().launch_failure = Some(message.into());
    }

    /// Sheets saved at `path`, if any
    pub fn saved(&self, path: &Path) -> Option<Vec<MemorySheet>> {
        self.state.lock().saved.get(path).cloned()
    }

    pub fn saved_paths(&self) -> Vec<PathBuf> {
        let mut paths: Vec<PathBuf> = self.state.lock().saved.keys().cloned().collect();
        paths.sort();
        paths
    }

    /// File names passed to `open`, in call order
    pub fn opened(&self) -> Vec<String> {
        self.state.lock().opened.clone()
    }

    pub fn launch_count(&self) -> usize {
        self.state.lock().launches
    }

    pub fn quit_count(&self) -> usize {
        self.state.lock().quits
    }

    pub fn host(&self) -> MemoryHost {
        self.state.lock().launches += 1;
        MemoryHost {
            store: self.clone(),
            visible: true,
        }
    }
}

impl HostFactory for MemoryStore {
    fn launch(&self) -> Result<Box<dyn SpreadsheetHost>, WorkbookError> {
        if let Some(message) = self.state.lock().launch_failure.clone() {
            return Err(WorkbookError::Launch(message));
        }
        Ok(Box::new(self.host()))
    }
}

/// Host that opens workbooks registered on a `MemoryStore`
#[derive(Debug)]
pub struct MemoryHost {
    store: MemoryStore,
    visible: bool,
}

impl MemoryHost {
    pub fn is_visible(&self) -> bool {
        self.visible
    }
}

impl SpreadsheetHost for MemoryHost {
    fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
    }

    fn open(&mut self, path: &Path) -> Result<Box<dyn Workbook>, WorkbookError> {
        let file_name = path.file_name()
            .map(|f| f.to_string_lossy().to_string())
            .unwrap_or_default();
        let mut state = self.store.state.lock();
        state.opened.push(file_name.clone());

        if state.failing_opens.contains(&file_name) {
            return Err(WorkbookError::Open {
                path: path.to_path_buf(),
                message: "simulated open failure".to_string(),
            });
        }
        let sheets = state.workbooks.get(&file_name).cloned().ok_or_else(|| WorkbookError::Open {
            path: path.to_path_buf(),
            message: "no such workbook".to_string(),
        })?;

        Ok(Box::new(MemoryWorkbook {
            file_name,
            sheets,
            store: self.store.clone(),
            closed: false,
        }))
    }

    fn quit(&mut self) {
        self.store.state.lock().quits += 1;
    }
}

/// Open copy of a registered workbook
#[derive(Debug)]
pub struct MemoryWorkbook {
    file_name: String,
    sheets: Vec<MemorySheet>,
    store: MemoryStore,
    closed: bool,
}

impl Workbook for MemoryWorkbook {
    fn sheet_count(&self) -> usize {
        self.sheets.len()
    }

    fn sheet(&mut self, index: usize) -> Result<&mut dyn Worksheet, WorkbookError> {
        self.sheets.get_mut(index)
            .map(|s| s as &mut dyn Worksheet)
            .ok_or(WorkbookError::SheetNotFound(index))
    }

    fn save_as(&mut self, path: &Path) -> Result<(), WorkbookError> {
        let mut state = self.store.state.lock();
        if self.closed || state.failing_saves.contains(&self.file_name) {
            return Err(WorkbookError::Save {
                path: path.to_path_buf(),
                message: "simulated save failure".to_string(),
            });
        }
        state.saved.insert(path.to_path_buf(), self.sheets.clone());
        Ok(())
    }

    fn close(&mut self) {
        self.closed = true;
    }
}

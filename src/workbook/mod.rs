/*!
 * Spreadsheet object model.
 *
 * The translation pipeline never talks to a file format directly. It works
 * against the traits in this module, which mirror what a spreadsheet
 * application exposes:
 *
 * - `SpreadsheetHost`: the application process (open workbooks, quit)
 * - `Workbook`: sheets, save, close
 * - `Worksheet`: used range cells and the shape collection
 * - `Shape`: five independently readable and writable text representations
 *
 * Backends:
 * - `ooxml`: `.xlsx` / `.xlsm` packages edited in place
 * - `memory`: in-memory workbooks for tests and dry runs
 */

use std::fmt;
use std::path::Path;

use log::debug;

use crate::errors::{ShapeTextError, WorkbookError};

pub mod address;
pub mod memory;
pub mod ooxml;
pub mod shape_text;

pub use address::CellAddress;
pub use shape_text::{probe_shape_text, write_shape_text, TextRepresentation};

/// Value held by a cell, as the host reports it
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Empty,
    Text(String),
    Number(f64),
    Bool(bool),
    /// Error literal such as `#N/A`
    Error(String),
    /// Formula source without the leading `=`
    Formula(String),
}

impl CellValue {
    /// Display text of the value; empty for `Empty`
    pub fn to_text(&self) -> String {
        match self {
            Self::Empty => String::new(),
            Self::Text(s) => s.clone(),
            Self::Number(n) => {
                if n.fract() == 0.0 && n.abs() < 1e15 {
                    format!("{}", *n as i64)
                } else {
                    n.to_string()
                }
            }
            Self::Bool(b) => if *b { "TRUE".to_string() } else { "FALSE".to_string() },
            Self::Error(e) => e.clone(),
            Self::Formula(f) => format!("={}", f),
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            Self::Empty => true,
            Self::Text(s) => s.is_empty(),
            _ => false,
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_text())
    }
}

/// One drawing shape, resolved fresh from its sheet
pub trait Shape {
    /// Display name of the shape, used in diagnostics
    fn name(&self) -> String;

    /// Read the text held by one representation
    fn read_text(&self, repr: TextRepresentation) -> Result<String, ShapeTextError>;

    /// Replace the text held by one representation
    fn write_text(&mut self, repr: TextRepresentation, text: &str) -> Result<(), ShapeTextError>;
}

impl<T: Shape + ?Sized> Shape for &mut T {
    fn name(&self) -> String {
        (**self).name()
    }

    fn read_text(&self, repr: TextRepresentation) -> Result<String, ShapeTextError> {
        (**self).read_text(repr)
    }

    fn write_text(&mut self, repr: TextRepresentation, text: &str) -> Result<(), ShapeTextError> {
        (**self).write_text(repr, text)
    }
}

/// One sheet of an open workbook
pub trait Worksheet {
    fn name(&self) -> &str;

    /// Non-empty cells of the used range in row-major order.
    /// Empty when the sheet has no used range.
    fn used_cells(&self) -> Vec<(CellAddress, CellValue)>;

    /// Assign a text value to a cell, keeping its formatting
    fn set_cell_text(&mut self, address: &CellAddress, text: &str) -> Result<(), WorkbookError>;

    fn shape_count(&self) -> Result<usize, WorkbookError>;

    /// Resolve the shape at a 1-based index
    fn shape(&mut self, index: usize) -> Result<Box<dyn Shape + '_>, WorkbookError>;
}

/// An open workbook
pub trait Workbook {
    fn sheet_count(&self) -> usize;

    /// Sheet at a zero-based position
    fn sheet(&mut self, index: usize) -> Result<&mut dyn Worksheet, WorkbookError>;

    fn save_as(&mut self, path: &Path) -> Result<(), WorkbookError>;

    fn close(&mut self);
}

/// The spreadsheet application process
pub trait SpreadsheetHost {
    fn set_visible(&mut self, visible: bool);

    fn open(&mut self, path: &Path) -> Result<Box<dyn Workbook>, WorkbookError>;

    /// Terminate the application process
    fn quit(&mut self);
}

/// Builds one host per processed file
pub trait HostFactory: Send + Sync {
    fn launch(&self) -> Result<Box<dyn SpreadsheetHost>, WorkbookError>;
}

impl<F> HostFactory for F
where
    F: Fn() -> Result<Box<dyn SpreadsheetHost>, WorkbookError> + Send + Sync,
{
    fn launch(&self) -> Result<Box<dyn SpreadsheetHost>, WorkbookError> {
        self()
    }
}

/// Owns a host for the duration of one file and quits it on every exit path
pub struct HostGuard {
    host: Box<dyn SpreadsheetHost>,
    released: bool,
}

impl HostGuard {
    pub fn new(mut host: Box<dyn SpreadsheetHost>) -> Self {
        host.set_visible(false);
        Self { host, released: false }
    }

    pub fn host(&mut self) -> &mut dyn SpreadsheetHost {
        self.host.as_mut()
    }

    /// Quit the host now instead of waiting for drop
    pub fn release(&mut self) {
        if !self.released {
            self.released = true;
            self.host.quit();
            debug!("Spreadsheet host closed");
        }
    }
}

impl Drop for HostGuard {
    fn drop(&mut self) {
        self.release();
    }
}

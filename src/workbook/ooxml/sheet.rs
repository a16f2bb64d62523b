/*!
 * Worksheet parts.
 *
 * Cells are read from `sheetData` and written back as inline strings, so the
 * shared string table never has to be rewritten and the cell keeps its style
 * index. The sheet's drawing part, when it has one, backs the shape
 * collection.
 */

use std::collections::BTreeMap;
use std::sync::Arc;

use crate::errors::WorkbookError;
use crate::workbook::{CellAddress, CellValue, Shape, Worksheet};
use super::drawing::{shape_paths, DrawingShape};
use super::package::{relationships, Package};
use super::xml_tree::{Element, Node, XmlDocument};

/// A drawing part and whether any shape in it was edited
#[derive(Debug, Clone)]
pub(super) struct DrawingPart {
    pub part: String,
    pub doc: XmlDocument,
    pub dirty: bool,
}

#[derive(Debug, Clone)]
pub struct OoxmlSheet {
    pub(super) name: String,
    pub(super) part: String,
    pub(super) doc: XmlDocument,
    pub(super) dirty: bool,
    pub(super) drawing: Option<DrawingPart>,
    shared_strings: Arc<Vec<String>>,
    /// Row and cell child indexes per address; dropped whenever an element is inserted
    cell_index: Option<BTreeMap<CellAddress, (usize, usize)>>,
}

impl OoxmlSheet {
    pub(super) fn load(
        package: &Package,
        name: String,
        part: &str,
        shared_strings: Arc<Vec<String>>,
    ) -> Result<Self, WorkbookError> {
        let doc = package.xml_part(part)?
            .ok_or_else(|| WorkbookError::Package(format!("missing worksheet part {}", part)))?;

        let drawing_rel = relationships(package, part)?
            .into_iter()
            .find(|r| !r.external && r.rel_type.ends_with("/drawing"));
        let drawing = match drawing_rel {
            Some(rel) => package.xml_part(&rel.target)?.map(|doc| DrawingPart {
                part: rel.target,
                doc,
                dirty: false,
            }),
            None => None,
        };

        Ok(Self {
            name,
            part: part.to_string(),
            doc,
            dirty: false,
            drawing,
            shared_strings,
            cell_index: None,
        })
    }

    /// Address of every `c` element with its row and cell child indexes
    fn cell_positions(&self) -> Vec<(CellAddress, usize, usize)> {
        let Some(sheet_data) = self.doc.root.child("sheetData") else {
            return Vec::new();
        };

        let mut positions = Vec::new();
        let mut next_row = 0u32;
        for (ri, node) in sheet_data.children.iter().enumerate() {
            let Node::Element(row) = node else { continue };
            if row.local_name() != "row" {
                continue;
            }
            let row_idx = row.attr("r")
                .and_then(|r| r.trim().parse::<u32>().ok())
                .filter(|r| *r > 0)
                .map(|r| r - 1)
                .unwrap_or(next_row);
            next_row = row_idx + 1;

            // Cells without an `r` attribute follow the previous one
            let mut next_col = 0u32;
            for (ci, node) in row.children.iter().enumerate() {
                let Node::Element(cell) = node else { continue };
                if cell.local_name() != "c" {
                    continue;
                }
                let address = cell.attr("r")
                    .and_then(|r| r.parse::<CellAddress>().ok())
                    .unwrap_or_else(|| CellAddress::new(row_idx, next_col));
                next_col = address.col + 1;
                positions.push((address, ri, ci));
            }
        }
        positions
    }

    fn indexed_position(&mut self, address: &CellAddress) -> Option<(usize, usize)> {
        if self.cell_index.is_none() {
            let index = self.cell_positions()
                .into_iter()
                .map(|(a, ri, ci)| (a, (ri, ci)))
                .collect();
            self.cell_index = Some(index);
        }
        self.cell_index.as_ref().and_then(|index| index.get(address).copied())
    }

    /// The `c` element at `address`, created in row and column order if missing
    fn cell_mut(&mut self, address: &CellAddress) -> Result<&mut Element, WorkbookError> {
        let existing = self.indexed_position(address);
        let prefix = self.doc.root.prefix().to_string();
        let sheet_data = self.doc.root.child_mut("sheetData")
            .ok_or_else(|| WorkbookError::Package(format!("{} has no sheetData", self.part)))?;

        if let Some((ri, ci)) = existing {
            return sheet_data.descendant_mut(&[ri, ci])
                .ok_or_else(|| WorkbookError::InvalidAddress(address.to_string()));
        }

        // Inserting shifts child indexes
        self.cell_index = None;
        let row_number = address.row + 1;
        let ri = match find_row(sheet_data, row_number) {
            Some(ri) => ri,
            None => {
                let at = sheet_data.children.iter()
                    .position(|n| matches!(n, Node::Element(e) if e.local_name() == "row" && row_attr(e) > row_number))
                    .unwrap_or(sheet_data.children.len());
                let row = Element::new(format!("{}row", prefix)).with_attr("r", &row_number.to_string());
                sheet_data.children.insert(at, Node::Element(row));
                at
            }
        };

        let row = sheet_data.descendant_mut(&[ri])
            .ok_or_else(|| WorkbookError::InvalidAddress(address.to_string()))?;
        let ci = row.children.iter()
            .position(|n| matches!(n, Node::Element(e) if e.local_name() == "c" && column_attr(e).is_some_and(|c| c > address.col)))
            .unwrap_or(row.children.len());
        let cell = Element::new(format!("{}c", prefix)).with_attr("r", &address.to_string());
        row.children.insert(ci, Node::Element(cell));
        row.descendant_mut(&[ci])
            .ok_or_else(|| WorkbookError::InvalidAddress(address.to_string()))
    }
}

fn row_attr(row: &Element) -> u32 {
    row.attr("r").and_then(|r| r.trim().parse().ok()).unwrap_or(0)
}

fn column_attr(cell: &Element) -> Option<u32> {
    cell.attr("r").and_then(|r| r.parse::<CellAddress>().ok()).map(|a| a.col)
}

fn find_row(sheet_data: &Element, row_number: u32) -> Option<usize> {
    sheet_data.children.iter().position(|n| {
        matches!(n, Node::Element(e) if e.local_name() == "row" && row_attr(e) == row_number)
    })
}

/// Plain text of a string item (`si` or `is`): direct `t` plus rich text runs.
/// Phonetic runs are not part of the displayed value.
pub fn string_item_text(item: &Element) -> String {
    let mut out = String::new();
    for child in item.elements() {
        match child.local_name() {
            "t" => out.push_str(&child.text()),
            "r" => {
                if let Some(t) = child.child("t") {
                    out.push_str(&t.text());
                }
            }
            _ => {}
        }
    }
    out
}

fn cell_value(cell: &Element, shared_strings: &[String]) -> CellValue {
    if let Some(formula) = cell.child("f") {
        return CellValue::Formula(formula.text());
    }

    let value = cell.child("v").map(|v| v.text());
    match cell.attr("t").unwrap_or("n") {
        "s" => value
            .and_then(|v| v.trim().parse::<usize>().ok())
            .and_then(|i| shared_strings.get(i).cloned())
            .map(CellValue::Text)
            .unwrap_or(CellValue::Empty),
        "inlineStr" => cell.child("is")
            .map(|is| CellValue::Text(string_item_text(is)))
            .unwrap_or(CellValue::Empty),
        "str" => value.map(CellValue::Text).unwrap_or(CellValue::Empty),
        "b" => value.map(|v| CellValue::Bool(v.trim() == "1")).unwrap_or(CellValue::Empty),
        "e" => value.map(CellValue::Error).unwrap_or(CellValue::Empty),
        _ => match value {
            Some(v) => v.trim().parse::<f64>()
                .map(CellValue::Number)
                .unwrap_or(CellValue::Text(v)),
            None => CellValue::Empty,
        },
    }
}

/// Turn `cell` into an inline string cell holding `text`
fn write_inline_string(cell: &mut Element, text: &str) {
    let prefix = cell.prefix().to_string();
    cell.set_attr("t", "inlineStr");
    let t = Element::new(format!("{}t", prefix))
        .with_attr("xml:space", "preserve")
        .with_text(text);
    cell.children = vec![Node::Element(Element::new(format!("{}is", prefix)).with_child(t))];
}

impl Worksheet for OoxmlSheet {
    fn name(&self) -> &str {
        &self.name
    }

    fn used_cells(&self) -> Vec<(CellAddress, CellValue)> {
        let Some(sheet_data) = self.doc.root.child("sheetData") else {
            return Vec::new();
        };
        let mut cells: Vec<(CellAddress, CellValue)> = self.cell_positions()
            .into_iter()
            .filter_map(|(address, ri, ci)| {
                let cell = sheet_data.descendant(&[ri, ci])?;
                let value = cell_value(cell, &self.shared_strings);
                (!value.is_empty()).then_some((address, value))
            })
            .collect();
        cells.sort_by(|a, b| a.0.cmp(&b.0));
        cells
    }

    fn set_cell_text(&mut self, address: &CellAddress, text: &str) -> Result<(), WorkbookError> {
        let sheet = self.name.clone();
        let cell = self.cell_mut(address).map_err(|e| WorkbookError::CellWrite {
            sheet,
            address: address.to_string(),
            message: e.to_string(),
        })?;
        write_inline_string(cell, text);
        self.dirty = true;
        Ok(())
    }

    fn shape_count(&self) -> Result<usize, WorkbookError> {
        Ok(self.drawing.as_ref()
            .map(|d| shape_paths(&d.doc.root).len())
            .unwrap_or(0))
    }

    fn shape(&mut self, index: usize) -> Result<Box<dyn Shape + '_>, WorkbookError> {
        let sheet = self.name.clone();
        let not_found = || WorkbookError::ShapeNotFound { sheet: sheet.clone(), index };

        let Some(drawing) = self.drawing.as_mut() else {
            return Err(not_found());
        };
        let paths = shape_paths(&drawing.doc.root);
        let path = index.checked_sub(1)
            .and_then(|i| paths.get(i))
            .ok_or_else(not_found)?;

        let DrawingPart { doc, dirty, .. } = drawing;
        let element = doc.root.descendant_mut(path).ok_or_else(not_found)?;
        Ok(Box::new(DrawingShape { element, dirty, index }))
    }
}

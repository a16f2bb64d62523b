/*!
 * Text fragment extraction from worksheets.
 *
 * A sheet yields its cell fragments first, in row-major order, followed by
 * its shape fragments in shape index order. That order is the only link
 * between a fragment and its translation, so it must not change between
 * extraction and reconciliation.
 */

use std::fmt;

use log::{debug, info, warn};

use crate::workbook::{probe_shape_text, CellAddress, Worksheet};
use super::text::{clean, is_eligible};

/// Where a fragment came from. Holds only what is needed to find the
/// origin again, never a live handle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceRef {
    /// A grid cell
    Cell {
        /// Zero-based sheet position in the workbook
        sheet: usize,
        address: CellAddress,
    },
    /// A drawing shape
    Shape {
        sheet: usize,
        /// 1-based index in the sheet's shape collection
        index: usize,
    },
}

impl SourceRef {
    pub fn sheet(&self) -> usize {
        match self {
            Self::Cell { sheet, .. } | Self::Shape { sheet, .. } => *sheet,
        }
    }
}

impl fmt::Display for SourceRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Cell { address, .. } => write!(f, "cell {}", address),
            Self::Shape { index, .. } => write!(f, "shape {}", index),
        }
    }
}

/// One unit of translatable text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextFragment {
    pub raw_text: String,
    pub cleaned_text: String,
    pub source_ref: SourceRef,
}

/// Collect the eligible fragments of one sheet
pub fn extract_sheet(sheet_index: usize, sheet: &mut dyn Worksheet) -> Vec<TextFragment> {
    let mut fragments = extract_cells(sheet_index, sheet);
    fragments.extend(extract_shapes(sheet_index, sheet));
    fragments
}

fn extract_cells(sheet_index: usize, sheet: &dyn Worksheet) -> Vec<TextFragment> {
    let cells = sheet.used_cells();
    if cells.is_empty() {
        info!("   Sheet '{}' is empty", sheet.name());
        return Vec::new();
    }

    cells.into_iter()
        .filter_map(|(address, value)| {
            let raw_text = value.to_text();
            let cleaned_text = clean(Some(&raw_text));
            is_eligible(&cleaned_text).then(|| TextFragment {
                raw_text,
                cleaned_text,
                source_ref: SourceRef::Cell { sheet: sheet_index, address },
            })
        })
        .collect()
}

fn extract_shapes(sheet_index: usize, sheet: &mut dyn Worksheet) -> Vec<TextFragment> {
    let count = match sheet.shape_count() {
        Ok(count) => count,
        Err(e) => {
            warn!("   Could not list shapes on sheet '{}': {}", sheet.name(), e);
            return Vec::new();
        }
    };
    info!("   Found {} shape(s) on sheet '{}'", count, sheet.name());

    let mut fragments = Vec::new();
    for index in 1..=count {
        let shape = match sheet.shape(index) {
            Ok(shape) => shape,
            Err(e) => {
                warn!("   Skipping shape {}: {}", index, e);
                continue;
            }
        };

        let Some((repr, raw_text)) = probe_shape_text(shape.as_ref()) else {
            debug!("   Shape {} ({}) has no text", index, shape.name());
            continue;
        };

        let cleaned_text = clean(Some(&raw_text));
        if !is_eligible(&cleaned_text) {
            continue;
        }
        let preview: String = cleaned_text.chars().take(30).collect();
        info!("   Found text in shape {} via {}: {}...", shape.name(), repr, preview);

        fragments.push(TextFragment {
            raw_text,
            cleaned_text,
            source_ref: SourceRef::Shape { sheet: sheet_index, index },
        });
    }
    fragments
}

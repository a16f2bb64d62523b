/*!
 * Write-back of translations to their origins.
 *
 * Translations are matched to source references by position. Shapes are
 * resolved again by index for every write, and each write failure is logged
 * and skipped so the rest of the batch still lands.
 */

use log::{debug, warn};

use crate::errors::WorkbookError;
use crate::workbook::{write_shape_text, Workbook};
use super::extract::SourceRef;

/// Counts of what happened to each position of a batch
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReconcileReport {
    pub written: usize,
    /// Positions with no translation
    pub missing: usize,
    pub failed: usize,
}

/// Write `translations[i]` to the origin of `source_refs[i]` for every position
pub fn apply(workbook: &mut dyn Workbook, source_refs: &[SourceRef], translations: &[String]) -> ReconcileReport {
    let mut report = ReconcileReport::default();

    for (position, source_ref) in source_refs.iter().enumerate() {
        let Some(translation) = translations.get(position) else {
            warn!("   No translation for {} at position {}, keeping original", source_ref, position);
            report.missing += 1;
            continue;
        };

        match write_one(workbook, source_ref, translation) {
            Ok(()) => report.written += 1,
            Err(e) => {
                warn!("   Could not update {}: {}", source_ref, e);
                report.failed += 1;
            }
        }
    }

    debug!(
        "Reconciled {} item(s): {} written, {} missing, {} failed",
        source_refs.len(),
        report.written,
        report.missing,
        report.failed
    );
    report
}

fn write_one(workbook: &mut dyn Workbook, source_ref: &SourceRef, text: &str) -> Result<(), WorkbookError> {
    let sheet = workbook.sheet(source_ref.sheet())?;
    match source_ref {
        SourceRef::Cell { address, .. } => sheet.set_cell_text(address, text),
        SourceRef::Shape { index, .. } => {
            let sheet_name = sheet.name().to_string();
            let mut shape = sheet.shape(*index)?;
            match write_shape_text(shape.as_mut(), text) {
                Ok(repr) => {
                    debug!("   Updated shape {} via {}", shape.name(), repr);
                    Ok(())
                }
                Err(exhausted) => Err(WorkbookError::CellWrite {
                    sheet: sheet_name,
                    address: format!("shape {}", index),
                    message: exhausted.to_string(),
                }),
            }
        }
    }
}

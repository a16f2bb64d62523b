/*!
 * Translation pipeline for workbook text.
 *
 * The pipeline runs once per sheet and is split into these submodules:
 *
 * - `text`: Whitespace normalization and eligibility rules
 * - `extract`: Fragment extraction from cells and shapes
 * - `batch`: Size-bounded batching of fragments
 * - `core`: Translation service and cardinality repair
 * - `reconcile`: Write-back of translations to their origins
 * - `prompts`: System prompt store and request prompt builder
 */

// Re-export main types for easier usage
pub use self::batch::{split_into_batches, Batch};
pub use self::core::{BatchOutcome, TranslationResult, TranslationService};
pub use self::extract::{extract_sheet, SourceRef, TextFragment};
pub use self::prompts::SystemPrompt;
pub use self::reconcile::ReconcileReport;

// Submodules
pub mod batch;
pub mod core;
pub mod extract;
pub mod prompts;
pub mod reconcile;
pub mod text;

/*!
 * # SheetWAI - Spreadsheet translation with AI
 *
 * A Rust library for translating the text of spreadsheet workbooks between
 * Vietnamese and Japanese with an LLM, in place, keeping formatting intact.
 *
 * ## Features
 *
 * - Extract text from cells and from shapes (text frames, alternative text,
 *   WordArt) in a stable order
 * - Skip numbers, formulas and single characters
 * - Translate in size-bounded batches using the `|||` delimiter
 * - Repair replies whose segment count does not match the request
 * - Write translations back to their exact origin and save a copy
 * - Translation providers:
 *   - OpenAI-compatible chat completions (Gemini by default)
 *   - Anthropic API
 *
 * ## Architecture
 *
 * The library is organized in these main modules:
 * - `app_config`: Configuration management
 * - `app_controller`: Per-workbook state machine and directory driver
 * - `translation`: The translation pipeline:
 *   - `translation::text`: Normalization and eligibility rules
 *   - `translation::extract`: Fragment extraction
 *   - `translation::batch`: Batching
 *   - `translation::core`: Translation service and cardinality repair
 *   - `translation::reconcile`: Write-back
 * - `workbook`: Spreadsheet object model and its `ooxml` and `memory` backends
 * - `file_utils`: File system operations
 * - `language`: Translation directions
 * - `providers`: Client implementations for LLM providers
 * - `errors`: Custom error types for the application
 *
 * ## License
 *
 * This project is licensed under the MIT License
 */

// Global lints configuration
// These lints will be allowed but not auto-fixed
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::redundant_closure_for_method_calls)]

// Public modules
pub mod app_config;
pub mod app_controller;
pub mod errors;
pub mod file_utils;
pub mod language;
pub mod providers;
pub mod translation;
pub mod workbook;

// Re-export main types for easier usage
pub use app_config::Config;
pub use app_controller::{Controller, FolderReport};
pub use errors::{AppError, ProviderError, ShapeTextError, WorkbookError};
pub use language::TranslationDirection;
pub use translation::TranslationService;

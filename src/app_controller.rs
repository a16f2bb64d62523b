use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use log::{debug, error, info, warn};
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::app_config::Config;
use crate::errors::AppError;
use crate::file_utils::FileManager;
use crate::language::TranslationDirection;
use crate::translation::{extract_sheet, reconcile, split_into_batches, BatchOutcome, TranslationService};
use crate::workbook::{HostFactory, HostGuard, Workbook};

// @module: Application controller for workbook processing

/// Steps a workbook goes through; the per-sheet steps repeat for every sheet
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Opened,
    Extracting,
    Batching,
    Translating,
    Reconciling,
    Saving,
    Closed,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Opened => "opened",
            Self::Extracting => "extracting",
            Self::Batching => "batching",
            Self::Translating => "translating",
            Self::Reconciling => "reconciling",
            Self::Saving => "saving",
            Self::Closed => "closed",
        };
        f.write_str(name)
    }
}

/// Outcome of a directory run, by file name
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FolderReport {
    pub successful: Vec<String>,
    pub failed: Vec<String>,
}

impl FolderReport {
    pub fn total(&self) -> usize {
        self.successful.len() + self.failed.len()
    }
}

/// Main application controller for workbook translation
pub struct Controller {
    // @field: App configuration
    config: Config,

    // @field: Translation service shared by every file of the run
    translator: TranslationService,

    // @field: Starts one spreadsheet host per file
    hosts: Arc<dyn HostFactory>,

    // @field: Progress display for files and batches
    multi_progress: MultiProgress,
}

impl Controller {
    // @method: Create a new controller
    pub fn new(config: Config, translator: TranslationService, hosts: Arc<dyn HostFactory>) -> Self {
        Self {
            config,
            translator,
            hosts,
            multi_progress: MultiProgress::new(),
        }
    }

    /// Translate one workbook and save it under the output directory.
    /// The spreadsheet host is shut down on every path out of this method.
    pub async fn run_file(&self, input_file: &Path, direction: TranslationDirection) -> Result<PathBuf, AppError> {
        info!("📖 Processing file: {}", input_file.display());

        let host = self.hosts.launch().map_err(|e| {
            error!("Error processing {}: {}", input_file.display(), e);
            AppError::from(e)
        })?;
        let mut guard = HostGuard::new(host);

        let mut workbook = match guard.host().open(input_file) {
            Ok(workbook) => workbook,
            Err(e) => {
                error!("Error processing {}: {}", input_file.display(), e);
                return Err(e.into());
            }
        };
        Self::enter(Stage::Opened, input_file);

        let result = self.process_workbook(workbook.as_mut(), input_file, direction).await;
        workbook.close();
        guard.release();
        Self::enter(Stage::Closed, input_file);

        match &result {
            Ok(output_path) => info!("✅ Saved translated file: {}", output_path.display()),
            Err(e) => error!("Error processing {}: {}", input_file.display(), e),
        }
        result
    }

    async fn process_workbook(
        &self,
        workbook: &mut dyn Workbook,
        input_file: &Path,
        direction: TranslationDirection,
    ) -> Result<PathBuf, AppError> {
        for sheet_index in 0..workbook.sheet_count() {
            self.process_sheet(workbook, sheet_index, input_file, direction).await?;
        }

        Self::enter(Stage::Saving, input_file);
        FileManager::ensure_dir(&self.config.output_dir)
            .map_err(|e| AppError::File(e.to_string()))?;
        let output_path = FileManager::output_path(&self.config.output_dir, input_file);
        workbook.save_as(&output_path)?;
        Ok(output_path)
    }

    async fn process_sheet(
        &self,
        workbook: &mut dyn Workbook,
        sheet_index: usize,
        input_file: &Path,
        direction: TranslationDirection,
    ) -> Result<(), AppError> {
        Self::enter(Stage::Extracting, input_file);
        let sheet = workbook.sheet(sheet_index)?;
        let sheet_name = sheet.name().to_string();
        info!("📄 Processing sheet: {}", sheet_name);
        let fragments = extract_sheet(sheet_index, sheet);

        if fragments.is_empty() {
            info!("   No text to translate in sheet '{}'", sheet_name);
            return Ok(());
        }

        Self::enter(Stage::Batching, input_file);
        let batches = split_into_batches(&fragments, self.config.translation.common.batch_size);
        info!("   {} text item(s) in {} batch(es)", fragments.len(), batches.len());

        let progress_bar = self.multi_progress.add(ProgressBar::new(batches.len() as u64));
        progress_bar.set_style(Self::bar_style("batches"));
        progress_bar.set_message(sheet_name.clone());

        let total = batches.len();
        for batch in &batches {
            info!("   Processing batch {}/{}", batch.index + 1, total);

            Self::enter(Stage::Translating, input_file);
            let result = self.translator.translate_batch(batch, direction).await;
            if let BatchOutcome::Failed(reason) = &result.outcome {
                warn!("   Batch {}/{} kept its original text: {}", batch.index + 1, total, reason);
            }

            Self::enter(Stage::Reconciling, input_file);
            reconcile::apply(workbook, &batch.source_refs(), &result.texts);
            progress_bar.inc(1);
        }

        progress_bar.finish_and_clear();
        self.multi_progress.remove(&progress_bar);
        Ok(())
    }

    /// Translate every workbook in `input_dir`, one at a time.
    /// A failing file is recorded and the run moves on to the next one.
    pub async fn run_folder(&self, input_dir: &Path, direction: TranslationDirection) -> Result<FolderReport, AppError> {
        if !FileManager::dir_exists(input_dir) {
            error!("Directory {} does not exist", input_dir.display());
            return Err(AppError::DirectoryMissing(input_dir.to_path_buf()));
        }

        let files = FileManager::find_workbooks(input_dir, &self.config.file_extensions)
            .map_err(|e| AppError::File(e.to_string()))?;
        info!("Found {} workbook file(s)", files.len());

        let mut report = FolderReport::default();
        if files.is_empty() {
            warn!("No workbook files found in {}", input_dir.display());
            return Ok(report);
        }

        let folder_pb = self.multi_progress.add(ProgressBar::new(files.len() as u64));
        folder_pb.set_style(Self::bar_style("files"));

        for file in &files {
            let file_name = file.file_name()
                .map(|f| f.to_string_lossy().to_string())
                .unwrap_or_else(|| file.display().to_string());
            folder_pb.set_message(file_name.clone());

            match self.run_file(file, direction).await {
                Ok(_) => report.successful.push(file_name),
                Err(_) => report.failed.push(file_name),
            }
            folder_pb.inc(1);
        }
        folder_pb.finish_and_clear();

        info!("📊 Processing summary:");
        info!("✅ Successful: {} files", report.successful.len());
        if !report.failed.is_empty() {
            warn!("❌ Failed: {} files: {}", report.failed.len(), report.failed.join(", "));
        }

        Ok(report)
    }

    fn enter(stage: Stage, input_file: &Path) {
        debug!("{}: {}", input_file.display(), stage);
    }

    fn bar_style(unit: &str) -> ProgressStyle {
        ProgressStyle::default_bar()
            .template(&format!("{{spinner:.green}} [{{elapsed_precise}}] [{{bar:40.cyan/blue}}] {{pos}}/{{len}} {} ({{percent}}%) {{msg}}", unit))
            .or_else(|_| ProgressStyle::default_bar().template("{spinner} [{elapsed_precise}] [{bar:40}] {pos}/{len} ({percent}%) {msg}"))
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("█▓▒░")
    }
}

// @formats: Duration as h/m/s for the end-of-run report
pub fn format_duration(duration: std::time::Duration) -> String {
    let total_seconds = duration.as_secs();
    let hours = total_seconds / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let seconds = total_seconds % 60;

    if hours > 0 {
        format!("{}h {}m {}s", hours, minutes, seconds)
    } else if minutes > 0 {
        format!("{}m {}s", minutes, seconds)
    } else {
        format!("{}.{:03}s", seconds, duration.subsec_millis())
    }
}

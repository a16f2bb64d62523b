use anyhow::{Context, Result};
use log::info;
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

// @module: File and directory utilities

/// Prefix of the transient lock files a spreadsheet application leaves next to an open workbook
pub const LOCK_FILE_PREFIX: &str = "~$";

/// Suffix added to the stem of every translated workbook
pub const OUTPUT_SUFFIX: &str = "-translated";

// @struct: File operations utility
pub struct FileManager;

impl FileManager {
    // @checks: Directory existence
    pub fn dir_exists<P: AsRef<Path>>(path: P) -> bool {
        path.as_ref().exists() && path.as_ref().is_dir()
    }

    // @creates: Directory and parents if needed
    pub fn ensure_dir<P: AsRef<Path>>(path: P) -> Result<()> {
        let path = path.as_ref();
        if !path.exists() {
            fs::create_dir_all(path)
                .with_context(|| format!("Failed to create directory: {:?}", path))?;
        }
        Ok(())
    }

    // @generates: Output path for a translated workbook
    // @params: output_dir, input_file
    // @returns: <output_dir>/<stem>-translated<ext>
    pub fn output_path<P1: AsRef<Path>, P2: AsRef<Path>>(output_dir: P1, input_file: P2) -> PathBuf {
        let input_file = input_file.as_ref();
        let stem = input_file.file_stem().unwrap_or_default().to_string_lossy();

        let mut output_filename = format!("{}{}", stem, OUTPUT_SUFFIX);
        if let Some(ext) = input_file.extension() {
            output_filename.push('.');
            output_filename.push_str(&ext.to_string_lossy());
        }

        output_dir.as_ref().join(output_filename)
    }

    /// Whether a file name belongs to a spreadsheet lock file
    pub fn is_lock_file(path: &Path) -> bool {
        path.file_name()
            .map(|name| name.to_string_lossy().starts_with(LOCK_FILE_PREFIX))
            .unwrap_or(false)
    }

    /// Workbooks directly inside `dir` whose extension is one of `extensions`
    /// (case-insensitive, with or without a leading dot), sorted by path.
    /// Lock files are logged and left out.
    pub fn find_workbooks<P: AsRef<Path>>(dir: P, extensions: &[String]) -> Result<Vec<PathBuf>> {
        let wanted: Vec<String> = extensions.iter()
            .map(|e| e.trim().trim_start_matches('.').to_lowercase())
            .filter(|e| !e.is_empty())
            .collect();

        let mut result = Vec::new();
        for entry in WalkDir::new(dir.as_ref()).min_depth(1).max_depth(1).follow_links(true) {
            let entry = entry.context("Failed to read directory entry")?;
            let path = entry.path();
            if !path.is_file() {
                continue;
            }

            let matches = path.extension()
                .map(|ext| wanted.contains(&ext.to_string_lossy().to_lowercase()))
                .unwrap_or(false);
            if !matches {
                continue;
            }

            if Self::is_lock_file(path) {
                info!("Skipping temporary file: {}", path.display());
                continue;
            }
            result.push(path.to_path_buf());
        }

        result.sort();
        Ok(result)
    }
}

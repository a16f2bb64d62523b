/*!
 * Tests for directory runs: discovery, per-file isolation and reporting
 */

use std::fs;
use std::sync::Arc;

use sheetwai::errors::AppError;
use sheetwai::language::TranslationDirection;
use sheetwai::providers::mock::MockProvider;
use sheetwai::workbook::memory::{MemorySheet, MemoryStore};
use sheetwai::workbook::ooxml::OoxmlHostFactory;
use sheetwai::workbook::CellValue;
use sheetwai::FolderReport;

use crate::common::{self, mock_controller, FixtureCell, XlsxBuilder};

#[tokio::test]
async fn test_folderRun_shouldIsolateFailingFile() {
    common::init_test_logging();
    let dir = common::create_temp_dir().unwrap();
    let config = common::test_config(dir.path());
    fs::create_dir_all(&config.input_dir).unwrap();
    for name in ["file1.xlsx", "file2.xlsx", "file3.xlsx"] {
        common::create_test_file(&config.input_dir, name, b"placeholder").unwrap();
    }

    let store = MemoryStore::new();
    store.insert("file1.xlsx", vec![MemorySheet::new("Sheet1").with_text("A1", "Một")]);
    store.insert("file2.xlsx", vec![MemorySheet::new("Sheet1").with_text("A1", "Hai")]);
    store.insert("file3.xlsx", vec![MemorySheet::new("Sheet1").with_text("A1", "Ba")]);
    store.fail_open("file2.xlsx");

    let input_dir = config.input_dir.clone();
    let output_dir = config.output_dir.clone();
    let controller = mock_controller(config, MockProvider::working(), Arc::new(store.clone()));
    let report = controller.run_folder(&input_dir, TranslationDirection::Ja).await.unwrap();

    assert_eq!(report, FolderReport {
        successful: vec!["file1.xlsx".to_string(), "file3.xlsx".to_string()],
        failed: vec!["file2.xlsx".to_string()],
    });
    assert_eq!(store.opened(), vec!["file1.xlsx", "file2.xlsx", "file3.xlsx"]);
    assert_eq!(store.launch_count(), 3);
    assert_eq!(store.quit_count(), 3);

    let third = store.saved(&output_dir.join("file3-translated.xlsx")).unwrap();
    assert_eq!(third[0].cell("A1"), Some(&CellValue::Text("[TRANSLATED] Ba".to_string())));
    assert!(store.saved(&output_dir.join("file2-translated.xlsx")).is_none());
}

#[tokio::test]
async fn test_folderRun_shouldSkipLockFilesAndOtherExtensions() {
    let dir = common::create_temp_dir().unwrap();
    let config = common::test_config(dir.path());
    fs::create_dir_all(&config.input_dir).unwrap();
    for name in ["book.xlsx", "~$book.xlsx", "notes.txt"] {
        common::create_test_file(&config.input_dir, name, b"placeholder").unwrap();
    }

    let store = MemoryStore::new();
    store.insert("book.xlsx", vec![MemorySheet::new("Sheet1").with_text("A1", "Xin chào")]);

    let input_dir = config.input_dir.clone();
    let controller = mock_controller(config, MockProvider::working(), Arc::new(store.clone()));
    let report = controller.run_folder(&input_dir, TranslationDirection::Ja).await.unwrap();

    assert_eq!(report.successful, vec!["book.xlsx"]);
    assert_eq!(report.total(), 1);
    assert_eq!(store.opened(), vec!["book.xlsx"]);
}

#[tokio::test]
async fn test_folderRun_shouldReturnEmptyReportForEmptyDirectory() {
    let dir = common::create_temp_dir().unwrap();
    let config = common::test_config(dir.path());
    fs::create_dir_all(&config.input_dir).unwrap();

    let input_dir = config.input_dir.clone();
    let mock = MockProvider::working();
    let controller = mock_controller(config, mock.clone(), Arc::new(MemoryStore::new()));
    let report = controller.run_folder(&input_dir, TranslationDirection::Ja).await.unwrap();

    assert_eq!(report, FolderReport::default());
    assert_eq!(mock.request_count(), 0);
}

#[tokio::test]
async fn test_folderRun_shouldFailForMissingDirectory() {
    let dir = common::create_temp_dir().unwrap();
    let config = common::test_config(dir.path());
    let input_dir = config.input_dir.clone();
    let controller = mock_controller(config, MockProvider::working(), Arc::new(MemoryStore::new()));

    let result = controller.run_folder(&input_dir, TranslationDirection::Ja).await;
    assert!(matches!(result, Err(AppError::DirectoryMissing(path)) if path == input_dir));
}

#[tokio::test]
async fn test_folderRun_withXlsxFiles_shouldReportLegacyAndCorruptFilesAsFailed() {
    let dir = common::create_temp_dir().unwrap();
    let config = common::test_config(dir.path());
    fs::create_dir_all(&config.input_dir).unwrap();

    XlsxBuilder::new()
        .sheet("Sheet1", &[("A1", FixtureCell::Text("Xin chào"))])
        .write(&config.input_dir.join("a.xlsx"))
        .unwrap();
    common::create_test_file(&config.input_dir, "b.xls", b"\xD0\xCF\x11\xE0").unwrap();
    common::create_test_file(&config.input_dir, "c.xlsx", b"broken").unwrap();

    let input_dir = config.input_dir.clone();
    let output_dir = config.output_dir.clone();
    let controller = mock_controller(config, MockProvider::working(), Arc::new(OoxmlHostFactory));
    let report = controller.run_folder(&input_dir, TranslationDirection::Vi).await.unwrap();

    assert_eq!(report.successful, vec!["a.xlsx"]);
    assert_eq!(report.failed, vec!["b.xls", "c.xlsx"]);
    assert!(output_dir.join("a-translated.xlsx").exists());
    assert!(!output_dir.join("c-translated.xlsx").exists());
}

#[tokio::test]
async fn test_folderRun_whenHostCannotStart_shouldMarkEveryFileFailed() {
    let dir = common::create_temp_dir().unwrap();
    let config = common::test_config(dir.path());
    fs::create_dir_all(&config.input_dir).unwrap();
    for name in ["a.xlsx", "b.xlsx"] {
        common::create_test_file(&config.input_dir, name, b"placeholder").unwrap();
    }

    let store = MemoryStore::new();
    store.insert("a.xlsx", vec![MemorySheet::new("Sheet1").with_text("A1", "Một")]);
    store.fail_launch("spreadsheet application not installed");

    let input_dir = config.input_dir.clone();
    let mock = MockProvider::working();
    let controller = mock_controller(config, mock.clone(), Arc::new(store.clone()));
    let report = controller.run_folder(&input_dir, TranslationDirection::Ja).await.unwrap();

    assert!(report.successful.is_empty());
    assert_eq!(report.failed, vec!["a.xlsx", "b.xlsx"]);
    assert!(store.opened().is_empty());
    assert_eq!(store.quit_count(), 0);
    assert_eq!(mock.request_count(), 0);
}

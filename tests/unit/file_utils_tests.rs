/*!
 * Tests for file discovery and output naming
 */

use std::path::{Path, PathBuf};

use sheetwai::file_utils::FileManager;

use crate::common;

#[test]
fn test_outputPath_shouldAppendTranslatedSuffix() {
    assert_eq!(
        FileManager::output_path("out", Path::new("in/bao-cao.xlsm")),
        PathBuf::from("out/bao-cao-translated.xlsm")
    );
    assert_eq!(
        FileManager::output_path("out", Path::new("in/README")),
        PathBuf::from("out/README-translated")
    );
}

#[test]
fn test_findWorkbooks_shouldSkipLockFiles() {
    let dir = common::create_temp_dir().unwrap();
    for name in ["report.xlsx", "~$report.xlsx", "data.csv"] {
        common::create_test_file(dir.path(), name, b"x").unwrap();
    }

    let found = FileManager::find_workbooks(dir.path(), &["xlsx".to_string()]).unwrap();
    assert_eq!(found, vec![dir.path().join("report.xlsx")]);
    assert!(FileManager::is_lock_file(Path::new("~$report.xlsx")));
}

#[test]
fn test_ensureDir_shouldCreateNestedDirectories() {
    let dir = common::create_temp_dir().unwrap();
    let nested = dir.path().join("a").join("b");
    FileManager::ensure_dir(&nested).unwrap();
    assert!(FileManager::dir_exists(&nested));
    FileManager::ensure_dir(&nested).unwrap();
}

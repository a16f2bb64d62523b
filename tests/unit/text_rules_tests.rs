/*!
 * Tests for text normalization, eligibility and batching
 */

use sheetwai::translation::batch::split_into_batches;
use sheetwai::translation::text::{clean, is_eligible};
use sheetwai::translation::{SourceRef, TextFragment};
use sheetwai::workbook::CellAddress;

fn fragments(n: usize) -> Vec<TextFragment> {
    (0..n)
        .map(|i| TextFragment {
            raw_text: format!(" item {} ", i),
            cleaned_text: format!("item {}", i),
            source_ref: SourceRef::Cell { sheet: 0, address: CellAddress::new(i as u32, 1) },
        })
        .collect()
}

#[test]
fn test_clean_shouldCollapseWhitespace() {
    assert_eq!(clean(Some("  a   b  ")), "a b");
    assert_eq!(clean(Some("line one\n\tline two")), "line one line two");
    assert_eq!(clean(None), "");
}

#[test]
fn test_isEligible_shouldRejectNumbersFormulasAndSingleCharacters() {
    assert!(!is_eligible("123,456.00"));
    assert!(!is_eligible("=SUM(A1:A2)"));
    assert!(!is_eligible("A"));
    assert!(!is_eligible(""));
    assert!(!is_eligible("- 1 -"));
    assert!(is_eligible("Hello"));
    assert!(is_eligible("Tầng 3"));
    assert!(is_eligible("日本"));
}

#[test]
fn test_split_shouldPreserveOrderAndRespectCeiling() {
    for n in [0usize, 1, 2, 7, 100, 101, 250] {
        for k in [1usize, 3, 100] {
            let items = fragments(n);
            let batches = split_into_batches(&items, k);

            assert_eq!(batches.len(), n.div_ceil(k), "n={} k={}", n, k);
            assert!(batches.iter().all(|b| b.len() <= k && !b.is_empty()));

            let rejoined: Vec<SourceRef> = batches.iter().flat_map(|b| b.source_refs()).collect();
            let original: Vec<SourceRef> = items.iter().map(|f| f.source_ref.clone()).collect();
            assert_eq!(rejoined, original);
        }
    }
}

#[test]
fn test_batchTexts_shouldUseCleanedText() {
    let items = fragments(3);
    let batches = split_into_batches(&items, 2);
    assert_eq!(batches[0].texts(), vec!["item 0", "item 1"]);
    assert_eq!(batches[1].index, 1);
}

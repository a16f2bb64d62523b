/*!
 * Tests for the translation service: request shape, cardinality repair and failure handling
 */

use std::time::{Duration, Instant};

use sheetwai::language::TranslationDirection;
use sheetwai::providers::mock::{MockProvider, MockRequest};
use sheetwai::translation::core::{repair_cardinality, split_response};
use sheetwai::translation::{BatchOutcome, SystemPrompt, TranslationService};

fn texts(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

fn five() -> Vec<String> {
    texts(&["một", "hai", "ba", "bốn", "năm"])
}

#[tokio::test]
async fn test_shortResponse_shouldPadWithOriginals() {
    let service = TranslationService::with_mock(MockProvider::dropping(2), SystemPrompt::default());
    let result = service.translate_texts(&five(), TranslationDirection::Ja).await;

    assert_eq!(result.texts.len(), 5);
    assert_eq!(&result.texts[..3], &texts(&["[TRANSLATED] một", "[TRANSLATED] hai", "[TRANSLATED] ba"])[..]);
    assert_eq!(result.texts[3], "bốn");
    assert_eq!(result.texts[4], "năm");
    assert_eq!(result.outcome, BatchOutcome::Repaired { expected: 5, received: 3 });
}

#[tokio::test]
async fn test_longResponse_shouldTruncateExtras() {
    let service = TranslationService::with_mock(MockProvider::extra(2), SystemPrompt::default());
    let result = service.translate_texts(&five(), TranslationDirection::Ja).await;

    assert_eq!(result.texts.len(), 5);
    assert!(result.texts.iter().all(|t| t.starts_with("[TRANSLATED]")));
    assert_eq!(result.outcome, BatchOutcome::Repaired { expected: 5, received: 7 });
}

#[tokio::test]
async fn test_failingProvider_shouldReturnOriginalsUnchanged() {
    let mock = MockProvider::failing();
    let service = TranslationService::with_mock(mock.clone(), SystemPrompt::default());
    let result = service.translate_texts(&five(), TranslationDirection::Vi).await;

    assert_eq!(result.texts, five());
    assert!(matches!(result.outcome, BatchOutcome::Failed(_)));
    assert_eq!(mock.request_count(), 1, "a failed batch is not retried");
}

#[tokio::test]
async fn test_intermittentProvider_shouldOnlyAffectFailingBatch() {
    let service = TranslationService::with_mock(MockProvider::intermittent(2), SystemPrompt::default());

    let first = service.translate_texts(&texts(&["Hello"]), TranslationDirection::Ja).await;
    let second = service.translate_texts(&texts(&["World"]), TranslationDirection::Ja).await;
    let third = service.translate_texts(&texts(&["Again"]), TranslationDirection::Ja).await;

    assert_eq!(first.texts, texts(&["[TRANSLATED] Hello"]));
    assert_eq!(second.texts, texts(&["World"]));
    assert_eq!(third.texts, texts(&["[TRANSLATED] Again"]));
}

#[tokio::test]
async fn test_delay_shouldApplyAfterSuccessAndFailure() {
    let delay = Duration::from_millis(40);
    for mock in [MockProvider::working(), MockProvider::failing()] {
        let service = TranslationService::with_mock(mock, SystemPrompt::default()).with_request_delay(delay);
        let start = Instant::now();
        service.translate_texts(&texts(&["Hello"]), TranslationDirection::Ja).await;
        assert!(start.elapsed() >= delay);
    }
}

#[tokio::test]
async fn test_customDelimiter_shouldBeUsedForRequestAndReply() {
    let mock = MockProvider::working().with_delimiter("<SEP>");
    let service = TranslationService::with_mock(mock.clone(), SystemPrompt::default()).with_delimiter("<SEP>");
    let result = service.translate_texts(&texts(&["a|||b", "c"]), TranslationDirection::Ja).await;

    assert_eq!(result.texts, texts(&["[TRANSLATED] a|||b", "[TRANSLATED] c"]));
    let requests: Vec<MockRequest> = mock.requests();
    assert!(requests[0].user_prompt.contains("keeping segments separated by '<SEP>'"));
}

#[tokio::test]
async fn test_userPrompt_shouldNameDirection() {
    let mock = MockProvider::working();
    let service = TranslationService::with_mock(mock.clone(), SystemPrompt::default());
    service.translate_texts(&texts(&["こんにちは", "世界"]), TranslationDirection::Vi).await;

    let request = &mock.requests()[0];
    assert_eq!(
        request.user_prompt,
        "Translate the following text from Japanese to Vietnamese, keeping segments separated by '|||':\n\nこんにちは|||世界"
    );
    assert_eq!(request.system_prompt, SystemPrompt::default().as_str());
}

#[test]
fn test_connectionCheck_shouldReflectProviderHealth() {
    let healthy = TranslationService::with_mock(MockProvider::working(), SystemPrompt::default());
    let broken = TranslationService::with_mock(MockProvider::failing(), SystemPrompt::default());
    assert!(tokio_test::block_on(healthy.test_connection()).is_ok());
    assert!(tokio_test::block_on(broken.test_connection()).is_err());
}

#[test]
fn test_repairCardinality_shouldAlwaysMatchInputLength() {
    let originals = five();
    for received in 0..=8 {
        let translated: Vec<String> = (0..received).map(|i| format!("T{}", i)).collect();
        let repaired = repair_cardinality(&originals, translated);
        assert_eq!(repaired.len(), originals.len());
        for (i, text) in repaired.iter().enumerate() {
            if i < received {
                assert_eq!(text, &format!("T{}", i));
            } else {
                assert_eq!(text, &originals[i]);
            }
        }
    }
}

#[test]
fn test_splitResponse_shouldKeepEmptySegments() {
    assert_eq!(split_response("A||||||C", "|||"), texts(&["A", "", "C"]));
}

/*!
 * Tests for configuration loading and validation
 */

use std::fs;

use sheetwai::app_config::{Config, LogLevel, TranslationProvider};
use sheetwai::language::TranslationDirection;

use crate::common;

#[test]
fn test_loadOrCreate_shouldWriteDefaultsWhenMissing() {
    let dir = common::create_temp_dir().unwrap();
    let path = dir.path().join("conf.json");

    let config = Config::load_or_create(&path).unwrap();
    assert!(path.exists());
    assert_eq!(config.target_language, TranslationDirection::Ja);

    let written: serde_json::Value = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(written["translation"]["common"]["delimiter"], "|||");
    assert_eq!(written["translation"]["common"]["batch_size"], 100);
}

#[test]
fn test_loadOrCreate_shouldReadExistingFile() {
    let dir = common::create_temp_dir().unwrap();
    let path = common::create_test_file(dir.path(), "conf.json", br#"{
        "target_language": "vi",
        "log_level": "debug",
        "translation": {
            "provider": "anthropic",
            "available_providers": [
                { "type": "anthropic", "model": "claude-3-5-haiku-latest", "api_key": "sk-test" }
            ],
            "common": { "batch_size": 25, "rate_limit_delay_ms": 0 }
        }
    }"#).unwrap();

    let config = Config::load_or_create(&path).unwrap();
    assert_eq!(config.target_language, TranslationDirection::Vi);
    assert_eq!(config.log_level, LogLevel::Debug);
    assert_eq!(config.translation.provider, TranslationProvider::Anthropic);
    assert_eq!(config.translation.get_model(), "claude-3-5-haiku-latest");
    assert_eq!(config.translation.get_api_key(), "sk-test");
    assert_eq!(config.translation.get_endpoint(), "https://api.anthropic.com");
    assert_eq!(config.translation.common.batch_size, 25);
    assert_eq!(config.translation.common.delimiter, "|||");
    assert!(config.validate().is_ok());
}

#[test]
fn test_loadOrCreate_shouldRejectMalformedJson() {
    let dir = common::create_temp_dir().unwrap();
    let path = common::create_test_file(dir.path(), "conf.json", b"{ not json").unwrap();
    assert!(Config::load_or_create(&path).is_err());
}

#[test]
fn test_validate_shouldRejectOutOfRangeTemperature() {
    let mut config = Config::default();
    config.translation.common.temperature = Some(3.5);
    assert!(config.validate().is_err());

    config.translation.common.temperature = Some(0.3);
    assert!(config.validate().is_ok());
}

#[test]
fn test_providerFromStr_shouldAcceptGeminiAlias() {
    assert_eq!("gemini".parse::<TranslationProvider>().unwrap(), TranslationProvider::OpenAI);
    assert_eq!("Anthropic".parse::<TranslationProvider>().unwrap(), TranslationProvider::Anthropic);
    assert!("ollama".parse::<TranslationProvider>().is_err());
}

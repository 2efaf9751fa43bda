//! End-to-end behavior of the triage pipeline through its public handle.

use std::fs;
use tempfile::TempDir;
use triage_core::core::types::Category;
use triage_core::{Level, Provenance, TicketQuery, TriageConfig, TriageEngine, TriageError};

fn config_in(dir: &TempDir) -> TriageConfig {
    TriageConfig { model_path: dir.path().join("model.joblib"), ..TriageConfig::default() }
}

#[test]
fn trains_and_persists_when_artifact_is_missing() {
    let dir = TempDir::new().unwrap();
    let config = config_in(&dir);

    let engine = TriageEngine::load_or_train(&config);
    assert!(engine.is_ready());
    assert_eq!(engine.provenance(), Some(&Provenance::Trained { persisted: true }));
    assert!(config.model_path.exists());
}

#[test]
fn reload_skips_training_and_matches_predictions() {
    let dir = TempDir::new().unwrap();
    let config = config_in(&dir);
    let trained = TriageEngine::load_or_train(&config);

    let tickets = [
        ("Laptop overheating", "fan making loud noise, down for now"),
        ("VPN", "keeps disconnecting every hour"),
        ("Forgot my password", "please help"),
        ("", ""),
    ];
    let before: Vec<_> = tickets.iter().map(|(t, d)| trained.classify(t, d).unwrap()).collect();
    let scores_before = trained.scores("Outlook crashing on startup").unwrap();

    let reloaded = TriageEngine::load_or_train(&config);
    assert_eq!(reloaded.provenance(), Some(&Provenance::Loaded));
    let after: Vec<_> = tickets.iter().map(|(t, d)| reloaded.classify(t, d).unwrap()).collect();
    assert_eq!(before, after);
    assert_eq!(scores_before, reloaded.scores("Outlook crashing on startup").unwrap());
}

#[test]
fn laptop_overheating_is_high_priority_hardware() {
    let dir = TempDir::new().unwrap();
    let engine = TriageEngine::load_or_train(&config_in(&dir));

    let query = TicketQuery::new("Laptop overheating", "fan making loud noise, down for now");
    let result = engine.classify_query(&query).unwrap();
    assert_eq!(result.category, Category::Hardware);
    assert_eq!(result.priority, Level::High);

    let scores = engine.scores(&query.full_text()).unwrap();
    let expected = triage_core::heuristics::confidence(&scores);
    assert_eq!(result.confidence, expected);
}

#[test]
fn missing_model_without_training_is_unavailable() {
    let dir = TempDir::new().unwrap();
    let config = TriageConfig { train_if_missing: false, ..config_in(&dir) };

    let engine = TriageEngine::load_or_train(&config);
    assert!(!engine.is_ready());
    assert!(!config.model_path.exists());
    assert!(matches!(
        engine.classify("Mouse not working", ""),
        Err(TriageError::ModelUnavailable(_))
    ));
}

#[test]
fn corrupt_artifact_is_unavailable_not_retrained() {
    let dir = TempDir::new().unwrap();
    let config = config_in(&dir);
    fs::write(&config.model_path, b"garbage").unwrap();

    let engine = TriageEngine::load_or_train(&config);
    assert!(!engine.is_ready());
    assert!(engine.unavailable_reason().unwrap().contains("cannot load"));
    assert_eq!(fs::read(&config.model_path).unwrap(), b"garbage");
}

#[test]
fn artifact_with_impossible_ngram_order_is_unavailable() {
    let dir = TempDir::new().unwrap();
    let config = config_in(&dir);
    TriageEngine::load_or_train(&config);

    let mut bytes = fs::read(&config.model_path).unwrap();
    bytes[16..24].copy_from_slice(&u64::MAX.to_le_bytes());
    fs::write(&config.model_path, &bytes).unwrap();

    let engine = TriageEngine::load_or_train(&config);
    assert!(!engine.is_ready());
    assert!(engine.unavailable_reason().unwrap().contains("n-gram range"));
}

#[test]
fn artifact_with_huge_length_prefix_is_unavailable() {
    let dir = TempDir::new().unwrap();
    let config = config_in(&dir);
    TriageEngine::load_or_train(&config);

    // Keep the header and analyzer, then claim one vocabulary term of absurd length.
    let mut bytes = fs::read(&config.model_path).unwrap();
    bytes.truncate(25);
    bytes.extend_from_slice(&1u64.to_le_bytes());
    bytes.extend_from_slice(&(u64::MAX / 2).to_le_bytes());
    fs::write(&config.model_path, &bytes).unwrap();

    let engine = TriageEngine::load_or_train(&config);
    assert!(!engine.is_ready());
    assert!(matches!(engine.classify("Mouse", ""), Err(TriageError::ModelUnavailable(_))));
}

#[test]
fn unwritable_path_keeps_model_in_memory() {
    let dir = TempDir::new().unwrap();
    let blocker = dir.path().join("not_a_dir");
    fs::write(&blocker, b"file").unwrap();
    let config =
        TriageConfig { model_path: blocker.join("model.joblib"), ..TriageConfig::default() };

    let engine = TriageEngine::load_or_train(&config);
    assert_eq!(engine.provenance(), Some(&Provenance::Trained { persisted: false }));
    assert!(engine.classify("Printer jamming", "").is_ok());
}

#[test]
fn unknown_vocabulary_still_gets_a_category() {
    let dir = TempDir::new().unwrap();
    let engine = TriageEngine::load_or_train(&config_in(&dir));

    let first = engine.classify("qwxz", "zzzz yyyy").unwrap();
    let second = engine.classify("plugh", "xyzzy").unwrap();
    // Both rows are all-zero, so only the biases decide.
    assert_eq!(first.category, second.category);
    assert_eq!(first.priority, Level::Low);
}

#[test]
fn training_is_reproducible_across_runs() {
    let a = TempDir::new().unwrap();
    let b = TempDir::new().unwrap();
    TriageEngine::load_or_train(&config_in(&a));
    TriageEngine::load_or_train(&config_in(&b));
    assert_eq!(
        fs::read(a.path().join("model.joblib")).unwrap(),
        fs::read(b.path().join("model.joblib")).unwrap()
    );
}

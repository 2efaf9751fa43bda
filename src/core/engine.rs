use crate::config::TriageConfig;
use crate::core::model::TrainedModel;
use crate::core::types::{DecisionScores, InferenceResult, TicketQuery};
use crate::error::{Result, TriageError};
use crate::heuristics;
use crate::learning::LearningEngine;
use crate::persistence::{load_from_disk, save_to_disk};
use std::sync::Arc;
use tracing::{info, warn};

/// Where the engine's model came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Provenance {
    /// Read from an existing artifact.
    Loaded,
    /// Trained in this process. `persisted` is false when writing the
    /// artifact failed and the model only lives in memory.
    Trained { persisted: bool },
    /// Supplied directly by the caller.
    InMemory,
}

#[derive(Debug, Clone)]
enum ModelSlot {
    Ready { model: Arc<TrainedModel>, provenance: Provenance },
    Unavailable { reason: String },
}

/// Process-scoped handle to the inference pipeline.
///
/// Built once at startup and handed to whatever serves requests. Clones
/// share the same read-only model, so the handle can be passed to many
/// threads without locking.
#[derive(Debug, Clone)]
pub struct TriageEngine {
    slot: ModelSlot,
}

impl TriageEngine {
    pub fn from_model(model: TrainedModel) -> Self {
        Self {
            slot: ModelSlot::Ready { model: Arc::new(model), provenance: Provenance::InMemory },
        }
    }

    pub fn unavailable(reason: impl Into<String>) -> Self {
        Self { slot: ModelSlot::Unavailable { reason: reason.into() } }
    }

    /// Loads the artifact at `config.model_path`. If the file is absent and
    /// `train_if_missing` is set, trains on the synthetic corpus and persists
    /// the result. Never fails: problems turn into an unavailable engine.
    pub fn load_or_train(config: &TriageConfig) -> Self {
        let path = config.model_path.as_path();
        if path.exists() {
            return match load_from_disk(path) {
                Ok(model) => {
                    info!(path = %path.display(), "model loaded");
                    Self::ready(model, Provenance::Loaded)
                }
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "model artifact unusable");
                    Self::unavailable(format!("cannot load {}: {e}", path.display()))
                }
            };
        }

        if !config.train_if_missing {
            warn!(path = %path.display(), "no model artifact and training is disabled");
            return Self::unavailable(format!("no model at {}", path.display()));
        }

        info!(path = %path.display(), "no model artifact found, training a new one");
        match Self::train_and_save(config) {
            Ok(engine) => engine,
            Err(e) => {
                warn!(error = %e, "training failed");
                Self::unavailable(format!("training failed: {e}"))
            }
        }
    }

    /// Trains unconditionally and tries to persist. A failed write is logged
    /// and the model is kept in memory for this process.
    pub fn train_and_save(config: &TriageConfig) -> Result<Self> {
        let model = LearningEngine::new(config.training.clone()).train_synthetic()?;
        let persisted = match save_to_disk(&model, &config.model_path) {
            Ok(()) => {
                info!(path = %config.model_path.display(), "model saved");
                true
            }
            Err(e) => {
                warn!(
                    path = %config.model_path.display(),
                    error = %e,
                    "could not persist model; keeping it in memory only"
                );
                false
            }
        };
        Ok(Self::ready(model, Provenance::Trained { persisted }))
    }

    fn ready(model: TrainedModel, provenance: Provenance) -> Self {
        Self { slot: ModelSlot::Ready { model: Arc::new(model), provenance } }
    }

    pub fn is_ready(&self) -> bool {
        matches!(self.slot, ModelSlot::Ready { .. })
    }

    pub fn model(&self) -> Option<&TrainedModel> {
        match &self.slot {
            ModelSlot::Ready { model, .. } => Some(model.as_ref()),
            ModelSlot::Unavailable { .. } => None,
        }
    }

    pub fn provenance(&self) -> Option<&Provenance> {
        match &self.slot {
            ModelSlot::Ready { provenance, .. } => Some(provenance),
            ModelSlot::Unavailable { .. } => None,
        }
    }

    pub fn unavailable_reason(&self) -> Option<&str> {
        match &self.slot {
            ModelSlot::Ready { .. } => None,
            ModelSlot::Unavailable { reason } => Some(reason.as_str()),
        }
    }

    fn require_model(&self) -> Result<&TrainedModel> {
        self.model().ok_or_else(|| {
            TriageError::ModelUnavailable(
                self.unavailable_reason().unwrap_or("no model").to_string(),
            )
        })
    }

    /// Category, priority and confidence for one ticket.
    pub fn classify(&self, title: &str, description: &str) -> Result<InferenceResult> {
        let model = self.require_model()?;
        let text = format!("{title} {description}");
        let (category, scores) = model.predict(&text);
        Ok(InferenceResult {
            category,
            priority: heuristics::priority(&text),
            confidence: heuristics::confidence(&scores),
        })
    }

    pub fn classify_query(&self, query: &TicketQuery) -> Result<InferenceResult> {
        self.classify(&query.title, &query.description)
    }

    /// Raw per-class decision scores for `text`.
    pub fn scores(&self, text: &str) -> Result<DecisionScores> {
        Ok(self.require_model()?.predict(text).1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::{Category, Level};

    #[test]
    fn unavailable_engine_reports_instead_of_panicking() {
        let engine = TriageEngine::unavailable("not trained yet");
        assert!(!engine.is_ready());
        let err = engine.classify("Mouse", "not working").unwrap_err();
        match err {
            TriageError::ModelUnavailable(reason) => assert_eq!(reason, "not trained yet"),
            other => panic!("unexpected error {other:?}"),
        }
        assert!(engine.scores("anything").is_err());
    }

    #[test]
    fn handle_is_shareable_across_threads() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<TriageEngine>();
    }

    #[test]
    fn classify_combines_model_and_heuristics() {
        let model = LearningEngine::new(Default::default()).train_synthetic().unwrap();
        let engine = TriageEngine::from_model(model);
        assert_eq!(engine.provenance(), Some(&Provenance::InMemory));

        let result = engine.classify("Cannot connect to WiFi", "internet is very slow").unwrap();
        assert_eq!(result.category, Category::Network);
        assert_eq!(result.priority, Level::Medium);

        let scores = engine.scores("Cannot connect to WiFi internet is very slow").unwrap();
        assert_eq!(result.confidence, heuristics::confidence(&scores));
    }
}

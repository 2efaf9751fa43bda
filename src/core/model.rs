// src/core/model.rs
use crate::core::svm::{FitReport, LinearSvc};
use crate::core::types::{Category, DecisionScores};
use crate::core::vectorizer::TfidfVectorizer;
use crate::error::Result;
use crate::learning::ClassificationReport;
use serde::{Deserialize, Serialize};

/// Facts about the run that produced a model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingSummary {
    pub train_samples: usize,
    pub test_samples: usize,
    pub fit: FitReport,
    /// Held-out evaluation; `None` when no test split was made.
    pub evaluation: Option<ClassificationReport>,
}

/// A fitted vectorizer and classifier. Read-only once built.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainedModel {
    vectorizer: TfidfVectorizer,
    classifier: LinearSvc,
    summary: TrainingSummary,
}

impl TrainedModel {
    pub fn new(
        vectorizer: TfidfVectorizer,
        classifier: LinearSvc,
        summary: TrainingSummary,
    ) -> Self {
        Self { vectorizer, classifier, summary }
    }

    /// Predicted category plus the full per-class score vector.
    pub fn predict(&self, text: &str) -> (Category, DecisionScores) {
        let features = self.vectorizer.transform(text);
        self.classifier.predict(&features)
    }

    pub fn vectorizer(&self) -> &TfidfVectorizer {
        &self.vectorizer
    }

    pub fn classifier(&self) -> &LinearSvc {
        &self.classifier
    }

    pub fn summary(&self) -> &TrainingSummary {
        &self.summary
    }

    pub(crate) fn with_evaluation(mut self, evaluation: ClassificationReport) -> Self {
        self.summary.evaluation = Some(evaluation);
        self
    }

    pub(crate) fn validate(&self) -> Result<()> {
        self.vectorizer.validate()?;
        self.classifier.validate(self.vectorizer.n_features())
    }
}

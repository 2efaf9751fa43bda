// File: src/learning.rs
use crate::config::TrainingConfig;
use crate::core::model::{TrainedModel, TrainingSummary};
use crate::core::svm::LinearSvc;
use crate::core::text::Analyzer;
use crate::core::types::{Category, TrainingExample};
use crate::core::vectorizer::TfidfVectorizer;
use crate::dataset::{synthetic_corpus, train_test_split};
use crate::error::{Result, TriageError};
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::info;

/// Offline training job: split, fit, evaluate.
pub struct LearningEngine {
    config: TrainingConfig,
    analyzer: Analyzer,
}

impl LearningEngine {
    pub fn new(config: TrainingConfig) -> Self {
        Self { config, analyzer: Analyzer::default() }
    }

    /// Trains on the built-in demo corpus.
    pub fn train_synthetic(&self) -> Result<TrainedModel> {
        self.train(synthetic_corpus())
    }

    /// Splits `corpus` into train/test, fits on the training part and
    /// attaches a held-out report to the model summary.
    pub fn train(&self, corpus: Vec<TrainingExample>) -> Result<TrainedModel> {
        if corpus.is_empty() {
            return Err(TriageError::EmptyCorpus);
        }
        let (train, test) = if self.config.test_fraction > 0.0 {
            train_test_split(corpus, self.config.test_fraction, self.config.seed)
        } else {
            (corpus, Vec::new())
        };
        info!(train = train.len(), test = test.len(), "training ticket classifier");

        let model = self.fit(&train, test.len())?;
        if test.is_empty() {
            return Ok(model);
        }

        let report = evaluate(&model, &test);
        info!(
            accuracy = %format!("{:.3}", report.accuracy),
            macro_f1 = %format!("{:.3}", report.macro_f1),
            "held-out evaluation"
        );
        Ok(model.with_evaluation(report))
    }

    /// Fits vectorizer and classifier on every example given, no split.
    pub fn fit(&self, examples: &[TrainingExample], test_samples: usize) -> Result<TrainedModel> {
        let texts: Vec<&str> = examples.iter().map(|e| e.text.as_str()).collect();
        let labels: Vec<Category> = examples.iter().map(|e| e.category).collect();

        let vectorizer = TfidfVectorizer::fit(self.analyzer, &texts)?;
        let rows = vectorizer.transform_all(&texts);
        let (classifier, fit) =
            LinearSvc::fit(&rows, &labels, vectorizer.n_features(), &self.config.svm_params())?;
        info!(
            features = vectorizer.n_features(),
            solver = ?fit.solver,
            converged = fit.converged,
            "fitted one-vs-rest separators"
        );

        let summary = TrainingSummary {
            train_samples: examples.len(),
            test_samples,
            fit,
            evaluation: None,
        };
        Ok(TrainedModel::new(vectorizer, classifier, summary))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassMetrics {
    pub category: Category,
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
    pub support: usize,
}

/// Per-class precision/recall/F1 over a labeled set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassificationReport {
    pub classes: Vec<ClassMetrics>,
    pub accuracy: f64,
    pub macro_precision: f64,
    pub macro_recall: f64,
    pub macro_f1: f64,
    pub support: usize,
}

/// Scores `model` against `examples`. Undefined ratios (0/0) count as 0.
/// Classes that neither occur nor get predicted are left out.
pub fn evaluate(model: &TrainedModel, examples: &[TrainingExample]) -> ClassificationReport {
    let predictions: Vec<(Category, Category)> = examples
        .iter()
        .map(|e| (e.category, model.predict(&e.text).0))
        .collect();
    ClassificationReport::from_pairs(&predictions)
}

impl ClassificationReport {
    /// Builds a report from `(expected, predicted)` pairs.
    pub fn from_pairs(pairs: &[(Category, Category)]) -> Self {
        let ratio = |num: usize, den: usize| if den == 0 { 0.0 } else { num as f64 / den as f64 };

        let mut classes = Vec::new();
        for category in Category::ALL {
            let support = pairs.iter().filter(|(t, _)| *t == category).count();
            let predicted = pairs.iter().filter(|(_, p)| *p == category).count();
            if support == 0 && predicted == 0 {
                continue;
            }
            let hits = pairs.iter().filter(|(t, p)| *t == category && *p == category).count();
            let precision = ratio(hits, predicted);
            let recall = ratio(hits, support);
            let f1 = if precision + recall == 0.0 {
                0.0
            } else {
                2.0 * precision * recall / (precision + recall)
            };
            classes.push(ClassMetrics { category, precision, recall, f1, support });
        }

        let n = classes.len().max(1) as f64;
        let correct = pairs.iter().filter(|(t, p)| t == p).count();
        Self {
            accuracy: ratio(correct, pairs.len()),
            macro_precision: classes.iter().map(|c| c.precision).sum::<f64>() / n,
            macro_recall: classes.iter().map(|c| c.recall).sum::<f64>() / n,
            macro_f1: classes.iter().map(|c| c.f1).sum::<f64>() / n,
            support: pairs.len(),
            classes,
        }
    }
}

impl fmt::Display for ClassificationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "{:>16} {:>9} {:>9} {:>9} {:>9}",
            "", "precision", "recall", "f1-score", "support"
        )?;
        for c in &self.classes {
            writeln!(
                f,
                "{:>16} {:>9.2} {:>9.2} {:>9.2} {:>9}",
                c.category.label(),
                c.precision,
                c.recall,
                c.f1,
                c.support
            )?;
        }
        writeln!(f)?;
        writeln!(
            f,
            "{:>16} {:>9} {:>9} {:>9.2} {:>9}",
            "accuracy", "", "", self.accuracy, self.support
        )?;
        write!(
            f,
            "{:>16} {:>9.2} {:>9.2} {:>9.2} {:>9}",
            "macro avg", self.macro_precision, self.macro_recall, self.macro_f1, self.support
        )
    }
}

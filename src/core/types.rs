// src/core/types.rs
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Index of an n-gram in the fitted vocabulary.
pub type TermId = usize;

/// The fixed label set a ticket can be routed to.
///
/// Variants are declared in label-sorted order. `Category::ALL` follows the
/// same order, and so do the per-class score vectors. When two classes
/// score exactly the same, the one listed first here wins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Category {
    #[serde(rename = "Account Access")]
    AccountAccess,
    Hardware,
    Network,
    Security,
    Software,
}

impl Category {
    pub const ALL: [Category; 5] = [
        Category::AccountAccess,
        Category::Hardware,
        Category::Network,
        Category::Security,
        Category::Software,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Category::AccountAccess => "Account Access",
            Category::Hardware => "Hardware",
            Category::Network => "Network",
            Category::Security => "Security",
            Category::Software => "Software",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .chars()
            .filter(|c| !c.is_whitespace() && *c != '_' && *c != '-')
            .collect::<String>()
            .to_lowercase();
        match normalized.as_str() {
            "accountaccess" => Ok(Category::AccountAccess),
            "hardware" => Ok(Category::Hardware),
            "network" => Ok(Category::Network),
            "security" => Ok(Category::Security),
            "software" => Ok(Category::Software),
            _ => Err(format!("unknown category '{s}'")),
        }
    }
}

/// A three-step ordinal used for both priority and confidence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Level {
    Low,
    Medium,
    High,
}

impl Level {
    pub fn as_str(self) -> &'static str {
        match self {
            Level::Low => "Low",
            Level::Medium => "Medium",
            Level::High => "High",
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

pub type Priority = Level;
pub type Confidence = Level;

/// One labeled phrase of the training corpus.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrainingExample {
    pub text: String,
    pub category: Category,
}

impl TrainingExample {
    pub fn new(text: impl Into<String>, category: Category) -> Self {
        Self { text: text.into(), category }
    }
}

/// An incoming ticket as the serving layer receives it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TicketQuery {
    pub title: String,
    pub description: String,
}

impl TicketQuery {
    pub fn new(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self { title: title.into(), description: description.into() }
    }

    /// Title and description joined by a single space, the text every
    /// stage of the pipeline looks at.
    pub fn full_text(&self) -> String {
        format!("{} {}", self.title, self.description)
    }
}

/// What the pipeline hands back for one ticket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct InferenceResult {
    pub category: Category,
    pub priority: Priority,
    pub confidence: Confidence,
}

/// Per-class decision scores, always in `Category::ALL` order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DecisionScores(pub Vec<(Category, f64)>);

impl DecisionScores {
    /// Largest raw score, `None` for an empty vector.
    pub fn max_score(&self) -> Option<f64> {
        self.0.iter().map(|&(_, s)| s).reduce(f64::max)
    }

    /// Highest-scoring class. Ties go to the class that comes first.
    pub fn best(&self) -> Option<Category> {
        let mut best: Option<(Category, f64)> = None;
        for &(category, score) in &self.0 {
            match best {
                Some((_, top)) if score <= top => {}
                _ => best = Some((category, score)),
            }
        }
        best.map(|(c, _)| c)
    }

    pub fn get(&self, category: Category) -> Option<f64> {
        self.0.iter().find(|(c, _)| *c == category).map(|&(_, s)| s)
    }
}

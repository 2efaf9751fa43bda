pub mod engine;
pub mod model;
pub mod svm;
pub mod text;
pub mod types;
pub mod vectorizer;

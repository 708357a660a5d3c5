//! Offline training pipeline producing the model artifact served at
//! runtime. The design matrix is built with the same feature normalizer the
//! statistical backend uses at inference, so the engineered features cannot
//! drift between the two paths.

pub mod data;
pub mod trainer;

pub use data::{generate_dataset, LabeledSample};
pub use trainer::{train, train_to_path, TrainingConfig, TrainingError};

//! Utility functions and types

pub mod data_loader;
pub mod serialization;

pub use data_loader::{column_f64, column_names, column_str, DataLoader, DataSaver};
pub use serialization::{compute_sha256, load_array, load_object, save_array, save_object, ArtifactKind};

//! Progress and settings storage for study modules.
//!
//! The study core never performs I/O; callers load a [`ProgressSnapshot`]
//! before a session and save it after each mutation through one of the
//! repositories here.
//!
//! [`ProgressSnapshot`]: study_core::ProgressSnapshot

pub mod error;
pub mod repository;

pub use error::{Result, StoreError};
pub use repository::{
    default_data_dir, JsonFileRepository, MemoryRepository, ProgressRepository, SettingsRepository,
};

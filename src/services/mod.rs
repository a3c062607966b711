// src/services/mod.rs

pub mod submission;

pub use submission::SubmissionPipeline;

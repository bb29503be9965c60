//! Shared test utilities for the labext-manager workspace.
//!
//! This crate provides in-memory collaborators and data builders so model
//! tests do not need a running server. It is a dev-dependency only, never
//! published.
//!
//! # Modules
//!
//! - [`fakes`]: call-recording fakes for every collaborator trait
//! - [`fixtures`]: builders for wire records and entries

pub mod fakes;
pub mod fixtures;

pub use fakes::{
    FakeBuilder, FakeKernelSpecs, FakeRegistry, FakeServer, Failure, RecordingReporter,
    ScriptedPrompt, TestServices,
};

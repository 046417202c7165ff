//! degreecheck-core — Requirement allocation, satisfaction and audit engine.
//!
//! This crate defines the data model, the course-to-category allocation
//! engine, the satisfaction evaluator and the credit totals that the rest of
//! degreecheck builds on.

pub mod allocation;
pub mod audit;
pub mod config;
pub mod engine;
pub mod error;
pub mod evaluation;
pub mod model;
pub mod parser;
pub mod plan;
pub mod report;
pub mod totals;
pub mod traits;

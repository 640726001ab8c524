//! Research pipeline and report handling for scout.
//!
//! This crate ties the web lookups and the text-generation backend into one
//! sequential run per company (see [`pipeline::Researcher`]) and persists the
//! resulting reports as JSON.

pub mod generation;
pub mod pipeline;
pub mod prompts;
pub mod report;

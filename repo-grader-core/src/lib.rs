#![doc = "repo-grader-core: analysis pipeline for repo-grader."]

//! This crate contains the whole analysis pipeline: locating a repository,
//! fetching its metadata, prompting a generative model, validating the reply
//! and falling back to a static evaluation when anything fails.
//! Transport glue (HTTP server, CLI, config files) lives in the `repo-grader` crate.
//!
//! # Usage
//! Build a [`metadata::GitHubClient`] and a [`model::GeminiClient`], create an
//! [`model::ActiveModel`] handle and call [`pipeline::analyze`].

pub mod config;
pub mod contract;
pub mod error;
pub mod evaluation;
pub mod fallback;
pub mod locator;
pub mod metadata;
pub mod model;
pub mod normalize;
pub mod pipeline;
pub mod prompt;

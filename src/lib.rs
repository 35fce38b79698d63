//! Face analysis pipeline - submits two photographs to a vision model
//!
//! The proxy forwards an app's front and side photographs to an
//! OpenAI-compatible vision model and normalizes its JSON reply; the client
//! calls that proxy with a timeout and turns every failure into an error.

pub mod ai;
pub mod client;
pub mod config;
pub mod error;
pub mod models;
pub mod prompts;
pub mod proxy;
pub mod tier;

pub use client::AnalysisClient;
pub use error::{Error, Result};
pub use proxy::AnalysisProxy;
pub use tier::Tier;

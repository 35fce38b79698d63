//! Server side of the analysis pipeline
//!
//! Validates the app's request, asks the vision model for a JSON analysis
//! and normalizes whatever comes back into an [`AnalysisResponse`].
//!
//! [`AnalysisResponse`]: crate::models::AnalysisResponse

pub mod handler;
pub mod normalize;
pub mod server;

pub use handler::{AnalysisProxy, ProxyBody, ProxyResponse};
pub use server::{create_router, serve};

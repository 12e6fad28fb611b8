//! # Research Compiler
//!
//! Content acquisition for the research assistant: candidate discovery,
//! anti-blocking page fetching, main-content extraction, text cleaning, the
//! two-phase preview/commit pipeline and document output.
//!
//! ## Modules
//!
//! - [`search`]: candidate URLs from a search provider
//! - [`fetch`]: per-URL fetch policy (header rotation, throttling, retries)
//! - [`extract`] / [`clean`]: HTML to normalized plain text
//! - [`preview`]: Short/Medium/Long volume rating
//! - [`pipeline`]: bounded, order-preserving fan-out for both phases
//! - [`assemble`] / [`outputs`]: the final text blob and its DOCX/PDF writers
//! - [`session`]: the interactive loop tying everything together

pub mod assemble;
pub mod clean;
pub mod cli;
pub mod config;
pub mod extract;
pub mod fetch;
pub mod models;
pub mod outputs;
pub mod pipeline;
pub mod preview;
pub mod search;
pub mod session;
pub mod utils;

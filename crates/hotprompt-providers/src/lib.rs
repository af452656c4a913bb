//! Provider layer for Hotprompt.
//!
//! # Architecture
//!
//! - [`registry`] — static provider specs and the `ModelCatalog`
//! - [`request::RequestBuilder`] — validates input into a `ChatRequest`
//! - [`traits::ChatBackend`] — trait that every provider backend implements
//! - [`backends`] — OpenAI, Groq, and Local implementations
//! - [`http_provider::HttpExchange`] — shared POST + failure classification
//! - [`client::CompletionClient`] — dispatches a request to its backend

pub mod backends;
pub mod client;
pub mod http_provider;
pub mod registry;
pub mod request;
pub mod traits;

// Re-export main types for convenience
pub use backends::{GroqBackend, LocalBackend, OpenAiBackend};
pub use client::CompletionClient;
pub use http_provider::HttpExchange;
pub use registry::{ModelCatalog, ProviderSpec, PROVIDERS};
pub use request::{ChatRequest, RequestBuilder};
pub use traits::ChatBackend;

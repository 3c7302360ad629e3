// Core prompt-to-execution functionality:
// - Request/response data structures for the Gemini API
// - Transport (HTTP client) behind a trait
// - Response extraction
// - Conversation history and sessions
// - Script execution behind a trait
// - Configuration loading
// - Shared error types

// Export types module - Request/response data structures
pub mod types;
pub use types::*;

// Export client module - API transport for Gemini
pub mod client;
pub use client::*;

// Export config module - Configuration loading
pub mod config;
pub use config::*;

// Export errors module - Shared error types
pub mod errors;
pub use errors::*;

pub mod executor;
pub mod extract;
pub mod history;
pub mod outcome;
pub mod pipeline;
pub mod request;

pub use executor::{CodeDelivery, ExecutionReport, Executor, ScriptExecutor};
pub use extract::extract_code;
pub use history::{ConversationHistory, ConversationTurn};
pub use outcome::{ExecutionOutcome, Reporter, Severity, TracingReporter};
pub use pipeline::{Pipeline, PipelineState, Session, SharedSession};
pub use request::{build_request, validate_prompt, DEFAULT_DIRECTIVE};

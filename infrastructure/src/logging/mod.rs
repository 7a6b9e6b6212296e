//! Logging infrastructure - structured run persistence.
//!
//! Provides [`JsonlInteractionLogger`], a JSONL file writer that implements
//! the [`InteractionLogger`](consortium_application::InteractionLogger) port.

mod jsonl_logger;

pub use jsonl_logger::JsonlInteractionLogger;

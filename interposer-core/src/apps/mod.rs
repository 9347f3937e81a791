//! Interception applications
//!
//! Applications run with the log capability and never return to the
//! orchestrator under normal operation: the next terminal reset ends them.

pub mod forward;

pub use forward::ForwardApp;

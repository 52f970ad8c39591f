//! Log sinks and credential masking.
//!
//! Events are emitted with `tracing`; this module wires the sinks and makes
//! sure API keys, secrets and request signatures never reach them.

pub mod logging;
pub mod redaction;

pub use logging::init_logging;
pub use redaction::{REDACTED, RedactingMakeWriter, Redactor};

//! Client side of the `AnswerHub` v2 REST API
//!
//! # Module Organization
//!
//! - `transport` - authenticated requests against `{base}/services/v2/`
//! - `envelope` - paginated response decoding and item types
//! - `mutations` - delete, scrub and deactivate calls

pub mod envelope;
pub mod mutations;
pub mod transport;

#[cfg(test)]
pub(crate) mod testing;

// Re-export commonly used types
pub use envelope::{ActionItem, Page, PageItem, QuestionItem, decode};
pub use mutations::{MutationOutcome, Operation, deactivate_user, delete_node, update_question_body};
pub use transport::{DEFAULT_TIMEOUT, HttpTransport, Response, Transport};

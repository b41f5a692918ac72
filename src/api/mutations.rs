use super::transport::{Response, Transport};
use crate::error::{Error, Result};
use reqwest::Method;
use serde::Serialize;
use serde_json::json;
use std::fmt;
use tracing::{info, warn};

/// Text written over a question body before it is deleted
pub const SCRUBBED_BODY: &str = "Nothing here";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Operation {
    Delete,
    Scrub,
    Deactivate,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Delete => "delete",
            Self::Scrub => "scrub",
            Self::Deactivate => "deactivate",
        };
        write!(f, "{name}")
    }
}

/// Result of one mutation call as reported by the server
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MutationOutcome {
    pub operation: Operation,
    pub target: String,
    pub status: u16,
}

impl MutationOutcome {
    fn from_response(operation: Operation, target: String, response: &Response) -> Self {
        if response.is_success() {
            info!("{operation} {target}: status {}", response.status);
        } else {
            warn!(
                "{operation} {target}: status {} {}",
                response.status,
                response.excerpt()
            );
        }

        Self {
            operation,
            target,
            status: response.status,
        }
    }

    #[must_use]
    pub const fn is_success(&self) -> bool {
        matches!(self.status, 200..=299)
    }

    /// Turn a failed outcome into `Error::Mutation`
    ///
    /// # Errors
    ///
    /// Returns `Error::Mutation` if the status is not 2xx
    pub fn into_result(self) -> Result<Self> {
        if self.is_success() {
            Ok(self)
        } else {
            Err(Error::Mutation {
                operation: self.operation.to_string(),
                target: self.target,
                status: self.status,
            })
        }
    }
}

/// `PUT node/{id}/delete.json`
///
/// # Errors
///
/// Returns `Error::Transport` if the request could not be sent, a non-2xx
/// status is reported in the outcome
pub async fn delete_node<T: Transport>(transport: &T, id: u64) -> Result<MutationOutcome> {
    let response = transport
        .request(Method::PUT, &format!("node/{id}/delete.json"), None)
        .await?;

    Ok(MutationOutcome::from_response(
        Operation::Delete,
        format!("node {id}"),
        &response,
    ))
}

/// `PUT question/{id}.json` replacing the body with [`SCRUBBED_BODY`]
///
/// # Errors
///
/// Returns `Error::Transport` if the request could not be sent
pub async fn update_question_body<T: Transport>(
    transport: &T,
    id: u64,
) -> Result<MutationOutcome> {
    let body = json!({ "body": SCRUBBED_BODY }).to_string().into_bytes();
    let response = transport
        .request(Method::PUT, &format!("question/{id}.json"), Some(body))
        .await?;

    Ok(MutationOutcome::from_response(
        Operation::Scrub,
        format!("question {id}"),
        &response,
    ))
}

/// `PUT user/{id}/deactivateUser.json`
///
/// # Errors
///
/// Returns `Error::Transport` if the request could not be sent
pub async fn deactivate_user<T: Transport>(
    transport: &T,
    user_id: u64,
) -> Result<MutationOutcome> {
    let response = transport
        .request(
            Method::PUT,
            &format!("user/{user_id}/deactivateUser.json"),
            None,
        )
        .await?;

    Ok(MutationOutcome::from_response(
        Operation::Deactivate,
        format!("user {user_id}"),
        &response,
    ))
}

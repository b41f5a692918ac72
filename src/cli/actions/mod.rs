mod run;

use crate::{banish::Plan, credentials::Credentials};
use std::time::Duration;

/// Action enum representing each possible command
#[derive(Debug)]
pub enum Action {
    Banish {
        user_id: u64,
        credentials: Credentials,
        plan: Plan,
        timeout: Duration,
        retries: u32,
        json: bool,
    },
}

impl Action {
    /// Execute the action
    ///
    /// # Errors
    ///
    /// Returns an error if the action fails to execute
    pub async fn execute(self) -> anyhow::Result<()> {
        run::execute(self).await
    }
}

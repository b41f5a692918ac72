use super::Action;
use crate::{api::HttpTransport, banish::Banisher};
use anyhow::Context;
use tracing::warn;

/// Execute the action's business logic by delegating to the appropriate module
///
/// The report is printed even when the run aborts, the error is returned
/// afterwards.
pub async fn execute(action: Action) -> anyhow::Result<()> {
    match action {
        Action::Banish {
            user_id,
            credentials,
            plan,
            timeout,
            retries,
            json,
        } => {
            let transport = HttpTransport::new(credentials, timeout, retries)?;
            let mut banisher = Banisher::new(&transport, user_id, plan.options);
            let result = banisher.run(&plan.enumerations).await;
            let report = banisher.finish();

            if !report.is_clean() {
                warn!("{} mutations failed", report.failed());
            }

            if json {
                let serialized = serde_json::to_string(&report)?;
                println!("{serialized}");
            } else {
                println!("{report}");
            }

            result.with_context(|| format!("Failed to banish user {user_id}"))
        }
    }
}

use super::{commands, dispatch, telemetry};
use anyhow::Result;

/// Parse the command line, set up logging from `-v`/`RUST_LOG`, resolve the
/// user id and credentials into an `Action`, then run it.
///
/// # Errors
///
/// Returns an error if logging can't be set up, the user id or credentials
/// are missing, or the run aborts
pub async fn start() -> Result<()> {
    let matches = commands::new().get_matches();

    telemetry::init(matches.get_count("verbose"))?;

    let action = dispatch::dispatch(&matches)?;

    action.execute().await
}

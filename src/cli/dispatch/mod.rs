use crate::{
    banish::{Enumeration, OnFailure, Options, Plan, Strategy, Target, Termination},
    cli::actions::Action,
    credentials::{CredentialOverrides, Credentials},
};
use anyhow::{Context, Result, anyhow};
use clap::ArgMatches;
use std::{path::PathBuf, time::Duration};

/// Collections selected by `--target`, in walking order
fn extract_targets(matches: &ArgMatches) -> Result<Vec<Target>> {
    match matches.get_one::<String>("target").map(String::as_str) {
        None | Some("actions") => Ok(vec![Target::Actions]),
        Some("questions") => Ok(vec![Target::Questions]),
        Some("all") => Ok(vec![Target::Actions, Target::Questions]),
        Some(other) => Err(anyhow!("Invalid target: {other}")),
    }
}

fn extract_plan(matches: &ArgMatches) -> Result<Plan> {
    let strategy = matches
        .get_one::<String>("strategy")
        .map(|s| s.parse::<Strategy>())
        .transpose()
        .map_err(|e| anyhow!(e))?
        .unwrap_or_default();

    let until = matches
        .get_one::<String>("until")
        .map(|s| s.parse::<Termination>())
        .transpose()
        .map_err(|e| anyhow!(e))?;

    let enumerations = extract_targets(matches)?
        .into_iter()
        .map(|target| {
            let enumeration = Enumeration::new(target);
            until.map_or(enumeration, |rule| enumeration.until(rule))
        })
        .collect();

    let options = Options {
        strategy,
        on_failure: if matches.get_flag("strict") {
            OnFailure::Abort
        } else {
            OnFailure::Continue
        },
        dry_run: matches.get_flag("dry-run"),
        scrub: matches.get_flag("scrub"),
        keep_account: matches.get_flag("keep-account"),
        max_pages: matches.get_one::<u32>("max-pages").copied().unwrap_or(1000),
    };

    Ok(Plan {
        enumerations,
        options,
    })
}

/// Convert `ArgMatches` into typed Action enum with validation
///
/// # Errors
///
/// Returns an error if no user is given or the credentials can't be resolved
pub fn dispatch(matches: &ArgMatches) -> Result<Action> {
    // Extract the user, the positional argument wins over --ban/ANSWERHUB_BAN
    let user_id = matches
        .get_one::<u64>("user-id")
        .or_else(|| matches.get_one::<u64>("ban"))
        .copied()
        .context("Provide userID: answerhub-ban <USER_ID> or --ban <USER_ID>")?;

    // Credentials file merged with --url/--user/--pass
    let path = matches
        .get_one::<String>("credentials")
        .map_or_else(|| PathBuf::from("credentials.json"), PathBuf::from);
    let overrides = CredentialOverrides {
        url: matches.get_one::<String>("url").cloned(),
        user: matches.get_one::<String>("user").cloned(),
        pass: matches.get_one::<String>("pass").cloned(),
    };
    let credentials = Credentials::resolve(&path, overrides)
        .with_context(|| format!("Failed to load credentials from {}", path.display()))?;

    let timeout = Duration::from_secs(matches.get_one::<u64>("timeout").copied().unwrap_or(10));
    let retries = matches.get_one::<u32>("retries").copied().unwrap_or(0);

    Ok(Action::Banish {
        user_id,
        credentials,
        plan: extract_plan(matches)?,
        timeout,
        retries,
        json: matches.get_flag("json"),
    })
}

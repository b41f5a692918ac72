use crate::credentials::DEFAULT_CREDENTIALS_FILE;
use clap::{
    Arg, ArgAction, ColorChoice, Command,
    builder::styling::{AnsiColor, Effects, Styles},
};

/// Pure clap command definitions with zero business logic
#[must_use]
#[allow(clippy::too_many_lines)]
pub fn new() -> Command {
    let styles = Styles::styled()
        .header(AnsiColor::Yellow.on_default() | Effects::BOLD)
        .usage(AnsiColor::Green.on_default() | Effects::BOLD)
        .literal(AnsiColor::Blue.on_default() | Effects::BOLD)
        .placeholder(AnsiColor::Green.on_default());

    Command::new(env!("CARGO_PKG_NAME"))
        .about(env!("CARGO_PKG_DESCRIPTION"))
        .version(env!("CARGO_PKG_VERSION"))
        .color(ColorChoice::Auto)
        .styles(styles)
        .arg(
            Arg::new("user-id")
                .help("ID of the user to banish")
                .value_name("USER_ID")
                .value_parser(clap::value_parser!(u64)),
        )
        .arg(
            Arg::new("ban")
                .env("ANSWERHUB_BAN")
                .help("ID of the user to banish, the positional argument wins when both are set")
                .long("ban")
                .short('b')
                .value_name("USER_ID")
                .value_parser(clap::value_parser!(u64)),
        )
        .arg(
            Arg::new("credentials")
                .default_value(DEFAULT_CREDENTIALS_FILE)
                .env("ANSWERHUB_CREDENTIALS")
                .help("JSON file with answerHubBaseURL, username and password")
                .long("credentials")
                .short('c')
                .value_name("PATH"),
        )
        .arg(
            Arg::new("url")
                .env("ANSWERHUB_URL")
                .help("AnswerHub base URL, overrides the credentials file")
                .long("url")
                .value_name("URL"),
        )
        .arg(
            Arg::new("user")
                .env("ANSWERHUB_USER")
                .help("API username, overrides the credentials file")
                .long("user")
                .value_name("USERNAME"),
        )
        .arg(
            Arg::new("pass")
                .env("ANSWERHUB_PASS")
                .help("API password, overrides the credentials file")
                .long("pass")
                .hide_env_values(true)
                .value_name("PASSWORD"),
        )
        .arg(
            Arg::new("target")
                .default_value("actions")
                .help("Content to remove")
                .long("target")
                .short('t')
                .long_help(
                    "Content to remove:\n\n\
                    - actions: every node referenced by the user's activity (default)\n\
                    - questions: the questions written by the user\n\
                    - all: actions first, then questions",
                )
                .value_parser(["actions", "questions", "all"]),
        )
        .arg(
            Arg::new("strategy")
                .default_value("snapshot")
                .help("How pages are walked while content disappears")
                .long("strategy")
                .short('s')
                .long_help(
                    "How pages are walked while content disappears:\n\n\
                    - snapshot: read every page first, then delete each node once (default)\n\
                    - interleaved: delete page by page while advancing the page number\n\
                    - rescan: delete page 1 and read it again until nothing new is left\n\n\
                    Note: the list endpoints are positional, interleaved can miss items \
                    because every delete shifts the following ones up.",
                )
                .value_parser(["snapshot", "interleaved", "rescan"]),
        )
        .arg(
            Arg::new("until")
                .help("Termination rule, defaults to page-count for actions and total-count for questions")
                .long("until")
                .value_name("RULE")
                .value_parser(["page-count", "total-count"]),
        )
        .arg(
            Arg::new("scrub")
                .action(ArgAction::SetTrue)
                .help("Replace question bodies before deleting them")
                .long("scrub"),
        )
        .arg(
            Arg::new("strict")
                .action(ArgAction::SetTrue)
                .help("Stop at the first failed mutation, the account stays active")
                .long("strict"),
        )
        .arg(
            Arg::new("dry-run")
                .action(ArgAction::SetTrue)
                .help("Only list what would be removed")
                .long("dry-run")
                .short('n'),
        )
        .arg(
            Arg::new("keep-account")
                .action(ArgAction::SetTrue)
                .help("Remove the content but do not deactivate the user")
                .long("keep-account"),
        )
        .arg(
            Arg::new("timeout")
                .default_value("10")
                .env("ANSWERHUB_TIMEOUT")
                .help("Request timeout in seconds")
                .long("timeout")
                .value_parser(clap::value_parser!(u64).range(1..)),
        )
        .arg(
            Arg::new("retries")
                .default_value("0")
                .env("ANSWERHUB_RETRIES")
                .help("Extra attempts for requests failing at the network level")
                .long("retries")
                .value_parser(clap::value_parser!(u32)),
        )
        .arg(
            Arg::new("max-pages")
                .default_value("1000")
                .help("Upper limit of pages read per collection")
                .long("max-pages")
                .value_parser(clap::value_parser!(u32).range(1..)),
        )
        .arg(
            Arg::new("json")
                .action(ArgAction::SetTrue)
                .help("Print the final report as JSON")
                .long("json"),
        )
        .arg(
            Arg::new("verbose")
                .action(ArgAction::Count)
                .help("Increase verbosity, -vv for trace")
                .long("verbose")
                .short('v'),
        )
}

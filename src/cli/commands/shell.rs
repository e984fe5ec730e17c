use crate::{api::validate_base_path, gate::RevisitPolicy};
use anyhow::Result;
use clap::{Arg, ArgAction, ArgMatches, Command, builder::ValueParser};

pub const ARG_BASE_PATH: &str = "base-path";
pub const ARG_REVISIT_POLICY: &str = "revisit-policy";
pub const ARG_COLLAPSE_FALLBACK: &str = "collapse-fallback";

#[derive(Debug, Clone)]
pub struct Options {
    pub base_path: String,
    pub revisit: RevisitPolicy,
    pub collapse_fallback: bool,
}

impl Options {
    /// Parse shell arguments from matches.
    ///
    /// # Errors
    /// Returns an error if the base path is not a plain URL path.
    pub fn parse(matches: &ArgMatches) -> Result<Self> {
        let base_path = matches
            .get_one::<String>(ARG_BASE_PATH)
            .map_or_else(|| Ok(String::new()), |raw| validate_base_path(raw))?;

        Ok(Self {
            base_path,
            revisit: matches
                .get_one::<RevisitPolicy>(ARG_REVISIT_POLICY)
                .copied()
                .unwrap_or_default(),
            collapse_fallback: matches.get_flag(ARG_COLLAPSE_FALLBACK),
        })
    }
}

fn revisit_policy_parser() -> ValueParser {
    ValueParser::from(|value: &str| value.parse::<RevisitPolicy>())
}

#[must_use]
pub fn with_args(command: Command) -> Command {
    command
        .arg(
            Arg::new(ARG_BASE_PATH)
                .long(ARG_BASE_PATH)
                .help("Path prefix the shell is served under, e.g. /deepfake-hunter")
                .env("DEEPFAKE_HUNTER_BASE_PATH"),
        )
        .arg(
            Arg::new(ARG_REVISIT_POLICY)
                .long(ARG_REVISIT_POLICY)
                .help("Completed steps: forward to the current step, or allow revisiting them")
                .env("DEEPFAKE_HUNTER_REVISIT_POLICY")
                .value_name("POLICY")
                .default_value("forward")
                .value_parser(revisit_policy_parser()),
        )
        .arg(
            Arg::new(ARG_COLLAPSE_FALLBACK)
                .long(ARG_COLLAPSE_FALLBACK)
                .help("Redirect unknown paths straight to the page for the current stage")
                .env("DEEPFAKE_HUNTER_COLLAPSE_FALLBACK")
                .action(ArgAction::SetTrue),
        )
}

use anyhow::{Context, Result, anyhow};
use clap::{Arg, ArgMatches, Command};
use url::Url;

pub const ARG_IDENTITY_URL: &str = "identity-url";
pub const ARG_BIOMETRIC_URL: &str = "biometric-url";
pub const ARG_SERVICE_TIMEOUT: &str = "service-timeout";

#[derive(Debug, Clone)]
pub struct Options {
    pub identity_url: String,
    pub biometric_url: String,
    pub timeout_seconds: u64,
}

impl Options {
    /// Parse service arguments from matches.
    ///
    /// # Errors
    /// Returns an error if a URL is missing, malformed or not HTTP(S), or the
    /// timeout is zero.
    pub fn parse(matches: &ArgMatches) -> Result<Self> {
        let read_url = |id: &str| -> Result<String> {
            let raw = matches
                .get_one::<String>(id)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
                .ok_or_else(|| anyhow!("missing required argument: --{id}"))?;

            let url = Url::parse(&raw).with_context(|| format!("invalid --{id}: {raw}"))?;
            match url.scheme() {
                "http" | "https" => Ok(raw),
                scheme => Err(anyhow!("invalid --{id}: unsupported scheme {scheme}")),
            }
        };

        let timeout_seconds = matches
            .get_one::<u64>(ARG_SERVICE_TIMEOUT)
            .copied()
            .unwrap_or(10);
        if timeout_seconds == 0 {
            return Err(anyhow!("--{ARG_SERVICE_TIMEOUT} must be greater than zero"));
        }

        Ok(Self {
            identity_url: read_url(ARG_IDENTITY_URL)?,
            biometric_url: read_url(ARG_BIOMETRIC_URL)?,
            timeout_seconds,
        })
    }
}

#[must_use]
pub fn with_args(command: Command) -> Command {
    command
        .arg(
            Arg::new(ARG_IDENTITY_URL)
                .long(ARG_IDENTITY_URL)
                .help("Identity service base URL, credentials are posted to <url>/authenticate")
                .env("DEEPFAKE_HUNTER_IDENTITY_URL")
                .required(true),
        )
        .arg(
            Arg::new(ARG_BIOMETRIC_URL)
                .long(ARG_BIOMETRIC_URL)
                .help("Biometric service base URL, proofs are posted to <url>/verify")
                .env("DEEPFAKE_HUNTER_BIOMETRIC_URL")
                .required(true),
        )
        .arg(
            Arg::new(ARG_SERVICE_TIMEOUT)
                .long(ARG_SERVICE_TIMEOUT)
                .help("Timeout in seconds for calls to the identity and biometric services")
                .env("DEEPFAKE_HUNTER_SERVICE_TIMEOUT")
                .default_value("10")
                .value_parser(clap::value_parser!(u64)),
        )
}

//! Map parsed CLI arguments to an action.
//!
//! Service URLs and the base path are validated here so a bad configuration
//! fails before the listener is bound.

use crate::cli::actions::{Action, server::Args};
use crate::cli::commands::{ARG_PORT, services, shell};
use anyhow::Result;

/// Map validated CLI matches to a server action.
///
/// # Errors
/// Returns an error if required arguments are missing or invalid.
pub fn handler(matches: &clap::ArgMatches) -> Result<Action> {
    let port = matches.get_one::<u16>(ARG_PORT).copied().unwrap_or(8080);

    let services_opts = services::Options::parse(matches)?;
    let shell_opts = shell::Options::parse(matches)?;

    Ok(Action::Server(Args {
        port,
        identity_url: services_opts.identity_url,
        biometric_url: services_opts.biometric_url,
        service_timeout_seconds: services_opts.timeout_seconds,
        base_path: shell_opts.base_path,
        revisit: shell_opts.revisit,
        collapse_fallback: shell_opts.collapse_fallback,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gate::RevisitPolicy;

    fn dispatch(args: &[&str]) -> Result<Action> {
        let mut argv = vec!["deepfake-hunter"];
        argv.extend_from_slice(args);

        temp_env::with_vars(
            [
                ("DEEPFAKE_HUNTER_PORT", None::<&str>),
                ("DEEPFAKE_HUNTER_IDENTITY_URL", None),
                ("DEEPFAKE_HUNTER_BIOMETRIC_URL", None),
                ("DEEPFAKE_HUNTER_SERVICE_TIMEOUT", None),
                ("DEEPFAKE_HUNTER_BASE_PATH", None),
                ("DEEPFAKE_HUNTER_REVISIT_POLICY", None),
                ("DEEPFAKE_HUNTER_COLLAPSE_FALLBACK", None),
            ],
            || {
                let matches = crate::cli::commands::new().get_matches_from(argv);
                handler(&matches)
            },
        )
    }

    #[test]
    fn server_action_from_args() -> Result<()> {
        let Action::Server(args) = dispatch(&[
            "--port",
            "9090",
            "--identity-url",
            "https://id.example.com/api",
            "--biometric-url",
            "http://127.0.0.1:7000",
            "--service-timeout",
            "4",
            "--base-path",
            "/hunter/",
            "--revisit-policy",
            "allow",
            "--collapse-fallback",
        ])?;

        assert_eq!(args.port, 9090);
        assert_eq!(args.identity_url, "https://id.example.com/api");
        assert_eq!(args.biometric_url, "http://127.0.0.1:7000");
        assert_eq!(args.service_timeout_seconds, 4);
        assert_eq!(args.base_path, "/hunter");
        assert_eq!(args.revisit, RevisitPolicy::Allow);
        assert!(args.collapse_fallback);
        Ok(())
    }

    #[test]
    fn server_action_defaults() -> Result<()> {
        let Action::Server(args) = dispatch(&[
            "--identity-url",
            "http://id.localhost",
            "--biometric-url",
            "http://bio.localhost",
        ])?;

        assert_eq!(args.port, 8080);
        assert_eq!(args.service_timeout_seconds, 10);
        assert_eq!(args.base_path, "");
        assert_eq!(args.revisit, RevisitPolicy::Forward);
        assert!(!args.collapse_fallback);
        Ok(())
    }

    #[test]
    fn rejects_non_http_service_url() {
        let result = dispatch(&[
            "--identity-url",
            "ftp://id.localhost",
            "--biometric-url",
            "http://bio.localhost",
        ]);
        assert!(result.is_err());
        if let Err(err) = result {
            assert!(err.to_string().contains("unsupported scheme ftp"));
        }
    }

    #[test]
    fn rejects_malformed_service_url() {
        let result = dispatch(&[
            "--identity-url",
            "http://id.localhost",
            "--biometric-url",
            "not a url",
        ]);
        assert!(result.is_err());
        if let Err(err) = result {
            assert!(err.to_string().contains("invalid --biometric-url"));
        }
    }

    #[test]
    fn rejects_zero_timeout() {
        let result = dispatch(&[
            "--identity-url",
            "http://id.localhost",
            "--biometric-url",
            "http://bio.localhost",
            "--service-timeout",
            "0",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn rejects_invalid_base_path() {
        let result = dispatch(&[
            "--identity-url",
            "http://id.localhost",
            "--biometric-url",
            "http://bio.localhost",
            "--base-path",
            "/a b",
        ]);
        assert!(result.is_err());
        if let Err(err) = result {
            assert!(err.to_string().contains("invalid base path"));
        }
    }
}

//! Command-line interface argument parsing.
//!
//! This module handles all CLI argument parsing using clap,
//! including validation and default values.

use clap::Parser;
use std::path::PathBuf;

/// mobile-backend - HTTP backend stub for the mobile app
///
/// Serves a health check, data summaries, a mock linear classifier and a
/// sample user list as JSON.
///
/// Examples:
///   mobile-backend
///   mobile-backend --port 8080 --verbose
///   mobile-backend --config ./backend.toml --no-cors
///   mobile-backend --init-config
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Args {
    /// Interface to bind (default: from config or 0.0.0.0)
    #[arg(long, value_name = "HOST", env = "MOBILE_BACKEND_HOST")]
    pub host: Option<String>,

    /// Port to listen on (default: from config or 5000)
    #[arg(short, long, value_name = "PORT", env = "PORT")]
    pub port: Option<u16>,

    /// Path to configuration file
    ///
    /// If not specified, looks for .mobile-backend.toml in the current directory
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Enable verbose logging output
    #[arg(short, long)]
    pub verbose: bool,

    /// Run in quiet mode (errors only)
    #[arg(short, long)]
    pub quiet: bool,

    /// Disable CORS headers
    #[arg(long)]
    pub no_cors: bool,

    /// Generate a default .mobile-backend.toml configuration file
    #[arg(long)]
    pub init_config: bool,
}

impl Args {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Validate the parsed arguments.
    pub fn validate(&self) -> Result<(), String> {
        if self.init_config {
            return Ok(());
        }

        if self.verbose && self.quiet {
            return Err("Cannot use both --verbose and --quiet".to_string());
        }

        if self.port == Some(0) {
            return Err("Port must be between 1 and 65535".to_string());
        }

        if let Some(ref host) = self.host {
            if host.trim().is_empty() {
                return Err("Host must not be empty".to_string());
            }
        }

        Ok(())
    }

    /// Returns the log level based on verbosity settings.
    pub fn log_level(&self) -> tracing::Level {
        if self.quiet {
            tracing::Level::ERROR
        } else if self.verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use std::ffi::OsStr;

    fn make_args() -> Args {
        Args {
            host: None,
            port: None,
            config: None,
            verbose: false,
            quiet: false,
            no_cors: false,
            init_config: false,
        }
    }

    #[test]
    fn test_host_env_is_namespaced() {
        let command = Args::command();
        let host = command
            .get_arguments()
            .find(|arg| arg.get_id() == "host")
            .unwrap();
        assert_eq!(host.get_env(), Some(OsStr::new("MOBILE_BACKEND_HOST")));
    }

    #[test]
    fn test_parse_flags() {
        let args = Args::parse_from(["mobile-backend", "-p", "8080", "--no-cors", "-v"]);
        assert_eq!(args.port, Some(8080));
        assert!(args.no_cors);
        assert!(args.verbose);
        assert!(args.config.is_none());
    }

    #[test]
    fn test_validation_conflicting_options() {
        let mut args = make_args();
        args.verbose = true;
        args.quiet = true;
        assert!(args.validate().is_err());
    }

    #[test]
    fn test_validation_port_and_host() {
        let mut args = make_args();
        args.port = Some(0);
        assert!(args.validate().is_err());

        let mut args = make_args();
        args.host = Some("  ".to_string());
        assert!(args.validate().is_err());

        assert!(make_args().validate().is_ok());
    }

    #[test]
    fn test_log_level() {
        let mut args = make_args();
        assert_eq!(args.log_level(), tracing::Level::INFO);

        args.verbose = true;
        assert_eq!(args.log_level(), tracing::Level::DEBUG);

        args.verbose = false;
        args.quiet = true;
        assert_eq!(args.log_level(), tracing::Level::ERROR);
    }
}

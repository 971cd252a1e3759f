//! Command-line argument definitions for the Cloudgram binary.
//!
//! This module defines the [`Args`] structure parsed from the command line
//! using [`clap`]. Global options select the configuration file, the output
//! directory and the logging verbosity; the subcommand picks what to do.

use std::path::PathBuf;

use std::str::FromStr;

use clap::{Parser, Subcommand};
use log::LevelFilter;

/// Command-line arguments for the Cloudgram diagram service
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// What to do; serves HTTP when omitted
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Path to configuration file (TOML)
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    /// Directory rendered diagrams are written to, overriding the configuration
    #[arg(short, long, global = true)]
    pub output_dir: Option<PathBuf>,

    /// Log level (off, error, warn, info, debug, trace); `info` unless RUST_LOG is set
    #[arg(long, global = true)]
    pub log_level: Option<String>,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Run the HTTP diagram service
    Serve {
        /// Socket address to listen on, overriding the configuration
        #[arg(short, long)]
        listen: Option<String>,
    },

    /// Render a JSON diagram specification and print the PNG path
    Render {
        /// Path to the JSON specification
        spec: PathBuf,
    },

    /// Pick a topology for a free-text description and render it
    Sketch {
        /// Description of the architecture
        description: String,
    },

    /// Apply the retention policy to the output directory once
    Prune,
}

impl Args {
    /// The subcommand to run, `serve` with configured defaults if none was given.
    pub fn command(&self) -> Command {
        self.command
            .clone()
            .unwrap_or(Command::Serve { listen: None })
    }

    /// Global level to apply on top of `rust_log`.
    ///
    /// `--log-level` always wins. Without it, a non-empty `RUST_LOG` is left
    /// alone (`None`) and everything else logs at `info`.
    ///
    /// # Errors
    ///
    /// Returns the rejected text if `--log-level` is not a level name.
    pub fn log_filter(&self, rust_log: Option<&str>) -> Result<Option<LevelFilter>, String> {
        match &self.log_level {
            Some(level) => LevelFilter::from_str(level)
                .map(Some)
                .map_err(|_| level.clone()),
            None if rust_log.is_some_and(|value| !value.trim().is_empty()) => Ok(None),
            None => Ok(Some(LevelFilter::Info)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_to_serve() {
        let args = Args::try_parse_from(["cloudgram"]).unwrap();
        assert_eq!(args.command(), Command::Serve { listen: None });
        assert!(args.log_level.is_none());
        assert!(args.config.is_none());
    }

    #[test]
    fn test_global_options_after_subcommand() {
        let args = Args::try_parse_from([
            "cloudgram",
            "sketch",
            "three microservices",
            "--output-dir",
            "diagrams",
            "--log-level",
            "debug",
        ])
        .unwrap();

        assert_eq!(
            args.command(),
            Command::Sketch {
                description: "three microservices".to_string()
            }
        );
        assert_eq!(args.output_dir, Some(PathBuf::from("diagrams")));
        assert_eq!(args.log_level.as_deref(), Some("debug"));
    }

    #[test]
    fn test_serve_listen_override() {
        let args = Args::try_parse_from(["cloudgram", "serve", "--listen", "0.0.0.0:9000"]).unwrap();
        assert_eq!(
            args.command(),
            Command::Serve {
                listen: Some("0.0.0.0:9000".to_string())
            }
        );
    }

    #[test]
    fn test_rust_log_applies_without_flag() {
        let args = Args::try_parse_from(["cloudgram", "prune"]).unwrap();

        assert_eq!(args.log_filter(Some("debug")), Ok(None));
        assert_eq!(args.log_filter(Some("cloudgram=trace")), Ok(None));
        assert_eq!(args.log_filter(Some("  ")), Ok(Some(LevelFilter::Info)));
        assert_eq!(args.log_filter(None), Ok(Some(LevelFilter::Info)));
    }

    #[test]
    fn test_log_level_flag_overrides_rust_log() {
        let args = Args::try_parse_from(["cloudgram", "--log-level", "warn"]).unwrap();
        assert_eq!(args.log_filter(Some("debug")), Ok(Some(LevelFilter::Warn)));

        let args = Args::try_parse_from(["cloudgram", "--log-level", "loud"]).unwrap();
        assert_eq!(args.log_filter(None), Err("loud".to_string()));
    }

    #[test]
    fn test_render_requires_spec_path() {
        assert!(Args::try_parse_from(["cloudgram", "render"]).is_err());
    }
}

//! CLI configuration

use std::path::PathBuf;

use clap::{Args, Parser};
use jiff::Timestamp;

use crate::conflicts::{ResolverOptions, TieBreak};

/// Log output format.
#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum LogFormat {
    /// Compact, human-readable logs.
    Compact,

    /// Structured JSON logs.
    Json,
}

/// Logging settings.
#[derive(Debug, Args)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, env = "RUST_LOG", default_value = "info")]
    pub log_level: String,

    /// Log format (compact, json)
    #[arg(long, env = "LOG_FORMAT", value_enum, default_value_t = LogFormat::Compact)]
    pub log_format: LogFormat,
}

/// Tie-break choice exposed on the command line.
#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum TieBreakArg {
    /// Keep the coupon listed first.
    FirstRequested,

    /// Keep the lexically smallest code.
    Lexical,
}

impl From<TieBreakArg> for TieBreak {
    fn from(value: TieBreakArg) -> Self {
        match value {
            TieBreakArg::FirstRequested => TieBreak::FirstRequested,
            TieBreakArg::Lexical => TieBreak::Lexical,
        }
    }
}

/// Coupon stack resolver
#[derive(Debug, Parser)]
#[command(name = "coupon-stack", about = "Resolve a checkout coupon stack", long_about = None)]
pub struct CliConfig {
    /// Fixture directory holding `coupons/<set>.yml`
    #[arg(long, env = "COUPON_FIXTURES", default_value = "./fixtures")]
    pub fixtures: PathBuf,

    /// Coupon set to load
    #[arg(short, long, default_value = "checkout")]
    pub set: String,

    /// Product being purchased
    #[arg(short, long)]
    pub product: String,

    /// Cart subtotal in cents
    #[arg(long, allow_negative_numbers = true)]
    pub subtotal: i64,

    /// Comma separated codes in preference order; picks the best single coupon when omitted
    #[arg(short, long)]
    pub codes: Option<String>,

    /// Evaluate as of this RFC 3339 instant instead of now
    #[arg(long)]
    pub at: Option<Timestamp>,

    /// Tie-break between non-stacking coupons with equal percent off
    #[arg(long, value_enum, default_value_t = TieBreakArg::FirstRequested)]
    pub tie_break: TieBreakArg,

    /// Logging output settings.
    #[command(flatten)]
    pub logging: LoggingConfig,
}

impl CliConfig {
    /// Load configuration from environment and CLI arguments
    ///
    /// # Errors
    ///
    /// Returns an error if configuration cannot be parsed
    pub fn load() -> Result<Self, clap::Error> {
        // Load .env file if present (ignore if missing)
        _ = dotenvy::dotenv();

        Self::try_parse()
    }

    /// Resolver options selected on the command line
    pub fn resolver_options(&self) -> ResolverOptions {
        ResolverOptions::with_tie_break(self.tie_break.into())
    }
}

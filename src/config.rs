//! Command-line arguments and the validated runtime configuration.

use std::path::PathBuf;
use std::time::Duration;

use chrono::Locale;
use clap::{Parser, ValueEnum};
use url::Url;

use crate::error::{Error, Result};

/// Browse a headless-CMS blog index in the terminal
#[derive(Parser, Debug)]
#[command(name = "postfeed")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Content API root, e.g. https://my-repo.cdn.prismic.io/api/v2
    #[arg(short, long, env = "POSTFEED_ENDPOINT")]
    pub endpoint: String,

    /// Custom type of the documents to list
    #[arg(short = 't', long, default_value = "posts")]
    pub document_type: String,

    /// Posts per page
    #[arg(
        short = 'n',
        long,
        default_value_t = 1,
        value_parser = clap::value_parser!(u32).range(1..=100)
    )]
    pub page_size: u32,

    /// Access token for private repositories
    #[arg(long, env = "POSTFEED_ACCESS_TOKEN", hide_env_values = true)]
    pub access_token: Option<String>,

    /// Per-request timeout in seconds
    #[arg(long, default_value_t = 30)]
    pub timeout_secs: u64,

    /// Language used for month names in publication dates (shown in local time)
    #[arg(long, value_enum, default_value_t = DateLocale::PtBr)]
    pub date_locale: DateLocale,

    /// Write logs to this file (the terminal UI owns stdout)
    #[arg(long)]
    pub log_file: Option<PathBuf>,

    /// Print the index as plain text instead of starting the UI
    #[arg(long)]
    pub print: bool,

    /// With --print, follow every page instead of only the first
    #[arg(long, requires = "print")]
    pub all: bool,
}

/// Locales offered for date formatting.
#[derive(Debug, Clone, Copy, Default, Eq, PartialEq, ValueEnum)]
pub enum DateLocale {
    #[default]
    PtBr,
    EnUs,
}

impl DateLocale {
    pub fn chrono_locale(self) -> Locale {
        match self {
            Self::PtBr => Locale::pt_BR,
            Self::EnUs => Locale::en_US,
        }
    }
}

/// How the program should present the index.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum Mode {
    Interactive,
    Print { all_pages: bool },
}

/// Validated configuration built from [`Cli`].
#[derive(Debug, Clone)]
pub struct Config {
    pub endpoint: Url,
    pub document_type: String,
    pub page_size: u32,
    pub access_token: Option<String>,
    pub timeout: Duration,
    pub date_locale: Locale,
    pub log_file: Option<PathBuf>,
    pub mode: Mode,
}

impl Config {
    pub fn from_cli(cli: Cli) -> Result<Self> {
        let endpoint = Url::parse(&cli.endpoint)?;
        if !matches!(endpoint.scheme(), "http" | "https") {
            return Err(Error::InvalidConfigValue {
                field: "endpoint".into(),
                message: format!("unsupported scheme '{}'", endpoint.scheme()),
            });
        }

        let document_type = cli.document_type.trim().to_string();
        if document_type.is_empty() {
            return Err(Error::InvalidConfigValue {
                field: "document_type".into(),
                message: "must not be empty".into(),
            });
        }

        if cli.timeout_secs == 0 {
            return Err(Error::InvalidConfigValue {
                field: "timeout_secs".into(),
                message: "must be at least 1".into(),
            });
        }

        let mode = if cli.print {
            Mode::Print { all_pages: cli.all }
        } else {
            Mode::Interactive
        };

        Ok(Self {
            endpoint,
            document_type,
            page_size: cli.page_size,
            access_token: cli.access_token.filter(|t| !t.is_empty()),
            timeout: Duration::from_secs(cli.timeout_secs),
            date_locale: cli.date_locale.chrono_locale(),
            log_file: cli.log_file,
            mode,
        })
    }
}

use clap::{Parser, ValueEnum};
use graphsnap_common::observability::LogFormat;
use graphsnap_social::bsky::Relationship;
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(
    name = "graphsnap",
    version,
    about = "Print a Bluesky account's follows, followers, mutes or blocks as `did,handle` lines"
)]
pub struct Cli {
    /// What to print.
    #[arg(value_enum)]
    pub command: Command,

    /// Optional YAML file with fetch/log settings; skipped when missing.
    #[arg(long, env = "GRAPHSNAP_CONFIG", default_value = "graphsnap.yaml")]
    pub config: PathBuf,

    #[arg(long, value_enum, default_value_t = LogFormatArg::Text)]
    pub log_format: LogFormatArg,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum Command {
    /// The authenticated account's DID, without a trailing newline.
    Id,
    Following,
    Followers,
    Mutes,
    Blocks,
}

impl Command {
    /// The listing this command prints, or `None` for `id`.
    pub fn relationship(self) -> Option<Relationship> {
        match self {
            Command::Id => None,
            Command::Following => Some(Relationship::Following),
            Command::Followers => Some(Relationship::Followers),
            Command::Mutes => Some(Relationship::Mutes),
            Command::Blocks => Some(Relationship::Blocks),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum LogFormatArg {
    Text,
    Json,
}

impl From<LogFormatArg> for LogFormat {
    fn from(arg: LogFormatArg) -> Self {
        match arg {
            LogFormatArg::Text => LogFormat::Text,
            LogFormatArg::Json => LogFormat::Json,
        }
    }
}

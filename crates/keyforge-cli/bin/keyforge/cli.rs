use clap::{Args, Parser, Subcommand, ValueEnum};
use jiff::Timestamp;
use keyforge_snowflake::{BackwardClockPolicy, NodeId};
use std::fmt::{Display, Formatter};

pub const NODE_ID_ENV: &str = "KEYFORGE_NODE_ID";
pub const EPOCH_ENV: &str = "KEYFORGE_EPOCH";
pub const LOG_FORMAT_ENV: &str = "KEYFORGE_LOG_FORMAT";

pub const DEFAULT_EPOCH: &str = "2022-01-01T00:00:00Z";

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogFormatArg {
    #[value(name = "text")]
    Text,
    #[value(name = "json")]
    Json,
}

impl Display for LogFormatArg {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            LogFormatArg::Text => write!(f, "text"),
            LogFormatArg::Json => write!(f, "json"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum BackwardClockArg {
    #[value(name = "wait")]
    Wait,
    #[value(name = "reuse")]
    Reuse,
}

impl Display for BackwardClockArg {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            BackwardClockArg::Wait => write!(f, "wait"),
            BackwardClockArg::Reuse => write!(f, "reuse"),
        }
    }
}

impl From<BackwardClockArg> for BackwardClockPolicy {
    fn from(value: BackwardClockArg) -> Self {
        match value {
            BackwardClockArg::Wait => BackwardClockPolicy::Wait,
            BackwardClockArg::Reuse => BackwardClockPolicy::Reuse,
        }
    }
}

#[derive(Debug, Parser)]
#[command(name = "keyforge", about = "Mint and inspect Snowflake primary keys")]
pub struct CLI {
    #[arg(
        long,
        global = true,
        env = LOG_FORMAT_ENV,
        value_enum,
        default_value_t = LogFormatArg::Text
    )]
    pub log_format: LogFormatArg,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Mint fresh ids for this node, one per line.
    Generate(GenerateArgs),
    /// Break ids down into creation time, node and sequence.
    Decode(DecodeArgs),
}

#[derive(Debug, Args)]
pub struct GenerateArgs {
    /// Node identifier; values above 1023 are reduced modulo 1024.
    #[arg(long, env = NODE_ID_ENV)]
    pub node_id: NodeId,

    #[arg(long, env = EPOCH_ENV, default_value = DEFAULT_EPOCH)]
    pub epoch: Timestamp,

    #[arg(long, short = 'n', default_value_t = 1)]
    pub count: usize,

    #[arg(long, value_enum, default_value_t = BackwardClockArg::Wait)]
    pub backward_clock: BackwardClockArg,
}

#[derive(Debug, Args)]
pub struct DecodeArgs {
    /// Decimal ids to decode.
    #[arg(required = true)]
    pub ids: Vec<String>,

    #[arg(long, env = EPOCH_ENV, default_value = DEFAULT_EPOCH)]
    pub epoch: Timestamp,

    /// Print one JSON object per id instead of text.
    #[arg(long)]
    pub json: bool,
}

use std::path::PathBuf;

use clap::{ArgAction, Parser as ClapParser, ValueEnum};
use drygen_common::Fork;
use tracing::Level;

pub const VERSION_STRING: &str = env!("CARGO_PKG_VERSION");

#[allow(clippy::upper_case_acronyms)]
#[derive(ClapParser)]
#[command(name = "drygen", author, version = VERSION_STRING, about = "Estimates the stack effect of EVM code without producing bytecode", long_about = None)]
pub struct CLI {
    #[clap(flatten)]
    pub opts: Options,
    #[arg(value_name = "PROGRAM_JSON", help = "JSON array of expressions to generate")]
    pub program: PathBuf,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum DialectKind {
    /// Builtins lower to the instructions a real assembler would emit.
    Real,
    /// Builtins only keep their stack effect.
    #[default]
    DryRun,
}

#[derive(ClapParser, Debug)]
pub struct Options {
    #[arg(
        long = "fork",
        default_value_t = Fork::default(),
        value_name = "FORK",
        env = "DRYGEN_FORK",
        help = "Hard fork whose instruction set the builtins are taken from"
    )]
    pub fork: Fork,
    #[arg(long = "dialect", value_enum, default_value_t = DialectKind::DryRun, value_name = "DIALECT")]
    pub dialect: DialectKind,
    #[arg(
        long = "object-access",
        action = ArgAction::SetTrue,
        help = "Expose datasize, dataoffset, loadimmutable and the other object access builtins"
    )]
    pub object_access: bool,
    #[arg(
        long = "object",
        value_name = "NAME",
        help = "Name of the object whose code is generated"
    )]
    pub object: Option<String>,
    #[arg(
        long = "sub-objects",
        value_name = "NAMES",
        value_delimiter = ',',
        help = "Sub-objects reachable from the current object, numbered in order"
    )]
    pub sub_objects: Vec<String>,
    #[arg(
        long = "strict",
        action = ArgAction::SetTrue,
        help = "Require every expression to leave the stack height unchanged"
    )]
    pub strict: bool,
    #[arg(long = "json", action = ArgAction::SetTrue, help = "Print the full report as JSON")]
    pub json: bool,
    #[arg(long = "log.level", default_value_t = Level::INFO, value_name = "LOG_LEVEL")]
    pub log_level: Level,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            fork: Fork::default(),
            dialect: DialectKind::default(),
            object_access: Default::default(),
            object: Default::default(),
            sub_objects: Default::default(),
            strict: Default::default(),
            json: Default::default(),
            log_level: Level::INFO,
        }
    }
}

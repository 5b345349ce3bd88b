use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use engine::StrategyKind;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// The injection configuration file (TOML)
    pub config: PathBuf,

    #[arg(long("cp"))]
    /// Additional search path roots, appended after the config file's entries
    pub classpath: Vec<PathBuf>,

    #[arg(long)]
    /// Output directory for patched classes, overriding the config file
    pub output: Option<PathBuf>,

    #[arg(long, value_enum)]
    /// Patch strategy, overriding the config file
    pub strategy: Option<StrategyArg>,

    #[arg(long)]
    /// Enable debug logging
    pub verbose: bool,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum StrategyArg {
    /// Rewrite constants and bodies directly in the loaded class
    Pool,
    /// Redefine the class through an isolated override layer
    Overlay,
}

impl From<StrategyArg> for StrategyKind {
    fn from(arg: StrategyArg) -> Self {
        match arg {
            StrategyArg::Pool => StrategyKind::Pool,
            StrategyArg::Overlay => StrategyKind::Overlay,
        }
    }
}

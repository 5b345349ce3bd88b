use std::{fs, process::exit};

use anyhow::Context;
use args::Cli;
use clap::Parser;
use engine::{config::ConfigFile, run::RunConfig};
use tracing::{error, info, Level};
use tracing_subscriber::fmt;

mod args;

fn load_run_config(args: &Cli) -> anyhow::Result<RunConfig> {
    let raw = fs::read_to_string(&args.config)
        .with_context(|| format!("could not read config file {}", args.config.display()))?;

    let file: ConfigFile = toml::from_str(&raw)
        .with_context(|| format!("could not parse config file {}", args.config.display()))?;

    let mut class_path = file.class_path;
    class_path.extend(args.classpath.iter().cloned());
    if class_path.is_empty() {
        anyhow::bail!("no search path configured; set class-path in the config or pass --cp");
    }

    let output = args
        .output
        .clone()
        .or(file.output)
        .ok_or_else(|| anyhow::anyhow!("no output directory configured; set output in the config or pass --output"))?;

    let strategy = args
        .strategy
        .map(Into::into)
        .unwrap_or(file.strategy);

    Ok(RunConfig {
        class_path,
        output,
        strategy,
        injections: file.injections,
    })
}

fn main() {
    let args = Cli::parse();

    let level = if args.verbose { Level::DEBUG } else { Level::INFO };
    let format = fmt::format()
        .with_ansi(true)
        .without_time()
        .with_level(true)
        .with_target(false)
        .with_thread_names(false)
        .compact();

    tracing_subscriber::fmt()
        .with_max_level(level)
        .event_format(format)
        .with_writer(std::io::stderr)
        .init();

    let config = match load_run_config(&args) {
        Ok(config) => config,
        Err(err) => {
            error!("{:#}", err);
            exit(2);
        }
    };

    let injections = config.injections.len();
    if let Err(err) = engine::execute(&config) {
        error!("{}", err);
        exit(1);
    }

    info!("Processed {} injections", injections);
}

mod demo;

use anyhow::{Context as _, Result};
use clap::{CommandFactory, Parser};

use compline::config::Config;
use compline::export::HIDDEN_SUBCOMMAND;
use compline::{CommandDef, Completer};

fn main() -> Result<()> {
    compline::logging::init_tracing();

    let args: Vec<String> = std::env::args().skip(1).collect();
    if let Some((first, rest)) = args.split_first() {
        if first == HIDDEN_SUBCOMMAND {
            return complete(rest);
        }
    }

    let cli = demo::Cli::parse();
    println!("{}", cli.summary());
    Ok(())
}

/// `compline _compline <shell> <tokens…> <current word>`
fn complete(args: &[String]) -> Result<()> {
    let config = Config::load().unwrap_or_else(|err| {
        tracing::warn!(error = %err, "falling back to default config");
        Config::default()
    });

    let root = CommandDef::from(&demo::Cli::command());
    let registry = demo::registry(&root)
        .install()
        .context("failed to install completion registry")?;

    let completer = Completer::new(root, registry).with_config(config);
    println!("{}", completer.serve(args));
    Ok(())
}

pub mod commands;
pub mod logging;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use twinbot_core::config::LoadOptions;

#[derive(Debug, Parser)]
#[command(
    name = "twinbot",
    about = "Twin dialog bot console",
    long_about = "Talk to a twin NLU agent from the terminal, inspect how utterances are classified, and check the effective configuration.",
    after_help = "Examples:\n  twinbot chat\n  twinbot say \"Привет Тоша\"\n  twinbot parse \"где бассейн?\"\n  twinbot intents"
)]
pub struct Cli {
    #[arg(long, global = true, help = "Path to a twinbot.toml config file")]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    #[command(about = "Start an interactive conversation on stdin/stdout")]
    Chat,
    #[command(about = "Run a single dialog turn and print the bot reply")]
    Say {
        #[arg(help = "Utterance to send")]
        text: String,
    },
    #[command(about = "Show the intent and entities the NLU service extracts from an utterance")]
    Parse {
        #[arg(help = "Utterance to classify")]
        text: String,
    },
    #[command(about = "List the intent types registered for the configured agent")]
    Intents,
    #[command(about = "Inspect effective configuration values with source attribution and redaction")]
    Config,
}

pub fn run() -> ExitCode {
    let cli = Cli::parse();
    let options = LoadOptions { config_path: cli.config, ..LoadOptions::default() };

    let result = match cli.command {
        Command::Chat => commands::chat::run(&options),
        Command::Say { text } => commands::chat::say(&options, &text),
        Command::Parse { text } => commands::parse::run(&options, &text),
        Command::Intents => commands::intents::run(&options),
        Command::Config => commands::config::run(&options),
    };

    println!("{}", result.output);
    ExitCode::from(result.exit_code)
}

use clap::{Parser as ClapParser, Subcommand, ValueEnum};
use simpcalc::config::Config;
use simpcalc::error::CompilerError;
use simpcalc::parser::Parser;
use simpcalc::scanner::Scanner;
use simpcalc::{scan_file, KeywordCase, TokenKind};
use std::path::{Path, PathBuf};
use std::process;

#[derive(ClapParser)]
#[command(
    author,
    version,
    about = "SimpCalc syntax checker",
    args_conflicts_with_subcommands = true
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
    /// Program to check (defaults to the configured sample file)
    file: Option<PathBuf>,
    /// Path to a JSON config file
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// How identifiers are matched against reserved words
    #[arg(long, global = true, value_enum)]
    keyword_case: Option<CaseArg>,
}

#[derive(Subcommand)]
enum Commands {
    /// Check that a file is a valid SimpCalc program
    Parse {
        file: Option<PathBuf>,
    },
    /// Print every token in a file
    Scan {
        file: Option<PathBuf>,
    },
    /// Manage the SimpCalc configuration file
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

#[derive(Subcommand)]
enum ConfigCommands {
    /// Write a config file with the default settings
    Init,
    /// Show the settings in effect
    Show,
}

#[derive(Clone, Copy, ValueEnum)]
enum CaseArg {
    Exact,
    Insensitive,
}

impl From<CaseArg> for KeywordCase {
    fn from(arg: CaseArg) -> Self {
        match arg {
            CaseArg::Exact => KeywordCase::Exact,
            CaseArg::Insensitive => KeywordCase::Insensitive,
        }
    }
}

fn init_logging(config: &Config) {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.log_filter)),
        )
        .with_writer(std::io::stderr)
        .try_init();
}

fn parse_program(file: PathBuf, config: &Config) -> Result<(), CompilerError> {
    let scanner = Scanner::from_path(&file)?.with_keyword_case(config.keyword_case);
    match Parser::new(scanner).parse() {
        Ok(()) => {
            println!("{} is a valid SimpCalc program", file.display());
            Ok(())
        }
        Err(error) => {
            println!("{}", error);
            process::exit(config.failure_exit_code);
        }
    }
}

fn init_config(config_path: &Path) -> Result<(), CompilerError> {
    if config_path.exists() {
        println!("Config file already exists at: {}", config_path.display());
        return Ok(());
    }

    Config::default().save(config_path)?;
    println!("Initialized new config file at: {}", config_path.display());
    Ok(())
}

fn scan_program(file: PathBuf, config: &Config) -> Result<(), CompilerError> {
    for token in scan_file(&file, config)? {
        if token.kind() == TokenKind::EndOfFile {
            break;
        }
        println!("{:<11} {}", token.kind(), token.lexeme());
    }
    Ok(())
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let mut config = match &cli.config {
        Some(path) => Config::load_from(path.clone())?,
        None => Config::load()?,
    };
    let config_path = cli.config.unwrap_or_else(Config::get_config_path);
    if let Some(case) = cli.keyword_case {
        config.keyword_case = case.into();
    }
    init_logging(&config);

    match cli.command {
        Some(Commands::Scan { file }) => {
            let file = file.unwrap_or_else(|| config.default_file.clone());
            scan_program(file, &config)?;
        }
        Some(Commands::Parse { file }) => {
            let file = file.unwrap_or_else(|| config.default_file.clone());
            parse_program(file, &config)?;
        }
        Some(Commands::Config { command }) => match command {
            ConfigCommands::Init => init_config(&config_path)?,
            ConfigCommands::Show => println!("{}", serde_json::to_string_pretty(&config)?),
        },
        None => {
            let file = cli.file.unwrap_or_else(|| config.default_file.clone());
            parse_program(file, &config)?;
        }
    }

    Ok(())
}

//! Main CLI application structure

use std::io::{self, IsTerminal};
use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;

use super::console::{BatchSource, Console};
use super::dispatch::Interpreter;
use super::editor::{CommandCompleter, EditorSource};
use super::output::Output;
use crate::domain::Registry;
use crate::storage::{Config, Overrides, Storage, StorageKind};

#[derive(Parser)]
#[command(name = "hbnb")]
#[command(author, version, about = "Command interpreter for the HBnB object store")]
pub struct Cli {
    /// Storage backend to use
    #[arg(long, value_enum, env = "HBNB_TYPE_STORAGE")]
    pub storage: Option<StorageKind>,

    /// Path of the JSON file used by the file backend
    #[arg(long, env = "HBNB_FILE_PATH")]
    pub file: Option<PathBuf>,

    /// Path of the SQLite database used by the db backend
    #[arg(long, env = "HBNB_DB_PATH")]
    pub db: Option<PathBuf>,

    /// Configuration file (defaults to ./hbnb.toml, then the global config)
    #[arg(long, env = "HBNB_CONFIG")]
    pub config: Option<PathBuf>,

    /// Enable verbose output for debugging
    #[arg(
        long,
        short = 'v',
        env = "HBNB_VERBOSE",
        value_parser = clap::builder::FalseyValueParser::new()
    )]
    pub verbose: bool,
}

impl Cli {
    fn overrides(&self) -> Overrides {
        Overrides {
            backend: self.storage,
            file_path: self.file.clone(),
            db_path: self.db.clone(),
        }
    }
}

/// Parses arguments and runs a console session on stdin/stdout
pub fn run() -> Result<()> {
    let cli = Cli::parse();

    let stdout = io::stdout();
    let mut output = Output::new(stdout.lock(), cli.verbose);
    output.verbose("hbnb console starting");

    let mut config = Config::load(cli.config.as_deref())?;
    if let Some(source) = &config.source {
        output.verbose_ctx("config", &format!("Loaded {}", source.display()));
    }
    config.apply(cli.overrides());

    let backend = config.storage.open_backend()?;
    let storage = Storage::open(backend, Registry::standard())?;
    output.verbose_ctx(
        "storage",
        &format!(
            "Loaded {} objects from {} backend",
            storage.all().len(),
            storage.backend_name()
        ),
    );

    let stdin = io::stdin();
    let interactive = stdin.is_terminal();
    output.verbose_ctx("console", &format!("interactive={}", interactive));

    let completer = CommandCompleter::new(storage.registry().names());
    let mut console = Console::new(Interpreter::new(storage), config.console.prompt.clone());
    if interactive {
        let mut source = EditorSource::new(completer)?;
        console.run(&mut source, &mut output)
    } else {
        console.run(&mut BatchSource::new(stdin.lock()), &mut output)
    }
}

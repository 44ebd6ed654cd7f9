use anyhow::Context;
use clap::Args;
use clap::Parser;
use clap::Subcommand;
use rusty_roster::config::AppConfig;
use rusty_roster::database::StudentStore;
use rusty_roster::http_server::HttpServer;
use rusty_roster::http_server::RosterState;
use rusty_roster::logging::init_logging;
use rusty_roster::validation::ErrorPolicy;
use rusty_roster::ImportMode;
use rusty_roster::ImportOutcome;
use rusty_roster::RosterService;
use std::path::Path;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "rusty-roster", version, about = "Student roster import, validation and export")]
struct Cli {
    /// TOML configuration file.
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the HTTP API.
    Serve(ServeArgs),
    /// Validate a workbook and store its students.
    Import(ImportArgs),
    /// Validate a workbook without storing anything.
    Check(CheckArgs),
    /// Write all stored students to a workbook.
    Export(ExportArgs),
}

#[derive(Args, Debug)]
struct ServeArgs {
    #[arg(long)]
    host: Option<String>,
    #[arg(long)]
    port: Option<u16>,
    /// DuckDB database file; in-memory when neither this nor the config sets one.
    #[arg(long, value_name = "FILE")]
    database: Option<PathBuf>,
}

#[derive(Args, Debug)]
struct ImportArgs {
    file: PathBuf,
    /// Update rows whose Id already exists instead of appending.
    #[arg(long, conflicts_with = "replace")]
    upsert: bool,
    /// Delete all stored students before inserting.
    #[arg(long)]
    replace: bool,
    /// Report errors from every row instead of stopping at the first invalid one.
    #[arg(long)]
    collect_all_errors: bool,
    #[arg(long, value_name = "FILE")]
    database: Option<PathBuf>,
}

#[derive(Args, Debug)]
struct CheckArgs {
    file: PathBuf,
    /// Validate against the upsert columns, which allow an Id.
    #[arg(long)]
    upsert: bool,
    #[arg(long)]
    collect_all_errors: bool,
}

#[derive(Args, Debug)]
struct ExportArgs {
    file: PathBuf,
    #[arg(long, value_name = "FILE")]
    database: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();
    let mut config = match &cli.config {
        Some(path) => AppConfig::load(path)?,
        None => AppConfig::default(),
    };
    init_logging(&config.logging)?;

    match cli.command {
        Command::Serve(args) => {
            if let Some(host) = args.host {
                config.server.host = host;
            }
            if let Some(port) = args.port {
                config.server.port = port;
            }
            override_database(&mut config, args.database);
            serve(config).await?;
            Ok(ExitCode::SUCCESS)
        }
        Command::Import(args) => {
            override_database(&mut config, args.database.clone());
            if args.collect_all_errors {
                config.validation.policy = ErrorPolicy::CollectAllErrors;
            }
            import(&config, &args)
        }
        Command::Check(args) => {
            if args.collect_all_errors {
                config.validation.policy = ErrorPolicy::CollectAllErrors;
            }
            check(&config, &args)
        }
        Command::Export(args) => {
            override_database(&mut config, args.database);
            export(&config, &args.file)?;
            Ok(ExitCode::SUCCESS)
        }
    }
}

fn override_database(config: &mut AppConfig, database: Option<PathBuf>) {
    if database.is_some() {
        config.database.path = database;
    }
}

fn open_service(config: &AppConfig) -> anyhow::Result<RosterService> {
    let store = match &config.database.path {
        Some(path) => StudentStore::open(path)
            .with_context(|| format!("Failed to open database '{}'", path.display()))?,
        None => StudentStore::open_in_memory().context("Failed to open in-memory database")?,
    };
    Ok(RosterService::new(store, config.validation.policy))
}

async fn serve(config: AppConfig) -> anyhow::Result<()> {
    let service = open_service(&config)?;
    let state = Arc::new(RosterState::new(service, config.upload.max_file_size));
    info!(
        database = ?config.database.path,
        policy = ?config.validation.policy,
        max_file_size = config.upload.max_file_size,
        "starting roster service"
    );
    HttpServer::with_config(config.server, state)
        .start()
        .await
        .context("HTTP server stopped")
}

fn read_file(path: &Path) -> anyhow::Result<(String, Vec<u8>)> {
    let bytes = std::fs::read(path).with_context(|| format!("Failed to read '{}'", path.display()))?;
    let name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());
    Ok((name, bytes))
}

fn print_errors(errors: &[String]) {
    for error in errors {
        eprintln!("{}", error);
    }
}

fn import(config: &AppConfig, args: &ImportArgs) -> anyhow::Result<ExitCode> {
    let (name, bytes) = read_file(&args.file)?;
    let mode = if args.upsert {
        ImportMode::Upsert
    } else {
        ImportMode::Insert { replace: args.replace }
    };

    match open_service(config)?.import(bytes, &name, mode)? {
        ImportOutcome::Rejected { errors } => {
            print_errors(&errors);
            Ok(ExitCode::FAILURE)
        }
        ImportOutcome::Imported { inserted, updated } => {
            println!("{}: {} inserted, {} updated", name, inserted, updated);
            Ok(ExitCode::SUCCESS)
        }
    }
}

fn check(config: &AppConfig, args: &CheckArgs) -> anyhow::Result<ExitCode> {
    let (name, bytes) = read_file(&args.file)?;
    let mode = if args.upsert {
        ImportMode::Upsert
    } else {
        ImportMode::Insert { replace: false }
    };

    let service = RosterService::new(StudentStore::open_in_memory()?, config.validation.policy);
    let result = service.check(bytes, &name, mode)?;
    if result.is_valid() {
        println!("{}: {} valid rows", name, result.rows.len());
        Ok(ExitCode::SUCCESS)
    } else {
        print_errors(&result.errors);
        Ok(ExitCode::FAILURE)
    }
}

fn export(config: &AppConfig, file: &Path) -> anyhow::Result<()> {
    let service = open_service(config)?;
    let bytes = service.export()?;
    std::fs::write(file, &bytes).with_context(|| format!("Failed to write '{}'", file.display()))?;
    println!("{}: {} students exported", file.display(), service.students()?.len());
    Ok(())
}

use env_logger::Env;
use log::{error, info};
use scaledb::{Database, DatabaseCli, DatabaseConfig, DbError, JsonFileStorage};
use std::env;
use std::path::PathBuf;
use std::process;

struct Args {
    config_path: Option<PathBuf>,
    data_dir: Option<PathBuf>,
    shard_size: Option<usize>,
}

fn main() {
    let args: Vec<String> = env::args().collect();
    let program = program_name(&args);

    let parsed = match parse_args(&args) {
        Ok(Some(parsed)) => parsed,
        Ok(None) => {
            print_help(program);
            return;
        }
        Err(message) => {
            eprintln!("❌ {}", message);
            print_help(program);
            process::exit(2);
        }
    };

    let config = match load_config(&parsed) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("❌ {}", e);
            process::exit(2);
        }
    };

    env_logger::Builder::from_env(Env::default().default_filter_or(config.log_level.as_str())).init();
    info!("Data directory: {}", config.data_directory.display());

    let database = match Database::open(JsonFileStorage::new(&config.data_directory)) {
        Ok(database) => database,
        Err(e) => {
            error!("Failed to open store: {}", e);
            process::exit(1);
        }
    };

    let mut cli = DatabaseCli::new(database, config.default_shard_size);
    if let Err(e) = cli.run() {
        error!("I/O error: {}", e);
        process::exit(1);
    }
}

/// File first, then environment, then flags.
fn load_config(args: &Args) -> Result<DatabaseConfig, DbError> {
    let mut config = match &args.config_path {
        Some(path) => DatabaseConfig::from_file(path)?,
        None => DatabaseConfig::default(),
    };
    config.apply_env_overrides()?;

    if let Some(dir) = &args.data_dir {
        config.data_directory = dir.clone();
    }
    if let Some(size) = args.shard_size {
        config.default_shard_size = size;
    }
    config.validate()?;
    Ok(config)
}

/// argv[0], or the binary name when the OS passes no arguments at all.
fn program_name(args: &[String]) -> &str {
    args.first().map(String::as_str).unwrap_or("scaledb")
}

/// `Ok(None)` means help was requested.
fn parse_args(args: &[String]) -> Result<Option<Args>, String> {
    let mut parsed = Args {
        config_path: None,
        data_dir: None,
        shard_size: None,
    };

    let mut iter = args.iter().skip(1);
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "-h" | "--help" | "help" => return Ok(None),
            "--config" => {
                let path = iter.next().ok_or("--config needs a path")?;
                parsed.config_path = Some(PathBuf::from(path));
            }
            "--data-dir" => {
                let dir = iter.next().ok_or("--data-dir needs a path")?;
                parsed.data_dir = Some(PathBuf::from(dir));
            }
            "--shard-size" => {
                let size = iter.next().ok_or("--shard-size needs a number")?;
                let size = size
                    .parse()
                    .map_err(|_| format!("--shard-size is not a number: {}", size))?;
                parsed.shard_size = Some(size);
            }
            other => return Err(format!("Unknown argument: {}", other)),
        }
    }

    Ok(Some(parsed))
}

fn print_help(program: &str) {
    println!("Usage:");
    println!("  {} [--config <file>] [--data-dir <dir>] [--shard-size <n>]", program);
    println!("  {} --help", program);
    println!();
    println!("Environment:");
    println!("  SCALEDB_DATA_DIR     data directory (default: data)");
    println!("  SCALEDB_SHARD_SIZE   default rows per shard (default: 5)");
    println!("  SCALEDB_LOG_LEVEL    log filter when RUST_LOG is unset (default: info)");
}

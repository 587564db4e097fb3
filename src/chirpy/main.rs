use chirpy::api::ChirpyApi;
use chirpy::config::{ChirpyConfig, CONFIG_FILENAME};
use chirpy::credential::Argon2Hasher;
use chirpy::error::{ChirpyError, Result};
use chirpy::model::{Chirp, User};
use chirpy::store::fs::FsBackend;
use chirpy::store::Store;
use clap::Parser;
use colored::*;
use directories::ProjectDirs;
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::Level;

mod args;
use args::{ChirpCommands, Cli, Commands, UserCommands};

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if let Err(e) = run(cli) {
        eprintln!("{} {}", "Error:".red().bold(), e);
        std::process::exit(exit_code(&e));
    }
}

/// 1 when the request was at fault, 2 when the store itself failed.
fn exit_code(e: &ChirpyError) -> i32 {
    if e.is_client_error() {
        1
    } else {
        2
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();
}

struct AppContext {
    api: ChirpyApi<FsBackend>,
    json: bool,
}

/// What a user looks like to the outside: never the credential.
#[derive(Serialize)]
struct UserView<'a> {
    id: u64,
    email: &'a str,
}

impl<'a> From<&'a User> for UserView<'a> {
    fn from(user: &'a User) -> Self {
        Self {
            id: user.id,
            email: &user.email,
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    let cli_config_path = config_path(&cli);
    let config = load_config(cli_config_path.as_deref(), cli.db.as_ref())?;
    let ctx = AppContext {
        api: ChirpyApi::new(Store::with_options(
            FsBackend::new(config.database_path.clone()),
            config.store_options(),
        )),
        json: cli.json,
    };

    match cli.command {
        Commands::Config { save } => handle_config(cli_config_path.as_deref(), &config, save),
        Commands::Init => handle_init(&ctx, &config),
        Commands::Chirp(cmd) => {
            ctx.api.initialize()?;
            match cmd {
                ChirpCommands::Create { body } => handle_create_chirp(&ctx, body.join(" ")),
                ChirpCommands::Get { id } => handle_get_chirp(&ctx, id),
                ChirpCommands::List => handle_list_chirps(&ctx),
            }
        }
        Commands::User(cmd) => {
            ctx.api.initialize()?;
            match cmd {
                UserCommands::Create { email, password } => {
                    handle_create_user(&ctx, &email, &password)
                }
                UserCommands::List => handle_list_users(&ctx),
            }
        }
        Commands::Login { email, password } => {
            ctx.api.initialize()?;
            handle_login(&ctx, &email, &password)
        }
    }
}

fn config_path(cli: &Cli) -> Option<PathBuf> {
    if let Some(path) = &cli.config {
        return Some(path.clone());
    }
    ProjectDirs::from("com", "chirpy", "chirpy").map(|d| d.config_dir().join(CONFIG_FILENAME))
}

fn load_config(path: Option<&Path>, db: Option<&PathBuf>) -> Result<ChirpyConfig> {
    let mut config = match path {
        Some(path) => ChirpyConfig::load(path)?,
        None => ChirpyConfig::default(),
    };
    if let Some(db) = db {
        config.database_path = db.clone();
    }
    Ok(config)
}

fn handle_config(path: Option<&Path>, config: &ChirpyConfig, save: bool) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(config)?);
    if save {
        let path = path.ok_or_else(|| {
            ChirpyError::Config("no config location on this platform".into())
        })?;
        config.save(path)?;
        println!("{} {}", "Saved".green(), path.display());
    }
    Ok(())
}

fn handle_init(ctx: &AppContext, config: &ChirpyConfig) -> Result<()> {
    let created = ctx.api.initialize()?;
    let path = config.database_path.display();
    if created {
        println!("{} {}", "Initialized".green(), path);
    } else {
        println!("Database ready at {}", path);
    }
    Ok(())
}

fn handle_create_chirp(ctx: &AppContext, body: String) -> Result<()> {
    let chirp = ctx.api.create_chirp(&body)?;
    print_chirps(ctx, std::slice::from_ref(&chirp))
}

fn handle_get_chirp(ctx: &AppContext, id: u64) -> Result<()> {
    let chirp = ctx.api.get_chirp(id)?;
    print_chirps(ctx, std::slice::from_ref(&chirp))
}

fn handle_list_chirps(ctx: &AppContext) -> Result<()> {
    let chirps = ctx.api.get_chirps()?;
    if chirps.is_empty() && !ctx.json {
        println!("{}", "No chirps yet.".dimmed());
        return Ok(());
    }
    print_chirps(ctx, &chirps)
}

fn handle_create_user(ctx: &AppContext, email: &str, password: &str) -> Result<()> {
    let user = ctx.api.register_user(&Argon2Hasher, email, password)?;
    print_users(ctx, std::slice::from_ref(&user))
}

fn handle_list_users(ctx: &AppContext) -> Result<()> {
    let mut users = ctx.api.get_users()?;
    users.sort_by_key(|u| u.id);
    print_users(ctx, &users)
}

fn handle_login(ctx: &AppContext, email: &str, password: &str) -> Result<()> {
    let user = ctx.api.login(&Argon2Hasher, email, password)?;
    if ctx.json {
        println!("{}", serde_json::to_string_pretty(&UserView::from(&user))?);
    } else {
        println!("{} {}", "Logged in as".green(), user.email);
    }
    Ok(())
}

fn print_chirps(ctx: &AppContext, chirps: &[Chirp]) -> Result<()> {
    if ctx.json {
        println!("{}", serde_json::to_string_pretty(chirps)?);
        return Ok(());
    }
    for chirp in chirps {
        println!("{} {}", format!("{:>4}.", chirp.id).yellow(), chirp.body);
    }
    Ok(())
}

fn print_users(ctx: &AppContext, users: &[User]) -> Result<()> {
    let views: Vec<UserView> = users.iter().map(UserView::from).collect();
    if ctx.json {
        println!("{}", serde_json::to_string_pretty(&views)?);
        return Ok(());
    }
    for view in views {
        println!("{} {}", format!("{:>4}.", view.id).yellow(), view.email);
    }
    Ok(())
}

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "chirpy")]
#[command(about = "File-backed store for chirps and users", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Database file (overrides CHIRPY_DB and the config file)
    #[arg(long, global = true, env = "CHIRPY_DB")]
    pub db: Option<PathBuf>,

    /// Config file (defaults to the platform config dir)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Print records as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Verbose output (-v info, -vv debug, -vvv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Create the database if it does not exist
    Init,

    /// Work with chirps
    #[command(subcommand)]
    Chirp(ChirpCommands),

    /// Work with users
    #[command(subcommand)]
    User(UserCommands),

    /// Check a user's password
    Login { email: String, password: String },

    /// Print the effective configuration
    Config {
        /// Also write it to the config file
        #[arg(long)]
        save: bool,
    },
}

#[derive(Subcommand, Debug)]
pub enum ChirpCommands {
    /// Post a new chirp
    #[command(alias = "n")]
    Create {
        /// Body of the chirp (words are joined with spaces)
        #[arg(required = true, num_args = 1..)]
        body: Vec<String>,
    },

    /// Show one chirp
    Get { id: u64 },

    /// List all chirps
    #[command(alias = "ls")]
    List,
}

#[derive(Subcommand, Debug)]
pub enum UserCommands {
    /// Register a user
    Create { email: String, password: String },

    /// List all users
    #[command(alias = "ls")]
    List,
}

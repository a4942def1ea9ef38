use blissdrive_backend::config::Config;
use blissdrive_backend::models::db_operations::users_db_operations;
use blissdrive_backend::setup::db_setup;
use clap::{Parser, Subcommand};
use rand::RngCore;
use redb::Database;
use rusqlite::Connection;
use std::fs;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "setup_cli", author, version, about = "A CLI for initial application setup.", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to the .env configuration file.
    #[arg(long, required = true, value_name = "FILE")]
    env_file: PathBuf,
}

#[derive(Subcommand, Debug)]
enum Commands {
    Db {
        #[command(subcommand)]
        action: DbAction,
    },
    User {
        #[command(subcommand)]
        action: UserAction,
    },
    /// Generates a fresh session signing key for the .env file.
    SessionKey,
}

#[derive(Subcommand, Debug)]
enum DbAction {
    Setup { db_type: Option<String> },
}

#[derive(Subcommand, Debug)]
enum UserAction {
    Create {
        #[arg(long)]
        email: String,
        #[arg(long)]
        name: String,
        #[arg(long)]
        password: String,
    },
    List,
    ChangePassword {
        #[arg(long)]
        email: String,
        #[arg(long)]
        new_password: String,
    },
}

fn main() {
    let cli = Cli::parse();

    let config =
        Config::from_env(&cli.env_file).expect("FATAL: Failed to load or parse configuration.");

    match &cli.command {
        Commands::Db { action } => match action {
            DbAction::Setup { db_type } => match db_type.as_deref() {
                Some("users") => setup_users_database(&config),
                Some("content") => setup_content_database(&config),
                Some(other) => eprintln!(
                    "❌ Error: Unknown database type '{}'. Use 'users' or 'content'.",
                    other
                ),
                None => {
                    setup_users_database(&config);
                    setup_content_database(&config);
                }
            },
        },
        Commands::User { action } => match action {
            UserAction::Create {
                email,
                name,
                password,
            } => create_account(&config, email, name, password),
            UserAction::List => list_accounts(&config),
            UserAction::ChangePassword {
                email,
                new_password,
            } => change_account_password(&config, email, new_password),
        },
        Commands::SessionKey => generate_session_key(),
    }
}

fn setup_users_database(config: &Config) {
    let db_path = config.users_db_path();
    if db_path.exists() {
        println!(
            "ℹ️ Users database already exists at '{}'. Skipping creation.",
            db_path.display()
        );
        return;
    }
    println!("\nSetting up users database at '{}'...", db_path.display());

    if let Some(parent_dir) = db_path.parent() {
        fs::create_dir_all(parent_dir).expect("Could not create database directory.");
    }

    let mut conn = Connection::open(&db_path).expect("Could not create users database file.");
    match db_setup::setup_users_db(&mut conn) {
        Ok(_) => println!("✅ Users database setup completed successfully."),
        Err(e) => eprintln!("❌ Error setting up users database: {}", e),
    }
}

fn setup_content_database(config: &Config) {
    let db_path = config.content_db_path();
    if db_path.exists() {
        println!(
            "ℹ️ Content database already exists at '{}'. Skipping creation.",
            db_path.display()
        );
        return;
    }
    println!("\nSetting up content database at '{}'...", db_path.display());

    if let Some(parent_dir) = db_path.parent() {
        fs::create_dir_all(parent_dir).expect("Could not create database directory.");
    }

    let db = Database::create(&db_path).expect("Failed to create content database file.");
    match db_setup::setup_content_db(&db) {
        Ok(_) => println!("✅ Content database setup completed successfully."),
        Err(e) => eprintln!("❌ Error setting up content database: {}", e),
    }
}

fn create_account(config: &Config, email: &str, name: &str, password: &str) {
    let db_path = config.users_db_path();
    if !db_path.exists() {
        eprintln!(
            "❌ Error: Users database not found at '{}'. Please run `setup_cli db setup` first.",
            db_path.display()
        );
        return;
    }
    let conn = Connection::open(&db_path).expect("Could not open users database.");

    match users_db_operations::create_user(&conn, email, name, password) {
        Ok(_) => println!("✅ Account '{}' created successfully.", email),
        Err(e) => eprintln!(
            "❌ Error creating account: {}. The email might already be registered.",
            e
        ),
    }
}

fn list_accounts(config: &Config) {
    let conn = match Connection::open(config.users_db_path()) {
        Ok(c) => c,
        Err(_) => {
            eprintln!("❌ Error: Users database not found. Please run `setup_cli db setup` first.");
            return;
        }
    };

    println!("Listing accounts:");
    match users_db_operations::read_all_emails(&conn) {
        Ok(emails) => {
            for email in emails {
                println!("- {}", email);
            }
        }
        Err(e) => eprintln!("❌ Error fetching accounts: {}", e),
    }
}

fn change_account_password(config: &Config, email: &str, new_password: &str) {
    let conn = match Connection::open(config.users_db_path()) {
        Ok(c) => c,
        Err(_) => {
            eprintln!("❌ Error: Users database not found.");
            return;
        }
    };

    match users_db_operations::update_password(&conn, email, new_password) {
        Ok(0) => eprintln!("❌ Error: No account with email '{}' found.", email),
        Ok(_) => println!("✅ Password for '{}' changed successfully.", email),
        Err(e) => eprintln!("❌ Error updating password: {}", e),
    }
}

fn generate_session_key() {
    let mut key = [0u8; 64];
    rand::thread_rng().fill_bytes(&mut key);
    println!("SESSION_SECRET_KEY={}", hex::encode(key));
}

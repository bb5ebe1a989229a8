use std::sync::Arc;

use anyhow::{anyhow, Result};
use clap::{Parser, Subcommand};
use sa_auth::{Engine, EngineConfig};
use sa_proto::{validate, DataMap};
use sa_store::MemoryStore;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "sa-cli")]
#[command(about = "Exercises the self-authentication packet engine end to end", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a full create-account / login / save-session / rename / remove
    /// scenario against an in-memory remote store.
    Demo {
        #[arg(default_value = "alice")]
        username: String,
        #[arg(default_value = "1234")]
        pin: String,
        #[arg(default_value = "hunter22")]
        password: String,
    },

    /// Validate a username against the input rules.
    CheckUsername { value: String },
    /// Validate a PIN against the input rules.
    CheckPin { value: String },
    /// Validate a password against the input rules.
    CheckPassword { value: String },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt().with_env_filter(EnvFilter::from_default_env()).init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Demo { username, pin, password } => run_demo(&username, &pin, &password).await,
        Commands::CheckUsername { value } => {
            println!("{}", validate::check_username(&value));
            Ok(())
        }
        Commands::CheckPin { value } => {
            println!("{}", validate::check_pin(&value));
            Ok(())
        }
        Commands::CheckPassword { value } => {
            println!("{}", validate::check_password(&value));
            Ok(())
        }
    }
}

async fn run_demo(username: &str, pin: &str, password: &str) -> Result<()> {
    if !validate::check_username(username) {
        return Err(anyhow!("username '{username}' fails validation"));
    }
    if !validate::check_pin(pin) {
        return Err(anyhow!("PIN fails validation"));
    }
    if !validate::check_password(password) {
        return Err(anyhow!("password fails validation"));
    }

    // The real remote/chunk store is an external collaborator; this demo
    // runs the engine against the in-memory reference implementation
    // shipped for tests.
    let store = Arc::new(MemoryStore::new());
    let engine = Engine::new(store, EngineConfig::default());

    let dm = DataMap::new(b"demo serialized datamap".to_vec());

    engine.create_user_sys_packets(username, pin).await?;
    println!("account created for {username}");

    engine.create_tmid_packet(username, pin, password, &dm).await?;
    println!("initial session packet stored");

    engine.session().reset();
    engine.get_user_info(username, pin).await?;
    let recovered = engine.get_user_data(password)?;
    println!("login recovered {} bytes of DataMap payload", recovered.payload.len());

    let dm2 = DataMap::new(b"demo serialized datamap, v2".to_vec());
    engine.save_session(&dm2).await?;
    println!(
        "session rotated; mid_rid={} smid_rid={}",
        engine.session().mid_rid(),
        engine.session().smid_rid()
    );

    let renamed = format!("{username}2");
    engine.change_username(&dm2, &renamed).await?;
    println!("username changed to {renamed}");

    engine.remove_me().await?;
    println!("account removed");

    Ok(())
}

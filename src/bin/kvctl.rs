//! Command-line client for the key-value facade.
//!
//! Talks to the same Redis instance as the gateway and issues facade
//! operations directly, without going through HTTP.
//!
//! # Usage
//!
//! ```bash
//! # Check the connection
//! cargo run --bin kvctl -- ping
//!
//! # Write with a one-minute TTL, then inspect it
//! cargo run --bin kvctl -- set greeting hello --ttl 60
//! cargo run --bin kvctl -- get greeting
//! cargo run --bin kvctl -- ttl greeting
//!
//! # Delete keys (asks for confirmation unless --yes)
//! cargo run --bin kvctl -- del greeting other
//!
//! # List keys and publish a message
//! cargo run --bin kvctl -- keys "user:*"
//! cargo run --bin kvctl -- publish events "deployed"
//! ```
//!
//! # Environment Variables
//!
//! - `REDIS_URL` or `REDIS_HOST` / `REDIS_PORT` / `REDIS_PASSWORD` / `REDIS_DB`

use kv_gateway::application::services::KvService;
use kv_gateway::config::{Config, mask_connection_string};
use kv_gateway::domain::entities::Expiry;
use kv_gateway::infrastructure::store::RedisStore;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::*;
use dialoguer::Confirm;
use std::sync::Arc;

/// CLI tool for the key-value store.
#[derive(Parser)]
#[command(name = "kvctl")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check that the store answers
    Ping,

    /// Read a value
    Get { key: String },

    /// Write a value
    Set {
        key: String,
        value: String,

        /// Expiry in seconds (0 or less means no expiry)
        #[arg(short, long, default_value_t = 0, allow_negative_numbers = true)]
        ttl: i64,
    },

    /// Show the remaining lifetime of a key
    Ttl { key: String },

    /// Delete one or more keys
    Del {
        #[arg(required = true)]
        keys: Vec<String>,

        /// Skip confirmation prompt
        #[arg(short = 'y', long)]
        yes: bool,
    },

    /// List keys matching a glob pattern
    Keys {
        #[arg(default_value = "*")]
        pattern: String,
    },

    /// Publish a message on a channel
    Publish { channel: String, message: String },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let config = Config::from_env()?;
    let redis_url = config
        .redis_url
        .context("REDIS_URL or REDIS_HOST must be set")?;

    let store = RedisStore::connect(&redis_url)
        .await
        .with_context(|| format!("Failed to connect to {}", mask_connection_string(&redis_url)))?;
    let kv = KvService::new(Arc::new(store));

    match cli.command {
        Commands::Ping => ping(&kv, &redis_url).await?,
        Commands::Get { key } => get(&kv, &key).await?,
        Commands::Set { key, value, ttl } => set(&kv, &key, &value, ttl).await?,
        Commands::Ttl { key } => ttl(&kv, &key).await?,
        Commands::Del { keys, yes } => delete(&kv, &keys, yes).await?,
        Commands::Keys { pattern } => keys(&kv, &pattern).await?,
        Commands::Publish { channel, message } => publish(&kv, &channel, &message).await?,
    }

    Ok(())
}

async fn ping(kv: &KvService, redis_url: &str) -> Result<()> {
    kv.ping().await.context("PING failed")?;
    println!(
        "{} {}",
        "✅ PONG from".green().bold(),
        mask_connection_string(redis_url).bright_black()
    );
    Ok(())
}

async fn get(kv: &KvService, key: &str) -> Result<()> {
    match kv.get(key).await? {
        Some(value) => println!("{}", value),
        None => println!("{}", "(nil)".bright_black()),
    }
    Ok(())
}

async fn set(kv: &KvService, key: &str, value: &str, ttl: i64) -> Result<()> {
    kv.set_with_ttl(key, value, ttl).await?;

    if ttl > 0 {
        println!(
            "{} {} (expires in {}s)",
            "✅ Stored".green(),
            key.cyan(),
            ttl.to_string().bright_white()
        );
    } else {
        println!("{} {}", "✅ Stored".green(), key.cyan());
    }
    Ok(())
}

async fn ttl(kv: &KvService, key: &str) -> Result<()> {
    match kv.get_expire(key).await? {
        Expiry::Remaining(seconds) => println!("{}s", seconds.to_string().bright_white()),
        Expiry::Persistent => println!("{}", "no expiry".yellow()),
        Expiry::Missing => println!("{}", "key does not exist".red()),
    }
    Ok(())
}

/// Deletes keys after an interactive confirmation (default: No).
async fn delete(kv: &KvService, keys: &[String], skip_confirm: bool) -> Result<()> {
    println!("{}", "🗑  Delete keys".bright_blue().bold());
    for key in keys {
        println!("  {}", key.cyan());
    }
    println!();

    if !skip_confirm {
        let confirmed = Confirm::new()
            .with_prompt(format!("Delete {} key(s)?", keys.len()))
            .default(false)
            .interact()?;

        if !confirmed {
            println!("{}", "❌ Cancelled".red());
            return Ok(());
        }
    }

    let deleted = kv.delete(keys).await?;
    println!(
        "{} {}/{}",
        "✅ Deleted".green().bold(),
        deleted.to_string().bright_white(),
        keys.len()
    );
    Ok(())
}

async fn keys(kv: &KvService, pattern: &str) -> Result<()> {
    let mut keys = kv.keys(pattern).await?;
    keys.sort();

    if keys.is_empty() {
        println!("{}", "  No keys found".yellow());
        return Ok(());
    }

    for key in &keys {
        println!("  {}", key.cyan());
    }
    println!();
    println!("  Total: {}", keys.len().to_string().bright_white().bold());
    Ok(())
}

async fn publish(kv: &KvService, channel: &str, message: &str) -> Result<()> {
    let receivers = kv.publish(channel, message).await?;
    println!(
        "{} {} ({} receiver(s))",
        "📣 Published to".green(),
        channel.cyan(),
        receivers.to_string().bright_white()
    );
    Ok(())
}

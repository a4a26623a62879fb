use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing::{info, warn};
use tracing_subscriber::{fmt, EnvFilter};

use zolory_core::models::server::DEFAULT_PREFIX;
use zolory_core::models::{CurrencyType, UserMetric};
use zolory_core::repositories::{
    EconomyRepository, ServerSettingsRepository, StatsRepository, UserRepository,
};
use zolory_core::tasks::sanction_sweep::run_sanction_sweep;
use zolory_core::{Database, Ledger, LedgerConfig};

#[derive(Parser, Debug)]
#[command(name = "zolory-admin")]
#[command(author, version, about = "Operator tool for the Zolory economy and moderation ledger")]
struct Args {
    /// SQLite URL. Overrides DATABASE_URL.
    #[arg(long, global = true)]
    database_url: Option<String>,

    /// Print results as JSON.
    #[arg(long, global = true, default_value = "false")]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Apply pending migrations.
    Migrate,
    /// Deactivate every expired mute and ban once.
    Sweep,
    /// Row counts across the ledger.
    Stats,
    /// Register a server (no-op if it already exists).
    RegisterServer {
        #[arg(long)]
        server_id: i64,
        #[arg(long)]
        name: String,
        #[arg(long, default_value = DEFAULT_PREFIX)]
        prefix: String,
    },
    /// Global user ranking: level, coins, gems, experience or reputation.
    Top {
        #[arg(long, default_value = "level")]
        metric: String,
        #[arg(long, default_value = "10")]
        limit: i64,
    },
    /// Claim the daily reward on a user's behalf (DAILY_REWARD coins).
    ClaimDaily {
        #[arg(long)]
        user_id: i64,
        #[arg(long)]
        server_id: i64,
    },
    /// Per-server balance ranking: coins or gems.
    Leaderboard {
        #[arg(long)]
        server_id: i64,
        #[arg(long, default_value = "coins")]
        currency: String,
        #[arg(long, default_value = "10")]
        limit: i64,
    },
}

fn init_tracing() -> anyhow::Result<()> {
    let filter = EnvFilter::from_default_env()
        .add_directive("zolory=info".parse().unwrap_or_default());
    let sub = fmt().with_env_filter(filter).finish();
    tracing::subscriber::set_global_default(sub).context("Failed to set global subscriber")?;
    Ok(())
}

fn metric_from_arg(raw: &str) -> UserMetric {
    let metric = UserMetric::from_selector(raw);
    if raw.parse::<UserMetric>().is_err() {
        warn!("Unknown metric '{}', ranking by {}", raw, metric);
    }
    metric
}

fn currency_from_arg(raw: &str) -> CurrencyType {
    let currency = CurrencyType::from_selector(raw);
    if raw.parse::<CurrencyType>().is_err() {
        warn!("Unknown currency '{}', using {}", raw, currency);
    }
    currency
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing()?;
    let args = Args::parse();

    let mut config = LedgerConfig::from_env()?;
    if let Some(url) = args.database_url.clone() {
        config.database_url = url;
    }
    info!("zolory-admin: {:?} on {}", args.command, config.database_url);

    let db = Database::from_config(&config).await?;
    db.migrate().await?;
    let ledger = Ledger::new(&db);

    match args.command {
        Command::Migrate => {
            println!("Migrations are up to date.");
        }
        Command::Sweep => {
            let report = run_sanction_sweep(&ledger.moderation).await?;
            println!("Deactivated {} mute(s) and {} ban(s).", report.mutes, report.bans);
        }
        Command::Stats => {
            let stats = ledger.stats.database_stats().await?;
            if args.json {
                println!("{}", serde_json::to_string_pretty(&stats)?);
            } else {
                println!("users:       {}", stats.total_users);
                println!("servers:     {}", stats.total_servers);
                println!("gambles:     {}", stats.total_gambles);
                println!("moderations: {}", stats.total_moderations);
            }
        }
        Command::RegisterServer { server_id, name, prefix } => {
            let settings = ledger.servers.create_server_settings(server_id, &name, &prefix).await?;
            if args.json {
                println!("{}", serde_json::to_string_pretty(&settings)?);
            } else {
                println!("{} '{}' prefix={}", settings.server_id, settings.server_name, settings.command_prefix);
            }
        }
        Command::Top { metric, limit } => {
            let metric = metric_from_arg(&metric);
            let users = ledger.users.top_users(metric, limit).await?;
            if args.json {
                println!("{}", serde_json::to_string_pretty(&users)?);
            } else {
                for (rank, user) in users.iter().enumerate() {
                    println!(
                        "{:>3}. {} (level {}, {} xp, {} rep)",
                        rank + 1, user.username, user.level, user.experience, user.reputation
                    );
                }
            }
        }
        Command::ClaimDaily { user_id, server_id } => {
            let claim = ledger.economy.claim_daily(user_id, server_id, config.daily_reward).await?;
            if claim.claimed {
                println!("Claimed {} coins, streak {}.", config.daily_reward, claim.streak);
            } else {
                println!("Still on cooldown, streak {}.", claim.streak);
            }
        }
        Command::Leaderboard { server_id, currency, limit } => {
            let currency = currency_from_arg(&currency);
            let entries = ledger.economy.leaderboard(server_id, currency, limit).await?;
            if args.json {
                println!("{}", serde_json::to_string_pretty(&entries)?);
            } else {
                for (rank, entry) in entries.iter().enumerate() {
                    println!("{:>3}. {} {} {}", rank + 1, entry.username, entry.amount, currency);
                }
            }
        }
    }

    db.close().await;
    Ok(())
}

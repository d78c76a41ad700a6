use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use teloxide::prelude::*;
use tracing::{error, info};

use versebot::sender::TelegramSender;
use versebot::session::Sessions;
use versebot::{config, db, handlers, health, scheduler};

#[derive(Debug, Parser)]
#[command(author, version, about)]
struct Args {
    /// Path to YAML config file
    #[arg(long, default_value = "config.yaml")]
    config: PathBuf,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_target(false)
        .compact()
        .init();

    let args = Args::parse();
    let cfg = config::load(Some(&args.config))?;
    cfg.ensure_dirs()?;

    let database_url = std::env::var("DATABASE_URL")
        .unwrap_or_else(|_| format!("sqlite://{}/versebot.db", cfg.app.data_dir));

    let pool = db::init_pool(&database_url).await?;
    db::run_migrations(&pool).await?;

    let subscribers = db::subscriber_count(&pool).await?;
    let verses = db::verse_count(&pool).await?;
    info!(subscribers, verses, "database ready");

    // Keep-alive endpoint for the external uptime monitor.
    let bind_addr = cfg.health.bind_addr.clone();
    tokio::spawn(async move {
        if let Err(err) = health::serve(&bind_addr).await {
            error!(?err, "health endpoint stopped");
        }
    });

    let bot = Bot::new(cfg.telegram.bot_token.clone());

    // Spawn the hourly delivery scheduler (single task; ticks never overlap).
    let scheduler_pool = pool.clone();
    let scheduler_sender = TelegramSender::new(bot.clone());
    let interval_seconds = cfg.app.tick_interval_seconds;
    let daily_hour = cfg.app.daily_hour;
    tokio::spawn(async move {
        scheduler::run(scheduler_pool, scheduler_sender, interval_seconds, daily_hour).await;
    });

    let cfg = Arc::new(cfg);
    let sessions = Sessions::new();

    info!("starting telegram bot");
    teloxide::repl(bot, move |bot: Bot, msg: Message| {
        let pool = pool.clone();
        let cfg = cfg.clone();
        let sessions = sessions.clone();
        async move {
            if let Err(err) = handlers::handle_update(&bot, &pool, &cfg, &sessions, &msg).await {
                error!(?err, "failed to handle update");
            }
            respond(())
        }
    })
    .await;

    Ok(())
}

use crate::config::Config;
use crate::db;
use crate::format;
use crate::selector;
use crate::session::Sessions;
use anyhow::Result;
use chrono::Utc;
use once_cell::sync::Lazy;
use regex::Regex;
use sqlx::SqlitePool;
use teloxide::payloads::SendMessageSetters;
use teloxide::prelude::*;
use teloxide::types::ParseMode;
use tracing::{info, instrument, warn};

static VERSE_REF_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(.+?)\s+(\d+):(\d+)$").expect("valid verse reference regex"));
static CHAPTER_REF_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(.+?)\s+(\d+)$").expect("valid chapter reference regex"));

#[instrument(skip_all)]
pub async fn handle_update(
    bot: &Bot,
    pool: &SqlitePool,
    cfg: &Config,
    sessions: &Sessions,
    msg: &Message,
) -> Result<()> {
    let Some(text) = msg.text() else {
        let _ = bot
            .send_message(msg.chat.id, "Send a word to search, or /help for commands.")
            .await;
        return Ok(());
    };

    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Ok(());
    }

    let chat_id = msg.chat.id.0;
    let (command, args) = split_command(trimmed);

    match command {
        Some("/start") => start(bot, pool, msg, chat_id).await,
        Some("/help") => help(bot, msg).await,
        Some("/search") => search(bot, pool, cfg, msg, args).await,
        Some("/topics") => topics(bot, pool, msg).await,
        Some("/topic") => topic(bot, pool, cfg, msg, args).await,
        Some("/verse") => verse(bot, pool, msg, args).await,
        Some("/chapter") => chapter(bot, pool, msg, args).await,
        Some("/book") => book(bot, pool, cfg, msg, args).await,
        Some("/books") => books(bot, pool, msg).await,
        Some("/votd") => votd(bot, pool, msg).await,
        Some("/random") => random(bot, pool, msg).await,
        Some("/subscribe") => subscribe(bot, pool, cfg, sessions, msg, chat_id).await,
        Some("/unsubscribe") => unsubscribe(bot, pool, msg, chat_id).await,
        Some("/mystatus") => mystatus(bot, pool, cfg, msg, chat_id).await,
        Some("/timezone") => timezone_command(bot, pool, cfg, sessions, msg, chat_id, args).await,
        Some(_) => {
            let _ = bot.send_message(msg.chat.id, "Unknown command.").await;
            Ok(())
        }
        // Bare text searches, mirroring the /search command.
        None => search(bot, pool, cfg, msg, trimmed).await,
    }
}

/// Split `/command args` into the command token and the remaining text.
/// Returns `None` for the command when the text is not a slash command.
fn split_command(text: &str) -> (Option<&str>, &str) {
    if !text.starts_with('/') {
        return (None, text);
    }
    match text.split_once(char::is_whitespace) {
        Some((cmd, rest)) => (Some(cmd), rest.trim()),
        None => (Some(text), ""),
    }
}

/// Parse a `Book Chapter:Verse` reference, e.g. "John 3:16".
fn parse_verse_ref(text: &str) -> Option<(&str, i64, i64)> {
    let caps = VERSE_REF_RE.captures(text.trim())?;
    let book = caps.get(1)?.as_str();
    let chapter = caps.get(2)?.as_str().parse().ok()?;
    let verse = caps.get(3)?.as_str().parse().ok()?;
    Some((book, chapter, verse))
}

/// Parse a `Book Chapter` reference, e.g. "Psalm 23".
fn parse_chapter_ref(text: &str) -> Option<(&str, i64)> {
    let caps = CHAPTER_REF_RE.captures(text.trim())?;
    let book = caps.get(1)?.as_str();
    let chapter = caps.get(2)?.as_str().parse().ok()?;
    Some((book, chapter))
}

async fn reply_markdown(bot: &Bot, msg: &Message, text: String) {
    let _ = bot
        .send_message(msg.chat.id, text)
        .parse_mode(ParseMode::Markdown)
        .await;
}

async fn start(bot: &Bot, pool: &SqlitePool, msg: &Message, chat_id: i64) -> Result<()> {
    let subscribed = db::is_subscribed(pool, chat_id).await?;
    let status = if subscribed {
        "✅ Subscribed to daily verses"
    } else {
        "❌ Not subscribed yet"
    };
    let welcome = format!(
        "🙏 *Welcome to Verse Bot!*\n\n{status}\n\n*📚 Commands:*\n\n*Search:*\n/search <word> - Search for verses\n/topic <topic> - Search by topic\n/topics - List all topics\n\n*Get Verses:*\n/verse John 3:16 - Get specific verse\n/chapter Psalm 23 - Get full chapter\n/book Romans - Browse a book\n/books - List all books\n\n*Daily:*\n/votd - Verse of the Day\n/random - Random verse\n/subscribe - Get daily verses each morning\n/timezone - Choose your timezone\n/unsubscribe - Stop daily verses\n\n/help - Show all commands"
    );
    reply_markdown(bot, msg, welcome).await;
    Ok(())
}

async fn help(bot: &Bot, msg: &Message) -> Result<()> {
    let help_text = "📖 *Verse Bot Help*\n\n*🔍 Search:*\n/search <word> - Search all verses\n/topic <topic> - Search by topic\n/topics - See all topics\n\n*📍 Specific Verses:*\n/verse John 3:16\n/chapter Psalm 23\n/book Romans\n/books - List all books\n\n*🌅 Daily Verses:*\n/votd - Verse of the Day\n/random - Random verse\n/subscribe - Auto daily verse at 6 AM local time\n/timezone - Pick your timezone first\n/unsubscribe - Stop daily verses\n/mystatus - Check subscription";
    reply_markdown(bot, msg, help_text.to_string()).await;
    Ok(())
}

async fn search(bot: &Bot, pool: &SqlitePool, cfg: &Config, msg: &Message, args: &str) -> Result<()> {
    if args.is_empty() {
        let _ = bot
            .send_message(
                msg.chat.id,
                "Please provide a word to search.\n\nExample: /search love",
            )
            .await;
        return Ok(());
    }
    let verses = db::search_verses(pool, args, cfg.app.search_limit).await?;
    if verses.is_empty() {
        let _ = bot
            .send_message(msg.chat.id, format!("❌ No verses found for '{args}'"))
            .await;
        return Ok(());
    }
    reply_markdown(bot, msg, format::search_results(args, &verses)).await;
    Ok(())
}

async fn topics(bot: &Bot, pool: &SqlitePool, msg: &Message) -> Result<()> {
    let topics = db::list_topics(pool).await?;
    reply_markdown(bot, msg, format::topics_overview(&topics)).await;
    Ok(())
}

async fn topic(bot: &Bot, pool: &SqlitePool, cfg: &Config, msg: &Message, args: &str) -> Result<()> {
    if args.is_empty() {
        let topics = db::list_topics(pool).await?;
        let text = format!(
            "Please provide a topic name.\n\n*Available topics:*\n{}\n\n*Example:* /topic salvation",
            topics.join(", ")
        );
        reply_markdown(bot, msg, text).await;
        return Ok(());
    }
    let name = args.to_lowercase();
    let verses = db::verses_by_topic(pool, &name, cfg.app.search_limit).await?;
    if verses.is_empty() {
        let topics = db::list_topics(pool).await?;
        let text = format!(
            "❌ Topic '{name}' not found.\n\n*Available topics:*\n{}",
            topics.join(", ")
        );
        reply_markdown(bot, msg, text).await;
        return Ok(());
    }
    reply_markdown(bot, msg, format::topic_results(&name, &verses)).await;
    Ok(())
}

async fn verse(bot: &Bot, pool: &SqlitePool, msg: &Message, args: &str) -> Result<()> {
    let Some((book, chapter, number)) = parse_verse_ref(args) else {
        let _ = bot
            .send_message(
                msg.chat.id,
                "Please use format: /verse Book Chapter:Verse\n\nExample: /verse John 3:16",
            )
            .await;
        return Ok(());
    };
    match db::find_verse(pool, book, chapter, number).await? {
        Some(found) => reply_markdown(bot, msg, format::verse_block(&found)).await,
        None => {
            let _ = bot
                .send_message(
                    msg.chat.id,
                    format!("❌ Verse not found: {book} {chapter}:{number}"),
                )
                .await;
        }
    }
    Ok(())
}

async fn chapter(bot: &Bot, pool: &SqlitePool, msg: &Message, args: &str) -> Result<()> {
    let Some((book, chapter)) = parse_chapter_ref(args) else {
        let _ = bot
            .send_message(
                msg.chat.id,
                "Please use format: /chapter Book Chapter\n\nExample: /chapter John 3",
            )
            .await;
        return Ok(());
    };
    let verses = db::chapter_verses(pool, book, chapter).await?;
    if verses.is_empty() {
        let _ = bot
            .send_message(msg.chat.id, format!("❌ Chapter not found: {book} {chapter}"))
            .await;
        return Ok(());
    }
    reply_markdown(bot, msg, format::chapter_message(book, chapter, &verses)).await;
    Ok(())
}

async fn book(bot: &Bot, pool: &SqlitePool, cfg: &Config, msg: &Message, args: &str) -> Result<()> {
    if args.is_empty() {
        let _ = bot
            .send_message(
                msg.chat.id,
                "Please provide a book name.\n\nExamples:\n/book John\n/book Genesis",
            )
            .await;
        return Ok(());
    }
    let verses = db::verses_by_book(pool, args, cfg.app.search_limit * 2).await?;
    if verses.is_empty() {
        let _ = bot
            .send_message(
                msg.chat.id,
                format!("❌ Book not found: {args}\n\nUse /books to see all books."),
            )
            .await;
        return Ok(());
    }
    reply_markdown(bot, msg, format::book_results(args, &verses)).await;
    Ok(())
}

async fn books(bot: &Bot, pool: &SqlitePool, msg: &Message) -> Result<()> {
    let books = db::list_books(pool).await?;
    reply_markdown(bot, msg, format::books_overview(&books)).await;
    Ok(())
}

async fn votd(bot: &Bot, pool: &SqlitePool, msg: &Message) -> Result<()> {
    let today = Utc::now().date_naive();
    match selector::verse_of_the_day(pool, today).await? {
        Some(verse) => reply_markdown(bot, msg, format::votd_message(&verse, today)).await,
        None => {
            let _ = bot
                .send_message(msg.chat.id, "❌ Could not get verse of the day.")
                .await;
        }
    }
    Ok(())
}

async fn random(bot: &Bot, pool: &SqlitePool, msg: &Message) -> Result<()> {
    match db::random_verse(pool).await? {
        Some(verse) => reply_markdown(bot, msg, format::random_message(&verse)).await,
        None => {
            let _ = bot
                .send_message(msg.chat.id, "❌ Could not get a random verse.")
                .await;
        }
    }
    Ok(())
}

async fn subscribe(
    bot: &Bot,
    pool: &SqlitePool,
    cfg: &Config,
    sessions: &Sessions,
    msg: &Message,
    chat_id: i64,
) -> Result<()> {
    if db::is_subscribed(pool, chat_id).await? {
        let text = format!(
            "✅ You're already subscribed to daily verses!\n\n📅 You'll receive verses every day at {}:00 local time\n\nUse /unsubscribe to stop.",
            cfg.app.daily_hour
        );
        let _ = bot.send_message(msg.chat.id, text).await;
        return Ok(());
    }

    let user = msg.from();
    let username = user.and_then(|u| u.username.as_deref());
    let first_name = user.map(|u| u.first_name.as_str());
    // A timezone picked via /timezone before subscribing; UTC otherwise.
    let tz = sessions
        .take_pending_timezone(chat_id)
        .await
        .unwrap_or_else(|| "UTC".to_string());

    if let Err(err) = db::upsert_subscriber(pool, chat_id, username, first_name, &tz).await {
        warn!(?err, chat_id, "failed to subscribe");
        let _ = bot
            .send_message(msg.chat.id, "❌ Failed to subscribe. Please try again.")
            .await;
        return Ok(());
    }

    info!(chat_id, timezone = %tz, "new subscriber");
    let total = db::subscriber_count(pool).await?;
    let text = format!(
        "🎉 *Successfully subscribed!*\n\n📅 You'll receive a verse every day at {}:00 ({tz})\n\n👥 Total subscribers: {total}\n\nUse /timezone to change your timezone.\nUse /unsubscribe anytime to stop.\nUse /votd to get today's verse now!",
        cfg.app.daily_hour
    );
    reply_markdown(bot, msg, text).await;
    Ok(())
}

async fn unsubscribe(bot: &Bot, pool: &SqlitePool, msg: &Message, chat_id: i64) -> Result<()> {
    if !db::is_subscribed(pool, chat_id).await? {
        let _ = bot
            .send_message(
                msg.chat.id,
                "ℹ️ You're not subscribed to daily verses.\n\nUse /subscribe to start receiving daily verses!",
            )
            .await;
        return Ok(());
    }
    if db::remove_subscriber(pool, chat_id).await? {
        info!(chat_id, "unsubscribed");
        reply_markdown(
            bot,
            msg,
            "👋 *Successfully unsubscribed*\n\nYou will no longer receive daily verses.\n\nUse /subscribe anytime to start again!".to_string(),
        )
        .await;
    } else {
        let _ = bot
            .send_message(msg.chat.id, "❌ Failed to unsubscribe. Please try again.")
            .await;
    }
    Ok(())
}

async fn mystatus(
    bot: &Bot,
    pool: &SqlitePool,
    cfg: &Config,
    msg: &Message,
    chat_id: i64,
) -> Result<()> {
    let text = match db::subscriber_timezone(pool, chat_id).await? {
        Some(tz) => {
            let total = db::subscriber_count(pool).await?;
            format!(
                "✅ *You are subscribed!*\n\n📅 Daily verse time: {}:00 ({tz})\n👥 Total subscribers: {total}\n\nUse /unsubscribe to stop.",
                cfg.app.daily_hour
            )
        }
        None => "❌ *You are not subscribed*\n\nUse /subscribe to get daily verses automatically!"
            .to_string(),
    };
    reply_markdown(bot, msg, text).await;
    Ok(())
}

async fn timezone_command(
    bot: &Bot,
    pool: &SqlitePool,
    cfg: &Config,
    sessions: &Sessions,
    msg: &Message,
    chat_id: i64,
    args: &str,
) -> Result<()> {
    if args.is_empty() {
        let mut text = String::from("🌍 *Choose your timezone:*\n\n");
        for option in &cfg.timezones {
            text.push_str(&format!("*{}* - {}\n", option.key, option.label));
        }
        text.push_str("\n*Usage:* /timezone <number>\n*Example:* /timezone 1");
        reply_markdown(bot, msg, text).await;
        return Ok(());
    }

    let Some(option) = cfg.timezone_by_key(args) else {
        let _ = bot
            .send_message(
                msg.chat.id,
                "❌ Unknown timezone. Use /timezone to see the available options.",
            )
            .await;
        return Ok(());
    };

    if db::set_subscriber_timezone(pool, chat_id, &option.offset).await? {
        info!(chat_id, timezone = %option.offset, "timezone updated");
        let text = format!(
            "✅ Timezone set to *{}* ({}).\n\nYour daily verse now arrives at your local morning.",
            option.label, option.offset
        );
        reply_markdown(bot, msg, text).await;
    } else {
        // Not subscribed yet: remember the choice for the upcoming /subscribe.
        sessions
            .set_pending_timezone(chat_id, option.offset.clone())
            .await;
        let text = format!(
            "🌍 Timezone *{}* noted.\n\nUse /subscribe to start receiving daily verses in your timezone.",
            option.label
        );
        reply_markdown(bot, msg, text).await;
    }
    Ok(())
}

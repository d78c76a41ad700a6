use super::model::{Book, ChapterVerse, SubscriberDelivery, Verse};
use anyhow::Result;
use chrono::Utc;
use sqlx::SqlitePool;
use tracing::instrument;

pub type Pool = SqlitePool;

const VERSE_SELECT: &str =
    "SELECT v.id, b.book_name, v.chapter, v.verse, v.text \
     FROM verses v JOIN books b ON v.book_id = b.book_id";

pub async fn init_pool(database_url: &str) -> Result<Pool> {
    let normalized = prepare_sqlite_url(database_url);
    let pool = SqlitePool::connect(&normalized).await?;
    // Enable WAL and stricter durability.
    sqlx::query("PRAGMA journal_mode=WAL;")
        .execute(&pool)
        .await?;
    sqlx::query("PRAGMA synchronous=FULL;")
        .execute(&pool)
        .await?;
    Ok(pool)
}

/// If using a file-backed SQLite URL, expand a leading `~/` and ensure the
/// parent directory exists. Leaves in-memory URLs untouched.
fn prepare_sqlite_url(url: &str) -> String {
    if !url.starts_with("sqlite:") || url.starts_with("sqlite::memory") {
        return url.to_string();
    }

    let rest = &url["sqlite:".len()..];
    let path_with_query = rest.strip_prefix("//").unwrap_or(rest);
    let (path_part, query_part) = match path_with_query.split_once('?') {
        Some((p, q)) => (p, Some(q)),
        None => (path_with_query, None),
    };
    if path_part.is_empty() {
        return url.to_string();
    }

    let expanded_path = match path_part.strip_prefix("~/") {
        Some(rest) => match std::env::var("HOME") {
            Ok(home) => format!("{}/{}", home.trim_end_matches('/'), rest),
            Err(_) => path_part.to_string(),
        },
        None => path_part.to_string(),
    };

    if let Some(parent) = std::path::Path::new(&expanded_path).parent() {
        if !parent.as_os_str().is_empty() {
            let _ = std::fs::create_dir_all(parent);
        }
    }

    let mut rebuilt = String::from("sqlite://");
    rebuilt.push_str(&expanded_path);
    if let Some(q) = query_part {
        rebuilt.push('?');
        rebuilt.push_str(q);
    }
    rebuilt
}

pub async fn run_migrations(pool: &Pool) -> Result<()> {
    sqlx::migrate!("./migrations").run(pool).await?;
    Ok(())
}

// ---------------------------------------------------------------------------
// Corpus store (read-only)
// ---------------------------------------------------------------------------

#[instrument(skip_all)]
pub async fn search_verses(pool: &Pool, keyword: &str, limit: i64) -> Result<Vec<Verse>> {
    let sql = format!("{VERSE_SELECT} WHERE v.text LIKE ? LIMIT ?");
    let verses = sqlx::query_as::<_, Verse>(&sql)
        .bind(format!("%{keyword}%"))
        .bind(limit)
        .fetch_all(pool)
        .await?;
    Ok(verses)
}

#[instrument(skip_all)]
pub async fn find_verse(
    pool: &Pool,
    book_fragment: &str,
    chapter: i64,
    verse: i64,
) -> Result<Option<Verse>> {
    let sql = format!("{VERSE_SELECT} WHERE b.book_name LIKE ? AND v.chapter = ? AND v.verse = ?");
    let found = sqlx::query_as::<_, Verse>(&sql)
        .bind(format!("%{book_fragment}%"))
        .bind(chapter)
        .bind(verse)
        .fetch_optional(pool)
        .await?;
    Ok(found)
}

#[instrument(skip_all)]
pub async fn chapter_verses(
    pool: &Pool,
    book_fragment: &str,
    chapter: i64,
) -> Result<Vec<ChapterVerse>> {
    let verses = sqlx::query_as::<_, ChapterVerse>(
        "SELECT v.verse, v.text FROM verses v JOIN books b ON v.book_id = b.book_id \
         WHERE b.book_name LIKE ? AND v.chapter = ? ORDER BY v.verse",
    )
    .bind(format!("%{book_fragment}%"))
    .bind(chapter)
    .fetch_all(pool)
    .await?;
    Ok(verses)
}

#[instrument(skip_all)]
pub async fn verses_by_book(pool: &Pool, book_fragment: &str, limit: i64) -> Result<Vec<Verse>> {
    let sql = format!("{VERSE_SELECT} WHERE b.book_name LIKE ? LIMIT ?");
    let verses = sqlx::query_as::<_, Verse>(&sql)
        .bind(format!("%{book_fragment}%"))
        .bind(limit)
        .fetch_all(pool)
        .await?;
    Ok(verses)
}

#[instrument(skip_all)]
pub async fn list_books(pool: &Pool) -> Result<Vec<Book>> {
    let books = sqlx::query_as::<_, Book>(
        "SELECT book_id, book_name, testament FROM books ORDER BY book_id",
    )
    .fetch_all(pool)
    .await?;
    Ok(books)
}

#[instrument(skip_all)]
pub async fn list_topics(pool: &Pool) -> Result<Vec<String>> {
    let topics = sqlx::query_scalar::<_, String>(
        "SELECT DISTINCT topic_name FROM topics ORDER BY topic_name",
    )
    .fetch_all(pool)
    .await?;
    Ok(topics)
}

#[instrument(skip_all)]
pub async fn verses_by_topic(pool: &Pool, topic: &str, limit: i64) -> Result<Vec<Verse>> {
    let verses = sqlx::query_as::<_, Verse>(
        "SELECT v.id, b.book_name, t.chapter, t.verse, v.text \
         FROM topics t \
         JOIN books b ON t.book_id = b.book_id \
         JOIN verses v ON t.book_id = v.book_id AND t.chapter = v.chapter AND t.verse = v.verse \
         WHERE t.topic_name = ? LIMIT ?",
    )
    .bind(topic.to_lowercase())
    .bind(limit)
    .fetch_all(pool)
    .await?;
    Ok(verses)
}

#[instrument(skip_all)]
pub async fn verse_count(pool: &Pool) -> Result<i64> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM verses")
        .fetch_one(pool)
        .await?;
    Ok(count)
}

#[instrument(skip_all)]
pub async fn verse_by_id(pool: &Pool, id: i64) -> Result<Option<Verse>> {
    let sql = format!("{VERSE_SELECT} WHERE v.id = ?");
    let verse = sqlx::query_as::<_, Verse>(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(verse)
}

#[instrument(skip_all)]
pub async fn random_verse(pool: &Pool) -> Result<Option<Verse>> {
    let sql = format!("{VERSE_SELECT} ORDER BY RANDOM() LIMIT 1");
    let verse = sqlx::query_as::<_, Verse>(&sql)
        .fetch_optional(pool)
        .await?;
    Ok(verse)
}

// ---------------------------------------------------------------------------
// Subscriber registry
// ---------------------------------------------------------------------------

#[instrument(skip_all)]
pub async fn upsert_subscriber(
    pool: &Pool,
    chat_id: i64,
    username: Option<&str>,
    first_name: Option<&str>,
    timezone: &str,
) -> Result<()> {
    sqlx::query(
        "INSERT OR REPLACE INTO subscribers (chat_id, username, first_name, subscribed_date, timezone) \
         VALUES (?, ?, ?, ?, ?)",
    )
    .bind(chat_id)
    .bind(username)
    .bind(first_name)
    .bind(Utc::now().date_naive().to_string())
    .bind(timezone)
    .execute(pool)
    .await?;
    Ok(())
}

#[instrument(skip_all)]
pub async fn remove_subscriber(pool: &Pool, chat_id: i64) -> Result<bool> {
    let result = sqlx::query("DELETE FROM subscribers WHERE chat_id = ?")
        .bind(chat_id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}

#[instrument(skip_all)]
pub async fn is_subscribed(pool: &Pool, chat_id: i64) -> Result<bool> {
    let found: Option<i64> = sqlx::query_scalar("SELECT chat_id FROM subscribers WHERE chat_id = ?")
        .bind(chat_id)
        .fetch_optional(pool)
        .await?;
    Ok(found.is_some())
}

#[instrument(skip_all)]
pub async fn subscriber_timezone(pool: &Pool, chat_id: i64) -> Result<Option<String>> {
    let tz: Option<String> =
        sqlx::query_scalar("SELECT timezone FROM subscribers WHERE chat_id = ?")
            .bind(chat_id)
            .fetch_optional(pool)
            .await?;
    Ok(tz)
}

/// Update the timezone of an existing subscriber. Returns false (and does
/// not insert) when the chat is not subscribed.
#[instrument(skip_all)]
pub async fn set_subscriber_timezone(pool: &Pool, chat_id: i64, timezone: &str) -> Result<bool> {
    let result = sqlx::query("UPDATE subscribers SET timezone = ? WHERE chat_id = ?")
        .bind(timezone)
        .bind(chat_id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}

#[instrument(skip_all)]
pub async fn list_subscribers(pool: &Pool) -> Result<Vec<SubscriberDelivery>> {
    let subscribers =
        sqlx::query_as::<_, SubscriberDelivery>("SELECT chat_id, timezone FROM subscribers")
            .fetch_all(pool)
            .await?;
    Ok(subscribers)
}

#[instrument(skip_all)]
pub async fn subscriber_count(pool: &Pool) -> Result<i64> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM subscribers")
        .fetch_one(pool)
        .await?;
    Ok(count)
}

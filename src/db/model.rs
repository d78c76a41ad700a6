//! Database entity and view models used by repositories.
//!
//! Keep these structs focused on the data returned by queries. Business logic
//! should live in higher layers.

use sqlx::FromRow;

/// One corpus verse joined with its book name. The `id` column is a dense
/// 1..N integer used by the daily selector's uniform draw.
#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct Verse {
    pub id: i64,
    pub book_name: String,
    pub chapter: i64,
    pub verse: i64,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct Book {
    pub book_id: i64,
    pub book_name: String,
    pub testament: String,
}

/// Verse slice returned when rendering a whole chapter.
#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct ChapterVerse {
    pub verse: i64,
    pub text: String,
}

/// Subscriber slice used by the delivery scheduler: just enough to decide
/// whether to dispatch and where.
#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct SubscriberDelivery {
    pub chat_id: i64,
    pub timezone: String,
}

//! Deterministic verse-of-the-day selection.
//!
//! The pick is a pure function of the calendar date and the corpus size:
//! the date collapses into a numeric seed, a seeded PRNG draws one id from
//! `1..=count`. Every caller on the same day sees the same verse without
//! any persisted daily-pick record.

use anyhow::Result;
use chrono::{Datelike, NaiveDate};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::db::{self, Pool, Verse};

pub fn date_seed(date: NaiveDate) -> u64 {
    let packed = date.year() as i64 * 10_000 + date.month() as i64 * 100 + date.day() as i64;
    packed as u64
}

/// Select the verse for `date`. `Ok(None)` only when the corpus is empty.
pub async fn verse_of_the_day(pool: &Pool, date: NaiveDate) -> Result<Option<Verse>> {
    let total = db::verse_count(pool).await?;
    if total == 0 {
        return Ok(None);
    }
    let mut rng = StdRng::seed_from_u64(date_seed(date));
    let id = rng.random_range(1..=total);
    db::verse_by_id(pool, id).await
}

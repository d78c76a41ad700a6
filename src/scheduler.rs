//! Hourly delivery scheduler.
//!
//! A single task wakes once per configured interval and runs one tick to
//! completion; `MissedTickBehavior::Skip` drops a tick that comes due while
//! the previous one is still dispatching, so ticks never overlap. Within a
//! tick, subscribers whose local hour matches the target hour receive the
//! day's verse. The hour-granular window means delivery is at most one
//! attempt per tick per subscriber, not exactly once per calendar day; a
//! subscriber straddling the window at tick time can miss a day or, with
//! timer drift, see a second attempt. That approximation is inherited
//! behavior and deliberately left as is.

use anyhow::Result;
use chrono::{DateTime, Timelike, Utc};
use std::time::Duration;
use tokio::time::MissedTickBehavior;
use tracing::{error, info, instrument, warn};

use crate::db::{self, Pool};
use crate::model::SendFailure;
use crate::sender::MessageSender;
use crate::{format, selector, timezone};

/// Counters reported by one tick.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickOutcome {
    pub subscribers: usize,
    pub matched: usize,
    pub sent: usize,
    pub removed: usize,
    pub failed: usize,
}

/// Drive the tick loop forever. Tick-level faults are logged and the loop
/// keeps going; they never take the process down.
pub async fn run(pool: Pool, sender: impl MessageSender, interval_seconds: u64, target_hour: u32) {
    let mut ticker = tokio::time::interval(Duration::from_secs(interval_seconds));
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
    loop {
        ticker.tick().await;
        match run_tick(&pool, &sender, target_hour, Utc::now()).await {
            Ok(outcome) => {
                if outcome.matched > 0 {
                    info!(
                        subscribers = outcome.subscribers,
                        matched = outcome.matched,
                        sent = outcome.sent,
                        removed = outcome.removed,
                        failed = outcome.failed,
                        "delivery tick finished"
                    );
                }
            }
            Err(err) => error!(?err, "delivery tick failed"),
        }
    }
}

/// Run one tick against the subscriber list as of `now`.
///
/// The day's verse is computed once per tick. Subscribers are processed
/// sequentially; a failure for one never aborts the rest. A permanent
/// transport failure (description containing "blocked" or "not found")
/// removes the subscriber so dead chats are not retried forever.
#[instrument(skip_all)]
pub async fn run_tick(
    pool: &Pool,
    sender: &dyn MessageSender,
    target_hour: u32,
    now: DateTime<Utc>,
) -> Result<TickOutcome> {
    let subscribers = db::list_subscribers(pool).await?;
    let mut outcome = TickOutcome {
        subscribers: subscribers.len(),
        ..Default::default()
    };
    if subscribers.is_empty() {
        return Ok(outcome);
    }

    let date = now.date_naive();
    let Some(verse) = selector::verse_of_the_day(pool, date).await? else {
        warn!("corpus is empty; skipping delivery tick");
        return Ok(outcome);
    };
    let message = format::daily_message(&verse, date);

    for subscriber in subscribers {
        let offset = timezone::resolve(&subscriber.timezone).unwrap_or_else(timezone::utc);
        if now.with_timezone(&offset).hour() != target_hour {
            continue;
        }
        outcome.matched += 1;
        match sender.send(subscriber.chat_id, &message, true).await {
            Ok(()) => outcome.sent += 1,
            Err(err) => {
                outcome.failed += 1;
                let description = format!("{err:#}");
                match SendFailure::classify(&description) {
                    SendFailure::Permanent => match db::remove_subscriber(pool, subscriber.chat_id)
                        .await
                    {
                        Ok(true) => {
                            outcome.removed += 1;
                            info!(
                                chat_id = subscriber.chat_id,
                                %description, "removed unreachable subscriber"
                            );
                        }
                        Ok(false) => {}
                        Err(err) => {
                            warn!(
                                ?err,
                                chat_id = subscriber.chat_id,
                                "failed to remove unreachable subscriber"
                            );
                        }
                    },
                    SendFailure::Transient => {
                        warn!(
                            chat_id = subscriber.chat_id,
                            %description, "daily verse delivery failed"
                        );
                    }
                }
            }
        }
    }

    Ok(outcome)
}

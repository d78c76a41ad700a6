//! Ephemeral per-chat conversation state.
//!
//! Holds a timezone chosen via `/timezone` before the chat has subscribed,
//! consumed by the next `/subscribe`. In-process only: a restart loses any
//! in-progress selection, and the user has to pick again. Durable state
//! belongs in the subscriber registry, not here.

use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;

#[derive(Clone, Default)]
pub struct Sessions {
    pending_timezones: Arc<Mutex<HashMap<i64, String>>>,
}

impl Sessions {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn set_pending_timezone(&self, chat_id: i64, timezone: String) {
        self.pending_timezones.lock().await.insert(chat_id, timezone);
    }

    pub async fn pending_timezone(&self, chat_id: i64) -> Option<String> {
        self.pending_timezones.lock().await.get(&chat_id).cloned()
    }

    /// Remove and return the pending selection, if any.
    pub async fn take_pending_timezone(&self, chat_id: i64) -> Option<String> {
        self.pending_timezones.lock().await.remove(&chat_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn take_clears_the_entry() {
        let sessions = Sessions::new();
        sessions.set_pending_timezone(10, "UTC+03:00".into()).await;
        assert_eq!(
            sessions.pending_timezone(10).await.as_deref(),
            Some("UTC+03:00")
        );
        assert_eq!(
            sessions.take_pending_timezone(10).await.as_deref(),
            Some("UTC+03:00")
        );
        assert_eq!(sessions.take_pending_timezone(10).await, None);
    }

    #[tokio::test]
    async fn sessions_are_per_chat() {
        let sessions = Sessions::new();
        sessions.set_pending_timezone(1, "UTC".into()).await;
        assert_eq!(sessions.pending_timezone(2).await, None);
    }
}

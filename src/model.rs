use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum Testament {
    Old,
    New,
}

impl Testament {
    pub fn as_str(&self) -> &'static str {
        match self {
            Testament::Old => "Old",
            Testament::New => "New",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "Old" => Some(Testament::Old),
            "New" => Some(Testament::New),
            _ => None,
        }
    }
}

/// Classification of an outbound send failure, derived from the transport's
/// free-text error description. Telegram reports a blocked bot as
/// "Forbidden: bot was blocked by the user" and a dead chat as
/// "Bad Request: chat not found"; the substring match on those phrases is
/// the observable contract we rely on.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum SendFailure {
    Permanent,
    Transient,
}

impl SendFailure {
    pub fn classify(description: &str) -> Self {
        let desc = description.to_lowercase();
        if desc.contains("blocked") || desc.contains("not found") {
            SendFailure::Permanent
        } else {
            SendFailure::Transient
        }
    }
}

//! One user message paired with its assistant reply.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Identifies an exchange. `Local` ids are provisional and never collide
/// with server-assigned `Remote` ids.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExchangeId {
    Local(u64),
    Remote(i64),
}

impl ExchangeId {
    pub fn is_local(&self) -> bool {
        matches!(self, ExchangeId::Local(_))
    }
}

impl fmt::Display for ExchangeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExchangeId::Local(n) => write!(f, "local-{n}"),
            ExchangeId::Remote(id) => write!(f, "{id}"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExchangeStatus {
    /// Inserted optimistically; the reply has not arrived.
    Pending,
    /// Confirmed by the server.
    Committed,
    /// Delivery failed. Only seen on the entry handed back by a rollback;
    /// a conversation never retains it.
    Failed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Exchange {
    pub id: ExchangeId,
    pub user_text: String,
    pub response_text: Option<String>,
    pub status: ExchangeStatus,
    pub created_at: Option<String>,
}

impl Exchange {
    pub(crate) fn pending(local_id: u64, user_text: impl Into<String>) -> Self {
        Self {
            id: ExchangeId::Local(local_id),
            user_text: user_text.into(),
            response_text: None,
            status: ExchangeStatus::Pending,
            created_at: None,
        }
    }

    pub fn is_pending(&self) -> bool {
        self.status == ExchangeStatus::Pending
    }
}

/// Wire shape of a stored exchange (`GET chat/` items and the `POST chat/`
/// reply).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExchangeRecord {
    pub id: i64,
    pub message: String,
    #[serde(default)]
    pub response: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
}

impl From<ExchangeRecord> for Exchange {
    fn from(record: ExchangeRecord) -> Self {
        Self {
            id: ExchangeId::Remote(record.id),
            user_text: record.message,
            response_text: record.response,
            status: ExchangeStatus::Committed,
            created_at: record.created_at,
        }
    }
}

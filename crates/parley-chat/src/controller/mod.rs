//! Optimistic conversation state machine.
//!
//! `submit` appends a pending exchange before any network call, then a
//! spawned delivery task sends it and either commits the server's record
//! in place or removes the entry. Reconciliation matches by the local id,
//! so it is a no-op if the conversation was reloaded or cleared meanwhile.

mod guard;


use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use parley_common::Event;
use parley_session::{ApiRequest, SessionManager};
use serde_json::json;
use tracing::{debug, info, warn};

use crate::conversation::Conversation;
use crate::endpoints;
use crate::error::ChatError;
use crate::exchange::{Exchange, ExchangeRecord};

use guard::ReplyGuard;

struct Inner {
    session: SessionManager,
    conversation: Mutex<Conversation>,
    next_local_id: AtomicU64,
    in_flight: Arc<AtomicUsize>,
}

/// Owns one user's conversation. Cheap to clone; clones share the same
/// sequence.
#[derive(Clone)]
pub struct ConversationController {
    inner: Arc<Inner>,
}

impl ConversationController {
    pub fn new(session: SessionManager) -> Self {
        Self {
            inner: Arc::new(Inner {
                session,
                conversation: Mutex::new(Conversation::default()),
                next_local_id: AtomicU64::new(1),
                in_flight: Arc::new(AtomicUsize::new(0)),
            }),
        }
    }

    pub fn session(&self) -> &SessionManager {
        &self.inner.session
    }

    /// Current sequence, oldest first.
    pub fn exchanges(&self) -> Vec<Exchange> {
        self.inner.conversation().snapshot()
    }

    /// True while at least one submitted exchange awaits its reply.
    pub fn is_awaiting_reply(&self) -> bool {
        self.inner.in_flight.load(Ordering::Acquire) > 0
    }

    /// Replace the sequence with the server's full history. On failure
    /// the current sequence is kept.
    pub async fn load(&self) -> Result<usize, ChatError> {
        let response = self
            .inner
            .session
            .execute(ApiRequest::get(endpoints::CHAT))
            .await?;
        let records: Vec<ExchangeRecord> = crate::decode(response)?;
        let count = records.len();

        self.inner
            .conversation()
            .replace_all(records.into_iter().map(Exchange::from));

        info!(count, "conversation loaded");
        self.inner
            .session
            .events()
            .publish(Event::ConversationLoaded { count });
        Ok(count)
    }

    /// Reset the server-side session, then empty the sequence. On failure
    /// the sequence is kept.
    pub async fn clear(&self) -> Result<(), ChatError> {
        let response = self
            .inner
            .session
            .execute(ApiRequest::post(endpoints::CLEAR, json!({})))
            .await?;
        response.error_for_status()?;

        self.inner.conversation().clear();
        info!("conversation cleared");
        self.inner.session.events().publish(Event::ConversationCleared);
        Ok(())
    }

    /// Send one message, showing it immediately.
    ///
    /// Returns the committed exchange, or the failure after the optimistic
    /// entry has been removed. Dropping the returned future does not cancel
    /// delivery; reconciliation still happens.
    pub async fn submit(&self, text: &str) -> Result<Exchange, ChatError> {
        if text.trim().is_empty() {
            return Err(ChatError::Validation("message must not be blank".into()));
        }

        let local_id = self.inner.next_local_id.fetch_add(1, Ordering::Relaxed);
        self.inner.conversation().push_pending(local_id, text);
        let guard = ReplyGuard::enter(&self.inner.in_flight);
        debug!(local_id, "optimistic exchange inserted");

        let inner = Arc::clone(&self.inner);
        let message = text.to_string();
        let delivery = tokio::spawn(async move {
            let _guard = guard;
            inner.deliver(local_id, message).await
        });

        match delivery.await {
            Ok(outcome) => outcome,
            Err(e) => {
                self.inner.roll_back(local_id);
                Err(ChatError::Interrupted(e.to_string()))
            }
        }
    }
}

impl Inner {
    fn conversation(&self) -> MutexGuard<'_, Conversation> {
        self.conversation
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    async fn deliver(&self, local_id: u64, message: String) -> Result<Exchange, ChatError> {
        let request = ApiRequest::post(endpoints::CHAT, json!({ "message": message }));
        let outcome = match self.session.execute(request).await {
            Ok(response) => crate::decode::<ExchangeRecord>(response).map_err(ChatError::from),
            Err(e) => Err(ChatError::from(e)),
        };

        match outcome {
            Ok(record) => {
                let id = record.id;
                let exchange = Exchange::from(record);
                if self.conversation().commit(local_id, exchange.clone()) {
                    info!(local_id, id, "exchange committed");
                    self.session
                        .events()
                        .publish(Event::ExchangeCommitted { id });
                } else {
                    debug!(local_id, id, "provisional exchange gone, reply not inserted");
                }
                Ok(exchange)
            }
            Err(e) => {
                warn!(local_id, "message delivery failed: {e}");
                self.roll_back(local_id);
                Err(e)
            }
        }
    }

    fn roll_back(&self, local_id: u64) {
        if let Some(removed) = self.conversation().roll_back(local_id) {
            debug!(local_id, status = ?removed.status, "optimistic exchange removed");
            self.session
                .events()
                .publish(Event::ExchangeRolledBack { local_id });
        }
    }
}

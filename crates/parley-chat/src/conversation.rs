//! Ordered exchange sequence. Insertion order is display order.

use crate::exchange::{Exchange, ExchangeId, ExchangeStatus};

#[derive(Debug, Default)]
pub(crate) struct Conversation {
    exchanges: Vec<Exchange>,
}

impl Conversation {
    pub(crate) fn snapshot(&self) -> Vec<Exchange> {
        self.exchanges.clone()
    }

    pub(crate) fn push_pending(&mut self, local_id: u64, user_text: &str) {
        self.exchanges.push(Exchange::pending(local_id, user_text));
    }

    fn position(&self, local_id: u64) -> Option<usize> {
        self.exchanges
            .iter()
            .position(|e| e.id == ExchangeId::Local(local_id))
    }

    /// Replace the provisional entry in place. Returns false if it is gone
    /// (the conversation was reloaded or cleared meanwhile).
    pub(crate) fn commit(&mut self, local_id: u64, exchange: Exchange) -> bool {
        match self.position(local_id) {
            Some(index) => {
                self.exchanges[index] = exchange;
                true
            }
            None => false,
        }
    }

    /// Remove the provisional entry, handing it back marked failed.
    pub(crate) fn roll_back(&mut self, local_id: u64) -> Option<Exchange> {
        let index = self.position(local_id)?;
        let mut removed = self.exchanges.remove(index);
        removed.status = ExchangeStatus::Failed;
        Some(removed)
    }

    pub(crate) fn replace_all(&mut self, exchanges: impl IntoIterator<Item = Exchange>) {
        self.exchanges = exchanges.into_iter().collect();
    }

    pub(crate) fn clear(&mut self) {
        self.exchanges.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::exchange::ExchangeRecord;

    fn committed(id: i64, text: &str) -> Exchange {
        Exchange::from(ExchangeRecord {
            id,
            message: text.into(),
            response: Some(format!("re: {text}")),
            created_at: None,
        })
    }

    #[test]
    fn commit_replaces_in_place() {
        let mut conversation = Conversation::default();
        conversation.replace_all([committed(1, "a"), committed(2, "b")]);
        conversation.push_pending(1, "c");
        conversation.push_pending(2, "d");

        assert!(conversation.commit(1, committed(3, "c")));

        let ids: Vec<_> = conversation.snapshot().iter().map(|e| e.id).collect();
        assert_eq!(
            ids,
            vec![
                ExchangeId::Remote(1),
                ExchangeId::Remote(2),
                ExchangeId::Remote(3),
                ExchangeId::Local(2),
            ]
        );
    }

    #[test]
    fn commit_of_missing_entry_is_noop() {
        let mut conversation = Conversation::default();
        conversation.push_pending(1, "a");
        conversation.clear();

        assert!(!conversation.commit(1, committed(9, "a")));
        assert!(conversation.snapshot().is_empty());
    }

    #[test]
    fn roll_back_removes_only_that_entry() {
        let mut conversation = Conversation::default();
        conversation.replace_all([committed(1, "a")]);
        conversation.push_pending(1, "b");
        conversation.push_pending(2, "c");

        let removed = conversation.roll_back(1).unwrap();

        assert_eq!(removed.status, ExchangeStatus::Failed);
        assert_eq!(removed.user_text, "b");
        let texts: Vec<_> = conversation
            .snapshot()
            .into_iter()
            .map(|e| e.user_text)
            .collect();
        assert_eq!(texts, vec!["a", "c"]);
        assert!(conversation.roll_back(1).is_none());
    }
}

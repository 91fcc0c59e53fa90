use std::collections::HashSet;

use chrono::NaiveDate;

use crate::{
    core::{
        CairnError,
        Card,
        CardId,
        Collection,
        Status,
        StoreError,
    },
    mail::MailTransport,
    store::CardStore,
};

#[derive(Debug, Default)]
pub struct PushReport {
    /// Cards whose status reached `Pushed`.
    pub committed: usize,
    /// Cards considered at commit time, i.e. still `PendingPush` after the
    /// send.
    pub attempted: usize,
    /// Commit updates that failed; the mail went out, these cards stay
    /// `PendingPush` and are included in the next push.
    pub failed: Vec<(CardId, StoreError)>,
}

/// Sends every `PendingPush` card of the collection in one message, then
/// marks each one `Pushed`.
///
/// The send happens exactly once, before any status mutation: a transport
/// failure leaves the whole batch `PendingPush` for a retry. The commit
/// re-reads the store and only touches cards that are still `PendingPush`,
/// so a concurrent edit between snapshot and commit wins over the push.
pub fn push_pending(
    store: &impl CardStore,
    transport: &impl MailTransport,
    collection: Collection,
    sender: &str,
    recipients: &[String],
    today: NaiveDate,
) -> Result<PushReport, CairnError> {
    if recipients.is_empty() {
        return Err(CairnError::NoRecipients);
    }

    let snapshot: Vec<Card> = store
        .list(collection)?
        .into_iter()
        .filter(|card| card.status == Status::PendingPush)
        .collect();
    if snapshot.is_empty() {
        return Err(CairnError::NoPendingCards);
    }

    let subject = collection.push_subject(today);
    let body = compose_digest(&snapshot);
    transport.send(sender, recipients, &subject, &body)?;

    // Commit only what was actually mailed: a card that turned PendingPush
    // during the send waits for the next batch.
    let sent: HashSet<CardId> = snapshot.iter().map(|card| card.id).collect();
    let mut report = PushReport::default();
    for mut card in store.list(collection)? {
        if !sent.contains(&card.id) || card.status != Status::PendingPush {
            continue;
        }
        report.attempted += 1;
        card.status = Status::Pushed;
        match store.update(&card) {
            Ok(()) => report.committed += 1,
            Err(e) => report.failed.push((card.id, e)),
        }
    }
    Ok(report)
}

/// One block per card, in store order, separated by blank lines.
fn compose_digest(cards: &[Card]) -> String {
    let blocks: Vec<String> = cards.iter().map(Card::digest_block).collect();
    blocks.join("\n")
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;
    use crate::{
        core::{
            CardDraft,
            Content,
            TransportError,
            Vocabulary,
        },
        store::MemoryStore,
    };

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 8, 6).unwrap()
    }

    fn recipients() -> Vec<String> {
        vec!["a@x.com".to_string()]
    }

    fn pending(store: &MemoryStore, headword: &str) -> Card {
        let mut card = store
            .insert(CardDraft::new(
                Content::Vocabulary(Vocabulary {
                    headword: headword.to_string(),
                    ..Default::default()
                }),
                date(),
            ))
            .unwrap();
        card.status = Status::PendingPush;
        store.update(&card).unwrap();
        card
    }

    #[derive(Default)]
    struct SentMail {
        to: Vec<String>,
        subject: String,
        body: String,
    }

    /// Records sends; optionally fails, or runs a hook before succeeding.
    #[derive(Default)]
    struct MockTransport<'a> {
        sent: Mutex<Vec<SentMail>>,
        fail: bool,
        on_send: Option<Box<dyn Fn() + 'a>>,
    }

    impl MailTransport for MockTransport<'_> {
        fn send(
            &self,
            _from: &str,
            to: &[String],
            subject: &str,
            body: &str,
        ) -> Result<(), TransportError> {
            if self.fail {
                return Err(TransportError::Custom("connection refused".to_string()));
            }
            if let Some(hook) = &self.on_send {
                hook();
            }
            self.sent.lock().unwrap().push(SentMail {
                to: to.to_vec(),
                subject: subject.to_string(),
                body: body.to_string(),
            });
            Ok(())
        }
    }

    #[test]
    fn empty_recipient_list_fails_before_any_side_effect() {
        let store = MemoryStore::new();
        pending(&store, "apple");
        let transport = MockTransport::default();

        let err = push_pending(&store, &transport, Collection::Vocabulary, "s@x.com", &[], date())
            .unwrap_err();
        assert!(matches!(err, CairnError::NoRecipients));
        assert!(transport.sent.lock().unwrap().is_empty());
        assert_eq!(
            store.list(Collection::Vocabulary).unwrap()[0].status,
            Status::PendingPush
        );
    }

    #[test]
    fn no_pending_cards_fails_without_sending() {
        let store = MemoryStore::new();
        store
            .insert(CardDraft::new(
                Content::Vocabulary(Vocabulary {
                    headword: "reviewed only".to_string(),
                    ..Default::default()
                }),
                date(),
            ))
            .unwrap();
        let transport = MockTransport::default();

        let err = push_pending(
            &store,
            &transport,
            Collection::Vocabulary,
            "s@x.com",
            &recipients(),
            date(),
        )
        .unwrap_err();
        assert!(matches!(err, CairnError::NoPendingCards));
        assert!(transport.sent.lock().unwrap().is_empty());
    }

    #[test]
    fn successful_push_commits_every_pending_card() {
        let store = MemoryStore::new();
        pending(&store, "apple");
        pending(&store, "banana");
        let transport = MockTransport::default();

        let report = push_pending(
            &store,
            &transport,
            Collection::Vocabulary,
            "s@x.com",
            &recipients(),
            date(),
        )
        .unwrap();
        assert_eq!(report.committed, 2);
        assert_eq!(report.attempted, 2);
        assert!(report.failed.is_empty());

        for card in store.list(Collection::Vocabulary).unwrap() {
            assert_eq!(card.status, Status::Pushed);
        }

        let sent = transport.sent.lock().unwrap();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].to, recipients());
        assert_eq!(sent[0].subject, "Vocabulary card push 2026-08-06");
        assert!(sent[0].body.contains("[apple]"));
        assert!(sent[0].body.contains("[banana]"));
    }

    #[test]
    fn transport_failure_mutates_nothing() {
        let store = MemoryStore::new();
        pending(&store, "apple");
        pending(&store, "banana");
        let transport = MockTransport { fail: true, ..Default::default() };

        let err = push_pending(
            &store,
            &transport,
            Collection::Vocabulary,
            "s@x.com",
            &recipients(),
            date(),
        )
        .unwrap_err();
        assert!(matches!(err, CairnError::Transport(_)));

        for card in store.list(Collection::Vocabulary).unwrap() {
            assert_eq!(card.status, Status::PendingPush);
        }
    }

    #[test]
    fn card_edited_away_during_send_is_excluded_from_commit() {
        let store = MemoryStore::new();
        let kept = pending(&store, "apple");
        let edited = pending(&store, "banana");

        let transport = MockTransport {
            on_send: Some(Box::new(|| {
                // A concurrent operator reconsiders one card mid-send.
                let mut card = edited.clone();
                card.status = Status::Reviewed;
                store.update(&card).unwrap();
            })),
            ..Default::default()
        };

        let report = push_pending(
            &store,
            &transport,
            Collection::Vocabulary,
            "s@x.com",
            &recipients(),
            date(),
        )
        .unwrap();
        assert_eq!(report.attempted, 1);
        assert_eq!(report.committed, 1);

        let cards = store.list(Collection::Vocabulary).unwrap();
        assert_eq!(cards.iter().find(|c| c.id == kept.id).unwrap().status, Status::Pushed);
        assert_eq!(cards.iter().find(|c| c.id == edited.id).unwrap().status, Status::Reviewed);
    }

    #[test]
    fn card_queued_during_send_waits_for_the_next_batch() {
        let store = MemoryStore::new();
        pending(&store, "apple");

        let transport = MockTransport {
            on_send: Some(Box::new(|| {
                pending(&store, "latecomer");
            })),
            ..Default::default()
        };

        let report = push_pending(
            &store,
            &transport,
            Collection::Vocabulary,
            "s@x.com",
            &recipients(),
            date(),
        )
        .unwrap();
        assert_eq!(report.committed, 1);
        assert_eq!(report.attempted, 1);

        // The latecomer was never mailed, so it stays pending.
        let cards = store.list(Collection::Vocabulary).unwrap();
        assert_eq!(cards.iter().filter(|c| c.status == Status::PendingPush).count(), 1);
        assert_eq!(cards.iter().filter(|c| c.status == Status::Pushed).count(), 1);
    }

    #[test]
    fn commit_failure_is_isolated_per_card() {
        let store = MemoryStore::new();
        let ok = pending(&store, "apple");
        let broken = pending(&store, "banana");
        store.fail_updates([broken.id]);
        let transport = MockTransport::default();

        let report = push_pending(
            &store,
            &transport,
            Collection::Vocabulary,
            "s@x.com",
            &recipients(),
            date(),
        )
        .unwrap();
        assert_eq!(report.attempted, 2);
        assert_eq!(report.committed, 1);
        assert_eq!(report.failed.len(), 1);
        assert_eq!(report.failed[0].0, broken.id);

        // Exactly one send happened despite the commit failure.
        assert_eq!(transport.sent.lock().unwrap().len(), 1);

        let cards = store.list(Collection::Vocabulary).unwrap();
        assert_eq!(cards.iter().find(|c| c.id == ok.id).unwrap().status, Status::Pushed);
        assert_eq!(
            cards.iter().find(|c| c.id == broken.id).unwrap().status,
            Status::PendingPush
        );
    }

    #[test]
    fn digest_preserves_store_order_and_fields() {
        let store = MemoryStore::new();
        let mut card = store
            .insert(CardDraft::new(
                Content::Vocabulary(Vocabulary {
                    headword: "ephemeral".to_string(),
                    phonetic: "/əˈfem(ə)rəl/".to_string(),
                    definition: "lasting a very short time".to_string(),
                    example: "an ephemeral fashion".to_string(),
                    note: String::new(),
                    source: "https://example.com/wotd".to_string(),
                }),
                date(),
            ))
            .unwrap();
        card.status = Status::PendingPush;
        store.update(&card).unwrap();

        let snapshot = store.list(Collection::Vocabulary).unwrap();
        let body = compose_digest(&snapshot);
        assert!(body.starts_with("[ephemeral]\nDate: 2026-08-06\n"));
        assert!(body.contains("Definition: lasting a very short time"));
        assert!(body.contains("Source: https://example.com/wotd"));
    }
}

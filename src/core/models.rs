use std::fmt;

use chrono::NaiveDate;
use serde::{
    Deserialize,
    Serialize,
};

/// Store-assigned identifier, unique within a collection and never reused.
pub type CardId = i64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Collection {
    Vocabulary,
    Correction,
}

impl Collection {
    pub fn table(&self) -> &'static str {
        match self {
            Collection::Vocabulary => "vocab_cards",
            Collection::Correction => "phrasing_cards",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Collection::Vocabulary => "vocabulary",
            Collection::Correction => "correction",
        }
    }

    pub fn push_subject(&self, date: NaiveDate) -> String {
        match self {
            Collection::Vocabulary => format!("Vocabulary card push {}", date),
            Collection::Correction => format!("Correction card push {}", date),
        }
    }
}

/// Review workflow state. The ordering is the natural progression shown to
/// users; edits may set any value except `Pushed`, which is only written by a
/// confirmed push.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    #[default]
    Unreviewed,
    Reviewed,
    PendingPush,
    Pushed,
}

impl Status {
    pub const ALL: [Status; 4] =
        [Status::Unreviewed, Status::Reviewed, Status::PendingPush, Status::Pushed];

    pub fn as_str(&self) -> &'static str {
        match self {
            Status::Unreviewed => "unreviewed",
            Status::Reviewed => "reviewed",
            Status::PendingPush => "pending_push",
            Status::Pushed => "pushed",
        }
    }

    /// Exact label lookup, tolerant of surrounding whitespace.
    pub fn from_label(label: &str) -> Option<Status> {
        let label = label.trim();
        Status::ALL.iter().copied().find(|s| s.as_str() == label)
    }

    /// Maps a legacy or damaged persisted label onto the closed enum. Used by
    /// the one-shot repair pass, not by steady-state reads.
    ///
    /// `Unreviewed` is matched before `Reviewed` since its label contains the
    /// latter as a substring.
    pub fn repair_label(raw: &str) -> Status {
        let raw = raw.trim().to_lowercase();
        if let Some(status) = Status::from_label(&raw) {
            return status;
        }
        for status in [Status::Unreviewed, Status::PendingPush, Status::Pushed, Status::Reviewed] {
            if raw.contains(status.as_str()) {
                return status;
            }
        }
        Status::Unreviewed
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Vocabulary {
    pub headword: String,
    pub phonetic: String,
    pub definition: String,
    pub example: String,
    pub note: String,
    pub source: String, // URL the entry was taken from, if any
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Correction {
    pub source_text: String, // what was originally said, source language
    pub target_text: String, // how it came out in the target language
    pub meaning: String,     // what was actually meant
    pub recommended: String, // suggested phrasing
    pub issue_type: String,  // category of the problem
}

/// Content fields of a card. The variant decides which collection the card
/// belongs to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Content {
    Vocabulary(Vocabulary),
    Correction(Correction),
}

impl Content {
    pub fn collection(&self) -> Collection {
        match self {
            Content::Vocabulary(_) => Collection::Vocabulary,
            Content::Correction(_) => Collection::Correction,
        }
    }

    /// Normalized identity of the card's content. `None` when every
    /// constituent field trims to empty, in which case the card is exempt
    /// from dedup and import matching.
    pub fn identity_key(&self) -> Option<IdentityKey> {
        match self {
            Content::Vocabulary(v) => IdentityKey::of(&[&v.headword]),
            Content::Correction(c) => IdentityKey::of(&[
                &c.source_text,
                &c.target_text,
                &c.meaning,
                &c.recommended,
                &c.issue_type,
            ]),
        }
    }
}

/// Trimmed, case-folded tuple of a card's content fields. Excludes id,
/// status and date, so edits to those never change a card's identity.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct IdentityKey(Vec<String>);

impl IdentityKey {
    fn of(fields: &[&str]) -> Option<IdentityKey> {
        let parts: Vec<String> = fields.iter().map(|f| f.trim().to_lowercase()).collect();
        if parts.iter().all(|p| p.is_empty()) {
            None
        } else {
            Some(IdentityKey(parts))
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Card {
    pub id: CardId,
    pub status: Status,
    pub date: NaiveDate, // creation date, preserved verbatim by edits
    pub content: Content,
}

impl Card {
    pub fn collection(&self) -> Collection {
        self.content.collection()
    }

    pub fn identity_key(&self) -> Option<IdentityKey> {
        self.content.identity_key()
    }

    /// Plain-text block for the push digest, one card per block.
    pub fn digest_block(&self) -> String {
        match &self.content {
            Content::Vocabulary(v) => format!(
                "[{}]\nDate: {}\nPhonetic: {}\nDefinition: {}\nExample: {}\nNote: {}\nSource: {}\n",
                v.headword, self.date, v.phonetic, v.definition, v.example, v.note, v.source
            ),
            Content::Correction(c) => format!(
                "[{}]\nTarget text: {}\nMeaning: {}\nRecommended: {}\nIssue type: {}\nDate: {}\n",
                c.source_text, c.target_text, c.meaning, c.recommended, c.issue_type, self.date
            ),
        }
    }
}

/// A card about to be inserted. The store assigns the id.
#[derive(Debug, Clone)]
pub struct CardDraft {
    pub status: Status,
    pub date: NaiveDate,
    pub content: Content,
}

impl CardDraft {
    pub fn new(content: Content, date: NaiveDate) -> Self {
        CardDraft { status: Status::default(), date, content }
    }
}

use thiserror::Error;

/// Failures surfaced by a `CardStore` implementation. Reported per operation,
/// never fatal to a whole batch.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("HTTP error: {0}")]
    Http(Box<reqwest::Error>),

    #[error("store replied {status}: {message}")]
    Api { status: u16, message: String },

    #[error("malformed store record: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("store did not return the inserted record")]
    MissingInserted,

    #[error("{0}")]
    Custom(String),
}

impl From<reqwest::Error> for StoreError {
    fn from(error: reqwest::Error) -> Self {
        StoreError::Http(Box::new(error))
    }
}

/// Failures from the mail transport. Any of these aborts a push before any
/// status mutation.
#[derive(Error, Debug)]
pub enum TransportError {
    #[error("invalid mail address: {0}")]
    Address(#[from] lettre::address::AddressError),

    #[error("failed to build message: {0}")]
    Message(#[from] lettre::error::Error),

    #[error("SMTP error: {0}")]
    Smtp(Box<lettre::transport::smtp::Error>),

    #[error("{0}")]
    Custom(String),
}

impl From<lettre::transport::smtp::Error> for TransportError {
    fn from(error: lettre::transport::smtp::Error) -> Self {
        TransportError::Smtp(Box::new(error))
    }
}

#[derive(Error, Debug)]
pub enum CairnError {
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    #[error("mail transport error: {0}")]
    Transport(#[from] TransportError),

    #[error("recipient list is empty")]
    NoRecipients,

    #[error("no cards are pending push")]
    NoPendingCards,

    #[error("unreadable tabular input: {0}")]
    UnreadableInput(Box<csv::Error>),

    #[error("HTTP error: {0}")]
    Http(Box<reqwest::Error>),

    #[error("regex error: {0}")]
    Regex(#[from] regex::Error),

    #[error("config error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(Box<std::io::Error>),

    #[error("{0}")]
    Custom(String),
}

impl From<csv::Error> for CairnError {
    fn from(error: csv::Error) -> Self {
        CairnError::UnreadableInput(Box::new(error))
    }
}

impl From<reqwest::Error> for CairnError {
    fn from(error: reqwest::Error) -> Self {
        CairnError::Http(Box::new(error))
    }
}

impl From<std::io::Error> for CairnError {
    fn from(error: std::io::Error) -> Self {
        CairnError::Io(Box::new(error))
    }
}

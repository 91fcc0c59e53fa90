pub mod errors;
pub mod models;

pub use errors::{
    CairnError,
    StoreError,
    TransportError,
};
pub use models::{
    Card,
    CardDraft,
    CardId,
    Collection,
    Content,
    Correction,
    IdentityKey,
    Status,
    Vocabulary,
};

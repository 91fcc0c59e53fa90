use std::time::Duration;

use chrono::NaiveDate;
use reqwest::blocking::{
    Client,
    RequestBuilder,
    Response,
};
use serde::{
    Deserialize,
    Serialize,
};
use serde_json::Value;

use super::{
    CardStore,
    RawStatus,
};
use crate::core::{
    Card,
    CardDraft,
    CardId,
    Collection,
    Content,
    Status,
    StoreError,
};

/// HTTP adapter against a PostgREST-style record store. Each collection maps
/// to one table; the store assigns serial ids on insert.
pub struct RestStore {
    base: String,
    key: String,
    client: Client,
}

impl RestStore {
    pub fn new(base_url: &str, api_key: &str) -> Result<Self, StoreError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| StoreError::Custom(format!("HTTP client build failed: {e}")))?;

        Ok(RestStore {
            base: base_url.trim_end_matches('/').to_string(),
            key: api_key.to_string(),
            client,
        })
    }

    fn endpoint(&self, collection: Collection) -> String {
        format!("{}/rest/v1/{}", self.base, collection.table())
    }

    fn authed(&self, builder: RequestBuilder) -> RequestBuilder {
        builder.header("apikey", &self.key).bearer_auth(&self.key)
    }

    fn check(resp: Response) -> Result<Response, StoreError> {
        let status = resp.status();
        if status.is_success() {
            return Ok(resp);
        }
        let message = resp.text().unwrap_or_default();
        Err(StoreError::Api { status: status.as_u16(), message })
    }
}

#[derive(Deserialize)]
struct WireRow<T> {
    id: CardId,
    #[serde(default)]
    status: String,
    date: NaiveDate,
    #[serde(flatten)]
    content: T,
}

#[derive(Serialize)]
struct WireFields<'a, T> {
    status: &'a str,
    date: NaiveDate,
    #[serde(flatten)]
    content: &'a T,
}

fn row_to_card(collection: Collection, row: Value) -> Result<Card, StoreError> {
    // Status is read leniently: an out-of-domain label shows up as
    // `Unreviewed` until the repair pass rewrites it in the store.
    match collection {
        Collection::Vocabulary => {
            let row: WireRow<crate::core::Vocabulary> = serde_json::from_value(row)?;
            Ok(Card {
                id: row.id,
                status: Status::from_label(&row.status).unwrap_or_default(),
                date: row.date,
                content: Content::Vocabulary(row.content),
            })
        }
        Collection::Correction => {
            let row: WireRow<crate::core::Correction> = serde_json::from_value(row)?;
            Ok(Card {
                id: row.id,
                status: Status::from_label(&row.status).unwrap_or_default(),
                date: row.date,
                content: Content::Correction(row.content),
            })
        }
    }
}

fn fields_value(status: Status, date: NaiveDate, content: &Content) -> Result<Value, StoreError> {
    let value = match content {
        Content::Vocabulary(v) => {
            serde_json::to_value(WireFields { status: status.as_str(), date, content: v })?
        }
        Content::Correction(c) => {
            serde_json::to_value(WireFields { status: status.as_str(), date, content: c })?
        }
    };
    Ok(value)
}

impl CardStore for RestStore {
    fn list(&self, collection: Collection) -> Result<Vec<Card>, StoreError> {
        let resp = self
            .authed(self.client.get(self.endpoint(collection)))
            .query(&[("select", "*"), ("order", "id.asc")])
            .send()?;
        let rows: Vec<Value> = Self::check(resp)?.json()?;
        rows.into_iter().map(|row| row_to_card(collection, row)).collect()
    }

    fn insert(&self, draft: CardDraft) -> Result<Card, StoreError> {
        let collection = draft.content.collection();
        let body = fields_value(draft.status, draft.date, &draft.content)?;
        let resp = self
            .authed(self.client.post(self.endpoint(collection)))
            .header("Prefer", "return=representation")
            .json(&body)
            .send()?;
        let mut rows: Vec<Value> = Self::check(resp)?.json()?;
        if rows.is_empty() {
            return Err(StoreError::MissingInserted);
        }
        row_to_card(collection, rows.remove(0))
    }

    fn update(&self, card: &Card) -> Result<(), StoreError> {
        let body = fields_value(card.status, card.date, &card.content)?;
        let resp = self
            .authed(self.client.patch(self.endpoint(card.collection())))
            .query(&[("id", format!("eq.{}", card.id))])
            .json(&body)
            .send()?;
        Self::check(resp).map(|_| ())
    }

    fn delete(&self, collection: Collection, id: CardId) -> Result<(), StoreError> {
        let resp = self
            .authed(self.client.delete(self.endpoint(collection)))
            .query(&[("id", format!("eq.{}", id))])
            .send()?;
        Self::check(resp).map(|_| ())
    }

    fn raw_statuses(&self, collection: Collection) -> Result<Vec<RawStatus>, StoreError> {
        let resp = self
            .authed(self.client.get(self.endpoint(collection)))
            .query(&[("select", "id,status"), ("order", "id.asc")])
            .send()?;
        Ok(Self::check(resp)?.json()?)
    }
}

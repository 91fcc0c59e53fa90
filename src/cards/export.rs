use std::io::Write;

use crate::{
    cards::import::{
        CORRECTION_COLUMNS,
        DATE_COLUMN,
        STATUS_COLUMN,
        VOCABULARY_COLUMNS,
    },
    core::{
        CairnError,
        Collection,
        Content,
    },
    store::CardStore,
};

/// Writes every card of a collection as CSV, using the same column headers
/// the importer reads, so an exported file can be merged back in elsewhere.
/// Returns the number of rows written.
pub fn export_csv<W: Write>(
    store: &impl CardStore,
    collection: Collection,
    output: W,
) -> Result<usize, CairnError> {
    let cards = store.list(collection)?;

    let mut writer = csv::Writer::from_writer(output);
    let csv_err = |e: csv::Error| CairnError::Custom(format!("CSV write failed: {e}"));

    let mut header: Vec<&str> = match collection {
        Collection::Vocabulary => VOCABULARY_COLUMNS.to_vec(),
        Collection::Correction => CORRECTION_COLUMNS.to_vec(),
    };
    header.push(STATUS_COLUMN);
    header.push(DATE_COLUMN);
    writer.write_record(&header).map_err(csv_err)?;

    for card in &cards {
        let status = card.status.as_str().to_string();
        let date = card.date.to_string();
        let row: Vec<&str> = match &card.content {
            Content::Vocabulary(v) => vec![
                &v.headword,
                &v.phonetic,
                &v.definition,
                &v.example,
                &v.note,
                &v.source,
                &status,
                &date,
            ],
            Content::Correction(c) => vec![
                &c.source_text,
                &c.target_text,
                &c.meaning,
                &c.recommended,
                &c.issue_type,
                &status,
                &date,
            ],
        };
        writer.write_record(&row).map_err(csv_err)?;
    }
    writer.flush().map_err(|e| CairnError::Custom(format!("CSV write failed: {e}")))?;
    Ok(cards.len())
}

use std::{
    collections::{
        HashMap,
        HashSet,
    },
    io::Read,
};

use chrono::NaiveDate;

use crate::{
    core::{
        CairnError,
        Card,
        CardDraft,
        Collection,
        Content,
        Correction,
        IdentityKey,
        Status,
        StoreError,
        Vocabulary,
    },
    store::CardStore,
};

pub(crate) const VOCABULARY_COLUMNS: [&str; 6] =
    ["Word", "Phonetic", "Definition", "Example", "Note", "Source URL"];
pub(crate) const CORRECTION_COLUMNS: [&str; 5] =
    ["Source Text", "Target Text", "Meaning", "Recommended", "Issue Type"];
pub(crate) const STATUS_COLUMN: &str = "Status";
pub(crate) const DATE_COLUMN: &str = "Date";

/// One tabular input row, column name to cell text.
pub type Row = HashMap<String, String>;

#[derive(Debug, Default)]
pub struct ImportReport {
    pub imported: usize,
    /// Rows not inserted: blank, already present, or failed. Always
    /// `imported + skipped == rows.len()`.
    pub skipped: usize,
    /// Insert failures by 1-based data row number.
    pub failed_rows: Vec<(usize, StoreError)>,
}

/// Reads tabular rows from CSV input. A malformed record aborts the read,
/// so a bad file never gets a partial import.
pub fn read_rows<R: Read>(input: R) -> Result<Vec<Row>, CairnError> {
    let mut reader = csv::Reader::from_reader(input);
    let headers = reader.headers()?.clone();
    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        rows.push(
            headers.iter().zip(record.iter()).map(|(h, v)| (h.to_string(), v.to_string())).collect(),
        );
    }
    Ok(rows)
}

/// Inserts every row whose identity key is not already present, either in
/// the store or earlier in this batch. Blank rows and rows that fail to
/// insert are counted as skipped; the batch always runs to the end.
pub fn import(
    store: &impl CardStore,
    collection: Collection,
    rows: &[Row],
    today: NaiveDate,
) -> Result<ImportReport, CairnError> {
    let existing = store.list(collection)?;
    let mut seen: HashSet<IdentityKey> = existing.iter().filter_map(Card::identity_key).collect();

    let mut report = ImportReport::default();
    for (index, row) in rows.iter().enumerate() {
        let content = content_from_row(collection, row);
        let key = match content.identity_key() {
            Some(key) if !seen.contains(&key) => key,
            _ => {
                report.skipped += 1;
                continue;
            }
        };

        let status =
            row.get(STATUS_COLUMN).and_then(|s| Status::from_label(s)).unwrap_or_default();
        match store.insert(CardDraft { status, date: today, content }) {
            Ok(_) => {
                report.imported += 1;
                seen.insert(key);
            }
            Err(e) => {
                report.skipped += 1;
                report.failed_rows.push((index + 1, e));
            }
        }
    }
    Ok(report)
}

fn content_from_row(collection: Collection, row: &Row) -> Content {
    let cell = |column: &str| row.get(column).map(|v| v.trim().to_string()).unwrap_or_default();
    match collection {
        Collection::Vocabulary => {
            let [word, phonetic, definition, example, note, source] = VOCABULARY_COLUMNS;
            Content::Vocabulary(Vocabulary {
                headword: cell(word),
                phonetic: cell(phonetic),
                definition: cell(definition),
                example: cell(example),
                note: cell(note),
                source: cell(source),
            })
        }
        Collection::Correction => {
            let [source_text, target_text, meaning, recommended, issue_type] = CORRECTION_COLUMNS;
            Content::Correction(Correction {
                source_text: cell(source_text),
                target_text: cell(target_text),
                meaning: cell(meaning),
                recommended: cell(recommended),
                issue_type: cell(issue_type),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 8, 6).unwrap()
    }

    fn row(pairs: &[(&str, &str)]) -> Row {
        pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
    }

    #[test]
    fn duplicates_within_one_batch_are_skipped() {
        let store = MemoryStore::new();
        let rows = vec![
            row(&[("Word", "banana"), ("Definition", "a fruit")]),
            row(&[("Word", "Banana"), ("Definition", "same fruit, shouting")]),
        ];

        let report = import(&store, Collection::Vocabulary, &rows, date()).unwrap();
        assert_eq!(report.imported, 1);
        assert_eq!(report.skipped, 1);
        assert_eq!(store.list(Collection::Vocabulary).unwrap().len(), 1);
    }

    #[test]
    fn rows_already_in_the_store_are_skipped() {
        let store = MemoryStore::new();
        let seeded = vec![row(&[("Word", "apple")])];
        import(&store, Collection::Vocabulary, &seeded, date()).unwrap();

        let rows = vec![row(&[("Word", " APPLE ")]), row(&[("Word", "pear")])];
        let report = import(&store, Collection::Vocabulary, &rows, date()).unwrap();
        assert_eq!(report.imported, 1);
        assert_eq!(report.skipped, 1);
        assert_eq!(report.imported + report.skipped, rows.len());
    }

    #[test]
    fn blank_rows_are_skipped_without_error() {
        let store = MemoryStore::new();
        let rows = vec![
            row(&[("Word", "   "), ("Note", "a note with no headword")]),
            row(&[("Word", "kept")]),
        ];

        let report = import(&store, Collection::Vocabulary, &rows, date()).unwrap();
        assert_eq!(report.imported, 1);
        assert_eq!(report.skipped, 1);
        assert!(report.failed_rows.is_empty());
    }

    #[test]
    fn row_status_is_honored_and_junk_falls_back() {
        let store = MemoryStore::new();
        let rows = vec![
            row(&[("Word", "alpha"), ("Status", "pending_push")]),
            row(&[("Word", "beta"), ("Status", "definitely wrong")]),
            row(&[("Word", "gamma")]),
        ];

        import(&store, Collection::Vocabulary, &rows, date()).unwrap();
        let statuses: Vec<Status> =
            store.list(Collection::Vocabulary).unwrap().iter().map(|c| c.status).collect();
        assert_eq!(statuses, vec![Status::PendingPush, Status::Unreviewed, Status::Unreviewed]);
    }

    #[test]
    fn a_failed_insert_does_not_stop_the_batch() {
        let store = MemoryStore::new();
        store.fail_inserts(1);
        let rows = vec![row(&[("Word", "first")]), row(&[("Word", "second")])];

        let report = import(&store, Collection::Vocabulary, &rows, date()).unwrap();
        assert_eq!(report.imported, 1);
        assert_eq!(report.skipped, 1);
        assert_eq!(report.failed_rows.len(), 1);
        assert_eq!(report.failed_rows[0].0, 1);

        // The failed row's key was not recorded, so a retry can insert it.
        let retry = import(&store, Collection::Vocabulary, &rows, date()).unwrap();
        assert_eq!(retry.imported, 1);
        assert_eq!(retry.skipped, 1);
    }

    #[test]
    fn malformed_csv_aborts_before_any_insert() {
        // Second record has the wrong field count.
        let bad = "Word,Definition\napple,a fruit\nbanana\n";
        let result = read_rows(bad.as_bytes());
        assert!(matches!(result, Err(CairnError::UnreadableInput(_))));
    }

    #[test]
    fn csv_rows_map_headers_to_cells() {
        let input = "Word,Phonetic,Definition\nhello,/həˈləʊ/,a greeting\n";
        let rows = read_rows(input.as_bytes()).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0]["Word"], "hello");
        assert_eq!(rows[0]["Phonetic"], "/həˈləʊ/");
    }
}

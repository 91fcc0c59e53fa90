use std::time::Duration;

use regex::Regex;
use reqwest::{
    blocking::Client,
    header::USER_AGENT,
};

use crate::core::{
    CairnError,
    Vocabulary,
};

pub const WORD_OF_THE_DAY_URL: &str = "https://www.merriam-webster.com/word-of-the-day";

/// Fetches the current word of the day and returns it as vocabulary
/// content, source set to the page URL. Anything short of a headword is an
/// error, never a partial card.
pub fn word_of_the_day() -> Result<Vocabulary, CairnError> {
    let client = Client::builder()
        .timeout(Duration::from_secs(30))
        .build()
        .map_err(|e| CairnError::Custom(format!("HTTP client build failed: {e}")))?;

    let html = client
        .get(WORD_OF_THE_DAY_URL)
        .header(USER_AGENT, "Mozilla/5.0")
        .send()?
        .error_for_status()?
        .text()?;

    parse_word_of_the_day(&html)
}

fn parse_word_of_the_day(html: &str) -> Result<Vocabulary, CairnError> {
    let headword = first_capture(html, r#"(?s)<div class="word-and-pronunciation">.*?<h1>([^<]+)</h1>"#)?
        .or(first_capture(html, r"<title>[^<]*Word of the Day: ([^|<]+)")?)
        .map(|w| w.trim().to_string())
        .filter(|w| !w.is_empty());
    let Some(headword) = headword else {
        return Err(CairnError::Custom("word of the day page had no headword".to_string()));
    };

    let phonetic = first_capture(html, r#"<span class="word-syllables">([^<]+)</span>"#)?
        .map(|p| p.trim().to_string())
        .unwrap_or_default();

    let definition =
        first_capture(html, r#"(?s)<div class="wod-definition-container">.*?<p>(.*?)</p>"#)?
            .map(|d| clean_fragment(&d))
            .unwrap_or_default();

    // The page marks its example sentence as a paragraph starting with "//".
    let mut example = String::new();
    let paragraph = Regex::new(r"(?s)<p>(.*?)</p>")?;
    for captures in paragraph.captures_iter(html) {
        let text = clean_fragment(&captures[1]);
        if let Some(rest) = text.strip_prefix("//") {
            example = rest.trim().to_string();
            break;
        }
    }

    Ok(Vocabulary {
        headword,
        phonetic,
        definition,
        example,
        note: String::new(),
        source: WORD_OF_THE_DAY_URL.to_string(),
    })
}

fn first_capture(html: &str, pattern: &str) -> Result<Option<String>, CairnError> {
    let re = Regex::new(pattern)?;
    Ok(re.captures(html).map(|c| c[1].to_string()))
}

/// Drops markup and collapses whitespace in an HTML fragment.
fn clean_fragment(fragment: &str) -> String {
    let tags = match Regex::new(r"<[^>]+>") {
        Ok(re) => re,
        Err(_) => return fragment.to_string(),
    };
    let text = tags.replace_all(fragment, "");
    let text = text
        .replace("&amp;", "&")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&nbsp;", " ");
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

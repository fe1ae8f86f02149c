// Text cleanup for scraped Q&A exports.
//
// Scraped text arrives with HTML entities, typographic punctuation, and
// contractions whose apostrophe was stripped ("I m", "don t"). Cleaning
// runs before classification so the NLI model sees ordinary prose.

use std::sync::LazyLock;

use regex_lite::{Captures, Regex};
use tracing::info;
use unicode_normalization::UnicodeNormalization;

use crate::dataset::Corpus;

/// Free-text column the Quora scraper emits; dropped during cleaning.
pub const QUESTION_DETAILS_COLUMN: &str = "Question Details";

static HTML_ENTITY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"&(#[0-9]+|#[xX][0-9a-fA-F]+|[a-zA-Z]+);").unwrap());

/// Specific broken contractions, applied before the generic suffix rules.
/// regex-lite's `\w` is ASCII-only, so the generic rules match a word as any
/// run of non-space, non-punctuation characters to cover Arabic and
/// accented text.
static CONTRACTIONS: LazyLock<Vec<(Regex, &'static str)>> = LazyLock::new(|| {
    [
        (r"I\s+m\s+", "I'm "),
        (r"don\s+t\s+", "don't "),
        (r"hasn\s+t\s+", "hasn't "),
        (r"isn\s+t\s+", "isn't "),
        (r"wasn\s+t\s+", "wasn't "),
        (r"aren\s+t\s+", "aren't "),
        (r"didn\s+t\s+", "didn't "),
        (r"won\s+t\s+", "won't "),
        (r"can\s+t\s+", "can't "),
        (r"it\s+s\s+", "it's "),
        (r"that\s+s\s+", "that's "),
        (r"there\s+s\s+", "there's "),
        (r"([^\s[:punct:]]+)\s+s\s+", "${1}'s "),
        (r"([^\s[:punct:]]+)\s+ve\s+", "${1}'ve "),
        (r"([^\s[:punct:]]+)\s+ll\s+", "${1}'ll "),
        (r"([^\s[:punct:]]+)\s+re\s+", "${1}'re "),
    ]
    .into_iter()
    .map(|(pattern, replacement)| (Regex::new(pattern).unwrap(), replacement))
    .collect()
});

static QUESTION_BREAK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\?\s*([A-Z][a-z])").unwrap());

static CAMEL_JOIN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"([a-z])([A-Z])").unwrap());

/// Clean a single cell.
pub fn clean_text(text: &str) -> String {
    let text = unescape_html(text);
    let text: String = text.nfkd().collect();

    let text = text
        .replace('\u{2019}', "'")
        .replace('\u{2018}', "'")
        .replace('\u{201c}', "\"")
        .replace('\u{201d}', "\"")
        .replace('\u{2013}', "-")
        .replace('\u{2014}', "--")
        .replace('\u{2026}', "...")
        .replace('\u{a0}', " ");

    let mut text = text;
    for (re, replacement) in CONTRACTIONS.iter() {
        text = re.replace_all(&text, *replacement).into_owned();
    }

    // "fees?The school" -> "fees? The school"
    let text = QUESTION_BREAK.replace_all(&text, "? $1");
    // Scraped text often loses the space between sentences: "rulesThe"
    let text = CAMEL_JOIN.replace_all(&text, "$1 $2");

    // Control characters other than whitespace are dropped; whitespace runs
    // collapse to single spaces.
    let text: String = text
        .chars()
        .filter(|c| !c.is_control() || c.is_whitespace())
        .collect();
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Decode named and numeric HTML entities. Unknown names are left as-is.
pub fn unescape_html(text: &str) -> String {
    HTML_ENTITY
        .replace_all(text, |caps: &Captures| {
            let body = &caps[1];
            let decoded = if let Some(hex) = body
                .strip_prefix("#x")
                .or_else(|| body.strip_prefix("#X"))
            {
                u32::from_str_radix(hex, 16).ok().and_then(char::from_u32)
            } else if let Some(dec) = body.strip_prefix('#') {
                dec.parse().ok().and_then(char::from_u32)
            } else {
                named_entity(body)
            };
            match decoded {
                Some(c) => c.to_string(),
                None => caps[0].to_string(),
            }
        })
        .into_owned()
}

fn named_entity(name: &str) -> Option<char> {
    Some(match name {
        "amp" => '&',
        "lt" => '<',
        "gt" => '>',
        "quot" => '"',
        "apos" => '\'',
        "nbsp" => '\u{a0}',
        "rsquo" => '\u{2019}',
        "lsquo" => '\u{2018}',
        "rdquo" => '\u{201d}',
        "ldquo" => '\u{201c}',
        "ndash" => '\u{2013}',
        "mdash" => '\u{2014}',
        "hellip" => '\u{2026}',
        _ => return None,
    })
}

/// What `clean_corpus` changed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CleanReport {
    pub duplicates_removed: usize,
    pub dropped_question_details: bool,
}

/// Remove exact duplicate rows, clean every cell, and drop the
/// `Question Details` column if present.
pub fn clean_corpus(corpus: &mut Corpus) -> CleanReport {
    let before = corpus.len();
    let mut seen = std::collections::HashSet::new();
    corpus.rows.retain(|row| seen.insert(row.clone()));
    let duplicates_removed = before - corpus.len();
    if duplicates_removed > 0 {
        info!(duplicates_removed, "Removed duplicate rows");
    }

    for row in &mut corpus.rows {
        for cell in row.iter_mut() {
            *cell = clean_text(cell);
        }
    }

    let dropped_question_details = corpus.drop_column(QUESTION_DETAILS_COLUMN);

    CleanReport {
        duplicates_removed,
        dropped_question_details,
    }
}

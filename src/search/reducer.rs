//! Keyword-driven reduction of raw search output.

use serde::{Deserialize, Serialize};

/// Returned when the provider produced nothing at all.
pub const NO_RESULTS_SENTINEL: &str = "No search results found.";

/// One structured search hit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchRecord {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub content: String,
}

/// Raw provider output: either structured records or one flat blob.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SearchPayload {
    Text(String),
    Results(Vec<SearchRecord>),
}

impl SearchPayload {
    pub fn is_empty(&self) -> bool {
        match self {
            SearchPayload::Text(text) => text.is_empty(),
            SearchPayload::Results(records) => records.is_empty(),
        }
    }

    /// Single string view: record contents joined by one space.
    pub fn flatten(&self) -> String {
        match self {
            SearchPayload::Text(text) => text.clone(),
            SearchPayload::Results(records) => records
                .iter()
                .map(|r| r.content.as_str())
                .collect::<Vec<_>>()
                .join(" "),
        }
    }
}

impl From<String> for SearchPayload {
    fn from(text: String) -> Self {
        SearchPayload::Text(text)
    }
}

impl From<Vec<SearchRecord>> for SearchPayload {
    fn from(records: Vec<SearchRecord>) -> Self {
        SearchPayload::Results(records)
    }
}

/// A window of the flattened content. `offset` counts characters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchChunk {
    pub offset: usize,
    pub text: String,
}

impl SearchChunk {
    /// True if any keyword occurs in the chunk, ignoring case.
    pub fn mentions_any(&self, keywords: &[String]) -> bool {
        let haystack = self.text.to_lowercase();
        keywords
            .iter()
            .any(|k| haystack.contains(&k.to_lowercase()))
    }
}

/// Split `content` into consecutive `chunk_size`-character windows.
///
/// Windows cover the input with no gap or overlap; only the last may be short.
/// A zero `chunk_size` yields no chunks.
pub fn partition(content: &str, chunk_size: usize) -> Vec<SearchChunk> {
    if chunk_size == 0 {
        return Vec::new();
    }

    let mut chunks = Vec::new();
    let mut current = String::new();
    let mut count = 0;
    let mut offset = 0;

    for (i, c) in content.chars().enumerate() {
        if count == chunk_size {
            chunks.push(SearchChunk {
                offset,
                text: std::mem::take(&mut current),
            });
            offset = i;
            count = 0;
        }
        current.push(c);
        count += 1;
    }

    if !current.is_empty() {
        chunks.push(SearchChunk {
            offset,
            text: current,
        });
    }

    chunks
}

/// Sentinel naming the keywords that matched nothing.
///
/// Keywords are listed as `['a', "b's"]`.
pub fn no_match_sentinel(keywords: &[String]) -> String {
    format!(
        "No content containing the important words {} was found in the search results.",
        quoted_list(keywords)
    )
}

fn quoted_list(items: &[String]) -> String {
    let quoted: Vec<String> = items.iter().map(|item| quote(item)).collect();
    format!("[{}]", quoted.join(", "))
}

/// Single quotes unless the text has a `'` and no `"`.
fn quote(text: &str) -> String {
    let delim = if text.contains('\'') && !text.contains('"') {
        '"'
    } else {
        '\''
    };

    let mut out = String::with_capacity(text.len() + 2);
    out.push(delim);
    for c in text.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if c == delim => {
                out.push('\\');
                out.push(c);
            }
            c => out.push(c),
        }
    }
    out.push(delim);
    out
}

/// Keep only the chunks that mention a keyword, joined by a blank line.
///
/// Returns a sentinel string when the payload is empty or nothing matches,
/// and an `Error:` string for a zero chunk size.
pub fn reduce(payload: &SearchPayload, keywords: &[String], chunk_size: usize) -> String {
    if payload.is_empty() {
        return NO_RESULTS_SENTINEL.to_string();
    }
    if chunk_size == 0 {
        return "Error: chunk size must be greater than zero".to_string();
    }

    let kept: Vec<String> = partition(&payload.flatten(), chunk_size)
        .into_iter()
        .filter(|chunk| chunk.mentions_any(keywords))
        .map(|chunk| chunk.text)
        .collect();

    if kept.is_empty() {
        return no_match_sentinel(keywords);
    }

    kept.join("\n\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn words(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    fn record(content: &str) -> SearchRecord {
        SearchRecord {
            title: String::new(),
            url: String::new(),
            content: content.to_string(),
        }
    }

    #[test]
    fn test_partition_tiles_content() {
        let chunks = partition("abcdefghij", 4);

        assert_eq!(
            chunks,
            vec![
                SearchChunk { offset: 0, text: "abcd".into() },
                SearchChunk { offset: 4, text: "efgh".into() },
                SearchChunk { offset: 8, text: "ij".into() },
            ]
        );
    }

    #[test]
    fn test_partition_counts_characters_not_bytes() {
        let chunks = partition("äöüß", 3);
        assert_eq!(chunks[0].text, "äöü");
        assert_eq!(chunks[1].text, "ß");
        assert_eq!(chunks[1].offset, 3);
    }

    #[test]
    fn test_partition_reassembles() {
        let content = "The quick brown fox jumps over the lazy dög. ".repeat(23);
        let len = content.chars().count();

        for size in [1, 7, 64, 500, len, len + 1] {
            let chunks = partition(&content, size);
            assert_eq!(chunks.len(), len.div_ceil(size), "size {size}");

            let rebuilt: String = chunks.iter().map(|c| c.text.as_str()).collect();
            assert_eq!(rebuilt, content);
            assert!(chunks[..chunks.len() - 1]
                .iter()
                .all(|c| c.text.chars().count() == size));
        }
    }

    #[test]
    fn test_partition_edges() {
        assert!(partition("", 5).is_empty());
        assert!(partition("abc", 0).is_empty());
        assert_eq!(partition("abc", 3).len(), 1);
    }

    #[test]
    fn test_reduce_keeps_matching_chunks_in_order() {
        let payload = SearchPayload::Text("aaaaBEATLES cccc dddd beatles".to_string());

        let out = reduce(&payload, &words(&["Beatle"]), 10);

        // "aaaaBEATLE" "S cccc ddd" "d beatles"
        assert_eq!(out, "aaaaBEATLE\n\nd beatles");
    }

    #[test]
    fn test_reduce_flattens_records() {
        let payload = SearchPayload::Results(vec![
            record("Abbey Road was released in 1969."),
            record("Unrelated text."),
        ]);

        let out = reduce(&payload, &words(&["abbey road"]), 500);

        assert_eq!(out, "Abbey Road was released in 1969. Unrelated text.");
    }

    #[test]
    fn test_reduce_empty_payload() {
        assert_eq!(
            reduce(&SearchPayload::Text(String::new()), &words(&["x"]), 10),
            NO_RESULTS_SENTINEL
        );
        assert_eq!(
            reduce(&SearchPayload::Results(vec![]), &words(&["x"]), 10),
            NO_RESULTS_SENTINEL
        );
    }

    #[test]
    fn test_reduce_no_match_names_keywords() {
        let out = reduce(
            &SearchPayload::Text("nothing relevant".to_string()),
            &words(&["Let It Be", "1970"]),
            500,
        );

        assert!(out.starts_with("No content containing the important words"));
        assert!(out.contains("Let It Be"));
        assert!(out.contains("1970"));
    }

    #[test]
    fn test_no_match_sentinel_quoting() {
        assert_eq!(
            no_match_sentinel(&words(&["Let It Be", "1970"])),
            "No content containing the important words ['Let It Be', '1970'] was found in the search results."
        );
        assert!(no_match_sentinel(&words(&["Sgt. Pepper's"])).contains(r#"["Sgt. Pepper's"]"#));
        assert!(no_match_sentinel(&words(&[r#"it's "x""#])).contains(r#"['it\'s "x"']"#));
        assert!(no_match_sentinel(&words(&["a\\b"])).contains(r"['a\\b']"));
        assert!(no_match_sentinel(&[]).contains("words [] was"));
    }

    #[test]
    fn test_reduce_without_keywords_keeps_nothing() {
        let out = reduce(&SearchPayload::Text("text".to_string()), &[], 500);
        assert_eq!(out, no_match_sentinel(&[]));
    }

    #[test]
    fn test_reduce_zero_chunk_size() {
        let out = reduce(&SearchPayload::Text("text".to_string()), &words(&["text"]), 0);
        assert!(out.starts_with("Error:"));
    }

    #[test]
    fn test_payload_deserializes_both_shapes() {
        let text: SearchPayload = serde_json::from_str(r#""plain result""#).unwrap();
        assert_eq!(text, SearchPayload::Text("plain result".into()));

        let records: SearchPayload =
            serde_json::from_str(r#"[{"content": "a"}, {"title": "t", "url": "u"}]"#).unwrap();
        assert_eq!(records.flatten(), "a ");
    }
}

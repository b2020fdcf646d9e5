//! DuckDuckGo search through its HTML endpoint.

use super::{SearchPayload, SearchProvider, SearchRecord};
use crate::config::SearchSettings;
use crate::error::{FerretError, Result};
use async_trait::async_trait;
use regex::Regex;
use std::time::Duration;
use tracing::{debug, instrument};
use url::Url;

const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Scrapes result titles, links and snippets from `html.duckduckgo.com`.
pub struct DuckDuckGoSearch {
    client: reqwest::Client,
    base_url: String,
    max_results: usize,
    link_regex: Regex,
    snippet_regex: Regex,
    tag_regex: Regex,
}

impl DuckDuckGoSearch {
    pub fn new(settings: &SearchSettings) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(&settings.user_agent)
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()?;

        Ok(Self {
            client,
            base_url: settings.base_url.clone(),
            max_results: settings.max_results,
            link_regex: Regex::new(r#"(?s)<a[^>]*class="result__a"[^>]*href="([^"]*)"[^>]*>(.*?)</a>"#)
                .expect("Invalid regex"),
            snippet_regex: Regex::new(r#"(?s)<(?:a|div)[^>]*class="result__snippet"[^>]*>(.*?)</(?:a|div)>"#)
                .expect("Invalid regex"),
            tag_regex: Regex::new(r"<[^>]*>").expect("Invalid regex"),
        })
    }

    /// Extract result records from a results page.
    pub fn parse_results(&self, html: &str) -> Vec<SearchRecord> {
        let links: Vec<_> = self.link_regex.captures_iter(html).collect();
        let mut records = Vec::new();

        for (idx, caps) in links.iter().enumerate() {
            let (Some(whole), Some(href), Some(title)) = (caps.get(0), caps.get(1), caps.get(2)) else {
                continue;
            };

            // The snippet sits between this link and the next one.
            let section_end = links
                .get(idx + 1)
                .and_then(|next| next.get(0))
                .map_or(html.len(), |m| m.start());
            let section = &html[whole.end()..section_end];

            let snippet = self
                .snippet_regex
                .captures(section)
                .and_then(|c| c.get(1))
                .map(|m| self.clean(m.as_str()))
                .unwrap_or_default();

            records.push(SearchRecord {
                title: self.clean(title.as_str()),
                url: resolve_link(&decode_entities(href.as_str())),
                content: snippet,
            });

            if records.len() >= self.max_results {
                break;
            }
        }

        records
    }

    fn clean(&self, fragment: &str) -> String {
        let text = self.tag_regex.replace_all(fragment, "");
        decode_entities(text.trim())
    }
}

/// Render records the way agents expect a search tool to answer.
pub fn render_results(records: &[SearchRecord]) -> String {
    if records.is_empty() {
        return String::new();
    }

    let body = records
        .iter()
        .map(|r| format!("[{}]({})\n{}", r.title, r.url, r.content))
        .collect::<Vec<_>>()
        .join("\n\n");

    format!("## Search Results\n\n{}", body)
}

#[async_trait]
impl SearchProvider for DuckDuckGoSearch {
    #[instrument(skip(self))]
    async fn search(&self, query: &str) -> Result<SearchPayload> {
        let response = self
            .client
            .get(&self.base_url)
            .query(&[("q", query)])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(FerretError::Search(format!(
                "search endpoint returned {}",
                status
            )));
        }

        let html = response.text().await?;
        let records = self.parse_results(&html);
        debug!(results = records.len(), "parsed search results");

        Ok(SearchPayload::Text(render_results(&records)))
    }
}

/// Unwrap DuckDuckGo redirect links (`//duckduckgo.com/l/?uddg=...`).
fn resolve_link(href: &str) -> String {
    let absolute = if href.starts_with("//") {
        format!("https:{}", href)
    } else {
        href.to_string()
    };

    Url::parse(&absolute)
        .ok()
        .and_then(|url| {
            url.query_pairs()
                .find(|(key, _)| key == "uddg")
                .map(|(_, target)| target.into_owned())
        })
        .unwrap_or(absolute)
}

fn decode_entities(text: &str) -> String {
    text.replace("&#x27;", "'")
        .replace("&#39;", "'")
        .replace("&quot;", "\"")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&nbsp;", " ")
        .replace("&amp;", "&")
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const PAGE: &str = r#"
<div class="result results_links results_links_deep web-result">
  <h2 class="result__title">
    <a rel="nofollow" class="result__a" href="//duckduckgo.com/l/?uddg=https%3A%2F%2Fen.wikipedia.org%2Fwiki%2FAbbey_Road&amp;rut=abc">Abbey Road - <b>Wikipedia</b></a>
  </h2>
  <a class="result__snippet" href="//duckduckgo.com/l/?uddg=x">Abbey Road is the eleventh studio album by the <b>Beatles</b>, released 26 September 1969.</a>
</div>
<div class="result results_links results_links_deep web-result">
  <h2 class="result__title">
    <a rel="nofollow" class="result__a" href="https://example.com/let-it-be">Let It Be &amp; more</a>
  </h2>
  <a class="result__snippet" href="https://example.com/let-it-be">Released in 1970.</a>
</div>
"#;

    fn settings(base_url: String) -> SearchSettings {
        SearchSettings {
            base_url,
            throttle_seconds: 0,
            ..SearchSettings::default()
        }
    }

    #[test]
    fn test_parse_results() {
        let search = DuckDuckGoSearch::new(&settings("http://unused".into())).unwrap();

        let records = search.parse_results(PAGE);

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].title, "Abbey Road - Wikipedia");
        assert_eq!(records[0].url, "https://en.wikipedia.org/wiki/Abbey_Road");
        assert!(records[0].content.starts_with("Abbey Road is the eleventh"));
        assert_eq!(records[1].title, "Let It Be & more");
        assert_eq!(records[1].url, "https://example.com/let-it-be");
        assert_eq!(records[1].content, "Released in 1970.");
    }

    #[test]
    fn test_parse_results_respects_max() {
        let mut s = settings("http://unused".into());
        s.max_results = 1;
        let search = DuckDuckGoSearch::new(&s).unwrap();

        assert_eq!(search.parse_results(PAGE).len(), 1);
    }

    #[test]
    fn test_render_results() {
        assert_eq!(render_results(&[]), "");

        let rendered = render_results(&[SearchRecord {
            title: "T".into(),
            url: "https://t.example".into(),
            content: "body".into(),
        }]);
        assert_eq!(rendered, "## Search Results\n\n[T](https://t.example)\nbody");
    }

    #[tokio::test]
    async fn test_search_against_mock_endpoint() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/html/"))
            .and(query_param("q", "beatles albums"))
            .respond_with(ResponseTemplate::new(200).set_body_string(PAGE))
            .expect(1)
            .mount(&server)
            .await;

        let search = DuckDuckGoSearch::new(&settings(format!("{}/html/", server.uri()))).unwrap();
        let payload = search.search("beatles albums").await.unwrap();

        let text = payload.flatten();
        assert!(text.starts_with("## Search Results"));
        assert!(text.contains("[Let It Be & more](https://example.com/let-it-be)"));
    }

    #[tokio::test]
    async fn test_search_http_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let search = DuckDuckGoSearch::new(&settings(format!("{}/html/", server.uri()))).unwrap();
        let err = search.search("anything").await.unwrap_err();

        assert!(matches!(err, FerretError::Search(_)));
    }
}

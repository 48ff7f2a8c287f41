//! 검색 모듈 - 외부 지식 검색 (Wikipedia)
//!
//! 검색 결과는 어휘 스코어러로 점수화하지 않습니다.
//! 값싼 관련성 휴리스틱으로 거른 뒤 별도 포맷터로 출력합니다.

use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use regex::Regex;
use scraper::Html;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::knowledge::tokenize;

// ============================================================================
// KnowledgeSearch Trait
// ============================================================================

/// 검색 결과 한 건
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchHit {
    pub title: String,
    /// 태그가 제거된 요약문
    pub snippet: String,
    pub url: String,
}

/// 외부 지식 검색 트레이트
#[async_trait]
pub trait KnowledgeSearch: Send + Sync {
    /// 최대 `limit` 건 검색
    async fn search(&self, query: &str, limit: usize) -> Result<Vec<SearchHit>>;

    /// 검색기 이름
    fn name(&self) -> &str;
}

// ============================================================================
// Wikipedia
// ============================================================================

const WIKIPEDIA_API_URL: &str = "https://en.wikipedia.org/w/api.php";
const WIKIPEDIA_PAGE_URL: &str = "https://en.wikipedia.org/wiki/";

/// MediaWiki 검색 API 구현체
pub struct WikipediaSearch {
    client: reqwest::Client,
    api_url: String,
}

impl WikipediaSearch {
    pub fn new() -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("griot-rag/", env!("CARGO_PKG_VERSION")))
            .timeout(Duration::from_secs(30))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            api_url: WIKIPEDIA_API_URL.to_string(),
        })
    }

    /// 검색 요청 URL 구성
    fn request_url(&self, query: &str, limit: usize) -> Result<Url> {
        let limit = limit.to_string();
        Url::parse_with_params(
            &self.api_url,
            &[
                ("action", "query"),
                ("list", "search"),
                ("format", "json"),
                ("srsearch", query),
                ("srlimit", limit.as_str()),
            ],
        )
        .with_context(|| format!("Invalid search URL: {}", self.api_url))
    }
}

impl Default for WikipediaSearch {
    fn default() -> Self {
        Self::new().unwrap_or_else(|e| {
            tracing::error!("Failed to build WikipediaSearch: {}", e);
            Self {
                client: reqwest::Client::new(),
                api_url: WIKIPEDIA_API_URL.to_string(),
            }
        })
    }
}

#[async_trait]
impl KnowledgeSearch for WikipediaSearch {
    async fn search(&self, query: &str, limit: usize) -> Result<Vec<SearchHit>> {
        let search_query = contextualize_query(query);
        let url = self.request_url(&search_query, limit.max(1))?;
        tracing::info!("Searching Wikipedia: {}", search_query);

        let response = self
            .client
            .get(url)
            .send()
            .await
            .context("Wikipedia request failed")?;

        let status = response.status();
        let body = response
            .text()
            .await
            .context("Failed to read Wikipedia response body")?;

        if !status.is_success() {
            anyhow::bail!("Wikipedia API error ({})", status);
        }

        let hits = parse_search_response(&body)?;
        let relevant: Vec<SearchHit> = hits
            .into_iter()
            .filter(|hit| is_relevant(&format!("{} {}", hit.title, hit.snippet), query))
            .take(limit)
            .collect();

        tracing::debug!("Wikipedia returned {} relevant hits", relevant.len());
        Ok(relevant)
    }

    fn name(&self) -> &str {
        "wikipedia"
    }
}

// ============================================================================
// Response Parsing
// ============================================================================

#[derive(Debug, Deserialize)]
struct SearchResponse {
    query: Option<SearchQuery>,
}

#[derive(Debug, Deserialize)]
struct SearchQuery {
    #[serde(default)]
    search: Vec<SearchItem>,
}

#[derive(Debug, Deserialize)]
struct SearchItem {
    title: String,
    #[serde(default)]
    snippet: String,
}

/// MediaWiki list=search 응답 → 검색 결과
pub fn parse_search_response(body: &str) -> Result<Vec<SearchHit>> {
    let response: SearchResponse =
        serde_json::from_str(body).context("Failed to parse Wikipedia response")?;

    let items = response.query.map(|q| q.search).unwrap_or_default();
    Ok(items
        .into_iter()
        .map(|item| SearchHit {
            url: page_url(&item.title),
            snippet: strip_html(&item.snippet),
            title: item.title,
        })
        .collect())
}

fn page_url(title: &str) -> String {
    let slug = title.trim().replace(' ', "_");
    match Url::parse(WIKIPEDIA_PAGE_URL).and_then(|base| base.join(&slug)) {
        Ok(url) => url.to_string(),
        Err(_) => format!("{}{}", WIKIPEDIA_PAGE_URL, slug),
    }
}

/// HTML 마크업 제거 + 공백 정리
pub fn strip_html(fragment: &str) -> String {
    let document = Html::parse_fragment(fragment);
    let text: String = document.root_element().text().collect();
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

// ============================================================================
// Relevance Heuristic
// ============================================================================

/// 관련성 판단에 보는 앞부분 길이 (문자)
const RELEVANCE_WINDOW: usize = 200;
/// 최소 일치 수
const MIN_RELEVANCE_MATCHES: usize = 2;
/// 허용되는 최대 주제 이탈 지표 수
const MAX_OFF_TOPIC: usize = 1;

/// 도메인 키워드 (부분 문자열 일치)
const DOMAIN_KEYWORDS: &[&str] = &[
    "africa", "african", "mali", "ghana", "songhai", "ethiopia", "kenya", "nigeria",
    "egypt", "morocco", "sudan", "sundiata", "mansa musa", "timbuktu", "griot", "ubuntu",
    "mandinka", "yoruba", "zulu", "swahili", "hausa", "fulani", "igbo", "ashanti", "wolof",
    "empire", "kingdom", "sahel", "sahara", "niger river", "congo", "nile", "great zimbabwe",
    "benin", "dahomey", "trans-saharan", "oral tradition", "storyteller", "ancestral",
    "indigenous", "colonial", "independence", "pan-african",
];

/// 주제 이탈 지표 (단어 단위 일치)
const OFF_TOPIC_INDICATORS: &[&str] = &[
    "american", "united states", "usa", "canada", "europe", "european", "british",
    "hollywood", "new york", "los angeles", "actor", "actress", "movie", "film",
    "television", "tv show", "celebrity", "rapper", "singer", "painter",
];

/// 질의 토큰에서 제외할 불용어
const STOPWORDS: &[&str] = &[
    "about", "tell", "what", "when", "where", "which", "who", "whom", "with", "from",
    "that", "this", "there", "their", "were", "have", "does", "know", "more", "some",
];

fn off_topic_pattern() -> &'static Regex {
    static PATTERN: std::sync::OnceLock<Regex> = std::sync::OnceLock::new();
    PATTERN.get_or_init(|| {
        let alternatives: Vec<String> = OFF_TOPIC_INDICATORS
            .iter()
            .map(|w| regex::escape(w))
            .collect();
        Regex::new(&format!(r"\b(?:{})\b", alternatives.join("|")))
            .expect("off-topic pattern is valid")
    })
}

/// 검색 결과가 도메인과 관련 있는지 판단
///
/// 앞 200자에서 도메인 키워드 + 질의 토큰(4자 이상, 불용어 제외) 일치가 2개 이상이고
/// 주제 이탈 지표가 1개 이하이면 관련 있음.
pub fn is_relevant(text: &str, query: &str) -> bool {
    let head: String = text.chars().take(RELEVANCE_WINDOW).collect::<String>().to_lowercase();

    let query_terms: Vec<String> = tokenize(&query.to_lowercase())
        .into_iter()
        .filter(|t| t.chars().count() >= 4 && !STOPWORDS.contains(&t.as_str()))
        .filter(|t| !DOMAIN_KEYWORDS.contains(&t.as_str()))
        .collect();

    let matches = DOMAIN_KEYWORDS
        .iter()
        .filter(|k| head.contains(*k))
        .count()
        + query_terms.iter().filter(|t| head.contains(t.as_str())).count();

    let off_topic = off_topic_pattern().find_iter(&head).count();

    tracing::debug!(
        "Relevance: {} matches, {} off-topic indicators",
        matches,
        off_topic
    );
    matches >= MIN_RELEVANCE_MATCHES && off_topic <= MAX_OFF_TOPIC
}

/// 질의에 "Africa" 가 없으면 덧붙임
pub fn contextualize_query(query: &str) -> String {
    let query = query.trim();
    if query.to_lowercase().contains("africa") {
        query.to_string()
    } else {
        format!("{} Africa", query)
    }
}

// ============================================================================
// Formatting
// ============================================================================

/// 스니펫 최대 길이 (문자)
const SNIPPET_MAX_CHARS: usize = 200;

/// 검색 결과 응답 포맷
pub fn format_search_response(hits: &[SearchHit]) -> String {
    let mut text = String::from(
        "Ah, my child, the elders of my village did not tell me this story, \
         but the wider world has written of it...\n",
    );

    for (i, hit) in hits.iter().enumerate() {
        text.push_str(&format!(
            "\n{}. **{}**\n{}\nLearn more: {}\n",
            i + 1,
            hit.title,
            truncate_chars(&hit.snippet, SNIPPET_MAX_CHARS),
            hit.url
        ));
    }

    text.push_str("\nWhat else would you like to learn from the wisdom of our ancestors?");
    text
}

fn truncate_chars(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        text.to_string()
    } else {
        let truncated: String = text.chars().take(max_chars).collect();
        format!("{}...", truncated.trim_end())
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
        "batchcomplete": "",
        "query": {
            "searchinfo": {"totalhits": 2},
            "search": [
                {"ns": 0, "title": "Mali Empire", "snippet": "The <span class=\"searchmatch\">Mali</span> Empire was an empire in West Africa"},
                {"ns": 0, "title": "Mansa Musa", "snippet": "Musa I was the ninth <span class=\"searchmatch\">Mansa</span> &amp; ruler"}
            ]
        }
    }"#;

    #[test]
    fn test_search_creation() {
        let search = WikipediaSearch::new();
        assert!(search.is_ok());
        assert_eq!(WikipediaSearch::default().name(), "wikipedia");
    }

    #[test]
    fn test_request_url() {
        let search = WikipediaSearch::new().unwrap();
        let url = search.request_url("Ubuntu Africa", 3).unwrap();
        let pairs: Vec<(String, String)> = url
            .query_pairs()
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect();
        assert!(pairs.contains(&("srsearch".to_string(), "Ubuntu Africa".to_string())));
        assert!(pairs.contains(&("srlimit".to_string(), "3".to_string())));
        assert_eq!(url.host_str(), Some("en.wikipedia.org"));
    }

    #[test]
    fn test_parse_search_response() {
        let hits = parse_search_response(SAMPLE).unwrap();
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].title, "Mali Empire");
        assert_eq!(hits[0].snippet, "The Mali Empire was an empire in West Africa");
        assert_eq!(hits[0].url, "https://en.wikipedia.org/wiki/Mali_Empire");
        assert_eq!(hits[1].snippet, "Musa I was the ninth Mansa & ruler");
    }

    #[test]
    fn test_parse_empty_response() {
        assert!(parse_search_response(r#"{"batchcomplete": ""}"#).unwrap().is_empty());
        assert!(parse_search_response("<html>").is_err());
    }

    #[test]
    fn test_strip_html() {
        assert_eq!(
            strip_html("<b>Great</b>   <i>Zimbabwe</i>\n ruins"),
            "Great Zimbabwe ruins"
        );
        assert_eq!(strip_html("plain"), "plain");
    }

    #[test]
    fn test_is_relevant() {
        assert!(is_relevant(
            "The Mali Empire was an empire in West Africa",
            "Mali"
        ));
        // 도메인 일치 부족
        assert!(!is_relevant("A recipe for apple pie", "apple pie"));
        // 주제 이탈 지표 과다
        assert!(!is_relevant(
            "African American actor in a Hollywood film",
            "Africa"
        ));
    }

    #[test]
    fn test_is_relevant_query_terms_count() {
        // "africa" 1 + 질의 토큰 "kintampo" 1
        assert!(is_relevant(
            "Kintampo is an archaeological culture of Africa",
            "Kintampo culture"
        ));
    }

    #[test]
    fn test_off_topic_whole_words_only() {
        // "usa" 는 "Usambara" 안에서 일치하지 않음
        assert!(is_relevant(
            "The Usambara mountains of Tanzania in East Africa host the Shambaa kingdom",
            "Usambara"
        ));
    }

    #[test]
    fn test_relevance_only_reads_head() {
        let padding = "x ".repeat(150);
        let text = format!("{}Mali Empire of Africa", padding);
        assert!(!is_relevant(&text, "Mali"));
    }

    #[test]
    fn test_contextualize_query() {
        assert_eq!(contextualize_query("Who was Sundiata?"), "Who was Sundiata? Africa");
        assert_eq!(contextualize_query("African music "), "African music");
    }

    #[test]
    fn test_format_search_response() {
        let hits = vec![SearchHit {
            title: "Kintampo complex".to_string(),
            snippet: "k".repeat(250),
            url: "https://en.wikipedia.org/wiki/Kintampo_complex".to_string(),
        }];
        let text = format_search_response(&hits);
        assert!(text.contains("1. **Kintampo complex**"));
        assert!(text.contains(&format!("{}...", "k".repeat(200))));
        assert!(!text.contains(&"k".repeat(201)));
        assert!(text.contains("Learn more: https://en.wikipedia.org/wiki/Kintampo_complex"));
    }
}

use std::time::Duration;

use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;

use crate::logging::{log_debug, log_info, log_warn};

pub const DEFAULT_SEARCH_ENDPOINT: &str = "https://api.duckduckgo.com/";
pub const DEFAULT_MAX_RESULTS: i64 = 3;
pub const DEFAULT_SEARCH_TIMEOUT: Duration = Duration::from_secs(10);

const MIN_RESULTS: i64 = 1;
const MAX_RESULTS: i64 = 5;
const MAX_QUERY_LENGTH: usize = 500;
const MAX_RESPONSE_BYTES: usize = 2 * 1024 * 1024;
const ABSTRACT_LIMIT: usize = 200;
const TOPIC_LIMIT: usize = 150;
const MAX_QUICK_FACTS: usize = 3;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SearchError {
    #[error("Search query cannot be empty")]
    EmptyQuery,
    #[error("Search query is too long (max {max} characters)", max = MAX_QUERY_LENGTH)]
    QueryTooLong,
    #[error("Could not connect to the search service: {0}")]
    ConnectionError(String),
    #[error("Search request timed out after {0:?}")]
    Timeout(Duration),
    #[error("Search request failed: {0}")]
    RequestError(String),
    #[error("Could not parse search results: {0}")]
    ResponseParseError(String),
}

/// Subset of the DuckDuckGo instant-answer payload that gets rendered.
#[derive(Debug, Default, Deserialize)]
pub struct InstantAnswer {
    #[serde(rename = "Answer", default)]
    answer: Value,
    #[serde(rename = "AbstractText", default)]
    abstract_text: String,
    #[serde(rename = "AbstractURL", default)]
    abstract_url: String,
    #[serde(rename = "Definition", default)]
    definition: String,
    #[serde(rename = "DefinitionURL", default)]
    definition_url: String,
    #[serde(rename = "RelatedTopics", default)]
    related_topics: Vec<RelatedTopic>,
    #[serde(rename = "Infobox", default)]
    infobox: Value,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RelatedTopic {
    Topic {
        #[serde(rename = "Text")]
        text: String,
        #[serde(rename = "FirstURL", default)]
        first_url: String,
    },
    Topics {
        #[serde(rename = "Topics")]
        topics: Vec<RelatedTopic>,
    },
    Other(Value),
}

fn flatten_topics<'a>(topics: &'a [RelatedTopic], out: &mut Vec<(&'a str, &'a str)>) {
    for topic in topics {
        match topic {
            RelatedTopic::Topic { text, first_url } if !text.trim().is_empty() => {
                out.push((text.as_str(), first_url.as_str()));
            }
            RelatedTopic::Topics { topics } => flatten_topics(topics, out),
            _ => {}
        }
    }
}

pub fn clamp_max_results(requested: i64) -> usize {
    requested.clamp(MIN_RESULTS, MAX_RESULTS) as usize
}

fn truncate_chars(text: &str, limit: usize) -> String {
    let text = text.trim();
    if text.chars().count() <= limit {
        text.to_string()
    } else {
        let mut truncated: String = text.chars().take(limit).collect();
        truncated.push_str("...");
        truncated
    }
}

fn quick_facts(infobox: &Value) -> Vec<(String, String)> {
    let Some(content) = infobox.get("content").and_then(Value::as_array) else {
        return Vec::new();
    };
    content
        .iter()
        .filter_map(|entry| {
            let label = entry.get("label")?.as_str()?.trim();
            let value = match entry.get("value")? {
                Value::String(s) => s.trim().to_string(),
                Value::Number(n) => n.to_string(),
                _ => return None,
            };
            if label.is_empty() || value.is_empty() {
                return None;
            }
            Some((label.to_string(), value))
        })
        .take(MAX_QUICK_FACTS)
        .collect()
}

/// Renders whichever sections are present; `max_results` is already clamped.
pub fn format_results(answer: &InstantAnswer, query: &str, max_results: usize) -> String {
    let mut sections = Vec::new();

    if let Some(direct) = answer.answer.as_str().map(str::trim).filter(|a| !a.is_empty()) {
        sections.push(format!("Answer: {direct}"));
    }

    let (summary, source) = if answer.abstract_text.trim().is_empty() {
        (&answer.definition, &answer.definition_url)
    } else {
        (&answer.abstract_text, &answer.abstract_url)
    };
    if !summary.trim().is_empty() {
        let mut section = format!("Summary: {}", truncate_chars(summary, ABSTRACT_LIMIT));
        if !source.trim().is_empty() {
            section.push_str(&format!("\nSource: {source}"));
        }
        sections.push(section);
    }

    let mut topics = Vec::new();
    flatten_topics(&answer.related_topics, &mut topics);
    if !topics.is_empty() {
        let mut section = String::from("Related:");
        for (index, (text, url)) in topics.iter().take(max_results).enumerate() {
            section.push_str(&format!("\n{}. {}", index + 1, truncate_chars(text, TOPIC_LIMIT)));
            if !url.is_empty() {
                section.push_str(&format!("\n   {url}"));
            }
        }
        sections.push(section);
    }

    let facts = quick_facts(&answer.infobox);
    if !facts.is_empty() {
        let mut section = String::from("Quick facts:");
        for (label, value) in facts {
            section.push_str(&format!("\n- {label}: {value}"));
        }
        sections.push(section);
    }

    if sections.is_empty() {
        format!(
            "No structured results found for '{query}'. Try a more specific topic or different keywords."
        )
    } else {
        format!("Search results for '{query}':\n\n{}", sections.join("\n\n"))
    }
}

#[derive(Debug, Clone)]
pub struct SearchClient {
    client: reqwest::Client,
    endpoint: String,
    timeout: Duration,
}

impl SearchClient {
    pub fn new(endpoint: impl Into<String>) -> Result<Self, SearchError> {
        Self::with_timeout(endpoint, DEFAULT_SEARCH_TIMEOUT)
    }

    pub fn with_timeout(endpoint: impl Into<String>, timeout: Duration) -> Result<Self, SearchError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("toolchat/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| SearchError::RequestError(format!("failed to create HTTP client: {e}")))?;
        Ok(Self {
            client,
            endpoint: endpoint.into(),
            timeout,
        })
    }

    fn map_reqwest_error(&self, error: reqwest::Error) -> SearchError {
        if error.is_timeout() {
            SearchError::Timeout(self.timeout)
        } else if error.is_connect() {
            SearchError::ConnectionError(error.to_string())
        } else {
            SearchError::RequestError(error.to_string())
        }
    }

    /// Collect the body chunk by chunk, giving up as soon as it passes the size cap.
    async fn read_body(&self, mut response: reqwest::Response) -> Result<Vec<u8>, SearchError> {
        let too_large = || SearchError::ResponseParseError("response too large".to_string());

        if let Some(length) = response.content_length()
            && length > MAX_RESPONSE_BYTES as u64
        {
            log_warn(&format!("Search response declares {length} bytes, refusing to read"));
            return Err(too_large());
        }

        let mut body = Vec::new();
        while let Some(chunk) = response
            .chunk()
            .await
            .map_err(|e| self.map_reqwest_error(e))?
        {
            if body.len() + chunk.len() > MAX_RESPONSE_BYTES {
                log_warn("Search response exceeded the size limit while streaming");
                return Err(too_large());
            }
            body.extend_from_slice(&chunk);
        }
        Ok(body)
    }

    pub async fn search(&self, query: &str, max_results: i64) -> Result<String, SearchError> {
        let query = query.trim();
        if query.is_empty() {
            return Err(SearchError::EmptyQuery);
        }
        if query.chars().count() > MAX_QUERY_LENGTH {
            return Err(SearchError::QueryTooLong);
        }
        let max_results = clamp_max_results(max_results);

        let url = format!(
            "{}?q={}&format=json&no_html=1&skip_disambig=1",
            self.endpoint,
            urlencoding::encode(query)
        );
        log_info(&format!("Searching for '{query}' (max {max_results} results)"));

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| self.map_reqwest_error(e))?;

        if !response.status().is_success() {
            log_warn(&format!("Search returned HTTP {}", response.status()));
            return Err(SearchError::RequestError(format!(
                "HTTP {}",
                response.status()
            )));
        }

        let body = self.read_body(response).await?;
        log_debug(&format!("Search response: {} bytes", body.len()));

        let answer: InstantAnswer = serde_json::from_slice(&body)
            .map_err(|e| SearchError::ResponseParseError(e.to_string()))?;
        Ok(format_results(&answer, query, max_results))
    }
}

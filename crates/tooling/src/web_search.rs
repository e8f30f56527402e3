use anyhow::Result;
use async_trait::async_trait;
use reqwest::Client;
use scraper::{Html, Selector};
use serde::Serialize;
use serde_json::json;
use std::time::Duration;
use tracing::debug;

use crate::tool::{Tool, ToolError, ToolInput, ToolOutput};

const DDG_HTML_URL: &str = "https://html.duckduckgo.com/html/";
const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchHit {
    pub title: String,
    pub url: String,
    pub snippet: String,
}

/// Web search backed by DuckDuckGo's HTML interface. No API key, so a
/// pause before every request keeps us under their rate limit.
pub struct WebSearchTool {
    client: Client,
    search_delay: Duration,
    max_results: usize,
}

impl WebSearchTool {
    pub fn new(search_delay: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(10))
            .user_agent(USER_AGENT)
            .build()?;

        Ok(Self {
            client,
            search_delay,
            max_results: 5,
        })
    }

    async fn search(&self, query: &str) -> Result<Vec<SearchHit>> {
        tokio::time::sleep(self.search_delay).await;

        debug!(query, "running web search");
        let response = self
            .client
            .post(DDG_HTML_URL)
            .form(&[("q", query)])
            .send()
            .await?;

        if !response.status().is_success() {
            anyhow::bail!("Search request failed with status {}", response.status());
        }

        let html = response.text().await?;
        Ok(parse_results(&html, self.max_results))
    }
}

fn parse_results(html: &str, max_results: usize) -> Vec<SearchHit> {
    let document = Html::parse_document(html);
    let (Ok(result_selector), Ok(title_selector), Ok(snippet_selector)) = (
        Selector::parse("div.result"),
        Selector::parse("a.result__a"),
        Selector::parse("a.result__snippet"),
    ) else {
        return Vec::new();
    };

    let mut hits = Vec::new();
    for result in document.select(&result_selector) {
        if hits.len() >= max_results {
            break;
        }

        let Some(link) = result.select(&title_selector).next() else {
            continue;
        };
        let Some(href) = link.value().attr("href") else {
            continue;
        };

        let url = extract_ddg_url(href);
        let title = link.text().collect::<String>().trim().to_string();
        let snippet = result
            .select(&snippet_selector)
            .next()
            .map(|s| s.text().collect::<String>().trim().to_string())
            .unwrap_or_default();

        if !url.is_empty() && !title.is_empty() {
            hits.push(SearchHit {
                title,
                url,
                snippet,
            });
        }
    }

    hits
}

/// Results come wrapped in redirect links of the form
/// `//duckduckgo.com/l/?uddg=https%3A%2F%2Fexample.com&rut=...`.
fn extract_ddg_url(redirect_url: &str) -> String {
    if let Some(uddg_pos) = redirect_url.find("uddg=") {
        let url_start = uddg_pos + 5;
        let url_end = redirect_url[url_start..]
            .find('&')
            .unwrap_or(redirect_url.len() - url_start);
        url_decode(&redirect_url[url_start..url_start + url_end])
    } else if redirect_url.starts_with("http") {
        redirect_url.to_string()
    } else {
        String::new()
    }
}

fn url_decode(s: &str) -> String {
    // Percent escapes are raw UTF-8 bytes, so decode into a byte buffer
    // and convert once at the end.
    let mut bytes = Vec::with_capacity(s.len());
    let mut chars = s.chars();

    while let Some(c) = chars.next() {
        if c == '%' {
            let hex: String = chars.by_ref().take(2).collect();
            if let Ok(byte) = u8::from_str_radix(&hex, 16) {
                bytes.push(byte);
            }
        } else if c == '+' {
            bytes.push(b' ');
        } else {
            let mut buf = [0u8; 4];
            bytes.extend_from_slice(c.encode_utf8(&mut buf).as_bytes());
        }
    }

    String::from_utf8_lossy(&bytes).into_owned()
}

fn format_hits(hits: &[SearchHit]) -> Result<String> {
    if hits.is_empty() {
        return Ok("No results found.".to_string());
    }

    Ok(serde_json::to_string(hits)?)
}

#[async_trait]
impl Tool for WebSearchTool {
    fn name(&self) -> &str {
        "search_web"
    }

    fn description(&self) -> &str {
        "Searches the web for the given query and returns the top results with titles, URLs and snippets."
    }

    fn parameters(&self) -> serde_json::Value {
        json!({
            "type": "object",
            "properties": {
                "query": {
                    "type": "string",
                    "description": "The search query"
                }
            },
            "required": ["query"]
        })
    }

    async fn execute(&self, input: ToolInput) -> Result<ToolOutput, ToolError> {
        self.validate_input(&input)?;

        let query: String = input
            .get_argument("query")
            .map_err(|e| ToolError::new(self.name().to_string(), e.to_string(), false))?;

        let hits = self
            .search(&query)
            .await
            .map_err(|e| ToolError::new(self.name().to_string(), e.to_string(), true))?;

        let result = format_hits(&hits)
            .map_err(|e| ToolError::new(self.name().to_string(), e.to_string(), false))?;

        ToolOutput::success(json!({"result": result}))
            .map_err(|e| ToolError::new(self.name().to_string(), e.to_string(), false))
    }
}

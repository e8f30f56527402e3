use anyhow::Result;
use async_trait::async_trait;
use reqwest::Client;
use scraper::{Html, Selector};
use serde_json::json;
use std::time::Duration;
use tracing::debug;

use crate::tool::{Tool, ToolError, ToolInput, ToolOutput};

const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// Containers most likely to hold the main article text, tried in
/// order before falling back to the whole body.
const CONTENT_SELECTORS: &[&str] = &[
    "article",
    "main",
    ".post-content",
    ".entry-content",
    ".content",
    "#content",
];

const MAX_CONTENT_CHARS: usize = 8000;

/// Fetches a page and reduces it to readable text for the model.
pub struct ReadWebpageTool {
    client: Client,
    fetch_delay: Duration,
}

impl ReadWebpageTool {
    pub fn new(fetch_delay: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(10))
            .user_agent(USER_AGENT)
            .build()?;

        Ok(Self {
            client,
            fetch_delay,
        })
    }

    async fn fetch_text(&self, url: &str) -> Result<String> {
        tokio::time::sleep(self.fetch_delay).await;

        debug!(url, "fetching webpage");
        let response = self.client.get(url).send().await?;

        if !response.status().is_success() {
            anyhow::bail!("status {}", response.status());
        }

        let html = response.text().await?;
        Ok(extract_content(&html))
    }
}

fn extract_content(html: &str) -> String {
    let document = Html::parse_document(html);

    for selector_str in CONTENT_SELECTORS {
        if let Ok(selector) = Selector::parse(selector_str) {
            if let Some(element) = document.select(&selector).next() {
                let text = clean_text(&element.text().collect::<Vec<_>>().join(" "));
                if !text.is_empty() {
                    return truncate_content(text);
                }
            }
        }
    }

    let text = match Selector::parse("body") {
        Ok(body_selector) => document
            .select(&body_selector)
            .next()
            .map(|body| clean_text(&body.text().collect::<Vec<_>>().join(" ")))
            .unwrap_or_default(),
        Err(_) => String::new(),
    };

    truncate_content(text)
}

fn clean_text(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn truncate_content(text: String) -> String {
    if text.len() <= MAX_CONTENT_CHARS {
        return text;
    }

    let mut end = MAX_CONTENT_CHARS;
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}...", &text[..end])
}

#[async_trait]
impl Tool for ReadWebpageTool {
    fn name(&self) -> &str {
        "read_webpage"
    }

    fn description(&self) -> &str {
        "Reads the page at the given URL and returns its main text content."
    }

    fn parameters(&self) -> serde_json::Value {
        json!({
            "type": "object",
            "properties": {
                "url": {
                    "type": "string",
                    "description": "The URL of the page to read"
                }
            },
            "required": ["url"]
        })
    }

    async fn execute(&self, input: ToolInput) -> Result<ToolOutput, ToolError> {
        self.validate_input(&input)?;

        let url: String = input
            .get_argument("url")
            .map_err(|e| ToolError::new(self.name().to_string(), e.to_string(), false))?;

        // Fetch failures go back to the model as text so it can pick a
        // different result instead of aborting the whole run.
        let result = match self.fetch_text(&url).await {
            Ok(text) => text,
            Err(e) => format!("Error reading URL {}: {}", url, e),
        };

        ToolOutput::success(json!({"result": result}))
            .map_err(|e| ToolError::new(self.name().to_string(), e.to_string(), false))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_prefer_article_content() {
        let html = r#"
            <html><body>
            <nav>Navigation junk</nav>
            <article>The actual story text.</article>
            </body></html>
        "#;

        assert_eq!(extract_content(html), "The actual story text.");
    }

    #[test]
    fn should_fall_back_to_body() {
        let html = "<html><body><p>Plain body text.</p></body></html>";

        assert_eq!(extract_content(html), "Plain body text.");
    }

    #[test]
    fn should_collapse_whitespace() {
        assert_eq!(clean_text("  a \n\n  b\tc  "), "a b c");
    }

    #[test]
    fn should_truncate_long_content() {
        let long = "x".repeat(MAX_CONTENT_CHARS + 100);

        let truncated = truncate_content(long);

        assert_eq!(truncated.len(), MAX_CONTENT_CHARS + 3);
        assert!(truncated.ends_with("..."));
    }

    #[test]
    fn should_keep_short_content_untouched() {
        let short = "short text".to_string();

        assert_eq!(truncate_content(short.clone()), short);
    }

    #[tokio::test]
    async fn should_report_fetch_errors_as_text() {
        let tool = ReadWebpageTool::new(Duration::from_secs(0)).unwrap();
        let input = ToolInput::new("read_webpage".to_string())
            .with_argument("url", "http://127.0.0.1:1/none")
            .unwrap();

        let output = tool.execute(input).await.unwrap();

        assert!(output.success);
        let text = output.result["result"].as_str().unwrap();
        assert!(text.starts_with("Error reading URL http://127.0.0.1:1/none:"));
    }
}

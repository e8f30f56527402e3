use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One conversational turn on the wire. Roles are the API's own
/// vocabulary: "user", "model" and "function".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Content {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    pub parts: Vec<Part>,
}

impl Content {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: Some("user".to_string()),
            parts: vec![Part::text(text)],
        }
    }

    pub fn model(parts: Vec<Part>) -> Self {
        Self {
            role: Some("model".to_string()),
            parts,
        }
    }

    pub fn function_responses(responses: Vec<FunctionResponse>) -> Self {
        Self {
            role: Some("function".to_string()),
            parts: responses
                .into_iter()
                .map(|r| Part {
                    text: None,
                    function_call: None,
                    function_response: Some(r),
                })
                .collect(),
        }
    }

    /// Concatenates every text part of this turn.
    pub fn text(&self) -> String {
        self.parts
            .iter()
            .filter_map(|p| p.text.as_deref())
            .collect::<Vec<_>>()
            .join("")
    }

    /// Returns the function calls the model asked for, if any.
    pub fn function_calls(&self) -> Vec<&FunctionCall> {
        self.parts
            .iter()
            .filter_map(|p| p.function_call.as_ref())
            .collect()
    }
}

/// A single part of a turn: plain text, a call the model wants made,
/// or the result we feed back.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Part {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub function_call: Option<FunctionCall>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub function_response: Option<FunctionResponse>,
}

impl Part {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            function_call: None,
            function_response: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionCall {
    pub name: String,
    #[serde(default)]
    pub args: Value,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionResponse {
    pub name: String,
    pub response: Value,
}

/// Schema advertised to the model for one callable function. The
/// `parameters` value is a JSON schema object.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FunctionDeclaration {
    pub name: String,
    pub description: String,
    pub parameters: Value,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolSpec {
    pub function_declarations: Vec<FunctionDeclaration>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_output_tokens: Option<u32>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateRequest {
    pub contents: Vec<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system_instruction: Option<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tools: Option<Vec<ToolSpec>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub generation_config: Option<GenerationConfig>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GenerateResponse {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Candidate {
    pub content: Content,
}

impl GenerateResponse {
    /// The first candidate's content, which is all we ever ask for.
    pub fn content(&self) -> Option<&Content> {
        self.candidates.first().map(|c| &c.content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn should_serialize_text_content_with_role() {
        let content = Content::user("Hello");

        let json = serde_json::to_value(&content).unwrap();

        assert_eq!(json, json!({"role": "user", "parts": [{"text": "Hello"}]}));
    }

    #[test]
    fn should_serialize_function_response_in_camel_case() {
        let content = Content::function_responses(vec![FunctionResponse {
            name: "get_weather".to_string(),
            response: json!({"temperature": 21.5}),
        }]);

        let json = serde_json::to_value(&content).unwrap();

        assert_eq!(
            json,
            json!({
                "role": "function",
                "parts": [{
                    "functionResponse": {
                        "name": "get_weather",
                        "response": {"temperature": 21.5}
                    }
                }]
            })
        );
    }

    #[test]
    fn should_deserialize_function_call_from_response() {
        let raw = json!({
            "candidates": [{
                "content": {
                    "role": "model",
                    "parts": [{
                        "functionCall": {
                            "name": "search_web",
                            "args": {"query": "rust async"}
                        }
                    }]
                }
            }]
        });

        let response: GenerateResponse = serde_json::from_value(raw).unwrap();
        let content = response.content().unwrap();
        let calls = content.function_calls();

        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].name, "search_web");
        assert_eq!(calls[0].args["query"], "rust async");
    }

    #[test]
    fn should_collect_text_across_parts() {
        let content = Content {
            role: Some("model".to_string()),
            parts: vec![Part::text("Hello, "), Part::text("world")],
        };

        assert_eq!(content.text(), "Hello, world");
    }

    #[test]
    fn should_handle_empty_candidates() {
        let response: GenerateResponse = serde_json::from_value(json!({})).unwrap();

        assert!(response.content().is_none());
    }

    #[test]
    fn should_omit_optional_request_fields() {
        let request = GenerateRequest {
            contents: vec![Content::user("Hi")],
            system_instruction: None,
            tools: None,
            generation_config: None,
        };

        let json = serde_json::to_value(&request).unwrap();

        assert!(json.get("tools").is_none());
        assert!(json.get("systemInstruction").is_none());
        assert!(json.get("generationConfig").is_none());
    }
}

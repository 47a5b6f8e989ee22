use serde::{Deserialize, Serialize};

pub const WEB_SEARCH_TOOL_TYPE: &str = "web_search_20250305";
pub const WEB_SEARCH_TOOL_NAME: &str = "web_search";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

impl Message {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }
}

/// Server-side tool the provider runs on its own, capped at `max_uses` invocations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WebSearchTool {
    #[serde(rename = "type")]
    pub kind: String,
    pub name: String,
    pub max_uses: u32,
}

impl WebSearchTool {
    pub fn capped(max_uses: u32) -> Self {
        Self {
            kind: WEB_SEARCH_TOOL_TYPE.to_string(),
            name: WEB_SEARCH_TOOL_NAME.to_string(),
            max_uses,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompletionRequest {
    pub model: String,
    pub max_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tools: Option<Vec<WebSearchTool>>,
    pub messages: Vec<Message>,
}

impl CompletionRequest {
    pub fn new(model: impl Into<String>, max_tokens: u32) -> Self {
        Self {
            model: model.into(),
            max_tokens,
            tools: None,
            messages: Vec::new(),
        }
    }

    pub fn web_search(mut self, max_uses: u32) -> Self {
        self.tools
            .get_or_insert_with(Vec::new)
            .push(WebSearchTool::capped(max_uses));
        self
    }

    pub fn user(mut self, prompt: impl Into<String>) -> Self {
        self.messages.push(Message::user(prompt));
        self
    }

    /// Prompt text of the (single) user turn, if any.
    pub fn prompt(&self) -> Option<&str> {
        self.messages
            .iter()
            .find(|m| m.role == Role::User)
            .map(|m| m.content.as_str())
    }
}

/// One segment of a completion response. Only `Text` carries digest content.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ContentBlock {
    #[serde(rename = "text")]
    Text { text: String },
    #[serde(rename = "tool_use")]
    ToolUse {
        #[serde(default)]
        id: String,
        #[serde(default)]
        name: String,
        #[serde(default)]
        input: serde_json::Value,
    },
    #[serde(rename = "server_tool_use")]
    ServerToolUse {
        #[serde(default)]
        id: String,
        #[serde(default)]
        name: String,
        #[serde(default)]
        input: serde_json::Value,
    },
    #[serde(rename = "web_search_tool_result")]
    WebSearchToolResult {
        #[serde(default)]
        tool_use_id: String,
        #[serde(default)]
        content: serde_json::Value,
    },
    #[serde(other)]
    Other,
}

impl ContentBlock {
    pub fn text(text: impl Into<String>) -> Self {
        ContentBlock::Text { text: text.into() }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            ContentBlock::Text { text } => Some(text),
            ContentBlock::ToolUse { .. }
            | ContentBlock::ServerToolUse { .. }
            | ContentBlock::WebSearchToolResult { .. }
            | ContentBlock::Other => None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CompletionResponse {
    pub content: Vec<ContentBlock>,
    #[serde(default)]
    pub stop_reason: Option<String>,
}

impl CompletionResponse {
    pub fn from_blocks(content: Vec<ContentBlock>) -> Self {
        Self {
            content,
            stop_reason: Some("end_turn".to_string()),
        }
    }

    pub fn from_text(text: impl Into<String>) -> Self {
        Self::from_blocks(vec![ContentBlock::text(text)])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn request_serializes_search_tool_and_message() {
        let req = CompletionRequest::new("m", 4096).web_search(5).user("hi");
        let v = serde_json::to_value(&req).unwrap();
        assert_eq!(
            v,
            json!({
                "model": "m",
                "max_tokens": 4096,
                "tools": [{"type": "web_search_20250305", "name": "web_search", "max_uses": 5}],
                "messages": [{"role": "user", "content": "hi"}]
            })
        );
    }

    #[test]
    fn request_without_tools_omits_the_field() {
        let req = CompletionRequest::new("m", 2048).user("x");
        let v = serde_json::to_value(&req).unwrap();
        assert!(v.get("tools").is_none());
        assert_eq!(req.prompt(), Some("x"));
    }

    #[test]
    fn response_with_mixed_blocks_parses() {
        let raw = json!({
            "content": [
                {"type": "text", "text": "Looking into it.", "citations": null},
                {"type": "server_tool_use", "id": "srvtoolu_1", "name": "web_search", "input": {"query": "ai news"}},
                {"type": "web_search_tool_result", "tool_use_id": "srvtoolu_1", "content": []},
                {"type": "thinking", "thinking": "..."},
                {"type": "text", "text": " Done."}
            ],
            "stop_reason": "end_turn",
            "usage": {"input_tokens": 10, "output_tokens": 20}
        });
        let resp: CompletionResponse = serde_json::from_value(raw).unwrap();
        assert_eq!(resp.content.len(), 5);
        assert_eq!(resp.content[0].as_text(), Some("Looking into it."));
        assert!(matches!(resp.content[1], ContentBlock::ServerToolUse { .. }));
        assert!(matches!(resp.content[2], ContentBlock::WebSearchToolResult { .. }));
        assert_eq!(resp.content[3], ContentBlock::Other);
        assert_eq!(resp.content[3].as_text(), None);
    }
}

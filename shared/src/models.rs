use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::formatting::{format_file_size, now_timestamp};

// ── Chat ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    #[serde(alias = "assistant")]
    Bot,
    System,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Bot => "bot",
            Role::System => "system",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for Role {
    type Error = String;
    fn try_from(s: &str) -> Result<Self, Self::Error> {
        match s.to_lowercase().as_str() {
            "user" => Ok(Role::User),
            "bot" | "assistant" => Ok(Role::Bot),
            "system" => Ok(Role::System),
            other => Err(format!("Unknown role: {other}")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
    pub timestamp: String,
}

impl ChatMessage {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
            timestamp: now_timestamp(),
        }
    }
}

/// Canonical body of a chat API result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatReply {
    pub message: ChatMessage,
    pub session_id: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub suggestions: Vec<String>,
}

// ── Summaries and quizzes ────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceType {
    Text,
    Pdf,
    Youtube,
}

impl SourceType {
    pub fn as_str(&self) -> &'static str {
        match self {
            SourceType::Text => "text",
            SourceType::Pdf => "pdf",
            SourceType::Youtube => "youtube",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "text" => Some(SourceType::Text),
            "pdf" => Some(SourceType::Pdf),
            "youtube" => Some(SourceType::Youtube),
            _ => None,
        }
    }
}

impl std::fmt::Display for SourceType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Descriptive fields about the summarized source.
///
/// Every field is optional. Keys the upstream sends that are not recognised,
/// or that carry an unexpected JSON type, are preserved in `extra`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SourceInfo {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub channel: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub published: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_modified: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pages: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub word_count: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub character_count: Option<u64>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl SourceInfo {
    /// Builds a `SourceInfo` from an arbitrary JSON object without failing.
    pub fn from_map(map: &Map<String, Value>) -> Self {
        let mut info = SourceInfo::default();
        for (key, value) in map {
            let stored = match key.as_str() {
                "title" => set_text(&mut info.title, value),
                "author" => set_text(&mut info.author, value),
                "url" => set_text(&mut info.url, value),
                "duration" => set_text(&mut info.duration, value),
                "channel" => set_text(&mut info.channel, value),
                "published" => set_text(&mut info.published, value),
                "last_modified" => set_text(&mut info.last_modified, value),
                "pages" => set_count(&mut info.pages, value),
                "size" => set_count(&mut info.size, value),
                "word_count" => set_count(&mut info.word_count, value),
                "character_count" => set_count(&mut info.character_count, value),
                _ => false,
            };
            if !stored && !value.is_null() {
                info.extra.insert(key.clone(), value.clone());
            }
        }
        info
    }

    /// Labelled fields worth showing for the given source type, in display order.
    pub fn display_fields(&self, source_type: SourceType) -> Vec<(&'static str, String)> {
        let mut fields = Vec::new();
        if let Some(title) = &self.title {
            fields.push(("Title", title.clone()));
        }
        match source_type {
            SourceType::Text => {
                if let Some(words) = self.word_count {
                    fields.push(("Word count", words.to_string()));
                }
                if let Some(chars) = self.character_count {
                    fields.push(("Character count", chars.to_string()));
                }
            }
            SourceType::Pdf => {
                if let Some(author) = &self.author {
                    fields.push(("Author", author.clone()));
                }
                if let Some(pages) = self.pages {
                    fields.push(("Pages", pages.to_string()));
                }
                if let Some(size) = self.size {
                    fields.push(("Size", format_file_size(size)));
                }
                if let Some(modified) = &self.last_modified {
                    fields.push(("Last modified", modified.clone()));
                }
            }
            SourceType::Youtube => {
                if let Some(url) = &self.url {
                    fields.push(("URL", url.clone()));
                }
                if let Some(duration) = &self.duration {
                    fields.push(("Duration", duration.clone()));
                }
                if let Some(channel) = &self.channel {
                    fields.push(("Channel", channel.clone()));
                }
                if let Some(published) = &self.published {
                    fields.push(("Published", published.clone()));
                }
            }
        }
        fields
    }
}

fn set_text(slot: &mut Option<String>, value: &Value) -> bool {
    match value {
        Value::String(s) => *slot = Some(s.clone()),
        Value::Number(n) => *slot = Some(n.to_string()),
        _ => return false,
    }
    true
}

fn set_count(slot: &mut Option<u64>, value: &Value) -> bool {
    let parsed = match value {
        Value::Number(n) => n.as_u64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    };
    match parsed {
        Some(n) => {
            *slot = Some(n);
            true
        }
        None => false,
    }
}

/// One timestamped section of a video summary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Section {
    pub time: String,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Summary {
    pub summary: String,
    pub source_type: SourceType,
    pub source_info: SourceInfo,
    pub timestamp: String,
    pub key_points: Vec<String>,
    /// Always present for YouTube summaries, otherwise only when upstream sent one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sections: Option<Vec<Section>>,
    pub metadata: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuizQuestion {
    pub question: String,
    pub options: Vec<String>,
    /// Zero-based index into `options`; `None` when upstream gave no usable answer.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub correct_answer: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub explanation: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Quiz {
    pub questions: Vec<QuizQuestion>,
    pub source_type: SourceType,
    pub source_info: SourceInfo,
    pub timestamp: String,
    pub metadata: Map<String, Value>,
}

/// Result of any summarize endpoint.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum SummarizeResult {
    Summary(Summary),
    Quiz(Quiz),
}

impl SummarizeResult {
    pub fn source_type(&self) -> SourceType {
        match self {
            SummarizeResult::Summary(s) => s.source_type,
            SummarizeResult::Quiz(q) => q.source_type,
        }
    }

    pub fn source_info(&self) -> &SourceInfo {
        match self {
            SummarizeResult::Summary(s) => &s.source_info,
            SummarizeResult::Quiz(q) => &q.source_info,
        }
    }
}

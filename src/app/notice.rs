//! Usage: User-visible notification seam. The embedding shell implements
//! [`NoticeSink`] (system notification, toast, ...); headless callers get
//! [`TracingNoticeSink`], which routes notices into the log stream.

const NOTICE_PREFIX: &str = "MCP Config Hub";

#[derive(Debug, Clone, Copy, serde::Deserialize, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NoticeLevel {
    Info,
    Success,
    Warning,
    Error,
}

#[derive(Debug, Clone, serde::Serialize)]
pub struct NoticePayload {
    pub level: NoticeLevel,
    pub title: String,
    pub body: String,
}

fn default_title(level: NoticeLevel) -> &'static str {
    match level {
        NoticeLevel::Info => "Notice",
        NoticeLevel::Success => "Success",
        NoticeLevel::Warning => "Warning",
        NoticeLevel::Error => "Error",
    }
}

fn normalize_optional_title(title: Option<String>) -> Option<String> {
    let title = title?;
    let trimmed = title.trim();
    if trimmed.is_empty() {
        return None;
    }
    Some(trimmed.to_string())
}

fn format_title(level: NoticeLevel, title: Option<String>) -> String {
    let title = normalize_optional_title(title).unwrap_or_else(|| default_title(level).to_string());
    format!("{NOTICE_PREFIX} · {title}")
}

pub fn build(level: NoticeLevel, title: Option<String>, body: String) -> NoticePayload {
    NoticePayload {
        level,
        title: format_title(level, title),
        body,
    }
}

pub trait NoticeSink: Send + Sync {
    fn emit(&self, payload: NoticePayload);
}

/// Fallback sink for headless use: notices become log lines.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingNoticeSink;

impl NoticeSink for TracingNoticeSink {
    fn emit(&self, payload: NoticePayload) {
        match payload.level {
            NoticeLevel::Error => {
                tracing::error!(title = %payload.title, "{}", payload.body)
            }
            NoticeLevel::Warning => {
                tracing::warn!(title = %payload.title, "{}", payload.body)
            }
            _ => tracing::info!(title = %payload.title, "{}", payload.body),
        }
    }
}

//! models/notice_model.rs
//! Avisos que la política muestra al usuario (no bloquean nada).

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NoticeKind {
    Info,
    Warning,
    Success,
    Advisory,
    Error,
}

impl NoticeKind {
    /// Color del indicador en la UI.
    pub fn indicator(&self) -> &'static str {
        match self {
            NoticeKind::Info | NoticeKind::Advisory => "blue",
            NoticeKind::Warning => "orange",
            NoticeKind::Success => "green",
            NoticeKind::Error => "red",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notice {
    pub kind: NoticeKind,
    pub title: Option<String>,
    pub message: String,
    pub indicator: String,
}

impl Notice {
    pub fn new(kind: NoticeKind, title: Option<&str>, message: impl Into<String>) -> Self {
        Self {
            kind,
            title: title.map(str::to_string),
            message: message.into(),
            indicator: kind.indicator().to_string(),
        }
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self::new(NoticeKind::Info, None, message)
    }

    pub fn warning(title: &str, message: impl Into<String>) -> Self {
        Self::new(NoticeKind::Warning, Some(title), message)
    }

    pub fn success(title: &str, message: impl Into<String>) -> Self {
        Self::new(NoticeKind::Success, Some(title), message)
    }

    pub fn advisory(message: impl Into<String>) -> Self {
        Self::new(NoticeKind::Advisory, None, message)
    }

    pub fn error(title: &str, message: impl Into<String>) -> Self {
        Self::new(NoticeKind::Error, Some(title), message)
    }
}

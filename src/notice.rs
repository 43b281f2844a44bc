//! Short user-facing notifications.

use serde::Serialize;
use std::fmt;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NoticeLevel {
    Info,
    Success,
    Warning,
    Error,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

impl Notice {
    pub fn new(level: NoticeLevel, message: impl Into<String>) -> Self {
        Self {
            level,
            message: message.into(),
        }
    }

    pub fn catalog_loaded(count: usize, total_mb: &str) -> Self {
        Self::new(
            NoticeLevel::Success,
            format!("✨ {count} books loaded ({total_mb} MB total)!"),
        )
    }

    pub fn catalog_failed() -> Self {
        Self::new(NoticeLevel::Error, "❌ Error loading the library")
    }

    pub fn download_started(title: &str, exact_mb: &str) -> Self {
        Self::new(
            NoticeLevel::Info,
            format!("📥 Starting download: {title} ({exact_mb} MB)"),
        )
    }

    pub fn download_saved(title: &str, exact_mb: &str) -> Self {
        Self::new(
            NoticeLevel::Success,
            format!("✅ Download saved: {title} ({exact_mb} MB)"),
        )
    }

    pub fn download_direct(title: &str, exact_mb: &str) -> Self {
        Self::new(
            NoticeLevel::Warning,
            format!("⚠️ Trying direct download: {title} ({exact_mb} MB)"),
        )
    }

    pub fn preview_opened(title: &str, exact_mb: &str) -> Self {
        Self::new(
            NoticeLevel::Info,
            format!("👁️ Opening: {title} ({exact_mb} MB)"),
        )
    }

    /// Emit through the `log` facade at a level matching the notice.
    pub fn log(&self) {
        match self.level {
            NoticeLevel::Info | NoticeLevel::Success => log::info!("{}", self.message),
            NoticeLevel::Warning => log::warn!("{}", self.message),
            NoticeLevel::Error => log::error!("{}", self.message),
        }
    }
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

//! Trilingual text as published by Hong Kong government data sources

use serde::{Deserialize, Serialize};

use super::Language;

/// A piece of text in English, Traditional Chinese and Simplified Chinese
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocalizedText {
    /// English
    pub en: String,
    /// Traditional Chinese
    pub tc: String,
    /// Simplified Chinese
    pub sc: String,
}

impl LocalizedText {
    /// Create from the three language variants
    pub fn new(en: impl Into<String>, tc: impl Into<String>, sc: impl Into<String>) -> Self {
        Self {
            en: en.into(),
            tc: tc.into(),
            sc: sc.into(),
        }
    }

    /// The variant for a given language
    #[must_use]
    pub fn get(&self, language: Language) -> &str {
        match language {
            Language::English => &self.en,
            Language::TraditionalChinese => &self.tc,
            Language::SimplifiedChinese => &self.sc,
        }
    }

    /// True if every variant is blank
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.en.trim().is_empty() && self.tc.trim().is_empty() && self.sc.trim().is_empty()
    }
}

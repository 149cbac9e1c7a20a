//! Bundled display labels.
//!
//! Two locales ship with faqdesk: Korean (the default) and English.

use serde::{Deserialize, Serialize};

/// Locale used for display labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Locale {
    /// Korean labels.
    #[default]
    Ko,
    /// English labels.
    En,
}

/// Fixed UI strings for one locale.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Labels {
    /// Label for the "every category" selector.
    pub all_categories: &'static str,
    /// Shown when a filtered list is empty.
    pub no_results: &'static str,
    /// Prompt shown under an expanded answer.
    pub feedback_prompt: &'static str,
    /// Helpful button caption.
    pub helpful: &'static str,
    /// Not helpful button caption.
    pub not_helpful: &'static str,
    /// Shown when feedback was already given for an entry.
    pub feedback_already_given: &'static str,
    /// Delete confirmation title.
    pub delete_title: &'static str,
    /// Delete confirmation message.
    pub delete_message: &'static str,
}

const KO: Labels = Labels {
    all_categories: "전체",
    no_results: "검색 결과가 없습니다.",
    feedback_prompt: "이 답변이 도움이 되었나요?",
    helpful: "도움이 됐어요",
    not_helpful: "도움이 안됐어요",
    feedback_already_given: "이미 피드백을 남겼습니다.",
    delete_title: "FAQ 삭제",
    delete_message: "정말로 이 FAQ를 삭제하시겠습니까? 이 작업은 되돌릴 수 없습니다.",
};

const EN: Labels = Labels {
    all_categories: "All",
    no_results: "No results found.",
    feedback_prompt: "Was this answer helpful?",
    helpful: "Helpful",
    not_helpful: "Not helpful",
    feedback_already_given: "Feedback already submitted.",
    delete_title: "Delete FAQ",
    delete_message: "Delete this FAQ? This cannot be undone.",
};

impl Locale {
    /// Get the UI strings for this locale.
    #[must_use]
    pub fn labels(self) -> &'static Labels {
        match self {
            Self::Ko => &KO,
            Self::En => &EN,
        }
    }
}

impl std::fmt::Display for Locale {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Ko => write!(f, "ko"),
            Self::En => write!(f, "en"),
        }
    }
}

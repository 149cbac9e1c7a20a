//! Core FAQ types for faqdesk.
//!
//! This module defines the FAQ record, its closed category set, the editable
//! draft used for creates and edits, and the counters the store increments.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::labels::Locale;

/// Opaque identifier assigned by the store when a record is created.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FaqId(String);

impl FaqId {
    /// Wrap an identifier string.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Generate a fresh random identifier.
    #[must_use]
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    /// Borrow the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for FaqId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for FaqId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

/// The closed set of FAQ categories.
///
/// The `SCREAMING_SNAKE_CASE` names are the stored values; display labels come
/// from [`Category::label`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Category {
    /// Designation and management of no-smoking areas in general.
    #[default]
    General,
    /// Childcare centers, kindergartens and schools.
    School,
    /// Apartment complexes.
    Apartment,
    /// Public facilities, by type.
    PublicFacility,
    /// Smoking room installation and management.
    SmokingRoom,
    /// Fines and reductions.
    Fine,
    /// No-smoking guides and enforcement.
    Enforcement,
    /// Anything else.
    Etc,
}

impl Category {
    /// Every category, in display order.
    pub const ALL: [Category; 8] = [
        Self::General,
        Self::School,
        Self::Apartment,
        Self::PublicFacility,
        Self::SmokingRoom,
        Self::Fine,
        Self::Enforcement,
        Self::Etc,
    ];

    /// The stable value written to the store.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::General => "GENERAL",
            Self::School => "SCHOOL",
            Self::Apartment => "APARTMENT",
            Self::PublicFacility => "PUBLIC_FACILITY",
            Self::SmokingRoom => "SMOKING_ROOM",
            Self::Fine => "FINE",
            Self::Enforcement => "ENFORCEMENT",
            Self::Etc => "ETC",
        }
    }

    /// The display label in the given locale.
    #[must_use]
    pub fn label(self, locale: Locale) -> &'static str {
        match (locale, self) {
            (Locale::Ko, Self::General) => "금연구역 지정 및 관리 일반",
            (Locale::Ko, Self::School) => "어린이집·유치원·학교 금연구역",
            (Locale::Ko, Self::Apartment) => "공동주택 금연구역",
            (Locale::Ko, Self::PublicFacility) => "공중이용시설 금연구역 (유형별)",
            (Locale::Ko, Self::SmokingRoom) => "흡연실 설치 및 관리",
            (Locale::Ko, Self::Fine) => "과태료 부과 및 감면",
            (Locale::Ko, Self::Enforcement) => "금연지도원 및 단속",
            (Locale::Ko, Self::Etc) => "기타",
            (Locale::En, Self::General) => "No-smoking areas: general",
            (Locale::En, Self::School) => "Childcare, kindergarten and school areas",
            (Locale::En, Self::Apartment) => "Apartment complex areas",
            (Locale::En, Self::PublicFacility) => "Public facility areas (by type)",
            (Locale::En, Self::SmokingRoom) => "Smoking rooms",
            (Locale::En, Self::Fine) => "Fines and reductions",
            (Locale::En, Self::Enforcement) => "Guides and enforcement",
            (Locale::En, Self::Etc) => "Other",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| Error::UnknownCategory(s.to_string()))
    }
}

/// Which feedback button a viewer pressed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FeedbackKind {
    /// The answer helped.
    Helpful,
    /// The answer did not help.
    NotHelpful,
}

impl From<FeedbackKind> for Counter {
    fn from(kind: FeedbackKind) -> Self {
        match kind {
            FeedbackKind::Helpful => Self::Helpful,
            FeedbackKind::NotHelpful => Self::NotHelpful,
        }
    }
}

/// A numeric field the store can increment atomically.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Counter {
    /// Times the answer was expanded.
    Views,
    /// Helpful feedback count.
    Helpful,
    /// Not-helpful feedback count.
    NotHelpful,
}

impl Counter {
    /// The stored column backing this counter.
    #[must_use]
    pub fn column(self) -> &'static str {
        match self {
            Self::Views => "views",
            Self::Helpful => "helpful",
            Self::NotHelpful => "not_helpful",
        }
    }
}

impl fmt::Display for Counter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.column())
    }
}

/// The editable content of a record: everything an admin form submits.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct FaqDraft {
    /// Question text.
    pub question: String,
    /// Answer text.
    pub answer: String,
    /// Category.
    pub category: Category,
}

impl FaqDraft {
    /// Create a draft from its parts.
    #[must_use]
    pub fn new(question: impl Into<String>, answer: impl Into<String>, category: Category) -> Self {
        Self {
            question: question.into(),
            answer: answer.into(),
            category,
        }
    }

    /// Check that question and answer are non-empty after trimming.
    ///
    /// The stored text is kept exactly as entered.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] naming the first blank field.
    pub fn validate(&self) -> Result<()> {
        if self.question.trim().is_empty() {
            return Err(Error::validation("question", "must not be empty"));
        }
        if self.answer.trim().is_empty() {
            return Err(Error::validation("answer", "must not be empty"));
        }
        Ok(())
    }
}

/// A FAQ record as it appears in a snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Faq {
    /// Store-assigned identifier.
    pub id: FaqId,
    /// Question text.
    pub question: String,
    /// Answer text.
    pub answer: String,
    /// Category.
    pub category: Category,
    /// Times the answer was expanded.
    pub views: u64,
    /// Helpful feedback count.
    pub helpful: u64,
    /// Not-helpful feedback count.
    pub not_helpful: u64,
    /// When the store created the record.
    pub created_at: DateTime<Utc>,
    /// When the content was last edited (or created).
    pub updated_at: DateTime<Utc>,
}

impl Faq {
    /// The editable content of this record.
    #[must_use]
    pub fn draft(&self) -> FaqDraft {
        FaqDraft::new(self.question.clone(), self.answer.clone(), self.category)
    }

    /// Creation date in display form.
    #[must_use]
    pub fn created_date(&self) -> String {
        display_date(Some(self.created_at))
    }

    /// Last edit date in display form.
    #[must_use]
    pub fn updated_date(&self) -> String {
        display_date(Some(self.updated_at))
    }

    /// Current value of a counter.
    #[must_use]
    pub fn counter(&self, counter: Counter) -> u64 {
        match counter {
            Counter::Views => self.views,
            Counter::Helpful => self.helpful,
            Counter::NotHelpful => self.not_helpful,
        }
    }
}

/// Format a store timestamp as a `YYYY-MM-DD` UTC date.
///
/// A missing timestamp (not yet assigned by the store) renders as `""`.
#[must_use]
pub fn display_date(timestamp: Option<DateTime<Utc>>) -> String {
    timestamp.map_or_else(String::new, |ts| ts.format("%Y-%m-%d").to_string())
}

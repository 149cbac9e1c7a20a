//! Local filtering over a snapshot.
//!
//! Both views filter the fully replicated snapshot in memory. Filtering is a
//! pure function of the snapshot, search term, category selector and scope,
//! and it preserves snapshot order.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::faq::{Category, Faq};

/// Category selector: everything, or one category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CategoryFilter {
    /// Pass every record through.
    #[default]
    All,
    /// Keep only records in this category.
    Only(Category),
}

impl CategoryFilter {
    /// Check a category against the selector.
    #[must_use]
    pub fn matches(self, category: Category) -> bool {
        match self {
            Self::All => true,
            Self::Only(selected) => selected == category,
        }
    }
}

impl From<Option<Category>> for CategoryFilter {
    fn from(category: Option<Category>) -> Self {
        category.map_or(Self::All, Self::Only)
    }
}

/// Which text fields the search term is matched against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SearchScope {
    /// Question or answer (user view).
    #[default]
    QuestionAndAnswer,
    /// Question only (admin view).
    QuestionOnly,
}

/// Search term, category selector and scope.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FaqFilter {
    /// Free text search term, as typed.
    pub search: String,
    /// Category selector.
    pub category: CategoryFilter,
    /// Fields searched.
    pub scope: SearchScope,
}

impl FaqFilter {
    /// An empty filter with the given scope.
    #[must_use]
    pub fn new(scope: SearchScope) -> Self {
        Self {
            scope,
            ..Self::default()
        }
    }

    /// Set the search term.
    #[must_use]
    pub fn with_search(mut self, search: impl Into<String>) -> Self {
        self.search = search.into();
        self
    }

    /// Set the category selector.
    #[must_use]
    pub fn with_category(mut self, category: impl Into<CategoryFilter>) -> Self {
        self.category = category.into();
        self
    }

    /// Check one record.
    #[must_use]
    pub fn matches(&self, faq: &Faq) -> bool {
        self.category.matches(faq.category) && self.matches_text(faq)
    }

    fn matches_text(&self, faq: &Faq) -> bool {
        // A blank term matches everything; otherwise the term is used as typed.
        if self.search.trim().is_empty() {
            return true;
        }
        let needle = self.search.to_lowercase();
        let contains = |text: &str| text.to_lowercase().contains(&needle);
        match self.scope {
            SearchScope::QuestionAndAnswer => contains(&faq.question) || contains(&faq.answer),
            SearchScope::QuestionOnly => contains(&faq.question),
        }
    }

    /// Filter a snapshot, keeping its order.
    #[must_use]
    pub fn apply(&self, faqs: &[Faq]) -> Vec<Faq> {
        faqs.iter().filter(|faq| self.matches(faq)).cloned().collect()
    }
}

/// Totals derived from a snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FaqStats {
    /// Number of records.
    pub records: usize,
    /// Sum of views.
    pub views: u64,
    /// Sum of helpful votes.
    pub helpful: u64,
    /// Sum of not-helpful votes.
    pub not_helpful: u64,
    /// Records per category storage value; empty categories are omitted.
    pub per_category: BTreeMap<&'static str, usize>,
}

impl FaqStats {
    /// Summarise a snapshot.
    #[must_use]
    pub fn from_snapshot(faqs: &[Faq]) -> Self {
        faqs.iter().fold(Self::default(), |mut stats, faq| {
            stats.records += 1;
            stats.views += faq.views;
            stats.helpful += faq.helpful;
            stats.not_helpful += faq.not_helpful;
            *stats.per_category.entry(faq.category.as_str()).or_default() += 1;
            stats
        })
    }
}

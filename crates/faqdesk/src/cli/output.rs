//! Text rendering for `faqctl`.
//!
//! Renderers return strings so the binary only decides where they go.

use std::fmt::Write as _;

use crate::error::Result;
use crate::faq::{Category, Faq};
use crate::filter::FaqStats;
use crate::labels::Locale;
use crate::store::StoreStats;

use super::OutputFormat;

/// Width of the id column in tables.
const ID_WIDTH: usize = 8;

/// Shorten `text` to at most `width` characters, marking the cut with `…`.
#[must_use]
pub fn truncate(text: &str, width: usize) -> String {
    if text.chars().count() <= width {
        return text.to_string();
    }
    let kept: String = text.chars().take(width.saturating_sub(1)).collect();
    format!("{kept}…")
}

/// Render the browsing list.
///
/// # Errors
///
/// Returns an error if JSON serialization fails.
pub fn user_list(faqs: &[Faq], format: OutputFormat, locale: Locale) -> Result<String> {
    if format == OutputFormat::Json {
        return Ok(serde_json::to_string_pretty(faqs)?);
    }
    if faqs.is_empty() {
        return Ok(format!("{}\n", locale.labels().no_results));
    }

    let mut out = String::new();
    for faq in faqs {
        let label = faq.category.label(locale);
        match format {
            OutputFormat::Table => {
                let _ = writeln!(out, "{:<ID_WIDTH$}  {label}  {}", short_id(faq), faq.question);
            }
            _ => {
                let _ = writeln!(out, "[{label}] {}", faq.question);
                let _ = writeln!(out, "    {}", faq.id);
            }
        }
    }
    Ok(out)
}

/// Render the management table with counters.
///
/// # Errors
///
/// Returns an error if JSON serialization fails.
pub fn admin_list(
    faqs: &[Faq],
    format: OutputFormat,
    locale: Locale,
    question_width: usize,
) -> Result<String> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(faqs)?),
        OutputFormat::Plain => {
            let mut out = String::new();
            for faq in faqs {
                let _ = writeln!(
                    out,
                    "{}\t{}\t{}\t{}\t{}\t{}",
                    faq.id,
                    faq.category.as_str(),
                    faq.views,
                    faq.helpful,
                    faq.not_helpful,
                    faq.question
                );
            }
            Ok(out)
        }
        OutputFormat::Table => {
            if faqs.is_empty() {
                return Ok(format!("{}\n", locale.labels().no_results));
            }
            let mut out = format!(
                "{:<ID_WIDTH$}  {:<16}  {:<question_width$}  {:>6}  {:>6}  {:>6}  UPDATED\n",
                "ID", "CATEGORY", "QUESTION", "VIEWS", "UP", "DOWN"
            );
            for faq in faqs {
                let _ = writeln!(
                    out,
                    "{:<ID_WIDTH$}  {:<16}  {:<question_width$}  {:>6}  {:>6}  {:>6}  {}",
                    short_id(faq),
                    faq.category.as_str(),
                    truncate(&faq.question, question_width),
                    faq.views,
                    faq.helpful,
                    faq.not_helpful,
                    faq.updated_date()
                );
            }
            Ok(out)
        }
    }
}

/// Render one expanded entry with its feedback prompt.
#[must_use]
pub fn answer(faq: &Faq, locale: Locale) -> String {
    let labels = locale.labels();
    format!(
        "[{}] {}\n\n{}\n\n{}  {} {} / {} {}\n{} · {}\n",
        faq.category.label(locale),
        faq.question,
        faq.answer,
        labels.feedback_prompt,
        labels.helpful,
        faq.helpful,
        labels.not_helpful,
        faq.not_helpful,
        faq.id,
        faq.updated_date()
    )
}

/// Render every category with its stored value and label.
#[must_use]
pub fn categories(locale: Locale) -> String {
    let mut out = format!("{:<16}  {}\n", "", locale.labels().all_categories);
    for category in Category::ALL {
        let _ = writeln!(out, "{:<16}  {}", category.as_str(), category.label(locale));
    }
    out
}

/// Render store statistics together with snapshot totals.
#[must_use]
pub fn status(stats: &StoreStats, totals: &FaqStats) -> String {
    let mut out = String::from("faqdesk status\n--------------\n");
    let _ = writeln!(out, "Records:       {}", stats.total_records);
    let _ = writeln!(out, "Views:         {}", totals.views);
    let _ = writeln!(out, "Helpful:       {}", totals.helpful);
    let _ = writeln!(out, "Not helpful:   {}", totals.not_helpful);
    let _ = writeln!(
        out,
        "Oldest:        {}",
        crate::faq::display_date(stats.oldest_created)
    );
    let _ = writeln!(
        out,
        "Last update:   {}",
        crate::faq::display_date(stats.newest_update)
    );
    let _ = writeln!(out, "Database size: {} bytes", stats.db_size_bytes);
    for (category, count) in &totals.per_category {
        let _ = writeln!(out, "  {category:<16} {count}");
    }
    out
}

fn short_id(faq: &Faq) -> String {
    faq.id.as_str().chars().take(ID_WIDTH).collect()
}

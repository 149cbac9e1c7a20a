//! CLI command definitions.
//!
//! This module defines the structure of all CLI subcommands.

use std::path::PathBuf;

use clap::{Args, Subcommand, ValueEnum};

use crate::faq::{Category, FaqId, FeedbackKind};
use crate::labels::Locale;

/// Browse arguments shared by `list`, `admin list` and `watch`.
#[derive(Debug, Args)]
pub struct FilterArgs {
    /// Case-insensitive search term
    #[arg(short, long)]
    pub search: Option<String>,

    /// Only show this category
    #[arg(short = 'C', long, value_enum)]
    pub category: Option<CategoryArg>,
}

impl FilterArgs {
    /// The selected category, if any.
    #[must_use]
    pub fn category(&self) -> Option<Category> {
        self.category.map(Category::from)
    }
}

/// `list` arguments.
#[derive(Debug, Args)]
pub struct ListCommand {
    /// Filter options
    #[command(flatten)]
    pub filter: FilterArgs,

    /// Output format
    #[arg(short, long, value_enum, default_value = "plain")]
    pub format: OutputFormat,
}

/// `show` arguments.
#[derive(Debug, Args)]
pub struct ShowCommand {
    /// Record id
    pub id: String,
}

impl ShowCommand {
    /// The record id.
    #[must_use]
    pub fn id(&self) -> FaqId {
        FaqId::new(self.id.as_str())
    }
}

/// `feedback` arguments.
#[derive(Debug, Args)]
pub struct FeedbackCommand {
    /// Record id
    pub id: String,

    /// The vote
    #[arg(value_enum)]
    pub kind: FeedbackArg,
}

/// Record management commands.
#[derive(Debug, Subcommand)]
pub enum AdminCommand {
    /// List records with their counters (question-only search)
    List {
        /// Filter options
        #[command(flatten)]
        filter: FilterArgs,

        /// Output format
        #[arg(short, long, value_enum, default_value = "table")]
        format: OutputFormat,
    },

    /// Create a record
    Add {
        /// Question text
        #[arg(long)]
        question: String,

        /// Answer text
        #[arg(short, long)]
        answer: String,

        /// Category
        #[arg(short = 'C', long, value_enum, default_value = "general")]
        category: CategoryArg,
    },

    /// Edit question, answer or category of a record
    Edit {
        /// Record id
        id: String,

        /// New question text
        #[arg(long)]
        question: Option<String>,

        /// New answer text
        #[arg(short, long)]
        answer: Option<String>,

        /// New category
        #[arg(short = 'C', long, value_enum)]
        category: Option<CategoryArg>,
    },

    /// Delete a record
    Delete {
        /// Record id
        id: String,

        /// Confirm the deletion
        #[arg(short, long)]
        yes: bool,
    },
}

/// `watch` arguments.
#[derive(Debug, Args)]
pub struct WatchCommand {
    /// Filter options
    #[command(flatten)]
    pub filter: FilterArgs,
}

/// Status command arguments.
#[derive(Debug, Args)]
pub struct StatusCommand {
    /// Output as JSON
    #[arg(short, long)]
    pub json: bool,
}

/// Configuration commands.
#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Show current configuration
    Show {
        /// Output as JSON
        #[arg(short, long)]
        json: bool,
    },

    /// Show the configuration file path
    Path,

    /// Validate configuration
    Validate {
        /// Path to configuration file to validate
        #[arg(short, long)]
        file: Option<PathBuf>,
    },
}

/// Category argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum CategoryArg {
    /// No-smoking areas in general
    General,
    /// Childcare centers, kindergartens and schools
    School,
    /// Apartment complexes
    Apartment,
    /// Public facilities
    PublicFacility,
    /// Smoking rooms
    SmokingRoom,
    /// Fines and reductions
    Fine,
    /// Guides and enforcement
    Enforcement,
    /// Everything else
    Etc,
}

impl From<CategoryArg> for Category {
    fn from(arg: CategoryArg) -> Self {
        match arg {
            CategoryArg::General => Self::General,
            CategoryArg::School => Self::School,
            CategoryArg::Apartment => Self::Apartment,
            CategoryArg::PublicFacility => Self::PublicFacility,
            CategoryArg::SmokingRoom => Self::SmokingRoom,
            CategoryArg::Fine => Self::Fine,
            CategoryArg::Enforcement => Self::Enforcement,
            CategoryArg::Etc => Self::Etc,
        }
    }
}

/// Feedback argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum FeedbackArg {
    /// The answer helped
    Helpful,
    /// The answer did not help
    NotHelpful,
}

impl From<FeedbackArg> for FeedbackKind {
    fn from(arg: FeedbackArg) -> Self {
        match arg {
            FeedbackArg::Helpful => Self::Helpful,
            FeedbackArg::NotHelpful => Self::NotHelpful,
        }
    }
}

/// Locale argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LocaleArg {
    /// Korean
    Ko,
    /// English
    En,
}

impl From<LocaleArg> for Locale {
    fn from(arg: LocaleArg) -> Self {
        match arg {
            LocaleArg::Ko => Self::Ko,
            LocaleArg::En => Self::En,
        }
    }
}

/// Output format for commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// Plain text output
    #[default]
    Plain,
    /// Formatted table
    Table,
    /// JSON output
    Json,
}

//! Command-line interface for faqdesk.
//!
//! This module provides the CLI structure and output rendering for the
//! `faqctl` binary.

mod commands;
pub mod output;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

pub use commands::{
    AdminCommand, CategoryArg, ConfigCommand, FeedbackArg, FeedbackCommand, FilterArgs,
    ListCommand, LocaleArg, OutputFormat, ShowCommand, StatusCommand, WatchCommand,
};

use crate::labels::Locale;
use crate::logging::Verbosity;

/// faqctl - Browse and manage the no-smoking area FAQ
///
/// Reads and writes the FAQ collection in the local document store. Every
/// change is visible to running `faqctl watch` sessions immediately.
#[derive(Debug, Parser)]
#[command(name = "faqctl")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to custom configuration file
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Increase verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Only log errors (command output still prints)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Label language (overrides display.locale)
    #[arg(short, long, global = true, value_enum)]
    pub locale: Option<LocaleArg>,

    /// The command to execute
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// List FAQs (searches question and answer)
    List(ListCommand),

    /// Show an answer and count a view
    Show(ShowCommand),

    /// Rate an answer
    Feedback(FeedbackCommand),

    /// Create, edit and delete FAQs
    #[command(subcommand)]
    Admin(AdminCommand),

    /// Print the list again after every change until interrupted
    Watch(WatchCommand),

    /// Show store status
    Status(StatusCommand),

    /// List categories
    Categories,

    /// View or check configuration
    #[command(subcommand)]
    Config(ConfigCommand),
}

impl Cli {
    /// Get the verbosity level based on flags.
    #[must_use]
    pub fn verbosity(&self) -> Verbosity {
        Verbosity::from_flags(self.verbose, self.quiet)
    }

    /// The label locale: the flag if given, else the configured one.
    #[must_use]
    pub fn locale_or(&self, configured: Locale) -> Locale {
        self.locale.map_or(configured, Locale::from)
    }
}

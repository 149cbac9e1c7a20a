//! `faqctl` - CLI for faqdesk
//!
//! Browse the FAQ as a visitor would, manage records as an admin, and watch
//! the live collection.

#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{bail, Context};
use clap::Parser;
use tracing::{debug, warn};

use faqdesk::cli::{output, AdminCommand, Cli, Command, ConfigCommand, FilterArgs, OutputFormat};
use faqdesk::labels::Locale;
use faqdesk::{
    init_logging, AdminSession, Config, Counter, Faq, FaqFeed, FaqId, FaqRepository, FaqStats,
    FeedbackKind, FeedbackOutcome, LogSink, SharedStore, SqliteStore, UserSession,
};

/// Everything a command needs once configuration is loaded.
#[derive(Debug)]
struct App {
    config: Config,
    locale: Locale,
    store: Arc<SqliteStore>,
    repository: FaqRepository,
}

impl App {
    fn open(config: Config, locale: Locale) -> anyhow::Result<Self> {
        let path = config.database_path();
        let store = Arc::new(
            SqliteStore::open(&path, config.store.snapshot_buffer)
                .with_context(|| format!("cannot open FAQ store at {}", path.display()))?,
        );
        let repository = FaqRepository::new(Arc::clone(&store) as SharedStore);
        Ok(Self {
            config,
            locale,
            store,
            repository,
        })
    }

    async fn snapshot(&self) -> anyhow::Result<Vec<Faq>> {
        Ok(self.repository.store().query_ordered().await?)
    }

    async fn find(&self, id: &FaqId) -> anyhow::Result<Faq> {
        self.snapshot()
            .await?
            .into_iter()
            .find(|faq| &faq.id == id)
            .with_context(|| format!("no FAQ with id {id}"))
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    init_logging(cli.verbosity());

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    // Validation must work even when the default configuration is broken.
    if let Command::Config(ConfigCommand::Validate { file }) = &cli.command {
        return validate_config(file.clone().or_else(|| cli.config.clone()));
    }

    let config = Config::load_from(cli.config.clone())?;
    let locale = cli.locale_or(config.display.locale);

    match cli.command {
        Command::Config(config_cmd) => handle_config(&config, config_cmd),
        Command::Categories => {
            print!("{}", output::categories(locale));
            Ok(())
        }
        Command::List(list) => {
            let app = App::open(config, locale)?;
            let faqs = user_view(&app, &list.filter).await?;
            print!("{}", output::user_list(&faqs, list.format, locale)?);
            Ok(())
        }
        Command::Show(show) => handle_show(&App::open(config, locale)?, &show.id()).await,
        Command::Feedback(feedback) => {
            let app = App::open(config, locale)?;
            handle_feedback(&app, &FaqId::new(feedback.id), feedback.kind.into()).await
        }
        Command::Admin(admin_cmd) => handle_admin(&App::open(config, locale)?, admin_cmd).await,
        Command::Watch(watch) => handle_watch(&App::open(config, locale)?, &watch.filter).await,
        Command::Status(status) => handle_status(&App::open(config, locale)?, status.json).await,
    }
}

async fn user_view(app: &App, filter: &FilterArgs) -> anyhow::Result<Vec<Faq>> {
    let mut session = UserSession::new(app.repository.clone());
    session.set_search(filter.search.clone().unwrap_or_default());
    session.set_category(filter.category());
    Ok(session.visible(&app.snapshot().await?))
}

async fn handle_show(app: &App, id: &FaqId) -> anyhow::Result<()> {
    let faq = app.find(id).await?;
    let mut session = UserSession::new(app.repository.clone());
    session
        .toggle(&faq.id)
        .await
        .context("could not record the view")?;
    print!("{}", output::answer(&faq, app.locale));
    Ok(())
}

async fn handle_feedback(app: &App, id: &FaqId, kind: FeedbackKind) -> anyhow::Result<()> {
    let faq = app.find(id).await?;
    let mut session = UserSession::new(app.repository.clone());
    match session.give_feedback(&faq.id, kind).await? {
        FeedbackOutcome::Recorded => {
            println!("Recorded {} for {}", Counter::from(kind), faq.id);
        }
        FeedbackOutcome::AlreadyGiven => {
            println!("{}", app.locale.labels().feedback_already_given);
        }
    }
    Ok(())
}

async fn handle_admin(app: &App, cmd: AdminCommand) -> anyhow::Result<()> {
    let mut session = AdminSession::new(app.repository.clone());
    match cmd {
        AdminCommand::List { filter, format } => {
            session.set_search(filter.search.clone().unwrap_or_default());
            session.set_category(filter.category());
            let faqs = session.visible(&app.snapshot().await?);
            print!(
                "{}",
                output::admin_list(
                    &faqs,
                    format,
                    app.locale,
                    app.config.display.admin_question_width
                )?
            );
        }
        AdminCommand::Add {
            question,
            answer,
            category,
        } => {
            session.open_new_form();
            if let Some(form) = session.form_mut() {
                form.draft.question = question;
                form.draft.answer = answer;
                form.draft.category = category.into();
            }
            session.save_form().await?;
            println!("Created FAQ");
        }
        AdminCommand::Edit {
            id,
            question,
            answer,
            category,
        } => {
            if question.is_none() && answer.is_none() && category.is_none() {
                bail!("nothing to change: pass --question, --answer or --category");
            }
            let faq = app.find(&FaqId::new(id)).await?;
            session.open_edit_form(&faq);
            if let Some(form) = session.form_mut() {
                if let Some(question) = question {
                    form.draft.question = question;
                }
                if let Some(answer) = answer {
                    form.draft.answer = answer;
                }
                if let Some(category) = category {
                    form.draft.category = category.into();
                }
            }
            session.save_form().await?;
            println!("Updated FAQ {}", faq.id);
        }
        AdminCommand::Delete { id, yes } => {
            let id = FaqId::new(id);
            session.request_delete(&id);
            if !yes {
                session.cancel_delete();
                let labels = app.locale.labels();
                println!("{}: {}", labels.delete_title, labels.delete_message);
                println!("Use --yes to confirm.");
                return Ok(());
            }
            session.confirm_delete().await?;
            println!("Deleted FAQ {id}");
        }
    }
    Ok(())
}

async fn handle_watch(app: &App, filter: &FilterArgs) -> anyhow::Result<()> {
    let mut session = UserSession::new(app.repository.clone());
    session.set_search(filter.search.clone().unwrap_or_default());
    session.set_category(filter.category());

    let mut feed = FaqFeed::start(&app.repository, LogSink);
    let mut poll = tokio::time::interval(app.config.poll_interval());
    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            result = &mut shutdown => {
                if let Err(e) = result {
                    warn!(error = %e, "Failed to listen for Ctrl-C");
                }
                break;
            }
            _ = poll.tick() => {
                if let Err(e) = app.store.sync_external() {
                    warn!(error = %e, "Failed to check for external changes");
                }
            }
            snapshot = feed.changed() => {
                let Some(snapshot) = snapshot else {
                    break;
                };
                let faqs = session.visible(&snapshot);
                println!("--- {} ---", chrono::Local::now().format("%H:%M:%S"));
                print!("{}", output::user_list(&faqs, OutputFormat::Plain, app.locale)?);
            }
        }
    }

    debug!("Stopping watch");
    feed.shutdown().await;
    Ok(())
}

async fn handle_status(app: &App, json: bool) -> anyhow::Result<()> {
    let stats = app.store.stats()?;
    let totals = FaqStats::from_snapshot(&app.snapshot().await?);
    if json {
        let status = serde_json::json!({
            "databasePath": app.store.path(),
            "store": stats,
            "totals": totals,
        });
        println!("{}", serde_json::to_string_pretty(&status)?);
    } else {
        println!("Database:      {}", app.store.path().display());
        print!("{}", output::status(&stats, &totals));
    }
    Ok(())
}

fn handle_config(config: &Config, cmd: ConfigCommand) -> anyhow::Result<()> {
    match cmd {
        ConfigCommand::Show { json } => {
            if json {
                println!("{}", serde_json::to_string_pretty(config)?);
            } else {
                println!("Current Configuration");
                println!("=====================");
                println!();
                println!("[store]");
                println!("  database_path:        {}", config.database_path().display());
                println!("  snapshot_buffer:      {}", config.store.snapshot_buffer);
                println!("  poll_interval_ms:     {}", config.store.poll_interval_ms);
                println!();
                println!("[display]");
                println!("  locale:               {}", config.display.locale);
                println!(
                    "  admin_question_width: {}",
                    config.display.admin_question_width
                );
            }
        }
        ConfigCommand::Path => {
            println!("{}", Config::default_config_path().display());
        }
        ConfigCommand::Validate { file } => {
            validate_config(file)?;
        }
    }
    Ok(())
}

fn validate_config(file: Option<std::path::PathBuf>) -> anyhow::Result<()> {
    let path = file.unwrap_or_else(Config::default_config_path);
    println!("Validating configuration: {}", path.display());
    Config::load_from(Some(path))?;
    println!("Configuration is valid.");
    Ok(())
}

//! Leipomo CLI - Terminal front end for pickup ordering.
//!
//! # Usage
//!
//! ```bash
//! # List categories, then the products of one
//! leipomo browse
//! leipomo browse --category 3
//!
//! # Edit the cart
//! leipomo cart add 7 --quantity 2
//! leipomo cart dec 7
//! leipomo cart clear --yes
//!
//! # Inspect pickup availability
//! leipomo dates --month 2026-12
//! leipomo slots --date 2026-12-21
//!
//! # Run the guided checkout, or pick up where it was left
//! leipomo checkout
//! leipomo resume
//! ```
//!
//! # Environment Variables
//!
//! - `LEIPOMO_API_BASE_URL` - Ordering API base URL
//! - `LEIPOMO_SESSION_DIR` - Directory of the saved order session
//! - `LEIPOMO_LANG` - `fi`, `sv` or `en`
//! - `SENTRY_DSN` - Error tracking (optional)

#![cfg_attr(not(test), forbid(unsafe_code))]

use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use leipomo_core::{CategoryId, Language, ProductId, YearMonth};
use leipomo_ordering::OrderingConfig;
use sentry::integrations::tracing as sentry_tracing;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;
mod render;

use commands::CliError;

#[derive(Parser)]
#[command(name = "leipomo")]
#[command(author, version, about = "Bakery pickup ordering")]
struct Cli {
    /// Override the configured language (`fi`, `sv`, `en`)
    #[arg(long, global = true)]
    lang: Option<Language>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Browse categories and products
    Browse {
        /// Show the products of this category
        #[arg(short, long)]
        category: Option<CategoryId>,
    },
    /// Show or edit the cart
    Cart {
        #[command(subcommand)]
        action: Option<CartAction>,
    },
    /// Show the pickup calendar for a month
    Dates {
        /// Month as `YYYY-MM` (defaults to the current month)
        #[arg(short, long)]
        month: Option<YearMonth>,
    },
    /// Show the pickup times offered on a date
    Slots {
        /// Date as `YYYY-MM-DD`
        #[arg(short, long)]
        date: NaiveDate,
    },
    /// Start the guided checkout
    Checkout,
    /// Continue a checkout left in progress
    Resume,
    /// Forget the saved order session
    Reset,
}

#[derive(Subcommand)]
enum CartAction {
    /// Show the cart
    Show,
    /// Add a product by ID
    Add {
        product: ProductId,

        #[arg(short, long, default_value_t = 1)]
        quantity: i64,
    },
    /// Increase a line by one (product ID or line key)
    Inc { line: String },
    /// Decrease a line by one, removing it at zero
    Dec { line: String },
    /// Remove a line
    Remove { key: String },
    /// Empty the cart
    Clear {
        /// Skip the confirmation question
        #[arg(long)]
        yes: bool,
    },
}

/// Initialize Sentry error tracking and return guard that must be kept alive.
fn init_sentry() -> Option<sentry::ClientInitGuard> {
    let dsn = std::env::var("SENTRY_DSN").ok().filter(|dsn| !dsn.is_empty())?;

    let guard = sentry::init((
        dsn,
        sentry::ClientOptions {
            release: sentry::release_name!(),
            attach_stacktrace: true,
            ..Default::default()
        },
    ));

    tracing::info!("Sentry initialized");
    Some(guard)
}

/// Filter tracing events to Sentry event types.
fn sentry_event_filter(metadata: &tracing::Metadata<'_>) -> sentry_tracing::EventFilter {
    match *metadata.level() {
        tracing::Level::ERROR | tracing::Level::WARN => sentry_tracing::EventFilter::Event,
        tracing::Level::INFO | tracing::Level::DEBUG => sentry_tracing::EventFilter::Breadcrumb,
        _ => sentry_tracing::EventFilter::Ignore,
    }
}

#[tokio::main]
async fn main() {
    let _ = dotenvy::dotenv();

    // Initialize Sentry (must be done before tracing subscriber)
    let _sentry_guard = init_sentry();

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "leipomo_ordering=info,leipomo_cli=info".into());

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(sentry_tracing::layer().event_filter(sentry_event_filter))
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        commands::report(&e);
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), CliError> {
    let config = OrderingConfig::from_env()?;
    let mut flow = commands::open_flow(&config)?;
    if let Some(lang) = cli.lang {
        flow.set_language(lang).await;
    }

    match cli.command {
        Commands::Browse { category } => commands::catalog::browse(&flow, category).await,
        Commands::Cart { action } => match action.unwrap_or(CartAction::Show) {
            CartAction::Show => commands::cart::show(&flow),
            CartAction::Add { product, quantity } => {
                commands::cart::add(&mut flow, product, quantity).await
            }
            CartAction::Inc { line } => commands::cart::change(&mut flow, &line, 1).await,
            CartAction::Dec { line } => commands::cart::change(&mut flow, &line, -1).await,
            CartAction::Remove { key } => commands::cart::remove(&mut flow, key).await,
            CartAction::Clear { yes } => commands::cart::clear(&mut flow, yes).await,
        },
        Commands::Dates { month } => commands::schedule::dates(&flow, month).await,
        Commands::Slots { date } => commands::schedule::slots(&flow, date).await,
        Commands::Checkout => commands::checkout::start(&mut flow).await,
        Commands::Resume => commands::checkout::resume(&mut flow).await,
        Commands::Reset => commands::checkout::reset(&mut flow),
    }
}

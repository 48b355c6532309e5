//! Atelier CLI - the storefront from a terminal.
//!
//! # Usage
//!
//! ```bash
//! # Browse the catalog, translated into Italian
//! atelier products list --lang it --category clothes
//!
//! # Translate arbitrary text through the full pipeline
//! atelier translate --lang fr "Hand-woven in the Andes"
//!
//! # Place an order paid by bank transfer
//! atelier checkout --item p-1:2 --item p-4 --method bank \
//!     --name "Amara Diallo" --email amara@example.org \
//!     --address "12 Rue Oberkampf" --city Paris --postal-code 75011 --country France
//!
//! # Admin dashboard
//! atelier admin --pin 1234 dashboard
//! ```
//!
//! # Commands
//!
//! - `products` - Browse and inspect the catalog
//! - `translate` - Resolve text into another language
//! - `checkout` - Run the three-step checkout for a set of items
//! - `subscribe` - Join the newsletter
//! - `ask` - Ask the curator about the collection
//! - `admin` - PIN-gated catalog, order and subscriber management
//!
//! Configuration is read from the environment (and `.env`); pass `--fast`
//! to skip the simulated latency.

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};
use sentry::integrations::tracing as sentry_tracing;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use atelier_core::{Category, LanguageCode, ProductId};
use atelier_storefront::config::StorefrontConfig;
use atelier_storefront::state::AppState;

mod commands;

#[derive(Parser)]
#[command(name = "atelier")]
#[command(author, version, about = "Atelier cultural-goods storefront")]
struct Cli {
    /// Skip simulated backend and payment latency
    #[arg(long, global = true)]
    fast: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Browse the catalog
    Products {
        #[command(subcommand)]
        action: ProductsAction,
    },
    /// Translate text into another language
    Translate {
        /// Text to translate
        text: String,

        /// Target language code
        #[arg(short, long)]
        lang: LanguageCode,

        /// Dictionary key for the text (e.g. `ui.cart.title`)
        #[arg(short, long)]
        key: Option<String>,
    },
    /// Check out a set of items
    Checkout(commands::checkout::CheckoutArgs),
    /// Subscribe an address to the newsletter
    Subscribe {
        /// Email address
        email: String,
    },
    /// Ask the curator a question
    Ask {
        /// The question
        question: String,

        /// Language for the answer
        #[arg(short, long, default_value = "en")]
        lang: LanguageCode,
    },
    /// Manage the catalog, orders and subscribers
    Admin {
        /// Admin PIN
        #[arg(long)]
        pin: String,

        #[command(subcommand)]
        action: AdminAction,
    },
}

#[derive(Subcommand)]
enum ProductsAction {
    /// List products, optionally filtered by category
    List {
        /// Category filter (`all`, `clothes`, `art`, `accessories`, `miscellaneous`)
        #[arg(short, long, default_value = "all")]
        category: Category,

        /// Display language
        #[arg(short, long, default_value = "en")]
        lang: LanguageCode,
    },
    /// Show one product with its history
    Show {
        /// Product id
        id: ProductId,

        /// Display language
        #[arg(short, long, default_value = "en")]
        lang: LanguageCode,
    },
}

#[derive(Subcommand)]
enum AdminAction {
    /// Order count, revenue and subscriber figures
    Dashboard,
    /// List every product, including sold-out ones
    Products,
    /// Add a product
    AddProduct(commands::admin::ProductArgs),
    /// Change fields of an existing product
    UpdateProduct(commands::admin::PatchArgs),
    /// Delete a product
    DeleteProduct {
        /// Product id
        id: ProductId,
    },
    /// List placed orders
    Orders,
    /// Delete the whole order history
    ClearOrders,
    /// List newsletter subscribers
    Subscribers,
}

/// Initialize Sentry error tracking and return guard that must be kept alive.
fn init_sentry(config: &StorefrontConfig) -> Option<sentry::ClientInitGuard> {
    let dsn = config.sentry_dsn.as_ref()?;

    let guard = sentry::init((
        dsn.as_str(),
        sentry::ClientOptions {
            release: sentry::release_name!(),
            environment: config
                .sentry_environment
                .clone()
                .map(std::borrow::Cow::Owned),
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

#[allow(clippy::print_stderr)]
#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let mut config = match StorefrontConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Invalid configuration: {e}");
            std::process::exit(2);
        }
    };
    if cli.fast {
        config.simulate_latency = false;
    }

    // Initialize Sentry (must be done before tracing subscriber)
    let _sentry_guard = init_sentry(&config);

    // Quiet by default so command output stays readable
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "atelier_storefront=warn,atelier_cli=info".into());

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(sentry_tracing::layer().event_filter(sentry_event_filter))
        .init();

    let result: Result<(), Box<dyn std::error::Error>> = run(cli.command, config).await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(command: Commands, config: StorefrontConfig) -> Result<(), Box<dyn std::error::Error>> {
    let state = AppState::new(config).await?;

    match command {
        Commands::Products { action } => match action {
            ProductsAction::List { category, lang } => {
                commands::catalog::list(&state, category, &lang).await?;
            }
            ProductsAction::Show { id, lang } => commands::catalog::show(&state, &id, &lang).await?,
        },
        Commands::Translate { text, lang, key } => {
            commands::translate::run(&state, &text, &lang, key.as_deref()).await;
        }
        Commands::Checkout(args) => commands::checkout::run(&state, args).await?,
        Commands::Subscribe { email } => commands::catalog::subscribe(&state, &email).await?,
        Commands::Ask { question, lang } => commands::ask::run(&state, &question, &lang).await?,
        Commands::Admin { pin, action } => {
            let session = commands::admin::unlock(&state, &pin).await?;
            match action {
                AdminAction::Dashboard => commands::admin::dashboard(&session).await?,
                AdminAction::Products => commands::admin::products(&session).await?,
                AdminAction::AddProduct(args) => commands::admin::add_product(&session, args).await?,
                AdminAction::UpdateProduct(args) => {
                    commands::admin::update_product(&session, args).await?;
                }
                AdminAction::DeleteProduct { id } => {
                    commands::admin::delete_product(&session, &id).await?;
                }
                AdminAction::Orders => commands::admin::orders(&session).await?,
                AdminAction::ClearOrders => commands::admin::clear_orders(&session).await?,
                AdminAction::Subscribers => commands::admin::subscribers(&session).await?,
            }
        }
    }
    Ok(())
}

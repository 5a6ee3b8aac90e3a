//! Corner Shop CLI - browse the catalog, manage an account and shop.
//!
//! # Usage
//!
//! ```bash
//! # Browse the catalog
//! shop products --category Electronics --sort price-low
//! shop product prod_001
//!
//! # Manage the persisted session
//! shop signup -n "Ada Lovelace" -e ada@example.com -p secret1
//! shop login -e ada@example.com -p secret1
//! shop whoami
//! shop logout
//!
//! # Interactive session with a cart
//! shop shell
//! ```
//!
//! # Commands
//!
//! - `products` / `product` / `categories` - Catalog browsing
//! - `signup` / `login` / `logout` / `whoami` - Account management
//! - `shell` - Interactive shopping session

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use corner_shop_core::ProductId;
use corner_shop_storefront::AppState;
use corner_shop_storefront::catalog::{CategoryFilter, SortOrder};
use corner_shop_storefront::config::StorefrontConfig;
use sentry::integrations::tracing as sentry_tracing;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::commands::CliError;
use crate::validation::{LoginForm, SignupForm};

mod commands;
mod output;
mod validation;

#[derive(Parser)]
#[command(name = "shop")]
#[command(author, version, about = "Corner Shop in the terminal")]
struct Cli {
    /// Directory holding the session and user directory (overrides `STOREFRONT_DATA_DIR`)
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List products
    Products {
        /// Category name, or `all`
        #[arg(short, long, default_value = "all")]
        category: CategoryFilter,

        /// Sort order (default, price-low, price-high, name, rating)
        #[arg(short, long, default_value_t = SortOrder::Default)]
        sort: SortOrder,
    },
    /// Show one product
    Product {
        /// Product ID, e.g. `prod_001`
        id: String,
    },
    /// List product categories
    Categories,
    /// Create an account and log in
    Signup {
        /// Display name
        #[arg(short, long)]
        name: String,

        /// Email address
        #[arg(short, long)]
        email: String,

        /// Password (at least 6 characters)
        #[arg(short, long)]
        password: String,

        /// Password confirmation (defaults to the password)
        #[arg(long)]
        confirm_password: Option<String>,
    },
    /// Log in to an existing account
    Login {
        /// Email address
        #[arg(short, long)]
        email: String,

        /// Password
        #[arg(short, long)]
        password: String,
    },
    /// Log out
    Logout,
    /// Show the logged-in user
    Whoami,
    /// Start an interactive shopping session
    Shell,
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
        tracing::Level::TRACE => sentry_tracing::EventFilter::Ignore,
    }
}

fn init_tracing() {
    // Logs go to stderr so command output stays pipeable.
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "corner_shop_storefront=info,corner_shop_cli=info".into());

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(sentry_tracing::layer().event_filter(sentry_event_filter))
        .init();
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let mut config = match StorefrontConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            report(&format!("Invalid configuration: {e}"));
            std::process::exit(2);
        }
    };
    if let Some(dir) = cli.data_dir.clone() {
        config.data_dir = dir;
    }

    // Initialize Sentry (must be done before tracing subscriber)
    let sentry_guard = init_sentry(&config);
    init_tracing();

    if let Err(e) = run(cli.command, config).await {
        if e.is_fault() {
            if let CliError::App(app) = &e {
                app.capture();
            } else {
                tracing::error!("Command failed: {e}");
            }
        }
        report(&e.user_message());
        // Flush pending Sentry events before exiting.
        drop(sentry_guard);
        std::process::exit(1);
    }
}

#[allow(clippy::print_stderr)]
fn report(message: &str) {
    eprintln!("{message}");
}

async fn run(command: Commands, config: StorefrontConfig) -> Result<(), CliError> {
    let state = AppState::from_config(config)?;
    commands::show_toasts(&state);

    match command {
        Commands::Products { category, sort } => commands::catalog::list(&state, &category, sort),
        Commands::Product { id } => commands::catalog::show(&state, &ProductId::new(id))?,
        Commands::Categories => commands::catalog::categories(&state),
        Commands::Signup {
            name,
            email,
            password,
            confirm_password,
        } => {
            let form = SignupForm {
                name: &name,
                email: &email,
                password: &password,
                confirm_password: confirm_password.as_deref().unwrap_or(&password),
            };
            commands::account::signup(state.auth(), form).await?;
        }
        Commands::Login { email, password } => {
            let form = LoginForm {
                email: &email,
                password: &password,
            };
            commands::account::login(state.auth(), form).await?;
        }
        Commands::Logout => commands::account::logout(state.auth())?,
        Commands::Whoami => commands::account::whoami(state.auth()),
        Commands::Shell => commands::shell::run(&state).await?,
    }
    Ok(())
}

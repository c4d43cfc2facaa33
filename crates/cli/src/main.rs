//! ShapeShift CLI - Catalog administration tools.
//!
//! # Usage
//!
//! ```bash
//! # Log in (password from SHAPESHIFT_PASSWORD or --password)
//! shapeshift-cli login -e admin@example.com
//!
//! # Browse and edit the catalog
//! shapeshift-cli products list --category protein
//! shapeshift-cli products set-active clean-whey-mango false
//! shapeshift-cli categories create "Pre Workout"
//!
//! # Upload product images
//! shapeshift-cli upload front.png back.png
//! ```
//!
//! # Commands
//!
//! - `login` / `logout` / `whoami` / `change-password` - API session
//! - `products` - List, show, create, delete and (de)activate products
//! - `categories` - List, show, create and delete categories
//! - `upload` - Upload images

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use rust_decimal::Decimal;
use secrecy::SecretString;

mod commands;
mod output;

use commands::products::{CreateArgs, ListArgs};

#[derive(Parser)]
#[command(name = "shapeshift-cli")]
#[command(author, version, about = "ShapeShift catalog tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Log in to the catalog API
    Login {
        /// Account email address
        #[arg(short, long)]
        email: String,

        /// Account password
        #[arg(long, env = "SHAPESHIFT_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// Forget the stored login
    Logout,
    /// Show the logged-in user
    Whoami,
    /// Change the logged-in user's password
    ChangePassword {
        #[arg(long, env = "SHAPESHIFT_PASSWORD", hide_env_values = true)]
        current: String,

        #[arg(long, env = "SHAPESHIFT_NEW_PASSWORD", hide_env_values = true)]
        new: String,
    },
    /// Manage products
    Products {
        #[command(subcommand)]
        action: ProductAction,
    },
    /// Manage categories
    Categories {
        #[command(subcommand)]
        action: CategoryAction,
    },
    /// Upload images
    Upload {
        /// Image files
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },
}

#[derive(Subcommand)]
enum ProductAction {
    /// List products
    List {
        #[arg(short, long)]
        search: Option<String>,

        #[arg(short, long)]
        category: Option<String>,

        #[arg(long)]
        page: Option<u32>,

        #[arg(long)]
        limit: Option<u32>,

        /// Oldest first
        #[arg(long)]
        ascending: bool,

        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },
    /// Show one product as JSON
    Show { id: String },
    /// Create a product
    Create {
        #[arg(short, long)]
        name: String,

        #[arg(short, long)]
        category: String,

        /// Selling price in rupees
        #[arg(short, long)]
        price: Decimal,

        /// List price in rupees (defaults to the selling price)
        #[arg(long)]
        mrp: Option<Decimal>,

        /// Discount percentage shown on the card
        #[arg(long)]
        discount: Option<Decimal>,

        #[arg(short, long)]
        brand: Option<String>,

        #[arg(short, long)]
        description: Option<String>,

        /// Tag (repeatable)
        #[arg(long = "tag")]
        tags: Vec<String>,

        /// Image URL (repeatable)
        #[arg(long = "image")]
        images: Vec<String>,

        /// Create hidden from the storefront
        #[arg(long)]
        inactive: bool,
    },
    /// Delete a product
    Delete { id: String },
    /// Show or hide a product in the storefront
    SetActive {
        id: String,
        #[arg(action = clap::ArgAction::Set)]
        active: bool,
    },
}

#[derive(Subcommand)]
enum CategoryAction {
    /// List categories
    List {
        #[arg(long)]
        json: bool,
    },
    /// Show one category as JSON
    Show { id: String },
    /// Create a category
    Create {
        /// Display name; the id is derived from it
        name: String,

        /// Parent category id
        #[arg(long)]
        parent: Option<String>,

        #[arg(short, long)]
        description: Option<String>,
    },
    /// Delete a category
    Delete { id: String },
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "shapeshift_cli=info,shapeshift_storefront=warn".into()),
        )
        .init();

    let cli = Cli::parse();

    let result: Result<(), Box<dyn std::error::Error>> = run(cli).await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Login { email, password } => {
            commands::auth::login(&email, SecretString::from(password)).await?;
        }
        Commands::Logout => commands::auth::logout()?,
        Commands::Whoami => commands::auth::whoami().await?,
        Commands::ChangePassword { current, new } => {
            commands::auth::change_password(SecretString::from(current), SecretString::from(new))
                .await?;
        }
        Commands::Products { action } => match action {
            ProductAction::List {
                search,
                category,
                page,
                limit,
                ascending,
                json,
            } => {
                let args = ListArgs {
                    search,
                    category,
                    page,
                    limit,
                    ascending,
                    json,
                };
                commands::products::list(&args).await?;
            }
            ProductAction::Show { id } => commands::products::show(&id).await?,
            ProductAction::Create {
                name,
                category,
                price,
                mrp,
                discount,
                brand,
                description,
                tags,
                images,
                inactive,
            } => {
                let args = CreateArgs {
                    name,
                    category,
                    price,
                    mrp,
                    discount,
                    brand,
                    description,
                    tags,
                    images,
                    inactive,
                };
                commands::products::create(args).await?;
            }
            ProductAction::Delete { id } => commands::products::delete(&id).await?,
            ProductAction::SetActive { id, active } => {
                commands::products::set_active(&id, active).await?;
            }
        },
        Commands::Categories { action } => match action {
            CategoryAction::List { json } => commands::categories::list(json).await?,
            CategoryAction::Show { id } => commands::categories::show(&id).await?,
            CategoryAction::Create {
                name,
                parent,
                description,
            } => {
                commands::categories::create(&name, parent.as_deref(), description).await?;
            }
            CategoryAction::Delete { id } => commands::categories::delete(&id).await?,
        },
        Commands::Upload { files } => commands::upload::upload(files).await?,
    }
    Ok(())
}

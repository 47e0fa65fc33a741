//! jb-offers - Browse job offers and manage applications

use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use libjobboard::catalog::Catalog;
use libjobboard::logging::LoggingConfig;
use libjobboard::storage::open_storage;
use libjobboard::types::{form_from_pairs, Feedback, JobOffer};
use libjobboard::{ActionError, Config, JobBoard, JobBoardError};
use serde::Serialize;

#[derive(Parser, Debug)]
#[command(name = "jb-offers")]
#[command(about = "Browse job offers and manage your applications", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Text, global = true)]
    format: OutputFormat,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand, Debug)]
enum Commands {
    #[command(flatten)]
    Offers(OfferCommand),

    /// Browse the retail catalog
    Catalog {
        #[command(subcommand)]
        list: CatalogList,
    },
}

#[derive(Subcommand, Debug)]
enum OfferCommand {
    /// List all job offers
    List,

    /// Show one job offer
    Show {
        /// Offer id
        id: i64,
    },

    /// Publish a new job offer
    Create {
        /// Offer field as key=value (repeatable)
        #[arg(short = 'F', long = "field", required = true)]
        fields: Vec<String>,
    },

    /// Apply to a job offer
    Apply {
        /// Offer id
        offer_id: i64,
    },

    /// Withdraw an application
    Unapply {
        /// Offer id
        offer_id: i64,
    },

    /// List the offers you applied to
    Applications,

    /// Number of applicants for an offer
    Count {
        /// Offer id
        offer_id: i64,
    },

    /// Fetch the backend greeting
    Hello,
}

#[derive(Subcommand, Debug, Clone, Copy)]
enum CatalogList {
    Products,
    Supermarket,
    Coupons,
    /// Your favorites (requires a catalog session)
    Favorites,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    LoggingConfig::from_env().verbose(cli.verbose).init();

    let format = cli.format;
    if let Err(e) = run(cli).await {
        report_error(&e, format);
        std::process::exit(exit_code(&e));
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let config = Config::load().context("Failed to load configuration")?;
    tracing::debug!("Job board backend: {}", config.api.base_url);
    let out = Output(cli.format);

    match cli.command {
        Commands::Offers(command) => {
            let board = JobBoard::from_config(&config)?;
            board.hydrate()?;
            run_offers(&board, command, out).await
        }
        Commands::Catalog { list } => run_catalog(&config, list, out).await,
    }
}

async fn run_offers(board: &JobBoard, command: OfferCommand, out: Output) -> anyhow::Result<()> {
    match command {
        OfferCommand::List => {
            let offers = board.load_all_job_offers().await?;
            out.offers(&offers)
        }
        OfferCommand::Show { id } => {
            let offer = board.load_job_offer_by_id(id).await?;
            out.offers(std::slice::from_ref(&offer))
        }
        OfferCommand::Create { fields } => {
            let form = form_from_pairs(&fields)?;
            let offer = board.create_job_offer(form).await?;
            out.offers(std::slice::from_ref(&offer))
        }
        OfferCommand::Apply { offer_id } => {
            let feedback = board.apply_to_job_offer(offer_id).await?;
            out.feedback(&feedback)
        }
        OfferCommand::Unapply { offer_id } => {
            let feedback = board.unapply_from_job_offer(offer_id).await?;
            out.feedback(&feedback)
        }
        OfferCommand::Applications => {
            let applications = board.load_user_applications().await?;
            out.print(&applications, || {
                applications
                    .iter()
                    .map(|application| format!("offer {}", application.offer_id))
                    .collect::<Vec<_>>()
                    .join("\n")
            })
        }
        OfferCommand::Count { offer_id } => {
            let count = board.applicant_count(offer_id).await?;
            out.print(&serde_json::json!({ "numero_postulados": count }), || {
                count.to_string()
            })
        }
        OfferCommand::Hello => {
            let hello = board.get_message().await?;
            out.print(&hello, || hello.message.clone())
        }
    }
}

async fn run_catalog(config: &Config, list: CatalogList, out: Output) -> anyhow::Result<()> {
    let catalog_config = config.catalog.as_ref().ok_or_else(|| {
        JobBoardError::InvalidInput("No [catalog] section in the configuration".to_string())
    })?;
    let storage = open_storage(&config.storage)?;
    let catalog = Catalog::from_config(catalog_config, config.api.timeout(), storage)?;
    catalog.hydrate()?;

    match list {
        CatalogList::Products => {
            let products = catalog.load_products().await?;
            out.print(&products, || summarize(products.iter().map(|p| (p.id, p.name()))))
        }
        CatalogList::Supermarket => {
            let products = catalog.load_supermarket().await?;
            out.print(&products, || summarize(products.iter().map(|p| (p.id, p.name()))))
        }
        CatalogList::Coupons => {
            let coupons = catalog.load_coupons().await?;
            out.print(&coupons, || summarize(coupons.iter().map(|c| (c.id, None))))
        }
        CatalogList::Favorites => {
            let favorites = catalog.load_favorites().await?;
            out.print(&favorites, || summarize(favorites.iter().map(|f| (f.id, None))))
        }
    }
}

fn summarize<'a>(rows: impl Iterator<Item = (i64, Option<&'a str>)>) -> String {
    rows.map(|(id, label)| format!("{}\t{}", id, label.unwrap_or("")))
        .collect::<Vec<_>>()
        .join("\n")
}

#[derive(Clone, Copy)]
struct Output(OutputFormat);

impl Output {
    fn print<T: Serialize>(&self, value: &T, text: impl FnOnce() -> String) -> anyhow::Result<()> {
        match self.0 {
            OutputFormat::Json => println!("{}", serde_json::to_string_pretty(value)?),
            OutputFormat::Text => {
                let text = text();
                if !text.is_empty() {
                    println!("{}", text);
                }
            }
        }
        Ok(())
    }

    fn offers(&self, offers: &[JobOffer]) -> anyhow::Result<()> {
        self.print(&offers, || {
            summarize(offers.iter().map(|offer| (offer.id, offer.title())))
        })
    }

    fn feedback(&self, feedback: &Feedback) -> anyhow::Result<()> {
        self.print(feedback, || feedback.msg.clone())
    }
}

fn report_error(err: &anyhow::Error, format: OutputFormat) {
    match (format, err.downcast_ref::<ActionError>()) {
        (OutputFormat::Json, Some(action)) => {
            if let Ok(json) = serde_json::to_string(&action.feedback()) {
                println!("{}", json);
            }
        }
        (_, Some(action)) => eprintln!("Error: {}", action),
        _ => eprintln!("Error: {:#}", err),
    }
}

fn exit_code(err: &anyhow::Error) -> i32 {
    if let Some(e) = err.downcast_ref::<ActionError>() {
        return e.exit_code();
    }
    if let Some(e) = err.downcast_ref::<JobBoardError>() {
        return e.exit_code();
    }
    1
}

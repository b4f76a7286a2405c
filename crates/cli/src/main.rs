use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};

use bookshop_app::modules::books::models::BookId;
use bookshop_app::modules::stock::models::StockUpdateRequest;
use bookshop_app::modules::stock::repository::SqliteStockRepository;
use bookshop_app::modules::stock::workflow::StockWorkflow;
use bookshop_kernel::settings::Settings;

#[derive(Debug, Parser)]
#[command(name = "bookshop", version, about = "Bookshop catalog administration")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Run the HTTP service
    Serve,
    /// Apply pending database migrations and exit
    Migrate,
    /// Inspect or change stock levels
    #[command(subcommand)]
    Stock(StockCommand),
}

#[derive(Debug, Subcommand)]
enum StockCommand {
    /// List stock levels, optionally filtered by book name
    List {
        #[arg(long)]
        sterm: Option<String>,
    },
    /// Show the stock level of one book
    Get { book_id: i64 },
    /// Set the stock quantity of one book
    Set {
        book_id: i64,
        #[arg(allow_negative_numbers = true)]
        quantity: i64,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();

    let settings = Settings::load().with_context(|| "failed to load bookshop settings")?;
    bookshop_telemetry::init(&settings.telemetry);

    match cli.command {
        Command::Serve => {
            bookshop_app::serve(&settings).await?;
            Ok(ExitCode::SUCCESS)
        }
        Command::Migrate => {
            let registry = bookshop_app::registry()?;
            let pool = bookshop_app::open_database(&settings.database, &registry).await?;
            pool.close().await;
            tracing::info!("database is up to date");
            Ok(ExitCode::SUCCESS)
        }
        Command::Stock(command) => run_stock(&settings, command).await,
    }
}

async fn run_stock(settings: &Settings, command: StockCommand) -> anyhow::Result<ExitCode> {
    let registry = bookshop_app::registry()?;
    let pool = bookshop_app::open_database(&settings.database, &registry).await?;
    let workflow = StockWorkflow::new(Arc::new(SqliteStockRepository::new(pool.clone())));

    let code = match command {
        StockCommand::List { sterm } => {
            let views = workflow.display(sterm.as_deref()).await?;
            println!("{}", serde_json::to_string_pretty(&views)?);
            ExitCode::SUCCESS
        }
        StockCommand::Get { book_id } => {
            let level = workflow.stock_for_book(BookId(book_id)).await?;
            println!("{}", serde_json::to_string_pretty(&level)?);
            ExitCode::SUCCESS
        }
        StockCommand::Set { book_id, quantity } => {
            let verdict = workflow
                .manage_stock(StockUpdateRequest {
                    book_id: BookId(book_id),
                    quantity,
                })
                .await;
            println!("{}", serde_json::to_string_pretty(&verdict)?);
            eprintln!("{}", verdict.message());
            if verdict.is_success() {
                ExitCode::SUCCESS
            } else {
                ExitCode::FAILURE
            }
        }
    };

    pool.close().await;
    Ok(code)
}

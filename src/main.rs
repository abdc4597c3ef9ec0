use std::io;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{fmt, EnvFilter};

use tarmac::cli::Cli;
use tarmac::console::Console;
use tarmac::db::PgHarness;
use tarmac::menu;
use tarmac::transfer::CommandTransfer;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Diagnostics go to stderr so the console protocol on stdout stays clean.
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();

    println!("Connecting to database...");
    let db = match PgHarness::connect(&cli.host, cli.port, &cli.dbname, &cli.user, &cli.password)
        .await
    {
        Ok(db) => db,
        Err(err) => {
            eprintln!("Error - Unable to Connect to Database: {err}");
            std::process::exit(1);
        }
    };
    println!("Done");

    let store = CommandTransfer::new(cli.transfer_tool.clone());
    let mut console = Console::new(io::stdin().lock(), io::stdout());

    let result = menu::run(&db, &mut console, &store, &cli.user, &cli.document_root).await;

    print!("Disconnecting from database...");
    db.close().await;
    println!("Done\n\nBye !");

    result.map_err(Into::into)
}

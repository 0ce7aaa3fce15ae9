pub mod commands;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "clinic-records-api")]
#[command(about = "CRUD REST API for clinic finance, pharmacy, notification and patient history records")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Run the HTTP server")]
    Serve(commands::serve::ServeArgs),

    #[command(about = "Mint a JWT with the configured secret")]
    Token(commands::token::TokenArgs),

    #[command(about = "Print the registered entity schemas as JSON")]
    Entities,
}

pub async fn run(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Commands::Serve(args) => commands::serve::handle(args).await,
        Commands::Token(args) => commands::token::handle(args),
        Commands::Entities => commands::entities::handle(),
    }
}

mod schema;
mod seed;

use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::{generate, Shell};
use std::io;

pub use schema::SchemaArgs;
pub use seed::SeedArgs;

#[derive(Parser)]
#[command(name = "cinema-seeder")]
#[command(version)]
#[command(
    about = "Populate a star-schema movie-ticketing database with synthetic data",
    long_about = None
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Seed every dimension and the transaction fact table
    Seed(SeedArgs),

    /// Print the CREATE statements for a schema layout
    Schema(SchemaArgs),

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

pub fn run(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Commands::Seed(args) => seed::run(args),
        Commands::Schema(args) => schema::run(args),
        Commands::Completions { shell } => {
            generate(
                shell,
                &mut Cli::command(),
                "cinema-seeder",
                &mut io::stdout(),
            );
            Ok(())
        }
    }
}

use chrono::Utc;
use clap::{Parser, Subcommand};
use configuration::{init_tracing, load_config_with, ConfigOverrides};
use database::{connect, run_migrations, DbRepository, InventoryStore};
use uuid::Uuid;

/// Multi-tenant inventory tracking with dashboards and sales analytics.
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(flatten)]
    overrides: ConfigOverrides,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run migrations, then serve the JSON API until Ctrl-C.
    Serve,
    /// Apply pending database migrations and exit.
    Migrate,
    /// Record today's inventory value for one user.
    Snapshot(SnapshotArgs),
}

#[derive(Parser)]
struct SnapshotArgs {
    /// The owner whose inventory is valued.
    #[arg(long)]
    user: Uuid,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = load_config_with(&cli.overrides)?;
    let _guard = init_tracing(&config.logging)?;

    match cli.command {
        Commands::Serve => web_server::run_server(config).await?,
        Commands::Migrate => {
            let pool = connect(&config.database).await?;
            run_migrations(&pool).await?;
            tracing::info!("Migrations applied.");
        }
        Commands::Snapshot(args) => {
            let pool = connect(&config.database).await?;
            run_migrations(&pool).await?;
            let repo = DbRepository::new(pool);
            let snapshot = repo.record_snapshot(args.user, Utc::now().date_naive()).await?;
            tracing::info!(
                user_id = %args.user,
                date = %snapshot.date,
                value = %snapshot.total_value,
                "Inventory snapshot recorded."
            );
        }
    }

    Ok(())
}

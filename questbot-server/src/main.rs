// questbot-server/src/main.rs

use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::{fmt, EnvFilter};

use questbot_core::Error;

mod auth;
mod context;
mod routes;
mod server;

use context::ServerContext;
use server::run_server;

#[derive(Parser, Debug, Clone)]
#[command(name = "questbot")]
#[command(author, version, about = "QuestBot - quest/rewards platform API server")]
pub struct Args {
    /// Address the HTTP API binds to
    #[arg(long, default_value = "0.0.0.0:8000")]
    pub listen_addr: String,

    /// Postgres connection URL (falls back to DATABASE_URL)
    #[arg(long)]
    pub database_url: Option<String>,

    /// Skip running migrations on startup
    #[arg(long, default_value = "false")]
    pub no_migrate: bool,
}

fn init_tracing() {
    let filter = EnvFilter::from_default_env()
        .add_directive("questbot=info".parse().unwrap_or_default());
    let sub = fmt().with_env_filter(filter).finish();
    tracing::subscriber::set_global_default(sub).expect("Failed to set global subscriber");
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    dotenv::dotenv().ok();
    init_tracing();
    let args = Args::parse();
    info!("QuestBot server starting. listen_addr={}", args.listen_addr);

    let ctx = ServerContext::new(&args).await?;
    if let Err(e) = run_server(ctx, &args).await {
        error!("Server error: {:?}", e);
        return Err(e);
    }
    Ok(())
}

//! questbot-server/src/server.rs

use std::net::SocketAddr;
use std::sync::Arc;

use tracing::info;

use questbot_core::Error;

use crate::context::ServerContext;
use crate::routes;
use crate::Args;

pub async fn run_server(ctx: ServerContext, args: &Args) -> Result<(), Error> {
    let addr: SocketAddr = args.listen_addr.parse()?;
    let app = routes::router(Arc::new(ctx));

    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("HTTP API listening on http://{addr}");
    axum::serve(listener, app).await?;
    Ok(())
}

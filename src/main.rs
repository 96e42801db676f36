mod cli;
mod error;
mod logging;
mod server;

use crate::cli::Cli;
use crate::error::{ErrorKind, Result};
use crate::server::AppState;
use clap::Parser;
use exn::ResultExt;
use std::process::ExitCode;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use winboxget_cache::Resolver;
use winboxget_config::Config;
use winboxget_counter::VisitCounter;
use winboxget_fetch::HttpFetcher;
use winboxget_render::IndexPage;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    logging::init(cli.verbose);
    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("winboxget: {err:?}");
            ExitCode::FAILURE
        },
    }
}

async fn run(cli: Cli) -> Result<()> {
    let mut config = Config::load(cli.config.as_deref()).or_raise(|| ErrorKind::Config)?;
    cli.apply(&mut config);
    tracing::debug!(?config, "configuration loaded");

    let fetcher = HttpFetcher::new(&config.source_url).or_raise(|| ErrorKind::Http)?;
    let state = AppState {
        resolver: Resolver::new(Arc::new(fetcher)).serve_stale(config.serve_stale),
        counter: VisitCounter::load(&config.counter_file).await,
        index: IndexPage::new().or_raise(|| ErrorKind::Render)?,
    };
    let app = server::router(Arc::new(state)).layer(TraceLayer::new_for_http());

    let listener = TcpListener::bind(config.listen).await.or_raise(|| ErrorKind::Bind(config.listen))?;
    let addr = listener.local_addr().or_raise(|| ErrorKind::Bind(config.listen))?;
    tracing::info!(%addr, source = %config.source_url, "listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .or_raise(|| ErrorKind::Serve)
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %err, "could not listen for ctrl-c; running until killed");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutting down");
}

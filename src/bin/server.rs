use std::{
    env::{self},
    fs::OpenOptions,
    net::{IpAddr, SocketAddr},
    sync::Arc,
};

use axum::{
    Router,
    extract::{MatchedPath, Request},
    middleware,
};
use axum_server::Handle;
use clap::Parser;
use rusqlite::Connection;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{EnvFilter, Layer, filter, layer::SubscriberExt, util::SubscriberInitExt};

use bizbook_rs::{AppState, build_router, graceful_shutdown, logging_middleware};

/// The REST API server for bizbook_rs.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// File path to the application SQLite database.
    #[arg(long)]
    db_path: String,

    /// The address to listen on.
    #[arg(short, long, default_value = "127.0.0.1")]
    address: IpAddr,

    /// The port to serve the API from.
    #[arg(short, long, default_value_t = 3000)]
    port: u16,

    /// The canonical name of the local timezone, e.g. "Pacific/Auckland".
    ///
    /// Used to decide which dates are in the future.
    #[arg(short, long, default_value = "Etc/UTC")]
    timezone: String,

    /// File path to write debug logs to.
    #[arg(long, default_value = "debug.log")]
    log_path: String,
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    setup_logging(&args.log_path);

    let secret = env::var("SECRET").expect("The environment variable 'SECRET' must be set");

    let conn = Connection::open(&args.db_path).expect("Could not open the database.");
    let state = AppState::new(conn, &secret, &args.timezone)
        .expect("Could not create the app state. Check the timezone and database file.");

    let handle = Handle::new();
    tokio::spawn(graceful_shutdown(handle.clone()));

    let router = add_tracing_layer(build_router(state))
        .layer(middleware::from_fn(logging_middleware));

    let addr = SocketAddr::new(args.address, args.port);
    tracing::info!("HTTP server listening on {}", addr);
    axum_server::bind(addr)
        .handle(handle)
        .serve(router.into_make_service())
        .await
        .expect("The server stopped unexpectedly.");
}

fn setup_logging(log_path: &str) {
    let stdout_log = tracing_subscriber::fmt::layer().pretty();

    let log_file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_path)
        .expect("Could not create log file");

    let debug_log = tracing_subscriber::fmt::layer()
        .pretty()
        .with_ansi(false)
        .with_writer(Arc::new(log_file));

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            stdout_log
                .with_filter(filter::LevelFilter::INFO)
                .and_then(debug_log)
                .with_filter(filter::LevelFilter::DEBUG),
        )
        .init();
}

fn add_tracing_layer(router: Router) -> Router {
    let tracing_layer = TraceLayer::new_for_http()
        .make_span_with(|req: &Request| {
            let method = req.method();
            let uri = req.uri();

            let matched_path = req
                .extensions()
                .get::<MatchedPath>()
                .map(|matched_path| matched_path.as_str());

            tracing::debug_span!("request", %method, %uri, matched_path)
        })
        // Errors are logged by the handlers and `Error::into_response`.
        .on_failure(());

    router.layer(tracing_layer)
}

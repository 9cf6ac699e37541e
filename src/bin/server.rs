use std::{
    error::Error,
    fs::OpenOptions,
    net::{IpAddr, SocketAddr},
    path::PathBuf,
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

use cash_card::{
    AppState, PaginationConfig, UsersConfig, build_router, graceful_shutdown,
    logging_middleware,
};

/// The REST API server for cash cards.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// File path to the application SQLite database. It is created if it does not exist.
    #[arg(long)]
    db_path: PathBuf,

    /// File path to the JSON file listing the users that may log in.
    #[arg(long)]
    users_path: PathBuf,

    /// The address to serve the API from.
    #[arg(long, default_value_t = IpAddr::from([127, 0, 0, 1]))]
    host: IpAddr,

    /// The port to serve the API from.
    #[arg(short, long, default_value_t = 8080)]
    port: u16,

    /// The number of cards in a page when the client does not ask for a page size.
    #[arg(long, default_value_t = PaginationConfig::default().default_page_size)]
    default_page_size: u64,

    /// The largest page size a client may ask for.
    #[arg(long, default_value_t = PaginationConfig::default().max_page_size)]
    max_page_size: u64,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();

    setup_logging()?;

    let users = UsersConfig::from_json_file(&args.users_path)?;

    if args.default_page_size == 0 || args.default_page_size > args.max_page_size {
        return Err(format!(
            "The default page size must be between 1 and the max page size ({}), got {}.",
            args.max_page_size, args.default_page_size
        )
        .into());
    }

    let connection = Connection::open(&args.db_path)?;
    let pagination_config = PaginationConfig {
        default_page_size: args.default_page_size,
        max_page_size: args.max_page_size,
    };
    let state = AppState::new(connection, users, pagination_config)?;

    if state.credentials.is_empty() {
        tracing::warn!(
            "No users in {:?}, every request will be rejected.",
            args.users_path
        );
    } else {
        tracing::info!(
            "Loaded {} user(s) from {:?}",
            state.credentials.len(),
            args.users_path
        );
    }

    let handle = Handle::new();
    tokio::spawn(graceful_shutdown(handle.clone()));

    let router = add_tracing_layer(
        build_router(state).layer(middleware::from_fn(logging_middleware)),
    );

    let addr = SocketAddr::from((args.host, args.port));
    tracing::info!("HTTP server listening on {}", addr);
    axum_server::bind(addr)
        .handle(handle)
        .serve(router.into_make_service())
        .await?;

    Ok(())
}

/// Log INFO and above to stdout, or whatever `RUST_LOG` asks for, and DEBUG and above to `debug.log`.
fn setup_logging() -> Result<(), Box<dyn Error>> {
    let stdout_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let stdout_log = tracing_subscriber::fmt::layer()
        .pretty()
        .with_filter(stdout_filter);

    let log_file = OpenOptions::new()
        .create(true)
        .append(true)
        .open("debug.log")?;

    let debug_log = tracing_subscriber::fmt::layer()
        .with_ansi(false)
        .with_writer(Arc::new(log_file))
        .with_filter(filter::LevelFilter::DEBUG);

    tracing_subscriber::registry()
        .with(stdout_log)
        .with(debug_log)
        .try_init()?;

    Ok(())
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
        // Errors are logged where they are converted into responses.
        .on_failure(());

    router.layer(tracing_layer)
}

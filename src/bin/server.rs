use std::{env, fs::OpenOptions, net::SocketAddr, sync::Arc};

use axum::{
    Router,
    extract::{MatchedPath, Request},
    middleware,
};
use axum_server::Handle;
use clap::Parser;
use rusqlite::Connection;
use tower_http::trace::TraceLayer;

#[cfg(debug_assertions)]
use tower_livereload::LiveReloadLayer;

use tracing_subscriber::{Layer, filter, layer::SubscriberExt, util::SubscriberInitExt};

use casabooks::{
    AppState, DEMO_EMAIL, DEMO_PASSWORD, build_router, graceful_shutdown, logging_middleware,
    seed_demo_data,
};

/// The web server for CasaBooks.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// File path to the application SQLite database.
    #[arg(long, required_unless_present = "demo")]
    db_path: Option<String>,

    /// The port to serve the app from.
    #[arg(short, long, default_value_t = 3000)]
    port: u16,

    /// The local timezone as a canonical name, e.g. "Pacific/Auckland".
    #[arg(long, default_value = "Etc/UTC")]
    timezone: String,

    /// Run with an in-memory database pre-seeded with sample data.
    /// Nothing is persisted between runs.
    #[arg(long, default_value_t = false)]
    demo: bool,
}

#[tokio::main]
async fn main() {
    setup_logging();

    let args = Args::parse();

    if time_tz::timezones::get_by_name(&args.timezone).is_none() {
        panic!(
            "'{}' is not a valid canonical timezone name",
            args.timezone
        );
    }

    let secret = env::var("SECRET").expect("The environment variable 'SECRET' must be set");

    let connection = if args.demo {
        Connection::open_in_memory().expect("Could not create the in-memory database")
    } else {
        let db_path = args.db_path.as_deref().expect("--db-path is required");
        Connection::open(db_path).expect("Could not open the database")
    };

    let state = AppState::new(connection, &secret, &args.timezone)
        .expect("Could not initialize the application");

    if args.demo {
        seed_demo_data(&state.db_connection.lock().expect("Database lock poisoned"))
            .expect("Could not seed the demo database");
        tracing::info!("Demo mode: log in with {DEMO_EMAIL} / {DEMO_PASSWORD}");
    }

    let handle = Handle::new();
    tokio::spawn(graceful_shutdown(handle.clone()));

    let router = add_tracing_layer(build_router(state))
        .layer(middleware::from_fn(logging_middleware));

    #[cfg(debug_assertions)]
    let router = router.layer(LiveReloadLayer::new());

    let addr = SocketAddr::from(([127, 0, 0, 1], args.port));
    tracing::info!("HTTP server listening on {}", addr);
    axum_server::bind(addr)
        .handle(handle)
        .serve(router.into_make_service())
        .await
        .expect("Could not start the server");
}

fn setup_logging() {
    let stdout_log = tracing_subscriber::fmt::layer().pretty();

    let log_file = OpenOptions::new()
        .create(true)
        .append(true)
        .open("debug.log")
        .expect("Could not create log file");

    let debug_log = tracing_subscriber::fmt::layer()
        .pretty()
        .with_writer(Arc::new(log_file));

    tracing_subscriber::registry()
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
        // 5xx responses already get logged where the error occurs.
        .on_failure(());

    router.layer(tracing_layer)
}

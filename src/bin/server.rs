use std::{
    env,
    fs::OpenOptions,
    net::SocketAddr,
    path::{Path, PathBuf},
    sync::Arc,
    time::Duration,
};

use axum::{
    Router,
    extract::{MatchedPath, Request},
    middleware,
};
use axum_server::Handle;
use clap::Parser;
use tower_http::trace::TraceLayer;

#[cfg(debug_assertions)]
use tower_livereload::LiveReloadLayer;

use tracing_subscriber::{EnvFilter, Layer, filter, layer::SubscriberExt, util::SubscriberInitExt};

use branch_desk::{
    ApiPaths, AppState, HttpBackend, build_router, get_local_offset, graceful_shutdown,
    logging_middleware,
};

/// The web server for the branch_desk staff dashboard.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Base URL of the banking REST backend, e.g. `http://localhost:8080`.
    #[arg(long)]
    backend_url: String,

    /// Base URL of the service that serves branches and loans.
    ///
    /// Defaults to `--backend-url`.
    #[arg(long)]
    loans_backend_url: Option<String>,

    /// A JSON file overriding the backend endpoint paths.
    #[arg(long)]
    api_paths: Option<PathBuf>,

    /// The port to serve the dashboard from.
    #[arg(short, long, default_value_t = 3000)]
    port: u16,

    /// The canonical name of the branch's timezone.
    #[arg(long, default_value = "Asia/Kolkata")]
    timezone: String,

    /// How long to wait for the backend before giving up on a request.
    #[arg(long, default_value_t = 15)]
    request_timeout_secs: u64,

    /// Where to write the debug log.
    #[arg(long, default_value = "debug.log")]
    log_path: PathBuf,
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    setup_logging(&args.log_path);

    if get_local_offset(&args.timezone).is_none() {
        panic!("\"{}\" is not a valid canonical timezone name", args.timezone);
    }

    let secret = env::var("SECRET").expect("The environment variable 'SECRET' must be set");

    let api_paths = match &args.api_paths {
        Some(path) => {
            let text = std::fs::read_to_string(path).expect("Could not read the API paths file");
            serde_json::from_str::<ApiPaths>(&text).expect("Could not parse the API paths file")
        }
        None => ApiPaths::default(),
    };

    let backend = HttpBackend::new(
        &args.backend_url,
        args.loans_backend_url.as_deref().unwrap_or(&args.backend_url),
        api_paths,
        Duration::from_secs(args.request_timeout_secs),
    )
    .expect("Could not create the backend client");

    let app_state = AppState::new(&secret, &args.timezone, Arc::new(backend));

    let handle = Handle::new();
    tokio::spawn(graceful_shutdown(handle.clone()));

    let router = build_router(app_state).layer(middleware::from_fn(logging_middleware));
    let router = add_tracing_layer(router);

    #[cfg(debug_assertions)]
    let router = router.layer(LiveReloadLayer::new());

    let addr = SocketAddr::from(([127, 0, 0, 1], args.port));
    tracing::info!("HTTP server listening on {}", addr);
    axum_server::bind(addr)
        .handle(handle)
        .serve(router.into_make_service())
        .await
        .expect("Server stopped unexpectedly");
}

fn setup_logging(log_path: &Path) {
    let stdout_log = tracing_subscriber::fmt::layer().pretty();

    let log_file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_path)
        .expect("Could not create log file");

    let debug_log = tracing_subscriber::fmt::layer()
        .pretty()
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
        // Errors are logged by the handlers and the error pages.
        .on_failure(());

    router.layer(tracing_layer)
}

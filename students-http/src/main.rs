use std::{net::SocketAddr, process, time::Duration};

use middleware::{cors, tower_trace};
use server::build_routes;
use students_bridge::{
    Bridge,
    clap::Parser,
    settings::{build_config, build_file_path, command::Args},
};
use tokio::net::TcpListener;
use tracing::{error, info, warn};

mod enviroment;
mod error;
mod logging;
mod middleware;
mod server;
mod wrappers;

mod doc;

const TARGET_HTTP: &str = "Students-Http";

/// In-flight requests get this long after a shutdown signal.
const SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(5);

#[tokio::main]
async fn main() {
    let args = Args::parse();

    let mut file_path = args.file_path;
    if file_path.is_empty() {
        file_path = build_file_path();
    }

    let config = match build_config(args.env_config, &file_path) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Can not load settings: {}", e);
            process::exit(1);
        }
    };

    let _logging = logging::init_logging(&config.logging);
    let address = config.http_address.clone();

    let bridge = match Bridge::build(config, None).await {
        Ok(bridge) => bridge,
        Err(e) => {
            error!(TARGET_HTTP, "Can not open storage: {}", e);
            process::exit(1);
        }
    };
    let token = bridge.token().clone();

    let listener = match TcpListener::bind(&address).await {
        Ok(listener) => listener,
        Err(e) => {
            error!(TARGET_HTTP, "Can not listen on {}: {}", address, e);
            process::exit(1);
        }
    };
    info!(TARGET_HTTP, "server started at {}", address);

    let shutdown = token.clone();
    let server = axum::serve(
        listener,
        tower_trace(build_routes(bridge))
            .layer(cors())
            .into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(async move {
        shutdown.cancelled().await;
        info!(TARGET_HTTP, "shutting down server");
    });

    tokio::select! {
        result = server.into_future() => {
            if let Err(e) = result {
                error!(TARGET_HTTP, "Server error: {}", e);
                process::exit(1);
            }
        }
        _ = async {
            token.cancelled().await;
            tokio::time::sleep(SHUTDOWN_TIMEOUT).await;
        } => {
            warn!(TARGET_HTTP, "Requests still running after {:?}, forcing shutdown", SHUTDOWN_TIMEOUT);
        }
    }

    info!(TARGET_HTTP, "server stopped");
}

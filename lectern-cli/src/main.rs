use axum::{Router, routing::get};
use clap::Parser;
use lectern::server::{AppState, OwnerDisconnectPolicy, ServerConfig, api, ws_handler};
use std::net::SocketAddr;
use tower_http::cors::{Any, CorsLayer};
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Live-class signaling server: the WebSocket hub plus the HTTP control
/// surface for class lifecycle and notifications.
#[derive(Parser)]
#[command(name = "lecternd", version, about)]
struct Args {
    /// Address to listen on.
    #[arg(long, default_value = "0.0.0.0:5002")]
    bind: SocketAddr,

    /// Per-connection outbound queue bound; overflow drops newest.
    #[arg(long, default_value_t = 64)]
    queue_capacity: usize,

    /// End a class when its owner's connection drops, instead of letting
    /// the session linger until an explicit end call.
    #[arg(long)]
    end_on_owner_disconnect: bool,
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let state = AppState::new(ServerConfig {
        outbound_queue_capacity: args.queue_capacity,
        owner_disconnect: if args.end_on_owner_disconnect {
            OwnerDisconnectPolicy::End
        } else {
            OwnerDisconnectPolicy::Linger
        },
    });

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = Router::new()
        .route("/ws", get(ws_handler))
        .merge(api::routes())
        .layer(cors)
        .with_state(state);

    info!("signaling server listening on http://{}", args.bind);
    let listener = tokio::net::TcpListener::bind(args.bind)
        .await
        .expect("failed to bind listening address");
    axum::serve(listener, app).await.expect("server error");
}

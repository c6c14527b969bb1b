use knowledge_engine::{config, http, store::graph_store::Neo4rsStore, AppState};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

fn parse_port_from_args() -> Option<u16> {
    let mut args = std::env::args().peekable();
    while let Some(a) = args.next() {
        if a == "--port" {
            if let Some(v) = args.next() {
                if let Ok(p) = v.parse::<u16>() {
                    return Some(p);
                }
            }
        } else if let Some(rest) = a.strip_prefix("--port=") {
            if let Ok(p) = rest.parse::<u16>() {
                return Some(p);
            }
        }
    }
    None
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info,tower_http=warn"));
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    if let Err(e) = knowledge_engine::telemetry::metrics::install_prometheus_recorder() {
        warn!("failed to install prometheus recorder: {e}");
    }

    let config = config::load_config();
    let bind_addr = parse_port_from_args()
        .map(|p| format!("0.0.0.0:{p}"))
        .unwrap_or_else(|| config.resolve_http_bind());

    info!("connecting to graph store at {}", config.neo4j.resolve_uri());
    let store = Neo4rsStore::connect(
        &config.neo4j.resolve_uri(),
        &config.neo4j.resolve_user(),
        &config.neo4j.resolve_password(),
    )
    .await?;

    let probe_vectorizer =
        knowledge_engine::embedding::Vectorizer::new(config.resolve_embedding_model(), 512);
    let embedding_dim = probe_vectorizer.dimension().await?;
    knowledge_engine::store::schema::ensure_schema(store.graph(), embedding_dim).await?;
    info!(dim = embedding_dim, "graph schema ensured");

    let state = Arc::new(AppState::new(config, Arc::new(store)));

    let app = http::build_router(state.clone())
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http());

    let listener = match tokio::net::TcpListener::bind(&bind_addr).await {
        Ok(l) => l,
        Err(e) if e.kind() == std::io::ErrorKind::AddrInUse => {
            anyhow::bail!(
                "Address already in use: {}. Stop the existing process or set KNOWLEDGE_ENGINE_BIND.",
                bind_addr
            )
        }
        Err(e) => return Err(e.into()),
    };
    info!("knowledge-engine listening on http://{}", bind_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};
        let mut sigterm = signal(SignalKind::terminate()).ok();
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {},
            _ = async {
                if let Some(ref mut s) = sigterm {
                    s.recv().await;
                } else {
                    futures::future::pending::<()>().await;
                }
            } => {},
        }
    }

    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }
}

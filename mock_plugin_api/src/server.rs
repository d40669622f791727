use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use dashboard_protocol::RawPayload;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;

#[derive(Default)]
struct ApiState {
    payload: RawPayload,
    fail_gets: u32,
    fail_posts: u32,
    gets: u32,
    posts: u32,
}

type Shared = Arc<Mutex<ApiState>>;

fn lock(state: &Shared) -> MutexGuard<'_, ApiState> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

/// A running server. Dropping the handle also stops it.
pub struct MockApi {
    addr: SocketAddr,
    state: Shared,
    shutdown: oneshot::Sender<()>,
    task: JoinHandle<()>,
}

impl MockApi {
    /// Binds `addr` (use port 0 for an ephemeral port) and starts serving `payload`.
    pub async fn spawn(addr: &str, payload: RawPayload) -> std::io::Result<Self> {
        let listener = TcpListener::bind(addr).await?;
        let addr = listener.local_addr()?;
        let state: Shared = Arc::new(Mutex::new(ApiState {
            payload,
            ..ApiState::default()
        }));

        let app = Router::new()
            .route("/", get(get_payload).post(post_payload))
            .route("/health", get(|| async { "ok" }))
            .with_state(Arc::clone(&state));

        let (shutdown, shutdown_rx) = oneshot::channel::<()>();
        let task = tokio::spawn(async move {
            let result = axum::serve(listener, app)
                .with_graceful_shutdown(async {
                    shutdown_rx.await.ok();
                })
                .await;
            if let Err(e) = result {
                tracing::error!("mock plugin api stopped: {e}");
            }
        });

        tracing::info!(%addr, "mock plugin api listening");
        Ok(Self {
            addr,
            state,
            shutdown,
            task,
        })
    }

    pub fn listen_addr(&self) -> SocketAddr {
        self.addr
    }

    pub fn url(&self) -> String {
        format!("http://{}/", self.addr)
    }

    /// The document as the server currently holds it.
    pub fn payload(&self) -> RawPayload {
        lock(&self.state).payload.clone()
    }

    pub fn set_payload(&self, payload: RawPayload) {
        lock(&self.state).payload = payload;
    }

    /// The next `n` GETs answer 503.
    pub fn fail_next_gets(&self, n: u32) {
        lock(&self.state).fail_gets = n;
    }

    /// The next `n` POSTs answer 500 and leave the document alone.
    pub fn fail_next_posts(&self, n: u32) {
        lock(&self.state).fail_posts = n;
    }

    pub fn get_count(&self) -> u32 {
        lock(&self.state).gets
    }

    pub fn post_count(&self) -> u32 {
        lock(&self.state).posts
    }

    pub async fn shutdown(self) {
        let _ = self.shutdown.send(());
        let _ = self.task.await;
    }
}

async fn get_payload(State(state): State<Shared>) -> Response {
    let mut s = lock(&state);
    s.gets += 1;
    if s.fail_gets > 0 {
        s.fail_gets -= 1;
        tracing::warn!("failing GET on request");
        return (StatusCode::SERVICE_UNAVAILABLE, "injected failure").into_response();
    }
    Json(s.payload.clone()).into_response()
}

async fn post_payload(State(state): State<Shared>, Json(payload): Json<RawPayload>) -> Response {
    let mut s = lock(&state);
    s.posts += 1;
    if s.fail_posts > 0 {
        s.fail_posts -= 1;
        tracing::warn!("failing POST on request");
        return (StatusCode::INTERNAL_SERVER_ERROR, "injected failure").into_response();
    }
    tracing::info!(
        tabs = payload.tab_data.len(),
        plugins = payload.plugins.len(),
        "stored plugin payload"
    );
    s.payload = payload;
    Json(serde_json::json!({ "ok": true })).into_response()
}

//! IPC server for the daemon
//!
//! Listens on a Unix socket and applies operator edits to the live watch
//! settings. Validation failures are returned synchronously to the caller
//! and leave state unchanged.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::{UnixListener, UnixStream};
use tokio::sync::{watch, Semaphore};
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use super::protocol::*;
use crate::scheduler::SchedulerHandle;
use crate::storage::{Database, KeywordRepository};
use crate::watch::WatchStore;
use crate::{Error, Result};

/// Maximum number of concurrently processed requests
const MAX_CONCURRENT_REQUESTS: usize = 10;

/// State shared by every connection handler.
struct ServerState {
    watch_store: Arc<WatchStore>,
    scheduler: SchedulerHandle,
    db: Arc<Database>,
    start_time: Instant,
}

/// IPC server that handles control-surface connections
pub struct DaemonServer {
    state: Arc<ServerState>,
    socket_path: PathBuf,
    request_semaphore: Arc<Semaphore>,
}

impl DaemonServer {
    pub fn new(
        socket_path: PathBuf,
        watch_store: Arc<WatchStore>,
        scheduler: SchedulerHandle,
        db: Arc<Database>,
    ) -> Self {
        Self {
            state: Arc::new(ServerState {
                watch_store,
                scheduler,
                db,
                start_time: Instant::now(),
            }),
            socket_path,
            request_semaphore: Arc::new(Semaphore::new(MAX_CONCURRENT_REQUESTS)),
        }
    }

    /// Run the IPC server until shutdown
    pub async fn run(&self, mut shutdown_rx: watch::Receiver<bool>) -> Result<()> {
        if self.socket_path.exists() {
            std::fs::remove_file(&self.socket_path)?;
        }

        if let Some(parent) = self.socket_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let listener = UnixListener::bind(&self.socket_path)?;
        info!("IPC server listening on: {}", self.socket_path.display());

        loop {
            tokio::select! {
                result = listener.accept() => {
                    match result {
                        Ok((stream, _)) => {
                            let state = Arc::clone(&self.state);
                            let semaphore = Arc::clone(&self.request_semaphore);
                            tokio::spawn(async move {
                                if let Err(e) = handle_connection(stream, state, semaphore).await {
                                    warn!("Error handling connection: {}", e);
                                }
                            });
                        }
                        Err(e) => {
                            error!("Failed to accept connection: {}", e);
                        }
                    }
                }
                _ = shutdown_rx.changed() => {
                    if *shutdown_rx.borrow() {
                        info!("IPC server shutting down");
                        break;
                    }
                }
            }
        }

        let _ = std::fs::remove_file(&self.socket_path);
        Ok(())
    }
}

async fn handle_connection(
    stream: UnixStream,
    state: Arc<ServerState>,
    semaphore: Arc<Semaphore>,
) -> Result<()> {
    let (reader, mut writer) = stream.into_split();
    let mut reader = BufReader::new(reader);
    let mut line = String::new();

    loop {
        line.clear();
        let bytes_read = reader.read_line(&mut line).await?;
        if bytes_read == 0 {
            break; // Connection closed
        }

        let _permit = semaphore
            .acquire()
            .await
            .map_err(|e| Error::Other(format!("Failed to acquire semaphore: {}", e)))?;

        let response = match serde_json::from_str::<Request>(&line) {
            Ok(request) => {
                debug!("Received request: {} (id: {})", request.method, request.id);
                handle_request(request, &state).await
            }
            Err(e) => {
                warn!("Failed to parse request: {}", e);
                Response::error(Uuid::nil(), ERR_PARSE, format!("Parse error: {}", e))
            }
        };

        let response_json = serde_json::to_string(&response)?;
        writer.write_all(response_json.as_bytes()).await?;
        writer.write_all(b"\n").await?;
        writer.flush().await?;
    }

    Ok(())
}

fn error_response(id: Uuid, error: Error) -> Response {
    match error {
        Error::Validation(message) => Response::error(id, ERR_INVALID_PARAMS, message),
        other => Response::error(id, ERR_INTERNAL, other.to_string()),
    }
}

async fn handle_request(request: Request, state: &ServerState) -> Response {
    let id = request.id;

    match request.method.as_str() {
        methods::PING => Response::success(id, serde_json::json!({"ok": true})),

        methods::STATUS => {
            let uptime = state.start_time.elapsed().as_secs();
            Response::success(
                id,
                serde_json::json!({
                    "running": true,
                    "uptime_secs": uptime,
                    "cycle_in_progress": state.scheduler.is_running(),
                    "countdown_secs": state.scheduler.countdown_remaining(),
                }),
            )
        }

        methods::WATCH_GET => {
            let snapshot = state.watch_store.snapshot();
            Response::success(
                id,
                serde_json::json!({
                    "keywords": snapshot.keywords,
                    "prompt": snapshot.prompt,
                    "refresh_interval_secs": snapshot.refresh_interval_secs,
                }),
            )
        }

        methods::WATCH_SET_KEYWORDS => {
            match serde_json::from_value::<SetKeywordsParams>(request.params) {
                Ok(params) => {
                    if let Err(e) = state.watch_store.set_keywords(params.keywords) {
                        return error_response(id, e);
                    }

                    // Persist the accepted list so it survives a restart.
                    let keywords = state.watch_store.keywords();
                    let repo = KeywordRepository::new(&state.db);
                    match repo.save(&keywords).await {
                        Ok(()) => Response::ok(id),
                        Err(e) => Response::error(
                            id,
                            ERR_INTERNAL,
                            format!("keywords updated but not persisted: {}", e),
                        ),
                    }
                }
                Err(e) => Response::error(id, ERR_INVALID_PARAMS, e.to_string()),
            }
        }

        methods::WATCH_SET_PROMPT => {
            match serde_json::from_value::<SetPromptParams>(request.params) {
                Ok(params) => match state.watch_store.set_prompt(params.prompt) {
                    Ok(()) => Response::ok(id),
                    Err(e) => error_response(id, e),
                },
                Err(e) => Response::error(id, ERR_INVALID_PARAMS, e.to_string()),
            }
        }

        methods::WATCH_SET_INTERVAL => {
            match serde_json::from_value::<SetIntervalParams>(request.params) {
                Ok(params) => match state.watch_store.set_refresh_interval(params.secs) {
                    Ok(()) => Response::ok(id),
                    Err(e) => error_response(id, e),
                },
                Err(e) => Response::error(id, ERR_INVALID_PARAMS, e.to_string()),
            }
        }

        methods::REFRESH_NOW => {
            let accepted = state.scheduler.trigger_now();
            Response::success(id, serde_json::json!({ "accepted": accepted }))
        }

        _ => Response::error(id, ERR_METHOD_NOT_FOUND, "Method not found"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::Summarizer;
    use crate::config::WatchDefaults;
    use crate::dedup::DeliveryLog;
    use crate::scheduler::tasks::tests::{RecordingNotifier, StubProvider, StubSource, StubSummary};
    use crate::scheduler::{CycleContext, SchedulerService};

    async fn server_state() -> Arc<ServerState> {
        let watch_store = Arc::new(WatchStore::new(WatchDefaults {
            keywords: vec!["stocks".into()],
            prompt: "Summarize this.".into(),
            refresh_interval_secs: 300,
        }));
        let ctx = Arc::new(CycleContext {
            channel_id: "chan-1".to_string(),
            source: Arc::new(StubSource::with_articles(Vec::new())),
            summarizer: Arc::new(Summarizer::with_provider(Arc::new(StubProvider {
                behavior: StubSummary::Fixed("summary"),
            }))),
            delivery_log: Arc::new(DeliveryLog::new()),
            notifier: Arc::new(RecordingNotifier::new()),
        });
        let (_service, handle) = SchedulerService::new(Arc::clone(&watch_store), ctx);
        let db = Arc::new(Database::new_in_memory().await.unwrap());

        Arc::new(ServerState {
            watch_store,
            scheduler: handle,
            db,
            start_time: Instant::now(),
        })
    }

    fn request(method: &str, params: serde_json::Value) -> Request {
        Request::new(method).with_params(params)
    }

    #[tokio::test]
    async fn set_keywords_updates_and_persists() {
        let state = server_state().await;

        let response = handle_request(
            request(
                methods::WATCH_SET_KEYWORDS,
                serde_json::json!({"keywords": ["acme", "merger"]}),
            ),
            &state,
        )
        .await;

        assert!(response.is_success());
        assert_eq!(state.watch_store.keywords(), vec!["acme", "merger"]);

        let persisted = KeywordRepository::new(&state.db).load().await.unwrap();
        assert_eq!(persisted, vec!["acme", "merger"]);
    }

    #[tokio::test]
    async fn invalid_keywords_surface_validation_and_change_nothing() {
        let state = server_state().await;

        let response = handle_request(
            request(methods::WATCH_SET_KEYWORDS, serde_json::json!({"keywords": []})),
            &state,
        )
        .await;

        assert_eq!(response.error.unwrap().code, ERR_INVALID_PARAMS);
        assert_eq!(state.watch_store.keywords(), vec!["stocks"]);
    }

    #[tokio::test]
    async fn invalid_interval_surfaces_validation_and_changes_nothing() {
        let state = server_state().await;

        for secs in [0, -5] {
            let response = handle_request(
                request(methods::WATCH_SET_INTERVAL, serde_json::json!({"secs": secs})),
                &state,
            )
            .await;
            assert_eq!(response.error.unwrap().code, ERR_INVALID_PARAMS);
        }

        assert_eq!(state.watch_store.refresh_interval_secs(), 300);
    }

    #[tokio::test]
    async fn watch_get_reflects_edits() {
        let state = server_state().await;

        handle_request(
            request(methods::WATCH_SET_PROMPT, serde_json::json!({"prompt": "Be terse."})),
            &state,
        )
        .await;

        let response = handle_request(request(methods::WATCH_GET, serde_json::Value::Null), &state)
            .await;
        let settings: WatchSettingsResponse =
            serde_json::from_value(response.result.unwrap()).unwrap();

        assert_eq!(settings.prompt, "Be terse.");
        assert_eq!(settings.keywords, vec!["stocks"]);
        assert_eq!(settings.refresh_interval_secs, 300);
    }

    #[tokio::test]
    async fn unknown_method_is_rejected() {
        let state = server_state().await;

        let response =
            handle_request(request("watch.unknown", serde_json::Value::Null), &state).await;
        assert_eq!(response.error.unwrap().code, ERR_METHOD_NOT_FOUND);
    }
}

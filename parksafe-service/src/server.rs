use crate::config::Config;
use crate::handler::RequestHandler;
use crate::routes::{handle_request, AppState, SharedState};
use anyhow::Context;
use hyper::body::Incoming;
use hyper::header::HeaderValue;
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper::Request;
use hyper_util::rt::TokioIo;
use parksafe_core::RiskScorer;
use parksafe_metrics::ScoringMetrics;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::watch;
use tokio::task::JoinSet;
use tracing::{error, info, warn};

pub const ACCEPT_BACKOFF_MIN: Duration = Duration::from_millis(100);
pub const ACCEPT_BACKOFF_MAX: Duration = Duration::from_secs(1);

impl AppState {
    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        let allow_origin = HeaderValue::from_str(&config.allow_origin)
            .with_context(|| format!("invalid allow-origin value: {}", config.allow_origin))?;
        let metrics = ScoringMetrics::new().context("failed to register metrics")?;
        Ok(Self {
            handler: RequestHandler::new(RiskScorer::new(), metrics),
            allow_origin,
            max_body_bytes: config.max_body_bytes,
        })
    }
}

/// Pause after a failed accept. Doubles up to `ACCEPT_BACKOFF_MAX` while
/// accepts keep failing, so descriptor exhaustion does not spin the loop.
#[derive(Debug, Default)]
pub struct AcceptBackoff {
    current: Option<Duration>,
}

impl AcceptBackoff {
    pub fn next_delay(&mut self) -> Duration {
        let next = match self.current {
            None => ACCEPT_BACKOFF_MIN,
            Some(prev) => (prev * 2).min(ACCEPT_BACKOFF_MAX),
        };
        self.current = Some(next);
        next
    }

    pub fn reset(&mut self) {
        self.current = None;
    }
}

/// Serves until Ctrl-C, then drains open connections for up to `grace`.
pub async fn serve(
    listener: TcpListener,
    state: SharedState,
    grace: Duration,
) -> anyhow::Result<()> {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "cannot listen for Ctrl-C, running until killed");
            std::future::pending::<()>().await;
        }
    };
    serve_until(listener, state, grace, ctrl_c).await
}

/// Accept loop, one task per connection, stopped by `shutdown`.
///
/// On shutdown every connection is told to finish its current request and
/// close. Connections still open after `grace` are aborted.
pub async fn serve_until<F>(
    listener: TcpListener,
    state: SharedState,
    grace: Duration,
    shutdown: F,
) -> anyhow::Result<()>
where
    F: Future<Output = ()>,
{
    tokio::pin!(shutdown);
    let (closing_tx, closing_rx) = watch::channel(false);
    let mut connections = JoinSet::new();
    let mut backoff = AcceptBackoff::default();

    loop {
        tokio::select! {
            _ = &mut shutdown => {
                info!(open_connections = connections.len(), "shutdown signal received");
                break;
            }
            accepted = listener.accept() => match accepted {
                Ok((stream, peer)) => {
                    backoff.reset();
                    let state = Arc::clone(&state);
                    let mut closing = closing_rx.clone();
                    connections.spawn(async move {
                        let io = TokioIo::new(stream);
                        let service = service_fn(move |req: Request<Incoming>| {
                            handle_request(Arc::clone(&state), req)
                        });
                        let conn = http1::Builder::new().serve_connection(io, service);
                        tokio::pin!(conn);
                        let outcome = tokio::select! {
                            res = conn.as_mut() => res,
                            _ = closing.changed() => {
                                conn.as_mut().graceful_shutdown();
                                conn.await
                            }
                        };
                        if let Err(e) = outcome {
                            error!(%peer, error = %e, "connection error");
                        }
                    });
                }
                Err(e) => {
                    let delay = backoff.next_delay();
                    warn!(error = %e, retry_in_ms = delay.as_millis() as u64, "accept failed");
                    tokio::time::sleep(delay).await;
                }
            },
            Some(_) = connections.join_next(), if !connections.is_empty() => {}
        }
    }

    drop(listener);
    closing_tx.send_replace(true);
    drain(connections, grace).await;
    info!("server stopped");
    Ok(())
}

async fn drain(mut connections: JoinSet<()>, grace: Duration) {
    let finished = tokio::time::timeout(grace, async {
        while connections.join_next().await.is_some() {}
    })
    .await;
    if finished.is_err() {
        warn!(
            remaining = connections.len(),
            "connections still open after grace period, aborting"
        );
        connections.abort_all();
    }
}

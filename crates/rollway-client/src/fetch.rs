// fetch.rs -- background addon downloads
//
// Addon archives and screenshots come over HTTP while the menus stay
// responsive: requests go to a worker thread running a small tokio
// runtime, and the main loop polls for progress/completion between
// frames. Nothing here blocks the frame.

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use futures_util::StreamExt;
use log::warn;
use tokio::io::AsyncWriteExt;
use tokio::sync::mpsc;

/// Timeout for establishing a connection (seconds).
const CONNECT_TIMEOUT_SECS: u64 = 30;

/// Timeout for a stalled read (seconds).
const READ_TIMEOUT_SECS: u64 = 60;

pub type FetchId = u64;

#[derive(Debug, Clone)]
pub struct FetchRequest {
    pub url: String,
    pub dest: PathBuf,
    pub id: FetchId,
}

#[derive(Debug, Clone)]
pub struct FetchProgress {
    pub bytes: u64,
    pub total: Option<u64>,
}

#[derive(Debug, Clone)]
pub enum FetchStatus {
    InProgress(FetchProgress),
    Done,
    NotFound,
    Cancelled,
    Error(String),
}

/// Queue of in-flight downloads. Dropping the manager cancels
/// everything.
pub struct FetchManager {
    request_tx: mpsc::UnboundedSender<FetchRequest>,
    status_rx: mpsc::UnboundedReceiver<(FetchId, FetchStatus)>,
    cancel: Arc<AtomicBool>,
    next_id: AtomicU64,
    worker: Option<thread::JoinHandle<()>>,
}

impl FetchManager {
    pub fn new() -> Self {
        let (request_tx, request_rx) = mpsc::unbounded_channel::<FetchRequest>();
        let (status_tx, status_rx) = mpsc::unbounded_channel::<(FetchId, FetchStatus)>();
        let cancel = Arc::new(AtomicBool::new(false));

        let cancel_worker = Arc::clone(&cancel);
        let worker = thread::spawn(move || {
            let rt = match tokio::runtime::Builder::new_multi_thread()
                .worker_threads(2)
                .enable_all()
                .build()
            {
                Ok(rt) => rt,
                Err(e) => {
                    warn!("fetch: no runtime: {e}");
                    return;
                }
            };

            rt.block_on(run_worker(request_rx, status_tx, cancel_worker));
        });

        Self {
            request_tx,
            status_rx,
            cancel,
            next_id: AtomicU64::new(1),
            worker: Some(worker),
        }
    }

    /// Queue a download. Returns the id progress reports will carry.
    pub fn enqueue(&self, url: &str, dest: PathBuf) -> FetchId {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let request = FetchRequest {
            url: url.to_string(),
            dest,
            id,
        };
        if self.request_tx.send(request).is_err() {
            warn!("fetch: worker gone, dropping {url}");
        }
        id
    }

    /// Drain pending status updates; called once per frame.
    pub fn poll(&mut self) -> Vec<(FetchId, FetchStatus)> {
        let mut out = Vec::new();
        while let Ok(update) = self.status_rx.try_recv() {
            out.push(update);
        }
        out
    }

    pub fn cancel_all(&self) {
        self.cancel.store(true, Ordering::Relaxed);
    }
}

impl Default for FetchManager {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for FetchManager {
    fn drop(&mut self) {
        self.cancel_all();
        // Closing the request channel lets the worker run down.
        let (tx, _rx) = mpsc::unbounded_channel();
        let _ = std::mem::replace(&mut self.request_tx, tx);
        if let Some(worker) = self.worker.take() {
            let _ = worker.join();
        }
    }
}

async fn run_worker(
    mut request_rx: mpsc::UnboundedReceiver<FetchRequest>,
    status_tx: mpsc::UnboundedSender<(FetchId, FetchStatus)>,
    cancel: Arc<AtomicBool>,
) {
    let client = match reqwest::Client::builder()
        .connect_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECS))
        .read_timeout(Duration::from_secs(READ_TIMEOUT_SECS))
        .build()
    {
        Ok(c) => c,
        Err(e) => {
            warn!("fetch: no http client: {e}");
            return;
        }
    };

    while let Some(request) = request_rx.recv().await {
        if cancel.load(Ordering::Relaxed) {
            let _ = status_tx.send((request.id, FetchStatus::Cancelled));
            continue;
        }

        let status = download_one(&client, &request, &status_tx, &cancel).await;
        let _ = status_tx.send((request.id, status));
    }
}

async fn download_one(
    client: &reqwest::Client,
    request: &FetchRequest,
    status_tx: &mpsc::UnboundedSender<(FetchId, FetchStatus)>,
    cancel: &AtomicBool,
) -> FetchStatus {
    let response = match client.get(&request.url).send().await {
        Ok(r) => r,
        Err(e) => return FetchStatus::Error(e.to_string()),
    };

    if response.status() == reqwest::StatusCode::NOT_FOUND {
        return FetchStatus::NotFound;
    }
    if let Err(e) = response.error_for_status_ref() {
        return FetchStatus::Error(e.to_string());
    }

    let total = response.content_length();

    // Stream into a sibling temp file, move into place when complete.
    let part = request.dest.with_extension("part");
    if let Some(parent) = part.parent() {
        if let Err(e) = tokio::fs::create_dir_all(parent).await {
            return FetchStatus::Error(e.to_string());
        }
    }
    let mut file = match tokio::fs::File::create(&part).await {
        Ok(f) => f,
        Err(e) => return FetchStatus::Error(e.to_string()),
    };

    let mut bytes: u64 = 0;
    let mut stream = response.bytes_stream();

    while let Some(chunk) = stream.next().await {
        if cancel.load(Ordering::Relaxed) {
            let _ = tokio::fs::remove_file(&part).await;
            return FetchStatus::Cancelled;
        }

        let chunk = match chunk {
            Ok(c) => c,
            Err(e) => {
                let _ = tokio::fs::remove_file(&part).await;
                return FetchStatus::Error(e.to_string());
            }
        };

        if let Err(e) = file.write_all(&chunk).await {
            let _ = tokio::fs::remove_file(&part).await;
            return FetchStatus::Error(e.to_string());
        }

        bytes += chunk.len() as u64;
        let _ = status_tx.send((
            request.id,
            FetchStatus::InProgress(FetchProgress { bytes, total }),
        ));
    }

    if let Err(e) = file.flush().await {
        return FetchStatus::Error(e.to_string());
    }
    drop(file);

    match tokio::fs::rename(&part, &request.dest).await {
        Ok(()) => FetchStatus::Done,
        Err(e) => FetchStatus::Error(e.to_string()),
    }
}

// ============================================================
// Tests
// ============================================================

#[cfg(test)]
mod tests {
    use super::*;

    // Network-free checks: queueing ids and cancellation bookkeeping.

    #[test]
    fn ids_are_unique_and_increasing() {
        let mgr = FetchManager::new();
        let dir = tempfile::tempdir().unwrap();
        let a = mgr.enqueue("http://127.0.0.1:9/none", dir.path().join("a"));
        let b = mgr.enqueue("http://127.0.0.1:9/none", dir.path().join("b"));
        assert!(b > a);
    }

    #[test]
    fn unreachable_host_reports_error() {
        let mut mgr = FetchManager::new();
        let dir = tempfile::tempdir().unwrap();
        // Port 9 (discard) is not listening; connection is refused fast.
        let id = mgr.enqueue("http://127.0.0.1:9/file.zip", dir.path().join("f.zip"));

        let deadline = std::time::Instant::now() + Duration::from_secs(30);
        loop {
            for (got, status) in mgr.poll() {
                if got == id {
                    match status {
                        FetchStatus::Error(_) => return,
                        FetchStatus::InProgress(_) => {}
                        other => panic!("unexpected status: {other:?}"),
                    }
                }
            }
            assert!(std::time::Instant::now() < deadline, "no status update");
            std::thread::sleep(Duration::from_millis(20));
        }
    }
}

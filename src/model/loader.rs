//! Non-blocking model loading.
//!
//! [`ModelLoader::load`] hands the fetch and decode to a background thread
//! and returns at once. Results come back as [`LoadEvent`]s over a channel
//! that the owner drains with [`ModelLoader::poll`], once per frame, on its
//! own thread. The worker never touches session state.
//!
//! Cancellation is a shared [`CancelToken`]. The worker checks it before
//! sending anything; `poll` checks it again before handing a model out, and
//! `cancel` drops the receiving end so nothing sent late is ever read.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc;
use std::sync::Arc;
use std::time::Duration;

use web_time::Instant;

use super::gltf::parse_model;
use super::source::AssetSource;
use super::ModelAsset;
use crate::error::GlobeError;

/// Where a loader is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadState {
    /// Nothing requested yet.
    Idle,
    /// A fetch is in flight.
    Pending,
    /// The model was handed out by [`ModelLoader::poll`].
    Loaded,
    /// The fetch or decode failed, timed out, or was cancelled.
    Failed,
}

/// Shared liveness flag between a loader and its worker.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    /// A live token.
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark the load as abandoned.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::Release);
    }

    /// Whether [`cancel`](Self::cancel) has been called.
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

/// Messages from the worker thread.
#[derive(Debug)]
pub enum LoadEvent {
    /// Bytes received so far.
    Progress {
        /// Bytes loaded.
        loaded: u64,
        /// Total bytes, when known.
        total: Option<u64>,
    },
    /// Decoded model.
    Loaded(Box<ModelAsset>),
    /// Fetch or decode failure.
    Failed(GlobeError),
}

/// Terminal result surfaced by [`ModelLoader::poll`].
#[derive(Debug)]
pub enum LoadOutcome {
    /// The model is ready to attach.
    Loaded(Box<ModelAsset>),
    /// The load failed; the loader is now [`LoadState::Failed`].
    Failed(GlobeError),
}

/// `round(loaded / total * 100)`, or `None` when the total is unknown or
/// zero.
pub fn progress_percent(loaded: u64, total: Option<u64>) -> Option<u32> {
    let total = total.filter(|&t| t > 0)?;
    Some(((loaded as f64 / total as f64) * 100.0).round() as u32)
}

/// Single-shot background model loader.
pub struct ModelLoader {
    state: LoadState,
    token: CancelToken,
    receiver: Option<mpsc::Receiver<LoadEvent>>,
    path: Option<String>,
    started: Option<Instant>,
    timeout: Option<Duration>,
    last_percent: Option<u32>,
}

impl Default for ModelLoader {
    fn default() -> Self {
        Self::new(None)
    }
}

impl ModelLoader {
    /// Idle loader. With a `timeout`, a load still pending after that long
    /// fails with [`GlobeError::LoadTimedOut`].
    pub fn new(timeout: Option<Duration>) -> Self {
        Self {
            state: LoadState::Idle,
            token: CancelToken::new(),
            receiver: None,
            path: None,
            started: None,
            timeout,
            last_percent: None,
        }
    }

    /// Current state.
    pub fn state(&self) -> LoadState {
        self.state
    }

    /// Path of the current or last load.
    pub fn path(&self) -> Option<&str> {
        self.path.as_deref()
    }

    /// Whether this loader's results may still be used.
    pub fn is_live(&self) -> bool {
        !self.token.is_cancelled()
    }

    /// A clone of the cancellation token.
    pub fn token(&self) -> CancelToken {
        self.token.clone()
    }

    /// Start fetching `path` from `source` on a background thread.
    ///
    /// Returns immediately; drain results with [`poll`](Self::poll).
    ///
    /// # Errors
    ///
    /// [`GlobeError::LoadInFlight`] if a load is already pending, or
    /// [`GlobeError::ThreadSpawn`] if the worker cannot be started.
    pub fn load(
        &mut self,
        path: &str,
        source: Arc<dyn AssetSource>,
        now: Instant,
    ) -> Result<(), GlobeError> {
        if self.state == LoadState::Pending {
            return Err(GlobeError::LoadInFlight);
        }

        // A fresh token per load: an earlier cancelled load must not leak
        // its flag into this one.
        let token = CancelToken::new();
        let (sender, receiver) = mpsc::channel();
        let worker_token = token.clone();
        let worker_path = path.to_owned();

        let _ = std::thread::Builder::new()
            .name("model-loader".into())
            .spawn(move || {
                fetch_and_decode(
                    &worker_path,
                    source.as_ref(),
                    &worker_token,
                    &sender,
                );
            })
            .map_err(GlobeError::ThreadSpawn)?;

        log::info!("Loading model from {path}");
        self.state = LoadState::Pending;
        self.token = token;
        self.receiver = Some(receiver);
        self.path = Some(path.to_owned());
        self.started = Some(now);
        self.last_percent = None;
        Ok(())
    }

    /// Drain pending worker messages. Logs progress; returns the terminal
    /// outcome once, when it arrives.
    pub fn poll(&mut self, now: Instant) -> Option<LoadOutcome> {
        if self.state != LoadState::Pending {
            return None;
        }

        loop {
            let event = match self.receiver.as_ref()?.try_recv() {
                Ok(event) => event,
                Err(mpsc::TryRecvError::Empty) => break,
                Err(mpsc::TryRecvError::Disconnected) => {
                    // Worker exited without a result (cancelled or panicked).
                    self.finish(LoadState::Failed);
                    return Some(LoadOutcome::Failed(GlobeError::AssetFetch {
                        path: self.path.clone().unwrap_or_default(),
                        message: "loader thread exited without a result"
                            .to_owned(),
                    }));
                }
            };
            match event {
                LoadEvent::Progress { loaded, total } => {
                    self.log_progress(loaded, total);
                }
                LoadEvent::Loaded(asset) => {
                    if !self.is_live() {
                        self.finish(LoadState::Failed);
                        return None;
                    }
                    self.finish(LoadState::Loaded);
                    return Some(LoadOutcome::Loaded(asset));
                }
                LoadEvent::Failed(err) => {
                    self.finish(LoadState::Failed);
                    return Some(LoadOutcome::Failed(err));
                }
            }
        }

        if let (Some(timeout), Some(started)) = (self.timeout, self.started) {
            if now.saturating_duration_since(started) >= timeout {
                self.cancel();
                return Some(LoadOutcome::Failed(GlobeError::LoadTimedOut(
                    timeout,
                )));
            }
        }
        None
    }

    /// Abandon any in-flight load. Late worker results are discarded.
    /// Idempotent.
    pub fn cancel(&mut self) {
        self.token.cancel();
        if self.state == LoadState::Pending {
            log::debug!(
                "Cancelled model load for {}",
                self.path.as_deref().unwrap_or("<unknown>")
            );
            self.finish(LoadState::Failed);
        }
        self.receiver = None;
    }

    fn finish(&mut self, state: LoadState) {
        self.state = state;
        self.receiver = None;
        self.started = None;
    }

    fn log_progress(&mut self, loaded: u64, total: Option<u64>) {
        match progress_percent(loaded, total) {
            Some(percent) if self.last_percent != Some(percent) => {
                self.last_percent = Some(percent);
                log::info!("Model loading: {percent}%");
            }
            Some(_) => {}
            None => log::debug!("Model loading: {loaded} bytes"),
        }
    }
}

fn fetch_and_decode(
    path: &str,
    source: &dyn AssetSource,
    token: &CancelToken,
    sender: &mpsc::Sender<LoadEvent>,
) {
    let mut report = |loaded: u64, total: Option<u64>| {
        if !token.is_cancelled() {
            let _ = sender.send(LoadEvent::Progress { loaded, total });
        }
    };
    let result = source
        .fetch(path, &mut report)
        .and_then(|bytes| parse_model(path, &bytes, source));

    if token.is_cancelled() {
        log::debug!("Dropping late model result for {path}");
        return;
    }
    let event = match result {
        Ok(asset) => LoadEvent::Loaded(Box::new(asset)),
        Err(err) => LoadEvent::Failed(err),
    };
    let _ = sender.send(event);
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::testing::{GatedSource, TWO_CLIP_GLTF};

    fn wait_for(
        loader: &mut ModelLoader,
        now: Instant,
    ) -> Option<LoadOutcome> {
        for _ in 0..500 {
            if let Some(outcome) = loader.poll(now) {
                return Some(outcome);
            }
            std::thread::sleep(Duration::from_millis(2));
        }
        None
    }

    #[test]
    fn percent_rounds_and_needs_a_total() {
        assert_eq!(progress_percent(1, Some(3)), Some(33));
        assert_eq!(progress_percent(2, Some(3)), Some(67));
        assert_eq!(progress_percent(10, Some(10)), Some(100));
        assert_eq!(progress_percent(10, None), None);
        assert_eq!(progress_percent(10, Some(0)), None);
    }

    #[test]
    fn load_stays_pending_until_source_releases() {
        let source = GatedSource::new(TWO_CLIP_GLTF.as_bytes().to_vec());
        let mut loader = ModelLoader::default();
        let now = Instant::now();
        loader.load("scene.gltf", Arc::new(source.clone()), now).unwrap();
        assert_eq!(loader.state(), LoadState::Pending);
        assert!(loader.poll(now).is_none());
        assert_eq!(loader.state(), LoadState::Pending);

        source.release();
        match wait_for(&mut loader, now) {
            Some(LoadOutcome::Loaded(asset)) => assert_eq!(asset.clips.len(), 2),
            other => panic!("expected a loaded model, got {other:?}"),
        }
        assert_eq!(loader.state(), LoadState::Loaded);
        assert!(loader.poll(now).is_none());
    }

    #[test]
    fn second_load_while_pending_is_rejected() {
        let source = GatedSource::new(Vec::new());
        let mut loader = ModelLoader::default();
        let now = Instant::now();
        loader.load("a.gltf", Arc::new(source.clone()), now).unwrap();
        let err = loader
            .load("b.gltf", Arc::new(source.clone()), now)
            .unwrap_err();
        assert!(matches!(err, GlobeError::LoadInFlight));
        assert_eq!(loader.path(), Some("a.gltf"));
        source.release();
    }

    #[test]
    fn parse_failure_moves_to_failed() {
        let source = GatedSource::new(b"definitely not gltf".to_vec());
        source.release();
        let mut loader = ModelLoader::default();
        let now = Instant::now();
        loader.load("scene.gltf", Arc::new(source), now).unwrap();
        match wait_for(&mut loader, now) {
            Some(LoadOutcome::Failed(GlobeError::ModelParse(_))) => {}
            other => panic!("expected a parse failure, got {other:?}"),
        }
        assert_eq!(loader.state(), LoadState::Failed);
    }

    #[test]
    fn cancelled_load_never_delivers() {
        let source = GatedSource::new(TWO_CLIP_GLTF.as_bytes().to_vec());
        let mut loader = ModelLoader::default();
        let now = Instant::now();
        loader.load("scene.gltf", Arc::new(source.clone()), now).unwrap();
        let token = loader.token();
        loader.cancel();
        loader.cancel();
        assert!(token.is_cancelled());
        assert_eq!(loader.state(), LoadState::Failed);

        source.release();
        source.wait_until_served();
        assert!(loader.poll(now).is_none());
    }

    #[test]
    fn pending_load_times_out() {
        let source = GatedSource::new(TWO_CLIP_GLTF.as_bytes().to_vec());
        let mut loader = ModelLoader::new(Some(Duration::from_secs(5)));
        let start = Instant::now();
        loader.load("scene.gltf", Arc::new(source.clone()), start).unwrap();

        assert!(loader.poll(start + Duration::from_secs(4)).is_none());
        match loader.poll(start + Duration::from_secs(5)) {
            Some(LoadOutcome::Failed(GlobeError::LoadTimedOut(after))) => {
                assert_eq!(after, Duration::from_secs(5));
            }
            other => panic!("expected a timeout, got {other:?}"),
        }
        assert_eq!(loader.state(), LoadState::Failed);
        assert!(!loader.is_live());

        // The late result is discarded.
        source.release();
        source.wait_until_served();
        assert!(loader.poll(start + Duration::from_secs(6)).is_none());
    }

    #[test]
    fn loader_can_retry_after_failure() {
        let bad = GatedSource::new(b"nope".to_vec());
        bad.release();
        let mut loader = ModelLoader::default();
        let now = Instant::now();
        loader.load("scene.gltf", Arc::new(bad), now).unwrap();
        let _ = wait_for(&mut loader, now);
        assert_eq!(loader.state(), LoadState::Failed);

        let good = GatedSource::new(TWO_CLIP_GLTF.as_bytes().to_vec());
        good.release();
        loader.load("scene.gltf", Arc::new(good), now).unwrap();
        assert!(loader.is_live());
        assert!(matches!(
            wait_for(&mut loader, now),
            Some(LoadOutcome::Loaded(_))
        ));
    }
}

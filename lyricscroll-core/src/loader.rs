//! Asynchronous lyric loading with stale-result rejection.
//!
//! Every request mints a fresh [`LoadToken`]. Work runs on the tokio runtime and
//! reports back over a channel; the owner drains completions on its own thread
//! and only the completion carrying the current token is ever applied.

use crate::error::{CoreError, Result};
use crate::source::{ContentFetcher, LyricSource};
use crate::track::LyricLine;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::runtime::Handle;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};
use url::Url;

const LOG_TARGET: &str = "lyricscroll::loader";

/// Identity of one load request. Two requests for identical content still get
/// distinct tokens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LoadToken(u64);

impl LoadToken {
    #[must_use]
    pub const fn sequence(self) -> u64 {
        self.0
    }
}

/// Result of a dispatched load, posted back to the owner
#[derive(Debug)]
pub struct LoadCompletion {
    pub token: LoadToken,
    pub result: Result<Vec<LyricLine>>,
}

/// What the owner should do with a drained completion
#[derive(Debug)]
pub enum LoadOutcome {
    /// The current request finished; replace the track with these lines
    Applied(Vec<LyricLine>),
    /// The current request failed; the track stays empty
    Failed(CoreError),
    /// A newer request (or a shutdown) superseded this one
    Superseded,
}

/// Dispatches parse/fetch work and decides which results are still relevant.
pub struct LoadCoordinator {
    runtime: Handle,
    source: Arc<dyn LyricSource>,
    fetcher: Option<Arc<dyn ContentFetcher>>,
    default_charset: String,
    next_sequence: u64,
    current: Option<LoadToken>,
    tx: mpsc::UnboundedSender<LoadCompletion>,
    rx: mpsc::UnboundedReceiver<LoadCompletion>,
    cancel_token: CancellationToken,
}

impl LoadCoordinator {
    /// Create a coordinator spawning onto `runtime` and parsing with `source`
    #[must_use]
    pub fn new(runtime: Handle, source: Arc<dyn LyricSource>) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            runtime,
            source,
            fetcher: None,
            default_charset: "utf-8".to_string(),
            next_sequence: 0,
            current: None,
            tx,
            rx,
            cancel_token: CancellationToken::new(),
        }
    }

    /// Attach the fetcher used by [`Self::load_url`]
    #[must_use]
    pub fn with_fetcher(mut self, fetcher: Arc<dyn ContentFetcher>) -> Self {
        self.fetcher = Some(fetcher);
        self
    }

    /// Charset used by [`Self::load_url`] when the caller passes none
    #[must_use]
    pub fn with_default_charset(mut self, charset: impl Into<String>) -> Self {
        self.default_charset = charset.into();
        self
    }

    /// Token of the request whose result is still wanted
    #[must_use]
    pub const fn current_token(&self) -> Option<LoadToken> {
        self.current
    }

    #[must_use]
    pub const fn is_loading(&self) -> bool {
        self.current.is_some()
    }

    /// Parse already-available text
    pub fn load_text(&mut self, main: String, secondary: Option<String>) -> LoadToken {
        let token = self.issue();
        let source = Arc::clone(&self.source);
        self.dispatch(token, async move { source.parse(&main, secondary.as_deref()) });
        token
    }

    /// Read one or two lyric files and parse them together.
    ///
    /// An unreadable secondary file only drops the translation.
    pub fn load_files(&mut self, main: PathBuf, secondary: Option<PathBuf>) -> LoadToken {
        let token = self.issue();
        let source = Arc::clone(&self.source);
        self.dispatch(token, async move {
            let main_text = tokio::fs::read_to_string(&main).await?;
            let secondary_text = match secondary {
                Some(path) => match tokio::fs::read_to_string(&path).await {
                    Ok(text) => Some(text),
                    Err(e) => {
                        warn!(target: LOG_TARGET, "Ignoring secondary lyrics {}: {e}", path.display());
                        None
                    }
                },
                None => None,
            };
            source.parse(&main_text, secondary_text.as_deref())
        });
        token
    }

    /// Fetch `url` with `charset` (or the default) and parse the body
    pub fn load_url(&mut self, url: &str, charset: Option<&str>) -> LoadToken {
        let token = self.issue();

        let parsed = match Url::parse(url) {
            Ok(parsed) if matches!(parsed.scheme(), "http" | "https") => parsed,
            Ok(parsed) => {
                self.complete(
                    token,
                    Err(CoreError::InvalidUrl {
                        url: url.to_string(),
                        reason: format!("unsupported scheme {:?}", parsed.scheme()),
                    }),
                );
                return token;
            }
            Err(e) => {
                self.complete(
                    token,
                    Err(CoreError::InvalidUrl {
                        url: url.to_string(),
                        reason: e.to_string(),
                    }),
                );
                return token;
            }
        };

        let Some(fetcher) = self.fetcher.clone() else {
            self.complete(
                token,
                Err(CoreError::Fetch {
                    url: url.to_string(),
                    reason: "no content fetcher configured".to_string(),
                }),
            );
            return token;
        };

        let charset = charset.unwrap_or(&self.default_charset).to_string();
        let source = Arc::clone(&self.source);
        debug!(target: LOG_TARGET, "Fetching {parsed} via {} ({charset})", fetcher.name());
        self.dispatch(token, async move {
            let text = fetcher.fetch(parsed.as_str(), &charset).await?;
            source.parse(&text, None)
        });
        token
    }

    /// Drain one completion without waiting
    pub fn try_next(&mut self) -> Option<LoadCompletion> {
        self.rx.try_recv().ok()
    }

    /// Wait for the next completion
    pub async fn next(&mut self) -> Option<LoadCompletion> {
        self.rx.recv().await
    }

    /// Decide the fate of a completion by token identity
    pub fn accept(&mut self, completion: LoadCompletion) -> LoadOutcome {
        if self.current != Some(completion.token) {
            debug!(
                target: LOG_TARGET,
                "Discarding stale load #{} (current: {:?})",
                completion.token.0,
                self.current.map(LoadToken::sequence)
            );
            return LoadOutcome::Superseded;
        }

        self.current = None;
        match completion.result {
            Ok(lines) => LoadOutcome::Applied(lines),
            Err(e) => {
                warn!(target: LOG_TARGET, "Load #{} failed: {e}", completion.token.0);
                LoadOutcome::Failed(e)
            }
        }
    }

    /// Forget the current request so nothing in flight can apply
    pub fn invalidate(&mut self) {
        self.current = None;
    }

    /// Abort every in-flight task. The coordinator stays usable for new loads.
    pub fn shutdown(&mut self) {
        self.cancel_token.cancel();
        self.cancel_token = CancellationToken::new();
        self.current = None;
    }

    fn issue(&mut self) -> LoadToken {
        self.next_sequence += 1;
        let token = LoadToken(self.next_sequence);
        self.current = Some(token);
        debug!(target: LOG_TARGET, "Issued load #{}", token.0);
        token
    }

    fn complete(&self, token: LoadToken, result: Result<Vec<LyricLine>>) {
        // The receiver lives in `self`, so this only fails during drop
        let _ = self.tx.send(LoadCompletion { token, result });
    }

    fn dispatch<F>(&self, token: LoadToken, work: F)
    where
        F: std::future::Future<Output = Result<Vec<LyricLine>>> + Send + 'static,
    {
        let tx = self.tx.clone();
        let cancel_token = self.cancel_token.clone();
        // Run the work in its own task so a panic still reports back
        let task = self.runtime.spawn(work);
        let abort = task.abort_handle();
        self.runtime.spawn(async move {
            let result = tokio::select! {
                () = cancel_token.cancelled() => {
                    abort.abort();
                    Err(CoreError::LoadCancelled)
                }
                joined = task => joined.unwrap_or_else(|e| {
                    warn!(target: LOG_TARGET, "Load #{} task failed: {e}", token.0);
                    Err(CoreError::LoadTask {
                        reason: e.to_string(),
                    })
                }),
            };
            let _ = tx.send(LoadCompletion { token, result });
        });
    }
}

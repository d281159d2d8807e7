use std::sync::Arc;
use swapdesk_types::{SwapFailure, SwapResult, SwapStatus};
use tokio::sync::watch;
use tokio::task::AbortHandle;

/// The caller's view of one swap.
///
/// Every clone observes the same [`SwapResult`]; the confirmation task
/// updates it in place once the chain answers. The status only ever moves
/// from `Pending` to `Confirmed` or `Failed`.
#[derive(Clone)]
pub struct SwapHandle {
    state: Arc<watch::Sender<SwapResult>>,
    tracker: Option<AbortHandle>,
}

impl std::fmt::Debug for SwapHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SwapHandle")
            .field("result", &*self.state.borrow())
            .field("has_confirmation_task", &self.tracker.is_some())
            .finish()
    }
}

impl SwapHandle {
    /// A handle whose result is already final; nothing will change it.
    pub(crate) fn settled(result: SwapResult) -> Self {
        let (state, _) = watch::channel(result);
        Self {
            state: Arc::new(state),
            tracker: None,
        }
    }

    /// A pending handle plus the writer the confirmation task settles it with.
    pub(crate) fn pending(result: SwapResult) -> (Self, ResultWriter) {
        let (state, _) = watch::channel(result);
        let state = Arc::new(state);
        let writer = ResultWriter(Arc::clone(&state));
        (Self { state, tracker: None }, writer)
    }

    pub(crate) fn attach_tracker(&mut self, tracker: AbortHandle) {
        self.tracker = Some(tracker);
    }

    pub fn snapshot(&self) -> SwapResult {
        self.state.borrow().clone()
    }

    pub fn status(&self) -> SwapStatus {
        self.state.borrow().status
    }

    pub fn signature(&self) -> String {
        self.state.borrow().signature.clone()
    }

    pub fn is_terminal(&self) -> bool {
        self.status().is_terminal()
    }

    /// Receiver notified on every change of the result.
    pub fn subscribe(&self) -> watch::Receiver<SwapResult> {
        self.state.subscribe()
    }

    /// Whether a background confirmation task was started for this swap.
    pub fn has_confirmation_task(&self) -> bool {
        self.tracker.is_some()
    }

    /// Stops watching for confirmation. The transaction itself is already on
    /// its way and cannot be recalled; the result stays `Pending`.
    pub fn stop_tracking(&self) {
        if let Some(tracker) = &self.tracker {
            tracker.abort();
        }
    }

    /// Resolves once the result is `Confirmed` or `Failed`.
    ///
    /// Never resolves for a handle whose tracking was stopped while pending.
    pub async fn wait_for_terminal(&self) -> SwapResult {
        let mut rx = self.state.subscribe();
        let settled = rx
            .wait_for(|result| result.status.is_terminal())
            .await
            .map(|result| (*result).clone());
        settled.unwrap_or_else(|_| self.snapshot())
    }
}

/// Write side held by the confirmation task.
#[derive(Clone)]
pub(crate) struct ResultWriter(Arc<watch::Sender<SwapResult>>);

impl ResultWriter {
    pub(crate) fn confirm(&self) -> bool {
        self.settle(SwapStatus::Confirmed, None)
    }

    pub(crate) fn fail(&self, failure: SwapFailure) -> bool {
        self.settle(SwapStatus::Failed, Some(failure))
    }

    fn settle(&self, status: SwapStatus, error: Option<SwapFailure>) -> bool {
        self.0.send_if_modified(move |result| {
            if result.status.is_terminal() {
                return false;
            }
            result.status = status;
            result.error = error;
            true
        })
    }
}

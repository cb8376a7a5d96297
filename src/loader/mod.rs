//! Render capability acquisition
//!
//! The render capability lives in a write-once [`CapabilityHandle`]. It is
//! filled by whichever acquisition [`Channel`] succeeds first: the primary
//! channel declared at startup, or the single fallback channel the
//! [`CapabilityResolver`] injects when the primary is slow or fails.

mod resolver;
pub mod source;

pub use resolver::{CapabilityResolver, FALLBACK_DELAY};
pub use source::{CapabilitySource, DisabledSource, NativeSource, RemoteSource};

use crate::render::RenderBackend;
use std::fmt;
use std::sync::{Arc, OnceLock};
use tokio::sync::watch;
use tracing::{debug, info, warn};

/// Process-wide slot for the render capability. Once set it never changes.
#[derive(Default)]
pub struct CapabilityHandle {
    slot: OnceLock<Arc<dyn RenderBackend>>,
}

impl CapabilityHandle {
    /// Create an empty handle
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a capability has been installed
    pub fn is_present(&self) -> bool {
        self.slot.get().is_some()
    }

    /// The installed capability, if any
    pub fn get(&self) -> Option<Arc<dyn RenderBackend>> {
        self.slot.get().cloned()
    }

    /// Install `backend` unless something is already installed.
    ///
    /// Returns `false` when the slot was already taken; the first install wins.
    pub fn install(&self, backend: Arc<dyn RenderBackend>) -> bool {
        self.slot.set(backend).is_ok()
    }
}

impl fmt::Debug for CapabilityHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CapabilityHandle")
            .field("backend", &self.slot.get().map(|b| b.name().to_string()))
            .finish()
    }
}

/// Observable state of an acquisition channel
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChannelState {
    /// Nothing signalled yet
    Pending,
    /// The channel finished loading
    Loaded,
    /// The channel failed
    Failed(String),
}

impl ChannelState {
    /// Whether a terminal signal has been observed
    pub fn is_settled(&self) -> bool {
        !matches!(self, Self::Pending)
    }

    fn outcome(&self) -> Option<ChannelOutcome> {
        match self {
            Self::Pending => None,
            Self::Loaded => Some(ChannelOutcome::Loaded),
            Self::Failed(reason) => Some(ChannelOutcome::Failed(reason.clone())),
        }
    }
}

/// Terminal signal of a channel
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChannelOutcome {
    /// Success signal
    Loaded,
    /// Failure signal with reason
    Failed(String),
}

/// Producer side of a channel. Only the first signal is recorded.
#[derive(Debug)]
pub struct ChannelSignal {
    tx: watch::Sender<ChannelState>,
}

impl ChannelSignal {
    /// Signal success. Returns `false` if the channel had already settled.
    pub fn loaded(&self) -> bool {
        self.settle(ChannelState::Loaded)
    }

    /// Signal failure. Returns `false` if the channel had already settled.
    pub fn failed(&self, reason: impl Into<String>) -> bool {
        self.settle(ChannelState::Failed(reason.into()))
    }

    fn settle(&self, next: ChannelState) -> bool {
        self.tx.send_if_modified(|state| {
            if state.is_settled() {
                false
            } else {
                *state = next;
                true
            }
        })
    }
}

/// Consumer side of an acquisition attempt. Cheap to clone; all clones
/// observe the same underlying attempt.
#[derive(Debug, Clone)]
pub struct Channel {
    label: &'static str,
    state: watch::Receiver<ChannelState>,
}

impl Channel {
    /// A channel driven by an external party through the returned signal.
    ///
    /// Dropping the signal before settling counts as a failure.
    pub fn pending(label: &'static str) -> (ChannelSignal, Self) {
        let (tx, state) = watch::channel(ChannelState::Pending);
        (ChannelSignal { tx }, Self { label, state })
    }

    /// Start acquiring from `source` in a background task.
    ///
    /// On success the backend is installed into `handle` before `Loaded` is
    /// signalled. A result arriving after another channel already installed
    /// a capability is discarded. Must be called from within a Tokio runtime.
    pub fn spawn(
        label: &'static str,
        source: Arc<dyn CapabilitySource>,
        handle: Arc<CapabilityHandle>,
    ) -> Self {
        let (signal, channel) = Self::pending(label);

        tokio::spawn(async move {
            match source.acquire().await {
                Ok(backend) => {
                    let backend_name = backend.name().to_string();
                    if handle.install(backend) {
                        info!(
                            channel = label,
                            source = source.name(),
                            backend = %backend_name,
                            "Render capability installed"
                        );
                    } else {
                        debug!(
                            channel = label,
                            source = source.name(),
                            "Capability already present, discarding late result"
                        );
                    }
                    signal.loaded();
                }
                Err(err) => {
                    warn!(
                        channel = label,
                        source = source.name(),
                        error = %err,
                        "Capability acquisition failed"
                    );
                    signal.failed(err.to_string());
                }
            }
        });

        channel
    }

    /// Channel label used in logs
    pub fn label(&self) -> &'static str {
        self.label
    }

    /// Current state without waiting
    pub fn state(&self) -> ChannelState {
        self.state.borrow().clone()
    }

    /// Wait for the first terminal signal. Returns immediately if the
    /// channel has already settled.
    pub async fn settled(&self) -> ChannelOutcome {
        let mut rx = self.state.clone();
        let outcome = match rx.wait_for(ChannelState::is_settled).await {
            Ok(state) => state.outcome(),
            Err(_) => None,
        };
        outcome.unwrap_or_else(|| {
            ChannelOutcome::Failed(format!("{} channel closed without signalling", self.label))
        })
    }
}

use super::source::{fallback_source, primary_source};
use super::{CapabilityHandle, CapabilitySource, Channel, ChannelOutcome};
use crate::config::LoaderOptions;
use crate::error::Result;
use crate::render::RenderBackend;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, OnceLock};
use std::time::Duration;
use tokio::time::{self, Instant};
use tracing::{debug, info, trace, warn};

/// How long a resolution waits on the primary channel before injecting the fallback
pub const FALLBACK_DELAY: Duration = Duration::from_millis(1200);

/// Outcome of a fallback acquisition; logged, never surfaced to callers.
#[derive(Debug)]
enum FallbackOutcome {
    AlreadyPresent,
    Loaded,
    Failed(String),
}

/// Makes a best-effort attempt to have the render capability available.
///
/// All state is shared across calls: the primary channel is observed by
/// every call and the fallback channel is injected at most once for the
/// lifetime of the resolver.
pub struct CapabilityResolver {
    handle: Arc<CapabilityHandle>,
    primary: Channel,
    fallback_source: Arc<dyn CapabilitySource>,
    fallback: OnceLock<Channel>,
    injections: AtomicUsize,
}

impl CapabilityResolver {
    /// Build a resolver over an existing handle and primary channel.
    pub fn new(
        handle: Arc<CapabilityHandle>,
        primary: Channel,
        fallback_source: Arc<dyn CapabilitySource>,
    ) -> Self {
        Self {
            handle,
            primary,
            fallback_source,
            fallback: OnceLock::new(),
            injections: AtomicUsize::new(0),
        }
    }

    /// Declare the configured primary channel and prepare the fallback.
    ///
    /// The primary acquisition starts immediately in the background, so this
    /// must be called from within a Tokio runtime.
    pub fn from_options(options: &LoaderOptions) -> Result<Self> {
        let handle = Arc::new(CapabilityHandle::new());
        let primary = Channel::spawn("primary", primary_source(options)?, Arc::clone(&handle));
        Ok(Self::new(handle, primary, fallback_source(options)))
    }

    /// Shared capability handle
    pub fn handle(&self) -> &Arc<CapabilityHandle> {
        &self.handle
    }

    /// Whether the capability is currently present
    pub fn is_ready(&self) -> bool {
        self.handle.is_present()
    }

    /// The capability, if present
    pub fn capability(&self) -> Option<Arc<dyn RenderBackend>> {
        self.handle.get()
    }

    /// Number of fallback injections so far (0 or 1)
    pub fn fallback_injections(&self) -> usize {
        self.injections.load(Ordering::SeqCst)
    }

    /// Wait until a best-effort attempt to obtain the capability has finished.
    ///
    /// Never fails and never waits longer than [`FALLBACK_DELAY`] plus the
    /// time the fallback channel needs to settle. Completion says nothing
    /// about success: callers must check [`capability`](Self::capability)
    /// afterwards.
    pub async fn ensure_capability(&self) {
        if self.handle.is_present() {
            trace!("Render capability already present");
            return;
        }

        let started = Instant::now();
        let primary = tokio::select! {
            biased;
            outcome = self.primary.settled() => Some(outcome),
            () = time::sleep(FALLBACK_DELAY) => None,
        };

        match primary {
            Some(ChannelOutcome::Loaded) => {
                debug!(
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    "Primary channel loaded"
                );
                return;
            }
            Some(ChannelOutcome::Failed(reason)) => {
                warn!(
                    channel = self.primary.label(),
                    %reason,
                    "Primary channel failed, trying fallback"
                );
            }
            None => {
                info!(
                    channel = self.primary.label(),
                    timeout_ms = FALLBACK_DELAY.as_millis() as u64,
                    "Primary channel silent, trying fallback"
                );
            }
        }

        // The failure detail stops here; callers only see presence.
        match self.acquire_fallback().await {
            FallbackOutcome::AlreadyPresent => {
                debug!("Capability appeared before fallback injection");
            }
            FallbackOutcome::Loaded => {
                debug!(present = self.handle.is_present(), "Fallback channel loaded");
            }
            FallbackOutcome::Failed(reason) => {
                debug!(%reason, "Fallback channel failed, resolving without capability");
            }
        }
        debug!(
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Capability resolution finished"
        );
    }

    async fn acquire_fallback(&self) -> FallbackOutcome {
        if self.handle.is_present() {
            return FallbackOutcome::AlreadyPresent;
        }

        let channel = self.fallback.get_or_init(|| {
            self.injections.fetch_add(1, Ordering::SeqCst);
            info!(source = self.fallback_source.name(), "Injecting fallback channel");
            Channel::spawn(
                "fallback",
                Arc::clone(&self.fallback_source),
                Arc::clone(&self.handle),
            )
        });

        trace!(channel = channel.label(), "Waiting for fallback channel to settle");
        match channel.settled().await {
            ChannelOutcome::Loaded => FallbackOutcome::Loaded,
            ChannelOutcome::Failed(reason) => FallbackOutcome::Failed(reason),
        }
    }
}

impl std::fmt::Debug for CapabilityResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CapabilityResolver")
            .field("handle", &self.handle)
            .field("primary", &(self.primary.label(), self.primary.state()))
            .field("fallback_source", &self.fallback_source.name())
            .field(
                "fallback",
                &self.fallback.get().map(|c| (c.label(), c.state())),
            )
            .field("injections", &self.fallback_injections())
            .finish()
    }
}

//! Composer session glue.
//!
//! The host input component owns one `ComposerSession` and forwards its
//! lifecycle to it:
//! - mount: check for a recovery offer
//! - every change: back up the text and re-run crisis detection
//! - every frame/timer: `on_tick` so due snapshots get written
//! - submit confirmed by the backend: drop the local copy
//! - unmount: cancel any pending write
//!
//! Nothing here can fail or block submission; the worst case is a missing
//! offer or banner.

use crate::config::Config;
use crate::services::crisis::{BannerState, CrisisBanner, CrisisDetector};
use crate::services::recovery::{RecoverySnapshot, SnapshotMetadata, SnapshotRecoveryService};
use crate::services::storage::SharedStore;
use crate::services::time_source::SharedTimeSource;

/// The services a host wires up once at its composition root
#[derive(Debug)]
pub struct ComposeServices {
    pub recovery: SnapshotRecoveryService,
    pub detector: CrisisDetector,
}

impl ComposeServices {
    pub fn new(config: &Config, store: SharedStore, time: SharedTimeSource) -> Self {
        Self {
            recovery: SnapshotRecoveryService::new(
                config.recovery.clone(),
                store.clone(),
                time.clone(),
            ),
            detector: CrisisDetector::new(config.detector.clone(), store, time),
        }
    }

    /// Wire the services from system directories: user config, a file-backed
    /// store under the data directory, and the real clock.
    #[cfg(feature = "runtime")]
    pub fn bootstrap(dirs: &crate::config_io::DirectoryContext) -> anyhow::Result<Self> {
        use crate::services::storage::FileStore;
        use crate::services::time_source::RealTimeSource;
        use anyhow::Context;
        use std::sync::Arc;

        let config = Config::load_from_file(dirs.config_path())?;

        let store_dir = dirs.store_dir();
        std::fs::create_dir_all(&store_dir)
            .with_context(|| format!("Failed to create store directory {}", store_dir.display()))?;
        tracing::info!("Composer store at {}", store_dir.display());

        Ok(Self::new(
            &config,
            Arc::new(FileStore::with_dir(store_dir)),
            RealTimeSource::shared(),
        ))
    }
}

/// A snapshot the user may choose to restore
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecoveryOffer {
    pub snapshot: RecoverySnapshot,
    /// e.g. "3m ago"
    pub age_display: String,
}

#[derive(Debug)]
pub struct ComposerSession {
    services: ComposeServices,
    metadata: Option<SnapshotMetadata>,
    banner: CrisisBanner,
    offer: Option<RecoveryOffer>,
}

impl ComposerSession {
    pub fn new(services: ComposeServices, metadata: Option<SnapshotMetadata>) -> Self {
        Self {
            services,
            metadata,
            banner: CrisisBanner::new(),
            offer: None,
        }
    }

    pub fn services(&self) -> &ComposeServices {
        &self.services
    }

    pub fn banner(&self) -> &CrisisBanner {
        &self.banner
    }

    pub fn pending_offer(&self) -> Option<&RecoveryOffer> {
        self.offer.as_ref()
    }

    /// Look for content to offer back. Never restores on its own.
    pub fn on_mount(&mut self) -> Option<&RecoveryOffer> {
        let recovery = &mut self.services.recovery;
        self.offer = recovery.offer_default().map(|snapshot| RecoveryOffer {
            age_display: recovery.age_display(&snapshot),
            snapshot,
        });
        self.offer.as_ref()
    }

    /// Forward a content change to both services.
    pub fn on_change(&mut self, text: &str) -> BannerState {
        self.services
            .recovery
            .save_snapshot(text, self.metadata.clone());
        self.banner.observe(&self.services.detector, text)
    }

    /// Drive the debounce; returns true if a snapshot was written.
    pub fn on_tick(&mut self) -> bool {
        self.services.recovery.tick()
    }

    /// The user chose to restore. Returns the text that was offered, even if
    /// newer content has been backed up since.
    pub fn accept_offer(&mut self) -> Option<String> {
        let offer = self.offer.take()?;
        self.services.recovery.resolve_offer(&offer.snapshot.id);
        tracing::info!("Recovered composer content from local snapshot");
        Some(offer.snapshot.content)
    }

    /// The user declined the offer. Content backed up since is kept.
    pub fn discard_offer(&mut self) {
        if let Some(offer) = self.offer.take() {
            self.services.recovery.resolve_offer(&offer.snapshot.id);
        }
    }

    pub fn dismiss_banner(&mut self) -> bool {
        self.banner.dismiss(&self.services.detector)
    }

    /// The backend of record confirmed a durable save.
    pub fn on_submitted(&mut self) {
        self.services.recovery.clear_snapshot();
    }

    pub fn on_unmount(&mut self) {
        self.services.recovery.cancel_pending();
    }

    /// Sign-out or "forget this device".
    pub fn forget_device(&mut self) {
        self.offer = None;
        self.services.recovery.clear_all();
        self.services.detector.clear_dismissal();
    }
}

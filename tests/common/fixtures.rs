use mirror::composer::{ComposeServices, ComposerSession};
use mirror::config::Config;
use mirror::services::recovery::SnapshotMetadata;
use mirror::services::storage::MemoryStore;
use mirror::services::time_source::TestTimeSource;
use std::sync::Arc;
use std::time::Duration;

/// Debounce window of the default config
pub const DEBOUNCE: Duration = Duration::from_millis(100);

/// Epoch used by every fixture clock
pub const EPOCH_MILLIS: i64 = 1_700_000_000_000;

/// Storage and clock that outlive individual sessions, like a browser
/// profile that survives a reload.
pub struct Device {
    pub store: Arc<MemoryStore>,
    pub time: Arc<TestTimeSource>,
    pub config: Config,
}

impl Device {
    pub fn new() -> Self {
        Self::with_config(Config::default())
    }

    pub fn with_config(config: Config) -> Self {
        Self {
            store: MemoryStore::shared(),
            time: Arc::new(TestTimeSource::with_epoch_millis(EPOCH_MILLIS)),
            config,
        }
    }

    pub fn services(&self) -> ComposeServices {
        ComposeServices::new(&self.config, self.store.clone(), self.time.clone())
    }

    /// A fresh composer mount on this device
    pub fn session(&self) -> ComposerSession {
        ComposerSession::new(
            self.services(),
            Some(SnapshotMetadata::for_thread("thread-42")),
        )
    }

    /// Type `text` and let the debounce window elapse
    pub fn type_and_settle(&self, session: &mut ComposerSession, text: &str) {
        session.on_change(text);
        self.time.advance(DEBOUNCE);
        session.on_tick();
    }
}

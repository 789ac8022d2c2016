//! Per-session crisis banner state.
//!
//! ```text
//! Hidden --(match, not dismissed)--> Shown --(dismiss)--> Dismissed
//!    ^                                                        |
//!    +------------------(cooldown expired)--------------------+
//! ```

use super::{CrisisDetectionResult, CrisisDetector, Severity};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BannerState {
    Hidden,
    Shown(Severity),
    /// Suppressed by a dismissal that is still within the cooldown
    Dismissed,
}

#[derive(Debug)]
pub struct CrisisBanner {
    state: BannerState,
    last_result: CrisisDetectionResult,
}

impl Default for CrisisBanner {
    fn default() -> Self {
        Self::new()
    }
}

impl CrisisBanner {
    pub fn new() -> Self {
        Self {
            state: BannerState::Hidden,
            last_result: CrisisDetectionResult::none(),
        }
    }

    pub fn state(&self) -> BannerState {
        self.state
    }

    pub fn is_visible(&self) -> bool {
        matches!(self.state, BannerState::Shown(_))
    }

    /// Result of the most recent analysis, kept even while suppressed.
    pub fn last_result(&self) -> &CrisisDetectionResult {
        &self.last_result
    }

    /// Run detection on `text` and move to the matching state.
    pub fn observe(&mut self, detector: &CrisisDetector, text: &str) -> BannerState {
        let result = detector.analyze(text);

        let next = if detector.is_dismissed_recently() {
            BannerState::Dismissed
        } else if result.detected {
            BannerState::Shown(result.severity)
        } else {
            BannerState::Hidden
        };

        if next != self.state {
            tracing::debug!("Crisis banner {:?} -> {:?}", self.state, next);
        }
        self.state = next;
        self.last_result = result;
        next
    }

    /// The user closed the banner. Returns false if no banner was shown.
    pub fn dismiss(&mut self, detector: &CrisisDetector) -> bool {
        if !self.is_visible() {
            return false;
        }
        detector.record_dismissal();
        self.state = BannerState::Dismissed;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::crisis::DetectorConfig;
    use crate::services::storage::MemoryStore;
    use crate::services::time_source::TestTimeSource;
    use std::sync::Arc;
    use std::time::Duration;

    const URGENT_TEXT: &str = "Honestly I just want to die tonight";
    const CALM_TEXT: &str = "Went for a long walk by the river";

    fn create_test_banner() -> (CrisisBanner, CrisisDetector, Arc<TestTimeSource>) {
        let time = Arc::new(TestTimeSource::new());
        let detector =
            CrisisDetector::new(DetectorConfig::default(), MemoryStore::shared(), time.clone());
        (CrisisBanner::new(), detector, time)
    }

    #[test]
    fn test_shown_then_hidden() {
        let (mut banner, detector, _) = create_test_banner();
        assert_eq!(banner.state(), BannerState::Hidden);

        assert_eq!(
            banner.observe(&detector, URGENT_TEXT),
            BannerState::Shown(Severity::Urgent)
        );
        assert!(banner.is_visible());

        assert_eq!(banner.observe(&detector, CALM_TEXT), BannerState::Hidden);
    }

    #[test]
    fn test_dismissed_until_cooldown_expires() {
        let (mut banner, detector, time) = create_test_banner();

        banner.observe(&detector, URGENT_TEXT);
        assert!(banner.dismiss(&detector));
        assert_eq!(banner.state(), BannerState::Dismissed);

        time.advance(Duration::from_secs(60 * 60));
        assert_eq!(banner.observe(&detector, URGENT_TEXT), BannerState::Dismissed);
        // Detection kept running while suppressed
        assert_eq!(banner.last_result().severity, Severity::Urgent);

        time.advance(Duration::from_secs(24 * 60 * 60));
        assert_eq!(
            banner.observe(&detector, URGENT_TEXT),
            BannerState::Shown(Severity::Urgent)
        );
    }

    #[test]
    fn test_dismiss_without_banner_is_noop() {
        let (mut banner, detector, _) = create_test_banner();
        banner.observe(&detector, CALM_TEXT);
        assert!(!banner.dismiss(&detector));
        assert!(!detector.is_dismissed_recently());
    }
}

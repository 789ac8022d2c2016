#![cfg(feature = "runtime")]

// Integration tests - testing how the composer drives both services

mod common;

use common::fixtures::{Device, DEBOUNCE};
use mirror::composer::ComposeServices;
use mirror::config::Config;
use mirror::config_io::DirectoryContext;
use mirror::services::crisis::{BannerState, Severity};
use mirror::services::storage::{KeyValueStore, DISMISSAL_KEY, HISTORY_KEY, SNAPSHOT_KEY};
use std::time::Duration;

/// Typing, crashing, and remounting offers the last settled content back
#[test]
fn test_recovery_offered_after_interruption() {
    common::tracing::init_tracing_from_env();
    let device = Device::new();

    let mut session = device.session();
    assert!(session.on_mount().is_none());
    device.type_and_settle(&mut session, "Today I noticed how");
    session.on_change("Today I noticed how much");
    // Crash: the last change never settles
    drop(session);

    device.time.advance(Duration::from_secs(90));
    let mut session = device.session();
    let offer = session.on_mount().cloned().expect("recovery offer");
    assert_eq!(offer.snapshot.content, "Today I noticed how");
    assert_eq!(
        offer.snapshot.metadata.and_then(|m| m.thread_id).as_deref(),
        Some("thread-42")
    );
    assert_eq!(offer.age_display, "1m ago");

    // Nothing restored until the user accepts
    assert!(device.store.get(SNAPSHOT_KEY).unwrap().is_some());
    assert_eq!(session.accept_offer().as_deref(), Some("Today I noticed how"));
    assert!(device.store.get(SNAPSHOT_KEY).unwrap().is_none());
    assert_eq!(session.accept_offer(), None);
}

#[test]
fn test_discarded_offer_is_not_repeated() {
    let device = Device::new();
    let mut session = device.session();
    device.type_and_settle(&mut session, "a draft I do not want back");

    let mut session = device.session();
    assert!(session.on_mount().is_some());
    session.discard_offer();
    assert!(session.pending_offer().is_none());

    let mut session = device.session();
    assert!(session.on_mount().is_none());
}

#[test]
fn test_accept_returns_offered_text_after_new_typing() {
    let device = Device::new();
    let mut session = device.session();
    device.type_and_settle(&mut session, "my long lost reflection draft");

    let mut session = device.session();
    assert!(session.on_mount().is_some());
    device.type_and_settle(&mut session, "x");
    session.on_change("xy");

    assert_eq!(
        session.accept_offer().as_deref(),
        Some("my long lost reflection draft")
    );
    // The newer backup and the pending write both survive
    assert_eq!(session.services().recovery.get_snapshot().unwrap().content, "x");
    assert!(session.services().recovery.has_pending());
    device.time.advance(DEBOUNCE);
    assert!(session.on_tick());
    assert_eq!(session.services().recovery.get_snapshot().unwrap().content, "xy");
}

#[test]
fn test_discard_keeps_content_typed_after_offer() {
    let device = Device::new();
    let mut session = device.session();
    device.type_and_settle(&mut session, "an old draft to decline");

    let mut session = device.session();
    assert!(session.on_mount().is_some());
    device.type_and_settle(&mut session, "a fresh start");
    session.on_change("a fresh start, continued");
    session.discard_offer();

    assert!(session.services().recovery.has_pending());
    assert_eq!(
        session.services().recovery.get_snapshot().unwrap().content,
        "a fresh start"
    );
}

#[test]
fn test_stale_snapshot_is_not_offered() {
    let device = Device::new();
    let mut session = device.session();
    device.type_and_settle(&mut session, "written yesterday");

    device.time.advance(Duration::from_secs(2 * 60 * 60));
    let mut session = device.session();
    assert!(session.on_mount().is_none());
    assert!(!session.services().recovery.has_recovery());
}

#[test]
fn test_submit_clears_local_copy_and_pending_write() {
    let device = Device::new();
    let mut session = device.session();

    device.type_and_settle(&mut session, "first half");
    session.on_change("first half and second half");
    session.on_submitted();

    device.time.advance(DEBOUNCE);
    assert!(!session.on_tick());
    assert!(device.store.get(SNAPSHOT_KEY).unwrap().is_none());
}

#[test]
fn test_unmount_cancels_pending_write() {
    let device = Device::new();
    let mut session = device.session();

    session.on_change("typed right before leaving");
    session.on_unmount();
    device.time.advance(DEBOUNCE * 3);
    assert!(!session.on_tick());
    assert!(device.store.is_empty());
}

#[test]
fn test_rapid_typing_writes_once_with_latest_content() {
    let device = Device::new();
    let mut session = device.session();

    for text in ["I", "I am", "I am here"] {
        session.on_change(text);
        device.time.advance(Duration::from_millis(30));
        assert!(!session.on_tick());
    }
    device.time.advance(DEBOUNCE);
    assert!(session.on_tick());

    let snapshot = session.services().recovery.get_snapshot().unwrap();
    assert_eq!(snapshot.content, "I am here");
}

#[test]
fn test_banner_follows_detection_and_dismissal() {
    let device = Device::new();
    let mut session = device.session();

    assert_eq!(session.on_change("Nice dinner with friends tonight"), BannerState::Hidden);
    assert_eq!(
        session.on_change("I feel hopeless and trapped, there is no way out"),
        BannerState::Shown(Severity::Concern)
    );
    assert!(session.dismiss_banner());
    assert!(device.store.get(DISMISSAL_KEY).unwrap().is_some());

    // Dismissal survives a remount within the cooldown
    let mut session = device.session();
    assert_eq!(
        session.on_change("I keep thinking I should kill myself"),
        BannerState::Dismissed
    );
    assert_eq!(session.banner().last_result().severity, Severity::Urgent);

    device.time.advance(Duration::from_secs(24 * 60 * 60 + 1));
    assert_eq!(
        session.on_change("I keep thinking I should kill myself"),
        BannerState::Shown(Severity::Urgent)
    );
}

#[test]
fn test_detection_never_blocks_backup() {
    let device = Device::new();
    let mut session = device.session();

    device.type_and_settle(&mut session, "I want to end my life and I am so tired");
    assert!(session.banner().is_visible());
    assert_eq!(
        session.services().recovery.get_snapshot().unwrap().content,
        "I want to end my life and I am so tired"
    );
}

#[test]
fn test_forget_device_clears_everything() {
    let device = Device::new();
    let mut session = device.session();

    device.type_and_settle(&mut session, "I feel worthless and overwhelmed lately");
    session.dismiss_banner();
    let mut services = device.services();
    services.recovery.save_to_history("older draft", None);
    assert!(device.store.get(HISTORY_KEY).unwrap().is_some());

    session.forget_device();
    assert!(device.store.is_empty());
    assert!(!session.services().detector.is_dismissed_recently());
}

#[test]
fn test_custom_config_changes_behavior() {
    let mut config = Config::default();
    config.recovery.debounce_ms = 500;
    config.detector.min_length = 5;
    let device = Device::with_config(config);
    let mut session = device.session();

    assert_eq!(
        session.on_change("suicide"),
        BannerState::Shown(Severity::Urgent)
    );
    device.time.advance(DEBOUNCE);
    assert!(!session.on_tick());
    device.time.advance(Duration::from_millis(400));
    assert!(session.on_tick());
}

#[test]
fn test_bootstrap_uses_file_store_across_restarts() {
    let temp_dir = tempfile::TempDir::new().unwrap();
    let dirs = DirectoryContext::for_testing(temp_dir.path());

    let mut services = ComposeServices::bootstrap(&dirs).unwrap();
    services.recovery.save_snapshot("survives a restart", None);
    assert!(services.recovery.flush());
    drop(services);

    let services = ComposeServices::bootstrap(&dirs).unwrap();
    assert_eq!(
        services.recovery.get_snapshot().map(|s| s.content).as_deref(),
        Some("survives a restart")
    );
    assert!(dirs.store_dir().join(format!("{SNAPSHOT_KEY}.json")).exists());
}

#[test]
fn test_bootstrap_rejects_invalid_config() {
    let temp_dir = tempfile::TempDir::new().unwrap();
    let dirs = DirectoryContext::for_testing(temp_dir.path());

    let mut config = Config::default();
    config.recovery.history_limit = 3;
    config.save_to_file(dirs.config_path()).unwrap();
    let services = ComposeServices::bootstrap(&dirs).unwrap();
    assert_eq!(services.recovery.config().history_limit, 3);

    std::fs::write(dirs.config_path(), "not json").unwrap();
    assert!(ComposeServices::bootstrap(&dirs).is_err());
}

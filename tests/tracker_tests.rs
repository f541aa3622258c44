use safetynet::tracker::error::{ErrorKind, TrackerError};
use safetynet::tracker::identity::{ChangeKey, IdBranch};
use safetynet::tracker::settings::Settings;
use safetynet::tracker::tracker::ChangeTracker;

const MESSAGE: &str = "Your unsaved changes will be lost.";

// =========================================================================
// raise / clear
// =========================================================================

#[test]
fn raise_then_clear_two_keys() {
    let mut tracker = ChangeTracker::new();

    tracker.raise_change("a").unwrap();
    tracker.raise_change("b").unwrap();
    assert!(tracker.has_changes());

    tracker.clear_change("a").unwrap();
    assert!(tracker.has_changes(), "b is still raised");

    tracker.clear_change("b").unwrap();
    assert!(!tracker.has_changes());
}

#[test]
fn raising_twice_is_idempotent() {
    let mut once = ChangeTracker::new();
    once.raise_change("k").unwrap();

    let mut twice = ChangeTracker::new();
    twice.raise_change("k").unwrap();
    twice.raise_change("k").unwrap();

    assert_eq!(once.dirty_keys(), twice.dirty_keys());

    // A single clear undoes any number of raises
    twice.clear_change("k").unwrap();
    assert!(!twice.has_changes());
}

#[test]
fn raise_then_clear_restores_prior_state() {
    let mut tracker = ChangeTracker::new();
    tracker.raise_change("existing").unwrap();
    let before = tracker.has_changes();

    tracker.raise_change("fresh").unwrap();
    tracker.clear_change("fresh").unwrap();

    assert_eq!(tracker.has_changes(), before);
    assert_eq!(tracker.dirty_keys(), vec![ChangeKey::from("existing")]);
}

#[test]
fn clearing_absent_key_is_silent() {
    let mut tracker = ChangeTracker::new();
    assert!(tracker.clear_change("never-raised").is_ok());
    assert!(!tracker.has_changes());
}

#[test]
fn synthetic_keys_are_tracked_like_names() {
    let mut tracker = ChangeTracker::new();
    tracker.raise_change(0u64).unwrap();
    tracker.raise_change("0").unwrap();
    assert_eq!(tracker.dirty_keys().len(), 2);

    tracker.clear_change(ChangeKey::Synthetic(0)).unwrap();
    assert!(tracker.is_dirty(&ChangeKey::from("0")));
    assert!(!tracker.is_dirty(&ChangeKey::Synthetic(0)));
}

// =========================================================================
// Key validation
// =========================================================================

#[test]
fn empty_key_is_rejected_on_raise() {
    let mut tracker = ChangeTracker::new();
    let err = tracker.raise_change("").unwrap_err();

    assert_eq!(err, TrackerError::InvalidKey { operation: "raising" });
    assert_eq!(err.kind(), ErrorKind::InvalidKey);
    assert_eq!(err.to_string(), "key is required when raising a change");
    assert!(!tracker.has_changes(), "registry must stay empty");
}

#[test]
fn empty_key_is_rejected_on_clear() {
    let mut tracker = ChangeTracker::new();
    tracker.raise_change("a").unwrap();

    let err = tracker.clear_change(String::new()).unwrap_err();
    assert_eq!(err, TrackerError::InvalidKey { operation: "clearing" });
    assert!(tracker.has_changes(), "failed clear must not touch the registry");
}

// =========================================================================
// clear_all_changes
// =========================================================================

#[test]
fn clear_all_empties_registry_regardless_of_size() {
    let mut tracker = ChangeTracker::new();
    for key in ["a", "b", "c", "d"] {
        tracker.raise_change(key).unwrap();
    }
    tracker.raise_change(9u64).unwrap();

    tracker.clear_all_changes();
    assert!(!tracker.has_changes());
    assert!(tracker.dirty_keys().is_empty());
}

#[test]
fn clear_all_keeps_suppression() {
    let mut tracker = ChangeTracker::new();
    tracker.set_suppressed(true);
    tracker.clear_all_changes();
    assert!(tracker.suppressed());
}

// =========================================================================
// Suppression
// =========================================================================

#[test]
fn suppressed_defaults_to_false_and_round_trips() {
    let mut tracker = ChangeTracker::new();
    assert!(!tracker.suppressed());

    for value in [true, false, true, false] {
        assert_eq!(tracker.set_suppressed(value), value);
        assert_eq!(tracker.suppressed(), value);
    }
}

// =========================================================================
// Navigation-guard decision
// =========================================================================

#[test]
fn before_unload_truth_table() {
    let cases = [
        // (suppressed, has_changes, expected warning)
        (true, true, None),
        (true, false, None),
        (false, false, None),
        (false, true, Some(MESSAGE.to_string())),
    ];

    for (suppressed, has_changes, expected) in cases {
        let mut tracker = ChangeTracker::new();
        if has_changes {
            tracker.raise_change("field").unwrap();
        }
        tracker.set_suppressed(suppressed);

        assert_eq!(
            tracker.before_unload(MESSAGE),
            expected,
            "suppressed={} has_changes={}",
            suppressed,
            has_changes
        );
        assert!(!tracker.suppressed(), "suppression is consumed by the query");
        assert_eq!(tracker.has_changes(), has_changes, "query never touches changes");
    }
}

#[test]
fn suppression_only_covers_one_navigation() {
    let mut tracker = ChangeTracker::new();
    tracker.raise_change("field").unwrap();
    tracker.set_suppressed(true);

    assert_eq!(tracker.before_unload(MESSAGE), None);
    assert_eq!(tracker.before_unload(MESSAGE), Some(MESSAGE.to_string()));
}

// =========================================================================
// Construction
// =========================================================================

#[test]
fn fresh_tracker_is_inactive_and_clean() {
    let tracker = ChangeTracker::with_id_branch(IdBranch::Legacy);
    assert!(!tracker.is_activated());
    assert!(!tracker.has_changes());
    assert!(!tracker.suppressed());
    assert_eq!(tracker.resolver().id_branch(), IdBranch::Legacy);
}

// =========================================================================
// Settings
// =========================================================================

#[test]
fn settings_defaults() {
    let settings = Settings::default();
    assert_eq!(settings.message, MESSAGE);
    assert_eq!(settings.fields, "input,select,textarea,fileupload");
    assert_eq!(settings.form, "form");
    assert_eq!(settings.events_string(), "change,keyup,paste");
    assert!(settings.live);
    assert_eq!(settings.id_branch, IdBranch::UseId);
}

#[test]
fn settings_parse_event_lists() {
    assert_eq!(
        Settings::parse_events("change, keyup,,paste "),
        vec!["change", "keyup", "paste"]
    );
    assert!(Settings::parse_events(" , ").is_empty());
}

#[test]
fn partial_settings_yaml_keeps_defaults() {
    let settings: Settings = serde_yaml::from_str("form: \"form#edit\"\nid_branch: legacy\n").unwrap();
    assert_eq!(settings.form, "form#edit");
    assert_eq!(settings.id_branch, IdBranch::Legacy);
    assert_eq!(settings.message, MESSAGE);
    assert_eq!(settings.change_events, vec!["change", "keyup", "paste"]);
}

#[test]
fn change_events_accept_a_comma_separated_string() {
    let joined: Settings = serde_yaml::from_str("change_events: \"change, keyup\"\n").unwrap();
    assert_eq!(joined.change_events, vec!["change", "keyup"]);

    let listed: Settings = serde_yaml::from_str("change_events: [change, \" paste \"]\n").unwrap();
    assert_eq!(listed.change_events, vec!["change", "paste"]);

    let round_trip: Settings = serde_yaml::from_str(&serde_yaml::to_string(&joined).unwrap()).unwrap();
    assert_eq!(round_trip, joined);
}

use safetynet::page::host::{PageHost, Selection};
use safetynet::page::simulated::{Element, SimulatedPage};
use safetynet::tracker::error::TrackerError;
use safetynet::tracker::identity::{ChangeKey, IdBranch};
use safetynet::tracker::settings::Settings;
use safetynet::tracker::tracker::SafetyNet;

// =========================================================================
// Helpers
// =========================================================================

const FIELDS: &str = "input.test,select.test,textarea.test,fileupload.test";

fn settings() -> Settings {
    Settings::default().with_fields(FIELDS)
}

fn text_input(name: &str, value: &str) -> Element {
    Element::new("input")
        .with_type("text")
        .with_class("test")
        .with_name(name)
        .with_id(name)
        .with_value(value)
}

fn anonymous_input(value: &str) -> Element {
    Element::new("input")
        .with_type("text")
        .with_class("test")
        .with_value(value)
}

/// Page with two named text inputs and one form.
fn two_field_page() -> (SimulatedPage, usize, usize, usize) {
    let mut page = SimulatedPage::new();
    let t1 = page.add_element(text_input("t1", "v1"));
    let t2 = page.add_element(text_input("t2", "v2"));
    let form = page.add_element(Element::new("form").with_id("edit"));
    (page, t1, t2, form)
}

fn activate(net: &SafetyNet, page: &mut SimulatedPage, settings: &Settings) -> Selection {
    let selection = page.select(&settings.fields);
    net.activate(selection, settings, page).expect("activation should succeed")
}

// =========================================================================
// Activation guard checks
// =========================================================================

#[test]
fn activation_returns_original_selection() {
    let (mut page, t1, t2, _) = two_field_page();
    let net = SafetyNet::new();
    let settings = settings();

    let selection = page.select(FIELDS);
    let returned = net.activate(selection.clone(), &settings, &mut page).unwrap();

    assert_eq!(returned, selection);
    assert_eq!(returned.nodes, vec![t1, t2]);
    assert!(net.is_activated());
}

#[test]
fn only_one_activation_per_page() {
    let (mut page, t1, _, _) = two_field_page();
    let net = SafetyNet::new();
    let settings = settings();
    activate(&net, &mut page, &settings);
    page.trigger_changed(t1).unwrap();

    let second = page.select(FIELDS);
    let err = net.activate(second, &settings, &mut page).unwrap_err();

    assert_eq!(err, TrackerError::AlreadyActivated);
    assert_eq!(err.to_string(), "only one activation is allowed per page");
    assert_eq!(net.dirty_keys(), vec![ChangeKey::from("t1")], "registry untouched");
    assert_eq!(page.watch_count(), 1, "no second subscription");
    assert_eq!(page.submit_binding_count(), 1);
}

#[test]
fn missing_event_source_fails_without_side_effects() {
    let (mut page, _, _, _) = two_field_page();
    page.set_event_source_available(false);
    let net = SafetyNet::new();

    let selection = page.select(FIELDS);
    let err = net.activate(selection, &settings(), &mut page).unwrap_err();

    assert!(matches!(err, TrackerError::MissingDependency { .. }));
    assert!(!net.is_activated(), "failed activation must not arm the guard");
    assert!(!page.navigation_guard_installed());
    assert_eq!(page.watch_count(), 0);
    assert_eq!(page.submit_binding_count(), 0);

    // Once the dependency shows up, activation works
    page.set_event_source_available(true);
    activate(&net, &mut page, &settings());
    assert!(net.is_activated());
}

#[test]
fn clear_all_rearms_activation() {
    let (mut page, t1, _, _) = two_field_page();
    let net = SafetyNet::new();
    let settings = settings();
    activate(&net, &mut page, &settings);
    page.trigger_changed(t1).unwrap();

    let again = page.select(FIELDS);
    assert!(net.activate(again, &settings, &mut page).is_err());

    net.clear_all_changes();
    assert!(!net.has_changes());
    assert!(!net.is_activated());

    activate(&net, &mut page, &settings);
    assert!(net.is_activated());
}

// =========================================================================
// Notification routing
// =========================================================================

#[test]
fn changed_notification_raises_and_reverted_clears() {
    let (mut page, t1, _, _) = two_field_page();
    let net = SafetyNet::new();
    activate(&net, &mut page, &settings());

    assert!(!net.has_changes());
    page.trigger_changed(t1).unwrap();
    assert!(net.has_changes());
    page.trigger_reverted(t1).unwrap();
    assert!(!net.has_changes());
}

#[test]
fn edits_are_tracked_through_configured_events() {
    let (mut page, t1, t2, _) = two_field_page();
    let net = SafetyNet::new();
    activate(&net, &mut page, &settings());

    page.input(t1, "keyup", "edited").unwrap();
    assert_eq!(net.dirty_keys(), vec![ChangeKey::from("t1")]);

    page.input(t2, "paste", "pasted").unwrap();
    assert_eq!(net.dirty_keys().len(), 2);

    page.input(t1, "change", "v1").unwrap();
    assert_eq!(net.dirty_keys(), vec![ChangeKey::from("t2")]);
}

#[test]
fn unconfigured_events_are_ignored() {
    let (mut page, t1, _, _) = two_field_page();
    let net = SafetyNet::new();
    let mut settings = settings();
    settings.change_events = Settings::parse_events("change");
    activate(&net, &mut page, &settings);

    page.input(t1, "keyup", "typed").unwrap();
    assert!(!net.has_changes(), "keyup is not a change event here");

    page.input(t1, "change", "typed").unwrap();
    assert!(net.has_changes());
}

#[test]
fn anonymous_inputs_are_told_apart() {
    let mut page = SimulatedPage::new();
    let t1 = page.add_element(text_input("t1", "v1"));
    let t2 = page.add_element(text_input("t2", "v2"));
    let t3 = page.add_element(anonymous_input("v3"));
    let t4 = page.add_element(anonymous_input("v4"));
    let net = SafetyNet::new();
    activate(&net, &mut page, &settings());

    for node in [t1, t2, t3, t4] {
        page.trigger_changed(node).unwrap();
    }
    assert!(net.has_changes());

    page.trigger_reverted(t1).unwrap();
    page.trigger_reverted(t2).unwrap();
    assert!(net.has_changes());
    page.trigger_reverted(t3).unwrap();
    assert!(net.has_changes(), "t4 keeps its own key");
    page.trigger_reverted(t4).unwrap();
    assert!(!net.has_changes());
}

fn id_only_page() -> (SimulatedPage, Vec<usize>) {
    let mut page = SimulatedPage::new();
    let nodes = vec![
        page.add_element(text_input("t1", "v1")),
        page.add_element(text_input("t2", "v2")),
        page.add_element(anonymous_input("v3").with_id("id3")),
        page.add_element(anonymous_input("v4").with_id("id4")),
    ];
    (page, nodes)
}

fn assert_id_only_fields_tracked_separately(net: &SafetyNet, page: &mut SimulatedPage, nodes: &[usize]) {
    for &node in nodes {
        page.trigger_changed(node).unwrap();
    }
    assert_eq!(net.dirty_keys().len(), 4);

    page.trigger_reverted(nodes[0]).unwrap();
    page.trigger_reverted(nodes[1]).unwrap();
    page.trigger_reverted(nodes[2]).unwrap();
    assert!(net.has_changes());
    page.trigger_reverted(nodes[3]).unwrap();
    assert!(!net.has_changes());
}

#[test]
fn id_only_inputs_keyed_by_id() {
    let (mut page, nodes) = id_only_page();
    let net = SafetyNet::new();
    activate(&net, &mut page, &settings().with_id_branch(IdBranch::UseId));

    page.trigger_changed(nodes[2]).unwrap();
    assert_eq!(net.dirty_keys(), vec![ChangeKey::from("id3")]);
    page.trigger_reverted(nodes[2]).unwrap();

    assert_id_only_fields_tracked_separately(&net, &mut page, &nodes);
}

#[test]
fn id_only_inputs_keyed_synthetically_in_legacy_mode() {
    let (mut page, nodes) = id_only_page();
    let net = SafetyNet::new();
    activate(&net, &mut page, &settings().with_id_branch(IdBranch::Legacy));

    page.trigger_changed(nodes[2]).unwrap();
    assert_eq!(net.dirty_keys(), vec![ChangeKey::Synthetic(0)]);
    assert_eq!(page.element(nodes[2]).unwrap().synthetic_key(), Some(0));
    page.trigger_reverted(nodes[2]).unwrap();

    assert_id_only_fields_tracked_separately(&net, &mut page, &nodes);
}

#[test]
fn live_activation_picks_up_later_fields() {
    let (mut page, _, _, _) = two_field_page();
    let net = SafetyNet::new();
    activate(&net, &mut page, &settings());

    let late = page.add_element(text_input("late", ""));
    page.input(late, "change", "filled").unwrap();
    assert_eq!(net.dirty_keys(), vec![ChangeKey::from("late")]);
}

#[test]
fn non_live_activation_ignores_later_fields() {
    let (mut page, _, _, _) = two_field_page();
    let net = SafetyNet::new();
    let mut settings = settings();
    settings.live = false;
    activate(&net, &mut page, &settings);

    let late = page.add_element(text_input("late", ""));
    page.input(late, "change", "filled").unwrap();
    assert!(!net.has_changes());
}

#[test]
fn trackers_sharing_a_page_never_reuse_synthetic_keys() {
    let mut page = SimulatedPage::new();
    let x = page.add_element(anonymous_input("x"));

    let first = SafetyNet::new();
    let mut fixed = settings();
    fixed.live = false;
    activate(&first, &mut page, &fixed);
    page.input(x, "change", "x edited").unwrap();
    assert_eq!(first.dirty_keys(), vec![ChangeKey::Synthetic(0)]);

    let second = SafetyNet::new();
    activate(&second, &mut page, &settings());
    let y = page.add_element(anonymous_input("y"));
    page.input(y, "change", "y edited").unwrap();

    let x_key = page.element(x).unwrap().synthetic_key();
    let y_key = page.element(y).unwrap().synthetic_key();
    assert_eq!(x_key, Some(0));
    assert_eq!(y_key, Some(1), "y must not reuse the key cached on x");
    assert_eq!(second.dirty_keys(), vec![ChangeKey::Synthetic(1)]);

    // Reverting x must leave y's change in place
    page.trigger_reverted(x).unwrap();
    assert!(!first.has_changes());
    assert!(second.has_changes(), "y is still edited");
    assert_eq!(page.navigate_away(), Some(Settings::default().message));
}

#[test]
fn keys_resolved_before_activation_stay_reserved() {
    let mut page = SimulatedPage::new();
    let late = page.add_element(anonymous_input("v"));
    let net = SafetyNet::new();

    let mut early = Element::new("input");
    assert_eq!(net.resolve(&mut early), ChangeKey::Synthetic(0));

    activate(&net, &mut page, &settings());
    page.trigger_changed(late).unwrap();
    assert_eq!(net.dirty_keys(), vec![ChangeKey::Synthetic(1)]);
}

// =========================================================================
// Navigation guard and submission
// =========================================================================

#[test]
fn activation_installs_navigation_guard() {
    let (mut page, _, _, _) = two_field_page();
    assert!(!page.navigation_guard_installed());

    activate(&SafetyNet::new(), &mut page, &settings());
    assert!(page.navigation_guard_installed());
}

#[test]
fn guard_warns_only_with_unsuppressed_changes() {
    let (mut page, t1, _, _) = two_field_page();
    let net = SafetyNet::new();
    let settings = settings().with_message("Leave anyway?");
    activate(&net, &mut page, &settings);

    assert_eq!(page.navigate_away(), None);

    page.trigger_changed(t1).unwrap();
    assert_eq!(page.navigate_away(), Some("Leave anyway?".to_string()));

    net.set_suppressed(true);
    assert_eq!(page.navigate_away(), None);
    assert!(!net.suppressed(), "guard un-suppresses after one use");
    assert_eq!(page.navigate_away(), Some("Leave anyway?".to_string()));
}

#[test]
fn suppressed_guard_without_changes_still_unsuppresses() {
    let (mut page, _, _, _) = two_field_page();
    let net = SafetyNet::new();
    activate(&net, &mut page, &settings());

    net.set_suppressed(true);
    assert_eq!(page.navigate_away(), None);
    assert!(!net.suppressed());
}

#[test]
fn form_submit_suppresses_next_warning() {
    let (mut page, t1, _, form) = two_field_page();
    let net = SafetyNet::new();
    activate(&net, &mut page, &settings());
    page.trigger_changed(t1).unwrap();

    assert_eq!(page.submit(form).unwrap(), 1);
    assert!(net.suppressed());
    assert_eq!(page.navigate_away(), None);
}

#[test]
fn submit_of_unmatched_form_does_not_suppress() {
    let (mut page, _, _, _) = two_field_page();
    let other = page.add_element(Element::new("form").with_id("search"));
    let net = SafetyNet::new();
    activate(&net, &mut page, &settings().with_form("form#edit"));

    assert_eq!(page.submit(other).unwrap(), 0);
    assert!(!net.suppressed());
}

#[test]
fn later_activation_overwrites_guard() {
    let (mut page, t1, _, _) = two_field_page();
    let first = SafetyNet::new();
    activate(&first, &mut page, &settings().with_message("first"));
    page.trigger_changed(t1).unwrap();

    let second = SafetyNet::new();
    activate(&second, &mut page, &settings().with_message("second"));

    // Both trackers hear t1 now, but only the second guard answers
    page.trigger_changed(t1).unwrap();
    assert!(first.has_changes());
    assert_eq!(page.navigate_away(), Some("second".to_string()));

    second.clear_all_changes();
    assert_eq!(page.navigate_away(), None, "first guard is gone");
}

// =========================================================================
// Default activation
// =========================================================================

#[test]
fn activate_default_uses_settings_fields() {
    let mut page = SimulatedPage::new();
    let input = page.add_element(Element::new("input").with_name("a"));
    let select = page.add_element(Element::new("select").with_name("b"));
    let area = page.add_element(Element::new("textarea").with_name("c"));
    page.add_element(Element::new("button").with_name("go"));
    page.add_element(Element::new("form"));

    let net = SafetyNet::new();
    let selection = net.activate_default(&Settings::default(), &mut page).unwrap();

    assert_eq!(selection.selector, Settings::default().fields);
    assert_eq!(selection.nodes, vec![input, select, area]);
}

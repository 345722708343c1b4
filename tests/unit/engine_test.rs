//! Unit tests for the migration engine through the public API

use setver::{
    Engine, EngineError, FailurePolicy, MemoryStore, OptionStore, Registry, RegistryError,
};

use crate::helpers::{contributor, CallLog};

fn engine(log: &CallLog, versions: &[u64], failing: &[u64]) -> Engine {
    let mut engine = Engine::new();
    engine.contribute(contributor(log, versions, failing));
    engine
}

#[test]
fn fresh_store_runs_everything_in_ascending_order() {
    let log = CallLog::new();
    let engine = engine(&log, &[1, 3, 2], &[]);
    let mut store = MemoryStore::new();

    let report = engine.run(&mut store).unwrap();

    assert_eq!(log.calls(), vec![1, 2, 3]);
    assert_eq!(report.previous, 0);
    assert_eq!(report.current, 3);
    assert_eq!(store.get("setver_version"), Some("3"));
}

#[test]
fn up_to_date_store_runs_nothing_and_is_not_written() {
    let log = CallLog::new();
    let engine = engine(&log, &[1, 2, 3], &[]);
    let mut store = MemoryStore::from_pairs([("setver_version", "3")]);

    let report = engine.run(&mut store).unwrap();

    assert!(log.calls().is_empty());
    assert_eq!(report.skipped, vec![1, 2, 3]);
    assert!(!report.advanced());
    assert_eq!(store.writes(), 0);
    assert_eq!(store.get("setver_version"), Some("3"));
}

#[test]
fn first_failure_stops_later_actions_under_both_policies() {
    for policy in [FailurePolicy::AllOrNothing, FailurePolicy::BestEffort] {
        let log = CallLog::new();
        let engine = engine(&log, &[5, 10], &[5]).with_policy(policy);
        let mut store = MemoryStore::new();

        let err = engine.run(&mut store).unwrap_err();

        assert!(matches!(
            err,
            EngineError::ActionFailed {
                version: 5,
                watermark: 0,
                ..
            }
        ));
        assert_eq!(log.calls(), vec![5], "policy {:?}", policy);
        assert_eq!(store.get("setver_version"), None, "policy {:?}", policy);
    }
}

#[test]
fn best_effort_keeps_progress_before_the_failure() {
    let log = CallLog::new();
    let engine = engine(&log, &[1, 2, 3], &[3]).with_policy(FailurePolicy::BestEffort);
    let mut store = MemoryStore::new();

    let err = engine.run(&mut store).unwrap_err();

    assert!(matches!(
        err,
        EngineError::ActionFailed {
            version: 3,
            watermark: 2,
            ..
        }
    ));
    assert_eq!(store.get("setver_version"), Some("2"));
}

#[test]
fn all_or_nothing_reruns_earlier_actions_after_a_failure() {
    let log = CallLog::new();
    let engine = engine(&log, &[1, 2, 3], &[3]).with_policy(FailurePolicy::AllOrNothing);
    let mut store = MemoryStore::new();

    assert!(engine.run(&mut store).is_err());
    assert_eq!(store.get("setver_version"), None);

    assert!(engine.run(&mut store).is_err());
    assert_eq!(log.calls(), vec![1, 2, 3, 1, 2, 3]);
}

#[test]
fn action_error_is_kept_as_source() {
    let log = CallLog::new();
    let engine = engine(&log, &[4], &[4]);
    let mut store = MemoryStore::new();

    let err = engine.run(&mut store).unwrap_err();
    let source = std::error::Error::source(&err).map(|s| s.to_string());

    assert_eq!(source.as_deref(), Some("action 4 failed"));
}

#[test]
fn forced_run_ignores_and_keeps_the_watermark() {
    let log = CallLog::new();
    let engine = engine(&log, &[1, 2], &[]);
    let mut store = MemoryStore::from_pairs([("setver_version", "7")]);

    let mut announced = Vec::new();
    let report = engine.force_all(|m| announced.push(m.name().to_string())).unwrap();

    assert_eq!(log.calls(), vec![1, 2]);
    assert_eq!(report.executed, vec![1, 2]);
    assert_eq!(announced, vec!["v1", "v2"]);
    assert_eq!(store.get_option("setver_version").unwrap().as_deref(), Some("7"));
    assert_eq!(store.writes(), 0);

    // The store is still usable for a gated run that skips both.
    engine.run(&mut store).unwrap();
    assert_eq!(log.calls(), vec![1, 2]);
}

#[test]
fn forced_run_stops_at_first_failure() {
    let log = CallLog::new();
    let engine = engine(&log, &[1, 2, 3], &[2]);

    let err = engine.force_all(|_| {}).unwrap_err();

    assert!(matches!(err, EngineError::ForcedActionFailed { version: 2, .. }));
    assert_eq!(log.calls(), vec![1, 2]);
}

#[test]
fn garbage_or_missing_watermark_reads_as_zero() {
    for initial in [None, Some(""), Some("abc"), Some("-4"), Some("12abc")] {
        let log = CallLog::new();
        let engine = engine(&log, &[1], &[]);
        let mut store = match initial {
            Some(value) => MemoryStore::from_pairs([("setver_version", value)]),
            None => MemoryStore::new(),
        };

        engine.run(&mut store).unwrap();

        assert_eq!(log.calls(), vec![1], "initial {:?}", initial);
        assert_eq!(store.get("setver_version"), Some("1"));
    }
}

#[test]
fn custom_version_key_is_used() {
    let log = CallLog::new();
    let engine = engine(&log, &[2], &[]).with_version_key("theme_version");
    let mut store = MemoryStore::from_pairs([("setver_version", "9")]);

    engine.run(&mut store).unwrap();

    assert_eq!(log.calls(), vec![2]);
    assert_eq!(store.get("theme_version"), Some("2"));
    assert_eq!(store.get("setver_version"), Some("9"));
}

#[test]
fn new_registrations_above_watermark_run_on_next_invocation() {
    let log = CallLog::new();
    let mut store = MemoryStore::new();

    engine(&log, &[1, 2], &[]).run(&mut store).unwrap();
    engine(&log, &[1, 2, 3], &[]).run(&mut store).unwrap();

    assert_eq!(log.calls(), vec![1, 2, 3]);
    assert_eq!(store.get("setver_version"), Some("3"));
}

#[test]
fn registrations_below_watermark_never_run() {
    let log = CallLog::new();
    let mut store = MemoryStore::from_pairs([("setver_version", "5")]);

    engine(&log, &[2, 6], &[]).run(&mut store).unwrap();

    assert_eq!(log.calls(), vec![6]);
}

#[test]
fn plan_previews_without_running_or_writing() {
    let log = CallLog::new();
    let engine = engine(&log, &[1, 2, 3], &[]);
    let store = MemoryStore::from_pairs([("setver_version", "1")]);

    let plan = engine.plan(&store).unwrap();

    assert_eq!(plan.current, 1);
    assert_eq!(plan.applied.len(), 1);
    assert_eq!(
        plan.pending.iter().map(|m| m.version()).collect::<Vec<_>>(),
        vec![2, 3]
    );
    assert_eq!(plan.target(), 3);
    assert!(log.calls().is_empty());
    assert_eq!(store.writes(), 0);
}

#[test]
fn uninstall_removes_the_watermark() {
    let engine = Engine::new();
    let mut store = MemoryStore::from_pairs([("setver_version", "4"), ("blogname", "x")]);

    assert!(engine.uninstall(&mut store).unwrap());
    assert!(!engine.uninstall(&mut store).unwrap());
    assert_eq!(store.get("setver_version"), None);
    assert_eq!(store.get("blogname"), Some("x"));
}

#[test]
fn duplicate_from_strict_contributor_fails_the_run() {
    let log = CallLog::new();
    let mut engine = engine(&log, &[1], &[]);
    let strict_log = log.clone();
    engine.contribute(move |registry: &mut Registry| -> Result<(), RegistryError> {
        registry.register_unique(setver::Migration::named(1, "again", strict_log.action(1)))
    });
    let mut store = MemoryStore::new();

    let err = engine.run(&mut store).unwrap_err();

    assert!(matches!(
        err,
        EngineError::Registry(RegistryError::DuplicateVersion { version: 1, .. })
    ));
    assert!(log.calls().is_empty());
    assert_eq!(store.writes(), 0);
}

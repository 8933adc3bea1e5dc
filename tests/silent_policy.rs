// vim: tw=80
//! Behavior under the silent error policy.
//!
//! The policy is process-wide, so it gets its own test binary.  Every test
//! funnels through `install()`, and they serialize on a mutex because the
//! recorded counts are shared.

use std::sync::{Mutex, Once};

use once_cell::sync::Lazy;
use testudo::*;

static SILENT: Lazy<SilentPolicy> = Lazy::new(SilentPolicy::new);
static INSTALL: Once = Once::new();
static SEQ_MTX: Mutex<()> = Mutex::new(());

fn install() -> SilentPolicy {
    INSTALL.call_once(|| set_error_policy(SILENT.clone()));
    SILENT.clone()
}

#[test]
fn unexpected_calls_are_recorded_not_raised() {
    let _g = SEQ_MTX.lock().unwrap();
    let silent = install();
    let before = silent.unexpected_calls();

    let mock = Mock::detached("svc");
    let ping = mock.call_site::<(u32,), ()>("ping");
    let err = ping.try_invoke((1,)).unwrap_err();

    assert!(err.description().contains("unexpected call: svc.ping(1,)"));
    assert!(err.description().contains("no expectations declared"));
    assert_eq!(before + 1, silent.unexpected_calls());
}

#[test]
fn invoke_flattens_to_the_default_value() {
    let _g = SEQ_MTX.lock().unwrap();
    let silent = install();
    let before = silent.unexpected_calls();

    let mock = Mock::detached("svc");
    let count = mock.call_site::<(), u32>("count");
    assert_eq!(0, count.invoke(()));
    assert_eq!(before + 1, silent.unexpected_calls());
}

#[test]
fn rejections_list_every_declared_expectation() {
    let _g = SEQ_MTX.lock().unwrap();
    let silent = install();

    let mock = Mock::detached("gate");
    let enter = mock.call_site::<(u32,), ()>("enter");
    enter.expect().withf(|(badge,)| *badge == 1).once();
    enter.expect().never();

    let err = enter.try_invoke((9,)).unwrap_err();
    assert!(err.description().contains("2 expectation(s) declared"));
    assert!(err.description().contains("arguments do not match"));
    assert!(err.description().contains("already saturated"));
    assert!(!silent.unexpected_call_log().is_empty());
}

#[test]
fn verify_collects_every_violation() {
    let _g = SEQ_MTX.lock().unwrap();
    let silent = install();
    let before = silent.violations();

    let mock = Mock::detached("batch");
    let a = mock.call_site::<(), ()>("a");
    let b = mock.call_site::<(), ()>("b");
    let c = mock.call_site::<(), ()>("c");
    a.expect().once();
    b.expect().times(2);
    c.expect().at_most(1);   // satisfied by absence

    assert!(!mock.verify());
    assert_eq!(before + 2, silent.violations());

    let log = silent.violation_log();
    let tail = &log[log.len() - 2..];
    assert!(tail.iter().any(|v| v.contains("batch.a #0")));
    assert!(tail.iter().any(|v| v.contains("batch.b #0")));
    assert!(tail.iter().all(|v| v.starts_with("unmet expectation:")));
}

#[test]
fn verification_reports_shape() {
    let _g = SEQ_MTX.lock().unwrap();
    let silent = install();

    let mock = Mock::detached("timer");
    let start = mock.call_site::<(u64,), ()>("start");
    start.expect().between(2, 4);
    start.invoke((1,));

    assert!(!mock.verify());
    let last = silent.violation_log().pop().unwrap();
    assert!(last.contains("timer.start #0"));
    assert!(last.contains("between 2 and 4 times"));
    assert!(last.contains("fired 1 time(s)"));
}

#[test]
fn spent_responses_go_through_the_policy() {
    let _g = SEQ_MTX.lock().unwrap();
    let silent = install();
    let before = silent.unexpected_calls();

    let mock = Mock::detached("vault");
    let take = mock.call_site::<(), String>("take");
    take.expect().moves("key".to_string());

    assert_eq!("key", take.try_invoke(()).unwrap());
    let err = take.try_invoke(()).unwrap_err();
    assert!(err.description().contains("one-shot response"));
    assert_eq!(before + 1, silent.unexpected_calls());
}

#[cfg(not(feature = "nightly"))]
#[test]
fn missing_responses_go_through_the_policy() {
    let _g = SEQ_MTX.lock().unwrap();
    let silent = install();
    let before = silent.unexpected_calls();

    let mock = Mock::detached("source");
    let fetch = mock.call_site::<(), u64>("fetch");
    fetch.expect();

    let err = fetch.try_invoke(()).unwrap_err();
    assert!(err.description().contains("no response is configured"));
    assert_eq!(before + 1, silent.unexpected_calls());
}

#[cfg(feature = "nightly")]
#[test]
fn missing_responses_fall_back_to_default_on_nightly() {
    let _g = SEQ_MTX.lock().unwrap();
    let silent = install();
    let before = silent.unexpected_calls();

    let mock = Mock::detached("source");
    let fetch = mock.call_site::<(), u64>("fetch");
    fetch.expect();

    assert_eq!(0, fetch.try_invoke(()).unwrap());
    assert_eq!(before, silent.unexpected_calls());
}

#[test]
fn installing_a_second_policy_panics() {
    let _g = SEQ_MTX.lock().unwrap();
    install();

    let attempt = std::panic::catch_unwind(|| {
        set_error_policy(SilentPolicy::new());
    });
    assert!(attempt.is_err());
}

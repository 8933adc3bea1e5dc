// vim: tw=80
//! Cardinality bounds and what verification makes of them.
//!
//! Under the default policy a verification failure prints to stderr and
//! shows up as `verify() == false`; it never panics, so one walk can report
//! every violation.

use testudo::*;

#[test]
fn once_must_happen() {
    let mock = Mock::detached("mailer");
    let send = mock.call_site::<(String,), ()>("send");
    send.expect().once();

    assert!(!mock.verify());
    send.invoke(("hi".to_string(),));
    assert!(mock.verify());
}

#[test]
fn verification_is_pure_and_repeatable() {
    let mock = Mock::detached("mailer");
    let send = mock.call_site::<(String,), ()>("send");
    send.expect().once();

    assert!(!mock.verify());
    assert!(!mock.verify());
    send.invoke(("hi".to_string(),));
    assert!(mock.verify());
    assert!(mock.verify());
}

#[test]
fn at_least_has_no_upper_bound() {
    let mock = Mock::detached("poller");
    let tick = mock.call_site::<(), ()>("tick");
    tick.expect().at_least(2);

    tick.invoke(());
    assert!(!mock.verify());
    tick.invoke(());
    assert!(mock.verify());
    for _ in 0..10 {
        tick.invoke(());
    }
    assert!(mock.verify());
}

#[test]
fn at_most_is_satisfied_by_absence() {
    let mock = Mock::detached("cache");
    let evict = mock.call_site::<(u32,), ()>("evict");
    evict.expect().at_most(2);

    assert!(mock.verify());
    evict.invoke((1,));
    evict.invoke((2,));
    assert!(mock.verify());
}

#[test]
fn between_requires_the_lower_bound() {
    let mock = Mock::detached("retrier");
    let attempt = mock.call_site::<(), bool>("attempt");
    attempt.expect().between(1, 3).returns(true);

    assert!(!mock.verify());
    attempt.invoke(());
    assert!(mock.verify());
    attempt.invoke(());
    attempt.invoke(());
    assert!(mock.verify());
}

#[test]
#[should_panic(expected = "already saturated")]
fn between_enforces_the_upper_bound_at_call_time() {
    let mock = Mock::detached("retrier");
    let attempt = mock.call_site::<(), bool>("attempt");
    attempt.expect().between(1, 2).returns(true);

    attempt.invoke(());
    attempt.invoke(());
    attempt.invoke(());
}

#[test]
fn times_zero_reads_as_never() {
    let mock = Mock::detached("m");
    let f = mock.call_site::<(), ()>("f");
    f.expect().times(0);

    assert!(mock.verify());
}

// vim: tw=80
//! Saturated expectations step aside; never-expectations are born that way.

use testudo::*;

#[test]
fn a_saturated_expectation_steps_aside() {
    let mock = Mock::detached("ids");
    let next = mock.call_site::<(), u32>("next");
    next.expect().times(2).returns(1);
    next.expect().times(2).returns(9);

    assert_eq!(1, next.invoke(()));
    assert_eq!(1, next.invoke(()));
    assert_eq!(9, next.invoke(()));
    assert_eq!(9, next.invoke(()));
    assert!(mock.verify());
}

#[test]
#[should_panic(expected = "already saturated")]
fn extra_calls_with_no_fallback_are_unexpected() {
    let mock = Mock::detached("ids");
    let next = mock.call_site::<(), u32>("next");
    next.expect().once().returns(1);

    assert_eq!(1, next.invoke(()));
    next.invoke(());
}

#[test]
fn never_lets_matching_calls_fall_through() {
    let mock = Mock::detached("cache");
    let load = mock.call_site::<(u32,), u32>("load");
    load.expect().never();
    load.expect().returns(5);

    assert_eq!(5, load.invoke((1,)));
    assert!(mock.verify());
}

#[test]
#[should_panic(expected = "unexpected call")]
fn never_alone_rejects_the_call() {
    let mock = Mock::detached("auditor");
    let purge = mock.call_site::<(), ()>("purge");
    purge.expect().never();

    purge.invoke(());
}

#[test]
fn saturation_respects_constraints_separately() {
    let mock = Mock::detached("router");
    let route = mock.call_site::<(u32,), &'static str>("route");
    route.expect().withf(|(p,)| *p < 10).once().returns("low");
    route.expect().returns("high");

    assert_eq!("low", route.invoke((3,)));
    // the low route saturated; another low packet falls through
    assert_eq!("high", route.invoke((4,)));
    assert_eq!("high", route.invoke((90,)));
    assert!(mock.verify());
}

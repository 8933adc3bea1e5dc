// vim: tw=80
//! The registry tree: children, the global root, and detached mocks.
//!
//! Tests that touch the process-wide root serialize on a mutex, since the
//! harness runs tests in this binary concurrently.

use std::sync::Mutex;

use testudo::*;

static ROOT_MTX: Mutex<()> = Mutex::new(());

#[test]
fn a_childs_violation_fails_the_parent() {
    let manager = Mock::detached("manager");
    let timer = manager.child_named("timer");
    let start = timer.call_site::<(u64,), ()>("start");
    start.expect().once();

    assert!(!manager.verify());
    start.invoke((250,));
    assert!(manager.verify());
}

#[test]
fn grandchildren_are_reached_too() {
    let top = Mock::detached("top");
    let mid = top.child_named("mid");
    let leaf = mid.child_named("leaf");
    let f = leaf.call_site::<(), ()>("f");
    f.expect().once();

    assert!(!top.verify());
    f.invoke(());
    assert!(top.verify());
}

#[test]
fn verifying_a_subtree_ignores_siblings() {
    let parent = Mock::detached("parent");
    let left = parent.child_named("left");
    let right = parent.child_named("right");
    let l = left.call_site::<(), ()>("go");
    let r = right.call_site::<(), ()>("go");
    l.expect().once();
    r.expect().once();

    l.invoke(());
    assert!(left.verify());
    assert!(!right.verify());
    assert!(!parent.verify());
}

#[test]
fn global_verify_covers_named_mocks() {
    let _g = ROOT_MTX.lock().unwrap();
    testudo::reset();

    let svc = Mock::named("svc");
    let tick = svc.call_site::<(), ()>("tick");
    tick.expect().once();

    assert!(!testudo::verify());
    tick.invoke(());
    assert!(testudo::verify());
    testudo::reset();
}

#[test]
fn global_reset_discards_everything_under_the_root() {
    let _g = ROOT_MTX.lock().unwrap();
    testudo::reset();

    let a = Mock::named("a");
    let b = Mock::named("b");
    let fa = a.call_site::<(), ()>("f");
    let fb = b.call_site::<(), ()>("f");
    fa.expect().once();
    fb.expect().times(3);

    assert!(!testudo::verify());
    testudo::reset();
    assert!(testudo::verify());

    // sites survive a reset and accept fresh expectations
    fa.expect().once();
    fa.invoke(());
    assert!(testudo::verify());
    testudo::reset();
}

#[test]
fn dropped_mocks_leave_the_registry() {
    let _g = ROOT_MTX.lock().unwrap();
    testudo::reset();

    {
        let ephemeral = Mock::named("ephemeral");
        let f = ephemeral.call_site::<(), ()>("f");
        f.expect().once();
        assert!(!testudo::verify());
    }
    assert!(testudo::verify());
}

#[test]
fn detached_trees_are_invisible_to_the_global_walk() {
    let _g = ROOT_MTX.lock().unwrap();
    testudo::reset();

    let island = Mock::detached("island");
    let f = island.call_site::<(), ()>("f");
    f.expect().once();

    assert!(testudo::verify());
    assert!(!island.verify());
    f.invoke(());
    assert!(island.verify());
}

#[test]
#[should_panic(expected = "the only one.get_todo")]
fn late_renaming_shows_up_in_reports() {
    let manager = Mock::detached("anonymous");
    let get_todo = manager.call_site::<(), ()>("get_todo");
    manager.set_name("the only one");

    get_todo.invoke(());
}

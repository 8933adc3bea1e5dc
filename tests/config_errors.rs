// vim: tw=80
//! Declaration mistakes fail fast, at the declaration itself.

use testudo::*;

#[test]
#[should_panic(expected = "lower bound exceeds upper bound")]
fn a_backwards_range_panics_at_declaration() {
    let mock = Mock::detached("m");
    let f = mock.call_site::<(), ()>("f");
    f.expect().between(3, 1);
}

#[test]
fn an_empty_range_is_fine() {
    let mock = Mock::detached("m");
    let f = mock.call_site::<(), ()>("f");
    f.expect().between(2, 2);
    f.invoke(());
    f.invoke(());
    assert!(mock.verify());
}

#[test]
#[should_panic(expected = "already registered with a different signature")]
fn one_tag_cannot_carry_two_signatures() {
    let mock = Mock::detached("m");
    let _first = mock.call_site::<(u32,), ()>("f");
    let _second = mock.call_site::<(String,), ()>("f");
}

#[test]
#[should_panic(expected = "no call site tagged")]
fn expecting_an_unregistered_tag_panics() {
    let mock = Mock::detached("m");
    mock.expect::<(), ()>("missing");
}

#[test]
#[should_panic(expected = "registered with a different signature")]
fn expecting_with_the_wrong_signature_panics() {
    let mock = Mock::detached("m");
    mock.call_site::<(u32,), u32>("f");
    mock.expect::<(u32,), String>("f");
}

#[test]
fn tags_are_scoped_per_mock() {
    let a = Mock::detached("a");
    let b = Mock::detached("b");
    let fa = a.call_site::<(u32,), ()>("f");
    let fb = b.call_site::<(String,), ()>("f");

    fa.expect().once();
    fb.expect().once();
    fa.invoke((1,));
    fb.invoke(("one".to_string(),));
    assert!(a.verify());
    assert!(b.verify());
}

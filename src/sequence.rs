// vim: tw=80
//! Cross-expectation call ordering.

use std::sync::{Arc, Mutex};

use crate::cardinality::Cardinality;

/// One member expectation, in joining order.
struct Slot {
    card: Arc<Cardinality>,
    /// The member was discarded by a reset.  It no longer takes part in the
    /// ordering decision.
    detached: bool,
}

#[derive(Default)]
struct SeqInner {
    slots: Mutex<Vec<Slot>>,
}

impl SeqInner {
    /// May the member in slot `seq` fire?  It may once every live
    /// predecessor has reached its minimum call count.  A member whose
    /// minimum is zero never blocks its successors.
    fn is_unblocked(&self, seq: usize) -> bool {
        let slots = self.slots.lock().unwrap();
        slots[..seq].iter().all(|s| s.detached || s.card.is_satisfied())
    }

    fn detach(&self, seq: usize) {
        let mut slots = self.slots.lock().unwrap();
        if let Some(slot) = slots.get_mut(seq) {
            slot.detached = true;
        }
    }

    fn join(&self, card: Arc<Cardinality>) -> usize {
        let mut slots = self.slots.lock().unwrap();
        slots.push(Slot { card, detached: false });
        slots.len() - 1
    }
}

/// An expectation's membership in a [`Sequence`].
///
/// Dropping the handle, which happens when the owning call site is reset,
/// detaches the member so it stops gating its successors.
pub(crate) struct SeqHandle {
    inner: Arc<SeqInner>,
    seq: usize,
}

impl SeqHandle {
    pub fn is_unblocked(&self) -> bool {
        self.inner.is_unblocked(self.seq)
    }
}

impl Drop for SeqHandle {
    fn drop(&mut self) {
        self.inner.detach(self.seq);
    }
}

/// Used to require that expectations fire in the order they joined the
/// sequence, even across different call sites or different mocks.
///
/// An expectation becomes eligible once every earlier member has fired at
/// least its minimum number of times.  Joining does not restrict the
/// member's cardinality; an `at_most` member that never fires does not hold
/// the sequence up.
///
/// # Examples
/// ```
/// use testudo::{Mock, Sequence};
///
/// let mock = Mock::detached("file");
/// let open = mock.call_site::<(String,), ()>("open");
/// let close = mock.call_site::<(), ()>("close");
///
/// let mut seq = Sequence::new();
/// open.expect().once().in_sequence(&mut seq);
/// close.expect().once().in_sequence(&mut seq);
///
/// open.invoke(("a.txt".into(),));
/// close.invoke(());
/// assert!(mock.verify());
/// ```
///
/// Calling out of order is an unexpected call.
/// ```should_panic(expected = "unexpected call")
/// use testudo::{Mock, Sequence};
///
/// let mock = Mock::detached("file");
/// let open = mock.call_site::<(String,), ()>("open");
/// let close = mock.call_site::<(), ()>("close");
///
/// let mut seq = Sequence::new();
/// open.expect().once().in_sequence(&mut seq);
/// close.expect().once().in_sequence(&mut seq);
///
/// close.invoke(());   // panics
/// ```
#[derive(Default)]
pub struct Sequence {
    inner: Arc<SeqInner>,
}

impl Sequence {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn join(&mut self, card: Arc<Cardinality>) -> SeqHandle {
        SeqHandle {
            seq: self.inner.join(card),
            inner: self.inner.clone(),
        }
    }
}

// vim: tw=80
//! Expectation state and the fluent declaration handle.

use std::sync::{Arc, Mutex};

use predicates::prelude::Predicate;

use crate::action::{Action, ActionChain};
use crate::call_site::CallSite;
use crate::cardinality::Cardinality;
use crate::matcher::Matcher;
use crate::sequence::{SeqHandle, Sequence};

/// Why an expectation refused to consume a call.
pub(crate) enum Rejection {
    /// The constraint rejected the arguments.  Carries the predicate's
    /// failure case tree when one is available.
    Mismatch(Option<String>),
    Saturated { consumed: usize },
    OutOfOrder,
}

impl Rejection {
    pub fn explain(&self) -> String {
        match self {
            Rejection::Mismatch(None) => "arguments do not match".into(),
            Rejection::Mismatch(Some(tree)) => {
                let mut s = String::from("arguments do not match");
                for line in tree.lines() {
                    s.push_str("\n       ");
                    s.push_str(line);
                }
                s
            }
            Rejection::Saturated { consumed } => {
                format!("already saturated after {consumed} call(s)")
            }
            Rejection::OutOfOrder => {
                "blocked: an earlier member of its sequence has not fired \
                 often enough"
                    .into()
            }
        }
    }
}

/// The stored state of one declared expectation.
pub(crate) struct ExpectationState<I, O> {
    /// Position in the declaration order of the owning call site.
    ordinal: usize,
    matcher: Matcher<I>,
    card: Arc<Cardinality>,
    seq_handle: Option<SeqHandle>,
    chain: ActionChain<I, O>,
}

impl<I, O> ExpectationState<I, O> {
    pub fn new(ordinal: usize) -> Self {
        ExpectationState {
            ordinal,
            matcher: Matcher::default(),
            card: Arc::new(Cardinality::default()),
            seq_handle: None,
            chain: ActionChain::default(),
        }
    }

    /// Decide whether this expectation consumes a call with arguments `i`.
    ///
    /// Constraint first, then saturation, then sequence order.  The first
    /// failed check names the rejection, which keeps diagnostics stable.
    pub fn eligibility(&self, i: &I) -> Result<(), Rejection> {
        if !self.matcher.matches(i) {
            return Err(Rejection::Mismatch(self.matcher.mismatch(i)));
        }
        if self.card.is_saturated() {
            return Err(Rejection::Saturated { consumed: self.card.count() });
        }
        if let Some(handle) = &self.seq_handle {
            if !handle.is_unblocked() {
                return Err(Rejection::OutOfOrder);
            }
        }
        Ok(())
    }

    /// Consume one call: advance the count and pick the serving action.
    pub fn consume(&mut self) -> Option<Arc<Mutex<Action<I, O>>>> {
        let nth = self.card.increment() - 1;
        self.chain.select(nth)
    }

    /// One line naming the declared shape, for diagnostics.
    pub fn describe(&self) -> String {
        format!("#{} expected {}, matching {}", self.ordinal, self.card,
            self.matcher)
    }

    /// The verification failure for this expectation, or `None` if its
    /// minimum has been met.  Never mutates anything.
    pub fn violation(&self) -> Option<String> {
        if self.card.is_satisfied() {
            None
        } else {
            Some(format!("#{} expected {}, matching {}, fired {} time(s)",
                self.ordinal, self.card, self.matcher, self.card.count()))
        }
    }
}

/// Configures the expectation most recently declared on a call site.
///
/// Returned by [`CallSite::expect`] and [`Mock::expect`](crate::Mock::expect).
/// All methods take `&mut self` and return `&mut Self`, so a declaration
/// usually reads as one chain:
///
/// ```
/// use testudo::{predicate, Mock};
///
/// let mock = Mock::detached("store");
/// let get = mock.call_site::<(u32,), Option<String>>("get");
/// get.expect()
///     .times(2)
///     .with(predicate::eq((7,)))
///     .returns(Some("seven".to_string()));
///
/// assert_eq!(Some("seven".to_string()), get.invoke((7,)));
/// assert_eq!(Some("seven".to_string()), get.invoke((7,)));
/// ```
///
/// The handle may also be bound and extended in steps, which is how
/// declarations that mix constraints and response chains usually read.
/// Configuration mistakes (a backwards call count range, joining two
/// sequences) panic at declaration time rather than surfacing later as
/// spurious match failures.
pub struct ExpectationBuilder<I: 'static, O: 'static> {
    site: CallSite<I, O>,
    index: usize,
}

impl<I: 'static, O: 'static> ExpectationBuilder<I, O> {
    pub(crate) fn new(site: CallSite<I, O>, index: usize) -> Self {
        ExpectationBuilder { site, index }
    }

    fn with_state<R>(&self, f: impl FnOnce(&mut ExpectationState<I, O>) -> R)
        -> R
    {
        self.site.with_expectation(self.index, f)
    }

    /// Require this expectation to fire exactly once.
    ///
    /// ```
    /// use testudo::Mock;
    ///
    /// let mock = Mock::detached("greeter");
    /// let hello = mock.call_site::<(String,), String>("hello");
    /// hello.expect()
    ///     .once()
    ///     .returns("hi".to_string());
    ///
    /// assert_eq!("hi", hello.invoke(("bob".to_string(),)));
    /// assert!(mock.verify());
    /// ```
    pub fn once(&mut self) -> &mut Self {
        self.with_state(|e| e.card.set_exact(1));
        self
    }

    /// Forbid this expectation from firing at all.
    ///
    /// A `never` expectation is born saturated, so a matching call skips it
    /// and, if nothing else consumes the call, fails.
    ///
    /// ```should_panic(expected = "unexpected call")
    /// use testudo::Mock;
    ///
    /// let mock = Mock::detached("auditor");
    /// let purge = mock.call_site::<(), ()>("purge");
    /// purge.expect().never();
    ///
    /// purge.invoke(());   // panics
    /// ```
    pub fn never(&mut self) -> &mut Self {
        self.with_state(|e| e.card.set_exact(0));
        self
    }

    /// Require exactly `n` calls.
    pub fn times(&mut self, n: usize) -> &mut Self {
        self.with_state(|e| e.card.set_exact(n));
        self
    }

    /// Require at least `n` calls, with no upper bound.
    pub fn at_least(&mut self, n: usize) -> &mut Self {
        self.with_state(|e| e.card.set_min(n));
        self
    }

    /// Allow at most `n` calls, requiring none.
    pub fn at_most(&mut self, n: usize) -> &mut Self {
        self.with_state(|e| e.card.set_max(n));
        self
    }

    /// Require between `min` and `max` calls, inclusive at both ends.
    pub fn between(&mut self, min: usize, max: usize) -> &mut Self {
        if min > max {
            panic!("between({min}, {max}): lower bound exceeds upper bound");
        }
        self.with_state(|e| e.card.set_range(min, max));
        self
    }

    /// Constrain the argument tuple with a [`Predicate`].
    ///
    /// Compose per-argument predicates with [`params!`](crate::params).
    /// Declaring a second constraint replaces the first.
    pub fn with<P>(&mut self, p: P) -> &mut Self
        where P: Predicate<I> + Send + 'static
    {
        self.with_state(|e| e.matcher = Matcher::new(p));
        self
    }

    /// Constrain the argument tuple with a plain function.
    ///
    /// ```
    /// use testudo::Mock;
    ///
    /// let mock = Mock::detached("calc");
    /// let div = mock.call_site::<(u32, u32), u32>("div");
    /// div.expect()
    ///     .withf(|(_, d)| *d != 0)
    ///     .calls(|(n, d)| n / d);
    ///
    /// assert_eq!(4, div.invoke((8, 2)));
    /// ```
    pub fn withf<F>(&mut self, f: F) -> &mut Self
        where F: Fn(&I) -> bool + Send + 'static
    {
        self.with_state(|e| {
            e.matcher = Matcher::new(predicates::function::function(f))
        });
        self
    }

    /// Add this expectation to the end of `seq`.
    ///
    /// The expectation only becomes eligible once every earlier member of
    /// the sequence has fired at least its minimum number of times.  An
    /// expectation may join at most one sequence.
    pub fn in_sequence(&mut self, seq: &mut Sequence) -> &mut Self {
        let joined = self.with_state(|e| {
            if e.seq_handle.is_some() {
                false
            } else {
                e.seq_handle = Some(seq.join(e.card.clone()));
                true
            }
        });
        if !joined {
            panic!("this expectation is already a member of a sequence");
        }
        self
    }

    /// Append a response that returns a clone of `value`.
    pub fn returns(&mut self, value: O) -> &mut Self
        where O: Clone + Send
    {
        self.with_state(|e| e.chain.push(Action::from_value(value)));
        self
    }

    /// Append a response computed from the arguments.
    ///
    /// ```
    /// use testudo::Mock;
    ///
    /// let mock = Mock::detached("calc");
    /// let add = mock.call_site::<(u32, u32), u32>("add");
    /// add.expect().calls(|(x, y)| x + y);
    ///
    /// assert_eq!(5, add.invoke((2, 3)));
    /// ```
    pub fn calls<F>(&mut self, f: F) -> &mut Self
        where F: FnMut(I) -> O + Send + 'static
    {
        self.with_state(|e| e.chain.push(Action::from_fn(f)));
        self
    }

    /// Single threaded version of [`calls`](Self::calls), for closures that
    /// aren't `Send`.  The closure must run on the thread that declared it.
    pub fn calls_st<F>(&mut self, f: F) -> &mut Self
        where F: FnMut(I) -> O + 'static
    {
        self.with_state(|e| e.chain.push(Action::from_fn_st(f)));
        self
    }

    /// Append a response that moves `value` out to the caller.  The slot
    /// serves exactly one call; if it is the last entry in the chain, a
    /// further call is a failure rather than a repeat.
    pub fn moves(&mut self, value: O) -> &mut Self
        where O: Send
    {
        self.with_state(|e| e.chain.push(Action::from_value_once(value)));
        self
    }

    /// Single threaded version of [`moves`](Self::moves), for values that
    /// aren't `Send`.
    pub fn moves_st(&mut self, value: O) -> &mut Self {
        self.with_state(|e| e.chain.push(Action::from_value_once_st(value)));
        self
    }

    /// Append a response that panics with `msg`, for driving the caller's
    /// failure paths.
    ///
    /// ```should_panic(expected = "disk full")
    /// use testudo::Mock;
    ///
    /// let mock = Mock::detached("fs");
    /// let write = mock.call_site::<(Vec<u8>,), ()>("write");
    /// write.expect().panics("disk full");
    ///
    /// write.invoke((vec![1, 2, 3],));   // panics
    /// ```
    pub fn panics<S: Into<String>>(&mut self, msg: S) -> &mut Self {
        self.with_state(|e| e.chain.push(Action::from_panic(msg)));
        self
    }
}

// vim: tw=80
//! Configured responses for expectations.

use std::any::Any;
use std::mem;
use std::sync::{Arc, Mutex};

use cfg_if::cfg_if;
use fragile::Fragile;

/// One configured response of an expectation.
pub(crate) enum Action<I, O> {
    /// Runs for every call it serves.
    Call(Box<dyn FnMut(I) -> O + Send>),
    /// Runs once, then the slot expires.
    // Would be Box<dyn FnOnce> if boxed FnOnce could be called through
    // mem::replace without unsizing gymnastics.
    Once(Box<dyn FnMut(I) -> O + Send>),
    /// A one-shot action that has already produced its value.
    Spent,
    /// A deliberate failure with a fixed message.
    Panic(String),
}

/// What running an action yielded.  `Panic` is returned rather than raised so
/// the call site can drop its locks first.
pub(crate) enum Produced<O> {
    Value(O),
    Spent,
    Panic(String),
}

impl<I, O> Action<I, O> {
    pub fn from_value(value: O) -> Self
        where O: Clone + Send + 'static
    {
        Action::Call(Box::new(move |_| value.clone()))
    }

    pub fn from_fn<F>(f: F) -> Self
        where F: FnMut(I) -> O + Send + 'static
    {
        Action::Call(Box::new(f))
    }

    /// Like [`from_fn`](Self::from_fn), but for closures that aren't `Send`.
    /// The `Fragile` wrapper asserts at runtime that the closure only ever
    /// runs on the thread that configured it.
    pub fn from_fn_st<F>(f: F) -> Self
        where F: FnMut(I) -> O + 'static
    {
        let mut fragile = Fragile::new(f);
        Action::Call(Box::new(move |i| (fragile.get_mut())(i)))
    }

    pub fn from_value_once(value: O) -> Self
        where O: Send + 'static
    {
        let mut value = Some(value);
        Action::Once(Box::new(move |_| match value.take() {
            Some(v) => v,
            // run() expires the slot before a second call can reach it
            None => unreachable!(),
        }))
    }

    pub fn from_value_once_st(value: O) -> Self
        where O: 'static
    {
        let mut value = Fragile::new(Some(value));
        Action::Once(Box::new(move |_| match value.get_mut().take() {
            Some(v) => v,
            None => unreachable!(),
        }))
    }

    pub fn from_panic<S: Into<String>>(msg: S) -> Self {
        Action::Panic(msg.into())
    }

    pub fn run(&mut self, i: I) -> Produced<O> {
        match self {
            Action::Call(f) => Produced::Value(f(i)),
            Action::Once(_) => {
                let taken = mem::replace(self, Action::Spent);
                if let Action::Once(mut f) = taken {
                    Produced::Value(f(i))
                } else {
                    unreachable!()
                }
            }
            Action::Spent => Produced::Spent,
            Action::Panic(msg) => Produced::Panic(msg.clone()),
        }
    }
}

/// The ordered response chain of one expectation.
///
/// The n-th consumed call runs the n-th action.  When calls outnumber
/// actions, the final action keeps serving.
pub(crate) struct ActionChain<I, O> {
    actions: Vec<Arc<Mutex<Action<I, O>>>>,
}

impl<I, O> ActionChain<I, O> {
    pub fn push(&mut self, action: Action<I, O>) {
        self.actions.push(Arc::new(Mutex::new(action)));
    }

    /// The action serving the `nth` consumed call (zero based), or `None` if
    /// no response was ever configured.
    ///
    /// An `Arc` comes back instead of a borrow so the expectation list lock
    /// can be released before the action runs.  Actions may themselves
    /// invoke mocks.
    pub fn select(&self, nth: usize) -> Option<Arc<Mutex<Action<I, O>>>> {
        match self.actions.len() {
            0 => None,
            len => Some(self.actions[nth.min(len - 1)].clone()),
        }
    }
}

impl<I, O> Default for ActionChain<I, O> {
    fn default() -> Self {
        ActionChain { actions: Vec::new() }
    }
}

cfg_if! {
    if #[cfg(feature = "nightly")] {
        /// The output of an expectation whose action chain is empty.  Unit
        /// always succeeds; on nightly, any `Default` output succeeds.
        pub(crate) fn default_response<O: 'static>() -> Option<O> {
            DefaultReturner::<O>::return_default()
        }

        struct DefaultReturner<O: 'static>(std::marker::PhantomData<O>);

        trait ReturnDefault<O> {
            fn return_default() -> Option<O>;
        }

        impl<O: 'static> ReturnDefault<O> for DefaultReturner<O> {
            default fn return_default() -> Option<O> {
                unit_value()
            }
        }

        impl<O: Default + 'static> ReturnDefault<O> for DefaultReturner<O> {
            fn return_default() -> Option<O> {
                Some(O::default())
            }
        }
    } else {
        /// The output of an expectation whose action chain is empty.  Only
        /// unit can be produced out of thin air on stable; everything else
        /// is a missing-action failure.
        pub(crate) fn default_response<O: 'static>() -> Option<O> {
            unit_value()
        }
    }
}

/// `Some(())` when `O` is the unit type, `None` otherwise.
fn unit_value<O: 'static>() -> Option<O> {
    let mut slot = None::<O>;
    if let Some(unit) = (&mut slot as &mut dyn Any).downcast_mut::<Option<()>>()
    {
        *unit = Some(());
    }
    slot
}

#[cfg(test)]
mod t {
    use super::*;
    use pretty_assertions::assert_eq;

    fn value_of<O>(p: Produced<O>) -> O {
        match p {
            Produced::Value(v) => v,
            Produced::Spent => panic!("action was spent"),
            Produced::Panic(msg) => panic!("{msg}"),
        }
    }

    #[test]
    fn empty_chain_selects_nothing() {
        let chain = ActionChain::<(), u32>::default();
        assert!(chain.select(0).is_none());
    }

    #[test]
    fn last_action_keeps_serving() {
        let mut chain = ActionChain::<(), u32>::default();
        chain.push(Action::from_value(1));
        chain.push(Action::from_value(2));
        let picks = [0usize, 1, 2, 7]
            .iter()
            .map(|n| {
                let action = chain.select(*n).unwrap();
                let mut action = action.lock().unwrap();
                value_of(action.run(()))
            })
            .collect::<Vec<_>>();
        assert_eq!(vec![1, 2, 2, 2], picks);
    }

    #[test]
    fn once_expires_after_one_run() {
        let mut action = Action::<(), String>::from_value_once("hi".into());
        assert_eq!("hi", value_of(action.run(())));
        assert!(matches!(action.run(()), Produced::Spent));
    }

    #[test]
    fn panic_action_reports_without_unwinding() {
        let mut action = Action::<(), ()>::from_panic("boom");
        match action.run(()) {
            Produced::Panic(msg) => assert_eq!("boom", msg),
            _ => panic!("expected a panic response"),
        }
    }

    #[test]
    fn closures_see_the_arguments() {
        let mut action = Action::from_fn(|(x, y): (u32, u32)| x + y);
        assert_eq!(5, value_of(action.run((2, 3))));
    }

    #[test]
    fn unit_comes_for_free() {
        struct Opaque;
        assert_eq!(Some(()), default_response::<()>());
        assert!(default_response::<Opaque>().is_none());
    }
}

// vim: tw=80
//! Standalone callable mocks.

use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::call_site::{CallSite, UnexpectedCall};
use crate::expectation::ExpectationBuilder;
use crate::registry::Mock;

static FUNCTORS: AtomicUsize = AtomicUsize::new(0);

fn next_functor_name() -> String {
    format!("functor#{}", FUNCTORS.fetch_add(1, Ordering::Relaxed))
}

/// A mock of a bare callable: a registry node with a single call site.
///
/// Useful for callbacks and hooks that are functions rather than trait
/// objects.  The functor registers under the process-wide root, so the free
/// [`verify`](crate::verify) covers it.  Clones share state: a clone moved
/// into the code under test keeps responding, and counting, after the
/// declaring handle goes out of scope.
///
/// # Examples
/// ```
/// use testudo::Functor;
///
/// let on_change = Functor::<(u32,), ()>::named("on_change");
/// on_change.expect().once().withf(|(v,)| *v > 0);
///
/// // wrap a clone for the code under test
/// let hook = on_change.clone();
/// let callback: Box<dyn Fn(u32)> = Box::new(move |v| hook.invoke((v,)));
///
/// callback(5);
/// assert!(on_change.verify());
/// ```
pub struct Functor<I: 'static, O: 'static> {
    mock: Mock,
    site: CallSite<I, O>,
}

impl<I, O> Clone for Functor<I, O> {
    fn clone(&self) -> Self {
        Functor {
            mock: self.mock.clone(),
            site: self.site.clone(),
        }
    }
}

impl<I, O> Functor<I, O>
    where I: fmt::Debug + 'static, O: 'static
{
    /// An anonymous functor.  Its generated name still shows up in failure
    /// reports; prefer [`named`](Functor::named) when a test mocks several.
    pub fn new() -> Self {
        Self::named(next_functor_name())
    }

    /// A functor named for diagnostics.
    pub fn named<S: Into<String>>(name: S) -> Self {
        let mock = Mock::named(name);
        let site = mock.call_site::<I, O>("_");
        Functor { mock, site }
    }
}

impl<I: 'static, O: 'static> Functor<I, O> {
    /// Like [`named`](Functor::named), for argument tuples that aren't
    /// `Debug`.
    pub fn opaque<S: Into<String>>(name: S) -> Self {
        let mock = Mock::named(name);
        let site = mock.call_site_opaque::<I, O>("_");
        Functor { mock, site }
    }

    /// Declare an expectation on the functor.
    pub fn expect(&self) -> ExpectationBuilder<I, O> {
        self.site.expect()
    }

    pub fn invoke(&self, args: I) -> O
        where O: Default
    {
        self.site.invoke(args)
    }

    pub fn try_invoke(&self, args: I) -> Result<O, UnexpectedCall> {
        self.site.try_invoke(args)
    }

    /// Verify just this functor.
    pub fn verify(&self) -> bool {
        self.mock.verify()
    }

    /// Discard the functor's expectations, keeping it registered.
    pub fn reset(&self) {
        self.mock.reset()
    }

    /// The underlying registry node, for renaming or parenting.
    pub fn mock(&self) -> &Mock {
        &self.mock
    }

    /// The underlying call site.
    pub fn site(&self) -> &CallSite<I, O> {
        &self.site
    }
}

impl<I, O> Default for Functor<I, O>
    where I: fmt::Debug + 'static, O: 'static
{
    fn default() -> Self {
        Self::new()
    }
}

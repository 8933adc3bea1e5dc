// vim: tw=80
//! The mock registry: named nodes, their call sites, and the verification
//! walk.

use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, Weak};

use downcast::{downcast, Any};
use once_cell::sync::Lazy;

use crate::call_site::CallSite;
use crate::expectation::ExpectationBuilder;
use crate::policy::{self, ErrorPolicy};

/// Type-erased access to a [`CallSite`], for storage in a node's tag map
/// and for the verification walk.
pub(crate) trait AnySite: Any + Send + Sync {
    fn verify_with(&self, policy: &dyn ErrorPolicy) -> bool;
    fn reset(&self);
}
downcast!(dyn AnySite);

impl<I: 'static, O: 'static> AnySite for CallSite<I, O> {
    fn verify_with(&self, policy: &dyn ErrorPolicy) -> bool {
        CallSite::verify_with(self, policy)
    }

    fn reset(&self) {
        CallSite::reset(self)
    }
}

struct SiteEntry {
    tag: String,
    site: Box<dyn AnySite>,
}

pub(crate) struct NodeInner {
    name: Mutex<String>,
    parent: Weak<NodeInner>,
    children: Mutex<Vec<Weak<NodeInner>>>,
    sites: Mutex<Vec<SiteEntry>>,
}

impl NodeInner {
    fn new(name: String, parent: Weak<NodeInner>) -> Arc<Self> {
        Arc::new(NodeInner {
            name: Mutex::new(name),
            parent,
            children: Mutex::new(Vec::new()),
            sites: Mutex::new(Vec::new()),
        })
    }

    /// Dot separated names from the registry root down to this node.  The
    /// root's own empty name contributes nothing.
    pub(crate) fn path(&self) -> String {
        let name = self.name.lock().unwrap().clone();
        match self.parent.upgrade() {
            Some(parent) => {
                let base = parent.path();
                if base.is_empty() {
                    name
                } else {
                    format!("{base}.{name}")
                }
            }
            None => name,
        }
    }

    /// Children first, then this node's own sites.  `&=` rather than `&&`
    /// keeps walking after a failure so every violation gets reported.
    fn verify_walk(&self, policy: &dyn ErrorPolicy) -> bool {
        let mut clean = true;
        for child in self.live_children() {
            clean &= child.verify_walk(policy);
        }
        let sites = self.sites.lock().unwrap();
        for entry in sites.iter() {
            clean &= entry.site.verify_with(policy);
        }
        clean
    }

    fn reset_walk(&self) {
        for child in self.live_children() {
            child.reset_walk();
        }
        let sites = self.sites.lock().unwrap();
        for entry in sites.iter() {
            entry.site.reset();
        }
    }

    /// Upgrade the child list, pruning nodes whose handles have been
    /// dropped.  A dropped mock takes no further part in verification.
    fn live_children(&self) -> Vec<Arc<NodeInner>> {
        let mut children = self.children.lock().unwrap();
        children.retain(|w| w.strong_count() > 0);
        children.iter().filter_map(Weak::upgrade).collect()
    }
}

static ROOT: Lazy<Mock> =
    Lazy::new(|| Mock { inner: NodeInner::new(String::new(), Weak::new()) });

/// Anonymous mocks and children are numbered in creation order.
static ANONYMOUS: AtomicUsize = AtomicUsize::new(0);

fn next_anonymous_name() -> String {
    format!("mock#{}", ANONYMOUS.fetch_add(1, Ordering::Relaxed))
}

/// A named node in the mock registry.
///
/// Every mock lives in a tree.  Mocks created with [`new`](Mock::new) or
/// [`named`](Mock::named) hang off an implicit process-wide root, which is
/// what the free [`verify`] and [`reset`] functions operate on.  A mock can
/// also parent further mocks, so an aggregate and its parts verify as one
/// subtree, or stand entirely apart via [`detached`](Mock::detached).
///
/// `Mock` is a cheap handle; clones share the node.  When the last handle
/// to a mock drops, the node falls out of the registry and is no longer
/// verified.
///
/// # Examples
/// ```
/// use testudo::Mock;
///
/// let manager = Mock::detached("manager");
/// let timer = manager.child_named("timer");
/// let start = timer.call_site::<(u64,), ()>("start");
/// start.expect().once();
///
/// // the child's unmet expectation fails the parent's verification
/// assert!(!manager.verify());
/// start.invoke((250,));
/// assert!(manager.verify());
/// ```
#[derive(Clone)]
pub struct Mock {
    inner: Arc<NodeInner>,
}

impl Mock {
    /// A mock under the registry root with a generated name.
    pub fn new() -> Self {
        Self::named(next_anonymous_name())
    }

    /// A mock under the registry root with the given name.
    pub fn named<S: Into<String>>(name: S) -> Self {
        ROOT.attach_child(name.into())
    }

    /// A mock outside any registry: the free [`verify`] and [`reset`]
    /// functions ignore it and its descendants.  Roots an independent tree.
    pub fn detached<S: Into<String>>(name: S) -> Self {
        Mock { inner: NodeInner::new(name.into(), Weak::new()) }
    }

    /// A child of this mock with a generated name.
    pub fn child(&self) -> Self {
        self.attach_child(next_anonymous_name())
    }

    /// A child of this mock.  Verifying or resetting the parent covers the
    /// child.
    pub fn child_named<S: Into<String>>(&self, name: S) -> Self {
        self.attach_child(name.into())
    }

    fn attach_child(&self, name: String) -> Mock {
        let inner = NodeInner::new(name, Arc::downgrade(&self.inner));
        self.inner.children.lock().unwrap().push(Arc::downgrade(&inner));
        Mock { inner }
    }

    pub fn name(&self) -> String {
        self.inner.name.lock().unwrap().clone()
    }

    /// Rename this mock.  Failure reports pick up the new name, which is
    /// useful when the interesting instance only becomes apparent mid-test.
    pub fn set_name<S: Into<String>>(&self, name: S) {
        *self.inner.name.lock().unwrap() = name.into();
    }

    /// Dot separated path from the registry root, as used in reports.
    pub fn path(&self) -> String {
        self.inner.path()
    }

    /// Register (or look up) the call site `tag` with argument tuple `I`
    /// and output `O`.  Registration is idempotent: asking again with the
    /// same tag and types returns a handle to the same site, while asking
    /// with different types panics.
    ///
    /// ```
    /// use testudo::Mock;
    ///
    /// let mock = Mock::detached("svc");
    /// mock.call_site::<(u32,), u32>("fetch");
    ///
    /// mock.expect::<(u32,), u32>("fetch").calls(|(x,)| x * 2);
    ///
    /// let fetch = mock.call_site::<(u32,), u32>("fetch");
    /// assert_eq!(4, fetch.invoke((2,)));
    /// ```
    pub fn call_site<I, O>(&self, tag: &str) -> CallSite<I, O>
        where I: fmt::Debug + 'static, O: 'static
    {
        self.site_with(tag, |i: &I| format!("{i:?}"))
    }

    /// Like [`call_site`](Mock::call_site), for argument tuples that aren't
    /// `Debug`.  Reports show the arguments as `(?)`.
    pub fn call_site_opaque<I, O>(&self, tag: &str) -> CallSite<I, O>
        where I: 'static, O: 'static
    {
        self.site_with(tag, |_: &I| String::from("(?)"))
    }

    fn site_with<I, O>(&self, tag: &str, fmt_args: fn(&I) -> String)
        -> CallSite<I, O>
        where I: 'static, O: 'static
    {
        let mut sites = self.inner.sites.lock().unwrap();
        match sites.iter().position(|e| e.tag == tag) {
            Some(ix) => {
                let found = sites[ix]
                    .site
                    .downcast_ref::<CallSite<I, O>>()
                    .map(|s| s.clone());
                drop(sites);
                match found {
                    Ok(site) => site,
                    Err(_) => panic!("call site \"{tag}\" is already \
                        registered with a different signature"),
                }
            }
            None => {
                let site = CallSite::new(tag, &self.inner, fmt_args);
                sites.push(SiteEntry {
                    tag: tag.to_owned(),
                    site: Box::new(site.clone()),
                });
                site
            }
        }
    }

    /// Declare an expectation on the call site registered under `tag`.
    ///
    /// The site must already have been registered with
    /// [`call_site`](Mock::call_site) or
    /// [`call_site_opaque`](Mock::call_site_opaque).
    pub fn expect<I, O>(&self, tag: &str) -> ExpectationBuilder<I, O>
        where I: 'static, O: 'static
    {
        let sites = self.inner.sites.lock().unwrap();
        let found = sites
            .iter()
            .find(|e| e.tag == tag)
            .map(|e| e.site.downcast_ref::<CallSite<I, O>>().map(|s| s.clone()));
        drop(sites);
        match found {
            Some(Ok(site)) => site.expect(),
            Some(Err(_)) => panic!("call site \"{tag}\" is registered with \
                a different signature"),
            None => panic!("no call site tagged \"{tag}\" on this mock"),
        }
    }

    /// Verify this mock and every descendant, children before their parent.
    ///
    /// Each violated expectation is reported through the installed error
    /// policy; the return value says whether the whole subtree was clean.
    /// Verification never mutates state, so it can run mid-test as a
    /// checkpoint and again at the end.
    pub fn verify(&self) -> bool {
        tracing::debug!(node = %self.path(), "verifying mock subtree");
        self.inner.verify_walk(policy::current())
    }

    /// Discard every expectation on this mock and its descendants.  Sites
    /// and children stay registered; handles held by the code under test
    /// remain valid.
    pub fn reset(&self) {
        tracing::debug!(node = %self.path(), "resetting mock subtree");
        self.inner.reset_walk();
    }
}

impl Default for Mock {
    fn default() -> Self {
        Self::new()
    }
}

/// Verify every mock registered under the process-wide root, reporting all
/// violations, and say whether everything was clean.  Typically the last
/// line of a test.
///
/// ```
/// use testudo::Mock;
///
/// let sensor = Mock::named("sensor");
/// let read = sensor.call_site::<(), i32>("read");
/// read.expect().at_most(3).returns(21);
///
/// assert_eq!(21, read.invoke(()));
/// assert!(testudo::verify());
/// ```
pub fn verify() -> bool {
    tracing::debug!("verifying every registered mock");
    ROOT.inner.verify_walk(policy::current())
}

/// Discard the expectations of every mock registered under the
/// process-wide root.  Mocks and their call sites stay registered.
pub fn reset() {
    tracing::debug!("resetting every registered mock");
    ROOT.inner.reset_walk();
}

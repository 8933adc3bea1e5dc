// vim: tw=80
//! Call sites: where invocations meet expectations.

use std::fmt;
use std::sync::{Arc, Mutex, Weak};

use crate::action::{default_response, Produced};
use crate::expectation::{ExpectationBuilder, ExpectationState};
use crate::policy;
use crate::registry::NodeInner;

/// An invocation that no expectation consumed.
///
/// Under the default error policy this never escapes as a value, because
/// reporting it panics first.  A non-unwinding policy hands it back through
/// [`CallSite::try_invoke`].
#[derive(Debug)]
pub struct UnexpectedCall {
    description: String,
}

impl UnexpectedCall {
    /// The full report: the rendered call followed by one line per declared
    /// expectation naming why it would not consume the call.
    pub fn description(&self) -> &str {
        &self.description
    }
}

impl fmt::Display for UnexpectedCall {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.description)
    }
}

impl std::error::Error for UnexpectedCall {}

struct SiteInner<I, O> {
    tag: String,
    node: Weak<NodeInner>,
    expectations: Mutex<Vec<ExpectationState<I, O>>>,
    /// Renders an argument tuple for diagnostics.  Chosen when the site is
    /// registered, since only the registration method knows whether the
    /// tuple is `Debug`.
    fmt_args: fn(&I) -> String,
}

/// One mockable operation: a tag plus an argument tuple type `I` and an
/// output type `O`.
///
/// A `CallSite` is a cheap cloneable handle; every clone addresses the same
/// expectation list.  Test code typically keeps one clone for declaring
/// expectations and moves another into the code under test.
///
/// ```
/// use testudo::Mock;
///
/// let mock = Mock::detached("clock");
/// let now = mock.call_site::<(), u64>("now");
///
/// // hand a clone to the code under test
/// let for_subject = now.clone();
/// now.expect().once().returns(1_723_659_000);
///
/// assert_eq!(1_723_659_000, for_subject.invoke(()));
/// assert!(mock.verify());
/// ```
pub struct CallSite<I: 'static, O: 'static> {
    inner: Arc<SiteInner<I, O>>,
}

// Not derived: that would demand I: Clone and O: Clone for a handle clone.
impl<I, O> Clone for CallSite<I, O> {
    fn clone(&self) -> Self {
        CallSite { inner: self.inner.clone() }
    }
}

impl<I: 'static, O: 'static> CallSite<I, O> {
    pub(crate) fn new(tag: &str, node: &Arc<NodeInner>,
        fmt_args: fn(&I) -> String) -> Self
    {
        CallSite {
            inner: Arc::new(SiteInner {
                tag: tag.to_owned(),
                node: Arc::downgrade(node),
                expectations: Mutex::new(Vec::new()),
                fmt_args,
            }),
        }
    }

    /// The tag this site was registered under.
    pub fn tag(&self) -> &str {
        &self.inner.tag
    }

    /// The owning mock's dotted path followed by the tag, as it appears in
    /// failure reports.
    pub fn qualified_name(&self) -> String {
        let tag = &self.inner.tag;
        match self.inner.node.upgrade() {
            Some(node) => {
                let path = node.path();
                if path.is_empty() {
                    tag.clone()
                } else {
                    format!("{path}.{tag}")
                }
            }
            None => format!("<dropped>.{tag}"),
        }
    }

    /// Declare a new expectation on this site, appended after any already
    /// declared.  The fresh expectation matches any arguments, may fire any
    /// number of times, and has no responses.
    pub fn expect(&self) -> ExpectationBuilder<I, O> {
        let mut list = self.inner.expectations.lock().unwrap();
        let ordinal = list.len();
        list.push(ExpectationState::new(ordinal));
        drop(list);
        ExpectationBuilder::new(self.clone(), ordinal)
    }

    pub(crate) fn with_expectation<R>(&self, index: usize,
        f: impl FnOnce(&mut ExpectationState<I, O>) -> R) -> R
    {
        let mut list = self.inner.expectations.lock().unwrap();
        match list.get_mut(index) {
            Some(e) => f(e),
            None => {
                drop(list);
                panic!("this expectation was discarded by a reset while \
                    still being configured");
            }
        }
    }

    /// Route a call through the expectation list.
    ///
    /// Expectations are tried in declaration order; the first one whose
    /// constraint, saturation state, and sequence position all allow the
    /// call consumes it.  If none does, the installed error policy decides
    /// what happens: the default policy panics, a silent policy records the
    /// failure and the error comes back here.
    pub fn try_invoke(&self, args: I) -> Result<O, UnexpectedCall> {
        let shown = (self.inner.fmt_args)(&args);

        // Select and consume under the list lock, but run the action after
        // releasing it.  Actions may call back into this or any other mock.
        let selected = {
            let mut list = self.inner.expectations.lock().unwrap();
            let mut rejections = Vec::with_capacity(list.len());
            let mut hit = None;
            for e in list.iter_mut() {
                match e.eligibility(&args) {
                    Ok(()) => {
                        hit = Some((e.describe(), e.consume()));
                        break;
                    }
                    Err(r) => rejections.push((e.describe(), r)),
                }
            }
            match hit {
                Some(pick) => Ok(pick),
                None => Err(rejections),
            }
        };

        match selected {
            Ok((desc, Some(action))) => {
                let produced = {
                    let mut action = action.lock().unwrap();
                    action.run(args)
                };
                match produced {
                    Produced::Value(v) => Ok(v),
                    Produced::Spent => Err(self.report(format!(
                        "unexpected call: {}{shown}\n  {desc}: its one-shot \
                         response was already consumed",
                        self.qualified_name()))),
                    // raised here, with every lock released
                    Produced::Panic(msg) => panic!("{}", msg),
                }
            }
            Ok((desc, None)) => match default_response::<O>() {
                Some(v) => Ok(v),
                None => Err(self.report(format!(
                    "unexpected call: {}{shown}\n  {desc}: matched, but no \
                     response is configured and the output type has no \
                     default",
                    self.qualified_name()))),
            },
            Err(rejections) => {
                let mut description = format!("unexpected call: {}{shown}",
                    self.qualified_name());
                if rejections.is_empty() {
                    description.push_str("\n  no expectations declared");
                } else {
                    description.push_str(&format!(
                        "\n  {} expectation(s) declared:", rejections.len()));
                    for (desc, r) in &rejections {
                        description.push_str(&format!("\n  {desc}: {}",
                            r.explain()));
                    }
                }
                Err(self.report(description))
            }
        }
    }

    /// Like [`try_invoke`](Self::try_invoke), but flattens the error to the
    /// output type's default value so mock plumbing stays out of the code
    /// under test.  Under the default policy an unexpected call panics
    /// before any value is produced.
    pub fn invoke(&self, args: I) -> O
        where O: Default
    {
        self.try_invoke(args).unwrap_or_default()
    }

    /// Check every expectation on this site against its cardinality.
    ///
    /// Reports each violation through the installed error policy and
    /// returns `false` if there were any.  Verification never consumes or
    /// alters state; it may be called repeatedly.
    pub fn verify(&self) -> bool {
        self.verify_with(policy::current())
    }

    pub(crate) fn verify_with(&self, policy: &dyn policy::ErrorPolicy)
        -> bool
    {
        let qname = self.qualified_name();
        let violations = {
            let list = self.inner.expectations.lock().unwrap();
            list.iter().filter_map(|e| e.violation()).collect::<Vec<_>>()
        };
        let clean = violations.is_empty();
        for v in &violations {
            policy.violation(&format!("unmet expectation: {qname} {v}"));
        }
        clean
    }

    /// Discard every expectation declared on this site.  The site itself
    /// stays registered and usable.
    pub fn reset(&self) {
        self.inner.expectations.lock().unwrap().clear();
    }

    fn report(&self, description: String) -> UnexpectedCall {
        policy::current().unexpected_call(&description);
        UnexpectedCall { description }
    }
}

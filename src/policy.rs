// vim: tw=80
//! Error reporting strategies.

use std::sync::{Arc, Mutex};

use once_cell::sync::OnceCell;

static POLICY: OnceCell<Box<dyn ErrorPolicy>> = OnceCell::new();

/// Decides what happens when mocking goes wrong at runtime.
///
/// Exactly one policy is in force per process.  The default,
/// [`PanicPolicy`], is installed implicitly on first use; a test binary
/// that wants different behavior calls [`set_error_policy`] before
/// touching any mock.
///
/// Declaration mistakes (a backwards call count range, a tag registered
/// twice with different signatures) are programmer errors and always
/// panic, whatever the policy.
pub trait ErrorPolicy: Send + Sync {
    /// An invocation arrived that no expectation consumed, or a matched
    /// expectation had no response left to produce.  May unwind; the caller
    /// holds no locks.
    fn unexpected_call(&self, description: &str);

    /// A declared expectation failed verification.  Called once per
    /// violation.  Must not unwind, or the violations after this one go
    /// unreported.
    fn violation(&self, description: &str);
}

/// Install the error policy for the rest of the process.
///
/// May be called at most once, before the default has been exercised;
/// installing twice, or after a failure already went through the default,
/// panics.  Putting the call at the top of the test binary's entry points
/// (or in a `#[ctor]`-style init if the harness has one) keeps it first.
pub fn set_error_policy<P: ErrorPolicy + 'static>(policy: P) {
    if POLICY.set(Box::new(policy)).is_err() {
        panic!("an error policy is already installed for this process");
    }
}

pub(crate) fn current() -> &'static dyn ErrorPolicy {
    POLICY.get_or_init(|| Box::new(PanicPolicy)).as_ref()
}

/// The default policy.
///
/// An unexpected call panics on the spot, which fails the test and points
/// at the offending invocation.  Verification failures do not panic; they
/// are written to stderr and reflected in `verify`'s return value, so one
/// walk reports every unmet expectation rather than only the first.
#[derive(Clone, Copy, Debug, Default)]
pub struct PanicPolicy;

impl ErrorPolicy for PanicPolicy {
    fn unexpected_call(&self, description: &str) {
        panic!("{}", description);
    }

    fn violation(&self, description: &str) {
        tracing::error!("{description}");
        eprintln!("{description}");
    }
}

/// A policy that never interrupts the test: failures are logged through
/// [`tracing`] and recorded for later inspection.
///
/// Clones share the record, so keep one clone to query after installing
/// another:
///
/// ```
/// use testudo::{set_error_policy, Mock, SilentPolicy};
///
/// let silent = SilentPolicy::new();
/// set_error_policy(silent.clone());
///
/// let mock = Mock::detached("svc");
/// let ping = mock.call_site::<(), ()>("ping");
/// ping.invoke(());   // nothing declared; recorded instead of panicking
///
/// assert_eq!(1, silent.unexpected_calls());
/// ```
#[derive(Clone, Default)]
pub struct SilentPolicy {
    log: Arc<SilentLog>,
}

#[derive(Default)]
struct SilentLog {
    unexpected: Mutex<Vec<String>>,
    violations: Mutex<Vec<String>>,
}

impl SilentPolicy {
    pub fn new() -> Self {
        Self::default()
    }

    /// How many unexpected calls have been recorded.
    pub fn unexpected_calls(&self) -> usize {
        self.log.unexpected.lock().unwrap().len()
    }

    /// How many verification violations have been recorded.
    pub fn violations(&self) -> usize {
        self.log.violations.lock().unwrap().len()
    }

    /// The recorded unexpected call reports, oldest first.
    pub fn unexpected_call_log(&self) -> Vec<String> {
        self.log.unexpected.lock().unwrap().clone()
    }

    /// The recorded violation reports, oldest first.
    pub fn violation_log(&self) -> Vec<String> {
        self.log.violations.lock().unwrap().clone()
    }
}

impl ErrorPolicy for SilentPolicy {
    fn unexpected_call(&self, description: &str) {
        tracing::warn!("{description}");
        self.log.unexpected.lock().unwrap().push(description.to_owned());
    }

    fn violation(&self, description: &str) {
        tracing::warn!("{description}");
        self.log.violations.lock().unwrap().push(description.to_owned());
    }
}

// vim: tw=80
//! A library for building verifiable test doubles.
//!
//! `testudo` models a mock as a named registry node owning *call sites*,
//! one per mockable operation.  A test declares *expectations* on a call
//! site: which arguments are acceptable, how many times calls may and must
//! happen, in what order, and what each call produces.  The code under
//! test drives the site through a cheap cloneable handle, and a final
//! `verify` walk reports every expectation that did not happen.
//!
//! # Getting started
//!
//! ```
//! use testudo::{predicate, Mock};
//!
//! let db = Mock::named("db");
//! let get = db.call_site::<(String,), Option<u32>>("get");
//!
//! get.expect()
//!     .once()
//!     .with(predicate::eq(("alice".to_string(),)))
//!     .returns(Some(7));
//!
//! // the code under test calls through a clone of the handle
//! let handle = get.clone();
//! assert_eq!(Some(7), handle.invoke(("alice".to_string(),)));
//! assert!(db.verify());
//! ```
//!
//! # Matching arguments
//!
//! Each expectation carries a [`Predicate`] over the whole argument tuple.
//! [`params!`] composes per-argument predicates, and
//! [`withf`](ExpectationBuilder::withf) accepts a plain closure.  When
//! several expectations could consume a call, *declaration order decides*:
//! the first eligible one wins.  Declare specific expectations before
//! general ones:
//!
//! ```
//! use testudo::{params, predicate::*, Mock};
//!
//! let mock = Mock::detached("pricing");
//! let price = mock.call_site::<(u32,), u32>("price");
//!
//! price.expect()
//!     .with(params!(eq(0)))
//!     .returns(0);                  // item zero is free
//! price.expect()
//!     .returns(100);                // everything else costs 100
//!
//! assert_eq!(0, price.invoke((0,)));
//! assert_eq!(100, price.invoke((3,)));
//! ```
//!
//! # Call counts
//!
//! [`once`](ExpectationBuilder::once), [`never`](ExpectationBuilder::never),
//! [`times`](ExpectationBuilder::times),
//! [`at_least`](ExpectationBuilder::at_least),
//! [`at_most`](ExpectationBuilder::at_most) and
//! [`between`](ExpectationBuilder::between) bound how often an expectation
//! may, and must, fire.  An expectation that reaches its upper bound is
//! *saturated*: it steps aside and later expectations consume further
//! calls.
//!
//! ```
//! use testudo::Mock;
//!
//! let mock = Mock::detached("ids");
//! let next = mock.call_site::<(), u32>("next");
//!
//! next.expect().times(2).returns(1);
//! next.expect().returns(9);
//!
//! assert_eq!(1, next.invoke(()));
//! assert_eq!(1, next.invoke(()));
//! assert_eq!(9, next.invoke(()));   // the first expectation saturated
//! ```
//!
//! # Responses
//!
//! Responses append in declaration order; the n-th consumed call runs the
//! n-th response, and the final one keeps serving once the chain runs out.
//! A [`moves`](ExpectationBuilder::moves) response serves exactly one call.
//! With no response at all, unit-returning sites succeed silently and
//! anything else is reported as a failure.
//!
//! ```
//! use testudo::Mock;
//!
//! let mock = Mock::detached("retry");
//! let send = mock.call_site::<(String,), bool>("send");
//!
//! send.expect()
//!     .returns(false)
//!     .returns(false)
//!     .returns(true);   // answers true from the third call on
//!
//! assert!(!send.invoke(("hello".into(),)));
//! assert!(!send.invoke(("hello".into(),)));
//! assert!(send.invoke(("hello".into(),)));
//! assert!(send.invoke(("hello".into(),)));
//! ```
//!
//! # Ordering
//!
//! A [`Sequence`] requires expectations, possibly spread over several call
//! sites or mocks, to fire in the order they joined.  See the type docs.
//!
//! # The registry and verification
//!
//! Mocks form a tree.  [`Mock::new`] and [`Mock::named`] hang a mock under
//! a process-wide root, [`Mock::child_named`] builds aggregates, and
//! [`Mock::detached`] roots an independent tree.  The free [`verify`] and
//! [`reset`] cover everything alive under the root; [`Mock::verify`] walks
//! one subtree, children first, reporting *every* unmet expectation before
//! returning whether the subtree was clean.  [`Mock::reset`] discards
//! expectations while keeping nodes, sites, and handles valid, which lets
//! one test run several scenarios over the same wiring.
//!
//! # Error policies
//!
//! A runtime failure is either an *unexpected call* (nothing consumed the
//! invocation) or a *violation* (verification found an unmet expectation).
//! The default [`PanicPolicy`] panics on the former and prints the latter;
//! [`SilentPolicy`] records both and never interrupts.  See
//! [`set_error_policy`].
//!
//! # Threads
//!
//! Every handle is `Send + Sync`, so clones may cross threads, but a mock
//! is designed to be driven from one thread at a time and promises no
//! cross-call ordering under concurrent use.  Responses capturing
//! non-`Send` state use [`calls_st`](ExpectationBuilder::calls_st) and
//! [`moves_st`](ExpectationBuilder::moves_st), which assert at runtime
//! that they run on their declaring thread.
//!
//! # Feature flags
//!
//! * `nightly`: an expectation with an empty response chain can produce
//!   any `Default` output, not just `()`.

#![cfg_attr(feature = "nightly", feature(specialization))]

mod action;
mod call_site;
mod cardinality;
mod expectation;
mod functor;
mod matcher;
mod policy;
mod registry;
mod sequence;

pub use call_site::{CallSite, UnexpectedCall};
pub use expectation::ExpectationBuilder;
pub use functor::Functor;
pub use policy::{set_error_policy, ErrorPolicy, PanicPolicy, SilentPolicy};
pub use registry::{reset, verify, Mock};
pub use sequence::Sequence;

pub use predicates::prelude::{predicate, Predicate};

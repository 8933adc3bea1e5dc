// vim: tw=80
//! Argument constraints for expectations.

use std::fmt;

use predicates::prelude::Predicate;
use predicates_tree::CaseTreeExt;

/// The argument constraint of a single expectation, evaluated against the
/// whole argument tuple at once.
///
/// Per-argument predicates are composed into a tuple predicate with
/// [`params!`](crate::params).
pub(crate) enum Matcher<I> {
    /// Accepts any arguments.  The state of a freshly declared expectation.
    Any,
    Pred(Box<dyn Predicate<I> + Send>),
}

impl<I> Matcher<I> {
    pub fn new<P: Predicate<I> + Send + 'static>(p: P) -> Self {
        Matcher::Pred(Box::new(p))
    }

    pub fn matches(&self, i: &I) -> bool {
        match self {
            Matcher::Any => true,
            Matcher::Pred(p) => p.eval(i),
        }
    }

    /// Render the predicate's failure case tree for a rejected argument
    /// tuple, or `None` if the arguments actually match.
    pub fn mismatch(&self, i: &I) -> Option<String> {
        match self {
            Matcher::Any => None,
            Matcher::Pred(p) => {
                p.find_case(false, i).map(|case| case.tree().to_string())
            }
        }
    }
}

impl<I> Default for Matcher<I> {
    fn default() -> Self {
        Matcher::Any
    }
}

impl<I> fmt::Display for Matcher<I> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Matcher::Any => f.write_str("<any arguments>"),
            Matcher::Pred(p) => write!(f, "{p}"),
        }
    }
}

/// Check separate [`Predicate`](crate::Predicate)s against each argument of a
/// call site.  Used with
/// [`with`](crate::ExpectationBuilder::with).
///
/// Call sites carry their arguments as a tuple, so a one-argument site
/// matches against a one-element tuple and `params!` composes per-element
/// predicates into a predicate over the whole tuple.
///
/// # Examples
/// ```
/// use testudo::{params, predicate::*, Mock};
///
/// let mock = Mock::detached("calc");
/// let add = mock.call_site::<(u32, u32), u32>("add");
/// add.expect()
///     .with(params!(eq(2), ge(40)))
///     .returns(42);
///
/// assert_eq!(42, add.invoke((2, 40)));
/// ```
#[macro_export]
macro_rules! params {
    ($p0:expr) => {
        $crate::predicate::function(move |(x0,)|
            $crate::Predicate::eval(&$p0, ::std::borrow::Borrow::borrow(x0)))
    };
    ($p0:expr, $p1:expr) => {
        $crate::predicate::function(move |(x0, x1)|
            $crate::Predicate::eval(&$p0, ::std::borrow::Borrow::borrow(x0)) && $crate::Predicate::eval(&$p1, ::std::borrow::Borrow::borrow(x1)))
    };
    ($p0:expr, $p1:expr, $p2:expr) => {
        $crate::predicate::function(move |(x0, x1, x2)|
            $crate::Predicate::eval(&$p0, ::std::borrow::Borrow::borrow(x0)) && $crate::Predicate::eval(&$p1, ::std::borrow::Borrow::borrow(x1)) && $crate::Predicate::eval(&$p2, ::std::borrow::Borrow::borrow(x2)))
    };
    ($p0:expr, $p1:expr, $p2:expr, $p3:expr) => {
        $crate::predicate::function(move |(x0, x1, x2, x3)|
            $crate::Predicate::eval(&$p0, ::std::borrow::Borrow::borrow(x0)) && $crate::Predicate::eval(&$p1, ::std::borrow::Borrow::borrow(x1)) && $crate::Predicate::eval(&$p2, ::std::borrow::Borrow::borrow(x2)) && $crate::Predicate::eval(&$p3, ::std::borrow::Borrow::borrow(x3)))
    };
    ($p0:expr, $p1:expr, $p2:expr, $p3:expr, $p4:expr) => {
        $crate::predicate::function(move |(x0, x1, x2, x3, x4)|
            $crate::Predicate::eval(&$p0, ::std::borrow::Borrow::borrow(x0)) && $crate::Predicate::eval(&$p1, ::std::borrow::Borrow::borrow(x1)) && $crate::Predicate::eval(&$p2, ::std::borrow::Borrow::borrow(x2)) && $crate::Predicate::eval(&$p3, ::std::borrow::Borrow::borrow(x3)) &&
            $crate::Predicate::eval(&$p4, ::std::borrow::Borrow::borrow(x4)))
    };
    ($p0:expr, $p1:expr, $p2:expr, $p3:expr, $p4:expr, $p5:expr) => {
        $crate::predicate::function(move |(x0, x1, x2, x3, x4, x5)|
            $crate::Predicate::eval(&$p0, ::std::borrow::Borrow::borrow(x0)) && $crate::Predicate::eval(&$p1, ::std::borrow::Borrow::borrow(x1)) && $crate::Predicate::eval(&$p2, ::std::borrow::Borrow::borrow(x2)) && $crate::Predicate::eval(&$p3, ::std::borrow::Borrow::borrow(x3)) &&
            $crate::Predicate::eval(&$p4, ::std::borrow::Borrow::borrow(x4)) && $crate::Predicate::eval(&$p5, ::std::borrow::Borrow::borrow(x5)))
    };
    ($p0:expr, $p1:expr, $p2:expr, $p3:expr, $p4:expr, $p5:expr,
     $p6:expr) =>
    {
        $crate::predicate::function(move |(x0, x1, x2, x3, x4, x5, x6)|
            $crate::Predicate::eval(&$p0, ::std::borrow::Borrow::borrow(x0)) && $crate::Predicate::eval(&$p1, ::std::borrow::Borrow::borrow(x1)) && $crate::Predicate::eval(&$p2, ::std::borrow::Borrow::borrow(x2)) && $crate::Predicate::eval(&$p3, ::std::borrow::Borrow::borrow(x3)) &&
            $crate::Predicate::eval(&$p4, ::std::borrow::Borrow::borrow(x4)) && $crate::Predicate::eval(&$p5, ::std::borrow::Borrow::borrow(x5)) && $crate::Predicate::eval(&$p6, ::std::borrow::Borrow::borrow(x6)))
    };
    ($p0:expr, $p1:expr, $p2:expr, $p3:expr, $p4:expr, $p5:expr,
     $p6:expr, $p7:expr) =>
    {
        $crate::predicate::function(move |(x0, x1, x2, x3, x4, x5, x6, x7)|
            $crate::Predicate::eval(&$p0, ::std::borrow::Borrow::borrow(x0)) && $crate::Predicate::eval(&$p1, ::std::borrow::Borrow::borrow(x1)) && $crate::Predicate::eval(&$p2, ::std::borrow::Borrow::borrow(x2)) && $crate::Predicate::eval(&$p3, ::std::borrow::Borrow::borrow(x3)) &&
            $crate::Predicate::eval(&$p4, ::std::borrow::Borrow::borrow(x4)) && $crate::Predicate::eval(&$p5, ::std::borrow::Borrow::borrow(x5)) && $crate::Predicate::eval(&$p6, ::std::borrow::Borrow::borrow(x6)) && $crate::Predicate::eval(&$p7, ::std::borrow::Borrow::borrow(x7)))
    };
    ($p0:expr, $p1:expr, $p2:expr, $p3:expr, $p4:expr, $p5:expr,
     $p6:expr, $p7:expr, $p8:expr) =>
    {
        $crate::predicate::function(move |(x0, x1, x2, x3, x4, x5, x6, x7, x8)|
            $crate::Predicate::eval(&$p0, ::std::borrow::Borrow::borrow(x0)) && $crate::Predicate::eval(&$p1, ::std::borrow::Borrow::borrow(x1)) && $crate::Predicate::eval(&$p2, ::std::borrow::Borrow::borrow(x2)) && $crate::Predicate::eval(&$p3, ::std::borrow::Borrow::borrow(x3)) &&
            $crate::Predicate::eval(&$p4, ::std::borrow::Borrow::borrow(x4)) && $crate::Predicate::eval(&$p5, ::std::borrow::Borrow::borrow(x5)) && $crate::Predicate::eval(&$p6, ::std::borrow::Borrow::borrow(x6)) && $crate::Predicate::eval(&$p7, ::std::borrow::Borrow::borrow(x7)) &&
            $crate::Predicate::eval(&$p8, ::std::borrow::Borrow::borrow(x8)))
    };
}

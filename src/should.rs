//! Should-style expectations.
//!
//! ```rust
//! use phasespec::should::{it, that, this};
//!
//! assert!(this(4).should().equal(4).is_ok());
//! assert!(that(vec![1, 2, 3]).should().contain(&2).is_ok());
//! assert!(it("hello").should_not().be_empty().is_ok());
//!
//! let failure = this(1).should_not().equal(1).unwrap_err();
//! assert_eq!(failure.message(), "Expected 1 NOT to equal 1.");
//! ```
//!
//! Every matcher returns a [`Verdict`], so expectations compose with `?` inside phase bodies. An
//! expectation cannot be evaluated before choosing `should` or `should_not`: matchers only exist on
//! [`Expectation`].

use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet, VecDeque};
use std::fmt::{self, Debug, Display};
use std::hash::Hash;

use crate::outcome::{AssertionFailure, catch};

/// Result of evaluating one expectation.
pub type Verdict = Result<(), AssertionFailure>;

/// A value waiting for `should` or `should_not`.
#[derive(Debug, Clone)]
pub struct Actual<T>(T);

pub fn this<T>(value: T) -> Actual<T> {
    Actual(value)
}

pub fn it<T>(value: T) -> Actual<T> {
    Actual(value)
}

pub fn the<T>(value: T) -> Actual<T> {
    Actual(value)
}

pub fn that<T>(value: T) -> Actual<T> {
    Actual(value)
}

/// Fail unconditionally.
pub fn fail<T>(message: impl Into<String>) -> Result<T, AssertionFailure> {
    Err(AssertionFailure::new(message))
}

impl<T> Actual<T> {
    pub fn should(self) -> Expectation<T> {
        Expectation {
            value: self.0,
            negated: false,
        }
    }

    pub fn should_not(self) -> Expectation<T> {
        Expectation {
            value: self.0,
            negated: true,
        }
    }
}

/// A value with a chosen polarity, ready for a matcher.
#[derive(Debug, Clone)]
pub struct Expectation<T> {
    value: T,
    negated: bool,
}

impl<T> Expectation<T> {
    pub fn is_negated(&self) -> bool {
        self.negated
    }

    fn verdict(&self, holds: bool, message: impl FnOnce() -> String) -> Verdict {
        if holds != self.negated {
            Ok(())
        } else {
            Err(AssertionFailure::new(message()))
        }
    }

    fn polarity(&self) -> &'static str {
        if self.negated { "NOT " } else { "" }
    }
}

impl<T: Debug> Expectation<T> {
    /// Evaluate a custom predicate, reported as `Expected <value> [NOT ]<relation>`.
    ///
    /// ```rust
    /// use phasespec::should::this;
    /// let failure = this(7).should().satisfy(|n| n % 2 == 0, "to be even.").unwrap_err();
    /// assert_eq!(failure.message(), "Expected 7 to be even.");
    /// ```
    pub fn satisfy(self, holds: impl FnOnce(&T) -> bool, relation: impl Display) -> Verdict {
        let result = holds(&self.value);
        self.verdict(result, || format!("Expected {:?} {}{relation}", self.value, self.polarity()))
    }

    pub fn equal<U: Debug>(self, expected: U) -> Verdict
    where
        T: PartialEq<U>,
    {
        let holds = self.value == expected;
        self.satisfy(|_| holds, format_args!("to equal {expected:?}."))
    }

    pub fn be_greater_than<U: Debug>(self, lesser: U) -> Verdict
    where
        T: PartialOrd<U>,
    {
        let holds = self.value > lesser;
        self.satisfy(|_| holds, format_args!("to be greater than {lesser:?}."))
    }

    pub fn be_less_than<U: Debug>(self, greater: U) -> Verdict
    where
        T: PartialOrd<U>,
    {
        let holds = self.value < greater;
        self.satisfy(|_| holds, format_args!("to be less than {greater:?}."))
    }

    pub fn be_greater_than_or_equal_to<U: Debug>(self, lesser: U) -> Verdict
    where
        T: PartialOrd<U>,
    {
        let holds = self.value >= lesser;
        self.satisfy(|_| holds, format_args!("to be greater than or equal to {lesser:?}."))
    }

    pub fn be_less_than_or_equal_to<U: Debug>(self, greater: U) -> Verdict
    where
        T: PartialOrd<U>,
    {
        let holds = self.value <= greater;
        self.satisfy(|_| holds, format_args!("to be less than or equal to {greater:?}."))
    }

    /// Exclusive on both ends.
    pub fn be_between<U: Debug>(self, first: U, last: U) -> Verdict
    where
        T: PartialOrd<U>,
    {
        let holds = self.value > first && self.value < last;
        self.satisfy(|_| holds, format_args!("to be between {first:?} and {last:?}."))
    }

    pub fn contain<I: Debug + ?Sized>(self, item: &I) -> Verdict
    where
        T: Membership<I>,
    {
        let holds = self.value.has(item);
        self.satisfy(|_| holds, format_args!("to contain {item:?}."))
    }

    pub fn be_in<C: Membership<T> + Debug>(self, collection: C) -> Verdict {
        let holds = collection.has(&self.value);
        self.satisfy(|_| holds, format_args!("to be in {collection:?}."))
    }

    pub fn be_empty(self) -> Verdict
    where
        T: Emptiness,
    {
        let holds = self.value.is_empty_value();
        self.satisfy(|_| holds, "to be empty.")
    }
}

impl Expectation<bool> {
    pub fn be_true(self) -> Verdict {
        self.satisfy(|v| *v, "to be true.")
    }

    pub fn be_false(self) -> Verdict {
        self.satisfy(|v| !*v, "to be false.")
    }
}

impl<F, T, E> Expectation<F>
where
    F: FnOnce() -> Result<T, E>,
    E: Display,
{
    /// The call must return `Err` (or `Ok` when negated).
    pub fn raise_error(self) -> Verdict {
        let negated = self.negated;
        match ((self.value)(), negated) {
            (Err(_), false) | (Ok(_), true) => Ok(()),
            (Ok(_), false) => fail("The call succeeded but should have returned an error!"),
            (Err(err), true) => fail(format!("The call should have succeeded but returned '{err}'.")),
        }
    }

    /// The call must return an `Err` whose message is exactly `message`.
    pub fn raise_error_with(self, message: &str) -> Verdict {
        if self.negated {
            return match (self.value)() {
                Err(err) if err.to_string() == message => {
                    fail(format!("The call should not have returned an error with message '{message}'."))
                }
                _ => Ok(()),
            };
        }
        match (self.value)() {
            Ok(_) => fail("The call succeeded but should have returned an error!"),
            Err(err) if err.to_string() == message => Ok(()),
            Err(err) => fail(format!(
                "Returned an error as expected but with an incorrect error message:\nExpected: '{message}'\nReceived: '{err}'"
            )),
        }
    }
}

impl<F: FnOnce()> Expectation<Panics<F>> {
    /// The wrapped call must panic (or complete when negated).
    pub fn panic(self) -> Verdict {
        let negated = self.negated;
        match (catch(self.value.0), negated) {
            (Some(_), false) | (None, true) => Ok(()),
            (None, false) => fail("The call completed but should have panicked!"),
            (Some(detail), true) => fail(format!("The call should not have panicked but raised '{detail}'.")),
        }
    }
}

/// Wrapper selecting the panic matcher for a closure.
///
/// ```rust
/// use phasespec::should::{Panics, this};
/// assert!(this(Panics(|| panic!("no"))).should().panic().is_ok());
/// ```
pub struct Panics<F: FnOnce()>(pub F);

impl<F: FnOnce()> Debug for Panics<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Panics(..)")
    }
}

/// Containers that can answer "is this item in you?".
pub trait Membership<Item: ?Sized> {
    fn has(&self, item: &Item) -> bool;
}

impl<T: PartialEq> Membership<T> for [T] {
    fn has(&self, item: &T) -> bool {
        self.contains(item)
    }
}

impl<T: PartialEq, const N: usize> Membership<T> for [T; N] {
    fn has(&self, item: &T) -> bool {
        self.contains(item)
    }
}

impl<T: PartialEq> Membership<T> for Vec<T> {
    fn has(&self, item: &T) -> bool {
        self.contains(item)
    }
}

impl<T: PartialEq> Membership<T> for VecDeque<T> {
    fn has(&self, item: &T) -> bool {
        self.contains(item)
    }
}

impl Membership<str> for str {
    fn has(&self, item: &str) -> bool {
        self.contains(item)
    }
}

impl<'a> Membership<&'a str> for str {
    fn has(&self, item: &&'a str) -> bool {
        self.contains(*item)
    }
}

impl Membership<char> for str {
    fn has(&self, item: &char) -> bool {
        self.contains(*item)
    }
}

impl Membership<str> for String {
    fn has(&self, item: &str) -> bool {
        self.contains(item)
    }
}

impl Membership<char> for String {
    fn has(&self, item: &char) -> bool {
        self.contains(*item)
    }
}

impl<K: Eq + Hash, V> Membership<K> for HashMap<K, V> {
    fn has(&self, item: &K) -> bool {
        self.contains_key(item)
    }
}

impl<K: Eq + Hash> Membership<K> for HashSet<K> {
    fn has(&self, item: &K) -> bool {
        self.contains(item)
    }
}

impl<K: Ord, V> Membership<K> for BTreeMap<K, V> {
    fn has(&self, item: &K) -> bool {
        self.contains_key(item)
    }
}

impl<K: Ord> Membership<K> for BTreeSet<K> {
    fn has(&self, item: &K) -> bool {
        self.contains(item)
    }
}

impl<C: Membership<I> + ?Sized, I: ?Sized> Membership<I> for &C {
    fn has(&self, item: &I) -> bool {
        (**self).has(item)
    }
}

/// Values with a notion of being empty.
pub trait Emptiness {
    fn is_empty_value(&self) -> bool;
}

macro_rules! impl_emptiness {
    ($($ty:ty => [$($generics:tt)*]),* $(,)?) => {
        $(
            impl<$($generics)*> Emptiness for $ty {
                fn is_empty_value(&self) -> bool {
                    self.is_empty()
                }
            }
        )*
    };
}

impl_emptiness! {
    str => [],
    String => [],
    [T] => [T],
    Vec<T> => [T],
    VecDeque<T> => [T],
    HashMap<K, V> => [K, V],
    HashSet<K> => [K],
    BTreeMap<K, V> => [K, V],
    BTreeSet<K> => [K],
}

impl<T> Emptiness for Option<T> {
    fn is_empty_value(&self) -> bool {
        self.is_none()
    }
}

impl<C: Emptiness + ?Sized> Emptiness for &C {
    fn is_empty_value(&self) -> bool {
        (**self).is_empty_value()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn message(verdict: Verdict) -> String {
        verdict.unwrap_err().message().to_string()
    }

    #[test]
    fn test_equal() {
        assert!(this("string").should().equal("string").is_ok());
        assert_eq!(
            message(this("string").should().equal("STRING")),
            "Expected \"string\" to equal \"STRING\"."
        );
        assert_eq!(message(this(1).should_not().equal(1)), "Expected 1 NOT to equal 1.");
        assert!(this(String::from("a")).should().equal("a").is_ok());
    }

    #[test]
    fn test_ordering() {
        assert!(this(2).should().be_greater_than(1).is_ok());
        assert!(this(1).should().be_less_than(2).is_ok());
        assert!(this(2).should().be_greater_than_or_equal_to(2).is_ok());
        assert!(this(2).should().be_less_than_or_equal_to(2).is_ok());
        assert_eq!(message(this(1).should().be_greater_than(2)), "Expected 1 to be greater than 2.");
        assert!(this(1).should_not().be_greater_than(2).is_ok());
    }

    #[test]
    fn test_between_is_exclusive() {
        assert!(this(2).should().be_between(1, 3).is_ok());
        assert!(this(1).should().be_between(1, 3).is_err());
        assert!(this(3).should_not().be_between(1, 3).is_ok());
        assert_eq!(message(this(3).should().be_between(1, 3)), "Expected 3 to be between 1 and 3.");
    }

    #[test]
    fn test_membership() {
        assert!(this(vec![1, 2, 3]).should().contain(&2).is_ok());
        assert!(this([1, 2, 3]).should_not().contain(&4).is_ok());
        assert!(this("hello world").should().contain("world").is_ok());
        assert!(this(String::from("abc")).should().contain(&'b').is_ok());
        assert!(this(2).should().be_in(vec![1, 2]).is_ok());
        assert!(this("b").should().be_in("abc").is_ok());
        assert_eq!(message(this(5).should().be_in(vec![1, 2])), "Expected 5 to be in [1, 2].");

        let mut scores = HashMap::new();
        scores.insert("alice", 3);
        assert!(this(&scores).should().contain(&"alice").is_ok());
        assert!(this(&scores).should_not().contain(&"bob").is_ok());
    }

    #[test]
    fn test_emptiness_and_booleans() {
        assert!(this(Vec::<u8>::new()).should().be_empty().is_ok());
        assert!(this("x").should_not().be_empty().is_ok());
        assert!(this(None::<u8>).should().be_empty().is_ok());
        assert_eq!(message(this(vec![1]).should().be_empty()), "Expected [1] to be empty.");
        assert!(this(true).should().be_true().is_ok());
        assert!(this(false).should().be_false().is_ok());
        assert_eq!(message(this(false).should().be_true()), "Expected false to be true.");
    }

    #[test]
    fn test_raise_error() {
        let parse = || "x".parse::<i32>();
        assert!(this(parse).should().raise_error().is_ok());
        assert!(this(|| "1".parse::<i32>()).should_not().raise_error().is_ok());
        assert_eq!(
            message(this(|| "1".parse::<i32>()).should().raise_error()),
            "The call succeeded but should have returned an error!"
        );
        assert!(
            this(|| "x".parse::<i32>())
                .should()
                .raise_error_with("invalid digit found in string")
                .is_ok()
        );
        assert!(message(this(|| "".parse::<i32>()).should().raise_error_with("nope")).contains("incorrect error message"));
    }

    #[test]
    fn test_panic_matcher() {
        assert!(this(Panics(|| panic!("No can do!"))).should().panic().is_ok());
        assert!(this(Panics(|| {})).should_not().panic().is_ok());
        assert_eq!(
            message(this(Panics(|| {})).should().panic()),
            "The call completed but should have panicked!"
        );
    }

    #[test]
    fn test_fail() {
        let verdict: Verdict = fail("forced");
        assert_eq!(message(verdict), "forced");
    }
}

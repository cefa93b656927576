//! FizzBuzz, declared with the `#[spec]` attribute.
//!
//! Run with `cargo run --example fizzbuzz -- --reporter dot`.

use std::fmt;

use phasespec::should::the;
use phasespec::{AssertionFailure, Output, Suite, spec};

#[derive(Debug, Clone, PartialEq, Eq)]
enum Answer {
    Number(u32),
    Word(&'static str),
}

impl fmt::Display for Answer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Answer::Number(n) => write!(f, "{n}"),
            Answer::Word(word) => f.write_str(word),
        }
    }
}

fn fizzbuzz(n: u32) -> Answer {
    match (n % 3 == 0, n % 5 == 0) {
        (true, true) => Answer::Word("FizzBuzz"),
        (true, false) => Answer::Word("Fizz"),
        (false, true) => Answer::Word("Buzz"),
        (false, false) => Answer::Number(n),
    }
}

#[derive(Default)]
struct NeitherDivisibleBy3Nor5 {
    number: u32,
    result: Option<Answer>,
}

#[spec(name = "neither divisible by 3 nor 5")]
impl NeitherDivisibleBy3Nor5 {
    #[given("the number 2, which is not divisible by 3 nor 5")]
    fn the_number(&mut self) {
        self.number = 2;
    }

    #[when("the function is called")]
    fn call(&mut self, out: &mut Output) {
        let answer = fizzbuzz(self.number);
        out.say(format_args!("fizzbuzz({}) = {answer}", self.number));
        self.result = Some(answer);
    }

    #[then("the result is the same number")]
    fn same_number(&mut self) -> Result<(), AssertionFailure> {
        the(self.result.clone()).should().equal(Some(Answer::Number(self.number)))
    }
}

struct MultiplesOfFifteen {
    numbers: Vec<u32>,
    results: Vec<Answer>,
}

#[spec(name = "multiples of 15")]
impl MultiplesOfFifteen {
    #[construct]
    fn new() -> Self {
        Self {
            numbers: vec![15, 30, 45],
            results: Vec::new(),
        }
    }

    #[when]
    fn the_function_is_called_for_each(&mut self) {
        self.results = self.numbers.iter().map(|&n| fizzbuzz(n)).collect();
    }

    #[then]
    fn every_result_is_fizzbuzz(&mut self) -> Result<(), AssertionFailure> {
        for result in &self.results {
            the(result).should().equal(&Answer::Word("FizzBuzz"))?;
        }
        Ok(())
    }

    #[then]
    fn no_number_is_lost(&mut self) -> Result<(), AssertionFailure> {
        the(self.results.len()).should().equal(self.numbers.len())
    }
}

#[derive(Default)]
struct DivisibleBy3Only {
    result: Option<Answer>,
}

#[spec(name = "divisible by 3 only")]
impl DivisibleBy3Only {
    #[when("the function is called with 3")]
    fn call(&mut self) {
        self.result = Some(fizzbuzz(3));
    }

    #[then("the result is Fizz")]
    fn fizz(&self) -> Result<(), AssertionFailure> {
        the(self.result.clone()).should().equal(Some(Answer::Word("Fizz")))
    }

    #[then("the result is not Buzz")]
    fn not_buzz(&self) -> Result<(), AssertionFailure> {
        the(self.result.clone()).should_not().equal(Some(Answer::Word("Buzz")))
    }
}

fn main() {
    let suite = Suite::new()
        .with::<NeitherDivisibleBy3Nor5>()
        .with::<DivisibleBy3Only>()
        .with::<MultiplesOfFifteen>();
    phasespec::cli::run(suite);
}

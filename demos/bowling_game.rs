//! Bowling game kata, declared with `SpecBuilder`.
//!
//! Every scenario shares the same setup and collect phases through `SpecBuilder::apply`.
//!
//! Run with `cargo run --example bowling_game -- --reporter story`.

use phasespec::should::the;
use phasespec::{SpecBuilder, SpecDefinition, Suite};

#[derive(Debug, Default)]
struct BowlingGame {
    rolls: Vec<u32>,
}

impl BowlingGame {
    fn roll(&mut self, pins: u32) {
        self.rolls.push(pins);
    }

    fn roll_many(&mut self, pins: u32, times: usize) {
        for _ in 0..times {
            self.roll(pins);
        }
    }

    fn score(&self) -> u32 {
        let pins = |i: usize| self.rolls.get(i).copied().unwrap_or(0);
        let mut total = 0;
        let mut roll = 0;
        for _frame in 0..10 {
            if pins(roll) == 10 {
                total += 10 + pins(roll + 1) + pins(roll + 2);
                roll += 1;
            } else if pins(roll) + pins(roll + 1) == 10 {
                total += 10 + pins(roll + 2);
                roll += 2;
            } else {
                total += pins(roll) + pins(roll + 1);
                roll += 2;
            }
        }
        total
    }
}

#[derive(Debug, Default)]
struct Scorecard {
    game: BowlingGame,
    score: u32,
}

/// Phases every bowling scenario shares.
fn using_a_bowling_game(spec: SpecBuilder<Scorecard>) -> SpecBuilder<Scorecard> {
    spec.given("a fresh game", |card, _| card.game = BowlingGame::default())
        .collect("the result", |card, out| {
            card.score = card.game.score();
            out.say(format_args!("rolls: {:?}", card.game.rolls));
        })
}

fn scenario(name: &str, action: &str, rolls: fn(&mut BowlingGame), expected: u32) -> SpecDefinition {
    SpecBuilder::<Scorecard>::new(name)
        .apply(using_a_bowling_game)
        .when(action.to_string(), move |card, _| rolls(&mut card.game))
        .then(format!("the final score should be {expected}"), move |card, _| {
            the(card.score).should().equal(expected)
        })
        .build()
}

fn suite() -> Suite {
    Suite::new()
        .with_definition(scenario("gutter game", "all gutter balls are thrown", |g| g.roll_many(0, 20), 0))
        .with_definition(scenario("all ones", "all throws knock down one pin", |g| g.roll_many(1, 20), 20))
        .with_definition(scenario(
            "spare",
            "a spare is thrown",
            |g| {
                g.roll(5);
                g.roll(5);
                g.roll(3);
                g.roll_many(0, 17);
            },
            16,
        ))
        .with_definition(scenario(
            "strike",
            "a strike is thrown",
            |g| {
                g.roll(10);
                g.roll(3);
                g.roll(4);
                g.roll_many(0, 16);
            },
            24,
        ))
        .with_definition(scenario("perfect game", "all throws are strikes", |g| g.roll_many(10, 12), 300))
}

fn main() {
    phasespec::cli::run(suite());
}

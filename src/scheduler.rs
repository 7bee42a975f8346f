// Copyright 2025 the kanki authors
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use crate::types::card::Card;
use crate::types::grade::Grade;
use crate::types::stage::Stage;
use crate::types::timestamp::Timestamp;

/// The number of learning sub-steps a card must clear before graduating to
/// `Review`. Grading `Again` resets the count.
pub const MAX_TRAINING_REPS: u32 = 5;

/// The initial ease factor, fixed-point scaled by 1000 (2500 = 2.5).
pub const INITIAL_FACTOR: i64 = 2500;

/// Ease factor multiplier applied on `Hard` in `Review`, as a rational.
const HARD_FACTOR: (i64, i64) = (85, 100);

/// Ease factor multiplier applied on `Easy` in `Review`.
const EASY_FACTOR: (i64, i64) = (115, 100);

/// Apply a grading decision to a card, computing its next stage, counters,
/// and due time. The card is mutated in place; the caller persists it.
pub fn advance(card: &mut Card, grade: Grade, now: Timestamp) {
    card.reps += 1;
    match card.stage {
        Stage::New => {
            // A new card enters the learning phase no matter the grade.
            card.stage = Stage::Learning;
            training_step(card, grade, now);
        }
        Stage::Learning | Stage::Relearning => {
            training_step(card, grade, now);
            if card.left == 0 {
                card.stage = Stage::Review;
            }
        }
        Stage::Review => review_step(card, grade, now),
    }
}

/// The transition table shared by `New`, `Learning`, and `Relearning`.
/// `Again` restarts the sub-step count and leaves the due time alone.
fn training_step(card: &mut Card, grade: Grade, now: Timestamp) {
    match grade {
        Grade::Again => {
            card.left = MAX_TRAINING_REPS;
        }
        Grade::Hard => {
            card.left = card.left.saturating_sub(1);
            card.due = now.plus_minutes(1);
        }
        Grade::Good => {
            card.left = card.left.saturating_sub(1);
            card.due = now.plus_minutes(5);
        }
        Grade::Easy => {
            card.left = card.left.saturating_sub(1);
            card.due = now.plus_days(1);
        }
    }
}

/// Graduated cards: the interval grows (or shrinks) by the ease factor,
/// and the ease factor itself moves only here. All arithmetic is integer
/// truncation on the fixed-point representation.
fn review_step(card: &mut Card, grade: Grade, now: Timestamp) {
    match grade {
        Grade::Again => {
            // The card regressed: back to the learning phase, but as
            // `Relearning` so the regression is recorded. Interval and
            // factor are untouched at this step.
            card.left = MAX_TRAINING_REPS;
            card.stage = Stage::Relearning;
        }
        Grade::Hard => {
            card.factor = card.factor * HARD_FACTOR.0 / HARD_FACTOR.1;
            reschedule(card, now);
        }
        Grade::Good => {
            reschedule(card, now);
        }
        Grade::Easy => {
            card.factor = card.factor * EASY_FACTOR.0 / EASY_FACTOR.1;
            reschedule(card, now);
        }
    }
}

/// Scale the interval by the (already updated) ease factor and push the due
/// time out. The interval never drops below one day.
fn reschedule(card: &mut Card, now: Timestamp) {
    card.interval = (card.factor * card.interval / 1000).max(1);
    card.due = now.plus_days(card.interval);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn card_in(stage: Stage) -> Card {
        let mut card = Card::new(1, 1, "q".to_string(), "a".to_string());
        card.stage = stage;
        card
    }

    #[test]
    fn test_new_card_enters_learning() {
        let now = Timestamp::now();
        for grade in [Grade::Again, Grade::Hard, Grade::Good, Grade::Easy] {
            let mut card = card_in(Stage::New);
            advance(&mut card, grade, now);
            assert_eq!(card.stage, Stage::Learning);
            assert_eq!(card.reps, 1);
        }
    }

    #[test]
    fn test_new_good_decrements_left_and_grants_five_minutes() {
        let now = Timestamp::now();
        let mut card = card_in(Stage::New);
        advance(&mut card, Grade::Good, now);
        assert_eq!(card.stage, Stage::Learning);
        assert_eq!(card.left, MAX_TRAINING_REPS - 1);
        assert_eq!(card.due, now.plus_minutes(5));
    }

    #[test]
    fn test_new_again_resets_left_and_leaves_due() {
        let now = Timestamp::now();
        let mut card = card_in(Stage::New);
        card.left = 2;
        let due_before = card.due;
        advance(&mut card, Grade::Again, now);
        assert_eq!(card.stage, Stage::Learning);
        assert_eq!(card.left, MAX_TRAINING_REPS);
        assert_eq!(card.due, due_before);
    }

    #[test]
    fn test_learning_grants() {
        let now = Timestamp::now();
        let mut card = card_in(Stage::Learning);
        advance(&mut card, Grade::Hard, now);
        assert_eq!(card.due, now.plus_minutes(1));
        let mut card = card_in(Stage::Learning);
        advance(&mut card, Grade::Good, now);
        assert_eq!(card.due, now.plus_minutes(5));
        let mut card = card_in(Stage::Learning);
        advance(&mut card, Grade::Easy, now);
        assert_eq!(card.due, now.plus_days(1));
    }

    #[test]
    fn test_learning_graduates_on_last_step() {
        let now = Timestamp::now();
        let mut card = card_in(Stage::Learning);
        card.left = 1;
        advance(&mut card, Grade::Hard, now);
        assert_eq!(card.stage, Stage::Review);
        assert_eq!(card.left, 0);
    }

    #[test]
    fn test_learning_again_restarts_steps() {
        let now = Timestamp::now();
        let mut card = card_in(Stage::Learning);
        card.left = 1;
        advance(&mut card, Grade::Again, now);
        assert_eq!(card.stage, Stage::Learning);
        assert_eq!(card.left, MAX_TRAINING_REPS);
    }

    #[test]
    fn test_relearning_graduates_like_learning() {
        let now = Timestamp::now();
        let mut card = card_in(Stage::Relearning);
        card.left = 1;
        advance(&mut card, Grade::Good, now);
        assert_eq!(card.stage, Stage::Review);
    }

    #[test]
    fn test_review_again_regresses_to_relearning() {
        let now = Timestamp::now();
        let mut card = card_in(Stage::Review);
        card.interval = 10;
        card.left = 0;
        advance(&mut card, Grade::Again, now);
        assert_eq!(card.stage, Stage::Relearning);
        assert_eq!(card.left, MAX_TRAINING_REPS);
        // Interval and factor untouched by the regression itself.
        assert_eq!(card.interval, 10);
        assert_eq!(card.factor, INITIAL_FACTOR);
    }

    #[test]
    fn test_review_hard_shrinks_factor_then_interval() {
        let now = Timestamp::now();
        let mut card = card_in(Stage::Review);
        card.interval = 10;
        advance(&mut card, Grade::Hard, now);
        assert_eq!(card.factor, 2125);
        assert_eq!(card.interval, 21);
        assert_eq!(card.due, now.plus_days(21));
    }

    #[test]
    fn test_review_good_keeps_factor() {
        let now = Timestamp::now();
        let mut card = card_in(Stage::Review);
        card.interval = 10;
        advance(&mut card, Grade::Good, now);
        assert_eq!(card.factor, INITIAL_FACTOR);
        assert_eq!(card.interval, 25);
        assert_eq!(card.due, now.plus_days(25));
    }

    #[test]
    fn test_review_easy_grows_factor_then_interval() {
        let now = Timestamp::now();
        let mut card = card_in(Stage::Review);
        card.interval = 10;
        advance(&mut card, Grade::Easy, now);
        assert_eq!(card.factor, 2875);
        assert_eq!(card.interval, 28);
        assert_eq!(card.due, now.plus_days(28));
    }

    #[test]
    fn test_interval_never_collapses_below_one_day() {
        let now = Timestamp::now();
        let mut card = card_in(Stage::Review);
        card.interval = 1;
        card.factor = 600;
        advance(&mut card, Grade::Good, now);
        assert_eq!(card.interval, 1);
    }

    #[test]
    fn test_reps_always_increment() {
        let now = Timestamp::now();
        let mut card = card_in(Stage::New);
        for i in 1..=4 {
            advance(&mut card, Grade::Good, now);
            assert_eq!(card.reps, i);
        }
    }
}

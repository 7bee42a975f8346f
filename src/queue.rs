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

use std::cmp::Ordering;
use std::cmp::Reverse;
use std::collections::BinaryHeap;

use crate::db::Database;
use crate::error::Fallible;
use crate::types::card::Card;
use crate::types::card::CardId;
use crate::types::deck::DeckId;
use crate::types::stage::Stage;
use crate::types::timestamp::Timestamp;

/// The most learning-phase cards a session will hold.
pub const SESSION_LIMIT: usize = 150;

/// The most review cards a session will hold.
pub const REVIEW_LIMIT: usize = 25;

/// New cards are admitted at 20% of the learning+review load, but never
/// fewer than this.
pub const NEW_LIMIT_FLOOR: usize = 15;

/// A graded card whose new due time lands within this horizon re-enters
/// the live session.
pub const REQUEUE_HORIZON_MINUTES: i64 = 60;

/// The composite sort key for session ordering: stage priority first, then
/// due time ascending (soonest next), then card ID to make the order total.
#[derive(PartialEq, Eq, PartialOrd, Ord)]
struct SortKey(u8, Timestamp, CardId);

impl SortKey {
    fn of(card: &Card) -> Self {
        Self(card.stage.priority(), card.due, card.id)
    }
}

struct Entry {
    key: SortKey,
    card: Card,
}

impl PartialEq for Entry {
    fn eq(&self, other: &Self) -> bool {
        self.key == other.key
    }
}

impl Eq for Entry {}

impl PartialOrd for Entry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Entry {
    fn cmp(&self, other: &Self) -> Ordering {
        self.key.cmp(&other.key)
    }
}

/// One session's working set: a snapshot of due cards, served smallest key
/// first. Cards that become eligible after the snapshot is taken are not
/// injected into a running session.
pub struct SessionQueue {
    heap: BinaryHeap<Reverse<Entry>>,
}

impl SessionQueue {
    pub fn new() -> Self {
        Self {
            heap: BinaryHeap::new(),
        }
    }

    pub fn push(&mut self, card: Card) {
        let key = SortKey::of(&card);
        self.heap.push(Reverse(Entry { key, card }));
    }

    /// The next card to present, without removing it.
    pub fn peek(&self) -> Option<&Card> {
        self.heap.peek().map(|entry| &entry.0.card)
    }

    pub fn pop(&mut self) -> Option<Card> {
        self.heap.pop().map(|entry| entry.0.card)
    }

    pub fn len(&self) -> usize {
        self.heap.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    /// Decide whether a just-graded card re-enters the live session. It
    /// does iff its new due time falls within the look-ahead horizon; the
    /// key is recomputed from the card's new stage and due time. Returns
    /// whether the card was reinserted.
    pub fn requeue(&mut self, card: Card, now: Timestamp) -> bool {
        if card.due < now.plus_minutes(REQUEUE_HORIZON_MINUTES) {
            self.push(card);
            true
        } else {
            false
        }
    }
}

/// Build the working set for one session: bounded fetches of due cards in
/// each stage bucket, merged into one priority order. An empty queue means
/// the deck has nothing to study right now.
pub fn build_session(db: &Database, deck_id: DeckId, now: Timestamp) -> Fallible<SessionQueue> {
    let learning = db.due_cards(
        deck_id,
        &[Stage::Learning, Stage::Relearning],
        now,
        SESSION_LIMIT,
    )?;
    let reviewing = db.due_cards(deck_id, &[Stage::Review], now, REVIEW_LIMIT)?;

    let total = learning.len() + reviewing.len();
    let new_limit = ((total as f64 * 0.2) as usize).max(NEW_LIMIT_FLOOR);
    let new_cards = db.due_cards(deck_id, &[Stage::New], now, new_limit)?;

    log::debug!(
        "Session for deck {deck_id}: {} learning, {} review, {} new",
        learning.len(),
        reviewing.len(),
        new_cards.len()
    );

    let mut queue = SessionQueue::new();
    for card in learning.into_iter().chain(new_cards).chain(reviewing) {
        queue.push(card);
    }
    Ok(queue)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scheduler::advance;
    use crate::types::grade::Grade;

    fn card(id: CardId, stage: Stage, due: Timestamp) -> Card {
        let mut card = Card::new(id, 1, format!("q{id}"), format!("a{id}"));
        card.stage = stage;
        card.due = due;
        card
    }

    #[test]
    fn test_stage_priority_order() {
        let now = Timestamp::now();
        let mut queue = SessionQueue::new();
        queue.push(card(1, Stage::Review, Timestamp::EPOCH));
        queue.push(card(2, Stage::New, Timestamp::EPOCH));
        queue.push(card(3, Stage::Learning, now));
        queue.push(card(4, Stage::Relearning, Timestamp::EPOCH));
        assert_eq!(queue.pop().unwrap().id, 4);
        assert_eq!(queue.pop().unwrap().id, 3);
        assert_eq!(queue.pop().unwrap().id, 2);
        assert_eq!(queue.pop().unwrap().id, 1);
        assert!(queue.pop().is_none());
    }

    #[test]
    fn test_soonest_due_first_within_stage() {
        let now = Timestamp::now();
        let mut queue = SessionQueue::new();
        queue.push(card(1, Stage::Learning, now.plus_minutes(5)));
        queue.push(card(2, Stage::Learning, now.plus_minutes(1)));
        queue.push(card(3, Stage::Learning, now.plus_minutes(3)));
        assert_eq!(queue.pop().unwrap().id, 2);
        assert_eq!(queue.pop().unwrap().id, 3);
        assert_eq!(queue.pop().unwrap().id, 1);
    }

    #[test]
    fn test_id_breaks_ties() {
        let now = Timestamp::now();
        let mut queue = SessionQueue::new();
        queue.push(card(9, Stage::Learning, now));
        queue.push(card(3, Stage::Learning, now));
        queue.push(card(7, Stage::Learning, now));
        assert_eq!(queue.pop().unwrap().id, 3);
        assert_eq!(queue.pop().unwrap().id, 7);
        assert_eq!(queue.pop().unwrap().id, 9);
    }

    #[test]
    fn test_peek_does_not_remove() {
        let now = Timestamp::now();
        let mut queue = SessionQueue::new();
        queue.push(card(1, Stage::Learning, now));
        assert_eq!(queue.peek().unwrap().id, 1);
        assert_eq!(queue.len(), 1);
    }

    #[test]
    fn test_requeue_within_horizon() {
        let now = Timestamp::now();
        let mut queue = SessionQueue::new();
        let card = card(1, Stage::Learning, now.plus_minutes(5));
        assert!(queue.requeue(card, now));
        assert_eq!(queue.len(), 1);
    }

    #[test]
    fn test_requeue_outside_horizon() {
        let now = Timestamp::now();
        let mut queue = SessionQueue::new();
        let card = card(1, Stage::Review, now.plus_days(3));
        assert!(!queue.requeue(card, now));
        assert!(queue.is_empty());
    }

    #[test]
    fn test_requeued_card_uses_its_new_key() {
        // A learning card graded `Good` comes back five minutes out, ahead
        // of a review card that was already in the queue.
        let now = Timestamp::now();
        let mut queue = SessionQueue::new();
        queue.push(card(10, Stage::Review, now.plus_minutes(1)));
        let mut graded = card(1, Stage::Learning, now);
        advance(&mut graded, Grade::Good, now);
        assert!(queue.requeue(graded, now));
        assert_eq!(queue.pop().unwrap().id, 1);
        assert_eq!(queue.pop().unwrap().id, 10);
    }

    mod session {
        use super::*;

        fn seed(db: &Database, deck_id: DeckId, stage: Stage, due: Timestamp, n: usize) {
            for i in 0..n {
                let mut card = db
                    .create_card(deck_id, &format!("q{i}"), &format!("a{i}"), &[])
                    .unwrap();
                card.stage = stage;
                card.due = due;
                db.save_card(&card).unwrap();
            }
        }

        #[test]
        fn test_empty_deck_is_terminal_not_error() {
            let db = Database::open_in_memory().unwrap();
            let deck = db.create_deck("maths").unwrap();
            let queue = build_session(&db, deck.id, Timestamp::now()).unwrap();
            assert!(queue.is_empty());
        }

        #[test]
        fn test_limits() {
            let db = Database::open_in_memory().unwrap();
            let deck = db.create_deck("maths").unwrap();
            let now = Timestamp::now();
            let due = now.plus_minutes(-10);
            seed(&db, deck.id, Stage::Learning, due, 200);
            seed(&db, deck.id, Stage::Review, due, 50);
            seed(&db, deck.id, Stage::New, due, 100);
            let queue = build_session(&db, deck.id, now).unwrap();
            // 150 learning + 25 review + max(0.2 * 175, 15) = 35 new.
            assert_eq!(queue.len(), 150 + 25 + 35);
        }

        #[test]
        fn test_small_deck_composition() {
            let db = Database::open_in_memory().unwrap();
            let deck = db.create_deck("maths").unwrap();
            let now = Timestamp::now();
            let due = now.plus_minutes(-10);
            seed(&db, deck.id, Stage::Learning, due, 3);
            seed(&db, deck.id, Stage::New, due, 20);
            let mut queue = build_session(&db, deck.id, now).unwrap();
            // newLimit = max(floor(3 * 0.2), 15) = 15.
            assert_eq!(queue.len(), 3 + 15);
            for _ in 0..3 {
                assert_eq!(queue.pop().unwrap().stage, Stage::Learning);
            }
            for _ in 0..15 {
                assert_eq!(queue.pop().unwrap().stage, Stage::New);
            }
        }

        #[test]
        fn test_cards_not_yet_due_are_excluded() {
            let db = Database::open_in_memory().unwrap();
            let deck = db.create_deck("maths").unwrap();
            let now = Timestamp::now();
            seed(&db, deck.id, Stage::Learning, now.plus_minutes(30), 5);
            let queue = build_session(&db, deck.id, now).unwrap();
            assert!(queue.is_empty());
        }

        #[test]
        fn test_other_decks_are_excluded() {
            let db = Database::open_in_memory().unwrap();
            let deck = db.create_deck("maths").unwrap();
            let other = db.create_deck("physics").unwrap();
            let now = Timestamp::now();
            seed(&db, other.id, Stage::Learning, now.plus_minutes(-10), 5);
            let queue = build_session(&db, deck.id, now).unwrap();
            assert!(queue.is_empty());
        }
    }
}

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

use crate::scheduler::INITIAL_FACTOR;
use crate::scheduler::MAX_TRAINING_REPS;
use crate::types::deck::DeckId;
use crate::types::stage::Stage;
use crate::types::timestamp::Timestamp;

pub type CardId = i64;

/// The unit of study. The question and answer are opaque text; only the
/// scheduling fields are interpreted by the rest of the crate.
#[derive(Clone, Debug)]
pub struct Card {
    /// The card's row ID, unique within the database.
    pub id: CardId,
    pub question: String,
    pub answer: String,
    /// The deck this card belongs to.
    pub deck_id: DeckId,
    /// The card's retention phase.
    pub stage: Stage,
    /// The instant at which the card becomes eligible for study.
    pub due: Timestamp,
    /// Sub-steps remaining before the card graduates from the learning
    /// phase. Only meaningful while the stage is `Learning` or `Relearning`.
    pub left: u32,
    /// The number of grading events applied to the card.
    pub reps: u32,
    /// Days between reviews, the base for the next spacing. At least 1 once
    /// the card is in `Review`.
    pub interval: i64,
    /// Ease factor, fixed-point scaled by 1000. Only mutated in `Review`.
    pub factor: i64,
}

impl Card {
    /// A brand-new card: due immediately, with the full complement of
    /// learning steps ahead of it.
    pub fn new(id: CardId, deck_id: DeckId, question: String, answer: String) -> Self {
        Self {
            id,
            question,
            answer,
            deck_id,
            stage: Stage::New,
            due: Timestamp::EPOCH,
            left: MAX_TRAINING_REPS,
            reps: 0,
            interval: 1,
            factor: INITIAL_FACTOR,
        }
    }
}

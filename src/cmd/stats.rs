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

use std::fmt::Display;
use std::fmt::Formatter;

use clap::ValueEnum;
use serde::Serialize;

use crate::db::Database;
use crate::error::Fallible;
use crate::types::deck::Deck;
use crate::types::stage::Stage;
use crate::types::timestamp::Timestamp;

#[derive(ValueEnum, Clone)]
pub enum StatsFormat {
    /// Plain text output.
    Text,
    /// JSON output.
    Json,
}

impl Display for StatsFormat {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            StatsFormat::Text => write!(f, "text"),
            StatsFormat::Json => write!(f, "json"),
        }
    }
}

pub fn print_deck_stats(db: &Database, deck: &Deck, format: StatsFormat) -> Fallible<()> {
    let now = Timestamp::now();
    let stats = Stats {
        deck_name: deck.name.clone(),
        card_count: db.card_count(deck.id)?,
        due_learning_count: db.due_count(deck.id, &[Stage::Learning, Stage::Relearning], now)?,
        due_review_count: db.due_count(deck.id, &[Stage::Review], now)?,
        due_new_count: db.due_count(deck.id, &[Stage::New], now)?,
    };
    match format {
        StatsFormat::Text => {
            println!("Deck: {}", stats.deck_name);
            println!("Cards: {}", stats.card_count);
            println!("Due now (learning): {}", stats.due_learning_count);
            println!("Due now (review): {}", stats.due_review_count);
            println!("Due now (new): {}", stats.due_new_count);
        }
        StatsFormat::Json => {
            let stats_json = serde_json::to_string_pretty(&stats)?;
            println!("{}", stats_json);
        }
    }
    Ok(())
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Stats {
    deck_name: String,
    card_count: usize,
    due_learning_count: usize,
    due_review_count: usize,
    due_new_count: usize,
}

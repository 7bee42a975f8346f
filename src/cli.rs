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

use clap::Parser;
use clap::Subcommand;

use crate::cmd::add::add_cards;
use crate::cmd::stats::StatsFormat;
use crate::cmd::stats::print_deck_stats;
use crate::db::Database;
use crate::drill::server::start_server;
use crate::error::ErrorReport;
use crate::error::Fallible;
use crate::types::deck::Deck;

#[derive(Parser)]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Path to the card database.
    #[arg(long, default_value = "kanki.db", global = true)]
    database: String,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Create a new deck.
    NewDeck {
        /// The deck's name.
        name: String,
    },
    /// List decks.
    Decks,
    /// Interactively add cards to a deck.
    Add {
        /// The deck to add cards to.
        deck: String,
    },
    /// Study the cards due in a deck.
    Drill {
        /// The deck to study.
        deck: String,
        /// The port to serve the drill UI on.
        #[arg(long, default_value_t = 8000)]
        port: u16,
    },
    /// Print deck statistics.
    Stats {
        /// The deck to describe.
        deck: String,
        /// Output format.
        #[arg(long, default_value_t = StatsFormat::Text)]
        format: StatsFormat,
    },
}

pub async fn entrypoint() -> Fallible<()> {
    let cli = Cli::parse();
    let db = Database::new(&cli.database)?;
    match cli.command {
        Command::NewDeck { name } => {
            let deck = db.create_deck(&name)?;
            println!("Created deck '{}'.", deck.name);
            Ok(())
        }
        Command::Decks => {
            let decks = db.list_decks()?;
            if decks.is_empty() {
                println!("No decks yet.");
            }
            for deck in decks {
                println!("{}\t{}", deck.id, deck.name);
            }
            Ok(())
        }
        Command::Add { deck } => {
            let deck = find_deck(&db, &deck)?;
            add_cards(&db, &deck)
        }
        Command::Drill { deck, port } => {
            let deck = find_deck(&db, &deck)?;
            start_server(db, deck, port).await
        }
        Command::Stats { deck, format } => {
            let deck = find_deck(&db, &deck)?;
            print_deck_stats(&db, &deck, format)
        }
    }
}

fn find_deck(db: &Database, name: &str) -> Fallible<Deck> {
    db.get_deck(name)?
        .ok_or_else(|| ErrorReport::new(format!("no deck named '{name}'.")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_find_deck() {
        let db = Database::open_in_memory().unwrap();
        db.create_deck("maths").unwrap();
        assert!(find_deck(&db, "maths").is_ok());
        let err = find_deck(&db, "physics").err().unwrap();
        assert_eq!(err.to_string(), "error: no deck named 'physics'.");
    }
}

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

use std::io::Write;
use std::io::stdin;
use std::io::stdout;

use crate::db::Database;
use crate::error::Fallible;
use crate::types::deck::Deck;

/// Interactively add cards to a deck. An empty question or answer ends the
/// loop.
pub fn add_cards(db: &Database, deck: &Deck) -> Fallible<()> {
    println!(
        "Adding cards to '{}'. Leave the question or answer empty to finish.",
        deck.name
    );
    let mut added = 0;
    loop {
        let question = prompt("Question")?;
        if question.is_empty() {
            break;
        }
        let answer = prompt("Answer")?;
        if answer.is_empty() {
            break;
        }
        let topics_line = prompt("Topics (comma-separated)")?;
        let topics = parse_topics(&topics_line);
        db.create_card(deck.id, &question, &answer, &topics)?;
        added += 1;
    }
    println!("Done. {added} cards added.");
    Ok(())
}

fn prompt(label: &str) -> Fallible<String> {
    print!("{label}: ");
    stdout().flush()?;
    let mut line = String::new();
    stdin().read_line(&mut line)?;
    Ok(line.trim().to_string())
}

fn parse_topics(line: &str) -> Vec<String> {
    line.split(',')
        .map(|topic| topic.trim().to_string())
        .filter(|topic| !topic.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_topics() {
        assert_eq!(
            parse_topics("network, tcp ,  "),
            vec!["network".to_string(), "tcp".to_string()]
        );
        assert!(parse_topics("").is_empty());
    }
}

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

use std::sync::Arc;
use std::sync::Mutex;
use std::sync::MutexGuard;

use rusqlite::Connection;
use rusqlite::Row;
use rusqlite::ToSql;
use rusqlite::Transaction;
use rusqlite::config::DbConfig;

use crate::error::Fallible;
use crate::types::card::Card;
use crate::types::card::CardId;
use crate::types::deck::Deck;
use crate::types::deck::DeckId;
use crate::types::stage::Stage;
use crate::types::timestamp::Timestamp;
use crate::types::topic::Topic;
use crate::types::topic::TopicId;

#[derive(Clone)]
pub struct Database {
    conn: Arc<Mutex<Connection>>,
}

impl Database {
    pub fn new(database_path: &str) -> Fallible<Self> {
        let conn = Connection::open(database_path)?;
        Self::from_connection(conn)
    }

    #[cfg(test)]
    pub fn open_in_memory() -> Fallible<Self> {
        let conn = Connection::open_in_memory()?;
        Self::from_connection(conn)
    }

    fn from_connection(mut conn: Connection) -> Fallible<Self> {
        conn.set_db_config(DbConfig::SQLITE_DBCONFIG_ENABLE_FKEY, true)?;
        {
            let tx = conn.transaction()?;
            if !probe_schema_exists(&tx)? {
                tx.execute_batch(include_str!("schema.sql"))?;
                tx.commit()?;
            }
        }
        let conn = Arc::new(Mutex::new(conn));
        Ok(Self { conn })
    }

    pub fn create_deck(&self, name: &str) -> Fallible<Deck> {
        let conn = self.acquire();
        let sql = "insert into decks (name) values (?) returning deck_id;";
        let id: DeckId = conn.query_row(sql, [name], |row| row.get(0))?;
        Ok(Deck {
            id,
            name: name.to_string(),
        })
    }

    /// Look up a deck by name.
    pub fn get_deck(&self, name: &str) -> Fallible<Option<Deck>> {
        let conn = self.acquire();
        let sql = "select deck_id, name from decks where name = ?;";
        let mut stmt = conn.prepare(sql)?;
        let mut rows = stmt.query([name])?;
        if let Some(row) = rows.next()? {
            Ok(Some(Deck {
                id: row.get(0)?,
                name: row.get(1)?,
            }))
        } else {
            Ok(None)
        }
    }

    pub fn list_decks(&self) -> Fallible<Vec<Deck>> {
        let mut decks = Vec::new();
        let conn = self.acquire();
        let mut stmt = conn.prepare("select deck_id, name from decks order by deck_id;")?;
        let mut rows = stmt.query([])?;
        while let Some(row) = rows.next()? {
            decks.push(Deck {
                id: row.get(0)?,
                name: row.get(1)?,
            });
        }
        Ok(decks)
    }

    /// Add a new card to a deck, with the initial scheduling state, and
    /// link it to its topics (created on first use).
    pub fn create_card(
        &self,
        deck_id: DeckId,
        question: &str,
        answer: &str,
        topics: &[String],
    ) -> Fallible<Card> {
        let mut conn = self.acquire();
        let tx = conn.transaction()?;
        let template = Card::new(0, deck_id, question.to_string(), answer.to_string());
        let sql = "insert into cards (deck_id, question, answer, stage, due, steps_left, reps, ivl, factor) values (?, ?, ?, ?, ?, ?, ?, ?, ?) returning card_id;";
        let id: CardId = tx.query_row(
            sql,
            (
                deck_id,
                question,
                answer,
                template.stage,
                template.due,
                template.left,
                template.reps,
                template.interval,
                template.factor,
            ),
            |row| row.get(0),
        )?;
        for topic in topics {
            let topic_id = get_or_create_topic(&tx, topic)?;
            tx.execute(
                "insert or ignore into card_topics (card_id, topic_id) values (?, ?);",
                (id, topic_id),
            )?;
        }
        tx.commit()?;
        log::debug!("Created card {id} in deck {deck_id}");
        Ok(Card { id, ..template })
    }

    pub fn get_card(&self, id: CardId) -> Fallible<Option<Card>> {
        let conn = self.acquire();
        let sql = format!("select {CARD_COLUMNS} from cards where card_id = ?;");
        let mut stmt = conn.prepare(&sql)?;
        let mut rows = stmt.query([id])?;
        if let Some(row) = rows.next()? {
            Ok(Some(card_from_row(row)?))
        } else {
            Ok(None)
        }
    }

    /// Fetch eligible cards for a session: in the given deck, in one of
    /// the given stages, due strictly before the cutoff. Insertion order,
    /// capped at `limit`.
    pub fn due_cards(
        &self,
        deck_id: DeckId,
        stages: &[Stage],
        due_before: Timestamp,
        limit: usize,
    ) -> Fallible<Vec<Card>> {
        let placeholders = vec!["?"; stages.len()].join(", ");
        let sql = format!(
            "select {CARD_COLUMNS} from cards where deck_id = ? and due < ? and stage in ({placeholders}) order by card_id limit ?;"
        );
        let limit = limit as i64;
        let mut params: Vec<&dyn ToSql> = vec![&deck_id, &due_before];
        for stage in stages {
            params.push(stage);
        }
        params.push(&limit);

        let mut cards = Vec::new();
        let conn = self.acquire();
        let mut stmt = conn.prepare(&sql)?;
        let mut rows = stmt.query(&params[..])?;
        while let Some(row) = rows.next()? {
            cards.push(card_from_row(row)?);
        }
        Ok(cards)
    }

    /// Persist a card's scheduling fields after a grading decision.
    pub fn save_card(&self, card: &Card) -> Fallible<()> {
        let conn = self.acquire();
        let sql = "update cards set stage = ?, due = ?, steps_left = ?, reps = ?, ivl = ?, factor = ? where card_id = ?;";
        conn.execute(
            sql,
            (
                card.stage,
                card.due,
                card.left,
                card.reps,
                card.interval,
                card.factor,
                card.id,
            ),
        )?;
        Ok(())
    }

    /// Delete a card. Its topic links go with it.
    pub fn delete_card(&self, id: CardId) -> Fallible<()> {
        log::debug!("Deleting card {id}");
        let conn = self.acquire();
        conn.execute("delete from cards where card_id = ?;", [id])?;
        Ok(())
    }

    /// The topics attached to a card, by name.
    pub fn card_topics(&self, id: CardId) -> Fallible<Vec<Topic>> {
        let mut topics = Vec::new();
        let conn = self.acquire();
        let sql = "select t.topic_id, t.name from topics t join card_topics ct on ct.topic_id = t.topic_id where ct.card_id = ? order by t.name;";
        let mut stmt = conn.prepare(sql)?;
        let mut rows = stmt.query([id])?;
        while let Some(row) = rows.next()? {
            topics.push(Topic {
                id: row.get(0)?,
                name: row.get(1)?,
            });
        }
        Ok(topics)
    }

    pub fn card_count(&self, deck_id: DeckId) -> Fallible<usize> {
        let conn = self.acquire();
        let sql = "select count(*) from cards where deck_id = ?;";
        let count: i64 = conn.query_row(sql, [deck_id], |row| row.get(0))?;
        Ok(count as usize)
    }

    /// The number of cards in the deck that are due now and in one of the
    /// given stages.
    pub fn due_count(&self, deck_id: DeckId, stages: &[Stage], now: Timestamp) -> Fallible<usize> {
        let placeholders = vec!["?"; stages.len()].join(", ");
        let sql = format!(
            "select count(*) from cards where deck_id = ? and due < ? and stage in ({placeholders});"
        );
        let mut params: Vec<&dyn ToSql> = vec![&deck_id, &now];
        for stage in stages {
            params.push(stage);
        }
        let conn = self.acquire();
        let count: i64 = conn.query_row(&sql, &params[..], |row| row.get(0))?;
        Ok(count as usize)
    }

    fn acquire(&self) -> MutexGuard<'_, Connection> {
        self.conn.lock().unwrap()
    }
}

const CARD_COLUMNS: &str =
    "card_id, question, answer, deck_id, stage, due, steps_left, reps, ivl, factor";

fn card_from_row(row: &Row) -> rusqlite::Result<Card> {
    Ok(Card {
        id: row.get(0)?,
        question: row.get(1)?,
        answer: row.get(2)?,
        deck_id: row.get(3)?,
        stage: row.get(4)?,
        due: row.get(5)?,
        left: row.get(6)?,
        reps: row.get(7)?,
        interval: row.get(8)?,
        factor: row.get(9)?,
    })
}

fn get_or_create_topic(tx: &Transaction, name: &str) -> Fallible<TopicId> {
    let mut stmt = tx.prepare("select topic_id from topics where name = ?;")?;
    let mut rows = stmt.query([name])?;
    if let Some(row) = rows.next()? {
        return Ok(row.get(0)?);
    }
    let sql = "insert into topics (name) values (?) returning topic_id;";
    let id: TopicId = tx.query_row(sql, [name], |row| row.get(0))?;
    Ok(id)
}

fn probe_schema_exists(tx: &Transaction) -> Fallible<bool> {
    let sql = "select count(*) from sqlite_master where type='table' AND name=?;";
    let count: i64 = tx.query_row(sql, ["cards"], |row| row.get(0))?;
    Ok(count > 0)
}

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

use axum::Form;
use axum::extract::State;
use axum::response::Redirect;
use serde::Deserialize;

use crate::drill::state::ServerState;
use crate::error::Fallible;
use crate::scheduler::advance;
use crate::types::grade::Grade;
use crate::types::timestamp::Timestamp;

#[derive(Debug, Deserialize)]
enum Action {
    Reveal,
    Again,
    Hard,
    Good,
    Easy,
    Delete,
    End,
}

impl Action {
    pub fn grade(&self) -> Grade {
        match self {
            Action::Again => Grade::Again,
            Action::Hard => Grade::Hard,
            Action::Good => Grade::Good,
            Action::Easy => Grade::Easy,
            _ => panic!("Action does not correspond to a grade"),
        }
    }
}

#[derive(Deserialize)]
pub struct FormData {
    action: Action,
}

pub async fn post_handler(
    State(state): State<ServerState>,
    Form(form): Form<FormData>,
) -> Redirect {
    match action_handler(state, form.action) {
        Ok(_) => {}
        Err(e) => {
            log::error!("error: {e}");
        }
    }
    Redirect::to("/")
}

fn action_handler(state: ServerState, action: Action) -> Fallible<()> {
    let mut mutable = state.mutable.lock().unwrap();
    match action {
        Action::Reveal => {
            if !mutable.reveal {
                mutable.reveal = true;
            }
        }
        Action::Delete => {
            // Deletion is unconditional: the card leaves the session and
            // the database, and is never reinserted.
            if let Some(card) = mutable.queue.pop() {
                mutable.db.delete_card(card.id)?;
                mutable.reveal = false;
            }
            if mutable.queue.is_empty() {
                mutable.finished = true;
            }
        }
        Action::End => {
            // Cards not yet popped remain untouched in storage.
            log::debug!("Session ended early");
            mutable.finished = true;
        }
        Action::Again | Action::Hard | Action::Good | Action::Easy => {
            if mutable.reveal {
                if let Some(mut card) = mutable.queue.pop() {
                    let now = Timestamp::now();
                    let grade = action.grade();
                    advance(&mut card, grade, now);
                    mutable.db.save_card(&card)?;
                    log::debug!(
                        "card {} {} stage={} left={} ivl={}d factor={}",
                        card.id,
                        grade.as_str(),
                        card.stage.as_str(),
                        card.left,
                        card.interval,
                        card.factor
                    );
                    // Due again within the hour? Back into the live session.
                    mutable.queue.requeue(card, now);
                    mutable.reviewed_count += 1;
                    mutable.reveal = false;
                }
                if mutable.queue.is_empty() {
                    log::debug!("Session completed");
                    mutable.finished = true;
                }
            }
        }
    }
    Ok(())
}

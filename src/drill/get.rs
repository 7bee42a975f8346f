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

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::Html;
use maud::Markup;
use maud::html;

use crate::drill::state::ServerState;
use crate::drill::template::page_template;

pub async fn get_handler(State(state): State<ServerState>) -> (StatusCode, Html<String>) {
    let mutable = state.mutable.lock().unwrap();
    let body = if mutable.finished || mutable.queue.is_empty() {
        html! {
            div.finished {
                h1 {
                    "Session Completed"
                }
                p {
                    (mutable.reviewed_count) " cards reviewed."
                }
            }
        }
    } else {
        // A running session always has a head card.
        let card = mutable.queue.peek().unwrap().clone();
        let topics = match mutable.db.card_topics(card.id) {
            Ok(topics) => topics,
            Err(e) => {
                log::error!("error: {e}");
                Vec::new()
            }
        };
        let progress = format!(
            "{} reviewed, {} remaining",
            mutable.reviewed_count,
            mutable.queue.len()
        );
        let card_content: Markup = if mutable.reveal {
            html! {
                div.content {
                    div.question {
                        p {
                            (card.question)
                        }
                    }
                    div.answer {
                        p {
                            (card.answer)
                        }
                    }
                }
            }
        } else {
            html! {
                div.content {
                    div.question {
                        p {
                            (card.question)
                        }
                    }
                    div.answer {}
                }
            }
        };
        let card_controls = if mutable.reveal {
            html! {
                form action="/" method="post" {
                    input id="again" type="submit" name="action" value="Again";
                    input id="hard" type="submit" name="action" value="Hard";
                    input id="good" type="submit" name="action" value="Good";
                    input id="easy" type="submit" name="action" value="Easy";
                    div.spacer {}
                    input id="delete" type="submit" name="action" value="Delete";
                    input id="end" type="submit" name="action" value="End";
                }
            }
        } else {
            html! {
                form action="/" method="post" {
                    input id="reveal" type="submit" name="action" value="Reveal";
                    div.spacer {}
                    input id="delete" type="submit" name="action" value="Delete";
                    input id="end" type="submit" name="action" value="End";
                }
            }
        };
        html! {
            div.root {
                div.card {
                    div.header {
                        h1 {
                            (state.deck.name)
                        }
                        div.progress {
                            (progress)
                        }
                    }
                    @if !topics.is_empty() {
                        div.topics {
                            @for topic in &topics {
                                span.topic {
                                    (topic.name)
                                }
                            }
                        }
                    }
                    (card_content)
                    div.controls {
                        (card_controls)
                    }
                }
            }
        }
    };
    let html = page_template(body);
    (StatusCode::OK, Html(html.into_string()))
}

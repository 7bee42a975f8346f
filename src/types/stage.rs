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

use rusqlite::ToSql;
use rusqlite::types::FromSql;
use rusqlite::types::FromSqlError;
use rusqlite::types::FromSqlResult;
use rusqlite::types::ToSqlOutput;
use rusqlite::types::ValueRef;

use crate::error::ErrorReport;
use crate::error::fail;

/// A card's retention phase. `Relearning` is distinct from `Learning`: it
/// records that the card regressed from graduated state.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Stage {
    New,
    Learning,
    Review,
    Relearning,
}

impl Stage {
    /// The card's precedence within a session. Cards in the learning phase
    /// come first, then new cards, then reviews.
    pub fn priority(self) -> u8 {
        match self {
            Stage::Learning | Stage::Relearning => 0,
            Stage::New => 1,
            Stage::Review => 2,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Stage::New => "new",
            Stage::Learning => "learning",
            Stage::Review => "review",
            Stage::Relearning => "relearning",
        }
    }
}

impl TryFrom<String> for Stage {
    type Error = ErrorReport;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        match value.as_str() {
            "new" => Ok(Stage::New),
            "learning" => Ok(Stage::Learning),
            "review" => Ok(Stage::Review),
            "relearning" => Ok(Stage::Relearning),
            _ => fail(format!("Invalid stage: {}", value)),
        }
    }
}

impl ToSql for Stage {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}

impl FromSql for Stage {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        let string: String = FromSql::column_result(value)?;
        Stage::try_from(string).map_err(|e| FromSqlError::Other(Box::new(e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_priority() {
        assert_eq!(Stage::Learning.priority(), 0);
        assert_eq!(Stage::Relearning.priority(), 0);
        assert_eq!(Stage::New.priority(), 1);
        assert_eq!(Stage::Review.priority(), 2);
    }

    #[test]
    fn test_string_round_trip() {
        for stage in [
            Stage::New,
            Stage::Learning,
            Stage::Review,
            Stage::Relearning,
        ] {
            let back = Stage::try_from(stage.as_str().to_string()).unwrap();
            assert_eq!(back, stage);
        }
    }

    #[test]
    fn test_invalid_stage() {
        let result = Stage::try_from("suspended".to_string());
        assert!(result.is_err());
    }
}

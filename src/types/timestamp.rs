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

use chrono::DateTime;
use chrono::Duration;
use chrono::SubsecRound;
use chrono::Utc;
use rusqlite::ToSql;
use rusqlite::types::FromSql;
use rusqlite::types::FromSqlError;
use rusqlite::types::FromSqlResult;
use rusqlite::types::ToSqlOutput;
use rusqlite::types::ValueRef;

/// An absolute instant. Stored in the database as fractional seconds since
/// the Unix epoch.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Debug)]
pub struct Timestamp(DateTime<Utc>);

impl Timestamp {
    /// Epoch zero. Freshly created cards are due at the epoch, which makes
    /// them eligible immediately.
    pub const EPOCH: Timestamp = Timestamp(DateTime::<Utc>::UNIX_EPOCH);

    pub fn now() -> Self {
        // Truncated to microseconds, the resolution we persist.
        Self(Utc::now().trunc_subsecs(6))
    }

    /// The instant `n` minutes from this one.
    pub fn plus_minutes(self, n: i64) -> Self {
        Self(self.0 + Duration::minutes(n))
    }

    /// The instant `n` days from this one.
    pub fn plus_days(self, n: i64) -> Self {
        Self(self.0 + Duration::days(n))
    }

    pub fn epoch_seconds(self) -> f64 {
        self.0.timestamp_micros() as f64 / 1_000_000.0
    }
}

impl ToSql for Timestamp {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.epoch_seconds()))
    }
}

impl FromSql for Timestamp {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        let seconds: f64 = FromSql::column_result(value)?;
        let micros = (seconds * 1_000_000.0).round() as i64;
        let ts = DateTime::from_timestamp_micros(micros).ok_or(FromSqlError::OutOfRange(micros))?;
        Ok(Timestamp(ts))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_epoch_is_before_now() {
        assert!(Timestamp::EPOCH < Timestamp::now());
    }

    #[test]
    fn test_plus_minutes() {
        let now = Timestamp::now();
        let later = now.plus_minutes(5);
        let delta = later.epoch_seconds() - now.epoch_seconds();
        assert!((delta - 300.0).abs() < 1e-3);
    }

    #[test]
    fn test_plus_days() {
        let now = Timestamp::now();
        let later = now.plus_days(28);
        let delta = later.epoch_seconds() - now.epoch_seconds();
        assert!((delta - 28.0 * 86400.0).abs() < 1e-3);
    }

    #[test]
    fn test_sql_round_trip() {
        let now = Timestamp::now();
        let conn = rusqlite::Connection::open_in_memory().unwrap();
        let back: Timestamp = conn
            .query_row("select ?;", [now], |row| row.get(0))
            .unwrap();
        assert_eq!(back, now);
    }
}

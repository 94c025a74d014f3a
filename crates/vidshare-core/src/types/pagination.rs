//! Keyset (cursor) pagination over `(created_at, id)`.
//!
//! Lists are ordered newest first. A cursor names the last item of the
//! previous page; the next page holds rows strictly older than it, with the
//! id breaking ties between rows sharing a timestamp.

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::AppError;
use crate::result::AppResult;

/// Decoded position in a `(created_at DESC, id DESC)` ordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cursor {
    /// Creation time of the last item returned.
    pub created_at: DateTime<Utc>,
    /// Id of the last item returned.
    pub id: Uuid,
}

impl Cursor {
    /// Create a cursor pointing at the given item.
    pub fn new(created_at: DateTime<Utc>, id: Uuid) -> Self {
        Self { created_at, id }
    }

    /// Encode as an opaque URL-safe token.
    ///
    /// Timestamps are carried at microsecond precision, matching PostgreSQL.
    pub fn encode(&self) -> String {
        let raw = format!("{}:{}", self.created_at.timestamp_micros(), self.id);
        URL_SAFE_NO_PAD.encode(raw)
    }

    /// Decode a token produced by [`Cursor::encode`].
    pub fn decode(token: &str) -> AppResult<Self> {
        let invalid = || AppError::validation("Invalid pagination cursor");

        let bytes = URL_SAFE_NO_PAD.decode(token).map_err(|_| invalid())?;
        let raw = String::from_utf8(bytes).map_err(|_| invalid())?;
        let (micros, id) = raw.split_once(':').ok_or_else(invalid)?;

        let micros: i64 = micros.parse().map_err(|_| invalid())?;
        let created_at = DateTime::<Utc>::from_timestamp_micros(micros).ok_or_else(invalid)?;
        let id = Uuid::parse_str(id).map_err(|_| invalid())?;

        Ok(Self { created_at, id })
    }

    /// Whether an item at `(created_at, id)` sorts strictly after this cursor
    /// in newest-first order.
    pub fn precedes(&self, created_at: DateTime<Utc>, id: Uuid) -> bool {
        created_at < self.created_at || (created_at == self.created_at && id < self.id)
    }
}

/// Query parameters for a cursor-paginated list.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CursorRequest {
    /// Opaque cursor from a previous page's `next_cursor`.
    #[serde(default)]
    pub cursor: Option<String>,
    /// Maximum number of items to return.
    #[serde(default)]
    pub limit: Option<u32>,
}

impl CursorRequest {
    /// Decode the cursor and clamp the limit into `1..=max_limit`.
    pub fn resolve(&self, default_limit: u32, max_limit: u32) -> AppResult<PageBounds> {
        let after = match self.cursor.as_deref() {
            Some(token) if !token.is_empty() => Some(Cursor::decode(token)?),
            _ => None,
        };
        let limit = self
            .limit
            .unwrap_or(default_limit)
            .clamp(1, max_limit.max(1));

        Ok(PageBounds { after, limit })
    }
}

/// A resolved page request handed to storage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageBounds {
    /// Return only items older than this position.
    pub after: Option<Cursor>,
    /// Page size.
    pub limit: u32,
}

impl PageBounds {
    /// Rows to fetch: one extra to learn whether another page exists.
    pub fn fetch_limit(&self) -> i64 {
        i64::from(self.limit) + 1
    }
}

/// One page of a cursor-paginated list.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CursorPage<T> {
    /// Items on this page, newest first.
    pub items: Vec<T>,
    /// Cursor for the following page, absent on the last page.
    pub next_cursor: Option<String>,
}

impl<T> CursorPage<T> {
    /// Build a page from rows fetched with [`PageBounds::fetch_limit`].
    pub fn from_overfetch(
        mut rows: Vec<T>,
        bounds: &PageBounds,
        cursor_of: impl Fn(&T) -> Cursor,
    ) -> Self {
        let limit = bounds.limit as usize;
        let next_cursor = if rows.len() > limit {
            rows.truncate(limit);
            rows.last().map(|last| cursor_of(last).encode())
        } else {
            None
        };

        Self {
            items: rows,
            next_cursor,
        }
    }

    /// A page with no items.
    pub fn empty() -> Self {
        Self {
            items: Vec::new(),
            next_cursor: None,
        }
    }
}

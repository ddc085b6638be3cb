//! Opaque cursor and pagination envelope primitives shared by list
//! endpoints.
//!
//! Cursors encode a row offset as URL-safe base64 over a small JSON
//! payload so clients treat them as opaque tokens. Endpoints accept an
//! optional cursor plus a limit, clamp the limit to a safe window, and
//! return a [`Page`] envelope carrying the items and the cursor for the
//! next slice, if any.

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

/// Default number of items returned when the client does not ask for a
/// specific limit.
pub const DEFAULT_LIMIT: u32 = 25;

/// Upper bound on the number of items a single page may carry.
pub const MAX_LIMIT: u32 = 100;

/// Errors produced while decoding client-supplied cursors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CursorError {
    /// The cursor was not valid URL-safe base64.
    #[error("cursor is not valid base64")]
    Encoding,
    /// The decoded cursor payload did not match the expected shape.
    #[error("cursor payload is malformed")]
    Payload,
}

/// Wire payload hidden inside an encoded cursor.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
struct CursorPayload {
    /// Absolute row offset of the first item on the next page.
    o: u64,
}

/// Opaque pagination cursor pointing at an absolute row offset.
///
/// # Examples
/// ```
/// use pagination::Cursor;
///
/// let cursor = Cursor::at(50);
/// let decoded = Cursor::decode(&cursor.encode()).expect("round trip");
/// assert_eq!(decoded.offset(), 50);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cursor {
    offset: u64,
}

impl Cursor {
    /// Build a cursor pointing at the given absolute offset.
    #[must_use]
    pub const fn at(offset: u64) -> Self {
        Self { offset }
    }

    /// Absolute row offset the cursor points at.
    #[must_use]
    pub const fn offset(&self) -> u64 {
        self.offset
    }

    /// Encode the cursor as an opaque URL-safe token.
    #[must_use]
    pub fn encode(&self) -> String {
        let payload = CursorPayload { o: self.offset };
        // Serialising a struct of plain integers cannot fail.
        let json = serde_json::to_vec(&payload).unwrap_or_default();
        URL_SAFE_NO_PAD.encode(json)
    }

    /// Decode a client-supplied token back into a cursor.
    ///
    /// # Errors
    /// Returns [`CursorError::Encoding`] for invalid base64 and
    /// [`CursorError::Payload`] when the decoded bytes are not the
    /// expected JSON shape.
    pub fn decode(token: &str) -> Result<Self, CursorError> {
        let bytes = URL_SAFE_NO_PAD
            .decode(token.trim())
            .map_err(|_| CursorError::Encoding)?;
        let payload: CursorPayload =
            serde_json::from_slice(&bytes).map_err(|_| CursorError::Payload)?;
        Ok(Self { offset: payload.o })
    }
}

/// Validated pagination window derived from query parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    offset: u64,
    limit: u32,
}

impl PageRequest {
    /// Build a request from an optional cursor token and requested limit.
    ///
    /// A missing cursor starts at offset zero. Limits are clamped to
    /// `1..=`[`MAX_LIMIT`], defaulting to [`DEFAULT_LIMIT`].
    ///
    /// # Errors
    /// Propagates [`CursorError`] when the cursor token cannot be decoded.
    pub fn from_query(cursor: Option<&str>, limit: Option<u32>) -> Result<Self, CursorError> {
        let offset = match cursor {
            Some(token) => Cursor::decode(token)?.offset(),
            None => 0,
        };
        let limit = limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT);
        Ok(Self { offset, limit })
    }

    /// Offset of the first row in the window.
    #[must_use]
    pub const fn offset(&self) -> u64 {
        self.offset
    }

    /// Maximum number of rows in the window.
    #[must_use]
    pub const fn limit(&self) -> u32 {
        self.limit
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            offset: 0,
            limit: DEFAULT_LIMIT,
        }
    }
}

/// Envelope returned by paginated list endpoints.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    /// Items in the current window.
    pub items: Vec<T>,
    /// Cursor for the next window, absent on the final page.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_cursor: Option<String>,
}

impl<T> Page<T> {
    /// Wrap a fetched slice, deriving the next cursor from the request.
    ///
    /// A follow-up cursor is only emitted when the slice filled the
    /// requested window, meaning more rows may remain.
    #[must_use]
    pub fn from_slice(items: Vec<T>, request: PageRequest) -> Self {
        let next_cursor = if items.len() == request.limit() as usize {
            Some(Cursor::at(request.offset() + u64::from(request.limit())).encode())
        } else {
            None
        };
        Self { items, next_cursor }
    }

    /// Map the item type while preserving the cursor.
    #[must_use]
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            next_cursor: self.next_cursor,
        }
    }
}

impl<T: DeserializeOwned> Page<T> {
    /// Parse an envelope from raw JSON, used by test harnesses.
    ///
    /// # Errors
    /// Returns the underlying `serde_json` error when the payload does
    /// not match the envelope shape.
    pub fn from_json(bytes: &[u8]) -> Result<Self, serde_json::Error> {
        serde_json::from_slice(bytes)
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(0)]
    #[case(25)]
    #[case(u64::MAX)]
    fn cursor_round_trips(#[case] offset: u64) {
        let token = Cursor::at(offset).encode();
        let decoded = Cursor::decode(&token).expect("round trip");
        assert_eq!(decoded.offset(), offset);
    }

    #[rstest]
    #[case("not base64!!")]
    #[case("@@@@")]
    fn cursor_rejects_invalid_base64(#[case] token: &str) {
        assert_eq!(Cursor::decode(token), Err(CursorError::Encoding));
    }

    #[rstest]
    fn cursor_rejects_malformed_payload() {
        let token = URL_SAFE_NO_PAD.encode(b"{\"x\":true}");
        assert_eq!(Cursor::decode(&token), Err(CursorError::Payload));
    }

    #[rstest]
    #[case(None, None, 0, DEFAULT_LIMIT)]
    #[case(None, Some(10), 0, 10)]
    #[case(None, Some(0), 0, 1)]
    #[case(None, Some(1_000), 0, MAX_LIMIT)]
    fn page_request_clamps_limits(
        #[case] cursor: Option<&str>,
        #[case] limit: Option<u32>,
        #[case] expected_offset: u64,
        #[case] expected_limit: u32,
    ) {
        let request = PageRequest::from_query(cursor, limit).expect("valid request");
        assert_eq!(request.offset(), expected_offset);
        assert_eq!(request.limit(), expected_limit);
    }

    #[rstest]
    fn page_request_honours_cursor_offset() {
        let token = Cursor::at(75).encode();
        let request = PageRequest::from_query(Some(token.as_str()), Some(25)).expect("valid");
        assert_eq!(request.offset(), 75);
    }

    #[rstest]
    fn full_window_emits_next_cursor() {
        let request = PageRequest::from_query(None, Some(2)).expect("valid");
        let page = Page::from_slice(vec![1, 2], request);
        let next = page.next_cursor.expect("cursor expected");
        assert_eq!(Cursor::decode(&next).expect("valid").offset(), 2);
    }

    #[rstest]
    fn partial_window_is_final_page() {
        let request = PageRequest::from_query(None, Some(5)).expect("valid");
        let page = Page::from_slice(vec![1, 2], request);
        assert!(page.next_cursor.is_none());
    }

    #[rstest]
    fn map_preserves_cursor() {
        let request = PageRequest::from_query(None, Some(1)).expect("valid");
        let page = Page::from_slice(vec![3], request).map(|n| n * 2);
        assert_eq!(page.items, vec![6]);
        assert!(page.next_cursor.is_some());
    }
}

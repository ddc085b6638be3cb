//! Pagination query parameters shared by list endpoints.

use pagination::{CursorError, PageRequest};
use serde::Deserialize;
use serde_json::json;
use utoipa::{IntoParams, ToSchema};

use crate::domain::Error;

/// Common `?cursor=...&limit=...` query parameters.
#[derive(Debug, Clone, Default, Deserialize, IntoParams, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ListQuery {
    /// Opaque cursor from a previous page's `nextCursor`.
    pub cursor: Option<String>,
    /// Requested page size, clamped server-side.
    #[serde(default, deserialize_with = "deserialize_limit")]
    pub limit: Option<u32>,
}

/// Accept the limit as either a number or its string form.
///
/// `serde(flatten)` routes urlencoded query values through serde's
/// content buffer, which presents numbers as strings, so both shapes
/// must parse.
fn deserialize_limit<'de, D>(deserializer: D) -> Result<Option<u32>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Number(u32),
        Text(String),
    }

    match Option::<Raw>::deserialize(deserializer)? {
        None => Ok(None),
        Some(Raw::Number(limit)) => Ok(Some(limit)),
        Some(Raw::Text(text)) => text
            .parse::<u32>()
            .map(Some)
            .map_err(serde::de::Error::custom),
    }
}

impl ListQuery {
    /// Decode the cursor and clamp the limit into a [`PageRequest`].
    pub fn page_request(&self) -> Result<PageRequest, Error> {
        PageRequest::from_query(self.cursor.as_deref(), self.limit).map_err(|err| {
            let reason = match err {
                CursorError::Encoding => "cursor is not valid base64",
                CursorError::Payload => "cursor payload is malformed",
            };
            Error::invalid_request(reason).with_details(json!({ "field": "cursor" }))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ErrorCode;
    use pagination::{Cursor, DEFAULT_LIMIT, MAX_LIMIT};
    use rstest::rstest;

    #[rstest]
    fn defaults_when_no_parameters_given() {
        let request = ListQuery::default().page_request().expect("valid");
        assert_eq!(request.offset(), 0);
        assert_eq!(request.limit(), DEFAULT_LIMIT);
    }

    #[rstest]
    fn decodes_cursor_and_clamps_limit() {
        let query = ListQuery {
            cursor: Some(Cursor::at(50).encode()),
            limit: Some(10_000),
        };
        let request = query.page_request().expect("valid");
        assert_eq!(request.offset(), 50);
        assert_eq!(request.limit(), MAX_LIMIT);
    }

    #[rstest]
    fn bad_cursor_is_an_invalid_request() {
        let query = ListQuery {
            cursor: Some("!!not-base64!!".to_owned()),
            limit: None,
        };
        let err = query.page_request().expect_err("invalid cursor");
        assert_eq!(err.code(), ErrorCode::InvalidRequest);
    }
}

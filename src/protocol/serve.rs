//! Serving stored content over HTTP
//!
//! Streams an opened entry as the response body and honours the conditional
//! and partial request headers: `If-Modified-Since`, `If-Range` (date form)
//! and a single `Range: bytes=` range.

use axum::body::Body;
use axum::http::{HeaderMap, HeaderValue, StatusCode, header};
use axum::response::{IntoResponse, Response};
use httpdate::{HttpDate, fmt_http_date};
use log::debug;
use std::io::{self, SeekFrom};
use std::time::SystemTime;
use tokio::io::{AsyncReadExt, AsyncSeekExt};
use tokio_util::io::ReaderStream;

use crate::error::{FileServerError, RequestError};
use crate::storage::StoredObject;

/// Builds the download response for `object`, stored under `file_name`.
pub async fn serve_object(
    request_headers: &HeaderMap,
    file_name: &str,
    object: StoredObject,
) -> Result<Response, FileServerError> {
    let StoredObject {
        len,
        modified,
        mut reader,
    } = object;

    let mut headers = HeaderMap::new();
    headers.insert(header::ACCEPT_RANGES, HeaderValue::from_static("bytes"));
    if let Some(modified) = modified {
        headers.insert(header::LAST_MODIFIED, header_value(fmt_http_date(modified))?);
    }

    if is_not_modified(request_headers, modified) {
        return Ok((StatusCode::NOT_MODIFIED, headers).into_response());
    }

    let mime = mime_guess::from_path(file_name).first_or_octet_stream();
    headers.insert(header::CONTENT_TYPE, header_value(mime.to_string())?);

    let range = if range_applies(request_headers, modified) {
        parse_range(request_headers.get(header::RANGE), len)?
    } else {
        None
    };

    let Some((start, end)) = range else {
        headers.insert(header::CONTENT_LENGTH, HeaderValue::from(len));
        let body = Body::from_stream(ReaderStream::new(reader));
        return Ok((StatusCode::OK, headers, body).into_response());
    };

    let length = end - start + 1;
    debug!("Serving bytes {}-{}/{} of {}", start, end, len, file_name);
    reader.seek(SeekFrom::Start(start)).await?;

    headers.insert(
        header::CONTENT_RANGE,
        header_value(format!("bytes {}-{}/{}", start, end, len))?,
    );
    headers.insert(header::CONTENT_LENGTH, HeaderValue::from(length));
    let body = Body::from_stream(ReaderStream::new(reader.take(length)));
    Ok((StatusCode::PARTIAL_CONTENT, headers, body).into_response())
}

/// True when `If-Modified-Since` is at or after the entry's modification
/// time, compared at whole-second precision.
pub fn is_not_modified(headers: &HeaderMap, modified: Option<SystemTime>) -> bool {
    match (modified, header_date(headers, header::IF_MODIFIED_SINCE)) {
        (Some(modified), Some(since)) => HttpDate::from(modified) <= since,
        _ => false,
    }
}

/// Whether a `Range` header should be honoured. An `If-Range` date must
/// equal the entry's modification time; an entity-tag form never matches
/// since no tags are issued.
pub fn range_applies(headers: &HeaderMap, modified: Option<SystemTime>) -> bool {
    if !headers.contains_key(header::IF_RANGE) {
        return true;
    }
    match (modified, header_date(headers, header::IF_RANGE)) {
        (Some(modified), Some(date)) => HttpDate::from(modified) == date,
        _ => false,
    }
}

/// Parses a single `bytes=` range against an entry of `len` bytes into an
/// inclusive `(start, end)` pair.
///
/// `None` means "serve the whole entry": no header, several ranges, or an
/// empty suffix range. An end past the last byte is clamped. A range that
/// starts past the end, or cannot be parsed, is unsatisfiable.
pub fn parse_range(
    value: Option<&HeaderValue>,
    len: u64,
) -> Result<Option<(u64, u64)>, RequestError> {
    let Some(value) = value else {
        return Ok(None);
    };
    let unsatisfiable = || RequestError::RangeNotSatisfiable(len);

    let value = value.to_str().map_err(|_| unsatisfiable())?;
    let range = value
        .trim()
        .strip_prefix("bytes=")
        .ok_or_else(unsatisfiable)?;
    if range.contains(',') {
        return Ok(None);
    }

    let (start_part, end_part) = range.split_once('-').ok_or_else(unsatisfiable)?;
    let (start_part, end_part) = (start_part.trim(), end_part.trim());

    if start_part.is_empty() {
        let suffix: u64 = end_part.parse().map_err(|_| unsatisfiable())?;
        if suffix == 0 {
            return Ok(None);
        }
        if len == 0 {
            return Err(unsatisfiable());
        }
        return Ok(Some((len.saturating_sub(suffix), len - 1)));
    }

    let start: u64 = start_part.parse().map_err(|_| unsatisfiable())?;
    if start >= len {
        return Err(unsatisfiable());
    }
    let end = if end_part.is_empty() {
        len - 1
    } else {
        let end: u64 = end_part.parse().map_err(|_| unsatisfiable())?;
        if end < start {
            return Err(unsatisfiable());
        }
        end.min(len - 1)
    };

    Ok(Some((start, end)))
}

fn header_date(headers: &HeaderMap, name: header::HeaderName) -> Option<HttpDate> {
    headers.get(name)?.to_str().ok()?.parse().ok()
}

fn header_value(value: String) -> Result<HeaderValue, FileServerError> {
    HeaderValue::try_from(value).map_err(|e| FileServerError::from(io::Error::other(e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{Duration, UNIX_EPOCH};

    fn range(value: &str, len: u64) -> Result<Option<(u64, u64)>, RequestError> {
        parse_range(Some(&HeaderValue::from_str(value).unwrap()), len)
    }

    fn headers(name: header::HeaderName, value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(name, HeaderValue::from_str(value).unwrap());
        headers
    }

    #[test]
    fn test_parse_range_forms() {
        assert_eq!(parse_range(None, 100).unwrap(), None);
        assert_eq!(range("bytes=0-9", 1000).unwrap(), Some((0, 9)));
        assert_eq!(range("bytes=990-", 1000).unwrap(), Some((990, 999)));
        assert_eq!(range("bytes=-10", 1000).unwrap(), Some((990, 999)));
        assert_eq!(range("bytes=-5000", 1000).unwrap(), Some((0, 999)));
    }

    #[test]
    fn test_parse_range_clamps_end() {
        assert_eq!(range("bytes=500-5000", 1000).unwrap(), Some((500, 999)));
    }

    #[test]
    fn test_parse_range_multiple_ranges_serve_everything() {
        assert_eq!(range("bytes=0-1,5-6", 1000).unwrap(), None);
    }

    #[test]
    fn test_parse_range_unsatisfiable() {
        for value in ["bytes=1000-", "bytes=2000-3000", "bytes=9-0", "items=0-1", "bytes=x-1"] {
            assert!(
                matches!(range(value, 1000), Err(RequestError::RangeNotSatisfiable(1000))),
                "{value}"
            );
        }
        assert!(range("bytes=0-", 0).is_err());
    }

    #[test]
    fn test_if_modified_since() {
        let modified = UNIX_EPOCH + Duration::from_secs(1_700_000_000) + Duration::from_millis(400);
        let same_second = headers(header::IF_MODIFIED_SINCE, &fmt_http_date(modified));
        assert!(is_not_modified(&same_second, Some(modified)));

        let earlier = modified - Duration::from_secs(60);
        let stale = headers(header::IF_MODIFIED_SINCE, &fmt_http_date(earlier));
        assert!(!is_not_modified(&stale, Some(modified)));

        let garbage = headers(header::IF_MODIFIED_SINCE, "yesterday");
        assert!(!is_not_modified(&garbage, Some(modified)));
        assert!(!is_not_modified(&HeaderMap::new(), Some(modified)));
    }

    #[test]
    fn test_if_range() {
        let modified = UNIX_EPOCH + Duration::from_secs(1_700_000_000);
        assert!(range_applies(&HeaderMap::new(), Some(modified)));

        let matching = headers(header::IF_RANGE, &fmt_http_date(modified));
        assert!(range_applies(&matching, Some(modified)));

        let changed = headers(
            header::IF_RANGE,
            &fmt_http_date(modified - Duration::from_secs(5)),
        );
        assert!(!range_applies(&changed, Some(modified)));

        let etag = headers(header::IF_RANGE, "\"abc\"");
        assert!(!range_applies(&etag, Some(modified)));
    }

    #[tokio::test]
    async fn test_serve_object_partial_body() {
        let object = StoredObject {
            len: 10,
            modified: None,
            reader: Box::new(std::io::Cursor::new(b"0123456789".to_vec())),
        };
        let request = headers(header::RANGE, "bytes=2-4");

        let response = serve_object(&request, "digits.txt", object).await.unwrap();

        assert_eq!(response.status(), StatusCode::PARTIAL_CONTENT);
        assert_eq!(response.headers()[header::CONTENT_RANGE], "bytes 2-4/10");
        assert_eq!(response.headers()[header::CONTENT_LENGTH], "3");
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        assert_eq!(&body[..], b"234");
    }
}

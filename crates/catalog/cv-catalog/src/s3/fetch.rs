//! Geometry fetching from S3 objects.

use async_trait::async_trait;
use aws_sdk_s3::Client;
use aws_sdk_s3::error::SdkError;
use aws_sdk_s3::operation::get_object::GetObjectError;
use cv_error::{FetchError, Result};
use tracing::{debug, trace};

use crate::geometry::Geometry;
use crate::remote::GeometryFetcher;

/// WKT keywords searched for in object bytes, longest first so that
/// `MULTIPOLYGON` is not mistaken for `POLYGON`.
const WKT_KEYWORDS: [&str; 7] = [
    "GEOMETRYCOLLECTION",
    "MULTILINESTRING",
    "MULTIPOLYGON",
    "MULTIPOINT",
    "LINESTRING",
    "POLYGON",
    "POINT",
];

/// Reads the bounding polygon stored in a CSLC object on S3.
///
/// The object body is streamed and scanned chunk by chunk for the first
/// well-known-text geometry; the download stops as soon as one decodes. CSLC products keep the burst footprint in an
/// uncompressed string dataset (`identification/bounding_polygon`), so the
/// text appears verbatim in the file.
#[derive(Clone)]
pub struct S3GeometryFetcher {
    client: Client,
}

impl S3GeometryFetcher {
    /// Create a fetcher using the given client.
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl GeometryFetcher for S3GeometryFetcher {
    async fn fetch_geometry(&self, url: &str) -> Result<Geometry> {
        let (bucket, key) = parse_s3_url(url)?;

        debug!(bucket = %bucket, key = %key, "Downloading object for geometry");

        let response = self
            .client
            .get_object()
            .bucket(bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| map_get_error(url, e))?;

        let mut body = response.body;
        let mut scanner = WktScanner::new();
        let mut read = 0usize;

        while let Some(chunk) = body
            .try_next()
            .await
            .map_err(|e| FetchError::Io(format!("Failed to read body of {url}: {e}")))?
        {
            read += chunk.len();
            if let Some(geometry) = scanner.push(&chunk) {
                // Dropping the body abandons the rest of the download
                trace!(url = %url, read, "Found geometry");
                return Ok(geometry);
            }
        }

        Err(FetchError::Decode(format!(
            "No well-known-text geometry found in {url} ({read} bytes)"
        ))
        .into())
    }
}

fn map_get_error(url: &str, error: SdkError<GetObjectError>) -> FetchError {
    match error.as_service_error() {
        Some(GetObjectError::NoSuchKey(_)) => FetchError::NotFound(url.to_string()),
        _ => FetchError::Io(format!("Failed to download {url}: {error}")),
    }
}

/// Split an `s3://bucket/key` URL into bucket and key.
pub fn parse_s3_url(url: &str) -> Result<(&str, &str)> {
    let rest = url
        .strip_prefix("s3://")
        .ok_or_else(|| FetchError::InvalidUrl(format!("Not an S3 URL: {url}")))?;

    match rest.split_once('/') {
        Some((bucket, key)) if !bucket.is_empty() && !key.is_empty() => Ok((bucket, key)),
        _ => Err(FetchError::InvalidUrl(format!("Missing bucket or key in S3 URL: {url}")).into()),
    }
}

/// Bytes carried over from one chunk to the next, so a geometry that
/// straddles a chunk boundary is still found. Bounding polygons are far
/// shorter than this.
pub const SCAN_OVERLAP: usize = 64 * 1024;

/// Incremental [`extract_wkt`] over a body that arrives in chunks.
///
/// Memory use is bounded by one chunk plus [`SCAN_OVERLAP`].
#[derive(Debug, Default)]
pub struct WktScanner {
    window: Vec<u8>,
}

impl WktScanner {
    /// Create an empty scanner.
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed the next chunk, returning the first geometry seen so far.
    pub fn push(&mut self, chunk: &[u8]) -> Option<Geometry> {
        self.window.extend_from_slice(chunk);

        if let Some(geometry) = extract_wkt(&self.window) {
            return Some(geometry);
        }

        if self.window.len() > SCAN_OVERLAP {
            let cut = self.window.len() - SCAN_OVERLAP;
            self.window.drain(..cut);
        }
        None
    }
}

/// Find the first decodable WKT geometry embedded in `bytes`.
pub fn extract_wkt(bytes: &[u8]) -> Option<Geometry> {
    let mut from = 0;

    while let Some((start, keyword)) = next_keyword(bytes, from) {
        if let Some(text) = wkt_span(&bytes[start..]) {
            if let Ok(geometry) = Geometry::from_wkt(text) {
                return Some(geometry);
            }
        }
        from = start + keyword.len();
    }

    None
}

/// Position of the earliest WKT keyword at or after `from`.
fn next_keyword(bytes: &[u8], from: usize) -> Option<(usize, &'static str)> {
    let haystack = bytes.get(from..)?;

    (0..haystack.len()).find_map(|i| {
        WKT_KEYWORDS
            .iter()
            .find(|kw| haystack[i..].starts_with(kw.as_bytes()))
            .map(|kw| (from + i, *kw))
    })
}

/// The WKT text starting at the beginning of `bytes`, up to the closing
/// parenthesis that balances the first opening one.
fn wkt_span(bytes: &[u8]) -> Option<&str> {
    let mut depth = 0usize;

    for (i, &b) in bytes.iter().enumerate() {
        match b {
            b'(' => depth += 1,
            b')' => {
                depth = depth.checked_sub(1)?;
                if depth == 0 {
                    return std::str::from_utf8(&bytes[..=i]).ok();
                }
            }
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b' ' | b'.' | b',' | b'-' | b'+' => {}
            _ => return None,
        }
    }

    None
}

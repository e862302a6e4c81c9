//! S3 key listing with pagination support.

use async_stream::try_stream;
use aws_sdk_s3::Client;
use aws_sdk_s3::types::Object;
use chrono::DateTime;
use cv_error::{CvError, ListingError};
use futures::StreamExt;
use futures::stream::BoxStream;
use tracing::{debug, trace};

use crate::record::{ObjectKey, join_path};
use crate::remote::KeyLister;

/// Lists keys of one bucket through `ListObjectsV2`.
///
/// Each partition is listed under `{prefix}/{burst_id}/`. Pages are
/// requested one at a time, following continuation tokens until the
/// service stops returning one.
#[derive(Clone)]
pub struct S3KeyLister {
    client: Client,
    bucket: String,
    suffix: String,
}

impl S3KeyLister {
    /// Create a lister for `bucket`, keeping only keys ending in `suffix`.
    pub fn new(client: Client, bucket: impl Into<String>, suffix: impl Into<String>) -> Self {
        Self {
            client,
            bucket: bucket.into(),
            suffix: suffix.into(),
        }
    }

    /// The bucket being listed.
    pub fn bucket(&self) -> &str {
        &self.bucket
    }
}

impl KeyLister for S3KeyLister {
    fn list_keys<'a>(
        &'a self,
        prefix: &'a str,
        burst_id: &'a str,
    ) -> BoxStream<'a, cv_error::Result<ObjectKey>> {
        let list_prefix = format!("{}/", join_path(&[prefix, burst_id]));

        try_stream! {
            let mut continuation_token: Option<String> = None;
            let mut page = 0usize;

            loop {
                let mut req = self
                    .client
                    .list_objects_v2()
                    .bucket(&self.bucket)
                    .prefix(&list_prefix);

                if let Some(ref token) = continuation_token {
                    req = req.continuation_token(token);
                }

                let resp = req.send().await.map_err(|e| {
                    CvError::from(ListingError::Request(format!(
                        "S3 list objects failed for s3://{}/{}: {e}",
                        self.bucket, list_prefix
                    )))
                })?;

                page += 1;
                let objects = resp.contents.unwrap_or_default();
                trace!(prefix = %list_prefix, page, objects = objects.len(), "Listed page");

                let keys = order_page(
                    objects.into_iter().filter_map(to_object_key).collect(),
                    &self.suffix,
                );
                for key in keys {
                    yield key;
                }

                continuation_token = resp.next_continuation_token;
                if continuation_token.is_none() {
                    break;
                }
            }

            debug!(prefix = %list_prefix, pages = page, "Listing complete");
        }
        .boxed()
    }
}

/// Convert a listed object, skipping directory markers and empty keys.
fn to_object_key(obj: Object) -> Option<ObjectKey> {
    let key = obj.key.filter(|k| !k.is_empty() && !k.ends_with('/'))?;

    let last_modified = obj
        .last_modified
        .and_then(|t| DateTime::from_timestamp(t.secs(), t.subsec_nanos()));

    Some(ObjectKey { key, last_modified })
}

/// Keep keys ending in `suffix` and order them by last-modified time.
///
/// Keys without a timestamp sort first; ties keep listing order.
pub(crate) fn order_page(keys: Vec<ObjectKey>, suffix: &str) -> Vec<ObjectKey> {
    let mut keys: Vec<ObjectKey> = keys
        .into_iter()
        .filter(|k| k.key.ends_with(suffix))
        .collect();
    keys.sort_by_key(|k| k.last_modified);
    keys
}

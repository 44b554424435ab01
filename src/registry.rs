//! Per-render script queue.
//!
//! One registry instance is created at the start of a page render and dropped
//! at the end. It holds the deduplicated header/footer script entries in
//! first-seen order. The dedup key is a Sha256 over bucket tag + code text, so
//! the same snippet produced by any number of widgets prints exactly once.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::HashMap;

/// Named output location accumulating deduplicated entries for one render.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Bucket {
    Header,
    Footer,
}

impl Bucket {
    /// Parse a bucket name. Unknown names return `None`, so string-level
    /// callers silently no-op instead of inventing a bucket.
    pub fn parse(raw: &str) -> Option<Bucket> {
        match raw {
            "header" => Some(Bucket::Header),
            "footer" => Some(Bucket::Footer),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Bucket::Header => "header",
            Bucket::Footer => "footer",
        }
    }
}

/// One deduplicated script payload awaiting delivery.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScriptEntry {
    pub code: String,
    pub requires_jquery: bool,
}

#[derive(Debug, Default)]
struct BucketQueue {
    entries: Vec<ScriptEntry>,
    index: HashMap<String, usize>,
}

impl BucketQueue {
    fn enqueue(&mut self, key: String, code: &str, requires_jquery: bool) {
        match self.index.get(&key) {
            Some(&pos) => {
                // Duplicate: keep first-seen position, never downgrade the flag.
                self.entries[pos].requires_jquery |= requires_jquery;
            }
            None => {
                self.index.insert(key, self.entries.len());
                self.entries.push(ScriptEntry {
                    code: code.to_string(),
                    requires_jquery,
                });
            }
        }
    }
}

/// Deduplicating header/footer queue scoped to a single page render.
#[derive(Debug, Default)]
pub struct ScriptRegistry {
    header: BucketQueue,
    footer: BucketQueue,
}

impl ScriptRegistry {
    pub fn new() -> ScriptRegistry {
        ScriptRegistry::default()
    }

    /// Add a wrapped snippet to a bucket. Identical (bucket, code) pairs
    /// collapse to one entry; a duplicate arriving with `requires_jquery`
    /// set upgrades the stored entry.
    pub fn enqueue(&mut self, bucket: Bucket, code: &str, requires_jquery: bool) {
        let key = dedup_key(bucket, code);
        self.queue_mut(bucket).enqueue(key, code, requires_jquery);
    }

    /// Ordered entries for a bucket. Does not clear: each bucket is drained
    /// once per render, at its injection point.
    pub fn drain(&self, bucket: Bucket) -> &[ScriptEntry] {
        &self.queue(bucket).entries
    }

    /// Whether any entry in the bucket needs the jQuery library scheduled
    /// before the bucket's output runs.
    pub fn requires_jquery(&self, bucket: Bucket) -> bool {
        self.queue(bucket).entries.iter().any(|e| e.requires_jquery)
    }

    pub fn is_empty(&self, bucket: Bucket) -> bool {
        self.queue(bucket).entries.is_empty()
    }

    fn queue(&self, bucket: Bucket) -> &BucketQueue {
        match bucket {
            Bucket::Header => &self.header,
            Bucket::Footer => &self.footer,
        }
    }

    fn queue_mut(&mut self, bucket: Bucket) -> &mut BucketQueue {
        match bucket {
            Bucket::Header => &mut self.header,
            Bucket::Footer => &mut self.footer,
        }
    }
}

fn dedup_key(bucket: Bucket, code: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bucket.as_str().as_bytes());
    hasher.update(code.as_bytes());
    format!("{:x}", hasher.finalize())
}

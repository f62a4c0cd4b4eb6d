use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use chrono::Utc;
use pico_feed::{Feed, PublicKey, Signature};
use pico_repo::Repo;
use pico_store::{KvStore, Sublevel};
use serde::{Deserialize, Serialize};

use crate::error::{SiloError, SiloResult};
use crate::title::extract_title;

/// How far ahead of the local clock a site's `date` may sit before `put`
/// rejects it as coming from the future.
pub const CLOCK_SKEW_MS: i64 = 5_000;

/// Derived metadata for the most recently accepted version of a site.
///
/// Created on the first accepted `put`, overwritten on every later one,
/// never deleted (there is no unpublish).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SiteMeta {
    /// Embedded publication date, epoch milliseconds.
    pub date: i64,
    /// Best-effort `<title>` text, empty when absent.
    pub title: String,
    pub runlevel: u8,
    /// Size of the accepted block's body in bytes.
    pub size: usize,
}

/// [`SiteMeta`] joined with the current hit count.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct SiteStat {
    pub date: i64,
    pub title: String,
    pub runlevel: u8,
    pub size: usize,
    pub hits: u64,
}

/// One row of [`Silo::list`]: stat plus head identity.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SiteListing {
    pub key: PublicKey,
    pub date: i64,
    pub title: String,
    pub runlevel: u8,
    pub size: usize,
    pub hits: u64,
    pub signature: Signature,
}

/// Versioned site storage: single-live-version-per-key over the feed
/// repository, plus the metadata index and hit counter.
///
/// Writes for one key are serialized through a per-key mutex, so two
/// concurrent `put`s cannot interleave their staleness check with the
/// rollback/merge sequence.
pub struct Silo {
    repo: Repo,
    meta: Sublevel,
    hits: Sublevel,
    locks: Mutex<HashMap<PublicKey, Arc<Mutex<()>>>>,
}

impl Silo {
    /// Open a silo over `db`, claiming the `repo`, `metadata`, and `hits`
    /// namespaces.
    pub fn new(db: Arc<dyn KvStore>) -> Self {
        Self {
            repo: Repo::new(Sublevel::new(Arc::clone(&db), "repo")),
            meta: Sublevel::new(Arc::clone(&db), "metadata"),
            hits: Sublevel::new(db, "hits"),
            locks: Mutex::new(HashMap::new()),
        }
    }

    /// Accept or reject a new version of a site.
    ///
    /// Rejections come in two flavors: structural problems (unsupported
    /// format or runlevel, a date from the future) are errors, while a
    /// version no newer than the stored one is a plain `Ok(false)` with
    /// nothing mutated — the expected outcome for duplicate or out-of-order
    /// resubmission. Ties favor the stored version.
    ///
    /// On acceptance the previous version is evicted from the repository
    /// first, so at most one version survives per key. If the merge then
    /// reports no change, the evicted feed is restored before returning
    /// `Ok(false)`, closing the window where a key would otherwise lose its
    /// valid version.
    pub fn put(&self, feed: &Feed) -> SiloResult<bool> {
        let site = pico_wire::unpack(feed)?;
        if site.format.runlevel() != 0 {
            return Err(SiloError::UnsupportedRunlevel(site.format.runlevel()));
        }
        let now = Utc::now().timestamp_millis();
        if site.date > now + CLOCK_SKEW_MS {
            return Err(SiloError::SiteFromFuture {
                date: site.date,
                now,
            });
        }

        let cell = self.lock_cell(&site.key);
        let _guard = cell.lock().expect("lock poisoned");

        if let Some(meta) = self.read_meta(&site.key)? {
            if site.date <= meta.date {
                return Ok(false);
            }
        }

        // Purge the previous version before merging the new one.
        let evicted = self.repo.rollback(&site.key)?;
        if !self.repo.merge(feed)? {
            if let Some(old) = evicted {
                self.repo.merge(&old)?;
            }
            return Ok(false);
        }
        if let Some(old) = &evicted {
            let old_sig = old.last().expect("stored feeds are never empty").signature;
            let new_sig = feed.last().expect("unpacked above").signature;
            tracing::info!(
                key = %site.key.short_id(),
                from = %old_sig.short_id(),
                to = %new_sig.short_id(),
                "new version",
            );
        }

        let meta = SiteMeta {
            date: site.date,
            title: extract_title(&site.html),
            runlevel: 0,
            size: feed.last().expect("unpacked above").size(),
        };
        self.write_meta(&site.key, &meta)?;
        Ok(true)
    }

    /// Fetch the current feed for `key`, counting the visit.
    ///
    /// The hit counter is bumped whether or not a site exists; `stat` only
    /// ever reports counters for known keys.
    pub fn get(&self, key: &PublicKey) -> SiloResult<Option<Feed>> {
        let hits = self.read_hits(key)?;
        self.hits
            .put(key.as_bytes(), hits.saturating_add(1).to_string().as_bytes())?;
        Ok(self.repo.load_head(key)?)
    }

    /// Metadata plus hit count for `key`, without counting a visit.
    pub fn stat(&self, key: &PublicKey) -> SiloResult<Option<SiteStat>> {
        let Some(meta) = self.read_meta(key)? else {
            return Ok(None);
        };
        let hits = self.read_hits(key)?;
        Ok(Some(SiteStat {
            date: meta.date,
            title: meta.title,
            runlevel: meta.runlevel,
            size: meta.size,
            hits,
        }))
    }

    /// Enumerate every stored site. Order follows the repository's head
    /// enumeration and is not part of the contract.
    pub fn list(&self) -> SiloResult<Vec<SiteListing>> {
        let mut out = Vec::new();
        for head in self.repo.list_heads()? {
            let Some(stat) = self.stat(&head.key)? else {
                // A head without index metadata can only appear if a crash
                // landed between merge and index write; skip it.
                continue;
            };
            out.push(SiteListing {
                key: head.key,
                date: stat.date,
                title: stat.title,
                runlevel: stat.runlevel,
                size: stat.size,
                hits: stat.hits,
                signature: head.signature,
            });
        }
        Ok(out)
    }

    fn lock_cell(&self, key: &PublicKey) -> Arc<Mutex<()>> {
        let mut locks = self.locks.lock().expect("lock poisoned");
        Arc::clone(locks.entry(*key).or_default())
    }

    fn read_meta(&self, key: &PublicKey) -> SiloResult<Option<SiteMeta>> {
        match self.meta.get(key.as_bytes())? {
            Some(bytes) => serde_json::from_slice(&bytes)
                .map(Some)
                .map_err(|e| SiloError::CorruptIndex(e.to_string())),
            None => Ok(None),
        }
    }

    fn write_meta(&self, key: &PublicKey, meta: &SiteMeta) -> SiloResult<()> {
        let bytes =
            serde_json::to_vec(meta).map_err(|e| SiloError::CorruptIndex(e.to_string()))?;
        Ok(self.meta.put(key.as_bytes(), &bytes)?)
    }

    fn read_hits(&self, key: &PublicKey) -> SiloResult<u64> {
        match self.hits.get(key.as_bytes())? {
            Some(bytes) => std::str::from_utf8(&bytes)
                .ok()
                .and_then(|s| s.parse().ok())
                .ok_or_else(|| SiloError::CorruptIndex("hit counter".to_string())),
            None => Ok(0),
        }
    }
}

impl std::fmt::Debug for Silo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Silo").finish_non_exhaustive()
    }
}

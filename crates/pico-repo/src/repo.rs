use pico_feed::{Feed, PublicKey, Signature};
use pico_store::Sublevel;

use crate::error::RepoResult;

/// The latest known block identity for one signer key.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Head {
    pub key: PublicKey,
    /// Signature of the stored head's last block.
    pub signature: Signature,
}

/// Per-signer feed storage over a [`Sublevel`].
///
/// One encoded feed per public key. The repository itself keeps whatever
/// chain it is handed; limiting a key to a single live version is the
/// silo's policy, enforced by rolling back before merging.
#[derive(Clone, Debug)]
pub struct Repo {
    feeds: Sublevel,
}

impl Repo {
    pub fn new(feeds: Sublevel) -> Self {
        Self { feeds }
    }

    /// Append-or-reject: merge `feed` into the stored state for its signer.
    ///
    /// Returns `Ok(true)` only when stored state changed: either no head
    /// was stored yet and the feed becomes the head, or the incoming feed
    /// is a superset of the stored chain and the new blocks are appended.
    ///
    /// Everything else (empty feed, identical head, diverged chain, failed
    /// verification) is `Ok(false)` with no mutation.
    pub fn merge(&self, feed: &Feed) -> RepoResult<bool> {
        let Some(last) = feed.last() else {
            return Ok(false);
        };
        if feed.verify().is_err() {
            return Ok(false);
        }

        let key = last.key;
        let Some(current) = self.load_head(&key)? else {
            self.feeds.put(key.as_bytes(), &feed.encode())?;
            return Ok(true);
        };

        let current_sig = current.last().expect("stored feeds are never empty").signature;
        let Some(at) = feed.blocks().iter().position(|b| b.signature == current_sig) else {
            tracing::debug!(key = %key.short_id(), "rejecting diverged feed");
            return Ok(false);
        };
        // Incoming feed carries the stored head; anything after it is new.
        if at == feed.len() - 1 {
            return Ok(false);
        }
        let mut merged = current;
        if merged.extend(&feed.blocks()[at + 1..]).is_err() {
            return Ok(false);
        }
        self.feeds.put(key.as_bytes(), &merged.encode())?;
        Ok(true)
    }

    /// Discard all stored blocks for `key`, returning what was evicted.
    pub fn rollback(&self, key: &PublicKey) -> RepoResult<Option<Feed>> {
        let evicted = self.load_head(key)?;
        if evicted.is_some() {
            self.feeds.delete(key.as_bytes())?;
        }
        Ok(evicted)
    }

    /// The stored feed for `key`, if any.
    pub fn load_head(&self, key: &PublicKey) -> RepoResult<Option<Feed>> {
        match self.feeds.get(key.as_bytes())? {
            Some(bytes) => Ok(Some(Feed::decode(&bytes)?)),
            None => Ok(None),
        }
    }

    /// Enumerate all stored heads. Order is the store's key order; callers
    /// must not rely on it.
    pub fn list_heads(&self) -> RepoResult<Vec<Head>> {
        let mut heads = Vec::new();
        for (_, bytes) in self.feeds.entries()? {
            let feed = Feed::decode(&bytes)?;
            let last = feed.last().expect("stored feeds are never empty");
            heads.push(Head {
                key: last.key,
                signature: last.signature,
            });
        }
        Ok(heads)
    }
}

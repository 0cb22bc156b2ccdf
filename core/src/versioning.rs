//! Latest-version selection across re-crawled entities.
//!
//! Within a group the highest active version wins. Equal versions fall back to
//! the most recent timestamp, then to the smallest id. Disabled entities
//! (version 0) never win but are not dropped from the input.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet};
use time::OffsetDateTime;

use crate::error::{NlpError, Result};
use crate::post::{recency_order, Post, Version};

pub trait Versioned {
    /// Identity shared by every version of the same logical entity.
    type Key: Ord + Clone;

    /// `None` keeps the entity out of every group.
    fn group_key(&self) -> Option<Self::Key>;
    fn id(&self) -> &str;
    fn version(&self) -> Version;
    fn timestamp(&self) -> OffsetDateTime;
}

impl Versioned for Post {
    type Key = String;

    fn group_key(&self) -> Option<String> { self.short_link.clone() }
    fn id(&self) -> &str { &self.id }
    fn version(&self) -> Version { self.version }
    fn timestamp(&self) -> OffsetDateTime { self.publish_time }
}

/// Persisted spider configuration; one logical spider per `name`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpiderConfig {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub version: Version,
    #[serde(with = "time::serde::rfc3339", default = "epoch")]
    pub updated_at: OffsetDateTime,
    /// Crawl rules, opaque to this crate.
    #[serde(flatten)]
    pub settings: serde_json::Map<String, serde_json::Value>,
}

fn epoch() -> OffsetDateTime { OffsetDateTime::UNIX_EPOCH }

impl Versioned for SpiderConfig {
    type Key = String;

    fn group_key(&self) -> Option<String> { Some(self.name.clone()) }
    fn id(&self) -> &str { &self.id }
    fn version(&self) -> Version { self.version }
    fn timestamp(&self) -> OffsetDateTime { self.updated_at }
}

#[derive(Debug)]
pub struct Resolution<'a, K, T> {
    latest: BTreeMap<K, &'a T>,
    disabled: BTreeSet<K>,
}

impl<'a, K: Ord, T> Resolution<'a, K, T> {
    pub fn get(&self, key: &K) -> Option<&'a T> {
        self.latest.get(key).copied()
    }

    /// Groups whose every member is disabled.
    pub fn disabled_keys(&self) -> impl Iterator<Item = &K> {
        self.disabled.iter()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&K, &'a T)> + '_ {
        self.latest.iter().map(|(k, v)| (k, *v))
    }

    pub fn len(&self) -> usize { self.latest.len() }
    pub fn is_empty(&self) -> bool { self.latest.is_empty() }

    pub fn into_latest(self) -> BTreeMap<K, &'a T> {
        self.latest
    }
}

/// `Less` when `a` should be preferred over `b`.
fn preference<T: Versioned>(a: &T, b: &T) -> Ordering {
    b.version()
        .active()
        .cmp(&a.version().active())
        .then_with(|| recency_order((a.timestamp(), a.id()), (b.timestamp(), b.id())))
}

/// Picks the latest active entity per key. Items for which `key` returns
/// `None` are left out of every group.
pub fn resolve_latest<'a, T, K, F>(items: &'a [T], key: F) -> Result<Resolution<'a, K, T>>
where
    T: Versioned,
    K: Ord,
    F: Fn(&T) -> Option<K>,
{
    let mut latest: BTreeMap<K, &'a T> = BTreeMap::new();
    let mut disabled: BTreeSet<K> = BTreeSet::new();
    let mut grouped = false;

    for item in items {
        let Some(k) = key(item) else { continue };
        grouped = true;
        if !item.version().is_active() {
            disabled.insert(k);
            continue;
        }
        match latest.get_mut(&k) {
            Some(current) => {
                if preference(item, *current) == Ordering::Less {
                    *current = item;
                }
            }
            None => {
                latest.insert(k, item);
            }
        }
    }

    if !items.is_empty() && !grouped {
        return Err(NlpError::EmptyGroup { items: items.len() });
    }
    disabled.retain(|k| !latest.contains_key(k));

    tracing::debug!(items = items.len(), groups = latest.len(), disabled = disabled.len(), "resolved latest versions");
    Ok(Resolution { latest, disabled })
}

/// `resolve_latest` grouped by each entity's own `group_key`.
pub fn resolve_by_group_key<T: Versioned>(items: &[T]) -> Result<Resolution<'_, T::Key, T>> {
    resolve_latest(items, T::group_key)
}

/// Latest version of every post sharing a short link.
pub fn latest_posts(posts: &[Post]) -> Result<Resolution<'_, String, Post>> {
    resolve_by_group_key(posts)
}

/// Enabled spider configurations, latest version per spider name, sorted by name.
pub fn latest_spiders(configs: &[SpiderConfig]) -> Result<Vec<&SpiderConfig>> {
    let resolution = resolve_by_group_key(configs)?;
    Ok(resolution.into_latest().into_values().collect())
}

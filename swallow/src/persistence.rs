/*
 * Copyright (c) 2026. Swallow Contributors
 *
 * Licensed under either of
 *   * Apache License, Version 2.0 (the "License");
 *     you may not use this file except in compliance with the License.
 *     You may obtain a copy of the License at http://www.apache.org/licenses/LICENSE-2.0
 *   * MIT license: http://opensource.org/licenses/MIT
 *
 * Unless required by applicable law or agreed to in writing, software
 * distributed under the License is distributed on an "AS IS" BASIS,
 * WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
 * See the applicable License for the specific language governing permissions and
 * limitations under that License.
 */

//! Storage used to remember which entries were already handled.

use async_trait::async_trait;
use dashmap::DashMap;

use crate::anime::AnimeEntry;

/// Key-value storage contract for processed items. Async so a disk- or
/// network-backed implementation can slot in without touching the filters.
#[async_trait]
pub trait Dao<T, K>: Send + Sync {
    async fn store(&self, item: T) -> anyhow::Result<()>;
    async fn get(&self, key: &K) -> anyhow::Result<Option<T>>;
    async fn delete(&self, key: &K) -> anyhow::Result<bool>;
    async fn contains(&self, key: &K) -> anyhow::Result<bool>;
}

/// Items that know their own storage key.
pub trait Keyed {
    fn key(&self) -> &str;
}

impl Keyed for AnimeEntry {
    fn key(&self) -> &str {
        &self.guid
    }
}

/// In-memory [`Dao`] on a concurrent map. Dedup only survives the process,
/// which suits runs that start from a fresh feed window.
#[derive(Default)]
pub struct MemoryDao<T> {
    entries: DashMap<String, T>,
}

impl<T> MemoryDao<T> {
    pub fn new() -> Self {
        Self {
            entries: DashMap::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[async_trait]
impl<T> Dao<T, String> for MemoryDao<T>
where
    T: Keyed + Clone + Send + Sync,
{
    async fn store(&self, item: T) -> anyhow::Result<()> {
        self.entries.insert(item.key().to_string(), item);
        Ok(())
    }

    async fn get(&self, key: &String) -> anyhow::Result<Option<T>> {
        Ok(self.entries.get(key).map(|entry| entry.value().clone()))
    }

    async fn delete(&self, key: &String) -> anyhow::Result<bool> {
        Ok(self.entries.remove(key).is_some())
    }

    async fn contains(&self, key: &String) -> anyhow::Result<bool> {
        Ok(self.entries.contains_key(key))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(guid: &str) -> AnimeEntry {
        AnimeEntry {
            original_input: "[G] S - 01 [720p].mkv".to_string(),
            group: "G".to_string(),
            series: "S".to_string(),
            episode: Some(1),
            resolution: Some("720p".to_string()),
            extension: Some("mkv".to_string()),
            guid: guid.to_string(),
            torrent_url: "https://example.test/t".to_string(),
            source: "feed".to_string(),
        }
    }

    #[tokio::test]
    async fn store_get_contains_delete_round() -> anyhow::Result<()> {
        let dao = MemoryDao::new();
        let key = "guid-1".to_string();

        assert!(!dao.contains(&key).await?);
        assert!(dao.get(&key).await?.is_none());

        dao.store(entry("guid-1")).await?;
        assert!(dao.contains(&key).await?);
        assert_eq!(dao.get(&key).await?.unwrap().guid, "guid-1");
        assert_eq!(dao.len(), 1);

        assert!(dao.delete(&key).await?);
        assert!(!dao.delete(&key).await?);
        assert!(dao.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn storing_the_same_key_replaces() -> anyhow::Result<()> {
        let dao = MemoryDao::new();
        dao.store(entry("guid-1")).await?;
        let mut updated = entry("guid-1");
        updated.series = "Renamed".to_string();
        dao.store(updated).await?;

        assert_eq!(dao.len(), 1);
        let stored = dao.get(&"guid-1".to_string()).await?.unwrap();
        assert_eq!(stored.series, "Renamed");
        Ok(())
    }
}

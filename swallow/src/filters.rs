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

//! The two filter stages between feed source and download sink.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, info, warn};

use swallow_core::prelude::{Digest, Outputs};

use crate::anime::{extract_entry, AnimeEntry};
use crate::criteria::Criterion;
use crate::feed::RssFeed;
use crate::persistence::Dao;

/// Fans a fetched feed out into one [`AnimeEntry`] per parsable item.
/// Items the filename parser rejects are logged and dropped; a community
/// announcement in a release feed is routine, not an error.
pub struct DetectionDigest;

#[async_trait]
impl Digest<RssFeed, AnimeEntry> for DetectionDigest {
    async fn digest(&mut self, feed: RssFeed, outputs: &Outputs<AnimeEntry>) -> anyhow::Result<()> {
        for item in &feed.channel.items {
            match extract_entry(item, &feed.source) {
                Ok(entry) => {
                    debug!(series = %entry.series, episode = ?entry.episode, "entry detected");
                    outputs.broadcast(entry);
                }
                Err(error) => {
                    warn!(%error, title = %item.title, "skipping feed item");
                }
            }
        }
        Ok(())
    }
}

/// Gates detected entries: drops anything already stored, then forwards the
/// entry when the criteria agree. `match_all` picks conjunction over
/// disjunction; an empty criteria list accepts everything.
pub struct ProcessingDigest {
    dao: Arc<dyn Dao<AnimeEntry, String>>,
    criteria: Vec<Box<dyn Criterion<AnimeEntry>>>,
    match_all: bool,
}

impl ProcessingDigest {
    pub fn new(
        dao: Arc<dyn Dao<AnimeEntry, String>>,
        criteria: Vec<Box<dyn Criterion<AnimeEntry>>>,
        match_all: bool,
    ) -> Self {
        Self {
            dao,
            criteria,
            match_all,
        }
    }

    fn accepts(&self, entry: &AnimeEntry) -> bool {
        if self.criteria.is_empty() {
            return true;
        }
        if self.match_all {
            self.criteria.iter().all(|c| c.is_match(entry))
        } else {
            self.criteria.iter().any(|c| c.is_match(entry))
        }
    }
}

#[async_trait]
impl Digest<AnimeEntry, AnimeEntry> for ProcessingDigest {
    async fn digest(
        &mut self,
        entry: AnimeEntry,
        outputs: &Outputs<AnimeEntry>,
    ) -> anyhow::Result<()> {
        if self.dao.contains(&entry.guid).await? {
            debug!(guid = %entry.guid, "entry already handled");
            return Ok(());
        }
        if !self.accepts(&entry) {
            debug!(series = %entry.series, group = %entry.group, "entry rejected by criteria");
            return Ok(());
        }
        // Stored before forwarding, so a re-fetch of the same feed window
        // cannot queue the same download twice.
        self.dao.store(entry.clone()).await?;
        info!(series = %entry.series, episode = ?entry.episode, "entry accepted");
        outputs.broadcast(entry);
        Ok(())
    }
}

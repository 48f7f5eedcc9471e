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

//! The terminal side effect: fetch the torrent file and drop it in the
//! destination folder, where a watching torrent client picks it up.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tracing::info;

use swallow_core::prelude::Consume;

use crate::anime::AnimeEntry;

pub struct TorrentDownloader {
    client: reqwest::Client,
    destination: PathBuf,
}

impl TorrentDownloader {
    pub fn new(destination: impl Into<PathBuf>) -> Self {
        Self {
            client: reqwest::Client::new(),
            destination: destination.into(),
        }
    }

    fn target_path(&self, entry: &AnimeEntry) -> PathBuf {
        let mut file_name = sanitize_file_name(&entry.original_input);
        if !file_name.to_ascii_lowercase().ends_with(".torrent") {
            file_name.push_str(".torrent");
        }
        self.destination.join(file_name)
    }
}

/// Keeps the release title readable while making it safe as a single path
/// component on both Unix and Windows.
fn sanitize_file_name(title: &str) -> String {
    title
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            _ => c,
        })
        .collect()
}

#[async_trait]
impl Consume<AnimeEntry> for TorrentDownloader {
    async fn consume(&mut self, entry: AnimeEntry) -> anyhow::Result<()> {
        let bytes = self
            .client
            .get(&entry.torrent_url)
            .send()
            .await?
            .error_for_status()?
            .bytes()
            .await?;

        let path = self.target_path(&entry);
        write_torrent(&path, &bytes).await?;
        info!(path = %path.display(), series = %entry.series, "torrent saved");
        Ok(())
    }
}

/// Writes already-fetched bytes; split out so the file-system half is
/// testable without a network.
pub async fn write_torrent(path: &Path, bytes: &[u8]) -> anyhow::Result<()> {
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }
    tokio::fs::write(path, bytes).await?;
    Ok(())
}

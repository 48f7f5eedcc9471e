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

//! TOML configuration: which feeds to watch, which releases to keep, and
//! where everything lands.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Context;
use serde::Deserialize;

use crate::anime::AnimeEntry;
use crate::criteria::{Criterion, EntryCriterion, NameMatcher, QualityCriterion};

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Folder the fetched `.torrent` files are written into.
    pub destination: PathBuf,
    /// When set, a daily-rolling log file is written here besides stdout.
    pub log_dir: Option<PathBuf>,
    /// Conjunction instead of disjunction across the entry criteria.
    #[serde(default)]
    pub match_all: bool,
    pub feeds: Vec<FeedConfig>,
    #[serde(default)]
    pub entries: Vec<EntryConfig>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FeedConfig {
    pub url: String,
    #[serde(default = "default_interval_secs")]
    pub interval_secs: u64,
    #[serde(default = "default_jitter_secs")]
    pub jitter_secs: u64,
}

fn default_interval_secs() -> u64 {
    15 * 60
}

fn default_jitter_secs() -> u64 {
    5 * 60
}

impl FeedConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }

    pub fn jitter(&self) -> Duration {
        Duration::from_secs(self.jitter_secs)
    }
}

/// One watched release: any combination of fansub group, series name, and
/// resolution. At least one field must be present.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EntryConfig {
    pub group: Option<String>,
    pub series: Option<String>,
    pub quality: Option<String>,
    /// Jaro-Winkler matching for group and series instead of exact.
    #[serde(default)]
    pub fuzzy: bool,
}

impl EntryConfig {
    /// The criterion this entry describes: name matching combined with an
    /// optional quality gate.
    pub fn criterion(&self) -> anyhow::Result<Box<dyn Criterion<AnimeEntry>>> {
        if self.group.is_none() && self.series.is_none() && self.quality.is_none() {
            anyhow::bail!("watch entry must set at least one of group, series, quality");
        }
        let matcher = |text: &String| {
            if self.fuzzy {
                NameMatcher::fuzzy(text)
            } else {
                NameMatcher::exact(text)
            }
        };
        let names = EntryCriterion::new(
            self.group.as_ref().map(matcher),
            self.series.as_ref().map(matcher),
        );
        Ok(match &self.quality {
            Some(quality) => {
                let quality = QualityCriterion::new(quality);
                Box::new(crate::criteria::All::new(vec![
                    Box::new(names),
                    Box::new(quality),
                ]))
            }
            None => Box::new(names),
        })
    }
}

impl Config {
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        let config: Config = toml::from_str(&text)
            .with_context(|| format!("parsing config {}", path.display()))?;
        if config.feeds.is_empty() {
            anyhow::bail!("config lists no feeds");
        }
        Ok(config)
    }

    /// Criteria for every watch entry, surfacing the first invalid one.
    pub fn criteria(&self) -> anyhow::Result<Vec<Box<dyn Criterion<AnimeEntry>>>> {
        self.entries.iter().map(EntryConfig::criterion).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
destination = "/var/lib/swallow/torrents"
match_all = false

[[feeds]]
url = "https://example.test/rss"
interval_secs = 600

[[feeds]]
url = "https://other.test/rss"

[[entries]]
group = "Subs"
series = "My Show"
quality = "720p"
fuzzy = true

[[entries]]
series = "Other Show"
"#;

    #[test]
    fn parses_the_sample_document() {
        let config: Config = toml::from_str(SAMPLE).unwrap();
        assert_eq!(config.feeds.len(), 2);
        assert_eq!(config.feeds[0].interval(), Duration::from_secs(600));
        // Defaults fill what the document leaves out.
        assert_eq!(config.feeds[1].interval(), Duration::from_secs(900));
        assert_eq!(config.feeds[1].jitter(), Duration::from_secs(300));
        assert_eq!(config.entries.len(), 2);
        assert!(config.entries[0].fuzzy);
        assert!(config.criteria().unwrap().len() == 2);
    }

    #[test]
    fn empty_watch_entry_is_rejected() {
        let entry = EntryConfig {
            group: None,
            series: None,
            quality: None,
            fuzzy: false,
        };
        assert!(entry.criterion().is_err());
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let result: Result<Config, _> = toml::from_str("destinaton = \"/tmp\"\nfeeds = []");
        assert!(result.is_err());
    }

    #[test]
    fn entry_criterion_applies_the_quality_gate() {
        let entry = EntryConfig {
            group: None,
            series: Some("My Show".to_string()),
            quality: Some("720p".to_string()),
            fuzzy: false,
        };
        let criterion = entry.criterion().unwrap();

        let candidate = AnimeEntry {
            original_input: "[G] My Show - 01 [720p].mkv".to_string(),
            group: "G".to_string(),
            series: "My Show".to_string(),
            episode: Some(1),
            resolution: Some("720p".to_string()),
            extension: Some("mkv".to_string()),
            guid: "guid".to_string(),
            torrent_url: "https://example.test/t".to_string(),
            source: "feed".to_string(),
        };
        assert!(criterion.is_match(&candidate));

        let mut wrong_quality = candidate.clone();
        wrong_quality.resolution = Some("1080p".to_string());
        assert!(!criterion.is_match(&wrong_quality));
    }
}

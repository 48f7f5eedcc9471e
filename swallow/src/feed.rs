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

//! RSS feed model, parser, and the polling fetcher.

use async_trait::async_trait;
use quick_xml::events::Event;
use quick_xml::reader::Reader;
use tracing::{debug, trace};

use swallow_core::prelude::Fetch;

#[derive(Debug, thiserror::Error)]
pub enum FeedError {
    #[error("XML parse error: {0}")]
    Xml(#[from] quick_xml::Error),
    #[error("document has no <channel> element")]
    MissingChannel,
}

/// One `<item>` of an RSS channel. `guid` falls back to the link when the
/// feed does not carry one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RssItem {
    pub title: String,
    pub link: String,
    pub guid: String,
    pub pub_date: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RssChannel {
    pub title: String,
    pub link: String,
    pub description: String,
    pub items: Vec<RssItem>,
}

/// A parsed channel tagged with the URL it was pulled from, so downstream
/// entries can say where they came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RssFeed {
    pub source: String,
    pub channel: RssChannel,
}

#[derive(Default)]
struct ItemBuilder {
    title: Option<String>,
    link: Option<String>,
    guid: Option<String>,
    pub_date: Option<String>,
}

impl ItemBuilder {
    fn build(self) -> Option<RssItem> {
        let link = self.link?;
        Some(RssItem {
            title: self.title?,
            guid: self.guid.unwrap_or_else(|| link.clone()),
            link,
            pub_date: self.pub_date,
        })
    }
}

/// Parses an RSS document. Items missing a title or link are skipped;
/// a document the XML reader cannot get through is an error.
pub fn parse_feed(xml: &[u8]) -> Result<RssChannel, FeedError> {
    let mut reader = Reader::from_reader(xml);
    reader.config_mut().trim_text(true);

    let mut channel: Option<RssChannel> = None;
    let mut current_item: Option<ItemBuilder> = None;
    let mut current_element = String::new();
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) => {
                let name = String::from_utf8_lossy(e.name().as_ref()).to_string();
                match name.as_str() {
                    "channel" => channel = Some(RssChannel::default()),
                    "item" => current_item = Some(ItemBuilder::default()),
                    _ => {}
                }
                current_element = name;
            }
            Ok(Event::End(e)) => {
                let name = e.name();
                let name = String::from_utf8_lossy(name.as_ref());
                if name == "item" {
                    if let (Some(builder), Some(ref mut channel)) =
                        (current_item.take(), channel.as_mut())
                    {
                        match builder.build() {
                            Some(item) => channel.items.push(item),
                            None => debug!("skipping feed item without title or link"),
                        }
                    }
                }
                current_element.clear();
            }
            Ok(Event::Text(e)) => {
                let text = e.unescape().unwrap_or_default().to_string();
                if text.is_empty() {
                    continue;
                }
                if let Some(ref mut item) = current_item {
                    match current_element.as_str() {
                        "title" => item.title = Some(text),
                        "link" => item.link = Some(text),
                        "guid" => item.guid = Some(text),
                        "pubDate" => item.pub_date = Some(text),
                        _ => {}
                    }
                } else if let Some(ref mut channel) = channel {
                    match current_element.as_str() {
                        "title" => channel.title = text,
                        "link" => channel.link = text,
                        "description" => channel.description = text,
                        _ => {}
                    }
                }
            }
            Ok(Event::Eof) => break,
            Err(error) => return Err(FeedError::Xml(error)),
            _ => {}
        }
        buf.clear();
    }

    channel.ok_or(FeedError::MissingChannel)
}

/// Pulls one feed URL; plugged into a `PollingSource` as its fetch cycle.
pub struct FeedFetcher {
    client: reqwest::Client,
    url: String,
}

impl FeedFetcher {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            url: url.into(),
        }
    }
}

#[async_trait]
impl Fetch<RssFeed> for FeedFetcher {
    async fn fetch(&mut self) -> anyhow::Result<RssFeed> {
        trace!(url = %self.url, "fetching feed");
        let body = self
            .client
            .get(&self.url)
            .send()
            .await?
            .error_for_status()?
            .bytes()
            .await?;
        let channel = parse_feed(&body)?;
        debug!(url = %self.url, items = channel.items.len(), "feed fetched");
        Ok(RssFeed {
            source: self.url.clone(),
            channel,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TWO_ITEM_FEED: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<rss version="2.0">
  <channel>
    <title>Example Releases</title>
    <link>https://example.test/</link>
    <description>Latest releases</description>
    <item>
      <title>[Subs] Show A - 01 [720p].mkv</title>
      <link>https://example.test/a-01.torrent</link>
      <guid>https://example.test/view/1</guid>
      <pubDate>Mon, 03 Feb 2025 10:00:00 -0000</pubDate>
    </item>
    <item>
      <title>[Subs] Show B - 12 [1080p].mkv</title>
      <link>https://example.test/b-12.torrent</link>
    </item>
  </channel>
</rss>"#;

    #[test]
    fn parses_a_two_item_document() {
        let channel = parse_feed(TWO_ITEM_FEED.as_bytes()).unwrap();
        assert_eq!(channel.title, "Example Releases");
        assert_eq!(channel.items.len(), 2);

        let first = &channel.items[0];
        assert_eq!(first.title, "[Subs] Show A - 01 [720p].mkv");
        assert_eq!(first.guid, "https://example.test/view/1");
        assert!(first.pub_date.is_some());

        // No explicit guid on the second item, so the link stands in.
        let second = &channel.items[1];
        assert_eq!(second.guid, second.link);
        assert!(second.pub_date.is_none());
    }

    #[test]
    fn skips_items_missing_required_fields() {
        let xml = r#"<rss><channel>
            <title>Feed</title>
            <item><title>No link here</title></item>
            <item>
              <title>[Subs] Show C - 03 [480p].avi</title>
              <link>https://example.test/c-03.torrent</link>
            </item>
        </channel></rss>"#;
        let channel = parse_feed(xml.as_bytes()).unwrap();
        assert_eq!(channel.items.len(), 1);
        assert_eq!(channel.items[0].link, "https://example.test/c-03.torrent");
    }

    #[test]
    fn document_without_channel_is_an_error() {
        let error = parse_feed(b"<rss></rss>").unwrap_err();
        assert!(matches!(error, FeedError::MissingChannel));
    }
}

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

//! Release entries and the fansub filename parser that produces them.

use crate::feed::RssItem;

#[derive(Debug, thiserror::Error)]
pub enum ExtractError {
    #[error("title does not look like a fansub release: {0:?}")]
    Unparsable(String),
}

/// One release detected in a feed, with the fields the match criteria care
/// about pulled out of the filename.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnimeEntry {
    /// The item title exactly as it appeared in the feed.
    pub original_input: String,
    pub group: String,
    pub series: String,
    pub episode: Option<u32>,
    pub resolution: Option<String>,
    pub extension: Option<String>,
    /// Dedup key.
    pub guid: String,
    pub torrent_url: String,
    /// URL of the feed the item came from.
    pub source: String,
}

/// Builds an [`AnimeEntry`] from a feed item, parsing titles of the shape
/// `[Group] Series - 12 [720p].mkv`. Version suffixes (`12v2`), extra
/// trailing tags, and parenthesized resolutions are tolerated.
pub fn extract_entry(item: &RssItem, source: &str) -> Result<AnimeEntry, ExtractError> {
    let parsed =
        parse_title(&item.title).ok_or_else(|| ExtractError::Unparsable(item.title.clone()))?;
    Ok(AnimeEntry {
        original_input: item.title.clone(),
        group: parsed.group,
        series: parsed.series,
        episode: parsed.episode,
        resolution: parsed.resolution,
        extension: parsed.extension,
        guid: item.guid.clone(),
        torrent_url: item.link.clone(),
        source: source.to_string(),
    })
}

struct ParsedTitle {
    group: String,
    series: String,
    episode: Option<u32>,
    resolution: Option<String>,
    extension: Option<String>,
}

const MEDIA_EXTENSIONS: &[&str] = &["mkv", "mp4", "avi", "ogm", "wmv", "ts"];

fn parse_title(title: &str) -> Option<ParsedTitle> {
    let after_open = title.trim().strip_prefix('[')?;
    let close = after_open.find(']')?;
    let group = after_open[..close].trim();
    if group.is_empty() {
        return None;
    }
    let mut rest = after_open[close + 1..].trim();

    let mut extension = None;
    if let Some(dot) = rest.rfind('.') {
        let candidate = rest[dot + 1..].to_ascii_lowercase();
        if MEDIA_EXTENSIONS.contains(&candidate.as_str()) {
            extension = Some(candidate);
            rest = rest[..dot].trim_end();
        }
    }

    // Peel trailing [720p]-style tags off the end; the first one that looks
    // like a resolution wins, everything else (CRC sums, codec notes) is
    // dropped.
    let mut resolution = None;
    loop {
        let Some((remainder, tag)) = split_trailing_tag(rest) else {
            break;
        };
        if resolution.is_none() && looks_like_resolution(tag) {
            resolution = Some(tag.to_ascii_lowercase());
        }
        rest = remainder.trim_end();
    }

    if rest.is_empty() {
        return None;
    }

    let mut series = rest;
    let mut episode = None;
    if let Some(dash) = rest.rfind(" - ") {
        if let Some(number) = parse_episode(rest[dash + 3..].trim()) {
            episode = Some(number);
            series = rest[..dash].trim_end();
        }
    }
    if series.is_empty() {
        return None;
    }

    Some(ParsedTitle {
        group: group.to_string(),
        series: series.to_string(),
        episode,
        resolution,
        extension,
    })
}

/// Splits `"Series [720p]"` into `("Series ", "720p")`, accepting either
/// bracket style.
fn split_trailing_tag(text: &str) -> Option<(&str, &str)> {
    let (open, close) = if text.ends_with(']') {
        ('[', ']')
    } else if text.ends_with(')') {
        ('(', ')')
    } else {
        return None;
    };
    let start = text.rfind(open)?;
    let tag = text[start + 1..text.len() - close.len_utf8()].trim();
    if tag.is_empty() {
        return None;
    }
    Some((&text[..start], tag))
}

/// `720p`, `1080P`, or a `1280x720` pair.
fn looks_like_resolution(tag: &str) -> bool {
    let lower = tag.to_ascii_lowercase();
    if let Some(height) = lower.strip_suffix('p') {
        return !height.is_empty() && height.bytes().all(|b| b.is_ascii_digit());
    }
    if let Some((width, height)) = lower.split_once('x') {
        return !width.is_empty()
            && !height.is_empty()
            && width.bytes().all(|b| b.is_ascii_digit())
            && height.bytes().all(|b| b.is_ascii_digit());
    }
    false
}

/// Leading digits of an episode token; tolerates `07v2` version markers.
fn parse_episode(token: &str) -> Option<u32> {
    let digits: String = token.chars().take_while(|c| c.is_ascii_digit()).collect();
    if digits.is_empty() {
        return None;
    }
    let trailer = &token[digits.len()..];
    if !trailer.is_empty() && !trailer.to_ascii_lowercase().starts_with('v') {
        return None;
    }
    digits.parse().ok()
}

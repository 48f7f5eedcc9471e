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

//! Match criteria deciding which detected entries are worth downloading.

use strsim::jaro_winkler;

use crate::anime::AnimeEntry;

/// How close a fuzzy comparison must come to count as a match.
const SMUDGE_FACTOR: f64 = 0.80;

/// A predicate over candidate values. Criteria are combined with [`All`],
/// [`Any`], and [`AllFail`] rather than subclassed.
pub trait Criterion<T>: Send + Sync {
    fn is_match(&self, candidate: &T) -> bool;
}

/// A criterion from a plain closure.
pub struct CriterionFn<F>(F);

impl<F> CriterionFn<F> {
    pub fn new(f: F) -> Self {
        Self(f)
    }
}

impl<T, F> Criterion<T> for CriterionFn<F>
where
    F: Fn(&T) -> bool + Send + Sync,
{
    fn is_match(&self, candidate: &T) -> bool {
        (self.0)(candidate)
    }
}

/// Matches when every inner criterion matches. Empty means match-all.
pub struct All<T>(Vec<Box<dyn Criterion<T>>>);

impl<T> All<T> {
    pub fn new(criteria: Vec<Box<dyn Criterion<T>>>) -> Self {
        Self(criteria)
    }
}

impl<T> Criterion<T> for All<T>
where
    T: Send + Sync,
{
    fn is_match(&self, candidate: &T) -> bool {
        self.0.iter().all(|criterion| criterion.is_match(candidate))
    }
}

/// Matches when at least one inner criterion matches.
pub struct Any<T>(Vec<Box<dyn Criterion<T>>>);

impl<T> Any<T> {
    pub fn new(criteria: Vec<Box<dyn Criterion<T>>>) -> Self {
        Self(criteria)
    }
}

impl<T> Criterion<T> for Any<T>
where
    T: Send + Sync,
{
    fn is_match(&self, candidate: &T) -> bool {
        self.0.iter().any(|criterion| criterion.is_match(candidate))
    }
}

/// Matches only when every inner criterion fails; a block-list combinator.
pub struct AllFail<T>(Vec<Box<dyn Criterion<T>>>);

impl<T> AllFail<T> {
    pub fn new(criteria: Vec<Box<dyn Criterion<T>>>) -> Self {
        Self(criteria)
    }
}

impl<T> Criterion<T> for AllFail<T>
where
    T: Send + Sync,
{
    fn is_match(&self, candidate: &T) -> bool {
        !self.0.iter().any(|criterion| criterion.is_match(candidate))
    }
}

/// Text comparison used for group and series names: exact after
/// normalization, or Jaro-Winkler similarity above [`SMUDGE_FACTOR`].
#[derive(Debug, Clone)]
pub struct NameMatcher {
    expected: String,
    fuzzy: bool,
}

impl NameMatcher {
    pub fn exact(expected: impl Into<String>) -> Self {
        Self {
            expected: normalize(&expected.into()),
            fuzzy: false,
        }
    }

    pub fn fuzzy(expected: impl Into<String>) -> Self {
        Self {
            expected: normalize(&expected.into()),
            fuzzy: true,
        }
    }

    pub fn matches(&self, actual: &str) -> bool {
        let actual = normalize(actual);
        if self.fuzzy {
            jaro_winkler(&self.expected, &actual) >= SMUDGE_FACTOR
        } else {
            self.expected == actual
        }
    }
}

/// Lowercases and strips punctuation so `"Show: Two"` and `"show two"`
/// compare equal before any fuzziness applies.
fn normalize(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut pending_space = false;
    for c in text.chars() {
        if c.is_alphanumeric() {
            if pending_space && !out.is_empty() {
                out.push(' ');
            }
            pending_space = false;
            out.extend(c.to_lowercase());
        } else {
            pending_space = true;
        }
    }
    out
}

/// Matches an entry against an optional group and an optional series name;
/// an absent field constrains nothing.
pub struct EntryCriterion {
    group: Option<NameMatcher>,
    series: Option<NameMatcher>,
}

impl EntryCriterion {
    pub fn new(group: Option<NameMatcher>, series: Option<NameMatcher>) -> Self {
        Self { group, series }
    }
}

impl Criterion<AnimeEntry> for EntryCriterion {
    fn is_match(&self, candidate: &AnimeEntry) -> bool {
        let group_ok = self
            .group
            .as_ref()
            .map_or(true, |matcher| matcher.matches(&candidate.group));
        let series_ok = self
            .series
            .as_ref()
            .map_or(true, |matcher| matcher.matches(&candidate.series));
        group_ok && series_ok
    }
}

/// Accepts entries whose parsed resolution equals the wanted one. An entry
/// without a parsed resolution never matches.
pub struct QualityCriterion {
    resolution: String,
}

impl QualityCriterion {
    pub fn new(resolution: impl Into<String>) -> Self {
        Self {
            resolution: resolution.into().to_ascii_lowercase(),
        }
    }
}

impl Criterion<AnimeEntry> for QualityCriterion {
    fn is_match(&self, candidate: &AnimeEntry) -> bool {
        candidate
            .resolution
            .as_deref()
            .is_some_and(|resolution| resolution.eq_ignore_ascii_case(&self.resolution))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(group: &str, series: &str, resolution: Option<&str>) -> AnimeEntry {
        AnimeEntry {
            original_input: format!("[{group}] {series} - 01"),
            group: group.to_string(),
            series: series.to_string(),
            episode: Some(1),
            resolution: resolution.map(str::to_string),
            extension: Some("mkv".to_string()),
            guid: "guid".to_string(),
            torrent_url: "https://example.test/t".to_string(),
            source: "feed".to_string(),
        }
    }

    #[test]
    fn exact_matching_ignores_case_and_punctuation() {
        let criterion = EntryCriterion::new(None, Some(NameMatcher::exact("Show: Two")));
        assert!(criterion.is_match(&entry("G", "show two", None)));
        assert!(!criterion.is_match(&entry("G", "show three", None)));
    }

    #[test]
    fn fuzzy_matching_accepts_drift_and_rejects_different_series() {
        let criterion = EntryCriterion::new(None, Some(NameMatcher::fuzzy("Attack of Titans")));
        assert!(criterion.is_match(&entry("G", "Attack of the Titans", None)));
        assert!(!criterion.is_match(&entry("G", "Cooking Weekly", None)));
    }

    #[test]
    fn group_and_series_must_both_hold() {
        let criterion = EntryCriterion::new(
            Some(NameMatcher::exact("Subs")),
            Some(NameMatcher::exact("My Show")),
        );
        assert!(criterion.is_match(&entry("Subs", "My Show", None)));
        assert!(!criterion.is_match(&entry("OtherSubs", "My Show", None)));
    }

    #[test]
    fn quality_requires_a_parsed_resolution() {
        let criterion = QualityCriterion::new("720p");
        assert!(criterion.is_match(&entry("G", "S", Some("720P"))));
        assert!(!criterion.is_match(&entry("G", "S", Some("1080p"))));
        assert!(!criterion.is_match(&entry("G", "S", None)));
    }

    #[test]
    fn combinators_compose() {
        let matches: Box<dyn Criterion<u32>> = Box::new(CriterionFn::new(|n: &u32| *n > 10));
        let fails: Box<dyn Criterion<u32>> = Box::new(CriterionFn::new(|n: &u32| *n % 2 == 0));
        assert!(All::new(vec![matches]).is_match(&12));
        assert!(Any::new(vec![fails]).is_match(&4));
        assert!(AllFail::<u32>::new(vec![Box::new(CriterionFn::new(|n: &u32| *n > 100))])
            .is_match(&4));
    }
}

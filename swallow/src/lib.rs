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

//! Feed-watching application built on the `swallow-core` runtime.
//!
//! The pipeline is one polling source per configured RSS feed, a detection
//! filter that turns feed items into [`anime::AnimeEntry`] values, a
//! processing filter that deduplicates and applies match criteria, and a
//! sink that downloads the accepted torrents.

#![forbid(unsafe_code)]

pub mod anime;
pub mod config;
pub mod criteria;
pub mod download;
pub mod feed;
pub mod filters;
pub mod persistence;

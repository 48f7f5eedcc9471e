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

use std::fmt;
use std::sync::Arc;

use crate::traits::{SourceControl, Stage};

/// An immutable snapshot of the components forming one processing graph.
///
/// The edges themselves are not recorded here; they were wired through
/// output streams before the topology was built. The runtime only needs the
/// component sets and their kinds to order lifecycle calls.
pub struct Topology {
    sources: Vec<Arc<dyn SourceControl>>,
    filters: Vec<Arc<dyn Stage>>,
    sinks: Vec<Arc<dyn Stage>>,
}

impl fmt::Debug for Topology {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Topology")
            .field("sources", &self.sources.len())
            .field("filters", &self.filters.len())
            .field("sinks", &self.sinks.len())
            .finish()
    }
}

impl Topology {
    pub fn builder() -> TopologyBuilder {
        TopologyBuilder::default()
    }

    pub fn sources(&self) -> &[Arc<dyn SourceControl>] {
        &self.sources
    }

    pub fn filters(&self) -> &[Arc<dyn Stage>] {
        &self.filters
    }

    pub fn sinks(&self) -> &[Arc<dyn Stage>] {
        &self.sinks
    }
}

/// Collects components before freezing them into a [`Topology`].
#[derive(Default)]
pub struct TopologyBuilder {
    sources: Vec<Arc<dyn SourceControl>>,
    filters: Vec<Arc<dyn Stage>>,
    sinks: Vec<Arc<dyn Stage>>,
}

impl TopologyBuilder {
    pub fn source(mut self, source: Arc<dyn SourceControl>) -> Self {
        self.sources.push(source);
        self
    }

    pub fn filter(mut self, filter: Arc<dyn Stage>) -> Self {
        self.filters.push(filter);
        self
    }

    pub fn sink(mut self, sink: Arc<dyn Stage>) -> Self {
        self.sinks.push(sink);
        self
    }

    pub fn build(self) -> Topology {
        Topology {
            sources: self.sources,
            filters: self.filters,
            sinks: self.sinks,
        }
    }
}

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

#![forbid(unsafe_code)]
//! Swallow Core Library
//!
//! This library provides the dataflow-processing runtime underneath the
//! Swallow crate: single-task actors with serialized mailboxes, port-based
//! output-stream wiring between producers and consumers, and a topology
//! runtime that orders startup and shutdown across sources, filters, and
//! sinks.

pub(crate) mod actor;
pub(crate) mod error;
pub(crate) mod filter;
pub(crate) mod runtime;
pub(crate) mod sink;
pub(crate) mod source;
pub(crate) mod stream;
pub(crate) mod topology;
/// Trait definitions shared by heterogeneous topology components.
pub(crate) mod traits;

/// Prelude module for convenient imports.
pub mod prelude {
    pub use async_trait::async_trait;
    pub use tokio_util::sync::CancellationToken;

    pub use crate::actor::{Actor, FnHandler, Handler, Mailbox, Reply};
    pub use crate::error::ActorError;
    pub use crate::filter::{Digest, DigestFn, Filter};
    pub use crate::runtime::{RuntimeState, TopologyRuntime};
    pub use crate::sink::{Consume, ConsumeFn, SinkActor};
    pub use crate::source::{Fetch, FetchFn, PollingSource, SourceState};
    pub use crate::stream::{MessageSink, OutputStream, Outputs, StreamMessage};
    pub use crate::topology::{Topology, TopologyBuilder};
    pub use crate::traits::{SourceControl, Stage};
}

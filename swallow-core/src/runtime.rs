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

use std::sync::atomic::{AtomicU8, Ordering};

use futures::future::join_all;
use tracing::{debug, info};

use crate::error::ActorError;
use crate::topology::Topology;

/// Lifecycle state of a [`TopologyRuntime`]. Monotonic except for the
/// `Started`/`Paused` pair, which may cycle. `Stopped` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum RuntimeState {
    NotStarted = 0,
    Started = 1,
    Paused = 2,
    Stopped = 3,
}

impl RuntimeState {
    fn from_u8(value: u8) -> Self {
        match value {
            0 => Self::NotStarted,
            1 => Self::Started,
            2 => Self::Paused,
            _ => Self::Stopped,
        }
    }
}

/// Orchestrates start, stop, pause, resume, and await-termination across a
/// topology's components in the required order.
///
/// Startup runs sinks, then filters, then sources: a source emitting before
/// its downstream consumers listen would have messages silently lost, since
/// nothing retains a backlog. Shutdown is the exact reverse, so upstream
/// stops producing before downstream stops accepting.
///
/// State transitions are atomic check-and-sets, so concurrent callers (a
/// user interrupt handler racing a batch script, say) cannot double-drive a
/// transition.
pub struct TopologyRuntime {
    topology: Topology,
    state: AtomicU8,
}

impl TopologyRuntime {
    pub fn new(topology: Topology) -> Self {
        Self {
            topology,
            state: AtomicU8::new(RuntimeState::NotStarted as u8),
        }
    }

    pub fn topology(&self) -> &Topology {
        &self.topology
    }

    pub fn running_state(&self) -> RuntimeState {
        RuntimeState::from_u8(self.state.load(Ordering::SeqCst))
    }

    fn transition(&self, from: RuntimeState, to: RuntimeState) -> bool {
        self.state
            .compare_exchange(from as u8, to as u8, Ordering::SeqCst, Ordering::SeqCst)
            .is_ok()
    }

    /// Starts every sink, then every filter, then every source. No-op unless
    /// the runtime has never been started.
    pub fn start(&self) -> Result<(), ActorError> {
        if !self.transition(RuntimeState::NotStarted, RuntimeState::Started) {
            debug!(state = ?self.running_state(), "start ignored");
            return Ok(());
        }

        for sink in self.topology.sinks() {
            debug!(component = sink.name(), "starting sink");
            sink.start()?;
        }
        for filter in self.topology.filters() {
            debug!(component = filter.name(), "starting filter");
            filter.start()?;
        }
        for source in self.topology.sources() {
            debug!(component = source.name(), "starting source");
            source.start()?;
        }
        info!("topology started");
        Ok(())
    }

    /// Stops every source, then every filter, then every sink. No-op once
    /// stopped.
    pub fn stop(&self) {
        let previous =
            RuntimeState::from_u8(self.state.swap(RuntimeState::Stopped as u8, Ordering::SeqCst));
        if previous == RuntimeState::Stopped {
            debug!("stop ignored, already stopped");
            return;
        }

        for source in self.topology.sources() {
            debug!(component = source.name(), "stopping source");
            source.stop();
        }
        for filter in self.topology.filters() {
            debug!(component = filter.name(), "stopping filter");
            filter.stop();
        }
        for sink in self.topology.sinks() {
            debug!(component = sink.name(), "stopping sink");
            sink.stop();
        }
        info!("topology stopped");
    }

    /// Pauses the sources. Only meaningful while `Started`; filters and
    /// sinks are unaffected.
    pub fn pause(&self) {
        if !self.transition(RuntimeState::Started, RuntimeState::Paused) {
            debug!(state = ?self.running_state(), "pause ignored");
            return;
        }
        for source in self.topology.sources() {
            source.pause();
        }
        info!("topology paused");
    }

    /// Resumes the sources. Only meaningful while `Paused`.
    pub fn resume(&self) {
        if !self.transition(RuntimeState::Paused, RuntimeState::Started) {
            debug!(state = ?self.running_state(), "resume ignored");
            return;
        }
        for source in self.topology.sources() {
            source.resume();
        }
        info!("topology resumed");
    }

    /// Blocks until every component has terminated, tier by tier in the same
    /// order as `stop`, so no partially-drained consumer is awaited before
    /// its producer has finished emitting.
    pub async fn await_termination(&self) {
        join_all(
            self.topology
                .sources()
                .iter()
                .map(|source| source.await_termination()),
        )
        .await;
        join_all(
            self.topology
                .filters()
                .iter()
                .map(|filter| filter.await_termination()),
        )
        .await;
        join_all(
            self.topology
                .sinks()
                .iter()
                .map(|sink| sink.await_termination()),
        )
        .await;
        info!("topology terminated");
    }
}

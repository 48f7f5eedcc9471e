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

use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::time::Duration;

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use rand::Rng;
use tokio::sync::oneshot;
use tokio_util::sync::CancellationToken;
use tracing::{trace, warn};

use crate::actor::{Actor, Handler, Mailbox};
use crate::error::ActorError;
use crate::stream::{OutputStream, Outputs};
use crate::traits::{SourceControl, Stage};

/// Externally observable state of a polling source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceState {
    HasNotStarted,
    Playing,
    Paused,
    /// Terminal.
    Stopped,
}

/// One fetch cycle of a polling source: pull whatever the upstream currently
/// offers. Invoked at most once per cycle, serialized by the source's actor.
#[async_trait]
pub trait Fetch<T>: Send + 'static
where
    T: Send + 'static,
{
    async fn fetch(&mut self) -> anyhow::Result<T>;
}

/// Adapts a closure returning a future into a [`Fetch`].
pub struct FetchFn<F>(F);

impl<F> FetchFn<F> {
    pub fn new(f: F) -> Self {
        Self(f)
    }
}

#[async_trait]
impl<T, F, Fut> Fetch<T> for FetchFn<F>
where
    T: Send + 'static,
    F: FnMut() -> Fut + Send + 'static,
    Fut: Future<Output = anyhow::Result<T>> + Send + 'static,
{
    async fn fetch(&mut self) -> anyhow::Result<T> {
        (self.0)().await
    }
}

/// Internal verbs of the source's engine actor. `Fetch` is the only driver
/// of repeated work: the work-loop is message recursion, not a timer thread.
enum Command<T> {
    Start,
    Stop,
    Pause,
    Resume,
    Fetch,
    AddOutputStream { port: u32, stream: OutputStream<T> },
    GetOutputStreams(oneshot::Sender<HashMap<u32, OutputStream<T>>>),
}

/// The state cell is shared with the owning [`PollingSource`] so `stop` can
/// mark the source `Stopped` even while the engine is mid-wait.
type StateCell = Arc<Mutex<SourceState>>;

fn read_state(cell: &StateCell) -> SourceState {
    *cell.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

fn write_state(cell: &StateCell, state: SourceState) {
    *cell.lock().unwrap_or_else(|poisoned| poisoned.into_inner()) = state;
}

struct SourceHandler<T: Clone + Send + 'static, F> {
    fetch: F,
    state: StateCell,
    outputs: Outputs<T>,
    mailbox: Mailbox<Command<T>>,
    cancel: CancellationToken,
    base_interval: Duration,
    jitter: Duration,
}

impl<T: Clone + Send + 'static, F: Fetch<T>> SourceHandler<T, F> {
    fn current(&self) -> SourceState {
        read_state(&self.state)
    }

    fn transition(&mut self, state: SourceState) {
        trace!(from = ?self.current(), to = ?state, "source state transition");
        write_state(&self.state, state);
    }

    fn reseed_fetch(&self) -> anyhow::Result<()> {
        self.mailbox.post(Command::Fetch)?;
        Ok(())
    }

    fn sample_delay(&self) -> Duration {
        let jitter_ms = self.jitter.as_millis() as u64;
        if jitter_ms == 0 {
            return self.base_interval;
        }
        self.base_interval + Duration::from_millis(rand::rng().random_range(0..jitter_ms))
    }

    /// One fetch-and-broadcast cycle, followed by a cancellable jittered
    /// wait and a re-post of `Fetch`. Handling `Fetch` while not `Playing`
    /// is a no-op; the chain simply stops re-posting.
    async fn handle_fetch(&mut self) -> anyhow::Result<()> {
        if self.current() != SourceState::Playing {
            trace!(state = ?self.current(), "fetch ignored while not playing");
            return Ok(());
        }

        match self.fetch.fetch().await {
            Ok(payload) => self.outputs.broadcast(payload),
            // One failed cycle never halts the loop; the next poll retries.
            Err(error) => warn!(error = ?error, "fetch cycle failed, retrying on next cycle"),
        }

        let delay = self.sample_delay();
        tokio::select! {
            _ = self.cancel.cancelled() => {
                trace!("fetch delay interrupted by stop");
                return Ok(());
            }
            _ = tokio::time::sleep(delay) => {}
        }

        if self.current() == SourceState::Playing {
            self.reseed_fetch()?;
        }
        Ok(())
    }
}

#[async_trait]
impl<T, F> Handler<Command<T>> for SourceHandler<T, F>
where
    T: Clone + Send + 'static,
    F: Fetch<T>,
{
    async fn process(&mut self, command: Command<T>) -> anyhow::Result<()> {
        match command {
            Command::Start => {
                if self.current() == SourceState::HasNotStarted {
                    self.transition(SourceState::Playing);
                    self.reseed_fetch()?;
                }
                Ok(())
            }
            Command::Resume => {
                if self.current() == SourceState::Paused {
                    self.transition(SourceState::Playing);
                    self.reseed_fetch()?;
                }
                Ok(())
            }
            Command::Pause => {
                if self.current() == SourceState::Playing {
                    self.transition(SourceState::Paused);
                }
                Ok(())
            }
            Command::Stop => {
                self.transition(SourceState::Stopped);
                Ok(())
            }
            Command::Fetch => self.handle_fetch().await,
            Command::AddOutputStream { port, stream } => {
                self.outputs.register(port, stream);
                Ok(())
            }
            Command::GetOutputStreams(reply) => {
                let _ = reply.send(self.outputs.snapshot());
                Ok(())
            }
        }
    }
}

/// A filter-like actor with no input port, driven by a self-re-posted
/// `Fetch` message: fetch, broadcast, wait `base_interval + random(0,
/// jitter)`, re-post. The wait observes the actor's cancellation token, so
/// `stop` has bounded latency regardless of jitter.
pub struct PollingSource<T: Clone + Send + 'static> {
    engine: Actor<Command<T>>,
    state: StateCell,
}

impl<T: Clone + Send + 'static> fmt::Debug for PollingSource<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PollingSource")
            .field("name", &self.engine.name())
            .field("state", &self.state())
            .finish()
    }
}

impl<T: Clone + Send + 'static> PollingSource<T> {
    pub fn new(
        name: impl Into<String>,
        fetch: impl Fetch<T>,
        base_interval: Duration,
        jitter: Duration,
    ) -> Self {
        let state = Arc::new(Mutex::new(SourceState::HasNotStarted));
        let handler_state = Arc::clone(&state);
        let engine = Actor::build(name, move |mailbox, cancel| SourceHandler {
            fetch,
            state: handler_state,
            outputs: Outputs::default(),
            mailbox,
            cancel,
            base_interval,
            jitter,
        });
        Self { engine, state }
    }

    /// A polling source from a closure returning a future.
    pub fn from_fn<F, Fut>(
        name: impl Into<String>,
        f: F,
        base_interval: Duration,
        jitter: Duration,
    ) -> Self
    where
        F: FnMut() -> Fut + Send + 'static,
        Fut: Future<Output = anyhow::Result<T>> + Send + 'static,
    {
        Self::new(name, FetchFn::new(f), base_interval, jitter)
    }

    pub fn name(&self) -> &str {
        self.engine.name()
    }

    /// A snapshot of the state machine.
    pub fn state(&self) -> SourceState {
        read_state(&self.state)
    }

    /// Registers an output stream under the source's `port`; last writer
    /// wins for a given port.
    pub fn add_output_stream(
        &self,
        port: u32,
        stream: OutputStream<T>,
    ) -> Result<(), ActorError> {
        self.engine.post(Command::AddOutputStream { port, stream })
    }

    /// A snapshot of the current `{port -> consumer}` wiring.
    pub async fn output_streams(&self) -> Result<HashMap<u32, OutputStream<T>>, ActorError> {
        let (tx, rx) = oneshot::channel();
        self.engine.post(Command::GetOutputStreams(tx))?;
        rx.await.map_err(|_| ActorError::Cancelled)
    }

    /// Starts the engine and seeds the first `Fetch`.
    pub fn start(&self) -> Result<(), ActorError> {
        self.engine.start()?;
        self.engine.post(Command::Start)
    }

    /// Transitions to `Stopped` and signals the engine's cancellation, so an
    /// in-progress jittered wait is interrupted promptly rather than running
    /// to completion.
    pub fn stop(&self) {
        if let Err(error) = self.engine.post(Command::Stop) {
            trace!(%error, "stop posted to already-closed source mailbox");
        }
        // The command above may be cancelled during the drain; the shared
        // cell keeps the observable state truthful regardless.
        write_state(&self.state, SourceState::Stopped);
        self.engine.stop();
    }

    /// `Playing` to `Paused`; the fetch chain stops re-posting. No effect in
    /// any other state.
    pub fn pause(&self) {
        if let Err(error) = self.engine.post(Command::Pause) {
            warn!(%error, source = self.engine.name(), "pause not delivered");
        }
    }

    /// `Paused` back to `Playing`, reseeding the fetch chain. No effect in
    /// any other state.
    pub fn resume(&self) {
        if let Err(error) = self.engine.post(Command::Resume) {
            warn!(%error, source = self.engine.name(), "resume not delivered");
        }
    }

    pub async fn await_termination(&self) {
        self.engine.await_termination().await;
    }

    pub fn dispose(&self) {
        self.engine.dispose();
    }
}

#[async_trait]
impl<T: Clone + Send + 'static> Stage for PollingSource<T> {
    fn name(&self) -> &str {
        self.engine.name()
    }

    fn start(&self) -> Result<(), ActorError> {
        PollingSource::start(self)
    }

    fn stop(&self) {
        PollingSource::stop(self);
    }

    async fn await_termination(&self) {
        PollingSource::await_termination(self).await;
    }
}

impl<T: Clone + Send + 'static> SourceControl for PollingSource<T> {
    fn pause(&self) {
        PollingSource::pause(self);
    }

    fn resume(&self) {
        PollingSource::resume(self);
    }
}

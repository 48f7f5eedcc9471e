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

use async_trait::async_trait;
use tokio::sync::oneshot;
use tracing::trace;

use crate::actor::{Actor, Handler};
use crate::error::ActorError;
use crate::stream::{MessageSink, OutputStream, Outputs, StreamMessage};
use crate::traits::Stage;

/// The business step a [`Filter`] runs for each accepted input: a predicate
/// gate, a transform, a fan-out, or any combination.
///
/// Delivery is at-most-once: an error fails the ticket and the input is
/// dropped without retry, so implementations must tolerate losing an item
/// they may already have acted on.
#[async_trait]
pub trait Digest<In, Out>: Send + 'static
where
    In: Send + 'static,
    Out: Clone + Send + 'static,
{
    async fn digest(&mut self, input: In, outputs: &Outputs<Out>) -> anyhow::Result<()>;
}

/// Adapts a synchronous closure into a [`Digest`].
pub struct DigestFn<F>(F);

impl<F> DigestFn<F> {
    pub fn new(f: F) -> Self {
        Self(f)
    }
}

#[async_trait]
impl<In, Out, F> Digest<In, Out> for DigestFn<F>
where
    In: Send + 'static,
    Out: Clone + Send + 'static,
    F: FnMut(In, &Outputs<Out>) -> anyhow::Result<()> + Send + 'static,
{
    async fn digest(&mut self, input: In, outputs: &Outputs<Out>) -> anyhow::Result<()> {
        (self.0)(input, outputs)
    }
}

/// Internal verbs of a filter's engine actor.
enum Command<In, Out> {
    Accept(StreamMessage<In>),
    AddOutputStream { port: u32, stream: OutputStream<Out> },
    GetOutputStreams(oneshot::Sender<HashMap<u32, OutputStream<Out>>>),
}

struct FilterHandler<In, Out, D> {
    digest: D,
    outputs: Outputs<Out>,
    _input: std::marker::PhantomData<fn(In)>,
}

#[async_trait]
impl<In, Out, D> Handler<Command<In, Out>> for FilterHandler<In, Out, D>
where
    In: Send + 'static,
    Out: Clone + Send + 'static,
    D: Digest<In, Out>,
{
    async fn process(&mut self, command: Command<In, Out>) -> anyhow::Result<()> {
        match command {
            Command::Accept(message) => {
                trace!(target_port = message.target_port, "digesting input");
                self.digest.digest(message.payload, &self.outputs).await
            }
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

/// An actor that both consumes and produces: inputs arrive through
/// [`MessageSink::accept`], the [`Digest`] decides what to broadcast to the
/// registered output streams.
///
/// The port map lives inside the processing loop and is mutated only via the
/// `AddOutputStream` control message, so wiring and processing are naturally
/// serialized.
pub struct Filter<In: Send + 'static, Out: Clone + Send + 'static> {
    engine: Actor<Command<In, Out>>,
}

impl<In: Send + 'static, Out: Clone + Send + 'static> fmt::Debug for Filter<In, Out> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Filter").field("name", &self.name()).finish()
    }
}

impl<In, Out> Filter<In, Out>
where
    In: Send + 'static,
    Out: Clone + Send + 'static,
{
    pub fn new(name: impl Into<String>, digest: impl Digest<In, Out>) -> Self {
        Self {
            engine: Actor::new(
                name,
                FilterHandler {
                    digest,
                    outputs: Outputs::default(),
                    _input: std::marker::PhantomData,
                },
            ),
        }
    }

    /// A filter from a synchronous closure.
    pub fn from_fn<F>(name: impl Into<String>, f: F) -> Self
    where
        F: FnMut(In, &Outputs<Out>) -> anyhow::Result<()> + Send + 'static,
    {
        Self::new(name, DigestFn::new(f))
    }

    pub fn name(&self) -> &str {
        self.engine.name()
    }

    /// Registers an output stream under the filter's `port`. Last writer
    /// wins for a given port. Queued like any other message, so wiring posted
    /// before `start` takes effect before the first accepted input.
    pub fn add_output_stream(
        &self,
        port: u32,
        stream: OutputStream<Out>,
    ) -> Result<(), ActorError> {
        self.engine.post(Command::AddOutputStream { port, stream })
    }

    /// A snapshot of the current `{port -> consumer}` wiring. Introspection
    /// only; never used to trigger delivery. The filter must be started for
    /// the snapshot request to be served.
    pub async fn output_streams(&self) -> Result<HashMap<u32, OutputStream<Out>>, ActorError> {
        let (tx, rx) = oneshot::channel();
        self.engine.post(Command::GetOutputStreams(tx))?;
        rx.await.map_err(|_| ActorError::Cancelled)
    }

    pub fn start(&self) -> Result<(), ActorError> {
        self.engine.start()
    }

    pub fn stop(&self) {
        self.engine.stop();
    }

    pub async fn await_termination(&self) {
        self.engine.await_termination().await;
    }

    pub fn dispose(&self) {
        self.engine.dispose();
    }
}

impl<In, Out> MessageSink<In> for Filter<In, Out>
where
    In: Send + 'static,
    Out: Clone + Send + 'static,
{
    fn accept(&self, message: StreamMessage<In>) -> Result<(), ActorError> {
        self.engine.post(Command::Accept(message))
    }
}

#[async_trait]
impl<In, Out> Stage for Filter<In, Out>
where
    In: Send + 'static,
    Out: Clone + Send + 'static,
{
    fn name(&self) -> &str {
        self.engine.name()
    }

    fn start(&self) -> Result<(), ActorError> {
        Filter::start(self)
    }

    fn stop(&self) {
        Filter::stop(self);
    }

    async fn await_termination(&self) {
        Filter::await_termination(self).await;
    }
}

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

use async_trait::async_trait;

use crate::actor::{Actor, Handler};
use crate::error::ActorError;
use crate::stream::{MessageSink, StreamMessage};
use crate::traits::Stage;

/// The terminal side effect a [`SinkActor`] performs per item: a file write,
/// a download, a notification. An error is logged by the actor's loop and
/// never propagated to stop the topology.
#[async_trait]
pub trait Consume<T>: Send + 'static
where
    T: Send + 'static,
{
    async fn consume(&mut self, item: T) -> anyhow::Result<()>;
}

/// Adapts a synchronous closure into a [`Consume`].
pub struct ConsumeFn<F>(F);

impl<F> ConsumeFn<F> {
    pub fn new(f: F) -> Self {
        Self(f)
    }
}

#[async_trait]
impl<T, F> Consume<T> for ConsumeFn<F>
where
    T: Send + 'static,
    F: FnMut(T) -> anyhow::Result<()> + Send + 'static,
{
    async fn consume(&mut self, item: T) -> anyhow::Result<()> {
        (self.0)(item)
    }
}

struct SinkHandler<C> {
    consume: C,
}

#[async_trait]
impl<T, C> Handler<StreamMessage<T>> for SinkHandler<C>
where
    T: Send + 'static,
    C: Consume<T>,
{
    async fn process(&mut self, message: StreamMessage<T>) -> anyhow::Result<()> {
        self.consume.consume(message.payload).await
    }
}

/// The acyclic endpoint of a topology: consumes stream messages and performs
/// a terminal side effect, producing nothing downstream.
pub struct SinkActor<T: Send + 'static> {
    engine: Actor<StreamMessage<T>>,
}

impl<T: Send + 'static> fmt::Debug for SinkActor<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SinkActor")
            .field("name", &self.engine.name())
            .finish()
    }
}

impl<T: Send + 'static> SinkActor<T> {
    pub fn new(name: impl Into<String>, consume: impl Consume<T>) -> Self {
        Self {
            engine: Actor::new(name, SinkHandler { consume }),
        }
    }

    /// A sink from a synchronous closure.
    pub fn from_fn<F>(name: impl Into<String>, f: F) -> Self
    where
        F: FnMut(T) -> anyhow::Result<()> + Send + 'static,
    {
        Self::new(name, ConsumeFn::new(f))
    }

    pub fn name(&self) -> &str {
        self.engine.name()
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

impl<T: Send + 'static> MessageSink<T> for SinkActor<T> {
    fn accept(&self, message: StreamMessage<T>) -> Result<(), ActorError> {
        self.engine.post(message)
    }
}

#[async_trait]
impl<T: Send + 'static> Stage for SinkActor<T> {
    fn name(&self) -> &str {
        self.engine.name()
    }

    fn start(&self) -> Result<(), ActorError> {
        SinkActor::start(self)
    }

    fn stop(&self) {
        SinkActor::stop(self);
    }

    async fn await_termination(&self) {
        SinkActor::await_termination(self).await;
    }
}

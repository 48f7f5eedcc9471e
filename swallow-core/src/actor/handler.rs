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

use std::future::Future;

use async_trait::async_trait;

/// The behavior an [`Actor`](crate::actor::Actor) runs for every dequeued
/// message.
///
/// Hooks are invoked in order: `pre_process`, `process`, `post_process`. An
/// error from any of them fails that one ticket and the loop moves on to the
/// next message. Handlers are owned by the actor's single task, so `&mut
/// self` access is serialized without any locking.
#[async_trait]
pub trait Handler<M>: Send + 'static
where
    M: Send + 'static,
{
    /// Runs before the message is consumed.
    fn pre_process(&mut self, _message: &M) -> anyhow::Result<()> {
        Ok(())
    }

    /// The business step.
    async fn process(&mut self, message: M) -> anyhow::Result<()>;

    /// Runs after `process` returned successfully.
    fn post_process(&mut self) -> anyhow::Result<()> {
        Ok(())
    }
}

/// Adapts a closure into a [`Handler`], for actors whose behavior needs no
/// named state type.
pub struct FnHandler<F>(F);

impl<F> FnHandler<F> {
    pub fn new(f: F) -> Self {
        Self(f)
    }
}

#[async_trait]
impl<M, F, Fut> Handler<M> for FnHandler<F>
where
    M: Send + 'static,
    F: FnMut(M) -> Fut + Send + 'static,
    Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
{
    async fn process(&mut self, message: M) -> anyhow::Result<()> {
        (self.0)(message).await
    }
}

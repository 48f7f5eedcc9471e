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

use tokio::sync::mpsc::UnboundedSender;
use tracing::trace;

use crate::actor::ticket::{Reply, Ticket};
use crate::error::ActorError;

/// A cloneable posting handle to one actor's queue.
///
/// Mailboxes are unbounded: `post` never blocks and never drops. There is
/// no back-pressure; in exchange, posting works from synchronous contexts
/// such as another actor's processing step.
pub struct Mailbox<M> {
    name: Arc<str>,
    sender: UnboundedSender<Ticket<M>>,
}

impl<M> Clone for Mailbox<M> {
    fn clone(&self) -> Self {
        Self {
            name: Arc::clone(&self.name),
            sender: self.sender.clone(),
        }
    }
}

impl<M> fmt::Debug for Mailbox<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Mailbox").field("actor", &self.name).finish()
    }
}

impl<M: Send + 'static> Mailbox<M> {
    pub(crate) fn new(name: Arc<str>, sender: UnboundedSender<Ticket<M>>) -> Self {
        Self { name, sender }
    }

    /// The name of the actor this mailbox feeds.
    pub fn actor_name(&self) -> &str {
        &self.name
    }

    /// Enqueues a message and returns immediately. No delivery confirmation;
    /// a processing failure is logged by the actor's loop and never reaches
    /// the caller.
    pub fn post(&self, message: M) -> Result<(), ActorError> {
        self.sender
            .send(Ticket::fire_and_forget(message))
            .map_err(|_| ActorError::MailboxClosed(self.name.to_string()))
    }

    /// Enqueues a message with a completion handle. The returned [`Reply`]
    /// resolves after this specific message is processed, failed, or
    /// abandoned; if the mailbox is already closed the reply is immediately
    /// cancelled.
    pub fn post_and_reply(&self, message: M) -> Reply {
        let (ticket, reply) = Ticket::with_reply(message);
        if self.sender.send(ticket).is_err() {
            trace!(actor = %self.name, "mailbox closed, ticket cancelled on submission");
            return Reply::cancelled();
        }
        reply
    }
}

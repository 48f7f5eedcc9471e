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

use tokio::sync::oneshot;

use crate::error::ActorError;

/// A queued message plus its optional completion handle.
///
/// The ticket is owned exclusively by the mailbox until the processing loop
/// dequeues it. Its completion is settled exactly once, either by the loop
/// (success or `Processing`) or by shutdown cleanup (`Cancelled`).
pub(crate) struct Ticket<M> {
    pub(crate) message: M,
    pub(crate) completion: Completion,
}

impl<M> Ticket<M> {
    pub(crate) fn fire_and_forget(message: M) -> Self {
        Self {
            message,
            completion: Completion(None),
        }
    }

    pub(crate) fn with_reply(message: M) -> (Self, Reply) {
        let (tx, rx) = oneshot::channel();
        let ticket = Self {
            message,
            completion: Completion(Some(tx)),
        };
        (ticket, Reply { receiver: rx })
    }
}

/// The settle-once side of a ticket. A fire-and-forget ticket carries an
/// empty completion and settling it is a no-op.
pub(crate) struct Completion(Option<oneshot::Sender<Result<(), ActorError>>>);

impl Completion {
    /// True when a caller is waiting on this ticket via [`Reply`].
    pub(crate) fn is_observed(&self) -> bool {
        self.0.is_some()
    }

    pub(crate) fn settle(mut self, result: Result<(), ActorError>) {
        if let Some(sender) = self.0.take() {
            // The caller may have dropped its Reply; nothing to do then.
            let _ = sender.send(result);
        }
    }
}

/// The caller's half of a `post_and_reply` ticket.
///
/// Resolves once the actor has processed the message (`Ok`), the handler
/// failed (`Processing`), or the actor shut down before reaching the message
/// (`Cancelled`).
#[derive(Debug)]
pub struct Reply {
    receiver: oneshot::Receiver<Result<(), ActorError>>,
}

impl Reply {
    /// Waits for the ticket to be settled.
    pub async fn join(self) -> Result<(), ActorError> {
        // A dropped sender means the ticket was discarded without being
        // settled, which only happens when the mailbox itself went away.
        self.receiver.await.unwrap_or(Err(ActorError::Cancelled))
    }

    /// A reply that is already cancelled, used when the mailbox refused the
    /// ticket outright.
    pub(crate) fn cancelled() -> Self {
        let (_tx, rx) = oneshot::channel();
        Self { receiver: rx }
    }
}

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

use thiserror::Error;

/// Errors surfaced by actors and the components built on them.
///
/// `AlreadyStarted` and `Disposed` are synchronous failures returned directly
/// to the caller of `start`, `post`, or `post_and_reply`. `Processing` and
/// `Cancelled` only ever surface through the [`Reply`](crate::actor::Reply)
/// of a specific `post_and_reply` ticket; fire-and-forget posts swallow them
/// at the loop level.
#[derive(Debug, Error)]
pub enum ActorError {
    /// `start` was called on an actor whose processing loop is already
    /// running. Actors are single-shot.
    #[error("actor `{0}` was already started")]
    AlreadyStarted(String),

    /// An operation was attempted after `dispose`.
    #[error("actor `{0}` has been disposed")]
    Disposed(String),

    /// A message handler hook returned an error. Isolated to the ticket that
    /// carried the message; the processing loop keeps running.
    #[error("message handler failed")]
    Processing(#[source] anyhow::Error),

    /// The ticket was abandoned before processing because the actor stopped
    /// or was disposed.
    #[error("message was cancelled before it could be processed")]
    Cancelled,

    /// The actor's mailbox no longer accepts messages.
    #[error("mailbox of actor `{0}` is closed")]
    MailboxClosed(String),
}

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
use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use tokio::sync::mpsc::{self, UnboundedReceiver};
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;
use tracing::{debug, trace, warn};

pub use handler::{FnHandler, Handler};
pub use mailbox::Mailbox;
pub use ticket::Reply;
pub(crate) use ticket::Ticket;

use crate::error::ActorError;

mod handler;
mod mailbox;
mod ticket;

/// A single-task, serialized message-processing unit.
///
/// An actor owns one mailbox and, once started, one spawned task that
/// dequeues tickets and runs the [`Handler`] hooks for each. At most one
/// `process` invocation is in flight at any time, so handler state needs no
/// internal locking.
///
/// Lifecycle: created, started (at most once), stopped (the loop drains and
/// cancels whatever is still queued), terminated. `dispose` is idempotent
/// and additionally cancels tickets queued on an actor that never started.
pub struct Actor<M: Send + 'static> {
    name: Arc<str>,
    mailbox: Mailbox<M>,
    core: Mutex<Option<ActorCore<M>>>,
    cancel: CancellationToken,
    tracker: TaskTracker,
    disposed: AtomicBool,
}

/// The parts that move into the processing task on `start`.
struct ActorCore<M> {
    inbox: UnboundedReceiver<Ticket<M>>,
    handler: Box<dyn Handler<M>>,
}

impl<M: Send + 'static> fmt::Debug for Actor<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Actor").field("name", &self.name).finish()
    }
}

impl<M: Send + 'static> Actor<M> {
    /// Creates an actor with the given handler. The processing loop does not
    /// run until [`start`](Self::start); messages posted before then queue
    /// up in the mailbox.
    pub fn new(name: impl Into<String>, handler: impl Handler<M>) -> Self {
        Self::build(name, |_, _| handler)
    }

    /// Creates an actor whose handler is built from the actor's own mailbox
    /// and cancellation token. This is the seam for self-posting handlers
    /// such as the polling source's fetch loop.
    pub fn build<H, F>(name: impl Into<String>, make_handler: F) -> Self
    where
        H: Handler<M>,
        F: FnOnce(Mailbox<M>, CancellationToken) -> H,
    {
        let name: Arc<str> = name.into().into();
        let (sender, inbox) = mpsc::unbounded_channel();
        let cancel = CancellationToken::new();
        let mailbox = Mailbox::new(Arc::clone(&name), sender);
        let handler = make_handler(mailbox.clone(), cancel.clone());

        Self {
            name,
            mailbox,
            core: Mutex::new(Some(ActorCore {
                inbox,
                handler: Box::new(handler),
            })),
            cancel,
            tracker: TaskTracker::new(),
            disposed: AtomicBool::new(false),
        }
    }

    /// Creates an actor from a closure, the functional sibling of a named
    /// [`Handler`] implementation.
    pub fn stateless<F, Fut>(name: impl Into<String>, f: F) -> Self
    where
        F: FnMut(M) -> Fut + Send + 'static,
        Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
    {
        Self::new(name, FnHandler::new(f))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// A cloneable posting handle to this actor's queue.
    pub fn mailbox(&self) -> Mailbox<M> {
        self.mailbox.clone()
    }

    /// The token observed by the processing loop's sole suspension point.
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Enqueues a message, fire-and-forget.
    pub fn post(&self, message: M) -> Result<(), ActorError> {
        self.assert_not_disposed()?;
        self.mailbox.post(message)
    }

    /// Enqueues a message with a completion handle.
    pub fn post_and_reply(&self, message: M) -> Result<Reply, ActorError> {
        self.assert_not_disposed()?;
        Ok(self.mailbox.post_and_reply(message))
    }

    /// Spawns the processing loop. The actor is single-shot: a second call
    /// returns [`ActorError::AlreadyStarted`] rather than being silently
    /// ignored.
    pub fn start(&self) -> Result<(), ActorError> {
        self.assert_not_disposed()?;
        let core = self
            .core
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .take()
            .ok_or_else(|| ActorError::AlreadyStarted(self.name.to_string()))?;

        debug!(actor = %self.name, "starting processing loop");
        self.tracker
            .spawn(run_loop(Arc::clone(&self.name), core, self.cancel.clone()));
        self.tracker.close();
        Ok(())
    }

    /// Requests graceful shutdown: the loop finishes the ticket in flight,
    /// then cancels everything still queued and exits.
    pub fn stop(&self) {
        debug!(actor = %self.name, "stop requested");
        self.cancel.cancel();
    }

    /// Blocks the caller until the loop has fully exited and every queued
    /// ticket has been settled. Returns immediately for an actor that never
    /// started.
    pub async fn await_termination(&self) {
        self.tracker.close();
        self.tracker.wait().await;
    }

    /// Stops the actor and releases its mailbox. Idempotent: calling this
    /// more than once is a no-op, not an error. Tickets queued on an actor
    /// that never started are cancelled here.
    pub fn dispose(&self) {
        if self.disposed.swap(true, Ordering::SeqCst) {
            return;
        }
        debug!(actor = %self.name, "disposing");
        self.cancel.cancel();
        let never_started = self
            .core
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .take();
        if let Some(mut core) = never_started {
            drain_cancelled(&self.name, &mut core.inbox);
        }
        self.tracker.close();
    }

    fn assert_not_disposed(&self) -> Result<(), ActorError> {
        if self.disposed.load(Ordering::SeqCst) {
            return Err(ActorError::Disposed(self.name.to_string()));
        }
        Ok(())
    }
}

/// The actor's dedicated task: dequeue, run hooks, settle the ticket.
///
/// Mailbox receive is the sole suspension point between messages and it
/// observes the cancellation token, so `stop` unblocks an idle actor without
/// waiting on a message.
async fn run_loop<M: Send + 'static>(
    name: Arc<str>,
    mut core: ActorCore<M>,
    cancel: CancellationToken,
) {
    loop {
        tokio::select! {
            // Cancellation wins over a pending message, so stop latency is
            // bounded by at most the ticket already in flight.
            biased;
            _ = cancel.cancelled() => {
                trace!(actor = %name, "cancellation observed, leaving loop");
                break;
            }
            next = core.inbox.recv() => {
                let Some(ticket) = next else {
                    trace!(actor = %name, "mailbox closed and drained");
                    break;
                };
                let Ticket { message, completion } = ticket;

                let outcome = dispatch(core.handler.as_mut(), message).await;
                match outcome {
                    Ok(()) => completion.settle(Ok(())),
                    Err(error) => {
                        // The loop itself never dies from one bad message.
                        if completion.is_observed() {
                            completion.settle(Err(ActorError::Processing(error)));
                        } else {
                            warn!(actor = %name, error = ?error, "message handler failed, message dropped");
                        }
                    }
                }
            }
        }
    }

    core.inbox.close();
    drain_cancelled(&name, &mut core.inbox);
    debug!(actor = %name, "processing loop terminated");
}

async fn dispatch<M: Send + 'static>(
    handler: &mut dyn Handler<M>,
    message: M,
) -> anyhow::Result<()> {
    handler.pre_process(&message)?;
    handler.process(message).await?;
    handler.post_process()
}

/// Settles every ticket still queued as cancelled. Never silently discards.
fn drain_cancelled<M>(name: &str, inbox: &mut UnboundedReceiver<Ticket<M>>) {
    inbox.close();
    let mut cancelled = 0usize;
    while let Ok(ticket) = inbox.try_recv() {
        ticket.completion.settle(Err(ActorError::Cancelled));
        cancelled += 1;
    }
    if cancelled > 0 {
        debug!(actor = %name, cancelled, "cancelled queued tickets on shutdown");
    }
}

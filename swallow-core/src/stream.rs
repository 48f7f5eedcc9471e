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
use std::sync::Arc;

use tracing::warn;

use crate::error::ActorError;

/// The envelope a producer sends into a consumer's mailbox through an
/// [`OutputStream`]. Carries the payload and the consumer-side port it was
/// addressed to.
#[derive(Debug, Clone)]
pub struct StreamMessage<T> {
    pub payload: T,
    pub target_port: u32,
}

/// A consumer that accepts stream messages: filters and sinks implement
/// this by posting the envelope into their own mailbox.
pub trait MessageSink<T>: Send + Sync {
    fn accept(&self, message: StreamMessage<T>) -> Result<(), ActorError>;
}

/// A pure forwarding handle from a producer to one registered consumer at a
/// given consumer-side port number. Posting through the stream is the only
/// way messages cross actor boundaries.
pub struct OutputStream<T> {
    sink: Arc<dyn MessageSink<T>>,
    port: u32,
}

impl<T> Clone for OutputStream<T> {
    fn clone(&self) -> Self {
        Self {
            sink: Arc::clone(&self.sink),
            port: self.port,
        }
    }
}

impl<T> fmt::Debug for OutputStream<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OutputStream")
            .field("target_port", &self.port)
            .finish()
    }
}

impl<T: Send + 'static> OutputStream<T> {
    pub fn new(sink: Arc<dyn MessageSink<T>>, port: u32) -> Self {
        Self { sink, port }
    }

    /// The consumer-side port this stream delivers to.
    pub fn port(&self) -> u32 {
        self.port
    }

    /// Wraps the payload in a [`StreamMessage`] and hands it to the
    /// consumer's mailbox.
    pub fn post(&self, payload: T) -> Result<(), ActorError> {
        self.sink.accept(StreamMessage {
            payload,
            target_port: self.port,
        })
    }
}

/// The producer-side port map: output streams keyed by the producer's own
/// port number. Mutated only from within the owning actor's processing loop,
/// so no locking is needed.
pub struct Outputs<T> {
    streams: HashMap<u32, OutputStream<T>>,
}

impl<T> Default for Outputs<T> {
    fn default() -> Self {
        Self {
            streams: HashMap::new(),
        }
    }
}

impl<T> fmt::Debug for Outputs<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Outputs")
            .field("ports", &self.streams.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl<T: Clone + Send + 'static> Outputs<T> {
    /// Registers a stream under `port`. Re-registering the same port
    /// replaces the prior consumer (last-writer-wins), so topology edges can
    /// be rewired before start. Requires `&mut self`: inside a running actor
    /// only the processing loop holds that.
    pub fn register(&mut self, port: u32, stream: OutputStream<T>) {
        if self.streams.insert(port, stream).is_some() {
            warn!(port, "replaced existing output stream on port");
        }
    }

    /// An owned copy of the `{port -> stream}` wiring.
    pub fn snapshot(&self) -> HashMap<u32, OutputStream<T>> {
        self.streams.clone()
    }

    /// Posts the payload to every registered stream. There is no ordering
    /// guarantee between ports beyond each mailbox's own FIFO order; a
    /// closed consumer is logged and skipped.
    pub fn broadcast(&self, payload: T) {
        for (port, stream) in &self.streams {
            if let Err(error) = stream.post(payload.clone()) {
                warn!(port, %error, "dropping broadcast to closed consumer");
            }
        }
    }

    /// Posts the payload to the stream registered under `port` only.
    pub fn post_to(&self, port: u32, payload: T) -> Result<(), ActorError> {
        match self.streams.get(&port) {
            Some(stream) => stream.post(payload),
            None => Ok(()),
        }
    }

    pub fn len(&self) -> usize {
        self.streams.len()
    }

    pub fn is_empty(&self) -> bool {
        self.streams.is_empty()
    }
}

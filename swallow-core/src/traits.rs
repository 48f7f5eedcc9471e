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

use async_trait::async_trait;

use crate::error::ActorError;

/// Lifecycle surface shared by every topology component, letting the runtime
/// drive heterogeneous sources, filters, and sinks uniformly.
#[async_trait]
pub trait Stage: Send + Sync {
    fn name(&self) -> &str;

    /// Begins processing. Single-shot per component.
    fn start(&self) -> Result<(), ActorError>;

    /// Requests graceful shutdown; queued work is processed or cancelled,
    /// never silently discarded.
    fn stop(&self);

    /// Resolves once the component's loop has fully exited.
    async fn await_termination(&self);
}

/// Sources additionally expose pause/resume. Filters and sinks have no
/// concept of pause; they are demand-driven by source output, not by a
/// clock.
pub trait SourceControl: Stage {
    fn pause(&self);
    fn resume(&self);
}

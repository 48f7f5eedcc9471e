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

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use swallow_core::prelude::*;

use crate::setup::{initialize_tracing, wait_until, within};

mod setup;

/// A lifecycle probe that records every call made to it, standing in for a
/// real component.
struct Probe {
    name: String,
    log: Arc<Mutex<Vec<String>>>,
}

impl Probe {
    fn new(name: &str, log: &Arc<Mutex<Vec<String>>>) -> Arc<Self> {
        Arc::new(Self {
            name: name.to_string(),
            log: Arc::clone(log),
        })
    }

    fn record(&self, event: &str) {
        self.log
            .lock()
            .unwrap()
            .push(format!("{}:{}", event, self.name));
    }
}

#[async_trait]
impl Stage for Probe {
    fn name(&self) -> &str {
        &self.name
    }

    fn start(&self) -> Result<(), ActorError> {
        self.record("start");
        Ok(())
    }

    fn stop(&self) {
        self.record("stop");
    }

    async fn await_termination(&self) {}
}

impl SourceControl for Probe {
    fn pause(&self) {
        self.record("pause");
    }

    fn resume(&self) {
        self.record("resume");
    }
}

fn probe_runtime(log: &Arc<Mutex<Vec<String>>>) -> TopologyRuntime {
    let topology = Topology::builder()
        .sink(Probe::new("sink", log))
        .filter(Probe::new("filter", log))
        .source(Probe::new("source", log))
        .build();
    TopologyRuntime::new(topology)
}

#[tokio::test]
async fn start_runs_sinks_then_filters_then_sources() -> anyhow::Result<()> {
    initialize_tracing();

    let log = Arc::new(Mutex::new(Vec::new()));
    let runtime = probe_runtime(&log);

    assert_eq!(runtime.running_state(), RuntimeState::NotStarted);
    runtime.start()?;
    assert_eq!(runtime.running_state(), RuntimeState::Started);
    assert_eq!(
        *log.lock().unwrap(),
        vec!["start:sink", "start:filter", "start:source"]
    );

    // Second start is a no-op, not a second round of calls.
    runtime.start()?;
    assert_eq!(log.lock().unwrap().len(), 3);
    Ok(())
}

#[tokio::test]
async fn stop_runs_sources_then_filters_then_sinks() -> anyhow::Result<()> {
    initialize_tracing();

    let log = Arc::new(Mutex::new(Vec::new()));
    let runtime = probe_runtime(&log);

    runtime.start()?;
    log.lock().unwrap().clear();

    runtime.stop();
    assert_eq!(runtime.running_state(), RuntimeState::Stopped);
    assert_eq!(
        *log.lock().unwrap(),
        vec!["stop:source", "stop:filter", "stop:sink"]
    );

    // Stopped is terminal; repeated stop and a late start change nothing.
    runtime.stop();
    runtime.start()?;
    assert_eq!(log.lock().unwrap().len(), 3);
    assert_eq!(runtime.running_state(), RuntimeState::Stopped);
    Ok(())
}

#[tokio::test]
async fn pause_and_resume_reach_sources_only() -> anyhow::Result<()> {
    initialize_tracing();

    let log = Arc::new(Mutex::new(Vec::new()));
    let runtime = probe_runtime(&log);

    // Pause before start is ignored.
    runtime.pause();
    assert_eq!(runtime.running_state(), RuntimeState::NotStarted);

    runtime.start()?;
    log.lock().unwrap().clear();

    // Resume while running is ignored.
    runtime.resume();
    assert!(log.lock().unwrap().is_empty());

    runtime.pause();
    assert_eq!(runtime.running_state(), RuntimeState::Paused);
    runtime.resume();
    assert_eq!(runtime.running_state(), RuntimeState::Started);
    assert_eq!(*log.lock().unwrap(), vec!["pause:source", "resume:source"]);
    Ok(())
}

#[tokio::test]
async fn pipeline_moves_items_from_source_to_sink() -> anyhow::Result<()> {
    initialize_tracing();

    let counter = Arc::new(AtomicU32::new(0));
    let fetch_counter = Arc::clone(&counter);
    let source = Arc::new(PollingSource::from_fn(
        "numbers",
        move || {
            let counter = Arc::clone(&fetch_counter);
            async move { Ok(counter.fetch_add(1, Ordering::SeqCst)) }
        },
        Duration::from_millis(5),
        Duration::ZERO,
    ));

    let filter: Arc<Filter<u32, u32>> =
        Arc::new(Filter::from_fn("evens", |n: u32, outputs: &Outputs<u32>| {
            if n % 2 == 0 {
                outputs.broadcast(n);
            }
            Ok(())
        }));

    let collected = Arc::new(Mutex::new(Vec::new()));
    let store = Arc::clone(&collected);
    let sink = Arc::new(SinkActor::from_fn("collector", move |n: u32| {
        store.lock().unwrap().push(n);
        Ok(())
    }));

    source.add_output_stream(0, OutputStream::new(filter.clone(), 0))?;
    filter.add_output_stream(0, OutputStream::new(sink.clone(), 0))?;

    let topology = Topology::builder()
        .source(source)
        .filter(filter)
        .sink(sink)
        .build();
    let runtime = TopologyRuntime::new(topology);

    runtime.start()?;
    wait_until(
        || collected.lock().unwrap().len() >= 3,
        Duration::from_secs(2),
        "three even numbers collected",
    )
    .await;

    runtime.stop();
    within(
        Duration::from_secs(2),
        "topology termination",
        runtime.await_termination(),
    )
    .await;

    let delivered = collected.lock().unwrap().clone();
    assert!(delivered.iter().all(|n| n % 2 == 0));
    assert!(delivered.windows(2).all(|w| w[0] < w[1]));
    Ok(())
}

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
use std::time::{Duration, Instant};

use swallow_core::prelude::*;

use crate::setup::{initialize_tracing, wait_until, within};

mod setup;

/// A source whose fetch counts its own invocations.
fn counting_source(
    base_interval: Duration,
    jitter: Duration,
) -> (Arc<PollingSource<u32>>, Arc<AtomicU32>) {
    let fetches = Arc::new(AtomicU32::new(0));
    let counter = Arc::clone(&fetches);
    let source = Arc::new(PollingSource::from_fn(
        "counting",
        move || {
            let counter = Arc::clone(&counter);
            async move { Ok(counter.fetch_add(1, Ordering::SeqCst) + 1) }
        },
        base_interval,
        jitter,
    ));
    (source, fetches)
}

fn collecting_stream(seen: &Arc<Mutex<Vec<u32>>>) -> (Arc<SinkActor<u32>>, OutputStream<u32>) {
    let store = Arc::clone(seen);
    let sink = Arc::new(SinkActor::from_fn("stream-sink", move |n: u32| {
        store.lock().unwrap().push(n);
        Ok(())
    }));
    let stream = OutputStream::new(sink.clone(), 0);
    (sink, stream)
}

#[tokio::test]
async fn stop_interrupts_a_long_jittered_wait() -> anyhow::Result<()> {
    initialize_tracing();

    // Base interval far beyond the test's patience; only cancellation can
    // bring termination in under it.
    let (source, fetches) = counting_source(Duration::from_secs(60), Duration::from_secs(60));
    source.start()?;

    wait_until(
        || fetches.load(Ordering::SeqCst) >= 1,
        Duration::from_secs(1),
        "first fetch",
    )
    .await;

    let stopping = Instant::now();
    source.stop();
    within(
        Duration::from_secs(1),
        "source termination",
        source.await_termination(),
    )
    .await;

    assert!(stopping.elapsed() < Duration::from_secs(5));
    assert_eq!(source.state(), SourceState::Stopped);
    Ok(())
}

#[tokio::test]
async fn immediate_stop_bounds_the_fetch_count() -> anyhow::Result<()> {
    initialize_tracing();

    let (source, fetches) = counting_source(Duration::from_secs(60), Duration::ZERO);
    source.start()?;
    source.stop();
    within(
        Duration::from_secs(1),
        "source termination",
        source.await_termination(),
    )
    .await;

    // The seed `Fetch` may or may not have run before cancellation won; more
    // than one cycle means the loop ignored the stop.
    assert!(fetches.load(Ordering::SeqCst) <= 1);
    assert_eq!(source.state(), SourceState::Stopped);
    Ok(())
}

#[tokio::test]
async fn pause_halts_polling_and_resume_reseeds_it() -> anyhow::Result<()> {
    initialize_tracing();

    let (source, fetches) = counting_source(Duration::from_millis(5), Duration::ZERO);
    source.start()?;

    wait_until(
        || fetches.load(Ordering::SeqCst) >= 2,
        Duration::from_secs(2),
        "polling underway",
    )
    .await;

    source.pause();
    wait_until(
        || source.state() == SourceState::Paused,
        Duration::from_secs(1),
        "paused state",
    )
    .await;

    // Let any in-flight cycle drain, then confirm the count has settled.
    tokio::time::sleep(Duration::from_millis(50)).await;
    let at_pause = fetches.load(Ordering::SeqCst);
    tokio::time::sleep(Duration::from_millis(100)).await;
    assert_eq!(fetches.load(Ordering::SeqCst), at_pause);

    source.resume();
    wait_until(
        || fetches.load(Ordering::SeqCst) > at_pause,
        Duration::from_secs(2),
        "polling resumed",
    )
    .await;
    assert_eq!(source.state(), SourceState::Playing);

    source.stop();
    within(
        Duration::from_secs(1),
        "source termination",
        source.await_termination(),
    )
    .await;
    Ok(())
}

#[tokio::test]
async fn state_walks_the_full_lifecycle() -> anyhow::Result<()> {
    initialize_tracing();

    let (source, fetches) = counting_source(Duration::from_millis(5), Duration::ZERO);
    assert_eq!(source.state(), SourceState::HasNotStarted);

    // Pause before start leaves the machine untouched.
    source.pause();
    tokio::time::sleep(Duration::from_millis(20)).await;
    assert_eq!(source.state(), SourceState::HasNotStarted);
    assert_eq!(fetches.load(Ordering::SeqCst), 0);

    source.start()?;
    wait_until(
        || source.state() == SourceState::Playing,
        Duration::from_secs(1),
        "playing state",
    )
    .await;

    source.pause();
    wait_until(
        || source.state() == SourceState::Paused,
        Duration::from_secs(1),
        "paused state",
    )
    .await;

    source.resume();
    wait_until(
        || source.state() == SourceState::Playing,
        Duration::from_secs(1),
        "playing again",
    )
    .await;

    source.stop();
    within(
        Duration::from_secs(1),
        "source termination",
        source.await_termination(),
    )
    .await;
    assert_eq!(source.state(), SourceState::Stopped);
    Ok(())
}

#[tokio::test]
async fn fetched_payloads_reach_registered_streams() -> anyhow::Result<()> {
    initialize_tracing();

    let seen = Arc::new(Mutex::new(Vec::new()));
    let (sink, stream) = collecting_stream(&seen);

    let (source, _fetches) = counting_source(Duration::from_millis(5), Duration::from_millis(5));
    source.add_output_stream(0, stream)?;

    sink.start()?;
    source.start()?;

    wait_until(
        || seen.lock().unwrap().len() >= 3,
        Duration::from_secs(2),
        "three payloads delivered",
    )
    .await;

    source.stop();
    source.await_termination().await;
    sink.stop();
    sink.await_termination().await;

    let delivered = seen.lock().unwrap().clone();
    assert!(delivered.windows(2).all(|w| w[0] < w[1]));
    Ok(())
}

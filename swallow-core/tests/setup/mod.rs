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

#![allow(dead_code)]

use std::future::Future;
use std::sync::Once;
use std::time::Duration;

use tracing_subscriber::{EnvFilter, FmtSubscriber};

// Ensures tracing initialization happens only once across all tests.
static INIT: Once = Once::new();

/// Initializes the global tracing subscriber for tests. Honors `RUST_LOG`
/// and defaults to `debug` for the crate under test.
pub fn initialize_tracing() {
    INIT.call_once(|| {
        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new("swallow_core=debug"));

        let subscriber = FmtSubscriber::builder()
            .compact()
            .without_time()
            .with_target(true)
            .with_env_filter(filter)
            .with_test_writer()
            .finish();

        let _ = tracing::subscriber::set_global_default(subscriber);
    });
}

/// Polls `condition` until it holds or `deadline` elapses. Panics on
/// timeout, so failed expectations show up as test failures rather than
/// hangs.
pub async fn wait_until<F>(mut condition: F, deadline: Duration, what: &str)
where
    F: FnMut() -> bool,
{
    let start = tokio::time::Instant::now();
    while !condition() {
        if start.elapsed() > deadline {
            panic!("timed out waiting for: {what}");
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
}

/// Bounds an await so a regression hangs the test for at most `deadline`.
pub async fn within<F: Future>(deadline: Duration, what: &str, fut: F) -> F::Output {
    match tokio::time::timeout(deadline, fut).await {
        Ok(output) => output,
        Err(_) => panic!("timed out during: {what}"),
    }
}

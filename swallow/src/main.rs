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

use std::env;
use std::path::Path;
use std::sync::Arc;

use tracing::info;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

use swallow_core::prelude::*;

use swallow::anime::AnimeEntry;
use swallow::config::Config;
use swallow::download::TorrentDownloader;
use swallow::feed::{FeedFetcher, RssFeed};
use swallow::filters::{DetectionDigest, ProcessingDigest};
use swallow::persistence::MemoryDao;

const DEFAULT_CONFIG_PATH: &str = "swallow.toml";

/// Stdout logging, plus a daily-rolling file when the config asks for one.
/// The returned guard must stay alive for the file writer to flush.
fn init_tracing(log_dir: Option<&Path>) -> Option<tracing_appender::non_blocking::WorkerGuard> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("swallow=info,swallow_core=info"));

    let stdout = tracing_subscriber::fmt::layer();
    match log_dir {
        Some(dir) => {
            let appender = tracing_appender::rolling::daily(dir, "swallow.log");
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let file = tracing_subscriber::fmt::layer()
                .with_ansi(false)
                .with_writer(writer);
            tracing_subscriber::registry()
                .with(filter)
                .with(stdout)
                .with(file)
                .init();
            Some(guard)
        }
        None => {
            tracing_subscriber::registry().with(filter).with(stdout).init();
            None
        }
    }
}

fn build_runtime(config: &Config) -> anyhow::Result<TopologyRuntime> {
    let detection: Arc<Filter<RssFeed, AnimeEntry>> =
        Arc::new(Filter::new("anime-detection", DetectionDigest));
    let processing: Arc<Filter<AnimeEntry, AnimeEntry>> = Arc::new(Filter::new(
        "entry-processing",
        ProcessingDigest::new(
            Arc::new(MemoryDao::<AnimeEntry>::new()),
            config.criteria()?,
            config.match_all,
        ),
    ));
    let downloader: Arc<SinkActor<AnimeEntry>> = Arc::new(SinkActor::new(
        "torrent-downloader",
        TorrentDownloader::new(&config.destination),
    ));

    detection.add_output_stream(0, OutputStream::new(processing.clone(), 0))?;
    processing.add_output_stream(0, OutputStream::new(downloader.clone(), 0))?;

    let mut builder = Topology::builder()
        .filter(detection.clone())
        .filter(processing)
        .sink(downloader);

    for (index, feed) in config.feeds.iter().enumerate() {
        let source = Arc::new(PollingSource::new(
            format!("feed-{index}"),
            FeedFetcher::new(feed.url.clone()),
            feed.interval(),
            feed.jitter(),
        ));
        source.add_output_stream(0, OutputStream::new(detection.clone(), 0))?;
        info!(url = %feed.url, interval_secs = feed.interval_secs, "watching feed");
        builder = builder.source(source);
    }

    Ok(TopologyRuntime::new(builder.build()))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config_path = env::args()
        .nth(1)
        .unwrap_or_else(|| DEFAULT_CONFIG_PATH.to_string());
    let config = Config::load(Path::new(&config_path))?;
    let _log_guard = init_tracing(config.log_dir.as_deref());

    info!(config = %config_path, feeds = config.feeds.len(), "starting");
    let runtime = build_runtime(&config)?;
    runtime.start()?;

    tokio::signal::ctrl_c().await?;
    info!("shutdown requested");
    runtime.stop();
    runtime.await_termination().await;
    info!("all components terminated");
    Ok(())
}

/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use std::sync::LazyLock;
use std::time::{Duration, Instant};

use anyhow::anyhow;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use log::{debug, info, warn};
use tokio::time::MissedTickBehavior;

use dk_point::{Category, DataType, Point, PointError, TagMap};
use dk_stdlog::LogSnapshot;

use crate::input::measurement::{FieldInfo, FieldType, MeasurementInfo, Unit};
use crate::input::tags::{align_time_millis, merge_tags_wrapper};
use crate::input::{ElectionInput, ElectionSwitch, Input, InputContext};

pub const SELF_INPUT_NAME: &str = "self";

const DEFAULT_INTERVAL: Duration = Duration::from_secs(10);
const MIN_INTERVAL: Duration = Duration::from_secs(1);
const MAX_INTERVAL: Duration = Duration::from_secs(60);

const SAMPLE_CONFIG: &str = r#"[[inputs.self]]
  ## collect interval
  interval = "10s"

  ## only collect on the elected node
  election = false

  [inputs.self.tags]
  # some_tag = "some_value"
"#;

static START: LazyLock<Instant> = LazyLock::new(Instant::now);

pub(super) fn mark_start() {
    LazyLock::force(&START);
}

pub(super) fn create() -> Box<dyn Input> {
    Box::new(SelfInput::default())
}

/// Reports the agent's own running state.
pub struct SelfInput {
    interval: Duration,
    tags: TagMap,
    election: bool,
    switch: ElectionSwitch,
}

impl Default for SelfInput {
    fn default() -> Self {
        SelfInput {
            interval: DEFAULT_INTERVAL,
            tags: TagMap::default(),
            election: false,
            switch: ElectionSwitch::new(SELF_INPUT_NAME),
        }
    }
}

impl SelfInput {
    fn collect(
        &self,
        ctx: &InputContext,
        ts_millis: i64,
        log: Option<LogSnapshot>,
    ) -> Result<Vec<Point>, PointError> {
        let time = DateTime::from_timestamp_millis(ts_millis).unwrap_or_else(Utc::now);
        let tags = merge_tags_wrapper(&TagMap::default(), &ctx.global_tags(), &self.tags, "");
        let stats = ctx.stats();
        let registry = ctx.registry();

        let mut points = Vec::new();
        let pt = Point::builder("datakit")
            .tags(&tags)
            .tag("version", crate::build::VERSION)
            .tag("os", std::env::consts::OS)
            .tag("arch", std::env::consts::ARCH)
            .field("uptime", START.elapsed().as_secs())
            .field("num_inputs", registry.input_count())
            .field("total_feed_points", stats.total_points())
            .field("total_feed_errors", stats.total_errors())
            .time(time)
            .build()?;
        points.push(pt);

        for s in stats.snapshot() {
            let cost_ms = s.last_cost.map(|d| d.as_millis() as i64).unwrap_or(0);
            let pt = Point::builder("datakit_input")
                .tags(&tags)
                .tag("input", s.input.as_str())
                .field("feed_points", s.points)
                .field("feed_errors", s.errors)
                .field("last_feed_cost_ms", cost_ms)
                .field("panic", i64::from(registry.panic_count(&s.input)))
                .time(time)
                .build()?;
            points.push(pt);
        }

        if let Some(log) = log {
            let pt = Point::builder("datakit_log")
                .tags(&tags)
                .field("received", log.received)
                .field("written", log.written)
                .field("written_bytes", log.written_bytes)
                .field("dropped", log.dropped)
                .field("failed", log.failed)
                .time(time)
                .build()?;
            points.push(pt);
        }
        Ok(points)
    }

    fn collect_and_feed(&self, ctx: &InputContext, ts_millis: i64) {
        let start = Instant::now();
        match self.collect(ctx, ts_millis, crate::log::process_log_stats()) {
            Ok(points) => {
                let option = ctx.feed_option().with_collect_cost(start.elapsed());
                if let Err(e) = ctx.feeder().feed(Category::Metric, points, &option) {
                    warn!("input {}: feed failed: {e}", ctx.name());
                    ctx.feed_error(Category::Metric, e.to_string());
                }
            }
            Err(e) => {
                warn!("input {}: collect failed: {e}", ctx.name());
                ctx.feed_error(Category::Metric, e.to_string());
            }
        }
    }
}

#[async_trait]
impl Input for SelfInput {
    fn catalog(&self) -> &'static str {
        "host"
    }

    fn sample_config(&self) -> &'static str {
        SAMPLE_CONFIG
    }

    fn sample_measurements(&self) -> Vec<MeasurementInfo> {
        let gauge = |data_type, unit, desc| FieldInfo::new(data_type, FieldType::Gauge, unit, desc);
        let count = |desc| FieldInfo::new(DataType::Int, FieldType::Count, Unit::Count, desc);
        vec![
            MeasurementInfo::new("datakit", Category::Metric)
                .desc("Running state of the agent")
                .tag("host", "Hostname")
                .tag("version", "Agent version")
                .tag("os", "Operating system")
                .tag("arch", "CPU architecture")
                .field(
                    "uptime",
                    gauge(DataType::Int, Unit::DurationSecond, "Agent uptime"),
                )
                .field(
                    "num_inputs",
                    gauge(DataType::Int, Unit::Count, "Number of running input instances"),
                )
                .field("total_feed_points", count("Points fed by all inputs"))
                .field("total_feed_errors", count("Errors reported by all inputs")),
            MeasurementInfo::new("datakit_input", Category::Metric)
                .desc("Feed statistics of each input")
                .tag("host", "Hostname")
                .tag("input", "Input name")
                .field("feed_points", count("Points fed by the input"))
                .field("feed_errors", count("Errors reported by the input"))
                .field(
                    "last_feed_cost_ms",
                    gauge(DataType::Int, Unit::DurationMS, "Collect cost of the last feed"),
                )
                .field("panic", count("Crash times of the input")),
            MeasurementInfo::new("datakit_log", Category::Metric)
                .desc("Process logger statistics")
                .tag("host", "Hostname")
                .field("received", count("Log records received"))
                .field("written", count("Log records written"))
                .field(
                    "written_bytes",
                    FieldInfo::new(DataType::Int, FieldType::Count, Unit::SizeByte, "Bytes written"),
                )
                .field("dropped", count("Records dropped on a full or closed channel"))
                .field("failed", count("Records failed to format or write")),
        ]
    }

    fn singleton(&self) -> bool {
        true
    }

    fn load_config(&mut self, table: &toml::Table) -> anyhow::Result<()> {
        dk_toml::foreach_kv(table, |k, v| match dk_toml::key::normalize(k).as_str() {
            "interval" => {
                self.interval = dk_toml::humanize::as_duration(v)?;
                Ok(())
            }
            "tags" => {
                self.tags = dk_toml::value::as_tag_map(v)?;
                Ok(())
            }
            "election" => {
                self.election = dk_toml::value::as_bool(v)?;
                Ok(())
            }
            _ => Err(anyhow!("invalid key {k}")),
        })
    }

    fn election(&self) -> Option<&dyn ElectionInput> {
        if self.election {
            Some(&self.switch)
        } else {
            None
        }
    }

    async fn run(&self, ctx: InputContext) {
        let interval = ctx.protected_interval(MIN_INTERVAL, MAX_INTERVAL, self.interval);
        info!("input {} started, interval {interval:?}", ctx.name());

        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        let mut requests = self.switch.receiver().await;
        let mut paused = false;
        let mut last_millis = 0;

        loop {
            tokio::select! {
                biased;

                _ = ctx.wait_quit() => break,
                r = requests.recv() => {
                    let Some(pause) = r else {
                        break;
                    };
                    if pause != paused {
                        debug!("input {}: paused = {pause}", ctx.name());
                    }
                    paused = pause;
                }
                _ = ticker.tick() => {
                    if paused {
                        continue;
                    }
                    let now = Utc::now().timestamp_millis();
                    last_millis = align_time_millis(now, last_millis, interval.as_millis() as i64);
                    self.collect_and_feed(&ctx, last_millis);
                }
            }
        }
        info!("input {} exited", ctx.name());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use arc_swap::ArcSwap;

    use crate::config::GlobalTags;
    use crate::control::ExitSignal;
    use crate::feed::{ArcFeeder, MemoryFeeder, StatsFeeder};
    use crate::input::ptcheck::PointChecker;
    use crate::input::{InputInfo, InputRegistry};

    struct Fixture {
        memory: Arc<MemoryFeeder>,
        info: Arc<InputInfo>,
        ctx: InputContext,
        exit: ExitSignal,
    }

    fn fixture(conf: &str) -> Fixture {
        let memory = Arc::new(MemoryFeeder::default());
        let inner: ArcFeeder = memory.clone();
        let stats_feeder = StatsFeeder::new(inner);
        let stats = stats_feeder.stats();
        let registry = Arc::new(InputRegistry::default());

        let table = dk_toml::parse_str(conf).unwrap();
        let info = Arc::new(InputInfo::create(SELF_INPUT_NAME, create, table, None, None).unwrap());
        registry.add_input(Arc::clone(&info));

        let mut global = GlobalTags::default();
        global.host.insert("host", "node-1");
        global.election.insert("project", "p");

        let exit = ExitSignal::new();
        let ctx = InputContext::new(
            SELF_INPUT_NAME,
            Arc::new(stats_feeder),
            stats,
            registry,
            Arc::new(ArcSwap::from_pointee(global)),
            exit.clone(),
            info.stop_signal().clone(),
            info.input().election_enabled(),
            true,
        );
        Fixture {
            memory,
            info,
            ctx,
            exit,
        }
    }

    #[test]
    fn load_config() {
        let mut input = SelfInput::default();
        let table =
            dk_toml::parse_str("interval = \"30s\"\nelection = true\n[tags]\nzone = \"a\"").unwrap();
        input.load_config(&table).unwrap();
        assert_eq!(input.interval, Duration::from_secs(30));
        assert_eq!(input.tags.get("zone"), Some("a"));
        assert!(input.election_enabled());

        let table = dk_toml::parse_str("unknown = 1").unwrap();
        assert!(SelfInput::default().load_config(&table).is_err());
        assert!(!SelfInput::default().election_enabled());
    }

    #[tokio::test(start_paused = true)]
    async fn collect_points() {
        let f = fixture("interval = \"1s\"\n[tags]\nzone = \"a\"");
        let input = Arc::clone(f.info.input());
        let ctx = f.ctx.clone();
        let handle = tokio::spawn(async move { input.run(ctx).await });

        // the second round carries the feed stats of the first one
        assert!(f.memory.wait_points(3, Duration::from_secs(5)).await);
        f.exit.trigger();
        handle.await.unwrap();

        let docs = f.info.input().sample_measurements();
        let mut extra = TagMap::default();
        extra.insert("zone", "a");
        extra.insert("host", "node-1");
        for pt in f.memory.points() {
            let doc = docs.iter().find(|d| d.name == pt.name()).unwrap().clone();
            let checker = PointChecker::default()
                .with_doc(doc)
                .with_extra_tags(&extra);
            assert!(checker.check(&pt).is_empty(), "{:?}", checker.check(&pt));
        }

        let batch = &f.memory.batches()[0];
        assert_eq!(batch.category, Category::Metric);
        assert_eq!(batch.option.input(), SELF_INPUT_NAME);
        assert!(batch.option.collect_cost().is_some());
        assert!(!batch.option.election());

        let input_pt = f
            .memory
            .points()
            .into_iter()
            .find(|p| p.name() == "datakit_input")
            .unwrap();
        assert_eq!(input_pt.get_tag("input"), Some(SELF_INPUT_NAME));
    }

    #[test]
    fn log_stats_point() {
        let f = fixture("");
        let input = SelfInput::default();
        let log = LogSnapshot {
            received: 3,
            written: 2,
            written_bytes: 80,
            dropped: 1,
            failed: 0,
        };
        let points = input.collect(&f.ctx, 1_700_000_000_000, Some(log)).unwrap();
        let pt = points.iter().find(|p| p.name() == "datakit_log").unwrap();
        assert_eq!(pt.get_field("dropped"), Some(&1u64.into()));

        let doc = input
            .sample_measurements()
            .into_iter()
            .find(|d| d.name == "datakit_log")
            .unwrap();
        let mut extra = TagMap::default();
        extra.insert("host", "node-1");
        let checker = PointChecker::default().with_doc(doc).with_extra_tags(&extra);
        assert!(checker.check(pt).is_empty(), "{:?}", checker.check(pt));

        let points = input.collect(&f.ctx, 1_700_000_000_000, None).unwrap();
        assert!(points.iter().all(|p| p.name() != "datakit_log"));
    }

    #[tokio::test(start_paused = true)]
    async fn election_pause() {
        let f = fixture("interval = \"1s\"\nelection = true");
        assert!(f.ctx.election());
        let input = Arc::clone(f.info.input());
        let ctx = f.ctx.clone();
        let handle = tokio::spawn(async move { input.run(ctx).await });

        assert!(f.memory.wait_points(1, Duration::from_secs(5)).await);
        let pt = &f.memory.points()[0];
        assert_eq!(pt.get_tag("project"), Some("p"));
        assert_eq!(pt.get_tag("host"), None);

        let election = f.info.input().election().unwrap();
        election.pause().await.unwrap();
        tokio::time::sleep(Duration::from_millis(1500)).await;
        f.memory.clear();
        tokio::time::sleep(Duration::from_secs(5)).await;
        assert_eq!(f.memory.point_count(), 0);

        election.resume().await.unwrap();
        assert!(f.memory.wait_points(1, Duration::from_secs(5)).await);

        f.info.terminate();
        handle.await.unwrap();
    }
}

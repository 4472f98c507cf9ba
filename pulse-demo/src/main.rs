//! 事件注册表冒烟/性能测试程序
//!
//! 注册大量监听器后按不同批量反复触发同一事件，输出平均耗时，
//! 用于发现性能回退。仅作为普通调用方使用 `pulse-events` 的公开 API。
//!
use anyhow::Context;
use clap::Parser;
use pulse_events::{EventCollection, EventHandle, ProcessorConfig, listener_fn};
use rand::Rng;
use std::hint::black_box;
use std::time::{Duration, Instant};
use tracing::info;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug, Parser)]
#[command(name = "pulse-demo", about = "Smoke-test and time the in-process event registry")]
struct Args {
    /// 事件名
    #[arg(long, default_value = "my-event")]
    event: String,

    /// 注册的监听器数量
    #[arg(long, default_value_t = 1000)]
    listeners: i32,

    /// 每个批量的采样轮数
    #[arg(long, default_value_t = 100)]
    rounds: u32,

    /// 每轮触发次数，可多次指定或以逗号分隔
    #[arg(long, value_delimiter = ',', default_values_t = [1u32, 100, 500])]
    batches: Vec<u32>,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    let args = Args::parse();
    anyhow::ensure!(args.rounds > 0, "--rounds must be greater than zero");

    info!("starting registry benchmark");
    let events = EventCollection::<String>::with_config(
        ProcessorConfig::builder()
            .initial_capacity(args.listeners.max(0) as usize)
            .build(),
    );
    let handle = events.register_event::<i32, ()>(args.event.clone());
    let processor = events
        .processor(&handle)
        .with_context(|| format!("event {} was not registered", args.event))?;

    let started = Instant::now();
    for key in 0..args.listeners {
        processor.register_listener(key, listener_fn(|_: &()| busy_work()));
    }
    info!(
        listeners = args.listeners,
        elapsed_ms = started.elapsed().as_millis() as u64,
        "registered event listeners"
    );

    for &batch in &args.batches {
        let mean = sample_event(&events, &handle, batch, args.rounds)?;
        info!(
            batch,
            rounds = args.rounds,
            mean_ms = mean.as_secs_f64() * 1000.0,
            "fired event"
        );
    }

    Ok(())
}

/// 连续触发 `batch` 次为一轮，共 `rounds` 轮，返回每轮平均耗时
fn sample_event(
    events: &EventCollection<String>,
    handle: &EventHandle<String, i32, ()>,
    batch: u32,
    rounds: u32,
) -> anyhow::Result<Duration> {
    let mut total = Duration::ZERO;
    for _ in 0..rounds {
        let start = Instant::now();
        for _ in 0..batch {
            events
                .trigger_handle(handle, &())
                .with_context(|| format!("failed to trigger {}", handle.key()))?;
        }
        total += start.elapsed();
    }
    Ok(total / rounds)
}

fn busy_work() {
    let mut x: i32 = 10;
    x = x.wrapping_add(rand::thread_rng().r#gen::<i32>());
    x /= 10;
    black_box(x.wrapping_add(x));
}

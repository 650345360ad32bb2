//! Reference demo: a counter, its double, and an effect logging both.
//!
//! A one-second interval increments the counter. At 3.5 s the current
//! values are read directly; at 10.5 s the interval stops and the counter
//! is squared. The microtask queue is drained after every timer callback.
//!
//! Run with `cargo run --example counter`. Set `RUST_LOG=ripple_core=trace`
//! to watch notifications and re-runs, and `RIPPLE_CONFIG` to a JSON
//! runtime configuration to override the defaults.

use ripple_core::reactive::{configure, derived, effect, flush, get, signal};
use ripple_core::RuntimeConfig;
use serde_json::json;
use tokio::time::{interval_at, sleep, Duration, Instant};
use tracing_subscriber::EnvFilter;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    if let Ok(raw) = std::env::var("RIPPLE_CONFIG") {
        configure(RuntimeConfig::from_json(&raw)?);
    }

    let value = signal(5i64);
    let source = value.clone();
    let double = derived(move || get(&source) * 2);

    let (v, d) = (value.clone(), double.clone());
    effect(move || {
        println!("{}", json!({ "value": get(&v), "double": get(&d) }));
    });

    let start = Instant::now();
    let mut ticker = interval_at(start + Duration::from_secs(1), Duration::from_secs(1));
    let peek = sleep(Duration::from_millis(3_500));
    let finish = sleep(Duration::from_millis(10_500));
    tokio::pin!(peek, finish);
    let mut peeked = false;

    loop {
        tokio::select! {
            _ = &mut finish => {
                value.update(|x| x * x);
                flush()?;
                break;
            }
            _ = &mut peek, if !peeked => {
                peeked = true;
                println!(
                    "somewhere in the middle, just reading: {}",
                    json!({ "value": get(&value), "double": get(&double) })
                );
            }
            _ = ticker.tick() => {
                value.set(get(&value) + 1);
            }
        }
        flush()?;
    }

    tracing::info!(stats = %serde_json::to_string(&ripple_core::reactive::stats())?, "done");
    Ok(())
}

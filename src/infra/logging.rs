//! Tracing subscriber setup for the `suite-runner` binary.
//!
//! 为 `suite-runner` 二进制文件配置 tracing 订阅器。

use tracing::Level;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, fmt};

/// Installs the global subscriber, writing to stderr so reports on stdout
/// stay clean. `RUST_LOG` wins over `default_level`. Only the first call
/// takes effect.
pub fn init_tracing(default_level: Level) {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_level.as_str()));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .try_init()
        .ok();
}

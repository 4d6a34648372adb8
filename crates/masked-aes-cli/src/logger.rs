use tracing::{metadata::LevelFilter, Subscriber};
use tracing_subscriber::{
    prelude::__tracing_subscriber_SubscriberExt, registry::LookupSpan, util::SubscriberInitExt,
    EnvFilter, Layer,
};

/// Installs the stderr subscriber; `RUST_LOG` overrides `default_level`.
pub fn init(default_level: LevelFilter) {
    tracing_subscriber::registry()
        .with(stderr_layer(default_level))
        .init();
}

fn stderr_layer<S>(default_level: LevelFilter) -> impl Layer<S>
where
    S: Subscriber + for<'a> LookupSpan<'a>,
{
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_level.to_string()));

    tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .and_then(env_filter)
}

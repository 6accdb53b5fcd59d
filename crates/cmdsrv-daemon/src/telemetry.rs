// SPDX-License-Identifier: MIT OR Apache-2.0
use cmdsrv_config::{LogFormat, LoggingConfig};
use tracing_subscriber::EnvFilter;

/// Filter directive for the configured level. `debug` forces the `debug`
/// level regardless of configuration.
pub fn filter_directive(logging: &LoggingConfig, debug: bool) -> String {
    let level = if debug { "debug" } else { logging.level.as_str() };
    format!("cmdsrv={level}")
}

/// Install the global subscriber. `RUST_LOG`, when set, wins over the
/// configured level.
pub fn init_tracing(logging: &LoggingConfig, debug: bool) -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(filter_directive(logging, debug)));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);

    let installed = match logging.format {
        LogFormat::Full => builder.try_init(),
        LogFormat::Compact => builder.compact().try_init(),
        LogFormat::Json => builder.json().try_init(),
    };
    installed.map_err(|e| anyhow::anyhow!("install tracing subscriber: {e}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn directive_uses_configured_level() {
        let logging = LoggingConfig {
            level: "warn".into(),
            ..LoggingConfig::default()
        };
        assert_eq!(filter_directive(&logging, false), "cmdsrv=warn");
        assert_eq!(filter_directive(&logging, true), "cmdsrv=debug");
    }
}

use std::sync::atomic::{AtomicBool, Ordering};

use log::LevelFilter;

/// Logger configuration.
///
/// Filter precedence: `env_filter`, then `RUST_LOG`, then `default_level`
/// with `module_levels` applied on top.
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    /// `env_logger` filter directives, e.g. `"shader_art_uniforms=trace"`.
    pub env_filter: Option<String>,
    pub default_level: LevelFilter,
    /// Per-module caps used with `default_level`. wgpu logs adapter
    /// probing at info, which drowns out uniform traffic.
    pub module_levels: Vec<(&'static str, LevelFilter)>,
    pub write_style: env_logger::WriteStyle,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            env_filter: None,
            default_level: LevelFilter::Info,
            module_levels: vec![
                ("wgpu_core", LevelFilter::Warn),
                ("wgpu_hal", LevelFilter::Warn),
                ("naga", LevelFilter::Warn),
            ],
            write_style: env_logger::WriteStyle::Auto,
        }
    }
}

impl LoggingConfig {
    /// Same defaults at a different base level.
    pub fn with_level(level: LevelFilter) -> Self {
        Self { default_level: level, ..Self::default() }
    }

    fn builder(&self, rust_log: Option<&str>) -> env_logger::Builder {
        let mut builder = env_logger::Builder::new();
        match self.env_filter.as_deref().or(rust_log) {
            Some(filter) => {
                builder.parse_filters(filter);
            }
            None => {
                builder.filter_level(self.default_level);
                for &(module, level) in &self.module_levels {
                    builder.filter_module(module, level.min(self.default_level));
                }
            }
        }
        builder.write_style(self.write_style);
        builder
    }
}

static INSTALLED: AtomicBool = AtomicBool::new(false);

/// Installs the global logger. Returns `true` if this call installed it;
/// later calls, or a logger set elsewhere (a test harness), leave the
/// existing one in place.
pub fn init_logging(config: LoggingConfig) -> bool {
    if INSTALLED.swap(true, Ordering::AcqRel) {
        return false;
    }
    let rust_log = std::env::var("RUST_LOG").ok();
    let installed = config.builder(rust_log.as_deref()).try_init().is_ok();
    if installed {
        log::debug!("logging initialized at {}", config.default_level);
    }
    installed
}

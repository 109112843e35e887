/// Process-wide settings for the Lamina runtime.
#[derive(Debug, Clone)]
pub struct Config {
    pub profiling: ProfilingMode,
    /// Default `tracing` filter, used when `RUST_LOG` is not set.
    pub log_filter: String,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            profiling: ProfilingMode::Off,
            log_filter: crate::logging::DEFAULT_FILTER.to_owned(),
        }
    }
}

impl Config {
    pub fn with_profiling(mut self, profiling: ProfilingMode) -> Self {
        self.profiling = profiling;
        self
    }

    pub fn with_log_filter(mut self, filter: impl Into<String>) -> Self {
        self.log_filter = filter.into();
        self
    }

    /// Installs logging and profiling as described by this config.
    pub fn apply(&self) {
        crate::logging::init_with_filter(&self.log_filter);
        match self.profiling {
            ProfilingMode::Off => {}
            ProfilingMode::On => crate::profiling::enable_scopes(),
            #[cfg(feature = "profiling")]
            ProfilingMode::WithWebServer => {
                crate::profiling::init_profiling(crate::profiling::ProfilingBackend::PuffinHttp)
            }
            #[cfg(not(feature = "profiling"))]
            ProfilingMode::WithWebServer => {
                tracing::warn!("puffin_http support not compiled in, recording scopes only");
                crate::profiling::enable_scopes();
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProfilingMode {
    /// Profiling scopes are disabled
    Off,
    /// Scopes are recorded and can be read back through `puffin::GlobalProfiler`
    On,
    /// Scopes are recorded and served to 'puffin_viewer' over HTTP
    WithWebServer,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_builders() {
        let config = Config::default()
            .with_profiling(ProfilingMode::On)
            .with_log_filter("lamina_scene=trace");
        assert_eq!(config.profiling, ProfilingMode::On);
        assert_eq!(config.log_filter, "lamina_scene=trace");
    }

    #[test]
    fn test_default_is_quiet() {
        assert_eq!(Config::default().profiling, ProfilingMode::Off);
    }
}

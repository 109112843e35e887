use tracing_subscriber::EnvFilter;

pub const DEFAULT_FILTER: &str = "info,lamina_core=debug,lamina_input=debug,lamina_scene=debug";

/// Installs a global `fmt` subscriber with the default filter.
pub fn init() {
    init_with_filter(DEFAULT_FILTER);
}

/// Installs a global `fmt` subscriber. `RUST_LOG` takes precedence over
/// `filter` when set. Calling this twice is harmless.
pub fn init_with_filter(filter: &str) {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));
    if tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .try_init()
        .is_err()
    {
        tracing::debug!("tracing subscriber already installed");
    }
}

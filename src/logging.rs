// SPDX-License-Identifier: MPL-2.0

use crate::config::ENV_LOG;
use tracing_subscriber::EnvFilter;

const DEFAULT_FILTER: &str = "aianimals=info";

/// Install a global fmt subscriber filtered by `AIANIMALS_LOG`.
/// Later calls are no-ops, so embedding applications and tests can all call it.
pub fn init() {
    let env_filter = std::env::var(ENV_LOG)
        .map(EnvFilter::new)
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
    let subscriber = tracing_subscriber::FmtSubscriber::builder()
        .with_env_filter(env_filter)
        .finish();
    let _ = tracing::subscriber::set_global_default(subscriber);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_twice_is_harmless() {
        init();
        init();
        tracing::info!("logging initialized");
    }
}

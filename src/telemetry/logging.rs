use std::sync::OnceLock;
use tracing_subscriber::EnvFilter;

static INSTALLED: OnceLock<String> = OnceLock::new();

/// Installs the process-wide fmt subscriber. `RUST_LOG` wins over `filter`
/// when it parses. Later calls are no-ops.
pub fn init(filter: &str) -> Result<(), String> {
    if INSTALLED.get().is_some() {
        return Ok(());
    }
    let env_filter = match EnvFilter::try_from_default_env() {
        Ok(env_filter) => env_filter,
        Err(_) => build_filter(filter)?,
    };
    let directives = env_filter.to_string();
    match tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .try_init()
    {
        Ok(()) => {}
        // Global subscriber already set elsewhere.
        Err(err) => eprintln!("inventory: log subscriber not installed: {}", err),
    }
    let _ = INSTALLED.set(directives);
    Ok(())
}

/// Directives in effect once `init` has run.
pub fn active_filter() -> Option<&'static str> {
    INSTALLED.get().map(String::as_str)
}

fn build_filter(filter: &str) -> Result<EnvFilter, String> {
    EnvFilter::try_new(filter).map_err(|err| format!("invalid log filter '{}': {}", filter, err))
}

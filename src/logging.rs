//! Diagnostic logging setup for the command line tool

use tracing_subscriber::EnvFilter;

/// Filter used when `RUST_LOG` is not set
pub const DEFAULT_FILTER: &str = "casegraph=info";

fn filter(verbose: bool) -> EnvFilter {
    if verbose {
        return EnvFilter::new("casegraph=debug");
    }
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}

/// Install a stderr subscriber; a second call is a no-op
pub fn init(verbose: bool) {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter(verbose))
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn init_twice_does_not_panic() {
        init(false);
        init(true);
    }

    #[test]
    fn verbose_enables_debug() {
        assert_eq!(filter(true).to_string(), "casegraph=debug");
    }
}

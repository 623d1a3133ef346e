//! Log setup
//!
//! Logs go to stderr so stdout stays clean for readings and JSON.

use tracing_subscriber::EnvFilter;

/// Filter used when neither `--log` nor `RUST_LOG` is given
pub fn default_directive(verbose: u8) -> &'static str {
    match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    }
}

/// Build the filter: `--log` wins, then `RUST_LOG`, then the `-v` level
pub fn build_filter(explicit: Option<&str>, verbose: u8) -> EnvFilter {
    if let Some(directive) = explicit {
        return EnvFilter::new(directive);
    }
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive(verbose)))
}

/// Install the global subscriber
pub fn init(explicit: Option<&str>, verbose: u8) {
    if let Err(e) = tracing_subscriber::fmt()
        .with_env_filter(build_filter(explicit, verbose))
        .with_writer(std::io::stderr)
        .with_target(verbose > 0)
        .try_init()
    {
        eprintln!("[WARN] logging not initialised: {}", e);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verbosity_levels() {
        assert_eq!(default_directive(0), "info");
        assert_eq!(default_directive(1), "debug");
        assert_eq!(default_directive(5), "trace");
    }

    #[test]
    fn test_second_init_reports_instead_of_panicking() {
        init(Some("warn"), 0);
        init(Some("warn"), 0);
        tracing::warn!("still logging after a repeated init");
    }

    #[test]
    fn test_explicit_filter_wins() {
        let filter = build_filter(Some("sqmreader_core=trace"), 0);
        assert!(filter.to_string().starts_with("sqmreader_core="));
    }
}

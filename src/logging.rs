use crate::constants::TAG_NETWORK;
use std::borrow::Cow;

/// Initializes the logger with the `env_logger` crate.
///
/// Verbosity is controlled through `RUST_LOG`, e.g. `RUST_LOG=vmc_rs=debug`.
pub fn init_logger() {
    env_logger::init();
}

/// Initializes the logger with a fallback filter when `RUST_LOG` is unset.
///
/// Returns an error instead of panicking if a logger is already installed,
/// so test binaries and embedding hosts may call it more than once.
pub fn try_init_logger(default_filter: &str) -> Result<(), log::SetLoggerError> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .format_timestamp_millis()
        .try_init()
}

/// Returns a wire line safe to log. Network lines carry the Wi-Fi password
/// and are reduced to their tag.
pub fn redact_line(line: &str) -> Cow<'_, str> {
    let line = line.trim_end();
    if line.starts_with(TAG_NETWORK) && line.len() > TAG_NETWORK.len() + 1 {
        Cow::Owned(format!("{TAG_NETWORK} <redacted>"))
    } else {
        Cow::Borrowed(line)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_network_lines_redacted() {
        let line = format!("VMSL {:*<32}{:*<32}", "HomeNet", "hunter22");
        assert_eq!(redact_line(&line), "VMSL <redacted>");
        assert_eq!(redact_line("VMSL?\r\n"), "VMSL?");
        assert_eq!(redact_line("VMGH?\r\n"), "VMGH?");
    }

    #[test]
    fn test_try_init_twice() {
        let _ = try_init_logger("warn");
        assert!(try_init_logger("warn").is_err());
    }
}

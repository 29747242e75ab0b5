//! Override-toggle parsing for the two environment variables the core
//! recognizes (§6): one gates the system-prompt override, the other gates
//! exporting the built-in template. Both share the same value grammar.

use std::path::PathBuf;

/// Where the base template (or export target) should come from, per the
/// value of a gating environment variable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OverrideSource {
    /// `0` / `false` — override is off.
    Disabled,
    /// `1` / `true` — override is on, at the caller's default path.
    EnabledDefault,
    /// Any other value — an explicit path, already `~`-expanded.
    Explicit(PathBuf),
}

/// Parse one gating environment variable's raw value.
pub fn parse_toggle(raw: &str) -> OverrideSource {
    match raw.trim().to_ascii_lowercase().as_str() {
        "0" | "false" => OverrideSource::Disabled,
        "1" | "true" => OverrideSource::EnabledDefault,
        _ => OverrideSource::Explicit(expand_tilde(raw.trim())),
    }
}

/// Expand a leading `~` or `~/` to the user's home directory.
pub fn expand_tilde(raw: &str) -> PathBuf {
    if let Some(rest) = raw.strip_prefix("~/") {
        if let Some(home) = std::env::var_os("HOME") {
            return PathBuf::from(home).join(rest);
        }
    } else if raw == "~" {
        if let Some(home) = std::env::var_os("HOME") {
            return PathBuf::from(home);
        }
    }
    PathBuf::from(raw)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn disabled_values() {
        assert_eq!(parse_toggle("0"), OverrideSource::Disabled);
        assert_eq!(parse_toggle("false"), OverrideSource::Disabled);
        assert_eq!(parse_toggle("FALSE"), OverrideSource::Disabled);
    }

    #[test]
    fn enabled_default_values() {
        assert_eq!(parse_toggle("1"), OverrideSource::EnabledDefault);
        assert_eq!(parse_toggle("true"), OverrideSource::EnabledDefault);
        assert_eq!(parse_toggle("True"), OverrideSource::EnabledDefault);
    }

    #[test]
    fn anything_else_is_an_explicit_path() {
        assert_eq!(
            parse_toggle("/etc/relay/system.md"),
            OverrideSource::Explicit(PathBuf::from("/etc/relay/system.md"))
        );
    }

    #[test]
    fn tilde_expands_against_home() {
        // SAFETY: test runs single-threaded within this process; no other
        // test reads HOME concurrently.
        unsafe {
            std::env::set_var("HOME", "/home/tester");
        }
        assert_eq!(expand_tilde("~/prompts/system.md").to_str().unwrap(), "/home/tester/prompts/system.md");
        assert_eq!(expand_tilde("~").to_str().unwrap(), "/home/tester");
    }

    #[test]
    fn path_without_tilde_is_untouched() {
        assert_eq!(expand_tilde("/abs/path"), PathBuf::from("/abs/path"));
    }
}

// src/cli/colors.rs
use std::env;

/// Whether terminal output may use colour
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ColorSupport {
    Enabled,
    Disabled,
}

impl ColorSupport {
    /// Honours `NO_COLOR`, `FORCE_COLOR` and `TERM=dumb`, in that order.
    pub fn detect() -> Self {
        Self::from_vars(
            env::var("NO_COLOR").ok().as_deref(),
            env::var("FORCE_COLOR").ok().as_deref(),
            env::var("TERM").ok().as_deref(),
        )
    }

    fn from_vars(no_color: Option<&str>, force: Option<&str>, term: Option<&str>) -> Self {
        if no_color.is_some() {
            return Self::Disabled;
        }
        if let Some(force) = force {
            return if force == "0" { Self::Disabled } else { Self::Enabled };
        }
        if term == Some("dumb") {
            return Self::Disabled;
        }
        Self::Enabled
    }

    pub fn is_enabled(self) -> bool {
        matches!(self, Self::Enabled)
    }
}

/// ANSI escape codes
pub mod ansi {
    pub const RESET: &str = "\x1b[0m";
    pub const RED: &str = "\x1b[31m";
    pub const GREEN: &str = "\x1b[32m";
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detection_order() {
        assert_eq!(ColorSupport::from_vars(Some(""), Some("1"), None), ColorSupport::Disabled);
        assert_eq!(ColorSupport::from_vars(None, Some("0"), None), ColorSupport::Disabled);
        assert_eq!(ColorSupport::from_vars(None, Some("1"), Some("dumb")), ColorSupport::Enabled);
        assert_eq!(ColorSupport::from_vars(None, None, Some("dumb")), ColorSupport::Disabled);
        assert_eq!(ColorSupport::from_vars(None, None, Some("xterm")), ColorSupport::Enabled);
    }
}

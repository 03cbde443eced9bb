use std::io::{self, IsTerminal};

const RESET: &str = "\x1b[0m";

#[derive(Clone, Copy)]
pub struct Colors {
    pub error: &'static str,
    pub warning: &'static str,
    pub header: &'static str,
    pub key: &'static str,
    enabled: bool,
}

impl Colors {
    pub fn new(enabled: bool) -> Self {
        if enabled {
            Self {
                error: "\x1b[31m",   // Red
                warning: "\x1b[33m", // Yellow
                header: "\x1b[1;36m", // Bold cyan
                key: "\x1b[32m",     // Green
                enabled: true,
            }
        } else {
            Self {
                error: "",
                warning: "",
                header: "",
                key: "",
                enabled: false,
            }
        }
    }

    pub fn reset(&self) -> &'static str {
        if self.enabled {
            RESET
        } else {
            ""
        }
    }
}

pub fn should_use_colors(force_color: bool, no_color: bool) -> bool {
    // Priority: --no-color > --color > NO_COLOR env > TTY detection
    if no_color {
        return false;
    }
    if force_color {
        return true;
    }
    if std::env::var_os("NO_COLOR").is_some() {
        return false;
    }
    io::stdout().is_terminal()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_disabled_colors_are_empty() {
        let colors = Colors::new(false);
        assert_eq!(colors.header, "");
        assert_eq!(colors.reset(), "");
    }

    #[test]
    fn test_flags_take_priority() {
        assert!(!should_use_colors(true, true));
        assert!(should_use_colors(true, false));
    }
}

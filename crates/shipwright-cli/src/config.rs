//! CLI configuration via environment variables

use std::env;

/// CLI configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    /// Disable colored output (SHIPWRIGHT_NO_COLOR=1 or NO_COLOR=1)
    pub no_color: bool,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        Self {
            no_color: env::var("SHIPWRIGHT_NO_COLOR").is_ok() || env::var("NO_COLOR").is_ok(),
        }
    }

    /// Turn colors off globally when requested
    pub fn apply_color(&self) {
        if self.no_color {
            colored::control::set_override(false);
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_env()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    #[serial]
    fn test_no_color_from_env() {
        env::remove_var("SHIPWRIGHT_NO_COLOR");
        env::remove_var("NO_COLOR");
        assert!(!Config::from_env().no_color);

        env::set_var("NO_COLOR", "1");
        assert!(Config::from_env().no_color);
        env::remove_var("NO_COLOR");

        env::set_var("SHIPWRIGHT_NO_COLOR", "1");
        assert!(Config::from_env().no_color);
        env::remove_var("SHIPWRIGHT_NO_COLOR");
    }
}

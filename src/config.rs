//! Context configuration
//!
//! Options can come from code, from a serialized document (JSON, etc.), or
//! from the environment:
//!
//! ```bash
//! # Report every interpreted node
//! export RULEFLOW_LOGGING=1
//!
//! # Re-read children on every access
//! export RULEFLOW_CACHE=off
//! ```

use serde::{Deserialize, Serialize};

/// Recognized context options
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ContextConfig {
    /// Attach a trace logger that receives every statement event
    pub logging: bool,
    /// Reserved for verbose evaluator behavior; the context ignores it
    pub debug: bool,
    /// Memoize node children lookups
    pub cache: bool,
}

impl ContextConfig {
    /// Defaults overlaid with `RULEFLOW_LOGGING`, `RULEFLOW_DEBUG` and `RULEFLOW_CACHE`
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Some(flag) = env_flag("RULEFLOW_LOGGING") {
            config.logging = flag;
        }
        if let Some(flag) = env_flag("RULEFLOW_DEBUG") {
            config.debug = flag;
        }
        if let Some(flag) = env_flag("RULEFLOW_CACHE") {
            config.cache = flag;
        }
        config
    }

    pub fn with_logging(mut self, logging: bool) -> Self {
        self.logging = logging;
        self
    }

    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    pub fn with_cache(mut self, cache: bool) -> Self {
        self.cache = cache;
        self
    }
}

impl Default for ContextConfig {
    fn default() -> Self {
        Self {
            logging: false,
            debug: false,
            cache: true,
        }
    }
}

fn env_flag(key: &str) -> Option<bool> {
    std::env::var(key).ok().and_then(|raw| parse_flag(&raw))
}

/// Parse a boolean-ish flag; unrecognized values are ignored
fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

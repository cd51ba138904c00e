//! # Runtime Configuration Module
//!
//! Environment-based configuration for the coroutine runtime that serves wrapped
//! handlers.
//!
//! ## Environment Variables
//!
//! ### `AUTOJSON_STACK_SIZE`
//!
//! Stack size for request coroutines. Accepts values in:
//! - Decimal: `16384` (16 KB)
//! - Hexadecimal: `0x4000` (16 KB)
//!
//! Default: `0x4000` (16 KB). Unparseable values fall back to the default.
//!
//! Memory usage is roughly `stack_size × concurrent requests`; handlers that build
//! large responses on the stack need more.
//!
//! ## Usage
//!
//! ```rust
//! use autojson::runtime_config::RuntimeConfig;
//!
//! let config = RuntimeConfig::from_env();
//! println!("Stack size: {} bytes", config.stack_size);
//! ```

use std::env;

use tracing::info;

/// Default coroutine stack size (16 KB).
pub const DEFAULT_STACK_SIZE: usize = 0x4000;

/// Runtime configuration loaded from environment variables.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RuntimeConfig {
    /// Stack size for coroutines in bytes (default: 16 KB / 0x4000)
    pub stack_size: usize,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            stack_size: DEFAULT_STACK_SIZE,
        }
    }
}

impl RuntimeConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        let stack_size = env::var("AUTOJSON_STACK_SIZE")
            .ok()
            .and_then(|val| parse_stack_size(&val))
            .unwrap_or(DEFAULT_STACK_SIZE);
        RuntimeConfig { stack_size }
    }

    /// Apply to the global `may` runtime. Call before starting any server.
    pub fn apply(&self) {
        may::config().set_stack_size(self.stack_size);
        info!(stack_size = self.stack_size, "Configured coroutine stack size");
    }
}

/// Parse a decimal or `0x`-prefixed hexadecimal size.
pub fn parse_stack_size(val: &str) -> Option<usize> {
    let val = val.trim();
    match val.strip_prefix("0x").or_else(|| val.strip_prefix("0X")) {
        Some(hex) => usize::from_str_radix(hex, 16).ok(),
        None => val.parse().ok(),
    }
}

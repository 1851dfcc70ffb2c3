//! Logger initialisation
//! Copyright (c) 2025 Mohammad Atashi <mohammadaliatashi@icloud.com>

use env_logger::{Builder, Env};

/// Filter used when `RUST_LOG` is unset
pub const DEFAULT_FILTER: &str = "info";

/// Install the process logger, honouring `RUST_LOG`. Calling it again is
/// harmless; `false` means a logger was already installed.
pub fn init() -> bool {
    Builder::from_env(Env::default().default_filter_or(DEFAULT_FILTER))
        .format_timestamp_millis()
        .try_init()
        .is_ok()
}

// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

pub mod api;
pub mod category_sync;
pub mod cli;
pub mod commands;
pub mod config;
pub mod db;
pub mod error;
pub mod loaders;
pub mod models;
pub mod period;
pub mod session;
pub mod utils;
pub mod validate;

use std::sync::Once;

static INIT_TRACING: Once = Once::new();

/// Logs go to stderr so table and JSON output stay clean. `RUST_LOG` overrides the level.
pub fn init_tracing() {
    INIT_TRACING.call_once(|| {
        use tracing_subscriber::{fmt, EnvFilter};

        let mut filter = EnvFilter::from_default_env();
        if std::env::var_os("RUST_LOG").is_none() {
            if let Ok(directive) = "smartexpense=warn".parse() {
                filter = filter.add_directive(directive);
            }
        }
        let _ = fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .try_init();
    });
}

// -------------------------------------------------------------------------------------------------
//  Copyright (C) 2015-2025 Nautech Systems Pty Ltd. All rights reserved.
//  https://nautechsystems.io
//
//  Licensed under the GNU Lesser General Public License Version 3.0 (the "License");
//  You may not use this file except in compliance with the License.
//  You may obtain a copy of the License at https://www.gnu.org/licenses/lgpl-3.0.en.html
//
//  Unless required by applicable law or agreed to in writing, software
//  distributed under the License is distributed on an "AS IS" BASIS,
//  WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
//  See the License for the specific language governing permissions and
//  limitations under the License.
// -------------------------------------------------------------------------------------------------

//! Tracing subscriber initialization.

use std::env;

use tracing_subscriber::EnvFilter;

/// The environment variable read for the tracing filter directives.
pub const RUST_LOG: &str = "RUST_LOG";

/// Initialize tracing.
///
/// Tracing is meant to be used for library and network diagnostics. It is configured with
/// the standard `RUST_LOG` directives, e.g. `RUST_LOG=wazirx=debug,wazirx_network=trace`.
/// Nothing is installed when `RUST_LOG` is unset.
///
/// # Errors
///
/// Returns an error if a global subscriber has already been installed.
pub fn init_tracing() -> anyhow::Result<()> {
    if let Ok(v) = env::var(RUST_LOG) {
        let env_filter = EnvFilter::new(v.clone());

        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .try_init()
            .map_err(|e| anyhow::anyhow!("Failed to initialize tracing subscriber: {e}"))?;

        tracing::debug!("Initialized tracing logs with {RUST_LOG}={v}");
    }
    Ok(())
}

/// Initialize tracing with `default_directives` when `RUST_LOG` is unset.
///
/// # Errors
///
/// Returns an error if the directives cannot be parsed or a global subscriber
/// has already been installed.
pub fn init_tracing_with_default(default_directives: &str) -> anyhow::Result<()> {
    let env_filter = match env::var(RUST_LOG) {
        Ok(v) => EnvFilter::new(v),
        Err(_) => EnvFilter::try_new(default_directives)
            .map_err(|e| anyhow::anyhow!("Invalid tracing directives '{default_directives}': {e}"))?,
    };

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to initialize tracing subscriber: {e}"))
}

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

use wazirx::{WazirxHttpClient, WazirxHttpConfig};
use wazirx_core::logging::init_tracing_with_default;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing_with_default("debug")?;

    let client = WazirxHttpClient::new(&WazirxHttpConfig::default())?;

    // Request a single ticker
    match client.get_ticker("btcinr", None).await {
        Ok(resp) => tracing::debug!("{resp:?}"),
        Err(e) => tracing::error!("{e:?}"),
    }

    // Second request within the cache lifetime is served locally
    match client.get_ticker("btcinr", None).await {
        Ok(resp) => tracing::debug!("cached: {resp:?}"),
        Err(e) => tracing::error!("{e:?}"),
    }

    // Request every ticker, retrying short rate-limit waits
    match client.get_tickers(Some(3)).await {
        Ok(resp) => tracing::debug!("Received {} tickers", resp.len()),
        Err(e) => tracing::error!("{e:?}"),
    }

    Ok(())
}

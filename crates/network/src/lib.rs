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

//! Network machinery for the WazirX trading API client.
//!
//! The `wazirx-network` crate provides:
//!
//! - [`http`]: the [`http::HttpTransport`] seam and a `reqwest` backed client.
//! - [`ratelimiter`]: fixed-window admission control and ban tracking over a shared store.
//! - [`cache`]: short-lived response caches (in-memory, or Redis with the `redis` feature).
//! - [`ttl`]: the expiring concurrent map underpinning the in-memory stores.
//!
//! # Feature flags
//!
//! - `redis`: Enables the Redis backed [`cache::ResponseCache`].

#![warn(rustc::all)]
#![deny(unsafe_code)]
#![deny(nonstandard_style)]
#![deny(missing_debug_implementations)]
#![deny(clippy::missing_errors_doc)]
#![deny(clippy::missing_panics_doc)]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod cache;
pub mod http;
pub mod ratelimiter;
pub mod ttl;

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

//! A rate-limit aware client for the [WazirX](https://wazirx.com) private trading API.
//!
//! The `wazirx` crate signs requests with HMAC-SHA256 over a canonical sorted-key encoding,
//! enforces per-endpoint request limits and exchange-issued bans through a shared TTL store,
//! and retries transient failures within a caller-supplied budget.
//!
//! # Feature flags
//!
//! - `redis`: Enables the Redis backed response cache from `wazirx-network`.

#![warn(rustc::all)]
#![deny(unsafe_code)]
#![deny(nonstandard_style)]
#![deny(missing_debug_implementations)]
#![deny(clippy::missing_errors_doc)]
#![deny(clippy::missing_panics_doc)]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod common;
pub mod config;
pub mod http;

pub use crate::{
    common::{
        credential::Credential,
        enums::{WazirxOrderSide, WazirxOrderStatus, WazirxOrderType},
    },
    config::WazirxHttpConfig,
    http::{
        client::{WazirxHttpClient, WazirxHttpInnerClient},
        error::{WazirxErrorKind, WazirxHttpError},
        request::RequestSpec,
    },
};

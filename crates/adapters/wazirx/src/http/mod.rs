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

//! HTTP/REST client implementation for the WazirX API.
//!
//! - [`request`]: request descriptions and their canonical signed encoding.
//! - [`client`]: dispatch with admission control, optional retry, and endpoint wrappers.
//! - [`error`]: the typed error taxonomy and raw failure classification.
//! - [`models`]: response payloads.

pub mod client;
pub mod error;
pub mod models;
pub mod request;

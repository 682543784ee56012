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

//! HMAC-SHA256 request signatures rendered as lowercase hex.

use aws_lc_rs::hmac;

/// Generates an HMAC-SHA256 signature for the given data using the provided secret.
///
/// The resulting tag is returned as a lowercase hexadecimal string.
#[must_use]
pub fn hmac_signature(secret: &[u8], data: &str) -> String {
    let key = hmac::Key::new(hmac::HMAC_SHA256, secret);
    let tag = hmac::sign(&key, data.as_bytes());
    hex::encode(tag.as_ref())
}

/// Verifies a lowercase hexadecimal HMAC-SHA256 `signature` of `data` in constant time.
#[must_use]
pub fn verify_hmac_signature(secret: &[u8], data: &str, signature: &str) -> bool {
    let Ok(tag) = hex::decode(signature) else {
        return false;
    };
    let key = hmac::Key::new(hmac::HMAC_SHA256, secret);
    hmac::verify(&key, data.as_bytes(), &tag).is_ok()
}

////////////////////////////////////////////////////////////////////////////////
// Tests
////////////////////////////////////////////////////////////////////////////////

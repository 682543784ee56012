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

//! Canonical request encoding used as the input to request signatures.
//!
//! The canonical string is the `key=value` pairs of a parameter mapping, ordered by ascending
//! key and joined with `&`. Keys and values are percent-encoded individually, so the canonical
//! string is also a valid `application/x-www-form-urlencoded` payload and can be sent on the
//! wire exactly as it was signed.

use crate::signing::hmac_signature;

/// The name of the field carrying the request signature.
pub const SIGNATURE_FIELD: &str = "signature";

/// A canonical payload together with its HMAC-SHA256 signature.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SignedPayload {
    /// The canonical sorted-key encoding that was signed.
    pub canonical: String,
    /// The lowercase hex HMAC-SHA256 of `canonical`.
    pub signature: String,
}

impl SignedPayload {
    /// Returns the wire payload: the canonical string followed by the `signature` field.
    #[must_use]
    pub fn to_query(&self) -> String {
        if self.canonical.is_empty() {
            format!("{SIGNATURE_FIELD}={}", self.signature)
        } else {
            format!("{}&{SIGNATURE_FIELD}={}", self.canonical, self.signature)
        }
    }
}

/// Builds the canonical encoding of `pairs`.
///
/// Pairs are sorted by key (then by value, for repeated keys) so the result does not depend
/// on the order in which the mapping was constructed.
#[must_use]
pub fn canonical_query<'a, I>(pairs: I) -> String
where
    I: IntoIterator<Item = (&'a str, &'a str)>,
{
    let mut pairs: Vec<(&str, &str)> = pairs.into_iter().collect();
    pairs.sort_unstable();

    let mut out = String::new();
    for (key, value) in pairs {
        if !out.is_empty() {
            out.push('&');
        }
        out.push_str(&urlencoding::encode(key));
        out.push('=');
        out.push_str(&urlencoding::encode(value));
    }
    out
}

/// Canonicalizes `pairs` and signs the result with `secret`.
#[must_use]
pub fn sign_canonical<'a, I>(secret: &[u8], pairs: I) -> SignedPayload
where
    I: IntoIterator<Item = (&'a str, &'a str)>,
{
    let canonical = canonical_query(pairs);
    let signature = hmac_signature(secret, &canonical);
    SignedPayload {
        canonical,
        signature,
    }
}

////////////////////////////////////////////////////////////////////////////////
// Tests
////////////////////////////////////////////////////////////////////////////////

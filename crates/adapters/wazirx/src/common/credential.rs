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

//! WazirX API credential storage and signing helpers.

#![allow(unused_assignments)] // Fields are used in methods, false positive from nightly

use std::fmt::Debug;

use ustr::Ustr;
use wazirx_cryptography::{SignedPayload, sign_canonical};
use zeroize::ZeroizeOnDrop;

/// API credentials required for signing WazirX REST requests.
#[derive(Clone, ZeroizeOnDrop)]
pub struct Credential {
    #[zeroize(skip)]
    api_key: Ustr,
    api_secret: Box<[u8]>,
}

impl Debug for Credential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct(stringify!(Credential))
            .field("api_key", &self.api_key)
            .field("api_secret", &"<redacted>")
            .finish()
    }
}

impl Credential {
    /// Creates a new [`Credential`] instance from the API key and secret.
    #[must_use]
    pub fn new(api_key: impl Into<String>, api_secret: impl Into<String>) -> Self {
        let api_key = Ustr::from(api_key.into().as_str());
        let api_secret = api_secret.into().into_bytes().into_boxed_slice();

        Self {
            api_key,
            api_secret,
        }
    }

    /// Returns the API key associated with this credential.
    #[must_use]
    pub fn api_key(&self) -> &Ustr {
        &self.api_key
    }

    /// Signs the canonical sorted-key encoding of `pairs`.
    ///
    /// The returned canonical string is exactly what must be sent on the wire, followed by
    /// the `signature` field.
    #[must_use]
    pub fn sign<'a, I>(&self, pairs: I) -> SignedPayload
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        sign_canonical(&self.api_secret, pairs)
    }
}

////////////////////////////////////////////////////////////////////////////////
// Tests
////////////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    fn test_sign_matches_reference() {
        let credential = Credential::new("test_api_key", "mysecretkey");
        let signed = credential.sign([("b", "2"), ("a", "1")]);

        assert_eq!(signed.canonical, "a=1&b=2");
        assert_eq!(
            signed.signature,
            wazirx_cryptography::hmac_signature(b"mysecretkey", "a=1&b=2")
        );
    }

    #[rstest]
    fn test_debug_redacts_secret() {
        let credential = Credential::new("key", "top-secret");
        let debug = format!("{credential:?}");

        assert!(debug.contains("key"));
        assert!(debug.contains("<redacted>"));
        assert!(!debug.contains("top-secret"));
    }
}

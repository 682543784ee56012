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

//! Environment variable helpers.

/// Returns the environment variable for the given `key`.
///
/// # Errors
///
/// Returns an error if the environment variable is not set.
pub fn get_env_var(key: &str) -> anyhow::Result<String> {
    match std::env::var(key) {
        Ok(var) => Ok(var),
        Err(_) => anyhow::bail!("environment variable '{key}' must be set"),
    }
}

/// Returns `value` if provided, otherwise falls back to the environment variable `key`.
///
/// # Errors
///
/// Returns an error if `value` is `None` and the environment variable is not set.
pub fn get_or_env_var(value: Option<String>, key: &str) -> anyhow::Result<String> {
    match value {
        Some(v) => Ok(v),
        None => get_env_var(key),
    }
}

/// Loads variables from a `.env` file in the current directory (or its parents), if one exists.
///
/// Variables already present in the process environment are not overridden.
pub fn load_dotenv() {
    match dotenvy::dotenv() {
        Ok(path) => tracing::debug!("Loaded environment from {}", path.display()),
        Err(e) if e.not_found() => {}
        Err(e) => tracing::warn!("Failed to load .env file: {e}"),
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
    fn test_get_env_var_missing() {
        let result = get_env_var("WAZIRX_TEST_SURELY_UNSET_VARIABLE");
        assert!(result.is_err());
        assert!(
            result
                .unwrap_err()
                .to_string()
                .contains("WAZIRX_TEST_SURELY_UNSET_VARIABLE")
        );
    }

    #[rstest]
    fn test_get_env_var_present() {
        // PATH is set in every test environment we run in
        assert!(get_env_var("PATH").is_ok());
    }

    #[rstest]
    fn test_get_or_env_var_prefers_value() {
        let result = get_or_env_var(
            Some("explicit".to_string()),
            "WAZIRX_TEST_SURELY_UNSET_VARIABLE",
        )
        .unwrap();
        assert_eq!(result, "explicit");
    }

    #[rstest]
    fn test_get_or_env_var_falls_back_to_env() {
        assert!(get_or_env_var(None, "WAZIRX_TEST_SURELY_UNSET_VARIABLE").is_err());
    }
}

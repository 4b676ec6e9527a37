//! Repository credentials
//!
//! Two layers:
//! - [`Credentials`] is what gets configured. It may defer to environment
//!   variables, so it is only meaningful on the machine doing the setup.
//! - [`ResolvedCredentials`] is the snapshot taken from it: plain values that
//!   can be serialized, cloned into publishers, and attached to a request.

use base64::Engine;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{RepoError, Result};

/// Configured credentials
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum Credentials {
    /// Basic authentication (username/password)
    Basic { username: String, password: String },

    /// Bearer token authentication
    Bearer { token: String },

    /// Username/password read from environment variables (CI/CD friendly)
    Env {
        username_var: String,
        password_var: String,
    },

    /// Bearer token read from an environment variable
    TokenEnv { token_var: String },
}

impl Credentials {
    /// Create basic auth credentials
    pub fn basic(username: impl Into<String>, password: impl Into<String>) -> Self {
        Credentials::Basic {
            username: username.into(),
            password: password.into(),
        }
    }

    /// Create bearer token credentials
    pub fn bearer(token: impl Into<String>) -> Self {
        Credentials::Bearer {
            token: token.into(),
        }
    }

    /// Create environment variable credentials
    pub fn from_env(username_var: impl Into<String>, password_var: impl Into<String>) -> Self {
        Credentials::Env {
            username_var: username_var.into(),
            password_var: password_var.into(),
        }
    }

    /// Create a bearer token read from an environment variable
    pub fn token_from_env(token_var: impl Into<String>) -> Self {
        Credentials::TokenEnv {
            token_var: token_var.into(),
        }
    }

    /// Resolve credentials to actual values
    pub fn resolve(&self) -> Result<ResolvedCredentials> {
        match self {
            Credentials::Basic { username, password } => Ok(ResolvedCredentials::Basic {
                username: username.clone(),
                password: password.clone(),
            }),
            Credentials::Bearer { token } => Ok(ResolvedCredentials::Bearer {
                token: token.clone(),
            }),
            Credentials::Env {
                username_var,
                password_var,
            } => {
                let username = read_env(username_var)?;
                let password = read_env(password_var)?;
                Ok(ResolvedCredentials::Basic { username, password })
            }
            Credentials::TokenEnv { token_var } => Ok(ResolvedCredentials::Bearer {
                token: read_env(token_var)?,
            }),
        }
    }
}

fn read_env(var: &str) -> Result<String> {
    std::env::var(var).map_err(|_| RepoError::AuthFailed {
        message: format!("Environment variable {} not set", var),
    })
}

/// Resolved credentials ready for use
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ResolvedCredentials {
    Basic { username: String, password: String },
    Bearer { token: String },
}

impl ResolvedCredentials {
    /// `Authorization` header value
    pub fn auth_header(&self) -> String {
        match self {
            ResolvedCredentials::Basic { username, password } => {
                let encoded = base64::engine::general_purpose::STANDARD
                    .encode(format!("{}:{}", username, password));
                format!("Basic {}", encoded)
            }
            ResolvedCredentials::Bearer { token } => format!("Bearer {}", token),
        }
    }
}

// Secrets stay out of logs and panic messages
impl fmt::Debug for ResolvedCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResolvedCredentials::Basic { username, .. } => f
                .debug_struct("Basic")
                .field("username", username)
                .field("password", &"<redacted>")
                .finish(),
            ResolvedCredentials::Bearer { .. } => f
                .debug_struct("Bearer")
                .field("token", &"<redacted>")
                .finish(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_credentials_resolve() {
        let basic = Credentials::basic("user", "pass");
        let resolved = basic.resolve().unwrap();

        match resolved {
            ResolvedCredentials::Basic { username, password } => {
                assert_eq!(username, "user");
                assert_eq!(password, "pass");
            }
            _ => panic!("Expected Basic credentials"),
        }
    }

    #[test]
    fn test_env_credentials() {
        // SAFETY: the variable names are unique to this test
        unsafe {
            std::env::set_var("CHARTPUSH_TEST_USER_VAR", "testuser");
            std::env::set_var("CHARTPUSH_TEST_PASS_VAR", "testpass");
        }

        let env_creds = Credentials::from_env("CHARTPUSH_TEST_USER_VAR", "CHARTPUSH_TEST_PASS_VAR");
        let resolved = env_creds.resolve().unwrap();
        assert_eq!(
            resolved,
            ResolvedCredentials::Basic {
                username: "testuser".to_string(),
                password: "testpass".to_string(),
            }
        );

        // SAFETY: see above
        unsafe {
            std::env::remove_var("CHARTPUSH_TEST_USER_VAR");
            std::env::remove_var("CHARTPUSH_TEST_PASS_VAR");
        }
    }

    #[test]
    fn test_missing_env_var() {
        let creds = Credentials::token_from_env("CHARTPUSH_TEST_DEFINITELY_UNSET");
        let err = creds.resolve().unwrap_err();
        assert!(matches!(err, RepoError::AuthFailed { .. }));
    }

    #[test]
    fn test_auth_header() {
        let basic = ResolvedCredentials::Basic {
            username: "user".to_string(),
            password: "pass".to_string(),
        };
        assert_eq!(basic.auth_header(), "Basic dXNlcjpwYXNz");

        let bearer = ResolvedCredentials::Bearer {
            token: "abc".to_string(),
        };
        assert_eq!(bearer.auth_header(), "Bearer abc");
    }

    #[test]
    fn test_debug_redacts_secrets() {
        let basic = ResolvedCredentials::Basic {
            username: "user".to_string(),
            password: "hunter2".to_string(),
        };
        let out = format!("{:?}", basic);
        assert!(out.contains("user"));
        assert!(!out.contains("hunter2"));
    }

    #[test]
    fn test_credentials_yaml_format() {
        let yaml = "type: env\nusernameVar: CM_USER\npasswordVar: CM_PASS\n";
        let creds: Credentials = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(creds, Credentials::from_env("CM_USER", "CM_PASS"));

        let yaml = "type: tokenEnv\ntokenVar: CM_TOKEN\n";
        let creds: Credentials = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(creds, Credentials::token_from_env("CM_TOKEN"));
    }
}

//! Authentication primitives: sign-in credentials, hosted session tokens, and
//! the caller identity passed to driven ports.
//!
//! Keep inbound payload parsing outside the domain by exposing constructors
//! that validate string inputs before a handler talks to a service.

use std::fmt;

use zeroize::Zeroizing;

use crate::domain::{AuthUser, UserId};

/// Domain error returned when sign-in payload values are invalid.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SignInValidationError {
    /// Email was missing or blank once trimmed.
    #[error("email must not be empty")]
    EmptyEmail,
    /// Password was blank.
    #[error("password must not be empty")]
    EmptyPassword,
}

/// Validated sign-in credentials forwarded to the hosted authentication
/// service.
///
/// ## Invariants
/// - `email` is trimmed and must not be empty after trimming.
/// - `password` must be non-empty but retains caller-provided whitespace.
///
/// # Examples
/// ```
/// use blog_backend::domain::SignInCredentials;
///
/// let creds = SignInCredentials::try_from_parts(" ada@example.com ", "pw").unwrap();
/// assert_eq!(creds.email(), "ada@example.com");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignInCredentials {
    email: String,
    password: Zeroizing<String>,
}

impl SignInCredentials {
    /// Construct credentials from raw email/password inputs.
    pub fn try_from_parts(email: &str, password: &str) -> Result<Self, SignInValidationError> {
        let normalized = email.trim();
        if normalized.is_empty() {
            return Err(SignInValidationError::EmptyEmail);
        }

        if password.is_empty() {
            return Err(SignInValidationError::EmptyPassword);
        }

        Ok(Self {
            email: normalized.to_owned(),
            password: Zeroizing::new(password.to_owned()),
        })
    }

    /// Account email.
    pub fn email(&self) -> &str {
        self.email.as_str()
    }

    /// Password string provided by the caller.
    pub fn password(&self) -> &str {
        self.password.as_str()
    }
}

macro_rules! secret_token {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, PartialEq, Eq)]
        pub struct $name(Zeroizing<String>);

        impl $name {
            /// Wrap a raw token string.
            pub fn new(raw: impl Into<String>) -> Self {
                Self(Zeroizing::new(raw.into()))
            }

            /// Expose the raw token for outbound requests.
            pub fn expose(&self) -> &str {
                self.0.as_str()
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(concat!(stringify!($name), "(<redacted>)"))
            }
        }
    };
}

secret_token! {
    /// Bearer token issued by the hosted authentication service.
    AccessToken
}

secret_token! {
    /// Long-lived token used to mint a fresh [`AccessToken`].
    RefreshToken
}

/// Tokens and account returned by a successful sign-in or refresh.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthSession {
    /// Bearer token for row-level access.
    pub access_token: AccessToken,
    /// Token used by [`crate::domain::SessionService::refresh`].
    pub refresh_token: RefreshToken,
    /// Account the tokens belong to.
    pub user: AuthUser,
}

/// Identity a driven port acts on behalf of.
///
/// The hosted backend enforces row-level access using the bearer token, so
/// adapters forward the user's token when one is available and fall back to
/// the public key otherwise.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Caller {
    /// No session; requests run with the public key only.
    Anonymous,
    /// A signed-in user.
    User {
        /// Authentication subject.
        user_id: UserId,
        /// Bearer token forwarded to the hosted backend.
        access_token: AccessToken,
    },
}

impl Caller {
    /// Build a signed-in caller.
    pub fn user(user_id: UserId, access_token: AccessToken) -> Self {
        Self::User {
            user_id,
            access_token,
        }
    }

    /// The caller's user id, if signed in.
    pub fn user_id(&self) -> Option<&UserId> {
        match self {
            Self::Anonymous => None,
            Self::User { user_id, .. } => Some(user_id),
        }
    }

    /// The caller's bearer token, if signed in.
    pub fn access_token(&self) -> Option<&AccessToken> {
        match self {
            Self::Anonymous => None,
            Self::User { access_token, .. } => Some(access_token),
        }
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("", "pw", SignInValidationError::EmptyEmail)]
    #[case("   ", "pw", SignInValidationError::EmptyEmail)]
    #[case("ada@example.com", "", SignInValidationError::EmptyPassword)]
    fn invalid_credentials(
        #[case] email: &str,
        #[case] password: &str,
        #[case] expected: SignInValidationError,
    ) {
        let err = SignInCredentials::try_from_parts(email, password)
            .expect_err("invalid inputs must fail");
        assert_eq!(err, expected);
    }

    #[rstest]
    #[case("  ada@example.com  ", "secret")]
    #[case("grace@example.com", " leading space ")]
    fn valid_credentials_trim_email_only(#[case] email: &str, #[case] password: &str) {
        let creds = SignInCredentials::try_from_parts(email, password)
            .expect("valid inputs should succeed");
        assert_eq!(creds.email(), email.trim());
        assert_eq!(creds.password(), password);
    }

    #[rstest]
    fn tokens_are_redacted_in_debug_output() {
        let token = AccessToken::new("eyJhbGciOi.secret");
        assert_eq!(format!("{token:?}"), "AccessToken(<redacted>)");
        assert_eq!(token.expose(), "eyJhbGciOi.secret");
    }

    #[rstest]
    fn anonymous_caller_has_no_identity() {
        assert!(Caller::Anonymous.user_id().is_none());
        assert!(Caller::Anonymous.access_token().is_none());
    }
}

//! Authentication inputs: login credentials, self-service registration, and
//! password changes.
//!
//! Inbound adapters hand raw strings to these constructors so that handlers
//! never reach a service with unvalidated payloads.

use zeroize::Zeroizing;

use super::{DisplayName, EmailAddress, Role, UserValidationError, normalise_department};

/// Minimum accepted length for a new password.
pub const PASSWORD_MIN: usize = 8;
/// Maximum accepted length for a new password.
pub const PASSWORD_MAX: usize = 128;

fn password_length_ok(password: &str) -> bool {
    (PASSWORD_MIN..=PASSWORD_MAX).contains(&password.chars().count())
}

/// Domain error returned when login payload values are invalid.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LoginValidationError {
    /// Email was missing or blank once trimmed.
    #[error("email must not be empty")]
    EmptyEmail,
    /// Password was blank.
    #[error("password must not be empty")]
    EmptyPassword,
}

/// Validated login credentials used by the account service.
///
/// ## Invariants
/// - `email` is trimmed and must not be empty after trimming. It is not
///   checked for shape here so that a malformed identifier fails exactly like
///   an unknown one.
/// - `password` is non-empty and keeps caller-provided whitespace.
///
/// # Examples
/// ```
/// use lostfound::domain::LoginCredentials;
///
/// let creds = LoginCredentials::try_from_parts(" alice@x.com ", "hunter22").unwrap();
/// assert_eq!(creds.email(), "alice@x.com");
/// assert_eq!(creds.password(), "hunter22");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginCredentials {
    email: String,
    password: Zeroizing<String>,
}

impl LoginCredentials {
    /// Construct credentials from raw email/password inputs.
    pub fn try_from_parts(email: &str, password: &str) -> Result<Self, LoginValidationError> {
        let normalized = email.trim();
        if normalized.is_empty() {
            return Err(LoginValidationError::EmptyEmail);
        }

        if password.is_empty() {
            return Err(LoginValidationError::EmptyPassword);
        }

        Ok(Self {
            email: normalized.to_owned(),
            password: Zeroizing::new(password.to_owned()),
        })
    }

    /// Email string as supplied, trimmed.
    pub fn email(&self) -> &str {
        self.email.as_str()
    }

    /// Password string provided by the caller.
    pub fn password(&self) -> &str {
        self.password.as_str()
    }
}

/// Errors raised while validating a registration payload.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RegistrationValidationError {
    #[error(transparent)]
    Field(#[from] UserValidationError),
    #[error("password must be between {min} and {max} characters")]
    PasswordLength { min: usize, max: usize },
}

/// Validated self-service registration.
///
/// Self-registration never grants administrator rights; a requested `ADMIN`
/// role is downgraded to `USER` by the account service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Registration {
    display_name: DisplayName,
    email: EmailAddress,
    password: Zeroizing<String>,
    department: Option<String>,
    requested_role: Option<Role>,
}

impl Registration {
    /// Validate raw registration fields.
    pub fn try_from_parts(
        name: &str,
        email: &str,
        password: &str,
        department: Option<&str>,
        requested_role: Option<Role>,
    ) -> Result<Self, RegistrationValidationError> {
        if !password_length_ok(password) {
            return Err(RegistrationValidationError::PasswordLength {
                min: PASSWORD_MIN,
                max: PASSWORD_MAX,
            });
        }
        Ok(Self {
            display_name: DisplayName::new(name)?,
            email: EmailAddress::new(email)?,
            password: Zeroizing::new(password.to_owned()),
            department: normalise_department(department)?,
            requested_role,
        })
    }

    pub fn display_name(&self) -> &DisplayName {
        &self.display_name
    }

    pub fn email(&self) -> &EmailAddress {
        &self.email
    }

    pub fn password(&self) -> &str {
        self.password.as_str()
    }

    pub fn department(&self) -> Option<&str> {
        self.department.as_deref()
    }

    /// Role granted to the new account.
    pub fn granted_role(&self) -> Role {
        match self.requested_role {
            Some(Role::Staff) => Role::Staff,
            Some(Role::User | Role::Admin) | None => Role::User,
        }
    }
}

/// Errors raised while validating a password change.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PasswordChangeValidationError {
    #[error("password must be between {min} and {max} characters")]
    PasswordLength { min: usize, max: usize },
}

/// Validated password change.
///
/// `current` is what the account holder believes their password to be. It is
/// checked when users change their own password and ignored when a user
/// manager resets someone else's.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PasswordChange {
    current: Option<Zeroizing<String>>,
    replacement: Zeroizing<String>,
}

impl PasswordChange {
    pub fn try_from_parts(
        current: Option<&str>,
        replacement: &str,
    ) -> Result<Self, PasswordChangeValidationError> {
        if !password_length_ok(replacement) {
            return Err(PasswordChangeValidationError::PasswordLength {
                min: PASSWORD_MIN,
                max: PASSWORD_MAX,
            });
        }
        Ok(Self {
            current: current.map(|value| Zeroizing::new(value.to_owned())),
            replacement: Zeroizing::new(replacement.to_owned()),
        })
    }

    pub fn current(&self) -> Option<&str> {
        self.current.as_deref().map(String::as_str)
    }

    pub fn replacement(&self) -> &str {
        self.replacement.as_str()
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("", "pw", LoginValidationError::EmptyEmail)]
    #[case("   ", "pw", LoginValidationError::EmptyEmail)]
    #[case("alice@x.com", "", LoginValidationError::EmptyPassword)]
    fn invalid_credentials(
        #[case] email: &str,
        #[case] password: &str,
        #[case] expected: LoginValidationError,
    ) {
        let err = LoginCredentials::try_from_parts(email, password)
            .expect_err("invalid inputs must fail");
        assert_eq!(err, expected);
    }

    #[rstest]
    #[case("  alice@x.com  ", "secret")]
    #[case("bob@x.com", " spaced password ")]
    fn valid_credentials_trim_email(#[case] email: &str, #[case] password: &str) {
        let creds =
            LoginCredentials::try_from_parts(email, password).expect("valid inputs should succeed");
        assert_eq!(creds.email(), email.trim());
        assert_eq!(creds.password(), password);
    }

    #[rstest]
    fn registration_normalises_fields() {
        let registration = Registration::try_from_parts(
            " Alice ",
            "Alice@X.com",
            "correct horse",
            Some("  "),
            None,
        )
        .expect("valid registration");
        assert_eq!(registration.display_name().as_ref(), "Alice");
        assert_eq!(registration.email().as_ref(), "alice@x.com");
        assert!(registration.department().is_none());
        assert_eq!(registration.granted_role(), Role::User);
    }

    #[rstest]
    #[case("short")]
    #[case("")]
    fn registration_rejects_weak_passwords(#[case] password: &str) {
        let err = Registration::try_from_parts("Alice", "alice@x.com", password, None, None)
            .expect_err("weak password must fail");
        assert_eq!(
            err,
            RegistrationValidationError::PasswordLength {
                min: PASSWORD_MIN,
                max: PASSWORD_MAX
            }
        );
    }

    #[rstest]
    #[case(Some("old secret"), "short")]
    #[case(None, "")]
    fn password_change_rejects_weak_replacements(
        #[case] current: Option<&str>,
        #[case] replacement: &str,
    ) {
        let err = PasswordChange::try_from_parts(current, replacement)
            .expect_err("weak replacement must fail");
        assert_eq!(
            err,
            PasswordChangeValidationError::PasswordLength {
                min: PASSWORD_MIN,
                max: PASSWORD_MAX
            }
        );
    }

    #[rstest]
    fn password_change_keeps_the_current_password_verbatim() {
        let change = PasswordChange::try_from_parts(Some(" old "), "correct horse")
            .expect("valid change");
        assert_eq!(change.current(), Some(" old "));
        assert_eq!(change.replacement(), "correct horse");
    }

    #[rstest]
    fn registration_surfaces_field_errors() {
        let err = Registration::try_from_parts("Alice", "nope", "long enough", None, None)
            .expect_err("bad email must fail");
        assert_eq!(
            err,
            RegistrationValidationError::Field(UserValidationError::MalformedEmail)
        );
    }

    #[rstest]
    #[case(None, Role::User)]
    #[case(Some(Role::User), Role::User)]
    #[case(Some(Role::Staff), Role::Staff)]
    #[case(Some(Role::Admin), Role::User)]
    fn self_registration_never_grants_admin(
        #[case] requested: Option<Role>,
        #[case] expected: Role,
    ) {
        let registration =
            Registration::try_from_parts("Alice", "alice@x.com", "long enough", None, requested)
                .expect("valid registration");
        assert_eq!(registration.granted_role(), expected);
    }
}

//! Credential validation shared by sign-in and sign-up.
//!
//! A single [`PasswordPolicy`] is configured at startup and applied to both
//! forms. Everything here runs before the identity provider is contacted.

use regex::Regex;
use secrecy::SecretString;
use serde::Serialize;
use std::{collections::BTreeMap, fmt, str::FromStr};

use super::types::{LoginRequest, RegisterRequest};

const PASSWORD_MIN_CHARS: usize = 8;
const PASSWORD_MAX_CHARS: usize = 16;
const NAME_MAX_CHARS: usize = 20;

pub(crate) const MSG_INVALID_EMAIL: &str = "Invalid email address";
pub(crate) const MSG_PASSWORD_TOO_SHORT: &str = "Password must be at least 8 characters";
pub(crate) const MSG_PASSWORD_TOO_LONG: &str = "Password must be less than 16 characters";
pub(crate) const MSG_PASSWORD_COMPOSITION: &str = "Password must contain at least one uppercase letter, one lowercase letter, one number, and one special character";
pub(crate) const MSG_NAME_REQUIRED: &str = "Name is required";
pub(crate) const MSG_NAME_TOO_LONG: &str = "Name must be less than 20 characters";

/// Versioned password rules.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum PasswordPolicy {
    /// At least 8 characters.
    #[default]
    V1,
    /// 8 to 16 characters from `[A-Za-z0-9@$!%*?&]` with at least one
    /// lowercase, uppercase, digit and special character.
    V2,
}

impl PasswordPolicy {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::V1 => "v1",
            Self::V2 => "v2",
        }
    }

    /// Append the messages for every rule `password` breaks.
    fn check(self, password: &str, errors: &mut ValidationErrors) {
        let chars = password.chars().count();
        if chars < PASSWORD_MIN_CHARS {
            errors.add("password", MSG_PASSWORD_TOO_SHORT);
        }
        if self == Self::V1 {
            return;
        }
        if chars > PASSWORD_MAX_CHARS {
            errors.add("password", MSG_PASSWORD_TOO_LONG);
        }
        if !strict_password(password) {
            errors.add("password", MSG_PASSWORD_COMPOSITION);
        }
    }
}

impl fmt::Display for PasswordPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PasswordPolicy {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_lowercase().as_str() {
            "v1" | "length" => Ok(Self::V1),
            "v2" | "strict" => Ok(Self::V2),
            other => Err(format!("invalid password policy: {other} (expected v1 or v2)")),
        }
    }
}

/// Field-level validation messages, keyed by field name.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ValidationErrors {
    fields: BTreeMap<String, Vec<String>>,
}

impl ValidationErrors {
    fn add(&mut self, field: &str, message: &str) {
        self.fields
            .entry(field.to_string())
            .or_default()
            .push(message.to_string());
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    #[must_use]
    pub fn field(&self, name: &str) -> Option<&[String]> {
        self.fields.get(name).map(Vec::as_slice)
    }

    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    #[must_use]
    pub fn into_fields(self) -> BTreeMap<String, Vec<String>> {
        self.fields
    }
}

/// Email and password that passed validation.
#[derive(Debug)]
pub struct Credentials {
    pub email: String,
    pub password: SecretString,
}

/// Sign-up input that passed validation.
#[derive(Debug)]
pub struct Registration {
    pub credentials: Credentials,
    pub name: String,
}

/// Normalize an email before validation and before it reaches the provider.
pub(crate) fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Basic email format check on already-normalized input.
pub(crate) fn valid_email(email_normalized: &str) -> bool {
    Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").is_ok_and(|regex| regex.is_match(email_normalized))
}

fn strict_password(password: &str) -> bool {
    const REQUIRED_CLASSES: [&str; 4] = ["[a-z]", "[A-Z]", "[0-9]", "[@$!%*?&]"];

    let allowed = Regex::new(r"^[A-Za-z0-9@$!%*?&]{8,16}$").is_ok_and(|re| re.is_match(password));

    allowed
        && REQUIRED_CLASSES
            .iter()
            .all(|class| Regex::new(class).is_ok_and(|re| re.is_match(password)))
}

fn check_email(email: &str, errors: &mut ValidationErrors) -> String {
    let email = normalize_email(email);
    if !valid_email(&email) {
        errors.add("email", MSG_INVALID_EMAIL);
    }
    email
}

/// Validate sign-in input.
///
/// # Errors
/// Returns the field-level messages when any field is invalid.
pub fn validate_login(
    request: &LoginRequest,
    policy: PasswordPolicy,
) -> Result<Credentials, ValidationErrors> {
    let mut errors = ValidationErrors::default();
    let email = check_email(&request.email, &mut errors);
    policy.check(&request.password, &mut errors);

    if errors.is_empty() {
        Ok(Credentials {
            email,
            password: SecretString::from(request.password.clone()),
        })
    } else {
        Err(errors)
    }
}

/// Validate sign-up input.
///
/// # Errors
/// Returns the field-level messages when any field is invalid.
pub fn validate_register(
    request: &RegisterRequest,
    policy: PasswordPolicy,
) -> Result<Registration, ValidationErrors> {
    let mut errors = ValidationErrors::default();
    let email = check_email(&request.email, &mut errors);
    policy.check(&request.password, &mut errors);

    let name = request.name.trim();
    let name_chars = name.chars().count();
    if name_chars == 0 {
        errors.add("name", MSG_NAME_REQUIRED);
    } else if name_chars > NAME_MAX_CHARS {
        errors.add("name", MSG_NAME_TOO_LONG);
    }

    if errors.is_empty() {
        Ok(Registration {
            credentials: Credentials {
                email,
                password: SecretString::from(request.password.clone()),
            },
            name: name.to_string(),
        })
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;

    fn login(email: &str, password: &str) -> LoginRequest {
        LoginRequest {
            email: email.to_string(),
            password: password.to_string(),
        }
    }

    fn register(email: &str, password: &str, name: &str) -> RegisterRequest {
        RegisterRequest {
            email: email.to_string(),
            password: password.to_string(),
            name: name.to_string(),
        }
    }

    #[test]
    fn policy_parses_versions_and_aliases() {
        assert_eq!("v1".parse::<PasswordPolicy>(), Ok(PasswordPolicy::V1));
        assert_eq!("length".parse::<PasswordPolicy>(), Ok(PasswordPolicy::V1));
        assert_eq!(" V2 ".parse::<PasswordPolicy>(), Ok(PasswordPolicy::V2));
        assert_eq!("strict".parse::<PasswordPolicy>(), Ok(PasswordPolicy::V2));
        assert!("v3".parse::<PasswordPolicy>().is_err());
        assert_eq!(PasswordPolicy::default().to_string(), "v1");
    }

    #[test]
    fn valid_email_accepts_basic_format() {
        assert!(valid_email("a@b.com"));
        assert!(!valid_email("not-an-email"));
        assert!(!valid_email("a@b"));
        assert!(!valid_email("a b@c.com"));
    }

    #[test]
    fn normalize_email_trims_and_lowercases() {
        assert_eq!(normalize_email(" Alice@Example.COM "), "alice@example.com");
    }

    #[test]
    fn v1_rejects_short_password() {
        let result = validate_login(&login("a@b.com", "short"), PasswordPolicy::V1);
        let Err(errors) = result else {
            panic!("short password must be rejected");
        };
        assert_eq!(
            errors.field("password"),
            Some([MSG_PASSWORD_TOO_SHORT.to_string()].as_slice())
        );
        assert!(errors.field("email").is_none());
    }

    #[test]
    fn v1_accepts_long_simple_password() -> Result<(), ValidationErrors> {
        let credentials = validate_login(
            &login(" A@B.com", "password-without-rules-but-long"),
            PasswordPolicy::V1,
        )?;
        assert_eq!(credentials.email, "a@b.com");
        assert_eq!(
            credentials.password.expose_secret(),
            "password-without-rules-but-long"
        );
        Ok(())
    }

    #[test]
    fn v2_requires_every_character_class() {
        for password in ["alllowercase1!", "ALLUPPERCASE1!", "NoDigitsHere!", "NoSpecial123"] {
            let result = validate_login(&login("a@b.com", password), PasswordPolicy::V2);
            let Err(errors) = result else {
                panic!("{password} must be rejected");
            };
            assert_eq!(
                errors.field("password"),
                Some([MSG_PASSWORD_COMPOSITION.to_string()].as_slice()),
                "{password}"
            );
        }
    }

    #[test]
    fn v2_rejects_length_outside_window() {
        let Err(errors) = validate_login(&login("a@b.com", "Ab1!"), PasswordPolicy::V2) else {
            panic!("short password must be rejected");
        };
        let messages = errors.field("password").unwrap_or_default();
        assert!(messages.contains(&MSG_PASSWORD_TOO_SHORT.to_string()));

        let Err(errors) = validate_login(&login("a@b.com", "Abcdefgh12345678!"), PasswordPolicy::V2)
        else {
            panic!("long password must be rejected");
        };
        let messages = errors.field("password").unwrap_or_default();
        assert!(messages.contains(&MSG_PASSWORD_TOO_LONG.to_string()));
    }

    #[test]
    fn v2_rejects_characters_outside_allowed_set() {
        let result = validate_login(&login("a@b.com", "Abcdef1!#"), PasswordPolicy::V2);
        assert!(result.is_err());
    }

    #[test]
    fn v2_accepts_composed_password() {
        assert!(validate_login(&login("a@b.com", "Passw0rd!"), PasswordPolicy::V2).is_ok());
        assert!(validate_login(&login("a@b.com", "Abcdefgh1234567&"), PasswordPolicy::V2).is_ok());
    }

    #[test]
    fn register_checks_name() {
        let Err(errors) = validate_register(
            &register("a@b.com", "password123", "   "),
            PasswordPolicy::V1,
        ) else {
            panic!("blank name must be rejected");
        };
        assert_eq!(
            errors.field("name"),
            Some([MSG_NAME_REQUIRED.to_string()].as_slice())
        );

        let Err(errors) = validate_register(
            &register("a@b.com", "password123", &"x".repeat(21)),
            PasswordPolicy::V1,
        ) else {
            panic!("long name must be rejected");
        };
        assert_eq!(
            errors.field("name"),
            Some([MSG_NAME_TOO_LONG.to_string()].as_slice())
        );
    }

    #[test]
    fn register_collects_every_field() {
        let Err(errors) = validate_register(&register("nope", "short", ""), PasswordPolicy::V1)
        else {
            panic!("invalid input must be rejected");
        };
        let fields: Vec<&str> = errors.field_names().collect();
        assert_eq!(fields, vec!["email", "name", "password"]);
    }

    #[test]
    fn register_trims_name() -> Result<(), ValidationErrors> {
        let registration = validate_register(
            &register("bob@example.com", "password123", "  Bob  "),
            PasswordPolicy::V1,
        )?;
        assert_eq!(registration.name, "Bob");
        assert_eq!(registration.credentials.email, "bob@example.com");
        Ok(())
    }

    #[test]
    fn validation_errors_serialize_as_map() -> anyhow::Result<()> {
        let Err(errors) = validate_login(&login("bad", "password123"), PasswordPolicy::V1) else {
            anyhow::bail!("invalid email must be rejected");
        };
        let value = serde_json::to_value(&errors)?;
        assert_eq!(value, serde_json::json!({ "email": [MSG_INVALID_EMAIL] }));
        Ok(())
    }
}

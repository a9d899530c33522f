//! HTML form payloads and their validation.
//!
//! Each form deserializes from the submitted fields and `validate`s into a
//! cleaned value or a set of [`FormErrors`] to render next to the inputs.

use std::collections::BTreeMap;

use serde::Deserialize;

pub const REQUIRED: &str = "This field is required.";
pub const MAX_USERNAME_LEN: usize = 150;
pub const MIN_PASSWORD_LEN: usize = 8;

/// Validation messages keyed by field name, plus form-wide messages.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormErrors {
    fields: BTreeMap<&'static str, Vec<String>>,
    non_field: Vec<String>,
}

impl FormErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, field: &'static str, message: impl Into<String>) {
        self.fields.entry(field).or_default().push(message.into());
    }

    pub fn add_non_field(&mut self, message: impl Into<String>) {
        self.non_field.push(message.into());
    }

    pub fn field(&self, field: &str) -> &[String] {
        self.fields.get(field).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn has(&self, field: &str) -> bool {
        !self.field(field).is_empty()
    }

    pub fn non_field(&self) -> &[String] {
        &self.non_field
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty() && self.non_field.is_empty()
    }

    /// `Ok(value)` when no errors were recorded.
    pub fn finish<T>(self, value: T) -> Result<T, FormErrors> {
        if self.is_empty() { Ok(value) } else { Err(self) }
    }
}

fn required(errors: &mut FormErrors, field: &'static str, value: &str) -> String {
    let value = value.trim();
    if value.is_empty() {
        errors.add(field, REQUIRED);
    }
    value.to_string()
}

/// Post create/edit fields. The image travels separately as a file part.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PostForm {
    #[serde(default)]
    pub text: String,
    /// Group slug; blank means no group.
    #[serde(default)]
    pub group: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CleanPost {
    pub text: String,
    pub group_slug: Option<String>,
}

impl PostForm {
    pub fn validate(&self) -> Result<CleanPost, FormErrors> {
        let mut errors = FormErrors::new();
        let text = required(&mut errors, "text", &self.text);
        let group = self.group.trim();

        errors.finish(CleanPost {
            text,
            group_slug: (!group.is_empty()).then(|| group.to_string()),
        })
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CommentForm {
    #[serde(default)]
    pub text: String,
}

impl CommentForm {
    pub fn validate(&self) -> Result<String, FormErrors> {
        let mut errors = FormErrors::new();
        let text = required(&mut errors, "text", &self.text);
        errors.finish(text)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LoginForm {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
    /// Where to go after logging in.
    #[serde(default)]
    pub next: String,
}

impl LoginForm {
    /// Check presence of both fields; credentials are checked by the caller.
    pub fn validate(&self) -> Result<(String, String), FormErrors> {
        let mut errors = FormErrors::new();
        let username = required(&mut errors, "username", &self.username);
        if self.password.is_empty() {
            errors.add("password", REQUIRED);
        }
        errors.finish((username, self.password.clone()))
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SignupForm {
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password1: String,
    #[serde(default)]
    pub password2: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CleanSignup {
    pub first_name: String,
    pub last_name: String,
    pub username: String,
    pub email: String,
    pub password: String,
}

impl SignupForm {
    /// Field checks only; username uniqueness needs the user store.
    pub fn validate(&self) -> Result<CleanSignup, FormErrors> {
        let mut errors = FormErrors::new();

        let username = required(&mut errors, "username", &self.username);
        if !username.is_empty() && !is_valid_username(&username) {
            errors.add(
                "username",
                format!(
                    "Enter a valid username: up to {MAX_USERNAME_LEN} letters, digits and @/./+/-/_ characters."
                ),
            );
        }

        let email = required(&mut errors, "email", &self.email);
        if !email.is_empty() && !looks_like_email(&email) {
            errors.add("email", "Enter a valid email address.");
        }

        if self.password1.is_empty() {
            errors.add("password1", REQUIRED);
        }
        if self.password2.is_empty() {
            errors.add("password2", REQUIRED);
        } else if self.password1 != self.password2 {
            errors.add("password2", "The two password fields didn't match.");
        } else {
            if self.password1.chars().count() < MIN_PASSWORD_LEN {
                errors.add(
                    "password2",
                    format!(
                        "This password is too short. It must contain at least {MIN_PASSWORD_LEN} characters."
                    ),
                );
            }
            if self.password1.chars().all(|c| c.is_ascii_digit()) {
                errors.add("password2", "This password is entirely numeric.");
            }
        }

        errors.finish(CleanSignup {
            first_name: self.first_name.trim().to_string(),
            last_name: self.last_name.trim().to_string(),
            username,
            email,
            password: self.password1.clone(),
        })
    }
}

pub fn is_valid_username(username: &str) -> bool {
    !username.is_empty()
        && username.chars().count() <= MAX_USERNAME_LEN
        && username
            .chars()
            .all(|c| c.is_alphanumeric() || "@.+-_".contains(c))
}

fn looks_like_email(email: &str) -> bool {
    match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty() && !domain.is_empty() && !email.contains(char::is_whitespace)
        }
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn signup(username: &str, p1: &str, p2: &str) -> SignupForm {
        SignupForm {
            username: username.into(),
            email: "pavel@example.com".into(),
            password1: p1.into(),
            password2: p2.into(),
            ..Default::default()
        }
    }

    #[test]
    fn test_post_form_trims_and_requires_text() {
        let clean = PostForm {
            text: "  hello  ".into(),
            group: "".into(),
        }
        .validate()
        .unwrap();
        assert_eq!(clean.text, "hello");
        assert_eq!(clean.group_slug, None);

        let errors = PostForm {
            text: "   ".into(),
            group: "cats".into(),
        }
        .validate()
        .unwrap_err();
        assert_eq!(errors.field("text"), [REQUIRED.to_string()]);
        assert!(!errors.has("group"));
    }

    #[test]
    fn test_post_form_keeps_group_slug() {
        let clean = PostForm {
            text: "hi".into(),
            group: " cats ".into(),
        }
        .validate()
        .unwrap();
        assert_eq!(clean.group_slug.as_deref(), Some("cats"));
    }

    #[test]
    fn test_forms_deserialize_with_missing_fields() {
        let form: PostForm = serde_json::from_str(r#"{"text": "only text"}"#).unwrap();
        assert_eq!(form.group, "");

        let form: CommentForm = serde_json::from_str("{}").unwrap();
        assert!(form.validate().is_err());
    }

    #[test]
    fn test_signup_accepts_valid_input() {
        let clean = signup("pavel", "correct-horse", "correct-horse")
            .validate()
            .unwrap();
        assert_eq!(clean.username, "pavel");
        assert_eq!(clean.password, "correct-horse");
    }

    #[test]
    fn test_signup_password_rules() {
        let errors = signup("pavel", "abc", "abd").validate().unwrap_err();
        assert_eq!(
            errors.field("password2"),
            ["The two password fields didn't match.".to_string()]
        );

        let errors = signup("pavel", "short", "short").validate().unwrap_err();
        assert!(errors.field("password2")[0].contains("too short"));

        let errors = signup("pavel", "1234567890", "1234567890")
            .validate()
            .unwrap_err();
        assert_eq!(
            errors.field("password2"),
            ["This password is entirely numeric.".to_string()]
        );
    }

    #[test]
    fn test_signup_username_and_email_rules() {
        let errors = signup("bad name!", "correct-horse", "correct-horse")
            .validate()
            .unwrap_err();
        assert!(errors.has("username"));

        let mut form = signup("pavel", "correct-horse", "correct-horse");
        form.email = "not-an-email".into();
        assert!(form.validate().unwrap_err().has("email"));
    }

    #[test]
    fn test_login_form_requires_both_fields() {
        let errors = LoginForm::default().validate().unwrap_err();
        assert!(errors.has("username"));
        assert!(errors.has("password"));
    }

    #[test]
    fn test_non_field_errors() {
        let mut errors = FormErrors::new();
        assert!(errors.is_empty());
        errors.add_non_field("Please enter a correct username and password.");
        assert!(!errors.is_empty());
        assert_eq!(errors.non_field().len(), 1);
        assert!(errors.finish(()).is_err());
    }
}

//! Client-side validation, run before any request is sent

use thiserror::Error;
use url::Url;

/// Minimum length of a tip description, in characters
pub const MIN_DESCRIPTION_LEN: usize = 50;

/// Minimum password length
pub const MIN_PASSWORD_LEN: usize = 8;

/// Characters accepted as the required special character in passwords
pub const PASSWORD_SPECIALS: &str = "!@#$%^&*";

/// Input rejected locally
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Please provide a title for your gardening tip")]
    EmptyTitle,

    #[error("Please provide a detailed description (at least 50 characters)")]
    DescriptionTooShort,

    #[error("Please provide a valid image URL starting with http:// or https://")]
    InvalidImageUrl,

    #[error("Please write something to comment")]
    EmptyComment,

    #[error("Password does not meet the requirements: {}", describe_rules(.0))]
    WeakPassword(Vec<PasswordRule>),
}

impl ValidationError {
    /// Heading shown with the message
    pub fn title(&self) -> &'static str {
        match self {
            ValidationError::EmptyTitle => "Missing Title",
            ValidationError::DescriptionTooShort => "Insufficient Description",
            ValidationError::InvalidImageUrl => "Invalid Image URL",
            ValidationError::EmptyComment => "Empty Comment",
            ValidationError::WeakPassword(_) => "Invalid Password",
        }
    }
}

/// One rule of the password policy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PasswordRule {
    Length,
    Uppercase,
    Lowercase,
    Special,
}

impl PasswordRule {
    /// All rules, in the order they are reported
    pub const ALL: [PasswordRule; 4] = [
        PasswordRule::Length,
        PasswordRule::Uppercase,
        PasswordRule::Lowercase,
        PasswordRule::Special,
    ];

    /// Whether `password` satisfies this rule
    pub fn is_met(&self, password: &str) -> bool {
        match self {
            PasswordRule::Length => password.chars().count() >= MIN_PASSWORD_LEN,
            PasswordRule::Uppercase => password.chars().any(|c| c.is_ascii_uppercase()),
            PasswordRule::Lowercase => password.chars().any(|c| c.is_ascii_lowercase()),
            PasswordRule::Special => password.chars().any(|c| PASSWORD_SPECIALS.contains(c)),
        }
    }
}

impl std::fmt::Display for PasswordRule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let text = match self {
            PasswordRule::Length => "at least 8 characters",
            PasswordRule::Uppercase => "an uppercase letter",
            PasswordRule::Lowercase => "a lowercase letter",
            PasswordRule::Special => "a special character (!@#$%^&*)",
        };
        f.write_str(text)
    }
}

fn describe_rules(rules: &[PasswordRule]) -> String {
    rules
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Check a password against every rule
pub fn validate_password(password: &str) -> Result<(), ValidationError> {
    let failed: Vec<PasswordRule> = PasswordRule::ALL
        .into_iter()
        .filter(|rule| !rule.is_met(password))
        .collect();
    if failed.is_empty() {
        Ok(())
    } else {
        Err(ValidationError::WeakPassword(failed))
    }
}

/// Trimmed comment text, or an error if nothing is left
pub fn validate_comment(text: &str) -> Result<&str, ValidationError> {
    let text = text.trim();
    if text.is_empty() {
        Err(ValidationError::EmptyComment)
    } else {
        Ok(text)
    }
}

pub fn validate_title(title: &str) -> Result<(), ValidationError> {
    if title.trim().is_empty() {
        return Err(ValidationError::EmptyTitle);
    }
    Ok(())
}

pub fn validate_description(description: &str) -> Result<(), ValidationError> {
    if description.trim().chars().count() < MIN_DESCRIPTION_LEN {
        return Err(ValidationError::DescriptionTooShort);
    }
    Ok(())
}

/// Image references must be absolute http(s) URLs with a host
pub fn validate_image_url(image: &str) -> Result<(), ValidationError> {
    match Url::parse(image.trim()) {
        Ok(url) if matches!(url.scheme(), "http" | "https") && url.host().is_some() => Ok(()),
        _ => Err(ValidationError::InvalidImageUrl),
    }
}

use anyhow::Result;

/// Characters that satisfy the special-character rule
pub const PASSWORD_SPECIAL_CHARACTERS: &str = "@$!%*?&";
pub const PASSWORD_MIN_LENGTH: usize = 8;

/// Trait for password hashing and verification
pub trait PasswordHashingService: Send + Sync {
    fn hash_password(&self, password: &str) -> Result<String>;
    fn verify_password(&self, password: &str, hash: &str) -> Result<bool>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PasswordPolicyViolation {
    TooShort,
    MissingUppercase,
    MissingSpecialCharacter,
}

impl PasswordPolicyViolation {
    pub fn message(&self) -> String {
        match self {
            PasswordPolicyViolation::TooShort => format!(
                "password must be at least {} characters long",
                PASSWORD_MIN_LENGTH
            ),
            PasswordPolicyViolation::MissingUppercase => {
                "password must contain at least one uppercase letter".to_string()
            }
            PasswordPolicyViolation::MissingSpecialCharacter => format!(
                "password must contain at least one special character ({})",
                PASSWORD_SPECIAL_CHARACTERS
            ),
        }
    }
}

/// Registration-time password rules
pub fn check_password_policy(password: &str) -> Result<(), PasswordPolicyViolation> {
    if password.chars().count() < PASSWORD_MIN_LENGTH {
        return Err(PasswordPolicyViolation::TooShort);
    }

    if !password.chars().any(char::is_uppercase) {
        return Err(PasswordPolicyViolation::MissingUppercase);
    }

    if !password
        .chars()
        .any(|c| PASSWORD_SPECIAL_CHARACTERS.contains(c))
    {
        return Err(PasswordPolicyViolation::MissingSpecialCharacter);
    }

    Ok(())
}

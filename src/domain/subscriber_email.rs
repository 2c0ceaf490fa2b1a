use validator::validate_email;

// Longest address a SMTP forward-path can carry.
const MAX_EMAIL_LENGTH: usize = 254;

/// An address accepted as the key of a roster row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubscriberEmail(String);

impl SubscriberEmail {
    pub fn parse(email: String) -> Result<SubscriberEmail, String> {
        if email.len() > MAX_EMAIL_LENGTH {
            return Err(format!(
                "email addresses longer than {} characters are not accepted",
                MAX_EMAIL_LENGTH
            ));
        }

        if !validate_email(&email) {
            return Err(format!("{} email is not valid", email));
        }

        Ok(Self(email))
    }
}

impl AsRef<str> for SubscriberEmail {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for SubscriberEmail {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

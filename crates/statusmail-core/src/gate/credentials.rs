use secrecy::{ExposeSecret, SecretString};

/// Source of truth for who may log in.
pub trait CredentialStore: std::fmt::Debug + Send + Sync + 'static {
    /// `true` when the pair matches. Must not reveal which half was wrong.
    fn verify(&self, email: &str, password: &str) -> bool;
}

/// A single configured email / password pair.
///
/// Emails compare case-insensitively after trimming; passwords compare
/// exactly.
#[derive(Debug, Clone)]
pub struct StaticCredentials {
    email: String,
    password: SecretString,
}

impl StaticCredentials {
    pub fn new(email: impl Into<String>, password: SecretString) -> Self {
        Self {
            email: email.into().trim().to_owned(),
            password,
        }
    }

    pub fn email(&self) -> &str {
        &self.email
    }
}

impl CredentialStore for StaticCredentials {
    fn verify(&self, email: &str, password: &str) -> bool {
        let email_ok = self.email.eq_ignore_ascii_case(email.trim());
        let password_ok = constant_time_eq(self.password.expose_secret().as_bytes(), password.as_bytes());
        email_ok & password_ok
    }
}

fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> StaticCredentials {
        StaticCredentials::new("ops@example.com", SecretString::from("S3cret!".to_owned()))
    }

    #[test]
    fn accepts_exact_pair() {
        assert!(store().verify("ops@example.com", "S3cret!"));
    }

    #[test]
    fn email_ignores_case_and_padding() {
        assert!(store().verify("  OPS@Example.com ", "S3cret!"));
    }

    #[test]
    fn rejects_wrong_password_or_email() {
        let store = store();
        assert!(!store.verify("ops@example.com", "s3cret!"));
        assert!(!store.verify("ops@example.com", ""));
        assert!(!store.verify("other@example.com", "S3cret!"));
        assert!(!store.verify("", ""));
    }
}

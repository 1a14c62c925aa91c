//! Administrator credential generation

use rand::Rng;

/// Fixed password prefix; guarantees an upper-case letter and a digit
pub const PASSWORD_PREFIX: &str = "A5";

/// Length of the random part of a generated password
pub const PASSWORD_SUFFIX_LEN: usize = 10;

/// Alphabet of the random suffix
pub const LETTERS: &[u8; 52] = b"abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ";

/// `n` letters drawn uniformly from [`LETTERS`]
pub fn random_letters<R: Rng + ?Sized>(rng: &mut R, n: usize) -> String {
    (0..n)
        .map(|_| LETTERS[rng.gen_range(0..LETTERS.len())] as char)
        .collect()
}

pub fn generate_password<R: Rng + ?Sized>(rng: &mut R) -> String {
    format!(
        "{}{}",
        PASSWORD_PREFIX,
        random_letters(rng, PASSWORD_SUFFIX_LEN)
    )
}

/// Login for the scale set instances
#[derive(Clone, PartialEq, Eq)]
pub struct AdminCredentials {
    pub username: String,
    pub password: String,
}

impl AdminCredentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }

    /// Credentials with a freshly generated password
    pub fn generate(username: impl Into<String>) -> Self {
        Self::new(username, generate_password(&mut rand::thread_rng()))
    }
}

impl std::fmt::Debug for AdminCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdminCredentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

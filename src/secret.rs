use secrecy::{ExposeSecret, SecretString};

const MASK: &str = "**********";

/// A string whose value is hidden from `Debug` and `Display`.
///
/// The raw value is only reachable through [`SecretStr::expose`] and is
/// zeroized on drop.
pub struct SecretStr(SecretString);

impl SecretStr {
    pub fn new(value: impl Into<String>) -> Self {
        Self(SecretString::from(value.into()))
    }

    pub fn expose(&self) -> &str {
        self.0.expose_secret()
    }

    pub fn is_empty(&self) -> bool {
        self.expose().is_empty()
    }

    pub fn masked(&self) -> &'static str {
        if self.is_empty() {
            ""
        } else {
            MASK
        }
    }
}

impl Clone for SecretStr {
    fn clone(&self) -> Self {
        Self::new(self.expose())
    }
}

impl From<String> for SecretStr {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

impl From<&str> for SecretStr {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl std::fmt::Debug for SecretStr {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "SecretStr('{}')", self.masked())
    }
}

impl std::fmt::Display for SecretStr {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.masked())
    }
}

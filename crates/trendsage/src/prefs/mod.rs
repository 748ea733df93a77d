//! Persistent per-user preferences.
//!
//! Small string values that must outlive a session: dismissed prompts, the
//! auth token, the referral code and the preferred page size.

pub mod store;

use secrecy::{ExposeSecret, SecretString};

use crate::error::PreferenceError;

pub use store::{FilePreferences, MemoryPreferences};

/// Key/value persistence. Implementations must be safe to share.
pub trait PreferenceStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, PreferenceError>;
    fn set(&self, key: &str, value: &str) -> Result<(), PreferenceError>;
    fn remove(&self, key: &str) -> Result<(), PreferenceError>;
}

const AUTH_TOKEN_KEY: &str = "auth_token";
const REFERRAL_CODE_KEY: &str = "referral_code";
const PAGE_SIZE_KEY: &str = "matches_page_size";
const DISMISSED_PREFIX: &str = "dismissed:";

/// Typed accessors over a [`PreferenceStore`].
pub struct Preferences<S: PreferenceStore> {
    store: S,
}

impl<S: PreferenceStore> Preferences<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn is_prompt_dismissed(&self, prompt: &str) -> Result<bool, PreferenceError> {
        Ok(self
            .store
            .get(&format!("{}{}", DISMISSED_PREFIX, prompt))?
            .is_some_and(|v| v == "true"))
    }

    pub fn dismiss_prompt(&self, prompt: &str) -> Result<(), PreferenceError> {
        self.store
            .set(&format!("{}{}", DISMISSED_PREFIX, prompt), "true")
    }

    pub fn restore_prompt(&self, prompt: &str) -> Result<(), PreferenceError> {
        self.store.remove(&format!("{}{}", DISMISSED_PREFIX, prompt))
    }

    pub fn auth_token(&self) -> Result<Option<SecretString>, PreferenceError> {
        Ok(self
            .store
            .get(AUTH_TOKEN_KEY)?
            .filter(|t| !t.is_empty())
            .map(SecretString::from))
    }

    /// `None` signs out.
    pub fn set_auth_token(&self, token: Option<&SecretString>) -> Result<(), PreferenceError> {
        match token {
            Some(token) => self.store.set(AUTH_TOKEN_KEY, token.expose_secret()),
            None => self.store.remove(AUTH_TOKEN_KEY),
        }
    }

    pub fn referral_code(&self) -> Result<Option<String>, PreferenceError> {
        self.store.get(REFERRAL_CODE_KEY)
    }

    pub fn set_referral_code(&self, code: &str) -> Result<(), PreferenceError> {
        let code = code.trim();
        if code.is_empty() {
            return self.store.remove(REFERRAL_CODE_KEY);
        }
        self.store.set(REFERRAL_CODE_KEY, code)
    }

    /// Unparseable or zero values read as unset.
    pub fn page_size(&self) -> Result<Option<u32>, PreferenceError> {
        Ok(self
            .store
            .get(PAGE_SIZE_KEY)?
            .and_then(|v| v.parse::<u32>().ok())
            .filter(|size| *size > 0))
    }

    pub fn set_page_size(&self, page_size: u32) -> Result<(), PreferenceError> {
        self.store.set(PAGE_SIZE_KEY, &page_size.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn prefs() -> Preferences<MemoryPreferences> {
        Preferences::new(MemoryPreferences::new())
    }

    #[test]
    fn test_prompt_dismissal() {
        let p = prefs();
        assert!(!p.is_prompt_dismissed("daily_reward").unwrap());
        p.dismiss_prompt("daily_reward").unwrap();
        assert!(p.is_prompt_dismissed("daily_reward").unwrap());
        assert!(!p.is_prompt_dismissed("other").unwrap());
        p.restore_prompt("daily_reward").unwrap();
        assert!(!p.is_prompt_dismissed("daily_reward").unwrap());
    }

    #[test]
    fn test_auth_token_roundtrip_and_sign_out() {
        let p = prefs();
        p.set_auth_token(Some(&SecretString::from("tok-123"))).unwrap();
        assert_eq!(p.auth_token().unwrap().unwrap().expose_secret(), "tok-123");
        p.set_auth_token(None).unwrap();
        assert!(p.auth_token().unwrap().is_none());
    }

    #[test]
    fn test_blank_referral_code_clears() {
        let p = prefs();
        p.set_referral_code("  FRIEND42 ").unwrap();
        assert_eq!(p.referral_code().unwrap().as_deref(), Some("FRIEND42"));
        p.set_referral_code("   ").unwrap();
        assert_eq!(p.referral_code().unwrap(), None);
    }

    #[test]
    fn test_invalid_page_size_reads_as_unset() {
        let p = prefs();
        p.store().set(PAGE_SIZE_KEY, "lots").unwrap();
        assert_eq!(p.page_size().unwrap(), None);
        p.set_page_size(50).unwrap();
        assert_eq!(p.page_size().unwrap(), Some(50));
    }
}

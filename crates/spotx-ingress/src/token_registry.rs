//! In-memory [`TokenKeeper`] with issuer forbid controls.

use std::collections::{BTreeMap, BTreeSet};

use spotx_types::{Address, Result, SpotxError};

use crate::expected_keepers::TokenKeeper;

#[derive(Debug, Clone)]
struct TokenInfo {
    issuer: Address,
    forbidden: bool,
    forbidden_addresses: BTreeSet<Address>,
}

/// Issued tokens and their forbid state.
#[derive(Debug, Clone, Default)]
pub struct TokenRegistry {
    tokens: BTreeMap<String, TokenInfo>,
}

impl TokenRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `symbol` as issued by `issuer`.
    pub fn issue(&mut self, symbol: &str, issuer: &Address) -> Result<()> {
        if symbol.is_empty() || self.tokens.contains_key(symbol) {
            return Err(SpotxError::InvalidToken(format!(
                "{symbol} is empty or already issued"
            )));
        }
        self.tokens.insert(
            symbol.to_string(),
            TokenInfo {
                issuer: issuer.clone(),
                forbidden: false,
                forbidden_addresses: BTreeSet::new(),
            },
        );
        Ok(())
    }

    fn token_mut(&mut self, symbol: &str) -> Result<&mut TokenInfo> {
        self.tokens
            .get_mut(symbol)
            .ok_or_else(|| SpotxError::InvalidToken(symbol.to_string()))
    }

    pub fn forbid_token(&mut self, symbol: &str) -> Result<()> {
        self.token_mut(symbol)?.forbidden = true;
        Ok(())
    }

    pub fn unforbid_token(&mut self, symbol: &str) -> Result<()> {
        self.token_mut(symbol)?.forbidden = false;
        Ok(())
    }

    pub fn forbid_addresses(&mut self, symbol: &str, addrs: &[Address]) -> Result<()> {
        self.token_mut(symbol)?
            .forbidden_addresses
            .extend(addrs.iter().cloned());
        Ok(())
    }

    pub fn unforbid_addresses(&mut self, symbol: &str, addrs: &[Address]) -> Result<()> {
        let token = self.token_mut(symbol)?;
        for addr in addrs {
            token.forbidden_addresses.remove(addr);
        }
        Ok(())
    }

    #[must_use]
    pub fn issuer(&self, symbol: &str) -> Option<&Address> {
        self.tokens.get(symbol).map(|t| &t.issuer)
    }
}

impl TokenKeeper for TokenRegistry {
    fn exists(&self, symbol: &str) -> bool {
        self.tokens.contains_key(symbol)
    }

    fn is_issuer(&self, addr: &Address, symbol: &str) -> bool {
        self.issuer(symbol) == Some(addr)
    }

    fn is_token_forbidden(&self, symbol: &str) -> bool {
        self.tokens.get(symbol).is_some_and(|t| t.forbidden)
    }

    fn is_address_forbidden(&self, symbol: &str, addr: &Address) -> bool {
        self.tokens
            .get(symbol)
            .is_some_and(|t| t.forbidden_addresses.contains(addr))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn issue_and_lookup() {
        let mut reg = TokenRegistry::new();
        let alice = Address::new("alice");
        reg.issue("tusdt", &alice).unwrap();
        assert!(reg.exists("tusdt"));
        assert!(!reg.exists("teos"));
        assert!(reg.is_issuer(&alice, "tusdt"));
        assert!(!reg.is_issuer(&Address::new("bob"), "tusdt"));
        assert!(matches!(
            reg.issue("tusdt", &alice),
            Err(SpotxError::InvalidToken(_))
        ));
    }

    #[test]
    fn forbid_token_toggles() {
        let mut reg = TokenRegistry::new();
        reg.issue("tusdt", &Address::new("alice")).unwrap();
        reg.forbid_token("tusdt").unwrap();
        assert!(reg.is_token_forbidden("tusdt"));
        reg.unforbid_token("tusdt").unwrap();
        assert!(!reg.is_token_forbidden("tusdt"));
        assert!(reg.forbid_token("nope").is_err());
    }

    #[test]
    fn forbid_addresses_per_token() {
        let mut reg = TokenRegistry::new();
        reg.issue("tusdt", &Address::new("alice")).unwrap();
        reg.issue("teos", &Address::new("alice")).unwrap();
        let bob = Address::new("bob");
        reg.forbid_addresses("tusdt", &[bob.clone()]).unwrap();
        assert!(reg.is_address_forbidden("tusdt", &bob));
        assert!(!reg.is_address_forbidden("teos", &bob));
        reg.unforbid_addresses("tusdt", &[bob.clone()]).unwrap();
        assert!(!reg.is_address_forbidden("tusdt", &bob));
    }
}

//! Fungible token ledger collaborator
//!
//! The engine never trusts amounts passed alongside a deposit; it reads
//! balances back from this ledger and diffs them against its own cache.
//! The surface the core consumes is deliberately ERC20-shaped:
//! `balance_of`, `transfer`, `transfer_from`, `approve`.

use std::collections::HashMap;
use std::fmt;

use primitive_types::U256;
use serde::{Deserialize, Serialize};

use crate::{AmmError, Result};

/// Contract address: the numeric identifier tokens, pools, accounts and the
/// router are known by. Ordering is plain numeric ordering, which is what
/// pair canonicalization relies on.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Address(pub U256);

impl From<u64> for Address {
    fn from(value: u64) -> Self {
        Address(U256::from(value))
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#x}", self.0)
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Address({:#x})", self.0)
    }
}

/// One deployed fungible token: metadata plus holder balances and
/// owner -> spender allowances.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenLedger {
    pub name: String,
    pub symbol: String,
    pub decimals: u8,
    pub total_supply: U256,
    balances: HashMap<Address, U256>,
    allowances: HashMap<Address, HashMap<Address, U256>>,
}

impl TokenLedger {
    /// Deploy a token with its full supply credited to `owner`
    pub fn new(name: &str, symbol: &str, decimals: u8, supply: U256, owner: Address) -> Self {
        let mut balances = HashMap::new();
        balances.insert(owner, supply);
        Self {
            name: name.to_string(),
            symbol: symbol.to_string(),
            decimals,
            total_supply: supply,
            balances,
            allowances: HashMap::new(),
        }
    }

    pub fn balance_of(&self, holder: Address) -> U256 {
        self.balances.get(&holder).copied().unwrap_or_default()
    }

    pub fn allowance(&self, owner: Address, spender: Address) -> U256 {
        self.allowances
            .get(&owner)
            .and_then(|spenders| spenders.get(&spender))
            .copied()
            .unwrap_or_default()
    }

    /// Authorize `spender` to pull up to `amount` from `caller`
    pub fn approve(&mut self, caller: Address, spender: Address, amount: U256) {
        self.allowances.entry(caller).or_default().insert(spender, amount);
    }

    /// Move `amount` from `caller` to `to`
    pub fn transfer(&mut self, caller: Address, to: Address, amount: U256) -> Result<()> {
        self.debit(caller, amount)?;
        self.credit(to, amount)?;
        Ok(())
    }

    /// Spend `caller`'s allowance to move `amount` from `owner` to `to`
    pub fn transfer_from(
        &mut self,
        caller: Address,
        owner: Address,
        to: Address,
        amount: U256,
    ) -> Result<()> {
        let allowed = self.allowance(owner, caller);
        let remaining = allowed
            .checked_sub(amount)
            .ok_or(AmmError::InsufficientAllowance)?;
        self.debit(owner, amount)?;
        self.credit(to, amount)?;
        self.allowances.entry(owner).or_default().insert(caller, remaining);
        Ok(())
    }

    fn debit(&mut self, holder: Address, amount: U256) -> Result<()> {
        let balance = self.balance_of(holder);
        let updated = balance
            .checked_sub(amount)
            .ok_or(AmmError::InsufficientBalance)?;
        self.balances.insert(holder, updated);
        Ok(())
    }

    fn credit(&mut self, holder: Address, amount: U256) -> Result<()> {
        let balance = self.balance_of(holder);
        let updated = balance.checked_add(amount).ok_or(AmmError::Overflow)?;
        self.balances.insert(holder, updated);
        Ok(())
    }
}

/// All deployed token ledgers, looked up by contract address
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenBank {
    tokens: HashMap<Address, TokenLedger>,
}

impl TokenBank {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, address: Address, ledger: TokenLedger) {
        self.tokens.insert(address, ledger);
    }

    pub fn contains(&self, address: Address) -> bool {
        self.tokens.contains_key(&address)
    }

    pub fn token(&self, address: Address) -> Result<&TokenLedger> {
        self.tokens.get(&address).ok_or(AmmError::UnknownToken)
    }

    pub fn token_mut(&mut self, address: Address) -> Result<&mut TokenLedger> {
        self.tokens.get_mut(&address).ok_or(AmmError::UnknownToken)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Address, &TokenLedger)> {
        self.tokens.iter()
    }

    pub fn balance_of(&self, token: Address, holder: Address) -> Result<U256> {
        Ok(self.token(token)?.balance_of(holder))
    }

    pub fn allowance(&self, token: Address, owner: Address, spender: Address) -> Result<U256> {
        Ok(self.token(token)?.allowance(owner, spender))
    }

    pub fn approve(
        &mut self,
        token: Address,
        caller: Address,
        spender: Address,
        amount: U256,
    ) -> Result<()> {
        self.token_mut(token)?.approve(caller, spender, amount);
        Ok(())
    }

    pub fn transfer(
        &mut self,
        token: Address,
        caller: Address,
        to: Address,
        amount: U256,
    ) -> Result<()> {
        self.token_mut(token)?.transfer(caller, to, amount)
    }

    pub fn transfer_from(
        &mut self,
        token: Address,
        caller: Address,
        owner: Address,
        to: Address,
        amount: U256,
    ) -> Result<()> {
        self.token_mut(token)?.transfer_from(caller, owner, to, amount)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transfer_and_balances() {
        let alice = Address::from(1);
        let bob = Address::from(2);
        let mut token = TokenLedger::new("Token0", "TOK0", 18, U256::from(1000u64), alice);

        token.transfer(alice, bob, U256::from(400u64)).unwrap();
        assert_eq!(token.balance_of(alice), U256::from(600u64));
        assert_eq!(token.balance_of(bob), U256::from(400u64));

        let result = token.transfer(bob, alice, U256::from(500u64));
        assert_eq!(result, Err(AmmError::InsufficientBalance));
    }

    #[test]
    fn test_transfer_from_spends_allowance() {
        let alice = Address::from(1);
        let bob = Address::from(2);
        let router = Address::from(3);
        let mut token = TokenLedger::new("Token0", "TOK0", 18, U256::from(1000u64), alice);

        token.approve(alice, router, U256::from(300u64));
        token
            .transfer_from(router, alice, bob, U256::from(200u64))
            .unwrap();

        assert_eq!(token.balance_of(bob), U256::from(200u64));
        assert_eq!(token.allowance(alice, router), U256::from(100u64));

        let result = token.transfer_from(router, alice, bob, U256::from(200u64));
        assert_eq!(result, Err(AmmError::InsufficientAllowance));
    }

    #[test]
    fn test_unknown_token() {
        let bank = TokenBank::new();
        let result = bank.balance_of(Address::from(9), Address::from(1));
        assert_eq!(result, Err(AmmError::UnknownToken));
    }
}

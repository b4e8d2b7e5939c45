//! Mints and token accounts.
//!
//! A mint is identified by an arbitrary [`Address`] (its mint id) and stored
//! at `derive(Mint, [mint_id])`. Balances live in one token account per
//! (mint, owner) pair at `derive(TokenAccount, [mint_id, owner])`. Accounts
//! are created on first credit; a missing account has a zero balance.

use serde::{Deserialize, Serialize};

use ouro_crypto::{derive_address, RoleTag};
use ouro_store::StateStore;
use ouro_types::Address;

use crate::{LedgerError, Transaction};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Mint {
    pub id: Address,
    /// Only this address may issue new units.
    pub authority: Address,
    pub supply: u128,
    pub decimals: u8,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenAccount {
    pub mint: Address,
    pub owner: Address,
    pub amount: u128,
}

pub fn mint_address(mint_id: &Address) -> Address {
    derive_address(RoleTag::Mint, &[mint_id.as_bytes()])
}

pub fn token_account_address(mint_id: &Address, owner: &Address) -> Address {
    derive_address(RoleTag::TokenAccount, &[mint_id.as_bytes(), owner.as_bytes()])
}

impl<S: StateStore + ?Sized> Transaction<'_, S> {
    /// Register a new mint with zero supply.
    pub fn create_mint(
        &mut self,
        mint_id: Address,
        authority: Address,
        decimals: u8,
    ) -> Result<Mint, LedgerError> {
        let mint = Mint {
            id: mint_id,
            authority,
            supply: 0,
            decimals,
        };
        self.create(&mint_address(&mint_id), &mint)?;
        Ok(mint)
    }

    pub fn mint(&mut self, mint_id: &Address) -> Result<Mint, LedgerError> {
        self.load(&mint_address(mint_id))?
            .ok_or(LedgerError::MintNotFound(*mint_id))
    }

    pub fn balance(&mut self, mint_id: &Address, owner: &Address) -> Result<u128, LedgerError> {
        Ok(self
            .load::<TokenAccount>(&token_account_address(mint_id, owner))?
            .map(|a| a.amount)
            .unwrap_or(0))
    }

    /// Issue `amount` new units to `owner`. `signer` must be the mint authority.
    pub fn mint_to(
        &mut self,
        mint_id: &Address,
        signer: &Address,
        owner: &Address,
        amount: u128,
    ) -> Result<(), LedgerError> {
        let mut mint = self.mint(mint_id)?;
        if mint.authority != *signer {
            return Err(LedgerError::MintAuthorityMismatch { mint: *mint_id });
        }
        mint.supply = mint.supply.checked_add(amount).ok_or(LedgerError::Overflow)?;
        self.credit(mint_id, owner, amount)?;
        self.store(&mint_address(mint_id), &mint)
    }

    /// Destroy `amount` units held by `owner`.
    pub fn burn(&mut self, mint_id: &Address, owner: &Address, amount: u128) -> Result<(), LedgerError> {
        let mut mint = self.mint(mint_id)?;
        self.debit(mint_id, owner, amount)?;
        mint.supply = mint.supply.checked_sub(amount).ok_or(LedgerError::Overflow)?;
        self.store(&mint_address(mint_id), &mint)
    }

    /// Move `amount` from `from`'s account to `to`'s account.
    pub fn transfer(
        &mut self,
        mint_id: &Address,
        from: &Address,
        to: &Address,
        amount: u128,
    ) -> Result<(), LedgerError> {
        // Ensures the mint exists even for zero-amount transfers.
        self.mint(mint_id)?;
        self.debit(mint_id, from, amount)?;
        self.credit(mint_id, to, amount)
    }

    fn debit(&mut self, mint_id: &Address, owner: &Address, amount: u128) -> Result<(), LedgerError> {
        let key = token_account_address(mint_id, owner);
        let mut account = self
            .load::<TokenAccount>(&key)?
            .unwrap_or_else(|| empty_account(mint_id, owner));
        if account.amount < amount {
            return Err(LedgerError::InsufficientFunds {
                needed: amount,
                available: account.amount,
            });
        }
        account.amount -= amount;
        self.store(&key, &account)
    }

    fn credit(&mut self, mint_id: &Address, owner: &Address, amount: u128) -> Result<(), LedgerError> {
        let key = token_account_address(mint_id, owner);
        let mut account = self
            .load::<TokenAccount>(&key)?
            .unwrap_or_else(|| empty_account(mint_id, owner));
        account.amount = account.amount.checked_add(amount).ok_or(LedgerError::Overflow)?;
        self.store(&key, &account)
    }
}

fn empty_account(mint_id: &Address, owner: &Address) -> TokenAccount {
    TokenAccount {
        mint: *mint_id,
        owner: *owner,
        amount: 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ouro_nullables::NullStore;

    const MINT: Address = Address::ZERO;

    fn setup(store: &NullStore) -> (Address, Address) {
        let authority = Address::from_seed(100);
        let alice = Address::from_seed(1);
        let mut txn = Transaction::new(store);
        txn.create_mint(MINT, authority, 6).unwrap();
        txn.mint_to(&MINT, &authority, &alice, 1_000).unwrap();
        txn.commit().unwrap();
        (authority, alice)
    }

    #[test]
    fn mint_to_increases_supply_and_balance() {
        let store = NullStore::new();
        let (_, alice) = setup(&store);
        let mut txn = Transaction::new(&store);
        assert_eq!(txn.balance(&MINT, &alice).unwrap(), 1_000);
        assert_eq!(txn.mint(&MINT).unwrap().supply, 1_000);
    }

    #[test]
    fn only_authority_can_mint() {
        let store = NullStore::new();
        let (_, alice) = setup(&store);
        let mut txn = Transaction::new(&store);
        let err = txn.mint_to(&MINT, &alice, &alice, 1).unwrap_err();
        assert!(matches!(err, LedgerError::MintAuthorityMismatch { .. }));
    }

    #[test]
    fn transfer_moves_balance() {
        let store = NullStore::new();
        let (_, alice) = setup(&store);
        let bob = Address::from_seed(2);
        let mut txn = Transaction::new(&store);
        txn.transfer(&MINT, &alice, &bob, 400).unwrap();
        assert_eq!(txn.balance(&MINT, &alice).unwrap(), 600);
        assert_eq!(txn.balance(&MINT, &bob).unwrap(), 400);
        assert_eq!(txn.mint(&MINT).unwrap().supply, 1_000);
    }

    #[test]
    fn overdraft_is_rejected() {
        let store = NullStore::new();
        let (_, alice) = setup(&store);
        let bob = Address::from_seed(2);
        let mut txn = Transaction::new(&store);
        let err = txn.transfer(&MINT, &bob, &alice, 1).unwrap_err();
        assert!(matches!(
            err,
            LedgerError::InsufficientFunds { needed: 1, available: 0 }
        ));
    }

    #[test]
    fn burn_reduces_supply() {
        let store = NullStore::new();
        let (_, alice) = setup(&store);
        let mut txn = Transaction::new(&store);
        txn.burn(&MINT, &alice, 250).unwrap();
        assert_eq!(txn.balance(&MINT, &alice).unwrap(), 750);
        assert_eq!(txn.mint(&MINT).unwrap().supply, 750);
        assert!(matches!(
            txn.burn(&MINT, &alice, 751),
            Err(LedgerError::InsufficientFunds { .. })
        ));
    }

    #[test]
    fn self_transfer_keeps_balance() {
        let store = NullStore::new();
        let (_, alice) = setup(&store);
        let mut txn = Transaction::new(&store);
        txn.transfer(&MINT, &alice, &alice, 1_000).unwrap();
        assert_eq!(txn.balance(&MINT, &alice).unwrap(), 1_000);
    }

    #[test]
    fn unknown_mint_is_reported() {
        let store = NullStore::new();
        let mut txn = Transaction::new(&store);
        let err = txn
            .transfer(&Address::from_seed(9), &Address::from_seed(1), &Address::from_seed(2), 0)
            .unwrap_err();
        assert!(matches!(err, LedgerError::MintNotFound(_)));
    }
}

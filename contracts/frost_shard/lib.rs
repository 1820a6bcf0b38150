#![cfg_attr(not(feature = "std"), no_std, no_main)]

#[ink::contract]
mod frost_shard {
    use ink::prelude::string::String;
    use ink::storage::Mapping;

    pub const TOKEN_NAME: &str = "FROST SHARD";
    pub const TOKEN_SYMBOL: &str = "FROST";
    pub const TOKEN_DECIMALS: u8 = 18;

    /// One whole token in base units (10^decimals).
    pub const UNIT: Balance = 10_u128.pow(TOKEN_DECIMALS as u32);

    /// Allowance value that is never decremented by spending.
    pub const UNLIMITED_ALLOWANCE: Balance = u128::MAX;

    pub type Result<T> = core::result::Result<T, Error>;

    #[derive(scale::Encode, scale::Decode, Debug, Clone, Copy, PartialEq, Eq)]
    #[cfg_attr(feature = "std", derive(scale_info::TypeInfo))]
    pub enum Error {
        InvalidCap,
        SupplyExceedsCap,
        NotAdministrator,
        ZeroAddress,
        SelfTransfer,
        InsufficientBalance,
        InsufficientAllowance,
        AllowanceUnderflow,
        CapExceeded,
        Overflow,
    }

    /// Balance movement. `None` on either side stands for the null account
    /// (mint when `from` is `None`, burn when `to` is `None`).
    #[ink(event)]
    pub struct Transfer {
        #[ink(topic)]
        from: Option<AccountId>,
        #[ink(topic)]
        to: Option<AccountId>,
        value: Balance,
    }

    #[ink(event)]
    pub struct Approval {
        #[ink(topic)]
        owner: AccountId,
        #[ink(topic)]
        spender: AccountId,
        value: Balance,
    }

    #[ink(event)]
    pub struct OwnershipTransferred {
        #[ink(topic)]
        previous: Option<AccountId>,
        #[ink(topic)]
        new: AccountId,
    }

    #[ink(storage)]
    pub struct FrostShard {
        // administration
        owner_acc: AccountId,

        // token state
        cap: Balance,
        total_supply: Balance,
        balances: Mapping<AccountId, Balance>,
        allowances: Mapping<(AccountId, AccountId), Balance>,
    }

    fn zero_acc() -> AccountId {
        AccountId::from([0x00; 32])
    }

    fn ensure_not_zero(acc: AccountId) -> Result<()> {
        if acc == zero_acc() {
            return Err(Error::ZeroAddress)
        }
        Ok(())
    }

    /// Writes the rejection into the contract debug buffer and hands the error back.
    fn rejected(message: &str, err: Error) -> Error {
        ink::env::debug_println!("frost_shard: {} rejected: {:?}", message, err);
        err
    }

    impl FrostShard {
        // -------- constructors --------

        /// Deploys the token with `initial_supply` and `cap` given in whole
        /// tokens. The caller becomes administrator and receives the initial
        /// supply.
        #[ink(constructor)]
        pub fn new(initial_supply: Balance, cap: Balance) -> Result<Self> {
            if cap == 0 {
                return Err(rejected("new", Error::InvalidCap))
            }
            if initial_supply > cap {
                return Err(rejected("new", Error::SupplyExceedsCap))
            }
            let cap_val = cap
                .checked_mul(UNIT)
                .ok_or_else(|| rejected("new", Error::Overflow))?;
            let supply_val = initial_supply
                .checked_mul(UNIT)
                .ok_or_else(|| rejected("new", Error::Overflow))?;

            let caller_acc = Self::env().caller();
            let mut instance = Self {
                owner_acc: caller_acc,
                cap: cap_val,
                total_supply: 0,
                balances: Mapping::default(),
                allowances: Mapping::default(),
            };
            Self::env().emit_event(OwnershipTransferred {
                previous: None,
                new: caller_acc,
            });
            // the cap was checked against the unscaled amounts above
            instance.apply_mint(caller_acc, supply_val, supply_val, supply_val);
            Ok(instance)
        }

        // -------- modifiers (helpers) --------

        fn only_owner(&self) -> Result<()> {
            if self.env().caller() != self.owner_acc {
                return Err(Error::NotAdministrator)
            }
            Ok(())
        }

        // -------- read API --------

        #[ink(message)]
        pub fn name(&self) -> String {
            String::from(TOKEN_NAME)
        }

        #[ink(message)]
        pub fn symbol(&self) -> String {
            String::from(TOKEN_SYMBOL)
        }

        #[ink(message)]
        pub fn decimals(&self) -> u8 {
            TOKEN_DECIMALS
        }

        #[ink(message)]
        pub fn total_supply(&self) -> Balance {
            self.total_supply
        }

        #[ink(message)]
        pub fn cap(&self) -> Balance {
            self.cap
        }

        #[ink(message)]
        pub fn balance_of(&self, owner_acc: AccountId) -> Balance {
            self.balances.get(owner_acc).unwrap_or(0)
        }

        #[ink(message)]
        pub fn allowance(&self, owner_acc: AccountId, spender_acc: AccountId) -> Balance {
            self.allowances.get((owner_acc, spender_acc)).unwrap_or(0)
        }

        /// Current administrator.
        #[ink(message)]
        pub fn owner(&self) -> AccountId {
            self.owner_acc
        }

        // -------- holder API --------

        #[ink(message)]
        pub fn transfer(&mut self, to_acc: AccountId, amount_val: Balance) -> Result<()> {
            let from_acc = self.env().caller();
            let (new_from, new_to) = self
                .check_move(from_acc, to_acc, amount_val)
                .map_err(|err| rejected("transfer", err))?;
            self.apply_move(from_acc, to_acc, amount_val, new_from, new_to);
            Ok(())
        }

        /// Moves `amount_val` from `from_acc` to `to_acc` out of the caller's
        /// allowance. Allowance failures are reported before balance failures.
        #[ink(message)]
        pub fn transfer_from(
            &mut self,
            from_acc: AccountId,
            to_acc: AccountId,
            amount_val: Balance,
        ) -> Result<()> {
            let spender_acc = self.env().caller();
            let remaining_opt = self
                .check_spend(from_acc, spender_acc, amount_val)
                .map_err(|err| rejected("transfer_from", err))?;
            let (new_from, new_to) = self
                .check_move(from_acc, to_acc, amount_val)
                .map_err(|err| rejected("transfer_from", err))?;

            if let Some(remaining_val) = remaining_opt {
                self.write_allowance(from_acc, spender_acc, remaining_val);
            }
            self.apply_move(from_acc, to_acc, amount_val, new_from, new_to);
            Ok(())
        }

        /// Sets the caller's allowance for `spender_acc`, replacing any prior value.
        #[ink(message)]
        pub fn approve(&mut self, spender_acc: AccountId, amount_val: Balance) -> Result<()> {
            let owner_acc = self.env().caller();
            self.set_allowance(owner_acc, spender_acc, amount_val)
                .map_err(|err| rejected("approve", err))
        }

        #[ink(message)]
        pub fn increase_allowance(&mut self, spender_acc: AccountId, add_val: Balance) -> Result<()> {
            let owner_acc = self.env().caller();
            let current_val = self.allowance(owner_acc, spender_acc);
            current_val
                .checked_add(add_val)
                .ok_or(Error::Overflow)
                .and_then(|new_val| self.set_allowance(owner_acc, spender_acc, new_val))
                .map_err(|err| rejected("increase_allowance", err))
        }

        #[ink(message)]
        pub fn decrease_allowance(&mut self, spender_acc: AccountId, sub_val: Balance) -> Result<()> {
            let owner_acc = self.env().caller();
            let current_val = self.allowance(owner_acc, spender_acc);
            current_val
                .checked_sub(sub_val)
                .ok_or(Error::AllowanceUnderflow)
                .and_then(|new_val| self.set_allowance(owner_acc, spender_acc, new_val))
                .map_err(|err| rejected("decrease_allowance", err))
        }

        /// Burns `amount_val` of `account`'s tokens out of the caller's allowance.
        ///
        /// Unlike `burn` this does not require the administrator: any spender
        /// holding enough allowance may destroy the owner's tokens.
        #[ink(message)]
        pub fn burn_from(&mut self, account: AccountId, amount_val: Balance) -> Result<()> {
            let spender_acc = self.env().caller();
            let remaining_opt = self
                .check_spend(account, spender_acc, amount_val)
                .map_err(|err| rejected("burn_from", err))?;
            let (new_bal, new_total) = self
                .check_burn(account, amount_val)
                .map_err(|err| rejected("burn_from", err))?;

            if let Some(remaining_val) = remaining_opt {
                self.write_allowance(account, spender_acc, remaining_val);
            }
            self.apply_burn(account, amount_val, new_bal, new_total);
            Ok(())
        }

        // -------- admin API --------

        #[ink(message)]
        pub fn mint(&mut self, account: AccountId, amount_val: Balance) -> Result<()> {
            let (new_bal, new_total) = self
                .only_owner()
                .and_then(|()| self.check_mint(account, amount_val))
                .map_err(|err| rejected("mint", err))?;
            self.apply_mint(account, amount_val, new_bal, new_total);
            Ok(())
        }

        #[ink(message)]
        pub fn burn(&mut self, account: AccountId, amount_val: Balance) -> Result<()> {
            let (new_bal, new_total) = self
                .only_owner()
                .and_then(|()| self.check_burn(account, amount_val))
                .map_err(|err| rejected("burn", err))?;
            self.apply_burn(account, amount_val, new_bal, new_total);
            Ok(())
        }

        /// Hands administration to `new_owner`. Re-appointing the current
        /// administrator is allowed.
        #[ink(message)]
        pub fn transfer_ownership(&mut self, new_owner: AccountId) -> Result<()> {
            self.only_owner()
                .and_then(|()| ensure_not_zero(new_owner))
                .map_err(|err| rejected("transfer_ownership", err))?;
            self.env().emit_event(OwnershipTransferred {
                previous: Some(self.owner_acc),
                new: new_owner,
            });
            self.owner_acc = new_owner;
            Ok(())
        }

        // ---- internals ----
        //
        // `check_*` validate and compute the post-state without writing;
        // `apply_*` / `write_*` only run once every check of a message passed.

        /// Returns the allowance left after the spend, or `None` when the
        /// approval is unlimited and stays untouched.
        fn check_spend(
            &self,
            owner_acc: AccountId,
            spender_acc: AccountId,
            amount_val: Balance,
        ) -> Result<Option<Balance>> {
            let current_val = self.allowance(owner_acc, spender_acc);
            if current_val == UNLIMITED_ALLOWANCE {
                return Ok(None)
            }
            if current_val < amount_val {
                return Err(Error::InsufficientAllowance)
            }
            ensure_not_zero(owner_acc)?;
            ensure_not_zero(spender_acc)?;
            let remaining_val = current_val.checked_sub(amount_val).ok_or(Error::Overflow)?;
            Ok(Some(remaining_val))
        }

        fn check_move(
            &self,
            from_acc: AccountId,
            to_acc: AccountId,
            amount_val: Balance,
        ) -> Result<(Balance, Balance)> {
            ensure_not_zero(from_acc)?;
            ensure_not_zero(to_acc)?;
            if from_acc == to_acc {
                return Err(Error::SelfTransfer)
            }
            let from_bal = self.balance_of(from_acc);
            if from_bal < amount_val {
                return Err(Error::InsufficientBalance)
            }
            let new_from = from_bal.checked_sub(amount_val).ok_or(Error::Overflow)?;
            let new_to = self.balance_of(to_acc).checked_add(amount_val).ok_or(Error::Overflow)?;
            Ok((new_from, new_to))
        }

        fn check_mint(&self, to_acc: AccountId, amount_val: Balance) -> Result<(Balance, Balance)> {
            ensure_not_zero(to_acc)?;
            let new_total = self
                .total_supply
                .checked_add(amount_val)
                .filter(|total| *total <= self.cap)
                .ok_or(Error::CapExceeded)?;
            // balance <= total_supply, so this cannot overflow once the cap check passed
            let new_bal = self.balance_of(to_acc).checked_add(amount_val).ok_or(Error::Overflow)?;
            Ok((new_bal, new_total))
        }

        fn check_burn(&self, from_acc: AccountId, amount_val: Balance) -> Result<(Balance, Balance)> {
            ensure_not_zero(from_acc)?;
            let from_bal = self.balance_of(from_acc);
            if from_bal < amount_val {
                return Err(Error::InsufficientBalance)
            }
            let new_bal = from_bal.checked_sub(amount_val).ok_or(Error::Overflow)?;
            let new_total = self.total_supply.checked_sub(amount_val).ok_or(Error::Overflow)?;
            Ok((new_bal, new_total))
        }

        fn set_allowance(
            &mut self,
            owner_acc: AccountId,
            spender_acc: AccountId,
            amount_val: Balance,
        ) -> Result<()> {
            ensure_not_zero(owner_acc)?;
            ensure_not_zero(spender_acc)?;
            self.write_allowance(owner_acc, spender_acc, amount_val);
            Ok(())
        }

        fn write_allowance(&mut self, owner_acc: AccountId, spender_acc: AccountId, value: Balance) {
            self.allowances.insert((owner_acc, spender_acc), &value);
            self.env().emit_event(Approval {
                owner: owner_acc,
                spender: spender_acc,
                value,
            });
        }

        fn apply_move(
            &mut self,
            from_acc: AccountId,
            to_acc: AccountId,
            amount_val: Balance,
            new_from: Balance,
            new_to: Balance,
        ) {
            self.balances.insert(from_acc, &new_from);
            self.balances.insert(to_acc, &new_to);
            self.env().emit_event(Transfer {
                from: Some(from_acc),
                to: Some(to_acc),
                value: amount_val,
            });
        }

        fn apply_mint(&mut self, to_acc: AccountId, amount_val: Balance, new_bal: Balance, new_total: Balance) {
            self.balances.insert(to_acc, &new_bal);
            self.total_supply = new_total;
            self.env().emit_event(Transfer {
                from: None,
                to: Some(to_acc),
                value: amount_val,
            });
        }

        fn apply_burn(&mut self, from_acc: AccountId, amount_val: Balance, new_bal: Balance, new_total: Balance) {
            self.balances.insert(from_acc, &new_bal);
            self.total_supply = new_total;
            self.env().emit_event(Transfer {
                from: Some(from_acc),
                to: None,
                value: amount_val,
            });
        }
    }


    #[cfg(all(test, feature = "e2e-tests"))]
    mod e2e_tests {
        use super::*;
        use ink_e2e::ContractsBackend;

        type E2EResult<T> = std::result::Result<T, Box<dyn std::error::Error>>;

        #[ink_e2e::test]
        async fn e2e_deploy_and_transfer<Client: E2EBackend>(mut client: Client) -> E2EResult<()> {
            let mut constructor = FrostShardRef::new(1_000, 5_000);
            let contract = client
                .instantiate("frost_shard", &ink_e2e::alice(), &mut constructor)
                .submit()
                .await
                .expect("instantiate failed");
            let mut call_builder = contract.call_builder::<FrostShard>();

            let bob_acc = ink_e2e::account_id(ink_e2e::AccountKeyring::Bob);
            let transfer = call_builder.transfer(bob_acc, 100 * UNIT);
            let _transfer_res = client
                .call(&ink_e2e::alice(), &transfer)
                .submit()
                .await
                .expect("transfer failed");

            let balance_of = call_builder.balance_of(bob_acc);
            let balance_res = client.call(&ink_e2e::alice(), &balance_of).dry_run().await?;
            assert_eq!(balance_res.return_value(), 100 * UNIT);

            let total_supply = call_builder.total_supply();
            let supply_res = client.call(&ink_e2e::alice(), &total_supply).dry_run().await?;
            assert_eq!(supply_res.return_value(), 1_000 * UNIT);

            Ok(())
        }

        #[ink_e2e::test]
        async fn e2e_mint_requires_administrator<Client: E2EBackend>(mut client: Client) -> E2EResult<()> {
            let mut constructor = FrostShardRef::new(0, 10);
            let contract = client
                .instantiate("frost_shard", &ink_e2e::alice(), &mut constructor)
                .submit()
                .await
                .expect("instantiate failed");
            let mut call_builder = contract.call_builder::<FrostShard>();

            let bob_acc = ink_e2e::account_id(ink_e2e::AccountKeyring::Bob);
            let mint = call_builder.mint(bob_acc, 10 * UNIT);
            let bob_mint = client.call(&ink_e2e::bob(), &mint).submit().await;
            assert!(bob_mint.is_err(), "mint by a non-administrator should fail");

            let _alice_mint = client
                .call(&ink_e2e::alice(), &mint)
                .submit()
                .await
                .expect("administrator mint failed");

            let over_cap = call_builder.mint(bob_acc, 1);
            let over_cap_res = client.call(&ink_e2e::alice(), &over_cap).submit().await;
            assert!(over_cap_res.is_err(), "mint past the cap should fail");

            let total_supply = call_builder.total_supply();
            let supply_res = client.call(&ink_e2e::alice(), &total_supply).dry_run().await?;
            assert_eq!(supply_res.return_value(), 10 * UNIT);

            Ok(())
        }
    }
}

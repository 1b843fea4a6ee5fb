use concordium_std::*;
pub use sale_utils::{
    error::{ContractError, ContractResult, CustomContractError},
    schedule::{PurchaserState, VestingSchedule},
    types::*,
};

/// Sale window and pricing for the public sale.
#[derive(Debug, Serialize, SchemaType, Clone)]
#[cfg_attr(any(feature = "wasm-test", test), derive(PartialEq))]
pub struct SaleWindow {
    /// Sale start time
    pub(crate) start_at: Timestamp,
    /// Sale end time, still open at this exact moment
    pub(crate) close_at: Timestamp,
    /// Smallest token amount a single purchase may buy
    pub(crate) min_purchase: ContractTokenAmount,
    /// Largest token amount a single purchase may buy
    pub(crate) max_purchase: ContractTokenAmount,
    /// Price in micro CCD per project token
    pub(crate) price_per_token: MicroCcd,
}

impl SaleWindow {
    pub(crate) fn new(
        start_at: Timestamp,
        close_at: Timestamp,
        min_purchase: ContractTokenAmount,
        max_purchase: ContractTokenAmount,
        price_per_token: MicroCcd,
    ) -> Result<Self, CustomContractError> {
        ensure!(start_at < close_at, CustomContractError::InvalidSchedule);
        ensure!(min_purchase.0 > 0, CustomContractError::InvalidAmount);
        ensure!(
            min_purchase <= max_purchase,
            CustomContractError::InvalidAmount
        );
        ensure!(price_per_token > 0, CustomContractError::InvalidAmount);

        Ok(SaleWindow {
            start_at,
            close_at,
            min_purchase,
            max_purchase,
            price_per_token,
        })
    }

    pub(crate) fn is_active(&self, now: Timestamp) -> bool {
        self.start_at <= now && now <= self.close_at
    }

    /// Tokens bought for `paid`, truncating any sub-price remainder.
    /// The remainder stays with the contract like the rest of the
    /// payment.
    pub(crate) fn token_amount(&self, paid: Amount) -> ContractTokenAmount {
        ContractTokenAmount::from(paid.micro_ccd / self.price_per_token)
    }
}

/// The contract state
#[derive(Debug, Serial, DeserialWithState, StateClone)]
#[concordium(state_parameter = "S")]
pub struct State<S: HasStateApi> {
    /// If `true`, purchases and claims stop working
    pub(crate) paused: bool,
    /// CIS2 contract of the token being sold
    pub(crate) project_token: ContractAddress,
    /// Release schedule shared by every purchaser
    pub(crate) schedule: VestingSchedule,
    /// When and at what price the sale runs
    pub(crate) window: SaleWindow,
    /// Accounts permitted to purchase. Membership alone holds no
    /// allocation and never expires.
    pub(crate) whitelist: StateSet<AccountAddress, S>,
    /// Per-beneficiary allocation and claim bookkeeping
    pub(crate) purchasers: StateMap<AccountAddress, PurchaserState, S>,
}

impl<S: HasStateApi> State<S> {
    pub(crate) fn new(
        state_builder: &mut StateBuilder<S>,
        project_token: ContractAddress,
        schedule: VestingSchedule,
        window: SaleWindow,
    ) -> Self {
        State {
            paused: false,
            project_token,
            schedule,
            window,
            whitelist: state_builder.new_set(),
            purchasers: state_builder.new_map(),
        }
    }

    /// Insertion is idempotent, listing an account twice is fine.
    pub(crate) fn whitelisting(&mut self, account: &AccountAddress) {
        let _ = self.whitelist.insert(*account);
    }

    pub(crate) fn is_whitelisted(&self, account: &AccountAddress) -> bool {
        self.whitelist.contains(account)
    }

    /// Records a fixed allocation for a new beneficiary. No tokens
    /// move here; the pool is assumed to be funded already.
    pub(crate) fn register_allocation(
        &mut self,
        purchaser: &AccountAddress,
        amount: ContractTokenAmount,
    ) -> ContractResult<()> {
        ensure!(amount.0 > 0, CustomContractError::InvalidAmount.into());
        ensure!(
            self.purchasers.get(purchaser).is_none(),
            CustomContractError::AlreadyRegistered.into()
        );
        let _ = self
            .purchasers
            .insert(*purchaser, PurchaserState::new(amount));
        Ok(())
    }

    /// Converts `paid` CCD into a recorded allocation for `purchaser`.
    /// One purchase per account, ever.
    pub(crate) fn purchase(
        &mut self,
        purchaser: &AccountAddress,
        paid: Amount,
        now: Timestamp,
    ) -> ContractResult<ContractTokenAmount> {
        ensure!(
            self.is_whitelisted(purchaser),
            CustomContractError::NotWhitelisted.into()
        );
        ensure!(
            self.window.is_active(now),
            CustomContractError::SaleNotActive.into()
        );

        let amount = self.window.token_amount(paid);
        ensure!(
            self.window.min_purchase <= amount && amount <= self.window.max_purchase,
            CustomContractError::AmountOutOfRange.into()
        );
        ensure!(
            self.purchasers.get(purchaser).is_none(),
            CustomContractError::AlreadyPurchased.into()
        );

        let _ = self
            .purchasers
            .insert(*purchaser, PurchaserState::new(amount));
        Ok(amount)
    }

    /// Books the currently releasable amount on the purchaser record
    /// and returns it. An account without an allocation gets the same
    /// `NoClaimableAmount` as one that has nothing new to claim.
    pub(crate) fn claim(
        &mut self,
        purchaser: &AccountAddress,
        now: Timestamp,
    ) -> ContractResult<ContractTokenAmount> {
        let mut purchaser_state = self
            .purchasers
            .get_mut(purchaser)
            .ok_or(ContractError::from(CustomContractError::NoClaimableAmount))?;
        self.schedule.claim_release(&mut purchaser_state, now)
    }

    pub(crate) fn get_purchaser(&self, purchaser: &AccountAddress) -> Option<PurchaserState> {
        self.purchasers.get(purchaser).map(|p| p.clone())
    }
}

#[cfg(any(feature = "wasm-test", test))]
/// implements PartialEq for `claim_eq` inside test functions.
impl<S: HasStateApi> PartialEq for State<S> {
    fn eq(&self, other: &Self) -> bool {
        if self.paused != other.paused {
            return false;
        }
        if self.project_token != other.project_token {
            return false;
        }
        if self.schedule != other.schedule {
            return false;
        }
        if self.window != other.window {
            return false;
        }
        if self.whitelist.iter().count() != other.whitelist.iter().count() {
            return false;
        }
        for account in self.whitelist.iter() {
            if !other.whitelist.contains(&account) {
                return false;
            }
        }
        if self.purchasers.iter().count() != other.purchasers.iter().count() {
            return false;
        }
        for (my_addr, my_state) in self.purchasers.iter() {
            let other_state = other.purchasers.get(&my_addr);
            if other_state.is_none() {
                return false;
            }
            let other_state = other_state.unwrap();
            if my_state.clone() != other_state.clone() {
                return false;
            }
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_infrastructure::*;

    const PURCHASER1_ACC: AccountAddress = AccountAddress([10u8; 32]);
    const TOKEN_CONTRACT: ContractAddress = ContractAddress {
        index: 1000,
        subindex: 0,
    };

    fn schedule() -> VestingSchedule {
        VestingSchedule::new(
            Timestamp::from_timestamp_millis(1_000),
            20,
            Duration::from_millis(100),
            Duration::from_millis(200),
            Duration::from_millis(50),
            4,
        )
        .unwrap_abort()
    }

    /// Sale open over [100, 500], 2 micro CCD per token, purchases
    /// between 50 and 10_000 tokens.
    fn window() -> SaleWindow {
        SaleWindow::new(
            Timestamp::from_timestamp_millis(100),
            Timestamp::from_timestamp_millis(500),
            50.into(),
            10_000.into(),
            2,
        )
        .unwrap_abort()
    }

    #[test]
    fn test_window_validation() {
        let ret = SaleWindow::new(
            Timestamp::from_timestamp_millis(500),
            Timestamp::from_timestamp_millis(100),
            50.into(),
            5_000.into(),
            2,
        );
        claim_eq!(ret, Err(CustomContractError::InvalidSchedule));

        let ret = SaleWindow::new(
            Timestamp::from_timestamp_millis(100),
            Timestamp::from_timestamp_millis(500),
            0.into(),
            5_000.into(),
            2,
        );
        claim_eq!(ret, Err(CustomContractError::InvalidAmount));

        let ret = SaleWindow::new(
            Timestamp::from_timestamp_millis(100),
            Timestamp::from_timestamp_millis(500),
            50.into(),
            5_000.into(),
            0,
        );
        claim_eq!(ret, Err(CustomContractError::InvalidAmount));
    }

    #[test]
    fn test_window_bounds_are_inclusive() {
        let window = window();
        claim!(!window.is_active(Timestamp::from_timestamp_millis(99)));
        claim!(window.is_active(Timestamp::from_timestamp_millis(100)));
        claim!(window.is_active(Timestamp::from_timestamp_millis(500)));
        claim!(!window.is_active(Timestamp::from_timestamp_millis(501)));
    }

    #[test]
    fn test_token_amount_truncates() {
        let window = window();
        claim_eq!(
            window.token_amount(Amount::from_micro_ccd(11_000)),
            ContractTokenAmount::from(5_500)
        );
        // the odd micro CCD is custodied, not converted
        claim_eq!(
            window.token_amount(Amount::from_micro_ccd(201)),
            ContractTokenAmount::from(100)
        );
    }

    #[test]
    fn test_purchase_records_allocation() {
        let mut state_builder = TestStateBuilder::new();
        let mut state = State::new(&mut state_builder, TOKEN_CONTRACT, schedule(), window());
        state.whitelisting(&PURCHASER1_ACC);

        let amount = state
            .purchase(
                &PURCHASER1_ACC,
                Amount::from_micro_ccd(11_000),
                Timestamp::from_timestamp_millis(200),
            )
            .unwrap();

        claim_eq!(amount, ContractTokenAmount::from(5_500));
        claim_eq!(
            state.get_purchaser(&PURCHASER1_ACC),
            Some(PurchaserState {
                purchased_amount: 5_500.into(),
                claimed_amount: 0.into(),
            })
        );
    }

    #[test]
    fn test_purchase_gating() {
        let mut state_builder = TestStateBuilder::new();
        let mut state = State::new(&mut state_builder, TOKEN_CONTRACT, schedule(), window());
        let paid = Amount::from_micro_ccd(11_000);
        let on_sale = Timestamp::from_timestamp_millis(200);

        // not whitelisted
        let ret = state.purchase(&PURCHASER1_ACC, paid, on_sale);
        claim_eq!(ret, Err(CustomContractError::NotWhitelisted.into()));

        state.whitelisting(&PURCHASER1_ACC);

        // outside the window, both sides
        let ret = state.purchase(&PURCHASER1_ACC, paid, Timestamp::from_timestamp_millis(99));
        claim_eq!(ret, Err(CustomContractError::SaleNotActive.into()));
        let ret = state.purchase(&PURCHASER1_ACC, paid, Timestamp::from_timestamp_millis(501));
        claim_eq!(ret, Err(CustomContractError::SaleNotActive.into()));

        // below the minimum and above the maximum
        let ret = state.purchase(&PURCHASER1_ACC, Amount::from_micro_ccd(98), on_sale);
        claim_eq!(ret, Err(CustomContractError::AmountOutOfRange.into()));
        let ret = state.purchase(&PURCHASER1_ACC, Amount::from_micro_ccd(20_002), on_sale);
        claim_eq!(ret, Err(CustomContractError::AmountOutOfRange.into()));

        // a successful purchase, then a second attempt
        state.purchase(&PURCHASER1_ACC, paid, on_sale).unwrap();
        let ret = state.purchase(&PURCHASER1_ACC, paid, on_sale);
        claim_eq!(ret, Err(CustomContractError::AlreadyPurchased.into()));
    }

    #[test]
    fn test_whitelisting_is_idempotent() {
        let mut state_builder = TestStateBuilder::new();
        let mut state = State::new(&mut state_builder, TOKEN_CONTRACT, schedule(), window());

        state.whitelisting(&PURCHASER1_ACC);
        state.whitelisting(&PURCHASER1_ACC);

        claim!(state.is_whitelisted(&PURCHASER1_ACC));
        claim_eq!(state.whitelist.iter().count(), 1);
    }
}

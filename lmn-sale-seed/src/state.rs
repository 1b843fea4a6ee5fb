use concordium_std::*;
pub use sale_utils::{
    error::{ContractError, ContractResult, CustomContractError},
    schedule::{PurchaserState, VestingSchedule},
    types::*,
};

/// The contract state
#[derive(Debug, Serial, DeserialWithState, StateClone)]
#[concordium(state_parameter = "S")]
pub struct State<S: HasStateApi> {
    /// If `true`, claims stop working
    pub(crate) paused: bool,
    /// CIS2 contract of the token being distributed
    pub(crate) project_token: ContractAddress,
    /// Release schedule shared by every purchaser
    pub(crate) schedule: VestingSchedule,
    /// Per-beneficiary allocation and claim bookkeeping
    pub(crate) purchasers: StateMap<AccountAddress, PurchaserState, S>,
}

impl<S: HasStateApi> State<S> {
    pub(crate) fn new(
        state_builder: &mut StateBuilder<S>,
        project_token: ContractAddress,
        schedule: VestingSchedule,
    ) -> Self {
        State {
            paused: false,
            project_token,
            schedule,
            purchasers: state_builder.new_map(),
        }
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
    const PURCHASER2_ACC: AccountAddress = AccountAddress([11u8; 32]);
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

    #[test]
    fn test_register_allocation() {
        let mut state_builder = TestStateBuilder::new();
        let mut state = State::new(&mut state_builder, TOKEN_CONTRACT, schedule());

        state
            .register_allocation(&PURCHASER1_ACC, 5_500.into())
            .unwrap();

        assert_eq!(
            state.get_purchaser(&PURCHASER1_ACC),
            Some(PurchaserState {
                purchased_amount: 5_500.into(),
                claimed_amount: 0.into(),
            }),
            "something wrong with the registered allocation!"
        );
        assert_eq!(state.get_purchaser(&PURCHASER2_ACC), None);
    }

    #[test]
    fn test_register_allocation_twice() {
        let mut state_builder = TestStateBuilder::new();
        let mut state = State::new(&mut state_builder, TOKEN_CONTRACT, schedule());

        state
            .register_allocation(&PURCHASER1_ACC, 5_500.into())
            .unwrap();
        let ret = state.register_allocation(&PURCHASER1_ACC, 100.into());

        claim_eq!(
            ret,
            Err(CustomContractError::AlreadyRegistered.into()),
            "a second allocation for the same account should reject"
        );
        // the first allocation is untouched
        claim_eq!(
            state.get_purchaser(&PURCHASER1_ACC).unwrap().purchased_amount,
            ContractTokenAmount::from(5_500)
        );
    }

    #[test]
    fn test_register_zero_allocation() {
        let mut state_builder = TestStateBuilder::new();
        let mut state = State::new(&mut state_builder, TOKEN_CONTRACT, schedule());

        let ret = state.register_allocation(&PURCHASER1_ACC, 0.into());
        claim_eq!(ret, Err(CustomContractError::InvalidAmount.into()));
    }

    #[test]
    fn test_claim_updates_bookkeeping() {
        let mut state_builder = TestStateBuilder::new();
        let mut state = State::new(&mut state_builder, TOKEN_CONTRACT, schedule());
        state
            .register_allocation(&PURCHASER1_ACC, 5_500.into())
            .unwrap();

        let amount = state
            .claim(&PURCHASER1_ACC, Timestamp::from_timestamp_millis(1_100))
            .unwrap();
        claim_eq!(amount.0, 1_100);
        claim_eq!(
            state.get_purchaser(&PURCHASER1_ACC).unwrap().claimed_amount,
            ContractTokenAmount::from(1_100)
        );
    }

    #[test]
    fn test_claim_without_allocation() {
        let mut state_builder = TestStateBuilder::new();
        let mut state = State::new(&mut state_builder, TOKEN_CONTRACT, schedule());

        let ret = state.claim(&PURCHASER1_ACC, Timestamp::from_timestamp_millis(9_999));
        claim_eq!(ret, Err(CustomContractError::NoClaimableAmount.into()));
    }
}

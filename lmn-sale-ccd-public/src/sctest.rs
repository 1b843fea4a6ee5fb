use crate::{test_infrastructure::*, *};

pub(crate) const ADMIN_ACC: AccountAddress = AccountAddress([0u8; 32]);
pub(crate) const PURCHASER1_ACC: AccountAddress = AccountAddress([10u8; 32]);
pub(crate) const PURCHASER2_ACC: AccountAddress = AccountAddress([11u8; 32]);
pub(crate) const TOKEN_CONTRACT: ContractAddress = ContractAddress {
    index: 1000,
    subindex: 0,
};
pub(crate) const SELF_ADDRESS: ContractAddress = ContractAddress {
    index: 0,
    subindex: 0,
};

/// 11_000 micro CCD buys 5_500 tokens at the default price.
pub(crate) const PAID_CCD: Amount = Amount::from_micro_ccd(11_000);
pub(crate) const BOUGHT_TOKENS: u64 = 5_500;

/// Sale over [100, 500], 2 micro CCD per token, purchases between 50
/// and 10_000 tokens. Vesting: TGE at 1000ms, 20% unlocked 100ms
/// later, 200ms cliff, then 4 installments of 50ms each.
pub(crate) fn init_parameter() -> InitParams {
    InitParams {
        project_token: TOKEN_CONTRACT,
        tge_time: Timestamp::from_timestamp_millis(1_000),
        tge_release_percent: 20,
        tge_release_lock_duration: Duration::from_millis(100),
        cliff_duration: Duration::from_millis(200),
        period: Duration::from_millis(50),
        periodic_vesting_times: 4,
        start_at: Timestamp::from_timestamp_millis(100),
        close_at: Timestamp::from_timestamp_millis(500),
        min_purchase: ContractTokenAmount::from(50),
        max_purchase: ContractTokenAmount::from(10_000),
        price_per_token: 2,
    }
}

pub(crate) fn default_schedule() -> VestingSchedule {
    let params = init_parameter();
    VestingSchedule::new(
        params.tge_time,
        params.tge_release_percent,
        params.tge_release_lock_duration,
        params.cliff_duration,
        params.period,
        params.periodic_vesting_times,
    )
    .unwrap_abort()
}

pub(crate) fn default_window() -> SaleWindow {
    let params = init_parameter();
    SaleWindow::new(
        params.start_at,
        params.close_at,
        params.min_purchase,
        params.max_purchase,
        params.price_per_token,
    )
    .unwrap_abort()
}

pub(crate) fn initial_state<S: HasStateApi>(state_builder: &mut StateBuilder<S>) -> State<S> {
    State::new(
        state_builder,
        TOKEN_CONTRACT,
        default_schedule(),
        default_window(),
    )
}

mod admin;
mod participant;

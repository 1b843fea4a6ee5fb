use crate::state::{State, *};
use concordium_std::*;

#[derive(Debug, Serialize, SchemaType)]
struct ViewResponse {
    paused: bool,
    project_token: ContractAddress,
    schedule: VestingSchedule,
}

#[receive(contract = "lmn_sale_seed", name = "view", return_value = "ViewResponse")]
fn contract_view<S: HasStateApi>(
    _ctx: &impl HasReceiveContext,
    host: &impl HasHost<State<S>, StateApiType = S>,
) -> ReceiveResult<ViewResponse> {
    let state = host.state();

    Ok(ViewResponse {
        paused: state.paused,
        project_token: state.project_token,
        schedule: state.schedule.clone(),
    })
}

// ------------------------------------------

type ViewPurchasersResponse = Vec<(AccountAddress, PurchaserState)>;

#[receive(
    contract = "lmn_sale_seed",
    name = "viewPurchasers",
    return_value = "ViewPurchasersResponse"
)]
fn contract_view_purchasers<S: HasStateApi>(
    _ctx: &impl HasReceiveContext,
    host: &impl HasHost<State<S>, StateApiType = S>,
) -> ReceiveResult<ViewPurchasersResponse> {
    let state = host.state();

    let mut ret: ViewPurchasersResponse = Vec::new();
    for (addr, purchaser_state) in state.purchasers.iter() {
        ret.push((*addr, purchaser_state.clone()));
    }

    Ok(ret)
}

// ------------------------------------------

/// Per-beneficiary record. Accounts that never received an allocation
/// read as an all-zero record rather than an error.
#[receive(
    contract = "lmn_sale_seed",
    name = "purchases",
    parameter = "AccountAddress",
    return_value = "PurchaserState"
)]
fn contract_purchases<S: HasStateApi>(
    ctx: &impl HasReceiveContext,
    host: &impl HasHost<State<S>, StateApiType = S>,
) -> ReceiveResult<PurchaserState> {
    let addr: AccountAddress = ctx.parameter_cursor().get()?;

    Ok(host
        .state()
        .get_purchaser(&addr)
        .unwrap_or_else(PurchaserState::empty))
}

/// Amount the given account could claim at the current slot time.
#[receive(
    contract = "lmn_sale_seed",
    name = "releasableAmount",
    parameter = "AccountAddress",
    error = "ContractError",
    return_value = "ContractTokenAmount"
)]
fn contract_releasable_amount<S: HasStateApi>(
    ctx: &impl HasReceiveContext,
    host: &impl HasHost<State<S>, StateApiType = S>,
) -> ContractResult<ContractTokenAmount> {
    let addr: AccountAddress = ctx.parameter_cursor().get()?;
    let state = host.state();

    let purchaser = match state.get_purchaser(&addr) {
        Some(v) => v,
        None => return Ok(ContractTokenAmount::from(0)),
    };

    state
        .schedule
        .releasable_amount(&purchaser, ctx.metadata().slot_time())
}

// ------------------------------------------
// The schedule constants as individual queries

#[receive(contract = "lmn_sale_seed", name = "tgeTime", return_value = "Timestamp")]
fn contract_tge_time<S: HasStateApi>(
    _ctx: &impl HasReceiveContext,
    host: &impl HasHost<State<S>, StateApiType = S>,
) -> ReceiveResult<Timestamp> {
    Ok(host.state().schedule.tge_time)
}

#[receive(
    contract = "lmn_sale_seed",
    name = "tgeReleasePercent",
    return_value = "AllowedPercentage"
)]
fn contract_tge_release_percent<S: HasStateApi>(
    _ctx: &impl HasReceiveContext,
    host: &impl HasHost<State<S>, StateApiType = S>,
) -> ReceiveResult<AllowedPercentage> {
    Ok(host.state().schedule.tge_release_percent)
}

#[receive(
    contract = "lmn_sale_seed",
    name = "tgeReleaseLockDuration",
    return_value = "Duration"
)]
fn contract_tge_release_lock_duration<S: HasStateApi>(
    _ctx: &impl HasReceiveContext,
    host: &impl HasHost<State<S>, StateApiType = S>,
) -> ReceiveResult<Duration> {
    Ok(host.state().schedule.tge_release_lock_duration)
}

#[receive(
    contract = "lmn_sale_seed",
    name = "cliffDuration",
    return_value = "Duration"
)]
fn contract_cliff_duration<S: HasStateApi>(
    _ctx: &impl HasReceiveContext,
    host: &impl HasHost<State<S>, StateApiType = S>,
) -> ReceiveResult<Duration> {
    Ok(host.state().schedule.cliff_duration)
}

#[receive(contract = "lmn_sale_seed", name = "period", return_value = "Duration")]
fn contract_period<S: HasStateApi>(
    _ctx: &impl HasReceiveContext,
    host: &impl HasHost<State<S>, StateApiType = S>,
) -> ReceiveResult<Duration> {
    Ok(host.state().schedule.period)
}

#[receive(
    contract = "lmn_sale_seed",
    name = "periodicVestingTimes",
    return_value = "u64"
)]
fn contract_periodic_vesting_times<S: HasStateApi>(
    _ctx: &impl HasReceiveContext,
    host: &impl HasHost<State<S>, StateApiType = S>,
) -> ReceiveResult<u64> {
    Ok(host.state().schedule.periodic_vesting_times)
}

//! This contract distributes a fixed pool of the Lumen project token
//! to purchasers registered by the administrator, released over a
//! TGE + cliff + periodic vesting schedule.
#[cfg(any(feature = "wasm-test", test))]
mod sctest;
mod state;
mod view;

use concordium_cis2::{AdditionalData, Receiver, TokenIdUnit, Transfer, TransferParams};
use concordium_std::*;
use sale_utils::{ClaimedEvent, PurchasedEvent, SaleEvent};
use state::{State, *};

/// The parameter schema for `init` function.
#[derive(Debug, Serialize, SchemaType)]
pub struct InitParams {
    /// CIS2 contract of the token being distributed
    pub project_token: ContractAddress,
    /// Reference time all vesting delays are measured from
    pub tge_time: Timestamp,
    /// Percentage of each allocation released at TGE
    pub tge_release_percent: AllowedPercentage,
    /// Additional lock after TGE before the initial portion is claimable
    pub tge_release_lock_duration: Duration,
    /// Delay after the initial unlock before periodic vesting starts
    pub cliff_duration: Duration,
    /// Length of one vesting installment
    pub period: Duration,
    /// Number of equal installments for the remaining percentage
    pub periodic_vesting_times: u64,
}

/// # Init Function
/// The account instantiating the contract becomes the administrator.
/// The schedule is fixed here and cannot be changed afterwards.
#[init(contract = "lmn_sale_seed", parameter = "InitParams")]
fn contract_init<S: HasStateApi>(
    ctx: &impl HasInitContext,
    state_builder: &mut StateBuilder<S>,
) -> InitResult<State<S>> {
    let params: InitParams = ctx.parameter_cursor().get()?;

    let schedule = VestingSchedule::new(
        params.tge_time,
        params.tge_release_percent,
        params.tge_release_lock_duration,
        params.cliff_duration,
        params.period,
        params.periodic_vesting_times,
    )?;

    Ok(State::new(state_builder, params.project_token, schedule))
}

// ==============================================
// For the administrator
// ==========================================

/// Claims cannot be executed while the contract is paused.
///
/// Caller: contract instance owner only
/// Reject if:
/// - The sender is not the contract owner.
#[receive(
    contract = "lmn_sale_seed",
    name = "setPaused",
    error = "ContractError",
    mutable
)]
fn contract_set_paused<S: HasStateApi>(
    ctx: &impl HasReceiveContext,
    host: &mut impl HasHost<State<S>, StateApiType = S>,
) -> ContractResult<()> {
    ensure!(
        ctx.sender().matches_account(&ctx.owner()),
        ContractError::Unauthorized
    );
    host.state_mut().paused = true;
    Ok(())
}

/// The contract is unpaused.
///
/// Caller: contract instance owner only
/// Reject if:
/// - The sender is not the contract owner.
#[receive(
    contract = "lmn_sale_seed",
    name = "setUnpaused",
    error = "ContractError",
    mutable
)]
fn contract_set_unpaused<S: HasStateApi>(
    ctx: &impl HasReceiveContext,
    host: &mut impl HasHost<State<S>, StateApiType = S>,
) -> ContractResult<()> {
    ensure!(
        ctx.sender().matches_account(&ctx.owner()),
        ContractError::Unauthorized
    );
    host.state_mut().paused = false;
    Ok(())
}

/// Parameter type for the contract function `addPurchasers`.
#[derive(Debug, Serialize, SchemaType)]
pub struct AddPurchasersParams {
    /// Accounts to be allocated
    pub purchasers: Vec<AccountAddress>,
    /// Allocation per account, index-matched with `purchasers`
    pub amounts: Vec<ContractTokenAmount>,
}

/// Register fixed allocations for a batch of purchasers.
/// No tokens move here; the pool must hold the sum of all allocations.
///
/// Caller: contract instance owner only
/// Reject if:
/// - Fails to parse parameter
/// - The sender is not the contract owner.
/// - The two parameter vectors differ in length
/// - Any amount is zero
/// - Any purchaser already holds an allocation
#[receive(
    contract = "lmn_sale_seed",
    name = "addPurchasers",
    parameter = "AddPurchasersParams",
    error = "ContractError",
    mutable,
    enable_logger
)]
fn contract_add_purchasers<S: HasStateApi>(
    ctx: &impl HasReceiveContext,
    host: &mut impl HasHost<State<S>, StateApiType = S>,
    logger: &mut impl HasLogger,
) -> ContractResult<()> {
    ensure!(
        ctx.sender().matches_account(&ctx.owner()),
        ContractError::Unauthorized
    );

    let params: AddPurchasersParams = ctx.parameter_cursor().get()?;
    ensure_eq!(
        params.purchasers.len(),
        params.amounts.len(),
        CustomContractError::LengthMismatch.into()
    );

    let state = host.state_mut();
    for (purchaser, amount) in params.purchasers.iter().zip(params.amounts.iter()) {
        state.register_allocation(purchaser, *amount)?;
        logger.log(&SaleEvent::Purchased(PurchasedEvent {
            purchaser: *purchaser,
            amount: *amount,
        }))?;
    }

    Ok(())
}

// ==============================================
// For purchasers
// ==========================================

/// Purchasers withdraw whatever portion of their allocation the
/// schedule has released so far. Claiming again without time passing
/// just rejects, it never pays twice for the same window.
///
/// Caller: Any account with a recorded allocation
/// Reject if:
/// - Contract is paused
/// - The sender is a contract
/// - Nothing is claimable for the sender at this time
/// - Fails to invoke transfer on the project token
#[receive(
    contract = "lmn_sale_seed",
    name = "claim",
    error = "ContractError",
    mutable,
    enable_logger
)]
fn contract_claim<S: HasStateApi>(
    ctx: &impl HasReceiveContext,
    host: &mut impl HasHost<State<S>, StateApiType = S>,
    logger: &mut impl HasLogger,
) -> ContractResult<()> {
    let state = host.state_mut();
    ensure!(!state.paused, CustomContractError::ContractPaused.into());

    let purchaser = match ctx.sender() {
        Address::Account(account_addr) => account_addr,
        Address::Contract(_) => bail!(CustomContractError::AccountOnly.into()),
    };

    let now = ctx.metadata().slot_time();
    let amount = state.claim(&purchaser, now)?;
    let project_token = state.project_token;

    logger.log(&SaleEvent::Claimed(ClaimedEvent { purchaser, amount }))?;

    let transfer = Transfer {
        from: Address::from(ctx.self_address()),
        to: Receiver::from_account(purchaser),
        token_id: TokenIdUnit(),
        amount,
        data: AdditionalData::empty(),
    };
    let _ = host.invoke_contract(
        &project_token,
        &TransferParams::from(vec![transfer]),
        EntrypointName::new_unchecked("transfer"),
        Amount::zero(),
    )?;

    Ok(())
}

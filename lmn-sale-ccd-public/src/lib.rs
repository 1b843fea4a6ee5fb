//! This contract sells the Lumen project token for CCD to whitelisted
//! accounts during a fixed sale window. Sold allocations are released
//! over a TGE + cliff + periodic vesting schedule, the same engine the
//! seed sale uses.
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
    /// CIS2 contract of the token being sold
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
    /// Sale start time
    pub start_at: Timestamp,
    /// Sale end time
    pub close_at: Timestamp,
    /// Smallest token amount a single purchase may buy
    pub min_purchase: ContractTokenAmount,
    /// Largest token amount a single purchase may buy
    pub max_purchase: ContractTokenAmount,
    /// Price in micro CCD per project token
    pub price_per_token: MicroCcd,
}

/// # Init Function
/// The account instantiating the contract becomes the administrator.
/// Schedule and sale window are fixed here and cannot be changed
/// afterwards.
#[init(contract = "lmn_sale_ccd", parameter = "InitParams")]
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

    let window = SaleWindow::new(
        params.start_at,
        params.close_at,
        params.min_purchase,
        params.max_purchase,
        params.price_per_token,
    )?;

    Ok(State::new(
        state_builder,
        params.project_token,
        schedule,
        window,
    ))
}

// ==============================================
// For the administrator
// ==========================================

/// Purchases, claims and the proceeds withdrawal cannot be executed
/// while the contract is paused.
///
/// Caller: contract instance owner only
/// Reject if:
/// - The sender is not the contract owner.
#[receive(
    contract = "lmn_sale_ccd",
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
    contract = "lmn_sale_ccd",
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

/// Parameter type for the contract function `addWhitelist`.
#[derive(Debug, Serialize, SchemaType)]
pub struct AddWhitelistParams {
    /// Accounts permitted to purchase during the sale window
    pub whitelist: Vec<AccountAddress>,
}

/// Whitelist accounts that may participate in the sale. Listing an
/// account again is a no-op; membership never expires and holds no
/// allocation by itself.
///
/// Caller: contract instance owner only
/// Reject if:
/// - Fails to parse parameter
/// - The sender is not the contract owner.
#[receive(
    contract = "lmn_sale_ccd",
    name = "addWhitelist",
    parameter = "AddWhitelistParams",
    error = "ContractError",
    mutable
)]
fn contract_add_whitelist<S: HasStateApi>(
    ctx: &impl HasReceiveContext,
    host: &mut impl HasHost<State<S>, StateApiType = S>,
) -> ContractResult<()> {
    ensure!(
        ctx.sender().matches_account(&ctx.owner()),
        ContractError::Unauthorized
    );

    let params: AddWhitelistParams = ctx.parameter_cursor().get()?;

    let state = host.state_mut();
    for account in params.whitelist.iter() {
        state.whitelisting(account);
    }

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

/// Register fixed allocations without a payment, e.g. for partners
/// settled off-chain. The same vesting applies to them.
///
/// Caller: contract instance owner only
/// Reject if:
/// - Fails to parse parameter
/// - The sender is not the contract owner.
/// - The two parameter vectors differ in length
/// - Any amount is zero
/// - Any purchaser already holds an allocation
#[receive(
    contract = "lmn_sale_ccd",
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

/// Collect the CCD paid in by purchasers. The contract keeps no
/// running total, the whole balance goes to the owner.
///
/// Caller: contract instance owner only
/// Reject if:
/// - Contract is paused
/// - The sender is not the contract owner
/// - Fails to transfer CCD to the owner
#[receive(
    contract = "lmn_sale_ccd",
    name = "withdrawProceeds",
    error = "ContractError"
)]
fn contract_withdraw_proceeds<S: HasStateApi>(
    ctx: &impl HasReceiveContext,
    host: &impl HasHost<State<S>, StateApiType = S>,
) -> ContractResult<()> {
    let state = host.state();
    ensure!(!state.paused, CustomContractError::ContractPaused.into());

    let owner = ctx.owner();
    ensure!(
        ctx.sender().matches_account(&owner),
        ContractError::Unauthorized
    );

    let balance = host.self_balance();
    let transfer_result = host.invoke_transfer(&owner, balance);

    ensure!(
        transfer_result.is_ok(),
        CustomContractError::TransferError.into()
    );

    Ok(())
}

// ==============================================
// For purchasers
// ==========================================

/// Whitelisted accounts buy their allocation by sending CCD while the
/// sale window is open. The paid CCD stays with the contract; there is
/// no refund path.
///
/// Caller: Anyone on the whitelist
/// Reject if:
/// - Contract is paused
/// - The sender is a contract
/// - The sender is not on the whitelist
/// - The sale window is not open
/// - The bought token amount is outside the purchase bounds
/// - The sender already purchased or holds an allocation
#[receive(
    contract = "lmn_sale_ccd",
    name = "purchase",
    error = "ContractError",
    mutable,
    payable,
    enable_logger
)]
fn contract_purchase<S: HasStateApi>(
    ctx: &impl HasReceiveContext,
    host: &mut impl HasHost<State<S>, StateApiType = S>,
    amount: Amount,
    logger: &mut impl HasLogger,
) -> ContractResult<()> {
    let state = host.state_mut();
    ensure!(!state.paused, CustomContractError::ContractPaused.into());

    let purchaser = match ctx.sender() {
        Address::Account(account_addr) => account_addr,
        Address::Contract(_) => bail!(CustomContractError::AccountOnly.into()),
    };

    let now = ctx.metadata().slot_time();
    let token_amount = state.purchase(&purchaser, amount, now)?;

    logger.log(&SaleEvent::Purchased(PurchasedEvent {
        purchaser,
        amount: token_amount,
    }))?;

    Ok(())
}

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
    contract = "lmn_sale_ccd",
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

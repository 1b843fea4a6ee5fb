use crate::error::{ContractError, ContractResult, CustomContractError};
use crate::types::*;
use concordium_std::*;

/// Release schedule constants, fixed when a sale contract is
/// initialized and shared by every purchaser of that contract.
///
/// The allocation is split in two: `tge_release_percent` of it is
/// released in one piece once `tge_release_lock_duration` has passed
/// after `tge_time`, and the rest is released in
/// `periodic_vesting_times` equal installments of length `period`,
/// starting after an additional `cliff_duration`.
#[derive(Debug, Serialize, SchemaType, Clone, PartialEq)]
pub struct VestingSchedule {
    /// Reference time all vesting delays are measured from
    pub tge_time: Timestamp,
    /// Percentage of the allocation released at TGE
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

impl VestingSchedule {
    pub fn new(
        tge_time: Timestamp,
        tge_release_percent: AllowedPercentage,
        tge_release_lock_duration: Duration,
        cliff_duration: Duration,
        period: Duration,
        periodic_vesting_times: u64,
    ) -> Result<Self, CustomContractError> {
        ensure!(
            tge_release_percent <= 100,
            CustomContractError::InvalidSchedule
        );
        ensure!(
            periodic_vesting_times > 0,
            CustomContractError::InvalidSchedule
        );
        ensure!(period.millis() > 0, CustomContractError::InvalidSchedule);

        let schedule = VestingSchedule {
            tge_time,
            tge_release_percent,
            tge_release_lock_duration,
            cliff_duration,
            period,
            periodic_vesting_times,
        };

        // the whole timeline must fit into a Timestamp
        schedule.cliff_end()?;

        Ok(schedule)
    }

    /// Moment the TGE portion becomes claimable.
    pub fn tge_unlock_at(&self) -> Result<Timestamp, CustomContractError> {
        self.tge_time
            .checked_add(self.tge_release_lock_duration)
            .ok_or(CustomContractError::InvalidSchedule)
    }

    /// Moment periodic vesting starts accruing.
    pub fn cliff_end(&self) -> Result<Timestamp, CustomContractError> {
        self.tge_unlock_at()?
            .checked_add(self.cliff_duration)
            .ok_or(CustomContractError::InvalidSchedule)
    }

    /// Cumulative portion of `total` released at `now`.
    ///
    /// Multiply-then-divide on the full allocation, so truncation never
    /// loses more than one unit per installment, and the last
    /// installment returns the whole allocation exactly.
    pub fn vested_amount(
        &self,
        now: Timestamp,
        total: ContractTokenAmount,
    ) -> ContractResult<ContractTokenAmount> {
        let unlock_at = self.tge_unlock_at()?;
        if now < unlock_at {
            return Ok(ContractTokenAmount::from(0));
        }

        let total: u128 = u128::from(total.0);
        let tge_release: u128 = total
            .checked_mul(u128::from(self.tge_release_percent))
            .ok_or(ContractError::from(CustomContractError::OverflowError))?
            / 100;

        let cliff_end = self.cliff_end()?;
        if now < cliff_end {
            let amount = u64::try_from(tge_release).map_err(CustomContractError::from)?;
            return Ok(ContractTokenAmount::from(amount));
        }

        let elapsed = now.timestamp_millis() - cliff_end.timestamp_millis();
        let periods = cmp::min(self.periodic_vesting_times, elapsed / self.period.millis());

        if periods == self.periodic_vesting_times {
            // the last installment absorbs any truncation remainder
            let amount = u64::try_from(total).map_err(CustomContractError::from)?;
            return Ok(ContractTokenAmount::from(amount));
        }

        let vested: u128 = (total - tge_release)
            .checked_mul(u128::from(periods))
            .ok_or(ContractError::from(CustomContractError::OverflowError))?
            / u128::from(self.periodic_vesting_times)
            + tge_release;

        let amount = u64::try_from(vested).map_err(CustomContractError::from)?;
        Ok(ContractTokenAmount::from(amount))
    }

    /// Portion of the allocation currently withdrawable. Pure read.
    pub fn releasable_amount(
        &self,
        purchaser: &PurchaserState,
        now: Timestamp,
    ) -> ContractResult<ContractTokenAmount> {
        let vested = self.vested_amount(now, purchaser.purchased_amount)?;
        Ok(ContractTokenAmount::from(
            vested.0.saturating_sub(purchaser.claimed_amount.0),
        ))
    }

    /// One claim step: computes the releasable amount and books it on
    /// the purchaser record before any transfer is made. The whole
    /// read-modify-write happens inside the host's single operation,
    /// so two claims can never pay out the same release window.
    ///
    /// Rejects with `NoClaimableAmount` both before the initial unlock
    /// and when nothing new has vested since the last claim.
    pub fn claim_release(
        &self,
        purchaser: &mut PurchaserState,
        now: Timestamp,
    ) -> ContractResult<ContractTokenAmount> {
        let amount = self.releasable_amount(purchaser, now)?;
        ensure!(
            amount.0 > 0,
            CustomContractError::NoClaimableAmount.into()
        );
        purchaser.claimed_amount += amount;
        Ok(amount)
    }
}

/// Per-beneficiary claim bookkeeping. Created on first allocation or
/// purchase, never deleted.
#[derive(Debug, Serialize, SchemaType, Clone, PartialEq, Eq)]
pub struct PurchaserState {
    /// Total tokens owed, fixed once set
    pub purchased_amount: ContractTokenAmount,
    /// Tokens already released to the beneficiary
    pub claimed_amount: ContractTokenAmount,
}

impl PurchaserState {
    pub fn new(purchased_amount: ContractTokenAmount) -> Self {
        PurchaserState {
            purchased_amount,
            claimed_amount: ContractTokenAmount::from(0),
        }
    }

    /// Record reported for accounts that never received an allocation.
    pub fn empty() -> Self {
        PurchaserState::new(ContractTokenAmount::from(0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOTAL: u64 = 5_500;

    /// TGE at 1000ms, 20% unlocked 100ms later, 200ms cliff, then
    /// 4 installments of 50ms each.
    fn schedule() -> VestingSchedule {
        VestingSchedule::new(
            Timestamp::from_timestamp_millis(1_000),
            20,
            Duration::from_millis(100),
            Duration::from_millis(200),
            Duration::from_millis(50),
            4,
        )
        .unwrap()
    }

    fn vested(schedule: &VestingSchedule, at_millis: u64, total: u64) -> u64 {
        schedule
            .vested_amount(Timestamp::from_timestamp_millis(at_millis), total.into())
            .unwrap()
            .0
    }

    #[test]
    fn test_nothing_vested_before_unlock() {
        let schedule = schedule();
        claim_eq!(vested(&schedule, 0, TOTAL), 0);
        claim_eq!(vested(&schedule, 1_000, TOTAL), 0);
        claim_eq!(vested(&schedule, 1_099, TOTAL), 0);
    }

    #[test]
    fn test_tge_release_exactly_at_unlock() {
        let schedule = schedule();
        claim_eq!(
            vested(&schedule, 1_100, TOTAL),
            TOTAL * 20 / 100,
            "unlock boundary should release the TGE portion"
        );
    }

    #[test]
    fn test_cliff_plateau_holds_tge_release() {
        let schedule = schedule();
        claim_eq!(vested(&schedule, 1_101, TOTAL), 1_100);
        claim_eq!(vested(&schedule, 1_299, TOTAL), 1_100);
        // cliff is over but no full period has passed yet
        claim_eq!(vested(&schedule, 1_300, TOTAL), 1_100);
        claim_eq!(vested(&schedule, 1_349, TOTAL), 1_100);
    }

    #[test]
    fn test_periodic_release_per_installment() {
        let schedule = schedule();
        claim_eq!(vested(&schedule, 1_350, TOTAL), 2_200);
        claim_eq!(vested(&schedule, 1_400, TOTAL), 3_300);
        claim_eq!(vested(&schedule, 1_450, TOTAL), 4_400);
        claim_eq!(vested(&schedule, 1_500, TOTAL), 5_500);
        // nothing accrues past the last installment
        claim_eq!(vested(&schedule, 100_000, TOTAL), 5_500);
    }

    #[test]
    fn test_final_installment_absorbs_remainder() {
        let schedule = VestingSchedule::new(
            Timestamp::from_timestamp_millis(1_000),
            10,
            Duration::from_millis(100),
            Duration::from_millis(200),
            Duration::from_millis(50),
            4,
        )
        .unwrap();
        let total = 5_501;

        // 10% of 5501 truncates to 550, the rest is 4951 which does
        // not divide by 4
        claim_eq!(vested(&schedule, 1_100, total), 550);
        claim_eq!(vested(&schedule, 1_350, total), 550 + 1_237);
        claim_eq!(vested(&schedule, 1_400, total), 550 + 2_475);
        claim_eq!(vested(&schedule, 1_450, total), 550 + 3_713);
        claim_eq!(
            vested(&schedule, 1_500, total),
            total,
            "last installment must release the whole allocation"
        );
    }

    #[test]
    fn test_vested_amount_is_monotonic() {
        let schedule = schedule();
        let mut last = 0;
        for ms in (900..1_600).step_by(10) {
            let v = vested(&schedule, ms, TOTAL);
            claim!(v >= last, "vested amount went down");
            last = v;
        }
        claim_eq!(last, TOTAL);
    }

    #[test]
    fn test_claim_sequence_releases_whole_allocation() {
        let schedule = schedule();
        let mut purchaser = PurchaserState::new(TOTAL.into());

        // TGE release
        let amount = schedule
            .claim_release(&mut purchaser, Timestamp::from_timestamp_millis(1_100))
            .unwrap();
        claim_eq!(amount.0, 1_100);

        // one installment per period
        for at in [1_350, 1_400, 1_450, 1_500] {
            let amount = schedule
                .claim_release(&mut purchaser, Timestamp::from_timestamp_millis(at))
                .unwrap();
            claim_eq!(amount.0, 1_100);
        }

        claim_eq!(purchaser.claimed_amount.0, TOTAL);
        claim!(purchaser.claimed_amount <= purchaser.purchased_amount);

        // everything is out, later claims reject
        let ret = schedule.claim_release(&mut purchaser, Timestamp::from_timestamp_millis(9_999));
        claim_eq!(
            ret,
            Err(CustomContractError::NoClaimableAmount.into()),
            "claim after full release should reject"
        );
    }

    #[test]
    fn test_claim_all_at_once_after_last_period() {
        let schedule = schedule();
        let mut purchaser = PurchaserState::new(TOTAL.into());

        let amount = schedule
            .claim_release(&mut purchaser, Timestamp::from_timestamp_millis(2_000))
            .unwrap();
        claim_eq!(amount.0, TOTAL);
        claim_eq!(purchaser.claimed_amount.0, TOTAL);
    }

    #[test]
    fn test_claim_twice_at_same_time_rejects() {
        let schedule = schedule();
        let mut purchaser = PurchaserState::new(TOTAL.into());
        let now = Timestamp::from_timestamp_millis(1_100);

        let amount = schedule.claim_release(&mut purchaser, now).unwrap();
        claim_eq!(amount.0, 1_100);

        let ret = schedule.claim_release(&mut purchaser, now);
        claim_eq!(ret, Err(CustomContractError::NoClaimableAmount.into()));
        claim_eq!(purchaser.claimed_amount.0, 1_100, "claimed amount moved");
    }

    #[test]
    fn test_claim_before_unlock_rejects() {
        let schedule = schedule();
        let mut purchaser = PurchaserState::new(TOTAL.into());

        let ret = schedule.claim_release(&mut purchaser, Timestamp::from_timestamp_millis(1_099));
        claim_eq!(ret, Err(CustomContractError::NoClaimableAmount.into()));
        claim_eq!(purchaser.claimed_amount.0, 0);
    }

    #[test]
    fn test_releasable_never_negative_for_empty_record() {
        let schedule = schedule();
        let purchaser = PurchaserState::empty();

        let releasable = schedule
            .releasable_amount(&purchaser, Timestamp::from_timestamp_millis(9_999))
            .unwrap();
        claim_eq!(releasable.0, 0);
    }

    #[test]
    fn test_invalid_percent() {
        let ret = VestingSchedule::new(
            Timestamp::from_timestamp_millis(1_000),
            101,
            Duration::from_millis(100),
            Duration::from_millis(200),
            Duration::from_millis(50),
            4,
        );
        claim_eq!(ret, Err(CustomContractError::InvalidSchedule));
    }

    #[test]
    fn test_invalid_installments() {
        let ret = VestingSchedule::new(
            Timestamp::from_timestamp_millis(1_000),
            20,
            Duration::from_millis(100),
            Duration::from_millis(200),
            Duration::from_millis(50),
            0,
        );
        claim_eq!(ret, Err(CustomContractError::InvalidSchedule));
    }

    #[test]
    fn test_invalid_period() {
        let ret = VestingSchedule::new(
            Timestamp::from_timestamp_millis(1_000),
            20,
            Duration::from_millis(100),
            Duration::from_millis(200),
            Duration::from_millis(0),
            4,
        );
        claim_eq!(ret, Err(CustomContractError::InvalidSchedule));
    }

    #[test]
    fn test_timeline_overflow() {
        let ret = VestingSchedule::new(
            Timestamp::from_timestamp_millis(u64::MAX - 10),
            20,
            Duration::from_millis(100),
            Duration::from_millis(200),
            Duration::from_millis(50),
            4,
        );
        claim_eq!(ret, Err(CustomContractError::InvalidSchedule));
    }

    #[test]
    fn test_hundred_percent_tge() {
        let schedule = VestingSchedule::new(
            Timestamp::from_timestamp_millis(1_000),
            100,
            Duration::from_millis(100),
            Duration::from_millis(200),
            Duration::from_millis(50),
            1,
        )
        .unwrap();

        claim_eq!(vested(&schedule, 1_100, TOTAL), TOTAL);
        claim_eq!(vested(&schedule, 1_350, TOTAL), TOTAL);
    }
}

use concordium_std::concordium_cfg_test;

#[concordium_cfg_test]
mod tests {
    use crate::sctest::*;
    use crate::*;
    use concordium_std::test_infrastructure::*;

    fn host_with_allocation() -> TestHost<State<TestStateApi>> {
        let mut state_builder = TestStateBuilder::new();
        let mut state = initial_state(&mut state_builder);
        state
            .register_allocation(&PURCHASER1_ACC, TOTAL_ALLOCATION.into())
            .unwrap_abort();
        let mut host = TestHost::new(state, state_builder);
        host.setup_mock_entrypoint(
            TOKEN_CONTRACT,
            OwnedEntrypointName::new_unchecked("transfer".into()),
            MockFn::returning_ok(()),
        );
        host
    }

    fn claim_ctx(slot_millis: u64) -> TestReceiveContext<'static> {
        let mut ctx = TestReceiveContext::empty();
        ctx.set_self_address(SELF_ADDRESS);
        ctx.set_owner(ADMIN_ACC);
        ctx.set_sender(Address::Account(PURCHASER1_ACC));
        ctx.set_metadata_slot_time(Timestamp::from_timestamp_millis(slot_millis));
        ctx
    }

    fn claimed_so_far(host: &TestHost<State<TestStateApi>>) -> u64 {
        host.state()
            .get_purchaser(&PURCHASER1_ACC)
            .unwrap_abort()
            .claimed_amount
            .0
    }

    #[concordium_test]
    /// Test that claim rejects before the TGE portion is unlocked.
    fn test_claim_before_unlock() {
        let mut host = host_with_allocation();
        let ctx = claim_ctx(1_099);

        let mut logger = TestLogger::init();
        let result = contract_claim(&ctx, &mut host, &mut logger);
        claim!(result.is_err());
        let err = result.expect_err_report("claim should reject");
        claim_eq!(
            err,
            CustomContractError::NoClaimableAmount.into(),
            "claim should reject with NoClaimableAmount"
        );
        claim_eq!(claimed_so_far(&host), 0);
    }

    #[concordium_test]
    /// Test that the TGE portion is released exactly at the unlock
    /// moment and the event carries the transferred amount.
    fn test_claim_tge_release() {
        let mut host = host_with_allocation();
        let ctx = claim_ctx(1_100);

        let mut logger = TestLogger::init();
        let result = contract_claim(&ctx, &mut host, &mut logger);
        claim!(result.is_ok(), "claim results in rejection");

        claim_eq!(claimed_so_far(&host), TOTAL_ALLOCATION * 20 / 100);
        claim_eq!(logger.logs.len(), 1);
        claim_eq!(
            logger.logs[0],
            to_bytes(&SaleEvent::Claimed(ClaimedEvent {
                purchaser: PURCHASER1_ACC,
                amount: 1_100.into(),
            }))
        );
    }

    #[concordium_test]
    /// Test the whole schedule: TGE release, then one installment per
    /// period, with the cumulative claim equal to the allocation.
    fn test_claim_per_period() {
        let mut host = host_with_allocation();
        let mut logger = TestLogger::init();

        let result = contract_claim(&claim_ctx(1_100), &mut host, &mut logger);
        claim!(result.is_ok(), "claim results in rejection");
        claim_eq!(claimed_so_far(&host), 1_100);

        // claiming again within the cliff yields nothing new
        let result = contract_claim(&claim_ctx(1_299), &mut host, &mut logger);
        claim!(result.is_err());

        for (slot, expected_total) in
            [(1_350, 2_200), (1_400, 3_300), (1_450, 4_400), (1_500, 5_500)]
        {
            let result = contract_claim(&claim_ctx(slot), &mut host, &mut logger);
            claim!(result.is_ok(), "claim results in rejection");
            claim_eq!(claimed_so_far(&host), expected_total);
        }

        claim_eq!(claimed_so_far(&host), TOTAL_ALLOCATION);

        // the allocation is exhausted
        let result = contract_claim(&claim_ctx(9_999), &mut host, &mut logger);
        claim!(result.is_err());
        let err = result.expect_err_report("claim should reject");
        claim_eq!(err, CustomContractError::NoClaimableAmount.into());
    }

    #[concordium_test]
    /// Test that skipped periods are paid out in a single claim.
    fn test_claim_all_at_once() {
        let mut host = host_with_allocation();
        let ctx = claim_ctx(2_000);

        let mut logger = TestLogger::init();
        let result = contract_claim(&ctx, &mut host, &mut logger);
        claim!(result.is_ok(), "claim results in rejection");

        claim_eq!(claimed_so_far(&host), TOTAL_ALLOCATION);
        claim_eq!(
            logger.logs[0],
            to_bytes(&SaleEvent::Claimed(ClaimedEvent {
                purchaser: PURCHASER1_ACC,
                amount: TOTAL_ALLOCATION.into(),
            }))
        );
    }

    #[concordium_test]
    /// Test that a second claim at the same slot time rejects and
    /// leaves the bookkeeping untouched.
    fn test_claim_twice_at_same_slot() {
        let mut host = host_with_allocation();

        let mut logger = TestLogger::init();
        let result = contract_claim(&claim_ctx(1_100), &mut host, &mut logger);
        claim!(result.is_ok(), "claim results in rejection");

        let result = contract_claim(&claim_ctx(1_100), &mut host, &mut logger);
        claim!(result.is_err());
        let err = result.expect_err_report("claim should reject");
        claim_eq!(err, CustomContractError::NoClaimableAmount.into());
        claim_eq!(claimed_so_far(&host), 1_100);
    }

    #[concordium_test]
    /// Test that an account without an allocation gets the same
    /// NoClaimableAmount error, never a crash.
    fn test_claim_without_allocation() {
        let mut host = host_with_allocation();
        let mut ctx = claim_ctx(2_000);
        ctx.set_sender(Address::Account(PURCHASER2_ACC));

        let mut logger = TestLogger::init();
        let result = contract_claim(&ctx, &mut host, &mut logger);
        claim!(result.is_err());
        let err = result.expect_err_report("claim should reject");
        claim_eq!(err, CustomContractError::NoClaimableAmount.into());
    }

    #[concordium_test]
    /// Test that claims stop while the contract is paused.
    fn test_claim_when_paused() {
        let mut host = host_with_allocation();
        host.state_mut().paused = true;
        let ctx = claim_ctx(1_100);

        let mut logger = TestLogger::init();
        let result = contract_claim(&ctx, &mut host, &mut logger);
        claim!(result.is_err());
        let err = result.expect_err_report("claim should reject");
        claim_eq!(err, CustomContractError::ContractPaused.into());
    }

    #[concordium_test]
    /// Test that contract senders are rejected.
    fn test_claim_contract_sender() {
        let mut host = host_with_allocation();
        let mut ctx = claim_ctx(1_100);
        ctx.set_sender(Address::Contract(ContractAddress {
            index: 99,
            subindex: 0,
        }));

        let mut logger = TestLogger::init();
        let result = contract_claim(&ctx, &mut host, &mut logger);
        claim!(result.is_err());
        let err = result.expect_err_report("claim should reject");
        claim_eq!(err, CustomContractError::AccountOnly.into());
    }
}

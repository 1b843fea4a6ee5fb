use concordium_std::concordium_cfg_test;

#[concordium_cfg_test]
mod tests {
    use crate::sctest::*;
    use crate::*;
    use concordium_std::test_infrastructure::*;

    fn host_with_whitelist() -> TestHost<State<TestStateApi>> {
        let mut state_builder = TestStateBuilder::new();
        let mut state = initial_state(&mut state_builder);
        state.whitelisting(&PURCHASER1_ACC);
        let mut host = TestHost::new(state, state_builder);
        host.setup_mock_entrypoint(
            TOKEN_CONTRACT,
            OwnedEntrypointName::new_unchecked("transfer".into()),
            MockFn::returning_ok(()),
        );
        host
    }

    fn ctx_at(slot_millis: u64) -> TestReceiveContext<'static> {
        let mut ctx = TestReceiveContext::empty();
        ctx.set_self_address(SELF_ADDRESS);
        ctx.set_owner(ADMIN_ACC);
        ctx.set_sender(Address::Account(PURCHASER1_ACC));
        ctx.set_metadata_slot_time(Timestamp::from_timestamp_millis(slot_millis));
        ctx
    }

    #[concordium_test]
    /// Test that a whitelisted account buys once during the window and
    /// the event carries the bought token amount.
    fn test_purchase() {
        let mut host = host_with_whitelist();
        let ctx = ctx_at(200);

        let mut logger = TestLogger::init();
        let result = contract_purchase(&ctx, &mut host, PAID_CCD, &mut logger);
        claim!(result.is_ok(), "purchase results in rejection");

        claim_eq!(
            host.state().get_purchaser(&PURCHASER1_ACC),
            Some(PurchaserState {
                purchased_amount: BOUGHT_TOKENS.into(),
                claimed_amount: 0.into(),
            })
        );
        claim_eq!(logger.logs.len(), 1);
        claim_eq!(
            logger.logs[0],
            to_bytes(&SaleEvent::Purchased(PurchasedEvent {
                purchaser: PURCHASER1_ACC,
                amount: BOUGHT_TOKENS.into(),
            }))
        );

        // at most one purchase per account
        let result = contract_purchase(&ctx, &mut host, PAID_CCD, &mut logger);
        claim!(result.is_err());
        let err = result.expect_err_report("purchase should reject");
        claim_eq!(err, CustomContractError::AlreadyPurchased.into());
    }

    #[concordium_test]
    /// Test that an account off the whitelist cannot purchase.
    fn test_purchase_not_whitelisted() {
        let mut host = host_with_whitelist();
        let mut ctx = ctx_at(200);
        ctx.set_sender(Address::Account(PURCHASER2_ACC));

        let mut logger = TestLogger::init();
        let result = contract_purchase(&ctx, &mut host, PAID_CCD, &mut logger);
        claim!(result.is_err());
        let err = result.expect_err_report("purchase should reject");
        claim_eq!(
            err,
            CustomContractError::NotWhitelisted.into(),
            "purchase should reject with NotWhitelisted"
        );
    }

    #[concordium_test]
    /// Test that purchases outside the sale window reject, on both
    /// sides of it.
    fn test_purchase_outside_window() {
        let mut host = host_with_whitelist();
        let mut logger = TestLogger::init();

        let result = contract_purchase(&ctx_at(99), &mut host, PAID_CCD, &mut logger);
        claim!(result.is_err());
        let err = result.expect_err_report("purchase should reject");
        claim_eq!(err, CustomContractError::SaleNotActive.into());

        let result = contract_purchase(&ctx_at(501), &mut host, PAID_CCD, &mut logger);
        claim!(result.is_err());
        let err = result.expect_err_report("purchase should reject");
        claim_eq!(err, CustomContractError::SaleNotActive.into());

        // the window bounds themselves are still open
        let result = contract_purchase(&ctx_at(500), &mut host, PAID_CCD, &mut logger);
        claim!(result.is_ok(), "purchase results in rejection");
    }

    #[concordium_test]
    /// Test that purchases below the minimum or above the maximum
    /// token amount reject.
    fn test_purchase_out_of_range() {
        let mut host = host_with_whitelist();
        let ctx = ctx_at(200);
        let mut logger = TestLogger::init();

        // 98 micro CCD buys 49 tokens, one below the minimum of 50
        let result =
            contract_purchase(&ctx, &mut host, Amount::from_micro_ccd(98), &mut logger);
        claim!(result.is_err());
        let err = result.expect_err_report("purchase should reject");
        claim_eq!(err, CustomContractError::AmountOutOfRange.into());

        // 20_002 micro CCD buys 10_001 tokens, one above the maximum
        let result =
            contract_purchase(&ctx, &mut host, Amount::from_micro_ccd(20_002), &mut logger);
        claim!(result.is_err());
        let err = result.expect_err_report("purchase should reject");
        claim_eq!(err, CustomContractError::AmountOutOfRange.into());
    }

    #[concordium_test]
    /// Test that purchases stop while the contract is paused.
    fn test_purchase_when_paused() {
        let mut host = host_with_whitelist();
        host.state_mut().paused = true;
        let ctx = ctx_at(200);

        let mut logger = TestLogger::init();
        let result = contract_purchase(&ctx, &mut host, PAID_CCD, &mut logger);
        claim!(result.is_err());
        let err = result.expect_err_report("purchase should reject");
        claim_eq!(err, CustomContractError::ContractPaused.into());
    }

    #[concordium_test]
    /// Test that contract senders are rejected.
    fn test_purchase_contract_sender() {
        let mut host = host_with_whitelist();
        let mut ctx = ctx_at(200);
        ctx.set_sender(Address::Contract(ContractAddress {
            index: 99,
            subindex: 0,
        }));

        let mut logger = TestLogger::init();
        let result = contract_purchase(&ctx, &mut host, PAID_CCD, &mut logger);
        claim!(result.is_err());
        let err = result.expect_err_report("purchase should reject");
        claim_eq!(err, CustomContractError::AccountOnly.into());
    }

    #[concordium_test]
    /// Test the whole flow: purchase during the window, then claim the
    /// TGE release and every installment until the bought allocation
    /// is fully paid out.
    fn test_purchase_then_claim() {
        let mut host = host_with_whitelist();
        let mut logger = TestLogger::init();

        let result = contract_purchase(&ctx_at(200), &mut host, PAID_CCD, &mut logger);
        claim!(result.is_ok(), "purchase results in rejection");

        // before the TGE unlock nothing is claimable
        let result = contract_claim(&ctx_at(1_099), &mut host, &mut logger);
        claim!(result.is_err());
        let err = result.expect_err_report("claim should reject");
        claim_eq!(err, CustomContractError::NoClaimableAmount.into());

        // TGE release
        let result = contract_claim(&ctx_at(1_100), &mut host, &mut logger);
        claim!(result.is_ok(), "claim results in rejection");
        claim_eq!(
            logger.logs[1],
            to_bytes(&SaleEvent::Claimed(ClaimedEvent {
                purchaser: PURCHASER1_ACC,
                amount: (BOUGHT_TOKENS * 20 / 100).into(),
            }))
        );

        // one installment per period
        for slot in [1_350, 1_400, 1_450, 1_500] {
            let result = contract_claim(&ctx_at(slot), &mut host, &mut logger);
            claim!(result.is_ok(), "claim results in rejection");
        }

        claim_eq!(
            host.state()
                .get_purchaser(&PURCHASER1_ACC)
                .unwrap_abort()
                .claimed_amount,
            ContractTokenAmount::from(BOUGHT_TOKENS),
            "the whole purchase should be claimed by now"
        );

        // the allocation is exhausted
        let result = contract_claim(&ctx_at(9_999), &mut host, &mut logger);
        claim!(result.is_err());
        let err = result.expect_err_report("claim should reject");
        claim_eq!(err, CustomContractError::NoClaimableAmount.into());
    }

    #[concordium_test]
    /// Test that claim without a purchase yields NoClaimableAmount,
    /// whitelisted or not.
    fn test_claim_without_purchase() {
        let mut host = host_with_whitelist();

        let mut logger = TestLogger::init();
        let result = contract_claim(&ctx_at(9_999), &mut host, &mut logger);
        claim!(result.is_err());
        let err = result.expect_err_report("claim should reject");
        claim_eq!(
            err,
            CustomContractError::NoClaimableAmount.into(),
            "claim should reject with NoClaimableAmount"
        );
    }
}

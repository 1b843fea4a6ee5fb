use concordium_std::concordium_cfg_test;

#[concordium_cfg_test]
mod tests {
    use crate::sctest::*;
    use crate::*;
    use concordium_std::test_infrastructure::*;

    #[concordium_test]
    /// Test that init succeeds and fixes the schedule.
    fn test_init() {
        let mut state_builder = TestStateBuilder::new();

        let expected_state = State {
            paused: false,
            project_token: TOKEN_CONTRACT,
            schedule: default_schedule(),
            purchasers: state_builder.new_map(),
        };

        let mut ctx = TestInitContext::empty();
        ctx.set_init_origin(ADMIN_ACC);
        ctx.set_metadata_slot_time(Timestamp::from_timestamp_millis(1));

        let params = init_parameter();
        let params_byte = to_bytes(&params);
        ctx.set_parameter(&params_byte);

        let result = contract_init(&ctx, &mut state_builder);
        claim!(result.is_ok());
        let actual_state = result.unwrap();
        claim_eq!(
            actual_state,
            expected_state,
            "state has been initialized unexpectedly..."
        );
    }

    #[concordium_test]
    /// Test that init fails when the TGE percentage exceeds 100.
    fn test_init_fails_with_invalid_schedule() {
        let mut state_builder = TestStateBuilder::new();

        let mut ctx = TestInitContext::empty();
        ctx.set_init_origin(ADMIN_ACC);
        ctx.set_metadata_slot_time(Timestamp::from_timestamp_millis(1));

        let mut params = init_parameter();
        params.tge_release_percent = 101;
        let params_byte = to_bytes(&params);
        ctx.set_parameter(&params_byte);

        let result = contract_init(&ctx, &mut state_builder);
        claim!(result.is_err());
        let err = result.expect_err_report("init should reject");
        claim_eq!(
            err,
            CustomContractError::InvalidSchedule.into(),
            "init should reject with InvalidSchedule"
        );
    }

    #[concordium_test]
    /// Test that addPurchasers records allocations and logs one
    /// Purchased event per pair.
    fn test_add_purchasers() {
        let mut state_builder = TestStateBuilder::new();
        let state = initial_state(&mut state_builder);
        let mut host = TestHost::new(state, state_builder);

        let mut ctx = TestReceiveContext::empty();
        ctx.set_owner(ADMIN_ACC);
        ctx.set_sender(Address::Account(ADMIN_ACC));

        let params = AddPurchasersParams {
            purchasers: vec![PURCHASER1_ACC, PURCHASER2_ACC],
            amounts: vec![TOTAL_ALLOCATION.into(), 300.into()],
        };
        let params_byte = to_bytes(&params);
        ctx.set_parameter(&params_byte);

        let mut logger = TestLogger::init();
        let result = contract_add_purchasers(&ctx, &mut host, &mut logger);
        claim!(result.is_ok());

        claim_eq!(
            host.state().get_purchaser(&PURCHASER1_ACC),
            Some(PurchaserState {
                purchased_amount: TOTAL_ALLOCATION.into(),
                claimed_amount: 0.into(),
            })
        );
        claim_eq!(
            host.state().get_purchaser(&PURCHASER2_ACC),
            Some(PurchaserState {
                purchased_amount: 300.into(),
                claimed_amount: 0.into(),
            })
        );

        claim_eq!(logger.logs.len(), 2, "one event per registered purchaser");
        claim_eq!(
            logger.logs[0],
            to_bytes(&SaleEvent::Purchased(PurchasedEvent {
                purchaser: PURCHASER1_ACC,
                amount: TOTAL_ALLOCATION.into(),
            }))
        );
    }

    #[concordium_test]
    /// Test that addPurchasers rejects a non-owner caller.
    fn test_add_purchasers_unauthorized() {
        let mut state_builder = TestStateBuilder::new();
        let state = initial_state(&mut state_builder);
        let mut host = TestHost::new(state, state_builder);

        let mut ctx = TestReceiveContext::empty();
        ctx.set_owner(ADMIN_ACC);
        ctx.set_sender(Address::Account(PURCHASER1_ACC));

        let params = AddPurchasersParams {
            purchasers: vec![PURCHASER1_ACC],
            amounts: vec![100.into()],
        };
        let params_byte = to_bytes(&params);
        ctx.set_parameter(&params_byte);

        let mut logger = TestLogger::init();
        let result = contract_add_purchasers(&ctx, &mut host, &mut logger);
        claim!(result.is_err());
        let err = result.expect_err_report("addPurchasers should reject");
        claim_eq!(
            err,
            ContractError::Unauthorized,
            "addPurchasers should reject with Unauthorized"
        );
    }

    #[concordium_test]
    /// Test that addPurchasers rejects vectors of different length.
    fn test_add_purchasers_length_mismatch() {
        let mut state_builder = TestStateBuilder::new();
        let state = initial_state(&mut state_builder);
        let mut host = TestHost::new(state, state_builder);

        let mut ctx = TestReceiveContext::empty();
        ctx.set_owner(ADMIN_ACC);
        ctx.set_sender(Address::Account(ADMIN_ACC));

        let params = AddPurchasersParams {
            purchasers: vec![PURCHASER1_ACC, PURCHASER2_ACC],
            amounts: vec![100.into()],
        };
        let params_byte = to_bytes(&params);
        ctx.set_parameter(&params_byte);

        let mut logger = TestLogger::init();
        let result = contract_add_purchasers(&ctx, &mut host, &mut logger);
        claim!(result.is_err());
        let err = result.expect_err_report("addPurchasers should reject");
        claim_eq!(
            err,
            CustomContractError::LengthMismatch.into(),
            "addPurchasers should reject with LengthMismatch"
        );
    }

    #[concordium_test]
    /// Test that addPurchasers rejects a zero allocation.
    fn test_add_purchasers_zero_amount() {
        let mut state_builder = TestStateBuilder::new();
        let state = initial_state(&mut state_builder);
        let mut host = TestHost::new(state, state_builder);

        let mut ctx = TestReceiveContext::empty();
        ctx.set_owner(ADMIN_ACC);
        ctx.set_sender(Address::Account(ADMIN_ACC));

        let params = AddPurchasersParams {
            purchasers: vec![PURCHASER1_ACC],
            amounts: vec![0.into()],
        };
        let params_byte = to_bytes(&params);
        ctx.set_parameter(&params_byte);

        let mut logger = TestLogger::init();
        let result = contract_add_purchasers(&ctx, &mut host, &mut logger);
        claim!(result.is_err());
        let err = result.expect_err_report("addPurchasers should reject");
        claim_eq!(
            err,
            CustomContractError::InvalidAmount.into(),
            "addPurchasers should reject with InvalidAmount"
        );
    }

    #[concordium_test]
    /// Test that registering the same account twice rejects.
    fn test_add_purchasers_already_registered() {
        let mut state_builder = TestStateBuilder::new();
        let state = initial_state(&mut state_builder);
        let mut host = TestHost::new(state, state_builder);

        let mut ctx = TestReceiveContext::empty();
        ctx.set_owner(ADMIN_ACC);
        ctx.set_sender(Address::Account(ADMIN_ACC));

        let params = AddPurchasersParams {
            purchasers: vec![PURCHASER1_ACC, PURCHASER1_ACC],
            amounts: vec![100.into(), 200.into()],
        };
        let params_byte = to_bytes(&params);
        ctx.set_parameter(&params_byte);

        let mut logger = TestLogger::init();
        let result = contract_add_purchasers(&ctx, &mut host, &mut logger);
        claim!(result.is_err());
        let err = result.expect_err_report("addPurchasers should reject");
        claim_eq!(
            err,
            CustomContractError::AlreadyRegistered.into(),
            "addPurchasers should reject with AlreadyRegistered"
        );
    }

    #[concordium_test]
    /// Test pausing and unpausing.
    fn test_set_paused() {
        let mut state_builder = TestStateBuilder::new();
        let state = initial_state(&mut state_builder);
        let mut host = TestHost::new(state, state_builder);

        let mut ctx = TestReceiveContext::empty();
        ctx.set_owner(ADMIN_ACC);
        ctx.set_sender(Address::Account(ADMIN_ACC));

        let result = contract_set_paused(&ctx, &mut host);
        claim!(result.is_ok());
        claim!(host.state().paused);

        let result = contract_set_unpaused(&ctx, &mut host);
        claim!(result.is_ok());
        claim!(!host.state().paused);
    }

    #[concordium_test]
    /// Test that a non-owner cannot pause.
    fn test_set_paused_unauthorized() {
        let mut state_builder = TestStateBuilder::new();
        let state = initial_state(&mut state_builder);
        let mut host = TestHost::new(state, state_builder);

        let mut ctx = TestReceiveContext::empty();
        ctx.set_owner(ADMIN_ACC);
        ctx.set_sender(Address::Account(PURCHASER1_ACC));

        let result = contract_set_paused(&ctx, &mut host);
        claim!(result.is_err());
        let err = result.expect_err_report("setPaused should reject");
        claim_eq!(err, ContractError::Unauthorized);
    }
}

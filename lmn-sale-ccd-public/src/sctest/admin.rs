use concordium_std::concordium_cfg_test;

#[concordium_cfg_test]
mod tests {
    use crate::sctest::*;
    use crate::*;
    use concordium_std::test_infrastructure::*;

    #[concordium_test]
    /// Test that init succeeds and fixes schedule and window.
    fn test_init() {
        let mut state_builder = TestStateBuilder::new();

        let expected_state = State {
            paused: false,
            project_token: TOKEN_CONTRACT,
            schedule: default_schedule(),
            window: default_window(),
            whitelist: state_builder.new_set(),
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
    /// Test that init rejects a window closing before it starts.
    fn test_init_fails_with_inverted_window() {
        let mut state_builder = TestStateBuilder::new();

        let mut ctx = TestInitContext::empty();
        ctx.set_init_origin(ADMIN_ACC);
        ctx.set_metadata_slot_time(Timestamp::from_timestamp_millis(1));

        let mut params = init_parameter();
        params.start_at = Timestamp::from_timestamp_millis(500);
        params.close_at = Timestamp::from_timestamp_millis(100);
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
    /// Test that init rejects a zero minimum purchase.
    fn test_init_fails_with_zero_minimum() {
        let mut state_builder = TestStateBuilder::new();

        let mut ctx = TestInitContext::empty();
        ctx.set_init_origin(ADMIN_ACC);
        ctx.set_metadata_slot_time(Timestamp::from_timestamp_millis(1));

        let mut params = init_parameter();
        params.min_purchase = ContractTokenAmount::from(0);
        let params_byte = to_bytes(&params);
        ctx.set_parameter(&params_byte);

        let result = contract_init(&ctx, &mut state_builder);
        claim!(result.is_err());
        let err = result.expect_err_report("init should reject");
        claim_eq!(err, CustomContractError::InvalidAmount.into());
    }

    #[concordium_test]
    /// Test that addWhitelist registers accounts and repeating an
    /// account changes nothing.
    fn test_add_whitelist() {
        let mut state_builder = TestStateBuilder::new();
        let state = initial_state(&mut state_builder);
        let mut host = TestHost::new(state, state_builder);

        let mut ctx = TestReceiveContext::empty();
        ctx.set_owner(ADMIN_ACC);
        ctx.set_sender(Address::Account(ADMIN_ACC));

        let params = AddWhitelistParams {
            whitelist: vec![PURCHASER1_ACC, PURCHASER2_ACC, PURCHASER1_ACC],
        };
        let params_byte = to_bytes(&params);
        ctx.set_parameter(&params_byte);

        let result = contract_add_whitelist(&ctx, &mut host);
        claim!(result.is_ok());
        claim!(host.state().is_whitelisted(&PURCHASER1_ACC));
        claim!(host.state().is_whitelisted(&PURCHASER2_ACC));
        claim_eq!(host.state().whitelist.iter().count(), 2);
    }

    #[concordium_test]
    /// Test that addWhitelist rejects a non-owner caller.
    fn test_add_whitelist_unauthorized() {
        let mut state_builder = TestStateBuilder::new();
        let state = initial_state(&mut state_builder);
        let mut host = TestHost::new(state, state_builder);

        let mut ctx = TestReceiveContext::empty();
        ctx.set_owner(ADMIN_ACC);
        ctx.set_sender(Address::Account(PURCHASER1_ACC));

        let params = AddWhitelistParams {
            whitelist: vec![PURCHASER1_ACC],
        };
        let params_byte = to_bytes(&params);
        ctx.set_parameter(&params_byte);

        let result = contract_add_whitelist(&ctx, &mut host);
        claim!(result.is_err());
        let err = result.expect_err_report("addWhitelist should reject");
        claim_eq!(err, ContractError::Unauthorized);
    }

    #[concordium_test]
    /// Test that the owner collects the whole CCD balance.
    fn test_withdraw_proceeds() {
        let mut state_builder = TestStateBuilder::new();
        let state = initial_state(&mut state_builder);
        let mut host = TestHost::new(state, state_builder);
        host.set_self_balance(PAID_CCD);

        let mut ctx = TestReceiveContext::empty();
        ctx.set_owner(ADMIN_ACC);
        ctx.set_sender(Address::Account(ADMIN_ACC));

        let result = contract_withdraw_proceeds(&ctx, &host);
        claim!(result.is_ok());
        claim_eq!(
            host.get_transfers(),
            [(ADMIN_ACC, PAID_CCD)],
            "something wrong with the payout logic."
        );
    }

    #[concordium_test]
    /// Test that a non-owner cannot collect proceeds.
    fn test_withdraw_proceeds_unauthorized() {
        let mut state_builder = TestStateBuilder::new();
        let state = initial_state(&mut state_builder);
        let mut host = TestHost::new(state, state_builder);
        host.set_self_balance(PAID_CCD);

        let mut ctx = TestReceiveContext::empty();
        ctx.set_owner(ADMIN_ACC);
        ctx.set_sender(Address::Account(PURCHASER1_ACC));

        let result = contract_withdraw_proceeds(&ctx, &host);
        claim!(result.is_err());
        let err = result.expect_err_report("withdrawProceeds should reject");
        claim_eq!(err, ContractError::Unauthorized);
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
}

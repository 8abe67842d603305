#![cfg(test)]
use super::*;
use soroban_sdk::{
    symbol_short,
    testutils::{Address as _, Events},
    vec, Env, IntoVal, TryFromVal, Val,
};

fn create_test_contract() -> (Env, Address, RewarderClient<'static>) {
    let env = Env::default();
    env.mock_all_auths();
    let contract_id = env.register_contract(None, Rewarder);
    let client = RewarderClient::new(&env, &contract_id);

    let admin = Address::generate(&env);
    let updater = Address::generate(&env);
    client.initialize(&admin);
    client.grant_role(&admin, &Role::UserUpdater, &updater);

    (env, updater, client)
}

fn delta(multiplier_bps: i128, bonus: i128) -> WeightDelta {
    WeightDelta::new(multiplier_bps, bonus)
}

#[test]
fn test_initialize_twice_fails() {
    let env = Env::default();
    env.mock_all_auths();
    let contract_id = env.register_contract(None, Rewarder);
    let client = RewarderClient::new(&env, &contract_id);
    let admin = Address::generate(&env);

    client.initialize(&admin);
    let result = client.try_initialize(&admin);
    assert_eq!(result, Err(Ok(RewarderError::AlreadyInitialized)));
}

#[test]
fn test_set_base_balance_returns_total() {
    let (env, updater, client) = create_test_contract();
    let user = Address::generate(&env);

    for balance in [5i128, 10, 100] {
        assert_eq!(client.set_base_balance(&updater, &0, &user, &balance), balance);
        assert_eq!(client.total(&0, &user), balance);
    }
    assert_eq!(client.user_pools(&user), vec![&env, 0u32]);
}

#[test]
fn test_negative_balance_rejected() {
    let (env, updater, client) = create_test_contract();
    let user = Address::generate(&env);

    let result = client.try_set_base_balance(&updater, &0, &user, &-1);
    assert_eq!(result, Err(Ok(RewarderError::InvalidAmount)));
}

#[test]
fn test_local_bonus_accumulates_and_clamps() {
    let (env, updater, client) = create_test_contract();
    let user = Address::generate(&env);

    // 5, 15, 7, 0, 2
    let expected = [(5i128, 5i128), (10, 15), (-8, 7), (-7, 0), (2, 2)];
    for (bonus, total) in expected {
        assert_eq!(client.apply_local_delta(&updater, &0, &user, &delta(0, bonus)), total);
    }

    // Bonus below zero clamps the total, never underflows
    assert_eq!(client.apply_local_delta(&updater, &0, &user, &delta(0, -10)), 0);
    let components = client.pool_components(&0, &user).unwrap();
    assert_eq!(components.bonus, -8);
}

#[test]
fn test_local_multiplier_scales_balance() {
    let (env, updater, client) = create_test_contract();
    let user = Address::generate(&env);

    client.set_base_balance(&updater, &0, &user, &10_000);
    assert_eq!(client.apply_local_delta(&updater, &0, &user, &delta(1, 0)), 10_001);
    assert_eq!(client.apply_local_delta(&updater, &0, &user, &delta(100, 0)), 10_101);
    assert_eq!(client.apply_local_delta(&updater, &0, &user, &delta(10_000, 0)), 20_101);
    assert_eq!(client.apply_local_delta(&updater, &0, &user, &delta(-10_101, 0)), 10_000);

    // Other pools are untouched
    assert_eq!(client.total(&1, &user), 0);
}

#[test]
fn test_neutral_components_are_removed() {
    let (env, updater, client) = create_test_contract();
    let user = Address::generate(&env);

    client.set_base_balance(&updater, &3, &user, &50);
    assert!(client.pool_components(&3, &user).is_some());

    client.set_base_balance(&updater, &3, &user, &0);
    assert!(client.pool_components(&3, &user).is_none());

    // The touched-pool set is append-only
    assert_eq!(client.user_pools(&user), vec![&env, 3u32]);
}

#[test]
fn test_overflow_fails_without_wrapping() {
    let (env, updater, client) = create_test_contract();
    let user = Address::generate(&env);

    // Fits at 1x, overflows at 2x
    let balance = i128::MAX / 15_000;
    client.set_base_balance(&updater, &0, &user, &balance);
    let result = client.try_apply_local_delta(&updater, &0, &user, &delta(10_000, 0));
    assert_eq!(result, Err(Ok(RewarderError::ArithmeticError)));

    // Nothing was retained from the failed call
    let components = client.pool_components(&0, &user).unwrap();
    assert_eq!(components.multiplier_bps, 0);
}

#[test]
fn test_global_delta_sweeps_touched_pools_in_batches() {
    let (env, updater, client) = create_test_contract();
    let user = Address::generate(&env);

    client.set_base_balance(&updater, &0, &user, &100);
    client.set_base_balance(&updater, &1, &user, &200);
    client.set_base_balance(&updater, &2, &user, &300);

    // +1% everywhere, two pools per call
    let sweep = client.apply_global_delta(&updater, &user, &delta(100, 0), &2, &5);
    assert!(!sweep.complete);
    assert_eq!(sweep.cursor, 2);
    assert_eq!(
        sweep.totals,
        vec![
            &env,
            PoolTotal { pool_id: 0, total: 101 },
            PoolTotal { pool_id: 1, total: 202 },
        ]
    );
    assert_eq!(client.cursor(&user), 2);

    // Resume with a zero delta
    let sweep = client.apply_global_delta(&updater, &user, &delta(0, 0), &2, &5);
    assert!(sweep.complete);
    assert_eq!(sweep.cursor, 0);
    assert_eq!(sweep.totals, vec![&env, PoolTotal { pool_id: 2, total: 303 }]);
    assert_eq!(client.cursor(&user), 0);
}

#[test]
fn test_new_global_delta_restarts_sweep() {
    let (env, updater, client) = create_test_contract();
    let user = Address::generate(&env);

    client.set_base_balance(&updater, &0, &user, &100);
    client.set_base_balance(&updater, &1, &user, &100);

    let sweep = client.apply_global_delta(&updater, &user, &delta(100, 0), &1, &2);
    assert_eq!(sweep.cursor, 1);

    // A second change before the first finished starts over from pool 0
    let sweep = client.apply_global_delta(&updater, &user, &delta(100, 0), &1, &2);
    assert_eq!(sweep.totals, vec![&env, PoolTotal { pool_id: 0, total: 102 }]);
    assert_eq!(sweep.cursor, 1);
}

#[test]
fn test_global_bonus_reaches_pools_without_balance() {
    let (env, updater, client) = create_test_contract();
    let user = Address::generate(&env);

    // No stake anywhere, so nothing to sweep
    let sweep = client.apply_global_delta(&updater, &user, &delta(100, 0), &10, &3);
    assert!(sweep.complete);
    assert_eq!(sweep.totals.len(), 0);

    let sweep = client.apply_global_delta(&updater, &user, &delta(0, 100), &10, &3);
    assert!(sweep.complete);
    assert_eq!(
        sweep.totals,
        vec![
            &env,
            PoolTotal { pool_id: 0, total: 100 },
            PoolTotal { pool_id: 1, total: 100 },
            PoolTotal { pool_id: 2, total: 100 },
        ]
    );
    assert_eq!(client.user_pools(&user), vec![&env, 0u32, 1, 2]);

    // Removing the bonus walks the pools it reached
    let sweep = client.apply_global_delta(&updater, &user, &delta(0, -100), &10, &3);
    assert!(sweep.complete);
    assert_eq!(sweep.totals.len(), 3);
    for pool_total in sweep.totals.iter() {
        assert_eq!(pool_total.total, 0);
    }
    assert_eq!(client.global_components(&user), GlobalComponents { multiplier_bps: 100, bonus: 0 });
}

#[test]
fn test_mixed_local_and_global_components() {
    let (env, updater, client) = create_test_contract();
    let user = Address::generate(&env);

    client.apply_global_delta(&updater, &user, &delta(100, 0), &10, &2);
    assert_eq!(client.set_base_balance(&updater, &0, &user, &100), 101);
    assert_eq!(client.apply_local_delta(&updater, &1, &user, &delta(500, 200)), 200);

    let sweep = client.apply_global_delta(&updater, &user, &delta(100, 0), &10, &2);
    assert_eq!(
        sweep.totals,
        vec![
            &env,
            PoolTotal { pool_id: 0, total: 102 },
            PoolTotal { pool_id: 1, total: 200 },
        ]
    );
}

#[test]
fn test_zero_batch_size_rejected() {
    let (env, updater, client) = create_test_contract();
    let user = Address::generate(&env);

    let result = client.try_apply_global_delta(&updater, &user, &delta(100, 0), &0, &1);
    assert_eq!(result, Err(Ok(RewarderError::InvalidBatchSize)));
}

#[test]
fn test_updates_require_user_updater_role() {
    let (env, _updater, client) = create_test_contract();
    let stranger = Address::generate(&env);
    let user = Address::generate(&env);

    assert_eq!(
        client.try_set_base_balance(&stranger, &0, &user, &10),
        Err(Ok(RewarderError::PermissionDenied))
    );
    assert_eq!(
        client.try_apply_local_delta(&stranger, &0, &user, &delta(0, 1)),
        Err(Ok(RewarderError::PermissionDenied))
    );
    assert_eq!(
        client.try_apply_global_delta(&stranger, &user, &delta(0, 1), &1, &1),
        Err(Ok(RewarderError::PermissionDenied))
    );
    assert_eq!(
        client.try_grant_role(&stranger, &Role::UserUpdater, &stranger),
        Err(Ok(RewarderError::PermissionDenied))
    );
}

#[test]
fn test_revoked_updater_loses_access() {
    let env = Env::default();
    env.mock_all_auths();
    let contract_id = env.register_contract(None, Rewarder);
    let client = RewarderClient::new(&env, &contract_id);
    let admin = Address::generate(&env);
    let updater = Address::generate(&env);
    let user = Address::generate(&env);

    client.initialize(&admin);
    client.grant_role(&admin, &Role::UserUpdater, &updater);
    assert!(client.has_role(&Role::UserUpdater, &updater));

    client.revoke_role(&admin, &Role::UserUpdater, &updater);
    assert!(!client.has_role(&Role::UserUpdater, &updater));
    assert_eq!(
        client.try_set_base_balance(&updater, &0, &user, &10),
        Err(Ok(RewarderError::PermissionDenied))
    );
}

fn last_global_event(env: &Env, contract: &Address) -> Option<GlobalWeightUpdatedEvent> {
    let topics: Vec<Val> = (symbol_short!("global"),).into_val(env);
    let mut found = None;
    for (id, event_topics, data) in env.events().all().iter() {
        if id == *contract && event_topics == topics {
            found = Some(GlobalWeightUpdatedEvent::try_from_val(env, &data).unwrap());
        }
    }
    found
}

#[test]
fn test_global_delta_publishes_sweep_progress() {
    let (env, updater, client) = create_test_contract();
    let user = Address::generate(&env);

    client.set_base_balance(&updater, &0, &user, &100);
    client.set_base_balance(&updater, &1, &user, &200);
    client.set_base_balance(&updater, &2, &user, &300);

    client.apply_global_delta(&updater, &user, &delta(100, 0), &2, &5);
    assert_eq!(
        last_global_event(&env, &client.address),
        Some(GlobalWeightUpdatedEvent {
            user: user.clone(),
            multiplier_bps: 100,
            bonus: 0,
            complete: false,
            cursor: 2,
        })
    );

    // Resuming reports the accumulated components and the reset cursor
    client.apply_global_delta(&updater, &user, &delta(0, 0), &2, &5);
    assert_eq!(
        last_global_event(&env, &client.address),
        Some(GlobalWeightUpdatedEvent {
            user,
            multiplier_bps: 100,
            bonus: 0,
            complete: true,
            cursor: 0,
        })
    );
}

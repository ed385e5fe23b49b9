#![cfg(test)]
use lending_pool::{Action, ReserveFees};
use rand::{rngs::StdRng, Rng, SeedableRng};
use soroban_sdk::{testutils::Address as _, vec, Address};
use test_suites::test_fixture::{
    TestFixture, TokenIndex, SCALAR_18, SCALAR_6, SCALAR_7, SCALAR_9,
};

const ROUNDING_DUST: i128 = 1000;

/// Run random actions and liquidations from several accounts over random time steps and price
/// moves, and check the reserve totals always cover the sum of the account balances, and that
/// indices never decrease.
#[test]
fn test_random_actions_conserve_balances() {
    let fixture = TestFixture::create();
    let mut rng = StdRng::seed_from_u64(0x5eed);
    let usdc = &fixture.tokens[TokenIndex::USDC];
    let usdax = &fixture.tokens[TokenIndex::USDAX];
    let weth = &fixture.tokens[TokenIndex::WETH];
    let lent_assets = [usdc.address.clone(), usdax.address.clone()];
    let collateral_assets = [
        usdc.address.clone(),
        usdax.address.clone(),
        weth.address.clone(),
    ];

    fixture.pool.set_reserve_fees(
        &fixture.bombadil,
        &usdax.address,
        &ReserveFees {
            deposit_fee_e6: 100_000,
            debt_fee_e6: 150_000,
        },
    );

    let users: Vec<Address> = (0..4).map(|_| Address::generate(&fixture.env)).collect();
    for user in users.iter() {
        usdc.mint(user, &(1_000_000 * SCALAR_6));
        usdax.mint(user, &(1_000_000 * SCALAR_6));
        weth.mint(user, &(100 * SCALAR_9));
        fixture.pool.deposit(user, user, &weth.address, &(10 * SCALAR_9));
        fixture
            .pool
            .deposit(user, user, &usdc.address, &(5_000 * SCALAR_6));
        fixture
            .pool
            .deposit(user, user, &usdax.address, &(5_000 * SCALAR_6));
    }
    // two accounts borrow enough to become liquidatable once wETH drops below ~470
    fixture
        .pool
        .borrow(&users[0], &users[0], &usdc.address, &(12_000 * SCALAR_6));
    fixture
        .pool
        .borrow(&users[1], &users[1], &usdax.address, &(12_000 * SCALAR_6));

    let mut last_indices = [(SCALAR_18, SCALAR_18); 2];
    let mut succeeded = 0;
    let mut liquidations = 0;
    for _ in 0..100 {
        let crashed = rng.gen_range(0, 4) == 0;
        let weth_price = if crashed {
            rng.gen_range(100, 400) * SCALAR_7
        } else {
            2000 * SCALAR_7
        };
        fixture.set_prices(SCALAR_7, SCALAR_7, weth_price);

        let user_index = rng.gen_range(0, users.len());
        let user = &users[user_index];
        let asset = &lent_assets[rng.gen_range(0, lent_assets.len())];
        let action = Action {
            action_type: rng.gen_range(0, 4),
            asset: asset.clone(),
            amount: rng.gen_range(1, 4_000) * SCALAR_6 + rng.gen_range(0, SCALAR_6),
        };
        if fixture
            .pool
            .try_multi_op(user, user, &vec![&fixture.env, action])
            .is_ok()
        {
            succeeded += 1;
        }

        if crashed {
            for (index, liquidated) in users.iter().enumerate() {
                let (solvent, _) = fixture
                    .pool
                    .view_account_free_collateral_coefficient(liquidated);
                if solvent {
                    continue;
                }
                let liquidator = &users[(index + 1) % users.len()];
                let asset_to_repay = lent_assets
                    .iter()
                    .find(|asset| {
                        fixture
                            .pool
                            .view_account_reserve_data(liquidated, asset)
                            .debt
                            > 0
                    })
                    .unwrap_or(&lent_assets[0]);
                let asset_to_take = &collateral_assets[rng.gen_range(0, 3)];
                let amount = rng.gen_range(1, 3_000) * SCALAR_6;
                if fixture
                    .pool
                    .try_liquidate(
                        liquidator,
                        liquidated,
                        asset_to_repay,
                        asset_to_take,
                        &amount,
                        &0,
                    )
                    .is_ok()
                {
                    liquidations += 1;
                }
            }
        }

        fixture.jump(rng.gen_range(0, 5 * 86_400));

        for (index, asset) in lent_assets.iter().enumerate() {
            let data = fixture.pool.view_reserve_data(asset);
            assert!(data.deposit_index >= last_indices[index].0);
            assert!(data.debt_index >= last_indices[index].1);
            assert!(data.debt_index >= data.deposit_index);
            last_indices[index] = (data.deposit_index, data.debt_index);
        }
    }
    assert!(succeeded > 20);
    assert!(liquidations > 0);

    for asset in collateral_assets.iter() {
        fixture.pool.accumulate_interest(asset);
        let data = fixture.pool.view_reserve_data(asset);

        let mut deposits = 0;
        let mut debts = 0;
        for user in users.iter() {
            let entry = fixture.pool.view_account_reserve_data(user, asset);
            if entry.deposit > 0 {
                deposits += entry.deposit * data.deposit_index / entry.applied_deposit_index;
            }
            if entry.debt > 0 {
                debts += entry.debt * data.debt_index / entry.applied_debt_index;
            }
        }

        let deposit_dust = data.total_deposit - deposits;
        let debt_dust = data.total_debt - debts;
        assert!(
            (0..=ROUNDING_DUST).contains(&deposit_dust),
            "deposit dust {}",
            deposit_dust
        );
        assert!(
            (0..=ROUNDING_DUST).contains(&debt_dust),
            "debt dust {}",
            debt_dust
        );
    }
}

use engine::{
    Action, Dice, OpponentSnapshot, Passives, PlayerState, PlayerStats, RulesConfig, Session,
    Stance, Turn,
};
use proptest::prelude::*;

fn action_from(n: u8) -> Action {
    match n % 4 {
        0 => Action::Blade,
        1 => Action::Ranged,
        2 => Action::Guard,
        _ => Action::Panic,
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn hp_stays_in_bounds_through_random_fights(
        seed in any::<u64>(),
        atk in -3i32..8,
        strength in -3i32..6,
        ac in 0i32..20,
        opp_ac in 0i32..20,
        opp_mod in -5i32..5,
        stance_idx in 0usize..3,
        weapon_tier in 0u8..8,
        actions in proptest::collection::vec(any::<(u8, bool)>(), 1..40),
    ) {
        let player = PlayerState {
            name: "Hero".into(),
            stats: PlayerStats {
                hp: 20,
                max_hp: 20,
                ac,
                atk,
                str_: strength,
                int_: 0,
                panic_charges: 1,
                passives: Passives { keen_edge: true, ward: true },
            },
            gear: engine::Gear { weapon_tier, armor_tier: 1 },
        };
        let opponent = OpponentSnapshot {
            name: "Drone".into(),
            hp: 25,
            max_hp: 25,
            ac: opp_ac,
            atk: 3,
            weapon_stance: Stance::ALL[stance_idx],
            damage_die: 6,
            damage_modifier: opp_mod,
            is_boss: false,
            boss_phase: 1,
        };
        let mut s = Session::new(RulesConfig::default(), Dice::from_seed(seed));
        s.open(&opponent, player);

        for (n, committed) in actions {
            s.submit(action_from(n), committed);
            s.flush();
            let p = s.player().map(|p| p.stats.hp).unwrap_or(0);
            let o = s.opponent().map(|o| o.hp).unwrap_or(0);
            prop_assert!((0..=20).contains(&p));
            prop_assert!((0..=25).contains(&o));
            if p == 0 || o == 0 {
                prop_assert_eq!(s.turn(), Turn::Ended);
                prop_assert!(s.outcome().is_some());
            }
            if s.turn() == Turn::Ended {
                break;
            }
            prop_assert_eq!(s.turn(), Turn::Player);
        }
    }
}

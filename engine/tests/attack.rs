use engine::{attack, damage, AdMode, DamageDice, Dice};
use proptest::prelude::*;

#[test]
fn attack_flags_and_logic_are_self_consistent() {
    let mut dice = Dice::from_seed(777);
    for _ in 0..100 {
        let res = attack(&mut dice, AdMode::Normal, 5, 15);
        assert_eq!(res.is_crit, res.roll == 20);
        assert_eq!(res.hit, res.is_crit || res.total >= res.ac);
    }
}

#[test]
fn natural_one_can_still_hit_low_ac() {
    let mut dice = Dice::from_scripted(vec![1]);
    let res = attack(&mut dice, AdMode::Normal, 9, 10);
    assert!(res.hit);
    assert!(!res.is_crit);
}

#[test]
fn kept_twenty_hits_any_ac() {
    let mut dice = Dice::from_scripted(vec![3, 20]);
    let res = attack(&mut dice, AdMode::Advantage, 0, 99);
    assert!(res.hit && res.is_crit);
}

#[test]
fn crit_damage_doubles_dice_only() {
    let dd = DamageDice::new(1, 8).with_flat(1);

    let mut normal_dice = Dice::from_scripted(vec![4]);
    let normal = damage(&mut normal_dice, dd, 3, false);
    assert_eq!(normal.total, 4 + 1 + 3);

    let mut crit_dice = Dice::from_scripted(vec![4, 5]);
    let crit = damage(&mut crit_dice, dd, 3, true);
    assert_eq!(crit.rolls, vec![4, 5]);
    assert_eq!(crit.total, 9 + 1 + 3);
}

#[test]
fn damage_roll_is_within_bounds() {
    let mut dice = Dice::from_seed(42);
    let dd = DamageDice::new(2, 6);
    for _ in 0..100 {
        let d = damage(&mut dice, dd, 3, false).total;
        assert!((5..=15).contains(&d));
    }
}

proptest! {
    #[test]
    fn damage_is_never_below_one(
        seed in any::<u64>(),
        count in 1u32..4,
        sides in 1u32..12,
        flat in -10i32..5,
        modifier in -20i32..20,
        crit in any::<bool>(),
    ) {
        let mut dice = Dice::from_seed(seed);
        let dd = DamageDice::new(count, sides).with_flat(flat);
        prop_assert!(damage(&mut dice, dd, modifier, crit).total >= 1);
    }
}

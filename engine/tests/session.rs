use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

use engine::{
    Action, Dice, EncounterObserver, OpponentSnapshot, Outcome, Passives, PlayerState,
    PlayerStats, RulesConfig, Session, Stance, Submission, Turn,
};

#[derive(Clone, Default)]
struct Recorder(Rc<RefCell<Vec<String>>>);

impl Recorder {
    fn events(&self) -> Vec<String> {
        self.0.borrow().clone()
    }
}

impl EncounterObserver for Recorder {
    fn on_win(&mut self, opponent: &OpponentSnapshot) {
        self.0.borrow_mut().push(format!(
            "win:{}:boss={}:phase={}",
            opponent.name, opponent.is_boss, opponent.boss_phase
        ));
    }

    fn on_lose(&mut self) {
        self.0.borrow_mut().push("lose".to_string());
    }

    fn on_exit(&mut self) {
        self.0.borrow_mut().push("exit".to_string());
    }
}

fn hero(hp: i32) -> PlayerState {
    PlayerState {
        name: "Hero".into(),
        stats: PlayerStats {
            hp,
            max_hp: 20,
            ac: 12,
            atk: 3,
            str_: 2,
            int_: 0,
            panic_charges: 0,
            passives: Passives::default(),
        },
        ..Default::default()
    }
}

fn drone(stance: Stance) -> OpponentSnapshot {
    OpponentSnapshot {
        name: "Drone".into(),
        hp: 10,
        max_hp: 10,
        ac: 10,
        atk: 2,
        weapon_stance: stance,
        damage_die: 4,
        damage_modifier: 0,
        is_boss: false,
        boss_phase: 1,
    }
}

fn session(faces: Vec<u32>) -> (Session, Recorder) {
    let rec = Recorder::default();
    let s = Session::new(RulesConfig::default(), Dice::from_scripted(faces)).with_observer(rec.clone());
    (s, rec)
}

fn player_hp(s: &Session) -> i32 {
    s.player().map(|p| p.stats.hp).unwrap_or(-1)
}

fn opponent_hp(s: &Session) -> i32 {
    s.opponent().map(|o| o.hp).unwrap_or(-1)
}

fn log_has(s: &Session, needle: &str) -> bool {
    s.log().is_some_and(|l| l.entries().iter().any(|e| e.contains(needle)))
}

#[test]
fn kept_natural_twenty_crits_a_guard_stance_regardless_of_ac() {
    // Blade into guard reads as disadvantage; both d20s show 20 so 20 is kept.
    let (mut s, _) = session(vec![20, 20, 1, 1]);
    let mut opp = drone(Stance::Guard);
    opp.ac = 40;
    s.open(&opp, hero(20));
    assert_eq!(s.submit(Action::Blade, false), Submission::Resolved);
    assert!(log_has(&s, "CRIT!"));
    // 1d8 floored at one die, doubled by the crit: 1 + 1, plus STR 2.
    assert_eq!(opponent_hp(&s), 6);
}

#[test]
fn advantage_crit_adds_and_doubles_dice() {
    let (mut s, _) = session(vec![5, 20, 1, 1, 1, 1]);
    s.open(&drone(Stance::Ranged), hero(20));
    s.submit(Action::Blade, false);
    // 1d8 +1 die for advantage, x2 for the crit: four 1s, plus STR 2.
    assert_eq!(opponent_hp(&s), 4);
}

#[test]
fn panic_without_enough_hp_fails_but_uses_the_turn() {
    let (mut s, _) = session(vec![]);
    s.open(&drone(Stance::Blade), hero(2));
    assert_eq!(s.submit(Action::Panic, false), Submission::Resolved);
    assert_eq!(s.turn(), Turn::Opponent);
    assert_eq!(player_hp(&s), 2);
    assert_eq!(opponent_hp(&s), 10);
    let latest = s.log().and_then(|l| l.latest()).unwrap_or_default().to_string();
    insta::assert_snapshot!(latest, @"[PANIC][Hero] Panic Overload failed: insufficient HP");
}

#[test]
fn panic_burns_hp_for_true_damage() {
    let (mut s, _) = session(vec![]);
    let mut opp = drone(Stance::Blade);
    opp.ac = 99;
    s.open(&opp, hero(20));
    s.submit(Action::Panic, false);
    assert_eq!(player_hp(&s), 17);
    assert_eq!(opponent_hp(&s), 2);
}

#[test]
fn free_panic_charge_waives_the_cost() {
    let (mut s, _) = session(vec![]);
    let mut p = hero(2);
    p.stats.panic_charges = 1;
    p.stats.int_ = 2;
    s.open(&drone(Stance::Blade), p);
    s.submit(Action::Panic, false);
    assert_eq!(player_hp(&s), 2);
    assert_eq!(opponent_hp(&s), 0);
    assert_eq!(s.player().map(|p| p.stats.panic_charges), Some(0));
    assert_eq!(s.turn(), Turn::Ended);
}

#[test]
fn guard_reduces_a_five_point_hit_to_two() {
    // Opponent re-rolls to guard (no counter), hits with 15, rolls 4 + 1.
    let (mut s, _) = session(vec![3, 15, 4]);
    let mut opp = drone(Stance::Blade);
    opp.damage_modifier = 1;
    s.open(&opp, hero(20));
    s.submit(Action::Guard, false);
    assert!(s.is_guarding());
    assert_eq!(s.guard_reduction(), 3);
    s.flush();
    assert!(log_has(&s, "blocks 5 → 2"));
    assert_eq!(player_hp(&s), 18);
    assert_eq!(opponent_hp(&s), 10);
    assert!(!s.is_guarding());
    assert_eq!(s.turn(), Turn::Player);
}

#[test]
fn committed_guard_adds_one_reduction() {
    let (mut s, _) = session(vec![]);
    s.open(&drone(Stance::Blade), hero(20));
    s.submit(Action::Guard, true);
    assert_eq!(s.guard_reduction(), 4);
}

#[test]
fn counter_bash_fires_on_a_missed_blade_attack() {
    // Re-roll to blade, disadvantage d20s 2 and 3 miss, counter d4 rolls 4.
    let (mut s, _) = session(vec![1, 2, 3, 4]);
    s.open(&drone(Stance::Ranged), hero(20));
    s.submit(Action::Guard, false);
    s.flush();
    assert!(log_has(&s, "MISS"));
    assert!(log_has(&s, "[COUNTER][Hero] shield bash for 6"));
    assert_eq!(opponent_hp(&s), 4);
    assert_eq!(player_hp(&s), 20);
}

#[test]
fn counter_bash_can_end_the_fight() {
    let (mut s, rec) = session(vec![1, 2, 3, 4]);
    let mut opp = drone(Stance::Ranged);
    opp.hp = 5;
    s.open(&opp, hero(20));
    s.submit(Action::Guard, false);
    s.flush();
    assert_eq!(s.turn(), Turn::Ended);
    assert_eq!(rec.events(), vec!["win:Drone:boss=false:phase=1"]);
}

#[test]
fn boss_phase_win_reports_boss_and_next_phase_reopens() {
    let (mut s, rec) = session(vec![]);
    let mut boss = drone(Stance::Guard);
    boss.name = "Warden".into();
    boss.is_boss = true;
    boss.hp = 3;
    boss.max_hp = 30;
    s.open(&boss, hero(20));
    s.submit(Action::Panic, false);

    assert_eq!(rec.events(), vec!["win:Warden:boss=true:phase=1"]);
    let Some(Outcome::Victory { opponent, boss_phase_cleared }) = s.outcome().cloned() else {
        panic!("expected a victory");
    };
    assert!(boss_phase_cleared);
    assert!(s.close());

    let next = opponent.next_boss_phase(s.rules().boss_phases).expect("phase 2");
    s.open(&next, hero(17));
    assert_eq!(s.opponent().map(|o| (o.boss_phase, o.hp)), Some((2, 30)));
    assert_eq!(s.turn(), Turn::Player);
}

#[test]
fn final_boss_phase_is_not_flagged_as_cleared() {
    let (mut s, _) = session(vec![]);
    let mut boss = drone(Stance::Guard);
    boss.is_boss = true;
    boss.boss_phase = 3;
    boss.hp = 1;
    s.open(&boss, hero(20));
    s.submit(Action::Panic, false);
    assert!(matches!(
        s.outcome(),
        Some(Outcome::Victory { boss_phase_cleared: false, .. })
    ));
}

#[test]
fn stale_submissions_are_ignored_until_the_opponent_replies() {
    // Player misses with a 1; opponent re-rolls blade and misses with a 1.
    let (mut s, _) = session(vec![1, 1, 1]);
    s.open(&drone(Stance::Blade), hero(20));
    assert_eq!(s.submit(Action::Blade, true), Submission::Resolved);
    assert_eq!(s.submit(Action::Blade, false), Submission::Ignored);
    assert_eq!(s.turn(), Turn::Opponent);

    s.advance(Duration::from_millis(400));
    assert_eq!(s.turn(), Turn::Opponent);
    assert_eq!(s.pending_delay(), Some(Duration::from_millis(200)));
    s.advance(Duration::from_millis(200));
    assert_eq!(s.turn(), Turn::Player);
    assert_eq!(s.pending_delay(), None);
}

#[test]
fn close_is_ignored_mid_fight_and_fires_exit_once() {
    let (mut s, rec) = session(vec![]);
    s.open(&drone(Stance::Blade), hero(20));
    assert!(!s.close());
    assert!(s.is_open());

    let mut weak = drone(Stance::Blade);
    weak.hp = 1;
    s.open(&weak, hero(20));
    s.submit(Action::Panic, false);
    assert_eq!(s.submit(Action::Blade, false), Submission::Ignored);
    assert!(s.close());
    assert!(!s.close());
    assert!(!s.is_open());
    assert_eq!(s.turn(), Turn::Ended);
    assert_eq!(rec.events(), vec!["win:Drone:boss=false:phase=1", "exit"]);
}

#[test]
fn reopening_cancels_a_pending_opponent_turn() {
    let (mut s, _) = session(vec![1]);
    s.open(&drone(Stance::Blade), hero(20));
    s.submit(Action::Blade, false);
    assert!(s.pending_delay().is_some());
    s.open(&drone(Stance::Blade), hero(20));
    assert_eq!(s.pending_delay(), None);
    s.advance(Duration::from_secs(5));
    assert_eq!(s.turn(), Turn::Player);
    assert_eq!(player_hp(&s), 20);
}

#[test]
fn open_copies_the_opponent() {
    let (mut s, _) = session(vec![]);
    let world = drone(Stance::Blade);
    s.open(&world, hero(20));
    s.submit(Action::Panic, false);
    assert_eq!(opponent_hp(&s), 2);
    assert_eq!(world.hp, 10);
}

#[test]
fn stance_is_visible_only_before_the_first_action() {
    // Ranged into guard misses on 1s; opponent re-rolls to ranged and misses.
    let (mut s, _) = session(vec![1, 1, 2, 1]);
    s.open(&drone(Stance::Guard), hero(20));
    assert_eq!(s.visible_stance(), Some(Stance::Guard));
    s.submit(Action::Ranged, false);
    assert_eq!(s.visible_stance(), None);
    s.flush();
    assert_eq!(s.opponent().map(|o| o.weapon_stance), Some(Stance::Ranged));
    assert_eq!(s.visible_stance(), None);
}

#[test]
fn committed_bad_read_backlash_can_lose_the_fight() {
    let (mut s, rec) = session(vec![20]);
    s.open(&drone(Stance::Blade), hero(1));
    s.submit(Action::Ranged, true);
    assert_eq!(player_hp(&s), 0);
    assert_eq!(opponent_hp(&s), 10);
    assert_eq!(s.turn(), Turn::Ended);
    assert_eq!(s.outcome(), Some(&Outcome::Defeat));
    assert_eq!(rec.events(), vec!["lose"]);
}

#[test]
fn committed_good_read_adds_hit_and_damage() {
    // d20 10 and 4 keep 10, +3 ATK +2 commit; two d8s show 2 and 2; +2 STR +1 commit.
    let (mut s, _) = session(vec![10, 4, 2, 2]);
    s.open(&drone(Stance::Ranged), hero(20));
    s.submit(Action::Blade, true);
    assert!(log_has(&s, "to-hit=15"));
    assert_eq!(opponent_hp(&s), 3);
}

#[test]
fn ward_soaks_only_one_hit_per_battle() {
    let faces = vec![5, 1, 15, 4, 1, 5, 1, 15, 4];
    let (mut s, _) = session(faces);
    let mut opp = drone(Stance::Blade);
    opp.ac = 50;
    let mut p = hero(20);
    p.stats.passives.ward = true;
    s.open(&opp, p);

    s.submit(Action::Blade, false);
    s.flush();
    assert!(s.ward_used());
    assert_eq!(player_hp(&s), 19);

    s.submit(Action::Blade, false);
    s.flush();
    assert_eq!(player_hp(&s), 15);
}

#[test]
fn ward_resets_on_open() {
    let (mut s, _) = session(vec![5, 1, 15, 4]);
    let mut opp = drone(Stance::Blade);
    opp.ac = 50;
    let mut p = hero(20);
    p.stats.passives.ward = true;
    s.open(&opp, p.clone());
    s.submit(Action::Blade, false);
    s.flush();
    assert!(s.ward_used());
    s.open(&opp, p);
    assert!(!s.ward_used());
}

#[test]
fn opponent_kill_fires_lose_once() {
    // Player misses; opponent re-rolls blade, crits with 20, two d4s show 4.
    let (mut s, rec) = session(vec![1, 1, 20, 4, 4]);
    s.open(&drone(Stance::Blade), hero(3));
    s.submit(Action::Blade, false);
    s.flush();
    assert_eq!(player_hp(&s), 0);
    assert_eq!(s.turn(), Turn::Ended);
    s.flush();
    s.advance(Duration::from_secs(1));
    assert_eq!(rec.events(), vec!["lose"]);
}

#[test]
fn submissions_without_an_open_session_are_ignored() {
    let (mut s, rec) = session(vec![]);
    assert_eq!(s.submit(Action::Blade, false), Submission::Ignored);
    assert!(!s.close());
    assert_eq!(s.turn(), Turn::Ended);
    assert!(rec.events().is_empty());
}

#[test]
fn first_action_reads_the_shown_stance_and_later_ones_reroll() {
    // Blade into guard: 1 and 1 miss. Opponent re-rolls ranged (2) and misses
    // on 1. Second blade re-rolls guard (3): 5 vs 9 keeps 5.
    let (mut s, _) = session(vec![1, 1, 2, 1, 3, 5, 9]);
    s.open(&drone(Stance::Guard), hero(20));
    s.submit(Action::Blade, false);
    s.flush();
    assert_eq!(s.opponent().map(|o| o.weapon_stance), Some(Stance::Ranged));
    s.submit(Action::Blade, false);
    assert_eq!(s.opponent().map(|o| o.weapon_stance), Some(Stance::Guard));

    let reads: Vec<String> = s
        .log()
        .map(|l| l.entries().iter().filter(|e| e.starts_with("[READ]")).cloned().collect())
        .unwrap_or_default();
    assert_eq!(reads, vec!["[READ][Hero] Blade → disadvantage"; 2]);
    assert!(log_has(&s, "d20=5 vs d20=9 (keep=5)"));
    assert_eq!(opponent_hp(&s), 10);
}

#[test]
fn opponent_opened_without_hp_is_already_beaten() {
    let (mut s, rec) = session(vec![]);
    let husk: OpponentSnapshot = serde_json::from_str(r#"{"name":"Husk","ac":1}"#).unwrap();
    s.open(&husk, hero(20));
    assert_eq!(s.turn(), Turn::Ended);
    assert_eq!(opponent_hp(&s), 0);
    assert!(matches!(s.outcome(), Some(Outcome::Victory { boss_phase_cleared: false, .. })));
    assert_eq!(s.submit(Action::Blade, false), Submission::Ignored);
    assert_eq!(rec.events(), vec!["win:Husk:boss=false:phase=1"]);
    assert!(s.close());
}

#[test]
fn negative_hp_is_clamped_on_open() {
    let (mut s, rec) = session(vec![]);
    let mut opp = drone(Stance::Blade);
    opp.hp = -5;
    s.open(&opp, hero(20));
    assert_eq!(opponent_hp(&s), 0);
    assert_eq!(s.turn(), Turn::Ended);

    s.close();
    s.open(&drone(Stance::Blade), hero(-5));
    assert_eq!(player_hp(&s), 0);
    assert_eq!(s.outcome(), Some(&Outcome::Defeat));
    assert_eq!(rec.events(), vec!["win:Drone:boss=false:phase=1", "exit", "lose"]);
}

//! HP mutation. Sessions clamp HP into `0..=max` on open and every change
//! after that goes through here, which only lowers it.

/// Apply `dmg` to `hp`, clamping at 0. Returns true if this call dropped the
/// combatant to 0.
pub fn apply_damage(name: &str, hp: &mut i32, dmg: i32, mut log: impl FnMut(String)) -> bool {
    let dmg = dmg.max(0);
    let before = (*hp).max(0);
    *hp = (before - dmg).max(0);
    log(format!("[HP][{}] {} → {} (−{})", name, before, *hp, dmg));
    before > 0 && *hp == 0
}

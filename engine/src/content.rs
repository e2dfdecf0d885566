use indexmap::IndexMap;

use crate::combatant::{OpponentSnapshot, PlayerState};
use crate::config::RulesConfig;
use crate::error::{EngineError, Result};

pub fn builtin_opponents() -> IndexMap<&'static str, &'static str> {
    IndexMap::from([
        ("void_drone", include_str!("../content/opponents/void_drone.json")),
        ("rust_sentinel", include_str!("../content/opponents/rust_sentinel.json")),
        ("core_warden", include_str!("../content/opponents/core_warden.json")),
    ])
}

pub fn builtin_players() -> IndexMap<&'static str, &'static str> {
    IndexMap::from([("scavenger", include_str!("../content/players/scavenger.json"))])
}

pub fn builtin_rules() -> &'static str {
    include_str!("../content/rules/default.yaml")
}

pub fn opponent(id: &str) -> Result<OpponentSnapshot> {
    let text = builtin_opponents()
        .get(id)
        .copied()
        .ok_or_else(|| EngineError::UnknownContent { kind: "opponent", id: id.to_string() })?;
    parse_opponent(text, id)
}

pub fn player(id: &str) -> Result<PlayerState> {
    let text = builtin_players()
        .get(id)
        .copied()
        .ok_or_else(|| EngineError::UnknownContent { kind: "player", id: id.to_string() })?;
    parse_player(text, id)
}

pub fn parse_opponent(text: &str, what: &str) -> Result<OpponentSnapshot> {
    serde_json::from_str(text).map_err(|source| EngineError::Json { what: what.to_string(), source })
}

pub fn parse_player(text: &str, what: &str) -> Result<PlayerState> {
    serde_json::from_str(text).map_err(|source| EngineError::Json { what: what.to_string(), source })
}

pub fn default_rules() -> Result<RulesConfig> {
    RulesConfig::from_yaml_str(builtin_rules())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_builtin_parses() {
        for id in builtin_opponents().keys() {
            let opp = opponent(id).unwrap();
            assert!(opp.hp > 0 && opp.hp <= opp.max_hp, "{id}");
        }
        for id in builtin_players().keys() {
            player(id).unwrap();
        }
        assert_eq!(default_rules().unwrap(), RulesConfig::default());
    }

    #[test]
    fn unknown_id_is_reported() {
        let err = opponent("nope").unwrap_err();
        assert_eq!(err.to_string(), "unknown opponent 'nope'");
    }

    #[test]
    fn only_the_warden_is_a_boss() {
        let bosses: Vec<_> = builtin_opponents()
            .keys()
            .filter(|id| opponent(id).unwrap().is_boss)
            .copied()
            .collect();
        assert_eq!(bosses, ["core_warden"]);
    }
}

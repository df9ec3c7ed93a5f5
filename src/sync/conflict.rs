//! Conflicting-action detection and resolution.

use super::types::PlayerActionRecord;

/// Authority level an action needs to act out of turn without being
/// flagged.
pub const ADMIN_AUTHORITY_LEVEL: u8 = 3;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ConflictKind {
    /// Two actions from the same player landed in the same integer-second
    /// timestamp bucket.
    DuplicateAction,
    /// An action arrived from someone other than the table's current
    /// actor, below ADMIN authority.
    OutOfTurn,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Conflict {
    pub kind: ConflictKind,
    pub actions: Vec<PlayerActionRecord>,
}

/// Finds same-player duplicate actions (grouped by integer timestamp) and
/// flags sub-ADMIN actions from anyone but `to_act_player_id` as
/// out-of-turn. Callers pass the table's actual current actor
/// explicitly rather than having this function infer it from a generic
/// game-state tree.
pub fn detect_conflicts(actions: &[PlayerActionRecord], to_act_player_id: &str) -> Vec<Conflict> {
    let mut conflicts = Vec::new();

    let mut by_player_second: std::collections::HashMap<(String, i64), Vec<PlayerActionRecord>> = std::collections::HashMap::new();
    for action in actions {
        by_player_second
            .entry((action.player_id.clone(), action.integer_timestamp()))
            .or_default()
            .push(action.clone());
    }
    for ((_, _), group) in by_player_second {
        if group.len() > 1 {
            conflicts.push(Conflict { kind: ConflictKind::DuplicateAction, actions: group });
        }
    }

    let out_of_turn: Vec<PlayerActionRecord> = actions
        .iter()
        .filter(|a| a.player_id != to_act_player_id && a.authority_level < ADMIN_AUTHORITY_LEVEL)
        .cloned()
        .collect();
    if !out_of_turn.is_empty() {
        conflicts.push(Conflict { kind: ConflictKind::OutOfTurn, actions: out_of_turn });
    }

    conflicts
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ResolutionStrategy {
    TimestampFirst,
    Sequential,
    AuthorityBased,
}

/// Picks the winning action among a conflicting group per `strategy`.
/// Assumes `group` is non-empty; callers only invoke this on
/// conflicts `detect_conflicts` actually produced. `AuthorityBased`
/// applies the full tiebreak chain: highest
/// authority, then earliest sub-second timestamp, then lexicographically
/// smallest player id.
pub fn resolve(group: &[PlayerActionRecord], strategy: ResolutionStrategy) -> &PlayerActionRecord {
    match strategy {
        ResolutionStrategy::TimestampFirst => group
            .iter()
            .min_by(|a, b| a.timestamp.partial_cmp(&b.timestamp).unwrap_or(std::cmp::Ordering::Equal))
            .expect("non-empty group"),
        ResolutionStrategy::Sequential => &group[0],
        ResolutionStrategy::AuthorityBased => group
            .iter()
            .min_by(|a, b| {
                b.authority_level
                    .cmp(&a.authority_level)
                    .then_with(|| a.timestamp.partial_cmp(&b.timestamp).unwrap_or(std::cmp::Ordering::Equal))
                    .then_with(|| a.player_id.cmp(&b.player_id))
            })
            .expect("non-empty group"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sync::types::PlayerRole;
    use crate::engine::nl::ActionKind;

    fn action(player: &str, kind: ActionKind, timestamp: f64, role: PlayerRole) -> PlayerActionRecord {
        PlayerActionRecord {
            player_id: player.to_string(),
            kind,
            amount: None,
            timestamp,
            player_role: role,
            authority_level: role.default_authority_level(),
        }
    }

    #[test]
    fn duplicate_actions_in_the_same_second_are_flagged() {
        let actions = vec![
            action("p1", ActionKind::Call, 10.1, PlayerRole::Player),
            action("p1", ActionKind::Fold, 10.4, PlayerRole::Player),
        ];
        let conflicts = detect_conflicts(&actions, "p1");
        assert!(conflicts.iter().any(|c| c.kind == ConflictKind::DuplicateAction));
    }

    #[test]
    fn out_of_turn_action_is_flagged() {
        let actions = vec![action("p2", ActionKind::Call, 10.1, PlayerRole::Player)];
        let conflicts = detect_conflicts(&actions, "p1");
        assert!(conflicts.iter().any(|c| c.kind == ConflictKind::OutOfTurn));
    }

    #[test]
    fn timestamp_first_picks_the_earliest_sub_second_timestamp() {
        let group = vec![
            action("p1", ActionKind::Call, 10.9, PlayerRole::Player),
            action("p1", ActionKind::Fold, 10.2, PlayerRole::Player),
        ];
        let winner = resolve(&group, ResolutionStrategy::TimestampFirst);
        assert_eq!(winner.kind, ActionKind::Fold);
    }

    #[test]
    fn sequential_picks_the_first_received() {
        let group = vec![
            action("p1", ActionKind::Call, 10.9, PlayerRole::Player),
            action("p1", ActionKind::Fold, 10.2, PlayerRole::Player),
        ];
        let winner = resolve(&group, ResolutionStrategy::Sequential);
        assert_eq!(winner.kind, ActionKind::Call);
    }

    #[test]
    fn authority_based_prefers_higher_authority_then_earlier_timestamp() {
        let group = vec![
            action("dealer", ActionKind::Fold, 10.9, PlayerRole::Dealer),
            action("player", ActionKind::Call, 10.1, PlayerRole::Player),
        ];
        let winner = resolve(&group, ResolutionStrategy::AuthorityBased);
        assert_eq!(winner.player_id, "dealer");
    }
}

use super::types::{Chips, PlayerState, Pot, Pots, SeatId};

/// Builds main + side pots from each player's `total_bet_this_hand`: sort contribution levels ascending, and for each distinct
/// level carve out a tier of `(level - previous_level) * contributors_at_or_above`
/// chips. A folded player's chips stay in whichever tier they funded — they
/// are counted toward the tier's amount but never appear in `eligible`,
/// which is the set of non-folded contributors at that level. Adjacent
/// tiers with identical eligibility are coalesced into one pot.
pub fn compute_pots(players: &[PlayerState]) -> Pots {
    let contributions: Vec<(SeatId, Chips, bool)> = players
        .iter()
        .map(|p| (p.seat, p.total_bet_this_hand + p.current_bet_this_round, p.folded))
        .collect();

    let mut levels: Vec<Chips> = contributions.iter().map(|(_, c, _)| *c).filter(|c| *c > 0).collect();
    levels.sort_unstable();
    levels.dedup();

    let mut tiers: Vec<Pot> = Vec::new();
    let mut prev = 0;
    for level in levels {
        let slice = level - prev;
        let contributors_at_or_above = contributions.iter().filter(|(_, c, _)| *c >= level).count() as Chips;
        let amount = slice * contributors_at_or_above;
        let mut eligible: Vec<SeatId> = contributions
            .iter()
            .filter(|(_, c, folded)| *c >= level && !folded)
            .map(|(seat, _, _)| *seat)
            .collect();
        eligible.sort_unstable();
        tiers.push(Pot { amount, eligible });
        prev = level;
    }

    let mut coalesced: Vec<Pot> = Vec::new();
    for tier in tiers {
        match coalesced.last_mut() {
            Some(last) if last.eligible == tier.eligible => {
                last.amount += tier.amount;
            }
            _ => coalesced.push(tier),
        }
    }

    if coalesced.is_empty() {
        return Pots::default();
    }
    let main = coalesced.remove(0);
    Pots { main, sides: coalesced }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::nl::types::PlayerState;

    fn player(id: u64, seat: SeatId, total_bet: Chips, folded: bool, all_in: bool) -> PlayerState {
        let mut p = PlayerState::new(id, seat, if all_in { 0 } else { 100 });
        p.total_bet_this_hand = total_bet;
        p.folded = folded;
        p.all_in = all_in;
        p
    }

    #[test]
    fn equal_contributions_form_a_single_main_pot() {
        let players = vec![
            player(1, 0, 100, false, false),
            player(2, 1, 100, false, false),
            player(3, 2, 100, false, false),
        ];
        let pots = compute_pots(&players);
        assert_eq!(pots.main.amount, 300);
        assert!(pots.sides.is_empty());
        assert_eq!(pots.main.eligible, vec![0, 1, 2]);
    }

    #[test]
    fn short_all_in_creates_a_side_pot_excluding_the_short_stack() {
        // seat 0 all-in for 50, seats 1 and 2 each put in 150.
        let players = vec![
            player(1, 0, 50, false, true),
            player(2, 1, 150, false, false),
            player(3, 2, 150, false, false),
        ];
        let pots = compute_pots(&players);
        assert_eq!(pots.main.amount, 150); // 50 * 3
        assert_eq!(pots.main.eligible, vec![0, 1, 2]);
        assert_eq!(pots.sides.len(), 1);
        assert_eq!(pots.sides[0].amount, 200); // (150-50) * 2
        assert_eq!(pots.sides[0].eligible, vec![1, 2]);
    }

    #[test]
    fn folded_contribution_stays_in_the_pot_but_not_eligible() {
        let players = vec![
            player(1, 0, 100, true, false),
            player(2, 1, 100, false, false),
            player(3, 2, 100, false, false),
        ];
        let pots = compute_pots(&players);
        assert_eq!(pots.main.amount, 300);
        assert_eq!(pots.main.eligible, vec![1, 2]);
    }

    #[test]
    fn two_equal_all_ins_coalesce_into_one_tier() {
        // seats 0 and 1 both all-in for 50, seat 2 puts in 150 total.
        let players = vec![
            player(1, 0, 50, false, true),
            player(2, 1, 50, false, true),
            player(3, 2, 150, false, false),
        ];
        let pots = compute_pots(&players);
        // tier 0->50: 50*3=150 eligible [0,1,2]; tier 50->150: 100*1=100 eligible [2]
        assert_eq!(pots.main.amount, 150);
        assert_eq!(pots.main.eligible, vec![0, 1, 2]);
        assert_eq!(pots.sides.len(), 1);
        assert_eq!(pots.sides[0].amount, 100);
        assert_eq!(pots.sides[0].eligible, vec![2]);
    }
}

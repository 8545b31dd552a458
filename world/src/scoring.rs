//! Points, completion bonuses, and winner selection.

use crop_rivals_core::{
    CompletionAward, Side, SideTally, Winner, COMPLETION_POINTS_PER_UNIT, DELIVERY_POINTS,
};

/// Splits the completion bonus of a request between both sides.
///
/// The side that delivered strictly more units receives the whole bonus and a
/// completed-request credit. On an exact tie both sides receive half of the
/// bonus rounded half up, and both are credited.
#[must_use]
pub fn completion_award(total: u32, player_delivered: u32, ai_delivered: u32) -> CompletionAward {
    let bonus = COMPLETION_POINTS_PER_UNIT * total;
    match player_delivered.cmp(&ai_delivered) {
        std::cmp::Ordering::Greater => CompletionAward {
            player_points: bonus,
            player_credited: true,
            ..CompletionAward::default()
        },
        std::cmp::Ordering::Less => CompletionAward {
            ai_points: bonus,
            ai_credited: true,
            ..CompletionAward::default()
        },
        std::cmp::Ordering::Equal => {
            let half = (bonus + 1) / 2;
            CompletionAward {
                player_points: half,
                ai_points: half,
                player_credited: true,
                ai_credited: true,
            }
        }
    }
}

/// Decides the winner by score, then completed requests, then correct deliveries.
#[must_use]
pub fn decide_winner(player: SideTally, ai: SideTally) -> Winner {
    let key = |tally: SideTally| {
        (
            tally.score,
            tally.completed_requests,
            tally.correct_deliveries,
        )
    };
    match key(player).cmp(&key(ai)) {
        std::cmp::Ordering::Greater => Winner::Player,
        std::cmp::Ordering::Less => Winner::Ai,
        std::cmp::Ordering::Equal => Winner::Tie,
    }
}

/// Running statistics of both sides.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Scoreboard {
    tallies: [SideTally; 2],
}

impl Scoreboard {
    /// Statistics accumulated by the provided side.
    #[must_use]
    pub const fn tally(&self, side: Side) -> SideTally {
        self.tallies[side.index()]
    }

    /// Credits a delivery that satisfied the current request.
    pub(crate) fn record_delivery(&mut self, side: Side) {
        let tally = &mut self.tallies[side.index()];
        tally.score += DELIVERY_POINTS;
        tally.correct_deliveries += 1;
    }

    /// Applies a completion bonus to both sides.
    pub(crate) fn record_completion(&mut self, award: CompletionAward) {
        for side in Side::BOTH {
            let tally = &mut self.tallies[side.index()];
            tally.score += award.points_for(side);
            if award.credits(side) {
                tally.completed_requests += 1;
            }
        }
    }

    /// Winner given the current statistics.
    #[must_use]
    pub fn winner(&self) -> Winner {
        decide_winner(self.tally(Side::Player), self.tally(Side::Ai))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sole_contributor_takes_whole_bonus() {
        let award = completion_award(2, 2, 0);
        assert_eq!(award.player_points, 6);
        assert_eq!(award.ai_points, 0);
        assert!(award.player_credited);
        assert!(!award.ai_credited);
    }

    #[test]
    fn majority_wins_partial_cooperation() {
        let award = completion_award(5, 2, 3);
        assert_eq!(award.points_for(Side::Ai), 15);
        assert_eq!(award.points_for(Side::Player), 0);
        assert!(award.credits(Side::Ai));
    }

    #[test]
    fn tie_splits_bonus_rounding_half_up() {
        let even = completion_award(4, 2, 2);
        assert_eq!((even.player_points, even.ai_points), (6, 6));
        assert!(even.player_credited && even.ai_credited);

        let odd = completion_award(3, 0, 0);
        assert_eq!((odd.player_points, odd.ai_points), (5, 5));
    }

    #[test]
    fn winner_falls_through_tie_breakers() {
        let base = SideTally {
            score: 20,
            completed_requests: 1,
            correct_deliveries: 3,
        };
        assert_eq!(decide_winner(base, base), Winner::Tie);

        let more_requests = SideTally {
            completed_requests: 2,
            ..base
        };
        assert_eq!(decide_winner(base, more_requests), Winner::Ai);

        let more_deliveries = SideTally {
            correct_deliveries: 4,
            ..base
        };
        assert_eq!(decide_winner(more_deliveries, base), Winner::Player);

        let higher_score = SideTally { score: 25, ..base };
        assert_eq!(decide_winner(higher_score, more_requests), Winner::Player);
    }

    #[test]
    fn scoreboard_accumulates_deliveries_and_bonuses() {
        let mut board = Scoreboard::default();
        board.record_delivery(Side::Player);
        board.record_delivery(Side::Ai);
        board.record_completion(completion_award(2, 1, 1));

        let player = board.tally(Side::Player);
        assert_eq!(player.score, 8);
        assert_eq!(player.correct_deliveries, 1);
        assert_eq!(player.completed_requests, 1);
        assert_eq!(board.winner(), Winner::Tie);
    }
}

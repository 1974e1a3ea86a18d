// Point-by-point scoring on a single match.

use super::model::{Match, MatchHistoryItem, MatchStatus, TeamId};
use super::Ignored;

impl Match {
    /// Record a point for `team_id`. The team must be one of the two sides.
    pub fn score_point(&mut self, team_id: TeamId, timestamp: i64) -> Result<(), Ignored> {
        if team_id == self.team_a_id {
            self.score_a += 1;
        } else if team_id == self.team_b_id {
            self.score_b += 1;
        } else {
            return Err(Ignored::TeamNotInMatch {
                match_id: self.id,
                team_id,
            });
        }
        self.history.push(MatchHistoryItem { team_id, timestamp });
        Ok(())
    }

    /// Remove the most recent point, whichever side scored it.
    pub fn undo_last_point(&mut self) -> Result<MatchHistoryItem, Ignored> {
        let last = self.history.pop().ok_or(Ignored::EmptyHistory(self.id))?;
        self.take_point_from(last.team_id);
        Ok(last)
    }

    /// Remove the most recent point scored by `team_id`, leaving every other
    /// history entry in place and in order.
    pub fn decrement_point(&mut self, team_id: TeamId) -> Result<MatchHistoryItem, Ignored> {
        let (own, _) = self.scores_for(team_id).ok_or(Ignored::TeamNotInMatch {
            match_id: self.id,
            team_id,
        })?;
        if own == 0 {
            return Err(Ignored::NoPointsForTeam(team_id));
        }
        let idx = self
            .history
            .iter()
            .rposition(|h| h.team_id == team_id)
            .ok_or(Ignored::NoPointsForTeam(team_id))?;
        let removed = self.history.remove(idx);
        self.take_point_from(team_id);
        Ok(removed)
    }

    /// Zero both scores and clear the history. Status and teams are kept.
    pub fn reset(&mut self) {
        self.score_a = 0;
        self.score_b = 0;
        self.history.clear();
    }

    pub fn complete(&mut self) {
        self.status = MatchStatus::Completed;
    }

    fn take_point_from(&mut self, team_id: TeamId) {
        if team_id == self.team_a_id {
            self.score_a = self.score_a.saturating_sub(1);
        } else if team_id == self.team_b_id {
            self.score_b = self.score_b.saturating_sub(1);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn counts(m: &Match) -> (u32, u32) {
        let a = m.history.iter().filter(|h| h.team_id == m.team_a_id).count() as u32;
        let b = m.history.iter().filter(|h| h.team_id == m.team_b_id).count() as u32;
        (a, b)
    }

    #[test]
    fn scoring_then_undo_scenario() {
        let mut m = Match::new(1, 10, 20, 0);
        for t in 0..3 {
            m.score_point(10, t).unwrap();
        }
        m.score_point(20, 3).unwrap();
        assert_eq!((m.score_a, m.score_b), (3, 1));
        assert_eq!(m.history.len(), 4);

        let undone = m.undo_last_point().unwrap();
        assert_eq!(undone.team_id, 20);
        assert_eq!((m.score_a, m.score_b), (3, 0));
        assert_eq!(m.history.len(), 3);
    }

    #[test]
    fn scoring_unknown_team_is_ignored() {
        let mut m = Match::new(1, 10, 20, 0);
        let err = m.score_point(30, 5).unwrap_err();
        assert_eq!(
            err,
            Ignored::TeamNotInMatch {
                match_id: 1,
                team_id: 30
            }
        );
        assert!(m.history.is_empty());
        assert_eq!((m.score_a, m.score_b), (0, 0));
    }

    #[test]
    fn undo_on_empty_history_is_ignored() {
        let mut m = Match::new(4, 10, 20, 0);
        assert_eq!(m.undo_last_point(), Err(Ignored::EmptyHistory(4)));
    }

    #[test]
    fn decrement_removes_latest_point_of_that_team_only() {
        let mut m = Match::new(1, 10, 20, 0);
        m.score_point(10, 1).unwrap();
        m.score_point(20, 2).unwrap();
        m.score_point(10, 3).unwrap();
        m.score_point(20, 4).unwrap();

        let removed = m.decrement_point(10).unwrap();
        assert_eq!(removed.timestamp, 3);
        let stamps: Vec<i64> = m.history.iter().map(|h| h.timestamp).collect();
        assert_eq!(stamps, vec![1, 2, 4]);
        assert_eq!((m.score_a, m.score_b), (1, 2));
    }

    #[test]
    fn decrement_at_zero_is_ignored() {
        let mut m = Match::new(1, 10, 20, 0);
        m.score_point(10, 1).unwrap();
        assert_eq!(m.decrement_point(20), Err(Ignored::NoPointsForTeam(20)));
        assert!(matches!(
            m.decrement_point(99),
            Err(Ignored::TeamNotInMatch { .. })
        ));
        assert_eq!(m.history.len(), 1);
    }

    #[test]
    fn reset_keeps_status_and_teams() {
        let mut m = Match::new(1, 10, 20, 0);
        m.score_point(10, 1).unwrap();
        m.complete();
        m.reset();
        assert_eq!((m.score_a, m.score_b), (0, 0));
        assert!(m.history.is_empty());
        assert_eq!(m.status, MatchStatus::Completed);
        assert_eq!((m.team_a_id, m.team_b_id), (10, 20));
    }

    proptest! {
        #[test]
        fn scores_always_match_history(ops in proptest::collection::vec(0u8..4, 0..64)) {
            let mut m = Match::new(1, 10, 20, 0);
            for (t, op) in ops.into_iter().enumerate() {
                let _ = match op {
                    0 => m.score_point(10, t as i64).map(|_| ()),
                    1 => m.score_point(20, t as i64).map(|_| ()),
                    2 => m.undo_last_point().map(|_| ()),
                    _ => m.decrement_point(if t % 2 == 0 { 10 } else { 20 }).map(|_| ()),
                };
                prop_assert_eq!(counts(&m), (m.score_a, m.score_b));
            }
        }

        #[test]
        fn undo_is_left_inverse_of_score(
            prefix in proptest::collection::vec(any::<bool>(), 0..32),
            side_a in any::<bool>(),
        ) {
            let mut m = Match::new(1, 10, 20, 0);
            for (t, a) in prefix.into_iter().enumerate() {
                m.score_point(if a { 10 } else { 20 }, t as i64).unwrap();
            }
            let before = m.clone();
            m.score_point(if side_a { 10 } else { 20 }, 1_000).unwrap();
            m.undo_last_point().unwrap();
            prop_assert_eq!(m, before);
        }
    }
}

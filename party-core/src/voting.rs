use std::collections::HashMap;

use party_types::PlayerId;

use crate::SessionError;

/// Votes cast during a round's voting phase, one per voter.
#[derive(Debug, Clone, Default)]
pub struct Ballot {
    votes: HashMap<PlayerId, PlayerId>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tally {
    /// Vote count per candidate, in roster order.
    pub counts: Vec<(PlayerId, u32)>,
    pub winner: Option<PlayerId>,
}

impl Ballot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a vote for the player at `target_index` in the roster. A later
    /// vote from the same voter replaces the earlier one.
    pub fn cast(
        &mut self,
        voter: PlayerId,
        target_index: i64,
        roster: &[PlayerId],
    ) -> Result<PlayerId, SessionError> {
        if !roster.contains(&voter) {
            return Err(SessionError::PlayerNotFound(voter));
        }

        let target = usize::try_from(target_index)
            .ok()
            .and_then(|index| roster.get(index))
            .copied()
            .ok_or(SessionError::InvalidTarget {
                index: target_index,
            })?;

        self.votes.insert(voter, target);
        Ok(target)
    }

    /// Drop the ballot of a player who left the group.
    pub fn withdraw(&mut self, voter: PlayerId) {
        self.votes.remove(&voter);
    }

    /// Roster members who have voted, in roster order.
    pub fn voters(&self, roster: &[PlayerId]) -> Vec<PlayerId> {
        roster
            .iter()
            .filter(|player| self.votes.contains_key(player))
            .copied()
            .collect()
    }

    pub fn cast_count(&self, roster: &[PlayerId]) -> usize {
        roster
            .iter()
            .filter(|player| self.votes.contains_key(player))
            .count()
    }

    /// Every current roster member has voted.
    pub fn is_complete(&self, roster: &[PlayerId]) -> bool {
        !roster.is_empty() && self.cast_count(roster) >= roster.len()
    }

    /// Count votes for candidates still in the roster. The winner has the
    /// highest count; ties go to the candidate who joined first.
    pub fn tally(&self, roster: &[PlayerId]) -> Tally {
        let counts: Vec<(PlayerId, u32)> = roster
            .iter()
            .map(|candidate| {
                let count = self
                    .votes
                    .values()
                    .filter(|target| *target == candidate)
                    .count() as u32;
                (*candidate, count)
            })
            .collect();

        let mut winner: Option<(PlayerId, u32)> = None;
        for &(candidate, count) in &counts {
            if count == 0 {
                continue;
            }
            match winner {
                Some((_, best)) if count <= best => {}
                _ => winner = Some((candidate, count)),
            }
        }

        Tally {
            counts,
            winner: winner.map(|(candidate, _)| candidate),
        }
    }
}

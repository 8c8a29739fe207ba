//! Ballot aggregation.
//!
//! For each voter: one batched content store lookup for the ballot's team
//! ids, then a join that re-orders the returned records to the ballot's
//! rank sequence. Voters are independent, so lookups run concurrently up to
//! a configured bound; output order always follows input order.

use crate::models::{BallotEntry, BallotsByVoter, IdRank, Team, VoterBreakdown};
use crate::store::{ContentStore, StoreError};
use futures::stream::{self, StreamExt, TryStreamExt};
use tracing::{debug, warn};

/// Resolve every voter's ballot against the content store.
///
/// Issues exactly one store query per voter, at most `concurrency` in
/// flight at a time. A failed lookup propagates immediately; no retry, no
/// partial result. Ids the store has no record for are omitted from that
/// voter's resolved ballot, with the remaining entries keeping their
/// relative rank order.
pub async fn process_voter_ballots<S: ContentStore + ?Sized>(
    store: &S,
    ballots: &BallotsByVoter,
    concurrency: usize,
) -> Result<Vec<VoterBreakdown>, StoreError> {
    let lookups = ballots.iter().map(|(voter_id, ballot)| async move {
        let ids = ballot.team_ids();
        let teams = store.teams_by_ids(&ids).await?;
        let resolved = reorder_to_ballot(&ballot.votes, &teams);

        if resolved.len() < ballot.votes.len() {
            warn!(
                "voter {}: {} of {} ballot slots have no store record",
                voter_id,
                ballot.votes.len() - resolved.len(),
                ballot.votes.len()
            );
        } else {
            debug!("voter {}: resolved {} slots", voter_id, resolved.len());
        }

        Ok(VoterBreakdown {
            name: ballot.voter.display_name(),
            organization: ballot.voter.organization.clone(),
            organization_role: ballot.voter.organization_role.clone(),
            ballot: resolved,
        })
    });

    // `buffered` yields results in input order regardless of completion order.
    stream::iter(lookups)
        .buffered(concurrency.max(1))
        .try_collect()
        .await
}

/// Re-order store records to match the ballot's rank sequence.
///
/// The store returns records in its own order; the join key is the document
/// id. Slots with no matching record are skipped.
fn reorder_to_ballot(votes: &[BallotEntry], teams: &[Team]) -> Vec<Team> {
    let mut ordered = Vec::with_capacity(votes.len());
    for entry in votes {
        if let Some(team) = teams.iter().find(|t| t.id == entry.team_id) {
            ordered.push(team.clone());
        }
    }
    ordered
}

/// Reshape a ballot into bare `{id, rank}` pairs.
///
/// Pure projection: no I/O, no reordering.
#[allow(dead_code)] // Utility for exporters that only need ids
pub fn project_to_id_rank(ballot: &[BallotEntry]) -> Vec<IdRank> {
    ballot
        .iter()
        .map(|b| IdRank {
            id: b.team_id.clone(),
            rank: b.rank,
        })
        .collect()
}

/// Count ballot slots that went unresolved across all voters.
///
/// `breakdowns` must be the output of [`process_voter_ballots`] for the same
/// `ballots` (the two sequences are positionally aligned).
pub fn missing_slots(ballots: &BallotsByVoter, breakdowns: &[VoterBreakdown]) -> usize {
    ballots
        .iter()
        .zip(breakdowns)
        .map(|((_, ballot), out)| ballot.votes.len().saturating_sub(out.ballot.len()))
        .sum()
}

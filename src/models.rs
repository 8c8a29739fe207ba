//! Data models for the ballot pipeline.
//!
//! This module contains the core data structures: raw ballots as exported
//! from the voting backend, resolved teams from the content store, and the
//! display-ready voter breakdowns.

use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use thiserror::Error;

/// Content store perspective: which document state queries read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Perspective {
    /// Published documents only (default).
    #[default]
    Published,
    /// Draft documents; requires an access token.
    Draft,
}

impl Perspective {
    /// The wire value expected by the content store API.
    pub fn as_str(&self) -> &'static str {
        match self {
            Perspective::Published => "published",
            Perspective::Draft => "draft",
        }
    }
}

impl fmt::Display for Perspective {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors raised while validating raw ballot input.
#[derive(Debug, Error)]
pub enum BallotError {
    /// A ballot slot carries an empty team id.
    #[error("voter {voter_id}: ballot slot {index} has an empty team id")]
    EmptyTeamId { voter_id: String, index: usize },

    /// Ranks are 1-based; zero means the export is malformed.
    #[error("voter {voter_id}: team {team_id} has rank 0 (ranks are 1-based)")]
    ZeroRank { voter_id: String, team_id: String },
}

/// One slot of a ballot: a team id at a 1-based rank.
///
/// Ranks are assumed unique and contiguous within a ballot; that invariant
/// is owned by the upstream collection step, not checked here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BallotEntry {
    /// Content store id of the ranked team.
    pub team_id: String,
    /// 1-based position within the ballot.
    pub rank: u32,
}

/// Identity of a voter as exported from the voting backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VoterIdentity {
    pub first_name: String,
    pub last_name: String,
    pub organization: String,
    pub organization_role: String,
}

impl VoterIdentity {
    /// Display name: first and last name joined by a single space.
    pub fn display_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

/// One voter's raw ballot: identity plus ranked team ids.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoterBallot {
    /// Who cast the ballot.
    #[serde(rename = "userData")]
    pub voter: VoterIdentity,
    /// Ballot slots, ordered by rank.
    pub votes: Vec<BallotEntry>,
}

impl VoterBallot {
    /// The ordered team-id sequence of this ballot.
    pub fn team_ids(&self) -> Vec<String> {
        self.votes.iter().map(|v| v.team_id.clone()).collect()
    }
}

/// Ballots keyed by voter id, in export (insertion) order.
///
/// The breakdown table renders voters in the order the export lists them, so
/// a plain `HashMap`/`BTreeMap` would lose information. This newtype keeps
/// entries in encounter order and deserializes straight from a JSON object.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BallotsByVoter(Vec<(String, VoterBallot)>);

impl BallotsByVoter {
    #[allow(dead_code)] // Constructor for programmatic exports
    pub fn new(entries: Vec<(String, VoterBallot)>) -> Self {
        Self(entries)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate voters in export order.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &VoterBallot)> {
        self.0.iter().map(|(id, ballot)| (id, ballot))
    }

    /// Total number of ballot slots across all voters.
    pub fn total_slots(&self) -> usize {
        self.0.iter().map(|(_, b)| b.votes.len()).sum()
    }

    /// Reject malformed ballot entries before any store traffic happens.
    pub fn validate(&self) -> Result<(), BallotError> {
        for (voter_id, ballot) in &self.0 {
            for (index, entry) in ballot.votes.iter().enumerate() {
                if entry.team_id.trim().is_empty() {
                    return Err(BallotError::EmptyTeamId {
                        voter_id: voter_id.clone(),
                        index,
                    });
                }
                if entry.rank == 0 {
                    return Err(BallotError::ZeroRank {
                        voter_id: voter_id.clone(),
                        team_id: entry.team_id.clone(),
                    });
                }
            }
        }
        Ok(())
    }
}

impl Serialize for BallotsByVoter {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (voter_id, ballot) in &self.0 {
            map.serialize_entry(voter_id, ballot)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for BallotsByVoter {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct BallotsVisitor;

        impl<'de> Visitor<'de> for BallotsVisitor {
            type Value = BallotsByVoter;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a map of voter id to ballot")
            }

            fn visit_map<A>(self, mut access: A) -> Result<Self::Value, A::Error>
            where
                A: MapAccess<'de>,
            {
                let mut entries = Vec::with_capacity(access.size_hint().unwrap_or(0));
                while let Some((voter_id, ballot)) = access.next_entry::<String, VoterBallot>()? {
                    entries.push((voter_id, ballot));
                }
                Ok(BallotsByVoter(entries))
            }
        }

        deserializer.deserialize_map(BallotsVisitor)
    }
}

/// A team record resolved from the content store.
///
/// Deserialized at the store boundary into this explicit schema; anything
/// the store returns beyond these fields is dropped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Team {
    /// Content store document id (the join key against ballot slots).
    #[serde(rename = "_id")]
    pub id: String,
    /// Display name of the team.
    pub name: String,
    /// Logo/crest image URL, when published.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

/// One voter's ballot resolved into display-ready records.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VoterBreakdown {
    /// Voter display name ("First Last").
    pub name: String,
    pub organization: String,
    pub organization_role: String,
    /// Resolved teams in rank order. May be shorter than the raw ballot if
    /// the store no longer has a record for some id.
    pub ballot: Vec<Team>,
}

/// An `{id, rank}` pair: a ballot slot without resolved display data.
#[allow(dead_code)] // Consumed by id-only exporters
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdRank {
    pub id: String,
    pub rank: u32,
}

/// The poll a set of ballots belongs to, for report labeling.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PollRef {
    /// Division slug, e.g. "fbs".
    pub division: String,
    pub year: u16,
    pub week: String,
}

impl fmt::Display for PollRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} week {}", self.division, self.year, self.week)
    }
}

/// Metadata about a generated breakdown.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportMetadata {
    /// Path of the ballots export the breakdown was built from.
    pub source: String,
    /// Date and time of generation.
    pub generated_at: chrono::DateTime<chrono::Utc>,
    /// Content store host the ballots were resolved against.
    pub store_url: String,
    /// Perspective the store was queried with.
    pub perspective: Perspective,
    /// The poll these ballots belong to, when labeled.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub poll: Option<PollRef>,
    /// Number of voters in the export.
    pub voters: usize,
    /// Ballot slots resolved to a store record.
    pub slots_resolved: usize,
    /// Ballot slots with no store record.
    pub slots_missing: usize,
    /// Wall-clock duration of the aggregation in seconds.
    pub duration_seconds: f64,
}

/// The complete breakdown output.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Report {
    /// Metadata about the run.
    pub metadata: ReportMetadata,
    /// One breakdown per voter, in export order.
    pub breakdowns: Vec<VoterBreakdown>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn identity(first: &str, last: &str) -> VoterIdentity {
        VoterIdentity {
            first_name: first.to_string(),
            last_name: last.to_string(),
            organization: "The Gazette".to_string(),
            organization_role: "Columnist".to_string(),
        }
    }

    #[test]
    fn test_display_name_single_space() {
        assert_eq!(identity("Jane", "Doe").display_name(), "Jane Doe");
    }

    #[test]
    fn test_ballots_deserialize_preserves_export_order() {
        // Keys deliberately out of alphabetical order.
        let json = r#"{
            "voter_z": {
                "userData": {"firstName": "Zoe", "lastName": "Moss", "organization": "Z", "organizationRole": "R"},
                "votes": [{"teamId": "t1", "rank": 1}]
            },
            "voter_a": {
                "userData": {"firstName": "Al", "lastName": "Birch", "organization": "A", "organizationRole": "R"},
                "votes": [{"teamId": "t2", "rank": 1}]
            }
        }"#;

        let ballots: BallotsByVoter = serde_json::from_str(json).unwrap();
        let order: Vec<&String> = ballots.iter().map(|(id, _)| id).collect();
        assert_eq!(order, vec!["voter_z", "voter_a"]);
    }

    #[test]
    fn test_ballots_roundtrip_keeps_order() {
        let ballots = BallotsByVoter::new(vec![
            (
                "b".to_string(),
                VoterBallot {
                    voter: identity("Jane", "Doe"),
                    votes: vec![BallotEntry {
                        team_id: "t1".to_string(),
                        rank: 1,
                    }],
                },
            ),
            (
                "a".to_string(),
                VoterBallot {
                    voter: identity("Al", "Birch"),
                    votes: vec![],
                },
            ),
        ]);

        let json = serde_json::to_string(&ballots).unwrap();
        let back: BallotsByVoter = serde_json::from_str(&json).unwrap();
        assert_eq!(back, ballots);
    }

    #[test]
    fn test_validate_rejects_empty_team_id() {
        let ballots = BallotsByVoter::new(vec![(
            "v1".to_string(),
            VoterBallot {
                voter: identity("Jane", "Doe"),
                votes: vec![BallotEntry {
                    team_id: "  ".to_string(),
                    rank: 1,
                }],
            },
        )]);

        let err = ballots.validate().unwrap_err();
        assert!(matches!(err, BallotError::EmptyTeamId { index: 0, .. }));
    }

    #[test]
    fn test_validate_rejects_zero_rank() {
        let ballots = BallotsByVoter::new(vec![(
            "v1".to_string(),
            VoterBallot {
                voter: identity("Jane", "Doe"),
                votes: vec![BallotEntry {
                    team_id: "t1".to_string(),
                    rank: 0,
                }],
            },
        )]);

        assert!(matches!(
            ballots.validate().unwrap_err(),
            BallotError::ZeroRank { .. }
        ));
    }

    #[test]
    fn test_team_decodes_store_document() {
        let json = r#"{"_id": "school_lsu", "name": "LSU", "image": "https://cdn.example/lsu.png"}"#;
        let team: Team = serde_json::from_str(json).unwrap();
        assert_eq!(team.id, "school_lsu");
        assert_eq!(team.name, "LSU");
        assert_eq!(team.image.as_deref(), Some("https://cdn.example/lsu.png"));

        // Image is optional for unpublished assets.
        let bare: Team = serde_json::from_str(r#"{"_id": "x", "name": "X"}"#).unwrap();
        assert!(bare.image.is_none());
    }

    #[test]
    fn test_fixture_export_parses() {
        let ballots: BallotsByVoter =
            serde_json::from_str(include_str!("../fixtures/ballots.json")).unwrap();

        assert_eq!(ballots.len(), 3);
        assert_eq!(ballots.total_slots(), 9);
        assert!(ballots.validate().is_ok());

        let (first_id, first) = ballots.iter().next().unwrap();
        assert_eq!(first_id, "user_8f3a");
        assert_eq!(first.voter.display_name(), "Jane Doe");
        assert_eq!(first.votes[0].team_id, "school_georgia");
    }

    #[test]
    fn test_team_ids_follow_vote_order() {
        let ballot = VoterBallot {
            voter: identity("Jane", "Doe"),
            votes: vec![
                BallotEntry {
                    team_id: "t3".to_string(),
                    rank: 1,
                },
                BallotEntry {
                    team_id: "t1".to_string(),
                    rank: 2,
                },
            ],
        };
        assert_eq!(ballot.team_ids(), vec!["t3", "t1"]);
    }
}

//! Event data — the teams and matches a competition event is made of.
//!
//! Both are ingested from an external events API by a collaborator outside
//! this crate; here they are identities scores attach to. Loads are
//! idempotent: re-ingesting an event leaves exactly one row per team and
//! per match.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// An event-scoped team. `(event_code, team_number)` is unique.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Team {
  pub event_code:  String,
  pub team_number: i64,
  pub name:        String,
}

/// An event-scoped match with its six alliance slots.
/// `(event_code, match_number)` is unique.
///
/// `scored` flips true the first time any score is recorded for the match
/// and is never reset by later scores. It is a per-match flag (not per
/// team-per-match): it only gates the unscored-matches listing, while
/// scoring eligibility is enforced by the score table's uniqueness
/// constraint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Match {
  pub event_code:   String,
  pub match_number: i64,
  pub description:  String,
  pub red1:         i64,
  pub red2:         i64,
  pub red3:         i64,
  pub blue1:        i64,
  pub blue2:        i64,
  pub blue3:        i64,
  pub scored:       bool,
}

/// The match/team listing served to scoring clients, keyed by number.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchesAndTeams {
  pub matches: BTreeMap<i64, Match>,
  pub teams:   BTreeMap<i64, Team>,
}

//! [`SqliteStore`] — the SQLite implementation of [`ScoreStore`].

use std::{collections::BTreeMap, path::Path};

use chrono::{DateTime, Utc};
use rusqlite::OptionalExtension as _;

use scorebook_core::{
  Error as CoreError,
  aggregate::{self, AllTeamResults, TeamResults},
  catalog::{GameMode, IntegratedCatalog, ItemKind, PageCatalog, ParsedPage, ScoringItem},
  event::{Match, MatchesAndTeams, Team},
  page::ScoringPage,
  reconcile::{self, MigrationReport},
  score::{PageUsage, ScoreRecord, ScoredMatch},
  store::ScoreStore,
};

use crate::{
  error::{self, Error, Result},
  schema::SCHEMA,
};

// ─── Row decoding ────────────────────────────────────────────────────────────

fn decode_dt(raw: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(raw)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

/// A `scoring_pages` row before the timestamp is parsed.
struct RawPage {
  page_id:      i64,
  content_hash: String,
  validated:    bool,
  integrated:   bool,
  tested:       bool,
  created_at:   String,
}

impl RawPage {
  const COLUMNS: &'static str =
    "page_id, content_hash, validated, integrated, tested, created_at";

  fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      page_id:      row.get(0)?,
      content_hash: row.get(1)?,
      validated:    row.get(2)?,
      integrated:   row.get(3)?,
      tested:       row.get(4)?,
      created_at:   row.get(5)?,
    })
  }

  fn into_page(self) -> Result<ScoringPage> {
    Ok(ScoringPage {
      page_id:      self.page_id,
      content_hash: self.content_hash,
      validated:    self.validated,
      integrated:   self.integrated,
      tested:       self.tested,
      created_at:   decode_dt(&self.created_at)?,
    })
  }
}

fn score_record_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<ScoreRecord> {
  Ok(ScoreRecord {
    page_id:      row.get(0)?,
    mode_id:      row.get(1)?,
    item_id:      row.get(2)?,
    event_code:   row.get(3)?,
    team_number:  row.get(4)?,
    match_number: row.get(5)?,
    value:        row.get(6)?,
  })
}

const SCORE_COLUMNS: &str =
  "page_id, mode_id, item_id, event_code, team_number, match_number, value";

// ─── Store ───────────────────────────────────────────────────────────────────

/// A scorebook store backed by a single SQLite file.
///
/// Cloning is cheap — the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store — useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  /// Insert game modes for a page and return their name → id map.
  ///
  /// Unlike [`ScoreStore::integrate_page`] this does not check whether the
  /// page was already integrated: re-adding an existing `(page_id, name)`
  /// pair is a [`Error::DuplicateCatalogEntry`] conflict.
  pub async fn add_game_modes(
    &self,
    page_id: i64,
    names: Vec<String>,
  ) -> Result<BTreeMap<String, i64>> {
    let result = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        let mut ids = BTreeMap::new();
        for name in names {
          tx.execute(
            "INSERT INTO game_modes (page_id, name) VALUES (?1, ?2)",
            rusqlite::params![page_id, name],
          )?;
          ids.insert(name, tx.last_insert_rowid());
        }
        tx.commit()?;
        Ok(ids)
      })
      .await;

    match result {
      Err(e) if error::is_unique_violation(&e) => {
        Err(Error::DuplicateCatalogEntry { page_id })
      }
      other => other.map_err(Error::from),
    }
  }

  /// Insert scoring items for a page and return their name → id map.
  /// Same conflict behavior as [`SqliteStore::add_game_modes`].
  pub async fn add_scoring_items(
    &self,
    page_id: i64,
    items: Vec<(ItemKind, String)>,
  ) -> Result<BTreeMap<String, i64>> {
    let result = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        let mut ids = BTreeMap::new();
        for (kind, name) in items {
          tx.execute(
            "INSERT INTO scoring_items (page_id, name, kind) VALUES (?1, ?2, ?3)",
            rusqlite::params![page_id, name, kind.as_str()],
          )?;
          ids.insert(name, tx.last_insert_rowid());
        }
        tx.commit()?;
        Ok(ids)
      })
      .await;

    match result {
      Err(e) if error::is_unique_violation(&e) => {
        Err(Error::DuplicateCatalogEntry { page_id })
      }
      other => other.map_err(Error::from),
    }
  }

  /// Load all score records for (event, page), team-agnostic.
  async fn load_event_records(
    &self,
    event_code: String,
    page_id: i64,
  ) -> Result<Vec<ScoreRecord>> {
    let records = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {SCORE_COLUMNS} FROM scores
           WHERE event_code = ?1 AND page_id = ?2"
        ))?;
        let rows = stmt
          .query_map(rusqlite::params![event_code, page_id], |row| {
            score_record_from_row(row)
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;
    Ok(records)
  }
}

// ─── ScoreStore impl ─────────────────────────────────────────────────────────

impl ScoreStore for SqliteStore {
  type Error = Error;

  // ── Scoring pages ─────────────────────────────────────────────────────────

  async fn register_page(&self, content_hash: String) -> Result<ScoringPage> {
    let created_at = Utc::now().to_rfc3339();

    let raw = self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT OR IGNORE INTO scoring_pages (content_hash, created_at)
           VALUES (?1, ?2)",
          rusqlite::params![content_hash, created_at],
        )?;
        let raw = conn.query_row(
          &format!(
            "SELECT {} FROM scoring_pages WHERE content_hash = ?1",
            RawPage::COLUMNS
          ),
          rusqlite::params![content_hash],
          RawPage::from_row,
        )?;
        Ok(raw)
      })
      .await?;

    raw.into_page()
  }

  async fn find_page(&self, page_id: i64) -> Result<Option<ScoringPage>> {
    let raw = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!(
                "SELECT {} FROM scoring_pages WHERE page_id = ?1",
                RawPage::COLUMNS
              ),
              rusqlite::params![page_id],
              RawPage::from_row,
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawPage::into_page).transpose()
  }

  async fn find_page_by_hash(&self, content_hash: &str) -> Result<Option<ScoringPage>> {
    let hash = content_hash.to_owned();

    let raw = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!(
                "SELECT {} FROM scoring_pages WHERE content_hash = ?1",
                RawPage::COLUMNS
              ),
              rusqlite::params![hash],
              RawPage::from_row,
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawPage::into_page).transpose()
  }

  async fn mark_validated(&self, page_id: i64) -> Result<()> {
    let updated = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "UPDATE scoring_pages SET validated = 1 WHERE page_id = ?1",
          rusqlite::params![page_id],
        )?)
      })
      .await?;

    if updated == 0 {
      return Err(CoreError::PageNotFound(page_id).into());
    }
    Ok(())
  }

  async fn mark_tested(&self, page_id: i64, passed: bool) -> Result<()> {
    let updated = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "UPDATE scoring_pages SET tested = ?2 WHERE page_id = ?1",
          rusqlite::params![page_id, passed],
        )?)
      })
      .await?;

    if updated == 0 {
      return Err(CoreError::PageNotFound(page_id).into());
    }
    Ok(())
  }

  // ── Integration ───────────────────────────────────────────────────────────

  async fn integrate_page(
    &self,
    page_id: i64,
    parsed: ParsedPage,
  ) -> Result<IntegratedCatalog> {
    let page = self
      .find_page(page_id)
      .await?
      .ok_or(CoreError::PageNotFound(page_id))?;
    if !page.validated {
      return Err(CoreError::PageNotValidated(page_id).into());
    }
    // Re-running integration must hand back the same mapping without
    // touching the catalog.
    if page.integrated {
      return Ok(self.page_catalog(page_id).await?.id_maps());
    }

    let items: Vec<(ItemKind, String)> = parsed
      .normalized_items()?
      .into_iter()
      .map(|(kind, name)| (kind, name.to_owned()))
      .collect();

    let modes = self.add_game_modes(page_id, parsed.game_modes).await?;
    let items = self.add_scoring_items(page_id, items).await?;

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "UPDATE scoring_pages SET integrated = 1 WHERE page_id = ?1",
          rusqlite::params![page_id],
        )?;
        Ok(())
      })
      .await?;

    tracing::info!(page_id, modes = modes.len(), items = items.len(), "scoring page integrated");

    Ok(IntegratedCatalog { modes, items })
  }

  async fn page_catalog(&self, page_id: i64) -> Result<PageCatalog> {
    let (modes, items): (Vec<(i64, String)>, Vec<(i64, String, String)>) = self
      .conn
      .call(move |conn| {
        let mut stmt =
          conn.prepare("SELECT mode_id, name FROM game_modes WHERE page_id = ?1")?;
        let modes = stmt
          .query_map(rusqlite::params![page_id], |row| {
            Ok((row.get(0)?, row.get(1)?))
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;

        let mut stmt = conn
          .prepare("SELECT item_id, name, kind FROM scoring_items WHERE page_id = ?1")?;
        let items = stmt
          .query_map(rusqlite::params![page_id], |row| {
            Ok((row.get(0)?, row.get(1)?, row.get(2)?))
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok((modes, items))
      })
      .await?;

    let modes = modes
      .into_iter()
      .map(|(mode_id, name)| {
        (name.clone(), GameMode { mode_id, page_id, name })
      })
      .collect();
    let items = items
      .into_iter()
      .map(|(item_id, name, kind)| {
        let kind: ItemKind = kind.parse()?;
        Ok((name.clone(), ScoringItem { item_id, page_id, name, kind }))
      })
      .collect::<Result<_, CoreError>>()?;

    Ok(PageCatalog { modes, items })
  }

  // ── Event data ────────────────────────────────────────────────────────────

  async fn store_teams(&self, teams: Vec<Team>) -> Result<()> {
    self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        for team in teams {
          tx.execute(
            "INSERT OR IGNORE INTO teams (event_code, team_number, name)
             VALUES (?1, ?2, ?3)",
            rusqlite::params![team.event_code, team.team_number, team.name],
          )?;
        }
        tx.commit()?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  async fn store_matches(&self, matches: Vec<Match>) -> Result<()> {
    self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        for m in matches {
          tx.execute(
            "INSERT OR IGNORE INTO matches
               (event_code, match_number, description,
                red1, red2, red3, blue1, blue2, blue3)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
            rusqlite::params![
              m.event_code,
              m.match_number,
              m.description,
              m.red1,
              m.red2,
              m.red3,
              m.blue1,
              m.blue2,
              m.blue3,
            ],
          )?;
        }
        tx.commit()?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  async fn matches_and_teams(
    &self,
    event_code: &str,
    unscored_only: bool,
  ) -> Result<MatchesAndTeams> {
    let event = event_code.to_owned();

    let result = self
      .conn
      .call(move |conn| {
        let sql = if unscored_only {
          "SELECT event_code, match_number, description,
                  red1, red2, red3, blue1, blue2, blue3, scored
           FROM matches WHERE event_code = ?1 AND scored = 0"
        } else {
          "SELECT event_code, match_number, description,
                  red1, red2, red3, blue1, blue2, blue3, scored
           FROM matches WHERE event_code = ?1"
        };
        let mut stmt = conn.prepare(sql)?;
        let matches = stmt
          .query_map(rusqlite::params![event], |row| {
            Ok(Match {
              event_code:   row.get(0)?,
              match_number: row.get(1)?,
              description:  row.get(2)?,
              red1:         row.get(3)?,
              red2:         row.get(4)?,
              red3:         row.get(5)?,
              blue1:        row.get(6)?,
              blue2:        row.get(7)?,
              blue3:        row.get(8)?,
              scored:       row.get(9)?,
            })
          })?
          .map(|m| m.map(|m| (m.match_number, m)))
          .collect::<rusqlite::Result<BTreeMap<_, _>>>()?;

        let mut stmt = conn
          .prepare("SELECT event_code, team_number, name FROM teams WHERE event_code = ?1")?;
        let teams = stmt
          .query_map(rusqlite::params![event], |row| {
            Ok(Team {
              event_code:  row.get(0)?,
              team_number: row.get(1)?,
              name:        row.get(2)?,
            })
          })?
          .map(|t| t.map(|t| (t.team_number, t)))
          .collect::<rusqlite::Result<BTreeMap<_, _>>>()?;

        Ok(MatchesAndTeams { matches, teams })
      })
      .await?;

    Ok(result)
  }

  async fn delete_matches(&self, event_code: &str) -> Result<()> {
    let event = event_code.to_owned();
    self
      .conn
      .call(move |conn| {
        conn.execute("DELETE FROM matches WHERE event_code = ?1", rusqlite::params![event])?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  // ── Scores ────────────────────────────────────────────────────────────────

  async fn already_scored(
    &self,
    event_code: &str,
    team_number: i64,
    match_number: i64,
  ) -> Result<bool> {
    let event = event_code.to_owned();
    let scored = self
      .conn
      .call(move |conn| {
        Ok(conn.query_row(
          "SELECT EXISTS(
             SELECT 1 FROM scores
             WHERE event_code = ?1 AND team_number = ?2 AND match_number = ?3
           )",
          rusqlite::params![event, team_number, match_number],
          |row| row.get(0),
        )?)
      })
      .await?;
    Ok(scored)
  }

  async fn record_scores(
    &self,
    event_code: &str,
    page_id: i64,
    submission: ScoredMatch,
  ) -> Result<()> {
    let event = event_code.to_owned();
    let team_number = submission.team_number;
    let match_number = submission.match_number;

    let result = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        for score in &submission.scores {
          tx.execute(
            &format!("INSERT INTO scores ({SCORE_COLUMNS}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)"),
            rusqlite::params![
              page_id,
              score.mode_id,
              score.item_id,
              event,
              submission.team_number,
              submission.match_number,
              score.value,
            ],
          )?;
        }
        // Per-match flag: stays true once any score lands, no matter which
        // team it was for.
        tx.execute(
          "UPDATE matches SET scored = 1 WHERE event_code = ?1 AND match_number = ?2",
          rusqlite::params![event, submission.match_number],
        )?;
        tx.commit()?;
        Ok(())
      })
      .await;

    match result {
      Err(e) if error::is_unique_violation(&e) => Err(Error::DuplicateScore {
        event_code: event_code.to_owned(),
        team_number,
        match_number,
      }),
      other => other.map_err(Error::from),
    }
  }

  async fn delete_scores(&self, event_code: &str) -> Result<()> {
    let event = event_code.to_owned();
    self
      .conn
      .call(move |conn| {
        conn.execute("DELETE FROM scores WHERE event_code = ?1", rusqlite::params![event])?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  async fn pages_used(&self, event_code: &str) -> Result<Vec<PageUsage>> {
    let event = event_code.to_owned();
    let usage = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT page_id, COUNT(*) AS score_count
           FROM scores WHERE event_code = ?1
           GROUP BY page_id
           ORDER BY score_count DESC, page_id",
        )?;
        let rows = stmt
          .query_map(rusqlite::params![event], |row| {
            Ok(PageUsage { page_id: row.get(0)?, score_count: row.get(1)? })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;
    Ok(usage)
  }

  // ── Aggregation ───────────────────────────────────────────────────────────

  async fn team_results(
    &self,
    event_code: &str,
    team_number: i64,
    page_id: i64,
  ) -> Result<TeamResults> {
    let catalog = self.page_catalog(page_id).await?;

    let event = event_code.to_owned();
    let (match_count, records) = self
      .conn
      .call(move |conn| {
        // The number of matches contributing data, shared by every cell of
        // this team's results.
        let match_count: u32 = conn.query_row(
          "SELECT COUNT(DISTINCT match_number) FROM scores
           WHERE event_code = ?1 AND team_number = ?2 AND page_id = ?3",
          rusqlite::params![event, team_number, page_id],
          |row| row.get(0),
        )?;

        let mut stmt = conn.prepare(&format!(
          "SELECT {SCORE_COLUMNS} FROM scores
           WHERE event_code = ?1 AND team_number = ?2 AND page_id = ?3"
        ))?;
        let records = stmt
          .query_map(rusqlite::params![event, team_number, page_id], |row| {
            score_record_from_row(row)
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok((match_count, records))
      })
      .await?;

    aggregate::fold_team_results(team_number, &catalog, &records, match_count)
      .map_err(Error::from)
  }

  async fn all_team_results(
    &self,
    event_code: &str,
    page_id: i64,
  ) -> Result<AllTeamResults> {
    let event = event_code.to_owned();
    let team_numbers: Vec<i64> = self
      .conn
      .call(move |conn| {
        let mut stmt =
          conn.prepare("SELECT team_number FROM teams WHERE event_code = ?1")?;
        let rows = stmt
          .query_map(rusqlite::params![event], |row| row.get(0))?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    let mut teams = BTreeMap::new();
    for team_number in team_numbers {
      let results = self.team_results(event_code, team_number, page_id).await?;
      teams.insert(team_number, results);
    }

    Ok(AllTeamResults { teams })
  }

  // ── Migration ─────────────────────────────────────────────────────────────

  async fn migrate_event(
    &self,
    event_code: &str,
    old_page_id: i64,
    new_page_id: i64,
  ) -> Result<MigrationReport> {
    // Both pages must exist; anything else is a caller error, not a
    // reconciliation outcome.
    for page_id in [old_page_id, new_page_id] {
      self
        .find_page(page_id)
        .await?
        .ok_or(CoreError::PageNotFound(page_id))?;
    }

    let old_catalog = self.page_catalog(old_page_id).await?;
    let new_catalog = self.page_catalog(new_page_id).await?;
    let plan = reconcile::plan_migration(&old_catalog, &new_catalog);

    let mut report = MigrationReport {
      warning_messages: plan.warnings(),
      ..MigrationReport::default()
    };

    let records = self.load_event_records(event_code.to_owned(), old_page_id).await?;
    let migrated: Vec<ScoreRecord> = records
      .iter()
      .filter_map(|record| plan.remap(record, new_page_id))
      .collect();
    let migrated_count = migrated.len();

    let copy = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        for record in &migrated {
          tx.execute(
            &format!("INSERT INTO scores ({SCORE_COLUMNS}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)"),
            rusqlite::params![
              record.page_id,
              record.mode_id,
              record.item_id,
              record.event_code,
              record.team_number,
              record.match_number,
              record.value,
            ],
          )?;
        }
        tx.commit()?;
        Ok(())
      })
      .await;

    match copy {
      Ok(()) => {
        tracing::info!(
          event_code,
          old_page_id,
          new_page_id,
          migrated = migrated_count,
          "event scores migrated to new scoring page"
        );
        report.success_messages.push(format!(
          "migrated {migrated_count} score records from page {old_page_id} to \
           page {new_page_id} (items: [{}]; modes: [{}])",
          plan.items.kept.join(", "),
          plan.modes.kept.join(", "),
        ));
      }
      Err(e) => {
        // The transaction is gone; zero rows were copied. Report, don't
        // raise — the caller may retry once the storage issue is resolved.
        report.error_messages.push(format!("database error: {e}"));
      }
    }

    Ok(report)
  }
}

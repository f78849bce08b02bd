use rusqlite::{Connection, OptionalExtension, params};
use std::path::Path;
use tracing::{info, warn};

use crate::dump::SourceDump;
use crate::error::{Error, Result};
use crate::identity::NameResolver;
use crate::schema::{Proposal, ProposalState, Vote, VoteSupport};
use crate::source::{ProposalSource, VoteSource};

/// SQLite-backed proposal, vote and alias source.
pub struct ProposalStore {
    conn: Connection,
}

impl ProposalStore {
    pub fn open(db_path: &Path) -> Result<Self> {
        let conn = Connection::open(db_path)?;
        conn.pragma_update(None, "journal_mode", "WAL")?;
        conn.pragma_update(None, "synchronous", "NORMAL")?;
        init(&conn)?;
        info!(path = %db_path.display(), "proposal store opened");
        Ok(Self { conn })
    }

    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        init(&conn)?;
        Ok(Self { conn })
    }

    /// Inserts or refreshes a proposal. A new proposal is placed after
    /// every stored one; an existing one keeps its place.
    pub fn upsert_proposal(&self, proposal: &Proposal) -> Result<()> {
        upsert_proposal_in(&self.conn, proposal)
    }

    /// Replaces the whole vote list of `proposal_id`.
    pub fn replace_votes(&self, proposal_id: &str, votes: &[Vote]) -> Result<()> {
        let tx = self.conn.unchecked_transaction()?;
        replace_votes_in(&tx, proposal_id, votes)?;
        tx.commit()?;
        Ok(())
    }

    pub fn upsert_alias(&self, address: &str, name: &str) -> Result<()> {
        upsert_alias_in(&self.conn, address, name)
    }

    /// Loads a whole dump. Either every row lands or none does.
    pub fn import(&self, dump: &SourceDump) -> Result<()> {
        let tx = self.conn.unchecked_transaction()?;
        for proposal in &dump.proposals {
            upsert_proposal_in(&tx, proposal)?;
        }
        for (proposal_id, votes) in &dump.votes {
            replace_votes_in(&tx, proposal_id, votes)?;
        }
        for (address, name) in &dump.aliases {
            upsert_alias_in(&tx, address, name)?;
        }
        tx.commit()?;
        info!(
            proposals = dump.proposals.len(),
            vote_lists = dump.votes.len(),
            aliases = dump.aliases.len(),
            "imported source dump"
        );
        Ok(())
    }

    fn lookup_alias(&self, address: &str) -> Result<Option<String>> {
        let name = self
            .conn
            .query_row(
                "SELECT name FROM aliases WHERE address = ?1",
                params![address],
                |row| row.get(0),
            )
            .optional()?;
        Ok(name)
    }
}

impl ProposalSource for ProposalStore {
    fn proposals(&self) -> Result<Vec<Proposal>> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT id, proposer, for_votes, against_votes, abstain_votes,
                   vote_start, vote_end, quorum_votes, state, description
            FROM proposals
            ORDER BY seq ASC
            "#,
        )?;
        let rows = stmt.query_map([], |row| {
            Ok(ProposalRow {
                id: row.get(0)?,
                proposer: row.get(1)?,
                for_votes: row.get(2)?,
                against_votes: row.get(3)?,
                abstain_votes: row.get(4)?,
                vote_start: row.get(5)?,
                vote_end: row.get(6)?,
                quorum_votes: row.get(7)?,
                state: row.get(8)?,
                description: row.get(9)?,
            })
        })?;

        let mut proposals = Vec::new();
        for r in rows {
            proposals.push(r?.into_proposal()?);
        }
        Ok(proposals)
    }
}

impl VoteSource for ProposalStore {
    fn votes(&self, proposal_id: &str) -> Result<Vec<Vote>> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT voter, support, weight, reason
            FROM votes
            WHERE proposal_id = ?1
            ORDER BY seq ASC
            "#,
        )?;
        let rows = stmt.query_map(params![proposal_id], |row| {
            Ok(VoteRow {
                voter: row.get(0)?,
                support: row.get(1)?,
                weight: row.get(2)?,
                reason: row.get(3)?,
            })
        })?;

        let mut votes = Vec::new();
        for r in rows {
            let v = r?;
            votes.push(Vote {
                voter: v.voter,
                support: VoteSupport::from_code(v.support),
                weight: from_sql_int("weight", v.weight)?,
                reason: v.reason,
            });
        }
        Ok(votes)
    }
}

impl NameResolver for ProposalStore {
    fn resolve(&self, address: &str) -> Option<String> {
        self.lookup_alias(address).unwrap_or_else(|err| {
            warn!(%address, %err, "alias lookup failed");
            None
        })
    }
}

fn init(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS proposals (
          id TEXT PRIMARY KEY,
          seq INTEGER NOT NULL,
          proposer TEXT NOT NULL,
          for_votes INTEGER NOT NULL DEFAULT 0,
          against_votes INTEGER NOT NULL DEFAULT 0,
          abstain_votes INTEGER NOT NULL DEFAULT 0,
          vote_start INTEGER NOT NULL DEFAULT 0,
          vote_end INTEGER NOT NULL DEFAULT 0,
          quorum_votes INTEGER NOT NULL DEFAULT 0,
          state INTEGER NOT NULL,
          description TEXT NOT NULL DEFAULT '',
          inserted_at TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ','now'))
        );

        CREATE INDEX IF NOT EXISTS idx_proposals_seq ON proposals(seq);

        CREATE TABLE IF NOT EXISTS votes (
          proposal_id TEXT NOT NULL,
          seq INTEGER NOT NULL,
          voter TEXT NOT NULL,
          support INTEGER NOT NULL,
          weight INTEGER NOT NULL DEFAULT 0,
          reason TEXT,
          PRIMARY KEY (proposal_id, seq)
        );

        CREATE TABLE IF NOT EXISTS aliases (
          address TEXT PRIMARY KEY,
          name TEXT NOT NULL
        );
        "#,
    )?;
    Ok(())
}

fn upsert_proposal_in(conn: &Connection, proposal: &Proposal) -> Result<()> {
    conn.execute(
        r#"
        INSERT INTO proposals (
          id, seq, proposer, for_votes, against_votes, abstain_votes,
          vote_start, vote_end, quorum_votes, state, description
        )
        VALUES (?1, (SELECT COALESCE(MAX(seq), 0) + 1 FROM proposals), ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
        ON CONFLICT(id) DO UPDATE SET
          proposer=excluded.proposer,
          for_votes=excluded.for_votes,
          against_votes=excluded.against_votes,
          abstain_votes=excluded.abstain_votes,
          vote_start=excluded.vote_start,
          vote_end=excluded.vote_end,
          quorum_votes=excluded.quorum_votes,
          state=excluded.state,
          description=excluded.description
        "#,
        params![
            proposal.proposal_id,
            proposal.proposer,
            to_sql_int("for_votes", proposal.for_votes)?,
            to_sql_int("against_votes", proposal.against_votes)?,
            to_sql_int("abstain_votes", proposal.abstain_votes)?,
            to_sql_int("vote_start", proposal.vote_start)?,
            to_sql_int("vote_end", proposal.vote_end)?,
            to_sql_int("quorum_votes", proposal.quorum_votes)?,
            proposal.state.code(),
            proposal.description,
        ],
    )?;
    Ok(())
}

fn replace_votes_in(conn: &Connection, proposal_id: &str, votes: &[Vote]) -> Result<()> {
    conn.execute("DELETE FROM votes WHERE proposal_id = ?1", params![proposal_id])?;
    let mut stmt = conn.prepare(
        r#"
        INSERT INTO votes (proposal_id, seq, voter, support, weight, reason)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6)
        "#,
    )?;
    for (seq, vote) in votes.iter().enumerate() {
        stmt.execute(params![
            proposal_id,
            seq as i64,
            vote.voter,
            vote.support.code(),
            to_sql_int("weight", vote.weight)?,
            vote.reason,
        ])?;
    }
    Ok(())
}

fn upsert_alias_in(conn: &Connection, address: &str, name: &str) -> Result<()> {
    conn.execute(
        r#"
        INSERT INTO aliases (address, name) VALUES (?1, ?2)
        ON CONFLICT(address) DO UPDATE SET name=excluded.name
        "#,
        params![address, name],
    )?;
    Ok(())
}

#[derive(Debug)]
struct ProposalRow {
    id: String,
    proposer: String,
    for_votes: i64,
    against_votes: i64,
    abstain_votes: i64,
    vote_start: i64,
    vote_end: i64,
    quorum_votes: i64,
    state: i64,
    description: String,
}

impl ProposalRow {
    fn into_proposal(self) -> Result<Proposal> {
        Ok(Proposal {
            proposal_id: self.id,
            proposer: self.proposer,
            for_votes: from_sql_int("for_votes", self.for_votes)?,
            against_votes: from_sql_int("against_votes", self.against_votes)?,
            abstain_votes: from_sql_int("abstain_votes", self.abstain_votes)?,
            vote_start: from_sql_int("vote_start", self.vote_start)?,
            vote_end: from_sql_int("vote_end", self.vote_end)?,
            quorum_votes: from_sql_int("quorum_votes", self.quorum_votes)?,
            state: ProposalState::from_code(self.state),
            description: self.description,
        })
    }
}

#[derive(Debug)]
struct VoteRow {
    voter: String,
    support: i64,
    weight: i64,
    reason: Option<String>,
}

fn to_sql_int(field: &'static str, value: u64) -> Result<i64> {
    i64::try_from(value).map_err(|_| Error::Overflow { field, value })
}

fn from_sql_int(field: &'static str, value: i64) -> Result<u64> {
    u64::try_from(value).map_err(|_| Error::Negative { field, value })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn proposal(id: &str, for_votes: u64) -> Proposal {
        Proposal {
            proposal_id: id.to_string(),
            proposer: "0xproposer".to_string(),
            for_votes,
            against_votes: 2,
            abstain_votes: 1,
            vote_start: 1_700_000_000,
            vote_end: 1_700_600_000,
            quorum_votes: 5,
            state: ProposalState::Unknown(12),
            description: "# Title\nBody".to_string(),
        }
    }

    fn vote(voter: &str, code: i64, reason: Option<&str>) -> Vote {
        Vote {
            voter: voter.to_string(),
            support: VoteSupport::from_code(code),
            weight: 3,
            reason: reason.map(str::to_string),
        }
    }

    #[test]
    fn proposals_keep_source_order_across_upserts() {
        let store = ProposalStore::open_in_memory().unwrap();
        store.upsert_proposal(&proposal("3", 1)).unwrap();
        store.upsert_proposal(&proposal("2", 1)).unwrap();
        store.upsert_proposal(&proposal("1", 1)).unwrap();
        store.upsert_proposal(&proposal("3", 9)).unwrap();

        let proposals = store.proposals().unwrap();
        let ids: Vec<_> = proposals.iter().map(|p| p.proposal_id.as_str()).collect();
        assert_eq!(ids, vec!["3", "2", "1"]);
        assert_eq!(proposals[0].for_votes, 9);
        assert_eq!(proposals[0].state, ProposalState::Unknown(12));
        assert_eq!(proposals[0], proposal("3", 9));
    }

    #[test]
    fn replace_votes_overwrites_previous_list() {
        let store = ProposalStore::open_in_memory().unwrap();
        store
            .replace_votes("1", &[vote("0xa", 1, Some("why not")), vote("0xb", 0, None)])
            .unwrap();
        store.replace_votes("1", &[vote("0xc", 2, None)]).unwrap();

        let votes = store.votes("1").unwrap();
        assert_eq!(votes, vec![vote("0xc", 2, None)]);
        assert!(store.votes("missing").unwrap().is_empty());
    }

    #[test]
    fn oversized_values_are_rejected() {
        let store = ProposalStore::open_in_memory().unwrap();
        let mut big = proposal("1", 0);
        big.for_votes = u64::MAX;
        let err = store.upsert_proposal(&big).unwrap_err();
        assert!(matches!(err, Error::Overflow { field: "for_votes", .. }));
    }

    #[test]
    fn import_and_resolve_aliases_from_file_store() {
        let dir = tempfile::tempdir().unwrap();
        let store = ProposalStore::open(&dir.path().join("govview.db")).unwrap();

        let mut votes = BTreeMap::new();
        votes.insert("1".to_string(), vec![vote("0xa", 1, None)]);
        let mut aliases = BTreeMap::new();
        aliases.insert("0xproposer".to_string(), "alice.eth".to_string());
        store
            .import(&SourceDump {
                proposals: vec![proposal("1", 4)],
                votes,
                aliases,
            })
            .unwrap();

        assert_eq!(store.proposals().unwrap().len(), 1);
        assert_eq!(store.votes("1").unwrap().len(), 1);
        assert_eq!(store.resolve("0xproposer").as_deref(), Some("alice.eth"));
        assert_eq!(store.resolve("0xnobody"), None);
    }

    #[test]
    fn failed_import_leaves_store_untouched() {
        let store = ProposalStore::open_in_memory().unwrap();
        store.upsert_alias("0xproposer", "bob.eth").unwrap();

        let mut bad = proposal("1", 0);
        bad.for_votes = u64::MAX;
        let mut votes = BTreeMap::new();
        votes.insert("2".to_string(), vec![vote("0xa", 1, None)]);
        let mut aliases = BTreeMap::new();
        aliases.insert("0xproposer".to_string(), "alice.eth".to_string());

        let err = store
            .import(&SourceDump {
                proposals: vec![proposal("2", 4), bad],
                votes,
                aliases,
            })
            .unwrap_err();
        assert!(matches!(err, Error::Overflow { field: "for_votes", .. }));

        assert!(store.proposals().unwrap().is_empty());
        assert!(store.votes("2").unwrap().is_empty());
        assert_eq!(store.resolve("0xproposer").as_deref(), Some("bob.eth"));

        store
            .import(&SourceDump {
                proposals: vec![proposal("2", 4)],
                votes: BTreeMap::new(),
                aliases: BTreeMap::new(),
            })
            .unwrap();
        assert_eq!(store.proposals().unwrap().len(), 1);
    }
}

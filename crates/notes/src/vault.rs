use anyhow::Result;
use governance_core::config::DisplayConfig;
use governance_core::db::ProposalStore;
use governance_core::render::{HtmlSanitizer, RichTextRenderer, SanitizedDescription};
use governance_core::source::{ProposalSource, VoteSource};
use governance_core::tally::tally_votes;
use governance_core::view::{ProposalView, ViewInput, VoterCard};
use std::fs;
use std::path::{Path, PathBuf};
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;
use tracing::{debug, info};

pub struct VaultPaths {
    pub root: PathBuf,
    pub index_dir: PathBuf,
    pub proposals_dir: PathBuf,
}

impl VaultPaths {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        Self {
            index_dir: root.join("00_Index"),
            proposals_dir: root.join("Proposals"),
            root,
        }
    }

    pub fn ensure(&self) -> Result<()> {
        fs::create_dir_all(&self.index_dir)?;
        fs::create_dir_all(&self.proposals_dir)?;
        Ok(())
    }
}

/// Renders the sanitized description as the note's Description section.
pub struct MarkdownDescription;

impl RichTextRenderer for MarkdownDescription {
    type Output = String;

    fn render(&self, description: &SanitizedDescription) -> String {
        let mut md = String::from("## Description\n\n");
        if description.body().trim().is_empty() {
            md.push_str("_No description provided._\n");
        } else {
            md.push_str(description.body());
            md.push('\n');
        }
        md
    }
}

pub fn build_vault(
    store: &ProposalStore,
    vault_root: &Path,
    config: &DisplayConfig,
    sanitizer: &dyn HtmlSanitizer,
) -> Result<()> {
    let paths = VaultPaths::new(vault_root);
    paths.ensure()?;

    let proposals = store.proposals()?;

    let mut index_lines: Vec<String> = Vec::new();
    index_lines.push("---".to_string());
    index_lines.push(format!(
        "generated_at: {}",
        OffsetDateTime::now_utc().format(&Rfc3339)?
    ));
    index_lines.push("---".to_string());
    index_lines.push(String::new());
    index_lines.push("# MOC - Proposals".to_string());
    index_lines.push(String::new());
    index_lines.push("This index is generated. Do not edit manually.".to_string());
    index_lines.push(String::new());

    if proposals.is_empty() {
        index_lines.push("_No proposals found._".to_string());
    }

    for proposal in &proposals {
        let votes = store.votes(&proposal.proposal_id)?;
        let tally = tally_votes(&votes);
        let view = ProposalView::build(
            ViewInput {
                proposals: &proposals,
                proposal,
                tally: Some(&tally),
                balance: None,
            },
            store,
            config,
        );
        let stem = write_proposal_note(&paths, &view, sanitizer)?;
        index_lines.push(format!(
            "- [[Proposals/{stem}|Proposal {}: {}]] ({})",
            view.metrics.ordinal, view.title, view.state
        ));
    }

    let moc_path = paths.index_dir.join("MOC - Proposals.md");
    fs::write(moc_path, index_lines.join("\n"))?;

    info!(
        proposals = proposals.len(),
        root = %paths.root.display(),
        "vault written"
    );
    Ok(())
}

/// Writes one proposal note and returns its file stem.
pub fn write_proposal_note(
    paths: &VaultPaths,
    view: &ProposalView,
    sanitizer: &dyn HtmlSanitizer,
) -> Result<String> {
    let stem = note_stem(&view.proposal_id);
    let note_path = paths.proposals_dir.join(format!("{stem}.md"));
    let metrics = &view.metrics;

    let mut md = String::new();
    md.push_str("---\n");
    md.push_str(&format!("id: {}\n", serde_json::to_string(&view.proposal_id)?));
    md.push_str(&format!("ordinal: {}\n", metrics.ordinal));
    md.push_str(&format!("state: {}\n", view.state));
    md.push_str(&format!("quorum: {}\n", metrics.quorum));
    md.push_str(&format!(
        "snapshot: {}\n",
        serde_json::to_string(&format!("{} {}", metrics.snapshot.date, metrics.snapshot.time))?
    ));
    md.push_str(&format!(
        "ends: {}\n",
        serde_json::to_string(&format!("{} {}", metrics.ends.date, metrics.ends.time))?
    ));
    md.push_str("---\n\n");

    let description = view.sanitized_description(sanitizer);

    md.push_str(&format!("# Proposal {}: {}\n\n", metrics.ordinal, description.title()));
    md.push_str(&format!(
        "Proposed by **{}** (`{}`)\n\n",
        view.proposer, view.proposer_address
    ));

    md.push_str("## Results\n\n");
    md.push_str("| Option | Votes | Share |\n");
    md.push_str("| --- | ---: | ---: |\n");
    md.push_str(&format!(
        "| For | {} | {}% |\n",
        view.totals.for_votes, metrics.percentages.for_pct
    ));
    md.push_str(&format!(
        "| Against | {} | {}% |\n",
        view.totals.against_votes, metrics.percentages.against_pct
    ));
    md.push_str(&format!(
        "| Abstain | {} | {}% |\n\n",
        view.totals.abstain_votes, metrics.percentages.abstain_pct
    ));

    md.push_str(&format!("- Threshold: {} Quorum\n", metrics.quorum));
    md.push_str(&format!(
        "- Ends: {} at {}\n",
        metrics.ends.date, metrics.ends.time
    ));
    md.push_str(&format!(
        "- Snapshot: {} at {}\n\n",
        metrics.snapshot.date, metrics.snapshot.time
    ));

    md.push_str("## Voters\n\n");
    match &view.voters {
        Some(voters) => {
            push_voter_section(&mut md, "For", &voters.voted_for);
            push_voter_section(&mut md, "Against", &voters.voted_against);
            push_voter_section(&mut md, "Abstain", &voters.abstained);
        }
        None => md.push_str("_Votes not loaded._\n\n"),
    }

    md.push_str(&MarkdownDescription.render(&description));

    fs::write(&note_path, md)?;
    debug!(path = %note_path.display(), "proposal note written");
    Ok(stem)
}

fn push_voter_section(md: &mut String, heading: &str, cards: &[VoterCard]) {
    md.push_str(&format!("### {heading} ({})\n\n", cards.len()));
    if cards.is_empty() {
        md.push_str("_No votes._\n\n");
        return;
    }
    for card in cards {
        md.push_str(&format!(
            "- **{}** (`{}`): {} votes {}\n",
            card.name,
            card.voter,
            card.weight,
            card.direction.to_uppercase()
        ));
        if let Some(reason) = &card.reason {
            for line in reason.lines() {
                md.push_str("  > ");
                md.push_str(line);
                md.push('\n');
            }
        }
    }
    md.push('\n');
}

fn note_stem(proposal_id: &str) -> String {
    let stem: String = proposal_id
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
        .collect();
    if stem.is_empty() { "_".to_string() } else { stem }
}

#[cfg(test)]
mod tests {
    use super::*;
    use governance_core::render::{AllowListSanitizer, EscapingSanitizer};
    use governance_core::schema::{Proposal, ProposalState, Vote, VoteSupport};

    fn proposal(id: &str, description: &str) -> Proposal {
        Proposal {
            proposal_id: id.to_string(),
            proposer: "0x1111111111111111111111111111111111111111".to_string(),
            for_votes: 10,
            against_votes: 5,
            abstain_votes: 2,
            vote_start: 0,
            vote_end: 0,
            quorum_votes: 0,
            state: ProposalState::Active,
            description: description.to_string(),
        }
    }

    #[test]
    fn builds_notes_and_index() {
        let dir = tempfile::tempdir().unwrap();
        let store = ProposalStore::open(&dir.path().join("govview.db")).unwrap();
        store
            .upsert_proposal(&proposal("2", "# Second\n<script>alert(1)</script>"))
            .unwrap();
        store.upsert_proposal(&proposal("1", "# First\nplain body")).unwrap();
        store
            .replace_votes(
                "2",
                &[Vote {
                    voter: "0x2222222222222222222222222222222222222222".to_string(),
                    support: VoteSupport::For,
                    weight: 10,
                    reason: Some("good\nidea".to_string()),
                }],
            )
            .unwrap();
        store
            .upsert_alias("0x1111111111111111111111111111111111111111", "alice.eth")
            .unwrap();

        let vault = dir.path().join("vault");
        build_vault(&store, &vault, &DisplayConfig::default(), &EscapingSanitizer).unwrap();

        let index = fs::read_to_string(vault.join("00_Index").join("MOC - Proposals.md")).unwrap();
        assert!(index.contains("- [[Proposals/2|Proposal 2: Second]] (active)"));
        assert!(index.contains("- [[Proposals/1|Proposal 1: First]] (active)"));

        let note = fs::read_to_string(vault.join("Proposals").join("2.md")).unwrap();
        assert!(note.contains("# Proposal 2: Second"));
        assert!(note.contains("Proposed by **alice.eth**"));
        assert!(note.contains("| For | 10 | 59% |"));
        assert!(note.contains("- Threshold: 1 Quorum"));
        assert!(note.contains("votes FOR"));
        assert!(note.contains("  > good\n  > idea\n"));
        assert!(note.contains("### Against (0)"));
        assert!(note.contains("&lt;script&gt;"));
        assert!(!note.contains("<script>"));
    }

    #[test]
    fn allow_list_keeps_safe_markup_in_notes() {
        let dir = tempfile::tempdir().unwrap();
        let store = ProposalStore::open_in_memory().unwrap();
        store
            .upsert_proposal(&proposal(
                "7",
                r#"Artwork refresh&&<p><img src="https://example.org/art.png" onload="x()"></p><script>x()</script>"#,
            ))
            .unwrap();

        let vault = dir.path().join("vault");
        build_vault(&store, &vault, &DisplayConfig::default(), &AllowListSanitizer::new()).unwrap();

        let note = fs::read_to_string(vault.join("Proposals").join("7.md")).unwrap();
        assert!(note.contains("# Proposal 1: Artwork refresh"));
        assert!(note.contains(r#"<img src="https://example.org/art.png">"#));
        assert!(!note.contains("onload"));
        assert!(!note.contains("<script>"));
    }

    #[test]
    fn note_stem_replaces_path_characters() {
        assert_eq!(note_stem("12/../x"), "12____x");
        assert_eq!(note_stem(""), "_");
    }
}

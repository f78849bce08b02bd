use anyhow::Result;
use clap::{Parser, Subcommand};
use governance_core::config::DisplayConfig;
use governance_core::db::ProposalStore;
use governance_core::dump::SourceDump;
use governance_core::page::{PageView, ProposalPage, SourceUpdate};
use governance_core::render::{AllowListSanitizer, HtmlSanitizer};
use governance_core::schema::{Proposal, Vote};
use governance_core::source::{ProposalSource, VoteSource};
use governance_core::view::{ProposalView, VoterCard};
use schemars::schema_for;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

#[derive(Parser)]
#[command(name = "govview")]
#[command(about = "Governance proposal vote viewer", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Export JSON Schemas for the proposal data model and page view
    Schema {
        #[command(subcommand)]
        command: SchemaCommands,
    },
    /// Load a JSON or YAML source dump into the proposal store
    Import {
        #[arg(long)]
        db: PathBuf,
        #[arg(long)]
        file: PathBuf,
    },
    /// Show the vote state of one proposal
    Show {
        #[arg(long)]
        db: PathBuf,
        #[arg(long)]
        proposal_id: String,
        /// Viewer's token balance; omit when no wallet is connected
        #[arg(long)]
        balance: Option<f64>,
        #[arg(long)]
        config: Option<PathBuf>,
        /// Print the view as JSON instead of text
        #[arg(long)]
        json: bool,
    },
    /// Generate the proposal notes vault
    Vault {
        #[command(subcommand)]
        command: VaultCommands,
    },
}

#[derive(Subcommand)]
enum SchemaCommands {
    /// Export JSON Schema files for canonical types
    Export {
        /// Output directory (default: ./schemas)
        #[arg(long, default_value = "schemas")]
        out_dir: PathBuf,
    },
}

#[derive(Subcommand)]
enum VaultCommands {
    /// Write one note per proposal plus an index
    Build {
        #[arg(long)]
        db: PathBuf,
        #[arg(long)]
        out: PathBuf,
        #[arg(long)]
        config: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "govview=info,governance_core=info,proposal_notes=info".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Schema { command } => match command {
            SchemaCommands::Export { out_dir } => schema_export(out_dir),
        },
        Commands::Import { db, file } => import(&db, &file),
        Commands::Show {
            db,
            proposal_id,
            balance,
            config,
            json,
        } => show(&db, proposal_id, balance, config.as_deref(), json),
        Commands::Vault { command } => match command {
            VaultCommands::Build { db, out, config } => vault_build(&db, &out, config.as_deref()),
        },
    }
}

fn schema_export(out_dir: PathBuf) -> Result<()> {
    fs::create_dir_all(&out_dir)?;

    let proposal_schema = schema_for!(Proposal);
    fs::write(
        out_dir.join("Proposal.schema.json"),
        serde_json::to_string_pretty(&proposal_schema)?,
    )?;

    let vote_schema = schema_for!(Vote);
    fs::write(
        out_dir.join("Vote.schema.json"),
        serde_json::to_string_pretty(&vote_schema)?,
    )?;

    let view_schema = schema_for!(ProposalView);
    fs::write(
        out_dir.join("ProposalView.schema.json"),
        serde_json::to_string_pretty(&view_schema)?,
    )?;

    let config_schema = schema_for!(DisplayConfig);
    fs::write(
        out_dir.join("DisplayConfig.schema.json"),
        serde_json::to_string_pretty(&config_schema)?,
    )?;

    println!("Exported schemas to {}", out_dir.display());
    Ok(())
}

fn import(db: &Path, file: &Path) -> Result<()> {
    let dump = SourceDump::load(file)?;
    let store = ProposalStore::open(db)?;
    store.import(&dump)?;
    println!(
        "Imported {} proposals and {} vote lists into {}",
        dump.proposals.len(),
        dump.votes.len(),
        db.display()
    );
    Ok(())
}

fn show(
    db: &Path,
    proposal_id: String,
    balance: Option<f64>,
    config: Option<&Path>,
    json: bool,
) -> Result<()> {
    let config = DisplayConfig::load_or_default(config)?;
    let store = ProposalStore::open(db)?;

    let mut page = ProposalPage::new(proposal_id);
    page.apply(SourceUpdate::Proposals(store.proposals()?));
    page.apply(SourceUpdate::Balance(balance));
    if page.proposal().is_some() {
        let votes = store.votes(page.proposal_id())?;
        page.apply(SourceUpdate::Votes {
            proposal_id: page.proposal_id().to_string(),
            votes,
        });
    } else {
        info!(proposal_id = page.proposal_id(), "proposal not in store");
    }

    let view = page.view(&store, &config);
    if json {
        println!("{}", serde_json::to_string_pretty(&view)?);
        return Ok(());
    }
    match view {
        PageView::Loading => println!("Proposal {} is not available yet.", page.proposal_id()),
        PageView::Ready(view) => {
            print!("{}", render_text(&view, &AllowListSanitizer::new()))
        }
    }
    Ok(())
}

fn render_text(view: &ProposalView, sanitizer: &dyn HtmlSanitizer) -> String {
    let metrics = &view.metrics;
    let description = view.sanitized_description(sanitizer);
    let mut out = String::new();
    out.push_str(&format!(
        "Proposal {} [{}]\n{}\nProposed by {}\n\n",
        metrics.ordinal,
        view.state,
        description.title(),
        view.proposer
    ));
    out.push_str(&format!(
        "For      {:>12}  {:>3}%\n",
        view.totals.for_votes, metrics.percentages.for_pct
    ));
    out.push_str(&format!(
        "Against  {:>12}  {:>3}%\n",
        view.totals.against_votes, metrics.percentages.against_pct
    ));
    out.push_str(&format!(
        "Abstain  {:>12}  {:>3}%\n\n",
        view.totals.abstain_votes, metrics.percentages.abstain_pct
    ));
    out.push_str(&format!("Threshold: {} Quorum\n", metrics.quorum));
    out.push_str(&format!("Ends:      {} {}\n", metrics.ends.time, metrics.ends.date));
    out.push_str(&format!(
        "Snapshot:  {} {}\n\n",
        metrics.snapshot.time, metrics.snapshot.date
    ));

    if let Some(voters) = &view.voters {
        for (heading, cards) in [
            ("For", &voters.voted_for),
            ("Against", &voters.voted_against),
            ("Abstain", &voters.abstained),
        ] {
            out.push_str(&format!("{heading} ({})\n", cards.len()));
            for card in cards.iter() {
                out.push_str(&voter_line(card));
            }
            out.push('\n');
        }
    }

    if view.can_vote {
        out.push_str("You can submit a vote on this proposal.\n\n");
    }

    out.push_str("Description\n");
    out.push_str(description.body());
    out.push('\n');
    out
}

fn voter_line(card: &VoterCard) -> String {
    let mut line = format!(
        "  {} - {} votes {}\n",
        card.name,
        card.weight,
        card.direction.to_uppercase()
    );
    if let Some(reason) = &card.reason {
        line.push_str(&format!("    reason: {reason}\n"));
    }
    line
}

fn vault_build(db: &Path, out: &Path, config: Option<&Path>) -> Result<()> {
    let config = DisplayConfig::load_or_default(config)?;
    let store = ProposalStore::open(db)?;
    proposal_notes::vault::build_vault(&store, out, &config, &AllowListSanitizer::new())?;
    println!("Wrote vault to {}", out.display());
    Ok(())
}

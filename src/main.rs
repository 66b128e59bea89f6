use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use cognate_sets::config::Settings;
use cognate_sets::pipeline::{self, cluster, report};
use cognate_sets::taxonomy::{LazyGazetteer, ReferenceCache};
use cognate_sets::tools::{cognates, taxa};
use std::io::{self, Write};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "cognate-sets", about = "Geographic dispersion of cognate sets", version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Summarize reflex dispersion per proto-form and cluster the results
    Setdist {
        /// Reflex table (TSV)
        input: PathBuf,
        /// Summary output; prints to stdout when omitted
        #[arg(requires = "matrix")]
        summary: Option<PathBuf>,
        /// Microgroup presence matrix output
        matrix: Option<PathBuf>,
        /// Cluster labels output
        clusters: Option<PathBuf>,
    },
    /// Print the cognate sets attested in the Formosan languages
    FilterSets {
        /// ABVD cognate export (TSV)
        input: PathBuf,
    },
    /// Print Nexus taxset blocks for the named clades
    Taxa {
        /// Language list (TSV with slug and classification columns)
        language_file: PathBuf,
        /// Clade names, comma-separated
        names: String,
    },
}

fn main() -> Result<()> {
    dotenv::dotenv().ok();

    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("cognate_sets=info")),
        )
        .init();

    let cli = Cli::parse();
    match cli.command {
        Command::Setdist {
            input,
            summary,
            matrix,
            clusters,
        } => setdist(input, summary, matrix, clusters),
        Command::FilterSets { input } => filter_sets(input),
        Command::Taxa { language_file, names } => taxon_blocks(language_file, &names),
    }
}

fn setdist(
    input: PathBuf,
    summary: Option<PathBuf>,
    matrix: Option<PathBuf>,
    clusters: Option<PathBuf>,
) -> Result<()> {
    let settings = Settings::from_env().context("Failed to read settings")?;
    let config = settings.setdist_config().context("Failed to load microgroups")?;

    // Read on the first cache miss only
    let gazetteer = LazyGazetteer::new(settings.gazetteer.clone());

    let output = ReferenceCache::scoped(settings.cache_path(), &gazetteer, |cache| {
        pipeline::run_setdist(&input, cache, &config)
    })
    .with_context(|| format!("Failed to process {}", input.display()))?;

    info!(
        "{} of {} reflexes located, {} cognate sets summarized",
        output.reflexes_located,
        output.reflexes_read,
        output.summaries.len()
    );

    let (summary, matrix) = match (summary, matrix) {
        (Some(summary), Some(matrix)) => (summary, matrix),
        _ => {
            report::write_summary(io::stdout().lock(), &output.summaries)?;
            return Ok(());
        }
    };

    report::save(&summary, |f| report::write_summary(f, &output.summaries))
        .with_context(|| format!("Failed to write {}", summary.display()))?;
    report::save(&matrix, |f| {
        report::write_matrix(f, &output.matrix, &config.microgroups)
    })
    .with_context(|| format!("Failed to write {}", matrix.display()))?;
    info!("Wrote {} and {}", summary.display(), matrix.display());

    info!("Phase 6: Clustering cognate sets...");
    let result = cluster::cluster_matrix(&output.matrix, &config.cluster)?;
    for (label, members) in result.members() {
        info!("cluster {} ({} sets): {}", label, members.len(), members.join(" "));
    }

    if let Some(path) = clusters {
        report::save(&path, |f| report::write_clusters(f, &result.assignments))
            .with_context(|| format!("Failed to write {}", path.display()))?;
    }

    Ok(())
}

fn filter_sets(input: PathBuf) -> Result<()> {
    let rows = cognates::load(&input)
        .with_context(|| format!("Failed to read cognates from {}", input.display()))?;
    let by_language = cognates::cognates_for_language(&rows);
    let sets = cognates::subgroup_sets(&by_language, cognates::FORMOSAN);
    info!(
        "{} of {} cognate sets attested in the subgroup",
        sets.len(),
        cognates::all_sets(&rows).len()
    );

    let mut out = io::stdout().lock();
    for set in sets {
        writeln!(out, "{}", set)?;
    }
    Ok(())
}

fn taxon_blocks(language_file: PathBuf, names: &str) -> Result<()> {
    let rows = taxa::load(&language_file)
        .with_context(|| format!("Failed to read languages from {}", language_file.display()))?;

    let mut out = io::stdout().lock();
    for name in names.split(',').map(str::trim).filter(|n| !n.is_empty()) {
        let slugs = taxa::find_taxa(&rows, name);
        writeln!(out, "{}", taxa::nexus_block(name, &slugs))?;
    }
    Ok(())
}

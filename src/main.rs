use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use workshop_explorer::catalog::{build_directory, filter_directory, search, CatalogStore};
use workshop_explorer::llm::summaries::summarize_catalog;
use workshop_explorer::presenters::{
    by_affiliation, export_csv, extract_catalog, scholar, search_appearances, AnalysisReport,
    ScholarCorrections,
};
use workshop_explorer::Catalog;
use workshop_explorer::transcripts::{backfill, TranscriptFile};
use workshop_explorer::{create_llm, Config};

#[derive(Parser)]
#[command(name = "workshop-explorer")]
#[command(version, author = "TigreRoll")]
#[command(about = "Presenter extraction, search and transcript chat for workshop videos")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Catalog JSON file (overrides the configured path)
    #[arg(long, global = true)]
    catalog: Option<PathBuf>,

    /// Configuration file (defaults to workshop-explorer.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Re-run presenter extraction over every description
    Extract {
        /// Write the result here instead of overwriting the catalog
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Search titles, presenters and transcripts
    Search {
        query: String,
    },
    /// List presenters with their videos
    Presenters {
        /// Filter by name or affiliation
        #[arg(long)]
        query: Option<String>,

        /// Group presenter appearances by affiliation
        #[arg(long)]
        by_affiliation: bool,

        /// Export the matching appearances as CSV
        #[arg(long)]
        csv: Option<PathBuf>,
    },
    /// Show catalog and presenter statistics
    Stats {
        /// Export the full report as JSON
        #[arg(long)]
        json: Option<PathBuf>,
    },
    /// Merge newly available transcripts into the catalog
    Backfill {
        /// JSON array of {id, transcript}
        #[arg(long)]
        from: PathBuf,
    },
    /// Apply manual scholar profile corrections
    FixScholar {
        /// TOML or JSON map of presenter name to URL
        #[arg(long)]
        corrections: PathBuf,
    },
    /// Generate AI summaries for transcribed videos
    Summarize {
        /// Replace summaries that already exist
        #[arg(long)]
        overwrite: bool,
    },
    /// Serve the JSON API and the web UI
    Serve {
        #[arg(long)]
        port: Option<u16>,
    },
    /// Print the effective configuration
    Config {
        /// Save it as TOML
        #[arg(long)]
        write: Option<PathBuf>,
    },
}

fn init_tracing(verbose: bool, log_level: &str) {
    let default_filter = if verbose {
        "workshop_explorer=debug,info".to_string()
    } else {
        format!("workshop_explorer={},warn", log_level)
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };
    if let Some(catalog) = &cli.catalog {
        config.catalog.path = catalog.clone();
    }

    init_tracing(cli.verbose, &config.output.log_level);
    config.validate()?;

    let store = CatalogStore::new(&config.catalog.path);

    match cli.command {
        Commands::Extract { output } => {
            let mut catalog = store.load().await?;
            let summary = extract_catalog(&mut catalog);

            for id in &summary.without_presenters {
                warn!("⚠️ No presenters found for {}", id);
            }

            match output {
                Some(path) => store.save_to(&catalog, &path).await?,
                None => store.save(&catalog).await?,
            }
            info!(
                "🎉 {} presenters across {} videos",
                summary.total_presenters, summary.with_presenters
            );
        }

        Commands::Search { query } => {
            let catalog = store.load().await?;
            let results = search(catalog.videos(), &query);

            println!("Found {} video(s)", results.len());
            for video in results {
                println!("- {} [{}]", video.title, video.id);
                if !video.presenters.is_empty() {
                    println!("  {}", video.presenter_line());
                }
                println!("  {}", video.url);
            }
        }

        Commands::Presenters {
            query,
            by_affiliation: grouped,
            csv,
        } => {
            let catalog = store.load().await?;
            let query = query.as_deref().unwrap_or("");

            if let Some(path) = csv {
                export_csv(&search_appearances(&catalog, query), &path).await?;
            }

            if grouped {
                print_affiliation_groups(&catalog, query);
                return Ok(());
            }

            let directory = filter_directory(build_directory(catalog.videos()), query);

            println!("{} presenter(s)", directory.len());
            for entry in directory {
                println!("- {}, {}", entry.name, entry.affiliation);
                if let Some(url) = &entry.scholar_url {
                    println!("  Scholar: {}", url);
                }
                for video in &entry.videos {
                    println!("  • {}", video.title);
                }
            }
        }

        Commands::Stats { json } => {
            let catalog = store.load().await?;
            let report = AnalysisReport::build(&catalog);
            print_report(&report);

            if let Some(path) = json {
                report.export_json(&path).await?;
            }
        }

        Commands::Backfill { from } => {
            let mut catalog = store.load().await?;
            let updates = TranscriptFile::load(&from).await?;
            let report = backfill(&mut catalog, &updates);

            for id in &report.newly_available {
                info!("✅ Transcript added: {}", id);
            }
            for id in &report.unknown_ids {
                warn!("⚠️ Unknown video id in {}: {}", from.display(), id);
            }

            if report.changed() {
                store.save(&catalog).await?;
            } else {
                info!("📭 No new transcripts; catalog unchanged");
            }
        }

        Commands::FixScholar { corrections } => {
            let mut catalog = store.load().await?;
            let corrections = ScholarCorrections::load(&corrections).await?;
            let report = scholar::apply(&mut catalog, &corrections);

            if report.total() > 0 {
                store.save(&catalog).await?;
            }
            info!(
                "🎓 URLs updated: {}, removed: {}, total changes: {}",
                report.updated,
                report.removed,
                report.total()
            );
        }

        Commands::Summarize { overwrite } => {
            config.validate_llm()?;
            let llm = create_llm(&config.llm).context("Failed to create LLM provider")?;
            if !llm.is_available().await {
                warn!("⚠️ {:?} provider did not respond to a health check", llm.provider_type());
            }

            let mut catalog = store.load().await?;
            let report =
                summarize_catalog(llm.as_ref(), &mut catalog, &config.summaries, overwrite).await;

            if report.generated > 0 {
                store.save(&catalog).await?;
            }
        }

        Commands::Serve { port } => serve(store, config, port).await?,

        Commands::Config { write } => {
            println!("{}", config.summary());
            if let Some(path) = write {
                config.save(&path)?;
            }
        }
    }

    Ok(())
}

#[cfg(feature = "api")]
async fn serve(store: CatalogStore, mut config: Config, port: Option<u16>) -> Result<()> {
    if let Some(port) = port {
        config.server.port = port;
    }

    let catalog = store.load().await?;
    workshop_explorer::api::ApiServer::new(catalog, config).run().await
}

#[cfg(not(feature = "api"))]
async fn serve(_store: CatalogStore, _config: Config, _port: Option<u16>) -> Result<()> {
    Err(anyhow::anyhow!("Built without the `api` feature; rebuild with --features api"))
}

fn print_affiliation_groups(catalog: &Catalog, query: &str) {
    let groups = by_affiliation(search_appearances(catalog, query));

    println!("Unique affiliations: {}", groups.len());
    for (affiliation, appearances) in groups {
        println!("\n{} ({} presenters):", affiliation, appearances.len());
        for appearance in appearances {
            println!("  - {}", appearance.name);
            println!("    Video: {}", appearance.video_title);
        }
    }
}

fn print_report(report: &AnalysisReport) {
    let stats = &report.catalog;

    println!("=== CATALOG ===");
    println!("Total videos: {}", stats.videos);
    println!("With transcripts: {}", stats.with_transcripts);
    println!("With AI summaries: {}", stats.with_summaries);
    println!("Videos with presenters: {}", report.videos_with_presenters);
    println!("Total presenters: {}", stats.total_presenters);
    println!("Average presenters per video: {:.1}", report.average_presenters);
    println!("Unique affiliations: {}", report.affiliations.len());

    println!("\n=== TOP AFFILIATIONS ===");
    for (affiliation, count) in report.top_affiliations(10) {
        println!("{}: {} presenter(s)", affiliation, count);
    }

    if !report.repeat_presenters.is_empty() {
        println!("\n=== PRESENTERS IN MULTIPLE VIDEOS ===");
        for (name, count) in &report.repeat_presenters {
            println!("{}: {} video(s)", name, count);
        }
    }

    println!("\n=== VIDEOS WITH MOST PRESENTERS ===");
    for video in &report.top_videos {
        println!("{} presenters: {}", video.num_presenters, video.title);
    }
}

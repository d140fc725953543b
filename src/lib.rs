pub mod clients;
pub mod config;
pub mod constants;
pub mod db;
pub mod entities;
pub mod fingerprint;
pub mod models;
pub mod services;

use std::path::Path;
use std::sync::Arc;

use anyhow::Context;
use clients::judge::{JudgeClient, ReviewJudge};
pub use config::Config;
use db::Store;
use models::report::MovieReport;
use models::review::RawReview;
use services::{AnalysisService, IngestService, PipelineService, ScoringService};
use tracing_subscriber::EnvFilter;

pub async fn run() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let config = Config::load()?;
    config.validate()?;

    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.general.log_level));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args: Vec<String> = std::env::args().collect();

    if args.len() < 2 {
        print_help();
        return Ok(());
    }

    match args[1].as_str() {
        "ingest" | "i" => {
            if args.len() < 4 {
                println!("Usage: reelscore ingest <title> <reviews.json> [url]");
                println!("Example: reelscore ingest \"Knives Out\" reviews.json");
                return Ok(());
            }
            let title = &args[2];
            let path = &args[3];
            let url = args.get(4).map(String::as_str);
            cmd_ingest(&config, title, path, url).await
        }

        "analyze" | "a" => {
            if args.len() < 3 {
                println!("Usage: reelscore analyze <title>");
                return Ok(());
            }
            let title = &args[2];
            cmd_analyze(&config, title).await
        }

        "report" | "r" => {
            if args.len() < 3 {
                println!("Usage: reelscore report <title>");
                return Ok(());
            }
            let title = &args[2];
            cmd_report(&config, title).await
        }

        "run" => {
            if args.len() < 4 {
                println!("Usage: reelscore run <title> <reviews.json> [url]");
                return Ok(());
            }
            let title = &args[2];
            let path = &args[3];
            let url = args.get(4).map(String::as_str);
            cmd_run(&config, title, path, url).await
        }

        "list" | "ls" | "l" => cmd_list(&config).await,

        "init" | "--init" => {
            Config::create_default_if_missing()?;
            println!("✓ Config file created. Edit config.toml and run again.");
            Ok(())
        }

        "help" | "-h" | "--help" => {
            print_help();
            Ok(())
        }

        _ => {
            println!("Unknown command: {}", args[1]);
            println!();
            print_help();
            Ok(())
        }
    }
}

fn print_help() {
    println!("Reelscore - Review Sanitizer");
    println!("Weights scraped audience reviews by an AI authenticity judgment");
    println!();
    println!("USAGE:");
    println!("  reelscore <COMMAND> [OPTIONS]");
    println!();
    println!("COMMANDS:");
    println!("  ingest <title> <file> [url]   Store scraped reviews (deduplicated)");
    println!("  analyze <title>               Judge reviews that are still pending");
    println!("  report <title>                Print raw and sanitized scores");
    println!("  run <title> <file> [url]      Ingest, analyze and report in one go");
    println!("  list, ls                      List stored movies");
    println!("  init                          Create default config file");
    println!("  help                          Show this help message");
    println!();
    println!("EXAMPLES:");
    println!("  reelscore ingest \"Knives Out\" reviews.json   # Store a scrape pass");
    println!("  reelscore analyze \"Knives Out\"               # Judge pending reviews");
    println!("  reelscore report \"Knives Out\"                # Show the scores");
    println!("  reelscore run \"Knives Out\" reviews.json      # All of the above");
    println!();
    println!("CONFIG:");
    println!("  Edit config.toml for the judge endpoint, analysis mode, etc.");
    println!("  The judge API key is read from the environment (.env supported).");
}

fn load_reviews_file(path: &str) -> anyhow::Result<Vec<RawReview>> {
    let content = std::fs::read_to_string(Path::new(path))
        .with_context(|| format!("Failed to read reviews file: {path}"))?;

    let reviews: Vec<RawReview> = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse reviews file: {path}"))?;

    Ok(reviews)
}

fn make_judge(config: &Config) -> anyhow::Result<Arc<dyn ReviewJudge>> {
    Ok(Arc::new(JudgeClient::from_config(&config.judge)?))
}

fn resolve_url(config: &Config, title: &str, url: Option<&str>) -> anyhow::Result<String> {
    url.map_or_else(
        || config.scraper.review_page_url(title),
        |u| Ok(u.to_string()),
    )
}

async fn cmd_ingest(
    config: &Config,
    title: &str,
    path: &str,
    url: Option<&str>,
) -> anyhow::Result<()> {
    let reviews = load_reviews_file(path)?;
    let source_url = resolve_url(config, title, url)?;

    println!("Ingesting {} reviews for: {}", reviews.len(), title);

    let store = Store::new(&config.general.database_path).await?;
    let (movie_id, counts) = IngestService::new(store)
        .ingest(title, &source_url, &reviews)
        .await?;

    println!();
    println!("✓ Stored under movie ID {movie_id}");
    println!("  New reviews: {}", counts.inserted);
    println!("  Duplicates skipped: {}", counts.duplicate);
    println!();
    println!("Run 'reelscore analyze \"{title}\"' to judge the new reviews.");

    Ok(())
}

async fn cmd_analyze(config: &Config, title: &str) -> anyhow::Result<()> {
    let store = Store::new(&config.general.database_path).await?;

    let Some(movie) = store.get_movie_by_title(title).await? else {
        println!("Movie '{title}' not found in database.");
        println!("Ingest reviews first: reelscore ingest \"{title}\" <reviews.json>");
        return Ok(());
    };

    let judge = make_judge(config)?;
    let options = config.analysis.options()?;

    let stats = AnalysisService::new(store, judge, options)
        .analyze_movie(movie.id)
        .await?;

    println!();
    if stats.total_pending == 0 {
        println!("Nothing to analyze; every review is already judged.");
    } else {
        println!(
            "✓ Analyzed {} of {} pending reviews.",
            stats.analyzed, stats.total_pending
        );
        println!("Run 'reelscore report \"{title}\"' to see the scores.");
    }

    Ok(())
}

async fn cmd_report(config: &Config, title: &str) -> anyhow::Result<()> {
    let store = Store::new(&config.general.database_path).await?;

    let Some(report) = ScoringService::new(store).report(title).await? else {
        println!("Movie '{title}' not found in database.");
        return Ok(());
    };

    print_report(&report);
    Ok(())
}

async fn cmd_run(
    config: &Config,
    title: &str,
    path: &str,
    url: Option<&str>,
) -> anyhow::Result<()> {
    let reviews = load_reviews_file(path)?;
    let source_url = resolve_url(config, title, url)?;

    let store = Store::new(&config.general.database_path).await?;
    let judge = make_judge(config)?;
    let options = config.analysis.options()?;

    let summary = PipelineService::new(store, judge, options)
        .run(title, &source_url, &reviews)
        .await?;

    println!();
    println!(
        "Ingested: {} new, {} duplicates | Analyzed: {} reviews",
        summary.ingest.inserted, summary.ingest.duplicate, summary.analysis.analyzed
    );

    if let Some(report) = &summary.report {
        print_report(report);
    }

    Ok(())
}

async fn cmd_list(config: &Config) -> anyhow::Result<()> {
    let store = Store::new(&config.general.database_path).await?;
    let movies = store.list_movies().await?;

    if movies.is_empty() {
        println!("No movies stored yet.");
        println!();
        println!("Add one with: reelscore ingest \"<title>\" <reviews.json>");
        return Ok(());
    }

    println!("Stored Movies ({} total)", movies.len());
    println!("{:-<70}", "");

    for movie in movies {
        let review_count = store.review_count_for(movie.id).await.unwrap_or(0);
        println!("• {} [{} reviews]", movie.title, review_count);
        println!("  ID: {} | {}", movie.id, movie.source_url);
    }

    Ok(())
}

fn print_report(report: &MovieReport) {
    println!();
    println!("=== ANALYSIS RESULTS for '{}' ===", report.title);
    println!("Total Reviews Analyzed: {}", report.total_reviews);

    match report.raw_score {
        Some(score) => println!("Raw Audience Score: {score:.2}%"),
        None => println!("Raw Audience Score: n/a (no rated reviews)"),
    }

    if let Some(avg) = report.mean_original_rating {
        println!(
            "Raw Average Star Rating: {:.2}/5 ({:.2}/100)",
            avg,
            avg * 20.0
        );
    }

    println!("Sanitized Score (AI-Weighted): {:.2}/100", report.sanitized_score);

    if let Some(quality) = report.mean_quality_score {
        println!("Average Quality Score: {quality:.2}/1.0");
    }

    if report.total_reviews > 0 {
        let total = report.total_reviews as f64;
        println!(
            "Authentic Reviews: {} ({:.1}%)",
            report.authentic_count,
            report.authentic_count as f64 / total * 100.0
        );
        println!(
            "Potential Review Bombs/Spam: {} ({:.1}%)",
            report.inauthentic_count,
            report.inauthentic_count as f64 / total * 100.0
        );
    }

    if !report.quality_histogram.is_empty() {
        println!();
        println!("--- Quality Distribution ---");
        for bucket in &report.quality_histogram {
            println!(
                "  - {}: {} reviews (Avg: {:.2})",
                bucket.label, bucket.count, bucket.mean_quality
            );
        }
    }
}

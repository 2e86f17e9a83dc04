// TutoRank CLI - Tutorial video ranking

use clap::{Args, Parser, Subcommand, ValueEnum};
use colored::Colorize;
use comfy_table::{presets::UTF8_FULL, Table};
use serde::{Deserialize, Serialize};
use std::io::{self, Write};
use tracing::{debug, warn, Level};
use tutorank_core::{
    candidates_from_items, CandidateVideo, DurationPreference, SearchRequest, SkillLevel,
    VideoItem, VideoRecommendation,
};
use tutorank_engine::{config::DEFAULT_CONFIG_PATH, Recommender, ScoringConfig};

const DEFAULT_API_URL: &str = "http://localhost:8000";
const SCORE_PRECISION: i32 = 4;
const WATCH_URL: &str = "https://www.youtube.com/watch?v=";
const TITLE_WIDTH: usize = 48;

#[derive(Parser)]
#[command(name = "tutorank")]
#[command(version = "0.1.0")]
#[command(about = "Rank tutorial videos for a technology and skill level", long_about = None)]
struct Cli {
    /// Scoring config file (or set TUTORANK_CONFIG env var)
    #[arg(short, long, env = "TUTORANK_CONFIG", default_value = DEFAULT_CONFIG_PATH, global = true)]
    config: String,

    /// Show debug logs on stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Rank candidate videos from a JSON file
    Rank {
        /// Path to candidates file
        file: String,

        #[command(flatten)]
        request: RequestArgs,

        /// File holds raw YouTube video resources instead of candidates
        #[arg(long)]
        youtube: bool,

        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Show the search string for a technology
    Query {
        /// Technology to learn
        technology: String,

        /// Skill level
        #[arg(short, long, value_enum, default_value = "none")]
        level: LevelArg,
    },

    /// Show the active scoring config
    Config,

    /// Rank candidates through a running API server
    Remote {
        /// Path to candidates file
        file: String,

        #[command(flatten)]
        request: RequestArgs,

        /// API server URL
        #[arg(short, long, env = "TUTORANK_API_URL", default_value = DEFAULT_API_URL)]
        api_url: String,
    },

    /// Check API server health
    Status {
        /// API server URL
        #[arg(short, long, env = "TUTORANK_API_URL", default_value = DEFAULT_API_URL)]
        api_url: String,
    },
}

#[derive(Args)]
struct RequestArgs {
    /// Technology to learn
    #[arg(short, long)]
    technology: String,

    /// Skill level
    #[arg(short, long, value_enum, default_value = "none")]
    level: LevelArg,

    /// Preferred video length
    #[arg(short, long, value_enum, default_value = "any")]
    duration: DurationArg,

    /// Only keep videos published in the last N months
    #[arg(short, long)]
    max_months: Option<u32>,

    /// Number of recommendations (defaults to the config value)
    #[arg(short = 'n', long)]
    top_k: Option<usize>,
}

#[derive(Clone, Copy, ValueEnum)]
enum LevelArg {
    Beginner,
    Intermediate,
    Advanced,
    None,
}

impl From<LevelArg> for Option<SkillLevel> {
    fn from(arg: LevelArg) -> Self {
        match arg {
            LevelArg::Beginner => Some(SkillLevel::Beginner),
            LevelArg::Intermediate => Some(SkillLevel::Intermediate),
            LevelArg::Advanced => Some(SkillLevel::Advanced),
            LevelArg::None => None,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum DurationArg {
    Short,
    Medium,
    Long,
    Any,
}

impl From<DurationArg> for DurationPreference {
    fn from(arg: DurationArg) -> Self {
        match arg {
            DurationArg::Short => DurationPreference::Short,
            DurationArg::Medium => DurationPreference::Medium,
            DurationArg::Long => DurationPreference::Long,
            DurationArg::Any => DurationPreference::Any,
        }
    }
}

impl RequestArgs {
    fn to_request(&self) -> SearchRequest {
        SearchRequest {
            technology: self.technology.clone(),
            level: self.level.into(),
            duration_preference: self.duration.into(),
            max_months: self.max_months,
        }
    }
}

// body for POST /api/search
#[derive(Serialize)]
struct SearchBody<'a> {
    #[serde(flatten)]
    request: &'a SearchRequest,
    #[serde(skip_serializing_if = "Option::is_none")]
    top_k: Option<usize>,
    candidates: &'a [CandidateVideo],
}

#[derive(Serialize, Deserialize)]
struct SearchResponse {
    query: String,
    recommendations: Vec<VideoRecommendation>,
}

#[derive(Deserialize)]
struct HealthResponse {
    status: String,
    service: String,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // logs go to stderr so --json output stays clean
    tracing_subscriber::fmt()
        .with_max_level(if cli.verbose { Level::DEBUG } else { Level::WARN })
        .with_writer(io::stderr)
        .init();

    match cli.command {
        Commands::Rank {
            file,
            request,
            youtube,
            json,
        } => {
            rank_local(&cli.config, &file, &request, youtube, json)?;
        }
        Commands::Query { technology, level } => {
            show_query(&cli.config, &technology, level)?;
        }
        Commands::Config => {
            show_config(&cli.config)?;
        }
        Commands::Remote {
            file,
            request,
            api_url,
        } => {
            let client = reqwest::Client::new();
            rank_remote(&client, &api_url, &file, &request).await?;
        }
        Commands::Status { api_url } => {
            let client = reqwest::Client::new();
            check_status(&client, &api_url).await?;
        }
    }

    Ok(())
}

fn load_recommender(config_path: &str) -> Result<Recommender, Box<dyn std::error::Error>> {
    let config = ScoringConfig::load_or_default(config_path)?;
    debug!(path = config_path, "Scoring config loaded");
    Ok(Recommender::new(config)?)
}

fn read_candidates(
    file_path: &str,
    youtube: bool,
) -> Result<Vec<CandidateVideo>, Box<dyn std::error::Error>> {
    let content = std::fs::read_to_string(file_path)?;

    if !youtube {
        return Ok(serde_json::from_str(&content)?);
    }

    // raw API items, already in search order
    let items: Vec<VideoItem> = serde_json::from_str(&content)?;
    let (candidates, errors) = candidates_from_items(&items);
    for err in &errors {
        warn!("Skipping video: {}", err);
    }
    if !errors.is_empty() {
        eprintln!(
            "{} {} video(s) skipped",
            "Warning:".yellow().bold(),
            errors.len()
        );
    }
    Ok(candidates)
}

fn rank_local(
    config_path: &str,
    file_path: &str,
    args: &RequestArgs,
    youtube: bool,
    json: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let recommender = load_recommender(config_path)?;
    let candidates = read_candidates(file_path, youtube)?;
    let request = args.to_request();

    let result = recommender.recommend(&request, &candidates, args.top_k)?;
    let response = SearchResponse {
        query: result.query,
        recommendations: result
            .recommendations
            .iter()
            .map(|s| VideoRecommendation::from(s).rounded(SCORE_PRECISION))
            .collect(),
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&response)?);
        return Ok(());
    }

    println!("\n{} \"{}\"", "🎬 Ranking:".cyan().bold(), response.query);
    println!(
        "{} {} candidates from {}",
        "Input:".dimmed(),
        candidates.len(),
        file_path
    );
    println!("{}", "─".repeat(60).dimmed());
    print_recommendations(&response.recommendations);

    Ok(())
}

async fn rank_remote(
    client: &reqwest::Client,
    api_url: &str,
    file_path: &str,
    args: &RequestArgs,
) -> Result<(), Box<dyn std::error::Error>> {
    let candidates = read_candidates(file_path, false)?;
    let request = args.to_request();

    println!("\n{} {}", "🌐 Remote ranking:".cyan().bold(), api_url);
    println!("{}", "─".repeat(60).dimmed());

    let body = SearchBody {
        request: &request,
        top_k: args.top_k,
        candidates: &candidates,
    };
    let response = client
        .post(format!("{}/api/search", api_url))
        .json(&body)
        .send()
        .await?;

    if !response.status().is_success() {
        let status = response.status();
        let error = response.text().await?;
        println!("{} {} {}", "Error:".red().bold(), status, error);
        return Ok(());
    }

    let result: SearchResponse = response.json().await?;
    println!("{} \"{}\"", "Query:".dimmed(), result.query);
    print_recommendations(&result.recommendations);

    Ok(())
}

fn print_recommendations(recommendations: &[VideoRecommendation]) {
    if recommendations.is_empty() {
        println!("{}", "No videos matched.".yellow());
        return;
    }

    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_header(vec![
        "#", "Score", "Title", "Channel", "Length", "Views", "Likes", "Published",
    ]);

    for (i, rec) in recommendations.iter().enumerate() {
        let score = format!("{:.3}", rec.score);
        let score_colored = if rec.score >= 0.7 {
            score.green().to_string()
        } else if rec.score >= 0.4 {
            score.yellow().to_string()
        } else {
            score.red().to_string()
        };

        table.add_row(vec![
            (i + 1).to_string(),
            score_colored,
            truncate(&rec.title, TITLE_WIDTH),
            rec.channel.clone(),
            rec.duration.clone(),
            rec.view_count.to_string(),
            rec.like_count.to_string(),
            rec.published_at.format("%Y-%m-%d").to_string(),
        ]);
    }

    println!("{table}");

    // per-signal breakdown
    let mut breakdown = Table::new();
    breakdown.load_preset(UTF8_FULL);
    breakdown.set_header(vec![
        "#", "Relevance", "Like ratio", "Views", "Recency", "Duration", "Extra",
    ]);
    for (i, rec) in recommendations.iter().enumerate() {
        let b = &rec.score_breakdown;
        let extra = b
            .extra
            .iter()
            .map(|(name, value)| match b.notes.get(name) {
                Some(note) if !note.flags.is_empty() => {
                    format!("{}={:.3} [{}]", name, value, note.flags.join(","))
                }
                _ => format!("{}={:.3}", name, value),
            })
            .collect::<Vec<_>>()
            .join(" ");
        breakdown.add_row(vec![
            (i + 1).to_string(),
            format!("{:.3}", b.relevance),
            format!("{:.3}", b.like_ratio),
            format!("{:.3}", b.views),
            format!("{:.3}", b.recency),
            format!("{:.3}", b.duration_match),
            extra,
        ]);
    }
    println!("{breakdown}");

    for (i, rec) in recommendations.iter().enumerate() {
        println!(
            "  {} {}{}",
            format!("{}.", i + 1).dimmed(),
            WATCH_URL,
            rec.video_id.blue()
        );
    }
    println!(
        "\n{} {}",
        "Recommended:".dimmed(),
        recommendations.len().to_string().green()
    );
}

fn show_query(
    config_path: &str,
    technology: &str,
    level: LevelArg,
) -> Result<(), Box<dyn std::error::Error>> {
    let recommender = load_recommender(config_path)?;
    let mut request = SearchRequest::new(technology);
    request.level = level.into();

    let built = recommender.build_query(&request)?;
    println!("{}", built.search_query);
    Ok(())
}

fn show_config(config_path: &str) -> Result<(), Box<dyn std::error::Error>> {
    let recommender = load_recommender(config_path)?;
    let config = recommender.config();

    println!("\n{} {}", "⚙️  Scoring config:".cyan().bold(), config_path);
    println!("{}", "─".repeat(40).dimmed());

    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_header(vec!["Signal", "Weight"]);
    for (name, weight) in config.weights.entries() {
        table.add_row(vec![name.to_string(), format!("{:.2}", weight)]);
    }
    if config.comment_analysis.enabled {
        table.add_row(vec![
            "comment_quality".to_string(),
            format!("{:.2}", config.comment_analysis.weight),
        ]);
    }
    println!("{table}");

    println!(
        "  {} {}",
        "Weight sum:".dimmed(),
        format!("{:.2}", recommender.scorer().max_score()).yellow()
    );
    println!(
        "  {} {}",
        "View scale:".dimmed(),
        config.normalization.view_reference_scale
    );
    println!(
        "  {} {} days",
        "Recency half-life:".dimmed(),
        config.normalization.recency_half_life_days
    );
    println!(
        "  {} {}",
        "Adjacent duration credit:".dimmed(),
        config.normalization.adjacent_duration_credit
    );
    println!(
        "  {} {} (of {} fetched)",
        "Top-k:".dimmed(),
        config.results.top_k,
        config.results.max_results
    );
    println!();

    Ok(())
}

async fn check_status(
    client: &reqwest::Client,
    api_url: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    println!("\n{}", "🔧 System Status".cyan().bold());
    println!("{}", "─".repeat(40).dimmed());

    print!("  API Server ({})... ", api_url);
    io::stdout().flush()?;

    match client.get(format!("{}/health", api_url)).send().await {
        Ok(resp) if resp.status().is_success() => match resp.json::<HealthResponse>().await {
            Ok(health) => println!(
                "{} ({} {})",
                "✓ Running".green(),
                health.service,
                health.status
            ),
            Err(_) => println!("{}", "✓ Running".green()),
        },
        Ok(resp) => {
            println!("{} ({})", "✗ Error".red(), resp.status());
        }
        Err(e) => {
            println!("{} ({})", "✗ Down".red(), e);
        }
    }

    println!();
    Ok(())
}

fn truncate(text: &str, width: usize) -> String {
    if text.chars().count() > width {
        let head: String = text.chars().take(width.saturating_sub(3)).collect();
        format!("{}...", head)
    } else {
        text.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_is_char_safe() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("Rust für Anfänger komplett", 10), "Rust fü...");
    }

    #[test]
    fn test_request_args_conversion() {
        let args = RequestArgs {
            technology: "React".to_string(),
            level: LevelArg::None,
            duration: DurationArg::Short,
            max_months: Some(6),
            top_k: None,
        };
        let request = args.to_request();
        assert_eq!(request.level, None);
        assert_eq!(request.duration_preference, DurationPreference::Short);
        assert_eq!(request.max_months, Some(6));
    }

    #[test]
    fn test_search_body_is_flat() {
        let request = SearchRequest::new("Go").with_level(SkillLevel::Advanced);
        let body = SearchBody {
            request: &request,
            top_k: Some(2),
            candidates: &[],
        };
        let value = serde_json::to_value(&body).unwrap();
        assert_eq!(value["technology"], "Go");
        assert_eq!(value["level"], "advanced");
        assert_eq!(value["top_k"], 2);
        assert!(value["candidates"].as_array().unwrap().is_empty());
    }

    #[test]
    fn test_cli_parses_rank() {
        let cli = Cli::try_parse_from([
            "tutorank", "rank", "videos.json", "-t", "Rust", "-l", "beginner", "-d", "medium",
            "--json",
        ])
        .unwrap();
        match cli.command {
            Commands::Rank { file, request, json, youtube } => {
                assert_eq!(file, "videos.json");
                assert_eq!(request.technology, "Rust");
                assert!(json);
                assert!(!youtube);
            }
            _ => panic!("expected rank"),
        }
    }
}

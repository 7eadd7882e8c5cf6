use anyhow::{Context, Result};
use chrono::Utc;
use clap::{Parser, Subcommand};
use player_compare::compare::{radar_pair, ComparisonTable, DEFENSIVE_AXES, OFFENSIVE_AXES};
use player_compare::config::Config;
use player_compare::dataset::{CsvExporter, DatasetAccumulator};
use player_compare::fetch::{HttpFetcher, PageFetcher};
use player_compare::league::{self, LeagueAverages, DEFAULT_MIN_MINUTES};
use player_compare::logging;
use player_compare::pipeline::Pipeline;
use player_compare::tables::TabularDataset;
use player_compare::types::PlayerInput;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};

#[derive(Parser)]
#[command(name = "player_compare")]
#[command(about = "Collect and compare football player statistics")]
#[command(version = "0.1.0")]
struct Cli {
    /// Config file (defaults to player_compare.toml when present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Collect one or two players, print the comparison and append the dataset
    Compare {
        #[arg(long)]
        player1: String,
        /// Market-valuation profile URL
        #[arg(long)]
        profile1: String,
        /// Season-stats page URL
        #[arg(long)]
        stats1: String,
        #[arg(long)]
        player2: Option<String>,
        #[arg(long)]
        profile2: Option<String>,
        #[arg(long)]
        stats2: Option<String>,
        /// Seasons to keep (comma-separated), overrides the config
        #[arg(long, value_delimiter = ',')]
        seasons: Option<Vec<String>>,
        /// Dataset CSV path, overrides the config
        #[arg(long)]
        out: Option<PathBuf>,
        /// Print the comparison as JSON instead of a text table
        #[arg(long)]
        json: bool,
    },
    /// Compute league-wide averages from a competition stats page
    League {
        #[arg(long, required_unless_present = "from_csv", conflicts_with = "from_csv")]
        url: Option<String>,
        /// Reuse player rows saved earlier with --players-out instead of downloading
        #[arg(long)]
        from_csv: Option<PathBuf>,
        #[arg(long, default_value_t = DEFAULT_MIN_MINUTES)]
        min_minutes: f64,
        #[arg(long, default_value = "league_averages.csv")]
        out: PathBuf,
        #[arg(long, default_value = "league_averages_by_position.csv")]
        by_position_out: PathBuf,
        /// Also write the filtered player rows here
        #[arg(long)]
        players_out: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();
    logging::init_logging();

    let cli = Cli::parse();
    let mut config = Config::load(cli.config.as_deref()).context("loading configuration")?;

    match cli.command {
        Commands::Compare {
            player1,
            profile1,
            stats1,
            player2,
            profile2,
            stats2,
            seasons,
            out,
            json,
        } => {
            if let Some(seasons) = seasons {
                config.seasons = seasons.into_iter().map(|s| s.trim().to_string()).collect();
                config.validate()?;
            }
            let out = out.unwrap_or_else(|| PathBuf::from(&config.output.dataset_path));

            let mut players = vec![PlayerInput {
                name: player1,
                profile_url: profile1,
                stats_url: stats1,
            }];
            if let Some(name) = player2.filter(|n| !n.trim().is_empty()) {
                players.push(PlayerInput {
                    name,
                    profile_url: profile2.unwrap_or_default(),
                    stats_url: stats2.unwrap_or_default(),
                });
            }
            run_compare(&config, &players, out, json).await?;
        }
        Commands::League {
            url,
            from_csv,
            min_minutes,
            out,
            by_position_out,
            players_out,
        } => {
            let players = match (url, from_csv) {
                (_, Some(path)) => league::load_players(&path, min_minutes)
                    .with_context(|| format!("reading {}", path.display()))?,
                (Some(url), None) => download_league(&config, &url, min_minutes).await?,
                (None, None) => anyhow::bail!("either --url or --from-csv is required"),
            };
            run_league(players, min_minutes, out, by_position_out, players_out)?;
        }
    }
    Ok(())
}

async fn run_compare(
    config: &Config,
    players: &[PlayerInput],
    out: PathBuf,
    json: bool,
) -> Result<()> {
    let fetcher: Arc<dyn PageFetcher> = Arc::new(HttpFetcher::new(&config.http)?);
    let pipeline = Pipeline::new(fetcher, config);

    let mut accumulator = DatasetAccumulator::start(&config.seasons, Utc::now());
    let reports = pipeline.run(players).await;
    for report in &reports {
        accumulator.push(report);
    }

    let table = ComparisonTable::build(&reports, &config.seasons);
    let title = reports
        .iter()
        .map(|r| r.name.to_uppercase())
        .collect::<Vec<_>>()
        .join(" vs ");
    if json {
        println!("{}", serde_json::to_string_pretty(&table)?);
    } else {
        println!("\nCOMPARISON: {title}\n");
        print!("{}", table.render());
    }

    let path = accumulator
        .flush(&CsvExporter::new(out))
        .context("writing dataset")?;
    println!("\n💾 Dataset saved/updated at: {}", path.display());

    if let [first, second] = reports.as_slice() {
        for (label, axes) in [("Offensive", &OFFENSIVE_AXES[..]), ("Defensive", &DEFENSIVE_AXES[..])] {
            let series = radar_pair(&first.stats, &second.stats, axes);
            println!("\n{label} radar ({} / {})", first.name, second.name);
            for ((metric, a), b) in series.axes.iter().zip(&series.first).zip(&series.second) {
                println!("  {:<12} {:.2}  {:.2}", metric.label(), a, b);
            }
        }
    } else {
        info!("Radar series need two players, skipped");
    }
    Ok(())
}

async fn download_league(config: &Config, url: &str, min_minutes: f64) -> Result<TabularDataset> {
    let fetcher = HttpFetcher::new(&config.http)?;
    let html = fetcher
        .fetch(url)
        .await
        .with_context(|| format!("downloading {url}"))?;
    Ok(league::league_players(&html, min_minutes)?)
}

fn run_league(
    players: TabularDataset,
    min_minutes: f64,
    out: PathBuf,
    by_position_out: PathBuf,
    players_out: Option<PathBuf>,
) -> Result<()> {
    if players.is_empty() {
        warn!("No players with at least {} minutes", min_minutes);
    }
    if let Some(path) = players_out {
        let path = league::export_players(&path, &players)?;
        println!("💾 League players saved to: {}", path.display());
    }

    let averages = LeagueAverages::compute(&players);
    println!("\nLeague averages ({} players)\n", averages.overall.players);
    print!("{}", averages.render());
    println!("\nBy position\n");
    print!("{}", averages.render_by_position());

    let path = league::export_means(&out, &averages.overall)?;
    println!("\n💾 League averages saved to: {}", path.display());
    let path = league::export_by_position(&by_position_out, &averages)?;
    println!("💾 Position averages saved to: {}", path.display());
    Ok(())
}

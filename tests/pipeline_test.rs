use anyhow::Result;
use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use player_compare::config::Config;
use player_compare::dataset::{CsvExporter, DatasetAccumulator};
use player_compare::error::ScraperError;
use player_compare::fetch::PageFetcher;
use player_compare::pipeline::Pipeline;
use player_compare::types::{Lookup, Metric, PlayerInput, ProfileRecord};
use std::collections::HashMap;
use std::fs;
use std::sync::Arc;
use tempfile::tempdir;

const PROFILE_URL: &str = "https://www.transfermarkt.com.br/joao-neves/profil/spieler/670681";
const STATS_URL: &str = "https://fbref.com/en/players/abc123/all_comps/Joao-Neves-Stats";

/// Serves canned pages; every other URL fails like an unreachable host.
struct StubFetcher {
    pages: HashMap<String, String>,
}

#[async_trait]
impl PageFetcher for StubFetcher {
    async fn fetch(&self, url: &str) -> player_compare::error::Result<String> {
        self.pages
            .get(url)
            .cloned()
            .ok_or_else(|| ScraperError::Parse(format!("connection refused: {url}")))
    }
}

fn stub() -> Arc<StubFetcher> {
    let mut pages = HashMap::new();
    pages.insert(
        PROFILE_URL.to_string(),
        include_str!("fixtures/player_profile.html").to_string(),
    );
    pages.insert(
        STATS_URL.to_string(),
        include_str!("fixtures/player_stats.html").to_string(),
    );
    Arc::new(StubFetcher { pages })
}

fn players() -> Vec<PlayerInput> {
    vec![
        PlayerInput {
            name: "Joao Neves".into(),
            profile_url: PROFILE_URL.into(),
            stats_url: STATS_URL.into(),
        },
        PlayerInput {
            name: "Offline Player".into(),
            profile_url: "https://www.transfermarkt.com.br/offline/profil/spieler/1".into(),
            stats_url: "https://fbref.com/en/players/offline".into(),
        },
    ]
}

#[tokio::test]
async fn test_complete_and_unreachable_players() -> Result<()> {
    let pipeline = Pipeline::new(stub(), &Config::default());
    let reports = pipeline.run(&players()).await;
    assert_eq!(reports.len(), 2);

    let complete = &reports[0];
    assert_eq!(complete.profile.current_club, Lookup::Found("Paris Saint-Germain".into()));
    assert_eq!(complete.profile.market_value, Lookup::Found("45.00M".into()));
    assert_eq!(complete.profile.date_of_birth, Lookup::Found("27/09/2004".into()));

    // 2022-2023 is outside the default seasons; the repeated header row is dropped
    assert_eq!(complete.stats.get(Metric::Matches), 55.0);
    assert_eq!(complete.stats.get(Metric::Minutes), 4200.0);
    assert_eq!(complete.stats.get(Metric::Goals), 6.0);
    assert_eq!(complete.stats.get(Metric::Assists), 10.0);
    assert_eq!(complete.stats.get(Metric::YellowCards), 8.0);
    assert_eq!(complete.stats.get(Metric::RedCards), 1.0);
    // defense falls back past the expanded table, which has no requested season
    assert_eq!(complete.stats.get(Metric::Tackles), 70.0);
    assert_eq!(complete.stats.get(Metric::TacklesWon), 45.0);
    assert_eq!(complete.stats.get(Metric::Blocks), 18.0);
    assert_eq!(complete.stats.get(Metric::Interceptions), 30.0);
    assert_eq!(complete.stats.get(Metric::Clearances), 20.0);
    // no shooting table on the page
    assert_eq!(complete.stats.get(Metric::Xg), 0.0);
    let per90 = complete.stats.get(Metric::GoalsAssistsPer90);
    assert!((per90 - 16.0 / 4200.0 * 90.0).abs() < 1e-9);

    let offline = &reports[1];
    assert_eq!(offline.profile, ProfileRecord::fetch_failed());
    for metric in Metric::ALL {
        assert_eq!(offline.stats.get(metric), 0.0, "{metric} should be zero");
    }
    Ok(())
}

#[tokio::test]
async fn test_dataset_written_for_every_player() -> Result<()> {
    let dir = tempdir()?;
    let path = dir.path().join("dataset_coleta_jogadores.csv");
    let config = Config::default();
    let pipeline = Pipeline::new(stub(), &config);

    let collected_at = Utc.with_ymd_and_hms(2025, 5, 30, 18, 0, 0).unwrap();
    let mut accumulator = DatasetAccumulator::start(&config.seasons, collected_at);
    for report in pipeline.run(&players()).await {
        accumulator.push(&report);
    }

    let rows = accumulator.rows().to_vec();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].goals, Some(6));
    assert_eq!(rows[0].minutes, Some(4200));
    assert_eq!(rows[0].g_plus_a_per90, 0.34);
    assert_eq!(rows[0].market_value, Some(45_000_000.0));
    assert_eq!(rows[0].height, "1,74 m");
    assert_eq!(rows[1].current_club, "Erro");
    assert_eq!(rows[1].market_value, None);
    assert_eq!(rows[1].tackles, Some(0));

    let written = accumulator.flush(&CsvExporter::new(&path))?;
    assert!(written.ends_with("dataset_coleta_jogadores.csv"));
    assert!(accumulator.is_empty());

    let content = fs::read_to_string(&path)?;
    let lines: Vec<&str> = content.lines().collect();
    assert_eq!(lines.len(), 3);
    assert!(lines[0].starts_with("player,seasons,source_profile_url"));
    assert!(lines[1].starts_with("Joao Neves,\"2023-2024, 2024-2025\","));
    assert!(lines[2].contains(
        "2025-05-30T18:00:00Z,Erro,Erro,Erro,Erro,Erro,,0,0,0,0,0.00,0.00,0.00,0,0,0,0,0,0,0,0,0"
    ));

    // a second run appends without repeating the header
    let mut again = DatasetAccumulator::start(&config.seasons, collected_at);
    again.push(&pipeline.run_player(&players()[0]).await);
    again.flush(&CsvExporter::new(&path))?;
    let content = fs::read_to_string(&path)?;
    assert_eq!(content.lines().count(), 4);
    assert_eq!(content.lines().filter(|l| l.starts_with("player,")).count(), 1);
    Ok(())
}

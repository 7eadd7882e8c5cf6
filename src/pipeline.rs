use crate::config::Config;
use crate::fetch::{is_valid_url, PageFetcher};
use crate::profile::{is_profile_url, parse_profile, resolve_profile_url};
use crate::stats::{aggregate, AggregationConfig};
use crate::tables::clean::SeasonSet;
use crate::tables::locator::TableLocator;
use crate::tables::TableCollection;
use crate::types::{PlayerInput, PlayerReport, ProfileRecord};
use std::sync::Arc;
use tracing::{info, instrument, warn};

/// Runs the fetch -> locate -> aggregate flow for each player, one after
/// another. Fetch failures are downgraded to sentinels and zeros, so a
/// report is produced for every player that is not skipped.
pub struct Pipeline {
    fetcher: Arc<dyn PageFetcher>,
    locator: TableLocator,
    aggregation: AggregationConfig,
}

impl Pipeline {
    pub fn new(fetcher: Arc<dyn PageFetcher>, config: &Config) -> Self {
        let seasons = SeasonSet::new(&config.seasons);
        Self {
            fetcher,
            locator: TableLocator::new(config.table_candidates(), seasons),
            aggregation: config.aggregation(),
        }
    }

    /// Process up to two players sequentially. Players after the first are
    /// skipped when neither of their URLs is usable.
    pub async fn run(&self, players: &[PlayerInput]) -> Vec<PlayerReport> {
        let mut reports = Vec::with_capacity(players.len());
        for (i, player) in players.iter().enumerate() {
            if i > 0 && !is_valid_url(&player.profile_url) && !is_valid_url(&player.stats_url) {
                info!("Skipping '{}': no valid URL supplied", player.name);
                continue;
            }
            reports.push(self.run_player(player).await);
        }
        info!("✅ Collected {} player report(s)", reports.len());
        reports
    }

    #[instrument(skip(self, player), fields(player = %player.name))]
    pub async fn run_player(&self, player: &PlayerInput) -> PlayerReport {
        info!("🚀 Collecting data for {}", player.name);
        let profile = self.collect_profile(&player.profile_url).await;
        let tables = self.collect_tables(&player.stats_url).await;
        let stats = aggregate(&tables, &self.aggregation);
        info!(
            "{}: {} table(s) located {:?}, {} metric(s) aggregated",
            player.name,
            tables.len(),
            tables.names().collect::<Vec<_>>(),
            stats.len()
        );

        PlayerReport {
            name: player.name.clone(),
            profile_url: player.profile_url.clone(),
            stats_url: player.stats_url.clone(),
            profile,
            stats,
        }
    }

    async fn collect_profile(&self, url: &str) -> ProfileRecord {
        if !is_valid_url(url) {
            warn!("Invalid profile URL '{}', profile fields not found", url);
            return ProfileRecord::not_found();
        }

        let html = match self.fetcher.fetch(url).await {
            Ok(html) => html,
            Err(e) => {
                warn!("Profile fetch failed for {}: {}", url, e);
                return ProfileRecord::fetch_failed();
            }
        };
        if is_profile_url(url) {
            return parse_profile(&html);
        }

        // A player page that is not the profile itself usually links to it
        let Some(profile_url) = resolve_profile_url(&html) else {
            info!("No profile link on {}, parsing it as is", url);
            return parse_profile(&html);
        };
        info!("Resolved profile URL {}", profile_url);
        match self.fetcher.fetch(&profile_url).await {
            Ok(html) => parse_profile(&html),
            Err(e) => {
                warn!("Profile fetch failed for {}: {}", profile_url, e);
                ProfileRecord::fetch_failed()
            }
        }
    }

    async fn collect_tables(&self, url: &str) -> TableCollection {
        if !is_valid_url(url) {
            warn!("Invalid stats URL '{}', all metrics default to 0", url);
            return TableCollection::new();
        }
        match self.fetcher.fetch(url).await {
            Ok(html) => self.locator.locate(&html),
            Err(e) => {
                warn!("Stats fetch failed for {}: {}", url, e);
                TableCollection::new()
            }
        }
    }
}

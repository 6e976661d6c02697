//! Airline ranking by operated routes.
//!
//! Airlines are densely ranked by route count, most routes first: equal
//! counts share a rank and the next distinct count takes the next integer.
//! Within a rank, entries are ordered by airline code. Routes referencing an
//! unknown airline do not create entries.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

use super::{count_at, int64_column, string_column, Analyzer};
use crate::config::AnalysisConfig;
use crate::dataset::Dataset;
use crate::error::Result;
use crate::logging::LogConfig;
use crate::{log_finding, log_query};

const RANKING_ALL_SQL: &str = "\
WITH counts AS (
    SELECT al.code AS airline_code, COUNT(r.route_seq) AS route_count
    FROM airlines al
    LEFT JOIN routes r ON r.airline = al.code
    GROUP BY al.code
)
SELECT
    airline_code,
    route_count,
    CAST(DENSE_RANK() OVER (ORDER BY route_count DESC) AS BIGINT) AS airline_rank,
    COUNT(*) OVER (PARTITION BY route_count) AS group_size
FROM counts
ORDER BY airline_rank, airline_code";

const RANKING_OPERATING_SQL: &str = "\
WITH counts AS (
    SELECT al.code AS airline_code, COUNT(r.route_seq) AS route_count
    FROM airlines al
    LEFT JOIN routes r ON r.airline = al.code
    GROUP BY al.code
    HAVING COUNT(r.route_seq) > 0
)
SELECT
    airline_code,
    route_count,
    CAST(DENSE_RANK() OVER (ORDER BY route_count DESC) AS BIGINT) AS airline_rank,
    COUNT(*) OVER (PARTITION BY route_count) AS group_size
FROM counts
ORDER BY airline_rank, airline_code";

/// One airline's position in the ranking.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RankingEntry {
    pub airline_code: String,
    pub route_count: u64,
    /// Dense rank, 1 = most routes
    pub rank: u64,
    /// `true` when another airline shares this rank
    pub tied: bool,
}

/// Ranks airlines by the number of routes they operate.
#[derive(Debug, Clone)]
pub struct RankingAnalyzer {
    include_zero_route_airlines: bool,
    log_config: LogConfig,
}

impl Default for RankingAnalyzer {
    fn default() -> Self {
        Self::new(true)
    }
}

impl RankingAnalyzer {
    pub fn new(include_zero_route_airlines: bool) -> Self {
        Self {
            include_zero_route_airlines,
            log_config: LogConfig::default(),
        }
    }

    pub fn from_config(config: &AnalysisConfig) -> Self {
        Self::new(config.include_zero_route_airlines_in_ranking)
    }

    /// Sets the logging verbosity.
    pub fn with_log_config(mut self, log_config: LogConfig) -> Self {
        self.log_config = log_config;
        self
    }

    fn sql(&self) -> &'static str {
        if self.include_zero_route_airlines {
            RANKING_ALL_SQL
        } else {
            RANKING_OPERATING_SQL
        }
    }
}

#[async_trait]
impl Analyzer for RankingAnalyzer {
    type Output = Vec<RankingEntry>;

    #[instrument(
        skip(self, dataset),
        fields(analyzer = "ranking", include_zero = self.include_zero_route_airlines)
    )]
    async fn analyze(&self, dataset: &Dataset) -> Result<Self::Output> {
        let sql = self.sql();
        log_query!(self.log_config, "ranking", sql);
        let batches = dataset.context().sql(sql).await?.collect().await?;

        let mut entries = Vec::new();
        for batch in &batches {
            let codes = string_column(batch, "airline_code")?;
            let counts = int64_column(batch, "route_count")?;
            let ranks = int64_column(batch, "airline_rank")?;
            let group_sizes = int64_column(batch, "group_size")?;
            for row in 0..batch.num_rows() {
                let entry = RankingEntry {
                    airline_code: codes.value(row).to_string(),
                    route_count: count_at(counts, row)?,
                    rank: count_at(ranks, row)?,
                    tied: count_at(group_sizes, row)? > 1,
                };
                log_finding!(
                    self.log_config,
                    airline = %entry.airline_code,
                    rank = entry.rank,
                    route_count = entry.route_count,
                    "Ranked airline"
                );
                entries.push(entry);
            }
        }

        info!(
            airlines = entries.len(),
            ranks = entries.last().map(|e| e.rank).unwrap_or(0),
            "Ranking analysis finished"
        );
        Ok(entries)
    }

    fn name(&self) -> &str {
        "ranking"
    }
}

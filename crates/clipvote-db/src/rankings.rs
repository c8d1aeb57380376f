//! Repository for the `player_rankings` materialized view.

use clipvote_models::PlayerRanking;
use sqlx::{PgPool, Postgres, QueryBuilder};

/// Filters applied to ranking queries. Country and city are
/// case-insensitive exact matches.
#[derive(Debug, Clone, Default)]
pub struct RankingFilters {
    pub country: Option<String>,
    pub city: Option<String>,
    pub min_votes: Option<i64>,
    pub max_votes: Option<i64>,
}

/// Validated pagination window.
#[derive(Debug, Clone, Copy)]
pub struct PaginationParams {
    pub page: i64,
    pub page_size: i64,
}

impl Default for PaginationParams {
    fn default() -> Self {
        Self {
            page: 1,
            page_size: 10,
        }
    }
}

impl PaginationParams {
    /// Clamp raw query parameters: page below 1 becomes 1, page_size outside
    /// [1, 100] falls back to the default 10.
    pub fn clamped(page: i64, page_size: i64) -> Self {
        Self {
            page: if page < 1 { 1 } else { page },
            page_size: if !(1..=100).contains(&page_size) {
                10
            } else {
                page_size
            },
        }
    }

    pub fn offset(&self) -> i64 {
        (self.page - 1) * self.page_size
    }

    pub fn limit(&self) -> i64 {
        self.page_size
    }
}

/// Ranking view refresh and filtered reads.
pub struct RankingRepo;

impl RankingRepo {
    /// Recompute the materialized view.
    ///
    /// CONCURRENTLY (enabled by the view's unique index on `user_id`) keeps
    /// ranking reads serving the previous snapshot while this runs on the
    /// post-vote request path.
    pub async fn refresh(pool: &PgPool) -> Result<(), sqlx::Error> {
        sqlx::query("REFRESH MATERIALIZED VIEW CONCURRENTLY player_rankings")
            .execute(pool)
            .await?;
        Ok(())
    }

    /// Query rankings with filters and pagination. Returns the page of rows
    /// plus the total row count for the filter set.
    pub async fn query(
        pool: &PgPool,
        filters: &RankingFilters,
        pagination: PaginationParams,
    ) -> Result<(Vec<PlayerRanking>, i64), sqlx::Error> {
        let mut count_builder: QueryBuilder<Postgres> =
            QueryBuilder::new("SELECT COUNT(*) FROM player_rankings");
        push_filters(&mut count_builder, filters);
        let total: i64 = count_builder.build_query_scalar().fetch_one(pool).await?;

        let mut builder: QueryBuilder<Postgres> = QueryBuilder::new(
            "SELECT user_id, first_name, last_name, email, city, country, \
             total_votes, ranking, last_updated FROM player_rankings",
        );
        push_filters(&mut builder, filters);
        builder.push(" ORDER BY ranking ASC, user_id ASC");
        builder.push(" LIMIT ");
        builder.push_bind(pagination.limit());
        builder.push(" OFFSET ");
        builder.push_bind(pagination.offset());

        let rankings = builder
            .build_query_as::<PlayerRanking>()
            .fetch_all(pool)
            .await?;

        Ok((rankings, total))
    }
}

fn push_filters(builder: &mut QueryBuilder<Postgres>, filters: &RankingFilters) {
    let mut prefix = " WHERE ";

    if let Some(country) = &filters.country {
        builder.push(prefix).push("LOWER(country) = LOWER(");
        builder.push_bind(country.clone());
        builder.push(")");
        prefix = " AND ";
    }

    if let Some(city) = &filters.city {
        builder.push(prefix).push("LOWER(city) = LOWER(");
        builder.push_bind(city.clone());
        builder.push(")");
        prefix = " AND ";
    }

    if let Some(min_votes) = filters.min_votes {
        builder.push(prefix).push("total_votes >= ");
        builder.push_bind(min_votes);
        prefix = " AND ";
    }

    if let Some(max_votes) = filters.max_votes {
        builder.push(prefix).push("total_votes <= ");
        builder.push_bind(max_votes);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pagination_clamping() {
        let p = PaginationParams::clamped(0, 0);
        assert_eq!((p.page, p.page_size), (1, 10));

        let p = PaginationParams::clamped(-3, 101);
        assert_eq!((p.page, p.page_size), (1, 10));

        let p = PaginationParams::clamped(2, 100);
        assert_eq!((p.page, p.page_size), (2, 100));

        let p = PaginationParams::clamped(5, 1);
        assert_eq!((p.page, p.page_size), (5, 1));
    }

    #[test]
    fn test_offset_calculation() {
        let p = PaginationParams::clamped(3, 25);
        assert_eq!(p.offset(), 50);
        assert_eq!(p.limit(), 25);
    }
}

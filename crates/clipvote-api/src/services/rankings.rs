//! Player rankings reads and refresh.

use clipvote_db::{DbPool, PaginationParams, RankingFilters, RankingRepo};

use crate::dto::{PaginationMeta, RankingsQuery, RankingsResponse};
use crate::error::ApiResult;

/// Ranking view queries.
#[derive(Clone)]
pub struct RankingService {
    pool: DbPool,
}

impl RankingService {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Paginated, filtered rankings ordered by rank.
    pub async fn get_rankings(&self, query: RankingsQuery) -> ApiResult<RankingsResponse> {
        let pagination =
            PaginationParams::clamped(query.page.unwrap_or(1), query.page_size.unwrap_or(10));
        let filters = RankingFilters {
            country: query.country.filter(|s| !s.is_empty()),
            city: query.city.filter(|s| !s.is_empty()),
            min_votes: query.min_votes,
            max_votes: query.max_votes,
        };

        let (rows, total_items) = RankingRepo::query(&self.pool, &filters, pagination).await?;

        Ok(RankingsResponse {
            rankings: rows.into_iter().map(Into::into).collect(),
            pagination: PaginationMeta {
                current_page: pagination.page,
                page_size: pagination.page_size,
                total_items,
                total_pages: total_pages(total_items, pagination.page_size),
            },
        })
    }

    /// Recompute the materialized view.
    pub async fn refresh(&self) -> ApiResult<()> {
        Ok(RankingRepo::refresh(&self.pool).await?)
    }
}

/// `ceil(total_items / page_size)`.
fn total_pages(total_items: i64, page_size: i64) -> i64 {
    if page_size <= 0 {
        return 0;
    }
    (total_items + page_size - 1) / page_size
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_total_pages() {
        assert_eq!(total_pages(0, 10), 0);
        assert_eq!(total_pages(1, 10), 1);
        assert_eq!(total_pages(10, 10), 1);
        assert_eq!(total_pages(11, 10), 2);
        assert_eq!(total_pages(100, 100), 1);
        assert_eq!(total_pages(101, 100), 2);
    }
}

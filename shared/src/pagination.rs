//! 分页类型
//!
//! 列表接口统一使用 `?page=&per_page=` 查询参数和 [`PaginatedResponse`] 响应。

use serde::{Deserialize, Serialize};

/// Default page size for listings
pub const DEFAULT_PER_PAGE: u32 = 15;

/// Upper bound for `per_page`
pub const MAX_PER_PAGE: u32 = 100;

/// 分页查询参数
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct PageQuery {
    /// 页码 (从 1 开始)
    pub page: Option<u32>,
    /// 每页数量
    pub per_page: Option<u32>,
}

impl PageQuery {
    /// Page number, clamped to at least 1
    pub fn page(&self) -> u32 {
        self.page.unwrap_or(1).max(1)
    }

    /// Page size, clamped to `1..=MAX_PER_PAGE`
    pub fn per_page(&self) -> u32 {
        self.per_page
            .unwrap_or(DEFAULT_PER_PAGE)
            .clamp(1, MAX_PER_PAGE)
    }

    /// SQL `LIMIT` value
    pub fn limit(&self) -> i64 {
        i64::from(self.per_page())
    }

    /// SQL `OFFSET` value
    pub fn offset(&self) -> i64 {
        i64::from(self.page() - 1) * self.limit()
    }
}

/// 分页响应
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaginatedResponse<T> {
    /// 数据列表
    pub data: Vec<T>,
    /// 总记录数
    pub total: u64,
    /// 当前页码
    pub page: u32,
    /// 每页数量
    pub per_page: u32,
    /// 总页数
    pub total_pages: u32,
}

impl<T> PaginatedResponse<T> {
    pub fn new(data: Vec<T>, total: u64, page: u32, per_page: u32) -> Self {
        let total_pages = if per_page > 0 {
            total.div_ceil(u64::from(per_page)) as u32
        } else {
            1
        };

        Self {
            data,
            total,
            page,
            per_page,
            total_pages,
        }
    }

    /// Build a response for the window described by `query`
    pub fn from_query(data: Vec<T>, total: i64, query: &PageQuery) -> Self {
        Self::new(data, total.max(0) as u64, query.page(), query.per_page())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_query_defaults() {
        let q = PageQuery::default();
        assert_eq!(q.page(), 1);
        assert_eq!(q.per_page(), DEFAULT_PER_PAGE);
        assert_eq!(q.offset(), 0);
    }

    #[test]
    fn test_page_query_clamps() {
        let q = PageQuery {
            page: Some(0),
            per_page: Some(10_000),
        };
        assert_eq!(q.page(), 1);
        assert_eq!(q.per_page(), MAX_PER_PAGE);

        let q = PageQuery {
            page: Some(3),
            per_page: Some(15),
        };
        assert_eq!(q.offset(), 30);
    }

    #[test]
    fn test_paginated_response() {
        let resp = PaginatedResponse::new(vec!["a", "b", "c"], 31, 2, 15);
        assert_eq!(resp.total, 31);
        assert_eq!(resp.page, 2);
        assert_eq!(resp.total_pages, 3);

        let empty: PaginatedResponse<i32> = PaginatedResponse::new(vec![], 0, 1, 15);
        assert_eq!(empty.total_pages, 0);
    }
}

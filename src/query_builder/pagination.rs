/// LIMIT/OFFSET for paged listings; pages are 1-based
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub limit: Option<u32>,
    pub offset: Option<u32>,
}

impl Pagination {
    /// Page 0 is treated as page 1
    pub fn new(page: u32, per_page: u32) -> Self {
        let offset = page.saturating_sub(1).saturating_mul(per_page);
        Self {
            limit: Some(per_page),
            offset: if offset > 0 { Some(offset) } else { None },
        }
    }

    pub fn limit_only(limit: u32) -> Self {
        Self {
            limit: Some(limit),
            offset: None,
        }
    }

    pub fn to_sql(&self) -> String {
        let mut sql = String::new();

        if let Some(limit) = self.limit {
            sql.push_str(&format!(" LIMIT {limit}"));
        }

        if let Some(offset) = self.offset {
            sql.push_str(&format!(" OFFSET {offset}"));
        }

        sql
    }

    /// Apply to an already ordered in-memory sequence
    pub fn apply<T>(&self, items: impl IntoIterator<Item = T>) -> Vec<T> {
        let skipped = items.into_iter().skip(self.offset.unwrap_or(0) as usize);
        match self.limit {
            Some(limit) => skipped.take(limit as usize).collect(),
            None => skipped.collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_offsets() {
        assert_eq!(Pagination::new(1, 20).to_sql(), " LIMIT 20");
        assert_eq!(Pagination::new(3, 20).to_sql(), " LIMIT 20 OFFSET 40");
        assert_eq!(Pagination::new(0, 20), Pagination::new(1, 20));
    }

    #[test]
    fn test_apply_in_memory() {
        let page = Pagination::new(2, 2).apply(1..=5);
        assert_eq!(page, vec![3, 4]);
        assert_eq!(Pagination::limit_only(10).apply(1..=3), vec![1, 2, 3]);
    }
}

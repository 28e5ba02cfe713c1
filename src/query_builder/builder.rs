use super::{Condition, Pagination, SqlValue};

/// Rendered SQL plus the values to bind, in placeholder order
#[derive(Debug, Clone, PartialEq)]
pub struct BuiltQuery {
    pub sql: String,
    pub binds: Vec<SqlValue>,
}

/// Builds single-table SELECTs from typed conditions
#[derive(Debug, Clone)]
pub struct QueryBuilder {
    base_table: String,
    select_fields: Vec<String>,
    conditions: Vec<Condition>,
    order_by: Vec<String>,
    pagination: Option<Pagination>,
    lock_clause: Option<&'static str>,
}

impl QueryBuilder {
    pub fn new(table: &str) -> Self {
        Self {
            base_table: table.to_string(),
            select_fields: vec!["*".to_string()],
            conditions: Vec::new(),
            order_by: Vec::new(),
            pagination: None,
            lock_clause: None,
        }
    }

    pub fn select(mut self, fields: &[&str]) -> Self {
        self.select_fields = fields.iter().map(|f| f.to_string()).collect();
        self
    }

    pub fn count(self) -> Self {
        self.select(&["COUNT(*)"])
    }

    pub fn where_condition(mut self, condition: Condition) -> Self {
        self.conditions.push(condition);
        self
    }

    pub fn where_all(mut self, conditions: impl IntoIterator<Item = Condition>) -> Self {
        self.conditions.extend(conditions);
        self
    }

    pub fn order_asc(mut self, field: &str) -> Self {
        self.order_by.push(format!("{field} ASC"));
        self
    }

    pub fn order_desc(mut self, field: &str) -> Self {
        self.order_by.push(format!("{field} DESC"));
        self
    }

    pub fn paginate(mut self, pagination: Option<Pagination>) -> Self {
        self.pagination = pagination;
        self
    }

    pub fn limit(mut self, limit: u32) -> Self {
        match self.pagination.as_mut() {
            Some(pagination) => pagination.limit = Some(limit),
            None => self.pagination = Some(Pagination::limit_only(limit)),
        }
        self
    }

    /// Lock matched rows, skipping rows another transaction already holds
    pub fn for_update_skip_locked(mut self) -> Self {
        self.lock_clause = Some(" FOR UPDATE SKIP LOCKED");
        self
    }

    pub fn build(&self) -> BuiltQuery {
        let mut binds = Vec::new();
        let mut sql = format!(
            "SELECT {} FROM {}",
            self.select_fields.join(", "),
            self.base_table
        );

        if !self.conditions.is_empty() {
            let clauses = self
                .conditions
                .iter()
                .map(|condition| condition.to_sql(&mut binds))
                .collect::<Vec<_>>();
            sql.push_str(" WHERE ");
            sql.push_str(&clauses.join(" AND "));
        }

        if !self.order_by.is_empty() {
            sql.push_str(" ORDER BY ");
            sql.push_str(&self.order_by.join(", "));
        }

        if let Some(pagination) = &self.pagination {
            sql.push_str(&pagination.to_sql());
        }

        if let Some(lock_clause) = self.lock_clause {
            sql.push_str(lock_clause);
        }

        BuiltQuery { sql, binds }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_select() {
        let query = QueryBuilder::new("labflow_tasks")
            .select(&["id"])
            .where_condition(Condition::eq("is_fulfilled", false))
            .where_condition(Condition::is_null("claimed_by"))
            .order_asc("due_date")
            .limit(50)
            .for_update_skip_locked()
            .build();

        assert_eq!(
            query.sql,
            "SELECT id FROM labflow_tasks WHERE is_fulfilled = $1 AND claimed_by IS NULL \
             ORDER BY due_date ASC LIMIT 50 FOR UPDATE SKIP LOCKED"
        );
        assert_eq!(query.binds, vec![SqlValue::Bool(false)]);
    }

    #[test]
    fn test_count_without_conditions() {
        let query = QueryBuilder::new("labflow_notifications").count().build();
        assert_eq!(query.sql, "SELECT COUNT(*) FROM labflow_notifications");
        assert!(query.binds.is_empty());
    }
}

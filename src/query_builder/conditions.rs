use chrono::{DateTime, Utc};
use uuid::Uuid;

/// A value bound to a query placeholder
#[derive(Debug, Clone, PartialEq)]
pub enum SqlValue {
    Text(String),
    Uuid(Uuid),
    Bool(bool),
    Timestamp(DateTime<Utc>),
    Json(serde_json::Value),
}

impl From<&str> for SqlValue {
    fn from(value: &str) -> Self {
        SqlValue::Text(value.to_string())
    }
}

impl From<Uuid> for SqlValue {
    fn from(value: Uuid) -> Self {
        SqlValue::Uuid(value)
    }
}

impl From<bool> for SqlValue {
    fn from(value: bool) -> Self {
        SqlValue::Bool(value)
    }
}

impl From<DateTime<Utc>> for SqlValue {
    fn from(value: DateTime<Utc>) -> Self {
        SqlValue::Timestamp(value)
    }
}

impl From<serde_json::Value> for SqlValue {
    fn from(value: serde_json::Value) -> Self {
        SqlValue::Json(value)
    }
}

/// Represents different types of SQL conditions.
///
/// Values are never inlined; rendering assigns `$n` placeholders and the
/// caller binds the returned values in order.
#[derive(Debug, Clone, PartialEq)]
pub enum Condition {
    Compare {
        field: String,
        operator: &'static str,
        value: SqlValue,
    },
    In {
        field: String,
        values: Vec<SqlValue>,
    },
    NotIn {
        field: String,
        values: Vec<SqlValue>,
    },
    IsNull {
        field: String,
    },
    IsNotNull {
        field: String,
    },
    /// `field = $n::jsonb`
    JsonEquals {
        field: String,
        value: serde_json::Value,
    },
    /// Parenthesised disjunction
    Any(Vec<Condition>),
}

impl Condition {
    pub fn eq(field: &str, value: impl Into<SqlValue>) -> Self {
        Self::compare(field, "=", value)
    }

    pub fn not_eq(field: &str, value: impl Into<SqlValue>) -> Self {
        Self::compare(field, "<>", value)
    }

    pub fn lte(field: &str, value: impl Into<SqlValue>) -> Self {
        Self::compare(field, "<=", value)
    }

    pub fn lt(field: &str, value: impl Into<SqlValue>) -> Self {
        Self::compare(field, "<", value)
    }

    pub fn compare(field: &str, operator: &'static str, value: impl Into<SqlValue>) -> Self {
        Condition::Compare {
            field: field.to_string(),
            operator,
            value: value.into(),
        }
    }

    pub fn not_in<V: Into<SqlValue>>(field: &str, values: impl IntoIterator<Item = V>) -> Self {
        Condition::NotIn {
            field: field.to_string(),
            values: values.into_iter().map(Into::into).collect(),
        }
    }

    pub fn is_null(field: &str) -> Self {
        Condition::IsNull {
            field: field.to_string(),
        }
    }

    pub fn is_not_null(field: &str) -> Self {
        Condition::IsNotNull {
            field: field.to_string(),
        }
    }

    pub fn json_equals(field: &str, value: serde_json::Value) -> Self {
        Condition::JsonEquals {
            field: field.to_string(),
            value,
        }
    }

    /// Render to SQL, pushing bound values onto `binds`
    pub fn to_sql(&self, binds: &mut Vec<SqlValue>) -> String {
        match self {
            Condition::Compare {
                field,
                operator,
                value,
            } => {
                binds.push(value.clone());
                format!("{field} {operator} ${}", binds.len())
            }
            // IN () is invalid SQL; an empty set matches nothing
            Condition::In { values, .. } if values.is_empty() => "FALSE".to_string(),
            Condition::In { field, values } => {
                format!("{field} IN ({})", placeholders(values, binds))
            }
            Condition::NotIn { values, .. } if values.is_empty() => "TRUE".to_string(),
            Condition::NotIn { field, values } => {
                format!("{field} NOT IN ({})", placeholders(values, binds))
            }
            Condition::IsNull { field } => format!("{field} IS NULL"),
            Condition::IsNotNull { field } => format!("{field} IS NOT NULL"),
            Condition::JsonEquals { field, value } => {
                binds.push(SqlValue::Json(value.clone()));
                format!("{field} = ${}::jsonb", binds.len())
            }
            Condition::Any(conditions) if conditions.is_empty() => "FALSE".to_string(),
            Condition::Any(conditions) => {
                let clauses = conditions
                    .iter()
                    .map(|condition| condition.to_sql(binds))
                    .collect::<Vec<_>>();
                format!("({})", clauses.join(" OR "))
            }
        }
    }
}

fn placeholders(values: &[SqlValue], binds: &mut Vec<SqlValue>) -> String {
    values
        .iter()
        .map(|value| {
            binds.push(value.clone());
            format!("${}", binds.len())
        })
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_placeholders_are_numbered_in_order() {
        let mut binds = Vec::new();
        let first = Condition::eq("is_fulfilled", false).to_sql(&mut binds);
        let second = Condition::lte("due_date", Utc::now()).to_sql(&mut binds);
        assert_eq!(first, "is_fulfilled = $1");
        assert_eq!(second, "due_date <= $2");
        assert_eq!(binds.len(), 2);
    }

    #[test]
    fn test_in_condition() {
        let mut binds = vec![SqlValue::Bool(true)];
        let sql = Condition::In {
            field: "task_type".to_string(),
            values: vec!["SHIP_ORDER".into(), "DUE_PAYMENT".into()],
        }
        .to_sql(&mut binds);
        assert_eq!(sql, "task_type IN ($2, $3)");

        let empty = Condition::In {
            field: "task_type".to_string(),
            values: vec![],
        }
        .to_sql(&mut binds);
        assert_eq!(empty, "FALSE");
    }

    #[test]
    fn test_not_in_condition() {
        let mut binds = Vec::new();
        let skipped = Uuid::new_v4();
        let sql = Condition::not_in("id", [skipped]).to_sql(&mut binds);
        assert_eq!(sql, "id NOT IN ($1)");
        assert_eq!(binds, vec![SqlValue::Uuid(skipped)]);

        let empty = Condition::not_in("id", Vec::<Uuid>::new()).to_sql(&mut binds);
        assert_eq!(empty, "TRUE");
        assert_eq!(binds.len(), 1);
    }

    #[test]
    fn test_any_condition() {
        let mut binds = Vec::new();
        let now = Utc::now();
        let sql = Condition::Any(vec![
            Condition::is_null("claimed_by"),
            Condition::lte("claimed_at", now),
        ])
        .to_sql(&mut binds);
        assert_eq!(sql, "(claimed_by IS NULL OR claimed_at <= $1)");
        assert_eq!(binds, vec![SqlValue::Timestamp(now)]);
    }

    #[test]
    fn test_null_and_json_conditions() {
        let mut binds = Vec::new();
        assert_eq!(Condition::is_null("claimed_by").to_sql(&mut binds), "claimed_by IS NULL");
        assert_eq!(
            Condition::json_equals("details", serde_json::json!({"order": "x"})).to_sql(&mut binds),
            "details = $1::jsonb"
        );
    }
}

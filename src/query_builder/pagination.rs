use serde::Serialize;

/// Offset/limit applied to a compiled query. The last Skip fills `offset`
/// and the last Take fills `limit`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Pagination {
    pub limit: Option<u64>,
    pub offset: Option<u64>,
}

impl Pagination {
    pub fn limit_only(limit: u64) -> Self {
        Self {
            limit: Some(limit),
            offset: None,
        }
    }

    pub fn limit_offset(limit: u64, offset: u64) -> Self {
        Self {
            limit: Some(limit),
            offset: Some(offset),
        }
    }

    /// Trailing ` LIMIT n OFFSET m` fragment, empty when unset
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
}

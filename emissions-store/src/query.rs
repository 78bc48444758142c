//! PostgREST query builder for simple filtered, ordered, limited reads.

/// `GET /{table}?select=..&{col}=eq.{v}&order={col}.desc&limit={n}`.
#[derive(Clone, Debug, PartialEq)]
pub struct TableQuery {
    pub table: &'static str,
    select: String,
    eq: Vec<(&'static str, String)>,
    order_desc: Option<&'static str>,
    limit: Option<usize>,
}

impl TableQuery {
    pub fn table(table: &'static str) -> Self {
        Self {
            table,
            select: "*".to_string(),
            eq: Vec::new(),
            order_desc: None,
            limit: None,
        }
    }

    pub fn select(mut self, columns: &[&str]) -> Self {
        self.select = columns.join(",");
        self
    }

    pub fn eq(mut self, column: &'static str, value: impl Into<String>) -> Self {
        self.eq.push((column, value.into()));
        self
    }

    pub fn order_desc(mut self, column: &'static str) -> Self {
        self.order_desc = Some(column);
        self
    }

    pub fn limit(mut self, n: usize) -> Self {
        self.limit = Some(n);
        self
    }

    /// Query-string pairs in PostgREST syntax.
    pub fn params(&self) -> Vec<(String, String)> {
        let mut out = vec![("select".to_string(), self.select.clone())];
        for (col, v) in &self.eq {
            out.push((col.to_string(), format!("eq.{v}")));
        }
        if let Some(col) = self.order_desc {
            out.push(("order".to_string(), format!("{col}.desc")));
        }
        if let Some(n) = self.limit {
            out.push(("limit".to_string(), n.to_string()));
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_postgrest_params() {
        let q = TableQuery::table("hotspots")
            .eq("status", "active")
            .order_desc("predicted_co2")
            .limit(10);
        assert_eq!(
            q.params(),
            vec![
                ("select".to_string(), "*".to_string()),
                ("status".to_string(), "eq.active".to_string()),
                ("order".to_string(), "predicted_co2.desc".to_string()),
                ("limit".to_string(), "10".to_string()),
            ]
        );
    }

    #[test]
    fn explicit_select_list() {
        let q = TableQuery::table("events_normalized").select(&["supplier_id", "timestamp"]);
        assert_eq!(q.params()[0].1, "supplier_id,timestamp");
    }
}

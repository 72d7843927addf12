#[derive(Debug, Clone, Copy)]
pub struct LimitOffset {
    pub limit: i64,
    pub offset: i64,
}

impl Default for LimitOffset {
    fn default() -> Self {
        Self {
            limit: 50,
            offset: 0,
        }
    }
}

impl LimitOffset {
    /// Clamp caller-supplied values to something the database can serve cheaply.
    pub fn new(limit: Option<i64>, offset: Option<i64>) -> Self {
        let default = Self::default();
        Self {
            limit: limit.unwrap_or(default.limit).clamp(1, 500),
            offset: offset.unwrap_or(default.offset).max(0),
        }
    }
}

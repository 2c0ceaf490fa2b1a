/// A validated page window over the subscribed (not opted-out) rows. Pages start at 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchQuery {
    page: i64,
    count: i64,
}

impl BatchQuery {
    pub fn parse(page: i64, count: i64) -> Result<BatchQuery, String> {
        if page <= 0 || count <= 0 {
            return Err(String::from("page and count fields must be > 0"));
        }

        Ok(Self { page, count })
    }

    pub fn page(&self) -> i64 {
        self.page
    }

    pub fn count(&self) -> i64 {
        self.count
    }

    pub fn offset(&self) -> i64 {
        (self.page - 1).saturating_mul(self.count)
    }
}

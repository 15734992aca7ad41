use rust_decimal::Decimal;

/// Monthly spending ceiling for one category. A zero limit means untracked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Budget {
    pub category: String,
    pub limit_amount: Decimal,
}

impl Budget {
    pub fn new(category: String, limit_amount: Decimal) -> Self {
        Self {
            category,
            limit_amount,
        }
    }

    pub fn is_tracked(&self) -> bool {
        self.limit_amount > Decimal::ZERO
    }
}

mod budget;
mod category;
mod period;
mod transaction;

pub use budget::Budget;
pub use category::{Category, DEFAULT_CATEGORIES};
pub use period::Period;
pub use transaction::{
    check_magnitude, parse_amount, parse_date, NewTransaction, Transaction, TransactionKind,
    DATE_FORMAT, MAX_AMOUNT,
};

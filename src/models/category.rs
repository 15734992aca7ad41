/// Categories seeded into an empty store.
pub const DEFAULT_CATEGORIES: &[&str] = &[
    "Rent",
    "Groceries",
    "Utilities",
    "Entertainment",
    "Transport",
    "Dining",
    "Shopping",
    "Healthcare",
    "Insurance",
    "Salary",
    "Other",
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Category {
    pub id: i64,
    pub name: String,
}

impl Category {
    /// Find a category by name in a slice. An exact match wins; otherwise the
    /// first case-insensitive match is returned.
    pub fn find_by_name<'a>(categories: &'a [Category], name: &str) -> Option<&'a Category> {
        let name = name.trim();
        categories.iter().find(|c| c.name == name).or_else(|| {
            let lower = name.to_lowercase();
            categories.iter().find(|c| c.name.to_lowercase() == lower)
        })
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name)
    }
}

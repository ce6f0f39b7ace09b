//! Shopping list aggregation and rendering.

use std::collections::BTreeMap;

pub const HEADER: &str = "Shopping list:";
pub const FILENAME: &str = "shopping_cart.txt";

/// One line of the shopping list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShoppingLine {
    pub name: String,
    pub unit: String,
    pub amount: i64,
}

/// Group `(name, unit, amount)` rows and sum the amounts, ordered by name
/// then unit.
pub fn aggregate<I>(rows: I) -> Vec<ShoppingLine>
where
    I: IntoIterator<Item = (String, String, i32)>,
{
    let mut totals: BTreeMap<(String, String), i64> = BTreeMap::new();
    for (name, unit, amount) in rows {
        *totals.entry((name, unit)).or_default() += i64::from(amount);
    }
    totals
        .into_iter()
        .map(|((name, unit), amount)| ShoppingLine { name, unit, amount })
        .collect()
}

/// Render lines as the plain-text document served for download.
pub fn render(lines: &[ShoppingLine]) -> String {
    let mut out = String::from(HEADER);
    out.push('\n');
    for line in lines {
        out.push_str(&format!("{} - {}, {}\n", line.name, line.amount, line.unit));
    }
    out
}

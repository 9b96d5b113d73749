//! Consolidation of cart ingredient lines into a printable shopping list.
//!
//! Lines are grouped by ingredient name and measurement unit, not by
//! ingredient id: two catalog entries carrying the same labels are merged.

use std::collections::BTreeMap;
use std::fmt::{self, Write};

use serde::Serialize;

pub const HEADER: &str = "Shopping list:";
pub const FILENAME: &str = "shopping_cart.txt";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ShoppingListLine {
    pub name: String,
    pub unit: String,
    pub total_amount: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ShoppingList {
    pub lines: Vec<ShoppingListLine>,
}

impl ShoppingList {
    /// Sums `(name, unit, amount)` rows. Output is ordered by name, then unit.
    pub fn aggregate<I>(rows: I) -> Self
    where
        I: IntoIterator<Item = (String, String, i32)>,
    {
        let mut totals: BTreeMap<(String, String), i64> = BTreeMap::new();
        for (name, unit, amount) in rows {
            *totals.entry((name, unit)).or_default() += i64::from(amount);
        }

        let lines = totals
            .into_iter()
            .map(|((name, unit), total_amount)| ShoppingListLine {
                name,
                unit,
                total_amount,
            })
            .collect();

        Self { lines }
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn render(&self) -> String {
        let mut out = String::with_capacity(HEADER.len() + 1 + self.lines.len() * 24);
        out.push_str(HEADER);
        out.push('\n');
        for line in &self.lines {
            // Writing into a String cannot fail
            let _ = writeln!(out, "{line}");
        }
        out
    }
}

impl fmt::Display for ShoppingListLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({}) - {}", self.name, self.unit, self.total_amount)
    }
}

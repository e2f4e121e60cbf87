//! Recipe cost calculation.
//!
//! A product's cost is the sum of `cost_price * quantity` over its recipe lines, and its
//! margin is `price - cost`. Both are derived values: they are computed here from freshly
//! loaded data every time a product is returned and are never written to the database.
//!
//! Lines whose ingredient has been deleted still exist in storage with no ingredient attached.
//! They contribute nothing to the cost and are not an error.

use crate::entities::{ingredient, product_recipe};

/// A recipe line paired with its ingredient, if that ingredient still exists.
pub type ResolvedLine = (product_recipe::Model, Option<ingredient::Model>);

/// Derived cost figures for one product
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CostBreakdown {
    /// Sum of ingredient cost over all resolvable recipe lines
    pub calculated_cost: f64,
    /// `price - calculated_cost`; negative for products sold below cost
    pub profit_margin: f64,
}

/// Cost contributed by a single line, zero when its ingredient is gone.
#[must_use]
pub fn line_cost(line: &product_recipe::Model, ingredient: Option<&ingredient::Model>) -> f64 {
    ingredient.map_or(0.0, |ingredient| ingredient.cost_price * line.quantity)
}

/// Computes cost and margin for a product priced at `price` with the given recipe lines.
///
/// Lines are summed in slice order so the same input always produces the same bits.
#[must_use]
pub fn calculate(price: f64, lines: &[ResolvedLine]) -> CostBreakdown {
    let calculated_cost = lines
        .iter()
        .fold(0.0, |total, (line, ingredient)| {
            total + line_cost(line, ingredient.as_ref())
        });

    CostBreakdown {
        calculated_cost,
        profit_margin: price - calculated_cost,
    }
}

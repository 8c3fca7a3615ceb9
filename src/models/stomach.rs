use std::collections::BTreeMap;

use crate::models::food::{Food, FoodKey};

/// Sparse food → quantity mapping that every scoring function reads.
///
/// Zero quantities are never stored. Iteration is ordered by food key, so
/// floating-point sums over a stomach are reproducible.
#[derive(Debug, Clone, Default)]
pub struct Stomach<'a> {
    portions: BTreeMap<FoodKey, (&'a Food, u32)>,
}

impl<'a> Stomach<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the quantity for a food; zero removes the entry.
    pub fn set(&mut self, food: &'a Food, quantity: u32) {
        if quantity == 0 {
            self.portions.remove(food.key());
        } else {
            self.portions.insert(food.key().clone(), (food, quantity));
        }
    }

    /// Add one unit of `food`.
    pub fn add_one(&mut self, food: &'a Food) {
        let quantity = self.quantity_of(food);
        self.set(food, quantity + 1);
    }

    /// A copy of this stomach with one extra unit of `food`.
    ///
    /// The receiver is left untouched.
    pub fn with_added(&self, food: &'a Food) -> Self {
        let mut clone = self.clone();
        clone.add_one(food);
        clone
    }

    pub fn quantity_of(&self, food: &Food) -> u32 {
        self.portions
            .get(food.key())
            .map(|(_, quantity)| *quantity)
            .unwrap_or(0)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'a Food, u32)> + '_ {
        self.portions.values().map(|(food, quantity)| (*food, *quantity))
    }

    pub fn len(&self) -> usize {
        self.portions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.portions.is_empty()
    }

    /// Total calories across all portions.
    pub fn total_calories(&self) -> f64 {
        self.iter()
            .map(|(food, quantity)| food.calories() * f64::from(quantity))
            .sum()
    }
}

impl<'a> FromIterator<(&'a Food, u32)> for Stomach<'a> {
    fn from_iter<I: IntoIterator<Item = (&'a Food, u32)>>(iter: I) -> Self {
        let mut stomach = Stomach::new();
        for (food, quantity) in iter {
            stomach.set(food, quantity);
        }
        stomach
    }
}

use std::collections::{BTreeMap, BTreeSet};

use crate::error::{EcoError, Result};
use crate::models::{Food, FoodKey, FoodRecord, Stomach, Tastiness};
use crate::planner::calculations::{RewardCalculator, SpMultipliers};

/// Manages foods, stomach contents, and availability.
///
/// The manager is the only owner of consumed and available counts. Both maps
/// are sparse: a food with zero units has no entry.
#[derive(Debug, Clone, Default)]
pub struct FoodStateManager {
    /// All foods keyed by normalized name.
    foods: BTreeMap<FoodKey, Food>,
    stomach: BTreeMap<FoodKey, u32>,
    available: BTreeMap<FoodKey, u32>,
}

impl FoodStateManager {
    /// Create a manager from foods and their (stomach, available) counts.
    ///
    /// Later duplicates of a name replace earlier ones.
    pub fn new(entries: impl IntoIterator<Item = (Food, u32, u32)>) -> Self {
        let mut manager = Self::default();
        for (food, stomach, available) in entries {
            let key = food.key().clone();
            manager.stomach.remove(&key);
            manager.available.remove(&key);
            if stomach > 0 {
                manager.stomach.insert(key.clone(), stomach);
            }
            if available > 0 {
                manager.available.insert(key.clone(), available);
            }
            manager.foods.insert(key, food);
        }
        manager
    }

    /// Validate persisted records and build a manager.
    ///
    /// Fails on the first record with an out-of-scale tastiness.
    pub fn from_records(records: Vec<FoodRecord>) -> Result<Self> {
        let entries = records
            .into_iter()
            .map(FoodRecord::into_parts)
            .collect::<Result<Vec<_>>>()?;
        Ok(Self::new(entries))
    }

    /// Get a food by name (case-insensitive).
    pub fn get_food(&self, name: &str) -> Option<&Food> {
        self.foods.get(&FoodKey::new(name))
    }

    /// Units of a food eaten so far.
    pub fn stomach_count(&self, food: &Food) -> u32 {
        self.stomach.get(food.key()).copied().unwrap_or(0)
    }

    /// Units of a food still available.
    pub fn available_count(&self, food: &Food) -> u32 {
        self.available.get(food.key()).copied().unwrap_or(0)
    }

    /// Check if a food can be consumed (has available stock).
    pub fn can_consume(&self, food: &Food) -> bool {
        self.available_count(food) > 0
    }

    /// Consume one unit: increment stomach, decrement available.
    ///
    /// Returns `false` without touching state when nothing is available.
    pub fn consume(&mut self, food: &Food) -> bool {
        let key = food.key();
        let Some(available) = self.available.get_mut(key) else {
            return false;
        };

        *available -= 1;
        if *available == 0 {
            self.available.remove(key);
        }
        *self.stomach.entry(key.clone()).or_insert(0) += 1;
        true
    }

    /// Consume one unit by name.
    pub fn consume_food(&mut self, name: &str) -> Result<()> {
        let food = self
            .get_food(name)
            .cloned()
            .ok_or_else(|| EcoError::FoodNotFound(name.to_string()))?;

        if !self.consume(&food) {
            return Err(EcoError::InvalidInput(format!(
                "{} has no available units",
                food.name()
            )));
        }
        Ok(())
    }

    /// Current stomach as a scoring view.
    pub fn stomach(&self) -> Stomach<'_> {
        self.stomach
            .iter()
            .filter_map(|(key, qty)| self.foods.get(key).map(|food| (food, *qty)))
            .collect()
    }

    /// Normalized names of foods currently meeting the variety threshold.
    pub fn unique_variety_foods(&self, calc: &RewardCalculator<'_>) -> BTreeSet<FoodKey> {
        calc.qualifying_names(&self.stomach())
    }

    /// All foods with available units, ordered by key.
    pub fn all_available(&self) -> Vec<&Food> {
        self.available
            .keys()
            .filter_map(|key| self.foods.get(key))
            .collect()
    }

    /// All foods, ordered by key.
    pub fn all_foods(&self) -> Vec<&Food> {
        self.foods.values().collect()
    }

    /// Replace the rating of a food.
    pub fn set_tastiness(&mut self, name: &str, tastiness: Tastiness) -> Result<()> {
        let food = self
            .foods
            .get_mut(&FoodKey::new(name))
            .ok_or_else(|| EcoError::FoodNotFound(name.to_string()))?;
        *food = food.with_tastiness(tastiness);
        Ok(())
    }

    /// Reset stomach counts for all foods.
    pub fn reset_stomach(&mut self) {
        self.stomach.clear();
    }

    /// Reset availability for all foods to a fixed value.
    pub fn reset_availability(&mut self, new_available: u32) {
        self.available.clear();
        if new_available > 0 {
            for key in self.foods.keys() {
                self.available.insert(key.clone(), new_available);
            }
        }
    }

    /// Reset tastiness for all foods.
    ///
    /// If `to_unknown` is true, sets to 99 (unknown); otherwise sets to 0 (neutral).
    pub fn reset_tastiness(&mut self, to_unknown: bool) {
        let value = if to_unknown {
            Tastiness::UNKNOWN
        } else {
            Tastiness::NEUTRAL
        };
        for food in self.foods.values_mut() {
            *food = food.with_tastiness(value);
        }
    }

    /// Compute current SP given cravings state.
    pub fn current_sp(
        &self,
        calc: &RewardCalculator<'_>,
        cravings: &[String],
        cravings_satisfied: u32,
        multipliers: SpMultipliers,
    ) -> f64 {
        calc.current_sp(&self.stomach(), cravings, cravings_satisfied, multipliers)
    }

    /// Snapshot every food with its current counters.
    pub fn to_records(&self) -> Vec<FoodRecord> {
        self.foods
            .values()
            .map(|food| food.to_record(self.stomach_count(food), self.available_count(food)))
            .collect()
    }

    /// Total calories in stomach.
    pub fn total_stomach_calories(&self) -> f64 {
        self.stomach().total_calories()
    }

    /// Count of foods in the manager.
    pub fn len(&self) -> usize {
        self.foods.len()
    }

    /// Check if manager has no foods.
    pub fn is_empty(&self) -> bool {
        self.foods.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PlannerConfig;

    fn sample_manager() -> FoodStateManager {
        FoodStateManager::new(vec![
            (Food::new("Apple", 100, 20, 1, 0, 5, 2).unwrap(), 0, 5),
            (Food::new("Bread", 200, 40, 8, 2, 1, 1).unwrap(), 2, 10),
            (Food::new("Cake", 2500, 40, 8, 20, 1, 3).unwrap(), 1, 0),
        ])
    }

    #[test]
    fn test_get_food_case_insensitive() {
        let manager = sample_manager();
        assert!(manager.get_food("apple").is_some());
        assert!(manager.get_food("APPLE").is_some());
        assert!(manager.get_food(" Apple ").is_some());
        assert!(manager.get_food("banana").is_none());
    }

    #[test]
    fn test_consume_food() {
        let mut manager = sample_manager();

        let apple = manager.get_food("apple").unwrap().clone();
        assert!(manager.can_consume(&apple));
        assert!(manager.consume(&apple));

        assert_eq!(manager.stomach_count(&apple), 1);
        assert_eq!(manager.available_count(&apple), 4);
    }

    #[test]
    fn test_consume_fails_without_stock() {
        let mut manager = sample_manager();
        let cake = manager.get_food("cake").unwrap().clone();

        assert!(!manager.can_consume(&cake));
        assert!(!manager.consume(&cake));
        assert_eq!(manager.stomach_count(&cake), 1);
        assert!(manager.consume_food("cake").is_err());
        assert!(matches!(
            manager.consume_food("banana"),
            Err(EcoError::FoodNotFound(_))
        ));
    }

    #[test]
    fn test_last_unit_removes_available_entry() {
        let mut manager = FoodStateManager::new(vec![(
            Food::new("Plum", 50, 5, 0, 0, 2, 0).unwrap(),
            0,
            1,
        )]);
        manager.consume_food("plum").unwrap();
        assert!(manager.all_available().is_empty());
        assert_eq!(manager.to_records()[0].available, 0);
        assert_eq!(manager.to_records()[0].stomach, 1);
    }

    #[test]
    fn test_reset_stomach() {
        let mut manager = sample_manager();
        let bread = manager.get_food("bread").unwrap().clone();
        assert_eq!(manager.stomach_count(&bread), 2);

        manager.reset_stomach();
        assert_eq!(manager.stomach_count(&bread), 0);
        assert!(manager.stomach().is_empty());
    }

    #[test]
    fn test_reset_availability_and_tastiness() {
        let mut manager = sample_manager();
        manager.reset_availability(0);
        assert!(manager.all_available().is_empty());

        manager.reset_availability(3);
        assert_eq!(manager.all_available().len(), 3);

        manager.reset_tastiness(true);
        assert!(manager.all_foods().iter().all(|f| f.tastiness().is_unknown()));
        manager.reset_tastiness(false);
        assert!(manager
            .all_foods()
            .iter()
            .all(|f| f.tastiness() == Tastiness::NEUTRAL));
    }

    #[test]
    fn test_all_available() {
        let manager = sample_manager();
        let names: Vec<&str> = manager.all_available().iter().map(|f| f.name()).collect();
        assert_eq!(names, vec!["Apple", "Bread"]);
    }

    #[test]
    fn test_unique_variety_foods() {
        let manager = sample_manager();
        let config = PlannerConfig::default();
        let calc = RewardCalculator::new(&config);

        let names = manager.unique_variety_foods(&calc);
        assert_eq!(names.len(), 1);
        assert!(names.contains(&FoodKey::new("cake")));
    }

    #[test]
    fn test_set_tastiness() {
        let mut manager = sample_manager();
        manager
            .set_tastiness("APPLE", Tastiness::try_from(-2).unwrap())
            .unwrap();
        assert_eq!(manager.get_food("apple").unwrap().tastiness().value(), -2);
        assert!(manager.set_tastiness("banana", Tastiness::NEUTRAL).is_err());
    }

    #[test]
    fn test_from_records_rejects_invalid_tastiness() {
        let mut record = Food::new("Apple", 100, 20, 1, 0, 5, 2)
            .unwrap()
            .to_record(0, 1);
        record.tastiness = 7;
        assert!(matches!(
            FoodStateManager::from_records(vec![record]),
            Err(EcoError::InvalidTastiness { value: 7, .. })
        ));
    }
}

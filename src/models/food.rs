use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{EcoError, Result};

/// Case-insensitive identity of a food: the trimmed, lowercased name.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FoodKey(String);

impl FoodKey {
    pub fn new(name: &str) -> Self {
        Self(name.trim().to_lowercase())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for FoodKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Preference rating on the fixed scale -3..=3, or 99 for "unknown".
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Tastiness(i8);

impl Tastiness {
    pub const UNKNOWN: Tastiness = Tastiness(99);
    pub const NEUTRAL: Tastiness = Tastiness(0);

    /// Every value on the scale, worst to best, followed by the sentinel.
    pub const SCALE: [Tastiness; 8] = [
        Tastiness(-3),
        Tastiness(-2),
        Tastiness(-1),
        Tastiness(0),
        Tastiness(1),
        Tastiness(2),
        Tastiness(3),
        Tastiness(99),
    ];

    /// Whether `value` is a member of the preference scale.
    pub fn is_valid(value: i64) -> bool {
        (-3..=3).contains(&value) || value == 99
    }

    pub fn value(self) -> i8 {
        self.0
    }

    pub fn is_unknown(self) -> bool {
        self == Self::UNKNOWN
    }
}

impl TryFrom<i64> for Tastiness {
    type Error = i64;

    fn try_from(value: i64) -> std::result::Result<Self, Self::Error> {
        if Self::is_valid(value) {
            Ok(Tastiness(value as i8))
        } else {
            Err(value)
        }
    }
}

impl fmt::Display for Tastiness {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A food type: identity plus static per-unit attributes.
///
/// Consumed and available counts are owned by the state manager, not by
/// the food itself.
#[derive(Debug, Clone, PartialEq)]
pub struct Food {
    key: FoodKey,
    name: String,
    calories: u32,
    carbs: u32,
    protein: u32,
    fats: u32,
    vitamins: u32,
    tastiness: Tastiness,
}

impl Food {
    /// Build a food, rejecting any tastiness outside the preference scale.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        name: impl Into<String>,
        calories: u32,
        carbs: u32,
        protein: u32,
        fats: u32,
        vitamins: u32,
        tastiness: i64,
    ) -> Result<Self> {
        let name = name.into();
        let tastiness = Tastiness::try_from(tastiness).map_err(|value| {
            EcoError::InvalidTastiness {
                food: name.clone(),
                value,
            }
        })?;

        Ok(Self {
            key: FoodKey::new(&name),
            name,
            calories,
            carbs,
            protein,
            fats,
            vitamins,
            tastiness,
        })
    }

    pub fn key(&self) -> &FoodKey {
        &self.key
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn calories(&self) -> f64 {
        f64::from(self.calories)
    }

    pub fn carbs(&self) -> f64 {
        f64::from(self.carbs)
    }

    pub fn protein(&self) -> f64 {
        f64::from(self.protein)
    }

    pub fn fats(&self) -> f64 {
        f64::from(self.fats)
    }

    pub fn vitamins(&self) -> f64 {
        f64::from(self.vitamins)
    }

    pub fn tastiness(&self) -> Tastiness {
        self.tastiness
    }

    /// Raw integer calories, as persisted.
    pub fn calories_u32(&self) -> u32 {
        self.calories
    }

    /// Copy of this food with a new rating.
    pub fn with_tastiness(&self, tastiness: Tastiness) -> Self {
        Self {
            tastiness,
            ..self.clone()
        }
    }

    /// Debug string for logging.
    pub fn debug_string(&self) -> String {
        format!(
            "{}: {} cal, C:{} P:{} F:{} V:{}, taste:{}",
            self.name,
            self.calories,
            self.carbs,
            self.protein,
            self.fats,
            self.vitamins,
            self.tastiness
        )
    }

    /// Persisted shape of this food with the given counters.
    pub fn to_record(&self, stomach: u32, available: u32) -> FoodRecord {
        FoodRecord {
            name: self.name.clone(),
            calories: self.calories,
            carbs: self.carbs,
            protein: self.protein,
            fats: self.fats,
            vitamins: self.vitamins,
            tastiness: i64::from(self.tastiness.value()),
            stomach,
            available,
        }
    }
}

/// On-disk representation of a food and its counters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FoodRecord {
    #[serde(rename = "Name")]
    pub name: String,

    #[serde(rename = "Calories")]
    pub calories: u32,

    #[serde(rename = "Carbs")]
    pub carbs: u32,

    #[serde(rename = "Protein")]
    pub protein: u32,

    #[serde(rename = "Fats", alias = "Fat")]
    pub fats: u32,

    #[serde(rename = "Vitamins")]
    pub vitamins: u32,

    #[serde(rename = "Tastiness")]
    pub tastiness: i64,

    #[serde(rename = "Stomach", default)]
    pub stomach: u32,

    #[serde(rename = "Available", default)]
    pub available: u32,
}

impl FoodRecord {
    pub fn key(&self) -> FoodKey {
        FoodKey::new(&self.name)
    }

    /// Validate and split into the immutable food and its counters.
    pub fn into_parts(self) -> Result<(Food, u32, u32)> {
        let food = Food::new(
            self.name,
            self.calories,
            self.carbs,
            self.protein,
            self.fats,
            self.vitamins,
            self.tastiness,
        )?;
        Ok((food, self.stomach, self.available))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_food() -> Food {
        Food::new("Apple", 100, 20, 1, 0, 5, 2).unwrap()
    }

    #[test]
    fn test_debug_string() {
        let food = sample_food();
        assert_eq!(food.debug_string(), "Apple: 100 cal, C:20 P:1 F:0 V:5, taste:2");
    }

    #[test]
    fn test_invalid_tastiness_rejected() {
        let err = Food::new("Apple", 100, 20, 1, 0, 5, 5).unwrap_err();
        assert!(matches!(err, EcoError::InvalidTastiness { value: 5, .. }));
        assert!(Food::new("Apple", 100, 20, 1, 0, 5, -4).is_err());
        assert!(Food::new("Apple", 100, 20, 1, 0, 5, 99).is_ok());
    }

    #[test]
    fn test_key_case_insensitive() {
        let food1 = sample_food();
        let food2 = Food::new("  APPLE ", 100, 20, 1, 0, 5, 2).unwrap();
        assert_eq!(food1.key(), food2.key());
        assert_eq!(food1.key().as_str(), "apple");
    }

    #[test]
    fn test_record_round_trip_keeps_counters() {
        let record = sample_food().to_record(3, 7);
        let (food, stomach, available) = record.into_parts().unwrap();
        assert_eq!(food.name(), "Apple");
        assert_eq!((stomach, available), (3, 7));
    }

    #[test]
    fn test_record_accepts_fat_alias() {
        let json = r#"{"Name": "Nut", "Calories": 50, "Carbs": 1, "Protein": 2, "Fat": 9, "Vitamins": 0, "Tastiness": 99}"#;
        let record: FoodRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.fats, 9);
        assert_eq!(record.available, 0);
    }
}

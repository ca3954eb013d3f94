//! Parameter spaces and their expansion into a deterministic grid.

use std::collections::{BTreeMap, HashSet};

use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::{Deserialize, Serialize};

use crate::error::ConfigurationError;

use super::types::{ParamValue, Parameters};

/// Upper bound on grid combinations accepted by [`ParameterSpace::grid`].
pub const MAX_GRID_COMBINATIONS: usize = 100_000;

/// Inclusive numeric range with a positive step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParamRange {
    /// First value.
    pub start: Decimal,
    /// Last value (included when reachable by whole steps).
    pub end: Decimal,
    /// Increment.
    pub step: Decimal,
}

/// Candidate set for one parameter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParamDomain {
    /// Explicit candidate list, enumerated in the given order.
    Values(Vec<ParamValue>),
    /// Inclusive range; integral bounds and step yield integer values.
    Range(ParamRange),
}

impl ParamDomain {
    fn expand(&self, name: &str) -> Result<Vec<ParamValue>, ConfigurationError> {
        let values = match self {
            Self::Values(values) => values.clone(),
            Self::Range(range) => expand_range(name, range)?,
        };

        if values.is_empty() {
            return Err(ConfigurationError::EmptyParameterCandidates {
                name: name.to_string(),
            });
        }

        let mut seen = HashSet::with_capacity(values.len());
        for value in &values {
            if !seen.insert(value) {
                return Err(ConfigurationError::DuplicateParameterValue {
                    name: name.to_string(),
                    value: value.to_string(),
                });
            }
        }

        Ok(values)
    }
}

fn expand_range(name: &str, range: &ParamRange) -> Result<Vec<ParamValue>, ConfigurationError> {
    let invalid = |message: String| ConfigurationError::InvalidParameterRange {
        name: name.to_string(),
        message,
    };

    if range.step <= Decimal::ZERO {
        return Err(invalid(format!("step must be positive, got {}", range.step)));
    }
    if range.start > range.end {
        return Err(invalid(format!(
            "start {} is after end {}",
            range.start, range.end
        )));
    }

    let count = (range.end - range.start)
        .checked_div(range.step)
        .and_then(|span| span.floor().to_usize())
        .map_or(usize::MAX, |span| span.saturating_add(1));
    if count > MAX_GRID_COMBINATIONS {
        return Err(ConfigurationError::GridTooLarge {
            combinations: count,
            limit: MAX_GRID_COMBINATIONS,
        });
    }

    let integral = range.start.fract().is_zero() && range.step.fract().is_zero();
    let mut values = Vec::with_capacity(count);
    let mut current = range.start;
    while current <= range.end {
        let value = if integral {
            ParamValue::Decimal(current)
                .as_int()
                .map_or(ParamValue::Decimal(current), ParamValue::Int)
        } else {
            ParamValue::Decimal(current.normalize())
        };
        values.push(value);
        // Past Decimal::MAX is past `end`.
        match current.checked_add(range.step) {
            Some(next) => current = next,
            None => break,
        }
    }
    Ok(values)
}

/// A strongly typed parameter space: parameter name → candidate set.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ParameterSpace {
    parameters: BTreeMap<String, ParamDomain>,
}

impl ParameterSpace {
    /// Create a new parameter space builder.
    #[must_use]
    pub fn builder() -> ParameterSpaceBuilder {
        ParameterSpaceBuilder::new()
    }

    /// Parameter names in enumeration order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.parameters.keys().map(String::as_str)
    }

    /// Expand the space into its Cartesian product.
    ///
    /// Names are enumerated in sorted order and each candidate list in its
    /// declared order, with the last name varying fastest. The resulting index
    /// of each combination is stable across runs.
    ///
    /// An empty space is not an error: it expands to a single empty
    /// [`Parameters`], the one candidate of a parameterless strategy. A
    /// parameter with no candidates is rejected with
    /// [`ConfigurationError::EmptyParameterCandidates`].
    pub fn grid(&self) -> Result<Vec<Parameters>, ConfigurationError> {
        let mut expanded = Vec::with_capacity(self.parameters.len());
        let mut total: usize = 1;
        for (name, domain) in &self.parameters {
            let values = domain.expand(name)?;
            total = total.saturating_mul(values.len());
            if total > MAX_GRID_COMBINATIONS {
                return Err(ConfigurationError::GridTooLarge {
                    combinations: total,
                    limit: MAX_GRID_COMBINATIONS,
                });
            }
            expanded.push((name, values));
        }

        let mut result = vec![Parameters::new()];
        for (name, values) in expanded {
            let mut next = Vec::with_capacity(result.len() * values.len());
            for combo in &result {
                for value in &values {
                    next.push(combo.clone().with(name, value.clone()));
                }
            }
            result = next;
        }

        Ok(result)
    }
}

/// Builder for parameter spaces.
#[derive(Debug, Default)]
pub struct ParameterSpaceBuilder {
    parameters: BTreeMap<String, ParamDomain>,
}

impl ParameterSpaceBuilder {
    /// Create a new builder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an explicit candidate list.
    #[must_use]
    pub fn add_values(mut self, name: &str, values: Vec<ParamValue>) -> Self {
        self.parameters
            .insert(name.to_string(), ParamDomain::Values(values));
        self
    }

    /// Add integer parameter values.
    #[must_use]
    pub fn add_int_param(self, name: &str, values: Vec<i64>) -> Self {
        self.add_values(name, values.into_iter().map(ParamValue::Int).collect())
    }

    /// Add decimal parameter values.
    #[must_use]
    pub fn add_decimal_param(self, name: &str, values: Vec<Decimal>) -> Self {
        self.add_values(name, values.into_iter().map(ParamValue::Decimal).collect())
    }

    /// Add categorical parameter values.
    #[must_use]
    pub fn add_text_param(self, name: &str, values: Vec<&str>) -> Self {
        self.add_values(name, values.into_iter().map(ParamValue::from).collect())
    }

    /// Add a parameter range (inclusive).
    #[must_use]
    pub fn add_range(mut self, name: &str, start: Decimal, end: Decimal, step: Decimal) -> Self {
        self.parameters.insert(
            name.to_string(),
            ParamDomain::Range(ParamRange { start, end, step }),
        );
        self
    }

    /// Add an integer parameter range (inclusive).
    #[must_use]
    pub fn add_int_range(self, name: &str, start: i64, end: i64, step: i64) -> Self {
        self.add_range(
            name,
            Decimal::from(start),
            Decimal::from(end),
            Decimal::from(step),
        )
    }

    /// Build the parameter space.
    #[must_use]
    pub fn build(self) -> ParameterSpace {
        ParameterSpace {
            parameters: self.parameters,
        }
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal_macros::dec;

    use super::*;

    #[test]
    fn test_grid_order_is_deterministic() {
        let space = ParameterSpace::builder()
            .add_int_param("slow", vec![30, 20])
            .add_int_param("fast", vec![5, 10])
            .build();

        let grid = space.grid().unwrap();
        let encoded: Vec<String> = grid.iter().map(ToString::to_string).collect();
        assert_eq!(
            encoded,
            vec![
                "fast=5,slow=30",
                "fast=5,slow=20",
                "fast=10,slow=30",
                "fast=10,slow=20",
            ]
        );
    }

    #[test]
    fn test_int_range_is_inclusive() {
        let space = ParameterSpace::builder()
            .add_int_range("period", 10, 50, 10)
            .build();
        let grid = space.grid().unwrap();
        assert_eq!(grid.len(), 5);
        assert_eq!(grid[4].get("period"), Some(&ParamValue::Int(50)));
    }

    #[test]
    fn test_decimal_range() {
        let space = ParameterSpace::builder()
            .add_range("z", dec!(1.0), dec!(2.0), dec!(0.5))
            .build();
        let grid = space.grid().unwrap();
        assert_eq!(grid.len(), 3);
        assert_eq!(grid[1].get("z"), Some(&ParamValue::Decimal(dec!(1.5))));
    }

    #[test]
    fn test_mixed_value_kinds() {
        let space = ParameterSpace::builder()
            .add_text_param("average", vec!["sma", "ema"])
            .add_int_param("period", vec![10])
            .build();
        let grid = space.grid().unwrap();
        assert_eq!(space.names().collect::<Vec<_>>(), vec!["average", "period"]);
        assert_eq!(grid.len(), 2);
        assert_eq!(grid[1].get("average").and_then(ParamValue::as_text), Some("ema"));
    }

    #[test]
    fn test_empty_space_has_single_empty_combination() {
        let grid = ParameterSpace::default().grid().unwrap();
        assert_eq!(grid, vec![Parameters::new()]);
    }

    #[test]
    fn test_empty_candidates_rejected() {
        let space = ParameterSpace::builder().add_int_param("fast", vec![]).build();
        assert_eq!(
            space.grid(),
            Err(ConfigurationError::EmptyParameterCandidates {
                name: "fast".to_string()
            })
        );
    }

    #[test]
    fn test_duplicates_rejected() {
        let space = ParameterSpace::builder()
            .add_int_param("fast", vec![5, 5])
            .build();
        assert!(matches!(
            space.grid(),
            Err(ConfigurationError::DuplicateParameterValue { .. })
        ));
    }

    #[test]
    fn test_bad_ranges_rejected() {
        let zero_step = ParameterSpace::builder()
            .add_int_range("p", 1, 5, 0)
            .build();
        assert!(matches!(
            zero_step.grid(),
            Err(ConfigurationError::InvalidParameterRange { .. })
        ));

        let reversed = ParameterSpace::builder()
            .add_int_range("p", 5, 1, 1)
            .build();
        assert!(matches!(
            reversed.grid(),
            Err(ConfigurationError::InvalidParameterRange { .. })
        ));
    }

    #[test]
    fn test_grid_too_large() {
        let space = ParameterSpace::builder()
            .add_int_range("a", 1, 1000, 1)
            .add_int_range("b", 1, 1000, 1)
            .build();
        assert!(matches!(
            space.grid(),
            Err(ConfigurationError::GridTooLarge { .. })
        ));
    }

    #[test]
    fn test_range_overflowing_decimal_is_too_large() {
        let space = ParameterSpace::builder()
            .add_range("z", dec!(0), Decimal::from(u64::MAX), dec!(0.0000000001))
            .build();
        assert!(matches!(
            space.grid(),
            Err(ConfigurationError::GridTooLarge { .. })
        ));
    }

    #[test]
    fn test_range_near_decimal_max_stops() {
        let space = ParameterSpace::builder()
            .add_range("z", Decimal::MAX - dec!(2), Decimal::MAX, dec!(1))
            .build();
        assert_eq!(space.grid().unwrap().len(), 3);
    }

    #[test]
    fn test_yaml_space() {
        let yaml = "fast: [5, 10]\nslow: {start: 20, end: 40, step: 10}\n";
        let space: ParameterSpace = serde_yaml_bw::from_str(yaml).unwrap();
        assert_eq!(space.grid().unwrap().len(), 6);
    }
}

use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};

use crate::ValidationError;

const MIN_YEARS: u32 = 1;
const MAX_YEARS: u32 = 5;
const DAYS_PER_YEAR: usize = 365;

/// Forecast horizon chosen in whole years.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub struct Horizon(u32);

impl Horizon {
    pub fn years(years: u32) -> Result<Self, ValidationError> {
        if !(MIN_YEARS..=MAX_YEARS).contains(&years) {
            return Err(ValidationError::HorizonOutOfRange {
                value: years,
                min: MIN_YEARS,
                max: MAX_YEARS,
            });
        }
        Ok(Self(years))
    }

    pub const fn as_years(self) -> u32 {
        self.0
    }

    /// Number of future daily periods to predict.
    pub const fn periods(self) -> usize {
        self.0 as usize * DAYS_PER_YEAR
    }
}

impl Default for Horizon {
    fn default() -> Self {
        Self(2)
    }
}

impl Display for Horizon {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}y", self.0)
    }
}

impl TryFrom<u32> for Horizon {
    type Error = ValidationError;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        Self::years(value)
    }
}

impl From<Horizon> for u32 {
    fn from(value: Horizon) -> Self {
        value.0
    }
}

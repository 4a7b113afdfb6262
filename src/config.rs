use std::env;

/// Reward and conversion constants.
///
/// The reward amount for a confirmed pickup is a configured constant, not a
/// computed value. Conversions redeem `points_per_currency_unit` points for
/// one unit of currency.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RewardConfig {
    /// Points credited to the requester when a pickup is confirmed.
    pub pickup_reward_points: u32,
    /// Points redeemed per unit of currency on conversion.
    pub points_per_currency_unit: u32,
}

impl Default for RewardConfig {
    fn default() -> Self {
        Self {
            pickup_reward_points: 50,
            points_per_currency_unit: 10,
        }
    }
}

impl RewardConfig {
    /// Reads overrides from `PICKUP_REWARD_POINTS` and
    /// `POINTS_PER_CURRENCY_UNIT`, falling back to the defaults.
    pub fn load() -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let pickup_reward_points =
            read_points("PICKUP_REWARD_POINTS", defaults.pickup_reward_points)?;
        let points_per_currency_unit =
            read_points("POINTS_PER_CURRENCY_UNIT", defaults.points_per_currency_unit)?;
        if points_per_currency_unit == 0 {
            return Err(ConfigError::ZeroConversionRate);
        }

        Ok(Self {
            pickup_reward_points,
            points_per_currency_unit,
        })
    }

    /// Currency value of `points` at the configured rate.
    pub fn currency_amount(&self, points: u32) -> f64 {
        points as f64 / self.points_per_currency_unit as f64
    }
}

fn read_points(name: &'static str, default: u32) -> Result<u32, ConfigError> {
    match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse::<u32>()
            .map_err(|_| ConfigError::InvalidPoints { name, value: raw }),
        Err(_) => Ok(default),
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{name} must be a non-negative integer, got '{value}'")]
    InvalidPoints { name: &'static str, value: String },

    #[error("POINTS_PER_CURRENCY_UNIT must be greater than zero")]
    ZeroConversionRate,
}

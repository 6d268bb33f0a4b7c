// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2025 Daniel Negri
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program. If not, see <https://www.gnu.org/licenses/>.

//! Lending configuration.
//!
//! Every key is optional; missing keys take the defaults shown below.
//!
//! ```toml
//! [engine]
//! max_books_per_member = 5
//! loan_duration_days = 14
//!
//! [fine]
//! policy = "standard"   # or "student"
//! daily_rate = "0.50"   # overrides the policy's rate
//! ```

use crate::error::ConfigError;
use crate::fine::DailyRateFine;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Business rules enforced by the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EngineConfig {
    /// Maximum number of concurrently active loans per member.
    pub max_books_per_member: usize,
    /// Days a book may be kept before fines start accruing.
    pub loan_duration_days: u32,
}

impl EngineConfig {
    pub const DEFAULT_MAX_BOOKS_PER_MEMBER: usize = 5;
    pub const DEFAULT_LOAN_DURATION_DAYS: u32 = 14;

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_books_per_member == 0 {
            return Err(ConfigError::Invalid(
                "max_books_per_member must be at least 1".into(),
            ));
        }
        Ok(())
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_books_per_member: Self::DEFAULT_MAX_BOOKS_PER_MEMBER,
            loan_duration_days: Self::DEFAULT_LOAN_DURATION_DAYS,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FinePolicy {
    #[default]
    Standard,
    Student,
}

impl FinePolicy {
    pub fn default_rate(self) -> Decimal {
        match self {
            Self::Standard => DailyRateFine::STANDARD_DAILY_RATE,
            Self::Student => DailyRateFine::STUDENT_DAILY_RATE,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FineConfig {
    pub policy: FinePolicy,
    /// Overrides the policy's default daily rate when set.
    pub daily_rate: Option<Decimal>,
}

impl FineConfig {
    pub fn daily_rate(&self) -> Decimal {
        self.daily_rate.unwrap_or_else(|| self.policy.default_rate())
    }

    /// Builds the configured fine calculator.
    pub fn calculator(&self) -> Result<DailyRateFine, ConfigError> {
        DailyRateFine::new(self.daily_rate()).map_err(|e| ConfigError::Invalid(e.to_string()))
    }
}

/// Top-level configuration file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub engine: EngineConfig,
    pub fine: FineConfig,
}

impl Config {
    pub fn from_toml_str(input: &str) -> Result<Self, ConfigError> {
        let config: Config = toml::from_str(input)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let input = std::fs::read_to_string(path)?;
        Self::from_toml_str(&input)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.engine.validate()?;
        self.fine.calculator()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn empty_input_uses_defaults() {
        let config = Config::from_toml_str("").unwrap();
        assert_eq!(config.engine.max_books_per_member, 5);
        assert_eq!(config.engine.loan_duration_days, 14);
        assert_eq!(config.fine.policy, FinePolicy::Standard);
        assert_eq!(config.fine.daily_rate(), dec!(0.50));
    }

    #[test]
    fn parses_full_file() {
        let input = r#"
            [engine]
            max_books_per_member = 3
            loan_duration_days = 21

            [fine]
            policy = "student"
            daily_rate = "0.30"
        "#;
        let config = Config::from_toml_str(input).unwrap();
        assert_eq!(
            config.engine,
            EngineConfig {
                max_books_per_member: 3,
                loan_duration_days: 21,
            }
        );
        assert_eq!(config.fine.policy, FinePolicy::Student);
        assert_eq!(config.fine.calculator().unwrap().daily_rate(), dec!(0.30));
    }

    #[test]
    fn student_policy_default_rate() {
        let config = Config::from_toml_str("[fine]\npolicy = \"student\"\n").unwrap();
        assert_eq!(config.fine.daily_rate(), dec!(0.25));
    }

    #[test]
    fn partial_engine_section_keeps_other_defaults() {
        let config = Config::from_toml_str("[engine]\nloan_duration_days = 7\n").unwrap();
        assert_eq!(config.engine.max_books_per_member, 5);
        assert_eq!(config.engine.loan_duration_days, 7);
    }

    #[test]
    fn zero_borrow_limit_rejected() {
        let err = Config::from_toml_str("[engine]\nmax_books_per_member = 0\n").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn negative_rate_rejected() {
        let err = Config::from_toml_str("[fine]\ndaily_rate = \"-1\"\n").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn unknown_keys_rejected() {
        let err = Config::from_toml_str("[engine]\nmax_loans = 3\n").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = Config::load("/nonexistent/lending.toml").unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }
}

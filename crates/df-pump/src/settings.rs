//! Pump configuration snapshot.

use std::collections::BTreeSet;

use df_core::{Real, ResourceName};
use df_transfer::MatchRules;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{PumpError, PumpResult};

/// Settings read by the pumps on every call; they may change between ticks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PumpSettings {
    /// Base transfer rate (0.1 to 10).
    pub base_rate: Real,
    /// Driving resource drawn per unit transferred (0 to 5).
    pub power_drain: Real,
    /// Colour the two sides while a pump runs.
    pub highlighting: bool,
    /// Ports heat up while transferring.
    pub heating: bool,
    /// Heat gained per tick scale (0.1 to 10).
    pub heating_factor: Real,
    pub ignore: BTreeSet<ResourceName>,
    pub reverse: BTreeSet<ResourceName>,
    /// Port size per unit of part mass.
    pub scale_factor: Real,
    /// Base rate to units per second.
    pub rate_scale: Real,
    /// Heat at or below which the rate is not derated.
    pub cold_threshold: Real,
    /// Heat added to both ports each tick while two linked pumps run.
    pub mutual_heat: Real,
    /// Ticks the link state must hold before it is trusted.
    pub debounce_ticks: u32,
    /// Per-tick total below which the pump stops as drained.
    pub starve_epsilon: Real,
}

impl Default for PumpSettings {
    fn default() -> Self {
        Self {
            base_rate: 1.0,
            power_drain: 0.05,
            highlighting: true,
            heating: true,
            heating_factor: 0.6,
            ignore: BTreeSet::new(),
            reverse: BTreeSet::new(),
            scale_factor: 20.0,
            rate_scale: 400.0,
            cold_threshold: 400.0,
            mutual_heat: 20.0,
            debounce_ticks: 10,
            starve_epsilon: 0.01,
        }
    }
}

fn check_range(what: &str, value: Real, min: Real, max: Real) -> PumpResult<()> {
    if !value.is_finite() || value < min || value > max {
        return Err(PumpError::InvalidSetting {
            what: format!("{what} = {value} (expected {min} to {max})"),
        });
    }
    Ok(())
}

fn check_positive(what: &str, value: Real) -> PumpResult<()> {
    if !value.is_finite() || value <= 0.0 {
        return Err(PumpError::InvalidSetting {
            what: format!("{what} = {value} (must be positive)"),
        });
    }
    Ok(())
}

impl PumpSettings {
    pub fn validate(&self) -> PumpResult<()> {
        check_range("base_rate", self.base_rate, 0.1, 10.0)?;
        check_range("power_drain", self.power_drain, 0.0, 5.0)?;
        check_range("heating_factor", self.heating_factor, 0.1, 10.0)?;
        check_positive("scale_factor", self.scale_factor)?;
        check_positive("rate_scale", self.rate_scale)?;
        check_positive("starve_epsilon", self.starve_epsilon)?;
        check_range("cold_threshold", self.cold_threshold, 0.0, Real::MAX)?;
        check_range("mutual_heat", self.mutual_heat, 0.0, Real::MAX)?;
        if let Some(both) = self.ignore.intersection(&self.reverse).next() {
            return Err(PumpError::InvalidSetting {
                what: format!("resource {both} is both ignored and reversed"),
            });
        }
        Ok(())
    }

    pub fn match_rules(&self) -> MatchRules {
        MatchRules {
            ignore: self.ignore.clone(),
            reverse: self.reverse.clone(),
        }
    }

    /// Fold `"ignore, Name"` / `"reverse, Name"` lines into the lists.
    ///
    /// Malformed lines are logged and skipped.
    pub fn apply_resource_options<'a>(&mut self, lines: impl IntoIterator<Item = &'a str>) {
        for line in lines {
            match parse_resource_option(line) {
                Some(ResourceOption::Ignore(name)) => {
                    self.ignore.insert(name);
                }
                Some(ResourceOption::Reverse(name)) => {
                    self.reverse.insert(name);
                }
                None => warn!(line, "skipping unrecognised resource option"),
            }
        }
    }
}

/// One parsed resource option line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResourceOption {
    Ignore(ResourceName),
    Reverse(ResourceName),
}

/// Parse `"<verb>, <resource>"`. Extra comma-separated fields are ignored.
pub fn parse_resource_option(line: &str) -> Option<ResourceOption> {
    let mut fields = line.split(',').map(str::trim);
    let verb = fields.next()?;
    let name = fields.next().filter(|n| !n.is_empty())?;
    match verb {
        "ignore" => Some(ResourceOption::Ignore(name.into())),
        "reverse" => Some(ResourceOption::Reverse(name.into())),
        _ => None,
    }
}

//! Port heating and rate derating.
//!
//! Heat is tracked in kelvin. A port at or below the cold threshold runs at
//! its base rate; the rate falls linearly to zero as heat approaches the
//! part's maximum temperature.

use df_core::Real;

use crate::settings::PumpSettings;

/// Heat gained in one tick that moved `transferred` units.
pub fn heat_gain(transferred: Real, size: Real, factor: Real) -> Real {
    let load = if size > 0.0 {
        transferred / (size * size)
    } else {
        0.0
    };
    (0.5 + load) * factor
}

/// Rate cap for the current heat, in `[0, base]`.
pub fn derated_rate(base: Real, heat: Real, cold: Real, max_heat: Real) -> Real {
    let span = max_heat - cold;
    if span <= 0.0 {
        return if heat <= cold { base } else { 0.0 };
    }
    (base * (1.0 - (heat - cold) / span)).clamp(0.0, base)
}

/// Heat and derived rate cap of one running port.
#[derive(Debug, Clone, PartialEq)]
pub struct ThermalState {
    heat: Real,
    rate_cap: Real,
    mutual_warned: bool,
}

impl ThermalState {
    pub fn new(heat: Real, base_rate: Real) -> Self {
        Self {
            heat: heat.max(0.0),
            rate_cap: base_rate,
            mutual_warned: false,
        }
    }

    pub fn heat(&self) -> Real {
        self.heat
    }

    pub fn rate_cap(&self) -> Real {
        self.rate_cap
    }

    /// Overwrite heat, e.g. when mirroring the opposite port.
    pub fn set_heat(&mut self, heat: Real) {
        self.heat = heat.max(0.0);
    }

    /// Account for one tick's transfer and recompute the rate cap.
    pub fn after_transfer(
        &mut self,
        transferred: Real,
        size: Real,
        max_heat: Real,
        settings: &PumpSettings,
    ) {
        if !settings.heating {
            self.rate_cap = settings.base_rate;
            return;
        }
        self.heat = (self.heat + heat_gain(transferred, size, settings.heating_factor)).max(0.0);
        self.rate_cap = derated_rate(
            settings.base_rate,
            self.heat,
            settings.cold_threshold,
            max_heat,
        );
    }

    /// Both linked ports are pumping. Returns true the first time.
    pub fn apply_mutual(&mut self, increment: Real) -> bool {
        self.heat += increment;
        !std::mem::replace(&mut self.mutual_warned, true)
    }
}

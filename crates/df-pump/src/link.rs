//! Debounced link-state detection.
//!
//! Hosts report link states that flicker while a connection settles. A state
//! is only trusted after it has been observed unchanged for a fixed number
//! of ticks.

use df_graph::LinkState;

#[derive(Debug, Clone)]
pub struct LinkDebounce {
    delay: u32,
    observed: Option<LinkState>,
    confirmed: Option<LinkState>,
    countdown: u32,
    settling: bool,
}

impl LinkDebounce {
    pub fn new(delay: u32) -> Self {
        Self {
            delay,
            observed: None,
            confirmed: None,
            countdown: 0,
            settling: false,
        }
    }

    /// Connectivity changed somewhere; start the countdown again.
    pub fn notify(&mut self, current: LinkState) {
        self.observed = Some(current);
        self.arm();
    }

    /// Feed the state seen this tick.
    ///
    /// Returns the confirmed state on the tick the countdown expires, even
    /// when it matches the previously confirmed one.
    pub fn tick(&mut self, current: LinkState) -> Option<LinkState> {
        if self.observed != Some(current) {
            self.observed = Some(current);
            self.arm();
            return None;
        }
        if !self.settling {
            return None;
        }
        self.countdown = self.countdown.saturating_sub(1);
        if self.countdown > 0 {
            return None;
        }
        self.settling = false;
        self.confirmed = Some(current);
        Some(current)
    }

    pub fn is_settling(&self) -> bool {
        self.settling
    }

    /// Last trusted state. `None` until the first countdown expires.
    pub fn confirmed(&self) -> Option<LinkState> {
        self.confirmed
    }

    pub fn set_delay(&mut self, delay: u32) {
        self.delay = delay;
    }

    fn arm(&mut self) {
        self.countdown = self.delay.max(1);
        self.settling = true;
    }
}

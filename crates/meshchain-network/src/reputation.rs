//! Per-peer reputation: event-driven score with continuous decay toward
//! neutral.

/// Half-life toward 0.5 is about one day; `k = ln(2) / half_life_seconds`.
pub const DECAY_HALF_LIFE_SECONDS: f64 = 86_400.0;

pub fn decay_rate() -> f64 {
    std::f64::consts::LN_2 / DECAY_HALF_LIFE_SECONDS
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReputationEvent {
    ValidBlock,
    InvalidBlock,
    SyncSuccess,
    SyncFailure,
    DoubleSpendAttempt,
    ConsensusViolation,
    ValidMessage,
    InvalidMessage,
}

impl ReputationEvent {
    pub fn delta(self) -> f64 {
        match self {
            ReputationEvent::ValidBlock => 0.02,
            ReputationEvent::InvalidBlock => -0.10,
            ReputationEvent::SyncSuccess => 0.015,
            ReputationEvent::SyncFailure => -0.03,
            ReputationEvent::DoubleSpendAttempt => -0.20,
            ReputationEvent::ConsensusViolation => -0.15,
            ReputationEvent::ValidMessage => 0.01,
            ReputationEvent::InvalidMessage => -0.05,
        }
    }

    fn touches_messages(self) -> Option<bool> {
        match self {
            ReputationEvent::ValidMessage => Some(true),
            ReputationEvent::InvalidMessage => Some(false),
            _ => None,
        }
    }

    fn touches_blocks(self) -> Option<bool> {
        match self {
            ReputationEvent::ValidBlock => Some(true),
            ReputationEvent::InvalidBlock => Some(false),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Reputation {
    score: f64,
    last_updated: f64,
    total_messages: u64,
    valid_messages: u64,
    total_blocks: u64,
    valid_blocks: u64,
}

impl Reputation {
    pub fn new(now: f64) -> Self {
        Self {
            score: 0.5,
            last_updated: now,
            total_messages: 0,
            valid_messages: 0,
            total_blocks: 0,
            valid_blocks: 0,
        }
    }

    fn apply_decay(&mut self, now: f64) {
        let dt = now - self.last_updated;
        if dt <= 0.0 {
            return;
        }
        let decay = (-decay_rate() * dt).exp();
        self.score = 0.5 + (self.score - 0.5) * decay;
        self.last_updated = now;
    }

    pub fn add_event(&mut self, now: f64, event: ReputationEvent) {
        self.apply_decay(now);
        self.score = (self.score + event.delta()).clamp(0.0, 1.0);
        self.last_updated = now;

        if let Some(valid) = event.touches_messages() {
            self.total_messages += 1;
            if valid {
                self.valid_messages += 1;
            }
        }
        if let Some(valid) = event.touches_blocks() {
            self.total_blocks += 1;
            if valid {
                self.valid_blocks += 1;
            }
        }
    }

    pub fn score(&mut self, now: f64) -> f64 {
        self.apply_decay(now);
        self.score
    }

    /// `0.7 * reputation + 0.3 * validity-ratio`, folding in message then
    /// block validity when samples exist, per spec weights.
    pub fn trustworthiness(&mut self, now: f64) -> f64 {
        let mut trust = self.score(now);
        if self.total_messages > 0 {
            let validity = self.valid_messages as f64 / self.total_messages as f64;
            trust = trust * 0.7 + validity * 0.3;
        }
        if self.total_blocks > 0 {
            let validity = self.valid_blocks as f64 / self.total_blocks as f64;
            trust = trust * 0.7 + validity * 0.3;
        }
        trust.clamp(0.0, 1.0)
    }

    pub fn quality_rating(&mut self, now: f64) -> &'static str {
        let trust = self.trustworthiness(now);
        if trust >= 0.9 {
            "Excellent"
        } else if trust >= 0.7 {
            "Good"
        } else if trust >= 0.5 {
            "Fair"
        } else if trust >= 0.3 {
            "Poor"
        } else {
            "Very Poor"
        }
    }
}

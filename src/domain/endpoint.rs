use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Amount band a collection endpoint is provisioned for. Bands are fixed INR
/// ranges; a request outside 100..=100_000 is rejected before banding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Tier {
    Micro,
    Small,
    Medium,
    Large,
    Xlarge,
}

impl Tier {
    pub fn band_for(amount: i64) -> Option<Tier> {
        match amount {
            100..=999 => Some(Tier::Micro),
            1_000..=4_999 => Some(Tier::Small),
            5_000..=14_999 => Some(Tier::Medium),
            15_000..=49_999 => Some(Tier::Large),
            50_000..=100_000 => Some(Tier::Xlarge),
            _ => None,
        }
    }

    fn ordinal(self) -> i8 {
        match self {
            Tier::Micro => 0,
            Tier::Small => 1,
            Tier::Medium => 2,
            Tier::Large => 3,
            Tier::Xlarge => 4,
        }
    }

    pub fn is_adjacent(self, other: Tier) -> bool {
        (self.ordinal() - other.ordinal()).abs() == 1
    }
}

/// A trader-owned collection endpoint (virtual payment address).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Endpoint {
    pub id: Uuid,
    pub trader_id: String,
    pub upi_address: String,
    pub bank: String,
    pub tier: Tier,
    pub bank_city: Option<String>,
    pub bank_state: Option<String>,
    pub daily_limit: i64,
    pub per_txn_limit: i64,
    /// Rolling success rate, 0..=100.
    pub success_rate: f64,
    /// Committed daily volume, including in-flight reservations.
    pub daily_volume: i64,
    pub active: bool,
    /// Optimistic-concurrency version; bumped on every mutation.
    pub version: u64,
    /// True while a selection holds this endpoint, until its outcome lands.
    pub reserved: bool,
    pub total_txns: u64,
    pub successful_txns: u64,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewEndpoint {
    pub trader_id: String,
    pub upi_address: String,
    pub bank: String,
    pub tier: Tier,
    pub bank_city: Option<String>,
    pub bank_state: Option<String>,
    pub daily_limit: i64,
    pub per_txn_limit: i64,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct EndpointUpdate {
    pub active: Option<bool>,
    pub tier: Option<Tier>,
    pub daily_limit: Option<i64>,
    pub per_txn_limit: Option<i64>,
    pub bank_city: Option<String>,
    pub bank_state: Option<String>,
}

impl Endpoint {
    pub fn from_new(req: NewEndpoint, now: chrono::DateTime<chrono::Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            trader_id: req.trader_id,
            upi_address: req.upi_address,
            bank: req.bank.to_uppercase(),
            tier: req.tier,
            bank_city: req.bank_city,
            bank_state: req.bank_state,
            daily_limit: req.daily_limit,
            per_txn_limit: req.per_txn_limit,
            success_rate: 100.0,
            daily_volume: 0,
            active: true,
            version: 0,
            reserved: false,
            total_txns: 0,
            successful_txns: 0,
            created_at: now,
        }
    }

    /// Capacity check for a candidate amount. Does not consult the breaker.
    pub fn has_capacity_for(&self, amount: i64) -> bool {
        self.active
            && !self.reserved
            && amount <= self.per_txn_limit
            && self.daily_volume + amount <= self.daily_limit
    }
}

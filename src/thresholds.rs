//! Classification boundaries and alert caps.

/// Upper bound (inclusive) of each delay band, in days past the promise.
pub const ON_TIME_MAX_DELAY: f64 = 0.0;
pub const MINOR_MAX_DELAY: f64 = 2.0;
pub const MODERATE_MAX_DELAY: f64 = 5.0;

/// Lower bound (inclusive) of each stock band, as current / reorder level.
pub const LOW_STOCK_RATIO: f64 = 0.5;
pub const NORMAL_STOCK_RATIO: f64 = 0.8;
pub const EXCESS_STOCK_RATIO: f64 = 1.2;

/// Ratings strictly below this count as low.
pub const LOW_RATING: f64 = 3.0;

pub const MAX_CRITICAL_STOCK_ALERTS: usize = 3;
pub const MAX_SEVERE_DELAY_ALERTS: usize = 2;
pub const MAX_HIGH_COST_ROUTE_ALERTS: usize = 3;

/// Issue category used when an order's feedback carries no category at all.
pub const NO_ISSUE_CATEGORY: &str = "None";

pub const CARRIERS_TO_REVIEW: usize = 2;
pub const DELAYED_ROUTES_TO_REROUTE: usize = 5;
pub const EXCESS_ITEMS_TO_LIST: usize = 5;

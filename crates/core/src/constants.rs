/// Synthetic payee receiving market-driven income and expense
pub const MARKET_PAYEE_ID: &str = "MARKET";

/// Synthetic category for security growth
pub const GROWTH_CATEGORY_ID: &str = "MARKET_GROWTH";

/// Synthetic category for currency fluctuation
pub const FLUCTUATION_CATEGORY_ID: &str = "MARKET_FLUCTUATION";

/// Synthetic category for realized gains and losses
pub const REALIZED_GAINS_CATEGORY_ID: &str = "REALIZED_GAINS";

/// Tax-basis aggregate for market-driven money
pub const MARKET_TAX_BASIS_ID: &str = "MARKET";

/// Payee bucket for standard transactions without a payee
pub const UNASSIGNED_PAYEE_ID: &str = "UNASSIGNED";

/// Category bucket for standard transactions without a category
pub const UNCATEGORIZED_ID: &str = "UNCATEGORIZED";

/// Tax-basis bucket for categories without a tax basis
pub const UNASSIGNED_TAX_BASIS_ID: &str = "UNASSIGNED";

/// Decimal precision for ratios
pub const RATIO_PRECISION: u32 = 6;

/// Minor units assumed for currencies missing from the reference data
pub const DEFAULT_MONEY_SCALE: u32 = 2;

/// Quantity threshold for active positions
pub const QUANTITY_THRESHOLD: &str = "0.00000001";

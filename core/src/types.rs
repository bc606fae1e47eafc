//! Typed request parameters for the brokerage API.
//!
//! Every enum carries its wire value via `as_str()` and serde renames, so the
//! same strings are used for query strings and for JSON test vectors. Option
//! structs list every recognized parameter; `None` means the parameter is
//! omitted from the query entirely.

use serde::{Deserialize, Serialize};

use crate::time::Timestamp;

macro_rules! wire_enum {
    ($(#[$meta:meta])* $name:ident { $($variant:ident => $wire:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum $name {
            $(#[serde(rename = $wire)] $variant),+
        }

        impl $name {
            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $wire),+
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

wire_enum! {
    /// Order lifecycle status used to filter order queries.
    OrderStatus {
        AwaitingParentOrder => "AWAITING_PARENT_ORDER",
        AwaitingCondition => "AWAITING_CONDITION",
        AwaitingManualReview => "AWAITING_MANUAL_REVIEW",
        Accepted => "ACCEPTED",
        AwaitingUrOut => "AWAITING_UR_OUT",
        PendingActivation => "PENDING_ACTIVATION",
        Queued => "QUEUED",
        Working => "WORKING",
        Rejected => "REJECTED",
        PendingCancel => "PENDING_CANCEL",
        Canceled => "CANCELED",
        PendingReplace => "PENDING_REPLACE",
        Replaced => "REPLACED",
        Filled => "FILLED",
        Expired => "EXPIRED",
    }
}

wire_enum! {
    /// Extra sections to include in account responses.
    AccountField {
        Positions => "positions",
        Orders => "orders",
    }
}

wire_enum! {
    /// Search mode for instrument lookup.
    Projection {
        SymbolSearch => "symbol-search",
        SymbolRegex => "symbol-regex",
        DescSearch => "desc-search",
        DescRegex => "desc-regex",
        Fundamental => "fundamental",
    }
}

wire_enum! {
    Market {
        Equity => "EQUITY",
        Option => "OPTION",
        Future => "FUTURE",
        Bond => "BOND",
        Forex => "FOREX",
    }
}

wire_enum! {
    /// Index whose top movers are requested.
    MoverIndex {
        Compx => "$COMPX",
        Dji => "$DJI",
        Spx => "$SPX.X",
    }
}

wire_enum! {
    MoverDirection {
        Up => "up",
        Down => "down",
    }
}

wire_enum! {
    MoverChange {
        Value => "value",
        Percent => "percent",
    }
}

wire_enum! {
    ContractType {
        Call => "CALL",
        Put => "PUT",
        All => "ALL",
    }
}

wire_enum! {
    /// Option chain strategy. Anything other than `Single` makes the server
    /// compute an analytical or spread chain.
    OptionStrategy {
        Single => "SINGLE",
        Analytical => "ANALYTICAL",
        Covered => "COVERED",
        Vertical => "VERTICAL",
        Calendar => "CALENDAR",
        Strangle => "STRANGLE",
        Straddle => "STRADDLE",
        Butterfly => "BUTTERFLY",
        Condor => "CONDOR",
        Diagonal => "DIAGONAL",
        Collar => "COLLAR",
        Roll => "ROLL",
    }
}

wire_enum! {
    StrikeRange {
        InTheMoney => "ITM",
        NearTheMoney => "NTM",
        OutOfTheMoney => "OTM",
        StrikesAboveMarket => "SAK",
        StrikesBelowMarket => "SBK",
        StrikesNearMarket => "SNK",
        All => "ALL",
    }
}

wire_enum! {
    ExpirationMonth {
        January => "JAN",
        February => "FEB",
        March => "MAR",
        April => "APR",
        May => "MAY",
        June => "JUN",
        July => "JUL",
        August => "AUG",
        September => "SEP",
        October => "OCT",
        November => "NOV",
        December => "DEC",
        All => "ALL",
    }
}

wire_enum! {
    OptionType {
        Standard => "S",
        NonStandard => "NS",
        All => "ALL",
    }
}

wire_enum! {
    PeriodType {
        Day => "day",
        Month => "month",
        Year => "year",
        YearToDate => "ytd",
    }
}

wire_enum! {
    FrequencyType {
        Minute => "minute",
        Daily => "daily",
        Weekly => "weekly",
        Monthly => "monthly",
    }
}

/// Instrument lookup key as supplied by the caller.
///
/// CUSIPs may carry significant leading zeroes, so only the `Text` form is
/// accepted by `get_instrument`; numeric keys are rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InstrumentKey {
    Text(String),
    Numeric(i128),
}

impl From<&str> for InstrumentKey {
    fn from(s: &str) -> Self {
        InstrumentKey::Text(s.to_string())
    }
}

impl From<String> for InstrumentKey {
    fn from(s: String) -> Self {
        InstrumentKey::Text(s)
    }
}

impl From<&String> for InstrumentKey {
    fn from(s: &String) -> Self {
        InstrumentKey::Text(s.clone())
    }
}

macro_rules! numeric_instrument_key {
    ($($t:ty),+) => {
        $(impl From<$t> for InstrumentKey {
            fn from(n: $t) -> Self {
                InstrumentKey::Numeric(i128::from(n))
            }
        })+
    };
}

numeric_instrument_key!(u32, u64, i32, i64);

/// Filters for order lookups (`get_orders_by_path`, `get_orders_by_query`).
///
/// At most one of `status` and `statuses` may be set.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OrderQuery {
    pub max_results: Option<u32>,
    pub from_entered: Option<Timestamp>,
    pub to_entered: Option<Timestamp>,
    pub status: Option<OrderStatus>,
    pub statuses: Option<Vec<OrderStatus>>,
}

impl OrderQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn max_results(mut self, max_results: u32) -> Self {
        self.max_results = Some(max_results);
        self
    }

    pub fn from_entered(mut self, ts: impl Into<Timestamp>) -> Self {
        self.from_entered = Some(ts.into());
        self
    }

    pub fn to_entered(mut self, ts: impl Into<Timestamp>) -> Self {
        self.to_entered = Some(ts.into());
        self
    }

    pub fn status(mut self, status: OrderStatus) -> Self {
        self.status = Some(status);
        self
    }

    pub fn statuses(mut self, statuses: impl IntoIterator<Item = OrderStatus>) -> Self {
        self.statuses = Some(statuses.into_iter().collect());
        self
    }
}

/// Parameters for `get_option_chain`.
///
/// The enum-valued fields and `include_quotes` are always sent; they default
/// to `ALL` and `false`. The remaining fields are sent only when set.
#[derive(Debug, Clone, PartialEq)]
pub struct OptionChainQuery {
    pub contract_type: ContractType,
    pub strike_count: Option<u32>,
    pub include_quotes: bool,
    pub strategy: Option<OptionStrategy>,
    pub interval: Option<f64>,
    pub strike: Option<f64>,
    pub strike_range: StrikeRange,
    pub from_date: Option<Timestamp>,
    pub to_date: Option<Timestamp>,
    pub volatility: Option<f64>,
    pub underlying_price: Option<f64>,
    pub interest_rate: Option<f64>,
    pub days_to_expiration: Option<u32>,
    pub exp_month: ExpirationMonth,
    pub option_type: OptionType,
}

impl Default for OptionChainQuery {
    fn default() -> Self {
        Self {
            contract_type: ContractType::All,
            strike_count: None,
            include_quotes: false,
            strategy: None,
            interval: None,
            strike: None,
            strike_range: StrikeRange::All,
            from_date: None,
            to_date: None,
            volatility: None,
            underlying_price: None,
            interest_rate: None,
            days_to_expiration: None,
            exp_month: ExpirationMonth::All,
            option_type: OptionType::All,
        }
    }
}

impl OptionChainQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contract_type(mut self, contract_type: ContractType) -> Self {
        self.contract_type = contract_type;
        self
    }

    pub fn strike_count(mut self, count: u32) -> Self {
        self.strike_count = Some(count);
        self
    }

    pub fn include_quotes(mut self, include: bool) -> Self {
        self.include_quotes = include;
        self
    }

    pub fn strategy(mut self, strategy: OptionStrategy) -> Self {
        self.strategy = Some(strategy);
        self
    }

    pub fn interval(mut self, interval: f64) -> Self {
        self.interval = Some(interval);
        self
    }

    pub fn strike(mut self, strike: f64) -> Self {
        self.strike = Some(strike);
        self
    }

    pub fn strike_range(mut self, range: StrikeRange) -> Self {
        self.strike_range = range;
        self
    }

    pub fn from_date(mut self, ts: impl Into<Timestamp>) -> Self {
        self.from_date = Some(ts.into());
        self
    }

    pub fn to_date(mut self, ts: impl Into<Timestamp>) -> Self {
        self.to_date = Some(ts.into());
        self
    }

    pub fn volatility(mut self, volatility: f64) -> Self {
        self.volatility = Some(volatility);
        self
    }

    pub fn underlying_price(mut self, price: f64) -> Self {
        self.underlying_price = Some(price);
        self
    }

    pub fn interest_rate(mut self, rate: f64) -> Self {
        self.interest_rate = Some(rate);
        self
    }

    pub fn days_to_expiration(mut self, days: u32) -> Self {
        self.days_to_expiration = Some(days);
        self
    }

    pub fn exp_month(mut self, month: ExpirationMonth) -> Self {
        self.exp_month = month;
        self
    }

    pub fn option_type(mut self, option_type: OptionType) -> Self {
        self.option_type = option_type;
        self
    }
}

/// Parameters for `get_price_history`. Start and end bounds are sent as
/// epoch milliseconds.
#[derive(Debug, Clone, PartialEq)]
pub struct PriceHistoryQuery {
    pub period_type: PeriodType,
    pub period: Option<u32>,
    pub frequency_type: Option<FrequencyType>,
    pub frequency: u32,
    pub start_date: Option<Timestamp>,
    pub end_date: Option<Timestamp>,
    pub need_extended_hours_data: bool,
}

impl Default for PriceHistoryQuery {
    fn default() -> Self {
        Self {
            period_type: PeriodType::Day,
            period: None,
            frequency_type: None,
            frequency: 1,
            start_date: None,
            end_date: None,
            need_extended_hours_data: false,
        }
    }
}

impl PriceHistoryQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn period_type(mut self, period_type: PeriodType) -> Self {
        self.period_type = period_type;
        self
    }

    pub fn period(mut self, periods: u32) -> Self {
        self.period = Some(periods);
        self
    }

    pub fn frequency_type(mut self, frequency_type: FrequencyType) -> Self {
        self.frequency_type = Some(frequency_type);
        self
    }

    pub fn frequency(mut self, frequency: u32) -> Self {
        self.frequency = frequency;
        self
    }

    pub fn start_date(mut self, ts: impl Into<Timestamp>) -> Self {
        self.start_date = Some(ts.into());
        self
    }

    pub fn end_date(mut self, ts: impl Into<Timestamp>) -> Self {
        self.end_date = Some(ts.into());
        self
    }

    pub fn need_extended_hours_data(mut self, extended: bool) -> Self {
        self.need_extended_hours_data = extended;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wire_values_match_api() {
        assert_eq!(OrderStatus::AwaitingUrOut.as_str(), "AWAITING_UR_OUT");
        assert_eq!(MoverIndex::Spx.as_str(), "$SPX.X");
        assert_eq!(Projection::DescRegex.as_str(), "desc-regex");
        assert_eq!(PeriodType::YearToDate.to_string(), "ytd");
    }

    #[test]
    fn enums_deserialize_from_wire_values() {
        let status: OrderStatus = serde_json::from_str(r#""PENDING_CANCEL""#).unwrap();
        assert_eq!(status, OrderStatus::PendingCancel);
        let market: Market = serde_json::from_str(r#""FOREX""#).unwrap();
        assert_eq!(market, Market::Forex);
    }

    #[test]
    fn instrument_key_from_text_and_numbers() {
        assert_eq!(InstrumentKey::from("00123"), InstrumentKey::Text("00123".into()));
        assert_eq!(InstrumentKey::from(123u32), InstrumentKey::Numeric(123));
        assert_eq!(InstrumentKey::from(-5i64), InstrumentKey::Numeric(-5));
    }

    #[test]
    fn option_chain_defaults_are_all() {
        let q = OptionChainQuery::default();
        assert_eq!(q.contract_type, ContractType::All);
        assert_eq!(q.strike_range, StrikeRange::All);
        assert_eq!(q.exp_month, ExpirationMonth::All);
        assert_eq!(q.option_type, OptionType::All);
        assert!(!q.include_quotes);
        assert!(q.days_to_expiration.is_none());
    }

    #[test]
    fn price_history_defaults() {
        let q = PriceHistoryQuery::default();
        assert_eq!(q.period_type, PeriodType::Day);
        assert_eq!(q.frequency, 1);
        assert!(!q.need_extended_hours_data);
    }

    #[test]
    fn order_query_setters_collect_statuses_in_order() {
        let q = OrderQuery::new()
            .max_results(5)
            .statuses([OrderStatus::Filled, OrderStatus::Accepted]);
        assert_eq!(q.max_results, Some(5));
        assert_eq!(
            q.statuses,
            Some(vec![OrderStatus::Filled, OrderStatus::Accepted])
        );
        assert!(q.status.is_none());
    }
}

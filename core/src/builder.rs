//! Stateless request builder for the TD Ameritrade REST API.
//!
//! # Design
//! `RequestBuilder` holds the base URL, credentials and a clock, and never
//! mutates them after construction. Each `build_*` method validates its
//! arguments, then produces a fresh `HttpRequest`. Validation always happens
//! first, so a rejected call never yields a partial request.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use serde::Serialize;
use url::form_urlencoded;

use crate::config::{ClientConfig, Credentials};
use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest};
use crate::time::{Clock, SystemClock, Timestamp};
use crate::types::{
    AccountField, InstrumentKey, Market, MoverChange, MoverDirection, MoverIndex,
    OptionChainQuery, OrderQuery, PriceHistoryQuery, Projection,
};

/// Builds `HttpRequest` values for every supported API operation.
#[derive(Clone)]
pub struct RequestBuilder {
    base_url: String,
    credentials: Credentials,
    clock: Arc<dyn Clock>,
}

impl fmt::Debug for RequestBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RequestBuilder")
            .field("base_url", &self.base_url)
            .field("credentials", &self.credentials)
            .finish_non_exhaustive()
    }
}

impl RequestBuilder {
    pub fn new(config: ClientConfig) -> Self {
        Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            credentials: config.credentials,
            clock: Arc::new(SystemClock),
        }
    }

    /// Replace the clock used for default `toEnteredTime` bounds.
    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Arc::new(clock);
        self
    }

    /// A copy of this builder scoped to a different account.
    pub fn with_account(&self, account_id: impl Into<String>) -> Self {
        Self {
            base_url: self.base_url.clone(),
            credentials: Credentials::new(self.credentials.api_key(), Some(account_id.into())),
            clock: Arc::clone(&self.clock),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    // -----------------------------------------------------------------------
    // Orders
    // -----------------------------------------------------------------------

    pub fn build_cancel_order(&self, order_id: u64) -> Result<HttpRequest, ApiError> {
        let path = format!("/v1/accounts/{}/orders/{order_id}", self.account_id()?);
        Ok(self.finish(HttpRequest::new(HttpMethod::Delete, &self.base_url, path)))
    }

    pub fn build_get_order(&self, order_id: u64) -> Result<HttpRequest, ApiError> {
        let path = format!("/v1/accounts/{}/orders/{order_id}", self.account_id()?);
        Ok(self.finish(HttpRequest::new(HttpMethod::Get, &self.base_url, path)))
    }

    /// Orders for the configured account.
    pub fn build_get_orders_by_path(&self, query: &OrderQuery) -> Result<HttpRequest, ApiError> {
        let path = format!("/v1/accounts/{}/orders", self.account_id()?);
        let params = self.order_query(query)?;
        Ok(self.finish(HttpRequest::new(HttpMethod::Get, &self.base_url, path).with_query(params)))
    }

    /// Orders across all linked accounts.
    pub fn build_get_orders_by_query(&self, query: &OrderQuery) -> Result<HttpRequest, ApiError> {
        let params = self.order_query(query)?;
        let path = "/v1/orders".to_string();
        Ok(self.finish(HttpRequest::new(HttpMethod::Get, &self.base_url, path).with_query(params)))
    }

    pub fn build_place_order<O: Serialize>(&self, order: &O) -> Result<HttpRequest, ApiError> {
        let path = format!("/v1/accounts/{}/orders", self.account_id()?);
        self.json_request(HttpMethod::Post, path, order)
    }

    /// Replace an existing order. The old order is canceled and a new one
    /// created from `order`.
    pub fn build_replace_order<O: Serialize>(
        &self,
        order_id: u64,
        order: &O,
    ) -> Result<HttpRequest, ApiError> {
        let path = format!("/v1/accounts/{}/orders/{order_id}", self.account_id()?);
        self.json_request(HttpMethod::Post, path, order)
    }

    // -----------------------------------------------------------------------
    // Saved orders
    // -----------------------------------------------------------------------

    pub fn build_create_saved_order<O: Serialize>(&self, order: &O) -> Result<HttpRequest, ApiError> {
        let path = format!("/v1/accounts/{}/savedorders", self.account_id()?);
        self.json_request(HttpMethod::Post, path, order)
    }

    pub fn build_delete_saved_order(&self, order_id: u64) -> Result<HttpRequest, ApiError> {
        let path = format!("/v1/accounts/{}/savedorders/{order_id}", self.account_id()?);
        Ok(self.finish(HttpRequest::new(HttpMethod::Delete, &self.base_url, path)))
    }

    pub fn build_get_saved_order(&self, order_id: u64) -> Result<HttpRequest, ApiError> {
        let path = format!("/v1/accounts/{}/savedorders/{order_id}", self.account_id()?);
        Ok(self.finish(HttpRequest::new(HttpMethod::Get, &self.base_url, path)))
    }

    pub fn build_get_saved_orders_by_path(&self) -> Result<HttpRequest, ApiError> {
        let path = format!("/v1/accounts/{}/savedorders", self.account_id()?);
        Ok(self.finish(HttpRequest::new(HttpMethod::Get, &self.base_url, path)))
    }

    pub fn build_replace_saved_order<O: Serialize>(
        &self,
        order_id: u64,
        order: &O,
    ) -> Result<HttpRequest, ApiError> {
        let path = format!("/v1/accounts/{}/savedorders/{order_id}", self.account_id()?);
        self.json_request(HttpMethod::Put, path, order)
    }

    // -----------------------------------------------------------------------
    // Accounts
    // -----------------------------------------------------------------------

    pub fn build_get_account(&self, fields: &[AccountField]) -> Result<HttpRequest, ApiError> {
        let path = format!("/v1/accounts/{}", self.account_id()?);
        let mut params = QueryParams::new();
        params.set_list("fields", fields);
        Ok(self.finish(HttpRequest::new(HttpMethod::Get, &self.base_url, path).with_query(params.into_map())))
    }

    pub fn build_get_accounts(&self, fields: &[AccountField]) -> HttpRequest {
        let mut params = QueryParams::new();
        params.set_list("fields", fields);
        let path = "/v1/accounts".to_string();
        self.finish(HttpRequest::new(HttpMethod::Get, &self.base_url, path).with_query(params.into_map()))
    }

    // -----------------------------------------------------------------------
    // Instruments
    // -----------------------------------------------------------------------

    pub fn build_search_instruments(&self, symbol: &str, projection: Projection) -> HttpRequest {
        let mut params = self.keyed_params();
        params.set("symbol", symbol).set("projection", projection);
        self.get("/v1/instruments".to_string(), params)
    }

    /// Look up an instrument by CUSIP. Numeric keys are rejected since they
    /// cannot carry leading zeroes.
    pub fn build_get_instrument(
        &self,
        cusip: impl Into<InstrumentKey>,
    ) -> Result<HttpRequest, ApiError> {
        let cusip = match cusip.into() {
            InstrumentKey::Text(cusip) => cusip,
            InstrumentKey::Numeric(n) => {
                tracing::warn!(cusip = %n, "rejected numeric CUSIP");
                return Err(ApiError::invalid_argument(
                    "CUSIPs must be passed as strings to preserve leading zeroes",
                ));
            }
        };
        Ok(self.get(format!("/v1/instruments/{}", segment(&cusip)), self.keyed_params()))
    }

    // -----------------------------------------------------------------------
    // Market hours
    // -----------------------------------------------------------------------

    pub fn build_get_hours_for_multiple_markets(
        &self,
        markets: &[Market],
        date: impl Into<Timestamp>,
    ) -> HttpRequest {
        let mut params = self.keyed_params();
        params
            .set("markets", join(markets))
            .set("date", date.into().to_iso_string());
        self.get("/v1/marketdata/hours".to_string(), params)
    }

    pub fn build_get_hours_for_single_market(
        &self,
        market: Market,
        date: impl Into<Timestamp>,
    ) -> HttpRequest {
        let mut params = self.keyed_params();
        params.set("date", date.into().to_iso_string());
        self.get(format!("/v1/marketdata/{market}/hours"), params)
    }

    // -----------------------------------------------------------------------
    // Movers
    // -----------------------------------------------------------------------

    pub fn build_get_movers(
        &self,
        index: MoverIndex,
        direction: MoverDirection,
        change: MoverChange,
    ) -> HttpRequest {
        let mut params = self.keyed_params();
        params.set("direction", direction).set("change", change);
        self.get(format!("/v1/marketdata/{index}/movers"), params)
    }

    // -----------------------------------------------------------------------
    // Option chains
    // -----------------------------------------------------------------------

    /// Non-finite prices or rates are rejected.
    pub fn build_get_option_chain(
        &self,
        symbol: &str,
        query: &OptionChainQuery,
    ) -> Result<HttpRequest, ApiError> {
        for (name, value) in [
            ("interval", query.interval),
            ("strike", query.strike),
            ("volatility", query.volatility),
            ("underlyingPrice", query.underlying_price),
            ("interestRate", query.interest_rate),
        ] {
            if let Some(v) = value.filter(|v| !v.is_finite()) {
                tracing::warn!(param = name, value = %v, "rejected non-finite option chain value");
                return Err(ApiError::invalid_argument(format!("{name} must be finite, got {v}")));
            }
        }

        let mut params = self.keyed_params();
        params
            .set("symbol", symbol)
            .set("includeQuotes", query.include_quotes)
            .set("contractType", query.contract_type)
            .set("range", query.strike_range)
            .set("expMonth", query.exp_month)
            .set("optionType", query.option_type);

        params
            .set_opt("strikeCount", query.strike_count)
            .set_opt("strategy", query.strategy)
            .set_opt("interval", query.interval)
            .set_opt("strike", query.strike)
            .set_opt("fromDate", query.from_date.map(|ts| ts.to_iso_string()))
            .set_opt("toDate", query.to_date.map(|ts| ts.to_iso_string()))
            .set_opt("volatility", query.volatility)
            .set_opt("underlyingPrice", query.underlying_price)
            .set_opt("interestRate", query.interest_rate)
            .set_opt("daysToExpiration", query.days_to_expiration);

        Ok(self.get("/v1/marketdata/chains".to_string(), params))
    }

    // -----------------------------------------------------------------------
    // Price history
    // -----------------------------------------------------------------------

    pub fn build_get_price_history(&self, symbol: &str, query: &PriceHistoryQuery) -> HttpRequest {
        let mut params = self.keyed_params();
        params
            .set("symbol", symbol)
            .set("periodType", query.period_type)
            .set("frequency", query.frequency)
            .set("needExtendedHoursData", query.need_extended_hours_data)
            .set_opt("period", query.period)
            .set_opt("frequencyType", query.frequency_type)
            .set_opt("startDate", query.start_date.map(|ts| ts.to_epoch_millis()))
            .set_opt("endDate", query.end_date.map(|ts| ts.to_epoch_millis()));

        self.get(format!("/v1/marketdata/{}/pricehistory", segment(symbol)), params)
    }

    // -----------------------------------------------------------------------
    // Quotes
    // -----------------------------------------------------------------------

    pub fn build_get_quote(&self, symbol: &str) -> HttpRequest {
        self.get(format!("/v1/marketdata/{}/quotes", segment(symbol)), self.keyed_params())
    }

    pub fn build_get_quotes<I, S>(&self, symbols: I) -> HttpRequest
    where
        I: IntoIterator<Item = S>,
        S: fmt::Display,
    {
        let mut params = self.keyed_params();
        params.set("symbol", join(symbols));
        self.get("/v1/marketdata/quotes".to_string(), params)
    }

    // -----------------------------------------------------------------------
    // Helpers
    // -----------------------------------------------------------------------

    fn account_id(&self) -> Result<String, ApiError> {
        self.credentials.account_id().map(segment).ok_or_else(|| {
            tracing::warn!("account-scoped operation on a client without an account id");
            ApiError::invalid_state("client initialized without account ID")
        })
    }

    fn keyed_params(&self) -> QueryParams {
        let mut params = QueryParams::new();
        params.set("apikey", self.credentials.api_key());
        params
    }

    fn order_query(&self, query: &OrderQuery) -> Result<BTreeMap<String, String>, ApiError> {
        if query.status.is_some() && query.statuses.is_some() {
            tracing::warn!("order query set both status and statuses");
            return Err(ApiError::invalid_argument(
                "at most one of status or statuses may be set",
            ));
        }

        let from = query.from_entered.unwrap_or_else(Timestamp::earliest);
        let to = query.to_entered.unwrap_or_else(|| self.clock.now());

        let mut params = QueryParams::new();
        params
            .set("fromEnteredTime", from.to_iso_string())
            .set("toEnteredTime", to.to_iso_string())
            .set_opt("maxResults", query.max_results)
            .set_opt("status", query.status);
        if let Some(statuses) = &query.statuses {
            params.set_list("status", statuses);
        }
        Ok(params.into_map())
    }

    fn json_request<O: Serialize>(
        &self,
        method: HttpMethod,
        path: String,
        order: &O,
    ) -> Result<HttpRequest, ApiError> {
        let body = serde_json::to_value(order).map_err(|e| ApiError::Serialization(e.to_string()))?;
        Ok(self.finish(HttpRequest::new(method, &self.base_url, path).with_json(body)))
    }

    fn get(&self, path: String, params: QueryParams) -> HttpRequest {
        self.finish(HttpRequest::new(HttpMethod::Get, &self.base_url, path).with_query(params.into_map()))
    }

    fn finish(&self, request: HttpRequest) -> HttpRequest {
        tracing::debug!(
            method = %request.method,
            path = %request.path,
            params = ?loggable_params(&request.query),
            "built request"
        );
        request
    }
}

/// Query parameters as a string map. Unset optional values never produce a
/// key, and empty lists are dropped.
#[derive(Debug, Default)]
struct QueryParams(BTreeMap<String, String>);

impl QueryParams {
    fn new() -> Self {
        Self::default()
    }

    fn set(&mut self, key: &str, value: impl ToString) -> &mut Self {
        self.0.insert(key.to_string(), value.to_string());
        self
    }

    fn set_opt<V: ToString>(&mut self, key: &str, value: Option<V>) -> &mut Self {
        if let Some(value) = value {
            self.set(key, value);
        }
        self
    }

    fn set_list<V: fmt::Display>(&mut self, key: &str, values: &[V]) -> &mut Self {
        if !values.is_empty() {
            self.set(key, join(values));
        }
        self
    }

    fn into_map(self) -> BTreeMap<String, String> {
        self.0
    }
}

/// Percent-encode a caller-supplied value for use as one path segment, so
/// `/`, `?` and `#` cannot change the endpoint.
fn segment(value: &str) -> String {
    // byte_serialize only emits `+` for a space; a literal `+` becomes `%2B`.
    form_urlencoded::byte_serialize(value.as_bytes())
        .collect::<String>()
        .replace('+', "%20")
}

/// Comma-join values, preserving order.
fn join<I, S>(values: I) -> String
where
    I: IntoIterator<Item = S>,
    S: fmt::Display,
{
    values
        .into_iter()
        .map(|v| v.to_string())
        .collect::<Vec<_>>()
        .join(",")
}

fn loggable_params(query: &BTreeMap<String, String>) -> Vec<(&str, &str)> {
    query
        .iter()
        .filter(|(k, _)| k.as_str() != "apikey")
        .map(|(k, v)| (k.as_str(), v.as_str()))
        .collect()
}

//! `TdaClient`: a `RequestBuilder` paired with an injected `Transport`.
//!
//! Every operation builds its request first and only then calls the
//! transport, so validation errors never reach the network. Responses come
//! back as raw `HttpResponse` values.

use std::fmt;

use serde::Serialize;

use crate::builder::RequestBuilder;
use crate::config::ClientConfig;
use crate::error::ApiError;
use crate::http::{HttpRequest, HttpResponse};
use crate::time::{Clock, Timestamp};
use crate::transport::Transport;
use crate::types::{
    AccountField, InstrumentKey, Market, MoverChange, MoverDirection, MoverIndex,
    OptionChainQuery, OrderQuery, PriceHistoryQuery, Projection,
};

/// Client for the TD Ameritrade REST API.
#[derive(Debug, Clone)]
pub struct TdaClient<T> {
    builder: RequestBuilder,
    transport: T,
}

impl<T: Transport> TdaClient<T> {
    pub fn new(config: ClientConfig, transport: T) -> Self {
        Self::from_builder(RequestBuilder::new(config), transport)
    }

    pub fn from_builder(builder: RequestBuilder, transport: T) -> Self {
        Self { builder, transport }
    }

    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.builder = self.builder.with_clock(clock);
        self
    }

    pub fn builder(&self) -> &RequestBuilder {
        &self.builder
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    fn send(&self, request: HttpRequest) -> Result<HttpResponse, ApiError> {
        self.transport.execute(&request)
    }

    // Orders

    pub fn cancel_order(&self, order_id: u64) -> Result<HttpResponse, ApiError> {
        self.send(self.builder.build_cancel_order(order_id)?)
    }

    pub fn get_order(&self, order_id: u64) -> Result<HttpResponse, ApiError> {
        self.send(self.builder.build_get_order(order_id)?)
    }

    pub fn get_orders_by_path(&self, query: &OrderQuery) -> Result<HttpResponse, ApiError> {
        self.send(self.builder.build_get_orders_by_path(query)?)
    }

    pub fn get_orders_by_query(&self, query: &OrderQuery) -> Result<HttpResponse, ApiError> {
        self.send(self.builder.build_get_orders_by_query(query)?)
    }

    pub fn place_order<O: Serialize>(&self, order: &O) -> Result<HttpResponse, ApiError> {
        self.send(self.builder.build_place_order(order)?)
    }

    pub fn replace_order<O: Serialize>(&self, order_id: u64, order: &O) -> Result<HttpResponse, ApiError> {
        self.send(self.builder.build_replace_order(order_id, order)?)
    }

    // Saved orders

    pub fn create_saved_order<O: Serialize>(&self, order: &O) -> Result<HttpResponse, ApiError> {
        self.send(self.builder.build_create_saved_order(order)?)
    }

    pub fn delete_saved_order(&self, order_id: u64) -> Result<HttpResponse, ApiError> {
        self.send(self.builder.build_delete_saved_order(order_id)?)
    }

    pub fn get_saved_order(&self, order_id: u64) -> Result<HttpResponse, ApiError> {
        self.send(self.builder.build_get_saved_order(order_id)?)
    }

    pub fn get_saved_orders_by_path(&self) -> Result<HttpResponse, ApiError> {
        self.send(self.builder.build_get_saved_orders_by_path()?)
    }

    pub fn replace_saved_order<O: Serialize>(
        &self,
        order_id: u64,
        order: &O,
    ) -> Result<HttpResponse, ApiError> {
        self.send(self.builder.build_replace_saved_order(order_id, order)?)
    }

    // Accounts

    pub fn get_account(&self, fields: &[AccountField]) -> Result<HttpResponse, ApiError> {
        self.send(self.builder.build_get_account(fields)?)
    }

    pub fn get_accounts(&self, fields: &[AccountField]) -> Result<HttpResponse, ApiError> {
        self.send(self.builder.build_get_accounts(fields))
    }

    // Instruments

    pub fn search_instruments(&self, symbol: &str, projection: Projection) -> Result<HttpResponse, ApiError> {
        self.send(self.builder.build_search_instruments(symbol, projection))
    }

    pub fn get_instrument(&self, cusip: impl Into<InstrumentKey>) -> Result<HttpResponse, ApiError> {
        self.send(self.builder.build_get_instrument(cusip)?)
    }

    // Market hours

    pub fn get_hours_for_multiple_markets(
        &self,
        markets: &[Market],
        date: impl Into<Timestamp>,
    ) -> Result<HttpResponse, ApiError> {
        self.send(self.builder.build_get_hours_for_multiple_markets(markets, date))
    }

    pub fn get_hours_for_single_market(
        &self,
        market: Market,
        date: impl Into<Timestamp>,
    ) -> Result<HttpResponse, ApiError> {
        self.send(self.builder.build_get_hours_for_single_market(market, date))
    }

    // Movers, option chains, price history, quotes

    pub fn get_movers(
        &self,
        index: MoverIndex,
        direction: MoverDirection,
        change: MoverChange,
    ) -> Result<HttpResponse, ApiError> {
        self.send(self.builder.build_get_movers(index, direction, change))
    }

    pub fn get_option_chain(&self, symbol: &str, query: &OptionChainQuery) -> Result<HttpResponse, ApiError> {
        self.send(self.builder.build_get_option_chain(symbol, query)?)
    }

    pub fn get_price_history(&self, symbol: &str, query: &PriceHistoryQuery) -> Result<HttpResponse, ApiError> {
        self.send(self.builder.build_get_price_history(symbol, query))
    }

    pub fn get_quote(&self, symbol: &str) -> Result<HttpResponse, ApiError> {
        self.send(self.builder.build_get_quote(symbol))
    }

    pub fn get_quotes<I, S>(&self, symbols: I) -> Result<HttpResponse, ApiError>
    where
        I: IntoIterator<Item = S>,
        S: fmt::Display,
    {
        self.send(self.builder.build_get_quotes(symbols))
    }
}

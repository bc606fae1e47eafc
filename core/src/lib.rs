//! Request builder and thin client for the TD Ameritrade REST API.
//!
//! # Overview
//! `RequestBuilder` turns typed operation arguments into `HttpRequest`
//! values without touching the network. `TdaClient` pairs a builder with an
//! injected `Transport` that performs the round-trip and returns the raw
//! `HttpResponse`.
//!
//! # Design
//! - The builder is immutable after construction; the only outside input is
//!   the clock, read when an order query has no upper time bound.
//! - Argument validation (`InvalidArgument`, `InvalidState`) runs before a
//!   request exists, so rejected calls have no side effects.
//! - Optional parameters are omitted unless set; list parameters are
//!   comma-joined in caller order.
//! - Response bodies and status codes are never interpreted.

pub mod builder;
pub mod client;
pub mod config;
pub mod error;
pub mod http;
pub mod time;
pub mod transport;
pub mod types;

pub use builder::RequestBuilder;
pub use client::TdaClient;
pub use config::{ClientConfig, Credentials, DEFAULT_BASE_URL};
pub use error::ApiError;
pub use http::{HttpMethod, HttpRequest, HttpResponse};
pub use time::{Clock, FixedClock, SystemClock, Timestamp};
pub use transport::Transport;
#[cfg(feature = "ureq")]
pub use transport::UreqTransport;
pub use types::{
    AccountField, ContractType, ExpirationMonth, FrequencyType, InstrumentKey, Market,
    MoverChange, MoverDirection, MoverIndex, OptionChainQuery, OptionStrategy, OptionType,
    OrderQuery, OrderStatus, PeriodType, PriceHistoryQuery, Projection, StrikeRange,
};

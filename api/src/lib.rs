pub mod client;
pub mod endpoints;
pub mod live;
pub mod params;
pub mod stats;

pub use client::{
    ApiError, ApiResult, ClientConfig, HostLogger, NbaApi, RawResponse, RequestContext,
    LIVE_BASE_URL, STATS_BASE_URL,
};
pub use endpoints::{
    find_endpoint, EndpointDescriptor, ParamSpec, Presence, StatsEndpoint, STATS_ENDPOINTS,
};
pub use params::{current_season, Params, LEAGUE_ID_NBA};
pub use stats::{Cell, ResultSet, RowMap, StatsResponse};

/// Re-exported so callers can build a [`RequestContext`] without depending
/// on tokio-util themselves.
pub use tokio_util::sync::CancellationToken;

pub mod chart;
pub mod config;
pub mod demo_feed;
pub mod export;
pub mod forecast;
pub mod fpl_fetch;
pub mod http_cache;
pub mod http_client;
pub mod optimizer;
pub mod pipeline;
pub mod provider;
pub mod state;

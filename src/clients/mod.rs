// Chain client modules

pub mod chain;
pub mod http_gateway;

pub use chain::{ChainClient, StakeRequest, SubmitOptions, SubmitOutcome};
pub use http_gateway::HttpChainClient;

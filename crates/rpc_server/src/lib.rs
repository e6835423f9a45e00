//! # RPC Server
//!
//! JSON-lines TCP transport in front of the vehicle registry.
//!
//! 负责：
//! - 接受 TCP 连接，每个连接一个独立任务
//! - 一行一个请求 / 一行一个响应
//! - 按 vehicle 名称路由到 `VehicleApi`，只做路由与编解码
//! - 单个连接的错误不影响其他连接

pub mod config;
pub mod connection;
pub mod error;
pub mod metrics;
pub mod request;
pub mod router;
pub mod server;

pub use config::ServerConfig;
pub use connection::handle_connection;
pub use error::RpcError;
pub use metrics::{ServerMetrics, ServerMetricsSnapshot};
pub use request::{ErrorBody, Operation, ResponseBody, RpcRequest, RpcResponse};
pub use router::{RequestRouter, SERVER_VERSION};
pub use server::{RpcServer, ServerHandle};

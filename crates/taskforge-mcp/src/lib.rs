pub mod catalog;
pub mod coerce;
pub mod dispatch;
pub mod jsonrpc;
pub mod prompts;
pub mod registry;
pub mod resources;
pub mod schema;

pub use dispatch::{DispatchError, Dispatcher, PROTOCOL_VERSION};
pub use jsonrpc::{JsonRpcError, JsonRpcRequest, JsonRpcResponse};
pub use registry::{ToolDefinition, ToolRegistry};

mod health;
mod rest;
mod rpc;
mod sse;
mod ws;

pub use health::health;
pub use rest::{
    create_project, create_task, delete_project, delete_task, get_project, get_task,
    list_projects, list_tasks, update_project, update_task,
};
pub use rpc::{rpc, rpc_info};
pub use sse::{mcp_sse, sse_message};
pub use ws::mcp_ws;

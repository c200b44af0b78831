// MCP (Model Context Protocol) transport for the vetta checks
// Exposes each check as a named tool to agent clients over JSON-RPC

pub mod protocol;
pub mod server;
pub mod tools;

pub use server::McpServer;
pub use tools::ToolRegistry;

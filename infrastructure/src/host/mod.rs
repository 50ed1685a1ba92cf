//! Host-side adapter: the stdio JSON-RPC server exposing the bridge tools.

mod protocol;
mod server;

pub use protocol::{
    HostMethod, HostProtocolError, IncomingMessage, JsonRpcResponseOut, PROTOCOL_VERSION,
    RpcError, initialize_result, tool_call_result, tool_listing,
};
pub use server::{DEFAULT_CALLER, StdioHostServer};

//! MCP server implementation.
//!
//! Provides both stdio (for desktop MCP clients) and HTTP transports.

pub mod stdio;
pub mod transport;

use std::net::SocketAddr;
use std::sync::Arc;

use crate::client::CatalogClient;
use crate::tools::{self, McpTool, ToolContext};

/// MCP server for the Harvard Library catalog.
pub struct McpServer {
    /// Tool execution context.
    ctx: ToolContext,

    /// Registered tools.
    tools: Vec<Box<dyn McpTool>>,
}

impl McpServer {
    /// Create a new MCP server.
    #[must_use]
    pub fn new(client: CatalogClient) -> Self {
        Self::with_context(ToolContext::new(Arc::new(client)))
    }

    /// Create a server around an existing context.
    #[must_use]
    pub fn with_context(ctx: ToolContext) -> Self {
        Self { ctx, tools: tools::register_all_tools() }
    }

    /// Run the server in stdio mode.
    ///
    /// # Errors
    ///
    /// Returns error on I/O failure.
    pub async fn run_stdio(self) -> anyhow::Result<()> {
        tracing::info!("Starting MCP server in stdio mode");
        tracing::info!("Registered {} tools", self.tools.len());

        stdio::run_stdio(self.tools, self.ctx).await
    }

    /// Run the server in HTTP mode.
    ///
    /// # Errors
    ///
    /// Returns error on server failure.
    pub async fn run_http(self, host: [u8; 4], port: u16) -> anyhow::Result<()> {
        tracing::info!("Starting MCP server in HTTP mode on port {}", port);
        tracing::info!("Registered {} tools", self.tools.len());

        let router = transport::create_router(self.tools, self.ctx);
        let addr = SocketAddr::from((host, port));

        tracing::info!("HTTP server listening on http://{}", addr);

        let listener = tokio::net::TcpListener::bind(addr).await?;
        axum::serve(listener, router).with_graceful_shutdown(shutdown_signal()).await?;

        tracing::info!("HTTP server shut down");
        Ok(())
    }

    /// Get tool by name.
    #[must_use]
    pub fn get_tool(&self, name: &str) -> Option<&dyn McpTool> {
        self.tools.iter().find(|t| t.name() == name).map(AsRef::as_ref)
    }

    /// List all available tools.
    #[must_use]
    pub fn list_tools(&self) -> Vec<(&str, &str)> {
        self.tools.iter().map(|t| (t.name(), t.description())).collect()
    }

    /// Get tool context for execution.
    #[must_use]
    pub const fn context(&self) -> &ToolContext {
        &self.ctx
    }
}

impl std::fmt::Debug for McpServer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("McpServer").field("tools", &self.tools.len()).finish()
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to install Ctrl-C handler");
        std::future::pending::<()>().await;
    }
    tracing::info!("Received shutdown signal");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;

    fn server() -> McpServer {
        McpServer::new(CatalogClient::new(Config::for_testing("http://127.0.0.1:9")).unwrap())
    }

    #[test]
    fn test_server_registers_tools() {
        let server = server();
        assert_eq!(server.list_tools().len(), 11);
        assert!(server.get_tool("parse_mods_metadata").is_some());
        assert!(server.get_tool("no_such_tool").is_none());
        assert!(server.context().deadline.is_none());
    }
}

//! MCP control server
//!
//! A single read-only tool, `autoapproved_tools`, backed by the Claude Desktop
//! config loaded at startup.

use crate::desktop_config::DesktopConfig;
use rmcp::{
    handler::server::tool::{ToolCallContext, ToolRouter},
    handler::server::wrapper::Parameters,
    handler::server::ServerHandler,
    model::{Implementation, ProtocolVersion, ServerCapabilities, ServerInfo},
    service::{RequestContext, RoleServer},
    tool, Json, ServiceExt,
};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info};

pub const TOOL_NAME: &str = "autoapproved_tools";

#[derive(Debug, Serialize, Deserialize, JsonSchema, Clone, PartialEq, Eq)]
pub struct AutoapprovedTools {
    /// Tool names Claude Desktop runs without asking, in config order.
    pub tools: Vec<String>,
}

#[derive(Clone)]
pub struct AutoApproveMcpServer {
    config: Arc<DesktopConfig>,
    tool_router: ToolRouter<Self>,
}

#[rmcp::tool_router(router = tool_router)]
impl AutoApproveMcpServer {
    pub fn new(config: Arc<DesktopConfig>) -> Self {
        Self {
            config,
            tool_router: Self::tool_router(),
        }
    }

    /// Trusted tool list straight from the config; nothing is cached here.
    pub fn autoapproved_tools(&self) -> Vec<String> {
        self.config.trusted_tools()
    }

    #[tool(
        name = "autoapproved_tools",
        description = "List of tools that are auto-approved by Claude Desktop."
    )]
    pub async fn autoapproved_tools_tool(
        &self,
        _params: Parameters<()>,
    ) -> Result<Json<AutoapprovedTools>, String> {
        let tools = self.autoapproved_tools();
        debug!("returning {} auto-approved tools", tools.len());
        Ok(Json(AutoapprovedTools { tools }))
    }

    pub async fn run(self) -> Result<(), Box<dyn std::error::Error>> {
        info!("Auto-approve MCP server ready (stdio transport)");
        let transport = (tokio::io::stdin(), tokio::io::stdout());
        self.serve(transport).await?.waiting().await?;
        Ok(())
    }
}

impl ServerHandler for AutoApproveMcpServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::default(),
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation {
                name: "autoapprove-mcp".to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
                title: Some("Claude Auto-Approve MCP".to_string()),
                icons: None,
                website_url: None,
                description: None,
            },
            instructions: Some(
                "This MCP is for automatically injecting the auto-approve script into the Claude Desktop app."
                    .to_string(),
            ),
        }
    }

    async fn list_tools(
        &self,
        _request: Option<rmcp::model::PaginatedRequestParam>,
        _context: RequestContext<RoleServer>,
    ) -> Result<rmcp::model::ListToolsResult, rmcp::ErrorData> {
        Ok(rmcp::model::ListToolsResult {
            tools: self.tool_router.list_all(),
            next_cursor: None,
            meta: None,
        })
    }

    async fn call_tool(
        &self,
        request: rmcp::model::CallToolRequestParam,
        context: RequestContext<RoleServer>,
    ) -> Result<rmcp::model::CallToolResult, rmcp::ErrorData> {
        if !self.tool_router.has_route(&request.name) {
            return Err(rmcp::ErrorData::invalid_params(
                format!("Unknown tool: {}", request.name),
                None,
            ));
        }
        let tool_context = ToolCallContext::new(self, request, context);
        self.tool_router.call(tool_context).await
    }
}

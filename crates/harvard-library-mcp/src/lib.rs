//! Harvard Library MCP Server
//!
//! A Model Context Protocol (MCP) server for the Harvard LibraryCloud Item API.
//! Lets LLM agents search the Harvard Library catalog and read full
//! bibliographic records.
//!
//! # Features
//!
//! - **11 MCP Tools**: keyword, field, collection, date range, geographic and
//!   advanced search, record details, collections list, local MODS parsing
//! - **Rate-limited**: one token-bucket budget shared by every request
//! - **Retrying**: bounded exponential backoff with jitter, honouring `Retry-After`
//! - **Normalized**: JSON envelopes and MODS XML become one record shape,
//!   with partial parses reported instead of failing the whole response
//!
//! # Example
//!
//! ```no_run
//! use harvard_library_mcp::{client::CatalogClient, config::Config, search};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::from_env()?;
//!     let client = CatalogClient::new(config)?;
//!
//!     let query = search::by_author("Melville, Herman", search::Paging::new(5, 0))?;
//!     let result = client.search(&query).await?;
//!     println!("{} of {} records", result.len(), result.total_count);
//!     Ok(())
//! }
//! ```

pub mod client;
pub mod config;
pub mod error;
pub mod formatters;
pub mod models;
pub mod normalize;
pub mod search;
pub mod server;
pub mod tools;

pub use client::CatalogClient;
pub use config::Config;
pub use error::{ClientError, ErrorKind, ToolError};

//! # NetWalk
//!
//! Async SSH crawler for ALU OmniSwitch 6450 and 7705 SAR networks.
//!
//! NetWalk logs into a set of seed entrypoints, identifies each device,
//! pulls its inventory, follows the AMAP neighbor tables outward hop by hop
//! and finally infers a parent/child tree over everything it found.
//!
//! ## Features
//!
//! - Async SSH sessions via russh, with one- and two-hop relay chains
//! - Credential scoring shared across every target of a crawl
//! - OmniSwitch inventory parsing (ports, VLANs, modules, routes, ARP, AMAP, DHCP)
//! - Root, upstream port and real-root detection from routes, MAC and ARP tables
//! - Leaf devices synthesized from learned MACs, named through an OUI database
//! - XML input and output documents
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use netwalk::{CrawlConfig, CrawlSession, Crawler, InputDocument, PlatformRegistry, SshRunner};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let session = Arc::new(CrawlSession::new());
//!     let config = CrawlConfig::default();
//!     let input = InputDocument::load("input.xml", &session, config.default_ssh_port)?;
//!
//!     let crawler = Crawler::new(
//!         SshRunner::new(None)?,
//!         config,
//!         PlatformRegistry::builtin()?,
//!         session.clone(),
//!     );
//!
//!     let mut results = Vec::new();
//!     for target in input.targets {
//!         results.push(crawler.burrow(target, input.members.clone()).await);
//!     }
//!     netwalk::document::write_file("output.xml", &results, &session.events())?;
//!     Ok(())
//! }
//! ```

pub mod channel;
pub mod config;
pub mod crawl;
pub mod document;
pub mod element;
pub mod error;
pub mod oui;
pub mod parse;
pub mod payload;
pub mod platform;
pub mod session;
pub mod target;
pub mod topology;
pub mod transport;

pub use config::CrawlConfig;
pub use crawl::Crawler;
pub use document::InputDocument;
pub use element::{AssocNe, CrawlResult, NetworkElement};
pub use error::Error;
pub use oui::OuiDatabase;
pub use platform::{PlatformDefinition, PlatformRegistry};
pub use session::{CrawlSession, Event};
pub use target::{AuthPossibility, Entrypoint, Member, Target};
pub use transport::{HostKeyPolicy, SessionRunner, SshRunner};

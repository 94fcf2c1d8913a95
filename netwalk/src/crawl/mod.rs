//! The crawl: priming entrypoints, building NEs and expanding through
//! neighbor tables round by round.
//!
//! A [`Crawler`] owns the session runner, tunables and platform tables for
//! one invocation. [`Crawler::burrow`] runs rounds until the hop depth,
//! round ceiling or deadline is reached, or a round yields no new
//! entrypoints, then hands the registry to topology inference.
//!
//! Within a round, entries may be handled concurrently (see
//! [`CrawlConfig::parallelism`]). Every task returns its own entry or NE
//! and the crawler merges them in input order, so the registry only ever
//! has one writer.

pub mod auth;
mod builder;
pub mod classify;
pub mod deadline;
mod expand;
pub mod reach;

#[cfg(test)]
pub(crate) mod testing;

use std::sync::Arc;

use futures_util::stream::{self, StreamExt};
use log::{debug, info};

use crate::config::CrawlConfig;
use crate::element::{CrawlResult, NetworkElement};
use crate::oui::OuiDatabase;
use crate::platform::PlatformRegistry;
use crate::session::CrawlSession;
use crate::target::{AuthPool, Entrypoint, Member, Target};
use crate::topology;
use crate::transport::SessionRunner;

pub use builder::{build_advanced, create_base};
pub use deadline::Deadline;
pub use expand::{link_amaps_to_ne, next_target, remote_hosts_to_entrypoints};
pub use reach::{primer_brain, primer_driver};

/// Borrowed view of everything a crawl step needs.
pub struct Context<'a, R> {
    pub runner: &'a R,
    pub config: &'a CrawlConfig,
    pub registry: &'a PlatformRegistry,
    pub session: &'a CrawlSession,
    pub deadline: Deadline,
}

impl<'a, R> Context<'a, R> {
    pub fn new(
        runner: &'a R,
        config: &'a CrawlConfig,
        registry: &'a PlatformRegistry,
        session: &'a CrawlSession,
        deadline: Deadline,
    ) -> Self {
        Self {
            runner,
            config,
            registry,
            session,
            deadline,
        }
    }
}

impl<R> Clone for Context<'_, R> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<R> Copy for Context<'_, R> {}

/// Runs crawls against one session runner.
pub struct Crawler<R> {
    runner: R,
    config: CrawlConfig,
    registry: PlatformRegistry,
    session: Arc<CrawlSession>,
    oui: Option<OuiDatabase>,
}

impl<R: SessionRunner> Crawler<R> {
    pub fn new(runner: R, config: CrawlConfig, registry: PlatformRegistry, session: Arc<CrawlSession>) -> Self {
        Self {
            runner,
            config,
            registry,
            session,
            oui: None,
        }
    }

    /// Resolve MAC-named NEs to manufacturer names after inference.
    pub fn with_oui(mut self, oui: OuiDatabase) -> Self {
        self.oui = Some(oui);
        self
    }

    pub fn session(&self) -> &Arc<CrawlSession> {
        &self.session
    }

    pub fn config(&self) -> &CrawlConfig {
        &self.config
    }

    /// Crawl outward from `target` and infer the topology of everything
    /// found.
    pub async fn burrow(&self, target: Target, members: Vec<Member>) -> CrawlResult {
        let deadline = Deadline::after(self.config.deadline);
        let ctx = Context::new(&self.runner, &self.config, &self.registry, &self.session, deadline);
        let mut result = CrawlResult::new(target.id.clone(), members);
        let mut target = target;
        let mut rounds = 0;

        loop {
            rounds += 1;
            if rounds > self.config.max_crawl_rounds {
                debug!("stopping after {} crawl rounds", self.config.max_crawl_rounds);
                break;
            }
            if target.hopdepth > self.config.max_crawl_depth {
                debug!(
                    "target {} hop depth {} is past the maximum of {}",
                    target.id, target.hopdepth, self.config.max_crawl_depth
                );
                break;
            }
            if target.entrypoints.is_empty() {
                debug!("target {} has no entrypoints, crawl is complete", target.id);
                break;
            }
            if deadline.expired() {
                self.session.event(
                    "burrow",
                    format!(
                        "Crawl deadline reached. {} entrypoints of target {} will not be crawled.",
                        target.entrypoints.len(),
                        target.id
                    ),
                );
                break;
            }
            if rounds > 1 {
                result.target_ids.push(target.id.clone());
            }
            info!(
                "round {}: target {} at hop depth {} with {} entrypoints",
                rounds,
                target.id,
                target.hopdepth,
                target.entrypoints.len()
            );

            let entries = std::mem::take(&mut target.entrypoints);
            target.entrypoints = prime_target(&ctx, &target.auths, entries).await;

            let round_start = result.loo_ne.len();
            let built = init_nes(&ctx, &target).await;
            result.loo_ne.extend(built);
            link_amaps_to_ne(&mut result.loo_ne);

            target = next_target(
                &target,
                &result.loo_ne[round_start..],
                &self.session,
                self.config.default_ssh_port,
            );
        }

        topology::pecking_order(&mut result, &self.session, self.oui.as_ref());
        self.session.event(
            "burrow",
            format!("Created {} Network Element Objects", result.loo_ne.len()),
        );
        result
    }
}

/// Prime every entry of a round. Entries come back in input order.
async fn prime_target<R: SessionRunner>(
    ctx: &Context<'_, R>,
    auths: &AuthPool,
    entries: Vec<Entrypoint>,
) -> Vec<Entrypoint> {
    let parallelism = ctx.config.parallelism.max(1);
    stream::iter(entries)
        .map(|mut entry| async move {
            primer_brain(ctx, auths, &mut entry).await;
            entry
        })
        .buffered(parallelism)
        .collect()
        .await
}

/// Build an NE for every primed entry of `target`, in entry order.
async fn init_nes<R: SessionRunner>(ctx: &Context<'_, R>, target: &Target) -> Vec<NetworkElement> {
    let parallelism = ctx.config.parallelism.max(1);
    stream::iter(target.entrypoints.iter().filter(|e| e.primersuccess))
        .map(|entry| async move {
            let mut ne = create_base(ctx, entry);
            build_advanced(ctx, &target.auths, &mut ne).await;
            ctx.session
                .event("init_nes", format!("Crawled NE object:::{}", ne.summary()));
            ne
        })
        .buffered(parallelism)
        .collect()
        .await
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use pretty_assertions::assert_eq;

    use super::*;
    use crate::crawl::testing::Scripted;
    use crate::platform::vendors::alu_omniswitch::DISCOVERY_COMMANDS;
    use crate::target::AuthPossibility;

    fn primer(hostname: &str) -> Vec<String> {
        vec![
            "-> show system".to_string(),
            "  Description:  Alcatel-Lucent OS6450-P10 6.7.2.191.R04 GA,".to_string(),
            format!("  Name:         {hostname},"),
            "->".to_string(),
        ]
    }

    /// A complete discovery pull with a chassis MAC, an interface address,
    /// a default route, up ports with their learned MACs and the given
    /// neighbor blocks.
    fn discovery(mac: &str, address: &str, gateway: &str, ports: &[(&str, &str)], amap: &[String]) -> Vec<String> {
        let mut out = Vec::new();
        for command in DISCOVERY_COMMANDS {
            out.push(format!("-> {command}"));
            match *command {
                "show interfaces" => {
                    for (slotport, _) in ports {
                        out.push(format!(" Slot/Port  {slotport} :"));
                        out.push("  Operational Status     : up,".into());
                    }
                }
                "show mac-address-table" => {
                    for (slotport, learned) in ports {
                        out.push(format!("    10    {learned}   learned   0800   bridging   {slotport}"));
                    }
                }
                "show chassis" => out.push(format!("  MAC Address:                   {mac},")),
                "show ip router database" => {
                    out.push(format!(" 0.0.0.0/0         {gateway}  mgmt       STATIC        1   0"))
                }
                "show ip interface" => out.push(format!(
                    "mgmt                  {address}     255.255.255.0   UP      NO   vlan 10"
                )),
                "show amap" => {
                    out.extend(amap.iter().cloned());
                    out.push(String::new());
                }
                _ => out.push(String::new()),
            }
        }
        out.push("->".into());
        out
    }

    fn neighbor(hostname: &str, local_port: &str, mac: &str, ip: &str) -> Vec<String> {
        vec![
            format!("Remote Host '{hostname}' On Port {local_port} Vlan 10:"),
            "  Remote Host Device      = OS6450-P10,".to_string(),
            format!("  Remote Base MAC         = {mac},"),
            "  Remote Interface        = 1/25,".to_string(),
            "  Remote Vlan             = 10,".to_string(),
            "  Remote IP(s):".to_string(),
            format!("   {ip}"),
        ]
    }

    fn crawler(runner: Scripted, config: CrawlConfig) -> Crawler<Scripted> {
        Crawler::new(
            runner,
            config.without_sleeps().with_min_discovery_lines(10),
            PlatformRegistry::builtin().unwrap(),
            Arc::new(CrawlSession::new()),
        )
    }

    fn seed(ip: &str) -> Target {
        Target::new(
            "1",
            vec![AuthPossibility::new("1", "admin", "switch")],
            vec![Entrypoint::new("e1", ip, 22)],
        )
    }

    #[tokio::test]
    async fn test_single_switch() {
        let runner = Scripted::default()
            .with_primer("10.0.0.1", primer("sw-1"))
            .with_discovery("10.0.0.1", discovery("aa:aa:aa:aa:aa:01", "10.0.0.1", "10.0.0.254", &[], &[]));
        let crawler = crawler(runner, CrawlConfig::default());

        let result = crawler.burrow(seed("10.0.0.1"), vec![]).await;

        assert_eq!(result.loo_ne.len(), 1);
        let ne = &result.loo_ne[0];
        assert_eq!(ne.hostname, "sw-1");
        assert_eq!(ne.typestring, "scs");
        assert!(ne.typecrawled);
        assert!(ne.isroot);
        assert_eq!(result.target_ids, vec!["1"]);
        assert_eq!(
            crawler.session().messages().last().map(String::as_str),
            Some("Created 1 Network Element Objects")
        );
    }

    #[tokio::test]
    async fn test_expands_through_neighbors() {
        let root_amap = neighbor("sw-2", "1/2", "aa:aa:aa:aa:aa:02", "10.0.0.2");
        let leaf_amap = neighbor("sw-1", "1/25", "aa:aa:aa:aa:aa:01", "10.0.0.1");
        let runner = Scripted::default()
            .with_primer("10.0.0.1", primer("sw-1"))
            .with_discovery(
                "10.0.0.1",
                discovery("aa:aa:aa:aa:aa:01", "10.0.0.1", "10.0.0.254", &[("1/2", "aa:aa:aa:aa:aa:02")], &root_amap),
            )
            .with_primer("10.0.0.2", primer("sw-2"))
            .with_discovery(
                "10.0.0.2",
                discovery("aa:aa:aa:aa:aa:02", "10.0.0.2", "10.0.0.1", &[("1/25", "aa:aa:aa:aa:aa:01")], &leaf_amap),
            );
        let crawler = crawler(runner, CrawlConfig::default().with_parallelism(2));

        let result = crawler.burrow(seed("10.0.0.1"), vec![]).await;

        let hostnames: Vec<&str> = result.loo_ne.iter().map(|ne| ne.hostname.as_str()).collect();
        assert_eq!(hostnames, vec!["sw-1", "sw-2"]);
        assert_eq!(result.target_ids.len(), 2);

        let leaf = &result.loo_ne[1];
        assert!(
            crawler
                .runner
                .seen()
                .iter()
                .filter(|s| s.ip == "10.0.0.2")
                .all(|s| s.hops == 1)
        );
        assert_eq!(leaf.upstream_slotport, "1/25");
        assert!(leaf.islowestchild);

        let root = &result.loo_ne[0];
        assert!(root.isroot);
        assert_eq!(root.children.len(), 1);
        assert_eq!(root.children[0].id, leaf.id);
        assert_eq!(root.children[0].slotport, "1/2");
    }

    #[tokio::test]
    async fn test_unreachable_seed_yields_empty_registry() {
        let crawler = crawler(Scripted::default(), CrawlConfig::default());
        let result = crawler.burrow(seed("10.0.0.9"), vec![]).await;

        assert!(result.loo_ne.is_empty());
        assert!(
            crawler
                .session()
                .messages()
                .iter()
                .any(|m| m.starts_with("Entrypoint IP Unreachable"))
        );
    }

    #[tokio::test]
    async fn test_deadline_stops_crawl_and_keeps_inference() {
        let root_amap = neighbor("sw-2", "1/2", "aa:aa:aa:aa:aa:02", "10.0.0.2");
        let runner = Scripted::default()
            .with_primer("10.0.0.1", primer("sw-1"))
            .with_discovery(
                "10.0.0.1",
                discovery("aa:aa:aa:aa:aa:01", "10.0.0.1", "10.0.0.254", &[("1/2", "aa:aa:aa:aa:aa:02")], &root_amap),
            )
            .with_primer("10.0.0.2", primer("sw-2"))
            .with_delay("10.0.0.2", Duration::from_secs(5));
        let crawler = crawler(runner, CrawlConfig::default().with_deadline(Duration::from_millis(300)));

        let result = crawler.burrow(seed("10.0.0.1"), vec![]).await;

        let hostnames: Vec<&str> = result.loo_ne.iter().map(|ne| ne.hostname.as_str()).collect();
        assert_eq!(hostnames, vec!["sw-1"]);
        assert!(result.loo_ne[0].isroot);
        assert!(!result.textmap.is_empty());

        let messages = crawler.session().messages();
        assert!(
            messages
                .iter()
                .any(|m| m.starts_with("Crawl deadline reached while priming Entry ID:") && m.contains("10.0.0.2"))
        );
        assert_eq!(
            messages.last().map(String::as_str),
            Some("Created 1 Network Element Objects")
        );
    }

    #[tokio::test]
    async fn test_depth_limit() {
        let root_amap = neighbor("sw-2", "1/2", "aa:aa:aa:aa:aa:02", "10.0.0.2");
        let runner = Scripted::default()
            .with_primer("10.0.0.1", primer("sw-1"))
            .with_discovery(
                "10.0.0.1",
                discovery("aa:aa:aa:aa:aa:01", "10.0.0.1", "10.0.0.254", &[("1/2", "aa:aa:aa:aa:aa:02")], &root_amap),
            );
        let crawler = crawler(runner, CrawlConfig::default().with_max_crawl_depth(0));

        let result = crawler.burrow(seed("10.0.0.1"), vec![]).await;

        assert_eq!(result.loo_ne.len(), 1);
        assert!(crawler.runner.seen().iter().all(|s| s.ip == "10.0.0.1"));
    }
}

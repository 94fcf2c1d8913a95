//! Building NEs from primed entrypoints.

use chrono::Local;
use log::debug;

use super::Context;
use super::classify::classify;
use super::reach::script_for;
use crate::element::{IpAddress, NetworkElement};
use crate::parse::{self, omniswitch, segment};
use crate::platform::{detect_hostname, detect_type};
use crate::target::{AuthPossibility, Entrypoint};
use crate::transport::{SessionRunner, SessionScript};

/// Basic NE from a primed entrypoint: id, detected type and hostname, the
/// entry IP and the credential that worked.
pub fn create_base<R>(ctx: &Context<'_, R>, entry: &Entrypoint) -> NetworkElement {
    let func = "create_base_ne";
    let typestring = detect_type(ctx.registry, &entry.primer_output);
    let hostname = detect_hostname(ctx.registry, &entry.primer_output);

    let ne = NetworkElement {
        typestring,
        hostname,
        ips: vec![IpAddress::new(entry.ip.clone())],
        source_entry: Some(entry.clone()),
        auth_id: entry.auth.clone(),
        hopcount: entry.hopcount,
        ..NetworkElement::new(ctx.session.next_ne_id())
    };

    ctx.session.event(
        func,
        format!(
            "Entry ID: {} with Entry IP: {}: Detected as type '{}', hostname: '{}'",
            entry.id, entry.ip, ne.typestring, ne.hostname
        ),
    );
    ctx.session
        .event(func, format!("Created NE object:::{}", ne.summary()));
    ne
}

/// How a data grab ended.
#[derive(Debug, PartialEq, Eq)]
enum Grab {
    /// The last transcript pulled, long enough or not.
    Output(Vec<String>),

    /// The crawl deadline passed.
    Cancelled,

    /// The entry's credential is no longer in the pool.
    NoCredential,
}

/// Run discovery until the transcript is long enough to parse, or give up
/// after `max_grab_attempts`.
async fn grab_data<R: SessionRunner>(
    ctx: &Context<'_, R>,
    auths: &[AuthPossibility],
    entry: &mut Entrypoint,
    commands: &[String],
) -> Grab {
    let func = "data_grabber";
    let timeout = ctx.config.discovery_timeout;
    let mut output = Vec::new();

    for attempt in 1..=ctx.config.max_grab_attempts {
        let Some(script) = script_for(auths, entry, |hops| {
            SessionScript::discovery(hops, commands.to_vec(), timeout)
        }) else {
            return Grab::NoCredential;
        };
        debug!("discovery attempt {} for entry {} via {}", attempt, entry.id, script.route());
        let Some(pulled) = ctx.deadline.run(ctx.runner.run(&script)).await else {
            return Grab::Cancelled;
        };
        output = pulled;

        let outcome = classify(&output);
        if outcome.bad_host_keys {
            ctx.session
                .event(func, "Bad SSH hostkeys detected, deleting known_hosts...");
            ctx.runner.forget_host_keys().await;
        } else if outcome.retry_later {
            ctx.session.event(
                func,
                format!("NE not ready. Sleeping {} seconds.", ctx.config.retry_sleep.as_secs()),
            );
            if !ctx.deadline.sleep(ctx.config.retry_sleep).await {
                return Grab::Cancelled;
            }
        } else if output.len() < ctx.config.min_discovery_lines {
            debug!(
                "discovery output of {} lines is under the minimum of {}, trying again",
                output.len(),
                ctx.config.min_discovery_lines
            );
            if !ctx.deadline.sleep(ctx.config.retry_sleep).await {
                return Grab::Cancelled;
            }
        } else {
            return Grab::Output(output);
        }
    }
    debug!("data grabber reached {} attempts", ctx.config.max_grab_attempts);
    Grab::Output(output)
}

/// Pull and parse the type payload for `ne`, retrying incomplete pulls up
/// to `max_pull_attempts`. Types without a payload builder stay basic.
pub async fn build_advanced<R: SessionRunner>(
    ctx: &Context<'_, R>,
    auths: &[AuthPossibility],
    ne: &mut NetworkElement,
) {
    let Some(platform) = ctx
        .registry
        .get(&ne.typestring)
        .filter(|p| p.builds_payload)
    else {
        debug!("payload builder for type '{}' not written yet, NE {} stays basic", ne.typestring, ne.id);
        return;
    };
    let Some(mut entry) = ne.source_entry.take() else {
        debug!("NE {} has no source entry to pull from", ne.id);
        return;
    };

    let mut attempts = 0;
    loop {
        attempts += 1;
        let output = match grab_data(ctx, auths, &mut entry, &platform.discovery_commands).await {
            Grab::Output(output) => output,
            Grab::Cancelled => {
                ctx.session.event(
                    "build_advanced_ne",
                    format!("Crawl deadline reached while pulling data for NE ID: '{}'. Keeping partial data.", ne.id),
                );
                ne.badpull = true;
                break;
            }
            Grab::NoCredential => {
                ctx.session.event(
                    "build_advanced_ne",
                    format!(
                        "No credential '{}' in the auth pool to pull data for NE ID: '{}'. Keeping partial data.",
                        entry.auth, ne.id
                    ),
                );
                ne.badpull = true;
                break;
            }
        };
        ne.pulltimestamp = Some(Local::now());

        ne.badpull = false;
        let seg = segment(&output, &platform.discovery_commands);
        ne.badpull = seg.badpull;

        let abandon = ne.badpull && attempts >= ctx.config.max_pull_attempts;
        if !ne.badpull || abandon {
            if let Some(payload) = parse::build_payload(&ne.typestring, &seg, ctx.session) {
                ne.macs.push(omniswitch::chassis_identity(&payload));
                ne.payload = Some(payload);
                ne.typecrawled = !ne.badpull;
            }
        }
        if abandon {
            ctx.session.event(
                "build_advanced_ne",
                format!("Tried {} times and still couldn't get a good data pull. Abandoning.", attempts),
            );
        }
        if !ne.badpull || abandon {
            break;
        }
        debug!("NE {} pull {} was incomplete ({} sections)", ne.id, attempts, seg.successcount);
    }
    ne.source_entry = Some(entry);
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::config::CrawlConfig;
    use crate::crawl::deadline::Deadline;
    use crate::crawl::testing::{Scripted, lines};
    use crate::platform::PlatformRegistry;
    use crate::platform::vendors::alu_omniswitch::DISCOVERY_COMMANDS;
    use crate::session::CrawlSession;
    use crate::transport::script::NEED_TO_WAIT;

    fn fixture() -> (CrawlConfig, PlatformRegistry, CrawlSession) {
        (
            CrawlConfig::default().without_sleeps().with_min_discovery_lines(10),
            PlatformRegistry::builtin().unwrap(),
            CrawlSession::new(),
        )
    }

    fn primed_entry(primer: &[&str]) -> Entrypoint {
        let mut entry = Entrypoint::new("1", "10.0.0.1", 22);
        entry.primersuccess = true;
        entry.primer_output = lines(primer);
        entry
    }

    /// Echo every discovery command, with chassis and route bodies.
    fn full_capture() -> Vec<String> {
        let mut out = Vec::new();
        for command in DISCOVERY_COMMANDS {
            out.push(format!("-> {command}"));
            match *command {
                "show chassis" => {
                    out.push("  MAC Address:                   e8:e7:32:a3:06:dc,".into());
                }
                "show ip router database" => {
                    out.push(" 0.0.0.0/0         10.0.0.254  mgmt       STATIC        1   0".into());
                }
                _ => out.push(String::new()),
            }
        }
        out.push("->".into());
        out
    }

    fn partial_capture() -> Vec<String> {
        let mut out = full_capture();
        out.truncate(20);
        out
    }

    const SCS_PRIMER: &[&str] = &[
        "-> show system",
        "  Description:  Alcatel-Lucent OS6450-P10 6.7.2.191.R04 GA,",
        "  Name:         cell-site-12,",
    ];

    #[test]
    fn test_create_base() {
        let (config, registry, session) = fixture();
        let runner = Scripted::default();
        let ctx = Context::new(&runner, &config, &registry, &session, Deadline::none());

        let ne = create_base(&ctx, &primed_entry(SCS_PRIMER));
        assert_eq!(ne.id, "2");
        assert_eq!(ne.typestring, "scs");
        assert_eq!(ne.hostname, "cell-site-12");
        assert_eq!(ne.ips[0].address, "10.0.0.1");
        assert_eq!(ne.source_entry_id(), "1");
        assert_eq!(
            session.messages(),
            vec![
                "Entry ID: 1 with Entry IP: 10.0.0.1: Detected as type 'scs', hostname: 'cell-site-12'",
                "Created NE object:::NE ID: '2', NE Type: 'scs', NE Hostname: 'cell-site-12'::: from source Entry ID: '1'",
            ]
        );
    }

    #[tokio::test]
    async fn test_build_advanced_good_pull() {
        let (config, registry, session) = fixture();
        let runner = Scripted::new(&[]).with_discovery("10.0.0.1", full_capture());
        let ctx = Context::new(&runner, &config, &registry, &session, Deadline::none());
        let auths = vec![AuthPossibility::new("1", "admin", "switch")];

        let mut ne = create_base(&ctx, &primed_entry(SCS_PRIMER));
        build_advanced(&ctx, &auths, &mut ne).await;

        assert!(!ne.badpull);
        assert!(ne.typecrawled);
        assert_eq!(ne.macs, vec!["e8:e7:32:a3:06:dc"]);
        assert_eq!(ne.default_gateway(), Some("10.0.0.254"));
        assert!(ne.source_entry.is_some());
        assert_eq!(runner.seen().len(), 1);
    }

    #[tokio::test]
    async fn test_build_advanced_retries_short_and_not_ready_output() {
        let (config, registry, session) = fixture();
        let runner = Scripted::new(&[])
            .with_discovery("10.0.0.1", lines(&[NEED_TO_WAIT]))
            .with_discovery("10.0.0.1", lines(&["->", "->"]))
            .with_discovery("10.0.0.1", full_capture());
        let ctx = Context::new(&runner, &config, &registry, &session, Deadline::none());
        let auths = vec![AuthPossibility::new("1", "admin", "switch")];

        let mut ne = create_base(&ctx, &primed_entry(SCS_PRIMER));
        build_advanced(&ctx, &auths, &mut ne).await;

        assert!(ne.typecrawled);
        assert_eq!(runner.seen().len(), 3);
        assert!(session.messages().iter().any(|m| m == "NE not ready. Sleeping 0 seconds."));
    }

    #[tokio::test]
    async fn test_build_advanced_abandons_incomplete_pulls() {
        let (config, registry, session) = fixture();
        let mut runner = Scripted::new(&[]);
        for _ in 0..config.max_pull_attempts {
            runner = runner.with_discovery("10.0.0.1", partial_capture());
        }
        let ctx = Context::new(&runner, &config, &registry, &session, Deadline::none());
        let auths = vec![AuthPossibility::new("1", "admin", "switch")];

        let mut ne = create_base(&ctx, &primed_entry(SCS_PRIMER));
        build_advanced(&ctx, &auths, &mut ne).await;

        assert!(ne.badpull);
        assert!(!ne.typecrawled);
        assert!(ne.payload.is_some());
        assert_eq!(runner.seen().len(), 4);
        assert!(
            session
                .messages()
                .contains(&"Tried 4 times and still couldn't get a good data pull. Abandoning.".to_string())
        );
    }

    #[tokio::test]
    async fn test_deadline_keeps_ne_as_bad_pull() {
        let (config, registry, session) = fixture();
        let runner = Scripted::new(&[])
            .with_discovery("10.0.0.1", full_capture())
            .with_delay("10.0.0.1", Duration::from_secs(5));
        let deadline = Deadline::after(Some(Duration::from_millis(50)));
        let ctx = Context::new(&runner, &config, &registry, &session, deadline);
        let auths = vec![AuthPossibility::new("1", "admin", "switch")];

        let mut ne = create_base(&ctx, &primed_entry(SCS_PRIMER));
        build_advanced(&ctx, &auths, &mut ne).await;

        assert!(ne.badpull);
        assert!(!ne.typecrawled);
        assert!(ne.payload.is_none());
        assert!(ne.source_entry.is_some());
        assert_eq!(
            session.messages().last().map(String::as_str),
            Some("Crawl deadline reached while pulling data for NE ID: '2'. Keeping partial data.")
        );
    }

    #[tokio::test]
    async fn test_missing_credential_is_not_a_deadline() {
        let (config, registry, session) = fixture();
        let runner = Scripted::new(&[]).with_discovery("10.0.0.1", full_capture());
        let ctx = Context::new(&runner, &config, &registry, &session, Deadline::none());

        let mut ne = create_base(&ctx, &primed_entry(SCS_PRIMER));
        build_advanced(&ctx, &[], &mut ne).await;

        assert!(ne.badpull);
        assert!(!ne.typecrawled);
        assert!(runner.seen().is_empty());
        let messages = session.messages();
        assert_eq!(
            messages.last().map(String::as_str),
            Some("No credential '1' in the auth pool to pull data for NE ID: '2'. Keeping partial data.")
        );
        assert!(!messages.iter().any(|m| m.starts_with("Crawl deadline reached")));
    }

    #[tokio::test]
    async fn test_sar_stays_basic() {
        let (config, registry, session) = fixture();
        let runner = Scripted::default();
        let ctx = Context::new(&runner, &config, &registry, &session, Deadline::none());
        let auths = vec![AuthPossibility::new("1", "admin", "switch")];

        let mut ne = create_base(
            &ctx,
            &primed_entry(&["System Name            : sar-h-01", "System Type            : 7705 SAR-H"]),
        );
        build_advanced(&ctx, &auths, &mut ne).await;

        assert_eq!(ne.typestring, "scr");
        assert!(ne.payload.is_none());
        assert!(runner.seen().is_empty());
    }
}

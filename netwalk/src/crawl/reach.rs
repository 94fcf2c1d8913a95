//! Reachability: priming an entrypoint until it logs in or is given up.

use log::debug;

use super::Context;
use super::auth::{record_outcome, select_next};
use super::classify::classify;
use crate::target::{AuthPossibility, Entrypoint};
use crate::transport::{HopCredential, SessionRunner, SessionScript, hop_chain};

/// Go direct until direct access has failed, then use the relay chain.
pub(crate) fn choose_route(entry: &mut Entrypoint) {
    if entry.directfailed {
        if let Some(saved) = entry.saved_hopcount {
            entry.hopcount = saved;
        }
    } else {
        entry.saved_hopcount.get_or_insert(entry.hopcount);
        entry.hopcount = 0;
    }
}

/// Session script for the entry's current auth, or `None` if that auth is
/// not in the pool.
pub(crate) fn script_for(
    auths: &[AuthPossibility],
    entry: &mut Entrypoint,
    build: impl FnOnce(Vec<HopCredential>) -> SessionScript,
) -> Option<SessionScript> {
    choose_route(entry);
    let auth = auths.iter().find(|a| a.id == entry.auth)?;
    Some(build(hop_chain(entry, auth, auths)))
}

fn entry_ref(entry: &Entrypoint) -> String {
    format!(
        "ID: {}, IP: {}, PORT: {}, AUTHattemptID: {}",
        entry.id, entry.ip, entry.port, entry.auth
    )
}

fn username<'a>(auths: &'a [AuthPossibility], entry: &Entrypoint) -> &'a str {
    auths
        .iter()
        .find(|a| a.id == entry.auth)
        .map_or("", |a| a.username.as_str())
}

fn deadline_reached<R>(ctx: &Context<'_, R>, entry: &mut Entrypoint) {
    ctx.session.event(
        "primer_driver",
        format!(
            "Crawl deadline reached while priming Entry ID: {}, IP: {}. No further attempts will be made on this entrypoint.",
            entry.id, entry.ip
        ),
    );
    entry.abandon();
}

/// Run primer sessions against one entrypoint, adjusting credentials and
/// route between attempts, for at most `max_primer_iterations` sessions.
pub async fn primer_driver<R: SessionRunner>(
    ctx: &Context<'_, R>,
    auths: &[AuthPossibility],
    entry: &mut Entrypoint,
) {
    let func = "primer_driver";
    let mut counter = 0;

    while !entry.primersuccess {
        counter += 1;
        if counter > ctx.config.max_primer_iterations {
            break;
        }
        if !(entry.reachable || entry.directfailed) {
            break;
        }

        if !select_next(auths, entry, false, ctx.session) {
            entry.abandon();
            break;
        }

        let timeout = ctx.config.primer_timeout;
        let Some(script) = script_for(auths, entry, |hops| SessionScript::primer(hops, timeout)) else {
            entry.abandon();
            break;
        };
        debug!("priming entry {} via {}", entry.id, script.route());

        let Some(output) = ctx.deadline.run(ctx.runner.run(&script)).await else {
            deadline_reached(ctx, entry);
            break;
        };
        entry.primer_output = output;

        let direct_might_fail = entry.learned_from.is_some();
        let outcome = classify(&entry.primer_output);
        debug!("entry {} primer outcome {:?}", entry.id, outcome);
        entry.reachable = outcome.reachable;

        if outcome.bad_host_keys {
            ctx.session
                .event(func, "Bad SSH hostkeys detected, deleting known_hosts...");
            ctx.runner.forget_host_keys().await;
        } else if !outcome.reachable {
            if direct_might_fail && !entry.directfailed {
                debug!("direct access to entry {} failed, trying relay", entry.id);
                entry.directfailed = true;
            } else {
                ctx.session.event(
                    func,
                    format!(
                        "Entrypoint IP Unreachable: ( {}) No further attempts will be made on this entrypoint.",
                        entry_ref(entry)
                    ),
                );
                entry.abandon();
            }
        } else if !outcome.auth_success {
            ctx.session.event(
                func,
                format!(
                    "Auth for entrypoint failed: ENTRY( {}) with AUTH( USERNAME: {}, PASS: *********",
                    entry_ref(entry),
                    username(auths, entry)
                ),
            );
            record_outcome(auths, entry, false);
            if !select_next(auths, entry, true, ctx.session) {
                entry.abandon();
                break;
            }
        } else if outcome.retry_later {
            ctx.session.event(
                func,
                format!("NE not ready. Sleeping {} seconds.", ctx.config.retry_sleep.as_secs()),
            );
            if !ctx.deadline.sleep(ctx.config.retry_sleep).await {
                deadline_reached(ctx, entry);
                break;
            }
        } else {
            entry.primersuccess = true;
            record_outcome(auths, entry, true);
            ctx.session.event(
                func,
                format!(
                    "Auth for entrypoint Succeeded: ENTRY( {}) with AUTH( USERNAME: {}, PASS: *********",
                    entry_ref(entry),
                    username(auths, entry)
                ),
            );
        }
    }
    debug!("leaving primer driver: {}", entry.summary());
}

/// Drive one entrypoint to a terminal state: primed, or unreachable with
/// no relay attempt pending.
pub async fn primer_brain<R: SessionRunner>(
    ctx: &Context<'_, R>,
    auths: &[AuthPossibility],
    entry: &mut Entrypoint,
) {
    let mut rounds = 0;
    while !entry.is_settled() {
        rounds += 1;
        if rounds > ctx.config.max_primer_rounds {
            ctx.session.event(
                "primer_brain",
                format!(
                    "Gave up on Entry ID: {}, IP: {} after {} primer rounds.",
                    entry.id,
                    entry.ip,
                    rounds - 1
                ),
            );
            entry.abandon();
            break;
        }

        if entry.reachable {
            primer_driver(ctx, auths, entry).await;
        }
        if !entry.reachable && entry.directfailed {
            primer_driver(ctx, auths, entry).await;
        }

        if !entry.is_settled() && !ctx.deadline.sleep(ctx.config.primer_settle_sleep).await {
            deadline_reached(ctx, entry);
        }
    }
}

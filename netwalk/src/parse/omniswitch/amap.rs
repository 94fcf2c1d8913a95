//! Neighbor table from `show amap`.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::parse::field::{LabeledField, builtin_field, chunk_lines};
use crate::payload::{Amap, RemoteHost};
use crate::session::CrawlSession;

pub const SHOW_AMAP: &str = "show amap";

static OPERSTATUS: Lazy<LabeledField> = Lazy::new(|| builtin_field("  Operational Status = ", ".*"));
static REMOTE_HOST: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(Remote Host ')(?P<hostname>.*)(' On Port )(?P<slotport>.*)( Vlan )(?P<vlan>\d*)")
        .expect("remote host pattern must compile")
});
static DEVICE: Lazy<LabeledField> = Lazy::new(|| builtin_field("  Remote Host Device      = ", ".*"));
static BASE_MAC: Lazy<LabeledField> = Lazy::new(|| builtin_field("  Remote Base MAC         = ", ".*"));
static INTERFACE: Lazy<LabeledField> = Lazy::new(|| builtin_field("  Remote Interface        = ", ".*"));
static VLAN: Lazy<LabeledField> = Lazy::new(|| builtin_field("  Remote Vlan             = ", ".*"));
static REMOTE_IP: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"   \d{1,3}\.\d{1,3}\.\d{1,3}\.\d{1,3}").expect("remote ip pattern must compile")
});

fn label(field: &LabeledField, line: &str) -> Option<String> {
    field
        .value(line)
        .map(|v| v.trim_end_matches([',', ' ']).to_string())
}

/// Parse one remote host block; the first line is the `Remote Host` header.
fn parse_remote_host(block: &[String]) -> RemoteHost {
    let mut host = RemoteHost::default();
    for line in block {
        if let Some(caps) = REMOTE_HOST.captures(line) {
            host.localslotport = caps["slotport"].to_string();
            host.localvlan = caps["vlan"].trim_end_matches([' ', ':', '\r', '\n']).to_string();
            host.remotehostname = caps["hostname"].to_string();
        }

        if let Some(ip) = REMOTE_IP.find(line) {
            host.remoteips.push(ip.as_str().trim().to_string());
        } else if let Some(v) = label(&DEVICE, line) {
            host.remotedevice = v;
        } else if let Some(v) = label(&BASE_MAC, line) {
            host.remotemac = v;
        } else if let Some(v) = label(&INTERFACE, line) {
            host.remoteslotport = v;
        } else if let Some(v) = label(&VLAN, line) {
            host.remotevlan = v;
        }
    }
    host
}

/// Remote hosts and the AMAP operational status. The last block stops one
/// line short of the section end, where the prompt sits.
pub fn parse(section: &[String]) -> Amap {
    let last_stop = section.len().saturating_sub(1);
    let remotehosts = chunk_lines(section, last_stop, |line| REMOTE_HOST.is_match(line))
        .into_iter()
        .map(|(start, body)| {
            let end = start + 1 + body.len();
            parse_remote_host(&section[start..end])
        })
        .collect();

    let amapstatus = section
        .iter()
        .filter_map(|line| OPERSTATUS.value(line))
        .last()
        .unwrap_or_default();

    Amap {
        amapstatus,
        remotehosts,
    }
}

/// Assign ids and prefix both vlans with `vlan `.
pub fn generate(parsed: Amap, session: &CrawlSession) -> Amap {
    let remotehosts = parsed
        .remotehosts
        .into_iter()
        .map(|host| RemoteHost {
            id: session.next_uid(),
            localvlan: format!("vlan {}", host.localvlan),
            remotevlan: format!("vlan {}", host.remotevlan),
            ..host
        })
        .collect();
    Amap {
        amapstatus: parsed.amapstatus,
        remotehosts,
    }
}

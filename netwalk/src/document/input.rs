//! Reading targets, credentials and member hints from the input document.

use std::fs;
use std::path::Path;

use log::{debug, warn};

use super::tags;
use super::tree::{self, Node};
use crate::error::InputError;
use crate::session::CrawlSession;
use crate::target::{AuthPossibility, Entrypoint, Member, Target};

const FUNC: &str = "parse_xml_input";

/// More unknown target children than this stops the parse.
const MAX_UNKNOWN_TAGS: usize = 1;

/// Everything the input document describes.
#[derive(Debug)]
pub struct InputDocument {
    pub targets: Vec<Target>,

    /// Member hints from every target, in document order.
    pub members: Vec<Member>,
}

impl InputDocument {
    /// Read and parse the document at `path`.
    pub fn load(path: impl AsRef<Path>, session: &CrawlSession, default_port: u16) -> Result<Self, InputError> {
        let path = path.as_ref();
        let xml = fs::read_to_string(path).map_err(|source| {
            let err = InputError::Read {
                path: path.to_path_buf(),
                source,
            };
            session.event(FUNC, err.to_string());
            err
        })?;
        Self::parse(&xml, session, default_port)
    }

    /// Parse a document. Every fatal problem is recorded as an event before
    /// it is returned.
    pub fn parse(xml: &str, session: &CrawlSession, default_port: u16) -> Result<Self, InputError> {
        read_document(xml, session, default_port).inspect_err(|err| {
            session.event(FUNC, format!("{}. Exiting now...", err));
        })
    }
}

fn read_document(xml: &str, session: &CrawlSession, default_port: u16) -> Result<InputDocument, InputError> {
    let root = tree::parse(xml)?;
    let mut doc = InputDocument {
        targets: Vec::new(),
        members: Vec::new(),
    };
    let mut unknown = 0;

    for node in &root.children {
        let id = node.attr(tags::ATTR_ID).unwrap_or_default().to_string();
        debug!("target id = {}", id);
        let mut entries = Vec::new();
        let mut auths = Vec::new();

        for section in &node.children {
            match section.tag.as_str() {
                tags::ENTRYPOINT => entries.push(read_entrypoint(&id, section, default_port)?),
                tags::AUTH => {
                    for possibility in &section.children {
                        auths.push(read_possibility(&id, possibility)?);
                    }
                }
                tags::MEMBERS => doc.members.extend(section.children.iter().map(read_member)),
                other => {
                    unknown += 1;
                    warn!("unexpected <{}> in target '{}'", other, id);
                    session.event(
                        FUNC,
                        "Warning, tags detected other than ENTRYPOINT, AUTH, and MEMBERS. Suspect bad XML",
                    );
                    if unknown > MAX_UNKNOWN_TAGS {
                        return Err(InputError::Malformed {
                            message: format!("too many unexpected tags, last was <{}>", other),
                        });
                    }
                }
            }
        }

        if entries.is_empty() {
            return Err(InputError::EmptyTarget {
                target: id,
                what: "entrypoints",
            });
        }
        if auths.is_empty() {
            return Err(InputError::EmptyTarget {
                target: id,
                what: "auth possibilities",
            });
        }
        doc.targets.push(Target::new(id, auths, entries));
    }

    if doc.targets.is_empty() {
        return Err(InputError::NoTargets);
    }
    Ok(doc)
}

/// The entrypoint's fields sit one level down under a wrapper element of
/// any name.
fn read_entrypoint(target: &str, node: &Node, default_port: u16) -> Result<Entrypoint, InputError> {
    let id = node.attr(tags::ATTR_ID).unwrap_or_default().to_string();
    let fields: Vec<&Node> = node.children.iter().flat_map(|wrapper| wrapper.children.iter()).collect();
    let text = |tag: &str| fields.iter().find(|f| f.tag == tag).and_then(|f| f.text.as_deref());

    let Some(ip) = text(tags::IPADDR).map(|ip| ip.trim_end_matches(['\t', ' '])) else {
        return Err(InputError::MissingIp {
            target: target.to_string(),
            entry: id,
        });
    };

    let port = match text(tags::PORT) {
        Some(port) => port.trim().parse().unwrap_or_else(|_| {
            warn!("entrypoint '{}' has unusable port '{}', using {}", id, port, default_port);
            default_port
        }),
        None => default_port,
    };
    let mut entry = Entrypoint::new(id, ip, port);
    if let Some(hostname) = text(tags::HOSTNAME) {
        entry.hostname = hostname.trim_end_matches(['>', '<', ' ']).to_string();
    }
    debug!("entrypoint {}", entry.summary());
    Ok(entry)
}

fn read_possibility(target: &str, node: &Node) -> Result<AuthPossibility, InputError> {
    let id = node.attr(tags::ATTR_ID).unwrap_or_default().to_string();
    let missing = |field| InputError::MissingCredential {
        target: target.to_string(),
        auth: id.clone(),
        field,
    };
    let username = node
        .child(tags::USERNAME)
        .and_then(|n| n.text.clone())
        .ok_or_else(|| missing("username"))?;
    let password = node
        .child(tags::PASSWORD)
        .and_then(|n| n.text.clone())
        .ok_or_else(|| missing("password"))?;
    debug!("auth possibility {} for user {}", id, username);
    Ok(AuthPossibility::new(id, username, password))
}

fn read_member(node: &Node) -> Member {
    let member = Member {
        id: node.attr(tags::ATTR_ID).unwrap_or_default().to_string(),
        hostname: node.child_text(tags::HOSTNAME),
        ipaddr: node.child_text(tags::IPADDR),
        defaultroute: node.child_text(tags::DEFAULTROUTE),
        dhcps: node.child_text(tags::DHCPS),
        mac: node.child_text(tags::MAC).to_lowercase(),
        typestring: node
            .child(tags::CUSTOM)
            .and_then(|c| c.attr(tags::ATTR_TAG))
            .unwrap_or_default()
            .to_string(),
    };
    debug!("member {} '{}' {}", member.id, member.hostname, member.mac);
    member
}

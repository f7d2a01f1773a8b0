//! Parsing of `host:port` command-line targets.

use std::fs;

use crate::error::{ElgatoError, Result};
use crate::keylight::Device;

const SERVICES_PATH: &str = "/etc/services";

/// Used when the services database is missing or lacks the name.
const WELL_KNOWN_PORTS: &[(&str, u16)] = &[("http", 80), ("https", 443), ("http-alt", 8080)];

/// Build a [`Device`] from a `host:port` argument. The port may be a number or
/// a TCP service name.
pub fn parse_endpoint(arg: &str) -> Result<Device> {
    let (host, port) = split_host_port(arg)?;
    let port = lookup_port(port)?;

    Ok(Device::user_specified(host, port))
}

/// Split `host:port` or `[host]:port`. IPv6 hosts must be bracketed.
pub fn split_host_port(addr: &str) -> Result<(&str, &str)> {
    let invalid = |reason| ElgatoError::InvalidAddress {
        addr: addr.to_string(),
        reason,
    };

    let (host, port) = match addr.strip_prefix('[') {
        Some(rest) => {
            let (host, after) = rest
                .split_once(']')
                .ok_or_else(|| invalid("missing ']' in address"))?;
            match after.strip_prefix(':') {
                Some(_) if host.contains('%') => {
                    return Err(invalid("zone identifiers are not supported in address"))
                }
                Some(port) => (host, port),
                None if after.is_empty() => return Err(invalid("missing port in address")),
                None => return Err(invalid("unexpected text after ']' in address")),
            }
        }
        None => {
            let (host, port) = addr
                .rsplit_once(':')
                .ok_or_else(|| invalid("missing port in address"))?;
            if host.contains(':') {
                return Err(invalid("too many colons in address"));
            }
            (host, port)
        }
    };

    if host.contains(['[', ']']) || port.contains(['[', ']']) {
        return Err(invalid("unexpected bracket in address"));
    }

    Ok((host, port))
}

/// Resolve a TCP port number or service name.
pub fn lookup_port(service: &str) -> Result<u16> {
    if service.is_empty() {
        return Err(ElgatoError::UnknownPort(service.to_string()));
    }
    if service.bytes().all(|b| b.is_ascii_digit()) {
        return service
            .parse()
            .map_err(|_| ElgatoError::UnknownPort(service.to_string()));
    }

    let name = service.to_ascii_lowercase();
    let from_db = fs::read_to_string(SERVICES_PATH)
        .ok()
        .and_then(|contents| find_service(&contents, &name));

    from_db
        .or_else(|| {
            WELL_KNOWN_PORTS
                .iter()
                .find(|(known, _)| *known == name)
                .map(|(_, port)| *port)
        })
        .ok_or_else(|| ElgatoError::UnknownPort(service.to_string()))
}

/// Find the TCP port of `name` in services(5) formatted `contents`.
fn find_service(contents: &str, name: &str) -> Option<u16> {
    contents.lines().find_map(|line| {
        let line = line.split('#').next()?;
        let mut fields = line.split_whitespace();
        let primary = fields.next()?;
        let (port, proto) = fields.next()?.split_once('/')?;
        if proto != "tcp" {
            return None;
        }
        let port = port.parse().ok()?;

        (primary == name || fields.any(|alias| alias == name)).then_some(port)
    })
}

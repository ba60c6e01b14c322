//! Next-hop resolution towards a scan target.
//!
//! Exactly one strategy is compiled in per target platform:
//! * **Linux**: longest-prefix match over the kernel routing table ([`table`]).
//! * **macOS / FreeBSD**: scan of a routing information base snapshot for the
//!   default route ([`rib`]).

pub mod rib;
pub mod table;

use std::net::{Ipv4Addr, UdpSocket};

use pnet::datalink::{self, NetworkInterface};
use scanr_common::error::ScanError;
use scanr_common::network::interface::NetworkInterfaceExtension;
use scanr_common::network::route::RouteInfo;
use tracing::debug;

/// Resolves the gateway (if any) and local source address used to reach `target`.
pub fn resolve(target: Ipv4Addr) -> Result<RouteInfo, ScanError> {
    let route = route_or_unavailable(target, platform::resolve(target))?;
    debug!("Route to {target}: {route}");
    Ok(route)
}

/// Every platform failure surfaces as [`ScanError::RouteUnavailable`].
fn route_or_unavailable(
    target: Ipv4Addr,
    lookup: anyhow::Result<RouteInfo>,
) -> Result<RouteInfo, ScanError> {
    lookup.map_err(|e| ScanError::RouteUnavailable {
        target,
        reason: format!("{e:#}"),
    })
}

/// Source address the kernel would pick for a datagram to `target`.
fn kernel_source_addr(target: Ipv4Addr) -> Option<Ipv4Addr> {
    let socket = UdpSocket::bind("0.0.0.0:0").ok()?;
    socket.connect((target, 53)).ok()?;
    match socket.local_addr().ok()?.ip() {
        std::net::IpAddr::V4(addr) if !addr.is_unspecified() => Some(addr),
        _ => None,
    }
}

/// Address of `interfaces` on a network that directly contains `addr`.
fn on_link_source(interfaces: &[NetworkInterface], addr: Ipv4Addr) -> Option<Ipv4Addr> {
    interfaces
        .iter()
        .filter(|intf| intf.is_up() && !intf.is_loopback())
        .flat_map(|intf| intf.get_ipv4_nets())
        .find(|net| net.contains(addr))
        .map(|net| net.ip())
}

/// Picks the source address for a route leaving through `iface_name`.
fn interface_source(
    interfaces: &[NetworkInterface],
    iface_name: &str,
    next_hop: Ipv4Addr,
) -> Option<Ipv4Addr> {
    let nets = interfaces
        .iter()
        .find(|intf| intf.name == iface_name)?
        .get_ipv4_nets();
    nets.iter()
        .find(|net| net.contains(next_hop))
        .or_else(|| nets.first())
        .map(|net| net.ip())
}

/// Table-scan resolution over parsed routing table entries.
fn resolve_from_table(
    entries: &[table::RouteEntry],
    interfaces: &[NetworkInterface],
    target: Ipv4Addr,
) -> anyhow::Result<RouteInfo> {
    let entry = table::select_route(entries, target)
        .ok_or_else(|| anyhow::anyhow!("no matching entry in the routing table"))?;
    let gateway = entry.next_hop_gateway();
    let next_hop = gateway.unwrap_or(target);
    let source = interface_source(interfaces, &entry.iface, next_hop)
        .or_else(|| kernel_source_addr(target))
        .ok_or_else(|| anyhow::anyhow!("interface {} has no IPv4 address", entry.iface))?;
    Ok(RouteInfo { gateway, source })
}

/// RIB-scan resolution over decoded routing messages.
///
/// Targets on a directly attached network are answered from the interfaces
/// without a gateway.
fn resolve_from_rib(
    routes: &[rib::RibRoute],
    interfaces: &[NetworkInterface],
    target: Ipv4Addr,
) -> anyhow::Result<RouteInfo> {
    if let Some(source) = on_link_source(interfaces, target) {
        return Ok(RouteInfo::direct(source));
    }
    let (gateway, source) =
        rib::find_default(routes).ok_or_else(|| anyhow::anyhow!("no default route in the RIB"))?;
    Ok(RouteInfo::via(gateway, source))
}

#[cfg(target_os = "linux")]
mod platform {
    use super::*;
    use anyhow::Context;

    const ROUTE_TABLE: &str = "/proc/net/route";

    pub fn resolve(target: Ipv4Addr) -> anyhow::Result<RouteInfo> {
        let text = std::fs::read_to_string(ROUTE_TABLE)
            .with_context(|| format!("reading {ROUTE_TABLE}"))?;
        let entries = table::parse_table(&text)?;
        resolve_from_table(&entries, &datalink::interfaces(), target)
    }
}

#[cfg(any(target_os = "macos", target_os = "ios", target_os = "freebsd"))]
mod platform {
    use super::*;
    use std::{io, ptr};

    #[cfg(any(target_os = "macos", target_os = "ios"))]
    const LAYOUT: rib::RibLayout = rib::RibLayout::DARWIN;
    #[cfg(target_os = "freebsd")]
    const LAYOUT: rib::RibLayout = rib::RibLayout::FREEBSD_64;

    pub fn resolve(target: Ipv4Addr) -> anyhow::Result<RouteInfo> {
        let snapshot = fetch_rib()?;
        let routes = rib::decode(&snapshot, &LAYOUT);
        debug!("Decoded {} routes from the RIB", routes.len());
        resolve_from_rib(&routes, &datalink::interfaces(), target)
    }

    fn fetch_rib() -> anyhow::Result<Vec<u8>> {
        let mut mib: [libc::c_int; 6] =
            [libc::CTL_NET, libc::PF_ROUTE, 0, libc::AF_INET, libc::NET_RT_DUMP, 0];
        let mut len: libc::size_t = 0;
        // SAFETY: size query, no output buffer is passed.
        let rc = unsafe {
            libc::sysctl(
                mib.as_mut_ptr(),
                mib.len() as libc::c_uint,
                ptr::null_mut(),
                &mut len,
                ptr::null_mut(),
                0,
            )
        };
        if rc != 0 {
            let err = anyhow::Error::from(io::Error::last_os_error());
            return Err(err.context("sizing the RIB"));
        }

        let mut buf = vec![0u8; len];
        // SAFETY: `buf` is valid for `len` bytes and the kernel writes at most `len`.
        let rc = unsafe {
            libc::sysctl(
                mib.as_mut_ptr(),
                mib.len() as libc::c_uint,
                buf.as_mut_ptr().cast(),
                &mut len,
                ptr::null_mut(),
                0,
            )
        };
        if rc != 0 {
            let err = anyhow::Error::from(io::Error::last_os_error());
            return Err(err.context("fetching the RIB"));
        }
        buf.truncate(len);
        Ok(buf)
    }
}

#[cfg(not(any(
    target_os = "linux",
    target_os = "macos",
    target_os = "ios",
    target_os = "freebsd"
)))]
mod platform {
    use super::*;

    pub fn resolve(_target: Ipv4Addr) -> anyhow::Result<RouteInfo> {
        anyhow::bail!("route lookup is not supported on this platform")
    }
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝

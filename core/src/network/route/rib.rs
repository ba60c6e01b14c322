//! RIB-scan route lookup: decoding of the routing messages the BSD kernels
//! hand out for `sysctl(CTL_NET, PF_ROUTE, ..., NET_RT_DUMP)`.
//!
//! Each message is a fixed `rt_msghdr` followed by the socket addresses named
//! in its `rtm_addrs` bitmask, in slot order, each padded to the kernel's
//! alignment.

use std::net::Ipv4Addr;

const RTM_VERSION: u8 = 5;
const RTM_GET: u8 = 4;
const AF_INET: u8 = 2;
const RTM_ADDRS_OFFSET: usize = 12;

const RTAX_DST: usize = 0;
const RTAX_GATEWAY: usize = 1;
const RTAX_IFA: usize = 5;
const RTAX_MAX: usize = 8;

/// Platform specific shape of a routing message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RibLayout {
    /// `sizeof(struct rt_msghdr)`
    pub header_len: usize,
    /// Socket addresses are rounded up to a multiple of this.
    pub align: usize,
}

impl RibLayout {
    pub const DARWIN: RibLayout = RibLayout {
        header_len: 92,
        align: 4,
    };
    pub const FREEBSD_64: RibLayout = RibLayout {
        header_len: 152,
        align: 8,
    };

    fn roundup(&self, len: usize) -> usize {
        if len == 0 {
            return self.align;
        }
        (len + self.align - 1) & !(self.align - 1)
    }
}

/// Address slots of one route message. Slots that are absent or not IPv4 are `None`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RibRoute {
    pub addrs: [Option<Ipv4Addr>; RTAX_MAX],
}

impl RibRoute {
    pub fn destination(&self) -> Option<Ipv4Addr> {
        self.addrs[RTAX_DST]
    }

    pub fn gateway(&self) -> Option<Ipv4Addr> {
        self.addrs[RTAX_GATEWAY]
    }

    pub fn interface_addr(&self) -> Option<Ipv4Addr> {
        self.addrs[RTAX_IFA]
    }
}

/// Splits a RIB snapshot into route messages.
///
/// Messages of another version or type are skipped. Decoding stops at the
/// first message whose length does not fit the remaining buffer.
pub fn decode(buf: &[u8], layout: &RibLayout) -> Vec<RibRoute> {
    let mut routes = Vec::new();
    let mut rest = buf;

    while rest.len() >= 4 {
        let msg_len = u16::from_ne_bytes([rest[0], rest[1]]) as usize;
        if msg_len < 4 || msg_len > rest.len() {
            break;
        }
        let (msg, tail) = rest.split_at(msg_len);
        rest = tail;

        if msg[2] != RTM_VERSION || msg[3] != RTM_GET || msg.len() < layout.header_len {
            continue;
        }
        let bitmask = i32::from_ne_bytes([
            msg[RTM_ADDRS_OFFSET],
            msg[RTM_ADDRS_OFFSET + 1],
            msg[RTM_ADDRS_OFFSET + 2],
            msg[RTM_ADDRS_OFFSET + 3],
        ]) as u32;
        if let Some(route) = decode_addrs(&msg[layout.header_len..], bitmask, layout) {
            routes.push(route);
        }
    }
    routes
}

fn decode_addrs(mut buf: &[u8], bitmask: u32, layout: &RibLayout) -> Option<RibRoute> {
    let mut route = RibRoute::default();
    for slot in 0..RTAX_MAX {
        if bitmask & (1 << slot) == 0 {
            continue;
        }
        let sa_len = *buf.first()? as usize;
        let step = layout.roundup(sa_len);
        if sa_len > buf.len() {
            return None;
        }
        route.addrs[slot] = parse_inet(&buf[..sa_len]);
        buf = buf.get(step..).unwrap_or_default();
    }
    Some(route)
}

/// `sockaddr_in`: len, family, port, then the address.
fn parse_inet(sa: &[u8]) -> Option<Ipv4Addr> {
    if sa.len() < 8 || sa[1] != AF_INET {
        return None;
    }
    Some(Ipv4Addr::new(sa[4], sa[5], sa[6], sa[7]))
}

/// First default route carrying both an IPv4 gateway and an interface address,
/// as `(gateway, source)`.
///
/// The kernel does not order default routes, so with several of them the pick is arbitrary.
pub fn find_default(routes: &[RibRoute]) -> Option<(Ipv4Addr, Ipv4Addr)> {
    routes.iter().find_map(|route| {
        if route.destination()? != Ipv4Addr::UNSPECIFIED {
            return None;
        }
        Some((route.gateway()?, route.interface_addr()?))
    })
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝

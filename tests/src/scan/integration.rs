#![cfg(test)]
use crate::util::{LOCAL_ADDR, LOCAL_MAC, SimulatedHost, SimulatedLan, local_link, tcp_segment};
use pnet::packet::tcp::TcpFlags;
use pnet::util::MacAddr;
use rand::SeedableRng;
use rand::rngs::StdRng;
use scanr_common::config::{DeadlinePolicy, ScanConfig};
use scanr_common::error::ScanError;
use scanr_common::network::interface::LinkInterface;
use scanr_common::network::route::RouteInfo;
use scanr_common::ports::PortSpec;
use scanr_core::scanner::{self, PortState, ScanReport};
use std::net::Ipv4Addr;
use std::time::Duration;

const NEIGHBOUR: Ipv4Addr = Ipv4Addr::new(192, 168, 1, 20);
const NEIGHBOUR_MAC: MacAddr = MacAddr(0xaa, 0x00, 0x00, 0x00, 0x00, 0x14);
const GATEWAY: Ipv4Addr = Ipv4Addr::new(192, 168, 1, 1);
const GATEWAY_MAC: MacAddr = MacAddr(0xaa, 0x00, 0x00, 0x00, 0x00, 0x01);
const REMOTE: Ipv4Addr = Ipv4Addr::new(203, 0, 113, 7);

fn config(timeout_ms: u64) -> ScanConfig {
    ScanConfig {
        arp_timeout: Duration::from_millis(200),
        ..ScanConfig::default().with_timeout(Duration::from_millis(timeout_ms))
    }
}

/// Runs a scan over `lan` on the blocking pool the way the command line does.
async fn scan(
    lan: SimulatedLan,
    target: Ipv4Addr,
    route: RouteInfo,
    ports: Vec<u16>,
    cfg: ScanConfig,
) -> (SimulatedLan, Result<ScanReport, ScanError>) {
    tokio::task::spawn_blocking(move || {
        let mut lan = lan;
        let interface: LinkInterface = local_link();
        let mut rng = StdRng::seed_from_u64(7);
        let result = scanner::scan_with_capture(
            &mut lan,
            &interface,
            target,
            route,
            ports,
            &cfg,
            &mut rng,
            None,
        );
        (lan, result)
    })
    .await
    .expect("scan task panicked")
}

fn neighbour_lan() -> SimulatedLan {
    SimulatedLan::default()
        .with_station(NEIGHBOUR, NEIGHBOUR_MAC)
        .with_host(SimulatedHost::new(NEIGHBOUR, NEIGHBOUR_MAC).open(&[80]).closed(&[22]))
}

#[tokio::test]
async fn scan_on_link_neighbour() {
    let (lan, result) = scan(
        neighbour_lan(),
        NEIGHBOUR,
        RouteInfo::direct(LOCAL_ADDR),
        vec![22, 80, 443],
        config(100),
    )
    .await;

    let report = result.expect("scan failed");
    assert_eq!(report.next_hop_mac, NEIGHBOUR_MAC);
    assert_eq!(report.results.get(22), Some(PortState::Closed));
    assert_eq!(report.results.get(80), Some(PortState::Open));
    assert_eq!(report.filtered(), vec![443]);
    assert!(report.timed_out, "443 never answers so the scan must end on its timeout");

    assert_eq!(lan.arp_requests(), 1);
    let probes = lan.probes();
    assert_eq!(probes.iter().map(|(_, port)| *port).collect::<Vec<_>>(), vec![22, 80, 443]);
    assert!(probes.iter().all(|(mac, _)| *mac == NEIGHBOUR_MAC));
}

#[tokio::test]
async fn scan_finishes_early_when_every_port_answers() {
    let (_, result) = scan(
        neighbour_lan(),
        NEIGHBOUR,
        RouteInfo::direct(LOCAL_ADDR),
        vec![80, 22],
        config(5_000),
    )
    .await;

    let report = result.expect("scan failed");
    assert!(!report.timed_out);
    assert_eq!(report.open(), vec![80]);
    assert_eq!(report.closed(), vec![22]);
    assert!(report.elapsed < Duration::from_secs(5));
}

#[tokio::test]
async fn routed_scan_goes_through_the_gateway() {
    let lan = SimulatedLan::default()
        .with_station(GATEWAY, GATEWAY_MAC)
        .with_host(SimulatedHost::new(REMOTE, GATEWAY_MAC).open(&[443]));

    let (lan, result) = scan(
        lan,
        REMOTE,
        RouteInfo::via(GATEWAY, LOCAL_ADDR),
        vec![443],
        config(100),
    )
    .await;

    let report = result.expect("scan failed");
    assert_eq!(report.next_hop_mac, GATEWAY_MAC);
    assert_eq!(report.open(), vec![443]);
    assert!(lan.probes().iter().all(|(mac, _)| *mac == GATEWAY_MAC));
}

#[tokio::test]
async fn remote_target_is_not_arped_for() {
    // Only the target itself answers ARP, so resolving it directly would
    // succeed while the route says frames must go through the gateway.
    let lan = SimulatedLan::default().with_station(REMOTE, NEIGHBOUR_MAC);

    let (lan, result) = scan(
        lan,
        REMOTE,
        RouteInfo::via(GATEWAY, LOCAL_ADDR),
        vec![443],
        config(100),
    )
    .await;

    match result {
        Err(ScanError::ResolutionTimeout { target, .. }) => assert_eq!(target, GATEWAY),
        other => panic!("expected an ARP timeout for the gateway, got {other:?}"),
    }
    assert!(lan.probes().is_empty());
}

#[tokio::test]
async fn unreachable_next_hop_sends_no_probes() {
    let (lan, result) = scan(
        SimulatedLan::default(),
        NEIGHBOUR,
        RouteInfo::direct(LOCAL_ADDR),
        vec![22, 80],
        config(100),
    )
    .await;

    let err = result.expect_err("nobody answers ARP");
    assert!(matches!(err, ScanError::ResolutionTimeout { .. }));
    assert_eq!(err.exit_code(), 4);
    assert_eq!(lan.arp_requests(), 1);
    assert!(lan.probes().is_empty());
}

#[tokio::test]
async fn duplicate_ports_and_answers_are_recorded_once() {
    let lan = SimulatedLan::default()
        .with_station(NEIGHBOUR, NEIGHBOUR_MAC)
        .with_host(
            SimulatedHost::new(NEIGHBOUR, NEIGHBOUR_MAC)
                .open(&[80])
                .closed(&[22])
                .answering_twice(),
        );

    let (lan, result) = scan(
        lan,
        NEIGHBOUR,
        RouteInfo::direct(LOCAL_ADDR),
        vec![80, 22, 80, 22],
        config(5_000),
    )
    .await;

    let report = result.expect("scan failed");
    assert_eq!(report.requested, vec![80, 22]);
    assert_eq!(report.results.len(), 2);
    assert!(!report.timed_out);
    assert_eq!(lan.probes().len(), 2);
}

#[tokio::test]
async fn unrelated_traffic_is_ignored() {
    let stranger = Ipv4Addr::new(192, 168, 1, 99);
    let stranger_mac = MacAddr(0xaa, 0, 0, 0, 0, 0x63);
    let lan = neighbour_lan()
        .with_noise([vec![0xde, 0xad, 0xbe, 0xef]])
        .with_chatter([
            // Another host claiming the port is open.
            tcp_segment(
                (stranger_mac, stranger, 443),
                (LOCAL_MAC, LOCAL_ADDR, 50_000),
                TcpFlags::SYN | TcpFlags::ACK,
            ),
            // The target talking to some other local socket.
            tcp_segment(
                (NEIGHBOUR_MAC, NEIGHBOUR, 443),
                (LOCAL_MAC, LOCAL_ADDR, 1),
                TcpFlags::SYN | TcpFlags::ACK,
            ),
            vec![0u8; 14],
        ]);

    let (_, result) = scan(
        lan,
        NEIGHBOUR,
        RouteInfo::direct(LOCAL_ADDR),
        vec![22, 80, 443],
        config(100),
    )
    .await;

    let report = result.expect("scan failed");
    assert_eq!(report.open(), vec![80]);
    assert_eq!(report.closed(), vec![22]);
    assert_eq!(report.filtered(), vec![443]);
}

#[tokio::test]
async fn overall_deadline_cuts_long_scans_short() {
    let ports: Vec<u16> = (1000..1500).collect();
    let cfg = config(200).with_deadline(DeadlinePolicy::Overall);

    let route = RouteInfo::direct(LOCAL_ADDR);
    let (lan, result) = scan(neighbour_lan(), NEIGHBOUR, route, ports, cfg).await;

    let report = result.expect("scan failed");
    assert!(report.timed_out);
    assert!(lan.probes().len() < 500, "sent {} probes", lan.probes().len());
}

#[tokio::test]
async fn since_last_send_deadline_probes_every_port() {
    let ports: Vec<u16> = (1000..1500).collect();
    let cfg = config(200).with_deadline(DeadlinePolicy::SinceLastSend);

    let route = RouteInfo::direct(LOCAL_ADDR);
    let (lan, result) = scan(neighbour_lan(), NEIGHBOUR, route, ports, cfg).await;

    let report = result.expect("scan failed");
    assert!(report.timed_out);
    assert_eq!(lan.probes().len(), 500);
    assert_eq!(report.filtered().len(), 500);
}

#[tokio::test]
async fn port_range_scan() {
    let spec: PortSpec = "20-25".parse().unwrap();
    let (_, result) = scan(
        neighbour_lan(),
        NEIGHBOUR,
        RouteInfo::direct(LOCAL_ADDR),
        spec.into_vec(),
        config(100),
    )
    .await;

    let report = result.expect("scan failed");
    assert_eq!(report.requested, vec![20, 21, 22, 23, 24, 25]);
    assert_eq!(report.closed(), vec![22]);
    assert!(report.open().is_empty());
    assert_eq!(report.filtered(), vec![20, 21, 23, 24, 25]);
}

/// Scans a real host. Needs capture privileges.
///
/// `SCANR_IFACE=eth0 SCANR_TARGET=192.168.1.1 cargo test -- --ignored live_scan`
#[tokio::test]
#[ignore]
async fn live_scan() {
    let (Ok(iface), Ok(target)) = (std::env::var("SCANR_IFACE"), std::env::var("SCANR_TARGET"))
    else {
        return;
    };
    let target: Ipv4Addr = target.parse().unwrap();

    let report = tokio::task::spawn_blocking(move || {
        let interface = LinkInterface::by_name(&iface)?;
        let mut rng = StdRng::from_os_rng();
        let cfg = ScanConfig::default();
        scanner::run_syn_scan(&interface, target, vec![22, 80, 443], &cfg, &mut rng, None)
    })
    .await
    .unwrap();

    let report = report.expect("live scan failed");
    assert_eq!(report.target, target);
    assert_eq!(report.requested, vec![22, 80, 443]);
}

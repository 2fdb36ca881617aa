use std::net::{IpAddr, Ipv4Addr, TcpListener};

pub const LOOPBACK: IpAddr = IpAddr::V4(Ipv4Addr::LOCALHOST);

/// A set of loopback listeners that stay open until dropped.
pub struct Listeners {
    listeners: Vec<TcpListener>,
}

impl Listeners {
    pub fn bind(ip: IpAddr, count: usize) -> Option<Self> {
        let listeners = (0..count)
            .map(|_| TcpListener::bind((ip, 0)))
            .collect::<Result<Vec<_>, _>>()
            .ok()?;
        Some(Self { listeners })
    }

    pub fn ports(&self) -> Vec<u16> {
        let mut ports: Vec<u16> = self
            .listeners
            .iter()
            .filter_map(|l| l.local_addr().ok())
            .map(|addr| addr.port())
            .collect();
        ports.sort_unstable();
        ports
    }
}

/// Ports the kernel handed out once and which are closed again.
pub fn closed_ports(count: usize) -> Vec<u16> {
    let listeners = Listeners::bind(LOOPBACK, count).expect("loopback bind");
    listeners.ports()
}

pub fn as_spec(ports: &[u16]) -> String {
    ports
        .iter()
        .map(u16::to_string)
        .collect::<Vec<String>>()
        .join(",")
}

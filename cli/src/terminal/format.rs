use std::net::IpAddr;

use colored::*;
use portsweep_core::ScanResult;

use crate::terminal::colors;

pub fn address_colored(addr: &IpAddr) -> ColoredString {
    match addr {
        IpAddr::V4(ipv4_addr) => ipv4_addr.to_string().color(colors::IPV4_ADDR),
        IpAddr::V6(ipv6_addr) => ipv6_addr.to_string().color(colors::IPV6_ADDR),
    }
}

/// `<address> - Port <n> is OPEN`
pub fn open_port_line(result: &ScanResult) -> String {
    format!(
        "{} {} {} {}",
        address_colored(&result.addr),
        "- Port".color(colors::TEXT_DEFAULT),
        result.port.to_string().color(colors::ACCENT).bold(),
        "is OPEN".green().bold()
    )
}

/// Collapses sorted ports into runs, e.g. `[22, 80, 81, 82, 443]` -> `"22, 80-82, 443"`.
pub fn port_ranges(ports: &[u16]) -> String {
    let mut runs: Vec<String> = Vec::new();
    let mut iter = ports.iter().copied().peekable();

    while let Some(start) = iter.next() {
        let mut end = start;
        while let Some(&next) = iter.peek() {
            if Some(next) != end.checked_add(1) {
                break;
            }
            end = next;
            iter.next();
        }

        if start == end {
            runs.push(start.to_string());
        } else {
            runs.push(format!("{start}-{end}"));
        }
    }

    runs.join(", ")
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::Ipv4Addr;

    #[test]
    fn port_ranges_collapses_runs() {
        assert_eq!(port_ranges(&[22, 80, 81, 82, 443]), "22, 80-82, 443");
        assert_eq!(port_ranges(&[1, 2]), "1-2");
        assert_eq!(port_ranges(&[7]), "7");
        assert_eq!(port_ranges(&[]), "");
    }

    #[test]
    fn port_ranges_handles_upper_boundary() {
        assert_eq!(port_ranges(&[65_533, 65_534, 65_535]), "65533-65535");
        let all: Vec<u16> = (1..=u16::MAX).collect();
        assert_eq!(port_ranges(&all), "1-65535");
    }

    #[test]
    fn open_port_line_matches_report_format() {
        let result = ScanResult::new(IpAddr::V4(Ipv4Addr::LOCALHOST), 8080);
        let line = open_port_line(&result);
        assert_eq!(
            console::strip_ansi_codes(&line),
            "127.0.0.1 - Port 8080 is OPEN"
        );
    }
}

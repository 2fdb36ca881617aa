use anyhow::Context;
use portsweep_common::ports::PortSet;

use crate::commands::Config;
use crate::terminal::{format, print};

pub fn ports(specs: &[String], cfg: &Config) -> anyhow::Result<()> {
    let set: PortSet = PortSet::parse(specs).context("invalid port specification")?;

    if cfg.quiet > 1 {
        print::print(&format::port_ranges(set.as_slice()));
        return Ok(());
    }

    print::aligned_line("Ports", format::port_ranges(set.as_slice()), 5);
    print::aligned_line("Count", set.len(), 5);
    Ok(())
}

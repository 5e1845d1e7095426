use clap::Parser;
use log::info;
use std::path::PathBuf;
use wakeonlan::config::Config;
use wakeonlan::transport::{LogOnlyTransport, UdpTransport};
use wakeonlan::WakeOnLan;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// MAC address to wake, in xx:xx:xx:xx:xx:xx or xx-xx-xx-xx-xx-xx form.
    #[arg(env = "WOL_MAC_ADDR")]
    mac_address: Option<String>,

    /// Address to send the magic packet to.
    #[arg(long, env = "WOL_BROADCAST_IP")]
    broadcast_ip: Option<String>,

    /// UDP port to send the magic packet to.
    #[arg(long, env = "WOL_PORT")]
    port: Option<u16>,

    /// JSON file with mac_address, broadcast_ip_address and port. Flags take precedence.
    #[arg(long)]
    config: Option<PathBuf>,

    /// If true, log the packet instead of sending it.
    #[arg(long)]
    dry_run: bool,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("INFO"))
        .format_timestamp(Some(env_logger::fmt::TimestampPrecision::Millis))
        .init();

    let mut builder = match &args.config {
        Some(path) => Config::load(path)?.builder(),
        None => WakeOnLan::builder(),
    };
    if let Some(mac_address) = &args.mac_address {
        builder = builder.mac_address(mac_address)?;
    }
    if let Some(ip) = args.broadcast_ip {
        builder = builder.broadcast_ip_address(ip);
    }
    if let Some(port) = args.port {
        builder = builder.port(port);
    }
    let wol = builder.build()?;

    if args.dry_run {
        wol.send(LogOnlyTransport)?;
    } else {
        wol.send(UdpTransport::bind()?)?;
    }
    info!(
        "sent magic packet for {} to {}:{}",
        wol.mac_address(),
        wol.broadcast_ip_address(),
        wol.port()
    );
    Ok(())
}

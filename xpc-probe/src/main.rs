//! X-Plane Connect 探测工具
//!
//! 连接插件、读取一组 DataRef 并打印结果，用于确认模拟器是否在线。
//!
//! 用法: `xpc-probe [host[:port]] [dataref...]`

use anyhow::{Context, Result};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;
use xpc_protocol::{ClientConfig, ProtocolError, XPlaneClient, DEFAULT_HOST, DEFAULT_XPLANE_PORT};

/// 未指定 DataRef 时读取的姿态与速度
const DEFAULT_DATAREFS: &[&str] = &[
    "sim/test/test_float",
    "sim/flightmodel/position/phi",
    "sim/flightmodel/position/theta",
    "sim/flightmodel/position/psi",
    "sim/flightmodel/position/local_vx",
    "sim/flightmodel/position/local_vy",
    "sim/flightmodel/position/local_vz",
];

/// 解析 `host[:port]`
fn parse_target(target: &str) -> Result<ClientConfig> {
    let config = match target.rsplit_once(':') {
        Some((host, port)) => {
            let port = port
                .parse::<u16>()
                .with_context(|| format!("invalid port in {target}"))?;
            ClientConfig::new(host).with_remote_port(port)
        }
        None => ClientConfig::new(target).with_remote_port(DEFAULT_XPLANE_PORT),
    };
    Ok(config)
}

#[tokio::main]
async fn main() -> Result<()> {
    // 初始化日志
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env()
                .add_directive("xpc_probe=debug".parse()?)
                .add_directive("xpc_protocol=debug".parse()?),
        )
        .init();

    let mut args = std::env::args().skip(1);
    let config = parse_target(args.next().as_deref().unwrap_or(DEFAULT_HOST))?;
    let mut names: Vec<String> = args.collect();
    if names.is_empty() {
        names = DEFAULT_DATAREFS.iter().map(|s| s.to_string()).collect();
    }

    info!("Probing X-Plane at {}:{}", config.host, config.remote_port);

    let mut client = XPlaneClient::connect(&config).await?;
    let result = probe(&mut client, &names).await;
    client.close()?;
    result
}

async fn probe(client: &mut XPlaneClient, names: &[String]) -> Result<()> {
    for name in names {
        match client.get_dataref(name).await {
            Ok(values) => println!("{name} = {values:?}"),
            Err(ProtocolError::Timeout) => {
                warn!("{} timed out", name);
                println!("{name} = <timeout>");
            }
            Err(e) => return Err(e).with_context(|| format!("reading {name}")),
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_target_with_port() {
        let config = parse_target("192.168.1.175:49010").unwrap();
        assert_eq!(config.host, "192.168.1.175");
        assert_eq!(config.remote_port, 49010);
    }

    #[test]
    fn test_parse_target_default_port() {
        let config = parse_target("xplane.local").unwrap();
        assert_eq!(config.host, "xplane.local");
        assert_eq!(config.remote_port, DEFAULT_XPLANE_PORT);
    }

    #[test]
    fn test_parse_target_library_default() {
        let config = parse_target(DEFAULT_HOST).unwrap();
        assert_eq!(config, ClientConfig::default());
    }

    #[test]
    fn test_parse_target_bad_port() {
        assert!(parse_target("localhost:notaport").is_err());
    }
}

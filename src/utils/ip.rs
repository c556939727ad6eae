//! IP 地址处理工具
//!
//! 客户端 IP 提取：默认使用连接对端地址，只有对端命中
//! `server.trusted_proxies`（单 IP 或 CIDR）时才信任转发头。
//! 转发头中的值必须能解析为 IP，否则忽略，结果总是规范化的地址文本。

use std::net::{IpAddr, SocketAddr};

use actix_web::HttpRequest;
use actix_web::http::header::HeaderMap;
use tracing::debug;

/// 解析 `ip` 或 `ip:port`
pub fn parse_ip(value: &str) -> Option<IpAddr> {
    let value = value.trim();
    // 先尝试解析为 SocketAddr（支持 ip:port），如果失败再尝试纯 IpAddr
    value
        .parse::<SocketAddr>()
        .map(|socket_addr| socket_addr.ip())
        .or_else(|_| value.parse::<IpAddr>())
        .ok()
}

/// 检查 IP 是否在可信代理列表中
pub fn is_trusted_proxy(ip: &str, trusted_proxies: &[String]) -> bool {
    let Some(ip_addr) = parse_ip(ip) else {
        return false;
    };

    trusted_proxies.iter().any(|proxy| {
        if proxy.contains('/') {
            ip_in_cidr(&ip_addr, proxy)
        } else {
            proxy
                .parse::<IpAddr>()
                .is_ok_and(|proxy_addr| proxy_addr == ip_addr)
        }
    })
}

/// CIDR 检查
pub fn ip_in_cidr(ip: &IpAddr, cidr: &str) -> bool {
    let Some((network, prefix_len)) = cidr.split_once('/') else {
        return false;
    };

    let Ok(prefix_len): Result<u8, _> = prefix_len.parse() else {
        return false;
    };

    let Ok(network_addr) = network.parse::<IpAddr>() else {
        return false;
    };

    match (ip, network_addr) {
        (IpAddr::V4(ip), IpAddr::V4(net)) => {
            if prefix_len > 32 {
                return false;
            }
            let mask = u32::MAX.checked_shl(32 - prefix_len as u32).unwrap_or(0);
            let ip_bits = u32::from_be_bytes(ip.octets());
            let net_bits = u32::from_be_bytes(net.octets());
            (ip_bits & mask) == (net_bits & mask)
        }
        (IpAddr::V6(ip), IpAddr::V6(net)) => {
            if prefix_len > 128 {
                return false;
            }
            let mask = u128::MAX.checked_shl(128 - prefix_len as u32).unwrap_or(0);
            let ip_bits = u128::from_be_bytes(ip.octets());
            let net_bits = u128::from_be_bytes(net.octets());
            (ip_bits & mask) == (net_bits & mask)
        }
        _ => false, // IPv4 vs IPv6 不匹配
    }
}

/// 核心逻辑：给定对端地址和请求头决定客户端 IP
pub fn resolve_client_ip(
    peer_ip: Option<IpAddr>,
    headers: &HeaderMap,
    trusted_proxies: &[String],
) -> Option<String> {
    let peer_ip = peer_ip?;

    if !trusted_proxies.is_empty() && is_trusted_proxy(&peer_ip.to_string(), trusted_proxies) {
        let real_ip = extract_forwarded_ip_from_headers(headers).unwrap_or(peer_ip);
        debug!("Trusted proxy: {} -> {}", peer_ip, real_ip);
        return Some(real_ip.to_string());
    }

    Some(peer_ip.to_string())
}

/// 从 HttpRequest 提取真实客户端 IP
pub fn extract_client_ip(req: &HttpRequest, trusted_proxies: &[String]) -> Option<String> {
    resolve_client_ip(
        req.peer_addr().map(|addr| addr.ip()),
        req.headers(),
        trusted_proxies,
    )
}

/// 从 HeaderMap 提取转发的 IP，无法解析的值视为缺失
pub fn extract_forwarded_ip_from_headers(headers: &HeaderMap) -> Option<IpAddr> {
    // 优先 X-Forwarded-For（取第一个，即原始客户端 IP）
    headers
        .get("x-forwarded-for")
        .and_then(|h| h.to_str().ok())
        .and_then(|s| s.split(',').next())
        .and_then(parse_ip)
        .or_else(|| {
            // 其次 X-Real-IP
            headers
                .get("x-real-ip")
                .and_then(|h| h.to_str().ok())
                .and_then(parse_ip)
        })
}

//! config-rs/lib.rs
//! Shared configuration utilities for consistent service configuration
//! Provides standardized functions for port/address management

use std::env;
use std::net::{Ipv4Addr, SocketAddr};

/// Service name used by the privileged callable functions.
pub const ADMIN_FUNCTIONS: &str = "ADMIN_FUNCTIONS";

/// Get service port from environment variables with proper fallback
///
/// # Arguments
/// * `service_name` - The name of the service (e.g., "ADMIN_FUNCTIONS")
/// * `default_port` - The default port to use if not specified in environment
pub fn get_service_port(service_name: &str, default_port: u16) -> u16 {
    let var_name = format!("{}_SERVICE_PORT", service_name.to_uppercase());
    match env::var(&var_name) {
        Ok(value) => value.parse::<u16>().unwrap_or_else(|_| {
            log::warn!("Invalid port in {}, using default {}", var_name, default_port);
            default_port
        }),
        Err(_) => default_port,
    }
}

/// Create a SocketAddr for binding a service
///
/// A full `{SERVICE}_SERVICE_ADDR` override wins; `http://host:port` forms
/// are accepted. Otherwise binds all interfaces on the resolved port.
pub fn get_bind_address(service_name: &str, default_port: u16) -> SocketAddr {
    let var_name = format!("{}_SERVICE_ADDR", service_name.to_uppercase());

    if let Ok(addr_str) = env::var(&var_name) {
        let trimmed = addr_str
            .strip_prefix("http://")
            .or_else(|| addr_str.strip_prefix("https://"))
            .unwrap_or(&addr_str);
        match trimmed.parse::<SocketAddr>() {
            Ok(addr) => return addr,
            Err(_) => log::warn!("Invalid address format in {}, using default", var_name),
        }
    }

    let port = get_service_port(service_name, default_port);
    SocketAddr::from((Ipv4Addr::UNSPECIFIED, port))
}

/// Get client connection address for connecting to a service
///
/// # Arguments
/// * `service_name` - The name of the service (e.g., "ADMIN_FUNCTIONS")
/// * `default_port` - The default port to use if not specified in environment
/// * `host` - Optional host to use if not specified in environment (default: "localhost")
pub fn get_client_address(service_name: &str, default_port: u16, host: Option<&str>) -> String {
    let addr_var_name = format!("{}_SERVICE_ADDR", service_name.to_uppercase());

    if let Ok(addr) = env::var(&addr_var_name) {
        return addr;
    }

    let port = get_service_port(service_name, default_port);
    let host = host.unwrap_or("localhost");
    format!("http://{}:{}", host, port)
}

/// Get service name for logging and monitoring
pub fn get_formatted_service_name(service_name: &str) -> String {
    match service_name {
        ADMIN_FUNCTIONS => "admin-functions".to_string(),
        "ADMIN_CONSOLE" => "admin-console".to_string(),
        _ => format!("{}-service", service_name.to_lowercase().replace('_', "-")),
    }
}

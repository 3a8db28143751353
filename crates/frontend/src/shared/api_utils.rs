//! API utilities for frontend-backend communication
//!
//! Provides helper functions for constructing API URLs.

/// Get the base URL for API requests
///
/// Constructs the API base URL from the current window location
/// and the backend port from configuration.
///
/// # Returns
/// - API base URL like "http://localhost:3000"
/// - Empty string if window is not available (relative URLs are used then)
pub fn api_base(port: u16) -> String {
    let window = match web_sys::window() {
        Some(w) => w,
        None => return String::new(),
    };
    let location = window.location();
    let protocol = location.protocol().unwrap_or_else(|_| "http:".to_string());
    let hostname = location
        .hostname()
        .unwrap_or_else(|_| "127.0.0.1".to_string());
    join_base(&protocol, &hostname, port)
}

fn join_base(protocol: &str, hostname: &str, port: u16) -> String {
    format!("{}//{}:{}", protocol, hostname, port)
}

/// Build a full API URL from a path
pub fn api_url(port: u16, path: &str) -> String {
    format!("{}{}", api_base(port), path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_join_base() {
        assert_eq!(join_base("https:", "shop.example", 3000), "https://shop.example:3000");
    }
}

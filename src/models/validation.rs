//! Input predicates for export paths, client addresses and permissions
//!
//! These are the only gate in front of durable state: every mutating
//! operation runs them on all affected fields before any file is touched.

/// Characters that may not appear anywhere in an export path
const FORBIDDEN_PATH_CHARS: &[char] = &['<', '>', ':', '"', '|', '?', '*'];

/// Check that a path is absolute, free of traversal and of forbidden characters
pub fn is_valid_path(path: &str) -> bool {
    if path.is_empty() || !path.starts_with('/') {
        return false;
    }

    if path.contains("//") {
        return false;
    }

    if path.split('/').any(|segment| segment == "..") {
        return false;
    }

    !path.contains(FORBIDDEN_PATH_CHARS)
}

/// Check that an address is a dotted-quad IPv4 address, optionally with a CIDR prefix
pub fn is_valid_address(address: &str) -> bool {
    let (ip, prefix) = match address.split_once('/') {
        Some((ip, prefix)) => (ip, Some(prefix)),
        None => (address, None),
    };

    if let Some(prefix) = prefix {
        if !is_valid_prefix(prefix) {
            return false;
        }
    }

    let octets: Vec<&str> = ip.split('.').collect();
    octets.len() == 4 && octets.iter().all(|octet| is_valid_octet(octet))
}

/// Check that a permission is exactly `ro` or `rw`
pub fn is_valid_permission(permission: &str) -> bool {
    matches!(permission, "ro" | "rw")
}

fn is_valid_octet(octet: &str) -> bool {
    if octet.is_empty() || octet.len() > 3 || !octet.bytes().all(|b| b.is_ascii_digit()) {
        return false;
    }
    octet.parse::<u16>().map_or(false, |value| value <= 255)
}

fn is_valid_prefix(prefix: &str) -> bool {
    if prefix.is_empty() || prefix.len() > 2 || !prefix.bytes().all(|b| b.is_ascii_digit()) {
        return false;
    }
    // "05" is not a prefix length
    if prefix.len() == 2 && prefix.starts_with('0') {
        return false;
    }
    prefix.parse::<u8>().map_or(false, |value| value <= 32)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_paths() {
        assert!(is_valid_path("/"));
        assert!(is_valid_path("/srv/nfs"));
        assert!(is_valid_path("/data/share-01/"));
        assert!(is_valid_path("/data/v1..backup"));
    }

    #[test]
    fn test_invalid_paths() {
        assert!(!is_valid_path(""));
        assert!(!is_valid_path("relative/path"));
        assert!(!is_valid_path("/srv/../etc"));
        assert!(!is_valid_path("/srv/.."));
        assert!(!is_valid_path("/srv//nfs"));
        assert!(!is_valid_path("/srv/nfs?x"));
        assert!(!is_valid_path("/srv/a:b"));
        assert!(!is_valid_path("/srv/<share>"));
        assert!(!is_valid_path("/srv/\"quoted\""));
        assert!(!is_valid_path("/srv/a|b"));
        assert!(!is_valid_path("/srv/*"));
    }

    #[test]
    fn test_valid_addresses() {
        assert!(is_valid_address("192.168.1.10"));
        assert!(is_valid_address("0.0.0.0"));
        assert!(is_valid_address("255.255.255.255"));
        assert!(is_valid_address("10.0.0.0/8"));
        assert!(is_valid_address("192.168.0.0/0"));
        assert!(is_valid_address("192.168.0.0/32"));
    }

    #[test]
    fn test_invalid_addresses() {
        assert!(!is_valid_address("999.1.1.1"));
        assert!(!is_valid_address("256.0.0.1"));
        assert!(!is_valid_address("1.2.3"));
        assert!(!is_valid_address("1.2.3.4.5"));
        assert!(!is_valid_address("1.2.3.4/33"));
        assert!(!is_valid_address("1.2.3.4/"));
        assert!(!is_valid_address("1.2.3.4/05"));
        assert!(!is_valid_address("1.2.3.a"));
        assert!(!is_valid_address("::1"));
        assert!(!is_valid_address("fileserver.local"));
        assert!(!is_valid_address(""));
    }

    #[test]
    fn test_permissions() {
        assert!(is_valid_permission("ro"));
        assert!(is_valid_permission("rw"));
        assert!(!is_valid_permission("execute"));
        assert!(!is_valid_permission("RO"));
        assert!(!is_valid_permission(""));
    }
}

//! Value parsers for CLI arguments that clap cannot check on its own.

use std::net::Ipv4Addr;
use std::path::PathBuf;

/// Longest host name accepted by DNS.
const MAX_HOST_LEN: usize = 253;

/// Most migrations a single rollback may revert.
const MAX_ROLLBACK_STEPS: u32 = 100;

pub fn validate_port(value: &str) -> Result<u16, String> {
    match value.parse::<u16>() {
        Ok(0) => Err("port 0 is not allowed; use 1-65535".to_string()),
        Ok(port) => Ok(port),
        Err(_) => Err(format!("'{value}' is not a port number between 1 and 65535")),
    }
}

/// The file must exist and be readable.
pub fn validate_config_file_path(value: &str) -> Result<PathBuf, String> {
    let path = PathBuf::from(value);
    if !path.is_file() {
        return Err(format!("configuration file '{value}' does not exist or is not a file"));
    }
    std::fs::File::open(&path)
        .map(|_| path)
        .map_err(|e| format!("cannot read configuration file '{value}': {e}"))
}

pub fn validate_rollback_steps(value: &str) -> Result<u32, String> {
    let steps: u32 = value
        .parse()
        .map_err(|_| format!("'{value}' is not a positive number of steps"))?;
    if steps == 0 || steps > MAX_ROLLBACK_STEPS {
        return Err(format!(
            "rollback steps must be between 1 and {MAX_ROLLBACK_STEPS}"
        ));
    }
    Ok(steps)
}

/// Accepts IPv4 addresses and host names. Dotted numbers must be a valid IPv4 address.
pub fn validate_host_address(value: &str) -> Result<String, String> {
    let host = value.trim();
    if host.is_empty() {
        return Err("host address cannot be empty".to_string());
    }
    if host.contains(char::is_whitespace) {
        return Err("host address cannot contain spaces".to_string());
    }
    if host.len() > MAX_HOST_LEN {
        return Err(format!(
            "host address is longer than {MAX_HOST_LEN} characters"
        ));
    }
    if host.chars().all(|c| c.is_ascii_digit() || c == '.') && host.parse::<Ipv4Addr>().is_err() {
        return Err(format!("invalid IPv4 address '{value}'"));
    }
    Ok(host.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_ports() {
        for port in ["1", "80", "8080", "65535"] {
            assert!(validate_port(port).is_ok(), "{port} should be valid");
        }
        for port in ["0", "65536", "abc", "-1", ""] {
            assert!(validate_port(port).is_err(), "{port} should be invalid");
        }
    }

    #[test]
    fn test_hosts() {
        for host in ["localhost", "127.0.0.1", "0.0.0.0", "api.moim.io"] {
            assert!(validate_host_address(host).is_ok(), "{host} should be valid");
        }
        let too_long = "x".repeat(300);
        for host in ["", "   ", "my host", "999.1.1.1", too_long.as_str()] {
            assert!(validate_host_address(host).is_err(), "'{host}' should be invalid");
        }
    }

    #[test]
    fn test_rollback_steps() {
        assert_eq!(validate_rollback_steps("3"), Ok(3));
        for steps in ["0", "101", "-1", "two"] {
            assert!(validate_rollback_steps(steps).is_err(), "{steps} should be invalid");
        }
    }

    #[test]
    fn test_config_file_path() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "[server]").unwrap();
        let path = file.path().to_string_lossy().to_string();
        assert_eq!(validate_config_file_path(&path).unwrap(), file.path());

        assert!(validate_config_file_path("/definitely/not/here.toml").is_err());
    }
}

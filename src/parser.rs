//! Parsing of raw provider records.
//!
//! A record looks like `host:port[:extra];username;password`. Anything after
//! the port in the first field is ignored.

use crate::error::{Result, RotatorError};
use crate::proxy::ProxyDescriptor;

/// Whether username and password fields must be present in a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CredentialMode {
    /// Records without both credential fields are malformed.
    #[default]
    Required,
    /// Missing credential fields become empty strings.
    Optional,
}

impl CredentialMode {
    pub(crate) fn for_request(include_credentials: bool) -> Self {
        if include_credentials {
            Self::Required
        } else {
            Self::Optional
        }
    }
}

/// Record text safe to surface in errors: everything after the address is
/// replaced, since it holds credentials.
fn redacted(record: &str) -> String {
    match record.split_once(';') {
        Some((address, _)) => format!("{address};<redacted>"),
        None => record.to_string(),
    }
}

fn malformed(record: &str, reason: &'static str) -> RotatorError {
    RotatorError::MalformedRecord {
        record: redacted(record),
        reason,
    }
}

/// Parse one record, requiring credentials.
pub fn parse_record(record: &str) -> Result<ProxyDescriptor> {
    parse_record_with(record, CredentialMode::Required)
}

/// Parse one record with the given credential mode.
pub fn parse_record_with(record: &str, mode: CredentialMode) -> Result<ProxyDescriptor> {
    let line = record.trim();
    let mut fields = line.split(';');

    // split always yields at least one item
    let address = fields.next().unwrap_or_default();
    let mut address_parts = address.split(':');
    let (host, port) = match (address_parts.next(), address_parts.next()) {
        (Some(host), Some(port)) => (host.trim(), port.trim()),
        _ => return Err(malformed(line, "expected host:port")),
    };
    if host.is_empty() {
        return Err(malformed(line, "empty host"));
    }
    let port: u16 = port
        .parse()
        .map_err(|_| malformed(line, "invalid port"))?;

    let (username, password) = match (fields.next(), fields.next(), mode) {
        (Some(user), Some(pass), _) => (user.trim(), pass.trim()),
        (user, _, CredentialMode::Optional) => (user.map(str::trim).unwrap_or_default(), ""),
        (_, _, CredentialMode::Required) => {
            return Err(malformed(line, "missing username/password fields"))
        }
    };

    Ok(ProxyDescriptor::new(host, port, username, password))
}

/// Parse records in order, requiring credentials. Fails on the first malformed record.
pub fn parse_records<I, S>(records: I) -> Result<Vec<ProxyDescriptor>>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    parse_records_with(records, CredentialMode::Required)
}

/// Parse records in order with the given credential mode.
pub fn parse_records_with<I, S>(records: I, mode: CredentialMode) -> Result<Vec<ProxyDescriptor>>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    records
        .into_iter()
        .map(|record| parse_record_with(record.as_ref(), mode))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full_record() {
        let proxy = parse_record("1.2.3.4:8080;alice;secret").unwrap();
        assert_eq!(proxy.host(), "1.2.3.4");
        assert_eq!(proxy.port(), 8080);
        assert_eq!(proxy.username(), "alice");
        assert_eq!(proxy.password(), "secret");
    }

    #[test]
    fn test_parse_ignores_extra_address_parts() {
        let proxy = parse_record("5.6.7.8:1080:ipv4;bob;pw\r\n").unwrap();
        assert_eq!(proxy, ProxyDescriptor::new("5.6.7.8", 1080, "bob", "pw"));
    }

    #[test]
    fn test_missing_credentials_is_malformed() {
        let err = parse_record("1.2.3.4:8080").unwrap_err();
        assert!(matches!(
            err,
            RotatorError::MalformedRecord { ref record, .. } if record == "1.2.3.4:8080"
        ));

        assert!(matches!(
            parse_record("1.2.3.4:8080;alice"),
            Err(RotatorError::MalformedRecord { .. })
        ));
    }

    #[test]
    fn test_malformed_record_hides_credentials() {
        let err = parse_record("1.2.3.4:http;alice;hunter2").unwrap_err();
        assert!(matches!(
            err,
            RotatorError::MalformedRecord { ref record, reason: "invalid port" }
                if record == "1.2.3.4:http;<redacted>"
        ));
        assert!(!err.to_string().contains("hunter2"));
        assert!(!format!("{err:?}").contains("alice"));
    }

    #[test]
    fn test_optional_credentials() {
        let proxy = parse_record_with("1.2.3.4:8080", CredentialMode::Optional).unwrap();
        assert_eq!(proxy, ProxyDescriptor::new("1.2.3.4", 8080, "", ""));
        assert!(!proxy.has_credentials());
    }

    #[test]
    fn test_bad_address_segment() {
        for record in ["1.2.3.4;alice;secret", ":8080;a;b", "host:port;a;b", "host:70000;a;b", ""] {
            assert!(
                matches!(parse_record(record), Err(RotatorError::MalformedRecord { .. })),
                "{record:?} should be rejected"
            );
        }
    }

    #[test]
    fn test_parse_records_keeps_order_and_duplicates() {
        let proxies = parse_records([
            "10.0.0.1:1000;a;a",
            "10.0.0.2:2000;b;b",
            "10.0.0.1:1000;a;a",
        ])
        .unwrap();
        assert_eq!(proxies.len(), 3);
        assert_eq!(proxies[0], proxies[2]);
        assert_eq!(proxies[1].host(), "10.0.0.2");
    }

    #[test]
    fn test_parse_records_surfaces_first_bad_record() {
        let err = parse_records(vec!["10.0.0.1:1000;a;a", "garbage"]).unwrap_err();
        assert!(matches!(
            err,
            RotatorError::MalformedRecord { ref record, .. } if record == "garbage"
        ));
    }
}

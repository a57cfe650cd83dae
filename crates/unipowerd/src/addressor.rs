// Request addressing
//
// Every power operation targets one switch port, carried in headers:
// `X-Port` (required, 1-based decimal) and `X-Device` (the switch MAC,
// required by the controller backend unless a static default device is
// configured). Pure functions over header values; no I/O.

use axum::http::HeaderMap;
use thiserror::Error;

use unipower_api::PortTarget;

/// Header naming the 1-based switch port.
pub const PORT_HEADER: &str = "X-Port";

/// Header naming the switch (MAC address for the controller backend).
pub const DEVICE_HEADER: &str = "X-Device";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum AddressError {
    #[error("X-Port header is required")]
    MissingPort,

    #[error("invalid port number {value:?}")]
    InvalidPort { value: String },

    #[error("invalid port number: port must be positive, got {value}")]
    NonPositivePort { value: i64 },

    #[error("X-Device header is required and no default device is configured")]
    MissingDevice,
}

/// Resolve the request target from headers and the configured default.
///
/// `requires_device` comes from the backend's capability flag: the
/// controller backend addresses devices by MAC, the SSH backend is bound
/// to a single switch and ignores the device half entirely.
pub fn extract_target(
    headers: &HeaderMap,
    default_device: Option<&str>,
    requires_device: bool,
) -> Result<PortTarget, AddressError> {
    let port = extract_port(headers)?;

    let device = headers
        .get(DEVICE_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .or(default_device)
        .map(str::to_owned);

    if requires_device && device.is_none() {
        return Err(AddressError::MissingDevice);
    }

    Ok(PortTarget::new(device, port))
}

/// Parse the port header. Absent and blank are both `MissingPort`;
/// non-numeric text is `InvalidPort`; zero and negatives are rejected
/// (ports are 1-based throughout).
fn extract_port(headers: &HeaderMap) -> Result<u32, AddressError> {
    let raw = headers
        .get(PORT_HEADER)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .trim();

    if raw.is_empty() {
        return Err(AddressError::MissingPort);
    }

    let value: i64 = raw.parse().map_err(|_| AddressError::InvalidPort {
        value: raw.to_owned(),
    })?;

    if value < 1 {
        return Err(AddressError::NonPositivePort { value });
    }

    u32::try_from(value).map_err(|_| AddressError::InvalidPort {
        value: raw.to_owned(),
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn headers(pairs: &[(&str, &str)]) -> HeaderMap {
        let mut map = HeaderMap::new();
        for (name, value) in pairs {
            map.insert(
                axum::http::HeaderName::try_from(*name).unwrap(),
                value.parse().unwrap(),
            );
        }
        map
    }

    #[test]
    fn valid_ports_pass_through_unchanged() {
        for port in ["1", "3", "48", " 7 "] {
            let target =
                extract_target(&headers(&[("X-Port", port)]), None, false).unwrap();
            assert_eq!(target.port, port.trim().parse::<u32>().unwrap());
        }
    }

    #[test]
    fn missing_or_blank_port_is_rejected() {
        assert_eq!(
            extract_target(&headers(&[]), None, false),
            Err(AddressError::MissingPort)
        );
        assert_eq!(
            extract_target(&headers(&[("X-Port", "   ")]), None, false),
            Err(AddressError::MissingPort)
        );
    }

    #[test]
    fn non_numeric_port_is_invalid() {
        for port in ["abc", "3.5", "0x10", ""] {
            let result = extract_target(&headers(&[("X-Port", port)]), None, false);
            assert!(
                matches!(
                    result,
                    Err(AddressError::InvalidPort { .. }) | Err(AddressError::MissingPort)
                ),
                "port {port:?} gave {result:?}"
            );
        }
    }

    #[test]
    fn zero_and_negative_ports_are_rejected() {
        assert_eq!(
            extract_target(&headers(&[("X-Port", "0")]), None, false),
            Err(AddressError::NonPositivePort { value: 0 })
        );
        assert_eq!(
            extract_target(&headers(&[("X-Port", "-3")]), None, false),
            Err(AddressError::NonPositivePort { value: -3 })
        );
    }

    #[test]
    fn device_header_beats_configured_default() {
        let target = extract_target(
            &headers(&[("X-Port", "1"), ("X-Device", "aa:bb:cc:dd:ee:ff")]),
            Some("11:22:33:44:55:66"),
            true,
        )
        .unwrap();
        assert_eq!(target.device.as_deref(), Some("aa:bb:cc:dd:ee:ff"));
    }

    #[test]
    fn default_device_fills_in_when_header_is_absent() {
        let target = extract_target(
            &headers(&[("X-Port", "1")]),
            Some("11:22:33:44:55:66"),
            true,
        )
        .unwrap();
        assert_eq!(target.device.as_deref(), Some("11:22:33:44:55:66"));
    }

    #[test]
    fn missing_device_only_matters_when_the_backend_needs_it() {
        assert_eq!(
            extract_target(&headers(&[("X-Port", "1")]), None, true),
            Err(AddressError::MissingDevice)
        );

        let target = extract_target(&headers(&[("X-Port", "1")]), None, false).unwrap();
        assert_eq!(target.device, None);
    }
}

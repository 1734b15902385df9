//! Stream address parsing
//!
//! Only plain `http://` is supported; the amplifier board has no TLS.

use core::fmt::Write;

use heapless::String;

use crate::config::MAX_URL_LEN;

/// Default HTTP port
pub const HTTP_PORT: u16 = 80;

/// URL parsing errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum UrlError {
    /// Scheme other than `http://`
    UnsupportedScheme,
    /// No host between the scheme and the path
    EmptyHost,
    /// Port is not a number in 1..=65535
    InvalidPort,
    /// Address does not fit the stream address buffer
    TooLong,
}

/// Copy an address into an owned buffer
pub fn own_address(address: &str) -> Result<String<MAX_URL_LEN>, UrlError> {
    let mut owned = String::new();
    owned
        .push_str(address.trim())
        .map_err(|_| UrlError::TooLong)?;
    Ok(owned)
}

/// Borrowed view of an `http://host[:port]/path` address
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Url<'a> {
    pub host: &'a str,
    pub port: u16,
    /// Path including query, always starting with '/'
    pub path: &'a str,
}

impl<'a> Url<'a> {
    /// Parse an address
    pub fn parse(input: &'a str) -> Result<Self, UrlError> {
        let input = input.trim();
        let scheme_end = input.find("://").ok_or(UrlError::UnsupportedScheme)?;
        if !input[..scheme_end].eq_ignore_ascii_case("http") {
            return Err(UrlError::UnsupportedScheme);
        }

        let rest = &input[scheme_end + 3..];
        let (authority, path) = match rest.find(['/', '?']) {
            Some(i) if rest.as_bytes()[i] == b'?' => (&rest[..i], "/"),
            Some(i) => (&rest[..i], &rest[i..]),
            None => (rest, "/"),
        };

        let (host, port) = match authority.rsplit_once(':') {
            Some((host, port)) => {
                let port: u16 = port.parse().map_err(|_| UrlError::InvalidPort)?;
                if port == 0 {
                    return Err(UrlError::InvalidPort);
                }
                (host, port)
            }
            None => (authority, HTTP_PORT),
        };

        if host.is_empty() {
            return Err(UrlError::EmptyHost);
        }

        Ok(Self { host, port, path })
    }

    /// Last path segment without query, lowercase comparison left to caller
    pub fn file_name(&self) -> &'a str {
        let path = self.path.split(['?', '#']).next().unwrap_or(self.path);
        path.rsplit('/').next().unwrap_or(path)
    }

    /// Resolve a redirect target or playlist entry against this address
    ///
    /// Absolute addresses are taken as they are. `//host/..` keeps the
    /// scheme, `/path` keeps host and port, anything else replaces the last
    /// path segment.
    pub fn join(&self, location: &str) -> Result<String<MAX_URL_LEN>, UrlError> {
        let location = location.trim();
        if location.contains("://") {
            return own_address(location);
        }

        let mut out = String::new();
        let written = match location.strip_prefix("//") {
            Some(rest) => write!(out, "http://{}", rest),
            None => {
                let dir = if location.starts_with('/') {
                    ""
                } else {
                    let path = self.path.split(['?', '#']).next().unwrap_or(self.path);
                    &path[..path.rfind('/').map_or(0, |i| i + 1)]
                };
                if self.port == HTTP_PORT {
                    write!(out, "http://{}{}{}", self.host, dir, location)
                } else {
                    write!(out, "http://{}:{}{}{}", self.host, self.port, dir, location)
                }
            }
        };
        written.map_err(|_| UrlError::TooLong)?;
        Ok(out)
    }
}

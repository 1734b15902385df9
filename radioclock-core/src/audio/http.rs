//! Minimal HTTP/1.0 client helpers
//!
//! Just enough to fetch a playlist or open a Shoutcast/Icecast stream:
//! build a GET request, find the end of the response head and pull out
//! the few headers that matter.

use core::fmt::Write;

use heapless::String;

use super::url::{Url, HTTP_PORT};

/// Redirects followed before giving up
pub const MAX_REDIRECTS: u8 = 5;

/// Largest response head accepted
pub const MAX_HEAD_LEN: usize = 2048;

/// Largest request generated
pub const MAX_REQUEST_LEN: usize = 512;

/// HTTP errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum HttpError {
    /// Request does not fit the buffer
    RequestTooLarge,
    /// Response head does not fit the buffer
    HeadTooLarge,
    /// Status line or header could not be parsed
    Malformed,
    /// Server answered with an unexpected status
    Status(u16),
    /// Redirect without a Location header
    MissingLocation,
    /// Redirect chain longer than [`MAX_REDIRECTS`]
    TooManyRedirects,
}

/// Build a GET request asking for in-band stream metadata
pub fn write_request(
    url: &Url<'_>,
    user_agent: &str,
) -> Result<String<MAX_REQUEST_LEN>, HttpError> {
    let mut req = String::new();
    write_request_into(&mut req, url, user_agent).map_err(|_| HttpError::RequestTooLarge)?;
    Ok(req)
}

fn write_request_into(
    out: &mut impl Write,
    url: &Url<'_>,
    user_agent: &str,
) -> core::fmt::Result {
    write!(out, "GET {} HTTP/1.0\r\n", url.path)?;
    if url.port == HTTP_PORT {
        write!(out, "Host: {}\r\n", url.host)?;
    } else {
        write!(out, "Host: {}:{}\r\n", url.host, url.port)?;
    }
    write!(out, "User-Agent: {}\r\n", user_agent)?;
    out.write_str("Accept: */*\r\nIcy-MetaData: 1\r\nConnection: close\r\n\r\n")
}

/// Length of the response head including the blank line, if complete
pub fn find_head_end(buf: &[u8]) -> Option<usize> {
    let crlf = buf.windows(4).position(|w| w == b"\r\n\r\n").map(|i| i + 4);
    let lf = buf.windows(2).position(|w| w == b"\n\n").map(|i| i + 2);
    match (crlf, lf) {
        (Some(a), Some(b)) => Some(a.min(b)),
        (a, b) => a.or(b),
    }
}

/// What to do after reading a response head
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Disposition<'a> {
    /// Body follows
    Body,
    /// Fetch this address instead
    Redirect(&'a str),
}

/// Parsed response head
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ResponseHead<'a> {
    pub status: u16,
    pub location: Option<&'a str>,
    pub content_type: Option<&'a str>,
    /// Audio bytes between metadata blocks
    pub metaint: Option<usize>,
    /// Station name
    pub name: Option<&'a str>,
}

impl<'a> ResponseHead<'a> {
    /// Parse a complete response head
    ///
    /// Accepts `HTTP/1.x` and Shoutcast `ICY` status lines.
    pub fn parse(head: &'a [u8]) -> Result<Self, HttpError> {
        let text = core::str::from_utf8(head).map_err(|_| HttpError::Malformed)?;
        let mut lines = text.lines();

        let status_line = lines.next().ok_or(HttpError::Malformed)?;
        let mut parts = status_line.split_whitespace();
        let protocol = parts.next().ok_or(HttpError::Malformed)?;
        if !protocol.starts_with("HTTP/") && protocol != "ICY" {
            return Err(HttpError::Malformed);
        }
        let status = parts
            .next()
            .and_then(|s| s.parse().ok())
            .ok_or(HttpError::Malformed)?;

        let mut parsed = Self {
            status,
            location: None,
            content_type: None,
            metaint: None,
            name: None,
        };

        for line in lines {
            let Some((name, value)) = line.split_once(':') else {
                continue;
            };
            let value = value.trim();
            let name = name.trim();

            if name.eq_ignore_ascii_case("location") {
                parsed.location = Some(value);
            } else if name.eq_ignore_ascii_case("content-type") {
                parsed.content_type = Some(value);
            } else if name.eq_ignore_ascii_case("icy-metaint") {
                let interval = value.parse().map_err(|_| HttpError::Malformed)?;
                parsed.metaint = (interval > 0).then_some(interval);
            } else if name.eq_ignore_ascii_case("icy-name") {
                parsed.name = Some(value);
            }
        }

        Ok(parsed)
    }

    /// Decide how to continue
    pub fn disposition(&self) -> Result<Disposition<'a>, HttpError> {
        match self.status {
            200 => Ok(Disposition::Body),
            301 | 302 | 303 | 307 | 308 => self
                .location
                .map(Disposition::Redirect)
                .ok_or(HttpError::MissingLocation),
            other => Err(HttpError::Status(other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_default_port() {
        let url = Url::parse("http://www.byte.fm/stream/bytefm.m3u").unwrap();
        let req = write_request(&url, "Elac RD100").unwrap();
        assert_eq!(
            req.as_str(),
            "GET /stream/bytefm.m3u HTTP/1.0\r\n\
             Host: www.byte.fm\r\n\
             User-Agent: Elac RD100\r\n\
             Accept: */*\r\n\
             Icy-MetaData: 1\r\n\
             Connection: close\r\n\r\n"
        );
    }

    #[test]
    fn test_request_explicit_port() {
        let url = Url::parse("http://10.0.0.5:8000/live").unwrap();
        let req = write_request(&url, "clock").unwrap();
        assert!(req.contains("Host: 10.0.0.5:8000\r\n"));
    }

    #[test]
    fn test_request_too_large() {
        let url = Url::parse("http://a.example/").unwrap();
        let agent = [b'x'; 600];
        let agent = core::str::from_utf8(&agent).unwrap();
        assert_eq!(write_request(&url, agent), Err(HttpError::RequestTooLarge));
    }

    #[test]
    fn test_find_head_end() {
        assert_eq!(find_head_end(b"HTTP/1.0 200 OK\r\n\r\nbody"), Some(19));
        assert_eq!(find_head_end(b"ICY 200 OK\nicy-metaint: 8\n\n\xff\xfb"), Some(27));
        assert_eq!(find_head_end(b"HTTP/1.0 200 OK\r\nServer: x\r\n"), None);
    }

    #[test]
    fn test_parse_icy_head() {
        let head = b"ICY 200 OK\r\nicy-name: ByteFM\r\nContent-Type: audio/mpeg\r\nicy-metaint: 16000\r\n\r\n";
        let parsed = ResponseHead::parse(head).unwrap();
        assert_eq!(parsed.status, 200);
        assert_eq!(parsed.name, Some("ByteFM"));
        assert_eq!(parsed.content_type, Some("audio/mpeg"));
        assert_eq!(parsed.metaint, Some(16000));
        assert_eq!(parsed.disposition(), Ok(Disposition::Body));
    }

    #[test]
    fn test_zero_metaint_means_none() {
        let parsed = ResponseHead::parse(b"HTTP/1.1 200 OK\r\nicy-metaint: 0\r\n\r\n").unwrap();
        assert_eq!(parsed.metaint, None);
    }

    #[test]
    fn test_redirect() {
        let head = b"HTTP/1.1 302 Found\r\nLOCATION: http://edge.example/live\r\n\r\n";
        let parsed = ResponseHead::parse(head).unwrap();
        assert_eq!(
            parsed.disposition(),
            Ok(Disposition::Redirect("http://edge.example/live"))
        );

        let parsed = ResponseHead::parse(b"HTTP/1.1 301 Moved\r\n\r\n").unwrap();
        assert_eq!(parsed.disposition(), Err(HttpError::MissingLocation));
    }

    #[test]
    fn test_error_status() {
        let parsed = ResponseHead::parse(b"HTTP/1.0 404 Not Found\r\n\r\n").unwrap();
        assert_eq!(parsed.disposition(), Err(HttpError::Status(404)));
    }

    #[test]
    fn test_malformed_heads() {
        assert_eq!(ResponseHead::parse(b"SSH-2.0\r\n\r\n"), Err(HttpError::Malformed));
        assert_eq!(ResponseHead::parse(b"HTTP/1.0 abc\r\n\r\n"), Err(HttpError::Malformed));
        assert_eq!(
            ResponseHead::parse(b"HTTP/1.0 200 OK\r\nicy-metaint: lots\r\n\r\n"),
            Err(HttpError::Malformed)
        );
    }
}

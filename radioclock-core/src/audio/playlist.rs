//! Playlist resolution
//!
//! Radio stations commonly publish a playlist rather than the stream
//! itself. Only the first entry is used.

/// Playlist errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PlaylistError {
    /// No stream entry found
    Empty,
    /// Body is not valid UTF-8
    InvalidEncoding,
}

/// Playlist format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PlaylistKind {
    /// `.m3u` / `.m3u8`: one URL per line, `#` comments
    M3u,
    /// `.pls`: INI-style `FileN=` entries
    Pls,
}

impl PlaylistKind {
    /// Detect a playlist from a file name
    pub fn from_file_name(name: &str) -> Option<Self> {
        let (_, ext) = name.rsplit_once('.')?;
        if ext.eq_ignore_ascii_case("m3u") || ext.eq_ignore_ascii_case("m3u8") {
            Some(PlaylistKind::M3u)
        } else if ext.eq_ignore_ascii_case("pls") {
            Some(PlaylistKind::Pls)
        } else {
            None
        }
    }

    /// Detect a playlist from a Content-Type header value
    pub fn from_content_type(content_type: &str) -> Option<Self> {
        let mime = content_type.split(';').next().unwrap_or("").trim();
        if mime.eq_ignore_ascii_case("audio/x-mpegurl")
            || mime.eq_ignore_ascii_case("audio/mpegurl")
            || mime.eq_ignore_ascii_case("application/vnd.apple.mpegurl")
        {
            Some(PlaylistKind::M3u)
        } else if mime.eq_ignore_ascii_case("audio/x-scpls") {
            Some(PlaylistKind::Pls)
        } else {
            None
        }
    }

    /// First stream URL in a playlist body
    pub fn first_entry(self, body: &[u8]) -> Result<&str, PlaylistError> {
        let text = core::str::from_utf8(body).map_err(|_| PlaylistError::InvalidEncoding)?;
        let text = text.trim_start_matches('\u{feff}');

        let entry = match self {
            PlaylistKind::M3u => text
                .lines()
                .map(str::trim)
                .find(|line| !line.is_empty() && !line.starts_with('#')),
            PlaylistKind::Pls => text.lines().find_map(|line| {
                let (key, value) = line.trim().split_once('=')?;
                let is_file = key.len() > 4
                    && key.get(..4).is_some_and(|k| k.eq_ignore_ascii_case("file"));
                is_file.then(|| value.trim())
            }),
        };

        entry
            .filter(|url| !url.is_empty())
            .ok_or(PlaylistError::Empty)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_from_file_name() {
        assert_eq!(PlaylistKind::from_file_name("bytefm.m3u"), Some(PlaylistKind::M3u));
        assert_eq!(PlaylistKind::from_file_name("live.M3U8"), Some(PlaylistKind::M3u));
        assert_eq!(PlaylistKind::from_file_name("radio.pls"), Some(PlaylistKind::Pls));
        assert_eq!(PlaylistKind::from_file_name("stream.mp3"), None);
        assert_eq!(PlaylistKind::from_file_name("stream"), None);
    }

    #[test]
    fn test_kind_from_content_type() {
        assert_eq!(
            PlaylistKind::from_content_type("audio/x-mpegurl; charset=utf-8"),
            Some(PlaylistKind::M3u)
        );
        assert_eq!(
            PlaylistKind::from_content_type("audio/x-scpls"),
            Some(PlaylistKind::Pls)
        );
        assert_eq!(PlaylistKind::from_content_type("audio/mpeg"), None);
    }

    #[test]
    fn test_m3u_first_entry() {
        let body = b"#EXTM3U\r\n#EXTINF:-1,ByteFM\r\n\r\nhttp://stream.example/bytefm.mp3\r\nhttp://backup.example/\r\n";
        assert_eq!(
            PlaylistKind::M3u.first_entry(body),
            Ok("http://stream.example/bytefm.mp3")
        );
    }

    #[test]
    fn test_pls_first_entry() {
        let body = b"[playlist]\nNumberOfEntries=2\nFile1=http://a.example:8000/live\nTitle1=A\nFile2=http://b.example/\n";
        assert_eq!(
            PlaylistKind::Pls.first_entry(body),
            Ok("http://a.example:8000/live")
        );
    }

    #[test]
    fn test_empty_playlists() {
        assert_eq!(
            PlaylistKind::M3u.first_entry(b"#EXTM3U\n# nothing here\n"),
            Err(PlaylistError::Empty)
        );
        assert_eq!(
            PlaylistKind::Pls.first_entry(b"[playlist]\nNumberOfEntries=0\n"),
            Err(PlaylistError::Empty)
        );
        assert_eq!(
            PlaylistKind::M3u.first_entry(&[0xff, 0xfe]),
            Err(PlaylistError::InvalidEncoding)
        );
    }
}

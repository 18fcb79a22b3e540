use regex::Regex;
use std::fmt;
use std::sync::OnceLock;

/// `http(s)://<subdomain>[.staging].daily.co/<room>`
const ROOM_URL_PATTERN: &str = r"^https?://[^./]+(\.staging)?\.daily\.co/[^/]+$";

fn room_url_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(ROOM_URL_PATTERN).expect("room URL pattern is valid"))
}

/// A validated, user-supplied room address
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoomAddress(String);

impl RoomAddress {
    pub fn parse(url: &str) -> Option<Self> {
        let url = url.trim();
        room_url_regex()
            .is_match(url)
            .then(|| Self(url.to_string()))
    }

    pub fn is_valid(url: &str) -> bool {
        Self::parse(url).is_some()
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RoomAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

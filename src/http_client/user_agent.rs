//! User agent handling for HTTP requests.

pub const USER_AGENT: &str = concat!(
    "geoacquire/",
    env!("CARGO_PKG_VERSION"),
    " (humanitarian GIS archiving)"
);

/// Resolve user agent from config value.
/// - None or empty => default geoacquire user agent
/// - other => custom user agent string
pub fn resolve_user_agent(config: Option<&str>) -> String {
    match config.map(str::trim) {
        None | Some("") => USER_AGENT.to_string(),
        Some(custom) => custom.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_user_agent_default() {
        let ua = resolve_user_agent(None);
        assert!(ua.starts_with("geoacquire/"));
    }

    #[test]
    fn test_resolve_user_agent_blank_falls_back() {
        assert_eq!(resolve_user_agent(Some("  ")), USER_AGENT);
    }

    #[test]
    fn test_resolve_user_agent_custom() {
        let ua = resolve_user_agent(Some("MyBot/1.0"));
        assert_eq!(ua, "MyBot/1.0");
    }
}

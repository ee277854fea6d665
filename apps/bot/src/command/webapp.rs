/// Rewrite a web app button payload into the equivalent command text.
///
/// `crypto`, `stocks`, `chart:<symbol> <period>` and `news:<symbol>` are
/// understood; anything else is `None`.
pub fn translate(data: &str) -> Option<String> {
    let data = data.trim();

    if let Some(rest) = data.strip_prefix("chart:") {
        return Some(format!("/chart {}", rest.trim()));
    }
    if let Some(rest) = data.strip_prefix("news:") {
        return Some(format!("/news {}", rest.trim()));
    }

    match data {
        "crypto" => Some("/crypto".to_string()),
        "stocks" => Some("/stocks".to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn payloads_map_to_commands() {
        assert_eq!(translate("crypto").as_deref(), Some("/crypto"));
        assert_eq!(translate(" stocks ").as_deref(), Some("/stocks"));
        assert_eq!(
            translate("chart:bitcoin 7d").as_deref(),
            Some("/chart bitcoin 7d")
        );
        assert_eq!(translate("news:AAPL").as_deref(), Some("/news AAPL"));
        assert_eq!(translate("portfolio"), None);
    }
}

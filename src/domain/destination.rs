/// Destinations offered on the explore page, in display order.
pub const DESTINATIONS: &[&str] = &[
    "Goa",
    "Mukteshwar",
    "Kasol",
    "Mumbai",
    "Gokarna",
    "Malvan",
    "Delhi",
    "Coonoor",
    "Jibhi",
];

/// Case-insensitive substring search over [`DESTINATIONS`].
/// A blank query returns every destination.
pub fn search_destinations(query: &str) -> Vec<&'static str> {
    let query = query.trim().to_lowercase();
    if query.is_empty() {
        return DESTINATIONS.to_vec();
    }
    DESTINATIONS
        .iter()
        .copied()
        .filter(|d| d.to_lowercase().contains(&query))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_query_returns_all() {
        assert_eq!(search_destinations(""), DESTINATIONS);
        assert_eq!(search_destinations("   ").len(), 9);
    }

    #[test]
    fn substring_match_keeps_order() {
        assert_eq!(search_destinations("go"), vec!["Goa", "Gokarna"]);
    }

    #[test]
    fn match_is_case_insensitive() {
        assert_eq!(search_destinations("  KASOL "), vec!["Kasol"]);
    }

    #[test]
    fn no_match_is_empty() {
        assert!(search_destinations("paris").is_empty());
    }
}

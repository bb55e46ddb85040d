//! Game lookup from user queries
//!
//! Matches a query against record ids and display names:
//! - Exact id
//! - Case-insensitive id or name
//! - Unique case-insensitive prefix of an id, a name, or an id's source-local key
//! - Otherwise an error with typo suggestions (Levenshtein distance)

use super::GameRecord;

#[derive(Debug, Clone)]
pub struct ResolutionError {
    pub message: String,
    pub suggestion: Option<Vec<String>>,
}

/// Resolves `query` to one record of `games`.
///
/// `"portal"` finds `steam:620` named "Portal 2"; `"620"` finds it through
/// its source-local key.
pub fn resolve_game<'a>(
    query: &str,
    games: &'a [GameRecord],
) -> Result<&'a GameRecord, ResolutionError> {
    let query = query.trim();
    if query.is_empty() {
        return Err(ResolutionError {
            message: "Empty game query".to_string(),
            suggestion: None,
        });
    }

    // Fast path: exact id
    if let Some(game) = games.iter().find(|g| g.id == query) {
        return Ok(game);
    }

    let lower_query = query.to_lowercase();

    let exact: Vec<&GameRecord> = games
        .iter()
        .filter(|g| g.id.to_lowercase() == lower_query || g.name.to_lowercase() == lower_query)
        .collect();
    if exact.len() == 1 {
        return Ok(exact[0]);
    }

    let prefix_matches: Vec<&GameRecord> = games
        .iter()
        .filter(|g| {
            g.id.to_lowercase().starts_with(&lower_query)
                || g.name.to_lowercase().starts_with(&lower_query)
                || local_key(&g.id).to_lowercase().starts_with(&lower_query)
        })
        .collect();

    match prefix_matches.len() {
        0 => {
            let suggestions = find_similar(&lower_query, games);
            Err(ResolutionError {
                message: format!("Game '{}' not found", query),
                suggestion: (!suggestions.is_empty()).then_some(suggestions),
            })
        }
        1 => Ok(prefix_matches[0]),
        _ => Err(ResolutionError {
            message: format!("Ambiguous game '{}' matches multiple games", query),
            suggestion: Some(
                prefix_matches
                    .iter()
                    .map(|g| format!("{} ({})", g.id, g.name))
                    .collect(),
            ),
        }),
    }
}

/// `steam:620` -> `620`.
fn local_key(id: &str) -> &str {
    id.split_once(':').map_or(id, |(_, key)| key)
}

/// Up to three ids whose id or name is within edit distance 3 of `query`.
pub fn find_similar(query: &str, games: &[GameRecord]) -> Vec<String> {
    const DISTANCE_THRESHOLD: usize = 3;

    let mut matches: Vec<(String, usize)> = games
        .iter()
        .map(|g| {
            let dist = levenshtein_distance(query, &g.name.to_lowercase())
                .min(levenshtein_distance(query, &g.id.to_lowercase()));
            (g.id.clone(), dist)
        })
        .filter(|(_, dist)| *dist <= DISTANCE_THRESHOLD)
        .collect();

    matches.sort_by_key(|(_, dist)| *dist);
    matches.into_iter().take(3).map(|(id, _)| id).collect()
}

/// Calculate Levenshtein distance between two strings.
pub fn levenshtein_distance(s1: &str, s2: &str) -> usize {
    let chars1: Vec<char> = s1.chars().collect();
    let chars2: Vec<char> = s2.chars().collect();

    if chars1.is_empty() {
        return chars2.len();
    }
    if chars2.is_empty() {
        return chars1.len();
    }

    // Single rolling row
    let mut row: Vec<usize> = (0..=chars2.len()).collect();
    for (i, c1) in chars1.iter().enumerate() {
        let mut diagonal = row[0];
        row[0] = i + 1;
        for (j, c2) in chars2.iter().enumerate() {
            let cost = usize::from(c1 != c2);
            let next = (row[j + 1] + 1).min(row[j] + 1).min(diagonal + cost);
            diagonal = row[j + 1];
            row[j + 1] = next;
        }
    }

    row[chars2.len()]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::library::GameSource;

    fn games() -> Vec<GameRecord> {
        vec![
            GameRecord::new(GameSource::Steam, "620", "Portal 2", "steam://rungameid/620"),
            GameRecord::new(GameSource::Steam, "400", "Portal", "steam://rungameid/400"),
            GameRecord::new(GameSource::Lutris, "celeste", "Celeste", "lutris lutris:celeste"),
            GameRecord::new(
                GameSource::Flatpak,
                "net.veloren.airshipper",
                "Airshipper",
                "flatpak run net.veloren.airshipper",
            ),
        ]
    }

    #[test]
    fn test_exact_id() {
        let games = games();
        assert_eq!(resolve_game("steam:620", &games).unwrap().name, "Portal 2");
    }

    #[test]
    fn test_case_insensitive_name() {
        let games = games();
        // "portal" is also a prefix of "Portal 2" but the exact name wins
        assert_eq!(resolve_game("PORTAL", &games).unwrap().id, "steam:400");
    }

    #[test]
    fn test_unique_prefix() {
        let games = games();
        assert_eq!(resolve_game("cel", &games).unwrap().id, "lutris:celeste");
        assert_eq!(resolve_game("air", &games).unwrap().id, "flatpak:net.veloren.airshipper");
    }

    #[test]
    fn test_local_key_prefix() {
        let games = games();
        assert_eq!(resolve_game("62", &games).unwrap().name, "Portal 2");
    }

    #[test]
    fn test_ambiguous_prefix() {
        let games = games();
        let err = resolve_game("steam", &games).unwrap_err();
        assert!(err.message.contains("Ambiguous"));
        assert_eq!(err.suggestion.unwrap().len(), 2);
    }

    #[test]
    fn test_not_found_with_suggestion() {
        let games = games();
        let err = resolve_game("celest3", &games).unwrap_err();
        assert!(err.message.contains("not found"));
        assert_eq!(err.suggestion.unwrap(), vec!["lutris:celeste".to_string()]);
    }

    #[test]
    fn test_not_found_without_suggestion() {
        let games = games();
        let err = resolve_game("xyzzy-quest", &games).unwrap_err();
        assert!(err.suggestion.is_none());
    }

    #[test]
    fn test_empty_query() {
        let games = games();
        let err = resolve_game("  ", &games).unwrap_err();
        assert_eq!(err.message, "Empty game query");
    }

    #[test]
    fn test_levenshtein_distance() {
        assert_eq!(levenshtein_distance("", ""), 0);
        assert_eq!(levenshtein_distance("abc", "abc"), 0);
        assert_eq!(levenshtein_distance("abc", ""), 3);
        assert_eq!(levenshtein_distance("", "abc"), 3);
        assert_eq!(levenshtein_distance("abc", "abcd"), 1);
        assert_eq!(levenshtein_distance("kitten", "sitting"), 3);
    }
}

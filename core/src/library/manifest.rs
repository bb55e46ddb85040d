//! Tolerant text extractors for each source's on-disk formats
//!
//! None of these are full-grammar parsers. They pull the handful of fields the
//! scanners need and return `None`/empty when a field is missing, so one odd file
//! never aborts a scan.

/// Fields read from a Steam `appmanifest_<id>.acf`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SteamAppManifest {
    pub name: String,
    pub install_dir: String,
}

/// Fields read from a Lutris per-game `.yml` config.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LutrisGameConfig {
    pub name: String,
    pub slug: String,
}

/// One row of `flatpak list --app --columns=application,name`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlatpakApp {
    pub app_id: String,
    pub name: String,
}

/// Extracts every `"path" "<value>"` pair from `libraryfolders.vdf`.
///
/// Order is preserved and duplicates are kept. Escaped Windows separators
/// (`\\`) are normalized to `/`.
pub fn parse_steam_library_folders(text: &str) -> Vec<String> {
    vdf_values(text, "path")
        .map(|value| value.replace("\\\\", "/"))
        .collect()
}

/// Extracts `name` and `installdir` from an app manifest.
///
/// Returns `None` if either is absent.
pub fn parse_steam_app_manifest(text: &str) -> Option<SteamAppManifest> {
    let name = vdf_values(text, "name").next()?;
    let install_dir = vdf_values(text, "installdir").next()?;
    Some(SteamAppManifest {
        name: name.to_string(),
        install_dir: install_dir.to_string(),
    })
}

/// Extracts the `name:` and `slug:` scalars from a Lutris game config.
///
/// Returns `None` if either is missing or empty.
pub fn parse_lutris_game(text: &str) -> Option<LutrisGameConfig> {
    let name = yaml_scalar(text, "name")?;
    let slug = yaml_scalar(text, "slug")?;
    Some(LutrisGameConfig { name, slug })
}

/// Parses tab-separated `flatpak list` output.
///
/// Blank lines and lines without a name column are skipped.
pub fn parse_flatpak_list(text: &str) -> Vec<FlatpakApp> {
    text.lines()
        .filter_map(|line| {
            let mut columns = line.split('\t');
            let app_id = columns.next()?.trim();
            let name = columns.next()?.trim();
            if app_id.is_empty() {
                return None;
            }
            Some(FlatpakApp {
                app_id: app_id.to_string(),
                name: if name.is_empty() { app_id } else { name }.to_string(),
            })
        })
        .collect()
}

/// Returns the `Categories=` entries of a desktop entry, empty if absent.
pub fn desktop_entry_categories(text: &str) -> Vec<String> {
    text.lines()
        .find_map(|line| line.trim().strip_prefix("Categories="))
        .map(|list| {
            list.split(';')
                .map(str::trim)
                .filter(|c| !c.is_empty())
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

/// True if any `Categories=` entry mentions "game" (`Game`, `ArcadeGame`, ...).
pub fn is_game_desktop_entry(text: &str) -> bool {
    desktop_entry_categories(text)
        .iter()
        .any(|category| category.to_ascii_lowercase().contains("game"))
}

/// Iterates the values bound to `key` anywhere in a VDF/ACF document.
///
/// Tokens are quoted strings; braces between tokens reset key/value pairing.
/// Empty values are skipped.
fn vdf_values<'a>(text: &'a str, key: &'a str) -> impl Iterator<Item = &'a str> + 'a {
    let mut pending_key: Option<&str> = None;
    QuotedTokens { rest: text }.filter_map(move |(gap, token)| {
        if gap.contains('{') || gap.contains('}') {
            pending_key = None;
        }
        match pending_key.take() {
            None => {
                pending_key = Some(token);
                None
            }
            Some(k) if k.eq_ignore_ascii_case(key) && !token.is_empty() => Some(token),
            Some(_) => None,
        }
    })
}

/// Yields `(text before the token, token contents)` for each `"..."` run.
struct QuotedTokens<'a> {
    rest: &'a str,
}

impl<'a> Iterator for QuotedTokens<'a> {
    type Item = (&'a str, &'a str);

    fn next(&mut self) -> Option<Self::Item> {
        let start = self.rest.find('"')?;
        let gap = &self.rest[..start];
        let after = &self.rest[start + 1..];
        let end = after.find('"')?;
        let token = &after[..end];
        self.rest = &after[end + 1..];
        Some((gap, token))
    }
}

/// First `key: value` line (leading indentation allowed), quotes stripped.
fn yaml_scalar(text: &str, key: &str) -> Option<String> {
    text.lines().find_map(|line| {
        let value = line.trim_start().strip_prefix(key)?.strip_prefix(':')?.trim();
        let value = value
            .strip_prefix('"')
            .and_then(|v| v.strip_suffix('"'))
            .or_else(|| value.strip_prefix('\'').and_then(|v| v.strip_suffix('\'')))
            .unwrap_or(value);
        (!value.is_empty()).then(|| value.to_string())
    })
}

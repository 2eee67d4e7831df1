/// Cleans up a parsed game title: strips trademark symbols and collapses whitespace
pub fn clean_game_title(title: impl AsRef<str>) -> String {
    title
        .as_ref()
        .replace(['™', '®', '©'], "")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

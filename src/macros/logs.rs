macro_rules! debug_path {
    ($description: expr, $path: ident) => {
        tracing::debug!(
            "{LIBRARY} - {} exists at {:?}: {}",
            $description,
            $path,
            $path.exists()
        );
    };
}
pub(crate) use debug_path;

macro_rules! warn_no_games {
    () => {
        tracing::warn!("{LIBRARY} - No games found");
    };
}
pub(crate) use warn_no_games;

macro_rules! info_skipped {
    ($name: expr, $reason: expr) => {
        tracing::info!("{LIBRARY} - Skipping '{}': {}", $name, $reason);
    };
}
pub(crate) use info_skipped;

macro_rules! debug_fallback_flatpak {
    () => {
        tracing::debug!("{LIBRARY} - Attempting to fall back to flatpak");
    };
}
pub(crate) use debug_fallback_flatpak;

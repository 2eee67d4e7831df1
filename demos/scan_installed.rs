use is_terminal::IsTerminal;
use lib_library_importer::{
    data::SupportedLibraries, get_scanner, reconcile::Notifier, reconcile::get_games,
    settings::LibrarySettings,
};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

struct PrintNotifier;

impl Notifier for PrintNotifier {
    fn add(&self, id: &str, message: &str) {
        println!("[{id}] {message}");
    }

    fn remove(&self, _: &str) {}
}

// NOTE: run with, e.g. `RUST_LOG=debug cargo run --example scan_installed > logs.txt`
fn main() {
    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .without_time()
                .with_line_number(true)
                // Don't output colours for logs not being printed to a terminal
                .with_ansi(std::io::stdout().is_terminal()),
        )
        .with(EnvFilter::from_default_env())
        .init();

    let settings = LibrarySettings::default();

    for library in [SupportedLibraries::Steam, SupportedLibraries::Origin] {
        let Some(scanner) = get_scanner(library, &settings) else {
            println!("{library}: not detected");
            continue;
        };

        let outcome = get_games(scanner.as_ref(), &settings, &PrintNotifier);
        println!("{library}: {} games", outcome.games.len());

        for game in outcome.games {
            println!("  {} ({}) - {:?}", game.name, game.game_id, game.install_directory);
        }
    }
}

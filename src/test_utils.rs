use std::{
    cell::RefCell,
    collections::HashMap,
    fs::{create_dir_all, write},
    path::Path,
};

use crate::{
    data::{GameRecord, SupportedLibraries},
    importers::GameStore,
    platform_path::{RegistryReader, RegistryRoot, RegistryView},
    reconcile::Notifier,
};

/// Writes `content` to `path`, creating parent directories as needed
pub fn write_file(path: &Path, content: &str) {
    if let Some(parent) = path.parent() {
        create_dir_all(parent).unwrap();
    }
    write(path, content).unwrap();
}

/// In-memory registry, keyed by root, sub-path, value name and view
#[derive(Debug, Default)]
pub struct MockRegistry {
    values: HashMap<(RegistryRoot, String, String, RegistryView), String>,
}

impl MockRegistry {
    pub fn with_value(
        mut self,
        root: RegistryRoot,
        subpath: &str,
        value_name: &str,
        view: RegistryView,
        value: &str,
    ) -> Self {
        self.values.insert(
            (root, subpath.to_owned(), value_name.to_owned(), view),
            value.to_owned(),
        );
        self
    }

    /// Registers the value in both registry views
    pub fn with_any_view(
        self,
        root: RegistryRoot,
        subpath: &str,
        value_name: &str,
        value: &str,
    ) -> Self {
        self.with_value(root, subpath, value_name, RegistryView::Registry64, value)
            .with_value(root, subpath, value_name, RegistryView::Registry32, value)
    }
}

impl RegistryReader for MockRegistry {
    fn read_value(
        &self,
        root: RegistryRoot,
        subpath: &str,
        value_name: &str,
        view: RegistryView,
    ) -> Option<String> {
        self.values
            .get(&(root, subpath.to_owned(), value_name.to_owned(), view))
            .cloned()
    }
}

/// Notifier which records every call
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    pub added: RefCell<Vec<(String, String)>>,
    pub removed: RefCell<Vec<String>>,
}

impl Notifier for RecordingNotifier {
    fn add(&self, id: &str, message: &str) {
        self.added
            .borrow_mut()
            .push((id.to_owned(), message.to_owned()));
    }

    fn remove(&self, id: &str) {
        self.removed.borrow_mut().push(id.to_owned());
    }
}

/// Game store backed by a plain vector
#[derive(Debug, Default)]
pub struct MemoryStore {
    pub is_open: bool,
    pub games: Vec<GameRecord>,
}

impl MemoryStore {
    pub fn open(games: Vec<GameRecord>) -> Self {
        Self {
            is_open: true,
            games,
        }
    }
}

impl GameStore for MemoryStore {
    fn is_open(&self) -> bool {
        self.is_open
    }

    fn find_mut(&mut self, source: SupportedLibraries, game_id: &str) -> Option<&mut GameRecord> {
        self.games
            .iter_mut()
            .find(|g| g.source == source && g.game_id == game_id)
    }
}

//! Resolution of the symbolic paths found in vendor manifests.
//!
//! A path is either a literal filesystem path, or a registry reference of the form
//! `[ROOT\SUB\PATH\VALUE]TRAILING`, where the registry value named `VALUE` under `ROOT\SUB\PATH`
//! holds the directory that `TRAILING` is relative to.

use std::fmt::Debug;

use cfg_if::cfg_if;
use nom::{
    IResult, Parser,
    bytes::complete::{is_not, tag},
    character::complete::char,
    sequence::terminated,
};
use tracing::{trace, warn};

use crate::error::PathResolveError;

/// Well-known registry hives that may appear in a platform path
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RegistryRoot {
    LocalMachine,
    CurrentUser,
}

impl RegistryRoot {
    fn from_name(name: &str) -> Option<Self> {
        match name {
            "HKEY_LOCAL_MACHINE" => Some(Self::LocalMachine),
            "HKEY_CURRENT_USER" => Some(Self::CurrentUser),
            _ => None,
        }
    }
}

/// Registry view to read from. 32-bit applications get their keys reflected into a separate view
/// on 64-bit systems.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RegistryView {
    Registry64,
    Registry32,
}

/// Read-only access to registry values
pub trait RegistryReader: Debug {
    /// Returns the value named `value_name` under `root\subpath`, or `None` if either the key or
    /// the value does not exist
    fn read_value(
        &self,
        root: RegistryRoot,
        subpath: &str,
        value_name: &str,
        view: RegistryView,
    ) -> Option<String>;
}

/// Registry reader for targets without a registry: every lookup is a miss
#[derive(Debug, Default, Clone, Copy)]
pub struct NoRegistry;

impl RegistryReader for NoRegistry {
    fn read_value(&self, _: RegistryRoot, _: &str, _: &str, _: RegistryView) -> Option<String> {
        None
    }
}

cfg_if! {
    if #[cfg(windows)] {
        use winreg::{
            RegKey,
            enums::{HKEY_CURRENT_USER, HKEY_LOCAL_MACHINE, KEY_READ, KEY_WOW64_32KEY, KEY_WOW64_64KEY},
        };

        /// Registry reader backed by the Windows registry
        #[derive(Debug, Default, Clone, Copy)]
        pub struct WindowsRegistry;

        impl RegistryReader for WindowsRegistry {
            fn read_value(
                &self,
                root: RegistryRoot,
                subpath: &str,
                value_name: &str,
                view: RegistryView,
            ) -> Option<String> {
                let hive = RegKey::predef(match root {
                    RegistryRoot::LocalMachine => HKEY_LOCAL_MACHINE,
                    RegistryRoot::CurrentUser => HKEY_CURRENT_USER,
                });
                let flags = KEY_READ
                    | match view {
                        RegistryView::Registry64 => KEY_WOW64_64KEY,
                        RegistryView::Registry32 => KEY_WOW64_32KEY,
                    };

                let key = hive.open_subkey_with_flags(subpath, flags).ok()?;
                key.get_value::<String, _>(value_name)
                    .or_else(|_| key.get_value::<u32, _>(value_name).map(|v| v.to_string()))
                    .ok()
            }
        }

        /// Registry reader for the current target
        pub type SystemRegistry = WindowsRegistry;
    } else {
        /// Registry reader for the current target
        pub type SystemRegistry = NoRegistry;
    }
}

/// A resolved platform path
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlatformPath {
    pub complete_path: String,
    /// Directory the registry value pointed to, unset for literal paths
    pub root: Option<String>,
    /// Path relative to `root`, unset for literal paths
    pub path: Option<String>,
}

impl PlatformPath {
    pub fn from_complete(complete_path: impl Into<String>) -> Self {
        Self {
            complete_path: complete_path.into(),
            root: None,
            path: None,
        }
    }

    pub fn from_root(root: impl Into<String>, path: impl Into<String>) -> Self {
        let root = root.into();
        let path = path.into();

        Self {
            complete_path: join_platform_path(&root, &path),
            root: Some(root),
            path: Some(path),
        }
    }

    /// Whether a relative part exists, i.e. `complete_path` is more than just the root
    pub fn has_relative_path(&self) -> bool {
        self.path.as_ref().is_some_and(|p| !p.is_empty())
    }
}

/// Joins a root and a relative path using the separator style of the root
pub fn join_platform_path(root: &str, path: &str) -> String {
    if path.is_empty() {
        return root.to_owned();
    }

    let separator = if root.contains('/') && !root.contains('\\') {
        '/'
    } else {
        '\\'
    };

    if root.is_empty() || root.ends_with(['\\', '/']) {
        format!("{root}{path}")
    } else {
        format!("{root}{separator}{path}")
    }
}

fn trim_separators(s: &str) -> &str {
    s.trim_matches(['\\', '/'])
}

/// Raw parts of a `[ROOT\SUB\PATH\VALUE]TRAILING` expression
#[derive(Debug, PartialEq, Eq)]
struct RegistryPathParts<'a> {
    root: &'a str,
    subpath: &'a str,
    value_name: &'a str,
    trailing: &'a str,
}

fn parse_registry_root(input: &str) -> IResult<&str, &str> {
    let (input, _) = tag("[").parse(input)?;
    terminated(is_not("\\]"), char('\\')).parse(input)
}

/// Splits a registry path expression into its parts. The bracketed part ends at the last `]`,
/// and the value name is whatever follows the last `\` inside it.
fn parse_registry_path(input: &str) -> Option<RegistryPathParts<'_>> {
    let (rest, root) = parse_registry_root(input).ok()?;
    let (bracketed, trailing) = rest.rsplit_once(']')?;
    let (subpath, value_name) = bracketed.rsplit_once('\\')?;

    Some(RegistryPathParts {
        root,
        subpath: trim_separators(subpath),
        value_name,
        trailing: trim_separators(trailing),
    })
}

/// Resolves platform paths, reading registry values through the given [`RegistryReader`]
#[derive(Debug)]
pub struct PathResolver {
    registry: Box<dyn RegistryReader>,
}

impl Default for PathResolver {
    fn default() -> Self {
        Self::new(Box::new(SystemRegistry::default()))
    }
}

impl PathResolver {
    pub fn new(registry: Box<dyn RegistryReader>) -> Self {
        Self { registry }
    }

    /// Resolve `path` using a single registry view
    pub fn resolve_with_view(
        &self,
        path: &str,
        view: RegistryView,
    ) -> Result<Option<PlatformPath>, PathResolveError> {
        if !path.starts_with('[') {
            return Ok(Some(PlatformPath::from_complete(path)));
        }

        let Some(parts) = parse_registry_path(path) else {
            warn!("Unknown path format {path}");
            return Err(PathResolveError::Malformed(path.to_owned()));
        };

        let Some(root) = RegistryRoot::from_name(parts.root) else {
            return Err(PathResolveError::UnknownRoot(parts.root.to_owned()));
        };

        let Some(value) =
            self.registry
                .read_value(root, parts.subpath, parts.value_name, view)
        else {
            trace!(
                "Registry value {:?} not found under {root:?}\\{} ({view:?})",
                parts.value_name, parts.subpath
            );
            return Ok(None);
        };

        Ok(Some(PlatformPath::from_root(value, parts.trailing)))
    }

    /// Resolve `path`, first against the 64-bit registry view and then, only if that lookup
    /// fails, against the 32-bit view.
    ///
    /// `Ok(None)` means the registry key or value does not exist, which is expected for
    /// uninstalled or migrated applications.
    pub fn resolve(&self, path: &str) -> Result<Option<PlatformPath>, PathResolveError> {
        match self.resolve_with_view(path, RegistryView::Registry64)? {
            Some(resolved) => Ok(Some(resolved)),
            None => self.resolve_with_view(path, RegistryView::Registry32),
        }
    }
}

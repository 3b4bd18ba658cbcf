use std::{
    collections::HashMap,
    fs, io,
    path::{Path, PathBuf},
};

use tracing::debug;

/// File extension of script files.
pub const SCRIPT_EXTENSION: &str = "ckl";

/// Source text of a module together with the name diagnostics use for it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleSource {
    /// The file name reported in positions and stack traces.
    pub filename: String,
    /// The module's source text.
    pub text:     String,
}

/// Resolves `require` specifications to source text.
///
/// The evaluator consults the provider only on a module-cache miss, so each
/// module is loaded at most once per interpreter.
pub trait SourceProvider {
    /// Loads the module `identifier`, written as `spec` in the `require`.
    ///
    /// # Errors
    /// Any I/O error, typically [`io::ErrorKind::NotFound`].
    fn load(&self, identifier: &str, spec: &str) -> io::Result<ModuleSource>;
}

/// Returns the module identifier of a specification: its basename without
/// extension.
///
/// # Example
/// ```
/// use ckl::interpreter::module::module_identifier;
///
/// assert_eq!(module_identifier("lib/strings.ckl"), "strings");
/// assert_eq!(module_identifier("strings"), "strings");
/// ```
#[must_use]
pub fn module_identifier(spec: &str) -> String {
    Path::new(spec).file_stem()
                   .map_or_else(|| spec.to_string(), |s| s.to_string_lossy().into_owned())
}

/// Loads modules from the file system.
///
/// A specification is tried as written, then with the script extension
/// appended, first relative to the working directory and then relative to
/// each search directory in order.
#[derive(Debug, Clone, Default)]
pub struct FileSourceProvider {
    search_dirs: Vec<PathBuf>,
}

impl FileSourceProvider {
    /// Creates a provider searching `search_dirs` after the working
    /// directory.
    #[must_use]
    pub const fn new(search_dirs: Vec<PathBuf>) -> Self {
        Self { search_dirs }
    }

    fn candidates(&self, spec: &str) -> Vec<PathBuf> {
        let with_extension = format!("{spec}.{SCRIPT_EXTENSION}");
        std::iter::once(PathBuf::new()).chain(self.search_dirs.iter().cloned())
                                       .flat_map(|dir| [dir.join(spec), dir.join(&with_extension)])
                                       .collect()
    }
}

impl SourceProvider for FileSourceProvider {
    fn load(&self, identifier: &str, spec: &str) -> io::Result<ModuleSource> {
        for candidate in self.candidates(spec) {
            if candidate.is_file() {
                debug!(module = identifier, path = %candidate.display(), "loading module file");
                return Ok(ModuleSource { filename: candidate.display().to_string(),
                                         text:     fs::read_to_string(&candidate)?, });
            }
        }
        Err(io::Error::new(io::ErrorKind::NotFound,
                           format!("no file for '{spec}' in the working directory or {} search \
                                    directories",
                                   self.search_dirs.len())))
    }
}

/// Serves modules from memory, keyed by module identifier.
///
/// # Example
/// ```
/// use ckl::interpreter::module::{MemorySourceProvider, SourceProvider};
///
/// let mut provider = MemorySourceProvider::default();
/// provider.insert("greet", "def hello() 'hi'");
///
/// assert_eq!(provider.load("greet", "lib/greet.ckl").unwrap().text, "def hello() 'hi'");
/// assert!(provider.load("other", "other").is_err());
/// ```
#[derive(Debug, Clone, Default)]
pub struct MemorySourceProvider {
    modules: HashMap<String, String>,
}

impl MemorySourceProvider {
    /// Registers the source of module `identifier`.
    pub fn insert(&mut self, identifier: &str, text: &str) {
        self.modules.insert(identifier.to_string(), text.to_string());
    }

    /// Builder-style [`Self::insert`].
    #[must_use]
    pub fn with_module(mut self, identifier: &str, text: &str) -> Self {
        self.insert(identifier, text);
        self
    }
}

impl SourceProvider for MemorySourceProvider {
    fn load(&self, identifier: &str, _spec: &str) -> io::Result<ModuleSource> {
        self.modules
            .get(identifier)
            .map(|text| ModuleSource { filename: format!("{identifier}.{SCRIPT_EXTENSION}"),
                                       text:     text.clone(), })
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, format!("no module '{identifier}' registered")))
    }
}

//! Documents and the per-resolution document store.

use std::collections::HashMap;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use serde_yaml::Value;

use crate::config::ResolveConfig;
use crate::error::Error;
use crate::location;
use crate::pointer;
use crate::resolve;
use crate::schema::Kind;
use crate::tree::Tree;

/// Label used for standard streams in diagnostics.
const STREAM_LABEL: &str = "-";

/// One parsed OpenAPI file.
#[derive(Debug, Clone)]
pub struct Document {
    /// File the document was read from, or `-` for a stream.
    origin: PathBuf,
    /// Base directory for relative remote references.
    source_dir: PathBuf,
    /// The document tree.
    tree: Tree,
}

impl Document {
    /// File the document was read from, or `-` for a stream.
    pub fn origin(&self) -> &Path {
        return &self.origin;
    }

    /// Parse YAML text. `origin` labels diagnostics; `source_dir` is the base
    /// for relative remote references.
    ///
    /// # Errors
    ///
    /// Returns `Error::Deserialize` if the text is not YAML or does not match
    /// the OpenAPI catalog.
    pub fn parse(content: &str, origin: &Path, source_dir: PathBuf) -> Result<Self, Error> {
        let value: Value = serde_yaml::from_str(content).map_err(|e| {
            return Error::Deserialize { path: origin.to_path_buf(), reason: e.to_string() };
        })?;
        let tree = Tree::from_yaml(value, Kind::OpenApi, origin)?;
        return Ok(Self { origin: origin.to_path_buf(), source_dir, tree });
    }

    /// Read and parse a whole stream. The caller supplies the reference
    /// base directory because a stream has none.
    ///
    /// # Errors
    ///
    /// Returns `Error::InputRead` if the stream fails, or `Error::Deserialize`.
    pub fn read(mut reader: impl Read, source_dir: PathBuf) -> Result<Self, Error> {
        let mut content = String::new();
        reader
            .read_to_string(&mut content)
            .map_err(|e| return Error::InputRead { path: PathBuf::from(STREAM_LABEL), source: e })?;
        return Self::parse(&content, Path::new(STREAM_LABEL), source_dir);
    }

    /// Read and parse a file. Its directory becomes the reference base.
    ///
    /// # Errors
    ///
    /// Returns `Error::InputRead` if the file cannot be read, or `Error::Deserialize`.
    pub fn read_file(path: &Path) -> Result<Self, Error> {
        let absolute =
            std::path::absolute(path).map_err(|e| return Error::InputRead { path: path.to_path_buf(), source: e })?;
        let content = std::fs::read_to_string(&absolute)
            .map_err(|e| return Error::InputRead { path: absolute.clone(), source: e })?;
        let source_dir = absolute.parent().map(Path::to_path_buf).unwrap_or_default();
        return Self::parse(&content, &absolute, source_dir);
    }

    /// Base directory for relative remote references.
    pub fn source_dir(&self) -> &Path {
        return &self.source_dir;
    }

    /// Serialize the document to YAML text.
    ///
    /// # Errors
    ///
    /// Returns `Error::Serialize` if YAML emission fails.
    pub fn to_yaml_string(&self) -> Result<String, Error> {
        return Ok(serde_yaml::to_string(&self.tree.to_yaml()?)?);
    }

    /// The document tree.
    pub const fn tree(&self) -> &Tree {
        return &self.tree;
    }

    /// Mutable access to the document tree.
    pub const fn tree_mut(&mut self) -> &mut Tree {
        return &mut self.tree;
    }

    /// YAML value found at a reference pointer such as `#/components/schemas/Pet`.
    /// Zero values read as `null`.
    ///
    /// # Errors
    ///
    /// Returns `Error::LocationUnresolvable` if the pointer has no target.
    pub fn value_at(&self, pointer_path: &str) -> Result<Value, Error> {
        let target = location::walk(&self.tree, &pointer::pointer_segments(pointer_path))?;
        return self.tree.export(target.get(&self.tree)?);
    }

    /// Write the document as YAML to a stream.
    ///
    /// # Errors
    ///
    /// Returns `Error::Serialize`, or `Error::OutputWrite` if the stream fails.
    pub fn write(&self, mut writer: impl Write) -> Result<(), Error> {
        let yaml = self.to_yaml_string()?;
        writer
            .write_all(yaml.as_bytes())
            .and_then(|()| return writer.flush())
            .map_err(|e| return Error::OutputWrite { path: PathBuf::from(STREAM_LABEL), source: e })?;
        return Ok(());
    }

    /// Write the document as YAML to a file, replacing it.
    ///
    /// # Errors
    ///
    /// Returns `Error::Serialize`, or `Error::OutputWrite` if the file cannot be written.
    pub fn write_file(&self, path: &Path) -> Result<(), Error> {
        let yaml = self.to_yaml_string()?;
        std::fs::write(path, yaml).map_err(|e| return Error::OutputWrite { path: path.to_path_buf(), source: e })?;
        return Ok(());
    }
}

/// Cache of referenced documents for one resolution session.
///
/// Every cached document is already fully resolved, keyed by its canonical
/// absolute path, so each physical file is parsed at most once per session.
/// Sessions are independent; never share one between concurrent resolutions.
#[derive(Debug, Default)]
pub struct Session {
    /// Resolved documents by canonical path.
    documents: HashMap<PathBuf, Document>,
    /// Files currently being loaded, outermost first.
    loading: Vec<PathBuf>,
    /// Number of files parsed so far.
    parses: usize,
}

impl Session {
    /// The fully resolved document owning a remote reference's target.
    /// The document part is resolved against `base_dir`.
    ///
    /// # Errors
    ///
    /// Same as [`Session::load`]. The caller attaches the reference to the error.
    pub fn document_for(&mut self, base_dir: &Path, reference: &str) -> Result<&Document, Error> {
        let path = base_dir.join(pointer::document_part(reference));
        return self.load(&ResolveConfig::nested(), &path);
    }

    /// Whether the file at `path` has been loaded in this session.
    pub fn is_cached(&self, path: &Path) -> bool {
        return path.canonicalize().is_ok_and(|p| return self.documents.contains_key(&p));
    }

    /// Parse and resolve the file at `path` with `config`, or return the
    /// cached result for the same physical file.
    ///
    /// # Errors
    ///
    /// Returns `Error::InputRead` if the file is missing, `Error::Deserialize`
    /// if it is malformed, `Error::ReferenceCycle` if it is already being
    /// loaded further up, or any error from resolving its own references.
    pub fn load(&mut self, config: &ResolveConfig, path: &Path) -> Result<&Document, Error> {
        let canonical = path
            .canonicalize()
            .map_err(|e| return Error::InputRead { path: path.to_path_buf(), source: e })?;

        if self.documents.contains_key(&canonical) {
            tracing::trace!(path = %canonical.display(), "document cache hit");
        } else {
            let document = self.load_uncached(config, &canonical)?;
            self.documents.insert(canonical.clone(), document);
        }

        return self
            .documents
            .get(&canonical)
            .ok_or_else(|| return Error::unresolvable(canonical.display(), "document missing from session cache"));
    }

    /// Parse and resolve a file that is not in the cache yet.
    fn load_uncached(&mut self, config: &ResolveConfig, canonical: &Path) -> Result<Document, Error> {
        if let Some(start) = self.loading.iter().position(|p| return p == canonical) {
            let mut chain: Vec<PathBuf> = self.loading.get(start..).unwrap_or_default().to_vec();
            chain.push(canonical.to_path_buf());
            return Err(Error::ReferenceCycle { chain });
        }

        tracing::info!(path = %canonical.display(), "loading referenced document");
        let mut document = Document::read_file(canonical)?;
        self.parses = self.parses.saturating_add(1);

        self.loading.push(canonical.to_path_buf());
        let resolved = resolve::resolve_in(&mut document, config, self);
        self.loading.pop();
        resolved?;

        return Ok(document);
    }

    /// An empty session.
    pub fn new() -> Self {
        return Self::default();
    }

    /// Number of files this session has parsed.
    pub const fn parse_count(&self) -> usize {
        return self.parses;
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing, reason = "test assertions")]
mod tests {
    use super::*;

    fn write(dir: &Path, name: &str, content: &str) -> PathBuf {
        let path = dir.join(name);
        std::fs::write(&path, content).unwrap();
        return path;
    }

    #[test]
    fn read_file_sets_source_directory() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(dir.path(), "api.yaml", "openapi: 3.0.0\n");
        let document = Document::read_file(&path).unwrap();
        assert_eq!(document.source_dir(), path.parent().unwrap());
        assert_eq!(document.value_at("#/openapi").unwrap(), Value::String("3.0.0".to_string()));
    }

    #[test]
    fn read_stream_uses_given_directory() {
        let document = Document::read("openapi: 3.0.0\n".as_bytes(), PathBuf::from("/specs")).unwrap();
        assert_eq!(document.source_dir(), Path::new("/specs"));
        assert_eq!(document.origin(), Path::new("-"));
    }

    #[test]
    fn missing_file_is_input_error() {
        let err = Document::read_file(Path::new("/definitely/not/here.yaml")).unwrap_err();
        assert!(matches!(err, Error::InputRead { .. }));
    }

    #[test]
    fn write_round_trips_through_stream() {
        let document = Document::read("openapi: 3.0.0\npaths: {}\n".as_bytes(), PathBuf::from(".")).unwrap();
        let mut out = Vec::new();
        document.write(&mut out).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "openapi: 3.0.0\npaths: {}\n");
    }

    #[test]
    fn session_parses_each_file_once() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "common.yaml", "components:\n  schemas:\n    Error:\n      type: object\n");
        std::fs::create_dir(dir.path().join("sub")).unwrap();

        let mut session = Session::new();
        session.document_for(dir.path(), "common.yaml#/components/schemas/Error").unwrap();
        session
            .document_for(&dir.path().join("sub"), "../common.yaml#/components/schemas/Error")
            .unwrap();
        assert_eq!(session.parse_count(), 1);
        assert!(session.is_cached(&dir.path().join("common.yaml")));
    }

    #[test]
    fn referenced_documents_are_resolved_before_use() {
        let dir = tempfile::tempdir().unwrap();
        write(
            dir.path(),
            "common.yaml",
            "\
components:
  schemas:
    Error:
      properties:
        code:
          $ref: '#/components/schemas/Code'
    Code:
      type: integer
",
        );
        let mut session = Session::new();
        let common = session.document_for(dir.path(), "common.yaml#/components/schemas/Error").unwrap();
        let error = common.value_at("#/components/schemas/Error").unwrap();
        assert_eq!(error["properties"]["code"]["type"], Value::String("integer".to_string()));
        assert_eq!(common.value_at("#/components/schemas/Code").unwrap(), Value::Null);
    }

    #[test]
    fn missing_referenced_file_is_an_input_error() {
        let dir = tempfile::tempdir().unwrap();
        let mut session = Session::new();
        let err = session.document_for(dir.path(), "nope.yaml#/components/schemas/X").unwrap_err();
        assert!(matches!(err, Error::InputRead { .. }), "{err}");
    }

    #[test]
    fn remote_cycle_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "a.yaml", "components:\n  schemas:\n    A:\n      $ref: 'b.yaml#/components/schemas/B'\n");
        write(dir.path(), "b.yaml", "components:\n  schemas:\n    B:\n      $ref: 'a.yaml#/components/schemas/A'\n");
        let mut session = Session::new();
        let err = session.document_for(dir.path(), "a.yaml#/components/schemas/A").unwrap_err();
        assert!(err.to_string().contains("reference cycle detected"), "{err}");
    }
}

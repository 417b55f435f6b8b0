//! Structured document (YAML) adapter.
//!
//! A document is a nested mapping; an entry id is a slash-separated path of
//! keys. Each entry holds the provenance header, free-form metadata, a
//! `points` count and the data:
//! - one point: scalar `temperature` and `pressure` plus a `mass-fractions`
//!   (or `coverages`) mapping from species name to value;
//! - several points: one sequence per native variable under its long name
//!   (`temperature`, `density`, `pressure`), composition blocks as mappings
//!   from species name to sequence, auxiliary columns as sequences.
//!
//! Parsed documents are cached per thread, keyed by path and modification
//! time.

use std::cell::RefCell;
use std::collections::{BTreeSet, HashMap};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use nalgebra::DMatrix;
use serde_yaml::{Mapping, Value};
use tf_fluids::Phase;

use crate::Metadata;
use crate::array::SolutionArray;
use crate::error::{StatesError, StatesResult};
use crate::format::header::{HEADER_KEYS, Header};
use crate::legacy::{missing_density_pressure, points_without_temperature};
use crate::resolver::{FieldData, FieldSet, resolve_state_mode};

/// Keys never copied into metadata on restore.
const EXCLUDED_KEYS: [&str; 3] = ["points", "X", "Y"];

/// Entry keys holding state data rather than metadata.
const DATA_KEYS: [&str; 12] = [
    "points",
    "T",
    "D",
    "P",
    "X",
    "Y",
    "temperature",
    "density",
    "pressure",
    "mass-fractions",
    "mole-fractions",
    "coverages",
];

/// Short code for a long field name; other names pass through.
fn canonical_name(key: &str) -> &str {
    match key {
        "temperature" => "T",
        "density" => "D",
        "pressure" => "P",
        "mass-fractions" => "Y",
        "mole-fractions" => "X",
        other => other,
    }
}

fn long_name(code: &str) -> &str {
    match code {
        "T" => "temperature",
        "D" => "density",
        "P" => "pressure",
        "Y" => "mass-fractions",
        "X" => "mole-fractions",
        other => other,
    }
}

fn tokens(id: &str) -> impl Iterator<Item = &str> {
    id.split('/').filter(|segment| !segment.is_empty())
}

/// Find the entry at `id`; an empty id addresses the document root.
pub(crate) fn locate_entry<'a>(root: &'a Mapping, id: &str) -> StatesResult<&'a Mapping> {
    let mut node = root;
    let mut path = String::new();
    for token in tokens(id) {
        path.push('/');
        path.push_str(token);
        node = match node.get(token) {
            Some(Value::Mapping(child)) => child,
            _ => return Err(StatesError::Structural { path }),
        };
    }
    Ok(node)
}

/// Find or create the entry at `id`, creating intermediate mappings.
fn entry_mut<'a>(root: &'a mut Mapping, id: &str) -> StatesResult<&'a mut Mapping> {
    let mut node = root;
    let mut path = String::new();
    for token in tokens(id) {
        path.push('/');
        path.push_str(token);
        if !node.contains_key(token) {
            node.insert(Value::from(token), Value::Mapping(Mapping::new()));
        }
        node = match node.get_mut(token) {
            Some(Value::Mapping(child)) => child,
            _ => return Err(StatesError::Structural { path }),
        };
    }
    if path.is_empty() {
        return Err(StatesError::Structural {
            path: "/".to_string(),
        });
    }
    Ok(node)
}

/// Replace the entry at `id` with a fresh header, keeping its position.
pub(crate) fn write_header(root: &mut Mapping, id: &str, desc: &str) -> StatesResult<()> {
    let entry = entry_mut(root, id)?;
    *entry = Header::new(desc).to_mapping();
    Ok(())
}

/// Header and metadata of the entry at `id`, without its data.
pub(crate) fn read_header(root: &Mapping, id: &str) -> StatesResult<Metadata> {
    let entry = locate_entry(root, id)?;
    Ok(entry
        .iter()
        .filter_map(|(key, value)| {
            let key = key.as_str()?;
            if DATA_KEYS.contains(&key) || value.is_sequence() {
                return None;
            }
            Some((key.to_string(), value.clone()))
        })
        .collect())
}

fn sequence(values: impl IntoIterator<Item = f64>) -> Value {
    Value::Sequence(values.into_iter().map(Value::from).collect())
}

fn numeric_sequence(value: &Value) -> Option<Vec<f64>> {
    value
        .as_sequence()?
        .iter()
        .map(Value::as_f64)
        .collect::<Option<Vec<f64>>>()
}

/// Composition stored as species name → sequence of `size` values.
fn composition_matrix(
    phase: &dyn Phase,
    key: &str,
    columns: &Mapping,
    size: usize,
) -> StatesResult<DMatrix<f64>> {
    let mut matrix = DMatrix::zeros(size, phase.n_species());
    for (species, column) in columns {
        let name = species.as_str().unwrap_or_default();
        let j = phase
            .species_index(name)
            .ok_or_else(|| StatesError::UnknownComponent {
                name: name.to_string(),
            })?;
        match numeric_sequence(column) {
            Some(values) if values.len() == size => {
                for (i, value) in values.into_iter().enumerate() {
                    matrix[(i, j)] = value;
                }
            }
            _ => {
                return Err(StatesError::UnsupportedStateMode {
                    what: format!("'{}' of species '{}' has an unsupported shape", key, name),
                });
            }
        }
    }
    Ok(matrix)
}

/// True if any sequence in the entry, or in one of its composition mappings,
/// holds exactly `size` values.
fn has_rows(entry: &Mapping, size: usize) -> bool {
    entry.values().any(|value| match value {
        Value::Sequence(seq) => seq.len() == size,
        Value::Mapping(columns) => columns
            .values()
            .any(|column| column.as_sequence().is_some_and(|seq| seq.len() == size)),
        _ => false,
    })
}

/// Gather every `size`-row field of a multi-point entry under its short code.
fn collect_fields(
    phase: &dyn Phase,
    entry: &Mapping,
    size: usize,
) -> StatesResult<(FieldSet, Vec<String>)> {
    let mut fields = FieldSet::new();
    let mut consumed = Vec::new();
    for (key, value) in entry {
        let Some(key) = key.as_str() else {
            continue;
        };
        match value {
            Value::Sequence(_) => {
                if let Some(values) = numeric_sequence(value) {
                    if values.len() == size {
                        fields.insert(canonical_name(key), FieldData::Vector(values));
                        consumed.push(key.to_string());
                    }
                }
            }
            Value::Mapping(columns) if matches!(key, "mass-fractions" | "mole-fractions") => {
                let matrix = composition_matrix(phase, key, columns, size)?;
                fields.insert(canonical_name(key), FieldData::Matrix(matrix));
                consumed.push(key.to_string());
            }
            _ => {}
        }
    }
    Ok((fields, consumed))
}

impl SolutionArray {
    pub(crate) fn write_document_entry(&mut self, root: &mut Mapping, id: &str) -> StatesResult<()> {
        if let Some(name) = self.extra.keys().find(|name| DATA_KEYS.contains(&name.as_str())) {
            return Err(StatesError::Configuration {
                what: format!("auxiliary column '{}' collides with entry data", name),
            });
        }
        let mut body = Mapping::new();
        for (key, value) in &self.meta {
            if !HEADER_KEYS.contains(&key.as_str()) {
                body.insert(Value::from(key.as_str()), value.clone());
            }
        }
        body.insert(Value::from("points"), Value::from(self.size as u64));
        match self.size {
            0 => {}
            1 => self.encode_single_point(&mut body)?,
            _ => self.encode_columns(&mut body)?,
        }

        let entry = entry_mut(root, id)?;
        for (key, value) in body {
            entry.insert(key, value);
        }
        tracing::debug!("wrote {} rows to entry '{}'", self.size, id);
        Ok(())
    }

    fn encode_single_point(&mut self, body: &mut Mapping) -> StatesResult<()> {
        self.set_index(0)?;
        {
            let phase = self.phase.borrow();
            body.insert(
                Value::from("temperature"),
                Value::from(phase.temperature().value),
            );
            body.insert(Value::from("pressure"), Value::from(phase.pressure().value));

            let (key, values) = match phase.as_surface() {
                Some(surface) => ("coverages", surface.coverages()),
                None => ("mass-fractions", phase.mass_fractions()),
            };
            let mut composition = Mapping::new();
            for (name, value) in phase.species_names().into_iter().zip(values) {
                composition.insert(Value::from(name), Value::from(value));
            }
            body.insert(Value::from(key), Value::Mapping(composition));
        }
        for (name, column) in &self.extra {
            body.insert(Value::from(name.as_str()), sequence(column.iter().copied()));
        }
        Ok(())
    }

    fn encode_columns(&self, body: &mut Mapping) -> StatesResult<()> {
        let stride = self.checked_stride()?;
        let phase = self.phase.borrow();
        let species = phase.species_names();

        for (code, offset) in phase.native_state() {
            let value = match code {
                "X" | "Y" => {
                    let mut columns = Mapping::new();
                    for (j, name) in species.iter().enumerate() {
                        let column = (0..self.size).map(|i| self.data[i * stride + offset + j]);
                        columns.insert(Value::from(name.as_str()), sequence(column));
                    }
                    Value::Mapping(columns)
                }
                _ => sequence((0..self.size).map(|i| self.data[i * stride + offset])),
            };
            body.insert(Value::from(long_name(code)), value);
        }
        for (name, column) in &self.extra {
            body.insert(Value::from(name.as_str()), sequence(column.iter().copied()));
        }
        Ok(())
    }

    pub(crate) fn restore_document_entry(&mut self, root: &Mapping, id: &str) -> StatesResult<()> {
        let entry = locate_entry(root, id)?;
        let points = entry.get("points").and_then(Value::as_u64).unwrap_or_default();
        let points = usize::try_from(points).map_err(|_| StatesError::Configuration {
            what: format!("entry '{}' reports {} points", id, points),
        })?;
        let size = points_without_temperature(entry, points);
        if size > 1 && !has_rows(entry, size) {
            return Err(StatesError::IncompleteState {
                missing: vec![format!("columns with {} rows", size)],
            });
        }
        self.reset(size)?;

        let mut exclude: BTreeSet<String> = EXCLUDED_KEYS.iter().map(|k| k.to_string()).collect();
        match size {
            0 => {}
            1 => self.restore_single_point(entry, &mut exclude)?,
            _ => self.restore_columns(entry, &mut exclude)?,
        }

        for (key, value) in entry {
            let Some(key) = key.as_str() else {
                continue;
            };
            if !exclude.contains(key) {
                self.meta.insert(key.to_string(), value.clone());
            }
        }
        Ok(())
    }

    fn restore_columns(&mut self, entry: &Mapping, exclude: &mut BTreeSet<String>) -> StatesResult<()> {
        let (fields, consumed, resolution, recover) = {
            let phase = self.phase.borrow();
            let (fields, consumed) = collect_fields(&*phase, entry, self.size)?;
            let names = fields.names();
            let resolution = resolve_state_mode(&*phase, &names);
            let recover = match resolution {
                Some(_) => None,
                None => missing_density_pressure(&*phase, &names, entry),
            };
            if resolution.is_none() && recover.is_none() {
                let native: Vec<&str> = phase.native_state().keys().copied().collect();
                let missing: Vec<String> = native
                    .iter()
                    .filter(|name| !names.contains(**name))
                    .map(|name| name.to_string())
                    .collect();
                if missing.len() < native.len() {
                    return Err(StatesError::IncompleteState { missing });
                }
                return Err(StatesError::UnsupportedStateMode {
                    what: "data are not consistent with full state modes".to_string(),
                });
            }
            (fields, consumed, resolution, recover)
        };
        exclude.extend(consumed);

        match (resolution, recover) {
            (Some(resolution), _) => self.restore_resolved(&resolution, fields),
            (None, Some(pressure)) => self.recover_missing_density(fields, pressure),
            (None, None) => Ok(()),
        }
    }
}

struct CachedDocument {
    modified: Option<SystemTime>,
    root: Mapping,
}

thread_local! {
    static DOCUMENT_CACHE: RefCell<HashMap<PathBuf, CachedDocument>> = RefCell::new(HashMap::new());
}

/// Parse the document at `path`, reusing this thread's cached parse if the
/// file is unchanged. An empty file is an empty mapping.
pub fn load_document(path: &Path) -> StatesResult<Mapping> {
    let modified = fs::metadata(path).and_then(|m| m.modified()).ok();
    let cached = DOCUMENT_CACHE.with(|cache| {
        cache
            .borrow()
            .get(path)
            .filter(|doc| doc.modified.is_some() && doc.modified == modified)
            .map(|doc| doc.root.clone())
    });
    if let Some(root) = cached {
        tracing::trace!("using cached parse of {}", path.display());
        return Ok(root);
    }

    let content = fs::read_to_string(path).map_err(|source| StatesError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let root = match serde_yaml::from_str::<Value>(&content)? {
        Value::Null => Mapping::new(),
        Value::Mapping(root) => root,
        _ => {
            return Err(StatesError::UnsupportedFormat {
                what: format!("document root of {} is not a mapping", path.display()),
            });
        }
    };
    DOCUMENT_CACHE.with(|cache| {
        cache.borrow_mut().insert(
            path.to_path_buf(),
            CachedDocument {
                modified,
                root: root.clone(),
            },
        );
    });
    Ok(root)
}

/// Drop this thread's cached parse of `path`.
pub fn clear_cached_document(path: &Path) {
    DOCUMENT_CACHE.with(|cache| {
        if cache.borrow_mut().remove(path).is_some() {
            tracing::trace!("dropped cached parse of {}", path.display());
        }
    });
}

/// Serialize `root` to `path` and invalidate the cached parse.
pub(crate) fn save_document(path: &Path, root: &Mapping) -> StatesResult<()> {
    let content = serde_yaml::to_string(root)?;
    fs::write(path, content).map_err(|source| StatesError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    clear_cached_document(path);
    Ok(())
}

use std::path::Path;

use hdf5::types::{TypeDescriptor, VarLenUnicode};
use hdf5::{File, Group, Location};
use nalgebra::DMatrix;
use serde_yaml::Value;

use super::{DatasetInfo, HierarchicalStore, group_path};
use crate::Metadata;
use crate::error::{StatesError, StatesResult};

fn store_err(err: hdf5::Error) -> StatesError {
    StatesError::Store {
        message: err.to_string(),
    }
}

/// [`HierarchicalStore`] backed by an HDF5 file.
pub struct Hdf5Store {
    file: File,
}

impl Hdf5Store {
    /// Open read-only.
    pub fn open(path: &Path) -> StatesResult<Self> {
        let file = File::open(path).map_err(store_err)?;
        Ok(Self { file })
    }

    /// Open read-write, creating the file if it does not exist.
    pub fn open_or_create(path: &Path) -> StatesResult<Self> {
        let file = File::append(path).map_err(store_err)?;
        Ok(Self { file })
    }

    fn group(&self, path: &str) -> StatesResult<Group> {
        let key = group_path(path);
        if key.is_empty() {
            return self.file.group("/").map_err(store_err);
        }
        if !self.file.link_exists(&key) {
            return Err(StatesError::Structural {
                path: format!("/{}", key),
            });
        }
        self.file.group(&key).map_err(store_err)
    }

    fn replace_dataset(group: &Group, name: &str) -> StatesResult<()> {
        if group.link_exists(name) {
            group.unlink(name).map_err(store_err)?;
        }
        Ok(())
    }
}

fn write_attribute(location: &Location, name: &str, value: &Value) -> StatesResult<()> {
    let exists = location
        .attr_names()
        .map_err(store_err)?
        .iter()
        .any(|n| n == name);

    macro_rules! write_scalar {
        ($ty:ty, $value:expr) => {{
            let attr = if exists {
                location.attr(name)
            } else {
                location.new_attr::<$ty>().shape(()).create(name)
            }
            .map_err(store_err)?;
            attr.write_scalar(&$value).map_err(store_err)
        }};
    }

    match value {
        Value::Bool(b) => write_scalar!(bool, *b),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                write_scalar!(i64, i)
            } else {
                write_scalar!(f64, n.as_f64().unwrap_or(f64::NAN))
            }
        }
        Value::String(s) => {
            let text: VarLenUnicode = s.parse().map_err(|_| StatesError::Store {
                message: format!("attribute '{}' is not a valid string", name),
            })?;
            write_scalar!(VarLenUnicode, text)
        }
        other => {
            let text = serde_yaml::to_string(other)?;
            tracing::warn!("storing structured attribute '{}' as YAML text", name);
            let text: VarLenUnicode = text.trim_end().parse().map_err(|_| StatesError::Store {
                message: format!("attribute '{}' is not a valid string", name),
            })?;
            write_scalar!(VarLenUnicode, text)
        }
    }
}

fn read_attribute(location: &Location, name: &str) -> StatesResult<Option<Value>> {
    let attr = location.attr(name).map_err(store_err)?;
    if !attr.is_scalar() {
        tracing::warn!("skipping non-scalar attribute '{}'", name);
        return Ok(None);
    }
    let descriptor = attr
        .dtype()
        .and_then(|dtype| dtype.to_descriptor())
        .map_err(store_err)?;
    let value = match descriptor {
        TypeDescriptor::Float(_) => Value::from(attr.read_scalar::<f64>().map_err(store_err)?),
        TypeDescriptor::Integer(_) => Value::from(attr.read_scalar::<i64>().map_err(store_err)?),
        TypeDescriptor::Unsigned(_) => Value::from(attr.read_scalar::<u64>().map_err(store_err)?),
        TypeDescriptor::Boolean => Value::from(attr.read_scalar::<bool>().map_err(store_err)?),
        TypeDescriptor::VarLenUnicode | TypeDescriptor::VarLenAscii => {
            let text = attr.read_scalar::<VarLenUnicode>().map_err(store_err)?;
            Value::from(text.as_str())
        }
        other => {
            tracing::warn!("skipping attribute '{}' of type {:?}", name, other);
            return Ok(None);
        }
    };
    Ok(Some(value))
}

impl HierarchicalStore for Hdf5Store {
    fn ensure_group(&mut self, path: &str) -> StatesResult<()> {
        let mut current = self.file.group("/").map_err(store_err)?;
        for segment in group_path(path).split('/').filter(|s| !s.is_empty()) {
            current = if current.link_exists(segment) {
                current.group(segment)
            } else {
                current.create_group(segment)
            }
            .map_err(store_err)?;
        }
        Ok(())
    }

    fn has_group(&self, path: &str) -> bool {
        self.group(path).is_ok()
    }

    /// Attributes cannot be deleted in place, so a non-root group is moved
    /// aside, recreated empty, and its child groups are linked back. The root
    /// group only loses its datasets.
    fn clear_group(&mut self, path: &str) -> StatesResult<()> {
        let group = self.group(path)?;
        let key = group_path(path);
        if key.is_empty() {
            for ds in group.datasets().map_err(store_err)? {
                let name = ds.name();
                group.unlink(&name).map_err(store_err)?;
            }
            return Ok(());
        }

        let stale = format!("{}.stale", key);
        if self.file.link_exists(&stale) {
            self.file.unlink(&stale).map_err(store_err)?;
        }
        self.file.relink(&key, &stale).map_err(store_err)?;
        self.file.create_group(&key).map_err(store_err)?;
        for child in group.groups().map_err(store_err)? {
            let child_name = child.name();
            let leaf = child_name.rsplit('/').next().unwrap_or_default();
            self.file
                .relink(&format!("{}/{}", stale, leaf), &format!("{}/{}", key, leaf))
                .map_err(store_err)?;
        }
        self.file.unlink(&stale).map_err(store_err)
    }

    fn write_attributes(&mut self, path: &str, attrs: &Metadata) -> StatesResult<()> {
        let group = self.group(path)?;
        for (name, value) in attrs {
            write_attribute(&group, name, value)?;
        }
        Ok(())
    }

    fn read_attributes(&self, path: &str) -> StatesResult<Metadata> {
        let group = self.group(path)?;
        let mut attrs = Metadata::new();
        for name in group.attr_names().map_err(store_err)? {
            if let Some(value) = read_attribute(&group, &name)? {
                attrs.insert(name, value);
            }
        }
        Ok(attrs)
    }

    fn datasets(&self, path: &str) -> StatesResult<Vec<DatasetInfo>> {
        let group = self.group(path)?;
        let mut info: Vec<DatasetInfo> = group
            .datasets()
            .map_err(store_err)?
            .iter()
            .map(|ds| DatasetInfo {
                name: ds.name().rsplit('/').next().unwrap_or_default().to_string(),
                shape: ds.shape(),
            })
            .collect();
        info.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(info)
    }

    fn write_vector(&mut self, path: &str, name: &str, data: &[f64]) -> StatesResult<()> {
        let group = self.group(path)?;
        Self::replace_dataset(&group, name)?;
        let ds = group
            .new_dataset::<f64>()
            .shape(data.len())
            .create(name)
            .map_err(store_err)?;
        ds.write_raw(data).map_err(store_err)
    }

    fn write_matrix(&mut self, path: &str, name: &str, data: &DMatrix<f64>) -> StatesResult<()> {
        let group = self.group(path)?;
        Self::replace_dataset(&group, name)?;
        let ds = group
            .new_dataset::<f64>()
            .shape((data.nrows(), data.ncols()))
            .create(name)
            .map_err(store_err)?;
        let row_major = data.transpose();
        ds.write_raw(row_major.as_slice()).map_err(store_err)
    }

    fn read_vector(&self, path: &str, name: &str) -> StatesResult<Vec<f64>> {
        let ds = self.group(path)?.dataset(name).map_err(store_err)?;
        if ds.ndim() != 1 {
            return Err(StatesError::UnsupportedStateMode {
                what: format!("dataset '{}' is not one-dimensional", name),
            });
        }
        ds.read_raw::<f64>().map_err(store_err)
    }

    fn read_matrix(&self, path: &str, name: &str) -> StatesResult<DMatrix<f64>> {
        let ds = self.group(path)?.dataset(name).map_err(store_err)?;
        match ds.shape().as_slice() {
            &[rows, cols] => {
                let values = ds.read_raw::<f64>().map_err(store_err)?;
                Ok(DMatrix::from_row_slice(rows, cols, &values))
            }
            _ => Err(StatesError::UnsupportedStateMode {
                what: format!("dataset '{}' is not two-dimensional", name),
            }),
        }
    }
}

//! Object storage for one schema.
//!
//! An [`ObjectStore`] owns the objects of a single schema together with one
//! [`AttrIndex`] per index the schema declares, and keeps both in step:
//! every live object is present in every index under its current key.

use crate::arena::HandleArena;
use crate::config::StoreConfig;
use crate::filter::Filter;
use crate::object::{Object, ObjectRef};
use crate::persist::{self, StoreImageRef};
use sos_core::pattern_match::KeyPattern;
use sos_core::schema::{IndexDef, Schema};
use sos_core::{Error, Handle, Key, Result, Value};
use sos_index::AttrIndex;
use std::path::{Path, PathBuf};

/// Objects of one schema plus their indexes.
pub struct ObjectStore {
    schema: Schema,
    config: StoreConfig,
    objects: HandleArena<Object>,
    indexes: Vec<AttrIndex>,
    /// Snapshot file of a disk-backed store.
    location: Option<PathBuf>,
}

impl ObjectStore {
    /// Creates an in-memory store.
    pub fn new(schema: Schema) -> Self {
        Self::with_config(schema, StoreConfig::default())
    }

    /// Creates an in-memory store with explicit configuration.
    pub fn with_config(schema: Schema, config: StoreConfig) -> Self {
        let indexes = schema
            .indexes()
            .iter()
            .map(|def| AttrIndex::new(def.name(), schema.key_type(def), &config.index))
            .collect();
        Self {
            schema,
            config,
            objects: HandleArena::new(),
            indexes,
            location: None,
        }
    }

    /// Creates an empty disk-backed store in `dir`.
    ///
    /// `dir` must be an existing, writable directory without a snapshot of
    /// the configured name; otherwise this fails with `StorageUnavailable`.
    pub fn create(dir: impl AsRef<Path>, schema: Schema, config: StoreConfig) -> Result<Self> {
        let dir = dir.as_ref();
        persist::check_dir(dir)?;
        let path = dir.join(&config.snapshot_file);
        if path.exists() {
            return Err(Error::storage_unavailable(&path, "a store already exists here"));
        }

        let mut store = Self::with_config(schema, config);
        store.location = Some(path);
        store.commit()?;
        tracing::info!(
            path = %dir.display(),
            schema = store.schema.name(),
            attributes = store.schema.len(),
            indexes = store.indexes.len(),
            "store created"
        );
        Ok(store)
    }

    /// Opens the store last committed in `dir`, rebuilding its indexes.
    pub fn open(dir: impl AsRef<Path>, config: StoreConfig) -> Result<Self> {
        let dir = dir.as_ref();
        persist::check_dir(dir)?;
        let path = dir.join(&config.snapshot_file);
        let image = persist::read_snapshot(&path)?;
        image
            .schema
            .validate()
            .map_err(|e| Error::corrupted(format!("{}: schema: {}", path.display(), e)))?;

        let mut store = Self::with_config(image.schema, config);
        store.objects = HandleArena::from_parts(image.slots, image.free)?;
        store.location = Some(path);
        store.rebuild_indexes()?;
        tracing::info!(
            path = %dir.display(),
            schema = store.schema.name(),
            objects = store.len(),
            "store opened"
        );
        Ok(store)
    }

    fn rebuild_indexes(&mut self) -> Result<()> {
        for (handle, object) in self.objects.iter() {
            check_values(&self.schema, object.values())
                .map_err(|e| Error::corrupted(format!("object {}: {}", handle, e)))?;
            link(&self.schema, &mut self.indexes, handle, object.values())?;
        }
        for index in &self.indexes {
            tracing::debug!(index = index.name(), entries = index.len(), "index rebuilt");
        }
        Ok(())
    }

    /// Persists the current state of a disk-backed store. A no-op in memory.
    pub fn commit(&self) -> Result<()> {
        let Some(path) = &self.location else {
            return Ok(());
        };
        let image = StoreImageRef {
            schema: &self.schema,
            slots: self.objects.slots(),
            free: self.objects.free_list(),
        };
        persist::write_snapshot(path, &image, self.config.sync_on_commit)?;
        tracing::info!(path = %path.display(), objects = self.len(), "store committed");
        Ok(())
    }

    /// Drops every object and resets the handle space, keeping the schema.
    /// A disk-backed store commits the empty state.
    pub fn reinit(&mut self) -> Result<()> {
        let dropped = self.objects.len();
        self.objects.clear();
        for index in &mut self.indexes {
            index.clear();
        }
        self.commit()?;
        tracing::info!(schema = self.schema.name(), dropped, "store reinitialised");
        Ok(())
    }

    #[inline]
    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    #[inline]
    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    /// Snapshot file of a disk-backed store.
    pub fn path(&self) -> Option<&Path> {
        self.location.as_deref()
    }

    /// Number of live objects.
    #[inline]
    pub fn len(&self) -> usize {
        self.objects.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    pub fn contains(&self, handle: Handle) -> bool {
        self.objects.contains(handle)
    }

    /// Creates an object with every attribute at its zero value.
    pub fn create_object(&mut self) -> Result<Handle> {
        self.insert(self.schema.defaults())
    }

    /// Creates an object from a full set of values in schema order.
    pub fn insert(&mut self, values: Vec<Value>) -> Result<Handle> {
        check_values(&self.schema, &values)?;
        let handle = self.objects.allocate(Object::new(values))?;
        let Some(object) = self.objects.get(handle) else {
            return Err(Error::AlreadyDeleted { handle });
        };
        if let Err(e) = link(&self.schema, &mut self.indexes, handle, object.values()) {
            self.objects.retire(handle)?;
            self.objects.recycle(handle);
            return Err(e);
        }
        Ok(handle)
    }

    fn live(&self, handle: Handle) -> Result<&Object> {
        self.objects.get(handle).ok_or(Error::AlreadyDeleted { handle })
    }

    /// Value of one attribute of an object.
    pub fn get(&self, handle: Handle, attribute: &str) -> Result<&Value> {
        let pos = self.schema.position(attribute)?;
        Ok(&self.live(handle)?.values()[pos])
    }

    /// A view of the whole object.
    pub fn object(&self, handle: Handle) -> Result<ObjectRef<'_>> {
        Ok(ObjectRef::new(handle, &self.schema, self.live(handle)?))
    }

    /// Sets one attribute of an object.
    ///
    /// Every index keyed on the attribute moves the object from its old key
    /// to its new key within this call. New keys are added before old keys
    /// are dropped, and a failed add restores the previous state.
    pub fn set(&mut self, handle: Handle, attribute: &str, value: Value) -> Result<()> {
        let attr = self.schema.attribute(attribute)?;
        let pos = attr.position();
        if value.data_type() != attr.data_type() {
            return Err(Error::type_mismatch(attr.data_type(), value.data_type()));
        }

        let defs = self.schema.indexes();
        let object = self
            .objects
            .get_mut(handle)
            .ok_or(Error::AlreadyDeleted { handle })?;
        if object.values()[pos] == value {
            return Ok(());
        }

        let covering: Vec<usize> = (0..defs.len()).filter(|&i| defs[i].covers(pos)).collect();
        let old_keys: Vec<Key> = covering
            .iter()
            .map(|&i| self.schema.key_for(&defs[i], object.values()))
            .collect();
        let old_value = std::mem::replace(&mut object.values_mut()[pos], value);
        let new_keys: Vec<Key> = covering
            .iter()
            .map(|&i| self.schema.key_for(&defs[i], object.values()))
            .collect();

        for (n, &i) in covering.iter().enumerate() {
            if old_keys[n] == new_keys[n] {
                continue;
            }
            if let Err(e) = self.indexes[i].add(new_keys[n].clone(), handle) {
                for (m, &j) in covering[..n].iter().enumerate() {
                    if old_keys[m] != new_keys[m] {
                        self.indexes[j].remove(&new_keys[m], handle)?;
                    }
                }
                object.values_mut()[pos] = old_value;
                return Err(e);
            }
        }
        for (n, &i) in covering.iter().enumerate() {
            if old_keys[n] != new_keys[n] {
                self.indexes[i].remove(&old_keys[n], handle)?;
            }
        }
        Ok(())
    }

    /// Parses `raw` for the attribute and sets it.
    pub fn set_text(&mut self, handle: Handle, attribute: &str, raw: &str) -> Result<()> {
        let value = self.schema.parse(attribute, raw)?;
        self.set(handle, attribute, value)
    }

    /// Deletes an object.
    ///
    /// The object is first taken out of the live set, then removed from every
    /// index, and only then is its handle slot made reusable. Deleting a
    /// handle that is not live fails with `AlreadyDeleted`.
    pub fn delete(&mut self, handle: Handle) -> Result<()> {
        let object = self.objects.retire(handle)?;
        unlink(&self.schema, &mut self.indexes, handle, object.values());
        let recycled = self.objects.recycle(handle);
        debug_assert!(recycled, "retired slot could not be recycled");
        tracing::trace!(handle = %handle, "object deleted");
        Ok(())
    }

    /// Every live object, in handle slot order.
    pub fn iter(&self) -> impl Iterator<Item = ObjectRef<'_>> + '_ {
        self.objects
            .iter()
            .map(move |(handle, object)| ObjectRef::new(handle, &self.schema, object))
    }

    /// Live objects satisfying `pred`, in handle slot order.
    ///
    /// The sequence borrows the store; it can be restarted by calling again.
    pub fn filter<'a, P>(&'a self, mut pred: P) -> impl Iterator<Item = ObjectRef<'a>> + 'a
    where
        P: FnMut(&ObjectRef<'a>) -> bool + 'a,
    {
        self.iter().filter(move |object| pred(object))
    }

    /// At most `count` objects of [`filter`](Self::filter), starting at the
    /// 0-based position `start` of the filtered sequence.
    pub fn filter_at<'a, P>(
        &'a self,
        pred: P,
        start: usize,
        count: usize,
    ) -> impl Iterator<Item = ObjectRef<'a>> + 'a
    where
        P: FnMut(&ObjectRef<'a>) -> bool + 'a,
    {
        self.filter(pred).skip(start).take(count)
    }

    /// A condition filter iterating the named index in key order.
    pub fn filter_on(&self, index: &str) -> Result<Filter<'_>> {
        Filter::new(self, index)
    }

    /// Every index of the store, in schema order.
    pub fn indexes(&self) -> &[AttrIndex] {
        &self.indexes
    }

    /// The named index.
    pub fn index(&self, name: &str) -> Result<&AttrIndex> {
        self.indexes
            .iter()
            .find(|index| index.name() == name)
            .ok_or_else(|| Error::index_not_found(self.schema.name(), name))
    }

    pub(crate) fn view(&self, handle: Handle) -> Option<ObjectRef<'_>> {
        self.objects
            .get(handle)
            .map(|object| ObjectRef::new(handle, &self.schema, object))
    }

    /// Object with the smallest key of the named index.
    pub fn min(&self, index: &str) -> Result<Option<ObjectRef<'_>>> {
        Ok(self.index(index)?.min().and_then(|(_, h)| self.view(h)))
    }

    /// Object with the largest key of the named index.
    pub fn max(&self, index: &str) -> Result<Option<ObjectRef<'_>>> {
        Ok(self.index(index)?.max().and_then(|(_, h)| self.view(h)))
    }

    /// Objects whose key in the named index lies in `[lo, hi]`, ascending.
    pub fn range<'a>(
        &'a self,
        index: &str,
        lo: &Key,
        hi: &Key,
    ) -> Result<impl Iterator<Item = ObjectRef<'a>> + 'a> {
        let iter = self.index(index)?.range(lo, hi)?;
        Ok(iter.filter_map(move |(_, h)| self.view(h)))
    }

    /// Objects whose key in the named index matches `pattern`, in key order.
    pub fn find<'a>(
        &'a self,
        index: &str,
        pattern: &'a KeyPattern,
    ) -> Result<impl Iterator<Item = ObjectRef<'a>> + 'a> {
        let iter = self.index(index)?.find(pattern);
        Ok(iter.filter_map(move |(_, h)| self.view(h)))
    }
}

impl std::fmt::Debug for ObjectStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ObjectStore")
            .field("schema", &self.schema.name())
            .field("objects", &self.len())
            .field("indexes", &self.indexes)
            .field("location", &self.location)
            .finish()
    }
}

/// Checks a full set of values against the schema.
fn check_values(schema: &Schema, values: &[Value]) -> Result<()> {
    if values.len() != schema.len() {
        return Err(Error::type_mismatch(
            format!("{} values", schema.len()),
            format!("{} values", values.len()),
        ));
    }
    for (attr, value) in schema.attributes().iter().zip(values) {
        if value.data_type() != attr.data_type() {
            return Err(Error::type_mismatch(attr.data_type(), value.data_type()));
        }
    }
    Ok(())
}

fn key_of(schema: &Schema, def: &IndexDef, values: &[Value]) -> Key {
    schema.key_for(def, values)
}

/// Adds `handle` to every index. On failure the indexes already updated are
/// rolled back.
fn link(schema: &Schema, indexes: &mut [AttrIndex], handle: Handle, values: &[Value]) -> Result<()> {
    for (n, def) in schema.indexes().iter().enumerate() {
        if let Err(e) = indexes[n].add(key_of(schema, def, values), handle) {
            unlink(schema, &mut indexes[..n], handle, values);
            return Err(e);
        }
    }
    Ok(())
}

/// Removes `handle` from every index in `indexes`.
fn unlink(schema: &Schema, indexes: &mut [AttrIndex], handle: Handle, values: &[Value]) {
    for (def, index) in schema.indexes().iter().zip(indexes.iter_mut()) {
        let key = key_of(schema, def, values);
        if !matches!(index.remove(&key, handle), Ok(true)) {
            tracing::warn!(index = index.name(), handle = %handle, key = %key, "handle missing from index");
        }
    }
}

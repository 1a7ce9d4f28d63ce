use super::field::FieldDefinition;
use arc_swap::ArcSwap;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Immutable point-in-time view of the remote index's fields.
///
/// A snapshot is never changed after construction. Refreshing the schema
/// always builds a new snapshot and publishes it through [`SchemaCell`].
#[derive(Debug, Clone)]
pub struct SchemaSnapshot {
    fields: Vec<FieldDefinition>,
    field_map: HashMap<String, usize>,
    generation: u64,
    synced_at: DateTime<Utc>,
}

impl SchemaSnapshot {
    /// Snapshot with no fields, used before the service has connected.
    pub fn empty() -> Self {
        Self::with_generation(Vec::new(), 0)
    }

    fn with_generation(fields: Vec<FieldDefinition>, generation: u64) -> Self {
        let mut field_map = HashMap::with_capacity(fields.len());
        for (idx, field) in fields.iter().enumerate() {
            field_map.entry(field.name.clone()).or_insert(idx);
        }
        SchemaSnapshot {
            fields,
            field_map,
            generation,
            synced_at: Utc::now(),
        }
    }

    pub fn fields(&self) -> &[FieldDefinition] {
        &self.fields
    }

    pub fn get_field(&self, name: &str) -> Option<&FieldDefinition> {
        self.field_map.get(name).map(|&idx| &self.fields[idx])
    }

    pub fn contains(&self, name: &str) -> bool {
        self.field_map.contains_key(name)
    }

    pub fn key_field(&self) -> Option<&FieldDefinition> {
        self.fields.iter().find(|f| f.is_key())
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Publication counter; `0` for a snapshot that was never published.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn synced_at(&self) -> DateTime<Utc> {
        self.synced_at
    }
}

/// Atomically swappable holder of the current [`SchemaSnapshot`].
///
/// Readers get a whole `Arc<SchemaSnapshot>`; a publish is one pointer store.
/// Concurrent publishers race with last-write-wins.
pub struct SchemaCell {
    current: ArcSwap<SchemaSnapshot>,
    generation: AtomicU64,
}

impl Default for SchemaCell {
    fn default() -> Self {
        Self::new()
    }
}

impl SchemaCell {
    pub fn new() -> Self {
        SchemaCell {
            current: ArcSwap::from_pointee(SchemaSnapshot::empty()),
            generation: AtomicU64::new(0),
        }
    }

    pub fn load(&self) -> Arc<SchemaSnapshot> {
        self.current.load_full()
    }

    /// Build a snapshot from `fields` and make it current.
    pub fn publish(&self, fields: Vec<FieldDefinition>) -> Arc<SchemaSnapshot> {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        let snapshot = Arc::new(SchemaSnapshot::with_generation(fields, generation));
        self.current.store(Arc::clone(&snapshot));
        snapshot
    }
}

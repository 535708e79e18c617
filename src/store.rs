//! Resume data store – the single writer of the resume aggregate.
//!
//! Readers take [`ResumeStore::snapshot`] and pass it explicitly to the
//! renderers; every successful mutation bumps [`ResumeStore::version`].

use crate::error::{EntityKind, StorageError, StoreError};
use crate::model::{
    new_entity_id, Education, EntityId, Experience, PersonalInfo, Project, ResumeData, Skill,
    TemplateId,
};
use crate::storage::{KeyValueStorage, STORAGE_KEY};

/// An identified entry living in one of the aggregate's collections.
pub trait Entity: Clone {
    const KIND: EntityKind;

    fn id(&self) -> &str;
    fn set_id(&mut self, id: EntityId);
    fn collection(data: &ResumeData) -> &Vec<Self>;
    fn collection_mut(data: &mut ResumeData) -> &mut Vec<Self>;
}

macro_rules! impl_entity {
    ($ty:ty, $kind:expr, $field:ident) => {
        impl Entity for $ty {
            const KIND: EntityKind = $kind;

            fn id(&self) -> &str {
                &self.id
            }

            fn set_id(&mut self, id: EntityId) {
                self.id = id;
            }

            fn collection(data: &ResumeData) -> &Vec<Self> {
                &data.$field
            }

            fn collection_mut(data: &mut ResumeData) -> &mut Vec<Self> {
                &mut data.$field
            }
        }
    };
}

impl_entity!(Experience, EntityKind::Experience, experience);
impl_entity!(Education, EntityKind::Education, education);
impl_entity!(Skill, EntityKind::Skill, skills);
impl_entity!(Project, EntityKind::Project, projects);

/// Owned, versioned resume state.
#[derive(Debug, Clone, Default)]
pub struct ResumeStore {
    data: ResumeData,
    version: u64,
}

impl ResumeStore {
    pub fn new(data: ResumeData) -> Self {
        Self { data, version: 0 }
    }

    /// Seed from the persisted snapshot, or defaults when none exists.
    pub fn load(storage: &dyn KeyValueStorage) -> Result<Self, StorageError> {
        match storage.get(STORAGE_KEY)? {
            Some(json) => {
                let data = ResumeData::from_json(&json)?;
                log::info!("Loaded resume snapshot ({} bytes)", json.len());
                Ok(Self::new(data))
            }
            None => {
                log::info!("No saved resume found; starting from defaults");
                Ok(Self::default())
            }
        }
    }

    /// Persist the current snapshot. Only called on an explicit save.
    pub fn save(&self, storage: &mut dyn KeyValueStorage) -> Result<(), StorageError> {
        let json = self.data.to_json()?;
        storage.set(STORAGE_KEY, &json)?;
        log::info!("Saved resume snapshot v{}", self.version);
        Ok(())
    }

    pub fn snapshot(&self) -> &ResumeData {
        &self.data
    }

    pub fn into_data(self) -> ResumeData {
        self.data
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    fn touch(&mut self) {
        self.version += 1;
    }

    pub fn set_personal_info(&mut self, info: PersonalInfo) {
        self.data.personal_info = info;
        self.touch();
    }

    pub fn set_template(&mut self, template: TemplateId) {
        self.data.template = template;
        self.touch();
    }

    /// Replace the whole aggregate (e.g. an import).
    pub fn replace(&mut self, data: ResumeData) {
        self.data = data;
        self.touch();
    }

    /// Append `entity` under a fresh id and return that id. Any id the caller
    /// put on the record is discarded.
    pub fn add<T: Entity>(&mut self, mut entity: T) -> EntityId {
        let id = new_entity_id();
        entity.set_id(id.clone());
        T::collection_mut(&mut self.data).push(entity);
        self.touch();
        log::debug!("Added {} '{id}'", T::KIND);
        id
    }

    /// Replace the full record stored under `id`, keeping its id and position.
    pub fn update<T: Entity>(&mut self, id: &str, mut entity: T) -> Result<(), StoreError> {
        let slot = T::collection_mut(&mut self.data)
            .iter_mut()
            .find(|e| e.id() == id)
            .ok_or_else(|| not_found::<T>(id))?;
        entity.set_id(id.to_string());
        *slot = entity;
        self.touch();
        Ok(())
    }

    /// Delete the record stored under `id`, returning it.
    pub fn remove<T: Entity>(&mut self, id: &str) -> Result<T, StoreError> {
        let items = T::collection_mut(&mut self.data);
        let pos = items
            .iter()
            .position(|e| e.id() == id)
            .ok_or_else(|| not_found::<T>(id))?;
        let removed = items.remove(pos);
        self.touch();
        Ok(removed)
    }

    pub fn get<T: Entity>(&self, id: &str) -> Option<&T> {
        T::collection(&self.data).iter().find(|e| e.id() == id)
    }
}

fn not_found<T: Entity>(id: &str) -> StoreError {
    StoreError::NotFound {
        kind: T::KIND,
        id: id.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::SkillLevel;
    use crate::storage::MemoryStorage;

    fn skill(name: &str) -> Skill {
        Skill {
            name: name.into(),
            category: "Languages".into(),
            level: SkillLevel::Advanced,
            ..Default::default()
        }
    }

    #[test]
    fn add_assigns_unique_ids_and_appends() {
        let mut store = ResumeStore::default();
        let a = store.add(skill("Rust"));
        let b = store.add(Skill {
            id: "caller-chosen".into(),
            ..skill("Go")
        });
        assert_ne!(a, b);
        assert_ne!(b, "caller-chosen");
        let names: Vec<_> = store.snapshot().skills.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["Rust", "Go"]);
        assert_eq!(store.version(), 2);
    }

    #[test]
    fn update_replaces_full_record_in_place() {
        let mut store = ResumeStore::default();
        let first = store.add(Experience {
            position: "Engineer".into(),
            company: "Acme".into(),
            description: "Built things".into(),
            ..Default::default()
        });
        store.add(Experience::default());

        store
            .update(
                &first,
                Experience {
                    position: "Senior Engineer".into(),
                    ..Default::default()
                },
            )
            .unwrap();

        let exp = &store.snapshot().experience[0];
        assert_eq!(exp.id, first);
        assert_eq!(exp.position, "Senior Engineer");
        // Omitted fields are not preserved.
        assert_eq!(exp.company, "");
        assert_eq!(exp.description, "");
    }

    #[test]
    fn unknown_ids_report_not_found() {
        let mut store = ResumeStore::default();
        let before = store.version();
        let err = store.update("nope", Project::default()).unwrap_err();
        assert_eq!(
            err,
            StoreError::NotFound {
                kind: EntityKind::Project,
                id: "nope".into()
            }
        );
        assert!(store.remove::<Education>("nope").is_err());
        assert_eq!(store.version(), before);
    }

    #[test]
    fn remove_deletes_by_id() {
        let mut store = ResumeStore::default();
        let id = store.add(skill("Rust"));
        let keep = store.add(skill("Go"));
        let removed = store.remove::<Skill>(&id).unwrap();
        assert_eq!(removed.name, "Rust");
        assert!(store.get::<Skill>(&id).is_none());
        assert!(store.get::<Skill>(&keep).is_some());
    }

    #[test]
    fn save_then_load_restores_snapshot() {
        let mut storage = MemoryStorage::new();
        let mut store = ResumeStore::default();
        store.set_template(TemplateId::Creative);
        store.add(skill("Rust"));
        store.save(&mut storage).unwrap();

        let loaded = ResumeStore::load(&storage).unwrap();
        assert_eq!(loaded.snapshot(), store.snapshot());
    }

    #[test]
    fn load_without_snapshot_uses_defaults() {
        let storage = MemoryStorage::new();
        let store = ResumeStore::load(&storage).unwrap();
        assert_eq!(store.snapshot(), &ResumeData::default());
        assert_eq!(store.snapshot().template, TemplateId::Modern);
    }
}

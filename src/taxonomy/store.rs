//! Persistence layer for the taxonomy collection

use crate::error::StorageError;
use crate::taxonomy::Category;
use crate::types::CategoryId;
use serde::Deserialize;
use sled::transaction::{ConflictableTransactionError, TransactionError};
use sled::{IVec, Transactional};
use std::path::Path;
use tracing::{debug, info};

/// Read access to the taxonomy, in taxonomy order.
pub trait TaxonomySource: Send + Sync {
    fn categories(&self) -> Result<Vec<Category>, StorageError>;
}

impl TaxonomySource for Vec<Category> {
    fn categories(&self) -> Result<Vec<Category>, StorageError> {
        Ok(self.clone())
    }
}

const CATEGORIES_TREE: &str = "categories";
const CATEGORY_INDEX_TREE: &str = "category_index";
const SLUG_INDEX_TREE: &str = "level3_slugs";
const NAME_INDEX_TREE: &str = "level3_names";

/// Sled-based taxonomy store.
///
/// Categories are keyed by a monotonically increasing sequence number so that iteration
/// yields insertion order. Re-putting an existing category id replaces it in place.
pub struct SledTaxonomyStore {
    categories: sled::Tree,
    by_id: sled::Tree,
    by_slug: sled::Tree,
    by_name: sled::Tree,
    db: sled::Db,
}

impl SledTaxonomyStore {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, StorageError> {
        let path = path.as_ref();
        let db = sled::open(path).map_err(|e| StorageError::Open {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        Self::from_db(db)
    }

    /// Build the store on an already opened database (shared with the result store).
    pub fn from_db(db: sled::Db) -> Result<Self, StorageError> {
        Ok(Self {
            categories: db.open_tree(CATEGORIES_TREE)?,
            by_id: db.open_tree(CATEGORY_INDEX_TREE)?,
            by_slug: db.open_tree(SLUG_INDEX_TREE)?,
            by_name: db.open_tree(NAME_INDEX_TREE)?,
            db,
        })
    }

    /// Insert or replace a category.
    ///
    /// Fails with `InvalidTaxonomy` when another category already owns the level3 name or
    /// slug. The ownership checks and the writes run in one transaction across the trees.
    pub fn put_category(&self, category: &Category) -> Result<(), StorageError> {
        let id_key = category.id.as_str().as_bytes();
        let name = category.level3.name.as_str();
        let slug = category.level3.slug.as_str();
        let value =
            bincode::serialize(category).map_err(|e| StorageError::Encode(e.to_string()))?;
        let fresh_seq = self
            .db
            .generate_id()
            .map_err(|e| StorageError::Write(e.to_string()))?
            .to_be_bytes();

        let trees = (&self.categories, &self.by_id, &self.by_slug, &self.by_name);
        trees
            .transaction(|(categories, by_id, by_slug, by_name)| {
                ensure_owner(by_slug.get(slug.as_bytes())?, id_key, "slug", slug)?;
                ensure_owner(by_name.get(name.as_bytes())?, id_key, "name", name)?;

                let seq_key = match by_id.get(id_key)? {
                    Some(existing) => {
                        if let Some(previous) = categories.get(&existing)? {
                            let previous = decode_category(&previous)
                                .map_err(ConflictableTransactionError::Abort)?;
                            if previous.level3.slug != slug {
                                by_slug.remove(previous.level3.slug.as_bytes())?;
                            }
                            if previous.level3.name != name {
                                by_name.remove(previous.level3.name.as_bytes())?;
                            }
                        }
                        existing
                    }
                    None => IVec::from(&fresh_seq[..]),
                };

                categories.insert(seq_key.clone(), value.as_slice())?;
                by_id.insert(id_key, seq_key)?;
                by_slug.insert(slug.as_bytes(), id_key)?;
                by_name.insert(name.as_bytes(), id_key)?;
                Ok(())
            })
            .map_err(|e| match e {
                TransactionError::Abort(e) => e,
                TransactionError::Storage(e) => StorageError::Write(e.to_string()),
            })?;

        debug!(category_id = %category.id, "Stored category");
        Ok(())
    }

    pub fn get(&self, id: &CategoryId) -> Result<Option<Category>, StorageError> {
        let Some(seq_key) = self.by_id.get(id.as_str().as_bytes())? else {
            return Ok(None);
        };
        match self.categories.get(seq_key)? {
            Some(value) => Ok(Some(decode_category(&value)?)),
            None => Ok(None),
        }
    }

    /// Load categories from a JSON array or a TOML file with `[[categories]]` tables.
    pub fn import_file(&self, path: &Path) -> Result<usize, StorageError> {
        let content = std::fs::read_to_string(path)?;
        let categories = parse_taxonomy_document(&content, path)?;
        for category in &categories {
            self.put_category(category)?;
        }
        self.flush()?;
        info!(
            path = %path.display(),
            count = categories.len(),
            "Imported taxonomy"
        );
        Ok(categories.len())
    }

    pub fn flush(&self) -> Result<(), StorageError> {
        self.db
            .flush()
            .map_err(|e| StorageError::Write(format!("Failed to flush database: {}", e)))?;
        Ok(())
    }
}

impl TaxonomySource for SledTaxonomyStore {
    fn categories(&self) -> Result<Vec<Category>, StorageError> {
        let mut categories = Vec::new();
        for item in self.categories.iter() {
            let (_, value) = item?;
            categories.push(decode_category(&value)?);
        }
        Ok(categories)
    }
}

fn ensure_owner(
    owner: Option<IVec>,
    id_key: &[u8],
    field: &str,
    value: &str,
) -> Result<(), ConflictableTransactionError<StorageError>> {
    match owner {
        Some(owner) if owner.as_ref() != id_key => Err(ConflictableTransactionError::Abort(
            StorageError::InvalidTaxonomy(format!(
                "level3 {} '{}' already belongs to category '{}'",
                field,
                value,
                String::from_utf8_lossy(&owner)
            )),
        )),
        _ => Ok(()),
    }
}

fn decode_category(bytes: &[u8]) -> Result<Category, StorageError> {
    bincode::deserialize(bytes).map_err(|e| StorageError::Decode(e.to_string()))
}

#[derive(Deserialize)]
struct TomlTaxonomy {
    #[serde(default)]
    categories: Vec<Category>,
}

fn parse_taxonomy_document(content: &str, path: &Path) -> Result<Vec<Category>, StorageError> {
    let is_toml = path
        .extension()
        .map(|ext| ext.eq_ignore_ascii_case("toml"))
        .unwrap_or(false);
    if is_toml {
        toml::from_str::<TomlTaxonomy>(content)
            .map(|doc| doc.categories)
            .map_err(|e| StorageError::InvalidTaxonomy(e.to_string()))
    } else {
        serde_json::from_str(content).map_err(|e| StorageError::InvalidTaxonomy(e.to_string()))
    }
}

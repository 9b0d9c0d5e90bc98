use std::collections::HashMap;

/// Collection holding user accounts
pub const CREDENTIALS_COLLECTION: &str = "sys_user";

/// Field of a credential collection that holds the password hash
pub const PASSWORD_FIELD: &str = "password";

/// Route aliases of the built-in system collections
pub const SYSTEM_COLLECTIONS: &[(&str, &str)] = &[
    ("menu", "sys_menu"),
    ("role", "sys_role"),
    ("user", "sys_user"),
    ("entity", "sys_entity"),
    ("view", "sys_view"),
    ("schema", "sys_schema"),
];

/// Look up the collection behind a `/sys/{alias}` route segment
pub fn system_collection(alias: &str) -> Option<&'static str> {
    SYSTEM_COLLECTIONS
        .iter()
        .find(|(name, _)| *name == alias)
        .map(|(_, collection)| *collection)
}

/// Capabilities of a collection
///
/// Collections are schemaless; the descriptor only says which field (if any)
/// must be hashed before it reaches storage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollectionDescriptor {
    pub name: String,
    pub credential_field: Option<String>,
}

impl CollectionDescriptor {
    pub fn plain(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            credential_field: None,
        }
    }

    pub fn with_credential_field(mut self, field: impl Into<String>) -> Self {
        self.credential_field = Some(field.into());
        self
    }
}

/// Registry of collections with non-default capabilities
///
/// Any collection name not registered here is treated as a plain collection.
#[derive(Debug, Clone)]
pub struct CollectionRegistry {
    descriptors: HashMap<String, CollectionDescriptor>,
}

impl CollectionRegistry {
    pub fn empty() -> Self {
        Self {
            descriptors: HashMap::new(),
        }
    }

    pub fn register(mut self, descriptor: CollectionDescriptor) -> Self {
        self.descriptors.insert(descriptor.name.clone(), descriptor);
        self
    }

    pub fn describe(&self, name: &str) -> CollectionDescriptor {
        self.descriptors
            .get(name)
            .cloned()
            .unwrap_or_else(|| CollectionDescriptor::plain(name))
    }
}

impl Default for CollectionRegistry {
    fn default() -> Self {
        Self::empty().register(
            CollectionDescriptor::plain(CREDENTIALS_COLLECTION).with_credential_field(PASSWORD_FIELD),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_system_collection_aliases() {
        assert_eq!(system_collection("menu"), Some("sys_menu"));
        assert_eq!(system_collection("user"), Some("sys_user"));
        assert_eq!(system_collection("schema"), Some("sys_schema"));
        assert_eq!(system_collection("unknown"), None);
    }

    #[test]
    fn test_default_registry_marks_users_as_credentials() {
        let registry = CollectionRegistry::default();

        assert_eq!(
            registry.describe("sys_user").credential_field.as_deref(),
            Some("password")
        );
        assert_eq!(registry.describe("products").credential_field, None);
    }
}

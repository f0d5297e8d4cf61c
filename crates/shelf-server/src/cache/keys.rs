//! Cache key generation.

use shelf_core::{EntityId, EntityKind};
use std::fmt;

/// Key de una entidad en cache: `<namespace>:<kind>:<id>`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    namespace: String,
    kind: EntityKind,
    id: EntityId,
}

impl CacheKey {
    /// Crea una nueva key.
    ///
    /// # Examples
    ///
    /// ```
    /// use shelf_server::cache::CacheKey;
    /// use shelf_core::{EntityId, EntityKind};
    ///
    /// let key = CacheKey::new("vendure", EntityKind::Product, EntityId::new(42));
    /// assert_eq!(key.to_string(), "vendure:product:42");
    /// ```
    pub fn new(namespace: impl Into<String>, kind: EntityKind, id: EntityId) -> Self {
        Self {
            namespace: namespace.into(),
            kind,
            id,
        }
    }

    /// Retorna el namespace.
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// Retorna el tipo de entidad.
    pub fn kind(&self) -> EntityKind {
        self.kind
    }

    /// Retorna el id.
    pub fn id(&self) -> EntityId {
        self.id
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.namespace, self.kind.key_segment(), self.id)
    }
}

/// Espacio de keys que pertenece a un tipo de entidad.
///
/// Cada servicio de cache es dueño exclusivo de su prefijo
/// `<namespace>:<kind>:`, por lo que no hay colisiones entre tipos.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeySpace {
    namespace: String,
    kind: EntityKind,
}

impl KeySpace {
    /// Crea el espacio de keys para `kind` bajo `namespace`.
    ///
    /// Un namespace vacio produce keys `<kind>:<id>`.
    pub fn new(namespace: impl Into<String>, kind: EntityKind) -> Self {
        Self {
            namespace: namespace.into().trim_end_matches(':').to_string(),
            kind,
        }
    }

    /// Key de una entidad.
    pub fn key(&self, id: EntityId) -> CacheKey {
        CacheKey::new(self.namespace.clone(), self.kind, id)
    }

    /// Patron glob que cubre todas las keys del tipo.
    pub fn pattern(&self) -> String {
        format!("{}*", self.prefix())
    }

    /// Prefijo comun de todas las keys del tipo.
    pub fn prefix(&self) -> String {
        if self.namespace.is_empty() {
            format!("{}:", self.kind.key_segment())
        } else {
            format!("{}:{}:", self.namespace, self.kind.key_segment())
        }
    }

    pub fn kind(&self) -> EntityKind {
        self.kind
    }
}

use crate::entity::Entity;

/// Contract violations reported by the registry.
///
/// None of these are recoverable I/O conditions: each one means a caller's
/// assumption about an entity, a name or a system was wrong.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EcsError {
    #[error("entity {0} does not exist or has already been destroyed")]
    InvalidEntity(Entity),

    #[error("entity {entity} has no `{component}` component")]
    MissingComponent {
        entity: Entity,
        component: &'static str,
    },

    #[error("tag '{tag}' is already held by entity {holder}")]
    DuplicateTag { tag: String, holder: Entity },

    #[error("no entity is tagged '{0}'")]
    UnknownTag(String),

    #[error("system `{0}` is not registered")]
    UnknownSystem(&'static str),

    #[error("system `{0}` is already registered")]
    DuplicateSystem(&'static str),
}

pub type EcsResult<T> = Result<T, EcsError>;

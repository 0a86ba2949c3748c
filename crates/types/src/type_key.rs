use std::{
    any::{Any, TypeId},
    fmt,
    hash::{Hash, Hasher},
};

/// Runtime identity of a Rust type.
///
/// Generators resolve their target from a `TypeKey` rather than from a
/// compile-time type parameter, so the key doubles as the "class token" a caller
/// passes to an explicit `build(type)` call. Equality and hashing consider only
/// the [`TypeId`]; the name is kept for diagnostics.
#[derive(Clone, Copy)]
pub struct TypeKey {
    id: TypeId,
    name: &'static str,
}

impl TypeKey {
    /// Returns the key for `T`.
    pub fn of<T: Any + ?Sized>() -> Self {
        Self {
            id: TypeId::of::<T>(),
            name: std::any::type_name::<T>(),
        }
    }

    pub fn id(&self) -> TypeId {
        self.id
    }

    /// Fully qualified type name as reported by [`std::any::type_name`].
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Last path segment of the type name, generic arguments stripped.
    ///
    /// `alloc::vec::Vec<u8>` becomes `Vec`, `my_crate::model::Person` becomes `Person`.
    pub fn short_name(&self) -> &'static str {
        let without_generics = self.name.split('<').next().unwrap_or(self.name);
        without_generics.rsplit("::").next().unwrap_or(without_generics)
    }

    pub fn is<T: Any + ?Sized>(&self) -> bool {
        self.id == TypeId::of::<T>()
    }
}

impl PartialEq for TypeKey {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for TypeKey {}

impl Hash for TypeKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Debug for TypeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TypeKey({})", self.name)
    }
}

impl fmt::Display for TypeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.short_name())
    }
}

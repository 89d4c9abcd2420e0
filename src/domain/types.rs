//! Type identities and shapes
//!
//! Serialization policies decide inclusion from the *type* of a member. Rust
//! has no runtime reflection, so every type that can appear as a member states
//! its identity up front through [`Describe`], and domain entities are
//! registered against an explicit [`TypeId`] at configuration time.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Namespace shared by built-in platform types.
pub const SYSTEM_NAMESPACE: &str = "std";

/// Identity of the code unit (crate) a type is declared in.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AssemblyId(String);

impl AssemblyId {
    /// Create an assembly id from a crate name
    pub fn new<S: Into<String>>(name: S) -> Self {
        Self(name.into())
    }

    /// The assembly of built-in platform types
    pub fn system() -> Self {
        Self(SYSTEM_NAMESPACE.to_string())
    }

    /// The assembly of this crate
    pub fn of_crate() -> Self {
        Self(env!("CARGO_PKG_NAME").to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl fmt::Display for AssemblyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Stable identifier of a type: namespace, name and declaring assembly.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TypeId {
    namespace: String,
    name: String,
    assembly: AssemblyId,
}

impl TypeId {
    pub fn new<N: Into<String>, T: Into<String>>(
        namespace: N,
        name: T,
        assembly: AssemblyId,
    ) -> Self {
        Self {
            namespace: namespace.into(),
            name: name.into(),
            assembly,
        }
    }

    /// A built-in platform type
    pub fn system<T: Into<String>>(name: T) -> Self {
        Self::new(SYSTEM_NAMESPACE, name, AssemblyId::system())
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn assembly(&self) -> &AssemblyId {
        &self.assembly
    }

    /// `namespace::Name`, or just `Name` when the namespace is empty
    pub fn full_name(&self) -> String {
        if self.namespace.is_empty() {
            self.name.clone()
        } else {
            format!("{}::{}", self.namespace, self.name)
        }
    }

    /// Whether the type lives in the platform namespace or one of its children
    pub fn is_system(&self) -> bool {
        self.namespace == SYSTEM_NAMESPACE
            || self
                .namespace
                .strip_prefix(SYSTEM_NAMESPACE)
                .is_some_and(|rest| rest.starts_with("::"))
    }
}

impl fmt::Display for TypeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.full_name())
    }
}

/// Structural category of a type.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TypeKind {
    /// Scalars, enums and small `Copy` structs
    Value,
    /// The string type
    String,
    /// Fixed or dynamically sized arrays of an element type
    Array(Box<TypeRef>),
    /// Instantiated generic; `sequence` marks collections such as `Vec<T>`
    Generic { arguments: Vec<TypeRef>, sequence: bool },
    /// Non-generic collection
    Sequence,
    /// Any other reference type
    Object,
}

/// A type as it appears on a member: identity plus shape.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TypeRef {
    pub id: TypeId,
    pub kind: TypeKind,
}

impl TypeRef {
    pub fn value(id: TypeId) -> Self {
        Self { id, kind: TypeKind::Value }
    }

    pub fn string() -> Self {
        Self {
            id: TypeId::system("String"),
            kind: TypeKind::String,
        }
    }

    pub fn object(id: TypeId) -> Self {
        Self { id, kind: TypeKind::Object }
    }

    pub fn sequence(id: TypeId) -> Self {
        Self { id, kind: TypeKind::Sequence }
    }

    /// Array of `element`; the array type shares the element's namespace and assembly
    pub fn array(element: TypeRef) -> Self {
        let id = TypeId::new(
            element.id.namespace(),
            format!("{}[]", element.id.name()),
            element.id.assembly().clone(),
        );
        Self {
            id,
            kind: TypeKind::Array(Box::new(element)),
        }
    }

    pub fn generic(id: TypeId, arguments: Vec<TypeRef>) -> Self {
        Self {
            id,
            kind: TypeKind::Generic {
                arguments,
                sequence: false,
            },
        }
    }

    /// Generic collection such as `Vec<T>` or `HashMap<K, V>`
    pub fn generic_sequence(id: TypeId, arguments: Vec<TypeRef>) -> Self {
        Self {
            id,
            kind: TypeKind::Generic {
                arguments,
                sequence: true,
            },
        }
    }

    /// Value type or string
    pub fn is_value_like(&self) -> bool {
        matches!(self.kind, TypeKind::Value | TypeKind::String)
    }

    /// Array-like or otherwise a collection
    pub fn is_sequence(&self) -> bool {
        match &self.kind {
            TypeKind::Array(_) | TypeKind::Sequence => true,
            TypeKind::Generic { sequence, .. } => *sequence,
            _ => false,
        }
    }

    /// Element type of an array, else first argument of a generic, else the
    /// type itself. Unwraps one level only.
    pub fn unwrap_single(&self) -> &TypeRef {
        match &self.kind {
            TypeKind::Array(element) => element,
            TypeKind::Generic { arguments, .. } => arguments.first().unwrap_or(self),
            _ => self,
        }
    }
}

impl fmt::Display for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            TypeKind::Generic { arguments, .. } if !arguments.is_empty() => {
                let args = arguments
                    .iter()
                    .map(|a| a.to_string())
                    .collect::<Vec<_>>()
                    .join(", ");
                write!(f, "{}<{}>", self.id, args)
            }
            _ => write!(f, "{}", self.id),
        }
    }
}

/// Types that can state their own identity and shape.
///
/// `Option<T>`, `Box<T>` and `Arc<T>` describe as `T`: nullability and
/// indirection do not change what is serialized.
pub trait Describe {
    fn type_ref() -> TypeRef;
}

macro_rules! describe_value {
    ($($ty:ty => $name:expr),* $(,)?) => {
        $(
            impl Describe for $ty {
                fn type_ref() -> TypeRef {
                    TypeRef::value(TypeId::system($name))
                }
            }
        )*
    };
}

describe_value! {
    bool => "bool",
    char => "char",
    i8 => "i8",
    i16 => "i16",
    i32 => "i32",
    i64 => "i64",
    i128 => "i128",
    isize => "isize",
    u8 => "u8",
    u16 => "u16",
    u32 => "u32",
    u64 => "u64",
    u128 => "u128",
    usize => "usize",
    f32 => "f32",
    f64 => "f64",
}

impl Describe for String {
    fn type_ref() -> TypeRef {
        TypeRef::string()
    }
}

impl Describe for str {
    fn type_ref() -> TypeRef {
        TypeRef::string()
    }
}

impl<T: Describe + ?Sized> Describe for &T {
    fn type_ref() -> TypeRef {
        T::type_ref()
    }
}

impl<T: Describe> Describe for Option<T> {
    fn type_ref() -> TypeRef {
        T::type_ref()
    }
}

impl<T: Describe + ?Sized> Describe for Box<T> {
    fn type_ref() -> TypeRef {
        T::type_ref()
    }
}

impl<T: Describe + ?Sized> Describe for std::sync::Arc<T> {
    fn type_ref() -> TypeRef {
        T::type_ref()
    }
}

impl<T: Describe> Describe for [T] {
    fn type_ref() -> TypeRef {
        TypeRef::array(T::type_ref())
    }
}

impl<T: Describe, const N: usize> Describe for [T; N] {
    fn type_ref() -> TypeRef {
        TypeRef::array(T::type_ref())
    }
}

impl<T: Describe> Describe for Vec<T> {
    fn type_ref() -> TypeRef {
        TypeRef::generic_sequence(TypeId::system("Vec"), vec![T::type_ref()])
    }
}

impl<T: Describe> Describe for std::collections::HashSet<T> {
    fn type_ref() -> TypeRef {
        TypeRef::generic_sequence(TypeId::system("HashSet"), vec![T::type_ref()])
    }
}

impl<T: Describe> Describe for std::collections::BTreeSet<T> {
    fn type_ref() -> TypeRef {
        TypeRef::generic_sequence(TypeId::system("BTreeSet"), vec![T::type_ref()])
    }
}

impl<K: Describe, V: Describe> Describe for std::collections::HashMap<K, V> {
    fn type_ref() -> TypeRef {
        TypeRef::generic_sequence(
            TypeId::system("HashMap"),
            vec![K::type_ref(), V::type_ref()],
        )
    }
}

impl<K: Describe, V: Describe> Describe for std::collections::BTreeMap<K, V> {
    fn type_ref() -> TypeRef {
        TypeRef::generic_sequence(
            TypeId::system("BTreeMap"),
            vec![K::type_ref(), V::type_ref()],
        )
    }
}

impl Describe for chrono::DateTime<chrono::Utc> {
    fn type_ref() -> TypeRef {
        TypeRef::value(TypeId::new("chrono", "DateTime", AssemblyId::new("chrono")))
    }
}

impl Describe for chrono::NaiveDate {
    fn type_ref() -> TypeRef {
        TypeRef::value(TypeId::new("chrono", "NaiveDate", AssemblyId::new("chrono")))
    }
}

impl Describe for uuid::Uuid {
    fn type_ref() -> TypeRef {
        TypeRef::value(TypeId::new("uuid", "Uuid", AssemblyId::new("uuid")))
    }
}

impl Describe for serde_json::Value {
    fn type_ref() -> TypeRef {
        TypeRef::object(TypeId::new("serde_json", "Value", AssemblyId::new("serde_json")))
    }
}

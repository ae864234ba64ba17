//! Core metadata types used throughout plankey
//!
//! Expression trees refer to the conceptual model through a handful of
//! metadata items: type usages, functions, entity sets, relationship ends and
//! properties. Each carries an *identity*, a fully qualified string that is
//! unique and stable for the lifetime of the process and can therefore be
//! embedded verbatim in a cache key.

use crate::traits::Identified;
use serde::{Deserialize, Serialize};

// ============================================================================
// Primitive Kinds
// ============================================================================

/// Primitive scalar kinds of the conceptual type system
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PrimitiveTypeKind {
    Binary,
    Boolean,
    Byte,
    DateTime,
    Decimal,
    Double,
    Guid,
    Single,
    SByte,
    Int16,
    Int32,
    Int64,
    String,
    Time,
    DateTimeOffset,
    Geometry,
    Geography,
    GeometryPoint,
    GeometryLineString,
    GeometryPolygon,
    GeometryMultiPoint,
    GeometryMultiLineString,
    GeometryMultiPolygon,
    GeometryCollection,
    GeographyPoint,
    GeographyLineString,
    GeographyPolygon,
    GeographyMultiPoint,
    GeographyMultiLineString,
    GeographyMultiPolygon,
    GeographyCollection,
    /// Hierarchy paths; known to the type system but not to the key generator
    HierarchyId,
}

impl PrimitiveTypeKind {
    /// Enumerant name, also used as the `Edm.` type name
    pub fn name(&self) -> &'static str {
        match self {
            PrimitiveTypeKind::Binary => "Binary",
            PrimitiveTypeKind::Boolean => "Boolean",
            PrimitiveTypeKind::Byte => "Byte",
            PrimitiveTypeKind::DateTime => "DateTime",
            PrimitiveTypeKind::Decimal => "Decimal",
            PrimitiveTypeKind::Double => "Double",
            PrimitiveTypeKind::Guid => "Guid",
            PrimitiveTypeKind::Single => "Single",
            PrimitiveTypeKind::SByte => "SByte",
            PrimitiveTypeKind::Int16 => "Int16",
            PrimitiveTypeKind::Int32 => "Int32",
            PrimitiveTypeKind::Int64 => "Int64",
            PrimitiveTypeKind::String => "String",
            PrimitiveTypeKind::Time => "Time",
            PrimitiveTypeKind::DateTimeOffset => "DateTimeOffset",
            PrimitiveTypeKind::Geometry => "Geometry",
            PrimitiveTypeKind::Geography => "Geography",
            PrimitiveTypeKind::GeometryPoint => "GeometryPoint",
            PrimitiveTypeKind::GeometryLineString => "GeometryLineString",
            PrimitiveTypeKind::GeometryPolygon => "GeometryPolygon",
            PrimitiveTypeKind::GeometryMultiPoint => "GeometryMultiPoint",
            PrimitiveTypeKind::GeometryMultiLineString => "GeometryMultiLineString",
            PrimitiveTypeKind::GeometryMultiPolygon => "GeometryMultiPolygon",
            PrimitiveTypeKind::GeometryCollection => "GeometryCollection",
            PrimitiveTypeKind::GeographyPoint => "GeographyPoint",
            PrimitiveTypeKind::GeographyLineString => "GeographyLineString",
            PrimitiveTypeKind::GeographyPolygon => "GeographyPolygon",
            PrimitiveTypeKind::GeographyMultiPoint => "GeographyMultiPoint",
            PrimitiveTypeKind::GeographyMultiLineString => "GeographyMultiLineString",
            PrimitiveTypeKind::GeographyMultiPolygon => "GeographyMultiPolygon",
            PrimitiveTypeKind::GeographyCollection => "GeographyCollection",
            PrimitiveTypeKind::HierarchyId => "HierarchyId",
        }
    }

    /// Check if this is one of the planar spatial kinds
    pub fn is_geometry(&self) -> bool {
        matches!(
            self,
            PrimitiveTypeKind::Geometry
                | PrimitiveTypeKind::GeometryPoint
                | PrimitiveTypeKind::GeometryLineString
                | PrimitiveTypeKind::GeometryPolygon
                | PrimitiveTypeKind::GeometryMultiPoint
                | PrimitiveTypeKind::GeometryMultiLineString
                | PrimitiveTypeKind::GeometryMultiPolygon
                | PrimitiveTypeKind::GeometryCollection
        )
    }

    /// Check if this is one of the geodetic spatial kinds
    pub fn is_geography(&self) -> bool {
        matches!(
            self,
            PrimitiveTypeKind::Geography
                | PrimitiveTypeKind::GeographyPoint
                | PrimitiveTypeKind::GeographyLineString
                | PrimitiveTypeKind::GeographyPolygon
                | PrimitiveTypeKind::GeographyMultiPoint
                | PrimitiveTypeKind::GeographyMultiLineString
                | PrimitiveTypeKind::GeographyMultiPolygon
                | PrimitiveTypeKind::GeographyCollection
        )
    }
}

impl std::fmt::Display for PrimitiveTypeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

// ============================================================================
// EDM Types
// ============================================================================

/// Namespace of the built-in primitive types
pub const EDM_NAMESPACE: &str = "Edm";

/// The shape of an [`EdmType`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum EdmTypeKind {
    /// Built-in scalar
    Primitive(PrimitiveTypeKind),
    /// Enumeration backed by an integral primitive
    Enum { underlying: PrimitiveTypeKind },
    Entity,
    Complex,
    Row,
    /// Collection of the element type usage
    Collection { element: Box<TypeUsage> },
    /// Reference to an entity type
    Ref { element: Box<EdmType> },
}

/// A conceptual model type
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EdmType {
    /// Fully qualified, globally unique identity (e.g. `Shop.Order`)
    pub identity: String,

    /// Structural category of the type
    pub kind: EdmTypeKind,
}

impl EdmType {
    /// Create a type with an explicit identity
    pub fn new(identity: impl Into<String>, kind: EdmTypeKind) -> Self {
        Self {
            identity: identity.into(),
            kind,
        }
    }

    /// Built-in primitive type (`Edm.Int32`, `Edm.String`, ...)
    pub fn primitive(kind: PrimitiveTypeKind) -> Self {
        Self::new(
            format!("{}.{}", EDM_NAMESPACE, kind.name()),
            EdmTypeKind::Primitive(kind),
        )
    }

    /// Enumeration type
    pub fn enumeration(full_name: impl Into<String>, underlying: PrimitiveTypeKind) -> Self {
        Self::new(full_name, EdmTypeKind::Enum { underlying })
    }

    /// Entity type
    pub fn entity(full_name: impl Into<String>) -> Self {
        Self::new(full_name, EdmTypeKind::Entity)
    }

    /// Complex type
    pub fn complex(full_name: impl Into<String>) -> Self {
        Self::new(full_name, EdmTypeKind::Complex)
    }

    /// Anonymous row type; the identity lists each column and its type usage
    pub fn row(columns: &[(&str, &TypeUsage)]) -> Self {
        let columns = columns
            .iter()
            .map(|(name, ty)| format!("{}={}", name, ty.identity))
            .collect::<Vec<_>>()
            .join(",");
        Self::new(format!("row[{}]", columns), EdmTypeKind::Row)
    }

    /// Collection type over an element type usage
    pub fn collection(element: TypeUsage) -> Self {
        Self::new(
            format!("collection[{}]", element.identity),
            EdmTypeKind::Collection {
                element: Box::new(element),
            },
        )
    }

    /// Reference type over an entity type
    pub fn reference(element: EdmType) -> Self {
        Self::new(
            format!("reference[{}]", element.identity),
            EdmTypeKind::Ref {
                element: Box::new(element),
            },
        )
    }

    /// Primitive kind of a scalar type; enums report their underlying kind
    pub fn scalar_kind(&self) -> Option<PrimitiveTypeKind> {
        match &self.kind {
            EdmTypeKind::Primitive(kind) => Some(*kind),
            EdmTypeKind::Enum { underlying } => Some(*underlying),
            _ => None,
        }
    }

    /// Element type of a reference type
    pub fn ref_element(&self) -> Option<&EdmType> {
        match &self.kind {
            EdmTypeKind::Ref { element } => Some(element),
            _ => None,
        }
    }
}

impl Identified for EdmType {
    fn identity(&self) -> &str {
        &self.identity
    }
}

// ============================================================================
// Type Usages
// ============================================================================

/// A facet applied to a type usage (e.g. `MaxLength=50`)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Facet {
    pub name: String,
    pub value: String,
}

impl Facet {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// A type plus the facets under which it is used
///
/// This is what every expression node carries as its result type. Two usages
/// of the same type with different facets have different identities.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeUsage {
    /// Identity of the type usage, including facets
    pub identity: String,

    /// The underlying type
    pub edm_type: EdmType,
}

impl TypeUsage {
    /// Create a usage without facets
    pub fn new(edm_type: EdmType) -> Self {
        Self {
            identity: edm_type.identity.clone(),
            edm_type,
        }
    }

    /// Create a usage with facets; facets are rendered in the given order
    pub fn with_facets(edm_type: EdmType, facets: &[Facet]) -> Self {
        if facets.is_empty() {
            return Self::new(edm_type);
        }
        let rendered = facets
            .iter()
            .map(|f| format!("{}={}", f.name, f.value))
            .collect::<Vec<_>>()
            .join(",");
        Self {
            identity: format!("{}({})", edm_type.identity, rendered),
            edm_type,
        }
    }

    /// Usage of a primitive type
    pub fn primitive(kind: PrimitiveTypeKind) -> Self {
        Self::new(EdmType::primitive(kind))
    }

    /// Usage of the boolean type, the result type of predicates
    pub fn boolean() -> Self {
        Self::primitive(PrimitiveTypeKind::Boolean)
    }

    /// Usage of an entity type
    pub fn entity(full_name: impl Into<String>) -> Self {
        Self::new(EdmType::entity(full_name))
    }

    /// Usage of a collection of `element`
    pub fn collection_of(element: TypeUsage) -> Self {
        Self::new(EdmType::collection(element))
    }

    /// Usage of a reference to `element`
    pub fn reference_to(element: EdmType) -> Self {
        Self::new(EdmType::reference(element))
    }

    /// Element usage of a collection usage
    pub fn collection_element(&self) -> Option<&TypeUsage> {
        match &self.edm_type.kind {
            EdmTypeKind::Collection { element } => Some(element),
            _ => None,
        }
    }
}

impl Identified for TypeUsage {
    fn identity(&self) -> &str {
        &self.identity
    }
}

// ============================================================================
// Metadata Items
// ============================================================================

/// A function from the conceptual model or a provider manifest
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EdmFunction {
    /// Function name without namespace
    pub name: String,

    /// Identity: namespace, name and parameter types (overloads differ)
    pub identity: String,
}

impl EdmFunction {
    /// Create a function; the identity is `namespace.name(param, ...)`
    pub fn new(namespace: &str, name: impl Into<String>, parameters: &[&TypeUsage]) -> Self {
        let name = name.into();
        let parameters = parameters
            .iter()
            .map(|p| p.identity.as_str())
            .collect::<Vec<_>>()
            .join(",");
        Self {
            identity: format!("{}.{}({})", namespace, name, parameters),
            name,
        }
    }
}

impl Identified for EdmFunction {
    fn identity(&self) -> &str {
        &self.identity
    }
}

/// An entity set inside an entity container
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntitySet {
    /// Name of the owning entity container
    pub container: String,

    /// Name of the set
    pub name: String,

    /// Entity type of the set's elements
    pub element_type: EdmType,
}

impl EntitySet {
    pub fn new(container: impl Into<String>, name: impl Into<String>, element_type: EdmType) -> Self {
        Self {
            container: container.into(),
            name: name.into(),
            element_type,
        }
    }

    /// `Container.Set`
    pub fn qualified_name(&self) -> String {
        format!("{}.{}", self.container, self.name)
    }
}

/// One end of an association (relationship) type
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelationshipEnd {
    /// End name, unique within its association
    pub name: String,

    /// Identity of the association type that declares this end
    pub declaring_type: String,
}

impl RelationshipEnd {
    pub fn new(declaring_type: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            declaring_type: declaring_type.into(),
        }
    }
}

/// A property or navigation property of a structural type
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EdmMember {
    pub name: String,
}

impl EdmMember {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

// ============================================================================
// Tests
// ============================================================================

//! Immutable graph model of code units, their members, and the accesses between them.
//!
//! A [`Graph`] is produced once per analysis run by [`GraphBuilder`] and is
//! read-only afterwards. Elements refer to each other by id, never by owning
//! pointer: a [`Member`] names its owner, a nested [`CodeUnit`] names its
//! enclosing unit, and an [`Access`] names its origin member and target.

use std::collections::{BTreeSet, HashMap};
use std::fmt;

use serde::{Deserialize, Serialize};

mod builder;
mod properties;

pub use builder::{AccessDecl, GraphBuilder, MemberDecl, MemberPath, SnapshotDto, TargetDecl, UnitDecl};
pub use properties::{CanBeAnnotated, HasName, HasOwner, Upcast};

/// Identifies a [`CodeUnit`] within one graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct UnitId(usize);

impl UnitId {
    /// Index of the unit in [`Graph::units`].
    #[must_use]
    pub fn index(self) -> usize {
        self.0
    }
}

/// Identifies a [`Member`] within one graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MemberId(usize);

impl MemberId {
    /// Index of the member in [`Graph::members`].
    #[must_use]
    pub fn index(self) -> usize {
        self.0
    }
}

/// A class or module.
#[derive(Debug, Clone)]
pub struct CodeUnit {
    id: UnitId,
    name: String,
    package: String,
    annotations: BTreeSet<String>,
    enclosing: Option<UnitId>,
    members: Vec<MemberId>,
    complete: bool,
}

impl CodeUnit {
    /// Returns this unit's id.
    #[must_use]
    pub fn id(&self) -> UnitId {
        self.id
    }

    /// Fully qualified name, e.g. `com.example.Outer$Inner`.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Owning package path, e.g. `com.example`. Empty for the default package.
    #[must_use]
    pub fn package(&self) -> &str {
        &self.package
    }

    /// Name without package or enclosing prefix.
    #[must_use]
    pub fn simple_name(&self) -> &str {
        let local = self.name.rsplit('.').next().unwrap_or(&self.name);
        local.rsplit('$').next().unwrap_or(local)
    }

    /// Annotations declared directly on this unit.
    pub fn annotations(&self) -> impl Iterator<Item = &str> {
        self.annotations.iter().map(String::as_str)
    }

    /// Whether this unit itself carries the annotation (enclosing units not consulted).
    #[must_use]
    pub fn has_annotation(&self, annotation: &str) -> bool {
        self.annotations.contains(annotation)
    }

    /// The enclosing unit, for nested declarations.
    #[must_use]
    pub fn enclosing(&self) -> Option<UnitId> {
        self.enclosing
    }

    /// Members owned by this unit, in declaration order.
    #[must_use]
    pub fn members(&self) -> &[MemberId] {
        &self.members
    }

    /// `false` for stub units created for references the importer could not resolve.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.complete
    }
}

impl fmt::Display for CodeUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

/// A method, constructor, or field owned by exactly one [`CodeUnit`].
#[derive(Debug, Clone)]
pub struct Member {
    id: MemberId,
    owner: UnitId,
    name: String,
    signature: String,
    annotations: BTreeSet<String>,
}

impl Member {
    /// Returns this member's id.
    #[must_use]
    pub fn id(&self) -> MemberId {
        self.id
    }

    /// The owning unit.
    #[must_use]
    pub fn owner_id(&self) -> UnitId {
        self.owner
    }

    /// Declared name, e.g. `forName`.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Signature as reported by the importer, e.g. `(java.lang.String)`. May be empty.
    #[must_use]
    pub fn signature(&self) -> &str {
        &self.signature
    }

    /// Annotations declared on this member.
    pub fn annotations(&self) -> impl Iterator<Item = &str> {
        self.annotations.iter().map(String::as_str)
    }

    /// Whether this member carries the annotation.
    #[must_use]
    pub fn has_annotation(&self, annotation: &str) -> bool {
        self.annotations.contains(annotation)
    }
}

/// What kind of dependency an [`Access`] expresses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AccessKind {
    /// Method or constructor call.
    Call,
    /// Field read or write.
    FieldAccess,
    /// Extension of a class or implementation of an interface.
    Inheritance,
    /// Reference to a type through an annotation.
    AnnotationReference,
}

impl fmt::Display for AccessKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Call => write!(f, "calls"),
            Self::FieldAccess => write!(f, "accesses field"),
            Self::Inheritance => write!(f, "extends"),
            Self::AnnotationReference => write!(f, "is annotated with"),
        }
    }
}

/// The thing an [`Access`] points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AccessTarget {
    /// A member (method call, field access).
    Member(MemberId),
    /// A whole unit (inheritance, annotation reference).
    Unit(UnitId),
}

/// A directed dependency from an origin member to a target member or unit.
#[derive(Debug, Clone)]
pub struct Access {
    index: usize,
    kind: AccessKind,
    origin: MemberId,
    target: AccessTarget,
    complete: bool,
}

impl Access {
    /// Position of this access in the snapshot, starting at 0.
    #[must_use]
    pub fn index(&self) -> usize {
        self.index
    }

    /// Kind of dependency.
    #[must_use]
    pub fn kind(&self) -> AccessKind {
        self.kind
    }

    /// The member performing the access.
    #[must_use]
    pub fn origin_id(&self) -> MemberId {
        self.origin
    }

    /// The accessed member or unit.
    #[must_use]
    pub fn target(&self) -> &AccessTarget {
        &self.target
    }

    /// `false` when the importer could not resolve the target.
    ///
    /// Incomplete accesses stay in the graph but are excluded from layer checks.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.complete
    }
}

/// An immutable snapshot of one codebase.
#[derive(Debug, Default)]
pub struct Graph {
    units: Vec<CodeUnit>,
    members: Vec<Member>,
    accesses: Vec<Access>,
    by_name: HashMap<String, UnitId>,
}

impl Graph {
    /// Creates a builder for a new snapshot.
    #[must_use]
    pub fn builder() -> GraphBuilder {
        GraphBuilder::new()
    }

    /// All units in declaration order, stubs last.
    #[must_use]
    pub fn units(&self) -> &[CodeUnit] {
        &self.units
    }

    /// All members in declaration order.
    #[must_use]
    pub fn members(&self) -> &[Member] {
        &self.members
    }

    /// All accesses in snapshot order.
    #[must_use]
    pub fn accesses(&self) -> &[Access] {
        &self.accesses
    }

    /// Resolves a unit id. Ids are only handed out by this graph's builder.
    #[must_use]
    pub fn unit(&self, id: UnitId) -> &CodeUnit {
        &self.units[id.0]
    }

    /// Resolves a member id.
    #[must_use]
    pub fn member(&self, id: MemberId) -> &Member {
        &self.members[id.0]
    }

    /// Looks a unit up by fully qualified name.
    #[must_use]
    pub fn unit_named(&self, name: &str) -> Option<&CodeUnit> {
        self.by_name.get(name).map(|id| self.unit(*id))
    }

    /// The unit directly enclosing `unit`, if it is nested.
    #[must_use]
    pub fn enclosing(&self, unit: &CodeUnit) -> Option<&CodeUnit> {
        unit.enclosing.map(|id| self.unit(id))
    }

    /// The member performing an access.
    #[must_use]
    pub fn origin(&self, access: &Access) -> &Member {
        self.member(access.origin)
    }

    /// The unit owning the member that performs an access.
    #[must_use]
    pub fn origin_unit(&self, access: &Access) -> &CodeUnit {
        self.unit(self.origin(access).owner)
    }

    /// The unit an access points into: the owner of a target member, or the target unit itself.
    #[must_use]
    pub fn target_unit(&self, access: &Access) -> &CodeUnit {
        match access.target {
            AccessTarget::Member(id) => self.unit(self.member(id).owner),
            AccessTarget::Unit(id) => self.unit(id),
        }
    }

    /// Renders a member as `Owner.name(signature)`.
    #[must_use]
    pub fn describe_member(&self, member: &Member) -> String {
        format!(
            "{}.{}{}",
            self.unit(member.owner).name,
            member.name,
            member.signature
        )
    }

    /// Renders an access target as a qualified name.
    #[must_use]
    pub fn describe_target(&self, target: &AccessTarget) -> String {
        match target {
            AccessTarget::Member(id) => self.describe_member(self.member(*id)),
            AccessTarget::Unit(id) => self.unit(*id).name.clone(),
        }
    }
}

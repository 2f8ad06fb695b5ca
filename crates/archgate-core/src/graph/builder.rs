//! Snapshot declarations and the builder that links them into a [`Graph`].
//!
//! The declaration types double as the JSON data contract an external
//! importer emits ([`SnapshotDto`]). Cross references are by name and are
//! resolved once in [`GraphBuilder::build`].

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::{Access, AccessKind, AccessTarget, CodeUnit, Graph, Member, MemberId, UnitId};
use crate::error::GraphError;

/// A complete snapshot as emitted by an importer.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SnapshotDto {
    /// Imported code units with their members.
    #[serde(default)]
    pub units: Vec<UnitDecl>,
    /// Accesses in the order the importer discovered them.
    #[serde(default)]
    pub accesses: Vec<AccessDecl>,
}

/// Declaration of one code unit.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UnitDecl {
    /// Fully qualified name; nested units use `$`, e.g. `a.b.Outer$Inner`.
    pub name: String,
    /// Package path. Derived from `name` when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub package: Option<String>,
    /// Annotation type names present on the unit.
    #[serde(default)]
    pub annotations: Vec<String>,
    /// Fully qualified name of the enclosing unit.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enclosing: Option<String>,
    /// Owned members.
    #[serde(default)]
    pub members: Vec<MemberDecl>,
}

impl UnitDecl {
    /// Declares a unit by fully qualified name.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Overrides the package derived from the name.
    #[must_use]
    pub fn in_package(mut self, package: impl Into<String>) -> Self {
        self.package = Some(package.into());
        self
    }

    /// Adds an annotation.
    #[must_use]
    pub fn annotated(mut self, annotation: impl Into<String>) -> Self {
        self.annotations.push(annotation.into());
        self
    }

    /// Marks this unit as nested inside `enclosing`.
    #[must_use]
    pub fn enclosed_in(mut self, enclosing: impl Into<String>) -> Self {
        self.enclosing = Some(enclosing.into());
        self
    }

    /// Adds a member.
    #[must_use]
    pub fn member(mut self, member: MemberDecl) -> Self {
        self.members.push(member);
        self
    }
}

/// Declaration of one member.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MemberDecl {
    /// Declared name.
    pub name: String,
    /// Signature, e.g. `(java.lang.String)`.
    #[serde(default)]
    pub signature: String,
    /// Annotation type names present on the member.
    #[serde(default)]
    pub annotations: Vec<String>,
}

impl MemberDecl {
    /// Declares a member with an empty signature.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Sets the signature.
    #[must_use]
    pub fn signature(mut self, signature: impl Into<String>) -> Self {
        self.signature = signature.into();
        self
    }

    /// Adds an annotation.
    #[must_use]
    pub fn annotated(mut self, annotation: impl Into<String>) -> Self {
        self.annotations.push(annotation.into());
        self
    }
}

/// Reference to a declared member by owner and name.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemberPath {
    /// Fully qualified owner name.
    pub owner: String,
    /// Member name.
    pub name: String,
    /// Signature to disambiguate overloads. First name match wins when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub signature: Option<String>,
}

impl MemberPath {
    /// Refers to `owner.name`.
    #[must_use]
    pub fn new(owner: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            name: name.into(),
            signature: None,
        }
    }

    /// Pins the signature.
    #[must_use]
    pub fn with_signature(mut self, signature: impl Into<String>) -> Self {
        self.signature = Some(signature.into());
        self
    }
}

/// Reference to an access target: a member, or a whole unit when `member` is absent.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TargetDecl {
    /// Fully qualified owner name.
    pub owner: String,
    /// Member name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub member: Option<String>,
    /// Member signature.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub signature: Option<String>,
}

impl TargetDecl {
    /// Targets `owner.name`.
    #[must_use]
    pub fn member(owner: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            member: Some(name.into()),
            signature: None,
        }
    }

    /// Targets the unit `owner` itself.
    #[must_use]
    pub fn unit(owner: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            member: None,
            signature: None,
        }
    }
}

/// Declaration of one access.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessDecl {
    /// Kind of dependency.
    pub kind: AccessKind,
    /// The member performing the access.
    pub origin: MemberPath,
    /// The accessed member or unit.
    pub target: TargetDecl,
}

impl AccessDecl {
    /// Declares an access of any kind.
    #[must_use]
    pub fn new(kind: AccessKind, origin: MemberPath, target: TargetDecl) -> Self {
        Self {
            kind,
            origin,
            target,
        }
    }

    /// Declares a method call.
    #[must_use]
    pub fn call(origin: MemberPath, target: TargetDecl) -> Self {
        Self::new(AccessKind::Call, origin, target)
    }

    /// Declares a field access.
    #[must_use]
    pub fn field_access(origin: MemberPath, target: TargetDecl) -> Self {
        Self::new(AccessKind::FieldAccess, origin, target)
    }
}

/// Collects declarations and links them into an immutable [`Graph`].
#[derive(Debug, Default)]
pub struct GraphBuilder {
    units: Vec<UnitDecl>,
    accesses: Vec<AccessDecl>,
}

impl GraphBuilder {
    /// Creates an empty builder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts from an importer snapshot.
    #[must_use]
    pub fn from_snapshot(snapshot: SnapshotDto) -> Self {
        Self {
            units: snapshot.units,
            accesses: snapshot.accesses,
        }
    }

    /// Adds a unit declaration.
    #[must_use]
    pub fn unit(mut self, unit: UnitDecl) -> Self {
        self.units.push(unit);
        self
    }

    /// Adds an access declaration. Accesses keep the order they are added in.
    #[must_use]
    pub fn access(mut self, access: AccessDecl) -> Self {
        self.accesses.push(access);
        self
    }

    /// Adds several access declarations.
    #[must_use]
    pub fn accesses<I>(mut self, accesses: I) -> Self
    where
        I: IntoIterator<Item = AccessDecl>,
    {
        self.accesses.extend(accesses);
        self
    }

    /// Links all declarations.
    ///
    /// Targets naming an undeclared unit become stub units and their accesses
    /// are marked incomplete. They are never dropped.
    ///
    /// # Errors
    ///
    /// Returns an error for unnamed or duplicate declarations and for
    /// accesses whose origin member is not declared.
    pub fn build(self) -> Result<Graph, GraphError> {
        let mut graph = Graph::default();

        for decl in &self.units {
            if decl.name.trim().is_empty() {
                return Err(GraphError::EmptyName { what: "code unit" });
            }
            if graph.by_name.contains_key(&decl.name) {
                return Err(GraphError::DuplicateUnit {
                    name: decl.name.clone(),
                });
            }
            let package = decl
                .package
                .clone()
                .unwrap_or_else(|| package_of(&decl.name).to_string());
            push_unit(
                &mut graph,
                &decl.name,
                package,
                decl.annotations.iter().cloned().collect(),
                true,
            );
        }

        for decl in self.units {
            let unit = graph.by_name[&decl.name];
            for member in decl.members {
                if member.name.trim().is_empty() {
                    return Err(GraphError::EmptyName { what: "member" });
                }
                if find_member(&graph, unit, &member.name, Some(&member.signature)).is_some() {
                    return Err(GraphError::DuplicateMember {
                        owner: decl.name.clone(),
                        member: format!("{}{}", member.name, member.signature),
                    });
                }
                push_member(
                    &mut graph,
                    unit,
                    member.name,
                    member.signature,
                    member.annotations.into_iter().collect(),
                );
            }
            if let Some(enclosing) = decl.enclosing {
                let existing = graph.by_name.get(&enclosing).copied();
                let enclosing_id = match existing {
                    Some(id) => id,
                    None => {
                        warn!(
                            "enclosing unit {} of {} is not part of the snapshot",
                            enclosing, decl.name
                        );
                        push_stub(&mut graph, &enclosing)
                    }
                };
                graph.units[unit.0].enclosing = Some(enclosing_id);
            }
        }

        for (index, decl) in self.accesses.into_iter().enumerate() {
            let origin = graph
                .by_name
                .get(&decl.origin.owner)
                .filter(|id| graph.unit(**id).complete)
                .and_then(|id| {
                    find_member(&graph, *id, &decl.origin.name, decl.origin.signature.as_deref())
                })
                .ok_or_else(|| GraphError::UnknownOrigin {
                    owner: decl.origin.owner.clone(),
                    member: decl.origin.name.clone(),
                })?;

            let (target, complete) = resolve_target(&mut graph, &decl.target);
            if !complete {
                warn!(
                    "access #{} from {} targets {}, which the importer did not resolve; \
                     excluded from layer checks",
                    index,
                    graph.describe_member(graph.member(origin)),
                    decl.target.owner
                );
            }
            graph.accesses.push(Access {
                index,
                kind: decl.kind,
                origin,
                target,
                complete,
            });
        }

        debug!(
            "built graph: {} units, {} members, {} accesses",
            graph.units.len(),
            graph.members.len(),
            graph.accesses.len()
        );
        Ok(graph)
    }
}

/// Package part of a fully qualified name: everything before the last `.`.
fn package_of(name: &str) -> &str {
    name.rfind('.').map_or("", |i| &name[..i])
}

fn push_unit(
    graph: &mut Graph,
    name: &str,
    package: String,
    annotations: BTreeSet<String>,
    complete: bool,
) -> UnitId {
    let id = UnitId(graph.units.len());
    graph.units.push(CodeUnit {
        id,
        name: name.to_string(),
        package,
        annotations,
        enclosing: None,
        members: Vec::new(),
        complete,
    });
    graph.by_name.insert(name.to_string(), id);
    id
}

fn push_stub(graph: &mut Graph, name: &str) -> UnitId {
    push_unit(
        graph,
        name,
        package_of(name).to_string(),
        BTreeSet::new(),
        false,
    )
}

fn push_member(
    graph: &mut Graph,
    owner: UnitId,
    name: String,
    signature: String,
    annotations: BTreeSet<String>,
) -> MemberId {
    let id = MemberId(graph.members.len());
    graph.members.push(Member {
        id,
        owner,
        name,
        signature,
        annotations,
    });
    graph.units[owner.0].members.push(id);
    id
}

fn find_member(
    graph: &Graph,
    unit: UnitId,
    name: &str,
    signature: Option<&str>,
) -> Option<MemberId> {
    graph.unit(unit).members.iter().copied().find(|id| {
        let member = graph.member(*id);
        member.name == name && signature.map_or(true, |s| member.signature == s)
    })
}

/// Resolves a target declaration, creating stubs for anything undeclared.
///
/// Completeness follows the target unit: a missing member on a declared unit
/// (e.g. an inherited method) gets a stub member but keeps the access complete.
fn resolve_target(graph: &mut Graph, decl: &TargetDecl) -> (AccessTarget, bool) {
    let existing = graph.by_name.get(&decl.owner).copied();
    let unit = match existing {
        Some(id) => id,
        None => push_stub(graph, &decl.owner),
    };
    let complete = graph.unit(unit).complete;

    let Some(name) = &decl.member else {
        return (AccessTarget::Unit(unit), complete);
    };

    let member = match find_member(graph, unit, name, decl.signature.as_deref()) {
        Some(id) => id,
        None => {
            if complete {
                debug!("member {}.{} not declared, adding stub", decl.owner, name);
            }
            push_member(
                graph,
                unit,
                name.clone(),
                decl.signature.clone().unwrap_or_default(),
                BTreeSet::new(),
            )
        }
    };
    (AccessTarget::Member(member), complete)
}

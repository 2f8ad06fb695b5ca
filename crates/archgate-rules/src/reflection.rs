//! Rule restricting dynamic type resolution to explicitly permitted code.
//!
//! A call resolves types dynamically when it targets one of the resolver
//! methods of the resolver type, or any member carrying the marker
//! annotation. Such a call is allowed when its origin member, its origin
//! unit, or the unit enclosing the origin unit carries the allowed
//! annotation. Units in the exempt packages are not checked at all.

use archgate_core::rule::no_units;
use archgate_core::selectors::{
    annotated_with, equivalent_to, get, has, name, origin, resides_outside_of_packages, target,
    with_owner,
};
use archgate_core::{
    Access, AccessRule, AccessTarget, CodeUnit, ConfigError, DescribedPredicate, Member,
};
use serde::Deserialize;

const NAME: &str = "no-illegal-reflection";
const CODE: &str = "AG002";
const DESCRIPTION: &str = "no classes should illegally resolve classes via reflection";

/// What counts as dynamic type resolution, and who may do it.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "kebab-case", deny_unknown_fields)]
pub struct ReflectionPolicy {
    /// Fully qualified type owning the resolver methods.
    pub resolver_type: String,
    /// Names of the resolver methods.
    pub resolver_methods: Vec<String>,
    /// Annotation permitting a unit or member to resolve types.
    pub allowed_annotation: String,
    /// Annotation marking a member that itself resolves types.
    pub marker_annotation: String,
    /// Package identifiers whose units are not checked.
    pub exempt_packages: Vec<String>,
}

impl Default for ReflectionPolicy {
    fn default() -> Self {
        Self {
            resolver_type: "java.lang.Class".to_string(),
            resolver_methods: vec!["forName".to_string()],
            allowed_annotation: "com.tngtech.archunit.base.MayResolveTypesViaReflection".to_string(),
            marker_annotation: "com.tngtech.archunit.base.ResolvesTypesViaReflection".to_string(),
            exempt_packages: vec!["..thirdparty..".to_string()],
        }
    }
}

/// Builds the reflection rule for `policy`.
///
/// ```
/// use archgate_rules::reflection::{no_illegal_reflection, ReflectionPolicy};
/// use archgate_core::Rule;
///
/// let rule = no_illegal_reflection(&ReflectionPolicy::default()).unwrap();
/// assert_eq!(rule.name(), "no-illegal-reflection");
/// assert_eq!(rule.code(), "AG002");
/// ```
///
/// # Errors
///
/// Returns [`ConfigError`] if a type, annotation or method name is empty,
/// or an exempt package identifier is malformed.
pub fn no_illegal_reflection(policy: &ReflectionPolicy) -> Result<AccessRule, ConfigError> {
    let condition = resolves_types(policy)?.and(explicitly_allowed(policy)?.not());

    let rule = if policy.exempt_packages.is_empty() {
        no_units()
    } else {
        no_units().that(resides_outside_of_packages(&policy.exempt_packages)?)
    };

    Ok(rule
        .should_call_where(condition)
        .named(NAME)
        .with_code(CODE)
        .described_as(DESCRIPTION))
}

fn resolves_types(policy: &ReflectionPolicy) -> Result<DescribedPredicate<Access>, ConfigError> {
    let mut methods = policy.resolver_methods.iter();
    let Some(first) = methods.next() else {
        return Err(ConfigError::MissingParameter {
            parameter: "resolver methods",
        });
    };
    let mut method_name = name::<AccessTarget>(first.as_str())?;
    for method in methods {
        method_name = method_name.or(name::<AccessTarget>(method.as_str())?);
    }

    let resolver = with_owner::<AccessTarget>(equivalent_to(policy.resolver_type.as_str())?)
        .and(has(method_name));
    let marked = annotated_with::<AccessTarget>(policy.marker_annotation.as_str())?;
    Ok(target(resolver.or(marked)))
}

fn explicitly_allowed(policy: &ReflectionPolicy) -> Result<DescribedPredicate<Access>, ConfigError> {
    let allowed = policy.allowed_annotation.as_str();
    let member = origin(annotated_with::<Member>(allowed)?);
    let context = annotated_with::<CodeUnit>(allowed)?.on_result_of(get::origin_owner());
    Ok(member.or(context))
}

#[cfg(test)]
mod tests {
    use super::*;
    use archgate_core::{AccessDecl, Graph, MemberDecl, MemberPath, Rule, TargetDecl, UnitDecl};

    const ALLOWED: &str = "com.tngtech.archunit.base.MayResolveTypesViaReflection";
    const MARKER: &str = "com.tngtech.archunit.base.ResolvesTypesViaReflection";

    fn for_name(from: &str) -> AccessDecl {
        AccessDecl::call(
            MemberPath::new(from, "load"),
            TargetDecl::member("java.lang.Class", "forName"),
        )
    }

    fn loader(name: &str) -> UnitDecl {
        UnitDecl::new(name).member(MemberDecl::new("load"))
    }

    fn graph() -> Graph {
        Graph::builder()
            .unit(loader("app.core.Plain"))
            .unit(loader("app.core.Allowed").annotated(ALLOWED))
            .unit(UnitDecl::new("app.core.Outer").annotated(ALLOWED))
            .unit(loader("app.core.Outer$Nested").enclosed_in("app.core.Outer"))
            .unit(
                UnitDecl::new("app.core.Method")
                    .member(MemberDecl::new("load").annotated(ALLOWED)),
            )
            .unit(loader("app.thirdparty.Vendored"))
            .unit(
                loader("app.core.Resolver")
                    .member(MemberDecl::new("resolve").annotated(MARKER)),
            )
            .access(for_name("app.core.Plain"))
            .access(for_name("app.core.Allowed"))
            .access(for_name("app.core.Outer$Nested"))
            .access(for_name("app.core.Method"))
            .access(for_name("app.thirdparty.Vendored"))
            .access(AccessDecl::call(
                MemberPath::new("app.core.Plain", "load"),
                TargetDecl::member("app.core.Resolver", "resolve"),
            ))
            .access(AccessDecl::call(
                MemberPath::new("app.core.Plain", "load"),
                TargetDecl::member("app.core.Resolver", "load"),
            ))
            .build()
            .unwrap()
    }

    fn flagged_origins(rule: &AccessRule, graph: &Graph) -> Vec<String> {
        rule.evaluate(graph)
            .unwrap()
            .into_iter()
            .map(|v| v.message)
            .collect()
    }

    #[test]
    fn flags_unpermitted_resolution_only() {
        let graph = graph();
        let rule = no_illegal_reflection(&ReflectionPolicy::default()).unwrap();

        assert_eq!(
            flagged_origins(&rule, &graph),
            vec![
                "<app.core.Plain.load> calls <java.lang.Class.forName>",
                "<app.core.Plain.load> calls <app.core.Resolver.resolve>",
            ]
        );
        assert_eq!(rule.description(), DESCRIPTION);
    }

    #[test]
    fn exemption_list_can_be_empty() {
        let graph = graph();
        let policy = ReflectionPolicy {
            exempt_packages: Vec::new(),
            ..ReflectionPolicy::default()
        };
        let rule = no_illegal_reflection(&policy).unwrap();
        assert_eq!(flagged_origins(&rule, &graph).len(), 3);
    }

    #[test]
    fn additional_resolver_methods() {
        let graph = Graph::builder()
            .unit(loader("app.Plain"))
            .access(AccessDecl::call(
                MemberPath::new("app.Plain", "load"),
                TargetDecl::member("java.lang.ClassLoader", "loadClass"),
            ))
            .build()
            .unwrap();
        let policy = ReflectionPolicy {
            resolver_type: "java.lang.ClassLoader".to_string(),
            resolver_methods: vec!["forName".to_string(), "loadClass".to_string()],
            ..ReflectionPolicy::default()
        };
        let rule = no_illegal_reflection(&policy).unwrap();
        assert_eq!(flagged_origins(&rule, &graph).len(), 1);
    }

    #[test]
    fn rejects_incomplete_policy() {
        let no_methods = ReflectionPolicy {
            resolver_methods: Vec::new(),
            ..ReflectionPolicy::default()
        };
        assert_eq!(
            no_illegal_reflection(&no_methods).unwrap_err(),
            ConfigError::MissingParameter {
                parameter: "resolver methods"
            }
        );

        let no_annotation = ReflectionPolicy {
            allowed_annotation: String::new(),
            ..ReflectionPolicy::default()
        };
        assert_eq!(
            no_illegal_reflection(&no_annotation).unwrap_err(),
            ConfigError::MissingParameter {
                parameter: "annotation"
            }
        );
    }
}

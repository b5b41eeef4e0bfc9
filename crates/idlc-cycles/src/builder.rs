//! Type dependency graph construction
//!
//! Walks a [`Definition`] once and produces one node per declared type,
//! error and service, with an edge to every declaration its definition
//! mentions.

use crate::error::CycleError;
use crate::graph::Graph;
use crate::model::{Definition, Type, TypeName};
use rustc_hash::{FxHashMap, FxHashSet};
use std::collections::BTreeSet;

/// Type-level dependency graph plus the originating package of each node
#[derive(Debug, Clone)]
pub struct TypeGraph {
    pub graph: Graph<TypeName>,
    pub colors: FxHashMap<TypeName, String>,
}

impl TypeGraph {
    /// Originating package of a declaration
    pub fn color(&self, name: &TypeName) -> Option<&str> {
        self.colors.get(name).map(String::as_str)
    }
}

/// Build the type dependency graph of a definition
///
/// Fails on duplicate declarations and on references to undeclared types.
pub fn build_type_graph(def: &Definition) -> Result<TypeGraph, CycleError> {
    let mut graph = Graph::new();
    let mut colors = FxHashMap::default();

    for name in def.declared_names() {
        if !graph.add_node(name.clone()) {
            return Err(CycleError::DuplicateDeclaration(name.clone()));
        }
        colors.insert(name.clone(), name.package.clone());
    }

    for ty in &def.types {
        add_dependencies(&mut graph, ty.type_name(), ty.types())?;
    }
    for error in &def.errors {
        add_dependencies(&mut graph, &error.error_name, error.types())?;
    }
    for service in &def.services {
        add_dependencies(&mut graph, &service.service_name, service.types())?;
    }

    log::debug!(
        "built type graph: {} declarations, {} edges",
        graph.len(),
        graph.edge_count()
    );

    Ok(TypeGraph { graph, colors })
}

fn add_dependencies<'a>(
    graph: &mut Graph<TypeName>,
    from: &TypeName,
    types: impl IntoIterator<Item = &'a Type>,
) -> Result<(), CycleError> {
    let targets: BTreeSet<&TypeName> = types.into_iter().flat_map(Type::references).collect();
    for to in targets {
        if !graph.contains(to) {
            return Err(CycleError::UndeclaredType {
                from: from.clone(),
                to: to.clone(),
            });
        }
        graph.add_edge(from.clone(), to.clone());
    }
    Ok(())
}

/// Build the package-level dependency graph of a definition
///
/// Package `p` depends on package `q` when some declaration of `p`
/// references a declaration of `q`. Intra-package references are dropped.
pub fn package_graph(def: &Definition) -> Result<Graph<String>, CycleError> {
    let types = build_type_graph(def)?;
    let index = types.graph.node_index();
    let mut packages = Graph::new();
    let mut seen = FxHashSet::default();

    for from in types.graph.nodes() {
        if seen.insert(from.package.as_str()) {
            packages.add_node(from.package.clone());
        }
    }
    for from in types.graph.nodes() {
        for to in types.graph.ordered_edges(from, &index) {
            if to.package != from.package {
                packages.add_edge(from.package.clone(), to.package.clone());
            }
        }
    }

    Ok(packages)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{
        EndpointDefinition, ErrorCode, ErrorDefinition, FieldDefinition, HttpMethod,
        ObjectDefinition, ServiceDefinition, TypeDefinition,
    };

    fn name(package: &str, name: &str) -> TypeName {
        TypeName::new(package, name)
    }

    fn object(type_name: TypeName, fields: Vec<(&str, Type)>) -> TypeDefinition {
        TypeDefinition::Object(ObjectDefinition {
            type_name,
            fields: fields
                .into_iter()
                .map(|(n, t)| FieldDefinition::new(n, t))
                .collect(),
            docs: None,
        })
    }

    #[test]
    fn test_one_node_per_declaration() {
        let def = Definition {
            types: vec![
                object(
                    name("com.a", "Foo"),
                    vec![
                        ("bar", Type::reference(name("com.b", "Bar"))),
                        ("bars", Type::list(Type::reference(name("com.b", "Bar")))),
                    ],
                ),
                object(name("com.b", "Bar"), vec![]),
            ],
            errors: vec![ErrorDefinition {
                error_name: name("com.a", "FooNotFound"),
                namespace: "Foo".to_string(),
                code: ErrorCode::NotFound,
                safe_args: vec![FieldDefinition::new(
                    "foo",
                    Type::reference(name("com.a", "Foo")),
                )],
                unsafe_args: vec![],
                docs: None,
            }],
            ..Default::default()
        };

        let types = build_type_graph(&def).unwrap();
        assert_eq!(types.graph.len(), 3);
        assert_eq!(types.graph.edge_count(), 2);
        assert!(types
            .graph
            .has_edge(&name("com.a", "Foo"), &name("com.b", "Bar")));
        assert!(types
            .graph
            .has_edge(&name("com.a", "FooNotFound"), &name("com.a", "Foo")));
        assert_eq!(types.color(&name("com.b", "Bar")), Some("com.b"));
    }

    #[test]
    fn test_service_edges_from_args_and_returns() {
        let mut endpoint = EndpointDefinition::new("get", HttpMethod::Get, "/x");
        endpoint.returns = Some(Type::optional(Type::reference(name("com.a", "Foo"))));
        endpoint.markers = vec![Type::reference(name("com.markers", "Safe"))];
        let def = Definition {
            types: vec![object(name("com.a", "Foo"), vec![])],
            services: vec![ServiceDefinition {
                service_name: name("com.s", "FooService"),
                endpoints: vec![endpoint],
                docs: None,
            }],
            ..Default::default()
        };

        let types = build_type_graph(&def).unwrap();
        assert!(types
            .graph
            .has_edge(&name("com.s", "FooService"), &name("com.a", "Foo")));
        assert_eq!(types.graph.edge_count(), 1);
    }

    #[test]
    fn test_undeclared_reference_is_rejected() {
        let def = Definition {
            types: vec![object(
                name("com.a", "Foo"),
                vec![("missing", Type::reference(name("com.b", "Missing")))],
            )],
            ..Default::default()
        };

        assert_eq!(
            build_type_graph(&def).unwrap_err(),
            CycleError::UndeclaredType {
                from: name("com.a", "Foo"),
                to: name("com.b", "Missing"),
            }
        );
    }

    #[test]
    fn test_duplicate_declaration_is_rejected() {
        let def = Definition {
            types: vec![
                object(name("com.a", "Foo"), vec![]),
                object(name("com.a", "Foo"), vec![]),
            ],
            ..Default::default()
        };

        assert_eq!(
            build_type_graph(&def).unwrap_err(),
            CycleError::DuplicateDeclaration(name("com.a", "Foo"))
        );
    }

    #[test]
    fn test_package_graph() {
        let def = Definition {
            types: vec![
                object(
                    name("com.a", "X"),
                    vec![("y", Type::reference(name("com.b", "Y")))],
                ),
                object(
                    name("com.b", "Y"),
                    vec![("z", Type::reference(name("com.a", "Z")))],
                ),
                object(
                    name("com.a", "Z"),
                    vec![("x", Type::reference(name("com.a", "X")))],
                ),
            ],
            ..Default::default()
        };

        let packages = package_graph(&def).unwrap();
        assert_eq!(packages.nodes(), &["com.a".to_string(), "com.b".to_string()]);
        assert!(packages.has_edge(&"com.a".to_string(), &"com.b".to_string()));
        assert!(packages.has_edge(&"com.b".to_string(), &"com.a".to_string()));
        assert_eq!(packages.edge_count(), 2);
    }
}

//! Applies a rename mapping to a definition
//!
//! Every declaration identifier and every type reference (fields, container
//! items, map keys and values, external fallbacks, error arguments, endpoint
//! arguments and returns) is replaced through the mapping. Docs, markers and
//! primitives are left as they are.

use crate::model::{Definition, TypeName};
use crate::naming::Renames;

/// Rewrite `def` according to `renames`
///
/// Identifiers absent from the mapping are kept unchanged.
pub fn project(def: &Definition, renames: &Renames) -> Definition {
    let mut projected = def.clone();
    let mut rename = |name: &mut TypeName| {
        if let Some(target) = renames.get(name) {
            *name = target.clone();
        }
    };

    for ty in &mut projected.types {
        rename(ty.type_name_mut());
        for field_type in ty.types_mut() {
            field_type.rewrite_references(&mut rename);
        }
    }
    for error in &mut projected.errors {
        rename(&mut error.error_name);
        for arg_type in error.types_mut() {
            arg_type.rewrite_references(&mut rename);
        }
    }
    for service in &mut projected.services {
        rename(&mut service.service_name);
        for ty in service.types_mut() {
            ty.rewrite_references(&mut rename);
        }
    }

    projected
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{
        AliasDefinition, ArgumentDefinition, EndpointDefinition, ErrorCode, ErrorDefinition,
        FieldDefinition, HttpMethod, ParameterType, ServiceDefinition, Type, TypeDefinition,
    };

    #[test]
    fn test_rewrites_every_reference() {
        let old = TypeName::new("com.a", "Foo");
        let new = TypeName::new("com.a_b", "AFoo");
        let marker = Type::reference(TypeName::new("com.a", "Foo"));

        let mut endpoint = EndpointDefinition::new("get", HttpMethod::Post, "/foo");
        endpoint.args.push(ArgumentDefinition::new(
            "body",
            Type::map(
                Type::reference(old.clone()),
                Type::set(Type::reference(old.clone())),
            ),
            ParameterType::Body,
        ));
        endpoint.returns = Some(Type::External {
            external_reference: TypeName::new("java.lang", "Foo"),
            fallback: Box::new(Type::reference(old.clone())),
        });
        endpoint.markers.push(marker.clone());
        endpoint.docs = Some("Docs mention com.a.Foo".to_string());

        let def = Definition {
            types: vec![TypeDefinition::Alias(AliasDefinition {
                type_name: old.clone(),
                alias: Type::optional(Type::reference(old.clone())),
                docs: None,
            })],
            errors: vec![ErrorDefinition {
                error_name: TypeName::new("com.e", "Err"),
                namespace: "E".to_string(),
                code: ErrorCode::Conflict,
                safe_args: vec![],
                unsafe_args: vec![FieldDefinition::new(
                    "foo",
                    Type::list(Type::reference(old.clone())),
                )],
                docs: None,
            }],
            services: vec![ServiceDefinition {
                service_name: TypeName::new("com.s", "Service"),
                endpoints: vec![endpoint],
                docs: None,
            }],
            ..Default::default()
        };

        let renames = Renames::from([(old.clone(), new.clone())]);
        let projected = project(&def, &renames);

        assert_eq!(projected.types[0].type_name(), &new);
        let mentioned: Vec<&TypeName> = projected.types[0]
            .types()
            .into_iter()
            .chain(projected.errors[0].types())
            .chain(projected.services[0].types())
            .flat_map(Type::references)
            .collect();
        assert_eq!(mentioned.len(), 5);
        assert!(mentioned.iter().all(|name| **name == new));

        let endpoint = &projected.services[0].endpoints[0];
        assert_eq!(endpoint.markers, vec![marker]);
        assert_eq!(endpoint.docs.as_deref(), Some("Docs mention com.a.Foo"));
        assert_eq!(projected.errors[0].error_name, TypeName::new("com.e", "Err"));
    }
}

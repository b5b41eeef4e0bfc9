//! In-memory IDL model
//!
//! The parsed form of an interface definition: type declarations, errors and
//! services, with every cross-declaration reference expressed as a
//! [`TypeName`]. Serialized as camelCase JSON.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Globally unique identifier of a declared type, error or service
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TypeName {
    /// Dot-separated package, e.g. `com.example.api`
    pub package: String,
    /// Bare name within the package
    pub name: String,
}

impl TypeName {
    pub fn new(package: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            package: package.into(),
            name: name.into(),
        }
    }
}

impl fmt::Display for TypeName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.package, self.name)
    }
}

/// Built-in scalar types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PrimitiveType {
    String,
    Datetime,
    Integer,
    Double,
    Safelong,
    Binary,
    Any,
    Boolean,
    Uuid,
    Rid,
    Bearertoken,
}

/// A type expression
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Type {
    Primitive {
        primitive: PrimitiveType,
    },
    Reference {
        reference: TypeName,
    },
    #[serde(rename_all = "camelCase")]
    Optional {
        item_type: Box<Type>,
    },
    #[serde(rename_all = "camelCase")]
    List {
        item_type: Box<Type>,
    },
    #[serde(rename_all = "camelCase")]
    Set {
        item_type: Box<Type>,
    },
    #[serde(rename_all = "camelCase")]
    Map {
        key_type: Box<Type>,
        value_type: Box<Type>,
    },
    /// A type defined outside the IDL, with an in-IDL fallback
    #[serde(rename_all = "camelCase")]
    External {
        external_reference: TypeName,
        fallback: Box<Type>,
    },
}

impl Type {
    pub fn primitive(primitive: PrimitiveType) -> Self {
        Type::Primitive { primitive }
    }

    pub fn reference(name: TypeName) -> Self {
        Type::Reference { reference: name }
    }

    pub fn optional(item: Type) -> Self {
        Type::Optional {
            item_type: Box::new(item),
        }
    }

    pub fn list(item: Type) -> Self {
        Type::List {
            item_type: Box::new(item),
        }
    }

    pub fn set(item: Type) -> Self {
        Type::Set {
            item_type: Box::new(item),
        }
    }

    pub fn map(key: Type, value: Type) -> Self {
        Type::Map {
            key_type: Box::new(key),
            value_type: Box::new(value),
        }
    }

    /// Declared types this expression mentions, at any depth
    ///
    /// The external reference of an `External` names a foreign type and is
    /// not reported; its fallback is.
    pub fn references(&self) -> Vec<&TypeName> {
        let mut out = Vec::new();
        self.collect_references(&mut out);
        out
    }

    fn collect_references<'a>(&'a self, out: &mut Vec<&'a TypeName>) {
        match self {
            Type::Primitive { .. } => {}
            Type::Reference { reference } => out.push(reference),
            Type::Optional { item_type } | Type::List { item_type } | Type::Set { item_type } => {
                item_type.collect_references(out)
            }
            Type::Map {
                key_type,
                value_type,
            } => {
                key_type.collect_references(out);
                value_type.collect_references(out);
            }
            Type::External { fallback, .. } => fallback.collect_references(out),
        }
    }

    /// Apply `f` to every declared-type reference, at any depth
    pub fn rewrite_references<F>(&mut self, f: &mut F)
    where
        F: FnMut(&mut TypeName),
    {
        match self {
            Type::Primitive { .. } => {}
            Type::Reference { reference } => f(reference),
            Type::Optional { item_type } | Type::List { item_type } | Type::Set { item_type } => {
                item_type.rewrite_references(f)
            }
            Type::Map {
                key_type,
                value_type,
            } => {
                key_type.rewrite_references(f);
                value_type.rewrite_references(f);
            }
            Type::External { fallback, .. } => fallback.rewrite_references(f),
        }
    }
}

/// A named, typed member of an object, union or error
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldDefinition {
    pub field_name: String,
    #[serde(rename = "type")]
    pub field_type: Type,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub docs: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deprecated: Option<String>,
}

impl FieldDefinition {
    pub fn new(field_name: impl Into<String>, field_type: Type) -> Self {
        Self {
            field_name: field_name.into(),
            field_type,
            docs: None,
            deprecated: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AliasDefinition {
    pub type_name: TypeName,
    pub alias: Type,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub docs: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnumValueDefinition {
    pub value: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub docs: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnumDefinition {
    pub type_name: TypeName,
    pub values: Vec<EnumValueDefinition>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub docs: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectDefinition {
    pub type_name: TypeName,
    pub fields: Vec<FieldDefinition>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub docs: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UnionDefinition {
    pub type_name: TypeName,
    pub union: Vec<FieldDefinition>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub docs: Option<String>,
}

/// A type declaration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum TypeDefinition {
    Alias(AliasDefinition),
    Enum(EnumDefinition),
    Object(ObjectDefinition),
    Union(UnionDefinition),
}

impl TypeDefinition {
    pub fn type_name(&self) -> &TypeName {
        match self {
            TypeDefinition::Alias(def) => &def.type_name,
            TypeDefinition::Enum(def) => &def.type_name,
            TypeDefinition::Object(def) => &def.type_name,
            TypeDefinition::Union(def) => &def.type_name,
        }
    }

    pub fn type_name_mut(&mut self) -> &mut TypeName {
        match self {
            TypeDefinition::Alias(def) => &mut def.type_name,
            TypeDefinition::Enum(def) => &mut def.type_name,
            TypeDefinition::Object(def) => &mut def.type_name,
            TypeDefinition::Union(def) => &mut def.type_name,
        }
    }

    /// Type expressions directly owned by this declaration
    pub fn types(&self) -> Vec<&Type> {
        match self {
            TypeDefinition::Alias(def) => vec![&def.alias],
            TypeDefinition::Enum(_) => Vec::new(),
            TypeDefinition::Object(def) => def.fields.iter().map(|f| &f.field_type).collect(),
            TypeDefinition::Union(def) => def.union.iter().map(|f| &f.field_type).collect(),
        }
    }

    pub fn types_mut(&mut self) -> Vec<&mut Type> {
        match self {
            TypeDefinition::Alias(def) => vec![&mut def.alias],
            TypeDefinition::Enum(_) => Vec::new(),
            TypeDefinition::Object(def) => {
                def.fields.iter_mut().map(|f| &mut f.field_type).collect()
            }
            TypeDefinition::Union(def) => {
                def.union.iter_mut().map(|f| &mut f.field_type).collect()
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    PermissionDenied,
    InvalidArgument,
    NotFound,
    Conflict,
    RequestEntityTooLarge,
    FailedPrecondition,
    Internal,
    Timeout,
    CustomClient,
    CustomServer,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorDefinition {
    pub error_name: TypeName,
    pub namespace: String,
    pub code: ErrorCode,
    #[serde(default)]
    pub safe_args: Vec<FieldDefinition>,
    #[serde(default)]
    pub unsafe_args: Vec<FieldDefinition>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub docs: Option<String>,
}

impl ErrorDefinition {
    pub fn types(&self) -> impl Iterator<Item = &Type> {
        self.safe_args
            .iter()
            .chain(&self.unsafe_args)
            .map(|f| &f.field_type)
    }

    pub fn types_mut(&mut self) -> impl Iterator<Item = &mut Type> {
        self.safe_args
            .iter_mut()
            .chain(self.unsafe_args.iter_mut())
            .map(|f| &mut f.field_type)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Delete,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum AuthType {
    Header,
    #[serde(rename_all = "camelCase")]
    Cookie { cookie_name: String },
}

/// Where an endpoint argument is carried on the wire
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ParameterType {
    Body,
    Path,
    #[serde(rename_all = "camelCase")]
    Header { param_id: String },
    #[serde(rename_all = "camelCase")]
    Query { param_id: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArgumentDefinition {
    pub arg_name: String,
    #[serde(rename = "type")]
    pub arg_type: Type,
    pub param_type: ParameterType,
    /// Annotation types; opaque to cycle resolution
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub markers: Vec<Type>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub docs: Option<String>,
}

impl ArgumentDefinition {
    pub fn new(arg_name: impl Into<String>, arg_type: Type, param_type: ParameterType) -> Self {
        Self {
            arg_name: arg_name.into(),
            arg_type,
            param_type,
            markers: Vec::new(),
            tags: Vec::new(),
            docs: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EndpointDefinition {
    pub endpoint_name: String,
    pub http_method: HttpMethod,
    pub http_path: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auth: Option<AuthType>,
    #[serde(default)]
    pub args: Vec<ArgumentDefinition>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub returns: Option<Type>,
    /// Annotation types; opaque to cycle resolution
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub markers: Vec<Type>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub docs: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deprecated: Option<String>,
}

impl EndpointDefinition {
    pub fn new(
        endpoint_name: impl Into<String>,
        http_method: HttpMethod,
        http_path: impl Into<String>,
    ) -> Self {
        Self {
            endpoint_name: endpoint_name.into(),
            http_method,
            http_path: http_path.into(),
            auth: None,
            args: Vec::new(),
            returns: None,
            markers: Vec::new(),
            tags: Vec::new(),
            docs: None,
            deprecated: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceDefinition {
    pub service_name: TypeName,
    #[serde(default)]
    pub endpoints: Vec<EndpointDefinition>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub docs: Option<String>,
}

impl ServiceDefinition {
    /// Argument and return types of every endpoint, markers excluded
    pub fn types(&self) -> impl Iterator<Item = &Type> {
        self.endpoints.iter().flat_map(|endpoint| {
            endpoint
                .args
                .iter()
                .map(|arg| &arg.arg_type)
                .chain(endpoint.returns.as_ref())
        })
    }

    pub fn types_mut(&mut self) -> impl Iterator<Item = &mut Type> {
        self.endpoints.iter_mut().flat_map(|endpoint| {
            endpoint
                .args
                .iter_mut()
                .map(|arg| &mut arg.arg_type)
                .chain(endpoint.returns.as_mut())
        })
    }
}

/// A fully parsed interface definition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Definition {
    #[serde(default = "default_version")]
    pub version: u32,
    #[serde(default)]
    pub errors: Vec<ErrorDefinition>,
    #[serde(default)]
    pub types: Vec<TypeDefinition>,
    #[serde(default)]
    pub services: Vec<ServiceDefinition>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub extensions: BTreeMap<String, serde_json::Value>,
}

fn default_version() -> u32 {
    1
}

impl Default for Definition {
    fn default() -> Self {
        Self {
            version: default_version(),
            errors: Vec::new(),
            types: Vec::new(),
            services: Vec::new(),
            extensions: BTreeMap::new(),
        }
    }
}

impl Definition {
    /// Parse a definition from JSON
    pub fn from_json(content: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(content)
    }

    /// Serialize the definition to JSON
    pub fn to_json(&self, pretty: bool) -> Result<String, serde_json::Error> {
        if pretty {
            serde_json::to_string_pretty(self)
        } else {
            serde_json::to_string(self)
        }
    }

    /// Identifiers of every declaration: types, then errors, then services
    pub fn declared_names(&self) -> impl Iterator<Item = &TypeName> {
        self.types
            .iter()
            .map(TypeDefinition::type_name)
            .chain(self.errors.iter().map(|e| &e.error_name))
            .chain(self.services.iter().map(|s| &s.service_name))
    }
}

//! Structural references between metadata entities.
//!
//! A [`TypeReference`] describes *how* a type is mentioned at a use site: by name, as an
//! instantiation of a generic definition, as an array of some element, or as a bound
//! generic parameter. The spec layer inspects this structure to pick the matching spec
//! variant, so the same logical type mentioned through different forms still collapses
//! to one spec per form.
//!
//! Member references ([`MethodReference`], [`FieldReference`], [`PropertyReference`])
//! name a member through its declaring type plus a signature, and [`Operand`] is what a
//! method body mentions.

use std::fmt::{self, Write};

use serde::{Deserialize, Serialize};

/// Who declares a generic parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GenericOwner {
    /// Declared by the enclosing type (`!0`)
    Type,
    /// Declared by the enclosing method (`!!0`)
    Method,
}

/// A structural reference to a type.
///
/// # Examples
///
/// ```rust
/// use dotspec::metadata::TypeReference;
///
/// // Dictionary<string, List<int>>[]
/// let generic = "System.Collections.Generic";
/// let list = TypeReference::generic_instance(
///     TypeReference::external("System.Collections", generic, "List`1"),
///     vec![TypeReference::external("System.Runtime", "System", "Int32")],
/// );
/// let reference = TypeReference::array(
///     TypeReference::generic_instance(
///         TypeReference::external("System.Collections", generic, "Dictionary`2"),
///         vec![TypeReference::external("System.Runtime", "System", "String"), list],
///     ),
///     1,
/// );
///
/// assert_eq!(
///     reference.to_string(),
///     concat!(
///         "System.Collections.Generic.Dictionary`2",
///         "<System.String,System.Collections.Generic.List`1<System.Int32>>[]",
///     )
/// );
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TypeReference {
    /// A plain type, defined in the current module or in the assembly named by `scope`
    Named {
        /// Simple name of the defining assembly, `None` for the current module
        #[serde(default, skip_serializing_if = "Option::is_none")]
        scope: Option<String>,
        /// Namespace, empty for the global namespace and for nested types
        #[serde(default)]
        namespace: String,
        /// Type name; nested types use `Outer/Inner`
        name: String,
    },
    /// A bound instantiation of a generic definition
    GenericInstance {
        /// The generic definition being instantiated
        element: Box<TypeReference>,
        /// Positional type arguments
        arguments: Vec<TypeReference>,
    },
    /// An array of `element`
    Array {
        /// The element type
        element: Box<TypeReference>,
        /// Number of dimensions
        #[serde(default = "default_rank")]
        rank: u32,
    },
    /// A generic parameter of the enclosing type or method
    GenericParameter {
        /// Whether the type or the method declares it
        owner: GenericOwner,
        /// Zero-based position in the owner's parameter list
        position: u16,
        /// Declared name, for display only
        #[serde(default)]
        name: String,
    },
}

fn default_rank() -> u32 {
    1
}

impl TypeReference {
    /// A type defined in the current module.
    #[must_use]
    pub fn local(namespace: &str, name: &str) -> Self {
        TypeReference::Named {
            scope: None,
            namespace: namespace.to_string(),
            name: name.to_string(),
        }
    }

    /// A type defined in the assembly named `scope`.
    #[must_use]
    pub fn external(scope: &str, namespace: &str, name: &str) -> Self {
        TypeReference::Named {
            scope: Some(scope.to_string()),
            namespace: namespace.to_string(),
            name: name.to_string(),
        }
    }

    /// An instantiation of `element` with `arguments`.
    #[must_use]
    pub fn generic_instance(element: TypeReference, arguments: Vec<TypeReference>) -> Self {
        TypeReference::GenericInstance {
            element: Box::new(element),
            arguments,
        }
    }

    /// An array of `element` with `rank` dimensions.
    #[must_use]
    pub fn array(element: TypeReference, rank: u32) -> Self {
        TypeReference::Array {
            element: Box::new(element),
            rank: rank.max(1),
        }
    }

    /// The `position`-th generic parameter of the enclosing type.
    #[must_use]
    pub fn type_parameter(position: u16, name: &str) -> Self {
        TypeReference::GenericParameter {
            owner: GenericOwner::Type,
            position,
            name: name.to_string(),
        }
    }

    /// The `position`-th generic parameter of the enclosing method.
    #[must_use]
    pub fn method_parameter(position: u16, name: &str) -> Self {
        TypeReference::GenericParameter {
            owner: GenericOwner::Method,
            position,
            name: name.to_string(),
        }
    }

    /// Returns the full name of a [`TypeReference::Named`] reference.
    #[must_use]
    pub fn named_full_name(&self) -> Option<String> {
        match self {
            TypeReference::Named {
                namespace, name, ..
            } => Some(full_name(namespace, name)),
            _ => None,
        }
    }

    /// Render the reference in signature form.
    ///
    /// Generic parameters render positionally (`!0`, `!!0`) so that two signatures
    /// compare equal regardless of how the parameters were named.
    #[must_use]
    pub fn signature_name(&self) -> String {
        let mut out = String::new();
        self.write_signature(&mut out);
        out
    }

    fn write_signature(&self, out: &mut String) {
        match self {
            TypeReference::Named {
                namespace, name, ..
            } => out.push_str(&full_name(namespace, name)),
            TypeReference::GenericInstance { element, arguments } => {
                element.write_signature(out);
                out.push('<');
                for (i, argument) in arguments.iter().enumerate() {
                    if i > 0 {
                        out.push(',');
                    }
                    argument.write_signature(out);
                }
                out.push('>');
            }
            TypeReference::Array { element, rank } => {
                element.write_signature(out);
                out.push_str(&array_suffix(*rank));
            }
            TypeReference::GenericParameter {
                owner, position, ..
            } => {
                let _ = match owner {
                    GenericOwner::Type => write!(out, "!{position}"),
                    GenericOwner::Method => write!(out, "!!{position}"),
                };
            }
        }
    }
}

impl fmt::Display for TypeReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.signature_name())
    }
}

/// Join a namespace and a type name the way metadata full names are written.
#[must_use]
pub fn full_name(namespace: &str, name: &str) -> String {
    if namespace.is_empty() {
        name.to_string()
    } else {
        format!("{namespace}.{name}")
    }
}

/// The `[]` / `[,]` suffix for an array of `rank` dimensions.
#[must_use]
pub fn array_suffix(rank: u32) -> String {
    let commas = rank.max(1) as usize - 1;
    format!("[{}]", ",".repeat(commas))
}

/// Signature key of a method: name, generic arity and positional parameter types.
#[must_use]
pub fn method_signature<'a>(
    name: &str,
    generic_arity: usize,
    parameters: impl IntoIterator<Item = &'a TypeReference>,
) -> String {
    let mut out = String::from(name);
    if generic_arity > 0 {
        let _ = write!(out, "``{generic_arity}");
    }
    out.push('(');
    for (i, parameter) in parameters.into_iter().enumerate() {
        if i > 0 {
            out.push(',');
        }
        parameter.write_signature(&mut out);
    }
    out.push(')');
    out
}

/// A reference to a method through its declaring type and signature.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MethodReference {
    /// The type declaring the method; may be a generic instance
    pub declaring_type: TypeReference,
    /// Method name
    pub name: String,
    /// Positional parameter types
    #[serde(default)]
    pub parameters: Vec<TypeReference>,
    /// Number of generic parameters the method declares
    #[serde(default)]
    pub generic_arity: usize,
    /// Type arguments when the reference instantiates a generic method
    #[serde(default)]
    pub generic_arguments: Vec<TypeReference>,
}

impl MethodReference {
    /// A reference to a non-generic method.
    #[must_use]
    pub fn new(declaring_type: TypeReference, name: &str, parameters: Vec<TypeReference>) -> Self {
        MethodReference {
            declaring_type,
            name: name.to_string(),
            parameters,
            generic_arity: 0,
            generic_arguments: Vec::new(),
        }
    }

    /// Instantiate a generic method with `arguments`.
    #[must_use]
    pub fn with_generic_arguments(mut self, arguments: Vec<TypeReference>) -> Self {
        self.generic_arity = arguments.len();
        self.generic_arguments = arguments;
        self
    }

    /// Signature key used to find the method on its declaring type.
    #[must_use]
    pub fn signature(&self) -> String {
        method_signature(&self.name, self.generic_arity, &self.parameters)
    }
}

/// A reference to a field through its declaring type.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FieldReference {
    /// The type declaring the field; may be a generic instance
    pub declaring_type: TypeReference,
    /// Field name
    pub name: String,
}

impl FieldReference {
    /// Create a field reference.
    #[must_use]
    pub fn new(declaring_type: TypeReference, name: &str) -> Self {
        FieldReference {
            declaring_type,
            name: name.to_string(),
        }
    }
}

/// A reference to a property through its declaring type.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PropertyReference {
    /// The type declaring the property; may be a generic instance
    pub declaring_type: TypeReference,
    /// Property name
    pub name: String,
}

impl PropertyReference {
    /// Create a property reference.
    #[must_use]
    pub fn new(declaring_type: TypeReference, name: &str) -> Self {
        PropertyReference {
            declaring_type,
            name: name.to_string(),
        }
    }
}

/// An operand mentioned by an instruction of a method body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum Operand {
    /// A type token (`newarr`, `castclass`, `ldtoken`, ...)
    Type(TypeReference),
    /// A field token (`ldfld`, `stsfld`, ...)
    Field(FieldReference),
    /// A method token (`call`, `newobj`, `ldftn`, ...)
    Method(MethodReference),
    /// A property token, as produced by reflection-emitting tooling
    Property(PropertyReference),
    /// An inline literal (string, number, branch target)
    Literal(String),
    /// Instruction without operand
    None,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn signature_names() {
        let reference = TypeReference::array(
            TypeReference::generic_instance(
                TypeReference::local("Demo", "Box`1"),
                vec![TypeReference::method_parameter(0, "T")],
            ),
            2,
        );
        assert_eq!(reference.signature_name(), "Demo.Box`1<!!0>[,]");
        assert_eq!(
            TypeReference::local("", "Outer/Inner").signature_name(),
            "Outer/Inner"
        );
    }

    #[test]
    fn method_signatures_ignore_parameter_names() {
        let a = method_signature("Map", 1, &[TypeReference::method_parameter(0, "T")]);
        let b = method_signature("Map", 1, &[TypeReference::method_parameter(0, "TItem")]);
        assert_eq!(a, b);
        assert_eq!(a, "Map``1(!!0)");
        assert_eq!(method_signature("Run", 0, &[]), "Run()");
    }

    #[test]
    fn json_shape() {
        let json = r#"{
            "kind": "generic_instance",
            "element": {
                "kind": "named",
                "scope": "System.Collections",
                "namespace": "System.Collections.Generic",
                "name": "List`1"
            },
            "arguments": [{ "kind": "generic_parameter", "owner": "type", "position": 0 }]
        }"#;
        let reference: TypeReference = serde_json::from_str(json).unwrap();
        assert_eq!(reference.to_string(), "System.Collections.Generic.List`1<!0>");

        let array: TypeReference =
            serde_json::from_str(r#"{"kind":"array","element":{"kind":"named","name":"Foo"}}"#)
                .unwrap();
        assert_eq!(array, TypeReference::array(TypeReference::local("", "Foo"), 1));
    }

    #[test]
    fn operand_shape() {
        let operand: Operand =
            serde_json::from_str(r#"{"kind":"literal","value":"hello"}"#).unwrap();
        assert_eq!(operand, Operand::Literal("hello".to_string()));
        let operand: Operand = serde_json::from_str(r#"{"kind":"none"}"#).unwrap();
        assert_eq!(operand, Operand::None);
    }
}

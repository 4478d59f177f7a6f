//! Attribute bitmasks for types, methods and fields (ECMA-335 §II.23.1).
//!
//! Images carry the raw `u32`/`u16` masks; the spec layer interprets them through
//! these flag sets.

use bitflags::bitflags;

bitflags! {
    #[derive(PartialEq, Eq, Clone, Copy, Debug, Hash)]
    /// Subset of `TypeAttributes` (§II.23.1.15) used by the spec graph
    pub struct TypeAttributes : u32 {
        /// Visible outside of the assembly
        const PUBLIC = 0x0000_0001;
        /// Nested type with public visibility
        const NESTED_PUBLIC = 0x0000_0002;
        /// Type is an interface
        const INTERFACE = 0x0000_0020;
        /// Type cannot be instantiated
        const ABSTRACT = 0x0000_0080;
        /// Type cannot be derived from
        const SEALED = 0x0000_0100;
        /// Type name has a special meaning to the runtime
        const SPECIAL_NAME = 0x0000_0400;
        /// Type is imported from a COM type library
        const IMPORT = 0x0000_1000;
        /// Type is serializable
        const SERIALIZABLE = 0x0000_2000;
        /// Type initializer may run before first static field access
        const BEFORE_FIELD_INIT = 0x0010_0000;
    }
}

bitflags! {
    #[derive(PartialEq, Eq, Clone, Copy, Debug, Hash)]
    /// Subset of `MethodAttributes` (§II.23.1.10) used by the spec graph
    pub struct MethodAttributes : u16 {
        /// Accessible only by the parent type
        const PRIVATE = 0x0001;
        /// Accessible by everyone
        const PUBLIC = 0x0006;
        /// Defined on the type rather than per instance
        const STATIC = 0x0010;
        /// Method cannot be overridden
        const FINAL = 0x0020;
        /// Method is virtual
        const VIRTUAL = 0x0040;
        /// Method hides by name and signature
        const HIDE_BY_SIG = 0x0080;
        /// Method always gets a new slot in the vtable
        const NEW_SLOT = 0x0100;
        /// Method does not provide an implementation
        const ABSTRACT = 0x0400;
        /// Method name has a special meaning (accessors, operators)
        const SPECIAL_NAME = 0x0800;
        /// Implementation is forwarded through PInvoke
        const PINVOKE_IMPL = 0x2000;
        /// Runtime checks the name encoding
        const RT_SPECIAL_NAME = 0x1000;
    }
}

bitflags! {
    #[derive(PartialEq, Eq, Clone, Copy, Debug, Hash)]
    /// Subset of `FieldAttributes` (§II.23.1.5) used by the spec graph
    pub struct FieldAttributes : u16 {
        /// Accessible only by the parent type
        const PRIVATE = 0x0001;
        /// Accessible by everyone
        const PUBLIC = 0x0006;
        /// Defined on the type rather than per instance
        const STATIC = 0x0010;
        /// Field can only be initialized, not written after initialization
        const INIT_ONLY = 0x0020;
        /// Value is a compile time constant
        const LITERAL = 0x0040;
        /// Field has a default value
        const HAS_DEFAULT = 0x8000;
    }
}

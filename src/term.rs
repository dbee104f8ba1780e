//! Component A — type representation & constructors (§4.A).
//!
//! A [`Type`] is an immutable, reference-counted node of the type graph
//! (§3). The donor crate models a parsed type (`til::Type`) as an owning
//! tree rooted in `Box`; terms here are *shared*, so the same shape is
//! expressed with `Rc` instead, and every constructor takes ownership of
//! the subterms passed to it exactly as the donor's `Type::new` consumes
//! its `TypeRaw` children.

use std::any::Any;
use std::rc::Rc;

use crate::flags::ModFlags;
use crate::kind::Kind;

/// An opaque caller-supplied handle attached to a variable-length-array
/// term (§3: "a non-null dependency handle"). The core never inspects the
/// handle's contents; it only counts and hands the handle back via
/// [`crate::inspect::get_dependency`].
#[derive(Clone)]
pub struct Dependency(Rc<dyn Any>);

impl Dependency {
    pub fn new<T: Any>(value: T) -> Self {
        Dependency(Rc::new(value))
    }

    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.0.downcast_ref()
    }
}

impl std::fmt::Debug for Dependency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Dependency(..)")
    }
}

/// One entry of a struct/union/arglist member table (§3).
#[derive(Debug, Clone)]
pub struct Member {
    pub name: Option<String>,
    pub ty: Type,
}

impl Member {
    pub fn new(name: impl Into<Option<String>>, ty: Type) -> Self {
        Member { name: name.into(), ty }
    }
}

/// One entry of an enum's name/value table (§3).
#[derive(Debug, Clone)]
pub struct EnumMember {
    pub name: String,
    pub value: i64,
}

/// An array term's length discriminator (§3 invariant 1).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArrayLength {
    Const(u64),
    Incomplete,
    Variable,
}

#[derive(Debug, Clone)]
pub(crate) struct ArrayPayload {
    pub element: Type,
    pub length: ArrayLength,
    pub dependency: Option<Dependency>,
}

#[derive(Debug, Clone)]
pub(crate) struct FunctionPayload {
    pub ret: Type,
    /// `None` models an old-style/unprototyped declarator's absent
    /// parameter list (§4.B, §4.C "representable absence").
    pub args: Option<Type>,
}

#[derive(Debug, Clone)]
pub(crate) struct CompoundPayload {
    pub tag: Option<String>,
    /// `None` for an incomplete struct/union, or for an ArgList that has
    /// no parameters at all (`arglist(&[], None)` would be unusual but is
    /// not forbidden — an empty `Some(vec![])` is the normal "zero
    /// parameters, prototyped" case).
    pub members: Option<Vec<Member>>,
}

#[derive(Debug, Clone)]
pub(crate) struct EnumPayload {
    pub tag: Option<String>,
    pub members: Option<Vec<EnumMember>>,
}

#[derive(Debug, Clone)]
pub(crate) struct ModifiedPayload {
    pub base: Type,
    pub flags: ModFlags,
    pub bits: Option<u16>,
}

#[derive(Debug, Clone)]
pub(crate) enum Payload {
    Basic,
    Pointer(Type),
    Array(ArrayPayload),
    Function(FunctionPayload),
    Compound(CompoundPayload),
    Enum(EnumPayload),
    Modified(ModifiedPayload),
}

#[derive(Debug)]
pub(crate) struct TypeNode {
    pub kind: Kind,
    pub payload: Payload,
}

/// An immutable, reference-counted type term (§3).
///
/// `Clone` plays the role of a `ref` bump (cheap, `Rc`-backed); dropping
/// the last clone plays the role of `free`, recursively releasing owned
/// children. There is no separate `ref`/`free` pair in the public API —
/// ordinary Rust ownership plays that role, as SPEC_FULL §3 records.
#[derive(Debug, Clone)]
pub struct Type(pub(crate) Rc<TypeNode>);

impl Type {
    pub(crate) fn new(kind: Kind, payload: Payload) -> Type {
        Type(Rc::new(TypeNode { kind, payload }))
    }

    /// Pointer-identity comparison — the basis of struct/union nominal
    /// identity (§4.C) and of the equivalence algebra's reflexive shortcut.
    pub fn ptr_eq(a: &Type, b: &Type) -> bool {
        Rc::ptr_eq(&a.0, &b.0)
    }

    pub(crate) fn kind_raw(&self) -> Kind {
        self.0.kind
    }

    pub(crate) fn payload(&self) -> &Payload {
        &self.0.payload
    }

    // ---- basic / void -------------------------------------------------

    /// Any arithmetic kind or `Void`. Panics if `kind` needs a richer
    /// payload (pointer, array, ...) — those have their own constructors.
    pub fn basic(kind: Kind) -> Type {
        assert!(
            kind.is_basic_shape(),
            "basic(): {kind:?} is not a basic/void kind"
        );
        Type::new(kind, Payload::Basic)
    }

    pub fn void() -> Type {
        Type::basic(Kind::Void)
    }

    pub fn bool_() -> Type {
        Type::basic(Kind::Bool)
    }

    // ---- pointer --------------------------------------------------------

    pub fn pointer(referent: Type) -> Type {
        Type::new(Kind::Pointer, Payload::Pointer(referent))
    }

    // ---- array ----------------------------------------------------------

    pub fn array(length: u64, element: Type) -> Type {
        Type::new(
            Kind::Array,
            Payload::Array(ArrayPayload {
                element,
                length: ArrayLength::Const(length),
                dependency: None,
            }),
        )
    }

    pub fn incomplete_array(element: Type) -> Type {
        Type::new(
            Kind::Array,
            Payload::Array(ArrayPayload {
                element,
                length: ArrayLength::Incomplete,
                dependency: None,
            }),
        )
    }

    pub fn variable_array(element: Type, handle: Dependency) -> Type {
        Type::new(
            Kind::Array,
            Payload::Array(ArrayPayload {
                element,
                length: ArrayLength::Variable,
                dependency: Some(handle),
            }),
        )
    }

    // ---- function / arglist ---------------------------------------------

    /// A prototyped function with unnamed parameters.
    pub fn function(ret: Type, params: Vec<Type>) -> Type {
        let args = Type::arglist(params, None);
        Type::build_function(ret, Some(args))
    }

    /// A prototyped function with named parameters, parallel to `params`.
    pub fn function_named(ret: Type, params: Vec<Type>, names: Vec<Option<String>>) -> Type {
        assert_eq!(params.len(), names.len(), "function_named: params/names length mismatch");
        let args = Type::arglist(params, Some(names));
        Type::build_function(ret, Some(args))
    }

    /// An old-style/unprototyped function declarator: no parameter list at
    /// all (§4.C's "either argument list is absent").
    pub fn function_unprototyped(ret: Type) -> Type {
        Type::build_function(ret, None)
    }

    pub(crate) fn build_function(ret: Type, args: Option<Type>) -> Type {
        if let Some(a) = &args {
            assert_eq!(a.kind_raw(), Kind::ArgList, "function: args must be an ArgList term");
        }
        Type::new(Kind::Function, Payload::Function(FunctionPayload { ret, args }))
    }

    pub fn arglist(params: Vec<Type>, names: Option<Vec<Option<String>>>) -> Type {
        let members = match names {
            Some(names) => {
                assert_eq!(params.len(), names.len(), "arglist: params/names length mismatch");
                params
                    .into_iter()
                    .zip(names)
                    .map(|(ty, name)| Member::new(name, ty))
                    .collect()
            }
            None => params.into_iter().map(|ty| Member::new(None, ty)).collect(),
        };
        Type::new(
            Kind::ArgList,
            Payload::Compound(CompoundPayload { tag: None, members: Some(members) }),
        )
    }

    // ---- struct / union ---------------------------------------------------

    pub fn struct_(tag: impl Into<Option<String>>, members: Vec<Member>) -> Type {
        Type::new(
            Kind::Struct,
            Payload::Compound(CompoundPayload { tag: tag.into(), members: Some(members) }),
        )
    }

    pub fn struct_incomplete(tag: impl Into<Option<String>>) -> Type {
        Type::new(
            Kind::Struct,
            Payload::Compound(CompoundPayload { tag: tag.into(), members: None }),
        )
    }

    pub fn union_(tag: impl Into<Option<String>>, members: Vec<Member>) -> Type {
        Type::new(
            Kind::Union,
            Payload::Compound(CompoundPayload { tag: tag.into(), members: Some(members) }),
        )
    }

    pub fn union_incomplete(tag: impl Into<Option<String>>) -> Type {
        Type::new(
            Kind::Union,
            Payload::Compound(CompoundPayload { tag: tag.into(), members: None }),
        )
    }

    // ---- enum -------------------------------------------------------------

    pub fn enum_(tag: impl Into<Option<String>>, members: Vec<(String, i64)>) -> Type {
        let members = members
            .into_iter()
            .map(|(name, value)| EnumMember { name, value })
            .collect();
        Type::new(
            Kind::Enum,
            Payload::Enum(EnumPayload { tag: tag.into(), members: Some(members) }),
        )
    }

    pub fn enum_incomplete(tag: impl Into<Option<String>>) -> Type {
        Type::new(Kind::Enum, Payload::Enum(EnumPayload { tag: tag.into(), members: None }))
    }

    // ---- modifiers ----------------------------------------------------------

    /// Merge `add` (and, for bitfields, `bits`) into `t`'s modifier set.
    ///
    /// Flattens per invariant 5: if `t` is already `Modified(base, flags,
    /// bits)`, the result is `Modified(base, flags | add, bits')` — never
    /// `Modified(Modified(...))`. If `add` is already set and no new bit
    /// width is supplied, `t` is returned unchanged (idempotence, §4.A).
    fn apply_modifier(t: Type, add: ModFlags, bits: Option<u16>) -> Type {
        match t.payload() {
            Payload::Modified(m) => {
                if m.flags.contains(add) && (bits.is_none() || bits == m.bits) {
                    return t;
                }
                let base = m.base.clone();
                let flags = m.flags.union(add);
                let bits = bits.or(m.bits);
                Type::new(Kind::Modified, Payload::Modified(ModifiedPayload { base, flags, bits }))
            }
            _ => Type::new(
                Kind::Modified,
                Payload::Modified(ModifiedPayload { base: t, flags: add, bits }),
            ),
        }
    }

    pub fn unsigned(t: Type) -> Type {
        assert!(
            matches!(
                crate::inspect::classify(&t),
                Kind::Char | Kind::SChar | Kind::Short | Kind::Int | Kind::Long | Kind::LongLong | Kind::Enum
            ),
            "unsigned(): not an integer kind"
        );
        Type::apply_modifier(t, ModFlags::UNSIGNED, None)
    }

    pub fn complex(t: Type) -> Type {
        assert!(crate::inspect::is_float(&t), "complex(): not a floating kind");
        Type::apply_modifier(t, ModFlags::COMPLEX, None)
    }

    pub fn atomic(t: Type) -> Type {
        Type::apply_modifier(t, ModFlags::ATOMIC, None)
    }

    pub fn const_(t: Type) -> Type {
        Type::apply_modifier(t, ModFlags::CONST, None)
    }

    pub fn volatile(t: Type) -> Type {
        Type::apply_modifier(t, ModFlags::VOLATILE, None)
    }

    pub fn restrict(t: Type) -> Type {
        Type::apply_modifier(t, ModFlags::RESTRICT, None)
    }

    pub fn wide(t: Type) -> Type {
        Type::apply_modifier(t, ModFlags::WIDE, None)
    }

    pub fn bitfield(t: Type, bits: u16) -> Type {
        assert!(crate::inspect::is_integer(&t), "bitfield(): not an integer kind");
        Type::apply_modifier(t, ModFlags::BITFIELD, Some(bits))
    }

    /// Strip `{Const, Volatile, Restrict, Wide}`, preserving
    /// `{Unsigned, Complex, Atomic, Bitfield}` (§4.A).
    pub fn unqualified(t: &Type) -> Type {
        const STRIP: ModFlags = ModFlags::CONST.union(ModFlags::VOLATILE).union(ModFlags::RESTRICT).union(ModFlags::WIDE);
        match t.payload() {
            Payload::Modified(m) => {
                let remaining = m.flags.minus(STRIP);
                if remaining.is_empty() {
                    m.base.clone()
                } else {
                    Type::new(
                        Kind::Modified,
                        Payload::Modified(ModifiedPayload {
                            base: m.base.clone(),
                            flags: remaining,
                            bits: if remaining.contains(ModFlags::BITFIELD) { m.bits } else { None },
                        }),
                    )
                }
            }
            _ => t.clone(),
        }
    }

    /// On a complex floating term, strip exactly `Complex` and return the
    /// remaining term (base unchanged if no other flags survive). A no-op
    /// on a non-complex term. See SPEC_FULL §4.A for why this crate
    /// implements the general form rather than the reference's
    /// no-other-flags-only special case.
    pub fn real(t: &Type) -> Type {
        match t.payload() {
            Payload::Modified(m) if m.flags.contains(ModFlags::COMPLEX) => {
                let remaining = m.flags.minus(ModFlags::COMPLEX);
                if remaining.is_empty() {
                    m.base.clone()
                } else {
                    Type::new(
                        Kind::Modified,
                        Payload::Modified(ModifiedPayload {
                            base: m.base.clone(),
                            flags: remaining,
                            bits: m.bits,
                        }),
                    )
                }
            }
            _ => t.clone(),
        }
    }
}

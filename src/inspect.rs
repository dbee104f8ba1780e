//! Component B — inspection & classification (§4.B).
//!
//! Every function here is a pure, read-only projection of a [`Type`]; this
//! is the shared surface component C, component D and the `printer`
//! module are built on. Nothing in this file constructs a term or mutates
//! one — it only looks.

use crate::flags::ModFlags;
use crate::kind::{Category, Kind};
use crate::term::{ArrayLength, Member, Payload, Type};

/// Unwrap exactly one `Modified` layer, per invariant 5 there is never
/// more than one to unwrap.
fn unwrap_mod(t: &Type) -> &Type {
    match t.payload() {
        Payload::Modified(m) => &m.base,
        _ => t,
    }
}

fn mod_flags(t: &Type) -> ModFlags {
    match t.payload() {
        Payload::Modified(m) => m.flags,
        _ => ModFlags::NONE,
    }
}

/// The term's modifier flag set (empty if it carries no `Modified`
/// wrapper at all). Exposed to component C for the exact-flag-set
/// comparisons identity/compatibility require.
pub(crate) fn flags_of(t: &Type) -> ModFlags {
    mod_flags(t)
}

/// The base term one `Modified` layer down, or `t` itself if it carries
/// no modifier wrapper.
pub(crate) fn modified_base(t: &Type) -> Type {
    match t.payload() {
        Payload::Modified(m) => m.base.clone(),
        _ => t.clone(),
    }
}

fn mod_bits(t: &Type) -> Option<u16> {
    match t.payload() {
        Payload::Modified(m) => m.bits,
        _ => None,
    }
}

/// §4.B: the term's kind, after unwrapping one `Modified` layer —
/// modifiers are transparent to classification.
pub fn classify(t: &Type) -> Kind {
    unwrap_mod(t).kind_raw()
}

/// §4.B: `Atomic` if the flag is set, otherwise the category implied by
/// `classify`.
pub fn category(t: &Type) -> Category {
    if is_atomic(t) {
        return Category::Atomic;
    }
    match classify(t) {
        Kind::Struct => Category::Struct,
        Kind::Union => Category::Union,
        Kind::Pointer => Category::Pointer,
        Kind::Array => Category::Array,
        Kind::Function => Category::Function,
        _ => Category::SelfCategory,
    }
}

// ---- qualifier / flag predicates --------------------------------------------

pub fn is_const(t: &Type) -> bool {
    mod_flags(t).contains(ModFlags::CONST)
}

pub fn is_volatile(t: &Type) -> bool {
    mod_flags(t).contains(ModFlags::VOLATILE)
}

pub fn is_restrict(t: &Type) -> bool {
    mod_flags(t).contains(ModFlags::RESTRICT)
}

pub fn is_atomic(t: &Type) -> bool {
    mod_flags(t).contains(ModFlags::ATOMIC)
}

pub fn is_wide(t: &Type) -> bool {
    mod_flags(t).contains(ModFlags::WIDE)
}

pub fn is_unsigned(t: &Type) -> bool {
    mod_flags(t).contains(ModFlags::UNSIGNED)
}

/// True for the signed integer kinds when `Unsigned` is not set (§4.B).
pub fn is_signed(t: &Type) -> bool {
    matches!(
        classify(t),
        Kind::Char | Kind::SChar | Kind::Short | Kind::Int | Kind::Long | Kind::LongLong
    ) && !is_unsigned(t)
}

pub fn is_complex(t: &Type) -> bool {
    mod_flags(t).contains(ModFlags::COMPLEX)
}

pub fn is_bitfield(t: &Type) -> bool {
    mod_flags(t).contains(ModFlags::BITFIELD)
}

pub fn is_qualified(t: &Type) -> bool {
    is_const(t) || is_volatile(t) || is_restrict(t)
}

// ---- family predicates -------------------------------------------------------

pub fn is_float(t: &Type) -> bool {
    matches!(classify(t), Kind::Float | Kind::Double | Kind::LongDouble)
}

/// Char or SChar (§4.B).
pub fn is_character(t: &Type) -> bool {
    matches!(classify(t), Kind::Char | Kind::SChar)
}

/// Any enum, signed, unsigned, or character kind (§4.B — `Bool` is
/// deliberately excluded, matching spec.md's literal wording).
pub fn is_integer(t: &Type) -> bool {
    matches!(
        classify(t),
        Kind::Enum | Kind::Char | Kind::SChar | Kind::Short | Kind::Int | Kind::Long | Kind::LongLong
    )
}

pub fn is_arithmetic(t: &Type) -> bool {
    is_integer(t) || is_float(t) || classify(t) == Kind::Bool
}

pub fn is_scalar(t: &Type) -> bool {
    is_arithmetic(t) || classify(t) == Kind::Pointer
}

/// Array or struct (§4.B) — unions are deliberately not aggregates, as in
/// the standard this library otherwise mirrors.
pub fn is_aggregate(t: &Type) -> bool {
    matches!(category(t), Category::Array | Category::Struct)
}

pub fn is_compound(t: &Type) -> bool {
    matches!(category(t), Category::Struct | Category::Union)
}

/// §4.B literal four-clause predicate, preserved verbatim from
/// `type_basic_p` (see SPEC_FULL §4.B): character, non-char signed
/// integer, unsigned, or floating. Deliberately does **not** test `Void`
/// or `Enum` — this is narrower than the `Basic` *payload shape* of §3.
pub fn is_basic(t: &Type) -> bool {
    is_character(t)
        || matches!(classify(t), Kind::Short | Kind::Int | Kind::Long | Kind::LongLong)
        || is_unsigned(t)
        || is_float(t)
}

pub fn is_derived_decl(t: &Type) -> bool {
    matches!(category(t), Category::Pointer | Category::Array | Category::Function)
}

pub fn is_array_vla(t: &Type) -> bool {
    category(t) == Category::Array && array_length_raw(t) == ArrayLength::Variable
}

/// `Void`, an incomplete array, an incomplete struct/union, or `Void`
/// itself are incomplete; an `Enum` is always complete, even one built via
/// [`Type::enum_incomplete`] — a quirk inherited from the reference
/// implementation's literal `switch`, preserved here (SPEC_FULL §4.B).
pub fn is_complete(t: &Type) -> bool {
    match classify(t) {
        Kind::Void => false,
        Kind::Array => !matches!(array_length_raw(t), ArrayLength::Incomplete),
        Kind::Struct | Kind::Union => compound_members(t).is_some(),
        _ => true,
    }
}

/// Complete, not a VLA, and — if compound — every member is itself
/// known-const-size. The one exception: the trailing flexible-array
/// member of a struct that otherwise satisfies [`is_struct_has_fam`] does
/// not itself need to be known-const-size (§8 scenario S2).
pub fn is_known_const_size(t: &Type) -> bool {
    if !is_complete(t) {
        return false;
    }
    if is_array_vla(t) {
        return false;
    }
    if category(t) == Category::Array {
        return is_known_const_size(&array_element(t));
    }
    if is_compound(t) {
        let n = member_count(t);
        let fam = is_struct_has_fam(t);
        return (0..n).all(|i| {
            if fam && i + 1 == n {
                true
            } else {
                is_known_const_size(&member_type(t, i))
            }
        });
    }
    true
}

/// A struct whose last member is an incomplete array (§3 invariant 4).
pub fn is_struct_has_fam(t: &Type) -> bool {
    if category(t) != Category::Struct || !is_complete(t) {
        return false;
    }
    let n = member_count(t);
    if n == 0 {
        return false;
    }
    let last = member_type(t, n - 1);
    category(&last) == Category::Array && !is_complete(&last)
}

// ---- structural projections ---------------------------------------------------

pub fn pointer_referenced(t: &Type) -> Type {
    match unwrap_mod(t).payload() {
        Payload::Pointer(referent) => referent.clone(),
        _ => panic!("pointer_referenced(): not a pointer type"),
    }
}

fn array_payload(t: &Type) -> &crate::term::ArrayPayload {
    match unwrap_mod(t).payload() {
        Payload::Array(a) => a,
        _ => panic!("not an array type"),
    }
}

fn array_length_raw(t: &Type) -> ArrayLength {
    array_payload(t).length
}

pub fn array_element(t: &Type) -> Type {
    array_payload(t).element.clone()
}

/// Asserts the array has a statically-known constant length.
pub fn array_length(t: &Type) -> u64 {
    match array_length_raw(t) {
        ArrayLength::Const(n) => n,
        _ => panic!("array_length(): array is not of known constant length"),
    }
}

fn function_payload(t: &Type) -> &crate::term::FunctionPayload {
    match unwrap_mod(t).payload() {
        Payload::Function(f) => f,
        _ => panic!("not a function type"),
    }
}

pub fn function_return(t: &Type) -> Type {
    function_payload(t).ret.clone()
}

/// The function's ArgList term, or `None` for an old-style/unprototyped
/// declarator (§4.B "representable absence").
pub fn function_arguments(t: &Type) -> Option<Type> {
    function_payload(t).args.clone()
}

fn compound_members(t: &Type) -> Option<&Vec<Member>> {
    match unwrap_mod(t).payload() {
        Payload::Compound(c) => c.members.as_ref(),
        Payload::Enum(_) => None,
        _ => panic!("not a compound (struct/union/arglist) type"),
    }
}

pub fn member_count(t: &Type) -> usize {
    match unwrap_mod(t).payload() {
        Payload::Compound(c) => c.members.as_ref().map_or(0, Vec::len),
        Payload::Enum(e) => e.members.as_ref().map_or(0, Vec::len),
        _ => panic!("member_count(): not a struct/union/arglist/enum type"),
    }
}

pub fn member_type(t: &Type, index: usize) -> Type {
    let members = compound_members(t).expect("member_type(): incomplete type has no members");
    members[index].ty.clone()
}

pub fn member_name(t: &Type, index: usize) -> Option<String> {
    let members = compound_members(t).expect("member_name(): incomplete type has no members");
    members[index].name.clone()
}

/// The struct/union/arglist/enum tag, or `None` for an anonymous type or
/// an ArgList (which never carries one).
pub fn compound_tag(t: &Type) -> Option<String> {
    match unwrap_mod(t).payload() {
        Payload::Compound(c) => c.tag.clone(),
        Payload::Enum(e) => e.tag.clone(),
        _ => panic!("compound_tag(): not a struct/union/arglist/enum type"),
    }
}

pub fn enum_value(t: &Type, index: usize) -> i64 {
    match unwrap_mod(t).payload() {
        Payload::Enum(e) => {
            let members = e.members.as_ref().expect("enum_value(): incomplete enum has no members");
            members[index].value
        }
        _ => panic!("enum_value(): not an enum type"),
    }
}

pub fn bitfield_bits(t: &Type) -> u16 {
    mod_bits(t).expect("bitfield_bits(): not a bitfield type")
}

/// A strict total order on integer kinds: `Bool < Char = SChar < Short <
/// Enum = Int < Long < LongLong` (§4.B).
pub fn rank(t: &Type) -> u8 {
    match classify(t) {
        Kind::Bool => 0,
        Kind::Char | Kind::SChar => 1,
        Kind::Short => 2,
        Kind::Enum | Kind::Int => 3,
        Kind::Long => 4,
        Kind::LongLong => 5,
        other => panic!("rank(): {other:?} has no integer rank"),
    }
}

/// Walk a term collecting the dependency handle of every VLA node
/// reachable by descending into pointer referents, array elements and
/// function returns. Stops at compound boundaries: does not descend into
/// struct/union/arglist members or a function's parameter list (§4.B).
fn collect_dependencies(t: &Type, out: &mut Vec<crate::term::Dependency>) {
    match unwrap_mod(t).payload() {
        Payload::Pointer(referent) => collect_dependencies(referent, out),
        Payload::Array(a) => {
            if let ArrayLength::Variable = a.length {
                out.push(a.dependency.clone().expect("VLA term missing its dependency handle"));
            }
            collect_dependencies(&a.element, out);
        }
        Payload::Function(f) => collect_dependencies(&f.ret, out),
        _ => {}
    }
}

pub fn dependencies(t: &Type) -> usize {
    let mut out = Vec::new();
    collect_dependencies(t, &mut out);
    out.len()
}

pub fn get_dependency(t: &Type, index: usize) -> crate::term::Dependency {
    let mut out = Vec::new();
    collect_dependencies(t, &mut out);
    out.into_iter().nth(index).expect("get_dependency(): index out of range")
}

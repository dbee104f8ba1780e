//! Cross-component scenario and invariant tests (§8). Mirrors the
//! donor's own `src/test.rs`: one flat integration-style test file rather
//! than tests scattered per module.

use rstest::rstest;

use crate::abi::{sizeof, alignof, offsetof_n, offsetof, widthof, AbiTable};
use crate::equiv::*;
use crate::inspect::*;
use crate::kind::{Category, Kind};
use crate::term::{Dependency, Member, Type};

fn host() -> AbiTable {
    AbiTable::host()
}

// ---- S1: simple struct layout ------------------------------------------------

#[test]
fn s1_simple_struct_layout() {
    let abi = host();
    let s = Type::struct_(
        "S".to_string(),
        vec![
            Member::new("a".to_string(), Type::basic(Kind::Int)),
            Member::new("b".to_string(), Type::basic(Kind::Char)),
            Member::new("c".to_string(), Type::pointer(Type::void())),
        ],
    );
    assert_eq!(offsetof(&s, "a", &abi), 0);
    assert_eq!(offsetof(&s, "b", &abi), 4);
    assert_eq!(offsetof(&s, "c", &abi), 8);
    assert_eq!(sizeof(&s, &abi), 16);
    assert_eq!(alignof(&s, &abi), 8);
}

// ---- S2: flexible array member ------------------------------------------------

#[test]
fn s2_flexible_array_member() {
    let abi = host();
    let v = Type::struct_(
        "V".to_string(),
        vec![
            Member::new("n".to_string(), Type::basic(Kind::Int)),
            Member::new("data".to_string(), Type::incomplete_array(Type::basic(Kind::Char))),
        ],
    );
    assert_eq!(sizeof(&v, &abi), 4);
    assert!(is_struct_has_fam(&v));
    assert!(is_known_const_size(&v));
}

// ---- S3: bitfield packing -----------------------------------------------------

#[test]
fn s3_bitfield_packing() {
    let abi = host();
    let unsigned = Type::unsigned(Type::basic(Kind::Int));
    let b = Type::struct_(
        "B".to_string(),
        vec![
            Member::new("a".to_string(), Type::bitfield(unsigned.clone(), 3)),
            Member::new("b".to_string(), Type::bitfield(unsigned.clone(), 5)),
            Member::new("c".to_string(), Type::bitfield(unsigned.clone(), 1)),
            Member::new(None, Type::bitfield(unsigned.clone(), 0)),
            Member::new("d".to_string(), Type::bitfield(unsigned.clone(), 4)),
        ],
    );
    let unit = sizeof(&unsigned, &abi);
    assert_eq!(offsetof(&b, "a", &abi), 0);
    assert_eq!(offsetof(&b, "b", &abi), 0);
    assert_eq!(offsetof(&b, "c", &abi), 0);
    assert_eq!(offsetof(&b, "d", &abi), unit);
    assert_eq!(sizeof(&b, &abi), unit * 2);
}

// ---- S4: self-referential struct via pointer -----------------------------------

#[test]
fn s4_self_referential_struct_compatible_not_identical() {
    let build = || {
        let n_incomplete = Type::struct_incomplete("N".to_string());
        let next_ptr = Type::pointer(n_incomplete);
        Type::struct_(
            "N".to_string(),
            vec![
                Member::new("v".to_string(), Type::basic(Kind::Int)),
                Member::new("next".to_string(), next_ptr),
            ],
        )
    };
    let n1 = build();
    let n2 = build();
    assert!(compatible(&n1, &n2));
    assert!(!identical(&n1, &n2));
    assert!(identical(&n1, &n1));
}

// ---- S5: arithmetic conversion --------------------------------------------------

#[test]
fn s5_usual_conversion_unsigned_long_wins() {
    let ulong = Type::unsigned(Type::basic(Kind::Long));
    let result = usual_conversion(&Type::basic(Kind::Int), &ulong);
    assert_eq!(classify(&result), Kind::Long);
    assert!(is_unsigned(&result));
}

#[test]
fn s5_usual_conversion_float_double() {
    let result = usual_conversion(&Type::basic(Kind::Float), &Type::basic(Kind::Double));
    assert_eq!(classify(&result), Kind::Double);
}

// ---- S6: composite of array types ------------------------------------------------

#[test]
fn s6_composite_array_types() {
    let a = Type::array(10, Type::basic(Kind::Int));
    let b = Type::incomplete_array(Type::basic(Kind::Int));
    assert!(compatible(&a, &b));
    let c = composite(&a, &b);
    assert_eq!(array_length(&c), 10);
    assert!(identical(&array_element(&c), &Type::basic(Kind::Int)));
}

// ---- invariant 1: identical/compatible are reflexive -----------------------------

#[rstest]
#[case(Type::basic(Kind::Int))]
#[case(Type::basic(Kind::Double))]
#[case(Type::pointer(Type::basic(Kind::Char)))]
#[case(Type::array(4, Type::basic(Kind::Int)))]
fn invariant_reflexive(#[case] t: Type) {
    assert!(identical(&t, &t));
    assert!(compatible(&t, &t));
}

// ---- invariant 2: unqualified is idempotent ---------------------------------------

#[test]
fn invariant_unqualified_idempotent() {
    let t = Type::const_(Type::volatile(Type::basic(Kind::Int)));
    let once = Type::unqualified(&t);
    let twice = Type::unqualified(&once);
    assert!(identical(&once, &twice));
}

// ---- invariant 3: promotion of sub-int rank --------------------------------------

#[rstest]
#[case(Type::basic(Kind::Bool))]
#[case(Type::basic(Kind::Char))]
#[case(Type::basic(Kind::Short))]
fn invariant_promotion_below_int_becomes_int(#[case] t: Type) {
    let promoted = int_promotion(&t);
    assert_eq!(classify(&promoted), Kind::Int);
    assert!(!is_unsigned(&promoted));
}

#[test]
fn invariant_promotion_at_int_rank_preserves_signedness() {
    let u = Type::unsigned(Type::basic(Kind::Int));
    let promoted = int_promotion(&u);
    assert_eq!(classify(&promoted), Kind::Int);
    assert!(is_unsigned(&promoted));
}

#[test]
fn invariant_promotion_above_int_rank_unchanged() {
    let t = Type::basic(Kind::LongLong);
    assert!(identical(&int_promotion(&t), &t));
}

// ---- invariant 4/5: struct size relationships ------------------------------------

#[test]
fn invariant_struct_size_covers_last_member() {
    let abi = host();
    let s = Type::struct_(
        "P".to_string(),
        vec![
            Member::new("x".to_string(), Type::basic(Kind::Int)),
            Member::new("y".to_string(), Type::basic(Kind::Double)),
        ],
    );
    let n = member_count(&s);
    let last_offset = offsetof_n(&s, n - 1, &abi);
    let last_size = sizeof(&member_type(&s, n - 1), &abi);
    assert!(sizeof(&s, &abi) >= last_offset + last_size);
}

#[rstest]
#[case(0)]
#[case(1)]
fn invariant_member_offset_aligned(#[case] index: usize) {
    let abi = host();
    let s = Type::struct_(
        "Q".to_string(),
        vec![
            Member::new("a".to_string(), Type::basic(Kind::Char)),
            Member::new("b".to_string(), Type::basic(Kind::Double)),
        ],
    );
    let off = offsetof_n(&s, index, &abi);
    let align = alignof(&member_type(&s, index), &abi);
    assert_eq!(off % align, 0);
}

// ---- invariant 6: unions always offset zero --------------------------------------

#[test]
fn invariant_union_offsets_are_zero() {
    let abi = host();
    let u = Type::union_(
        "U".to_string(),
        vec![
            Member::new("i".to_string(), Type::basic(Kind::Int)),
            Member::new("d".to_string(), Type::basic(Kind::Double)),
        ],
    );
    for i in 0..member_count(&u) {
        assert_eq!(offsetof_n(&u, i, &abi), 0);
    }
    assert_eq!(sizeof(&u, &abi), sizeof(&Type::basic(Kind::Double), &abi));
}

// ---- invariant 7: identical implies compatible; compatible+known-size implies same size --

#[test]
fn invariant_identical_implies_compatible() {
    // Unlike struct/union (nominal identity), two separately-built arrays
    // of the same length and element type are structurally identical.
    let t = Type::array(4, Type::basic(Kind::Int));
    let u = Type::array(4, Type::basic(Kind::Int));
    assert!(identical(&t, &u));
    assert!(compatible(&t, &u));
}

#[test]
fn invariant_compatible_known_size_same_size() {
    let abi = host();
    let a = Type::array(6, Type::basic(Kind::Int));
    let b = Type::incomplete_array(Type::basic(Kind::Int));
    assert!(compatible(&a, &b));
    let c = composite(&a, &b);
    assert_eq!(sizeof(&a, &abi), sizeof(&c, &abi));
}

// ---- invariant 8: usual conversion is commutative --------------------------------

#[rstest]
#[case(Type::basic(Kind::Int), Type::unsigned(Type::basic(Kind::Long)))]
#[case(Type::basic(Kind::Float), Type::basic(Kind::Double))]
#[case(Type::basic(Kind::Short), Type::basic(Kind::Short))]
fn invariant_usual_conversion_commutative(#[case] a: Type, #[case] b: Type) {
    let ab = usual_conversion(&a, &b);
    let ba = usual_conversion(&b, &a);
    assert!(identical(&ab, &ba));
}

// ---- invariant 9: dependency walk --------------------------------------------------

#[test]
fn invariant_dependency_walk_stops_at_compound_boundary() {
    let handle = Dependency::new(42u32);
    let vla = Type::variable_array(Type::basic(Kind::Int), handle);
    let ptr_to_vla = Type::pointer(vla);
    assert_eq!(dependencies(&ptr_to_vla), 1);
    assert_eq!(*get_dependency(&ptr_to_vla, 0).downcast_ref::<u32>().unwrap(), 42);

    // a VLA nested inside a struct member must not be counted: the walk
    // stops at the compound boundary (§4.B).
    let handle2 = Dependency::new(7u32);
    let inner_vla = Type::variable_array(Type::basic(Kind::Int), handle2);
    let s = Type::struct_("W".to_string(), vec![Member::new("buf".to_string(), inner_vla)]);
    assert_eq!(dependencies(&s), 0);
}

// ---- invariant 10: ref/free round trip is a clone/drop no-op ----------------------

#[test]
fn invariant_clone_drop_round_trip() {
    let t = Type::struct_("RT".to_string(), vec![Member::new("x".to_string(), Type::basic(Kind::Int))]);
    let cloned = t.clone();
    drop(cloned);
    assert!(identical(&t, &t));
    assert_eq!(member_count(&t), 1);
}

// ---- modifier flattening (§3 invariant 5) ------------------------------------------

#[test]
fn modifier_flattening_never_nests() {
    let t = Type::const_(Type::volatile(Type::basic(Kind::Int)));
    assert!(is_const(&t));
    assert!(is_volatile(&t));
    // A second const application must not wrap again; flags merge into
    // the same Modified node's base.
    let t2 = Type::const_(t.clone());
    assert!(Type::ptr_eq(&t, &t2) || identical(&t, &t2));
}

#[test]
fn modifier_unqualified_preserves_unsigned_and_bitfield() {
    let t = Type::bitfield(Type::unsigned(Type::basic(Kind::Int)), 3);
    let t = Type::const_(t);
    let unq = Type::unqualified(&t);
    assert!(!is_const(&unq));
    assert!(is_unsigned(&unq));
    assert!(is_bitfield(&unq));
    assert_eq!(bitfield_bits(&unq), 3);
}

#[test]
fn real_strips_only_complex() {
    let complex_double = Type::complex(Type::basic(Kind::Double));
    let real = Type::real(&complex_double);
    assert!(!is_complex(&real));
    assert_eq!(classify(&real), Kind::Double);
    // no-op on a non-complex term
    let plain = Type::basic(Kind::Int);
    assert!(identical(&Type::real(&plain), &plain));
}

// ---- component B: classification and family predicates ----------------------------

#[rstest]
#[case(Kind::Int, true, false)]
#[case(Kind::Float, false, true)]
#[case(Kind::Bool, true, false)]
fn family_predicates(#[case] kind: Kind, #[case] integer_like: bool, #[case] float_like: bool) {
    let t = Type::basic(kind);
    assert_eq!(is_arithmetic(&t), true);
    if kind != Kind::Bool {
        assert_eq!(is_integer(&t), integer_like);
    }
    assert_eq!(is_float(&t), float_like);
}

#[test]
fn category_atomic_overrides_kind_category() {
    let t = Type::atomic(Type::basic(Kind::Int));
    assert_eq!(category(&t), Category::Atomic);
    assert_eq!(classify(&t), Kind::Int);
}

#[test]
fn incomplete_enum_is_still_complete() {
    // SPEC_FULL §4.B: an Enum term's is_complete is always true, even
    // when built via the incomplete constructor.
    let e = Type::enum_incomplete("E".to_string());
    assert!(is_complete(&e));
}

#[test]
fn rank_ordering() {
    assert!(rank(&Type::basic(Kind::Bool)) < rank(&Type::basic(Kind::Char)));
    assert_eq!(rank(&Type::basic(Kind::Char)), rank(&Type::basic(Kind::SChar)));
    assert!(rank(&Type::basic(Kind::Char)) < rank(&Type::basic(Kind::Short)));
    assert_eq!(rank(&Type::basic(Kind::Enum)), rank(&Type::basic(Kind::Int)));
    assert!(rank(&Type::basic(Kind::Int)) < rank(&Type::basic(Kind::Long)));
    assert!(rank(&Type::basic(Kind::Long)) < rank(&Type::basic(Kind::LongLong)));
}

// ---- function compatibility with an unprototyped side ------------------------------

#[test]
fn function_compatible_when_one_side_unprototyped() {
    let proto = Type::function(Type::basic(Kind::Int), vec![Type::basic(Kind::Int), Type::basic(Kind::Char)]);
    let old_style = Type::function_unprototyped(Type::basic(Kind::Int));
    assert!(compatible(&proto, &old_style));
    assert!(!identical(&proto, &old_style));
}

#[test]
fn function_composite_adopts_the_prototyped_side() {
    let proto = Type::function(Type::basic(Kind::Int), vec![Type::basic(Kind::Int)]);
    let old_style = Type::function_unprototyped(Type::basic(Kind::Int));
    let c = composite(&proto, &old_style);
    assert!(function_arguments(&c).is_some());
    assert_eq!(member_count(&function_arguments(&c).unwrap()), 1);
}

// ---- enum/int bridge ------------------------------------------------------------------

#[test]
fn enum_compatible_with_int_either_direction() {
    let e = Type::enum_("Color".to_string(), vec![("Red".to_string(), 0), ("Blue".to_string(), 1)]);
    let i = Type::basic(Kind::Int);
    assert!(compatible(&e, &i));
    assert!(compatible(&i, &e));
    assert!(!identical(&e, &i));
}

// ---- printer: a representative declaration round trip -------------------------------

#[test]
fn printer_formats_pointer_to_array_of_pointers() {
    let inner = Type::pointer(Type::basic(Kind::Char));
    let arr = Type::array(4, inner);
    let ptr_to_arr = Type::pointer(arr);
    let text = crate::printer::format_declaration(&ptr_to_arr, Some("x"));
    assert_eq!(text, "char *(*x)[4]");
}

#[test]
fn printer_formats_simple_struct() {
    let s = Type::struct_("S".to_string(), vec![Member::new("a".to_string(), Type::basic(Kind::Int))]);
    assert_eq!(crate::printer::format_declaration(&s, Some("v")), "struct S v");
}

#[test]
fn printer_formats_function_pointer() {
    let f = Type::function(Type::basic(Kind::Void), vec![Type::basic(Kind::Int)]);
    let fp = Type::pointer(f);
    let text = crate::printer::format_declaration(&fp, Some("cb"));
    assert_eq!(text, "void (*cb)(int)");
}

// ---- is_modifiable ---------------------------------------------------------------------

#[test]
fn is_modifiable_false_for_const_member() {
    let s = Type::struct_(
        "M".to_string(),
        vec![Member::new("a".to_string(), Type::const_(Type::basic(Kind::Int)))],
    );
    assert!(!is_modifiable(&s));
}

#[test]
fn is_modifiable_false_for_array_and_incomplete() {
    assert!(!is_modifiable(&Type::array(4, Type::basic(Kind::Int))));
    assert!(!is_modifiable(&Type::struct_incomplete("Inc".to_string())));
}

#[test]
fn is_modifiable_true_for_struct_with_array_of_const_element() {
    // `struct M { const int a[4]; }`: the member's type is an array
    // whose *element* is const-qualified, not the array itself.
    // type_const_recurse_p never descends into an array element, only
    // compound members, so this doesn't make the enclosing struct
    // unmodifiable.
    let s = Type::struct_(
        "M2".to_string(),
        vec![Member::new("a".to_string(), Type::array(4, Type::const_(Type::basic(Kind::Int))))],
    );
    assert!(is_modifiable(&s));
}

// ---- is_known_const_size: array element recursion ------------------------------------------

#[test]
fn is_known_const_size_false_for_array_of_incomplete_array() {
    let t = Type::array(4, Type::incomplete_array(Type::basic(Kind::Char)));
    assert!(!is_known_const_size(&t));
}

#[test]
fn is_known_const_size_true_for_array_of_known_const_size_element() {
    let t = Type::array(4, Type::basic(Kind::Int));
    assert!(is_known_const_size(&t));
}

// ---- AbiTable construction ----------------------------------------------------------------

#[test]
fn abi_table_try_new_rejects_missing_kinds() {
    let result = AbiTable::try_new(vec![(Kind::Int, crate::abi::AbiEntry::new(4, 4))]);
    assert!(result.is_err());
}

#[test]
fn abi_table_host_has_every_required_entry() {
    let abi = AbiTable::host();
    for kind in crate::abi::REQUIRED_KINDS {
        let entry = abi.entry(*kind);
        assert!(entry.size > 0);
        assert!(entry.align > 0);
    }
}

//! Component D — the ABI layout engine (§4.D): `sizeof`, `alignof`,
//! `offsetof_n`/`offsetof`, `widthof`, all parametrised by an explicit
//! [`AbiTable`] reference rather than a process-wide singleton (§9 notes
//! this is an equivalent, more testable, restatement of the same
//! contract).

use std::collections::HashMap;
use std::sync::OnceLock;

use anyhow::{bail, Result};

use crate::inspect::*;
use crate::kind::{Category, Kind};
use crate::term::Type;

/// `(size, alignment)` in bytes for one arithmetic/enum/pointer kind
/// (§6 "ABI table").
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AbiEntry {
    pub size: u64,
    pub align: u64,
}

impl AbiEntry {
    pub const fn new(size: u64, align: u64) -> Self {
        AbiEntry { size, align }
    }
}

/// Every kind an `AbiTable` must describe (§6): the arithmetic kinds,
/// `Enum`, and `Pointer`.
pub const REQUIRED_KINDS: &[Kind] = &[
    Kind::Bool,
    Kind::Char,
    Kind::SChar,
    Kind::Short,
    Kind::Int,
    Kind::Long,
    Kind::LongLong,
    Kind::Float,
    Kind::Double,
    Kind::LongDouble,
    Kind::Pointer,
    Kind::Enum,
];

/// A target description: `kind -> (size, alignment)` (§6). The one
/// genuinely fallible entry point in the whole crate lives here —
/// building a table for a non-host target from caller-supplied entries —
/// everything else in the algebra panics on misuse per §7.
#[derive(Debug, Clone)]
pub struct AbiTable {
    entries: HashMap<Kind, AbiEntry>,
}

impl AbiTable {
    /// Build a table from caller-supplied entries, failing if any
    /// required kind (`REQUIRED_KINDS`) is missing.
    pub fn try_new(entries: impl IntoIterator<Item = (Kind, AbiEntry)>) -> Result<Self> {
        let entries: HashMap<Kind, AbiEntry> = entries.into_iter().collect();
        for kind in REQUIRED_KINDS {
            if !entries.contains_key(kind) {
                bail!("AbiTable is missing an entry for {kind:?}");
            }
        }
        Ok(AbiTable { entries })
    }

    /// Derive a table from `core::mem::size_of`/`align_of` on the
    /// compilation target (§6 "Hosts targeting the compilation machine
    /// populate it from native measurements").
    ///
    /// The reference `abi_host` table never populates `LongDouble`
    /// (SPEC_FULL §4.D records this as an omission, not a deliberate
    /// gap); this table fills it in using the widest native float the
    /// host provides.
    pub fn host() -> Self {
        let mut entries = HashMap::new();
        entries.insert(Kind::Bool, AbiEntry::new(std::mem::size_of::<bool>() as u64, std::mem::align_of::<bool>() as u64));
        entries.insert(Kind::Char, AbiEntry::new(std::mem::size_of::<std::ffi::c_char>() as u64, std::mem::align_of::<std::ffi::c_char>() as u64));
        entries.insert(Kind::SChar, AbiEntry::new(std::mem::size_of::<i8>() as u64, std::mem::align_of::<i8>() as u64));
        entries.insert(Kind::Short, AbiEntry::new(std::mem::size_of::<std::ffi::c_short>() as u64, std::mem::align_of::<std::ffi::c_short>() as u64));
        entries.insert(Kind::Int, AbiEntry::new(std::mem::size_of::<std::ffi::c_int>() as u64, std::mem::align_of::<std::ffi::c_int>() as u64));
        entries.insert(Kind::Long, AbiEntry::new(std::mem::size_of::<std::ffi::c_long>() as u64, std::mem::align_of::<std::ffi::c_long>() as u64));
        entries.insert(Kind::LongLong, AbiEntry::new(std::mem::size_of::<std::ffi::c_longlong>() as u64, std::mem::align_of::<std::ffi::c_longlong>() as u64));
        entries.insert(Kind::Float, AbiEntry::new(std::mem::size_of::<f32>() as u64, std::mem::align_of::<f32>() as u64));
        entries.insert(Kind::Double, AbiEntry::new(std::mem::size_of::<f64>() as u64, std::mem::align_of::<f64>() as u64));
        // f64 is the widest native float Rust exposes; this host doesn't
        // have a distinct extended-precision type, so LongDouble is
        // modelled as double-width (16 bytes), matching the common
        // x86-64 System V `long double` size without claiming its exact
        // bit layout (irrelevant to this crate, which only ever reports
        // size/alignment, never bit patterns).
        entries.insert(Kind::LongDouble, AbiEntry::new(16, 16));
        entries.insert(Kind::Pointer, AbiEntry::new(std::mem::size_of::<usize>() as u64, std::mem::align_of::<usize>() as u64));
        entries.insert(Kind::Enum, AbiEntry::new(std::mem::size_of::<std::ffi::c_int>() as u64, std::mem::align_of::<std::ffi::c_int>() as u64));
        AbiTable { entries }
    }

    pub fn entry(&self, kind: Kind) -> AbiEntry {
        *self
            .entries
            .get(&kind)
            .unwrap_or_else(|| panic!("AbiTable has no entry for {kind:?}"))
    }
}

static HOST_TABLE: OnceLock<AbiTable> = OnceLock::new();

/// The process-wide, read-only host table (§5 "global resources"). Most
/// callers should prefer passing an explicit `&AbiTable` (see module
/// docs); this exists for callers that genuinely want the singleton.
pub fn host_table() -> &'static AbiTable {
    HOST_TABLE.get_or_init(AbiTable::host)
}

/// §4.D `sizeof`. Requires [`is_known_const_size`]; function and atomic
/// types are unsupported and always fail-fast (§7, §9 open questions).
pub fn sizeof(t: &Type, abi: &AbiTable) -> u64 {
    assert!(is_known_const_size(t), "sizeof(): type is not of known constant size");
    match category(t) {
        Category::Atomic => panic!("sizeof(): atomic types are unsupported (see §9 open questions)"),
        Category::Function => panic!("sizeof(): a function type has no size"),
        Category::Pointer => {
            let base = abi.entry(Kind::Pointer).size;
            if is_wide(&pointer_referenced(t)) {
                base * 2
            } else {
                base
            }
        }
        Category::Array => array_length(t) * sizeof(&array_element(t), abi),
        Category::Union => (0..member_count(t)).map(|i| sizeof(&member_type(t, i), abi)).max().unwrap_or(0),
        Category::Struct => {
            let n = member_count(t);
            if n == 0 {
                0
            } else if is_struct_has_fam(t) {
                offsetof_n(t, n - 1, abi)
            } else {
                offsetof_n(t, n - 1, abi) + sizeof(&member_type(t, n - 1), abi)
            }
        }
        Category::SelfCategory => {
            if is_complex(t) {
                2 * sizeof(&Type::real(t), abi)
            } else {
                abi.entry(classify(t)).size
            }
        }
    }
}

/// §4.D `alignof`.
pub fn alignof(t: &Type, abi: &AbiTable) -> u64 {
    match category(t) {
        Category::Atomic => panic!("alignof(): atomic types are unsupported (see §9 open questions)"),
        Category::Function => panic!("alignof(): a function type has no alignment"),
        Category::Union | Category::Struct => {
            (0..member_count(t)).map(|i| alignof(&member_type(t, i), abi)).max().unwrap_or(1)
        }
        Category::Array => alignof(&array_element(t), abi),
        Category::Pointer => abi.entry(Kind::Pointer).align,
        Category::SelfCategory => abi.entry(classify(t)).align,
    }
}

/// The currently-open bitfield storage unit while scanning a struct's
/// members (§4.D step 1/2).
struct OpenUnit {
    unit_size: u64,
    bits_remaining: u64,
}

/// §4.D `offsetof_n`: the byte offset of the *i*-th member (0-indexed).
/// Unions always return 0. Implements the deferred-commit procedure
/// spec.md describes in prose (track a running byte sum plus a "currently
/// open storage unit"), *not* the reference implementation's literal
/// per-member loop — SPEC_FULL §4.D traces why the literal loop
/// mis-reports the offset of a bitfield member that continues a previous
/// storage unit (confirmed against §8 scenario S3).
pub fn offsetof_n(t: &Type, index: usize, abi: &AbiTable) -> u64 {
    assert!(matches!(category(t), Category::Struct | Category::Union), "offsetof_n(): not a struct/union type");
    if category(t) == Category::Union {
        return 0;
    }
    let n = member_count(t);
    assert!(index < n, "offsetof_n(): member index out of range");

    let mut sum: u64 = 0;
    let mut open: Option<OpenUnit> = None;

    for i in 0..=index {
        let member = member_type(t, i);
        let bits = if is_bitfield(&member) { Some(bitfield_bits(&member) as u64) } else { None };

        if let (Some(k), Some(unit)) = (bits, open.as_mut()) {
            if k > 0 && unit.bits_remaining >= k {
                unit.bits_remaining -= k;
                if i == index {
                    return sum;
                }
                continue;
            }
        }

        // Opening a new storage unit: close whatever was open before it.
        if let Some(unit) = open.take() {
            sum += unit.unit_size;
        }
        let align = alignof(&member, abi).max(1);
        let pad = (align - sum % align) % align;
        sum += pad;
        let offset = sum;

        if i == index {
            return offset;
        }

        match bits {
            Some(0) => {
                // A zero-width bitfield forces a new unit for whatever
                // follows, but occupies no storage itself (§4.D step 1).
                open = None;
            }
            Some(k) => {
                let unit_size = sizeof(&member, abi);
                open = Some(OpenUnit { unit_size, bits_remaining: unit_size * 8 - k });
            }
            None => {
                // Never sized here when it's the member being queried: a
                // struct's trailing flexible array member is exempt from
                // `is_known_const_size` (§8 scenario S2), and `sizeof`
                // would panic on it. Advancing `sum` past this member is
                // only needed to locate a *later* member, so it's safe to
                // skip once the caller's target has already been returned
                // above.
                sum += sizeof(&member, abi);
            }
        }
    }
    unreachable!("offsetof_n(): loop must return at the target index")
}

/// §4.D `offsetof`: linear scan of member names, then delegate to
/// `offsetof_n`.
pub fn offsetof(t: &Type, name: &str, abi: &AbiTable) -> u64 {
    let n = member_count(t);
    for i in 0..n {
        if member_name(t, i).as_deref() == Some(name) {
            return offsetof_n(t, i, abi);
        }
    }
    panic!("offsetof(): no member named {name:?}");
}

/// §4.D `widthof`: the bit width of a bitfield, 1 for `Bool`, otherwise
/// `sizeof(t) * CHAR_BIT`.
pub fn widthof(t: &Type, abi: &AbiTable) -> u64 {
    if is_bitfield(t) {
        return bitfield_bits(t) as u64;
    }
    if classify(t) == Kind::Bool {
        return 1;
    }
    sizeof(t, abi) * 8
}

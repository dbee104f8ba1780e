//! The printer — a pure consumer of component B (§1, §6). Converts a type
//! term to a C-syntax declaration string, the same role `print.c` plays
//! against `type.c`'s public header in the reference implementation: it
//! only calls [`crate::inspect`]'s public projections and never reaches
//! into a term's private representation.

use std::fmt;

use crate::inspect::*;
use crate::kind::Kind;
use crate::term::Type;

fn basic_name(t: &Type) -> String {
    match classify(t) {
        Kind::Void => "void".to_string(),
        Kind::Bool => "_Bool".to_string(),
        Kind::Char => "char".to_string(),
        Kind::SChar => "signed char".to_string(),
        Kind::Short => format!("{}short", if is_unsigned(t) { "unsigned " } else { "" }),
        Kind::Int => format!("{}{}int", if is_unsigned(t) { "unsigned " } else { "" }, if is_complex(t) { "_Complex " } else { "" }),
        Kind::Long => format!("{}long", if is_unsigned(t) { "unsigned " } else { "" }),
        Kind::LongLong => format!("{}long long", if is_unsigned(t) { "unsigned " } else { "" }),
        Kind::Float => format!("{}float", if is_complex(t) { "_Complex " } else { "" }),
        Kind::Double => format!("{}double", if is_complex(t) { "_Complex " } else { "" }),
        Kind::LongDouble => format!("{}long double", if is_complex(t) { "_Complex " } else { "" }),
        Kind::Enum => match compound_tag(t) {
            Some(tag) => format!("enum {tag}"),
            None => "enum <anonymous>".to_string(),
        },
        other => unreachable!("basic_name(): {other:?} is not a basic/enum kind"),
    }
}

fn qualifiers_prefix(t: &Type) -> String {
    let mut quals = Vec::new();
    if is_atomic(t) {
        quals.push("_Atomic");
    }
    if is_const(t) {
        quals.push("const");
    }
    if is_volatile(t) {
        quals.push("volatile");
    }
    if is_restrict(t) {
        quals.push("restrict");
    }
    if quals.is_empty() {
        String::new()
    } else {
        format!("{} ", quals.join(" "))
    }
}

fn compound_keyword_name(t: &Type) -> String {
    let keyword = match classify(t) {
        Kind::Struct => "struct",
        Kind::Union => "union",
        other => unreachable!("compound_keyword_name(): {other:?} is not a struct/union kind"),
    };
    match compound_tag(t) {
        Some(tag) => format!("{keyword} {tag}"),
        None => format!("{keyword} <anonymous>"),
    }
}

/// The base type string a declarator wraps around — everything to the
/// left of the identifier for a simple (non-derived) type.
fn base_spelling(t: &Type) -> String {
    let qualified = qualifiers_prefix(t);
    match classify(t) {
        Kind::Struct | Kind::Union => format!("{qualified}{}", compound_keyword_name(t)),
        _ => format!("{qualified}{}", basic_name(t)),
    }
}

/// Build the declarator string, working from the innermost identifier
/// outward exactly the way a recursive-descent C declaration printer
/// must (pointers bind right-to-left, arrays/functions bind left-to-right
/// and need parentheses when following a pointer). Dispatches on
/// `classify` rather than `category` so an `_Atomic`-qualified pointer,
/// array or function still unwraps to its derived shape — `category`
/// folding those into `Atomic` is correct for the equivalence algebra
/// (§4.C) but would stop the declarator here if used for printing.
fn declarator(t: &Type, inner: String, needs_parens: bool) -> (Type, String) {
    match classify(t) {
        Kind::Pointer => {
            let referent = pointer_referenced(t);
            let star = format!("*{}{}", qualifiers_prefix(t), inner);
            let wrapped = if matches!(classify(&referent), Kind::Array | Kind::Function) {
                format!("({star})")
            } else {
                star
            };
            declarator(&referent, wrapped, false)
        }
        Kind::Array => {
            let element = array_element(t);
            let len = if is_array_vla(t) {
                "*".to_string()
            } else if is_complete(t) {
                array_length(t).to_string()
            } else {
                String::new()
            };
            let here = if needs_parens { format!("({inner})[{len}]") } else { format!("{inner}[{len}]") };
            declarator(&element, here, false)
        }
        Kind::Function => {
            let ret = function_return(t);
            let params = match function_arguments(t) {
                None => "()".to_string(),
                Some(args) => {
                    let n = member_count(&args);
                    if n == 0 {
                        "(void)".to_string()
                    } else {
                        let parts: Vec<String> = (0..n)
                            .map(|i| {
                                let pty = member_type(&args, i);
                                match member_name(&args, i) {
                                    Some(name) => format_declaration(&pty, Some(&name)),
                                    None => format_type(&pty),
                                }
                            })
                            .collect();
                        format!("({})", parts.join(", "))
                    }
                }
            };
            let here = if needs_parens { format!("({inner}){params}") } else { format!("{inner}{params}") };
            declarator(&ret, here, false)
        }
        _ => (t.clone(), inner),
    }
}

/// `format_type(&Type) -> String`: the type alone, with no declarator
/// identifier (used e.g. for an unnamed function parameter).
pub fn format_type(t: &Type) -> String {
    format_declaration(t, None)
}

/// `format_declaration(&Type, Option<&str>) -> String`: a full C-syntax
/// declaration, e.g. `int *const x[3]` for `x` of that type.
pub fn format_declaration(t: &Type, name: Option<&str>) -> String {
    let ident = name.unwrap_or("").to_string();
    let (base, decl) = declarator(t, ident, false);
    let base_str = base_spelling(&base);
    if decl.is_empty() {
        base_str
    } else {
        format!("{base_str} {decl}")
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&format_type(self))
    }
}

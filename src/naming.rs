//! Type-driven method names.
//!
//! `Task<Widget> Load()` reads better as `GetWidgetAsync()`. The name is
//! derived from the resolved return type and offered only when no other
//! member of the containing type already uses it.

use crate::cancel::{self, CancellationToken};
use crate::semantics::{
    SemanticError, SemanticModel, SpecialType, Symbol, TypeKind, TypeSymbol, WellKnownType,
};
use tracing::debug;

const VERB: &str = "Get";
const ASYNC_SUFFIX: &str = "Async";

/// Generic collections named after their element type, in plural.
const COLLECTIONS: &[(&str, &str, usize)] = &[
    ("System.Collections.Generic", "IEnumerable", 1),
    ("System.Collections.Generic", "ICollection", 1),
    ("System.Collections.Generic", "IList", 1),
    ("System.Collections.Generic", "IReadOnlyCollection", 1),
    ("System.Collections.Generic", "IReadOnlyList", 1),
    ("System.Collections.Generic", "ISet", 1),
    ("System.Collections.Generic", "List", 1),
    ("System.Collections.Generic", "HashSet", 1),
];

fn is_well_known(semantics: &dyn SemanticModel, ty: &TypeSymbol, which: WellKnownType) -> bool {
    semantics
        .well_known_type(which)
        .is_some_and(|known| known.same_definition(ty))
}

/// Identifier fragment describing `ty`, or `None` when the type has no
/// sensible name (a result-less `Task`, type parameters, tuples).
pub fn derive_name(ty: &TypeSymbol, semantics: &dyn SemanticModel) -> Option<String> {
    let is_plain_task = !ty.is_constructed()
        && (is_well_known(semantics, ty, WellKnownType::Task)
            || is_well_known(semantics, ty, WellKnownType::ValueTask));
    if is_plain_task {
        return None;
    }
    if let Some(definition) = ty.constructed_from() {
        if is_well_known(semantics, &definition, WellKnownType::TaskOfT)
            || is_well_known(semantics, &definition, WellKnownType::ValueTaskOfT)
        {
            return name_of(ty.type_arguments.first()?, semantics);
        }
    }
    name_of(ty, semantics)
}

fn name_of(ty: &TypeSymbol, semantics: &dyn SemanticModel) -> Option<String> {
    match ty.kind {
        TypeKind::TypeParameter
        | TypeKind::Tuple
        | TypeKind::Dynamic
        | TypeKind::Error
        | TypeKind::Pointer => return None,
        TypeKind::Array => {
            let element = ty.element_type.as_deref()?;
            return name_of(element, semantics).map(|name| pluralize(&name));
        }
        _ => {}
    }
    if ty.special == SpecialType::Void {
        return None;
    }
    if let Some(runtime) = ty.special.runtime_name() {
        return Some(runtime.to_string());
    }

    if let Some(definition) = ty.constructed_from() {
        if is_well_known(semantics, &definition, WellKnownType::NullableOfT) {
            return name_of(ty.type_arguments.first()?, semantics);
        }
        let is_collection = COLLECTIONS.iter().any(|(ns, name, arity)| {
            definition.namespace.as_deref() == Some(*ns)
                && definition.name == *name
                && definition.arity == *arity
        });
        if is_collection {
            return name_of(ty.type_arguments.first()?, semantics).map(|name| pluralize(&name));
        }
    }

    let name = if ty.kind == TypeKind::Interface {
        strip_interface_prefix(&ty.name)
    } else {
        &ty.name
    };
    (!name.is_empty()).then(|| upper_first(name))
}

/// `IWidget` to `Widget`; `Item` and `I` stay as they are.
fn strip_interface_prefix(name: &str) -> &str {
    let mut chars = name.chars();
    match (chars.next(), chars.next()) {
        (Some('I'), Some(second)) if second.is_uppercase() => &name[1..],
        _ => name,
    }
}

fn upper_first(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// English plural of a type name.
pub fn pluralize(name: &str) -> String {
    let lower = name.to_ascii_lowercase();
    if let Some(stem) = name.strip_suffix('y') {
        let before = stem.chars().last().map(|c| c.to_ascii_lowercase());
        if !matches!(before, Some('a' | 'e' | 'i' | 'o' | 'u') | None) {
            return format!("{stem}ies");
        }
    }
    if lower.ends_with('s') || lower.ends_with('x') || lower.ends_with("ch") || lower.ends_with("sh")
    {
        return format!("{name}es");
    }
    format!("{name}s")
}

/// `Get` + derived name + `Async` for async methods.
pub fn method_name_for(method: &Symbol, fragment: &str) -> String {
    let mut name = format!("{VERB}{fragment}");
    if method.is_async {
        name.push_str(ASYNC_SUFFIX);
    }
    name
}

/// Whether renaming `symbol` to `candidate` should be offered.
///
/// False when the name would not change (ordinal comparison) or when
/// another member of the containing type already uses it.
pub async fn propose_rename(
    semantics: &dyn SemanticModel,
    symbol: &Symbol,
    candidate: &str,
    cancel: &CancellationToken,
) -> Result<bool, SemanticError> {
    cancel::check(cancel)?;
    if symbol.name == candidate {
        return Ok(false);
    }
    let unique = semantics
        .is_unique_member_name(symbol, candidate, cancel)
        .await?;
    if !unique {
        debug!(from = %symbol.name, to = candidate, "rename withheld: name collision");
    }
    Ok(unique)
}

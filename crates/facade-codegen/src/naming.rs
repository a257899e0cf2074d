//! Python identifier helpers for generated classes and aliases.

use facade_core::NamespaceName;
use std::collections::BTreeSet;

/// Converts a snake_case or kebab-case name to PascalCase.
///
/// Each word is capitalized the way Python's `str.capitalize` does it: the
/// first character is uppercased and the rest lowercased.
///
/// # Examples
///
/// ```
/// use facade_codegen::naming::to_pascal_case;
///
/// assert_eq!(to_pascal_case("projects"), "Projects");
/// assert_eq!(to_pascal_case("user_accounts"), "UserAccounts");
/// assert_eq!(to_pascal_case("pet-store"), "PetStore");
/// assert_eq!(to_pascal_case("HTTP_api"), "HttpApi");
/// ```
#[must_use]
pub fn to_pascal_case(name: &str) -> String {
    name.split(['_', '-'])
        .map(|word| {
            let mut chars = word.chars();
            chars.next().map_or_else(String::new, |first| {
                first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect()
            })
        })
        .collect()
}

/// Class name of the sub-facade for `namespace`, e.g. `_ProjectsNamespace`.
#[must_use]
pub fn namespace_class_name(namespace: &NamespaceName) -> String {
    format!("_{}Namespace", to_pascal_case(namespace.as_str()))
}

/// Module alias used to reach an endpoint, e.g. `_ep_projects_list_projects`.
#[must_use]
pub fn endpoint_alias(namespace: &NamespaceName, endpoint: &str) -> String {
    format!("_ep_{namespace}_{endpoint}")
}

/// Claims `base` in `taken`, or `base_2`, `base_3`, ... if it is already
/// used.
///
/// # Examples
///
/// ```
/// use facade_codegen::naming::claim_unique;
/// use std::collections::BTreeSet;
///
/// let mut taken = BTreeSet::new();
/// assert_eq!(claim_unique(&mut taken, "_ep_a_b_c"), "_ep_a_b_c");
/// assert_eq!(claim_unique(&mut taken, "_ep_a_b_c"), "_ep_a_b_c_2");
/// ```
pub fn claim_unique(taken: &mut BTreeSet<String>, base: &str) -> String {
    let mut candidate = base.to_string();
    let mut counter = 2;
    while !taken.insert(candidate.clone()) {
        candidate = format!("{base}_{counter}");
        counter += 1;
    }
    candidate
}

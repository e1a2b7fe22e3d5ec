//! Deterministic rendering of a resolved dependency map as a text tree.
//!
//! The output layout is part of the user-visible contract (snapshot-tested
//! downstream), so every glyph and marker here is stable byte-for-byte.

use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet};

use klink_model::dependency::{DependencyId, DependencyVersion, ResolvedDependency, ResolvedModules};

const UNKNOWN_VERSION: &str = "unknown";
const PROBLEM_MARKER: &str = "^^^ This is a problem module.";
const OMITTED_MARKER: &str = " (*)";
const OMITTED_LEGEND: &str = "\n\n(*) - dependencies omitted (listed previously)";

const STDLIB_NAME: &str = "stdlib";
const KOTLIN_LIBRARY_PREFIX: &str = "org.jetbrains.kotlin";

fn is_kotlin_library(id: &DependencyId) -> bool {
    id.name() == STDLIB_NAME || id.name().starts_with(KOTLIN_LIBRARY_PREFIX)
}

/// Default module ordering for callers that do not bring their own:
/// project libraries first, Kotlin-provided libraries (stdlib and
/// `org.jetbrains.kotlin*`) last, alphabetical within each group.
pub fn default_module_order(a: &DependencyId, b: &DependencyId) -> Ordering {
    is_kotlin_library(a)
        .cmp(&is_kotlin_library(b))
        .then_with(|| a.name().cmp(b.name()))
}

/// One pending traversal step. `last_bits` holds the "is this the last
/// sibling" flag of every ancestor level, innermost last; the prefixes for
/// both regular and marker lines derive from it.
struct Entry<'a> {
    module: &'a ResolvedDependency,
    /// The module this entry was reached from; the source root at level one.
    incoming: DependencyId,
    last_bits: Vec<bool>,
}

/// Render the resolved map as an indented tree rooted at the source root's
/// direct children.
///
/// The caller-supplied comparator fixes sibling order, making the output
/// invariant to map iteration order. Each module's full subtree is rendered
/// only on its first encounter across the whole traversal; later
/// encounters show the bare label with a repetition marker, which keeps
/// diamonds and cycles finite. If `problem_module` is given, its line gets
/// a marker line directly beneath it. The source root sentinel never
/// matches a rendered node, so passing it yields no marker.
pub fn render_dependency_tree(
    modules: &ResolvedModules,
    problem_module: Option<&DependencyId>,
    comparator: impl Fn(&DependencyId, &DependencyId) -> Ordering,
) -> String {
    let mut out = String::from("Project dependencies:");

    // incoming dependency id -> modules that recorded it as a requester
    let mut children: BTreeMap<&DependencyId, Vec<&ResolvedDependency>> = BTreeMap::new();
    for module in modules.values() {
        for incoming in module.requested_versions.keys() {
            children.entry(incoming).or_default().push(module);
        }
    }

    let root = DependencyId::source_root();
    let first_level: Vec<&ResolvedDependency> = children
        .get(&root)
        .map(|modules| {
            modules
                .iter()
                .filter(|module| module.visible_as_first_level)
                .copied()
                .collect()
        })
        .unwrap_or_default();
    if first_level.is_empty() {
        out.push_str(" <empty>");
        return out;
    }

    let sort = |modules: &mut Vec<&ResolvedDependency>| {
        modules.sort_by(|a, b| comparator(&a.id, &b.id));
    };

    let mut stack: Vec<Entry<'_>> = Vec::new();
    let mut first_level = first_level;
    sort(&mut first_level);
    push_children(&mut stack, first_level, &root, &[]);

    let mut rendered: BTreeSet<&DependencyId> = BTreeSet::new();
    let mut dependencies_omitted = false;

    while let Some(entry) = stack.pop() {
        out.push('\n');
        out.push_str(&regular_line_prefix(&entry.last_bits));
        out.push_str(entry.module.id.name());

        let requested = entry
            .module
            .requested_versions
            .get(&entry.incoming)
            .cloned()
            .unwrap_or_default();
        let selected = &entry.module.selected_version;
        if !requested.is_unknown() || !selected.is_unknown() {
            out.push_str(": ");
            out.push_str(display_version(&requested));
            if requested != *selected {
                out.push_str(" -> ");
                out.push_str(display_version(selected));
            }
        }

        if problem_module == Some(&entry.module.id) {
            out.push('\n');
            out.push_str(&marker_line_prefix(&entry.last_bits));
            out.push_str(PROBLEM_MARKER);
        }

        let module_children = children.get(&entry.module.id);
        if rendered.insert(&entry.module.id) {
            // First encounter: also descend into dependencies.
            if let Some(module_children) = module_children {
                let mut module_children = module_children.clone();
                sort(&mut module_children);
                push_children(
                    &mut stack,
                    module_children,
                    &entry.module.id,
                    &entry.last_bits,
                );
            }
        } else if module_children.is_some_and(|deps| !deps.is_empty()) {
            dependencies_omitted = true;
            out.push_str(OMITTED_MARKER);
        }
    }

    if dependencies_omitted {
        out.push_str(OMITTED_LEGEND);
    }

    out
}

/// Push sorted children in reverse so the stack pops them in order,
/// extending the ancestor bits with each child's own "is last" flag.
fn push_children<'a>(
    stack: &mut Vec<Entry<'a>>,
    sorted: Vec<&'a ResolvedDependency>,
    incoming: &DependencyId,
    ancestor_bits: &[bool],
) {
    let count = sorted.len();
    for (index, module) in sorted.into_iter().enumerate().rev() {
        let mut last_bits = ancestor_bits.to_vec();
        last_bits.push(index + 1 == count);
        stack.push(Entry {
            module,
            incoming: incoming.clone(),
            last_bits,
        });
    }
}

fn display_version(version: &DependencyVersion) -> &str {
    if version.is_unknown() {
        UNKNOWN_VERSION
    } else {
        version.as_str()
    }
}

fn regular_line_prefix(last_bits: &[bool]) -> String {
    let mut prefix = String::new();
    for (index, last) in last_bits.iter().enumerate() {
        if index + 1 == last_bits.len() {
            prefix.push_str(if *last { "\u{2514}\u{2500}\u{2500}\u{2500} " } else { "\u{251C}\u{2500}\u{2500}\u{2500} " });
        } else {
            prefix.push_str(if *last { "     " } else { "\u{2502}    " });
        }
    }
    prefix
}

fn marker_line_prefix(last_bits: &[bool]) -> String {
    last_bits
        .iter()
        .map(|last| if *last { "     " } else { "\u{2502}    " })
        .collect()
}

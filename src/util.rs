//! Canonical path stringification: turns the steps recorded in a
//! [`crate::datum::Datum`] into the bracket-notation string reported on
//! [`crate::Node`].

use crate::datum::Step;

/// Renders `steps` (root-to-leaf, as returned by `Datum::path_steps`) as a
/// canonical path string, e.g. `$['store']['books'][0]`.
pub fn canonical_path(steps: &[Step]) -> String {
    let mut out = String::new();
    for step in steps {
        match step {
            Step::Root => out.push('$'),
            Step::This => {
                if out.is_empty() {
                    out.push('$');
                }
            }
            Step::Field(name) => {
                out.push('[');
                out.push('\'');
                escape_into(name, &mut out);
                out.push('\'');
                out.push(']');
            }
            Step::Index(i) => {
                out.push('[');
                out.push_str(&i.to_string());
                out.push(']');
            }
        }
    }
    if out.is_empty() {
        out.push('$');
    }
    out
}

fn escape_into(s: &str, out: &mut String) {
    for c in s.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\'' => out.push_str("\\'"),
            c => out.push(c),
        }
    }
}

//! The evaluator's zipper: a matched value paired with the path that led to
//! it and (via an `Rc` chain) its ancestors, so a match can answer
//! `full_path()` or step to its parent without re-walking the document.

use std::rc::Rc;

/// One step from a parent `Datum` to a child: either a field name or an
/// array index, carried for path reconstruction.
#[derive(Debug, Clone, PartialEq)]
pub enum Step {
    Root,
    This,
    Field(String),
    Index(i64),
}

/// A value found during evaluation, together with the chain of steps that
/// reached it from the document root.
#[derive(Debug, Clone)]
pub struct Datum<'a> {
    pub value: &'a serde_json::Value,
    pub step: Step,
    pub parent: Option<Rc<Datum<'a>>>,
}

impl<'a> Datum<'a> {
    pub fn root(value: &'a serde_json::Value) -> Rc<Datum<'a>> {
        Rc::new(Datum { value, step: Step::Root, parent: None })
    }

    pub fn child(parent: &Rc<Datum<'a>>, step: Step, value: &'a serde_json::Value) -> Rc<Datum<'a>> {
        Rc::new(Datum { value, step, parent: Some(Rc::clone(parent)) })
    }

    /// The sequence of steps from the root down to and including this datum.
    pub fn path_steps(&self) -> Vec<Step> {
        let mut steps = vec![self.step.clone()];
        let mut cur = self.parent.clone();
        while let Some(node) = cur {
            steps.push(node.step.clone());
            cur = node.parent.clone();
        }
        steps.reverse();
        steps
    }

    /// The datum one step closer to the root, if any.
    pub fn parent_datum(&self) -> Option<Rc<Datum<'a>>> {
        self.parent.clone()
    }
}

//! Condition filters.
//!
//! A [`Filter`] walks one index of a store in key order and yields the
//! objects satisfying every `(attribute, op, value)` condition attached to
//! it. Conditions on the iterated attribute also narrow the scanned key
//! range, so `Ge`/`Gt`/`Le`/`Lt`/`Eq` on the index key never visit objects
//! outside the bounds.

use crate::object::ObjectRef;
use crate::object_store::ObjectStore;
use sos_core::schema::IndexKind;
use sos_core::{Error, Key, Result, Value};
use sos_index::{AttrIndex, KeyRange};
use std::cmp::Ordering;
use std::ops::Bound;

/// Comparison applied by a condition.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CmpOp {
    Lt,
    Le,
    Eq,
    Ge,
    Gt,
    Ne,
}

impl CmpOp {
    /// Whether `attribute <op> operand` holds, given the ordering of the
    /// attribute value against the operand.
    pub fn holds(self, ord: Ordering) -> bool {
        match self {
            CmpOp::Lt => ord == Ordering::Less,
            CmpOp::Le => ord != Ordering::Greater,
            CmpOp::Eq => ord == Ordering::Equal,
            CmpOp::Ge => ord != Ordering::Less,
            CmpOp::Gt => ord == Ordering::Greater,
            CmpOp::Ne => ord != Ordering::Equal,
        }
    }
}

impl core::fmt::Display for CmpOp {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let s = match self {
            CmpOp::Lt => "<",
            CmpOp::Le => "<=",
            CmpOp::Eq => "==",
            CmpOp::Ge => ">=",
            CmpOp::Gt => ">",
            CmpOp::Ne => "!=",
        };
        f.write_str(s)
    }
}

#[derive(Clone, Debug)]
struct Condition {
    pos: usize,
    op: CmpOp,
    value: Value,
}

impl Condition {
    fn holds(&self, object: &ObjectRef<'_>) -> bool {
        object
            .value_at(self.pos)
            .and_then(|v| v.compare(&self.value).ok())
            .is_some_and(|ord| self.op.holds(ord))
    }
}

/// Ordered, condition-constrained iteration over one index of a store.
#[derive(Clone)]
pub struct Filter<'a> {
    store: &'a ObjectStore,
    index: &'a AttrIndex,
    /// Attribute position of a single-attribute index.
    key_pos: Option<usize>,
    conditions: Vec<Condition>,
}

impl<'a> Filter<'a> {
    pub(crate) fn new(store: &'a ObjectStore, index: &str) -> Result<Self> {
        let def = store.schema().index(index)?;
        let key_pos = match def.kind() {
            IndexKind::Attribute(pos) => Some(pos),
            IndexKind::Composite { .. } => None,
        };
        Ok(Self {
            store,
            index: store.index(index)?,
            key_pos,
            conditions: Vec::new(),
        })
    }

    /// Adds a condition. The attribute must exist and `value` must have its
    /// type.
    pub fn condition(mut self, attribute: &str, op: CmpOp, value: Value) -> Result<Self> {
        let attr = self.store.schema().attribute(attribute)?;
        if attr.data_type() != value.data_type() {
            return Err(Error::type_mismatch(attr.data_type(), value.data_type()));
        }
        self.conditions.push(Condition {
            pos: attr.position(),
            op,
            value,
        });
        Ok(self)
    }

    /// Parses `raw` for the attribute and adds the condition.
    pub fn condition_text(self, attribute: &str, op: CmpOp, raw: &str) -> Result<Self> {
        let value = self.store.schema().parse(attribute, raw)?;
        self.condition(attribute, op, value)
    }

    /// Name of the iterated index.
    pub fn index_name(&self) -> &str {
        self.index.name()
    }

    /// Key range implied by the conditions on the iterated attribute.
    fn key_range(&self) -> KeyRange<Key> {
        let Some(key_pos) = self.key_pos else {
            return KeyRange::all();
        };
        let mut lower = Bound::Unbounded;
        let mut upper = Bound::Unbounded;
        for c in self.conditions.iter().filter(|c| c.pos == key_pos) {
            let v = &c.value;
            match c.op {
                CmpOp::Gt => tighten(&mut lower, Bound::Excluded(v), Ordering::Greater),
                CmpOp::Ge => tighten(&mut lower, Bound::Included(v), Ordering::Greater),
                CmpOp::Lt => tighten(&mut upper, Bound::Excluded(v), Ordering::Less),
                CmpOp::Le => tighten(&mut upper, Bound::Included(v), Ordering::Less),
                CmpOp::Eq => {
                    tighten(&mut lower, Bound::Included(v), Ordering::Greater);
                    tighten(&mut upper, Bound::Included(v), Ordering::Less);
                }
                CmpOp::Ne => {}
            }
        }
        KeyRange::new(to_key(lower), to_key(upper))
    }

    /// Matching objects in index key order.
    pub fn iter(&self) -> impl Iterator<Item = ObjectRef<'a>> + '_ {
        let store = self.store;
        self.index
            .scan(self.key_range())
            .filter_map(move |(_, handle)| store.view(handle))
            .filter(move |object| self.conditions.iter().all(|c| c.holds(object)))
    }

    /// At most `count` matches, starting at the 0-based match position
    /// `start`.
    pub fn iter_at(&self, start: usize, count: usize) -> impl Iterator<Item = ObjectRef<'a>> + '_ {
        self.iter().skip(start).take(count)
    }

    /// First match in key order.
    pub fn first(&self) -> Option<ObjectRef<'a>> {
        self.iter().next()
    }

    /// Last match in key order.
    pub fn last(&self) -> Option<ObjectRef<'a>> {
        self.iter().last()
    }

    pub fn count(&self) -> usize {
        self.iter().count()
    }
}

/// Replaces `bound` with `candidate` when the candidate is tighter.
/// `tighter` is the ordering of a tighter value against the current one.
fn tighten<'v>(bound: &mut Bound<&'v Value>, candidate: Bound<&'v Value>, tighter: Ordering) {
    let replace = match (*bound, candidate) {
        (Bound::Unbounded, _) => true,
        (_, Bound::Unbounded) => false,
        (Bound::Included(cur) | Bound::Excluded(cur), Bound::Included(new) | Bound::Excluded(new)) => {
            match new.cmp(cur) {
                // At equal values an exclusive end is the tighter one.
                Ordering::Equal => {
                    matches!((*bound, candidate), (Bound::Included(_), Bound::Excluded(_)))
                }
                ord => ord == tighter,
            }
        }
    };
    if replace {
        *bound = candidate;
    }
}

fn to_key(bound: Bound<&Value>) -> Bound<Key> {
    match bound {
        Bound::Included(v) => Bound::Included(Key::Simple(v.clone())),
        Bound::Excluded(v) => Bound::Excluded(Key::Simple(v.clone())),
        Bound::Unbounded => Bound::Unbounded,
    }
}

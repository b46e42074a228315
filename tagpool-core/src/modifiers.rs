//! Probability modifiers: sums of power terms that reshape a probability.
//!
//! A modifier stores a sparse map `exponent -> multiplier` and computes
//!
//! ```text
//! apply(p) = Σ (p * multiplier) ^ exponent
//! ```
//!
//! Exponent 1 scales linearly, exponent 0 contributes a constant 1 (regardless
//! of the input), higher exponents amplify. Results are not clamped.
//!
//! Configs hold [`SharedModifier`] handles rather than values: the same handle
//! registered under several tags or configs is one modifier, and editing it
//! through any clone of the handle is visible everywhere it is registered.

use serde::{Deserialize, Serialize};
use std::cell::{Ref, RefCell};
use std::collections::BTreeMap;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::ops::Index;
use std::rc::Rc;
use std::sync::atomic::{AtomicU64, Ordering};

/// Multiplier reported for an exponent that has no term.
const ABSENT: f64 = 0.0;

/// A reshaping function over probabilities.
///
/// Terms are kept in an ordered map so [`apply`](Self::apply) always sums in
/// ascending exponent order and gives bit-identical results across runs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProbabilityModifier {
    terms: BTreeMap<i32, f64>,
}

impl ProbabilityModifier {
    /// An empty modifier. Applying it always yields 0.
    pub fn new() -> Self {
        Self {
            terms: BTreeMap::new(),
        }
    }

    /// Builder-style term insertion.
    pub fn with_term(mut self, exponent: i32, multiplier: f64) -> Self {
        self.set(exponent, multiplier);
        self
    }

    /// Linear scaling: `apply(p) = p * factor`.
    pub fn scale(factor: f64) -> Self {
        Self::new().with_term(1, factor)
    }

    /// Reshape `original`.
    ///
    /// `0^0` is 1, so an exponent-0 term contributes 1 even for a zero input.
    pub fn apply(&self, original: f64) -> f64 {
        self.terms
            .iter()
            .map(|(&exponent, &multiplier)| (original * multiplier).powi(exponent))
            .sum()
    }

    /// Multiplier for `exponent`, 0 when there is no such term.
    pub fn get(&self, exponent: i32) -> f64 {
        self.terms.get(&exponent).copied().unwrap_or(ABSENT)
    }

    /// Set (or overwrite) the multiplier for `exponent`.
    pub fn set(&mut self, exponent: i32, multiplier: f64) {
        self.terms.insert(exponent, multiplier);
    }

    /// Drop the term for `exponent`, returning its multiplier.
    ///
    /// Not equivalent to `set(exponent, 0.0)`: a zero multiplier still
    /// contributes `0^exponent`, which is 1 for exponent 0.
    pub fn remove(&mut self, exponent: i32) -> Option<f64> {
        self.terms.remove(&exponent)
    }

    /// Terms in ascending exponent order.
    pub fn terms(&self) -> impl Iterator<Item = (i32, f64)> + '_ {
        self.terms.iter().map(|(&e, &m)| (e, m))
    }

    pub fn len(&self) -> usize {
        self.terms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }
}

/// The distinguished default modifier: a single `(exponent 0, multiplier 1)`
/// term. Applying it forces the running value to exactly 1.
///
/// Use [`ProbabilityModifier::new`] for an empty modifier.
impl Default for ProbabilityModifier {
    fn default() -> Self {
        Self::new().with_term(0, 1.0)
    }
}

impl Index<i32> for ProbabilityModifier {
    type Output = f64;

    fn index(&self, exponent: i32) -> &f64 {
        self.terms.get(&exponent).unwrap_or(&ABSENT)
    }
}

impl FromIterator<(i32, f64)> for ProbabilityModifier {
    fn from_iter<I: IntoIterator<Item = (i32, f64)>>(iter: I) -> Self {
        Self {
            terms: iter.into_iter().collect(),
        }
    }
}

static NEXT_MODIFIER_ID: AtomicU64 = AtomicU64::new(0);

/// Identity of a [`SharedModifier`].
///
/// Ids increase with creation order; configs apply the modifiers of one tag in
/// ascending id order.
#[derive(Hash, Eq, PartialEq, Clone, Copy, Debug, PartialOrd, Ord)]
pub struct ModifierId(pub u64);

impl fmt::Display for ModifierId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "modifier#{}", self.0)
    }
}

/// A shared, mutable handle to a [`ProbabilityModifier`].
///
/// Cloning the handle does not copy the modifier. Equality, ordering and
/// hashing use the [`ModifierId`] only, so two handles over equal terms are
/// still different modifiers.
#[derive(Clone)]
pub struct SharedModifier {
    id: ModifierId,
    inner: Rc<RefCell<ProbabilityModifier>>,
}

impl SharedModifier {
    pub fn new(modifier: ProbabilityModifier) -> Self {
        let id = ModifierId(NEXT_MODIFIER_ID.fetch_add(1, Ordering::Relaxed));
        Self {
            id,
            inner: Rc::new(RefCell::new(modifier)),
        }
    }

    pub fn id(&self) -> ModifierId {
        self.id
    }

    pub fn apply(&self, original: f64) -> f64 {
        self.inner.borrow().apply(original)
    }

    pub fn get(&self, exponent: i32) -> f64 {
        self.inner.borrow().get(exponent)
    }

    /// Edits the modifier in place for every holder of this handle.
    pub fn set(&self, exponent: i32, multiplier: f64) {
        self.inner.borrow_mut().set(exponent, multiplier);
    }

    pub fn remove(&self, exponent: i32) -> Option<f64> {
        self.inner.borrow_mut().remove(exponent)
    }

    /// Borrow the underlying modifier.
    pub fn borrow(&self) -> Ref<'_, ProbabilityModifier> {
        self.inner.borrow()
    }

    /// Detached deep copy of the current terms.
    pub fn snapshot(&self) -> ProbabilityModifier {
        self.inner.borrow().clone()
    }

    /// A new, independent handle (fresh id) over a deep copy of the terms.
    pub fn detach(&self) -> SharedModifier {
        SharedModifier::new(self.snapshot())
    }

    /// Whether `other` is a handle to the same modifier.
    pub fn same_as(&self, other: &SharedModifier) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }
}

impl From<ProbabilityModifier> for SharedModifier {
    fn from(modifier: ProbabilityModifier) -> Self {
        SharedModifier::new(modifier)
    }
}

impl PartialEq for SharedModifier {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for SharedModifier {}

impl PartialOrd for SharedModifier {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for SharedModifier {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.id.cmp(&other.id)
    }
}

impl Hash for SharedModifier {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Debug for SharedModifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SharedModifier")
            .field("id", &self.id)
            .field("terms", &*self.inner.borrow())
            .finish()
    }
}

//! Running-total derivation
//!
//! Walks a [`Forest`] parent-before-children and annotates every node with
//! the result of applying its step to its parent's total. Roots apply their
//! step to the discussion's initial value.
//!
//! | kind       | running total                         |
//! |------------|---------------------------------------|
//! | `START`    | initial value (operand ignored)       |
//! | `ADD`      | parent + value                        |
//! | `SUBTRACT` | parent − value                        |
//! | `MULTIPLY` | parent × value                        |
//! | `DIVIDE`   | parent ÷ value, fails when value is 0 |
//! | `END`      | parent, unchanged                     |

use crate::config::ValuationPolicy;
use crate::error::ValuationError;
use crate::forest::{Forest, NodeIndex};
use crate::types::{AfterValue, Operation, OperationType};

/// Running totals for every node of one forest, indexed by arena position
#[derive(Debug, Clone, PartialEq)]
pub struct Valuation {
    values: Vec<AfterValue>,
}

impl Valuation {
    /// Total at `index`
    ///
    /// # Panics
    /// Panics if `index` does not come from the valued forest.
    #[inline]
    #[must_use]
    pub fn get(&self, index: NodeIndex) -> &AfterValue {
        &self.values[index.0]
    }

    /// All totals, indexed by arena position
    #[inline]
    #[must_use]
    pub fn values(&self) -> &[AfterValue] {
        &self.values
    }

    /// Number of nodes whose total could not be derived
    #[must_use]
    pub fn unavailable_count(&self) -> usize {
        self.values.iter().filter(|v| !v.is_computed()).count()
    }

    /// Failures that originated at a node (excludes inherited ones)
    pub fn failures(&self) -> impl Iterator<Item = &ValuationError> + '_ {
        self.values.iter().filter_map(|v| match v.error() {
            Some(ValuationError::ParentUnavailable { .. }) | None => None,
            Some(e) => Some(e),
        })
    }
}

/// Apply one step to `base`
///
/// `initial_value` is only consulted by `START`.
///
/// # Errors
/// Returns [`ValuationError::DivisionByZero`] for a zero divisor and
/// [`ValuationError::NonFiniteResult`] when the total is infinite or NaN.
#[allow(clippy::float_cmp)]
pub fn apply(operation: &Operation, base: f64, initial_value: f64) -> Result<f64, ValuationError> {
    let operation_id = operation.id;
    let value = operation.value;

    let result = match operation.operation_type {
        OperationType::Start => initial_value,
        OperationType::End => base,
        OperationType::Add => base + value,
        OperationType::Subtract => base - value,
        OperationType::Multiply => base * value,
        OperationType::Divide => {
            if value == 0.0 {
                return Err(ValuationError::DivisionByZero { operation_id });
            }
            base / value
        }
    };

    if result.is_finite() {
        Ok(result)
    } else {
        Err(ValuationError::NonFiniteResult { operation_id })
    }
}

/// Derive the running total of every node
///
/// Under [`ValuationPolicy::Degrade`] a failing node and its descendants are
/// marked unavailable while the rest of the forest is valued normally.
///
/// # Errors
/// Under [`ValuationPolicy::Abort`] returns the first failure met in
/// depth-first order.
pub fn derive_values(
    forest: &Forest,
    initial_value: f64,
    policy: ValuationPolicy,
) -> Result<Valuation, ValuationError> {
    let mut values: Vec<Option<AfterValue>> = vec![None; forest.len()];

    for index in forest.preorder() {
        let node = forest.node(index);
        let base = match node.parent() {
            None => Ok(initial_value),
            Some(parent) => match &values[parent.index()] {
                Some(AfterValue::Computed(v)) => Ok(*v),
                Some(AfterValue::Unavailable { reason }) => Err(reason.propagated()),
                // Pre-order guarantees the parent was visited first.
                None => Err(ValuationError::ParentUnavailable {
                    operation_id: forest.node(parent).operation().id,
                }),
            },
        };

        let result = base.and_then(|b| apply(node.operation(), b, initial_value));

        if let Err(ref e) = result {
            if policy == ValuationPolicy::Abort {
                return Err(e.clone());
            }
            if !matches!(e, ValuationError::ParentUnavailable { .. }) {
                tracing::debug!(operation_id = %node.operation().id, error = %e, "Operation has no value");
            }
        }

        values[index.index()] = Some(result.into());
    }

    // Every node is reachable once cycles are broken, so all slots are set.
    let values = values
        .into_iter()
        .zip(forest.nodes())
        .map(|(value, (_, node))| {
            value.unwrap_or_else(|| AfterValue::Unavailable {
                reason: ValuationError::ParentUnavailable {
                    operation_id: node.operation().id,
                },
            })
        })
        .collect();

    Ok(Valuation { values })
}

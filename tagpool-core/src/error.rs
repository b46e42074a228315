use thiserror::Error;

/// Failures of a sampling call.
///
/// Mutations (tags, modifiers, items) never fail; only sampling and
/// probability evaluation return these.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PoolError {
    /// An effective probability came out negative or NaN, or the weights sum
    /// to infinity. The offending item/modifier setup must be fixed.
    #[error("Probability out of range: item {position} has effective probability {probability}")]
    InvalidProbability { position: usize, probability: f64 },

    /// Nothing can be selected: the pool is empty or every weight is zero.
    #[error("Cannot sample from an empty or zero-weight pool ({items} items)")]
    EmptyOrZeroWeightPool { items: usize },

    /// The uniform draw was not in `[0, 1)`.
    #[error("Uniform draw {draw} is outside [0, 1)")]
    DrawOutOfRange { draw: f64 },
}

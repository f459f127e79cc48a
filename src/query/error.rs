use crate::query::epa::ContactResult;
use thiserror::Error;

/// Errors that can interrupt a penetration-depth (EPA) run.
///
/// A failed run aborts only the current shape pair, never the whole
/// simulation step: callers typically fall back to a cheaper contact
/// estimate or skip the pair until the next step. No error is retried
/// automatically within the run itself.
#[derive(Clone, Debug, Error)]
pub enum EpaError {
    /// The initial tetrahedron could not seed four valid faces.
    #[error("the initial simplex is degenerate")]
    DegenerateSimplex,
    /// The polytope triangle store ran out of capacity while expanding.
    #[error("the polytope triangle store is exhausted")]
    StorageExhausted,
    /// An adjacency precondition was broken while stitching the mesh,
    /// indicating a geometry or numerics bug.
    #[error("a structural invariant of the polytope mesh was violated")]
    StructuralInvariantViolated,
    /// The iteration budget was exceeded before the expansion converged.
    ///
    /// The best candidate found so far is provided as a lower-quality
    /// fallback, explicitly distinguished from a converged result.
    #[error("the expansion did not converge within the iteration budget")]
    MaxIterationsExceeded {
        /// The best penetration estimate found before the budget ran out.
        best: Option<ContactResult>,
    },
}

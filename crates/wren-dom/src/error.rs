//! Arena allocation failures.

use thiserror::Error;

/// Fatal errors raised while allocating nodes or atoms.
///
/// Apart from [`ArenaError::UnknownNode`], which only direct tree editing
/// can raise, these are the only conditions under which building a tree
/// can fail. Everything else a parser encounters is recoverable.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ArenaError {
    /// The tree already holds the configured maximum number of nodes.
    #[error("node arena is full ({limit} nodes)")]
    CapacityExceeded {
        /// The configured node limit.
        limit: usize,
    },

    /// The allocator refused to grow the node storage.
    #[error("failed to allocate storage for a new node")]
    AllocationFailed,

    /// A node id that was never allocated by this arena.
    #[error("node {index} does not exist in this arena")]
    UnknownNode {
        /// The offending arena index.
        index: usize,
    },

    /// The atom table ran out of identifiers.
    #[error("atom table exhausted its identifier space")]
    AtomTableFull,
}

use thiserror::Error;

/// Hard failures. Lookup misses are not errors — operations degrade to
/// no-ops — so the only fatal case is an ordering violation by the caller.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum LayoutError {
    #[error("layout state used before synchronize_layout_with_children")]
    NotSynchronized,
}

//! Shared state threaded through the router.

use std::sync::Arc;

use crate::bootstrap::AxumContext;

/// All handlers see the same immutable startup context.
pub type AppState = Arc<AxumContext>;

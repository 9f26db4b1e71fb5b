//! Repository implementations
//!
//! Repositories own the SQL. Each one maps between table rows and the
//! documents stored in them; none of them know about ports.

pub mod claims;
pub mod results;

pub use claims::{ClaimRow, ClaimsRepository};
pub use results::{WorkflowResultRow, WorkflowResultsRepository};

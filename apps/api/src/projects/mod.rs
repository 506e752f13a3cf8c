// Consulting projects: CRUD, team roster, RFP intake.
// Scoring lives in crate::analysis; this module only feeds it data.

pub mod handlers;
pub mod rfp;
pub mod store;

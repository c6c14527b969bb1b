//! Transport binding (spec §1/§6: "out of scope... only their
//! interfaces to the core are specified"). A thin axum router mapping
//! each §6 operation to a route; every handler is a few lines of
//! extract-call-serialize around the transport-agnostic core.

pub mod router;

pub use router::build_router;

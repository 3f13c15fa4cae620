//! Server module: shared state, the route table and the `ServerBuilder`

pub mod builder;
pub mod router;
pub mod state;

pub use builder::ServerBuilder;
pub use router::{build_api_routes, build_router};
pub use state::AppState;

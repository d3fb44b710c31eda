pub mod logging;
pub mod runtime_context;

pub use logging::{get_tracing_layer, logging_middleware};
pub use runtime_context::{runtime_context_middleware, AmbientContext, RUNTIME_CONTEXT_HEADER};

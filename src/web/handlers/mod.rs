// Route handlers, one module per endpoint.

pub mod debug;
pub mod predict;
pub mod train;

use std::sync::Arc;

use crate::pipeline::Pipeline;

/// Shared state handed to every request handler.
pub struct HandlerState<E, S, I> {
    pub pipeline: Arc<Pipeline<E, S, I>>,
}

impl<E, S, I> Clone for HandlerState<E, S, I> {
    fn clone(&self) -> Self {
        Self {
            pipeline: Arc::clone(&self.pipeline),
        }
    }
}

impl<E, S, I> HandlerState<E, S, I> {
    pub fn new(pipeline: Pipeline<E, S, I>) -> Self {
        Self {
            pipeline: Arc::new(pipeline),
        }
    }
}

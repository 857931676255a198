use std::sync::Arc;

use answer_pipeline::AnswerPipeline;

#[derive(Clone)]
pub struct ApiState {
    pub pipeline: Arc<AnswerPipeline>,
}

impl ApiState {
    pub fn new(pipeline: AnswerPipeline) -> Self {
        Self {
            pipeline: Arc::new(pipeline),
        }
    }
}

use bhv_core::BehaviorId;
use bhv_schema::DecodeError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error(transparent)]
    Decode(#[from] DecodeError),

    #[error("unknown behavior type `{0}`")]
    UnknownBehavior(BehaviorId),

    #[error("behavior error: {0}")]
    Behavior(String),
}

pub type EngineResult<T> = Result<T, EngineError>;

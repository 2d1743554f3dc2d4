pub mod origin;
pub mod params;
pub mod relay;
pub mod shaper;
pub mod upstream;

pub use crate::domain::model::{QuestionnaireAnswers, RelayResult, UpstreamParams};
pub use crate::domain::ports::{ConfigProvider, SubsidyApi};
pub use crate::utils::error::Result;

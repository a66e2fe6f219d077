pub mod dimension;
pub mod survey;

pub use dimension::Dimension;
pub use survey::{
    NormalizationReport, QuestionColumn, QuestionDefinition, ResolvedQuestion, SurveyLayout,
    SurveyRecord,
};

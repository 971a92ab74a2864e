pub mod schema;
pub mod validator;

pub use schema::{
    AnalysisAudit, Biomechanics, ComponentHealth, CompressionStatus, ForensicReport,
    MidsoleHealth, MidsoleVariance, OutsoleHealth, Pronation, ShoeCategory, ShoeInfo,
    StatusColor, StrikePattern, UpperHealth, UpperStatus, Verdict, WearPattern,
};
pub use validator::{parse_report, ValidationError, VALIDATION_USER_MESSAGE};

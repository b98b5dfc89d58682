//! Request handlers.

mod analyze_routine;

pub use analyze_routine::{
    AnalysisError, AnalyzeRoutineHandler, AnalyzeRoutineResult, AnalyzeRoutineSettings, ResultSource,
};

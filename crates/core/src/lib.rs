pub mod client;
pub mod config;
pub mod dispatcher;
pub mod export;
pub mod import;
pub mod retrieval;
pub mod session_log;
pub mod subject;
pub mod testing;

pub use client::{
    ClientError, HttpResultsClient, ResultsPayload, ResultsQuery, RetrievalError, TestResult,
    TestResultCode,
};
pub use config::{
    load_config, load_config_from_str, load_config_layered,
    validate_config, ApiConfig, Config, ConfigError, ConfigOverrides, ExportConfig,
    RetrievalConfig, SanitizedConfig,
};
pub use dispatcher::{DispatchError, DispatchHandle, Dispatcher, DispatcherStats, RequestExecutor};
pub use export::{export_file_name, export_to_dir, write_csv, ExportError};
pub use import::{
    import_file, import_reader, IdentifierValidator, ImportError, ImportStats, NricValidator,
};
pub use retrieval::{
    OrchestratorError, RetrievalCallback, RetrievalEvent, RetrievalOrchestrator, RetrievalStats,
    RunReport, StopToken,
};
pub use session_log::{LogEntry, SessionLog};
pub use subject::{IdType, Subject, SubjectKey, SubjectStore};

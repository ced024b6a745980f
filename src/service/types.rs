//! # Data types carried by the compile service capability set.
//!
//! These are plain value types: the request payload for a compilation round
//! trip and the results returned by the service.

use std::collections::HashSet;
use std::path::PathBuf;

/// A source location identifier understood by the compile service.
///
/// Kept as a plain string so the supervisor stays agnostic of the
/// delegate's URI scheme.
pub type SourceUri = String;

/// One compilation round trip.
///
/// Groups the wire arguments of a `compile` call into a single value so the
/// capability-set signature stays readable.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompileRequest {
    /// Protocol revision the caller speaks.
    pub protocol_id: String,
    /// Identifier correlating this invocation across logs.
    pub invocation_id: String,
    /// Raw compiler arguments.
    pub args: Vec<String>,
    /// Source files named explicitly on the command line.
    pub explicit_sources: HashSet<PathBuf>,
    /// Sources the service must compile in this round.
    pub sources_to_compile: HashSet<SourceUri>,
    /// Sources visible to the compilation but not compiled.
    pub visible_sources: HashSet<SourceUri>,
}

/// Static facts about the host the service runs on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SysInfo {
    /// Number of logical cores available to the service.
    pub num_cores: u32,
    /// Maximum memory available to the service, in bytes.
    pub max_memory_bytes: u64,
}

impl SysInfo {
    /// Creates a new `SysInfo`.
    pub fn new(num_cores: u32, max_memory_bytes: u64) -> Self {
        Self {
            num_cores,
            max_memory_bytes,
        }
    }
}

/// Outcome of a compilation round trip.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompilationResult {
    /// Process-style return code; `0` means success.
    pub return_code: i32,
    /// Captured standard output of the compilation.
    pub stdout: String,
    /// Captured standard error of the compilation.
    pub stderr: String,
}

impl CompilationResult {
    /// Creates a result with the given return code and empty output.
    pub fn new(return_code: i32) -> Self {
        Self {
            return_code,
            ..Self::default()
        }
    }

    /// Whether the compilation succeeded.
    #[inline]
    pub fn is_success(&self) -> bool {
        self.return_code == 0
    }
}

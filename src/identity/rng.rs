use crate::problem::Problem;

/// Source of token-grade randomness. Injected into the session issuer so tests
/// can supply a deterministic source without touching process-wide state.
pub trait TokenSource: Send + Sync {
    fn fill(&self, buf: &mut [u8]) -> Result<(), Problem>;
}

/// The operating system CSPRNG; the production source.
#[derive(Debug, Clone, Copy, Default)]
pub struct OsTokenSource;

impl TokenSource for OsTokenSource {
    fn fill(&self, buf: &mut [u8]) -> Result<(), Problem> {
        // Failure means the OS entropy source is unusable; surfacing it beats
        // handing out a predictable token.
        getrandom::getrandom(buf)
            .map_err(|e| Problem::invalid_request(format!("entropy source unavailable: {e}"), ""))
    }
}

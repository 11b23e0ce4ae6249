/// Abstraction over user-facing output.
///
/// Commands print through this trait instead of `println!`/`eprintln!` so
/// that `--quiet` can silence them. Machine-readable output (`list --json`)
/// bypasses it and always goes to stdout.
pub trait UserOutput: Send + Sync {
    /// Informational line (e.g., a row of `list`)
    fn status(&self, message: &str);

    /// Warning (e.g., the default secret path is in use)
    fn warning(&self, message: &str);
}

/// Standard CLI output: stdout for information, stderr for problems.
pub struct CliOutput;

impl UserOutput for CliOutput {
    fn status(&self, message: &str) {
        println!("{}", message);
    }

    fn warning(&self, message: &str) {
        eprintln!("\x1b[33m{}\x1b[0m", message);
    }
}

/// Prints nothing. Used with `--quiet`; errors still reach stderr from `main`.
pub struct QuietOutput;

impl UserOutput for QuietOutput {
    fn status(&self, _message: &str) {}
    fn warning(&self, _message: &str) {}
}

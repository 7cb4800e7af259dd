use log::error;
use regex::Regex;

/// Compile a built-in pattern. A pattern that does not compile is logged and
/// matches nothing, leaving the affected fields absent.
pub fn compile(name: &str, pattern: &str) -> Option<Regex> {
    match Regex::new(pattern) {
        Ok(regex) => Some(regex),
        Err(e) => {
            error!("Pattern {} does not compile, nothing will match it: {}", name, e);
            None
        }
    }
}

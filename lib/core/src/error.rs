//! Error handling foundation for botflow.
//!
//! Only the `Result` alias lives here. Each crate defines its own domain error
//! enums and lifts them into a rootcause `Report` at its fallible boundaries.

use rootcause::Report;

/// A Result type alias using rootcause's Report for error handling.
pub type Result<T, C = ()> = std::result::Result<T, Report<C>>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn result_alias_holds_values() {
        let ok: Result<&str> = Ok("workflow");
        assert_eq!(ok.expect("should be ok"), "workflow");
    }
}

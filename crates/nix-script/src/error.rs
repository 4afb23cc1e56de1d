/// Script decoding error type.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    /// The zerocoin spend payload ended before `field` could be read.
    #[error("Zerocoin spend payload truncated at {field}")]
    TruncatedPayload { field: &'static str },
}

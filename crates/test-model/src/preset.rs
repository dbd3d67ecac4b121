use hemachat_model::ErrorKind;

/// A scripted outcome for one request.
#[derive(Clone, Debug)]
pub enum PresetOutcome {
    /// Resolve with a reply carrying the given completion text.
    Reply(String),
    /// Resolve successfully, but without a completion text.
    EmptyReply,
    /// Fail with an error of the given kind.
    Failure(ErrorKind),
}

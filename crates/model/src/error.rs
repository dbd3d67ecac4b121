/// The kind of error that occurred.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// The credential was rejected by the model provider.
    Unauthorized,
    /// The model provider is rate limited.
    RateLimitExceeded,
    /// The request did not complete in time.
    Timeout,
    /// The response payload could not be decoded.
    MalformedResponse,
    /// Any other errors.
    Other,
}

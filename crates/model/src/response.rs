/// A completed reply from the model provider.
///
/// Providers resolve a request to at most one reply text. `content` is
/// `None` when the provider answered successfully but the response
/// carried no usable completion, and it is up to the caller to decide
/// what to show in that case.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct ModelReply {
    /// The text of the first completion, if any.
    pub content: Option<String>,
}

impl ModelReply {
    /// Creates a reply with the given completion text.
    #[inline]
    pub fn with_content<S: Into<String>>(content: S) -> Self {
        Self {
            content: Some(content.into()),
        }
    }
}

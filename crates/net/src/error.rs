use thiserror::Error;

/// Failures while framing, decoding or validating peer traffic.
#[derive(Debug, Error)]
pub enum NetError {
    /// Fewer bytes than a frame header.
    #[error("frame too short: {len} bytes")]
    FrameTooShort {
        /// Bytes available.
        len: usize,
    },

    /// Length prefix points past the end of the buffer.
    #[error("incomplete frame: expected {expected} bytes, got {actual}")]
    IncompleteFrame {
        /// Bytes the prefix promised (including the prefix).
        expected: usize,
        /// Bytes available.
        actual: usize,
    },

    /// Frame length outside the accepted range.
    #[error("frame length {len} exceeds limit {max}")]
    Oversize {
        /// Declared or encoded length.
        len: usize,
        /// Limit.
        max: usize,
    },

    /// Channel tag not known to this build.
    #[error("unknown channel tag {0}")]
    UnknownTag(u8),

    /// Channel tag disagrees with the decoded payload.
    #[error("channel tag {tag} does not carry {message} messages")]
    ChannelMismatch {
        /// Channel named by the tag byte.
        tag: &'static str,
        /// Channel the payload belongs on.
        message: &'static str,
    },

    /// Payload failed to (de)serialize.
    #[error("postcard: {0}")]
    Postcard(#[from] postcard::Error),

    /// Message decoded but failed validation.
    #[error("invalid message: {0}")]
    Invalid(&'static str),
}

use bytes::Bytes;

#[derive(Debug, Clone)]
#[non_exhaustive]
/// The entire body of an incoming request, buffered in memory.
///
/// Buffering (and the size limits that should guard it) belongs to the
/// surrounding transport; the binding pipelines only consume the already
/// collected bytes.
pub struct BufferedBody {
    /// The buffer of bytes that represents the body of the incoming request.
    pub bytes: Bytes,
}

impl BufferedBody {
    pub fn new(bytes: Bytes) -> Self {
        Self { bytes }
    }

    /// An empty body, for requests that don't carry one.
    pub fn empty() -> Self {
        Self { bytes: Bytes::new() }
    }
}

impl From<Bytes> for BufferedBody {
    fn from(bytes: Bytes) -> Self {
        Self::new(bytes)
    }
}

impl From<Vec<u8>> for BufferedBody {
    fn from(bytes: Vec<u8>) -> Self {
        Self::new(bytes.into())
    }
}

impl From<&'static [u8]> for BufferedBody {
    fn from(bytes: &'static [u8]) -> Self {
        Self::new(Bytes::from_static(bytes))
    }
}

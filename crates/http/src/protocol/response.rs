use http::Response;

/// A response whose body has not been attached yet, as handed to the encoder.
pub type ResponseHead = Response<()>;

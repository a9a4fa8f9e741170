// Copyright 2020 TiKV Project Authors. Licensed under Apache-2.0.

use quick_error::quick_error;

quick_error! {
    /// The base error type for the checkpoint tracker.
    ///
    /// Reports and membership updates never fail; errors only come from building a
    /// tracker or exporting its state.
    #[derive(Debug)]
    pub enum Error {
        /// The configuration is invalid.
        ConfigInvalid(desc: String) {
            display("{}", desc)
        }
        /// Checkpoint stats could not be encoded.
        Json(err: serde_json::Error) {
            from()
            source(err)
            display("json error {:?}", err)
        }
    }
}

impl PartialEq for Error {
    fn eq(&self, other: &Error) -> bool {
        match (self, other) {
            (Error::ConfigInvalid(ref e1), Error::ConfigInvalid(ref e2)) => e1 == e2,
            (Error::Json(ref e1), Error::Json(ref e2)) => e1.to_string() == e2.to_string(),
            _ => false,
        }
    }
}

/// A result type that wraps up the checkpoint tracker errors.
pub type Result<T> = std::result::Result<T, Error>;

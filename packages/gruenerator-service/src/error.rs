pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("Invalid request: {message}")]
	InvalidRequest { message: String },
	#[error("Embedding provider error: {message}")]
	Provider { message: String },
	#[error("Search backend error: {message}")]
	Backend { message: String },
}
impl From<gruenerator_providers::Error> for Error {
	fn from(err: gruenerator_providers::Error) -> Self {
		Self::Provider { message: err.to_string() }
	}
}

impl From<gruenerator_storage::Error> for Error {
	fn from(err: gruenerator_storage::Error) -> Self {
		match err {
			gruenerator_storage::Error::InvalidArgument(message) => Self::InvalidRequest { message },
			gruenerator_storage::Error::Qdrant(inner) => Self::Backend { message: inner.to_string() },
		}
	}
}

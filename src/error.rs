use thiserror::Error;

pub type Result<T> = std::result::Result<T, ElgatoError>;

#[derive(Error, Debug)]
pub enum ElgatoError {
    #[error("failed to parse {addr:?}: {reason}")]
    InvalidAddress { addr: String, reason: &'static str },

    #[error("failed to lookup port {0:?}: unknown port")]
    UnknownPort(String),

    #[error("failed to create discovery: {0}")]
    DiscoveryInit(zeroconf::error::Error),

    #[error("failed to run discovery: {0}")]
    Discovery(zeroconf::error::Error),

    #[error("no lights found")]
    NoLights,

    #[error(transparent)]
    RequestError(#[from] reqwest::Error),

    #[error("device responded with {0}")]
    Status(reqwest::StatusCode),

    #[error("failed to fetch options: {0}")]
    Fetch(Box<ElgatoError>),

    #[error("failed to update light group: {0}")]
    Update(Box<ElgatoError>),

    #[error("failed to update device {host} settings: {source}")]
    Device {
        host: String,
        source: Box<ElgatoError>,
    },
}

impl ElgatoError {
    pub fn fetch(err: ElgatoError) -> Self {
        ElgatoError::Fetch(Box::new(err))
    }

    pub fn update(err: ElgatoError) -> Self {
        ElgatoError::Update(Box::new(err))
    }

    pub fn device(host: &str, err: ElgatoError) -> Self {
        ElgatoError::Device {
            host: host.to_string(),
            source: Box::new(err),
        }
    }

    /// Innermost error, looking through the context wrappers.
    pub fn root(&self) -> &ElgatoError {
        match self {
            ElgatoError::Fetch(inner) | ElgatoError::Update(inner) => inner.root(),
            ElgatoError::Device { source, .. } => source.root(),
            other => other,
        }
    }

    /// Process exit status for this error. Usage errors exit with 2 from clap.
    pub fn exit_code(&self) -> i32 {
        match self.root() {
            ElgatoError::NoLights => 3,
            _ => 1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_context_messages() {
        let err = ElgatoError::device(
            "10.0.1.32",
            ElgatoError::update(ElgatoError::Status(reqwest::StatusCode::BAD_REQUEST)),
        );
        assert_eq!(
            err.to_string(),
            "failed to update device 10.0.1.32 settings: failed to update light group: \
             device responded with 400 Bad Request"
        );
    }

    #[test]
    fn test_exit_code() {
        assert_eq!(ElgatoError::NoLights.exit_code(), 3);
        assert_eq!(ElgatoError::UnknownPort("nope".into()).exit_code(), 1);
        let wrapped = ElgatoError::device("host", ElgatoError::fetch(ElgatoError::NoLights));
        assert_eq!(wrapped.exit_code(), 3);
    }
}

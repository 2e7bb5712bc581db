//! Serial adapter error types.

use doorbridge_domain::error::BridgeError;

/// Errors specific to the serial adapter.
#[derive(Debug, thiserror::Error)]
pub enum SerialLinkError {
    /// The port could not be opened.
    #[error("failed to open serial port {device}")]
    Open {
        device: String,
        #[source]
        source: serialport::Error,
    },

    /// The serialport crate reported a failure on an open port.
    #[error("serial port error")]
    Port(#[from] serialport::Error),

    /// Raw IO failure on the port.
    #[error("serial IO error")]
    Io(#[from] std::io::Error),
}

impl From<SerialLinkError> for BridgeError {
    fn from(err: SerialLinkError) -> Self {
        Self::Link(Box::new(err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_name_the_device_in_open_errors() {
        let err = SerialLinkError::Open {
            device: "/dev/ttyAMA0".to_string(),
            source: serialport::Error::new(serialport::ErrorKind::NoDevice, "gone"),
        };
        assert_eq!(err.to_string(), "failed to open serial port /dev/ttyAMA0");
    }

    #[test]
    fn should_convert_into_a_link_error() {
        let err: BridgeError = SerialLinkError::Io(std::io::Error::other("boom")).into();
        assert!(matches!(err, BridgeError::Link(_)));
    }
}

/// One wire communication error type.
#[derive(Debug)]
pub enum OneWireError<E> {
    /// Encapsulates the error type of the underlying line driver.
    Other(E),
    /// No device answered the presence-detect window after a reset pulse.
    NoDevicePresent,
}

impl<E> From<E> for OneWireError<E> {
    fn from(other: E) -> Self {
        Self::Other(other)
    }
}

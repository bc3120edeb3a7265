//! Device session: exactly-once resource sequencing over a reader driver.

use crate::error::Result;
use crate::traits::{ReaderDriver, Selection};
use std::sync::Arc;
use tagwatch_core::Modulation;
use tracing::{debug, trace};

/// An open reader session: driver context plus the opened device.
///
/// The session owns both handles for its whole lifetime. Opening performs
/// the context-then-device ladder with cleanup on each failure branch;
/// [`close`](DeviceSession::close) consumes the session and releases both
/// handles exactly once. A session that is dropped without being closed
/// (fatal paths only) releases its handles from `Drop`.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use tagwatch_driver::{DeviceSession, MockReader};
///
/// let (reader, field) = MockReader::new();
/// field.place_tag(vec![0x04, 0xAB, 0xCD, 0xEF]).unwrap();
///
/// let mut session = DeviceSession::open(Arc::new(reader)).unwrap();
/// session.init_initiator().unwrap();
///
/// assert!(session.select_passive_target().unwrap().is_found());
/// assert!(session.is_present().unwrap());
///
/// session.close();
/// ```
pub struct DeviceSession<D: ReaderDriver> {
    driver: Arc<D>,
    context: Option<D::Context>,
    device: Option<D::Device>,
    modulation: Modulation,
}

impl<D: ReaderDriver> DeviceSession<D> {
    /// Open a session polling on the default Mifare modulation.
    ///
    /// # Errors
    ///
    /// See [`open_with`](DeviceSession::open_with).
    pub fn open(driver: Arc<D>) -> Result<Self> {
        Self::open_with(driver, Modulation::MIFARE)
    }

    /// Initialize the driver context, then open the first available device.
    ///
    /// # Errors
    ///
    /// Returns the driver's error unchanged. Context initialization failure
    /// opens nothing; device-open failure releases the context first.
    /// Either way no resources are held when this returns `Err`.
    pub fn open_with(driver: Arc<D>, modulation: Modulation) -> Result<Self> {
        let mut context = driver.init_context()?;

        let device = match driver.open_device(&mut context) {
            Ok(device) => device,
            Err(error) => {
                driver.release_context(context);
                return Err(error);
            }
        };

        debug!(%modulation, "reader device opened");

        Ok(Self {
            driver,
            context: Some(context),
            device: Some(device),
            modulation,
        })
    }

    /// Prepare the device to act as a polling initiator.
    ///
    /// # Errors
    ///
    /// Returns the driver's error unchanged. On failure the caller must
    /// [`close`](DeviceSession::close) the session before surfacing it.
    pub fn init_initiator(&mut self) -> Result<()> {
        let device = self.device.as_mut().expect("device held until close");
        self.driver.initiator_init(device)
    }

    /// Run one blocking passive-target selection on the session modulation.
    ///
    /// # Errors
    ///
    /// Returns transport-level failures; a quiet field is
    /// `Ok(Selection::NotFound)`.
    pub fn select_passive_target(&mut self) -> Result<Selection> {
        let device = self.device.as_mut().expect("device held until close");
        self.driver.select_passive_target(device, self.modulation)
    }

    /// Run one blocking presence check for the previously selected target.
    ///
    /// # Errors
    ///
    /// Returns transport-level failures; callers treat them like a
    /// departed target.
    pub fn is_present(&mut self) -> Result<bool> {
        let device = self.device.as_mut().expect("device held until close");
        self.driver.is_target_present(device)
    }

    /// The modulation this session polls on.
    #[must_use]
    pub fn modulation(&self) -> Modulation {
        self.modulation
    }

    /// Close the device and release the context.
    pub fn close(mut self) {
        self.release();
    }

    fn release(&mut self) {
        if let Some(device) = self.device.take() {
            self.driver.close_device(device);
            trace!("reader device closed");
        }
        if let Some(context) = self.context.take() {
            self.driver.release_context(context);
            trace!("reader context released");
        }
    }
}

impl<D: ReaderDriver> Drop for DeviceSession<D> {
    fn drop(&mut self) {
        self.release();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::MockReader;

    #[test]
    fn test_open_holds_one_context_and_device() {
        let (reader, field) = MockReader::new();
        let session = DeviceSession::open(Arc::new(reader)).unwrap();

        assert_eq!(field.contexts_initialized(), 1);
        assert_eq!(field.devices_opened(), 1);
        assert_eq!(field.contexts_released(), 0);
        assert_eq!(field.devices_closed(), 0);

        session.close();
        assert_eq!(field.devices_closed(), 1);
        assert_eq!(field.contexts_released(), 1);
    }

    #[test]
    fn test_context_failure_holds_nothing() {
        let (reader, field) = MockReader::new();
        field.fail_context_init(true);

        let result = DeviceSession::open(Arc::new(reader));
        assert!(result.is_err());
        assert_eq!(field.contexts_initialized(), 0);
        assert_eq!(field.devices_opened(), 0);
        assert_eq!(field.contexts_released(), 0);
    }

    #[test]
    fn test_open_failure_releases_context() {
        let (reader, field) = MockReader::new();
        field.fail_device_open(true);

        let result = DeviceSession::open(Arc::new(reader));
        assert!(result.is_err());
        assert_eq!(field.contexts_initialized(), 1);
        assert_eq!(field.contexts_released(), 1);
        assert_eq!(field.devices_opened(), 0);
    }

    #[test]
    fn test_initiator_failure_then_close_releases_all() {
        let (reader, field) = MockReader::new();
        field.fail_initiator_init(true);

        let mut session = DeviceSession::open(Arc::new(reader)).unwrap();
        assert!(session.init_initiator().is_err());

        // Caller owes close() on this branch.
        session.close();
        assert_eq!(field.devices_closed(), 1);
        assert_eq!(field.contexts_released(), 1);
    }

    #[test]
    fn test_drop_releases_unclosed_session() {
        let (reader, field) = MockReader::new();
        {
            let _session = DeviceSession::open(Arc::new(reader)).unwrap();
        }
        assert_eq!(field.devices_closed(), 1);
        assert_eq!(field.contexts_released(), 1);
    }

    #[test]
    fn test_select_and_presence_follow_the_field() {
        let (reader, field) = MockReader::new();
        let mut session = DeviceSession::open(Arc::new(reader)).unwrap();
        session.init_initiator().unwrap();

        assert_eq!(session.select_passive_target().unwrap(), Selection::NotFound);

        field.place_tag(vec![0x01, 0x02, 0x03, 0x04]).unwrap();
        match session.select_passive_target().unwrap() {
            Selection::Found(info) => assert_eq!(info.uid_hex(), "01020304"),
            Selection::NotFound => panic!("tag was placed"),
        }
        assert!(session.is_present().unwrap());

        field.remove_tag();
        assert!(!session.is_present().unwrap());

        session.close();
    }
}

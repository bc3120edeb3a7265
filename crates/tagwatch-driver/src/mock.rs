//! Mock reader driver for testing and development.
//!
//! This module simulates a contactless reader and the RF field in front of
//! it. The driver half implements [`ReaderDriver`]; the
//! [`MockFieldHandle`] half lets a test place and remove tags and inject a
//! failure into any step of the setup ladder. Both halves share the same
//! field state, so everything the driver observes was scripted through the
//! handle.

use crate::{
    Result,
    error::DriverError,
    traits::{ReaderDriver, Selection, TagInfo},
};
use std::sync::{Arc, Mutex, MutexGuard};
use tagwatch_core::{Modulation, TagUid};

#[derive(Debug, Default)]
struct FieldState {
    tag: Option<TagInfo>,
    fail_context_init: bool,
    fail_device_open: bool,
    fail_initiator_init: bool,
    contexts_initialized: u32,
    contexts_released: u32,
    devices_opened: u32,
    devices_closed: u32,
    selects: u64,
    presence_checks: u64,
}

/// Opaque mock driver context handle.
#[derive(Debug)]
pub struct MockContext(());

/// Opaque mock open-device handle.
#[derive(Debug)]
pub struct MockDevice(());

/// Mock contactless reader.
///
/// Created together with its controlling [`MockFieldHandle`]:
///
/// ```
/// use tagwatch_driver::{MockReader, ReaderDriver};
///
/// let (reader, field) = MockReader::new();
/// field.place_tag(vec![0x04, 0xAB, 0xCD, 0xEF]).unwrap();
///
/// assert!(reader.version().starts_with("mock"));
/// ```
#[derive(Debug)]
pub struct MockReader {
    state: Arc<Mutex<FieldState>>,
}

impl MockReader {
    /// Create a new mock reader and the handle that scripts its field.
    #[must_use]
    pub fn new() -> (Self, MockFieldHandle) {
        let state = Arc::new(Mutex::new(FieldState::default()));
        let reader = Self {
            state: Arc::clone(&state),
        };
        let handle = MockFieldHandle { state };
        (reader, handle)
    }

    fn lock(&self) -> MutexGuard<'_, FieldState> {
        self.state.lock().expect("field state poisoned")
    }
}

impl ReaderDriver for MockReader {
    type Context = MockContext;
    type Device = MockDevice;

    fn init_context(&self) -> Result<MockContext> {
        let mut state = self.lock();
        if state.fail_context_init {
            return Err(DriverError::context_init("mock context init refused"));
        }
        state.contexts_initialized += 1;
        Ok(MockContext(()))
    }

    fn open_device(&self, _context: &mut MockContext) -> Result<MockDevice> {
        let mut state = self.lock();
        if state.fail_device_open {
            return Err(DriverError::device_open("no mock reader attached"));
        }
        state.devices_opened += 1;
        Ok(MockDevice(()))
    }

    fn initiator_init(&self, _device: &mut MockDevice) -> Result<()> {
        let state = self.lock();
        if state.fail_initiator_init {
            return Err(DriverError::initiator_init("mock initiator refused"));
        }
        Ok(())
    }

    fn select_passive_target(
        &self,
        _device: &mut MockDevice,
        _modulation: Modulation,
    ) -> Result<Selection> {
        let mut state = self.lock();
        state.selects += 1;
        match &state.tag {
            Some(info) => Ok(Selection::Found(info.clone())),
            None => Ok(Selection::NotFound),
        }
    }

    fn is_target_present(&self, _device: &mut MockDevice) -> Result<bool> {
        let mut state = self.lock();
        state.presence_checks += 1;
        Ok(state.tag.is_some())
    }

    fn close_device(&self, _device: MockDevice) {
        self.lock().devices_closed += 1;
    }

    fn release_context(&self, _context: MockContext) {
        self.lock().contexts_released += 1;
    }

    fn version(&self) -> String {
        concat!("mock ", env!("CARGO_PKG_VERSION")).to_string()
    }
}

/// Handle for scripting a [`MockReader`]'s field.
///
/// Clones share the same field state as the reader they were created with.
#[derive(Debug, Clone)]
pub struct MockFieldHandle {
    state: Arc<Mutex<FieldState>>,
}

impl MockFieldHandle {
    fn lock(&self) -> MutexGuard<'_, FieldState> {
        self.state.lock().expect("field state poisoned")
    }

    /// Place a Mifare tag with the given identifier into the field.
    ///
    /// # Errors
    ///
    /// Returns an error if the identifier exceeds the 10-byte limit.
    pub fn place_tag(&self, uid: impl Into<Vec<u8>>) -> tagwatch_core::Result<()> {
        let uid = TagUid::new(uid.into())?;
        self.place_target(TagInfo::new(uid, Modulation::MIFARE));
        Ok(())
    }

    /// Place an arbitrary target into the field.
    pub fn place_target(&self, info: TagInfo) {
        self.lock().tag = Some(info);
    }

    /// Remove whatever tag is in the field.
    pub fn remove_tag(&self) {
        self.lock().tag = None;
    }

    /// Returns `true` if a tag is currently in the field.
    #[must_use]
    pub fn tag_present(&self) -> bool {
        self.lock().tag.is_some()
    }

    /// Make `init_context` fail (or succeed again).
    pub fn fail_context_init(&self, fail: bool) {
        self.lock().fail_context_init = fail;
    }

    /// Make `open_device` fail (or succeed again).
    pub fn fail_device_open(&self, fail: bool) {
        self.lock().fail_device_open = fail;
    }

    /// Make `initiator_init` fail (or succeed again).
    pub fn fail_initiator_init(&self, fail: bool) {
        self.lock().fail_initiator_init = fail;
    }

    /// Number of successful `init_context` calls.
    #[must_use]
    pub fn contexts_initialized(&self) -> u32 {
        self.lock().contexts_initialized
    }

    /// Number of `release_context` calls.
    #[must_use]
    pub fn contexts_released(&self) -> u32 {
        self.lock().contexts_released
    }

    /// Number of successful `open_device` calls.
    #[must_use]
    pub fn devices_opened(&self) -> u32 {
        self.lock().devices_opened
    }

    /// Number of `close_device` calls.
    #[must_use]
    pub fn devices_closed(&self) -> u32 {
        self.lock().devices_closed
    }

    /// Number of selection attempts the reader has run.
    #[must_use]
    pub fn select_count(&self) -> u64 {
        self.lock().selects
    }

    /// Number of presence checks the reader has run.
    #[must_use]
    pub fn presence_check_count(&self) -> u64 {
        self.lock().presence_checks
    }
}
